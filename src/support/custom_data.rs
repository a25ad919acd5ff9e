//! Custom-data side channel
//!
//! A typed key/value bag attached to aggregates so that fields one domain
//! model cannot express survive a conversion into the other. Keys are
//! namespaced by origin (`OICP.*`, `WWCP.*`).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::errors::CustomDataError;

/// A single tagged value in the bag.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Json(Value),
}

impl CustomValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Timestamp(_) => "timestamp",
            Self::Json(_) => "json",
        }
    }
}

impl From<&str> for CustomValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CustomValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for CustomValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for CustomValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for CustomValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<DateTime<Utc>> for CustomValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<Value> for CustomValue {
    fn from(v: Value) -> Self {
        Self::Json(v)
    }
}

/// Extraction of a concrete type from a [`CustomValue`].
pub trait FromCustomValue<'a>: Sized {
    const TYPE_NAME: &'static str;

    fn from_custom(value: &'a CustomValue) -> Option<Self>;
}

impl<'a> FromCustomValue<'a> for &'a str {
    const TYPE_NAME: &'static str = "text";

    fn from_custom(value: &'a CustomValue) -> Option<Self> {
        match value {
            CustomValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl<'a> FromCustomValue<'a> for i64 {
    const TYPE_NAME: &'static str = "integer";

    fn from_custom(value: &'a CustomValue) -> Option<Self> {
        match value {
            CustomValue::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl<'a> FromCustomValue<'a> for f64 {
    const TYPE_NAME: &'static str = "float";

    fn from_custom(value: &'a CustomValue) -> Option<Self> {
        match value {
            CustomValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl<'a> FromCustomValue<'a> for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_custom(value: &'a CustomValue) -> Option<Self> {
        match value {
            CustomValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl<'a> FromCustomValue<'a> for DateTime<Utc> {
    const TYPE_NAME: &'static str = "timestamp";

    fn from_custom(value: &'a CustomValue) -> Option<Self> {
        match value {
            CustomValue::Timestamp(v) => Some(*v),
            _ => None,
        }
    }
}

impl<'a> FromCustomValue<'a> for &'a Value {
    const TYPE_NAME: &'static str = "json";

    fn from_custom(value: &'a CustomValue) -> Option<Self> {
        match value {
            CustomValue::Json(v) => Some(v),
            _ => None,
        }
    }
}

/// Ordered, typed custom-data bag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomData {
    entries: BTreeMap<String, CustomValue>,
}

impl CustomData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<CustomValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<CustomValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<CustomValue> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn raw(&self, key: &str) -> Option<&CustomValue> {
        self.entries.get(key)
    }

    /// Type-checked lookup.
    pub fn get<'a, T: FromCustomValue<'a>>(&'a self, key: &str) -> Result<T, CustomDataError> {
        let value = self
            .entries
            .get(key)
            .ok_or_else(|| CustomDataError::NotFound(key.to_string()))?;

        T::from_custom(value).ok_or_else(|| CustomDataError::TypeMismatch {
            key: key.to_string(),
            expected: T::TYPE_NAME,
            found: value.type_name(),
        })
    }

    /// Like [`get`](Self::get), but absent and mistyped entries both yield `None`.
    pub fn get_opt<'a, T: FromCustomValue<'a>>(&'a self, key: &str) -> Option<T> {
        self.get(key).ok()
    }

    /// Entries whose key starts with `prefix` (e.g. `"WWCP."`).
    pub fn namespace<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a CustomValue)> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
