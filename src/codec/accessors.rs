//! Field accessors over the JSON object model
//!
//! Both wire formats land in the same `serde_json::Value` model. XML leaves
//! are always text, JSON leaves may be numbers or booleans, so scalar
//! accessors read any scalar through its text form and parse with `FromStr`.

use std::borrow::Cow;
use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Number, Value};

use crate::support::errors::CodecError;

/// Read-only view of one object in the model.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    context: &'static str,
    map: &'a Map<String, Value>,
}

fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.trim())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        _ => None,
    }
}

fn parse_scalar<T>(context: &'static str, field: &'static str, value: &Value) -> Result<T, CodecError>
where
    T: FromStr,
    T::Err: Display,
{
    let text = scalar_text(value)
        .ok_or_else(|| CodecError::invalid(context, field, "expected a text value"))?;
    text.parse::<T>()
        .map_err(|e| CodecError::invalid(context, field, e))
}

impl<'a> Fields<'a> {
    pub fn new(context: &'static str, value: &'a Value) -> Result<Self, CodecError> {
        match value {
            Value::Object(map) => Ok(Self { context, map }),
            _ => Err(CodecError::NotAnObject(context)),
        }
    }

    pub fn context(&self) -> &'static str {
        self.context
    }

    /// Present and not `null`. An empty XML element counts as present.
    pub fn has(&self, key: &str) -> bool {
        !matches!(self.map.get(key), None | Some(Value::Null))
    }

    pub fn raw(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    pub fn required<T>(&self, key: &'static str) -> Result<T, CodecError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let value = self.raw(key).ok_or(CodecError::MissingField {
            context: self.context,
            field: key,
        })?;
        parse_scalar(self.context, key, value)
    }

    pub fn optional<T>(&self, key: &'static str) -> Result<Option<T>, CodecError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.raw(key) {
            None => Ok(None),
            Some(value) => parse_scalar(self.context, key, value).map(Some),
        }
    }

    /// Optional value where an unparsable one is treated as absent.
    pub fn lenient<T>(&self, key: &'static str) -> Option<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.optional(key).ok().flatten()
    }

    pub fn required_str(&self, key: &'static str) -> Result<String, CodecError> {
        self.required::<String>(key)
    }

    pub fn optional_str(&self, key: &'static str) -> Result<Option<String>, CodecError> {
        Ok(self
            .optional::<String>(key)?
            .filter(|s| !s.is_empty()))
    }

    /// `true`/`false` in any casing, or a JSON boolean.
    pub fn optional_bool(&self, key: &'static str) -> Result<Option<bool>, CodecError> {
        match self.raw(key) {
            None => Ok(None),
            Some(value) => {
                let text = scalar_text(value)
                    .ok_or_else(|| CodecError::invalid(self.context, key, "expected a boolean"))?;
                match text.to_ascii_lowercase().as_str() {
                    "true" | "1" => Ok(Some(true)),
                    "false" | "0" => Ok(Some(false)),
                    other => Err(CodecError::invalid(self.context, key, format!("'{}' is not a boolean", other))),
                }
            }
        }
    }

    pub fn required_bool(&self, key: &'static str) -> Result<bool, CodecError> {
        self.optional_bool(key)?.ok_or(CodecError::MissingField {
            context: self.context,
            field: key,
        })
    }

    pub fn required_object(&self, key: &'static str) -> Result<Fields<'a>, CodecError> {
        let value = self.raw(key).ok_or(CodecError::MissingField {
            context: self.context,
            field: key,
        })?;
        Fields::new(key, value)
    }

    pub fn optional_object(&self, key: &'static str) -> Result<Option<Fields<'a>>, CodecError> {
        self.raw(key).map(|v| Fields::new(key, v)).transpose()
    }

    /// Items under `key`: an array, a single value (one XML child) or nothing.
    pub fn list(&self, key: &str) -> Vec<&'a Value> {
        match self.raw(key) {
            None => Vec::new(),
            Some(Value::Array(items)) => items.iter().filter(|v| !v.is_null()).collect(),
            Some(Value::String(s)) if s.trim().is_empty() => Vec::new(),
            Some(single) => vec![single],
        }
    }

    pub fn list_of<T>(&self, key: &'static str) -> Result<Vec<T>, CodecError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.list(key)
            .into_iter()
            .map(|v| parse_scalar(self.context, key, v))
            .collect()
    }

    /// Like [`list_of`](Self::list_of) but drops entries that do not parse.
    pub fn lenient_list_of<T>(&self, key: &'static str) -> Vec<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.list(key)
            .into_iter()
            .filter_map(|v| parse_scalar(self.context, key, v).ok())
            .collect()
    }

    pub fn objects<T>(
        &self,
        key: &'static str,
        mut parse: impl FnMut(Fields<'a>) -> Result<T, CodecError>,
    ) -> Result<Vec<T>, CodecError> {
        self.list(key)
            .into_iter()
            .map(|v| Fields::new(key, v).and_then(&mut parse))
            .collect()
    }
}

/// Insertion-ordered object under construction.
#[derive(Debug, Default)]
pub struct Obj(Map<String, Value>);

impl Obj {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn value(mut self, key: &str, value: Value) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    pub fn opt_value(self, key: &str, value: Option<Value>) -> Self {
        match value {
            Some(value) => self.value(key, value),
            None => self,
        }
    }

    pub fn text(self, key: &str, value: impl Display) -> Self {
        self.value(key, Value::String(value.to_string()))
    }

    pub fn opt_text<T: Display>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.text(key, v),
            None => self,
        }
    }

    /// A number in the JSON model; falls back to text if it does not parse.
    pub fn number(self, key: &str, value: impl Display) -> Self {
        self.value(key, number(value))
    }

    pub fn opt_number<T: Display>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.number(key, v),
            None => self,
        }
    }

    pub fn boolean(self, key: &str, value: bool) -> Self {
        self.value(key, Value::Bool(value))
    }

    pub fn opt_boolean(self, key: &str, value: Option<bool>) -> Self {
        match value {
            Some(v) => self.boolean(key, v),
            None => self,
        }
    }

    pub fn timestamp(self, key: &str, value: &DateTime<Utc>) -> Self {
        self.text(key, format_timestamp(value))
    }

    pub fn opt_timestamp(self, key: &str, value: Option<&DateTime<Utc>>) -> Self {
        match value {
            Some(v) => self.timestamp(key, v),
            None => self,
        }
    }

    /// Array of items; omitted entirely when empty.
    pub fn list<I>(self, key: &str, items: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let items: Vec<Value> = items.into_iter().collect();
        if items.is_empty() {
            self
        } else {
            self.value(key, Value::Array(items))
        }
    }

    pub fn text_list<'t, T, I>(self, key: &str, items: I) -> Self
    where
        T: Display + 't,
        I: IntoIterator<Item = &'t T>,
    {
        self.list(key, items.into_iter().map(|v| Value::String(v.to_string())))
    }

    pub fn build(self) -> Value {
        Value::Object(self.0)
    }
}

/// JSON number carrying the value's exact decimal text.
pub fn number(value: impl Display) -> Value {
    let text = value.to_string();
    match Number::from_str(&text) {
        Ok(n) => Value::Number(n),
        Err(_) => Value::String(text),
    }
}

pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn scalars_read_from_text_or_json() {
        let body = json!({"Voltage": "400", "Amperage": 32, "Open": "TRUE", "Price": 0.35});
        let f = Fields::new("test", &body).unwrap();
        assert_eq!(f.required::<u32>("Voltage").unwrap(), 400);
        assert_eq!(f.required::<u32>("Amperage").unwrap(), 32);
        assert_eq!(f.optional_bool("Open").unwrap(), Some(true));
        assert_eq!(f.required::<Decimal>("Price").unwrap(), Decimal::new(35, 2));
    }

    #[test]
    fn missing_required_names_the_field() {
        let body = json!({});
        let err = Fields::new("eRoamingAuthorizeStart", &body)
            .unwrap()
            .required_str("OperatorID")
            .unwrap_err();
        assert!(err.to_string().contains("OperatorID"));
        assert!(err.to_string().contains("eRoamingAuthorizeStart"));
    }

    #[test]
    fn list_accepts_single_value() {
        let body = json!({"Plugs": "Type 2 Outlet", "Modes": ["a", "b"]});
        let f = Fields::new("test", &body).unwrap();
        assert_eq!(f.list("Plugs").len(), 1);
        assert_eq!(f.list("Modes").len(), 2);
        assert!(f.list("Nothing").is_empty());
    }

    #[test]
    fn writer_omits_absent_values() {
        let v = Obj::new()
            .text("A", "x")
            .opt_text::<String>("B", None)
            .list("C", Vec::new())
            .number("D", Decimal::new(1250, 2))
            .build();
        assert_eq!(v["A"], "x");
        assert_eq!(v["D"].to_string(), "12.50");
        assert_eq!(v.as_object().unwrap().len(), 2);
    }

    #[test]
    fn decimals_keep_every_digit() {
        let exact = Decimal::from_str("12345678901234.56789012").unwrap();
        let text = serde_json::to_string(&Obj::new().number("MeterValueEnd", exact).build()).unwrap();
        assert_eq!(text, r#"{"MeterValueEnd":12345678901234.56789012}"#);

        let parsed: Value = serde_json::from_str(&text).unwrap();
        let f = Fields::new("test", &parsed).unwrap();
        assert_eq!(f.required::<Decimal>("MeterValueEnd").unwrap(), exact);
    }
}
