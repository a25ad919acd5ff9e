//! Multi-language text

use serde_json::Value;

use crate::codec::accessors::{Fields, Obj};
use crate::support::errors::CodecError;

/// Ordered language -> text pairs. Lookups return the first match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct I18NString {
    entries: Vec<(String, String)>,
}

impl I18NString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(lang: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new().with(lang, text)
    }

    pub fn with(mut self, lang: impl Into<String>, text: impl Into<String>) -> Self {
        self.push(lang, text);
        self
    }

    pub fn push(&mut self, lang: impl Into<String>, text: impl Into<String>) {
        self.entries.push((lang.into().to_ascii_lowercase(), text.into()));
    }

    pub fn get(&self, lang: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l.eq_ignore_ascii_case(lang))
            .map(|(_, text)| text.as_str())
    }

    /// Text in `lang`, else the first entry.
    pub fn get_or_first(&self, lang: &str) -> Option<&str> {
        self.get(lang)
            .or_else(|| self.entries.first().map(|(_, text)| text.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, t)| (l.as_str(), t.as_str()))
    }

    pub(crate) fn to_values(&self) -> impl Iterator<Item = Value> + '_ {
        self.entries
            .iter()
            .map(|(lang, text)| Obj::new().text("lang", lang).text("value", text).build())
    }

    /// Reads the `InfoText` list under `key`; a bare string counts as
    /// language-neutral text.
    pub(crate) fn from_list(f: &Fields<'_>, key: &'static str) -> Result<Self, CodecError> {
        let mut result = Self::new();
        for item in f.list(key) {
            match item {
                Value::String(text) => result.push("", text.trim()),
                other => {
                    let info = Fields::new(key, other)?;
                    result.push(info.optional_str("lang")?.unwrap_or_default(), info.required_str("value")?);
                }
            }
        }
        Ok(result)
    }
}
