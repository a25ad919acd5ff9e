//! Charging station operator identifier (`DE*GEF`, `+49*822`)

use std::fmt;
use std::str::FromStr;

use crate::support::errors::IdentifierError;

const KIND: &str = "OperatorID";

/// Notation an operator or EVSE identifier was issued in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdFormat {
    /// ISO/IEC 15118 (`DE*GEF`)
    Iso,
    /// DIN SPEC 91286 (`+49*822`)
    Din,
}

/// Operator identifier in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperatorId {
    country: String,
    suffix: String,
    format: IdFormat,
}

impl OperatorId {
    pub fn parse(s: &str) -> Result<Self, IdentifierError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdentifierError::Empty { kind: KIND });
        }

        let (id, rest) = Self::parse_prefix(s, KIND)?;
        if !rest.is_empty() {
            return Err(IdentifierError::format(KIND, s, "unexpected trailing characters"));
        }
        Ok(id)
    }

    pub fn try_parse(s: &str) -> Option<Self> {
        Self::parse(s).ok()
    }

    /// Parse an operator prefix and return the unconsumed remainder.
    ///
    /// Shared with [`EvseId`](super::EvseId), whose grammar starts with an
    /// operator identifier.
    pub(crate) fn parse_prefix<'a>(
        s: &'a str,
        kind: &'static str,
    ) -> Result<(Self, &'a str), IdentifierError> {
        if !s.is_ascii() {
            return Err(IdentifierError::format(kind, s, "only ASCII characters are allowed"));
        }

        if s.starts_with('+') || s.starts_with(|c: char| c.is_ascii_digit()) {
            let body = s.strip_prefix('+').unwrap_or(s);
            let (country, rest) = body
                .split_once('*')
                .ok_or_else(|| IdentifierError::format(kind, s, "missing '*' after country code"))?;
            if country.is_empty()
                || country.len() > 3
                || !country.chars().all(|c| c.is_ascii_digit())
            {
                return Err(IdentifierError::format(kind, s, "country code must be 1-3 digits"));
            }
            if rest.len() < 3 || !rest[..3].chars().all(|c| c.is_ascii_digit()) {
                return Err(IdentifierError::format(kind, s, "operator code must be 3 digits"));
            }
            return Ok((
                Self {
                    country: format!("+{}", country),
                    suffix: rest[..3].to_string(),
                    format: IdFormat::Din,
                },
                &rest[3..],
            ));
        }

        if s.len() < 5 || !s[..2].chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(IdentifierError::format(kind, s, "country code must be 2 letters"));
        }
        let country = s[..2].to_ascii_uppercase();
        let rest = s[2..].strip_prefix('*').unwrap_or(&s[2..]);
        if rest.len() < 3 || !rest[..3].chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(IdentifierError::format(kind, s, "operator code must be 3 alphanumerics"));
        }

        Ok((
            Self {
                country,
                suffix: rest[..3].to_ascii_uppercase(),
                format: IdFormat::Iso,
            },
            &rest[3..],
        ))
    }

    pub fn country_code(&self) -> &str {
        &self.country
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn format(&self) -> IdFormat {
        self.format
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}*{}", self.country, self.suffix)
    }
}

impl FromStr for OperatorId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_with_and_without_separator_are_equal() {
        let a = OperatorId::parse("DE*GEF").unwrap();
        let b = OperatorId::parse("degef").unwrap();
        assert_eq!(a, b);
        assert_eq!(b.to_string(), "DE*GEF");
        assert_eq!(a.format(), IdFormat::Iso);
    }

    #[test]
    fn din_notation() {
        let id = OperatorId::parse("+49*822").unwrap();
        assert_eq!(id.to_string(), "+49*822");
        assert_eq!(id.format(), IdFormat::Din);
        assert_eq!(OperatorId::parse("49*822").unwrap(), id);
    }

    #[test]
    fn rejects_malformed() {
        for s in ["", "D", "DE*GE", "DE*GEF1", "1*ABC", "+4999*822", "ÄÖ*GEF", "DE*G€F"] {
            assert!(OperatorId::try_parse(s).is_none(), "accepted {:?}", s);
        }
    }
}
