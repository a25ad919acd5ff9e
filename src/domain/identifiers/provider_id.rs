//! E-mobility provider identifier (`DE-GDF`)

use std::fmt;
use std::str::FromStr;

use crate::support::errors::IdentifierError;

const KIND: &str = "ProviderID";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderId {
    country: String,
    suffix: String,
}

impl ProviderId {
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

    pub(crate) fn parse_prefix<'a>(
        s: &'a str,
        kind: &'static str,
    ) -> Result<(Self, &'a str), IdentifierError> {
        if !s.is_ascii() {
            return Err(IdentifierError::format(kind, s, "only ASCII characters are allowed"));
        }
        if s.len() < 5 || !s[..2].chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(IdentifierError::format(kind, s, "country code must be 2 letters"));
        }

        let rest = &s[2..];
        let rest = rest
            .strip_prefix('-')
            .or_else(|| rest.strip_prefix('*'))
            .unwrap_or(rest);
        if rest.len() < 3 || !rest[..3].chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(IdentifierError::format(kind, s, "provider code must be 3 alphanumerics"));
        }

        Ok((
            Self {
                country: s[..2].to_ascii_uppercase(),
                suffix: rest[..3].to_ascii_uppercase(),
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
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.country, self.suffix)
    }
}

impl FromStr for ProviderId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
