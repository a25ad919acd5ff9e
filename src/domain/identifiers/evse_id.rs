//! EVSE identifier (`DE*GEF*E1234567*A*1`, `+49*822*4201*1`)

use std::fmt;
use std::str::FromStr;

use super::operator_id::{IdFormat, OperatorId};
use crate::support::errors::IdentifierError;

const KIND: &str = "EVSEID";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EvseId {
    operator: OperatorId,
    suffix: String,
}

impl EvseId {
    pub fn parse(s: &str) -> Result<Self, IdentifierError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdentifierError::Empty { kind: KIND });
        }

        let (operator, rest) = OperatorId::parse_prefix(s, KIND)?;
        let rest = match operator.format() {
            IdFormat::Iso => {
                let rest = rest.strip_prefix('*').unwrap_or(rest);
                rest.strip_prefix(['E', 'e'])
                    .ok_or_else(|| IdentifierError::format(KIND, s, "expected 'E' after operator"))?
            }
            IdFormat::Din => rest
                .strip_prefix('*')
                .ok_or_else(|| IdentifierError::format(KIND, s, "expected '*' after operator"))?,
        };

        let suffix = rest.to_ascii_uppercase();
        match operator.format() {
            IdFormat::Iso => {
                if suffix.is_empty() || suffix.len() > 30 {
                    return Err(IdentifierError::format(KIND, s, "serial must be 1-30 characters"));
                }
                if !suffix.chars().all(|c| c.is_ascii_alphanumeric() || c == '*') {
                    return Err(IdentifierError::format(KIND, s, "serial allows only A-Z, 0-9 and '*'"));
                }
            }
            IdFormat::Din => {
                if suffix.is_empty() || suffix.len() > 32 {
                    return Err(IdentifierError::format(KIND, s, "serial must be 1-32 characters"));
                }
                if !suffix.chars().all(|c| c.is_ascii_digit() || c == '*') {
                    return Err(IdentifierError::format(KIND, s, "serial allows only 0-9 and '*'"));
                }
            }
        }

        Ok(Self { operator, suffix })
    }

    pub fn try_parse(s: &str) -> Option<Self> {
        Self::parse(s).ok()
    }

    pub fn operator_id(&self) -> &OperatorId {
        &self.operator
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl fmt::Display for EvseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator.format() {
            IdFormat::Iso => write!(f, "{}*E{}", self.operator, self.suffix),
            IdFormat::Din => write!(f, "{}*{}", self.operator, self.suffix),
        }
    }
}

impl FromStr for EvseId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
