//! Hubject session identifier (GUID shaped)

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use crate::support::errors::IdentifierError;

const KIND: &str = "SessionID";
const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn parse(s: &str) -> Result<Self, IdentifierError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdentifierError::Empty { kind: KIND });
        }

        let groups: Vec<&str> = s.split('-').collect();
        let shaped = groups.len() == GROUPS.len()
            && groups
                .iter()
                .zip(GROUPS)
                .all(|(g, len)| g.len() == len && g.chars().all(|c| c.is_ascii_alphanumeric()));
        if !shaped {
            return Err(IdentifierError::format(KIND, s, "expected 8-4-4-4-12 alphanumerics"));
        }

        Ok(Self(s.to_ascii_lowercase()))
    }

    pub fn try_parse(s: &str) -> Option<Self> {
        Self::parse(s).ok()
    }

    pub fn new_random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
