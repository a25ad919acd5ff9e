//! OICP protocol version
//!
//! Defines the supported OICP versions for multi-protocol support.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// Supported OICP protocol versions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OicpVersion {
    /// OICP 2.0 (SOAP)
    V2_0,
    /// OICP 2.1 (SOAP)
    V2_1,
    /// OICP 2.2 (SOAP, dynamic pricing added)
    V2_2,
    /// OICP 2.3 (JSON / REST)
    V2_3,
}

impl OicpVersion {
    /// All supported OICP versions, ordered from newest to oldest.
    pub const ALL: &'static [OicpVersion] = &[Self::V2_3, Self::V2_2, Self::V2_1, Self::V2_0];

    /// Human-readable version string.
    pub fn version_string(&self) -> &'static str {
        match self {
            Self::V2_0 => "2.0",
            Self::V2_1 => "2.1",
            Self::V2_2 => "2.2",
            Self::V2_3 => "2.3",
        }
    }

    /// Path segment used in namespaces and SOAP endpoints (`v2.1`).
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::V2_0 => "v2.0",
            Self::V2_1 => "v2.1",
            Self::V2_2 => "v2.2",
            Self::V2_3 => "v2.3",
        }
    }

    /// Whether this version speaks JSON over REST instead of SOAP.
    pub fn is_rest(&self) -> bool {
        matches!(self, Self::V2_3)
    }

    /// Parse a version from `"2.3"`, `"v2.3"` or `"V2_3"`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().trim_start_matches(['v', 'V']).replace('_', ".");
        match s.as_str() {
            "2.0" => Some(Self::V2_0),
            "2.1" => Some(Self::V2_1),
            "2.2" => Some(Self::V2_2),
            "2.3" => Some(Self::V2_3),
            _ => None,
        }
    }
}

impl Default for OicpVersion {
    fn default() -> Self {
        Self::V2_3
    }
}

impl fmt::Display for OicpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OICP {}", self.version_string())
    }
}

impl FromStr for OicpVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown OICP version '{}'", s))
    }
}

impl<'de> Deserialize<'de> for OicpVersion {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_spellings() {
        assert_eq!(OicpVersion::parse("2.3"), Some(OicpVersion::V2_3));
        assert_eq!(OicpVersion::parse("v2.1"), Some(OicpVersion::V2_1));
        assert_eq!(OicpVersion::parse("V2_2"), Some(OicpVersion::V2_2));
        assert_eq!(OicpVersion::parse("3.0"), None);
    }

    #[test]
    fn only_latest_is_rest() {
        assert!(OicpVersion::V2_3.is_rest());
        assert!(!OicpVersion::V2_2.is_rest());
        assert!(OicpVersion::ALL[0] > OicpVersion::ALL[3]);
    }
}
