use std::fmt;
use std::str::FromStr;

use crate::support::errors::IdentifierError;

const UID_KIND: &str = "UID";
const PHONE_KIND: &str = "PhoneNumber";

/// RFID card UID: 4, 7 or 10 bytes in hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uid(String);

impl Uid {
    pub fn parse(s: &str) -> Result<Self, IdentifierError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdentifierError::Empty { kind: UID_KIND });
        }
        if !matches!(s.len(), 8 | 14 | 20) {
            return Err(IdentifierError::format(UID_KIND, s, "expected 8, 14 or 20 hex digits"));
        }
        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdentifierError::format(UID_KIND, s, "only hex digits are allowed"));
        }
        Ok(Self(s.to_ascii_uppercase()))
    }

    pub fn try_parse(s: &str) -> Option<Self> {
        Self::parse(s).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Uid {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Hotline number in international format (`+4930123456`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn parse(s: &str) -> Result<Self, IdentifierError> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(IdentifierError::Empty { kind: PHONE_KIND });
        }

        let digits = compact
            .strip_prefix('+')
            .ok_or_else(|| IdentifierError::format(PHONE_KIND, s, "must start with '+'"))?;
        if !(5..=15).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(IdentifierError::format(PHONE_KIND, s, "expected 5-15 digits"));
        }
        Ok(Self(compact))
    }

    pub fn try_parse(s: &str) -> Option<Self> {
        Self::parse(s).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PhoneNumber {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_lengths() {
        assert_eq!(Uid::parse("11223344").unwrap().as_str(), "11223344");
        assert_eq!(Uid::parse("0a1b2c3d4e5f60").unwrap().as_str(), "0A1B2C3D4E5F60");
        assert!(Uid::try_parse("1122334").is_none());
        assert!(Uid::try_parse("1122334G").is_none());
        assert!(Uid::try_parse("").is_none());
    }

    #[test]
    fn phone_numbers() {
        assert_eq!(PhoneNumber::parse("+49 30 123456").unwrap().as_str(), "+4930123456");
        assert!(PhoneNumber::try_parse("030123456").is_none());
        assert!(PhoneNumber::try_parse("+49").is_none());
        assert!(PhoneNumber::try_parse("+٤٩٣٠١٢٣٤٥٦").is_none());
    }
}
