//! Contract identifier (`DE-GDF-C12345678-X`, `DE*GDF*123456*X`)

use std::fmt;
use std::str::FromStr;

use super::provider_id::ProviderId;
use crate::support::errors::IdentifierError;

const KIND: &str = "EVCOID";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EvcoFormat {
    Iso,
    Din,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EvcoId {
    provider: ProviderId,
    instance: String,
    check: char,
    format: EvcoFormat,
}

impl EvcoId {
    /// Separators (`-`, `*`) are optional on input; the compact form decides
    /// between ISO (`C` + 8 characters) and DIN (6 characters).
    pub fn parse(s: &str) -> Result<Self, IdentifierError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdentifierError::Empty { kind: KIND });
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '*')
        {
            return Err(IdentifierError::format(KIND, s, "allowed characters are A-Z, 0-9, '-', '*'"));
        }

        let compact: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '*')
            .map(|c| c.to_ascii_uppercase())
            .collect();

        let provider = ProviderId::parse(compact.get(..5).unwrap_or(""))
            .map_err(|_| IdentifierError::format(KIND, s, "invalid provider prefix"))?;

        let (instance, check, format) = match compact.len() {
            15 if compact.as_bytes()[5] == b'C' => (&compact[6..14], &compact[14..], EvcoFormat::Iso),
            12 => (&compact[5..11], &compact[11..], EvcoFormat::Din),
            _ => return Err(IdentifierError::format(KIND, s, "unexpected length")),
        };

        let check = check
            .chars()
            .next()
            .ok_or_else(|| IdentifierError::format(KIND, s, "missing check character"))?;
        if format == EvcoFormat::Din && !(check.is_ascii_digit() || check == 'X') {
            return Err(IdentifierError::format(KIND, s, "DIN check digit must be 0-9 or X"));
        }

        Ok(Self {
            provider,
            instance: instance.to_string(),
            check,
            format,
        })
    }

    pub fn try_parse(s: &str) -> Option<Self> {
        Self::parse(s).ok()
    }

    pub fn provider_id(&self) -> &ProviderId {
        &self.provider
    }
}

impl fmt::Display for EvcoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            EvcoFormat::Iso => write!(f, "{}-C{}-{}", self.provider, self.instance, self.check),
            EvcoFormat::Din => write!(
                f,
                "{}*{}*{}*{}",
                self.provider.country_code(),
                self.provider.suffix(),
                self.instance,
                self.check
            ),
        }
    }
}

impl FromStr for EvcoId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_forms_are_equal() {
        let a = EvcoId::parse("DE-GDF-C12345678-X").unwrap();
        let b = EvcoId::parse("degdfc12345678x").unwrap();
        assert_eq!(a, b);
        assert_eq!(b.to_string(), "DE-GDF-C12345678-X");
        assert_eq!(a.provider_id().to_string(), "DE-GDF");
    }

    #[test]
    fn din_form() {
        let id = EvcoId::parse("DE*GDF*123456*7").unwrap();
        assert_eq!(id.to_string(), "DE*GDF*123456*7");
    }

    #[test]
    fn rejects_malformed() {
        for s in ["", "DE-GDF", "DE-GDF-X12345678-X", "DE*GDF*123456*Y", "DE-GDF-C1234ä678-X"] {
            assert!(EvcoId::try_parse(s).is_none(), "accepted {:?}", s);
        }
    }
}
