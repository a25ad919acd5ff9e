//! Identifiers of the generic charging model
//!
//! The generic model is lenient: any non-empty token of ASCII letters,
//! digits and the separators `* - + _ .` is accepted as-is.

use std::fmt;

macro_rules! wwcp_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl $name {
            pub fn parse(s: &str) -> Option<Self> {
                let s = s.trim();
                let valid = !s.is_empty()
                    && s.chars()
                        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '*' | '-' | '+' | '_' | '.'));
                valid.then(|| Self(s.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

wwcp_id!(
    /// Charging station operator, e.g. `DE*GEF`.
    ChargingStationOperatorId
);
wwcp_id!(
    /// E-mobility provider, e.g. `DE-GDF`.
    EMobilityProviderId
);
wwcp_id!(EvseId);
wwcp_id!(
    /// Contract account of a driver, e.g. `DE-GDF-C12345678-X`.
    EMobilityAccountId
);
wwcp_id!(
    /// RFID card identifier.
    AuthToken
);
wwcp_id!(ChargingSessionId);
wwcp_id!(ChargingProductId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_lenient_but_total() {
        assert_eq!(EvseId::parse(" DE*GEF*E1 ").unwrap().as_str(), "DE*GEF*E1");
        assert!(EvseId::parse("").is_none());
        assert!(EvseId::parse("   ").is_none());
        assert!(AuthToken::parse("ä123").is_none());
        assert!(AuthToken::parse("AB CD").is_none());
    }
}
