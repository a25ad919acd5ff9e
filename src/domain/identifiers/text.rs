//! Free-text identifiers bounded only by length

use std::fmt;
use std::str::FromStr;

use crate::support::errors::IdentifierError;

macro_rules! text_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $max:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            pub const MAX_LENGTH: usize = $max;

            pub fn parse(s: &str) -> Result<Self, IdentifierError> {
                let s = s.trim();
                if s.is_empty() {
                    return Err(IdentifierError::Empty { kind: $kind });
                }
                if s.chars().count() > $max {
                    return Err(IdentifierError::format(
                        $kind,
                        s,
                        concat!("longer than ", stringify!($max), " characters"),
                    ));
                }
                Ok(Self(s.to_string()))
            }

            pub fn try_parse(s: &str) -> Option<Self> {
                Self::parse(s).ok()
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

        impl FromStr for $name {
            type Err = IdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }
    };
}

text_identifier!(
    /// Session correlation id assigned by the CPO
    CpoPartnerSessionId,
    "CPOPartnerSessionID",
    250
);
text_identifier!(
    /// Session correlation id assigned by the EMP
    EmpPartnerSessionId,
    "EMPPartnerSessionID",
    250
);
text_identifier!(
    /// Charging product agreed between EMP and CPO (`AC1`, `Standard Price`)
    PartnerProductId,
    "PartnerProductID",
    100
);
text_identifier!(
    /// Pricing product in dynamic pricing data
    ProductId,
    "ProductID",
    50
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_enforced() {
        assert_eq!(PartnerProductId::parse(" AC1 ").unwrap().as_str(), "AC1");
        assert!(ProductId::try_parse("").is_none());
        assert!(ProductId::try_parse(&"x".repeat(51)).is_none());
        assert!(ProductId::try_parse(&"ü".repeat(50)).is_some());
        assert!(CpoPartnerSessionId::try_parse(&"1".repeat(250)).is_some());
        assert!(EmpPartnerSessionId::try_parse(&"1".repeat(251)).is_none());
    }
}
