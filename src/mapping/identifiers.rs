//! Identifier conversions between OICP and the generic model.
//!
//! Both directions re-validate against the target grammar and yield `None`
//! when the value does not fit.

use crate::domain::identifiers::{
    EvcoId, EvseId, OperatorId, PartnerProductId, ProviderId, SessionId, Uid,
};
use crate::wwcp;

pub trait ToWwcp {
    type Target;

    fn to_wwcp(&self) -> Option<Self::Target>;
}

pub trait ToOicp {
    type Target;

    fn to_oicp(&self) -> Option<Self::Target>;
}

macro_rules! id_mapping {
    ($($oicp:ty => $wwcp:ty),+ $(,)?) => {$(
        impl ToWwcp for $oicp {
            type Target = $wwcp;

            fn to_wwcp(&self) -> Option<$wwcp> {
                <$wwcp>::parse(&self.to_string())
            }
        }

        impl ToOicp for $wwcp {
            type Target = $oicp;

            fn to_oicp(&self) -> Option<$oicp> {
                <$oicp>::try_parse(self.as_str())
            }
        }
    )+};
}

id_mapping! {
    OperatorId => wwcp::ChargingStationOperatorId,
    ProviderId => wwcp::EMobilityProviderId,
    EvseId => wwcp::EvseId,
    EvcoId => wwcp::EMobilityAccountId,
    Uid => wwcp::AuthToken,
    SessionId => wwcp::ChargingSessionId,
    PartnerProductId => wwcp::ChargingProductId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_ids_keep_canonical_form() {
        let oicp = OperatorId::parse("DEGEF").unwrap();
        let generic = oicp.to_wwcp().unwrap();
        assert_eq!(generic.as_str(), "DE*GEF");
        assert_eq!(generic.to_oicp(), Some(oicp));
    }

    #[test]
    fn values_outside_the_oicp_grammar_are_absent() {
        let generic = wwcp::EvseId::parse("LOCAL").unwrap();
        assert_eq!(generic.to_oicp(), None);

        let account = wwcp::EMobilityAccountId::parse("12345").unwrap();
        assert_eq!(account.to_oicp(), None);
    }

    #[test]
    fn session_ids_round_trip() {
        let session = SessionId::new_random();
        let generic = session.to_wwcp().unwrap();
        assert_eq!(generic.to_oicp(), Some(session));
    }
}
