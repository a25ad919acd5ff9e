//! Generic charging-network model (WWCP)
//!
//! The surface of the vendor-neutral model that OICP data is mapped into.
//! Lifecycle and persistence of these entities belong to the host.

pub mod evse;
pub mod ids;
pub mod session;

pub use evse::{
    AccessibilityType, Address, AuthMethod, ChargingConnector, CurrentType, Evse, EvseStatusType,
    GeoLocation, PaymentMethod, SocketType, StatusSchedule, Timestamped,
};
pub use ids::{
    AuthToken, ChargingProductId, ChargingSessionId, ChargingStationOperatorId,
    EMobilityAccountId, EMobilityProviderId, EvseId,
};
pub use session::{
    AuthIdentification, AuthStartResult, AuthStartResultType, AuthStopResult,
    AuthStopResultType, ChargeDetailRecord, PinCrypto,
};
