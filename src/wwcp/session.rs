//! Authorization and charging session types of the generic charging model

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::ids::{
    AuthToken, ChargingProductId, ChargingSessionId, ChargingStationOperatorId,
    EMobilityAccountId, EMobilityProviderId, EvseId,
};
use crate::support::custom_data::CustomData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinCrypto {
    None,
    Hashed { function: Option<String> },
}

/// How a driver identified at the EVSE or towards the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthIdentification {
    AuthToken(AuthToken),
    QrCodePin {
        account: EMobilityAccountId,
        pin: String,
        crypto: PinCrypto,
    },
    PlugAndCharge(EMobilityAccountId),
    RemoteIdentification(EMobilityAccountId),
}

impl AuthIdentification {
    pub fn account(&self) -> Option<&EMobilityAccountId> {
        match self {
            Self::AuthToken(_) => None,
            Self::QrCodePin { account, .. }
            | Self::PlugAndCharge(account)
            | Self::RemoteIdentification(account) => Some(account),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthStartResultType {
    Authorized,
    NotAuthorized,
    InvalidToken,
    InvalidSessionId,
    Blocked,
    CommunicationTimeout,
    Error,
    Unspecified,
}

impl Default for AuthStartResultType {
    fn default() -> Self {
        Self::Unspecified
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthStartResult {
    pub result: AuthStartResultType,
    pub session_id: Option<ChargingSessionId>,
    pub provider_id: Option<EMobilityProviderId>,
    pub description: Option<String>,
    pub additional_info: Option<String>,
    /// Tokens allowed to stop the session besides the starting one.
    pub stop_identifications: Vec<AuthIdentification>,
    pub runtime: Option<Duration>,
}

impl AuthStartResult {
    pub fn new(result: AuthStartResultType) -> Self {
        Self {
            result,
            session_id: None,
            provider_id: None,
            description: None,
            additional_info: None,
            stop_identifications: Vec::new(),
            runtime: None,
        }
    }

    pub fn is_authorized(&self) -> bool {
        self.result == AuthStartResultType::Authorized
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthStopResultType {
    Authorized,
    NotAuthorized,
    InvalidSessionId,
    CommunicationTimeout,
    Error,
    Unspecified,
}

impl Default for AuthStopResultType {
    fn default() -> Self {
        Self::Unspecified
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthStopResult {
    pub result: AuthStopResultType,
    pub session_id: Option<ChargingSessionId>,
    pub provider_id: Option<EMobilityProviderId>,
    pub description: Option<String>,
    pub additional_info: Option<String>,
    pub runtime: Option<Duration>,
}

impl AuthStopResult {
    pub fn new(result: AuthStopResultType) -> Self {
        Self {
            result,
            session_id: None,
            provider_id: None,
            description: None,
            additional_info: None,
            runtime: None,
        }
    }

    pub fn is_authorized(&self) -> bool {
        self.result == AuthStopResultType::Authorized
    }
}

/// A completed charging session as the generic model stores it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeDetailRecord {
    pub session_id: ChargingSessionId,
    pub evse_id: EvseId,
    pub operator_id: Option<ChargingStationOperatorId>,
    pub provider_id: Option<EMobilityProviderId>,
    pub product_id: Option<ChargingProductId>,
    pub authentication: AuthIdentification,
    pub session_start: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
    pub charging_start: Option<DateTime<Utc>>,
    pub charging_end: Option<DateTime<Utc>>,
    /// kWh readings in chronological order, start and end included.
    pub energy_meter_values: Vec<Decimal>,
    /// kWh
    pub consumed_energy: Decimal,
    pub metering_signature: Option<String>,
    pub custom_data: CustomData,
}

impl ChargeDetailRecord {
    pub fn duration(&self) -> chrono::Duration {
        self.session_end - self.session_start
    }
}
