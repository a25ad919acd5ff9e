//! EVSE entity of the generic charging model

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};

use super::ids::{ChargingStationOperatorId, EvseId};
use crate::support::custom_data::CustomData;

/// Operational status of an EVSE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvseStatusType {
    Available,
    Reserved,
    Charging,
    OutOfService,
    Offline,
    Error,
    UnknownEvse,
    Unspecified,
}

impl Default for EvseStatusType {
    fn default() -> Self {
        Self::Unspecified
    }
}

impl std::fmt::Display for EvseStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "Available"),
            Self::Reserved => write!(f, "Reserved"),
            Self::Charging => write!(f, "Charging"),
            Self::OutOfService => write!(f, "OutOfService"),
            Self::Offline => write!(f, "Offline"),
            Self::Error => write!(f, "Error"),
            Self::UnknownEvse => write!(f, "UnknownEVSE"),
            Self::Unspecified => write!(f, "Unspecified"),
        }
    }
}

/// A value with the instant it became effective.
#[derive(Debug, Clone, PartialEq)]
pub struct Timestamped<T> {
    pub timestamp: DateTime<Utc>,
    pub value: T,
}

/// Bounded status history, newest entry first.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSchedule {
    max_size: usize,
    entries: VecDeque<Timestamped<EvseStatusType>>,
}

impl StatusSchedule {
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size: max_size.max(1),
            entries: VecDeque::new(),
        }
    }

    /// Records a status; entries beyond the history size are dropped.
    /// An out-of-order timestamp is inserted at its sorted position.
    pub fn insert(&mut self, value: EvseStatusType, timestamp: DateTime<Utc>) {
        let position = self
            .entries
            .iter()
            .position(|e| e.timestamp <= timestamp)
            .unwrap_or(self.entries.len());
        self.entries.insert(position, Timestamped { timestamp, value });
        self.entries.truncate(self.max_size);
    }

    pub fn current(&self) -> Option<&Timestamped<EvseStatusType>> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Timestamped<EvseStatusType>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurrentType {
    Ac1Phase,
    Ac3Phase,
    Dc,
    Unspecified,
}

impl Default for CurrentType {
    fn default() -> Self {
        Self::Unspecified
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketType {
    Type1,
    Type2,
    Type3,
    Schuko,
    FrenchStandard,
    BritishStandard,
    SwissStandard,
    Nema5_20,
    Iec60309SinglePhase,
    Iec60309ThreePhase,
    Ccs1,
    Ccs2,
    Chademo,
    Tesla,
    Avcon,
    SmallPaddleInductive,
    LargePaddleInductive,
    Unspecified,
}

/// One outlet or attached cable of an EVSE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargingConnector {
    pub socket: SocketType,
    pub cable_attached: bool,
}

impl ChargingConnector {
    pub fn new(socket: SocketType, cable_attached: bool) -> Self {
        Self {
            socket,
            cable_attached,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMethod {
    RfidMifareClassic,
    RfidMifareDesfire,
    PlugAndCharge,
    Remote,
    DirectPayment,
    NoAuthentication,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    Free,
    Direct,
    Contract,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessibilityType {
    FreePublic,
    Restricted,
    PayingPublic,
    TestStation,
    Unspecified,
}

impl Default for AccessibilityType {
    fn default() -> Self {
        Self::Unspecified
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    /// ISO 3166 alpha-3
    pub country: String,
    pub city: String,
    pub street: String,
    pub postal_code: Option<String>,
    pub house_number: Option<String>,
    pub floor: Option<String>,
    pub region: Option<String>,
    pub time_zone: Option<String>,
}

/// EVSE entity
#[derive(Debug, Clone, PartialEq)]
pub struct Evse {
    pub id: EvseId,
    pub operator_id: ChargingStationOperatorId,
    pub charging_station_id: Option<String>,
    pub charging_pool_id: Option<String>,
    /// Language code -> name
    pub name: BTreeMap<String, String>,
    /// Language code -> free text
    pub description: BTreeMap<String, String>,
    pub address: Option<Address>,
    pub geo_location: Option<GeoLocation>,
    pub entrance_location: Option<GeoLocation>,
    pub current_type: CurrentType,
    /// Volts
    pub average_voltage: Option<f64>,
    /// Amperes
    pub max_current: Option<f64>,
    /// Kilowatts
    pub max_power: Option<f64>,
    pub connectors: Vec<ChargingConnector>,
    pub auth_methods: Vec<AuthMethod>,
    pub payment_methods: Vec<PaymentMethod>,
    pub accessibility: AccessibilityType,
    pub hotline_phone_number: Option<String>,
    pub open_24_hours: bool,
    pub status: StatusSchedule,
    pub last_change: DateTime<Utc>,
    pub custom_data: CustomData,
}

impl Evse {
    pub fn new(id: EvseId, operator_id: ChargingStationOperatorId, max_history_size: usize) -> Self {
        Self {
            id,
            operator_id,
            charging_station_id: None,
            charging_pool_id: None,
            name: BTreeMap::new(),
            description: BTreeMap::new(),
            address: None,
            geo_location: None,
            entrance_location: None,
            current_type: CurrentType::default(),
            average_voltage: None,
            max_current: None,
            max_power: None,
            connectors: Vec::new(),
            auth_methods: Vec::new(),
            payment_methods: Vec::new(),
            accessibility: AccessibilityType::default(),
            hotline_phone_number: None,
            open_24_hours: false,
            status: StatusSchedule::new(max_history_size),
            last_change: Utc::now(),
            custom_data: CustomData::new(),
        }
    }

    /// Current status, `Unspecified` before the first update.
    pub fn current_status(&self) -> EvseStatusType {
        self.status.current().map(|s| s.value).unwrap_or_default()
    }

    /// Record a status change.
    pub fn set_status(&mut self, status: EvseStatusType, timestamp: DateTime<Utc>) {
        self.status.insert(status, timestamp);
        self.last_change = Utc::now();
    }

    pub fn with_electrics(mut self, current_type: CurrentType, voltage: f64, current: f64) -> Self {
        self.current_type = current_type;
        self.average_voltage = Some(voltage);
        self.max_current = Some(current);
        self
    }

    pub fn with_max_power(mut self, kw: f64) -> Self {
        self.max_power = Some(kw);
        self
    }

    pub fn with_connector(mut self, connector: ChargingConnector) -> Self {
        self.connectors.push(connector);
        self
    }
}
