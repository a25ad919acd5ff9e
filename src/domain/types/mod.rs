//! Protocol enumerations and value types

pub mod address;
pub mod charging_facility;
pub mod enums;
pub mod geo;
pub mod i18n;
pub mod identification;
pub mod schedule;
pub mod status_code;

pub use address::Address;
pub use charging_facility::ChargingFacility;
pub use enums::*;
pub use geo::GeoCoordinates;
pub use i18n::I18NString;
pub use identification::{Identification, Pin, RfidIdentification};
pub use schedule::{Period, Schedule};
pub use status_code::{StatusCode, StatusCodes};
