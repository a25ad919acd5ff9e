use serde_json::Value;

use crate::codec::accessors::{Fields, Obj};
use crate::support::errors::CodecError;

/// Postal address of a charging station.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Address {
    /// ISO 3166 alpha-2 or alpha-3 country code, upper-case
    pub country: String,
    pub city: String,
    pub street: String,
    pub postal_code: Option<String>,
    pub house_num: Option<String>,
    pub floor: Option<String>,
    pub region: Option<String>,
    pub parking_facility: Option<bool>,
    pub parking_spot: Option<String>,
    pub time_zone: Option<String>,
}

impl Address {
    pub fn new(country: impl Into<String>, city: impl Into<String>, street: impl Into<String>) -> Self {
        Self {
            country: country.into().to_ascii_uppercase(),
            city: city.into(),
            street: street.into(),
            ..Self::default()
        }
    }

    pub(crate) fn to_value(&self) -> Value {
        Obj::new()
            .text("Country", &self.country)
            .text("City", &self.city)
            .text("Street", &self.street)
            .opt_text("PostalCode", self.postal_code.as_deref())
            .opt_text("HouseNum", self.house_num.as_deref())
            .opt_text("Floor", self.floor.as_deref())
            .opt_text("Region", self.region.as_deref())
            .opt_boolean("ParkingFacility", self.parking_facility)
            .opt_text("ParkingSpot", self.parking_spot.as_deref())
            .opt_text("TimeZone", self.time_zone.as_deref())
            .build()
    }

    pub(crate) fn from_fields(f: Fields<'_>) -> Result<Self, CodecError> {
        let country = f.required_str("Country")?.to_ascii_uppercase();
        if !(2..=3).contains(&country.len()) || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CodecError::invalid("Address", "Country", format!("'{}' is not a country code", country)));
        }

        Ok(Self {
            country,
            city: f.required_str("City")?,
            street: f.required_str("Street")?,
            postal_code: f.optional_str("PostalCode")?,
            house_num: f.optional_str("HouseNum")?,
            floor: f.optional_str("Floor")?,
            region: f.optional_str("Region")?,
            parking_facility: f.optional_bool("ParkingFacility")?,
            parking_spot: f.optional_str("ParkingSpot")?,
            time_zone: f.optional_str("TimeZone")?,
        })
    }
}
