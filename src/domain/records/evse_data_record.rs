//! Static EVSE data as pushed by CPOs and pulled by EMPs.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::codec::accessors::{Fields, Obj};
use crate::domain::identifiers::{EvseId, OperatorId, PhoneNumber};
use crate::domain::types::{
    Accessibility, AccessibilityLocation, Address, AuthenticationMode,
    CalibrationLawDataAvailability, ChargingFacility, DynamicInfoAvailable, GeoCoordinates,
    I18NString, PaymentOption, PlugType, Schedule, ValueAddedService,
};
use crate::domain::version::OicpVersion;
use crate::support::custom_data::CustomData;
use crate::support::errors::{BuilderError, CodecError};

#[derive(Debug, Clone, PartialEq)]
pub struct EvseDataRecord {
    pub evse_id: EvseId,
    pub charging_pool_id: Option<String>,
    pub charging_station_id: Option<String>,
    pub charging_station_names: I18NString,
    pub hardware_manufacturer: Option<String>,
    pub charging_station_image: Option<String>,
    pub sub_operator_name: Option<String>,
    pub address: Address,
    pub geo_coordinates: GeoCoordinates,
    pub plugs: Vec<PlugType>,
    pub dynamic_power_level: Option<bool>,
    pub charging_facilities: Vec<ChargingFacility>,
    pub renewable_energy: bool,
    pub calibration_law_data_availability: CalibrationLawDataAvailability,
    pub authentication_modes: Vec<AuthenticationMode>,
    pub max_capacity: Option<u32>,
    pub payment_options: Vec<PaymentOption>,
    pub value_added_services: Vec<ValueAddedService>,
    pub accessibility: Accessibility,
    pub accessibility_location: Option<AccessibilityLocation>,
    pub hotline_phone_number: Option<PhoneNumber>,
    pub additional_info: I18NString,
    pub geo_charging_point_entrance: Option<GeoCoordinates>,
    pub is_open_24_hours: bool,
    pub opening_times: Vec<Schedule>,
    pub hub_operator_id: Option<OperatorId>,
    pub clearinghouse_id: Option<String>,
    pub is_hubject_compatible: bool,
    pub dynamic_info_available: DynamicInfoAvailable,
    pub last_update: Option<DateTime<Utc>>,
    pub custom_data: CustomData,
}

impl EvseDataRecord {
    pub fn builder(evse_id: EvseId) -> EvseDataRecordBuilder {
        EvseDataRecordBuilder::new(evse_id)
    }

    pub fn to_builder(&self) -> EvseDataRecordBuilder {
        EvseDataRecordBuilder::from(self)
    }

    pub fn operator_id(&self) -> &OperatorId {
        self.evse_id.operator_id()
    }

    /// OICP 2.0 and 2.1 carry facility class tokens instead of objects.
    pub(crate) fn to_value(&self, version: OicpVersion) -> Value {
        let facilities: Vec<Value> = if version < OicpVersion::V2_2 {
            self.charging_facilities
                .iter()
                .map(|f| Value::String(f.class().as_wire().to_string()))
                .collect()
        } else {
            self.charging_facilities.iter().map(|f| f.to_value()).collect()
        };

        Obj::new()
            .text("EvseID", &self.evse_id)
            .opt_text("ChargingPoolID", self.charging_pool_id.as_deref())
            .opt_text("ChargingStationID", self.charging_station_id.as_deref())
            .list("ChargingStationNames", self.charging_station_names.to_values())
            .opt_text("HardwareManufacturer", self.hardware_manufacturer.as_deref())
            .opt_text("ChargingStationImage", self.charging_station_image.as_deref())
            .opt_text("SubOperatorName", self.sub_operator_name.as_deref())
            .value("Address", self.address.to_value())
            .value("GeoCoordinates", self.geo_coordinates.to_value())
            .text_list("Plugs", &self.plugs)
            .opt_boolean("DynamicPowerLevel", self.dynamic_power_level)
            .list("ChargingFacilities", facilities)
            .boolean("RenewableEnergy", self.renewable_energy)
            .text("CalibrationLawDataAvailability", self.calibration_law_data_availability)
            .text_list("AuthenticationModes", &self.authentication_modes)
            .opt_number("MaxCapacity", self.max_capacity)
            .text_list("PaymentOptions", &self.payment_options)
            .text_list("ValueAddedServices", &self.value_added_services)
            .text("Accessibility", self.accessibility)
            .opt_text("AccessibilityLocation", self.accessibility_location)
            .opt_text("HotlinePhoneNumber", self.hotline_phone_number.as_ref())
            .list("AdditionalInfo", self.additional_info.to_values())
            .opt_value(
                "GeoChargingPointEntrance",
                self.geo_charging_point_entrance.map(|g| g.to_value()),
            )
            .boolean("IsOpen24Hours", self.is_open_24_hours)
            .list("OpeningTimes", self.opening_times.iter().map(|s| s.to_value("Period")))
            .opt_text("HubOperatorID", self.hub_operator_id.as_ref())
            .opt_text("ClearinghouseID", self.clearinghouse_id.as_deref())
            .boolean("IsHubjectCompatible", self.is_hubject_compatible)
            .text("DynamicInfoAvailable", self.dynamic_info_available)
            .opt_timestamp("lastUpdate", self.last_update.as_ref())
            .build()
    }

    pub(crate) fn from_fields(f: Fields<'_>) -> Result<Self, CodecError> {
        let mut charging_facilities = Vec::new();
        for item in f.list("ChargingFacilities") {
            if let Some(facility) = ChargingFacility::from_wire(item)? {
                charging_facilities.push(facility);
            }
        }

        Ok(Self {
            evse_id: f.required("EvseID")?,
            charging_pool_id: f.optional_str("ChargingPoolID")?,
            charging_station_id: f.optional_str("ChargingStationID")?,
            charging_station_names: I18NString::from_list(&f, "ChargingStationNames")?,
            hardware_manufacturer: f.optional_str("HardwareManufacturer")?,
            charging_station_image: f.optional_str("ChargingStationImage")?,
            sub_operator_name: f.optional_str("SubOperatorName")?,
            address: Address::from_fields(f.required_object("Address")?)?,
            geo_coordinates: GeoCoordinates::from_fields(f.required_object("GeoCoordinates")?)?,
            plugs: f.lenient_list_of("Plugs"),
            dynamic_power_level: f.optional_bool("DynamicPowerLevel")?,
            charging_facilities,
            renewable_energy: f.optional_bool("RenewableEnergy")?.unwrap_or(false),
            calibration_law_data_availability: f
                .lenient("CalibrationLawDataAvailability")
                .unwrap_or(CalibrationLawDataAvailability::NotAvailable),
            authentication_modes: f.lenient_list_of("AuthenticationModes"),
            max_capacity: f.optional("MaxCapacity")?,
            payment_options: f.lenient_list_of("PaymentOptions"),
            value_added_services: f.lenient_list_of("ValueAddedServices"),
            accessibility: f
                .lenient("Accessibility")
                .unwrap_or(Accessibility::Unspecified),
            accessibility_location: f.lenient("AccessibilityLocation"),
            hotline_phone_number: f.lenient("HotlinePhoneNumber"),
            additional_info: I18NString::from_list(&f, "AdditionalInfo")?,
            geo_charging_point_entrance: f
                .optional_object("GeoChargingPointEntrance")?
                .map(GeoCoordinates::from_fields)
                .transpose()?,
            is_open_24_hours: f.optional_bool("IsOpen24Hours")?.unwrap_or(false),
            opening_times: f.objects("OpeningTimes", |o| Schedule::from_fields(o, "Period"))?,
            hub_operator_id: f.optional("HubOperatorID")?,
            clearinghouse_id: f.optional_str("ClearinghouseID")?,
            is_hubject_compatible: f.optional_bool("IsHubjectCompatible")?.unwrap_or(true),
            dynamic_info_available: f
                .lenient("DynamicInfoAvailable")
                .unwrap_or(DynamicInfoAvailable::Auto),
            last_update: f.optional("lastUpdate")?,
            custom_data: CustomData::new(),
        })
    }
}

/// Mutable staging copy of an [`EvseDataRecord`].
#[derive(Debug, Clone)]
pub struct EvseDataRecordBuilder {
    pub evse_id: EvseId,
    pub charging_pool_id: Option<String>,
    pub charging_station_id: Option<String>,
    pub charging_station_names: I18NString,
    pub hardware_manufacturer: Option<String>,
    pub charging_station_image: Option<String>,
    pub sub_operator_name: Option<String>,
    pub address: Option<Address>,
    pub geo_coordinates: Option<GeoCoordinates>,
    pub plugs: Vec<PlugType>,
    pub dynamic_power_level: Option<bool>,
    pub charging_facilities: Vec<ChargingFacility>,
    pub renewable_energy: bool,
    pub calibration_law_data_availability: CalibrationLawDataAvailability,
    pub authentication_modes: Vec<AuthenticationMode>,
    pub max_capacity: Option<u32>,
    pub payment_options: Vec<PaymentOption>,
    pub value_added_services: Vec<ValueAddedService>,
    pub accessibility: Accessibility,
    pub accessibility_location: Option<AccessibilityLocation>,
    pub hotline_phone_number: Option<PhoneNumber>,
    pub additional_info: I18NString,
    pub geo_charging_point_entrance: Option<GeoCoordinates>,
    pub is_open_24_hours: bool,
    pub opening_times: Vec<Schedule>,
    pub hub_operator_id: Option<OperatorId>,
    pub clearinghouse_id: Option<String>,
    pub is_hubject_compatible: bool,
    pub dynamic_info_available: DynamicInfoAvailable,
    pub last_update: Option<DateTime<Utc>>,
    pub custom_data: CustomData,
}

impl EvseDataRecordBuilder {
    pub fn new(evse_id: EvseId) -> Self {
        Self {
            evse_id,
            charging_pool_id: None,
            charging_station_id: None,
            charging_station_names: I18NString::new(),
            hardware_manufacturer: None,
            charging_station_image: None,
            sub_operator_name: None,
            address: None,
            geo_coordinates: None,
            plugs: Vec::new(),
            dynamic_power_level: None,
            charging_facilities: Vec::new(),
            renewable_energy: false,
            calibration_law_data_availability: CalibrationLawDataAvailability::NotAvailable,
            authentication_modes: Vec::new(),
            max_capacity: None,
            payment_options: Vec::new(),
            value_added_services: Vec::new(),
            accessibility: Accessibility::Unspecified,
            accessibility_location: None,
            hotline_phone_number: None,
            additional_info: I18NString::new(),
            geo_charging_point_entrance: None,
            is_open_24_hours: false,
            opening_times: Vec::new(),
            hub_operator_id: None,
            clearinghouse_id: None,
            is_hubject_compatible: true,
            dynamic_info_available: DynamicInfoAvailable::Auto,
            last_update: None,
            custom_data: CustomData::new(),
        }
    }

    pub fn address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    pub fn geo_coordinates(mut self, geo: GeoCoordinates) -> Self {
        self.geo_coordinates = Some(geo);
        self
    }

    pub fn name(mut self, lang: &str, text: &str) -> Self {
        self.charging_station_names.push(lang, text);
        self
    }

    pub fn plug(mut self, plug: PlugType) -> Self {
        self.plugs.push(plug);
        self
    }

    pub fn charging_facility(mut self, facility: ChargingFacility) -> Self {
        self.charging_facilities.push(facility);
        self
    }

    pub fn authentication_mode(mut self, mode: AuthenticationMode) -> Self {
        self.authentication_modes.push(mode);
        self
    }

    pub fn accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn hotline(mut self, phone: PhoneNumber) -> Self {
        self.hotline_phone_number = Some(phone);
        self
    }

    pub fn open_24_hours(mut self, open: bool) -> Self {
        self.is_open_24_hours = open;
        self
    }

    pub fn to_immutable(self) -> Result<EvseDataRecord, BuilderError> {
        let missing = |field| BuilderError {
            builder: "EvseDataRecordBuilder",
            field,
        };

        Ok(EvseDataRecord {
            address: self.address.ok_or_else(|| missing("Address"))?,
            geo_coordinates: self.geo_coordinates.ok_or_else(|| missing("GeoCoordinates"))?,
            evse_id: self.evse_id,
            charging_pool_id: self.charging_pool_id,
            charging_station_id: self.charging_station_id,
            charging_station_names: self.charging_station_names,
            hardware_manufacturer: self.hardware_manufacturer,
            charging_station_image: self.charging_station_image,
            sub_operator_name: self.sub_operator_name,
            plugs: self.plugs,
            dynamic_power_level: self.dynamic_power_level,
            charging_facilities: self.charging_facilities,
            renewable_energy: self.renewable_energy,
            calibration_law_data_availability: self.calibration_law_data_availability,
            authentication_modes: self.authentication_modes,
            max_capacity: self.max_capacity,
            payment_options: self.payment_options,
            value_added_services: self.value_added_services,
            accessibility: self.accessibility,
            accessibility_location: self.accessibility_location,
            hotline_phone_number: self.hotline_phone_number,
            additional_info: self.additional_info,
            geo_charging_point_entrance: self.geo_charging_point_entrance,
            is_open_24_hours: self.is_open_24_hours,
            opening_times: self.opening_times,
            hub_operator_id: self.hub_operator_id,
            clearinghouse_id: self.clearinghouse_id,
            is_hubject_compatible: self.is_hubject_compatible,
            dynamic_info_available: self.dynamic_info_available,
            last_update: self.last_update,
            custom_data: self.custom_data,
        })
    }
}

impl From<&EvseDataRecord> for EvseDataRecordBuilder {
    fn from(r: &EvseDataRecord) -> Self {
        let r = r.clone();
        Self {
            evse_id: r.evse_id,
            charging_pool_id: r.charging_pool_id,
            charging_station_id: r.charging_station_id,
            charging_station_names: r.charging_station_names,
            hardware_manufacturer: r.hardware_manufacturer,
            charging_station_image: r.charging_station_image,
            sub_operator_name: r.sub_operator_name,
            address: Some(r.address),
            geo_coordinates: Some(r.geo_coordinates),
            plugs: r.plugs,
            dynamic_power_level: r.dynamic_power_level,
            charging_facilities: r.charging_facilities,
            renewable_energy: r.renewable_energy,
            calibration_law_data_availability: r.calibration_law_data_availability,
            authentication_modes: r.authentication_modes,
            max_capacity: r.max_capacity,
            payment_options: r.payment_options,
            value_added_services: r.value_added_services,
            accessibility: r.accessibility,
            accessibility_location: r.accessibility_location,
            hotline_phone_number: r.hotline_phone_number,
            additional_info: r.additional_info,
            geo_charging_point_entrance: r.geo_charging_point_entrance,
            is_open_24_hours: r.is_open_24_hours,
            opening_times: r.opening_times,
            hub_operator_id: r.hub_operator_id,
            clearinghouse_id: r.clearinghouse_id,
            is_hubject_compatible: r.is_hubject_compatible,
            dynamic_info_available: r.dynamic_info_available,
            last_update: r.last_update,
            custom_data: r.custom_data,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::domain::types::PowerType;

    pub fn sample_record() -> EvseDataRecord {
        EvseDataRecord::builder(EvseId::parse("DE*GEF*E1234567*A*1").unwrap())
            .name("de", "Ladestation Rathaus")
            .address(Address::new("DEU", "Jena", "Markt"))
            .geo_coordinates(GeoCoordinates::new(50.927, 11.586))
            .plug(PlugType::Type2Outlet)
            .charging_facility(ChargingFacility::new(PowerType::Ac3Phase, 22).with_electrics(400, 32))
            .authentication_mode(AuthenticationMode::NfcRfidClassic)
            .accessibility(Accessibility::FreePubliclyAccessible)
            .hotline(PhoneNumber::parse("+4936412345").unwrap())
            .open_24_hours(true)
            .to_immutable()
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::sample_record;
    use super::*;

    #[test]
    fn round_trip_current_and_legacy() {
        let record = sample_record();
        let body = record.to_value(OicpVersion::V2_3);
        let parsed = EvseDataRecord::from_fields(Fields::new("EvseDataRecord", &body).unwrap()).unwrap();
        assert_eq!(parsed, record);

        let legacy = record.to_value(OicpVersion::V2_1);
        assert_eq!(legacy["ChargingFacilities"][0], "380 - 480V, 3-Phase ≤32A");
        let parsed = EvseDataRecord::from_fields(Fields::new("EvseDataRecord", &legacy).unwrap()).unwrap();
        assert_eq!(parsed.charging_facilities[0].class(), record.charging_facilities[0].class());
    }

    #[test]
    fn builder_requires_address() {
        let err = EvseDataRecord::builder(EvseId::parse("DE*GEF*E1").unwrap())
            .geo_coordinates(GeoCoordinates::new(0.0, 0.0))
            .to_immutable()
            .unwrap_err();
        assert_eq!(err.field, "Address");
    }

    #[test]
    fn unknown_plug_tokens_are_tolerated() {
        let mut body = sample_record().to_value(OicpVersion::V2_3);
        body["Plugs"] = serde_json::json!(["Type 2 Outlet", "Flux Capacitor"]);
        let parsed = EvseDataRecord::from_fields(Fields::new("EvseDataRecord", &body).unwrap()).unwrap();
        assert_eq!(parsed.plugs, vec![PlugType::Type2Outlet, PlugType::Unspecified]);
    }
}
