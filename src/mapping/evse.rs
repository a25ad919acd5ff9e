//! EVSE data and status conversions.

use chrono::Utc;

use super::enums::power_type;
use super::identifiers::{ToOicp, ToWwcp};
use super::{MapperOptions, OICP_EVSE_DATA_RECORD, WWCP_EVSE_PREFIX};
use crate::codec::Fields;
use crate::domain::identifiers::PhoneNumber;
use crate::domain::records::{EvseDataRecord, EvseDataRecordBuilder, EvseStatusRecord};
use crate::domain::types::charging_facility::{bucket, representative};
use crate::domain::types::{
    Address, ChargingFacility, ChargingFacilityClass, GeoCoordinates, I18NString, PlugType,
};
use crate::domain::version::OicpVersion;
use crate::support::custom_data::CustomValue;
use crate::support::errors::MappingError;
use crate::wwcp::{self, CurrentType, Evse, EvseStatusType, GeoLocation};

/// Converts an OICP EVSE data record into a generic EVSE.
///
/// The complete source record is kept under `OICP.EVSEDataRecord` so that a
/// later conversion back restores what the generic model cannot hold.
pub fn evse_data_record_to_wwcp(
    record: &EvseDataRecord,
    options: &MapperOptions,
    post: Option<&dyn Fn(&EvseDataRecord, Evse) -> Evse>,
) -> Result<Evse, MappingError> {
    let id = record.evse_id.to_wwcp().ok_or_else(|| MappingError::Identifier {
        what: "EvseID",
        value: record.evse_id.to_string(),
        target: "wwcp::EvseId",
    })?;
    let operator_id = record.operator_id().to_wwcp().ok_or_else(|| MappingError::Identifier {
        what: "OperatorID",
        value: record.operator_id().to_string(),
        target: "wwcp::ChargingStationOperatorId",
    })?;

    let mut evse = Evse::new(id, operator_id, options.max_history_size);
    evse.charging_station_id = record.charging_station_id.clone();
    evse.charging_pool_id = record.charging_pool_id.clone();
    evse.name = i18n_to_map(&record.charging_station_names);
    evse.description = i18n_to_map(&record.additional_info);
    evse.address = Some(address_to_wwcp(&record.address));
    evse.geo_location = Some(geo_to_wwcp(&record.geo_coordinates));
    evse.entrance_location = record.geo_charging_point_entrance.as_ref().map(geo_to_wwcp);

    if let Some(strongest) = record.charging_facilities.iter().max_by_key(|f| f.power) {
        evse.current_type = CurrentType::from(strongest.power_type);
        evse.average_voltage = strongest.voltage.map(f64::from);
        evse.max_current = strongest.amperage.map(f64::from);
        evse.max_power = Some(f64::from(strongest.power));
    }

    evse.connectors = record.plugs.iter().map(|p| wwcp::ChargingConnector::from(*p)).collect();
    evse.auth_methods = record.authentication_modes.iter().map(|m| (*m).into()).collect();
    evse.payment_methods = record.payment_options.iter().map(|p| (*p).into()).collect();
    evse.accessibility = record.accessibility.into();
    evse.hotline_phone_number = record.hotline_phone_number.as_ref().map(|p| p.to_string());
    evse.open_24_hours = record.is_open_24_hours;

    if let Some(status) = options.initial_status {
        evse.set_status(status, record.last_update.unwrap_or_else(Utc::now));
    }

    evse.custom_data = record.custom_data.clone();
    evse.custom_data.insert(
        OICP_EVSE_DATA_RECORD,
        CustomValue::Json(record.to_value(OicpVersion::V2_3)),
    );

    Ok(match post {
        Some(post) => post(record, evse),
        None => evse,
    })
}

/// Converts a generic EVSE back into an OICP EVSE data record.
///
/// Fields the generic model carries win; everything else comes from a
/// stashed `OICP.EVSEDataRecord`. Generic-only state is exported under
/// `WWCP.EVSE.*` custom-data keys.
pub fn wwcp_evse_to_evse_data_record(
    evse: &Evse,
    post: Option<&dyn Fn(&Evse, EvseDataRecord) -> EvseDataRecord>,
) -> Result<EvseDataRecord, MappingError> {
    let evse_id = evse.id.to_oicp().ok_or_else(|| MappingError::Identifier {
        what: "EVSE id",
        value: evse.id.to_string(),
        target: "EvseID",
    })?;

    let stashed = stashed_record(evse)?;
    let mut builder = match &stashed {
        Some(record) => {
            let mut builder = record.to_builder();
            builder.evse_id = evse_id;
            builder
        }
        None => EvseDataRecordBuilder::new(evse_id),
    };

    if !evse.name.is_empty() {
        builder.charging_station_names = map_to_i18n(&evse.name);
    }
    if !evse.description.is_empty() {
        builder.additional_info = map_to_i18n(&evse.description);
    }
    if evse.charging_station_id.is_some() {
        builder.charging_station_id = evse.charging_station_id.clone();
    }
    if evse.charging_pool_id.is_some() {
        builder.charging_pool_id = evse.charging_pool_id.clone();
    }
    if let Some(address) = &evse.address {
        let base = builder.address.take().unwrap_or_default();
        builder.address = Some(address_to_oicp(address, base));
    }
    if let Some(location) = &evse.geo_location {
        let format = builder.geo_coordinates.map(|g| g.format);
        let geo = GeoCoordinates::new(location.latitude, location.longitude);
        builder.geo_coordinates = Some(match format {
            Some(format) => geo.with_format(format),
            None => geo,
        });
    }
    if let Some(entrance) = &evse.entrance_location {
        builder.geo_charging_point_entrance = Some(GeoCoordinates::new(entrance.latitude, entrance.longitude));
    }
    if !evse.connectors.is_empty() {
        builder.plugs = evse.connectors.iter().map(|c| PlugType::from(*c)).collect();
    }
    if let Some(derived) = facility_of(evse) {
        let known = builder.charging_facilities.iter().any(|f| same_electrics(f, &derived));
        if !known {
            builder.charging_facilities = vec![derived];
        }
    }
    if !evse.auth_methods.is_empty() {
        builder.authentication_modes = evse.auth_methods.iter().map(|m| (*m).into()).collect();
    }
    if !evse.payment_methods.is_empty() {
        builder.payment_options = evse.payment_methods.iter().map(|p| (*p).into()).collect();
    }
    if evse.accessibility != wwcp::AccessibilityType::Unspecified {
        builder.accessibility = evse.accessibility.into();
    }
    if let Some(phone) = &evse.hotline_phone_number {
        builder.hotline_phone_number = PhoneNumber::try_parse(phone);
    }
    builder.is_open_24_hours = evse.open_24_hours;

    let mut custom_data = evse.custom_data.clone();
    custom_data.remove(OICP_EVSE_DATA_RECORD);
    custom_data.insert(
        format!("{}Status", WWCP_EVSE_PREFIX),
        evse.current_status().to_string(),
    );
    custom_data.insert(format!("{}LastChange", WWCP_EVSE_PREFIX), evse.last_change);
    if let Some(voltage) = evse.average_voltage {
        custom_data.insert(format!("{}AverageVoltage", WWCP_EVSE_PREFIX), voltage);
    }
    builder.custom_data = custom_data;

    let record = builder.to_immutable().map_err(|e| MappingError::Invalid {
        what: "EVSE data record",
        reason: e.to_string(),
    })?;

    Ok(match post {
        Some(post) => post(evse, record),
        None => record,
    })
}

/// Applies an OICP status record to a generic EVSE with the same id.
pub fn apply_evse_status_record(evse: &mut Evse, record: &EvseStatusRecord) -> Result<(), MappingError> {
    let id = record.evse_id.to_wwcp();
    if id.as_ref() != Some(&evse.id) {
        return Err(MappingError::Invalid {
            what: "EVSE status record",
            reason: format!("{} does not belong to {}", record.evse_id, evse.id),
        });
    }
    evse.set_status(EvseStatusType::from(record.status), Utc::now());
    Ok(())
}

pub fn wwcp_evse_to_evse_status_record(evse: &Evse) -> Result<EvseStatusRecord, MappingError> {
    let evse_id = evse.id.to_oicp().ok_or_else(|| MappingError::Identifier {
        what: "EVSE id",
        value: evse.id.to_string(),
        target: "EvseID",
    })?;
    Ok(EvseStatusRecord::new(evse_id, evse.current_status().into()))
}

/// Legacy facility class implied by the EVSE's electrics.
pub fn as_charging_facility_class(evse: &Evse) -> ChargingFacilityClass {
    match power_type(evse.current_type) {
        Some(power_type) => bucket(
            power_type,
            evse.average_voltage.and_then(whole),
            evse.max_current.and_then(whole),
            evse.max_power.and_then(whole),
        ),
        None => ChargingFacilityClass::Unspecified,
    }
}

/// Raises the EVSE's electrics to at least the class's representative
/// values. Values are never lowered and a conflicting current type is left
/// alone. Returns whether anything changed.
pub fn apply_charging_facility_class(evse: &mut Evse, class: ChargingFacilityClass) -> bool {
    let Some((power_type, electrics, power)) = representative(class) else {
        return false;
    };
    let current_type = CurrentType::from(power_type);
    if evse.current_type != CurrentType::Unspecified && evse.current_type != current_type {
        return false;
    }

    let mut changed = evse.current_type != current_type;
    evse.current_type = current_type;

    if let Some((voltage, amperage)) = electrics {
        changed |= raise(&mut evse.average_voltage, f64::from(voltage));
        changed |= raise(&mut evse.max_current, f64::from(amperage));
    }
    changed |= raise(&mut evse.max_power, f64::from(power));
    changed
}

fn raise(slot: &mut Option<f64>, floor: f64) -> bool {
    match slot {
        Some(current) if *current >= floor => false,
        _ => {
            *slot = Some(floor);
            true
        }
    }
}

fn whole(value: f64) -> Option<u32> {
    (value.is_finite() && value >= 0.0).then(|| value.round() as u32)
}

fn facility_of(evse: &Evse) -> Option<ChargingFacility> {
    let power_type = power_type(evse.current_type)?;
    let mut facility = ChargingFacility::new(power_type, evse.max_power.and_then(whole).unwrap_or(0));
    facility.voltage = evse.average_voltage.and_then(whole);
    facility.amperage = evse.max_current.and_then(whole);
    Some(facility)
}

fn same_electrics(a: &ChargingFacility, b: &ChargingFacility) -> bool {
    a.power_type == b.power_type && a.voltage == b.voltage && a.amperage == b.amperage && a.power == b.power
}

fn stashed_record(evse: &Evse) -> Result<Option<EvseDataRecord>, MappingError> {
    let Some(value) = evse.custom_data.get_opt::<&serde_json::Value>(OICP_EVSE_DATA_RECORD) else {
        return Ok(None);
    };
    let invalid = |e: crate::support::errors::CodecError| MappingError::Invalid {
        what: OICP_EVSE_DATA_RECORD,
        reason: e.to_string(),
    };
    let fields = Fields::new(OICP_EVSE_DATA_RECORD, value).map_err(invalid)?;
    EvseDataRecord::from_fields(fields).map(Some).map_err(invalid)
}

fn i18n_to_map(text: &I18NString) -> std::collections::BTreeMap<String, String> {
    text.iter()
        .map(|(lang, value)| (lang.to_string(), value.to_string()))
        .collect()
}

fn map_to_i18n(map: &std::collections::BTreeMap<String, String>) -> I18NString {
    map.iter()
        .fold(I18NString::new(), |text, (lang, value)| text.with(lang.as_str(), value.as_str()))
}

fn address_to_wwcp(address: &Address) -> wwcp::Address {
    wwcp::Address {
        country: address.country.clone(),
        city: address.city.clone(),
        street: address.street.clone(),
        postal_code: address.postal_code.clone(),
        house_number: address.house_num.clone(),
        floor: address.floor.clone(),
        region: address.region.clone(),
        time_zone: address.time_zone.clone(),
    }
}

/// Parking details only exist on the OICP side and survive from `base`.
fn address_to_oicp(address: &wwcp::Address, base: Address) -> Address {
    let mut oicp = Address {
        country: address.country.to_ascii_uppercase(),
        city: address.city.clone(),
        street: address.street.clone(),
        ..base
    };
    oicp.postal_code = address.postal_code.clone();
    oicp.house_num = address.house_number.clone();
    oicp.floor = address.floor.clone();
    oicp.region = address.region.clone();
    oicp.time_zone = address.time_zone.clone();
    oicp
}

fn geo_to_wwcp(geo: &GeoCoordinates) -> GeoLocation {
    GeoLocation {
        latitude: geo.latitude,
        longitude: geo.longitude,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identifiers::EvseId;
    use crate::domain::records::evse_data_record::fixtures::sample_record;
    use crate::domain::types::EvseStatus;

    fn options() -> MapperOptions {
        MapperOptions {
            initial_status: Some(EvseStatusType::Available),
            max_history_size: 5,
        }
    }

    #[test]
    fn record_to_generic_evse() {
        let record = sample_record();
        let evse = evse_data_record_to_wwcp(&record, &options(), None).unwrap();

        assert_eq!(evse.id.as_str(), "DE*GEF*E1234567*A*1");
        assert_eq!(evse.operator_id.as_str(), "DE*GEF");
        assert_eq!(evse.name.get("de").map(String::as_str), Some("Ladestation Rathaus"));
        assert_eq!(evse.current_type, CurrentType::Ac3Phase);
        assert_eq!(evse.average_voltage, Some(400.0));
        assert_eq!(evse.max_current, Some(32.0));
        assert_eq!(evse.max_power, Some(22.0));
        assert_eq!(evse.current_status(), EvseStatusType::Available);
        assert!(evse.custom_data.contains(OICP_EVSE_DATA_RECORD));
    }

    #[test]
    fn round_trip_restores_oicp_only_fields() {
        let mut record = sample_record();
        record.hardware_manufacturer = Some("ACME".into());
        record.clearinghouse_id = Some("DE*CLH".into());

        let evse = evse_data_record_to_wwcp(&record, &options(), None).unwrap();
        let back = wwcp_evse_to_evse_data_record(&evse, None).unwrap();

        assert_eq!(back.to_value(OicpVersion::V2_3), record.to_value(OicpVersion::V2_3));
        assert!(!back.custom_data.contains(OICP_EVSE_DATA_RECORD));
        assert_eq!(back.custom_data.get::<&str>("WWCP.EVSE.Status").unwrap(), "Available");
    }

    #[test]
    fn generic_changes_win_over_the_stash() {
        let record = sample_record();
        let mut evse = evse_data_record_to_wwcp(&record, &options(), None).unwrap();
        evse.max_current = Some(16.0);
        evse.max_power = Some(11.0);
        evse.open_24_hours = false;

        let back = wwcp_evse_to_evse_data_record(&evse, None).unwrap();
        assert_eq!(back.charging_facilities.len(), 1);
        assert_eq!(back.charging_facilities[0].amperage, Some(16));
        assert_eq!(back.charging_facilities[0].class(), ChargingFacilityClass::Ac3Phase380To480VUpTo16A);
        assert!(!back.is_open_24_hours);
        assert_eq!(back.hardware_manufacturer, record.hardware_manufacturer);
    }

    #[test]
    fn evse_without_location_cannot_become_a_record() {
        let evse = Evse::new(
            wwcp::EvseId::parse("DE*GEF*E9").unwrap(),
            wwcp::ChargingStationOperatorId::parse("DE*GEF").unwrap(),
            3,
        );
        let err = wwcp_evse_to_evse_data_record(&evse, None).unwrap_err();
        assert!(err.to_string().contains("Address"));
    }

    #[test]
    fn post_processing_delegates_run_last() {
        let record = sample_record();
        let rename = |_: &EvseDataRecord, mut evse: Evse| {
            evse.charging_station_id = Some("STATION-1".into());
            evse
        };
        let evse = evse_data_record_to_wwcp(&record, &options(), Some(&rename)).unwrap();
        assert_eq!(evse.charging_station_id.as_deref(), Some("STATION-1"));
    }

    #[test]
    fn facility_class_from_electrics() {
        let evse = Evse::new(
            wwcp::EvseId::parse("DE*GEF*E1").unwrap(),
            wwcp::ChargingStationOperatorId::parse("DE*GEF").unwrap(),
            1,
        )
        .with_electrics(CurrentType::Ac3Phase, 400.0, 32.0);
        assert_eq!(as_charging_facility_class(&evse), ChargingFacilityClass::Ac3Phase380To480VUpTo32A);

        let dc = evse.clone().with_electrics(CurrentType::Dc, 800.0, 125.0).with_max_power(100.0);
        assert_eq!(as_charging_facility_class(&dc), ChargingFacilityClass::DcOver50kW);

        let mut unknown = evse;
        unknown.current_type = CurrentType::Unspecified;
        assert_eq!(as_charging_facility_class(&unknown), ChargingFacilityClass::Unspecified);
    }

    #[test]
    fn applying_a_class_only_raises() {
        let mut evse = Evse::new(
            wwcp::EvseId::parse("DE*GEF*E1").unwrap(),
            wwcp::ChargingStationOperatorId::parse("DE*GEF").unwrap(),
            1,
        )
        .with_electrics(CurrentType::Ac3Phase, 400.0, 16.0)
        .with_max_power(11.0);

        assert!(apply_charging_facility_class(&mut evse, ChargingFacilityClass::Ac3Phase380To480VUpTo32A));
        assert_eq!(evse.max_current, Some(32.0));
        assert_eq!(evse.max_power, Some(22.0));

        assert!(!apply_charging_facility_class(&mut evse, ChargingFacilityClass::Ac3Phase380To480VUpTo16A));
        assert_eq!(evse.max_current, Some(32.0));

        assert!(!apply_charging_facility_class(&mut evse, ChargingFacilityClass::DcOver50kW));
        assert_eq!(evse.current_type, CurrentType::Ac3Phase);
        assert_eq!(as_charging_facility_class(&evse), ChargingFacilityClass::Ac3Phase380To480VUpTo32A);
    }

    #[test]
    fn applying_a_class_to_a_bare_evse_sets_its_electrics() {
        let mut evse = Evse::new(
            wwcp::EvseId::parse("DE*GEF*E2").unwrap(),
            wwcp::ChargingStationOperatorId::parse("DE*GEF").unwrap(),
            1,
        );
        assert_eq!(evse.current_type, CurrentType::Unspecified);
        assert_eq!((evse.average_voltage, evse.max_current), (None, None));

        assert!(apply_charging_facility_class(&mut evse, ChargingFacilityClass::Ac3Phase380To480VUpTo32A));

        assert_eq!(evse.current_type, CurrentType::Ac3Phase);
        assert!(evse.average_voltage.unwrap() >= 400.0);
        assert!(evse.max_current.unwrap() >= 32.0);
        assert_eq!(as_charging_facility_class(&evse), ChargingFacilityClass::Ac3Phase380To480VUpTo32A);
    }

    #[test]
    fn status_records_both_ways() {
        let record = sample_record();
        let mut evse = evse_data_record_to_wwcp(&record, &MapperOptions::default(), None).unwrap();
        assert_eq!(evse.current_status(), EvseStatusType::Unspecified);

        let status = EvseStatusRecord::new(record.evse_id.clone(), EvseStatus::Occupied);
        apply_evse_status_record(&mut evse, &status).unwrap();
        assert_eq!(evse.current_status(), EvseStatusType::Charging);
        assert_eq!(wwcp_evse_to_evse_status_record(&evse).unwrap(), status);

        let foreign = EvseStatusRecord::new(EvseId::parse("DE*ABC*E1").unwrap(), EvseStatus::Available);
        assert!(apply_evse_status_record(&mut evse, &foreign).is_err());
    }
}
