//! Authorization and charge detail record conversions.

use rust_decimal::Decimal;

use super::enums::{auth_start_result_type, auth_stop_result_type};
use super::identifiers::{ToOicp, ToWwcp};
use super::OICP_CHARGE_DETAIL_RECORD;
use crate::codec::Fields;
use crate::domain::identifiers::EvseId;
use crate::domain::records::{ChargeDetailRecord, ChargeDetailRecordBuilder};
use crate::domain::types::{Identification, Pin};
use crate::messages::{AuthorizationStart, AuthorizationStop};
use crate::support::custom_data::CustomValue;
use crate::support::errors::{CodecError, MappingError};
use crate::wwcp::{self, AuthIdentification, AuthStartResult, AuthStopResult, PinCrypto};

/// `None` when an identifier does not fit the generic grammar.
///
/// RFID details beyond the UID (card type, printed number, expiry) have
/// no generic counterpart and are dropped.
pub fn identification_to_wwcp(identification: &Identification) -> Option<AuthIdentification> {
    Some(match identification {
        Identification::RfidMifareFamily { uid } => AuthIdentification::AuthToken(uid.to_wwcp()?),
        Identification::Rfid(rfid) => AuthIdentification::AuthToken(rfid.uid.to_wwcp()?),
        Identification::QrCode { evco_id, pin } => {
            let (pin, crypto) = match pin {
                Pin::Plain(value) => (value.clone(), PinCrypto::None),
                Pin::Hashed { value, function } => (
                    value.clone(),
                    PinCrypto::Hashed {
                        function: function.clone(),
                    },
                ),
            };
            AuthIdentification::QrCodePin {
                account: evco_id.to_wwcp()?,
                pin,
                crypto,
            }
        }
        Identification::PlugAndCharge { evco_id } => AuthIdentification::PlugAndCharge(evco_id.to_wwcp()?),
        Identification::Remote { evco_id } => AuthIdentification::RemoteIdentification(evco_id.to_wwcp()?),
    })
}

/// Tokens become Mifare family identifications.
pub fn wwcp_to_identification(identification: &AuthIdentification) -> Option<Identification> {
    Some(match identification {
        AuthIdentification::AuthToken(token) => Identification::from_uid(token.to_oicp()?),
        AuthIdentification::QrCodePin { account, pin, crypto } => Identification::QrCode {
            evco_id: account.to_oicp()?,
            pin: match crypto {
                PinCrypto::None => Pin::Plain(pin.clone()),
                PinCrypto::Hashed { function } => Pin::Hashed {
                    value: pin.clone(),
                    function: function.clone(),
                },
            },
        },
        AuthIdentification::PlugAndCharge(account) => Identification::PlugAndCharge {
            evco_id: account.to_oicp()?,
        },
        AuthIdentification::RemoteIdentification(account) => Identification::Remote {
            evco_id: account.to_oicp()?,
        },
    })
}

pub fn authorization_start_to_wwcp(response: &AuthorizationStart) -> AuthStartResult {
    let mut result = AuthStartResult::new(auth_start_result_type(
        response.authorization_status,
        &response.status_code,
    ));
    result.session_id = response.session_id.as_ref().and_then(|s| s.to_wwcp());
    result.provider_id = response.provider_id.as_ref().and_then(|p| p.to_wwcp());
    result.description = response.status_code.description.clone();
    result.additional_info = response.status_code.additional_info.clone();
    result.stop_identifications = response
        .authorization_stop_identifications
        .iter()
        .filter_map(identification_to_wwcp)
        .collect();
    result.runtime = response.context.runtime;
    result
}

pub fn authorization_stop_to_wwcp(response: &AuthorizationStop) -> AuthStopResult {
    let mut result = AuthStopResult::new(auth_stop_result_type(
        response.authorization_status,
        &response.status_code,
    ));
    result.session_id = response.session_id.as_ref().and_then(|s| s.to_wwcp());
    result.provider_id = response.provider_id.as_ref().and_then(|p| p.to_wwcp());
    result.description = response.status_code.description.clone();
    result.additional_info = response.status_code.additional_info.clone();
    result.runtime = response.context.runtime;
    result
}

/// The source record is stashed under `OICP.ChargeDetailRecord`.
pub fn charge_detail_record_to_wwcp(cdr: &ChargeDetailRecord) -> Result<wwcp::ChargeDetailRecord, MappingError> {
    let session_id = cdr.session_id.to_wwcp().ok_or_else(|| MappingError::Identifier {
        what: "SessionID",
        value: cdr.session_id.to_string(),
        target: "wwcp::ChargingSessionId",
    })?;
    let evse_id = cdr.evse_id.to_wwcp().ok_or_else(|| MappingError::Identifier {
        what: "EvseID",
        value: cdr.evse_id.to_string(),
        target: "wwcp::EvseId",
    })?;
    let authentication = identification_to_wwcp(&cdr.identification).ok_or(MappingError::Missing("authentication"))?;

    let energy_meter_values = meter_readings(cdr);

    let mut custom_data = cdr.custom_data.clone();
    custom_data.insert(OICP_CHARGE_DETAIL_RECORD, CustomValue::Json(cdr.to_value()));

    Ok(wwcp::ChargeDetailRecord {
        session_id,
        evse_id,
        operator_id: cdr.evse_id.operator_id().to_wwcp(),
        provider_id: cdr
            .hub_provider_id
            .as_ref()
            .or_else(|| cdr.identification.evco_id().map(|e| e.provider_id()))
            .and_then(|p| p.to_wwcp()),
        product_id: cdr.partner_product_id.as_ref().and_then(|p| p.to_wwcp()),
        authentication,
        session_start: cdr.session_start,
        session_end: cdr.session_end,
        charging_start: Some(cdr.charging_start),
        charging_end: Some(cdr.charging_end),
        energy_meter_values,
        consumed_energy: cdr.consumed_energy,
        metering_signature: cdr.metering_signature.clone(),
        custom_data,
    })
}

/// Rebuilds an OICP record. A stashed `OICP.ChargeDetailRecord` supplies
/// partner session ids and hub ids; the generic record wins elsewhere.
pub fn wwcp_to_charge_detail_record(cdr: &wwcp::ChargeDetailRecord) -> Result<ChargeDetailRecord, MappingError> {
    let session_id = cdr.session_id.to_oicp().ok_or_else(|| MappingError::Identifier {
        what: "charging session id",
        value: cdr.session_id.to_string(),
        target: "SessionID",
    })?;
    let evse_id: EvseId = cdr.evse_id.to_oicp().ok_or_else(|| MappingError::Identifier {
        what: "EVSE id",
        value: cdr.evse_id.to_string(),
        target: "EvseID",
    })?;
    let identification = wwcp_to_identification(&cdr.authentication).ok_or_else(|| MappingError::Invalid {
        what: "authentication",
        reason: format!("{:?} has no OICP identification", cdr.authentication),
    })?;

    let stashed = stashed_cdr(cdr)?;
    // The flat reading list loses which values were start, in-between and
    // end; the stash still knows as long as the readings are unchanged.
    let keep_split = stashed
        .as_ref()
        .is_some_and(|stashed| meter_readings(stashed) == cdr.energy_meter_values);

    let mut builder = match stashed {
        Some(stashed) => {
            let mut builder = stashed.to_builder();
            builder.session_id = session_id;
            builder.evse_id = evse_id;
            builder.identification = identification;
            builder
        }
        None => ChargeDetailRecordBuilder::new(session_id, evse_id, identification),
    };

    builder = builder
        .session(cdr.session_start, cdr.session_end)
        .charging(
            cdr.charging_start.unwrap_or(cdr.session_start),
            cdr.charging_end.unwrap_or(cdr.session_end),
        )
        .consumed_energy(cdr.consumed_energy);

    if !keep_split {
        builder.meter_value_start = None;
        builder.meter_value_end = None;
        builder.meter_values_in_between = Vec::new();
        match cdr.energy_meter_values.as_slice() {
            [] => {}
            [only] => builder.meter_value_start = Some(*only),
            [first, between @ .., last] => {
                builder.meter_value_start = Some(*first);
                builder.meter_value_end = Some(*last);
                builder.meter_values_in_between = between.to_vec();
            }
        }
    }
    if let Some(product) = cdr.product_id.as_ref().and_then(|p| p.to_oicp()) {
        builder.partner_product_id = Some(product);
    }
    if cdr.metering_signature.is_some() {
        builder.metering_signature = cdr.metering_signature.clone();
    }

    let mut custom_data = cdr.custom_data.clone();
    custom_data.remove(OICP_CHARGE_DETAIL_RECORD);
    builder.custom_data = custom_data;

    builder.to_immutable().map_err(|e| MappingError::Invalid {
        what: "charge detail record",
        reason: e.to_string(),
    })
}

fn meter_readings(cdr: &ChargeDetailRecord) -> Vec<Decimal> {
    cdr.meter_value_start
        .iter()
        .chain(cdr.meter_values_in_between.iter())
        .chain(cdr.meter_value_end.iter())
        .copied()
        .collect()
}

fn stashed_cdr(cdr: &wwcp::ChargeDetailRecord) -> Result<Option<ChargeDetailRecord>, MappingError> {
    let Some(value) = cdr.custom_data.get_opt::<&serde_json::Value>(OICP_CHARGE_DETAIL_RECORD) else {
        return Ok(None);
    };
    let invalid = |e: CodecError| MappingError::Invalid {
        what: OICP_CHARGE_DETAIL_RECORD,
        reason: e.to_string(),
    };
    let fields = Fields::new(OICP_CHARGE_DETAIL_RECORD, value).map_err(invalid)?;
    ChargeDetailRecord::from_fields(fields).map(Some).map_err(invalid)
}
