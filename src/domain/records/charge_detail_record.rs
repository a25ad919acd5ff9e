//! Charge detail record sent by the CPO after a session has ended.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::codec::accessors::{number, Fields, Obj};
use crate::domain::identifiers::{
    CpoPartnerSessionId, EmpPartnerSessionId, EvseId, OperatorId, PartnerProductId, ProviderId,
    SessionId,
};
use crate::domain::types::Identification;
use crate::support::custom_data::CustomData;
use crate::support::errors::{BuilderError, CodecError};

/// Meter reading in kWh.
pub type MeterValue = Decimal;

#[derive(Debug, Clone, PartialEq)]
pub struct ChargeDetailRecord {
    pub session_id: SessionId,
    pub cpo_partner_session_id: Option<CpoPartnerSessionId>,
    pub emp_partner_session_id: Option<EmpPartnerSessionId>,
    pub partner_product_id: Option<PartnerProductId>,
    pub evse_id: EvseId,
    pub identification: Identification,
    pub charging_start: DateTime<Utc>,
    pub charging_end: DateTime<Utc>,
    pub session_start: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
    pub meter_value_start: Option<MeterValue>,
    pub meter_value_end: Option<MeterValue>,
    pub meter_values_in_between: Vec<MeterValue>,
    pub consumed_energy: MeterValue,
    pub metering_signature: Option<String>,
    pub hub_operator_id: Option<OperatorId>,
    pub hub_provider_id: Option<ProviderId>,
    pub custom_data: CustomData,
}

impl ChargeDetailRecord {
    pub fn to_builder(&self) -> ChargeDetailRecordBuilder {
        ChargeDetailRecordBuilder::from(self)
    }

    pub(crate) fn to_value(&self) -> Value {
        let in_between = (!self.meter_values_in_between.is_empty()).then(|| {
            Obj::new()
                .list("meterValues", self.meter_values_in_between.iter().map(number))
                .build()
        });

        Obj::new()
            .text("SessionID", &self.session_id)
            .opt_text("CPOPartnerSessionID", self.cpo_partner_session_id.as_ref())
            .opt_text("EMPPartnerSessionID", self.emp_partner_session_id.as_ref())
            .opt_text("PartnerProductID", self.partner_product_id.as_ref())
            .text("EvseID", &self.evse_id)
            .value("Identification", self.identification.to_value())
            .timestamp("ChargingStart", &self.charging_start)
            .timestamp("ChargingEnd", &self.charging_end)
            .timestamp("SessionStart", &self.session_start)
            .timestamp("SessionEnd", &self.session_end)
            .opt_number("MeterValueStart", self.meter_value_start)
            .opt_number("MeterValueEnd", self.meter_value_end)
            .opt_value("MeterValueInBetween", in_between)
            .number("ConsumedEnergy", self.consumed_energy)
            .opt_text("MeteringSignature", self.metering_signature.as_deref())
            .opt_text("HubOperatorID", self.hub_operator_id.as_ref())
            .opt_text("HubProviderID", self.hub_provider_id.as_ref())
            .build()
    }

    pub(crate) fn from_fields(f: Fields<'_>) -> Result<Self, CodecError> {
        let meter_values_in_between = match f.optional_object("MeterValueInBetween")? {
            Some(inner) => inner.list_of("meterValues")?,
            None => Vec::new(),
        };

        Ok(Self {
            session_id: f.required("SessionID")?,
            cpo_partner_session_id: f.optional("CPOPartnerSessionID")?,
            emp_partner_session_id: f.optional("EMPPartnerSessionID")?,
            partner_product_id: f.optional("PartnerProductID")?,
            evse_id: f.required("EvseID")?,
            identification: Identification::from_fields(f.required_object("Identification")?)?,
            charging_start: f.required("ChargingStart")?,
            charging_end: f.required("ChargingEnd")?,
            session_start: f.required("SessionStart")?,
            session_end: f.required("SessionEnd")?,
            meter_value_start: f.optional("MeterValueStart")?,
            meter_value_end: f.optional("MeterValueEnd")?,
            meter_values_in_between,
            consumed_energy: f.required("ConsumedEnergy")?,
            metering_signature: f.optional_str("MeteringSignature")?,
            hub_operator_id: f.optional("HubOperatorID")?,
            hub_provider_id: f.optional("HubProviderID")?,
            custom_data: CustomData::new(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ChargeDetailRecordBuilder {
    pub session_id: SessionId,
    pub cpo_partner_session_id: Option<CpoPartnerSessionId>,
    pub emp_partner_session_id: Option<EmpPartnerSessionId>,
    pub partner_product_id: Option<PartnerProductId>,
    pub evse_id: EvseId,
    pub identification: Identification,
    pub charging_start: Option<DateTime<Utc>>,
    pub charging_end: Option<DateTime<Utc>>,
    pub session_start: Option<DateTime<Utc>>,
    pub session_end: Option<DateTime<Utc>>,
    pub meter_value_start: Option<MeterValue>,
    pub meter_value_end: Option<MeterValue>,
    pub meter_values_in_between: Vec<MeterValue>,
    pub consumed_energy: Option<MeterValue>,
    pub metering_signature: Option<String>,
    pub hub_operator_id: Option<OperatorId>,
    pub hub_provider_id: Option<ProviderId>,
    pub custom_data: CustomData,
}

impl ChargeDetailRecordBuilder {
    pub fn new(session_id: SessionId, evse_id: EvseId, identification: Identification) -> Self {
        Self {
            session_id,
            cpo_partner_session_id: None,
            emp_partner_session_id: None,
            partner_product_id: None,
            evse_id,
            identification,
            charging_start: None,
            charging_end: None,
            session_start: None,
            session_end: None,
            meter_value_start: None,
            meter_value_end: None,
            meter_values_in_between: Vec::new(),
            consumed_energy: None,
            metering_signature: None,
            hub_operator_id: None,
            hub_provider_id: None,
            custom_data: CustomData::new(),
        }
    }

    /// Sets session and charging window to the same bounds.
    pub fn session(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.session_start = Some(start);
        self.session_end = Some(end);
        self.charging_start.get_or_insert(start);
        self.charging_end.get_or_insert(end);
        self
    }

    pub fn charging(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.charging_start = Some(start);
        self.charging_end = Some(end);
        self
    }

    /// Start and end readings; consumed energy is their difference unless
    /// set explicitly.
    pub fn meter_values(mut self, start: MeterValue, end: MeterValue) -> Self {
        self.meter_value_start = Some(start);
        self.meter_value_end = Some(end);
        self.consumed_energy.get_or_insert(end - start);
        self
    }

    pub fn consumed_energy(mut self, kwh: MeterValue) -> Self {
        self.consumed_energy = Some(kwh);
        self
    }

    pub fn partner_product_id(mut self, id: PartnerProductId) -> Self {
        self.partner_product_id = Some(id);
        self
    }

    pub fn to_immutable(self) -> Result<ChargeDetailRecord, BuilderError> {
        let missing = |field| BuilderError {
            builder: "ChargeDetailRecordBuilder",
            field,
        };
        let session_start = self.session_start.ok_or_else(|| missing("SessionStart"))?;
        let session_end = self.session_end.ok_or_else(|| missing("SessionEnd"))?;

        Ok(ChargeDetailRecord {
            charging_start: self.charging_start.unwrap_or(session_start),
            charging_end: self.charging_end.unwrap_or(session_end),
            session_start,
            session_end,
            consumed_energy: self.consumed_energy.ok_or_else(|| missing("ConsumedEnergy"))?,
            session_id: self.session_id,
            cpo_partner_session_id: self.cpo_partner_session_id,
            emp_partner_session_id: self.emp_partner_session_id,
            partner_product_id: self.partner_product_id,
            evse_id: self.evse_id,
            identification: self.identification,
            meter_value_start: self.meter_value_start,
            meter_value_end: self.meter_value_end,
            meter_values_in_between: self.meter_values_in_between,
            metering_signature: self.metering_signature,
            hub_operator_id: self.hub_operator_id,
            hub_provider_id: self.hub_provider_id,
            custom_data: self.custom_data,
        })
    }
}

impl From<&ChargeDetailRecord> for ChargeDetailRecordBuilder {
    fn from(cdr: &ChargeDetailRecord) -> Self {
        let cdr = cdr.clone();
        Self {
            session_id: cdr.session_id,
            cpo_partner_session_id: cdr.cpo_partner_session_id,
            emp_partner_session_id: cdr.emp_partner_session_id,
            partner_product_id: cdr.partner_product_id,
            evse_id: cdr.evse_id,
            identification: cdr.identification,
            charging_start: Some(cdr.charging_start),
            charging_end: Some(cdr.charging_end),
            session_start: Some(cdr.session_start),
            session_end: Some(cdr.session_end),
            meter_value_start: cdr.meter_value_start,
            meter_value_end: cdr.meter_value_end,
            meter_values_in_between: cdr.meter_values_in_between,
            consumed_energy: Some(cdr.consumed_energy),
            metering_signature: cdr.metering_signature,
            hub_operator_id: cdr.hub_operator_id,
            hub_provider_id: cdr.hub_provider_id,
            custom_data: cdr.custom_data,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::domain::identifiers::Uid;
    use chrono::TimeZone;

    pub fn sample_cdr() -> ChargeDetailRecord {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        ChargeDetailRecordBuilder::new(
            SessionId::parse("b2688855-7f00-0002-6d8e-48d883f6abb6").unwrap(),
            EvseId::parse("DE*GEF*E1234567*A*1").unwrap(),
            Identification::from_uid(Uid::parse("11223344").unwrap()),
        )
        .session(start, end)
        .meter_values(Decimal::new(1000, 1), Decimal::new(1225, 1))
        .partner_product_id(PartnerProductId::parse("AC1").unwrap())
        .to_immutable()
        .unwrap()
    }
}
