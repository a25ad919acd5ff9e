//! Per-operator groupings used by push and pull operations.

use serde_json::Value;

use super::{EvseDataRecord, EvseStatusRecord};
use crate::codec::accessors::{Fields, Obj};
use crate::domain::identifiers::OperatorId;
use crate::domain::version::OicpVersion;
use crate::support::errors::CodecError;

#[derive(Debug, Clone, PartialEq)]
pub struct OperatorEvseData {
    pub operator_id: OperatorId,
    pub operator_name: Option<String>,
    pub evse_data_records: Vec<EvseDataRecord>,
}

impl OperatorEvseData {
    pub fn new(operator_id: OperatorId, operator_name: Option<String>) -> Self {
        Self {
            operator_id,
            operator_name,
            evse_data_records: Vec::new(),
        }
    }

    pub fn with_record(mut self, record: EvseDataRecord) -> Self {
        self.evse_data_records.push(record);
        self
    }

    pub(crate) fn to_value(&self, version: OicpVersion) -> Value {
        Obj::new()
            .text("OperatorID", &self.operator_id)
            .opt_text("OperatorName", self.operator_name.as_deref())
            .list(
                "EvseDataRecord",
                self.evse_data_records.iter().map(|r| r.to_value(version)),
            )
            .build()
    }

    pub(crate) fn from_fields(f: Fields<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            operator_id: f.required("OperatorID")?,
            operator_name: f.optional_str("OperatorName")?,
            evse_data_records: f.objects("EvseDataRecord", EvseDataRecord::from_fields)?,
        })
    }

    /// Group flat records by the operator encoded in their EVSE ids,
    /// keeping first-seen order.
    pub fn group(records: Vec<EvseDataRecord>) -> Vec<Self> {
        let mut groups: Vec<Self> = Vec::new();
        for record in records {
            let operator = record.operator_id().clone();
            match groups.iter_mut().find(|g| g.operator_id == operator) {
                Some(group) => group.evse_data_records.push(record),
                None => groups.push(Self::new(operator, None).with_record(record)),
            }
        }
        groups
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperatorEvseStatus {
    pub operator_id: OperatorId,
    pub operator_name: Option<String>,
    pub evse_status_records: Vec<EvseStatusRecord>,
}

impl OperatorEvseStatus {
    pub fn new(operator_id: OperatorId, operator_name: Option<String>) -> Self {
        Self {
            operator_id,
            operator_name,
            evse_status_records: Vec::new(),
        }
    }

    pub fn with_record(mut self, record: EvseStatusRecord) -> Self {
        self.evse_status_records.push(record);
        self
    }

    pub(crate) fn to_value(&self) -> Value {
        Obj::new()
            .text("OperatorID", &self.operator_id)
            .opt_text("OperatorName", self.operator_name.as_deref())
            .list(
                "EvseStatusRecord",
                self.evse_status_records.iter().map(|r| r.to_value()),
            )
            .build()
    }

    pub(crate) fn from_fields(f: Fields<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            operator_id: f.required("OperatorID")?,
            operator_name: f.optional_str("OperatorName")?,
            evse_status_records: f.objects("EvseStatusRecord", EvseStatusRecord::from_fields)?,
        })
    }
}
