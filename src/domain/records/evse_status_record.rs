use serde_json::Value;

use crate::codec::accessors::{Fields, Obj};
use crate::domain::identifiers::EvseId;
use crate::domain::types::EvseStatus;
use crate::support::custom_data::CustomData;
use crate::support::errors::CodecError;

/// Dynamic status of one EVSE.
#[derive(Debug, Clone, PartialEq)]
pub struct EvseStatusRecord {
    pub evse_id: EvseId,
    pub status: EvseStatus,
    pub custom_data: CustomData,
}

impl EvseStatusRecord {
    pub fn new(evse_id: EvseId, status: EvseStatus) -> Self {
        Self {
            evse_id,
            status,
            custom_data: CustomData::new(),
        }
    }

    pub(crate) fn to_value(&self) -> Value {
        Obj::new()
            .text("EvseID", &self.evse_id)
            .text("EvseStatus", self.status)
            .build()
    }

    pub(crate) fn from_fields(f: Fields<'_>) -> Result<Self, CodecError> {
        Ok(Self::new(f.required("EvseID")?, f.required("EvseStatus")?))
    }
}
