//! SendChargeDetailRecord: the CPO reports a finished session.

use serde_json::Value;

use super::{Acknowledgement, Operation, OperationKind, RequestContext};
use crate::codec::{CodecContext, Fields, WireRequest};
use crate::domain::identifiers::OperatorId;
use crate::domain::records::ChargeDetailRecord;
use crate::support::errors::CodecError;

const ROOT: &str = "eRoamingChargeDetailRecord";

pub struct SendChargeDetailRecord;

impl Operation for SendChargeDetailRecord {
    const KIND: OperationKind = OperationKind::ChargeDetailRecord;

    type Request = ChargeDetailRecordRequest;
    type Response = Acknowledgement<ChargeDetailRecordRequest>;
}

/// The record is the message body; the operator travels in the REST path
/// and defaults to the one encoded in the EVSE id.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeDetailRecordRequest {
    pub charge_detail_record: ChargeDetailRecord,
    pub operator_id: OperatorId,
    pub context: RequestContext,
}

impl ChargeDetailRecordRequest {
    pub fn new(charge_detail_record: ChargeDetailRecord) -> Self {
        let operator_id = charge_detail_record.evse_id.operator_id().clone();
        Self {
            charge_detail_record,
            operator_id,
            context: RequestContext::new(),
        }
    }

    pub fn with_operator(mut self, operator_id: OperatorId) -> Self {
        self.operator_id = operator_id;
        self
    }
}

impl WireRequest for ChargeDetailRecordRequest {
    const ROOT: &'static str = ROOT;

    fn decode(body: &Value, ctx: &CodecContext) -> Result<Self, CodecError> {
        let charge_detail_record = ChargeDetailRecord::from_fields(Fields::new(ROOT, body)?)?;
        let operator_id = ctx
            .operator_id
            .clone()
            .unwrap_or_else(|| charge_detail_record.evse_id.operator_id().clone());
        Ok(Self {
            charge_detail_record,
            operator_id,
            context: ctx.request_context.clone(),
        })
    }

    fn encode(&self, _ctx: &CodecContext) -> Value {
        self.charge_detail_record.to_value()
    }

    fn context(&self) -> &RequestContext {
        &self.context
    }
}
