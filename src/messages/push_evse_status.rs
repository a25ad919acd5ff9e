//! PushEvseStatus: a CPO uploads dynamic EVSE status.

use serde_json::Value;

use super::{Acknowledgement, Operation, OperationKind, RequestContext};
use crate::codec::{CodecContext, Fields, Obj, WireRequest};
use crate::domain::records::OperatorEvseStatus;
use crate::domain::types::ActionType;
use crate::support::errors::CodecError;

const ROOT: &str = "eRoamingPushEvseStatus";

pub struct PushEvseStatus;

impl Operation for PushEvseStatus {
    const KIND: OperationKind = OperationKind::PushEvseStatus;

    type Request = PushEvseStatusRequest;
    type Response = Acknowledgement<PushEvseStatusRequest>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PushEvseStatusRequest {
    pub action_type: ActionType,
    pub operator_evse_status: OperatorEvseStatus,
    pub context: RequestContext,
}

impl PushEvseStatusRequest {
    pub fn new(action_type: ActionType, operator_evse_status: OperatorEvseStatus) -> Self {
        Self {
            action_type,
            operator_evse_status,
            context: RequestContext::new(),
        }
    }
}

impl WireRequest for PushEvseStatusRequest {
    const ROOT: &'static str = ROOT;

    fn decode(body: &Value, ctx: &CodecContext) -> Result<Self, CodecError> {
        let f = Fields::new(ROOT, body)?;
        Ok(Self {
            action_type: f.required("ActionType")?,
            operator_evse_status: OperatorEvseStatus::from_fields(f.required_object("OperatorEvseStatus")?)?,
            context: ctx.request_context.clone(),
        })
    }

    fn encode(&self, _ctx: &CodecContext) -> Value {
        Obj::new()
            .text("ActionType", self.action_type)
            .value("OperatorEvseStatus", self.operator_evse_status.to_value())
            .build()
    }

    fn context(&self) -> &RequestContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_request, encode_request, read, render};
    use crate::domain::identifiers::{EvseId, OperatorId};
    use crate::domain::records::EvseStatusRecord;
    use crate::domain::types::EvseStatus;
    use crate::domain::version::OicpVersion;
    use serde_json::json;

    #[test]
    fn soap_round_trip_with_several_records() {
        let status = OperatorEvseStatus::new(OperatorId::parse("DE*GEF").unwrap(), None)
            .with_record(EvseStatusRecord::new(EvseId::parse("DE*GEF*E1").unwrap(), EvseStatus::Available))
            .with_record(EvseStatusRecord::new(EvseId::parse("DE*GEF*E2").unwrap(), EvseStatus::Occupied));
        let original = PushEvseStatusRequest::new(ActionType::Update, status);

        let ctx = CodecContext::new(OicpVersion::V2_1);
        let text = render(&encode_request(&original, &ctx, None), OicpVersion::V2_1).unwrap();
        assert!(text.contains("<EVSEStatus:EvseId>DE*GEF*E2</EVSEStatus:EvseId>"));

        let element = read(&text, OicpVersion::V2_1, ROOT).unwrap();
        let parsed: PushEvseStatusRequest = decode_request(&element, &ctx, None).unwrap().unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn unknown_status_is_tolerated() {
        let body = json!({
            "ActionType": "insert",
            "OperatorEvseStatus": {
                "OperatorID": "DE*GEF",
                "EvseStatusRecord": [{"EvseID": "DE*GEF*E1", "EvseStatus": "Exploded"}]
            }
        });
        let parsed = PushEvseStatusRequest::decode(&body, &CodecContext::new(OicpVersion::V2_3)).unwrap();
        assert_eq!(parsed.operator_evse_status.evse_status_records[0].status, EvseStatus::Unknown);
    }
}
