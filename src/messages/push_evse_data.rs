//! PushEvseData: a CPO uploads static EVSE data.

use serde_json::Value;

use super::{Acknowledgement, Operation, OperationKind, RequestContext};
use crate::codec::{CodecContext, Fields, Obj, WireRequest};
use crate::domain::records::OperatorEvseData;
use crate::domain::types::ActionType;
use crate::support::errors::CodecError;

const ROOT: &str = "eRoamingPushEvseData";

pub struct PushEvseData;

impl Operation for PushEvseData {
    const KIND: OperationKind = OperationKind::PushEvseData;

    type Request = PushEvseDataRequest;
    type Response = Acknowledgement<PushEvseDataRequest>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PushEvseDataRequest {
    pub action_type: ActionType,
    pub operator_evse_data: OperatorEvseData,
    pub context: RequestContext,
}

impl PushEvseDataRequest {
    pub fn new(action_type: ActionType, operator_evse_data: OperatorEvseData) -> Self {
        Self {
            action_type,
            operator_evse_data,
            context: RequestContext::new(),
        }
    }
}

impl WireRequest for PushEvseDataRequest {
    const ROOT: &'static str = ROOT;

    fn decode(body: &Value, ctx: &CodecContext) -> Result<Self, CodecError> {
        let f = Fields::new(ROOT, body)?;
        Ok(Self {
            action_type: f.required("ActionType")?,
            operator_evse_data: OperatorEvseData::from_fields(f.required_object("OperatorEvseData")?)?,
            context: ctx.request_context.clone(),
        })
    }

    fn encode(&self, ctx: &CodecContext) -> Value {
        Obj::new()
            .text("ActionType", self.action_type)
            .value("OperatorEvseData", self.operator_evse_data.to_value(ctx.version))
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
    use crate::domain::records::evse_data_record::fixtures::sample_record;
    use crate::domain::version::OicpVersion;

    fn request() -> PushEvseDataRequest {
        let record = sample_record();
        let data = OperatorEvseData::new(record.operator_id().clone(), Some("GEF".into())).with_record(record);
        PushEvseDataRequest::new(ActionType::FullLoad, data)
    }

    #[test]
    fn round_trips_in_every_version() {
        let original = request();
        for &version in OicpVersion::ALL {
            let ctx = CodecContext::new(version);
            let text = render(&encode_request(&original, &ctx, None), version).unwrap();
            let element = read(&text, version, ROOT).unwrap();
            let parsed: PushEvseDataRequest = decode_request(&element, &ctx, None).unwrap().unwrap();
            assert_eq!(parsed, original, "{}", version);
        }
    }

    #[test]
    fn legacy_versions_send_facility_classes() {
        let ctx = CodecContext::new(OicpVersion::V2_0);
        let text = render(&encode_request(&request(), &ctx, None), OicpVersion::V2_0).unwrap();
        assert!(text.contains("<EVSEData:ChargingFacility>380 - 480V, 3-Phase ≤32A</EVSEData:ChargingFacility>"));
        assert!(text.contains("<EVSEData:ActionType>fullLoad</EVSEData:ActionType>"));
    }
}
