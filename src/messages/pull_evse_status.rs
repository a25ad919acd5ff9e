//! PullEvseStatus: an EMP downloads dynamic EVSE status.

use std::sync::Arc;

use serde_json::Value;

use super::pull_evse_data::SearchCenter;
use super::{Operation, OperationKind, RequestContext, ResponseContext};
use crate::codec::{CodecContext, Fields, Obj, WireRequest, WireResponse};
use crate::domain::identifiers::ProviderId;
use crate::domain::records::{EvseStatusRecord, OperatorEvseStatus};
use crate::domain::types::{EvseStatus, StatusCode};
use crate::support::errors::CodecError;

const ROOT: &str = "eRoamingPullEvseStatus";
const RESPONSE_ROOT: &str = "eRoamingEvseStatus";

pub struct PullEvseStatus;

impl Operation for PullEvseStatus {
    const KIND: OperationKind = OperationKind::PullEvseStatus;

    type Request = PullEvseStatusRequest;
    type Response = PullEvseStatusResponse;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PullEvseStatusRequest {
    pub provider_id: ProviderId,
    pub search_center: Option<SearchCenter>,
    /// Only EVSEs currently in this status.
    pub evse_status: Option<EvseStatus>,
    pub context: RequestContext,
}

impl PullEvseStatusRequest {
    pub fn new(provider_id: ProviderId) -> Self {
        Self {
            provider_id,
            search_center: None,
            evse_status: None,
            context: RequestContext::new(),
        }
    }

    pub fn with_status(mut self, status: EvseStatus) -> Self {
        self.evse_status = Some(status);
        self
    }
}

impl WireRequest for PullEvseStatusRequest {
    const ROOT: &'static str = ROOT;

    fn decode(body: &Value, ctx: &CodecContext) -> Result<Self, CodecError> {
        let f = Fields::new(ROOT, body)?;
        let provider_id = match f.optional::<ProviderId>("ProviderID")? {
            Some(id) => id,
            None => ctx.provider_id.clone().ok_or(CodecError::MissingField {
                context: ROOT,
                field: "ProviderID",
            })?,
        };

        Ok(Self {
            provider_id,
            search_center: f
                .optional_object("SearchCenter")?
                .map(SearchCenter::from_fields)
                .transpose()?,
            evse_status: f.optional("EvseStatus")?,
            context: ctx.request_context.clone(),
        })
    }

    fn encode(&self, _ctx: &CodecContext) -> Value {
        Obj::new()
            .text("ProviderID", &self.provider_id)
            .opt_value("SearchCenter", self.search_center.as_ref().map(|s| s.to_value()))
            .opt_text("EvseStatus", self.evse_status)
            .build()
    }

    fn context(&self) -> &RequestContext {
        &self.context
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PullEvseStatusResponse {
    pub request: Option<Arc<PullEvseStatusRequest>>,
    pub operator_evse_status: Vec<OperatorEvseStatus>,
    pub status_code: StatusCode,
    pub context: ResponseContext,
}

impl PullEvseStatusResponse {
    pub fn new(request: Option<Arc<PullEvseStatusRequest>>, operator_evse_status: Vec<OperatorEvseStatus>) -> Self {
        let mut response = Self::from_status(request, StatusCode::success());
        response.operator_evse_status = operator_evse_status;
        response
    }

    pub fn records(&self) -> impl Iterator<Item = &EvseStatusRecord> {
        self.operator_evse_status
            .iter()
            .flat_map(|o| o.evse_status_records.iter())
    }

    pub fn to_builder(&self) -> PullEvseStatusResponseBuilder {
        PullEvseStatusResponseBuilder(self.clone())
    }
}

impl WireResponse<PullEvseStatusRequest> for PullEvseStatusResponse {
    const ROOT: &'static str = RESPONSE_ROOT;

    fn decode(
        body: &Value,
        request: Option<Arc<PullEvseStatusRequest>>,
        _ctx: &CodecContext,
    ) -> Result<Self, CodecError> {
        let f = Fields::new(RESPONSE_ROOT, body)?;
        let status_code = match f.optional_object("StatusCode")? {
            Some(status) => StatusCode::from_fields(status)?,
            None => StatusCode::success(),
        };
        let operator_evse_status = match f.raw("EvseStatuses").filter(|v| v.is_object()) {
            Some(statuses) => Fields::new("EvseStatuses", statuses)?
                .objects("OperatorEvseStatus", OperatorEvseStatus::from_fields)?,
            None => Vec::new(),
        };

        Ok(Self {
            request,
            operator_evse_status,
            status_code,
            context: ResponseContext::new(),
        })
    }

    fn encode(&self, _ctx: &CodecContext) -> Value {
        Obj::new()
            .value(
                "EvseStatuses",
                Obj::new()
                    .list(
                        "OperatorEvseStatus",
                        self.operator_evse_status.iter().map(|o| o.to_value()),
                    )
                    .build(),
            )
            .value("StatusCode", self.status_code.to_value())
            .build()
    }

    fn from_status(request: Option<Arc<PullEvseStatusRequest>>, status_code: StatusCode) -> Self {
        let context = request
            .as_ref()
            .map(|r| ResponseContext::for_request(&r.context))
            .unwrap_or_default();
        Self {
            request,
            operator_evse_status: Vec::new(),
            status_code,
            context,
        }
    }

    fn status_code(&self) -> &StatusCode {
        &self.status_code
    }

    fn response_context_mut(&mut self) -> &mut ResponseContext {
        &mut self.context
    }
}

#[derive(Debug, Clone)]
pub struct PullEvseStatusResponseBuilder(pub PullEvseStatusResponse);

impl PullEvseStatusResponseBuilder {
    pub fn new(request: Option<Arc<PullEvseStatusRequest>>) -> Self {
        Self(PullEvseStatusResponse::from_status(request, StatusCode::success()))
    }

    /// Adds a record to the group of its operator.
    pub fn record(mut self, record: EvseStatusRecord) -> Self {
        let operator = record.evse_id.operator_id().clone();
        match self
            .0
            .operator_evse_status
            .iter_mut()
            .find(|o| o.operator_id == operator)
        {
            Some(group) => group.evse_status_records.push(record),
            None => self
                .0
                .operator_evse_status
                .push(OperatorEvseStatus::new(operator, None).with_record(record)),
        }
        self
    }

    pub fn status_code(mut self, status_code: StatusCode) -> Self {
        self.0.status_code = status_code;
        self
    }

    pub fn to_immutable(self) -> PullEvseStatusResponse {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_response, encode_response, read, render};
    use crate::domain::identifiers::EvseId;
    use crate::domain::version::OicpVersion;

    #[test]
    fn response_round_trips_in_every_version() {
        let response = PullEvseStatusResponseBuilder::new(None)
            .record(EvseStatusRecord::new(EvseId::parse("DE*GEF*E1").unwrap(), EvseStatus::Available))
            .record(EvseStatusRecord::new(EvseId::parse("DE*ABC*E7").unwrap(), EvseStatus::OutOfService))
            .to_immutable();
        assert_eq!(response.operator_evse_status.len(), 2);

        for &version in OicpVersion::ALL {
            let ctx = CodecContext::new(version);
            let text = render(&encode_response(&response, &ctx, None), version).unwrap();
            let element = read(&text, version, RESPONSE_ROOT).unwrap();
            let parsed = decode_response::<PullEvseStatusRequest, PullEvseStatusResponse>(&element, None, &ctx, None)
                .unwrap()
                .unwrap();
            assert_eq!(parsed, response, "{}", version);
        }
    }

    #[test]
    fn provider_comes_from_path_when_absent() {
        let ctx = CodecContext::new(OicpVersion::V2_3).with_provider(ProviderId::try_parse("DE-GDF"));
        let parsed = PullEvseStatusRequest::decode(&serde_json::json!({"EvseStatus": "Available"}), &ctx).unwrap();
        assert_eq!(parsed.provider_id.to_string(), "DE-GDF");
        assert_eq!(parsed.evse_status, Some(EvseStatus::Available));
    }
}
