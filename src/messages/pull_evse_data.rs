//! PullEvseData: an EMP downloads static EVSE data.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use super::{Operation, OperationKind, RequestContext, ResponseContext};
use crate::codec::{CodecContext, Fields, Obj, WireRequest, WireResponse};
use crate::domain::identifiers::{OperatorId, ProviderId};
use crate::domain::records::{EvseDataRecord, OperatorEvseData};
use crate::domain::types::{GeoCoordinates, GeoCoordinatesFormat, StatusCode};
use crate::support::errors::CodecError;

const ROOT: &str = "eRoamingPullEvseData";
const RESPONSE_ROOT: &str = "eRoamingEvseData";

pub struct PullEvseData;

impl Operation for PullEvseData {
    const KIND: OperationKind = OperationKind::PullEvseData;

    type Request = PullEvseDataRequest;
    type Response = PullEvseDataResponse;
}

/// Restricts a pull to EVSEs within `radius_km` of a point.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCenter {
    pub geo_coordinates: GeoCoordinates,
    pub radius_km: Decimal,
}

impl SearchCenter {
    pub(crate) fn to_value(&self) -> Value {
        Obj::new()
            .value("GeoCoordinates", self.geo_coordinates.to_value())
            .number("Radius", self.radius_km)
            .build()
    }

    pub(crate) fn from_fields(f: Fields<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            geo_coordinates: GeoCoordinates::from_fields(f.required_object("GeoCoordinates")?)?,
            radius_km: f.required("Radius")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PullEvseDataRequest {
    pub provider_id: ProviderId,
    pub search_center: Option<SearchCenter>,
    /// Only records changed since this instant (delta pull).
    pub last_call: Option<DateTime<Utc>>,
    pub geo_coordinates_response_format: GeoCoordinatesFormat,
    pub operator_ids: Vec<OperatorId>,
    pub country_codes: Vec<String>,
    pub context: RequestContext,
}

impl PullEvseDataRequest {
    pub fn new(provider_id: ProviderId) -> Self {
        Self {
            provider_id,
            search_center: None,
            last_call: None,
            geo_coordinates_response_format: GeoCoordinatesFormat::DecimalDegree,
            operator_ids: Vec::new(),
            country_codes: Vec::new(),
            context: RequestContext::new(),
        }
    }

    pub fn with_search_center(mut self, search_center: SearchCenter) -> Self {
        self.search_center = Some(search_center);
        self
    }

    pub fn with_last_call(mut self, last_call: DateTime<Utc>) -> Self {
        self.last_call = Some(last_call);
        self
    }
}

impl WireRequest for PullEvseDataRequest {
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
            last_call: f.optional("LastCall")?,
            geo_coordinates_response_format: f
                .optional("GeoCoordinatesResponseFormat")?
                .unwrap_or(GeoCoordinatesFormat::DecimalDegree),
            operator_ids: f.list_of("OperatorIds")?,
            country_codes: f.list_of("CountryCodes")?,
            context: ctx.request_context.clone(),
        })
    }

    fn encode(&self, _ctx: &CodecContext) -> Value {
        Obj::new()
            .text("ProviderID", &self.provider_id)
            .opt_value("SearchCenter", self.search_center.as_ref().map(|s| s.to_value()))
            .opt_timestamp("LastCall", self.last_call.as_ref())
            .text("GeoCoordinatesResponseFormat", self.geo_coordinates_response_format)
            .text_list("OperatorIds", &self.operator_ids)
            .text_list("CountryCodes", &self.country_codes)
            .build()
    }

    fn context(&self) -> &RequestContext {
        &self.context
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PullEvseDataResponse {
    pub request: Option<Arc<PullEvseDataRequest>>,
    pub operator_evse_data: Vec<OperatorEvseData>,
    pub status_code: StatusCode,
    pub context: ResponseContext,
}

impl PullEvseDataResponse {
    pub fn new(request: Option<Arc<PullEvseDataRequest>>, operator_evse_data: Vec<OperatorEvseData>) -> Self {
        let mut response = Self::from_status(request, StatusCode::success());
        response.operator_evse_data = operator_evse_data;
        response
    }

    pub fn records(&self) -> impl Iterator<Item = &EvseDataRecord> {
        self.operator_evse_data
            .iter()
            .flat_map(|o| o.evse_data_records.iter())
    }

    pub fn to_builder(&self) -> PullEvseDataResponseBuilder {
        PullEvseDataResponseBuilder(self.clone())
    }
}

impl WireResponse<PullEvseDataRequest> for PullEvseDataResponse {
    const ROOT: &'static str = RESPONSE_ROOT;

    /// OICP 2.3 answers with one flat page of records, older versions with
    /// records grouped per operator. A missing status means success.
    fn decode(
        body: &Value,
        request: Option<Arc<PullEvseDataRequest>>,
        ctx: &CodecContext,
    ) -> Result<Self, CodecError> {
        let f = Fields::new(RESPONSE_ROOT, body)?;
        let status_code = match f.optional_object("StatusCode")? {
            Some(status) => StatusCode::from_fields(status)?,
            None => StatusCode::success(),
        };

        let operator_evse_data = if ctx.is_rest() {
            OperatorEvseData::group(f.objects("content", EvseDataRecord::from_fields)?)
        } else {
            match f.raw("EvseData").filter(|v| v.is_object()) {
                Some(data) => Fields::new("EvseData", data)?
                    .objects("OperatorEvseData", OperatorEvseData::from_fields)?,
                None => Vec::new(),
            }
        };

        Ok(Self {
            request,
            operator_evse_data,
            status_code,
            context: ResponseContext::new(),
        })
    }

    fn encode(&self, ctx: &CodecContext) -> Value {
        if ctx.is_rest() {
            let content: Vec<Value> = self.records().map(|r| r.to_value(ctx.version)).collect();
            let total = content.len();
            return Obj::new()
                .value("content", Value::Array(content))
                .number("number", 0)
                .number("size", total)
                .number("totalElements", total)
                .number("totalPages", 1)
                .boolean("first", true)
                .boolean("last", true)
                .number("numberOfElements", total)
                .value("StatusCode", self.status_code.to_value())
                .build();
        }

        Obj::new()
            .value(
                "EvseData",
                Obj::new()
                    .list(
                        "OperatorEvseData",
                        self.operator_evse_data.iter().map(|o| o.to_value(ctx.version)),
                    )
                    .build(),
            )
            .value("StatusCode", self.status_code.to_value())
            .build()
    }

    fn from_status(request: Option<Arc<PullEvseDataRequest>>, status_code: StatusCode) -> Self {
        let context = request
            .as_ref()
            .map(|r| ResponseContext::for_request(&r.context))
            .unwrap_or_default();
        Self {
            request,
            operator_evse_data: Vec::new(),
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
pub struct PullEvseDataResponseBuilder(pub PullEvseDataResponse);

impl PullEvseDataResponseBuilder {
    pub fn new(request: Option<Arc<PullEvseDataRequest>>) -> Self {
        Self(PullEvseDataResponse::from_status(request, StatusCode::success()))
    }

    pub fn operator_evse_data(mut self, data: OperatorEvseData) -> Self {
        self.0.operator_evse_data.push(data);
        self
    }

    /// Adds a record to the group of its operator.
    pub fn record(mut self, record: EvseDataRecord) -> Self {
        let operator = record.operator_id().clone();
        match self
            .0
            .operator_evse_data
            .iter_mut()
            .find(|o| o.operator_id == operator)
        {
            Some(group) => group.evse_data_records.push(record),
            None => self
                .0
                .operator_evse_data
                .push(OperatorEvseData::new(operator, None).with_record(record)),
        }
        self
    }

    pub fn status_code(mut self, status_code: StatusCode) -> Self {
        self.0.status_code = status_code;
        self
    }

    pub fn to_immutable(self) -> PullEvseDataResponse {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_request, decode_response, encode_request, encode_response, read, render};
    use crate::domain::records::evse_data_record::fixtures::sample_record;
    use crate::domain::version::OicpVersion;
    use serde_json::json;

    fn request() -> PullEvseDataRequest {
        PullEvseDataRequest::new(ProviderId::parse("DE-GDF").unwrap()).with_search_center(SearchCenter {
            geo_coordinates: GeoCoordinates::new(50.9, 11.5),
            radius_km: Decimal::new(25, 0),
        })
    }

    #[test]
    fn request_round_trips() {
        let original = request();
        for &version in OicpVersion::ALL {
            let ctx = CodecContext::new(version);
            let text = render(&encode_request(&original, &ctx, None), version).unwrap();
            let element = read(&text, version, ROOT).unwrap();
            let parsed: PullEvseDataRequest = decode_request(&element, &ctx, None).unwrap().unwrap();
            assert_eq!(parsed, original, "{}", version);
        }
    }

    #[test]
    fn rest_response_is_a_single_page() {
        let ctx = CodecContext::new(OicpVersion::V2_3);
        let response = PullEvseDataResponseBuilder::new(None).record(sample_record()).to_immutable();
        let body = response.encode(&ctx);
        assert_eq!(body["totalElements"], 1);
        assert_eq!(body["content"][0]["EvseID"], "DE*GEF*E1234567*A*1");

        let parsed = PullEvseDataResponse::decode(&body, None, &ctx).unwrap();
        assert_eq!(parsed, response);
    }

    #[test]
    fn soap_response_groups_per_operator() {
        let version = OicpVersion::V2_2;
        let ctx = CodecContext::new(version);
        let response = PullEvseDataResponseBuilder::new(None).record(sample_record()).to_immutable();
        let text = render(&encode_response(&response, &ctx, None), version).unwrap();
        assert!(text.contains("<EVSEData:eRoamingEvseData>"));

        let element = read(&text, version, RESPONSE_ROOT).unwrap();
        let parsed = decode_response::<PullEvseDataRequest, PullEvseDataResponse>(&element, None, &ctx, None)
            .unwrap()
            .unwrap();
        assert_eq!(parsed.records().count(), 1);
        assert_eq!(parsed, response);
    }

    #[test]
    fn empty_and_statusless_responses() {
        let ctx = CodecContext::new(OicpVersion::V2_1);
        let parsed = PullEvseDataResponse::decode(&json!({"EvseData": ""}), None, &ctx).unwrap();
        assert!(parsed.operator_evse_data.is_empty());
        assert!(parsed.status_code.is_success());
    }
}
