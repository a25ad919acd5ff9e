//! Generic acknowledgement returned by push, CDR and remote operations.

use std::sync::Arc;

use serde_json::Value;

use super::ResponseContext;
use crate::codec::{CodecContext, Fields, Obj, WireRequest, WireResponse};
use crate::domain::identifiers::{CpoPartnerSessionId, EmpPartnerSessionId, SessionId};
use crate::domain::types::StatusCode;
use crate::support::errors::CodecError;

const ROOT: &str = "eRoamingAcknowledgement";

#[derive(Debug, PartialEq)]
pub struct Acknowledgement<Req> {
    pub request: Option<Arc<Req>>,
    pub result: bool,
    pub status_code: StatusCode,
    pub session_id: Option<SessionId>,
    pub cpo_partner_session_id: Option<CpoPartnerSessionId>,
    pub emp_partner_session_id: Option<EmpPartnerSessionId>,
    pub context: ResponseContext,
}

impl<Req: WireRequest> Acknowledgement<Req> {
    pub fn success(request: Option<Arc<Req>>) -> Self {
        Self::from_status(request, StatusCode::success())
    }

    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn to_builder(&self) -> AcknowledgementBuilder<Req> {
        AcknowledgementBuilder(self.clone())
    }
}

impl<Req> Clone for Acknowledgement<Req> {
    fn clone(&self) -> Self {
        Self {
            request: self.request.clone(),
            result: self.result,
            status_code: self.status_code.clone(),
            session_id: self.session_id.clone(),
            cpo_partner_session_id: self.cpo_partner_session_id.clone(),
            emp_partner_session_id: self.emp_partner_session_id.clone(),
            context: self.context.clone(),
        }
    }
}

impl<Req: WireRequest> WireResponse<Req> for Acknowledgement<Req> {
    const ROOT: &'static str = ROOT;

    fn decode(body: &Value, request: Option<Arc<Req>>, _ctx: &CodecContext) -> Result<Self, CodecError> {
        let f = Fields::new(ROOT, body)?;
        Ok(Self {
            request,
            result: f.required_bool("Result")?,
            status_code: StatusCode::from_fields(f.required_object("StatusCode")?)?,
            session_id: f.optional("SessionID")?,
            cpo_partner_session_id: f.optional("CPOPartnerSessionID")?,
            emp_partner_session_id: f.optional("EMPPartnerSessionID")?,
            context: ResponseContext::new(),
        })
    }

    fn encode(&self, _ctx: &CodecContext) -> Value {
        Obj::new()
            .boolean("Result", self.result)
            .value("StatusCode", self.status_code.to_value())
            .opt_text("SessionID", self.session_id.as_ref())
            .opt_text("CPOPartnerSessionID", self.cpo_partner_session_id.as_ref())
            .opt_text("EMPPartnerSessionID", self.emp_partner_session_id.as_ref())
            .build()
    }

    /// `Result` follows the status: true only for success.
    fn from_status(request: Option<Arc<Req>>, status_code: StatusCode) -> Self {
        let context = request
            .as_ref()
            .map(|r| ResponseContext::for_request(r.context()))
            .unwrap_or_default();
        Self {
            request,
            result: status_code.is_success(),
            status_code,
            session_id: None,
            cpo_partner_session_id: None,
            emp_partner_session_id: None,
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

#[derive(Debug)]
pub struct AcknowledgementBuilder<Req>(pub Acknowledgement<Req>);

impl<Req: WireRequest> AcknowledgementBuilder<Req> {
    pub fn new(request: Option<Arc<Req>>) -> Self {
        Self(Acknowledgement::success(request))
    }

    pub fn result(mut self, result: bool) -> Self {
        self.0.result = result;
        self
    }

    pub fn status_code(mut self, status_code: StatusCode) -> Self {
        self.0.status_code = status_code;
        self
    }

    pub fn session_id(mut self, session_id: SessionId) -> Self {
        self.0.session_id = Some(session_id);
        self
    }

    pub fn cpo_partner_session_id(mut self, id: CpoPartnerSessionId) -> Self {
        self.0.cpo_partner_session_id = Some(id);
        self
    }

    pub fn emp_partner_session_id(mut self, id: EmpPartnerSessionId) -> Self {
        self.0.emp_partner_session_id = Some(id);
        self
    }

    pub fn to_immutable(self) -> Acknowledgement<Req> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_response, encode_response, read, render};
    use crate::domain::version::OicpVersion;
    use crate::messages::push_evse_status::PushEvseStatusRequest;
    use serde_json::json;

    type Ack = Acknowledgement<PushEvseStatusRequest>;

    #[test]
    fn result_follows_status() {
        assert!(Ack::success(None).result);
        let error = Ack::system_error(None, "boom", Some("trace".into()));
        assert!(!error.result);
        assert_eq!(error.status_code.to_string(), "021 boom (trace)");
    }

    #[test]
    fn soap_acknowledgement_is_common_types() {
        let ack = AcknowledgementBuilder::<PushEvseStatusRequest>::new(None)
            .session_id(SessionId::parse("b2688855-7f00-0002-6d8e-48d883f6abb6").unwrap())
            .to_immutable();
        let ctx = CodecContext::new(OicpVersion::V2_1);
        let text = render(&encode_response(&ack, &ctx, None), OicpVersion::V2_1).unwrap();
        assert!(text.contains("<CommonTypes:eRoamingAcknowledgement>"));
        assert!(text.contains("<CommonTypes:Result>true</CommonTypes:Result>"));

        let element = read(&text, OicpVersion::V2_1, ROOT).unwrap();
        let parsed = decode_response::<PushEvseStatusRequest, Ack>(&element, None, &ctx, None)
            .unwrap()
            .unwrap();
        assert_eq!(parsed, ack);
    }

    #[test]
    fn json_result_accepts_text_booleans() {
        let body = json!({"Result": "false", "StatusCode": {"Code": "018"}});
        let ack = Ack::decode(&body, None, &CodecContext::new(OicpVersion::V2_3)).unwrap();
        assert!(!ack.result);
        assert_eq!(ack.status_code.code.code(), "018");
    }
}
