//! Remote start and stop: an EMP asks a CPO to start or stop charging at an
//! EVSE on behalf of a customer.

use serde_json::Value;

use super::{Acknowledgement, Operation, OperationKind, RequestContext};
use crate::codec::{CodecContext, Fields, Obj, WireRequest};
use crate::domain::identifiers::{
    CpoPartnerSessionId, EmpPartnerSessionId, EvseId, PartnerProductId, ProviderId, SessionId,
};
use crate::domain::types::Identification;
use crate::support::errors::CodecError;

const START_ROOT: &str = "eRoamingAuthorizeRemoteStart";
const STOP_ROOT: &str = "eRoamingAuthorizeRemoteStop";

pub struct AuthorizeRemoteStart;

impl Operation for AuthorizeRemoteStart {
    const KIND: OperationKind = OperationKind::AuthorizeRemoteStart;

    type Request = AuthorizeRemoteStartRequest;
    type Response = Acknowledgement<AuthorizeRemoteStartRequest>;
}

pub struct AuthorizeRemoteStop;

impl Operation for AuthorizeRemoteStop {
    const KIND: OperationKind = OperationKind::AuthorizeRemoteStop;

    type Request = AuthorizeRemoteStopRequest;
    type Response = Acknowledgement<AuthorizeRemoteStopRequest>;
}

fn provider(f: &Fields<'_>, ctx: &CodecContext, root: &'static str) -> Result<ProviderId, CodecError> {
    match f.optional::<ProviderId>("ProviderID")? {
        Some(id) => Ok(id),
        None => ctx.provider_id.clone().ok_or(CodecError::MissingField {
            context: root,
            field: "ProviderID",
        }),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizeRemoteStartRequest {
    pub provider_id: ProviderId,
    pub evse_id: EvseId,
    pub identification: Identification,
    pub session_id: Option<SessionId>,
    pub cpo_partner_session_id: Option<CpoPartnerSessionId>,
    pub emp_partner_session_id: Option<EmpPartnerSessionId>,
    pub partner_product_id: Option<PartnerProductId>,
    pub context: RequestContext,
}

impl AuthorizeRemoteStartRequest {
    pub fn new(provider_id: ProviderId, evse_id: EvseId, identification: Identification) -> Self {
        Self {
            provider_id,
            evse_id,
            identification,
            session_id: None,
            cpo_partner_session_id: None,
            emp_partner_session_id: None,
            partner_product_id: None,
            context: RequestContext::new(),
        }
    }

    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_product(mut self, partner_product_id: PartnerProductId) -> Self {
        self.partner_product_id = Some(partner_product_id);
        self
    }
}

impl WireRequest for AuthorizeRemoteStartRequest {
    const ROOT: &'static str = START_ROOT;

    fn decode(body: &Value, ctx: &CodecContext) -> Result<Self, CodecError> {
        let f = Fields::new(START_ROOT, body)?;
        Ok(Self {
            provider_id: provider(&f, ctx, START_ROOT)?,
            evse_id: f.required("EvseID")?,
            identification: Identification::from_fields(f.required_object("Identification")?)?,
            session_id: f.optional("SessionID")?,
            cpo_partner_session_id: f.optional("CPOPartnerSessionID")?,
            emp_partner_session_id: f.optional("EMPPartnerSessionID")?,
            partner_product_id: f.optional("PartnerProductID")?,
            context: ctx.request_context.clone(),
        })
    }

    fn encode(&self, _ctx: &CodecContext) -> Value {
        Obj::new()
            .opt_text("SessionID", self.session_id.as_ref())
            .opt_text("CPOPartnerSessionID", self.cpo_partner_session_id.as_ref())
            .opt_text("EMPPartnerSessionID", self.emp_partner_session_id.as_ref())
            .text("ProviderID", &self.provider_id)
            .text("EvseID", &self.evse_id)
            .value("Identification", self.identification.to_value())
            .opt_text("PartnerProductID", self.partner_product_id.as_ref())
            .build()
    }

    fn context(&self) -> &RequestContext {
        &self.context
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizeRemoteStopRequest {
    pub session_id: SessionId,
    pub provider_id: ProviderId,
    pub evse_id: EvseId,
    pub cpo_partner_session_id: Option<CpoPartnerSessionId>,
    pub emp_partner_session_id: Option<EmpPartnerSessionId>,
    pub context: RequestContext,
}

impl AuthorizeRemoteStopRequest {
    pub fn new(session_id: SessionId, provider_id: ProviderId, evse_id: EvseId) -> Self {
        Self {
            session_id,
            provider_id,
            evse_id,
            cpo_partner_session_id: None,
            emp_partner_session_id: None,
            context: RequestContext::new(),
        }
    }
}

impl WireRequest for AuthorizeRemoteStopRequest {
    const ROOT: &'static str = STOP_ROOT;

    fn decode(body: &Value, ctx: &CodecContext) -> Result<Self, CodecError> {
        let f = Fields::new(STOP_ROOT, body)?;
        Ok(Self {
            session_id: f.required("SessionID")?,
            provider_id: provider(&f, ctx, STOP_ROOT)?,
            evse_id: f.required("EvseID")?,
            cpo_partner_session_id: f.optional("CPOPartnerSessionID")?,
            emp_partner_session_id: f.optional("EMPPartnerSessionID")?,
            context: ctx.request_context.clone(),
        })
    }

    fn encode(&self, _ctx: &CodecContext) -> Value {
        Obj::new()
            .text("SessionID", &self.session_id)
            .opt_text("CPOPartnerSessionID", self.cpo_partner_session_id.as_ref())
            .opt_text("EMPPartnerSessionID", self.emp_partner_session_id.as_ref())
            .text("ProviderID", &self.provider_id)
            .text("EvseID", &self.evse_id)
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
    use crate::domain::identifiers::EvcoId;
    use crate::domain::version::OicpVersion;
    use serde_json::json;

    #[test]
    fn remote_start_round_trips() {
        let original = AuthorizeRemoteStartRequest::new(
            ProviderId::parse("DE-GDF").unwrap(),
            EvseId::parse("DE*GEF*E1234567*A*1").unwrap(),
            Identification::remote(EvcoId::parse("DE-GDF-C12345678-X").unwrap()),
        )
        .with_session(SessionId::new_random())
        .with_product(PartnerProductId::parse("AC1").unwrap());

        for &version in OicpVersion::ALL {
            let ctx = CodecContext::new(version);
            let text = render(&encode_request(&original, &ctx, None), version).unwrap();
            let element = read(&text, version, START_ROOT).unwrap();
            let parsed: AuthorizeRemoteStartRequest = decode_request(&element, &ctx, None).unwrap().unwrap();
            assert_eq!(parsed, original, "{}", version);
        }
    }

    #[test]
    fn remote_start_requires_a_provider() {
        let body = json!({
            "EvseID": "DE*GEF*E1",
            "Identification": {"RemoteIdentification": {"EvcoID": "DE-GDF-C12345678-X"}}
        });
        let ctx = CodecContext::new(OicpVersion::V2_3);
        let err = AuthorizeRemoteStartRequest::decode(&body, &ctx).unwrap_err();
        assert!(err.to_string().contains("ProviderID"));

        let ctx = ctx.with_provider(ProviderId::try_parse("DE-GDF"));
        assert!(AuthorizeRemoteStartRequest::decode(&body, &ctx).is_ok());
    }

    #[test]
    fn remote_stop_round_trips() {
        let original = AuthorizeRemoteStopRequest::new(
            SessionId::parse("b2688855-7f00-0002-6d8e-48d883f6abb6").unwrap(),
            ProviderId::parse("DE-GDF").unwrap(),
            EvseId::parse("DE*GEF*E1").unwrap(),
        );
        let ctx = CodecContext::new(OicpVersion::V2_3);
        let parsed: AuthorizeRemoteStopRequest = decode_request(&encode_request(&original, &ctx, None), &ctx, None)
            .unwrap()
            .unwrap();
        assert_eq!(parsed, original);
    }
}
