//! AuthorizeStop: a CPO asks whether an identification may end a session.

use std::sync::Arc;

use serde_json::Value;

use super::{Operation, OperationKind, RequestContext, ResponseContext};
use crate::codec::{CodecContext, Fields, Obj, WireRequest, WireResponse};
use crate::domain::identifiers::{
    CpoPartnerSessionId, EmpPartnerSessionId, EvseId, OperatorId, ProviderId, SessionId,
};
use crate::domain::types::{AuthorizationStatus, Identification, StatusCode};
use crate::support::errors::{BuilderError, CodecError};

const ROOT: &str = "eRoamingAuthorizeStop";
const RESPONSE_ROOT: &str = "eRoamingAuthorizationStop";

pub struct AuthorizeStop;

impl Operation for AuthorizeStop {
    const KIND: OperationKind = OperationKind::AuthorizeStop;

    type Request = AuthorizeStopRequest;
    type Response = AuthorizationStop;
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizeStopRequest {
    pub operator_id: OperatorId,
    pub session_id: SessionId,
    pub identification: Identification,
    pub evse_id: Option<EvseId>,
    pub cpo_partner_session_id: Option<CpoPartnerSessionId>,
    pub emp_partner_session_id: Option<EmpPartnerSessionId>,
    pub context: RequestContext,
}

impl AuthorizeStopRequest {
    pub fn new(operator_id: OperatorId, session_id: SessionId, identification: Identification) -> Self {
        Self {
            operator_id,
            session_id,
            identification,
            evse_id: None,
            cpo_partner_session_id: None,
            emp_partner_session_id: None,
            context: RequestContext::new(),
        }
    }

    pub fn with_evse(mut self, evse_id: EvseId) -> Self {
        self.evse_id = Some(evse_id);
        self
    }

    pub fn to_builder(&self) -> AuthorizeStopRequestBuilder {
        AuthorizeStopRequestBuilder::from(self)
    }
}

impl WireRequest for AuthorizeStopRequest {
    const ROOT: &'static str = ROOT;

    fn decode(body: &Value, ctx: &CodecContext) -> Result<Self, CodecError> {
        let f = Fields::new(ROOT, body)?;
        let operator_id = match f.optional::<OperatorId>("OperatorID")? {
            Some(id) => id,
            None => ctx.operator_id.clone().ok_or(CodecError::MissingField {
                context: ROOT,
                field: "OperatorID",
            })?,
        };

        Ok(Self {
            operator_id,
            session_id: f.required("SessionID")?,
            identification: Identification::from_fields(f.required_object("Identification")?)?,
            evse_id: f.optional("EvseID")?,
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
            .text("OperatorID", &self.operator_id)
            .opt_text("EvseID", self.evse_id.as_ref())
            .value("Identification", self.identification.to_value())
            .build()
    }

    fn context(&self) -> &RequestContext {
        &self.context
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthorizeStopRequestBuilder {
    pub operator_id: Option<OperatorId>,
    pub session_id: Option<SessionId>,
    pub identification: Option<Identification>,
    pub evse_id: Option<EvseId>,
    pub cpo_partner_session_id: Option<CpoPartnerSessionId>,
    pub emp_partner_session_id: Option<EmpPartnerSessionId>,
    pub context: RequestContext,
}

impl AuthorizeStopRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operator_id(mut self, operator_id: OperatorId) -> Self {
        self.operator_id = Some(operator_id);
        self
    }

    pub fn session_id(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn identification(mut self, identification: Identification) -> Self {
        self.identification = Some(identification);
        self
    }

    pub fn to_immutable(self) -> Result<AuthorizeStopRequest, BuilderError> {
        let missing = |field| BuilderError {
            builder: "AuthorizeStopRequestBuilder",
            field,
        };
        Ok(AuthorizeStopRequest {
            operator_id: self.operator_id.ok_or_else(|| missing("operator_id"))?,
            session_id: self.session_id.ok_or_else(|| missing("session_id"))?,
            identification: self.identification.ok_or_else(|| missing("identification"))?,
            evse_id: self.evse_id,
            cpo_partner_session_id: self.cpo_partner_session_id,
            emp_partner_session_id: self.emp_partner_session_id,
            context: self.context,
        })
    }
}

impl From<&AuthorizeStopRequest> for AuthorizeStopRequestBuilder {
    fn from(r: &AuthorizeStopRequest) -> Self {
        Self {
            operator_id: Some(r.operator_id.clone()),
            session_id: Some(r.session_id.clone()),
            identification: Some(r.identification.clone()),
            evse_id: r.evse_id.clone(),
            cpo_partner_session_id: r.cpo_partner_session_id.clone(),
            emp_partner_session_id: r.emp_partner_session_id.clone(),
            context: r.context.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizationStop {
    pub request: Option<Arc<AuthorizeStopRequest>>,
    pub authorization_status: AuthorizationStatus,
    pub status_code: StatusCode,
    pub session_id: Option<SessionId>,
    pub cpo_partner_session_id: Option<CpoPartnerSessionId>,
    pub emp_partner_session_id: Option<EmpPartnerSessionId>,
    pub provider_id: Option<ProviderId>,
    pub context: ResponseContext,
}

impl AuthorizationStop {
    pub fn authorized(request: Option<Arc<AuthorizeStopRequest>>, provider_id: Option<ProviderId>) -> Self {
        let mut response = Self::from_status(request, StatusCode::success());
        response.authorization_status = AuthorizationStatus::Authorized;
        response.provider_id = provider_id;
        response
    }

    pub fn not_authorized(request: Option<Arc<AuthorizeStopRequest>>, status_code: StatusCode) -> Self {
        Self::from_status(request, status_code)
    }

    pub fn is_authorized(&self) -> bool {
        self.authorization_status == AuthorizationStatus::Authorized
    }

    pub fn to_builder(&self) -> AuthorizationStopBuilder {
        AuthorizationStopBuilder(self.clone())
    }
}

impl WireResponse<AuthorizeStopRequest> for AuthorizationStop {
    const ROOT: &'static str = RESPONSE_ROOT;

    fn decode(
        body: &Value,
        request: Option<Arc<AuthorizeStopRequest>>,
        _ctx: &CodecContext,
    ) -> Result<Self, CodecError> {
        let f = Fields::new(RESPONSE_ROOT, body)?;
        Ok(Self {
            request,
            authorization_status: f.required("AuthorizationStatus")?,
            status_code: StatusCode::from_fields(f.required_object("StatusCode")?)?,
            session_id: f.optional("SessionID")?,
            cpo_partner_session_id: f.optional("CPOPartnerSessionID")?,
            emp_partner_session_id: f.optional("EMPPartnerSessionID")?,
            provider_id: f.optional("ProviderID")?,
            context: ResponseContext::new(),
        })
    }

    fn encode(&self, _ctx: &CodecContext) -> Value {
        Obj::new()
            .opt_text("SessionID", self.session_id.as_ref())
            .opt_text("CPOPartnerSessionID", self.cpo_partner_session_id.as_ref())
            .opt_text("EMPPartnerSessionID", self.emp_partner_session_id.as_ref())
            .opt_text("ProviderID", self.provider_id.as_ref())
            .text("AuthorizationStatus", self.authorization_status)
            .value("StatusCode", self.status_code.to_value())
            .build()
    }

    fn from_status(request: Option<Arc<AuthorizeStopRequest>>, status_code: StatusCode) -> Self {
        let context = request
            .as_ref()
            .map(|r| ResponseContext::for_request(&r.context))
            .unwrap_or_default();
        Self {
            session_id: request.as_ref().map(|r| r.session_id.clone()),
            cpo_partner_session_id: request.as_ref().and_then(|r| r.cpo_partner_session_id.clone()),
            emp_partner_session_id: request.as_ref().and_then(|r| r.emp_partner_session_id.clone()),
            request,
            authorization_status: AuthorizationStatus::NotAuthorized,
            status_code,
            provider_id: None,
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
pub struct AuthorizationStopBuilder(pub AuthorizationStop);

impl AuthorizationStopBuilder {
    pub fn new(request: Option<Arc<AuthorizeStopRequest>>) -> Self {
        Self(AuthorizationStop::from_status(request, StatusCode::success()))
    }

    pub fn authorization_status(mut self, status: AuthorizationStatus) -> Self {
        self.0.authorization_status = status;
        self
    }

    pub fn status_code(mut self, status_code: StatusCode) -> Self {
        self.0.status_code = status_code;
        self
    }

    pub fn provider_id(mut self, provider_id: ProviderId) -> Self {
        self.0.provider_id = Some(provider_id);
        self
    }

    pub fn to_immutable(self) -> AuthorizationStop {
        self.0
    }
}
