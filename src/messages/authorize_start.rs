//! AuthorizeStart: a CPO asks whether an identification may start charging.

use std::sync::Arc;

use serde_json::Value;

use super::{Operation, OperationKind, RequestContext, ResponseContext};
use crate::codec::{CodecContext, Fields, Obj, WireRequest, WireResponse};
use crate::domain::identifiers::{
    CpoPartnerSessionId, EmpPartnerSessionId, EvseId, OperatorId, PartnerProductId, ProviderId,
    SessionId,
};
use crate::domain::types::{AuthorizationStatus, Identification, StatusCode};
use crate::support::errors::{BuilderError, CodecError};

const ROOT: &str = "eRoamingAuthorizeStart";
const RESPONSE_ROOT: &str = "eRoamingAuthorizationStart";

pub struct AuthorizeStart;

impl Operation for AuthorizeStart {
    const KIND: OperationKind = OperationKind::AuthorizeStart;

    type Request = AuthorizeStartRequest;
    type Response = AuthorizationStart;
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizeStartRequest {
    pub operator_id: OperatorId,
    pub identification: Identification,
    pub evse_id: Option<EvseId>,
    pub partner_product_id: Option<PartnerProductId>,
    pub session_id: Option<SessionId>,
    pub cpo_partner_session_id: Option<CpoPartnerSessionId>,
    pub emp_partner_session_id: Option<EmpPartnerSessionId>,
    pub context: RequestContext,
}

impl AuthorizeStartRequest {
    pub fn new(operator_id: OperatorId, identification: Identification) -> Self {
        Self {
            operator_id,
            identification,
            evse_id: None,
            partner_product_id: None,
            session_id: None,
            cpo_partner_session_id: None,
            emp_partner_session_id: None,
            context: RequestContext::new(),
        }
    }

    pub fn with_evse(mut self, evse_id: EvseId) -> Self {
        self.evse_id = Some(evse_id);
        self
    }

    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn to_builder(&self) -> AuthorizeStartRequestBuilder {
        AuthorizeStartRequestBuilder::from(self)
    }
}

impl WireRequest for AuthorizeStartRequest {
    const ROOT: &'static str = ROOT;

    /// The operator comes from the body, or from the REST path when the body
    /// omits it.
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
            identification: Identification::from_fields(f.required_object("Identification")?)?,
            evse_id: f.optional("EvseID")?,
            partner_product_id: f.optional("PartnerProductID")?,
            session_id: f.optional("SessionID")?,
            cpo_partner_session_id: f.optional("CPOPartnerSessionID")?,
            emp_partner_session_id: f.optional("EMPPartnerSessionID")?,
            context: ctx.request_context.clone(),
        })
    }

    fn encode(&self, _ctx: &CodecContext) -> Value {
        Obj::new()
            .opt_text("SessionID", self.session_id.as_ref())
            .opt_text("CPOPartnerSessionID", self.cpo_partner_session_id.as_ref())
            .opt_text("EMPPartnerSessionID", self.emp_partner_session_id.as_ref())
            .text("OperatorID", &self.operator_id)
            .opt_text("EvseID", self.evse_id.as_ref())
            .value("Identification", self.identification.to_value())
            .opt_text("PartnerProductID", self.partner_product_id.as_ref())
            .build()
    }

    fn context(&self) -> &RequestContext {
        &self.context
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthorizeStartRequestBuilder {
    pub operator_id: Option<OperatorId>,
    pub identification: Option<Identification>,
    pub evse_id: Option<EvseId>,
    pub partner_product_id: Option<PartnerProductId>,
    pub session_id: Option<SessionId>,
    pub cpo_partner_session_id: Option<CpoPartnerSessionId>,
    pub emp_partner_session_id: Option<EmpPartnerSessionId>,
    pub context: RequestContext,
}

impl AuthorizeStartRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn operator_id(mut self, operator_id: OperatorId) -> Self {
        self.operator_id = Some(operator_id);
        self
    }

    pub fn identification(mut self, identification: Identification) -> Self {
        self.identification = Some(identification);
        self
    }

    pub fn evse_id(mut self, evse_id: EvseId) -> Self {
        self.evse_id = Some(evse_id);
        self
    }

    pub fn to_immutable(self) -> Result<AuthorizeStartRequest, BuilderError> {
        let missing = |field| BuilderError {
            builder: "AuthorizeStartRequestBuilder",
            field,
        };
        Ok(AuthorizeStartRequest {
            operator_id: self.operator_id.ok_or_else(|| missing("operator_id"))?,
            identification: self.identification.ok_or_else(|| missing("identification"))?,
            evse_id: self.evse_id,
            partner_product_id: self.partner_product_id,
            session_id: self.session_id,
            cpo_partner_session_id: self.cpo_partner_session_id,
            emp_partner_session_id: self.emp_partner_session_id,
            context: self.context,
        })
    }
}

impl From<&AuthorizeStartRequest> for AuthorizeStartRequestBuilder {
    fn from(r: &AuthorizeStartRequest) -> Self {
        Self {
            operator_id: Some(r.operator_id.clone()),
            identification: Some(r.identification.clone()),
            evse_id: r.evse_id.clone(),
            partner_product_id: r.partner_product_id.clone(),
            session_id: r.session_id.clone(),
            cpo_partner_session_id: r.cpo_partner_session_id.clone(),
            emp_partner_session_id: r.emp_partner_session_id.clone(),
            context: r.context.clone(),
        }
    }
}

/// Answer to an [`AuthorizeStartRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizationStart {
    pub request: Option<Arc<AuthorizeStartRequest>>,
    pub authorization_status: AuthorizationStatus,
    pub status_code: StatusCode,
    pub session_id: Option<SessionId>,
    pub cpo_partner_session_id: Option<CpoPartnerSessionId>,
    pub emp_partner_session_id: Option<EmpPartnerSessionId>,
    pub provider_id: Option<ProviderId>,
    /// Identifications that may stop the session besides the starting one.
    pub authorization_stop_identifications: Vec<Identification>,
    pub context: ResponseContext,
}

impl AuthorizationStart {
    pub fn authorized(
        request: Option<Arc<AuthorizeStartRequest>>,
        session_id: SessionId,
        provider_id: Option<ProviderId>,
    ) -> Self {
        let mut response = Self::from_status(request, StatusCode::success());
        response.authorization_status = AuthorizationStatus::Authorized;
        response.session_id = Some(session_id);
        response.provider_id = provider_id;
        response
    }

    pub fn not_authorized(request: Option<Arc<AuthorizeStartRequest>>, status_code: StatusCode) -> Self {
        Self::from_status(request, status_code)
    }

    pub fn is_authorized(&self) -> bool {
        self.authorization_status == AuthorizationStatus::Authorized
    }

    pub fn to_builder(&self) -> AuthorizationStartBuilder {
        AuthorizationStartBuilder(self.clone())
    }
}

impl WireResponse<AuthorizeStartRequest> for AuthorizationStart {
    const ROOT: &'static str = RESPONSE_ROOT;

    fn decode(
        body: &Value,
        request: Option<Arc<AuthorizeStartRequest>>,
        _ctx: &CodecContext,
    ) -> Result<Self, CodecError> {
        let f = Fields::new(RESPONSE_ROOT, body)?;
        let emp_partner_session_id = f.optional("EMPPartnerSessionID")?;
        let cpo_partner_session_id = f.optional("CPOPartnerSessionID")?;

        Ok(Self {
            request,
            authorization_status: f.required("AuthorizationStatus")?,
            status_code: StatusCode::from_fields(f.required_object("StatusCode")?)?,
            session_id: f.optional("SessionID")?,
            cpo_partner_session_id,
            emp_partner_session_id,
            provider_id: f.optional("ProviderID")?,
            authorization_stop_identifications: f
                .objects("AuthorizationStopIdentifications", Identification::from_fields)?,
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
            .list(
                "AuthorizationStopIdentifications",
                self.authorization_stop_identifications
                    .iter()
                    .map(|i| i.to_value()),
            )
            .build()
    }

    fn from_status(request: Option<Arc<AuthorizeStartRequest>>, status_code: StatusCode) -> Self {
        let context = request
            .as_ref()
            .map(|r| ResponseContext::for_request(&r.context))
            .unwrap_or_default();
        let (session_id, cpo_partner_session_id, emp_partner_session_id) = match &request {
            Some(r) => (
                r.session_id.clone(),
                r.cpo_partner_session_id.clone(),
                r.emp_partner_session_id.clone(),
            ),
            None => (None, None, None),
        };
        Self {
            request,
            authorization_status: AuthorizationStatus::NotAuthorized,
            status_code,
            session_id,
            cpo_partner_session_id,
            emp_partner_session_id,
            provider_id: None,
            authorization_stop_identifications: Vec::new(),
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

/// Mutable copy of an [`AuthorizationStart`].
#[derive(Debug, Clone)]
pub struct AuthorizationStartBuilder(pub AuthorizationStart);

impl AuthorizationStartBuilder {
    pub fn new(request: Option<Arc<AuthorizeStartRequest>>) -> Self {
        Self(AuthorizationStart::from_status(request, StatusCode::success()))
    }

    pub fn authorization_status(mut self, status: AuthorizationStatus) -> Self {
        self.0.authorization_status = status;
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

    pub fn provider_id(mut self, provider_id: ProviderId) -> Self {
        self.0.provider_id = Some(provider_id);
        self
    }

    pub fn stop_identification(mut self, identification: Identification) -> Self {
        self.0.authorization_stop_identifications.push(identification);
        self
    }

    pub fn to_immutable(self) -> AuthorizationStart {
        self.0
    }
}
