//! Wire codec
//!
//! Messages decode from and encode to a JSON object model named after the
//! OICP 2.3 elements. OICP 2.3 sends that model as JSON; 2.0 - 2.2 bridge it
//! to XML through the version [`Schema`] and wrap it in a SOAP envelope.
//!
//! Decoding is a fixed sequence: root identity check (a mismatch is a routing
//! signal, not an error), required and optional fields, choice resolution,
//! then the caller's [`CustomParser`] as the final transform. Encoding runs
//! the [`CustomSerializer`] last.

pub mod accessors;
pub mod schema;
pub mod soap;
pub mod xml;

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::identifiers::{OperatorId, ProviderId};
use crate::domain::types::StatusCode;
use crate::domain::version::OicpVersion;
use crate::messages::{RequestContext, ResponseContext};
use crate::support::errors::{panic_message, CodecError};

pub use accessors::{Fields, Obj};
pub use schema::{Namespace, Schema};
pub use soap::SoapFrame;

/// Final transform applied to a decoded message: receives the raw body and
/// the parsed value and may override anything.
pub type CustomParser<T> = Arc<dyn Fn(&Value, T) -> T + Send + Sync>;

/// Final transform applied to an encoded message body.
pub type CustomSerializer<T> = Arc<dyn Fn(&T, Value) -> Value + Send + Sync>;

/// Ambient values a decoder may need that are not in the body, e.g. the
/// operator id from a REST path.
#[derive(Debug, Clone, Default)]
pub struct CodecContext {
    pub version: OicpVersion,
    pub operator_id: Option<OperatorId>,
    pub provider_id: Option<ProviderId>,
    pub request_context: RequestContext,
}

impl CodecContext {
    pub fn new(version: OicpVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    pub fn with_operator(mut self, operator_id: Option<OperatorId>) -> Self {
        self.operator_id = operator_id;
        self
    }

    pub fn with_provider(mut self, provider_id: Option<ProviderId>) -> Self {
        self.provider_id = provider_id;
        self
    }

    pub fn with_request_context(mut self, context: RequestContext) -> Self {
        self.request_context = context;
        self
    }

    pub fn is_rest(&self) -> bool {
        self.version.is_rest()
    }
}

/// A message root: element name plus its body in the object model.
#[derive(Debug, Clone, PartialEq)]
pub struct WireElement {
    pub name: String,
    pub body: Value,
}

impl WireElement {
    pub fn new(name: impl Into<String>, body: Value) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

pub trait WireRequest: Sized + Send + Sync + fmt::Debug + 'static {
    const ROOT: &'static str;

    fn decode(body: &Value, ctx: &CodecContext) -> Result<Self, CodecError>;

    fn encode(&self, ctx: &CodecContext) -> Value;

    fn context(&self) -> &RequestContext;
}

pub trait WireResponse<Req>: Sized + Send + Sync + fmt::Debug + 'static {
    const ROOT: &'static str;

    fn decode(body: &Value, request: Option<Arc<Req>>, ctx: &CodecContext) -> Result<Self, CodecError>;

    fn encode(&self, ctx: &CodecContext) -> Value;

    /// A response carrying only a status; payload fields take their empty
    /// defaults.
    fn from_status(request: Option<Arc<Req>>, status: StatusCode) -> Self;

    fn status_code(&self) -> &StatusCode;

    fn response_context_mut(&mut self) -> &mut ResponseContext;

    fn system_error(request: Option<Arc<Req>>, description: &str, additional_info: Option<String>) -> Self {
        Self::from_status(request, StatusCode::system_error(description, additional_info))
    }

    fn data_error(request: Option<Arc<Req>>, description: &str, additional_info: Option<String>) -> Self {
        Self::from_status(request, StatusCode::data_error(description, additional_info))
    }
}

fn root_matches(element: &WireElement, root: &str) -> bool {
    element.name.rsplit(':').next() == Some(root)
}

// ── Decode ─────────────────────────────────────────────────────

pub fn decode_request<T: WireRequest>(
    element: &WireElement,
    ctx: &CodecContext,
    parser: Option<&CustomParser<T>>,
) -> Result<Option<T>, CodecError> {
    if !root_matches(element, T::ROOT) {
        return Ok(None);
    }
    let parsed = T::decode(&element.body, ctx)?;
    Ok(Some(apply_parser(parser, &element.body, parsed)?))
}

pub fn decode_response<Req, T: WireResponse<Req>>(
    element: &WireElement,
    request: Option<Arc<Req>>,
    ctx: &CodecContext,
    parser: Option<&CustomParser<T>>,
) -> Result<Option<T>, CodecError> {
    if !root_matches(element, T::ROOT) {
        return Ok(None);
    }
    let parsed = T::decode(&element.body, request, ctx)?;
    Ok(Some(apply_parser(parser, &element.body, parsed)?))
}

/// A panicking parser fails the decode like a malformed body would.
fn apply_parser<T>(parser: Option<&CustomParser<T>>, body: &Value, parsed: T) -> Result<T, CodecError> {
    let Some(parser) = parser else {
        return Ok(parsed);
    };
    catch_unwind(AssertUnwindSafe(|| parser(body, parsed)))
        .map_err(|panic| CodecError::Hook(panic_message(panic.as_ref())))
}

/// A panicking serializer is skipped and the encoded body is kept.
fn apply_serializer<T>(serializer: Option<&CustomSerializer<T>>, message: &T, body: Value, root: &str) -> Value {
    let Some(serializer) = serializer else {
        return body;
    };
    let fallback = body.clone();
    match catch_unwind(AssertUnwindSafe(|| serializer(message, body))) {
        Ok(body) => body,
        Err(panic) => {
            warn!(root, error = %panic_message(panic.as_ref()), "Custom serializer panicked");
            fallback
        }
    }
}

/// [`decode_request`] reporting failures through `on_exception` instead of
/// returning them.
pub fn try_decode_request<T: WireRequest>(
    element: &WireElement,
    ctx: &CodecContext,
    parser: Option<&CustomParser<T>>,
    on_exception: impl FnOnce(&CodecError),
) -> Option<T> {
    match decode_request(element, ctx, parser) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(root = T::ROOT, error = %e, "Failed to decode request");
            on_exception(&e);
            None
        }
    }
}

pub fn try_decode_response<Req, T: WireResponse<Req>>(
    element: &WireElement,
    request: Option<Arc<Req>>,
    ctx: &CodecContext,
    parser: Option<&CustomParser<T>>,
    on_exception: impl FnOnce(&CodecError),
) -> Option<T> {
    match decode_response(element, request, ctx, parser) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(root = T::ROOT, error = %e, "Failed to decode response");
            on_exception(&e);
            None
        }
    }
}

// ── Encode ─────────────────────────────────────────────────────

pub fn encode_request<T: WireRequest>(
    request: &T,
    ctx: &CodecContext,
    serializer: Option<&CustomSerializer<T>>,
) -> WireElement {
    let body = apply_serializer(serializer, request, request.encode(ctx), T::ROOT);
    WireElement::new(T::ROOT, body)
}

pub fn encode_response<Req, T: WireResponse<Req>>(
    response: &T,
    ctx: &CodecContext,
    serializer: Option<&CustomSerializer<T>>,
) -> WireElement {
    let body = apply_serializer(serializer, response, response.encode(ctx), T::ROOT);
    WireElement::new(T::ROOT, body)
}

// ── Text ───────────────────────────────────────────────────────

pub fn content_type(version: OicpVersion) -> &'static str {
    if version.is_rest() {
        "application/json;charset=utf-8"
    } else {
        "text/xml;charset=utf-8"
    }
}

/// Render an element as the payload text for `version`.
pub fn render(element: &WireElement, version: OicpVersion) -> Result<String, CodecError> {
    if version.is_rest() {
        return Ok(serde_json::to_string(&element.body)?);
    }
    let schema = Schema::new(version);
    SoapFrame::Body(xml::element_to_node(element, &schema)).serialize(&schema)
}

/// Read a payload. JSON bodies carry no root element, so the caller names
/// the one it expects; SOAP bodies carry their own.
pub fn read(payload: &str, version: OicpVersion, json_root: &str) -> Result<WireElement, CodecError> {
    if version.is_rest() {
        let body: Value = serde_json::from_str(payload)?;
        if !body.is_object() {
            return Err(CodecError::NotAnObject("request body"));
        }
        return Ok(WireElement::new(json_root, body));
    }

    let schema = Schema::new(version);
    match SoapFrame::parse(payload)? {
        SoapFrame::Body(node) => Ok(xml::node_to_element(&node, &schema)),
        SoapFrame::Fault { code, reason } => Err(CodecError::Soap(format!("{}: {}", code, reason))),
    }
}
