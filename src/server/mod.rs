//! OICP server
//!
//! [`OicpServer::handle_request`] is the transport-independent entry point:
//! it routes an inbound payload to its operation, runs the lifecycle and
//! always answers with a well-formed protocol response. [`http`] mounts it
//! on axum.

pub mod dispatch;
pub mod endpoints;
pub mod events;
pub mod http;

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::http::Method;
use chrono::Utc;
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::codec::{self, CodecContext, Obj, WireElement};
use crate::domain::identifiers::{OperatorId, ProviderId};
use crate::domain::types::StatusCode;
use crate::domain::version::OicpVersion;
use crate::messages::{Operation, OperationKind, RequestContext};
use crate::support::counters::Counters;
use crate::support::errors::CodecError;

pub use dispatch::{HandlerResult, OperationHub, COULD_NOT_PROCESS};
pub use endpoints::Route;
pub use events::{
    EventList, ExceptionEvent, RequestEvent, ResponseEvent, WireRequestEvent, WireResponseEvent,
};

const PLAIN_TEXT: &str = "text/plain;charset=utf-8";

/// A request as received by the HTTP layer.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub path: String,
    pub body: String,
    /// Set when the raw body could not be decoded as text; such requests
    /// are answered with a data error instead of being parsed.
    pub body_error: Option<String>,
    /// Cancelled when the transport gives up on the request.
    pub cancellation: CancellationToken,
}

impl InboundRequest {
    pub fn post(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: body.into(),
            body_error: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Request from raw bytes. Invalid UTF-8 is kept as `body_error`.
    pub fn from_bytes(method: Method, path: impl Into<String>, body: &[u8]) -> Self {
        let (body, body_error) = match std::str::from_utf8(body) {
            Ok(text) => (text.to_string(), None),
            Err(e) => (String::new(), Some(e.to_string())),
        };
        Self {
            method,
            path: path.into(),
            body,
            body_error,
            cancellation: CancellationToken::new(),
        }
    }

    fn read(&self, version: OicpVersion, json_root: &str) -> Result<WireElement, CodecError> {
        match &self.body_error {
            Some(reason) => Err(CodecError::Encoding(reason.clone())),
            None => codec::read(&self.body, version, json_root),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl OutboundResponse {
    fn plain(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: PLAIN_TEXT,
            body: body.to_string(),
        }
    }
}

pub struct OicpServer {
    version: OicpVersion,
    hubs: DashMap<OperationKind, Arc<dyn Any + Send + Sync>>,
    counters: Counters,
    pub on_wire_request: EventList<WireRequestEvent>,
    pub on_wire_response: EventList<WireResponseEvent>,
    pub on_exception: EventList<ExceptionEvent>,
}

impl OicpServer {
    pub fn new(version: OicpVersion) -> Self {
        Self {
            version,
            hubs: DashMap::new(),
            counters: Counters::new(),
            on_wire_request: EventList::new("wire request"),
            on_wire_response: EventList::new("wire response"),
            on_exception: EventList::new("exception"),
        }
    }

    pub fn version(&self) -> OicpVersion {
        self.version
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Hub of `Op`, created on first use.
    pub fn hub<Op: Operation>(&self) -> Arc<OperationHub<Op>> {
        let existing = self.hubs.get(&Op::KIND).map(|entry| entry.value().clone());
        if let Some(hub) = existing.and_then(|any| any.downcast::<OperationHub<Op>>().ok()) {
            return hub;
        }

        let any = self
            .hubs
            .entry(Op::KIND)
            .or_insert_with(|| Arc::new(OperationHub::<Op>::new()) as Arc<dyn Any + Send + Sync>)
            .value()
            .clone();
        match any.downcast::<OperationHub<Op>>() {
            Ok(hub) => hub,
            Err(_) => {
                let hub = Arc::new(OperationHub::<Op>::new());
                self.hubs.insert(Op::KIND, hub.clone());
                hub
            }
        }
    }

    /// Register a handler for `Op`. See [`OperationHub::register_handler`].
    pub fn register_handler<Op, F, Fut>(&self, handler: F)
    where
        Op: Operation,
        F: Fn(Arc<Op::Request>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult<Op::Response>> + Send + 'static,
    {
        self.hub::<Op>().register_handler(handler);
    }

    pub(crate) async fn raise_exception(&self, operation: Option<OperationKind>, message: String) {
        self.on_exception
            .raise(ExceptionEvent {
                timestamp: Utc::now(),
                operation,
                message,
            })
            .await;
    }

    /// Serve one inbound request. Protocol-level failures are answered
    /// with HTTP 200 and an error status code in the body.
    pub async fn handle_request(&self, inbound: InboundRequest) -> OutboundResponse {
        let started = Instant::now();

        let Some(route) = endpoints::route(self.version, &inbound.path) else {
            debug!(path = %inbound.path, "No endpoint");
            return OutboundResponse::plain(404, "Not Found");
        };
        if inbound.method != Method::POST {
            return OutboundResponse::plain(405, "Method Not Allowed");
        }

        self.on_wire_request
            .raise(WireRequestEvent {
                timestamp: Utc::now(),
                path: inbound.path.clone(),
                body: inbound.body.clone(),
            })
            .await;

        let request_context = RequestContext::new().with_cancellation(inbound.cancellation.clone());
        let ctx = CodecContext::new(self.version).with_request_context(request_context);

        let element = match route {
            Route::Rest { kind, party } => {
                let ctx = if kind.is_provider_scoped() {
                    ctx.with_provider(ProviderId::try_parse(&party))
                } else {
                    ctx.with_operator(OperatorId::try_parse(&party))
                };
                let input = inbound.read(self.version, dispatch::request_root(kind));
                match dispatch::dispatch_kind(self, kind, input, &ctx, started).await {
                    Some(element) => element,
                    None => self.unrouted("Unknown or unsupported request!").await,
                }
            }
            Route::Soap(service) => match inbound.read(self.version, "") {
                Err(e) => {
                    warn!(path = %inbound.path, error = %e, "Unreadable SOAP request");
                    self.unrouted(&format!("Invalid request! {}", e)).await
                }
                Ok(element) => {
                    let mut answered = None;
                    for kind in service.operations().filter(|k| k.is_available(self.version)) {
                        answered =
                            dispatch::dispatch_kind(self, kind, Ok(element.clone()), &ctx, started).await;
                        if answered.is_some() {
                            break;
                        }
                    }
                    match answered {
                        Some(element) => element,
                        None => {
                            let message = format!("Unknown or unsupported request '{}'!", element.name);
                            self.unrouted(&message).await
                        }
                    }
                }
            },
        };

        let response = self.render(&element);
        self.on_wire_response
            .raise(WireResponseEvent {
                timestamp: Utc::now(),
                path: inbound.path,
                http_status: response.status,
                body: response.body.clone(),
                elapsed: started.elapsed(),
            })
            .await;
        response
    }

    /// Data-error acknowledgement for a payload no operation claims.
    async fn unrouted(&self, description: &str) -> WireElement {
        self.raise_exception(None, description.to_string()).await;
        acknowledgement(StatusCode::data_error(description, None))
    }

    fn render(&self, element: &WireElement) -> OutboundResponse {
        let content_type = codec::content_type(self.version);
        match codec::render(element, self.version) {
            Ok(body) => OutboundResponse {
                status: 200,
                content_type,
                body,
            },
            Err(e) => {
                error!(error = %e, "Failed to render response");
                let fallback = acknowledgement(StatusCode::system_error("Could not render the response!", None));
                match codec::render(&fallback, self.version) {
                    Ok(body) => OutboundResponse {
                        status: 200,
                        content_type,
                        body,
                    },
                    Err(_) => OutboundResponse::plain(500, "Internal Server Error"),
                }
            }
        }
    }
}

fn acknowledgement(status: StatusCode) -> WireElement {
    WireElement::new(
        "eRoamingAcknowledgement",
        Obj::new()
            .boolean("Result", false)
            .value("StatusCode", status.to_value())
            .build(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use serde_json::Value;

    use crate::codec::{encode_request, render, WireRequest};
    use crate::domain::identifiers::{EvseId, SessionId, Uid};
    use crate::domain::records::{EvseStatusRecord, OperatorEvseStatus};
    use crate::domain::types::{ActionType, EvseStatus, Identification, StatusCodes};
    use crate::support::errors::HandlerError;
    use crate::messages::{
        Acknowledgement, AuthorizationStart, AuthorizeStart, AuthorizeStartRequest, PushEvseStatus,
        PushEvseStatusRequest,
    };

    const START_PATH: &str = "/api/oicp/charging/v21/operators/DE*GEF/authorize/start";

    fn start_request() -> AuthorizeStartRequest {
        AuthorizeStartRequest::new(
            OperatorId::parse("DE*GEF").unwrap(),
            Identification::from_uid(Uid::parse("11223344").unwrap()),
        )
    }

    fn payload<T: WireRequest>(request: &T, version: OicpVersion) -> String {
        render(&encode_request(request, &CodecContext::new(version), None), version).unwrap()
    }

    fn json(response: &OutboundResponse) -> Value {
        serde_json::from_str(&response.body).unwrap()
    }

    fn push_status_payload(version: OicpVersion) -> String {
        let status = OperatorEvseStatus::new(OperatorId::parse("DE*GEF").unwrap(), None)
            .with_record(EvseStatusRecord::new(EvseId::parse("DE*GEF*E1").unwrap(), EvseStatus::Available));
        payload(&PushEvseStatusRequest::new(ActionType::Update, status), version)
    }

    #[tokio::test]
    async fn authorize_start_is_answered_by_the_handler() {
        let server = OicpServer::new(OicpVersion::V2_3);
        let session = SessionId::new_random();
        let expected = session.clone();
        server.register_handler::<AuthorizeStart, _, _>(move |request| {
            let session = session.clone();
            async move {
                assert_eq!(request.operator_id.to_string(), "DE*GEF");
                Ok(Some(AuthorizationStart::authorized(Some(request), session, None)))
            }
        });

        let response = server
            .handle_request(InboundRequest::post(START_PATH, payload(&start_request(), OicpVersion::V2_3)))
            .await;

        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, "application/json;charset=utf-8");
        let body = json(&response);
        assert_eq!(body["AuthorizationStatus"], "Authorized");
        assert_eq!(body["SessionID"], expected.to_string());
        assert_eq!(body["StatusCode"]["Code"], "000");

        let counts = server.counters().snapshot(OperationKind::AuthorizeStart);
        assert_eq!((counts.requests_ok, counts.responses_ok), (1, 1));
    }

    #[tokio::test]
    async fn first_non_empty_result_by_registration_order_wins() {
        let server = OicpServer::new(OicpVersion::V2_3);
        let calls = Arc::new(AtomicUsize::new(0));

        let seen = calls.clone();
        server.register_handler::<AuthorizeStart, _, _>(move |_| {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }
        });
        let seen = calls.clone();
        server.register_handler::<AuthorizeStart, _, _>(move |request| {
            let seen = seen.clone();
            async move {
                // Finishes last, still wins over the third handler.
                tokio::time::sleep(Duration::from_millis(20)).await;
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(Some(AuthorizationStart::not_authorized(
                    Some(request),
                    StatusCode::new(StatusCodes::NoValidContract),
                )))
            }
        });
        let seen = calls.clone();
        server.register_handler::<AuthorizeStart, _, _>(move |request| {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(Some(AuthorizationStart::authorized(Some(request), SessionId::new_random(), None)))
            }
        });

        let response = server
            .handle_request(InboundRequest::post(START_PATH, payload(&start_request(), OicpVersion::V2_3)))
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(json(&response)["StatusCode"]["Code"], StatusCodes::NoValidContract.code());
    }

    #[tokio::test]
    async fn no_handler_yields_a_system_error() {
        let server = OicpServer::new(OicpVersion::V2_3);

        let response = server
            .handle_request(InboundRequest::post(START_PATH, payload(&start_request(), OicpVersion::V2_3)))
            .await;

        assert_eq!(response.status, 200);
        let body = json(&response);
        assert_eq!(body["StatusCode"]["Code"], "021");
        assert_eq!(body["StatusCode"]["Description"], COULD_NOT_PROCESS);
        assert_eq!(body["AuthorizationStatus"], "NotAuthorized");

        let counts = server.counters().snapshot(OperationKind::AuthorizeStart);
        assert_eq!((counts.requests_ok, counts.responses_error), (1, 1));
    }

    #[tokio::test]
    async fn failing_and_panicking_handlers_become_system_errors() {
        let server = OicpServer::new(OicpVersion::V2_3);
        let exceptions = Arc::new(AtomicUsize::new(0));
        let seen = exceptions.clone();
        server.on_exception.subscribe(move |_| {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        });
        server.register_handler::<AuthorizeStart, _, _>(|_| async {
            Err::<Option<AuthorizationStart>, HandlerError>("backend unavailable".into())
        });

        let response = server
            .handle_request(InboundRequest::post(START_PATH, payload(&start_request(), OicpVersion::V2_3)))
            .await;
        let body = json(&response);
        assert_eq!(body["StatusCode"]["Code"], "021");
        assert_eq!(body["StatusCode"]["AdditionalInfo"], "backend unavailable");

        let server = OicpServer::new(OicpVersion::V2_3);
        server.register_handler::<AuthorizeStart, _, _>(|_| async {
            if true {
                panic!("handler bug");
            }
            Ok(None)
        });
        let response = server
            .handle_request(InboundRequest::post(START_PATH, payload(&start_request(), OicpVersion::V2_3)))
            .await;
        let body = json(&response);
        assert_eq!(body["StatusCode"]["Code"], "021");
        assert!(body["StatusCode"]["AdditionalInfo"].as_str().unwrap().contains("handler bug"));

        assert_eq!(exceptions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_payloads_get_a_data_error() {
        let server = OicpServer::new(OicpVersion::V2_3);
        let handled = Arc::new(AtomicUsize::new(0));
        let seen = handled.clone();
        server.register_handler::<AuthorizeStart, _, _>(move |_| {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }
        });

        for body in ["", "{", "[]", r#"{"OperatorID":"DE*GEF"}"#] {
            let response = server.handle_request(InboundRequest::post(START_PATH, body)).await;
            assert_eq!(response.status, 200, "payload {:?}", body);
            let parsed = json(&response);
            assert_eq!(parsed["StatusCode"]["Code"], "022", "payload {:?}", body);
            assert_eq!(parsed["AuthorizationStatus"], "NotAuthorized");
        }

        assert_eq!(handled.load(Ordering::SeqCst), 0);
        let counts = server.counters().snapshot(OperationKind::AuthorizeStart);
        assert_eq!((counts.requests_error, counts.responses_error), (4, 4));
    }

    #[tokio::test]
    async fn soap_endpoint_routes_by_root_element() {
        let server = OicpServer::new(OicpVersion::V2_1);
        let pushed = Arc::new(AtomicUsize::new(0));
        let seen = pushed.clone();
        server.register_handler::<PushEvseStatus, _, _>(move |request| {
            let seen = seen.clone();
            async move {
                seen.fetch_add(request.operator_evse_status.evse_status_records.len(), Ordering::SeqCst);
                Ok(Some(Acknowledgement::success(Some(request))))
            }
        });

        let response = server
            .handle_request(InboundRequest::post(
                "/ws/v2.1/eRoamingEvseStatus",
                push_status_payload(OicpVersion::V2_1),
            ))
            .await;

        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, "text/xml;charset=utf-8");
        assert!(response.body.contains("eRoamingAcknowledgement"));
        assert!(response.body.contains(">000<"));
        assert_eq!(pushed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn soap_unknown_root_and_garbage_are_data_errors() {
        let server = OicpServer::new(OicpVersion::V2_1);

        let wrong_service = server
            .handle_request(InboundRequest::post(
                "/ws/v2.1/eRoamingAuthorization",
                push_status_payload(OicpVersion::V2_1),
            ))
            .await;
        assert_eq!(wrong_service.status, 200);
        assert!(wrong_service.body.contains(">022<"));

        let garbage = server
            .handle_request(InboundRequest::post("/ws/v2.1/eRoamingEvseStatus", "<not-soap"))
            .await;
        assert_eq!(garbage.status, 200);
        assert!(garbage.body.contains(">022<"));
    }

    #[tokio::test]
    async fn soap_authorize_start_without_operator_is_a_data_error() {
        let server = OicpServer::new(OicpVersion::V2_2);
        let mut body = payload(&start_request(), OicpVersion::V2_2);
        let first = body.find("OperatorID>").unwrap();
        let open = body[..first].rfind('<').unwrap();
        let close = first + body[first..].find("</").unwrap();
        let end = close + body[close..].find('>').unwrap() + 1;
        body.replace_range(open..end, "");

        let response = server
            .handle_request(InboundRequest::post("/ws/v2.2/eRoamingAuthorization", body))
            .await;

        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, "text/xml;charset=utf-8");
        assert!(response.body.contains("eRoamingAuthorizationStart"));
        assert!(response.body.contains(">022<"));
        assert!(response.body.contains("Missing required element"));
        assert!(response.body.contains("OperatorID"));
    }

    #[tokio::test]
    async fn unknown_paths_and_methods() {
        let server = OicpServer::new(OicpVersion::V2_3);

        let missing = server.handle_request(InboundRequest::post("/nope", "{}")).await;
        assert_eq!(missing.status, 404);

        let mut get = InboundRequest::post(START_PATH, "");
        get.method = Method::GET;
        assert_eq!(server.handle_request(get).await.status, 405);

        let pricing_on_2_1 = OicpServer::new(OicpVersion::V2_1)
            .handle_request(InboundRequest::post("/ws/v2.1/eRoamingDynamicPricing", ""))
            .await;
        assert_eq!(pricing_on_2_1.status, 404);
    }

    #[tokio::test]
    async fn lifecycle_events_fire_in_order() {
        let server = OicpServer::new(OicpVersion::V2_3);
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let log = order.clone();
        server.on_wire_request.subscribe(move |_| {
            let log = log.clone();
            async move { log.lock().unwrap().push("wire request") }
        });
        let hub = server.hub::<AuthorizeStart>();
        let log = order.clone();
        hub.on_request.subscribe(move |_| {
            let log = log.clone();
            async move { log.lock().unwrap().push("request") }
        });
        let log = order.clone();
        hub.register_handler(move |request| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push("handler");
                Ok(Some(AuthorizationStart::authorized(Some(request), SessionId::new_random(), None)))
            }
        });
        let log = order.clone();
        hub.on_response.subscribe(move |event| {
            let log = log.clone();
            async move {
                assert!(event.request.is_some());
                assert!(event.response.is_authorized());
                log.lock().unwrap().push("response");
            }
        });
        let log = order.clone();
        server.on_wire_response.subscribe(move |event| {
            let log = log.clone();
            async move {
                assert_eq!(event.http_status, 200);
                log.lock().unwrap().push("wire response");
            }
        });

        server
            .handle_request(InboundRequest::post(START_PATH, payload(&start_request(), OicpVersion::V2_3)))
            .await;

        assert_eq!(
            *order.lock().unwrap(),
            vec!["wire request", "request", "handler", "response", "wire response"]
        );
    }

    #[tokio::test]
    async fn custom_codec_hooks_apply() {
        let server = OicpServer::new(OicpVersion::V2_3);
        let hub = server.hub::<AuthorizeStart>();
        let parsed = Arc::new(AtomicUsize::new(0));
        let seen = parsed.clone();
        hub.set_request_parser(move |raw, request| {
            assert_eq!(raw["OperatorID"], "DE*GEF");
            seen.fetch_add(1, Ordering::SeqCst);
            request
        });
        hub.set_response_serializer(|_, mut body| {
            body["Extra"] = Value::from(true);
            body
        });
        hub.register_handler(|request| async move {
            Ok(Some(AuthorizationStart::authorized(Some(request), SessionId::new_random(), None)))
        });

        let response = server
            .handle_request(InboundRequest::post(START_PATH, payload(&start_request(), OicpVersion::V2_3)))
            .await;

        assert_eq!(json(&response)["Extra"], true);
        assert_eq!(parsed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn panicking_request_parser_becomes_a_data_error() {
        let server = OicpServer::new(OicpVersion::V2_3);
        let hub = server.hub::<AuthorizeStart>();
        hub.set_request_parser(|_, _| panic!("parser exploded"));
        let handled = Arc::new(AtomicUsize::new(0));
        let seen = handled.clone();
        hub.register_handler(move |request| {
            seen.fetch_add(1, Ordering::SeqCst);
            async move { Ok(Some(AuthorizationStart::authorized(Some(request), SessionId::new_random(), None))) }
        });

        let response = server
            .handle_request(InboundRequest::post(START_PATH, payload(&start_request(), OicpVersion::V2_3)))
            .await;

        assert_eq!(response.status, 200);
        let body = json(&response);
        assert_eq!(body["StatusCode"]["Code"], "022");
        assert!(body["StatusCode"]["AdditionalInfo"]
            .as_str()
            .unwrap()
            .contains("parser exploded"));
        assert_eq!(handled.load(Ordering::SeqCst), 0);
        let counts = server.counters().snapshot(OperationKind::AuthorizeStart);
        assert_eq!((counts.requests_error, counts.responses_error), (1, 1));
    }

    #[tokio::test]
    async fn panicking_response_serializer_keeps_the_plain_body() {
        let server = OicpServer::new(OicpVersion::V2_2);
        let hub = server.hub::<AuthorizeStart>();
        hub.set_response_serializer(|_, _| panic!("serializer exploded"));
        hub.register_handler(|request| async move {
            Ok(Some(AuthorizationStart::authorized(Some(request), SessionId::new_random(), None)))
        });

        let response = server
            .handle_request(InboundRequest::post(
                "/ws/v2.2/eRoamingAuthorization",
                payload(&start_request(), OicpVersion::V2_2),
            ))
            .await;

        assert_eq!(response.status, 200);
        assert!(response.body.contains("eRoamingAuthorizationStart"));
        assert!(response.body.contains("Authorized"));
        assert!(response.body.contains(">000<"));
    }
}
