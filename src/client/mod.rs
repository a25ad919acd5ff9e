//! OICP client
//!
//! Sends requests to a remote OICP endpoint and classifies what comes back.
//! Every call yields a [`ClientResponse`]: transport failures, timeouts and
//! unreadable replies are folded into a synthesized error response rather
//! than returned as `Err`. The request counter moves before the round trip,
//! the response counter after it.

pub mod hooks;
pub mod response;
pub mod transport;

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::codec::{self, CodecContext, WireRequest, WireResponse};
use crate::config::ClientConfig;
use crate::domain::version::OicpVersion;
use crate::messages::{
    Acknowledgement, AuthorizationStart, AuthorizationStop, AuthorizeRemoteStart,
    AuthorizeRemoteStartRequest, AuthorizeRemoteStop, AuthorizeRemoteStopRequest, AuthorizeStart,
    AuthorizeStartRequest, AuthorizeStop, AuthorizeStopRequest, ChargeDetailRecordRequest, Operation,
    OperationKind, PullEvseData, PullEvseDataRequest, PullEvseDataResponse, PullEvseStatus,
    PullEvseStatusRequest, PullEvseStatusResponse, PushEvseData, PushEvseDataRequest, PushEvsePricing,
    PushEvsePricingRequest, PushEvseStatus, PushEvseStatusRequest, PushPricingProductData,
    PushPricingProductDataRequest, SendChargeDetailRecord,
};
use crate::support::counters::Counters;
use crate::support::errors::TransportError;
use crate::support::retry::{retry_with_backoff, RetryConfig};

pub use hooks::OperationHooks;
pub use response::{ClientResponse, Outcome};
pub use transport::{HttpTransport, Transport, TransportRequest, TransportResponse};

/// The party placed into an OICP 2.3 REST path (`{operatorID}` or
/// `{providerID}`).
pub trait Addressed {
    fn rest_party(&self) -> String;
}

macro_rules! addressed {
    ($($request:ty => |$r:ident| $party:expr;)*) => {
        $(
            impl Addressed for $request {
                fn rest_party(&self) -> String {
                    let $r = self;
                    $party.to_string()
                }
            }
        )*
    };
}

addressed! {
    AuthorizeStartRequest => |r| r.operator_id;
    AuthorizeStopRequest => |r| r.operator_id;
    ChargeDetailRecordRequest => |r| r.operator_id;
    PushEvseDataRequest => |r| r.operator_evse_data.operator_id;
    PushEvseStatusRequest => |r| r.operator_evse_status.operator_id;
    PushPricingProductDataRequest => |r| r.operator_id();
    PushEvsePricingRequest => |r| r.operator_id;
    PullEvseDataRequest => |r| r.provider_id;
    PullEvseStatusRequest => |r| r.provider_id;
    AuthorizeRemoteStartRequest => |r| r.provider_id;
    AuthorizeRemoteStopRequest => |r| r.provider_id;
}

const CANCELLED: &str = "Request was cancelled";

/// Why a round trip produced no reply.
enum Failure {
    Transport(TransportError),
    Cancelled,
}

pub struct OicpClient {
    transport: Arc<dyn Transport>,
    version: OicpVersion,
    default_timeout: Duration,
    retry: RetryConfig,
    connections: Arc<Semaphore>,
    counters: Arc<Counters>,
    hooks: DashMap<OperationKind, Arc<dyn Any + Send + Sync>>,
}

impl OicpClient {
    /// Client over HTTP to `config.base_url`.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(&config.base_url)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            version: config.version,
            default_timeout: Duration::from_secs(config.request_timeout_secs),
            retry: config.retry.clone(),
            connections: Arc::new(Semaphore::new(config.max_connections.max(1))),
            counters: Arc::new(Counters::new()),
            hooks: DashMap::new(),
        }
    }

    pub fn version(&self) -> OicpVersion {
        self.version
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Replace the hooks of `Op`.
    pub fn set_hooks<Op: Operation>(&self, hooks: OperationHooks<Op>) {
        self.hooks.insert(Op::KIND, Arc::new(hooks));
    }

    fn hooks_for<Op: Operation>(&self) -> Option<Arc<OperationHooks<Op>>> {
        let entry = self.hooks.get(&Op::KIND)?;
        entry.value().clone().downcast::<OperationHooks<Op>>().ok()
    }

    fn path_for<Op: Operation>(&self, request: &Op::Request) -> String
    where
        Op::Request: Addressed,
    {
        if self.version.is_rest() {
            Op::KIND.rest_path_for(&request.rest_party())
        } else {
            Op::KIND.service().soap_path(self.version)
        }
    }

    /// Send one request and classify the reply.
    pub async fn execute<Op: Operation>(&self, request: Op::Request) -> ClientResponse<Op::Response>
    where
        Op::Request: Addressed,
    {
        let kind = Op::KIND;
        let started = Instant::now();
        let request = Arc::new(request);
        let hooks = self.hooks_for::<Op>();

        if let Some(hooks) = &hooks {
            hooks.notify_request(&request);
        }

        let mut response = match self.prepare::<Op>(&request, hooks.as_deref()) {
            Ok(transport_request) => {
                self.counters.record_request(kind, true);
                let result = self.round_trip::<Op>(&request, transport_request).await;
                self.finish::<Op>(result, &request, hooks.as_deref(), started)
            }
            Err(reason) => {
                self.counters.record_request(kind, false);
                self.refuse::<Op>(reason, &request, started)
            }
        };

        let runtime = started.elapsed();
        response.runtime = runtime;
        let context = response.content.response_context_mut();
        context.runtime = Some(runtime);
        context.event_tracking_id = Some(request.context().event_tracking_id);

        metrics::histogram!("oicp_request_duration_seconds", "operation" => kind.name())
            .record(runtime.as_secs_f64());

        if let Some(hooks) = &hooks {
            hooks.notify_response(&response);
        }
        response
    }

    /// Everything that can fail before the request reaches the transport.
    fn prepare<Op: Operation>(
        &self,
        request: &Arc<Op::Request>,
        hooks: Option<&OperationHooks<Op>>,
    ) -> Result<TransportRequest, String>
    where
        Op::Request: Addressed,
    {
        let kind = Op::KIND;
        if !kind.is_available(self.version) {
            return Err(format!(
                "{} is not available in OICP {}",
                kind.name(),
                self.version.version_string()
            ));
        }

        if request.context().cancellation.is_cancelled() {
            return Err(CANCELLED.to_string());
        }

        let ctx = CodecContext::new(self.version).with_request_context(request.context().clone());
        let element = codec::encode_request(
            request.as_ref(),
            &ctx,
            hooks.and_then(|h| h.request_serializer.as_ref()),
        );
        let body = codec::render(&element, self.version).map_err(|e| e.to_string())?;

        Ok(TransportRequest {
            path: self.path_for::<Op>(request),
            content_type: codec::content_type(self.version),
            body,
            timeout: request.context().timeout.unwrap_or(self.default_timeout),
        })
    }

    async fn round_trip<Op: Operation>(
        &self,
        request: &Arc<Op::Request>,
        transport_request: TransportRequest,
    ) -> Result<TransportResponse, Failure> {
        let kind = Op::KIND;
        let timeout = transport_request.timeout;
        let cancellation = request.context().cancellation.clone();
        debug!(operation = kind.name(), path = %transport_request.path, "Sending request");

        let _permit = self
            .connections
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Failure::Transport(TransportError::Closed))?;

        let send = retry_with_backoff(
            &self.retry,
            || {
                let transport = self.transport.clone();
                let transport_request = transport_request.clone();
                async move {
                    match tokio::time::timeout(timeout, transport.send(transport_request)).await {
                        Ok(result) => result,
                        Err(_) => Err(TransportError::Timeout(timeout.as_millis() as u64)),
                    }
                }
            },
            TransportError::is_transient,
            kind.name(),
        );

        tokio::select! {
            result = send => result.map_err(Failure::Transport),
            _ = cancellation.cancelled() => Err(Failure::Cancelled),
        }
    }

    /// Response for a request that never reached the transport.
    fn refuse<Op: Operation>(
        &self,
        reason: String,
        request: &Arc<Op::Request>,
        started: Instant,
    ) -> ClientResponse<Op::Response> {
        let kind = Op::KIND;
        self.counters.record_response(kind, false);
        warn!(operation = kind.name(), error = %reason, "Request not sent");
        ClientResponse {
            content: Op::Response::system_error(Some(request.clone()), &reason, None),
            outcome: Outcome::Exception(reason),
            http_status: None,
            raw_body: None,
            runtime: started.elapsed(),
        }
    }

    fn finish<Op: Operation>(
        &self,
        result: Result<TransportResponse, Failure>,
        request: &Arc<Op::Request>,
        hooks: Option<&OperationHooks<Op>>,
        started: Instant,
    ) -> ClientResponse<Op::Response> {
        let kind = Op::KIND;

        let reply = match result {
            Ok(reply) => reply,
            Err(failure) => {
                self.counters.record_response(kind, false);
                let (reason, outcome) = match failure {
                    Failure::Transport(e) => (e.to_string(), Outcome::Transport(e)),
                    Failure::Cancelled => (CANCELLED.to_string(), Outcome::Exception(CANCELLED.to_string())),
                };
                warn!(operation = kind.name(), error = %reason, "Request failed");
                return ClientResponse {
                    content: Op::Response::system_error(Some(request.clone()), &reason, None),
                    outcome,
                    http_status: None,
                    raw_body: None,
                    runtime: started.elapsed(),
                };
            }
        };

        let ctx = CodecContext::new(self.version).with_request_context(request.context().clone());
        let decoded = codec::read(&reply.body, self.version, Op::Response::ROOT).and_then(|element| {
            codec::decode_response::<Op::Request, Op::Response>(
                &element,
                Some(request.clone()),
                &ctx,
                hooks.and_then(|h| h.response_parser.as_ref()),
            )
        });

        let (content, outcome) = match (decoded, reply.is_success()) {
            (Ok(Some(content)), true) => {
                let outcome = if content.status_code().is_success() {
                    Outcome::Success
                } else {
                    Outcome::ProtocolFault
                };
                (content, outcome)
            }
            (Ok(Some(content)), false) => (content, Outcome::HttpError(reply.status)),
            (Ok(None), success) => {
                let reason = format!("Unexpected response, expected {}", Op::Response::ROOT);
                let content = Op::Response::data_error(Some(request.clone()), &reason, None);
                (content, failure(success, reply.status, reason))
            }
            (Err(e), true) => {
                let reason = e.to_string();
                let content = Op::Response::data_error(Some(request.clone()), "Invalid response", Some(reason.clone()));
                (content, Outcome::Exception(reason))
            }
            (Err(_), false) => {
                let reason = format!("HTTP {}", reply.status);
                let content = Op::Response::system_error(Some(request.clone()), &reason, Some(reply.body.clone()));
                (content, Outcome::HttpError(reply.status))
            }
        };

        let ok = outcome == Outcome::Success;
        self.counters.record_response(kind, ok);

        if ok {
            info!(
                operation = kind.name(),
                http_status = reply.status,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Request succeeded"
            );
        } else {
            warn!(
                operation = kind.name(),
                http_status = reply.status,
                status_code = content.status_code().code.code(),
                outcome = ?outcome,
                "Request did not succeed"
            );
        }

        ClientResponse {
            content,
            outcome,
            http_status: Some(reply.status),
            raw_body: Some(reply.body),
            runtime: started.elapsed(),
        }
    }

    // ─── Authorization ─────────────────────────────────────────

    pub async fn authorize_start(&self, request: AuthorizeStartRequest) -> ClientResponse<AuthorizationStart> {
        self.execute::<AuthorizeStart>(request).await
    }

    pub async fn authorize_stop(&self, request: AuthorizeStopRequest) -> ClientResponse<AuthorizationStop> {
        self.execute::<AuthorizeStop>(request).await
    }

    pub async fn send_charge_detail_record(
        &self,
        request: ChargeDetailRecordRequest,
    ) -> ClientResponse<Acknowledgement<ChargeDetailRecordRequest>> {
        self.execute::<SendChargeDetailRecord>(request).await
    }

    pub async fn authorize_remote_start(
        &self,
        request: AuthorizeRemoteStartRequest,
    ) -> ClientResponse<Acknowledgement<AuthorizeRemoteStartRequest>> {
        self.execute::<AuthorizeRemoteStart>(request).await
    }

    pub async fn authorize_remote_stop(
        &self,
        request: AuthorizeRemoteStopRequest,
    ) -> ClientResponse<Acknowledgement<AuthorizeRemoteStopRequest>> {
        self.execute::<AuthorizeRemoteStop>(request).await
    }

    // ─── EVSE data & status ────────────────────────────────────

    pub async fn push_evse_data(
        &self,
        request: PushEvseDataRequest,
    ) -> ClientResponse<Acknowledgement<PushEvseDataRequest>> {
        self.execute::<PushEvseData>(request).await
    }

    pub async fn push_evse_status(
        &self,
        request: PushEvseStatusRequest,
    ) -> ClientResponse<Acknowledgement<PushEvseStatusRequest>> {
        self.execute::<PushEvseStatus>(request).await
    }

    pub async fn pull_evse_data(&self, request: PullEvseDataRequest) -> ClientResponse<PullEvseDataResponse> {
        self.execute::<PullEvseData>(request).await
    }

    pub async fn pull_evse_status(&self, request: PullEvseStatusRequest) -> ClientResponse<PullEvseStatusResponse> {
        self.execute::<PullEvseStatus>(request).await
    }

    // ─── Dynamic pricing ───────────────────────────────────────

    pub async fn push_pricing_product_data(
        &self,
        request: PushPricingProductDataRequest,
    ) -> ClientResponse<Acknowledgement<PushPricingProductDataRequest>> {
        self.execute::<PushPricingProductData>(request).await
    }

    pub async fn push_evse_pricing(
        &self,
        request: PushEvsePricingRequest,
    ) -> ClientResponse<Acknowledgement<PushEvsePricingRequest>> {
        self.execute::<PushEvsePricing>(request).await
    }
}

fn failure(transport_success: bool, status: u16, reason: String) -> Outcome {
    if transport_success {
        Outcome::Exception(reason)
    } else {
        Outcome::HttpError(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    use crate::codec::{encode_response, render};
    use crate::domain::identifiers::{EvseId, OperatorId, ProviderId, SessionId, Uid};
    use crate::domain::records::{EvseStatusRecord, OperatorEvseStatus};
    use crate::domain::types::{ActionType, EvseStatus, Identification, StatusCode, StatusCodes};
    use crate::messages::RequestContext;

    type Reply = Box<dyn Fn(&TransportRequest) -> Result<TransportResponse, TransportError> + Send + Sync>;

    struct Loopback {
        reply: Reply,
        sent: Mutex<Vec<TransportRequest>>,
    }

    impl Loopback {
        fn new(
            reply: impl Fn(&TransportRequest) -> Result<TransportResponse, TransportError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                reply: Box::new(reply),
                sent: Mutex::new(Vec::new()),
            })
        }

        fn sent(&self) -> Vec<TransportRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for Loopback {
        async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
            let reply = (self.reply)(&request);
            self.sent.lock().unwrap().push(request);
            reply
        }
    }

    struct Slow(Duration);

    #[async_trait]
    impl Transport for Slow {
        async fn send(&self, _request: TransportRequest) -> Result<TransportResponse, TransportError> {
            tokio::time::sleep(self.0).await;
            Ok(TransportResponse::ok("{}"))
        }
    }

    fn config(version: OicpVersion) -> ClientConfig {
        ClientConfig {
            version,
            retry: RetryConfig::none(),
            ..ClientConfig::default()
        }
    }

    fn reply_with<Op: Operation>(response: Op::Response, version: OicpVersion) -> String {
        let element = encode_response::<Op::Request, Op::Response>(&response, &CodecContext::new(version), None);
        render(&element, version).unwrap()
    }

    fn authorize_start_request() -> AuthorizeStartRequest {
        AuthorizeStartRequest::new(
            OperatorId::parse("DE*GEF").unwrap(),
            Identification::from_uid(Uid::parse("11223344").unwrap()),
        )
    }

    fn push_status_request() -> PushEvseStatusRequest {
        let status = OperatorEvseStatus::new(OperatorId::parse("DE*GEF").unwrap(), None)
            .with_record(EvseStatusRecord::new(EvseId::parse("DE*GEF*E1").unwrap(), EvseStatus::Available));
        PushEvseStatusRequest::new(ActionType::Update, status)
    }

    #[tokio::test]
    async fn rest_authorize_start_success() {
        let session = SessionId::new_random();
        let body = reply_with::<AuthorizeStart>(
            AuthorizationStart::authorized(None, session.clone(), Some(ProviderId::parse("DE-GDF").unwrap())),
            OicpVersion::V2_3,
        );
        let transport = Loopback::new(move |_| Ok(TransportResponse::ok(body.clone())));
        let client = OicpClient::with_transport(&config(OicpVersion::V2_3), transport.clone());

        let response = client.authorize_start(authorize_start_request()).await;

        assert!(response.is_success());
        assert_eq!(response.http_status, Some(200));
        assert!(response.content.is_authorized());
        assert_eq!(response.content.session_id, Some(session));
        assert!(response.content.request.is_some());
        assert!(response.content.context.runtime.is_some());

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].path, "/api/oicp/charging/v21/operators/DE*GEF/authorize/start");
        assert_eq!(sent[0].content_type, "application/json;charset=utf-8");

        let counts = client.counters().snapshot(OperationKind::AuthorizeStart);
        assert_eq!((counts.requests_ok, counts.responses_ok), (1, 1));
    }

    #[tokio::test]
    async fn soap_push_status_goes_to_the_service_endpoint() {
        let body = reply_with::<PushEvseStatus>(Acknowledgement::success(None), OicpVersion::V2_1);
        let transport = Loopback::new(move |_| Ok(TransportResponse::ok(body.clone())));
        let client = OicpClient::with_transport(&config(OicpVersion::V2_1), transport.clone());

        let response = client.push_evse_status(push_status_request()).await;

        assert!(response.is_success());
        assert!(response.content.result);
        let sent = transport.sent();
        assert_eq!(sent[0].path, "/ws/v2.1/eRoamingEvseStatus");
        assert!(sent[0].body.contains("eRoamingPushEvseStatus"));
    }

    #[tokio::test]
    async fn non_success_status_code_is_a_protocol_fault() {
        let body = reply_with::<PushEvseStatus>(
            Acknowledgement::from_status(None, StatusCode::new(StatusCodes::DataError)),
            OicpVersion::V2_3,
        );
        let transport = Loopback::new(move |_| Ok(TransportResponse::ok(body.clone())));
        let client = OicpClient::with_transport(&config(OicpVersion::V2_3), transport);

        let response = client.push_evse_status(push_status_request()).await;

        assert_eq!(response.outcome, Outcome::ProtocolFault);
        assert_eq!(response.content.status_code.code, StatusCodes::DataError);
        let counts = client.counters().snapshot(OperationKind::PushEvseStatus);
        assert_eq!((counts.requests_ok, counts.responses_error), (1, 1));
    }

    #[tokio::test]
    async fn http_error_with_unreadable_body() {
        let transport = Loopback::new(|_| {
            Ok(TransportResponse {
                status: 503,
                content_type: None,
                body: "<html>down</html>".to_string(),
            })
        });
        let client = OicpClient::with_transport(&config(OicpVersion::V2_3), transport);

        let response = client.authorize_start(authorize_start_request()).await;

        assert_eq!(response.outcome, Outcome::HttpError(503));
        assert_eq!(response.content.status_code.code, StatusCodes::SystemError);
        assert!(!response.content.is_authorized());
    }

    #[tokio::test]
    async fn garbage_on_200_is_an_exception() {
        let transport = Loopback::new(|_| Ok(TransportResponse::ok("not json")));
        let client = OicpClient::with_transport(&config(OicpVersion::V2_3), transport);

        let response = client.push_evse_status(push_status_request()).await;

        assert!(response.is_exception());
        assert_eq!(response.content.status_code.code, StatusCodes::DataError);
    }

    #[tokio::test]
    async fn transient_failures_are_retried_then_reported() {
        let transport = Loopback::new(|_| Err(TransportError::Connect("remote".to_string())));
        let mut config = config(OicpVersion::V2_3);
        config.retry = RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            backoff_multiplier: 1.0,
            max_delay: Duration::from_millis(1),
        };
        let client = OicpClient::with_transport(&config, transport.clone());

        let response = client.authorize_start(authorize_start_request()).await;

        assert_eq!(
            response.outcome,
            Outcome::Transport(TransportError::Connect("remote".to_string()))
        );
        assert!(response.is_transport_error());
        assert!(!response.is_exception());
        assert_eq!(transport.sent().len(), 3);
        assert_eq!(response.content.status_code.code, StatusCodes::SystemError);
        let counts = client.counters().snapshot(OperationKind::AuthorizeStart);
        assert_eq!((counts.requests_ok, counts.responses_error), (1, 1));
        assert_eq!((counts.requests_error, counts.responses_ok), (0, 0));
    }

    #[tokio::test]
    async fn request_timeout_overrides_the_default() {
        let client = OicpClient::with_transport(
            &config(OicpVersion::V2_3),
            Arc::new(Slow(Duration::from_millis(500))),
        );
        let mut request = authorize_start_request();
        request.context = RequestContext::new().with_timeout(Duration::from_millis(20));

        let response = client.authorize_start(request).await;

        assert_eq!(response.outcome, Outcome::Transport(TransportError::Timeout(20)));
        assert!(response.is_transport_error());
        assert!(response.runtime < Duration::from_millis(500));
    }

    struct Refusing(Duration);

    #[async_trait]
    impl Transport for Refusing {
        async fn send(&self, _request: TransportRequest) -> Result<TransportResponse, TransportError> {
            tokio::time::sleep(self.0).await;
            Err(TransportError::Connect("remote".to_string()))
        }
    }

    #[tokio::test]
    async fn requests_are_counted_before_the_round_trip() {
        let client = Arc::new(OicpClient::with_transport(
            &config(OicpVersion::V2_3),
            Arc::new(Refusing(Duration::from_millis(300))),
        ));

        let call = {
            let client = client.clone();
            tokio::spawn(async move { client.authorize_start(authorize_start_request()).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;

        let in_flight = client.counters().snapshot(OperationKind::AuthorizeStart);
        assert_eq!((in_flight.requests_ok, in_flight.responses()), (1, 0));

        let response = call.await.unwrap();
        assert!(matches!(response.outcome, Outcome::Transport(TransportError::Connect(_))));
        let done = client.counters().snapshot(OperationKind::AuthorizeStart);
        assert_eq!((done.requests_ok, done.responses_error), (1, 1));
    }

    #[tokio::test]
    async fn cancelled_requests_are_not_sent() {
        let transport = Loopback::new(|_| Ok(TransportResponse::ok("{}")));
        let client = OicpClient::with_transport(&config(OicpVersion::V2_3), transport.clone());
        let token = CancellationToken::new();
        token.cancel();
        let mut request = authorize_start_request();
        request.context = RequestContext::new().with_cancellation(token);

        let response = client.authorize_start(request).await;

        assert!(response.is_exception());
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn pricing_is_refused_before_2_2() {
        let transport = Loopback::new(|_| Ok(TransportResponse::ok("")));
        let client = OicpClient::with_transport(&config(OicpVersion::V2_1), transport.clone());

        let request = PushEvsePricingRequest::new(ActionType::FullLoad, OperatorId::parse("DE*GEF").unwrap(), vec![]);
        let response = client.push_evse_pricing(request).await;

        assert!(response.is_exception());
        assert!(transport.sent().is_empty());
        let counts = client.counters().snapshot(OperationKind::PushEvsePricing);
        assert_eq!((counts.requests(), counts.responses()), (1, 1));
    }

    #[tokio::test]
    async fn counters_stay_consistent_under_concurrency() {
        let body = reply_with::<PushEvseStatus>(Acknowledgement::success(None), OicpVersion::V2_3);
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let transport = Loopback::new(move |_| {
            if seen.fetch_add(1, Ordering::SeqCst) % 3 == 0 {
                Err(TransportError::Timeout(1))
            } else {
                Ok(TransportResponse::ok(body.clone()))
            }
        });
        let mut config = config(OicpVersion::V2_3);
        config.max_connections = 2;
        let client = Arc::new(OicpClient::with_transport(&config, transport));

        let tasks: Vec<_> = (0..24)
            .map(|_| {
                let client = client.clone();
                tokio::spawn(async move { client.push_evse_status(push_status_request()).await })
            })
            .collect();
        let mut successes = 0;
        for task in tasks {
            if task.await.unwrap().is_success() {
                successes += 1;
            }
        }

        let counts = client.counters().snapshot(OperationKind::PushEvseStatus);
        assert_eq!(counts.requests(), 24);
        assert_eq!(counts.responses(), 24);
        assert_eq!(counts.responses_ok, successes);
        assert_eq!(calls.load(Ordering::SeqCst), 24);
    }

    #[tokio::test]
    async fn hooks_shape_requests_and_responses() {
        let body = reply_with::<PushEvseStatus>(Acknowledgement::success(None), OicpVersion::V2_3);
        let transport = Loopback::new(move |_| Ok(TransportResponse::ok(body.clone())));
        let client = OicpClient::with_transport(&config(OicpVersion::V2_3), transport.clone());

        let observed = Arc::new(AtomicUsize::new(0));
        let (on_request, on_response) = (observed.clone(), observed.clone());
        client.set_hooks(
            OperationHooks::<PushEvseStatus>::new()
                .with_request_serializer(|_, mut body| {
                    body["CustomField"] = serde_json::Value::from("x");
                    body
                })
                .with_response_parser(|_, mut ack| {
                    ack.status_code = ack.status_code.with_description("parsed");
                    ack
                })
                .on_request(move |_| {
                    on_request.fetch_add(1, Ordering::SeqCst);
                })
                .on_response(move |response| {
                    assert!(response.is_success());
                    on_response.fetch_add(10, Ordering::SeqCst);
                }),
        );

        let response = client.push_evse_status(push_status_request()).await;

        assert!(transport.sent()[0].body.contains("\"CustomField\":\"x\""));
        assert_eq!(response.content.status_code.description.as_deref(), Some("parsed"));
        assert_eq!(observed.load(Ordering::SeqCst), 11);
    }
}
