//! Per-operation dispatch
//!
//! parse -> request event -> handler fan-out -> response event -> encode.
//! Every branch ends in a response of the operation's type; nothing here
//! returns an error to the caller.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use chrono::Utc;
use futures_util::future::{join_all, BoxFuture};
use futures_util::FutureExt;
use tracing::{debug, error, warn};

use super::events::{EventList, RequestEvent, ResponseEvent};
use super::OicpServer;
use crate::codec::{
    decode_request, encode_response, CodecContext, CustomParser, CustomSerializer, WireElement,
    WireRequest, WireResponse,
};
use crate::messages::{
    AuthorizeRemoteStart, AuthorizeRemoteStop, AuthorizeStart, AuthorizeStop, Operation, OperationKind,
    PullEvseData, PullEvseStatus, PushEvseData, PushEvsePricing, PushEvseStatus, PushPricingProductData,
    SendChargeDetailRecord,
};
use crate::support::errors::{panic_message, CodecError, HandlerError};

/// Description sent when no handler produced a response.
pub const COULD_NOT_PROCESS: &str = "Could not process the incoming request!";

pub type HandlerResult<T> = Result<Option<T>, HandlerError>;

type Handler<Op> = Arc<
    dyn Fn(Arc<<Op as Operation>::Request>) -> BoxFuture<'static, HandlerResult<<Op as Operation>::Response>>
        + Send
        + Sync,
>;

/// Handlers, events and codec hooks of one operation.
pub struct OperationHub<Op: Operation> {
    pub on_request: EventList<RequestEvent<Op>>,
    pub on_response: EventList<ResponseEvent<Op>>,
    handlers: RwLock<Vec<Handler<Op>>>,
    request_parser: RwLock<Option<CustomParser<Op::Request>>>,
    response_serializer: RwLock<Option<CustomSerializer<Op::Response>>>,
}

impl<Op: Operation> OperationHub<Op> {
    pub fn new() -> Self {
        Self {
            on_request: EventList::new(Op::KIND.name()),
            on_response: EventList::new(Op::KIND.name()),
            handlers: RwLock::new(Vec::new()),
            request_parser: RwLock::new(None),
            response_serializer: RwLock::new(None),
        }
    }

    /// Handlers run concurrently; the first one in registration order that
    /// returns `Some` or an error decides the response.
    pub fn register_handler<F, Fut>(&self, handler: F)
    where
        F: Fn(Arc<Op::Request>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult<Op::Response>> + Send + 'static,
    {
        let handler: Handler<Op> = Arc::new(move |request| handler(request).boxed());
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn set_request_parser(
        &self,
        parser: impl Fn(&serde_json::Value, Op::Request) -> Op::Request + Send + Sync + 'static,
    ) {
        *self.request_parser.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(parser));
    }

    pub fn set_response_serializer(
        &self,
        serializer: impl Fn(&Op::Response, serde_json::Value) -> serde_json::Value + Send + Sync + 'static,
    ) {
        *self.response_serializer.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(serializer));
    }

    fn handlers(&self) -> Vec<Handler<Op>> {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn request_parser(&self) -> Option<CustomParser<Op::Request>> {
        self.request_parser.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn response_serializer(&self) -> Option<CustomSerializer<Op::Response>> {
        self.response_serializer.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl<Op: Operation> Default for OperationHub<Op> {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one operation over an inbound element. `None` means the element's
/// root belongs to another operation.
pub(crate) async fn dispatch<Op: Operation>(
    server: &OicpServer,
    input: Result<WireElement, CodecError>,
    ctx: &CodecContext,
    started: Instant,
) -> Option<WireElement> {
    let kind = Op::KIND;
    let hub = server.hub::<Op>();
    let parser = hub.request_parser();

    let parsed = input.and_then(|element| decode_request::<Op::Request>(&element, ctx, parser.as_ref()));

    let (request, mut response) = match parsed {
        Ok(None) => return None,
        Err(e) => {
            server.counters().record_request(kind, false);
            warn!(operation = kind.name(), error = %e, "Rejecting malformed request");
            server
                .raise_exception(Some(kind), format!("Invalid {} request: {}", kind, e))
                .await;
            let response = Op::Response::data_error(None, "Invalid request!", Some(e.to_string()));
            (None, response)
        }
        Ok(Some(request)) => {
            server.counters().record_request(kind, true);
            let request = Arc::new(request);
            hub.on_request
                .raise(RequestEvent {
                    timestamp: Utc::now(),
                    request: request.clone(),
                })
                .await;
            let response = handle(server, &hub, request.clone()).await;
            (Some(request), response)
        }
    };

    let elapsed = started.elapsed();
    let context = response.response_context_mut();
    context.runtime = Some(elapsed);
    context.event_tracking_id = Some(ctx.request_context.event_tracking_id);

    let ok = response.status_code().is_success();
    server.counters().record_response(kind, ok);
    debug!(
        operation = kind.name(),
        status_code = response.status_code().code.code(),
        elapsed_ms = elapsed.as_millis() as u64,
        "Response ready"
    );

    let response = Arc::new(response);
    hub.on_response
        .raise(ResponseEvent {
            timestamp: Utc::now(),
            request,
            response: response.clone(),
            elapsed,
        })
        .await;

    let serializer = hub.response_serializer();
    Some(encode_response::<Op::Request, Op::Response>(
        response.as_ref(),
        ctx,
        serializer.as_ref(),
    ))
}

async fn handle<Op: Operation>(
    server: &OicpServer,
    hub: &OperationHub<Op>,
    request: Arc<Op::Request>,
) -> Op::Response {
    let kind = Op::KIND;
    let handlers = hub.handlers();
    if handlers.is_empty() {
        warn!(operation = kind.name(), "No handler registered");
    }

    let results = join_all(handlers.into_iter().map(|handler| {
        let request = request.clone();
        AssertUnwindSafe(async move { handler(request).await }).catch_unwind()
    }))
    .await;

    for result in results {
        let failure = match result {
            Ok(Ok(Some(response))) => return response,
            Ok(Ok(None)) => continue,
            Ok(Err(e)) => e.to_string(),
            Err(panic) => format!("Handler panicked: {}", panic_message(panic.as_ref())),
        };
        error!(operation = kind.name(), error = %failure, "Handler failed");
        server.raise_exception(Some(kind), failure.clone()).await;
        return Op::Response::system_error(Some(request), COULD_NOT_PROCESS, Some(failure));
    }

    Op::Response::system_error(Some(request), COULD_NOT_PROCESS, None)
}

macro_rules! with_operation {
    ($kind:expr, $op:ident => $body:expr) => {
        match $kind {
            OperationKind::AuthorizeStart => {
                type $op = AuthorizeStart;
                $body
            }
            OperationKind::AuthorizeStop => {
                type $op = AuthorizeStop;
                $body
            }
            OperationKind::ChargeDetailRecord => {
                type $op = SendChargeDetailRecord;
                $body
            }
            OperationKind::PushEvseData => {
                type $op = PushEvseData;
                $body
            }
            OperationKind::PushEvseStatus => {
                type $op = PushEvseStatus;
                $body
            }
            OperationKind::PushPricingProductData => {
                type $op = PushPricingProductData;
                $body
            }
            OperationKind::PushEvsePricing => {
                type $op = PushEvsePricing;
                $body
            }
            OperationKind::PullEvseData => {
                type $op = PullEvseData;
                $body
            }
            OperationKind::PullEvseStatus => {
                type $op = PullEvseStatus;
                $body
            }
            OperationKind::AuthorizeRemoteStart => {
                type $op = AuthorizeRemoteStart;
                $body
            }
            OperationKind::AuthorizeRemoteStop => {
                type $op = AuthorizeRemoteStop;
                $body
            }
        }
    };
}

/// [`dispatch`] for an operation known only at runtime.
pub(crate) async fn dispatch_kind(
    server: &OicpServer,
    kind: OperationKind,
    input: Result<WireElement, CodecError>,
    ctx: &CodecContext,
    started: Instant,
) -> Option<WireElement> {
    with_operation!(kind, Op => dispatch::<Op>(server, input, ctx, started).await)
}

/// Root element name of the request of `kind`.
pub(crate) fn request_root(kind: OperationKind) -> &'static str {
    with_operation!(kind, Op => <<Op as Operation>::Request as WireRequest>::ROOT)
}
