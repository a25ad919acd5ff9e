//! Per-operation client customization
//!
//! A serializer rewrites the outgoing body, a parser post-processes the
//! decoded response, and observers see every request and response.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::warn;

use super::response::ClientResponse;
use crate::codec::{CustomParser, CustomSerializer};
use crate::messages::Operation;

pub type RequestObserver<Req> = Arc<dyn Fn(&Req) + Send + Sync>;
pub type ResponseObserver<Resp> = Arc<dyn Fn(&ClientResponse<Resp>) + Send + Sync>;

pub struct OperationHooks<Op: Operation> {
    pub request_serializer: Option<CustomSerializer<Op::Request>>,
    pub response_parser: Option<CustomParser<Op::Response>>,
    request_observers: Vec<RequestObserver<Op::Request>>,
    response_observers: Vec<ResponseObserver<Op::Response>>,
}

impl<Op: Operation> OperationHooks<Op> {
    pub fn new() -> Self {
        Self {
            request_serializer: None,
            response_parser: None,
            request_observers: Vec::new(),
            response_observers: Vec::new(),
        }
    }

    pub fn with_request_serializer(
        mut self,
        serializer: impl Fn(&Op::Request, serde_json::Value) -> serde_json::Value + Send + Sync + 'static,
    ) -> Self {
        self.request_serializer = Some(Arc::new(serializer));
        self
    }

    pub fn with_response_parser(
        mut self,
        parser: impl Fn(&serde_json::Value, Op::Response) -> Op::Response + Send + Sync + 'static,
    ) -> Self {
        self.response_parser = Some(Arc::new(parser));
        self
    }

    pub fn on_request(mut self, observer: impl Fn(&Op::Request) + Send + Sync + 'static) -> Self {
        self.request_observers.push(Arc::new(observer));
        self
    }

    pub fn on_response(
        mut self,
        observer: impl Fn(&ClientResponse<Op::Response>) + Send + Sync + 'static,
    ) -> Self {
        self.response_observers.push(Arc::new(observer));
        self
    }

    pub(crate) fn notify_request(&self, request: &Op::Request) {
        for observer in &self.request_observers {
            if catch_unwind(AssertUnwindSafe(|| observer(request))).is_err() {
                warn!(operation = Op::KIND.name(), "Request observer panicked");
            }
        }
    }

    pub(crate) fn notify_response(&self, response: &ClientResponse<Op::Response>) {
        for observer in &self.response_observers {
            if catch_unwind(AssertUnwindSafe(|| observer(response))).is_err() {
                warn!(operation = Op::KIND.name(), "Response observer panicked");
            }
        }
    }
}

impl<Op: Operation> Default for OperationHooks<Op> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Op: Operation> Clone for OperationHooks<Op> {
    fn clone(&self) -> Self {
        Self {
            request_serializer: self.request_serializer.clone(),
            response_parser: self.response_parser.clone(),
            request_observers: self.request_observers.clone(),
            response_observers: self.response_observers.clone(),
        }
    }
}
