//! Lifecycle events raised while serving a request
//!
//! Each stage owns an [`EventList`]. Raising it runs every subscriber
//! concurrently and waits for all of them; a panicking subscriber is logged
//! and does not affect its siblings or the request.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::{join_all, BoxFuture};
use futures_util::FutureExt;
use tracing::{debug, warn};

use crate::messages::{Operation, OperationKind};

type Subscriber<E> = Arc<dyn Fn(Arc<E>) -> BoxFuture<'static, ()> + Send + Sync>;

pub struct EventList<E> {
    name: &'static str,
    subscribers: RwLock<Vec<Subscriber<E>>>,
}

impl<E: Send + Sync + 'static> EventList<E> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            subscribers: RwLock::new(Vec::new()),
        }
    }

    pub fn subscribe<F, Fut>(&self, subscriber: F)
    where
        F: Fn(Arc<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let subscriber: Subscriber<E> = Arc::new(move |event| subscriber(event).boxed());
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(subscriber);
    }

    pub fn len(&self) -> usize {
        self.subscribers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub async fn raise(&self, event: E) {
        let subscribers = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if subscribers.is_empty() {
            return;
        }

        let event = Arc::new(event);
        let results = join_all(
            subscribers.into_iter().map(|subscriber| {
                let event = event.clone();
                AssertUnwindSafe(async move { subscriber(event).await }).catch_unwind()
            }),
        )
        .await;

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            warn!(event = self.name, failed, "Event subscriber panicked");
        } else {
            debug!(event = self.name, subscribers = results.len(), "Event raised");
        }
    }
}

/// Raw payload received, before parsing.
#[derive(Debug, Clone)]
pub struct WireRequestEvent {
    pub timestamp: DateTime<Utc>,
    pub path: String,
    pub body: String,
}

/// Encoded payload about to be sent back.
#[derive(Debug, Clone)]
pub struct WireResponseEvent {
    pub timestamp: DateTime<Utc>,
    pub path: String,
    pub http_status: u16,
    pub body: String,
    pub elapsed: Duration,
}

/// Something went wrong that was converted into an error response.
#[derive(Debug, Clone)]
pub struct ExceptionEvent {
    pub timestamp: DateTime<Utc>,
    pub operation: Option<OperationKind>,
    pub message: String,
}

/// A request parsed successfully.
pub struct RequestEvent<Op: Operation> {
    pub timestamp: DateTime<Utc>,
    pub request: Arc<Op::Request>,
}

/// The effective response chosen for a request. `request` is absent when the
/// request could not be parsed.
pub struct ResponseEvent<Op: Operation> {
    pub timestamp: DateTime<Utc>,
    pub request: Option<Arc<Op::Request>>,
    pub response: Arc<Op::Response>,
    pub elapsed: Duration,
}
