//! Per-operation request/response counters, shared by client and server
//!
//! Atomics for in-process snapshots, mirrored to the `metrics` facade so an
//! installed recorder exports them as well.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::messages::OperationKind;

#[derive(Debug, Default)]
struct OperationCounters {
    requests_ok: AtomicU64,
    requests_error: AtomicU64,
    responses_ok: AtomicU64,
    responses_error: AtomicU64,
}

/// Point-in-time copy of one operation's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub requests_ok: u64,
    pub requests_error: u64,
    pub responses_ok: u64,
    pub responses_error: u64,
}

impl CounterSnapshot {
    pub fn requests(&self) -> u64 {
        self.requests_ok + self.requests_error
    }

    pub fn responses(&self) -> u64 {
        self.responses_ok + self.responses_error
    }
}

#[derive(Debug)]
pub struct Counters {
    table: Vec<OperationCounters>,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            table: OperationKind::ALL.iter().map(|_| OperationCounters::default()).collect(),
        }
    }
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self, kind: OperationKind, ok: bool) {
        let counters = &self.table[kind.index()];
        let counter = if ok {
            &counters.requests_ok
        } else {
            &counters.requests_error
        };
        counter.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("oicp_requests_total", "operation" => kind.name(), "outcome" => outcome(ok))
            .increment(1);
    }

    pub fn record_response(&self, kind: OperationKind, ok: bool) {
        let counters = &self.table[kind.index()];
        let counter = if ok {
            &counters.responses_ok
        } else {
            &counters.responses_error
        };
        counter.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("oicp_responses_total", "operation" => kind.name(), "outcome" => outcome(ok))
            .increment(1);
    }

    pub fn snapshot(&self, kind: OperationKind) -> CounterSnapshot {
        let counters = &self.table[kind.index()];
        CounterSnapshot {
            requests_ok: counters.requests_ok.load(Ordering::Relaxed),
            requests_error: counters.requests_error.load(Ordering::Relaxed),
            responses_ok: counters.responses_ok.load(Ordering::Relaxed),
            responses_error: counters.responses_error.load(Ordering::Relaxed),
        }
    }
}

fn outcome(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn counters_are_per_operation() {
        let counters = Counters::new();
        counters.record_request(OperationKind::AuthorizeStart, true);
        counters.record_response(OperationKind::AuthorizeStart, false);
        counters.record_request(OperationKind::PullEvseData, false);

        let start = counters.snapshot(OperationKind::AuthorizeStart);
        assert_eq!(start.requests_ok, 1);
        assert_eq!(start.responses_error, 1);
        assert_eq!(counters.snapshot(OperationKind::PullEvseData).requests_error, 1);
        assert_eq!(counters.snapshot(OperationKind::AuthorizeStop), CounterSnapshot::default());
    }

    #[tokio::test]
    async fn concurrent_increments_are_not_lost() {
        let counters = Arc::new(Counters::new());
        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let counters = counters.clone();
                tokio::spawn(async move {
                    counters.record_request(OperationKind::PushEvseStatus, i % 2 == 0);
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(counters.snapshot(OperationKind::PushEvseStatus).requests(), 32);
    }
}
