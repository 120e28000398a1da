use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

use crate::http::{RequestSpec, Transport};
use crate::metrics::{FailureKind, OutcomeRecorder, RequestResult};

use super::permits::PermitPool;

pub(super) struct Worker {
    pub(super) id: usize,
    pub(super) spec: Arc<RequestSpec>,
    pub(super) transport: Arc<dyn Transport>,
    pub(super) permits: Arc<PermitPool>,
    pub(super) recorder: Arc<OutcomeRecorder>,
    pub(super) cancel_rx: watch::Receiver<bool>,
    pub(super) timeout: Duration,
}

impl Worker {
    /// Pulls permits until the pool is empty or cancellation is observed.
    /// Each permit is exactly one attempt; failed attempts are not retried.
    /// Returns the number of attempts made.
    pub(super) async fn run(self) -> u64 {
        let mut attempts: u64 = 0;
        loop {
            if *self.cancel_rx.borrow() {
                debug!(worker = self.id, attempts, "Worker observed cancellation");
                break;
            }
            if !self.permits.try_acquire() {
                break;
            }

            let result = attempt(self.transport.as_ref(), &self.spec, self.timeout).await;
            self.recorder.record(result);
            attempts = attempts.saturating_add(1);

            tokio::task::yield_now().await;
        }
        debug!(worker = self.id, attempts, "Worker finished");
        attempts
    }
}

/// Issues one request, bounded by `timeout` even if the transport ignores it.
pub(super) async fn attempt(
    transport: &dyn Transport,
    spec: &RequestSpec,
    timeout: Duration,
) -> RequestResult {
    let start = Instant::now();
    match tokio::time::timeout(timeout, transport.send(spec, timeout)).await {
        Ok(Ok(status)) => RequestResult::status(status, start.elapsed()),
        Ok(Err(failure)) => {
            debug!(kind = ?failure.kind, "Request failed: {}", failure.message);
            RequestResult::failure(failure.kind, failure.message, start.elapsed())
        }
        Err(_elapsed) => RequestResult::failure(
            FailureKind::Timeout,
            format!("Request timed out after {}ms", timeout.as_millis()),
            start.elapsed(),
        ),
    }
}
