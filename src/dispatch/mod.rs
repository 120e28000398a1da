//! Fixed-size worker pool that spends a request budget and folds every
//! attempt into one [`Aggregate`].
mod permits;
mod warmup;
mod worker;


use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult, ConfigError};
use crate::http::{RequestSpec, Transport};
use crate::metrics::{Aggregate, OutcomeRecorder, RunState};

use permits::PermitPool;
pub use warmup::warmup;
use worker::Worker;

/// Budget and limits for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub total_requests: u64,
    pub concurrency: usize,
    pub timeout: Duration,
}

impl RunConfig {
    /// # Errors
    ///
    /// Returns an error when concurrency is zero or the timeout is zero.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ConcurrencyZero);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::TimeoutZero);
        }
        Ok(())
    }

    /// Workers actually spawned: `min(concurrency, total_requests)`.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        usize::try_from(self.total_requests).map_or(self.concurrency, |total| {
            total.min(self.concurrency)
        })
    }
}

/// Cloneable control surface for a dispatcher: cancel it, observe its state,
/// or read a progress snapshot while `run` is in flight.
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    cancel_tx: Arc<watch::Sender<bool>>,
    state_rx: watch::Receiver<RunState>,
    recorder: Arc<OutcomeRecorder>,
}

impl DispatcherHandle {
    /// Requests cooperative cancellation. Workers stop before their next
    /// attempt; in-flight attempts finish or time out.
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    #[must_use]
    pub fn is_cancel_requested(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    /// Resolves once `cancel` has been called on any clone of this handle.
    pub async fn cancel_requested(&self) {
        let mut cancel_rx = self.cancel_tx.subscribe();
        if cancel_rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        *self.state_rx.borrow()
    }

    #[must_use]
    pub fn snapshot(&self) -> Aggregate {
        self.recorder.snapshot(self.state())
    }

    /// Resolves once the run reaches `Completed` or `Cancelled`, or the
    /// dispatcher was dropped without finishing.
    pub async fn finished(&self) -> RunState {
        let mut state_rx = self.state_rx.clone();
        if state_rx.wait_for(|state| state.is_terminal()).await.is_err() {
            warn!("Dispatcher dropped before the run finished");
        }
        let state = *state_rx.borrow();
        state
    }
}

/// Runs one load test. `Idle -> Running -> Completed | Cancelled`; `run`
/// consumes the dispatcher, so an instance executes exactly one run.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    cancel_tx: Arc<watch::Sender<bool>>,
    state_tx: watch::Sender<RunState>,
    recorder: Arc<OutcomeRecorder>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        let (state_tx, _) = watch::channel(RunState::Idle);
        Self {
            transport,
            cancel_tx: Arc::new(cancel_tx),
            state_tx,
            recorder: Arc::new(OutcomeRecorder::default()),
        }
    }

    #[must_use]
    pub fn handle(&self) -> DispatcherHandle {
        DispatcherHandle {
            cancel_tx: Arc::clone(&self.cancel_tx),
            state_rx: self.state_tx.subscribe(),
            recorder: Arc::clone(&self.recorder),
        }
    }

    /// Spends `config.total_requests` permits across `config.concurrency`
    /// workers and returns the final aggregate.
    ///
    /// A cancellation is not an error: the aggregate is returned with state
    /// `Cancelled` and covers only the attempts actually made.
    ///
    /// # Errors
    ///
    /// Returns a configuration error, before any request is issued, when the
    /// run configuration is invalid.
    pub async fn run(self, config: RunConfig, spec: RequestSpec) -> AppResult<Aggregate> {
        config.validate().map_err(AppError::config)?;

        let spec = Arc::new(spec);
        let permits = Arc::new(PermitPool::new(config.total_requests));
        let worker_count = config.worker_count();
        self.recorder.begin(config.total_requests);
        self.state_tx.send_replace(RunState::Running);
        info!(
            url = %spec.url(),
            method = spec.method().as_str(),
            requests = config.total_requests,
            concurrency = config.concurrency,
            workers = worker_count,
            "Starting load test"
        );

        let mut handles = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            let worker = Worker {
                id,
                spec: Arc::clone(&spec),
                transport: Arc::clone(&self.transport),
                permits: Arc::clone(&permits),
                recorder: Arc::clone(&self.recorder),
                cancel_rx: self.cancel_tx.subscribe(),
                timeout: config.timeout,
            };
            handles.push(tokio::spawn(worker.run()));
        }

        for handle in handles {
            if let Err(err) = handle.await {
                error!("Worker task failed: {}", err);
            }
        }

        let cancelled = *self.cancel_tx.borrow() && permits.remaining() > 0;
        let final_state = if cancelled {
            RunState::Cancelled
        } else {
            RunState::Completed
        };
        let aggregate = self.recorder.finalize(final_state);
        self.state_tx.send_replace(final_state);

        if cancelled {
            warn!(
                "Load test cancelled after {}/{} requests",
                aggregate.attempted, aggregate.total_requested
            );
        } else {
            info!(
                attempted = aggregate.attempted,
                successful = aggregate.successful,
                failed = aggregate.failed,
                duration_ms = u64::try_from(aggregate.duration.as_millis()).unwrap_or(u64::MAX),
                "Load test complete"
            );
        }

        Ok(aggregate)
    }
}
