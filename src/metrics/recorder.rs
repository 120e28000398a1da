use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;
use tracing::warn;

use super::{
    Aggregate, LatencyHistogram, LatencyPercentiles, LatencyStats, Outcome, RequestResult,
    RunState, StatusKey,
};

/// Distinct error-detail keys kept before further messages are folded into
/// [`OTHER_ERRORS_KEY`].
pub const MAX_ERROR_DETAIL_KEYS: usize = 64;
pub const OTHER_ERRORS_KEY: &str = "Other errors";

struct RecorderState {
    total_requested: u64,
    run_start: Instant,
    started_at: DateTime<Utc>,
    finished: Option<(Duration, DateTime<Utc>)>,
    attempted: u64,
    successful: u64,
    failed: u64,
    latency: LatencyStats,
    all_latency: LatencyStats,
    histogram: Option<LatencyHistogram>,
    status_codes: BTreeMap<StatusKey, u64>,
    error_details: BTreeMap<String, u64>,
}

impl RecorderState {
    fn new(total_requested: u64) -> Self {
        let histogram = match LatencyHistogram::new() {
            Ok(histogram) => Some(histogram),
            Err(err) => {
                warn!("Failed to initialize latency histogram: {}", err);
                None
            }
        };

        Self {
            total_requested,
            run_start: Instant::now(),
            started_at: Utc::now(),
            finished: None,
            attempted: 0,
            successful: 0,
            failed: 0,
            latency: LatencyStats::default(),
            all_latency: LatencyStats::default(),
            histogram,
            status_codes: BTreeMap::new(),
            error_details: BTreeMap::new(),
        }
    }

    fn record(&mut self, result: RequestResult) {
        self.attempted = self.attempted.saturating_add(1);
        self.all_latency.record(result.elapsed);

        let counter = self.status_codes.entry(result.status_key()).or_insert(0);
        *counter = counter.saturating_add(1);

        if result.is_success() {
            self.successful = self.successful.saturating_add(1);
            self.latency.record(result.elapsed);
            if let Some(histogram) = self.histogram.as_mut()
                && let Err(err) = histogram.record(result.elapsed)
            {
                warn!("{}", err);
            }
            return;
        }

        self.failed = self.failed.saturating_add(1);
        if let Outcome::Failure { kind, message } = result.outcome {
            let detail = format!("{}: {}", kind.name(), message);
            let key = if self.error_details.contains_key(&detail)
                || self.error_details.len() < MAX_ERROR_DETAIL_KEYS
            {
                detail
            } else {
                OTHER_ERRORS_KEY.to_owned()
            };
            let counter = self.error_details.entry(key).or_insert(0);
            *counter = counter.saturating_add(1);
        }
    }

    fn aggregate(&self, state: RunState) -> Aggregate {
        let (duration, finished_at) = match self.finished {
            Some((duration, finished_at)) => (duration, Some(finished_at)),
            None => (self.run_start.elapsed(), None),
        };
        let percentiles = self
            .histogram
            .as_ref()
            .map_or_else(LatencyPercentiles::default, LatencyHistogram::percentiles);

        Aggregate {
            state,
            total_requested: self.total_requested,
            attempted: self.attempted,
            successful: self.successful,
            failed: self.failed,
            latency: self.latency,
            all_latency: self.all_latency,
            percentiles,
            status_codes: self.status_codes.clone(),
            error_details: self.error_details.clone(),
            started_at: self.started_at,
            finished_at,
            duration,
        }
    }
}

/// Thread-safe accumulator for request results.
///
/// All running state sits behind one mutex: a snapshot sees each `record`
/// either fully applied or not at all. The lock is never held across an
/// await point.
pub struct OutcomeRecorder {
    state: Mutex<RecorderState>,
}

impl Default for OutcomeRecorder {
    fn default() -> Self {
        Self::new(0)
    }
}

impl std::fmt::Debug for OutcomeRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("OutcomeRecorder")
            .field("total_requested", &state.total_requested)
            .field("attempted", &state.attempted)
            .finish_non_exhaustive()
    }
}

impl OutcomeRecorder {
    #[must_use]
    pub fn new(total_requested: u64) -> Self {
        Self {
            state: Mutex::new(RecorderState::new(total_requested)),
        }
    }

    /// Clears all counters and restarts the run clock.
    pub fn begin(&self, total_requested: u64) {
        *self.lock() = RecorderState::new(total_requested);
    }

    pub fn record(&self, result: RequestResult) {
        self.lock().record(result);
    }

    /// Consistent copy of the current aggregate, usable while workers are
    /// still recording.
    #[must_use]
    pub fn snapshot(&self, state: RunState) -> Aggregate {
        self.lock().aggregate(state)
    }

    /// Stamps the end of the run and returns the final aggregate. Only the
    /// first call stamps; later calls return the same end time.
    #[must_use]
    pub fn finalize(&self, state: RunState) -> Aggregate {
        let mut guard = self.lock();
        if guard.finished.is_none() {
            guard.finished = Some((guard.run_start.elapsed(), Utc::now()));
        }
        guard.aggregate(state)
    }

    fn lock(&self) -> MutexGuard<'_, RecorderState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
