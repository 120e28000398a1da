use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Why an attempt produced no HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    Timeout,
    Network,
    Protocol,
}

impl FailureKind {
    /// Key used in the status histogram.
    #[must_use]
    pub const fn status_label(self) -> &'static str {
        match self {
            FailureKind::Timeout => "TIMEOUT",
            FailureKind::Network => "CONNECTION_ERROR",
            FailureKind::Protocol => "PROTOCOL_ERROR",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            FailureKind::Timeout => "TimeoutError",
            FailureKind::Network => "NetworkError",
            FailureKind::Protocol => "ProtocolError",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A response arrived; any status code, including 4xx/5xx.
    Status(u16),
    Failure { kind: FailureKind, message: String },
}

/// One attempted request. Consumed by the recorder and then dropped.
#[derive(Debug, Clone)]
pub struct RequestResult {
    pub outcome: Outcome,
    pub elapsed: Duration,
    pub completed_at: Instant,
}

impl RequestResult {
    #[must_use]
    pub fn status(status: u16, elapsed: Duration) -> Self {
        Self {
            outcome: Outcome::Status(status),
            elapsed,
            completed_at: Instant::now(),
        }
    }

    #[must_use]
    pub fn failure(kind: FailureKind, message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            outcome: Outcome::Failure {
                kind,
                message: message.into(),
            },
            elapsed,
            completed_at: Instant::now(),
        }
    }

    /// 2xx and 3xx responses count as successful; other statuses and
    /// transport failures count as failed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        match self.outcome {
            Outcome::Status(status) => status >= 200 && status < 400,
            Outcome::Failure { .. } => false,
        }
    }

    #[must_use]
    pub const fn status_key(&self) -> StatusKey {
        match self.outcome {
            Outcome::Status(status) => StatusKey::Code(status),
            Outcome::Failure { kind, .. } => StatusKey::Failure(kind),
        }
    }
}

/// Status histogram key: a status code, or the failure kind when none arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusKey {
    Code(u16),
    Failure(FailureKind),
}

impl fmt::Display for StatusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusKey::Code(code) => write!(f, "{}", code),
            StatusKey::Failure(kind) => f.write_str(kind.status_label()),
        }
    }
}

/// Running min/max/sum; the average is derived, no samples are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencyStats {
    count: u64,
    min: Option<Duration>,
    max: Duration,
    total_nanos: u128,
}

impl LatencyStats {
    pub fn record(&mut self, latency: Duration) {
        self.count = self.count.saturating_add(1);
        self.min = Some(self.min.map_or(latency, |current| current.min(latency)));
        self.max = self.max.max(latency);
        self.total_nanos = self.total_nanos.saturating_add(latency.as_nanos());
    }

    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Zero when nothing was recorded.
    #[must_use]
    pub fn min(&self) -> Duration {
        self.min.unwrap_or(Duration::ZERO)
    }

    #[must_use]
    pub const fn max(&self) -> Duration {
        self.max
    }

    /// Zero when nothing was recorded.
    #[must_use]
    pub fn average(&self) -> Duration {
        let avg_nanos = self
            .total_nanos
            .checked_div(u128::from(self.count))
            .unwrap_or(0);
        Duration::from_nanos(u64::try_from(avg_nanos).unwrap_or(u64::MAX))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencyPercentiles {
    pub p50: Duration,
    pub p90: Duration,
    pub p99: Duration,
}

/// Lifecycle of a dispatcher run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl RunState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, RunState::Completed | RunState::Cancelled)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Completed => "completed",
            RunState::Cancelled => "cancelled",
        }
    }
}

/// Point-in-time summary of a run.
///
/// `successful + failed == attempted <= total_requested` holds for every
/// snapshot. Latency fields cover successful attempts; `all_latency` covers
/// every attempt, failures included.
#[derive(Debug, Clone)]
pub struct Aggregate {
    pub state: RunState,
    pub total_requested: u64,
    pub attempted: u64,
    pub successful: u64,
    pub failed: u64,
    pub latency: LatencyStats,
    pub all_latency: LatencyStats,
    pub percentiles: LatencyPercentiles,
    pub status_codes: BTreeMap<StatusKey, u64>,
    pub error_details: BTreeMap<String, u64>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration: Duration,
}

impl Aggregate {
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        match self.successful.checked_add(self.failed) {
            Some(sum) => sum == self.attempted && self.attempted <= self.total_requested,
            None => false,
        }
    }

    #[must_use]
    pub fn status_count(&self, key: StatusKey) -> u64 {
        self.status_codes.get(&key).copied().unwrap_or(0)
    }

    /// Share of successful attempts in hundredths of a percent (10000 = 100%).
    #[must_use]
    pub fn success_rate_x100(&self) -> u64 {
        ratio_x100(self.successful, self.attempted)
    }

    #[must_use]
    pub fn failure_rate_x100(&self) -> u64 {
        ratio_x100(self.failed, self.attempted)
    }

    /// Attempts per second, scaled by 100. Durations under 100ms are treated
    /// as 100ms so tiny runs do not report absurd rates.
    #[must_use]
    pub fn requests_per_sec_x100(&self) -> u64 {
        let duration_ms = self.duration.as_millis().max(100);
        let scaled = u128::from(self.attempted)
            .saturating_mul(100_000)
            .checked_div(duration_ms)
            .unwrap_or(0);
        u64::try_from(scaled).unwrap_or(u64::MAX)
    }
}

fn ratio_x100(part: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    let scaled = u128::from(part)
        .saturating_mul(10_000)
        .checked_div(u128::from(total))
        .unwrap_or(0);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}
