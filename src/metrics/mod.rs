//! Per-request results and the order-independent run aggregate.
mod histogram;
mod recorder;
mod types;


pub use histogram::LatencyHistogram;
pub use recorder::{MAX_ERROR_DETAIL_KEYS, OTHER_ERRORS_KEY, OutcomeRecorder};
pub use types::{
    Aggregate, FailureKind, LatencyPercentiles, LatencyStats, Outcome, RequestResult, RunState,
    StatusKey,
};
