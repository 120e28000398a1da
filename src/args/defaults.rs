pub const DEFAULT_USER_AGENT: &str = concat!("volley-loadtest/", env!("CARGO_PKG_VERSION"));

/// Request budgets above this size ask for confirmation unless `--yes` is set.
pub const LARGE_RUN_THRESHOLD: u64 = 10_000;

/// Upper bound on the implicit warmup batch.
const MAX_DEFAULT_WARMUP: usize = 10;

/// Warmup batch used when `--warmup` is not given: one request per ten
/// workers, capped at ten.
#[must_use]
pub fn default_warmup(concurrency: usize) -> usize {
    concurrency
        .checked_div(10)
        .unwrap_or(0)
        .min(MAX_DEFAULT_WARMUP)
}
