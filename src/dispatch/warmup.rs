use std::time::Duration;

use futures_util::future::join_all;
use tracing::{debug, info};

use crate::http::{RequestSpec, Transport};

use super::worker::attempt;

/// Sends `count` unmeasured requests concurrently to open pooled connections
/// before the measured run. Returns how many produced an HTTP response.
pub async fn warmup(
    transport: &dyn Transport,
    spec: &RequestSpec,
    count: usize,
    timeout: Duration,
) -> usize {
    if count == 0 {
        return 0;
    }

    info!("Warming up connections ({} requests)", count);
    let results = join_all((0..count).map(|_| attempt(transport, spec, timeout))).await;
    let responded = results
        .iter()
        .filter(|result| matches!(result.outcome, crate::metrics::Outcome::Status(_)))
        .count();
    debug!(responded, count, "Warmup complete");
    responded
}
