use serde_json::{Map, Value, json};

use crate::error::AppResult;
use crate::metrics::Aggregate;

fn micros(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// Pretty-printed JSON report. Durations are integers (`_ms`, `_us`) and rates
/// are hundredths (`_x100`) so consumers never parse floats.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(aggregate: &Aggregate) -> AppResult<String> {
    let status_codes: Map<String, Value> = aggregate
        .status_codes
        .iter()
        .map(|(status, count)| (status.to_string(), json!(count)))
        .collect();
    let error_details: Map<String, Value> = aggregate
        .error_details
        .iter()
        .map(|(error, count)| (error.clone(), json!(count)))
        .collect();

    let payload = json!({
        "state": aggregate.state.as_str(),
        "total_requested": aggregate.total_requested,
        "attempted": aggregate.attempted,
        "successful": aggregate.successful,
        "failed": aggregate.failed,
        "success_rate_x100": aggregate.success_rate_x100(),
        "duration_ms": u64::try_from(aggregate.duration.as_millis()).unwrap_or(u64::MAX),
        "requests_per_sec_x100": aggregate.requests_per_sec_x100(),
        "started_at": aggregate.started_at.to_rfc3339(),
        "finished_at": aggregate.finished_at.map(|at| at.to_rfc3339()),
        "latency_us": {
            "successful": {
                "count": aggregate.latency.count(),
                "min": micros(aggregate.latency.min()),
                "max": micros(aggregate.latency.max()),
                "avg": micros(aggregate.latency.average()),
                "p50": micros(aggregate.percentiles.p50),
                "p90": micros(aggregate.percentiles.p90),
                "p99": micros(aggregate.percentiles.p99)
            },
            "all": {
                "count": aggregate.all_latency.count(),
                "min": micros(aggregate.all_latency.min()),
                "max": micros(aggregate.all_latency.max()),
                "avg": micros(aggregate.all_latency.average())
            }
        },
        "status_codes": status_codes,
        "error_details": error_details
    });

    Ok(serde_json::to_string_pretty(&payload)?)
}
