use std::time::Duration;

use crate::metrics::{Aggregate, LatencyStats, RunState};

use super::PERCENT_DIVISOR;

const RULE_WIDTH: usize = 60;
/// Longer error-detail keys are cut and suffixed with `...`.
const MAX_ERROR_DISPLAY_CHARS: usize = 100;
const US_PER_MS: u128 = 1_000;

/// Renders the end-of-run summary shown on stdout.
#[must_use]
pub fn render_text(aggregate: &Aggregate) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut lines = Vec::new();

    lines.push(rule.clone());
    lines.push("Test Results".to_owned());
    lines.push(rule.clone());
    if aggregate.state == RunState::Cancelled {
        lines.push(format!(
            "Cancelled: {} of {} requests attempted",
            aggregate.attempted, aggregate.total_requested
        ));
    }
    lines.push(format!("Total Requests: {}", aggregate.attempted));
    lines.push(format!(
        "Successful: {} ({})",
        aggregate.successful,
        format_percent_x100(aggregate.success_rate_x100())
    ));
    lines.push(format!(
        "Failed: {} ({})",
        aggregate.failed,
        format_percent_x100(aggregate.failure_rate_x100())
    ));
    lines.push(format!(
        "Duration: {} seconds",
        format_seconds(aggregate.duration)
    ));
    let rps = aggregate.requests_per_sec_x100();
    lines.push(format!(
        "Requests/sec: {}.{:02}",
        rps / PERCENT_DIVISOR,
        rps % PERCENT_DIVISOR
    ));

    if aggregate.latency.count() > 0 {
        lines.push(String::new());
        lines.push("Response Times (successful):".to_owned());
        push_latency_lines(&mut lines, &aggregate.latency);
        lines.push(format!("  P50: {} ms", format_ms(aggregate.percentiles.p50)));
        lines.push(format!("  P90: {} ms", format_ms(aggregate.percentiles.p90)));
        lines.push(format!("  P99: {} ms", format_ms(aggregate.percentiles.p99)));
    }
    if aggregate.failed > 0 && aggregate.all_latency.count() > 0 {
        lines.push(String::new());
        lines.push("Response Times (all attempts):".to_owned());
        push_latency_lines(&mut lines, &aggregate.all_latency);
    }

    lines.push(String::new());
    lines.push("Status Codes:".to_owned());
    if aggregate.status_codes.is_empty() {
        lines.push("  none".to_owned());
    }
    for (status, count) in &aggregate.status_codes {
        lines.push(format!("  {}: {}", status, count));
    }

    if !aggregate.error_details.is_empty() {
        lines.push(String::new());
        lines.push("Error Details:".to_owned());
        let mut details: Vec<(&String, &u64)> = aggregate.error_details.iter().collect();
        details.sort_by(|left, right| right.1.cmp(left.1).then_with(|| left.0.cmp(right.0)));
        for (error, count) in details {
            lines.push(format!("  {}: {}", truncate_error(error), count));
        }
    }

    lines.push(rule);
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn push_latency_lines(lines: &mut Vec<String>, stats: &LatencyStats) {
    lines.push(format!("  Average: {} ms", format_ms(stats.average())));
    lines.push(format!("  Min: {} ms", format_ms(stats.min())));
    lines.push(format!("  Max: {} ms", format_ms(stats.max())));
}

fn format_percent_x100(value: u64) -> String {
    format!("{}.{:02}%", value / PERCENT_DIVISOR, value % PERCENT_DIVISOR)
}

/// Milliseconds with two decimals, truncated.
pub(super) fn format_ms(duration: Duration) -> String {
    let micros = duration.as_micros();
    let whole = micros / US_PER_MS;
    let hundredths = (micros % US_PER_MS) / 10;
    format!("{}.{:02}", whole, hundredths)
}

fn format_seconds(duration: Duration) -> String {
    let centis = duration.as_millis() / 10;
    format!("{}.{:02}", centis / 100, centis % 100)
}

pub(super) fn truncate_error(error: &str) -> String {
    if error.chars().count() <= MAX_ERROR_DISPLAY_CHARS {
        return error.to_owned();
    }
    let mut cut: String = error.chars().take(MAX_ERROR_DISPLAY_CHARS).collect();
    cut.push_str("...");
    cut
}
