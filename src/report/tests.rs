use std::time::Duration;

use super::progress::progress_segments;
use super::text::{format_ms, truncate_error};
use super::*;
use crate::metrics::{Aggregate, FailureKind, OutcomeRecorder, RequestResult, RunState};

fn finished_run() -> Aggregate {
    let recorder = OutcomeRecorder::new(5);
    recorder.record(RequestResult::status(200, Duration::from_millis(100)));
    recorder.record(RequestResult::status(200, Duration::from_millis(300)));
    recorder.record(RequestResult::status(301, Duration::from_millis(200)));
    recorder.record(RequestResult::status(503, Duration::from_millis(50)));
    recorder.record(RequestResult::failure(
        FailureKind::Network,
        "connection refused",
        Duration::from_millis(5),
    ));
    recorder.finalize(RunState::Completed)
}

#[test]
fn text_report_lists_totals_latency_and_statuses() -> Result<(), String> {
    let report = render_text(&finished_run());
    let expected = [
        "Total Requests: 5",
        "Successful: 3 (60.00%)",
        "Failed: 2 (40.00%)",
        "Response Times (successful):",
        "  Average: 200.00 ms",
        "  Min: 100.00 ms",
        "  Max: 300.00 ms",
        "Response Times (all attempts):",
        "  Min: 5.00 ms",
        "  200: 2",
        "  301: 1",
        "  503: 1",
        "  CONNECTION_ERROR: 1",
        "Error Details:",
        "  NetworkError: connection refused: 1",
    ];
    for line in expected {
        if !report.lines().any(|candidate| candidate == line) {
            return Err(format!("Missing line '{}' in report:\n{}", line, report));
        }
    }
    if report.contains("Cancelled") {
        return Err("Completed run must not be reported as cancelled".to_owned());
    }
    Ok(())
}

#[test]
fn text_report_sorts_error_details_by_count() -> Result<(), String> {
    let recorder = OutcomeRecorder::new(4);
    recorder.record(RequestResult::failure(FailureKind::Protocol, "rare", Duration::ZERO));
    for _ in 0..3 {
        recorder.record(RequestResult::failure(
            FailureKind::Timeout,
            "common",
            Duration::ZERO,
        ));
    }
    let report = render_text(&recorder.finalize(RunState::Completed));
    let common = report.find("TimeoutError: common: 3").ok_or("Missing common error")?;
    let rare = report.find("ProtocolError: rare: 1").ok_or("Missing rare error")?;
    if common > rare {
        return Err(format!("Errors not sorted by count:\n{}", report));
    }
    Ok(())
}

#[test]
fn empty_run_renders_without_latency_block() -> Result<(), String> {
    let recorder = OutcomeRecorder::new(0);
    let report = render_text(&recorder.finalize(RunState::Completed));
    if !report.contains("Total Requests: 0") || !report.contains("Successful: 0 (0.00%)") {
        return Err(format!("Unexpected empty report:\n{}", report));
    }
    if report.contains("Response Times") {
        return Err("Empty run must not print latency".to_owned());
    }
    Ok(())
}

#[test]
fn cancelled_run_is_flagged() -> Result<(), String> {
    let recorder = OutcomeRecorder::new(100);
    recorder.record(RequestResult::status(200, Duration::from_millis(1)));
    let report = render_text(&recorder.finalize(RunState::Cancelled));
    if !report.contains("Cancelled: 1 of 100 requests attempted") {
        return Err(format!("Missing cancellation note:\n{}", report));
    }
    Ok(())
}

#[test]
fn json_report_uses_integer_fields() -> Result<(), String> {
    let rendered = render_json(&finished_run()).map_err(|err| err.to_string())?;
    let value: serde_json::Value =
        serde_json::from_str(&rendered).map_err(|err| format!("Invalid JSON: {}", err))?;

    if value.get("state").and_then(serde_json::Value::as_str) != Some("completed") {
        return Err(format!("Unexpected state: {}", rendered));
    }
    if value.get("attempted").and_then(serde_json::Value::as_u64) != Some(5) {
        return Err(format!("Unexpected attempted: {}", rendered));
    }
    if value.get("success_rate_x100").and_then(serde_json::Value::as_u64) != Some(6000) {
        return Err(format!("Unexpected success rate: {}", rendered));
    }
    let avg = value
        .pointer("/latency_us/successful/avg")
        .and_then(serde_json::Value::as_u64);
    if avg != Some(200_000) {
        return Err(format!("Unexpected average: {:?}", avg));
    }
    let network = value
        .pointer("/status_codes/CONNECTION_ERROR")
        .and_then(serde_json::Value::as_u64);
    if network != Some(1) {
        return Err(format!("Unexpected status codes: {}", rendered));
    }
    if value.pointer("/status_codes/200").and_then(serde_json::Value::as_u64) != Some(2) {
        return Err(format!("Unexpected 200 count: {}", rendered));
    }
    if value.get("finished_at").is_none_or(serde_json::Value::is_null) {
        return Err("Finished run must carry finished_at".to_owned());
    }
    Ok(())
}

#[test]
fn long_error_messages_are_truncated() -> Result<(), String> {
    let long = "x".repeat(150);
    let shown = truncate_error(&long);
    if shown.chars().count() != 103 || !shown.ends_with("...") {
        return Err(format!("Unexpected truncation: {} chars", shown.chars().count()));
    }
    if truncate_error("short") != "short" {
        return Err("Short messages must be kept".to_owned());
    }
    Ok(())
}

#[test]
fn milliseconds_render_with_two_decimals() -> Result<(), String> {
    let cases = [
        (Duration::from_micros(1_234_567), "1234.56"),
        (Duration::from_micros(500), "0.50"),
        (Duration::ZERO, "0.00"),
    ];
    for (input, expected) in cases {
        let rendered = format_ms(input);
        if rendered != expected {
            return Err(format!("{:?}: expected {}, got {}", input, expected, rendered));
        }
    }
    Ok(())
}

#[test]
fn progress_line_reflects_snapshot() -> Result<(), String> {
    let recorder = OutcomeRecorder::new(4);
    recorder.record(RequestResult::status(200, Duration::from_millis(1)));
    recorder.record(RequestResult::status(500, Duration::from_millis(1)));
    let line: String = progress_segments(&recorder.snapshot(RunState::Running))
        .into_iter()
        .map(|(text, _)| text)
        .collect();
    let expected_bar = format!("[{}{}]", "#".repeat(15), "-".repeat(15));
    if !line.starts_with(&expected_bar) {
        return Err(format!("Unexpected bar: {}", line));
    }
    if !line.contains(" 50.00% | 2/4 requests | ok 1 | failed 1") {
        return Err(format!("Unexpected progress line: {}", line));
    }
    Ok(())
}
