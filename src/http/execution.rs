use futures_util::StreamExt;

use crate::metrics::FailureKind;

use super::TransportFailure;

pub(super) async fn drain_response_body(
    response: reqwest::Response,
) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}

pub(super) fn classify_error(err: &reqwest::Error) -> FailureKind {
    if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_connect() {
        FailureKind::Network
    } else if err.is_body() || err.is_decode() {
        FailureKind::Protocol
    } else if err.is_request() {
        if is_malformed_response(err) {
            FailureKind::Protocol
        } else {
            FailureKind::Network
        }
    } else {
        FailureKind::Protocol
    }
}

/// reqwest reports hyper's parse failures as request errors; find them in the
/// source chain.
fn is_malformed_response(err: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(inner) = source {
        if let Some(hyper_err) = inner.downcast_ref::<hyper::Error>() {
            return hyper_err.is_parse()
                || hyper_err.is_parse_status()
                || hyper_err.is_incomplete_message();
        }
        source = inner.source();
    }
    false
}

pub(super) fn into_failure(err: &reqwest::Error) -> TransportFailure {
    TransportFailure::new(classify_error(err), describe_error(err))
}

/// Renders the error with its source chain; reqwest's top-level message alone
/// rarely says what went wrong at the socket.
fn describe_error(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}
