use std::time::Duration;

use async_trait::async_trait;

use crate::metrics::FailureKind;

use super::RequestSpec;

/// A request attempt that produced no HTTP status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportFailure {
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Issues one request and reports the status code or why none was received.
///
/// Implementations must honor `timeout` for the whole attempt (connect, send,
/// and reading the response). Any status code, 4xx/5xx included, is `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, spec: &RequestSpec, timeout: Duration)
    -> Result<u16, TransportFailure>;
}
