use std::time::Duration;

use serde::Deserialize;

use crate::args::{HttpMethod, OutputFormat, parse_duration_arg};
use crate::error::ValidationError;

/// Settings accepted from `volley.toml` / `volley.json`. Every field is
/// optional; flags given on the command line take precedence.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    pub requests: Option<u64>,
    #[serde(alias = "connections")]
    pub concurrency: Option<usize>,
    pub headers: Option<Vec<String>>,
    pub data: Option<String>,
    pub proxy: Option<String>,
    pub timeout: Option<DurationValue>,
    pub connect_timeout: Option<DurationValue>,
    pub warmup: Option<usize>,
    pub no_warmup: Option<bool>,
    pub output_format: Option<OutputFormat>,
    pub no_progress: Option<bool>,
    pub no_color: Option<bool>,
}

/// A duration written either as whole seconds (`30`) or with a unit (`"500ms"`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(0) => Err(ValidationError::DurationZero),
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => parse_duration_arg(text),
        }
    }
}
