use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid proxy URL '{url}': {source}")]
    InvalidProxyUrl {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid header name '{header}': {source}")]
    InvalidHeaderName {
        header: String,
        #[source]
        source: reqwest::header::InvalidHeaderName,
    },
    #[error("Invalid header value for '{header}': {source}")]
    InvalidHeaderValue {
        header: String,
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },
}
