use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid header format: '{value}'. Expected 'Key: Value'")]
    InvalidHeaderFormat { value: String },
    #[error("Header name must not be empty: '{value}'")]
    HeaderNameEmpty { value: String },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Missing target URL. Pass --url or set 'url' in the config file.")]
    MissingUrl,
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported URL scheme '{scheme}'. Use http or https.")]
    UnsupportedScheme { scheme: String },
    #[error("URL is missing host.")]
    UrlMissingHost,
    #[error("Invalid proxy URL '{url}': {source}")]
    InvalidProxyUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported proxy scheme '{scheme}'. Use http, https, socks5 or socks5h.")]
    UnsupportedProxyScheme { scheme: String },
    #[error("Proxy URL is missing host.")]
    ProxyMissingHost,
    #[error("Proxy credentials are not valid UTF-8 once decoded: {source}")]
    InvalidProxyCredentials {
        #[source]
        source: std::str::Utf8Error,
    },
    #[error("Failed to build runtime: {source}")]
    RuntimeBuildFailed {
        #[source]
        source: std::io::Error,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
