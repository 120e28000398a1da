use std::time::Duration;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::ValidationError;
use crate::http::{ProxyCredentials, ProxySpec};

pub fn parse_header(s: &str) -> Result<(String, String), ValidationError> {
    match s.split_once(':') {
        Some((key, value)) => {
            let key = key.trim();
            if key.is_empty() {
                return Err(ValidationError::HeaderNameEmpty {
                    value: s.to_owned(),
                });
            }
            Ok((key.to_owned(), value.trim().to_owned()))
        }
        None => Err(ValidationError::InvalidHeaderFormat {
            value: s.to_owned(),
        }),
    }
}

/// Parses a duration such as `500ms`, `30s`, `2m` or `1h`. A bare number is
/// read as seconds.
///
/// # Errors
///
/// Returns an error when the value is empty, malformed, zero, or overflows.
pub fn parse_duration_arg(s: &str) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let digits_len = value.chars().take_while(char::is_ascii_digit).count();
    if digits_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part
        .parse()
        .map_err(|err| ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => Duration::from_secs(
            number
                .checked_mul(60)
                .ok_or(ValidationError::DurationOverflow)?,
        ),
        "h" => Duration::from_secs(
            number
                .checked_mul(60)
                .and_then(|minutes| minutes.checked_mul(60))
                .ok_or(ValidationError::DurationOverflow)?,
        ),
        _ => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };

    if duration.is_zero() {
        return Err(ValidationError::DurationZero);
    }

    Ok(duration)
}

/// Parses the target URL. Only `http` and `https` targets with a host are
/// accepted.
///
/// # Errors
///
/// Returns an error when the URL cannot be parsed or is not an HTTP(S) URL.
pub fn parse_target_url(s: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(s.trim()).map_err(|err| ValidationError::InvalidUrl {
        url: s.to_owned(),
        source: err,
    })?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ValidationError::UnsupportedScheme {
                scheme: other.to_owned(),
            });
        }
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::UrlMissingHost);
    }
    Ok(url)
}

/// Parses a proxy URL. Userinfo (`user:pass@`) is split off into proxy
/// credentials and removed from the endpoint URL.
///
/// # Errors
///
/// Returns an error when the URL is malformed, has no host, or uses a scheme
/// the transport cannot proxy through.
pub fn parse_proxy(s: &str) -> Result<ProxySpec, ValidationError> {
    let mut url = Url::parse(s.trim()).map_err(|err| ValidationError::InvalidProxyUrl {
        url: s.to_owned(),
        source: err,
    })?;
    match url.scheme() {
        "http" | "https" | "socks5" | "socks5h" => {}
        other => {
            return Err(ValidationError::UnsupportedProxyScheme {
                scheme: other.to_owned(),
            });
        }
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::ProxyMissingHost);
    }

    let credentials = if url.username().is_empty() {
        None
    } else {
        Some(ProxyCredentials {
            username: decode_userinfo(url.username())?,
            password: decode_userinfo(url.password().unwrap_or_default())?,
        })
    };
    if credentials.is_some()
        && (url.set_username("").is_err() || url.set_password(None).is_err())
    {
        return Err(ValidationError::ProxyMissingHost);
    }

    Ok(ProxySpec::new(url, credentials))
}

/// `Url` keeps userinfo percent-encoded; the proxy needs the raw credentials.
fn decode_userinfo(value: &str) -> Result<String, ValidationError> {
    percent_decode_str(value)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|err| ValidationError::InvalidProxyCredentials { source: err })
}
