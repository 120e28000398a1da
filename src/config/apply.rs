use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{TesterArgs, parse_header, parse_proxy};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ConfigFile, DurationValue};

/// Copies config file values into `args` for every option that was not given
/// explicitly on the command line.
///
/// # Errors
///
/// Returns an error when a header, proxy, or duration in the file is invalid.
pub fn apply_config(
    args: &mut TesterArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_cli(matches, "method")
        && let Some(method) = config.method
    {
        args.method = method;
    }

    if !is_cli(matches, "requests")
        && let Some(requests) = config.requests
    {
        args.requests = requests;
    }

    if !is_cli(matches, "concurrency")
        && let Some(concurrency) = config.concurrency
    {
        args.concurrency = concurrency;
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        let mut parsed = Vec::with_capacity(headers.len());
        for header in headers {
            parsed.push(
                parse_header(header)
                    .map_err(|err| AppError::config(ConfigError::InvalidHeader { source: err }))?,
            );
        }
        args.headers = parsed;
    }

    if !is_cli(matches, "data")
        && let Some(data) = config.data.clone()
    {
        args.data = Some(data);
    }

    if !is_cli(matches, "proxy")
        && let Some(proxy) = config.proxy.as_deref()
    {
        args.proxy = Some(
            parse_proxy(proxy)
                .map_err(|err| AppError::config(ConfigError::InvalidProxy { source: err }))?,
        );
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = config_duration(timeout, "timeout")?;
    }

    if !is_cli(matches, "connect_timeout")
        && let Some(timeout) = config.connect_timeout.as_ref()
    {
        args.connect_timeout = config_duration(timeout, "connect_timeout")?;
    }

    // --warmup and --no-warmup conflict; either one on the CLI overrides both
    // config keys.
    let warmup_on_cli = is_cli(matches, "warmup") || is_cli(matches, "no_warmup");
    if !warmup_on_cli {
        if let Some(no_warmup) = config.no_warmup {
            args.no_warmup = no_warmup;
        }
        if !args.no_warmup
            && let Some(warmup) = config.warmup
        {
            args.warmup = Some(warmup);
        }
    }

    if !is_cli(matches, "output_format")
        && let Some(format) = config.output_format
    {
        args.output_format = format;
    }

    if !is_cli(matches, "no_progress")
        && let Some(no_progress) = config.no_progress
    {
        args.no_progress = no_progress;
    }

    if !is_cli(matches, "no_color")
        && let Some(no_color) = config.no_color
    {
        args.no_color = no_color;
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn config_duration(value: &DurationValue, field: &'static str) -> AppResult<std::time::Duration> {
    value
        .to_duration()
        .map_err(|err| AppError::config(ConfigError::InvalidDuration { field, source: err }))
}
