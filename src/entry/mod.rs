mod confirm;
mod plan;

use std::ffi::OsString;
use std::path::Path;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::debug;

use volley::args::{LARGE_RUN_THRESHOLD, TesterArgs};
use volley::config::{apply_config, load_config};
use volley::error::{AppError, AppResult, ValidationError};
use volley::logger::init_logging;

use plan::{build_plan, execute_plan};

/// Default config filenames checked when no CLI args are provided.
const DEFAULT_CONFIG_FILES: [&str; 2] = ["volley.toml", "volley.json"];

pub(crate) fn run() -> AppResult<()> {
    let (mut args, matches) = match parse_args()? {
        Some(parsed) => parsed,
        None => return Ok(()),
    };

    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }

    init_logging(args.verbose, args.no_color);
    debug!(?args, "Resolved arguments");

    let plan = build_plan(&args)?;

    if args.requests > LARGE_RUN_THRESHOLD && !args.yes {
        let stdin = std::io::stdin();
        let confirmed =
            confirm::confirm_large_run(args.requests, &mut stdin.lock(), &mut std::io::stderr())?;
        if !confirmed {
            eprintln!("Cancelled.");
            return Ok(());
        }
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(ValidationError::RuntimeBuildFailed { source: err }))?;

    runtime.block_on(execute_plan(plan))
}

fn parse_args() -> AppResult<Option<(TesterArgs, ArgMatches)>> {
    let mut cmd = TesterArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = TesterArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}
