use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use volley::args::{OutputFormat, TesterArgs, default_warmup, parse_target_url};
use volley::dispatch::{Dispatcher, DispatcherHandle, RunConfig, warmup};
use volley::error::{AppError, AppResult, ValidationError};
use volley::http::{ReqwestTransport, RequestSpec, Transport, TransportSettings};
use volley::report::{render_json, render_text, spawn_progress_reporter};
use volley::shutdown::setup_signal_shutdown_handler;

/// Redraw interval for the progress line.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

/// Everything needed to execute one run, validated up front.
#[derive(Debug)]
pub(super) struct RunPlan {
    pub(super) config: RunConfig,
    pub(super) spec: RequestSpec,
    pub(super) transport: TransportSettings,
    pub(super) warmup: usize,
    pub(super) output_format: OutputFormat,
    pub(super) progress: bool,
    pub(super) no_color: bool,
}

pub(super) fn build_plan(args: &TesterArgs) -> AppResult<RunPlan> {
    let raw_url = args.url.as_deref().ok_or_else(|| {
        tracing::error!("Missing URL (set --url or provide in config).");
        AppError::validation(ValidationError::MissingUrl)
    })?;
    let url = parse_target_url(raw_url).map_err(AppError::validation)?;

    let config = RunConfig {
        total_requests: args.requests,
        concurrency: args.concurrency,
        timeout: args.request_timeout,
    };
    config.validate().map_err(AppError::config)?;

    let spec = RequestSpec::new(args.method, url)
        .with_headers(args.headers.clone())
        .with_body(args.data.as_ref().map(|data| data.as_bytes().to_vec()))
        .with_proxy(args.proxy.clone());

    let warmup = if args.no_warmup || args.requests == 0 {
        0
    } else {
        args.warmup.unwrap_or_else(|| default_warmup(args.concurrency))
    };

    Ok(RunPlan {
        config,
        spec,
        transport: TransportSettings {
            connect_timeout: args.connect_timeout,
            pool_max_idle_per_host: args.concurrency,
        },
        warmup,
        output_format: args.output_format,
        progress: !args.no_progress,
        no_color: args.no_color,
    })
}

pub(super) async fn execute_plan(plan: RunPlan) -> AppResult<()> {
    let transport: Arc<dyn Transport> =
        Arc::new(ReqwestTransport::new(&plan.spec, &plan.transport)?);

    if plan.output_format == OutputFormat::Text {
        print_run_header(&plan);
    }

    let dispatcher = Dispatcher::new(Arc::clone(&transport));
    let handle = dispatcher.handle();
    let signal_task = setup_signal_shutdown_handler(handle.clone());

    if plan.warmup > 0
        && let Some(responded) = run_warmup(transport.as_ref(), &plan, &handle).await
        && responded < plan.warmup
    {
        warn!(
            "{} of {} warmup requests got no response",
            plan.warmup.saturating_sub(responded),
            plan.warmup
        );
    }

    let progress_task = plan
        .progress
        .then(|| spawn_progress_reporter(handle.clone(), PROGRESS_INTERVAL, plan.no_color));

    let aggregate = dispatcher.run(plan.config, plan.spec).await?;

    if let Some(task) = progress_task
        && let Err(err) = task.await
    {
        warn!("Progress task failed: {}", err);
    }
    if let Err(err) = signal_task.await {
        warn!("Signal handler task failed: {}", err);
    }

    let report = match plan.output_format {
        OutputFormat::Text => render_text(&aggregate),
        OutputFormat::Json => render_json(&aggregate)?,
    };
    print!("{}", report);
    if plan.output_format == OutputFormat::Json {
        println!();
    }
    info!(state = aggregate.state.as_str(), "Report written");
    Ok(())
}

/// Sends the warmup batch unless cancellation arrives first. Returns `None`
/// when interrupted; the dispatcher then observes the cancel and records
/// nothing.
async fn run_warmup(
    transport: &dyn Transport,
    plan: &RunPlan,
    handle: &DispatcherHandle,
) -> Option<usize> {
    tokio::select! {
        responded = warmup(transport, &plan.spec, plan.warmup, plan.config.timeout) => Some(responded),
        () = handle.cancel_requested() => {
            warn!("Warmup interrupted");
            None
        }
    }
}

fn print_run_header(plan: &RunPlan) {
    let rule = "=".repeat(60);
    println!("{}", rule);
    println!("Starting Load Test");
    println!("{}", rule);
    println!("Target URL: {}", plan.spec.url());
    println!("Method: {}", plan.spec.method().as_str());
    println!("Total Requests: {}", plan.config.total_requests);
    println!("Concurrency: {}", plan.config.concurrency);
    if let Some(proxy) = plan.spec.proxy() {
        println!("Proxy: {}", proxy.url());
    }
    println!("{}", rule);
    println!();
}
