//! Command-line interface for the transformer.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::runtime::Runtime;
use tokio::signal::unix::{signal, Signal, SignalKind};
use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{RunData, RuntimeConfig, SourceName};
use crate::error::{Result, TransformError};
use crate::output::JsonLinesSink;
use crate::pipeline::{log_summary, RunInfo, Runner};
use crate::reader::open_records;
use crate::status::{ExceptionMonitor, RunCounts, StatusReporter, TracingMonitor};

/// Crosswalk transformer - Convert harvested metadata records into canonical
/// records.
#[derive(Parser, Debug)]
#[command(name = "crosswalk-transformer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Source label of the input records (e.g. alma, aspace, zenodo)
    #[arg(short, long)]
    pub source: String,

    /// Input file of harvested records
    #[arg(short, long = "input-file")]
    pub input_file: PathBuf,

    /// Output file for transformed records (JSON Lines)
    #[arg(short, long = "output-file")]
    pub output_file: PathBuf,

    /// Run identifier (default: a new UUID)
    #[arg(short, long = "run-id")]
    pub run_id: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// Spinner that shows the record count while a run is going.
struct SpinnerReporter {
    pb: ProgressBar,
}

impl SpinnerReporter {
    fn new() -> Self {
        let pb = ProgressBar::new_spinner();
        #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .expect("valid template"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb.set_message("Transforming records...");
        Self { pb }
    }
}

impl StatusReporter for SpinnerReporter {
    fn progress(&mut self, counts: &RunCounts) {
        info!(processed = counts.processed, "Status update");
        self.pb
            .set_message(format!("{} records processed", counts.processed));
    }

    fn finished(&mut self, _: &RunCounts) {
        self.pb.finish_and_clear();
    }
}

/// Resolves with the name of the first shutdown signal received.
async fn shutdown_signal(mut sigterm: Signal) -> &'static str {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
    }
}

/// Set `stop` once `shutdown` resolves.
fn stop_on<F>(runtime: &Runtime, stop: Arc<AtomicBool>, shutdown: F) -> JoinHandle<()>
where
    F: Future<Output = &'static str> + Send + 'static,
{
    runtime.spawn(async move {
        let name = shutdown.await;
        info!(signal = name, "Shutdown requested, stopping after the current record");
        stop.store(true, Ordering::Relaxed);
    })
}

/// Watch SIGINT and SIGTERM on a background runtime; the runtime must stay
/// alive for the length of the run.
fn watch_shutdown_signals(stop: Arc<AtomicBool>) -> Result<Runtime> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;
    let sigterm = {
        let _guard = runtime.enter();
        signal(SignalKind::terminate()).map_err(|e| {
            TransformError::Configuration(format!("failed to register SIGTERM handler: {e}"))
        })?
    };
    stop_on(&runtime, stop, shutdown_signal(sigterm));
    Ok(runtime)
}

/// Log filter: `RUST_LOG` when set, otherwise `info` (`debug` when verbose),
/// with every warning-only logger capped at `warn`.
#[must_use]
pub fn env_filter(verbose: bool, config: &RuntimeConfig) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "info" };
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    for target in &config.warning_only_loggers {
        match format!("{target}=warn").parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("Ignoring warning-only logger '{target}': {e}"),
        }
    }
    filter
}

/// Run the CLI with parsed arguments.
///
/// # Errors
/// Returns an error for an unknown source, unreadable input, unwritable
/// output or a malformed input stream.
pub fn run(cli: &Cli, config: &RuntimeConfig) -> Result<RunCounts> {
    let source = SourceName::from_label(&cli.source)?;
    transform_command(source, cli, config)
}

fn run_info(input_file: &Path, run_id: Option<&str>) -> RunInfo {
    let run_data = RunData::from_filename(&input_file.to_string_lossy());
    RunInfo {
        run_id: run_id
            .map(String::from)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        run_date: run_data.run_date,
        run_type: run_data.run_type,
    }
}

/// Execute a transform run.
fn transform_command(source: SourceName, cli: &Cli, config: &RuntimeConfig) -> Result<RunCounts> {
    let run = run_info(&cli.input_file, cli.run_id.as_deref());
    info!(
        source = %source,
        run_id = %run.run_id,
        input_file = %cli.input_file.display(),
        "Running transform"
    );

    let monitor = TracingMonitor::from_config(config)
        .map(|m| Box::new(m) as Box<dyn ExceptionMonitor>);
    let mut runner = Runner::new(source, run)?
        .with_status_interval(config.status_update_interval)
        .with_reporter(Box::new(SpinnerReporter::new()))
        .with_monitor(monitor);

    let records = open_records(&cli.input_file, source.config().format)?;
    let mut sink = JsonLinesSink::create(&cli.output_file)?;
    let signals = watch_shutdown_signals(runner.stop_handle())?;
    let result = runner.run(records, &mut sink);
    signals.shutdown_background();
    let counts = result?;
    log_summary(source, &counts);

    println!(
        "{} {} records from {}",
        style("Processed").bold(),
        style(counts.processed).cyan(),
        style(source.config().name).green()
    );
    println!("  Transformed: {}", style(counts.transformed).green());
    println!("  Deleted: {}", counts.deleted);
    if counts.skipped > 0 {
        println!("  Skipped: {}", style(counts.skipped).yellow().bold());
    }
    println!(
        "{} {}",
        style("Saved to:").green().bold(),
        cli.output_file.display()
    );

    Ok(counts)
}
