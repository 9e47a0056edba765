//! Run counters, progress reporting and exception monitoring.

use tracing::{error, info};

use crate::config::RuntimeConfig;
use crate::error::RecordError;

/// Counters kept by the runner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    pub processed: usize,
    pub transformed: usize,
    pub skipped: usize,
    pub deleted: usize,
}

impl RunCounts {
    /// Every processed record was transformed, skipped or deleted.
    #[must_use]
    pub fn reconciles(&self) -> bool {
        self.processed == self.transformed + self.skipped + self.deleted
    }
}

/// Receives progress while a run is going.
pub trait StatusReporter {
    /// Called every status interval.
    fn progress(&mut self, counts: &RunCounts);

    /// Called once when the run ends, including stopped runs.
    fn finished(&mut self, counts: &RunCounts);
}

/// Reports progress as `info` log lines.
#[derive(Debug, Clone, Default)]
pub struct TracingReporter {
    source: String,
}

impl TracingReporter {
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl StatusReporter for TracingReporter {
    fn progress(&mut self, counts: &RunCounts) {
        info!(
            source = %self.source,
            processed = counts.processed,
            "Status update: {} records processed so far",
            counts.processed
        );
    }

    fn finished(&mut self, counts: &RunCounts) {
        info!(
            source = %self.source,
            processed = counts.processed,
            transformed = counts.transformed,
            skipped = counts.skipped,
            deleted = counts.deleted,
            "Completed transform, total records processed: {}, transformed records: {}, \
             skipped records: {}, deleted records: {}",
            counts.processed,
            counts.transformed,
            counts.skipped,
            counts.deleted
        );
    }
}

/// Receives rejected records for external reporting.
pub trait ExceptionMonitor {
    fn capture(&self, record_id: Option<&str>, error: &RecordError);
}

/// Forwards rejections to the `exceptions` log target, tagged with the
/// reporting endpoint and workspace.
#[derive(Debug, Clone)]
pub struct TracingMonitor {
    dsn: String,
    workspace: String,
}

impl TracingMonitor {
    /// A monitor, when a reporting endpoint is configured.
    #[must_use]
    pub fn from_config(config: &RuntimeConfig) -> Option<Self> {
        let dsn = config.sentry_dsn.clone()?;
        info!(
            workspace = config.workspace.as_deref().unwrap_or("unset"),
            "Exception monitoring enabled"
        );
        Some(Self {
            dsn,
            workspace: config.workspace.clone().unwrap_or_default(),
        })
    }
}

impl ExceptionMonitor for TracingMonitor {
    fn capture(&self, record_id: Option<&str>, err: &RecordError) {
        error!(
            target: "exceptions",
            dsn = %self.dsn,
            workspace = %self.workspace,
            record_id = record_id.unwrap_or("unknown"),
            error = %err,
            "Record rejected"
        );
    }
}
