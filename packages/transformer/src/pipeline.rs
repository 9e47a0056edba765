//! The pipeline runner.
//!
//! Records are pulled one at a time from a reader, assembled and written to
//! the sink in input order. Rejected records are logged and counted; they
//! never stop the run. A stop flag is checked between records, and the sink
//! is flushed after every entry so a stopped run leaves a valid prefix.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::assembler::{Assembled, Assembler, Rejection};
use crate::config::{SourceName, DEFAULT_STATUS_UPDATE_INTERVAL};
use crate::error::Result;
use crate::output::{OutputEntry, Provenance, RecordSink};
use crate::reader::RawRecord;
use crate::status::{ExceptionMonitor, RunCounts, StatusReporter, TracingReporter};

/// Identity of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInfo {
    pub run_id: String,
    pub run_date: NaiveDate,
    pub run_type: Option<String>,
}

/// Drives one source's records from reader to sink.
pub struct Runner {
    assembler: Assembler,
    run: RunInfo,
    status_interval: usize,
    stop: Arc<AtomicBool>,
    reporter: Box<dyn StatusReporter>,
    monitor: Option<Box<dyn ExceptionMonitor>>,
}

impl Runner {
    /// Create a runner for a source.
    ///
    /// # Errors
    /// Returns `TransformError::Configuration` if the source's handler
    /// registry is incomplete.
    pub fn new(source: SourceName, run: RunInfo) -> Result<Self> {
        Ok(Self {
            assembler: Assembler::new(source)?,
            run,
            status_interval: DEFAULT_STATUS_UPDATE_INTERVAL,
            stop: Arc::new(AtomicBool::new(false)),
            reporter: Box::new(TracingReporter::new(source.config().label)),
            monitor: None,
        })
    }

    #[must_use]
    pub fn with_status_interval(mut self, interval: usize) -> Self {
        self.status_interval = interval.max(1);
        self
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: Box<dyn StatusReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    #[must_use]
    pub fn with_monitor(mut self, monitor: Option<Box<dyn ExceptionMonitor>>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Flag that stops the run before the next record when set.
    #[must_use]
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    fn provenance(&self, offset: usize) -> Provenance {
        Provenance {
            source: self.assembler.source().label.to_string(),
            run_id: self.run.run_id.clone(),
            run_date: self.run.run_date.format("%Y-%m-%d").to_string(),
            run_type: self.run.run_type.clone(),
            run_record_offset: offset,
        }
    }

    /// Consume every record and write the results.
    ///
    /// # Errors
    /// Returns an error when the reader fails (e.g. the XML stream is
    /// malformed) or the sink cannot be written. Entries written before the
    /// failure are flushed.
    pub fn run<I, S>(&mut self, records: I, sink: &mut S) -> Result<RunCounts>
    where
        I: IntoIterator<Item = Result<RawRecord>>,
        S: RecordSink + ?Sized,
    {
        let mut counts = RunCounts::default();
        let result = self.consume(records, sink, &mut counts);
        let flushed = sink.flush();
        self.reporter.finished(&counts);
        result?;
        flushed?;
        Ok(counts)
    }

    fn consume<I, S>(&mut self, records: I, sink: &mut S, counts: &mut RunCounts) -> Result<()>
    where
        I: IntoIterator<Item = Result<RawRecord>>,
        S: RecordSink + ?Sized,
    {
        for raw in records {
            if self.stop.load(Ordering::Relaxed) {
                warn!(
                    processed = counts.processed,
                    "Stop requested, ending run early"
                );
                break;
            }
            let raw = raw?;
            counts.processed += 1;

            match self.assembler.assemble(&raw.payload) {
                Ok(Assembled::Record(record)) => {
                    counts.transformed += 1;
                    sink.write_entry(&OutputEntry::index(record, self.provenance(raw.offset)))?;
                    sink.flush()?;
                }
                Ok(Assembled::Deleted(timdex_record_id)) => {
                    counts.deleted += 1;
                    sink.write_entry(&OutputEntry::delete(
                        timdex_record_id,
                        self.provenance(raw.offset),
                    ))?;
                    sink.flush()?;
                }
                Err(rejection) => {
                    counts.skipped += 1;
                    self.report_rejection(&rejection, raw.offset);
                }
            }

            if counts.processed % self.status_interval == 0 {
                self.reporter.progress(counts);
            }
        }
        Ok(())
    }

    fn report_rejection(&self, rejection: &Rejection, offset: usize) {
        match &rejection.source_record_id {
            Some(record_id) => error!(
                record_id = %record_id,
                error = %rejection.error,
                "Record skipped"
            ),
            None => error!(
                run_record_offset = offset,
                error = %rejection.error,
                "Record skipped"
            ),
        }
        if let Some(monitor) = &self.monitor {
            monitor.capture(rejection.source_record_id.as_deref(), &rejection.error);
        }
    }
}

/// Log the final summary of a run.
pub fn log_summary(source: SourceName, counts: &RunCounts) {
    if counts.reconciles() {
        info!(source = %source, "Run counts reconcile");
    } else {
        error!(source = %source, ?counts, "Run counts do not reconcile");
    }
}
