//! Export pipeline: drives regions, detectors, pages, and batch resolution
//! into a single ordered row stream.
//!
//! The baseline is strictly sequential, because each page requires the
//! previous page's continuation token and each batch call depends on the
//! page just fetched. Independent regions carry no data dependency, so the
//! caller may opt into a bounded worker pool across regions; page sequences
//! within a detector always stay sequential.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::stream::{self, StreamExt};
use log::debug;

use crate::client::{FindingPageCursor, GuardApi};
use crate::error::{Error, ExportError, Result};

pub mod progress;
pub mod sink;

pub use progress::{ConsoleProgress, NullProgress, ProgressObserver};
pub use sink::{CsvSink, ExportRow, RowSink, timestamped_path};

/// Cooperative cancellation flag shared between the export and its caller.
///
/// Checked before every remote call; once set, no further calls are issued.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(ExportError::Cancelled.into());
        }
        Ok(())
    }
}

/// Caller-supplied parameters for one export pass
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Regions to process, in order; duplicates are processed independently.
    pub regions: Vec<String>,

    /// Regions processed concurrently. 1 is the sequential baseline.
    pub parallelism: usize,

    /// Record failed regions in the summary instead of aborting the export.
    /// Sink errors and cancellation still abort.
    pub keep_going: bool,
}

impl ExportOptions {
    pub fn new(regions: Vec<String>) -> Self {
        Self {
            regions,
            parallelism: 1,
            keep_going: false,
        }
    }
}

/// A region that failed under `keep_going`
#[derive(Debug)]
pub struct RegionFailure {
    pub region: String,
    pub error: Error,
}

/// Result of a completed export pass
#[derive(Debug)]
pub struct ExportSummary {
    /// Identifier of the artifact the rows were written to
    pub sink_name: String,

    /// Rows committed to the sink (excluding the header)
    pub rows_written: u64,

    /// Per-region failures, non-empty only under `keep_going`
    pub region_failures: Vec<RegionFailure>,
}

/// An aborted export: the error plus the rows already committed.
///
/// The partial artifact remains addressable; the caller reports both.
#[derive(Debug)]
pub struct ExportFailure {
    pub error: Error,
    pub rows_written: u64,
}

/// Whether a region's failure may be isolated under `keep_going`.
///
/// Sink errors and cancellation always abort the whole export.
fn isolable(err: &Error) -> bool {
    !matches!(
        err,
        Error::Export(ExportError::SinkWrite { .. }) | Error::Export(ExportError::Cancelled)
    )
}

/// Orchestrates one bounded collection pass over the selected regions.
pub struct Exporter<'a> {
    api: &'a dyn GuardApi,
    progress: &'a dyn ProgressObserver,
    cancel: CancelFlag,
}

impl<'a> Exporter<'a> {
    pub fn new(api: &'a dyn GuardApi, progress: &'a dyn ProgressObserver) -> Self {
        Self {
            api,
            progress,
            cancel: CancelFlag::new(),
        }
    }

    /// Share a cancellation flag with the caller.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the export, appending rows to `sink` in discovery order.
    ///
    /// On failure the returned [`ExportFailure`] carries the number of rows
    /// already committed, which matches what the sink actually holds.
    pub async fn run<S: RowSink>(
        &self,
        sink: &mut S,
        options: &ExportOptions,
    ) -> std::result::Result<ExportSummary, ExportFailure> {
        // Rejected before any remote call.
        if options.regions.is_empty() {
            return Err(ExportFailure {
                error: ExportError::EmptySelection.into(),
                rows_written: 0,
            });
        }

        let sink_name = sink.name();
        let total = AtomicU64::new(0);

        if let Err(error) = sink.write_header() {
            return Err(ExportFailure {
                error,
                rows_written: 0,
            });
        }

        let sink = Mutex::new(sink);
        let mut region_failures = Vec::new();
        let mut first_error: Option<Error> = None;

        let parallelism = options.parallelism.max(1);
        let mut outcomes = stream::iter(options.regions.iter())
            .map(|region| {
                let sink = &sink;
                let total = &total;
                async move {
                    self.progress.region_started(region);
                    let result = self.export_region(region, sink, total).await;
                    (region.clone(), result)
                }
            })
            .buffer_unordered(parallelism);

        while let Some((region, result)) = outcomes.next().await {
            match result {
                Ok(region_rows) => {
                    self.progress
                        .region_finished(&region, region_rows, total.load(Ordering::SeqCst));
                }
                Err(error) if options.keep_going && isolable(&error) => {
                    debug!("{region}: failed, continuing: {error}");
                    region_failures.push(RegionFailure { region, error });
                }
                Err(error) => {
                    // First failure wins; the flag stops the other workers
                    // from issuing further remote calls, and their resulting
                    // Cancelled errors are drained silently.
                    self.cancel.cancel();
                    if first_error.is_none() {
                        first_error = Some(error);
                    }
                }
            }
        }
        drop(outcomes);

        let sink = sink.into_inner().unwrap_or_else(|e| e.into_inner());

        if let Some(error) = first_error {
            // Keep the rows already committed addressable.
            let _ = sink.flush();
            return Err(ExportFailure {
                error,
                rows_written: total.load(Ordering::SeqCst),
            });
        }

        if let Err(error) = sink.flush() {
            return Err(ExportFailure {
                error,
                rows_written: total.load(Ordering::SeqCst),
            });
        }

        Ok(ExportSummary {
            sink_name,
            rows_written: total.load(Ordering::SeqCst),
            region_failures,
        })
    }

    /// Process one region: enumerate detectors, drive each detector's page
    /// cursor to exhaustion, resolving every non-empty page immediately.
    async fn export_region<S: RowSink>(
        &self,
        region: &str,
        sink: &Mutex<&mut S>,
        total: &AtomicU64,
    ) -> Result<u64> {
        self.cancel.checkpoint()?;
        let detectors = self.api.list_detectors(region).await?;
        self.progress.detectors_listed(region, detectors.len());

        let mut region_rows = 0u64;
        for detector_id in &detectors {
            debug!("{region}: processing detector {detector_id}");
            let mut cursor = FindingPageCursor::new(self.api, region, detector_id);

            loop {
                self.cancel.checkpoint()?;
                let Some(page) = cursor.next_page().await? else {
                    break;
                };

                if page.finding_ids.is_empty() {
                    // No findings this page; more pages may still exist.
                    self.progress.page_processed(
                        region,
                        detector_id,
                        0,
                        total.load(Ordering::SeqCst),
                    );
                    continue;
                }

                self.cancel.checkpoint()?;
                let findings = self
                    .api
                    .get_findings(region, detector_id, &page.finding_ids)
                    .await?;

                // The provider may have resolved fewer identifiers than the
                // page listed; whatever came back becomes rows, nothing else.
                let rows = findings
                    .into_iter()
                    .map(|f| ExportRow::from_finding(region, f))
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                {
                    let mut sink = sink.lock().unwrap_or_else(|e| e.into_inner());
                    for row in &rows {
                        sink.append(row)?;
                    }
                }

                let n = rows.len() as u64;
                region_rows += n;
                let new_total = total.fetch_add(n, Ordering::SeqCst) + n;
                self.progress
                    .page_processed(region, detector_id, rows.len(), new_total);
            }
        }

        Ok(region_rows)
    }
}
