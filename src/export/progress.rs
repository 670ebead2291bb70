//! Progress reporting for long-running exports
//!
//! The aggregator emits observations through [`ProgressObserver`]; transport
//! (spinner, log lines, test recorder) is up to the implementation.

use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

/// Observations emitted while an export runs.
///
/// Total row counts are monotonically non-decreasing across calls, also
/// under the parallel-region variant.
pub trait ProgressObserver: Send + Sync {
    /// A region's processing has begun.
    fn region_started(&self, region: &str);

    /// Detector enumeration for a region finished.
    fn detectors_listed(&self, region: &str, count: usize);

    /// One page was consumed (resolved and flattened).
    fn page_processed(&self, region: &str, detector_id: &str, page_rows: usize, total_rows: u64);

    /// A region's processing finished.
    fn region_finished(&self, region: &str, region_rows: u64, total_rows: u64);
}

/// No-op observer for callers that don't track progress
pub struct NullProgress;

impl ProgressObserver for NullProgress {
    fn region_started(&self, _region: &str) {}
    fn detectors_listed(&self, _region: &str, _count: usize) {}
    fn page_processed(&self, _region: &str, _detector_id: &str, _page_rows: usize, _total: u64) {}
    fn region_finished(&self, _region: &str, _region_rows: u64, _total: u64) {}
}

/// Spinner-based observer for interactive terminals
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { bar }
    }

    /// Stop the spinner, leaving a final message.
    pub fn finish(&self, msg: impl Into<String>) {
        self.bar.finish_with_message(msg.into());
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for ConsoleProgress {
    fn region_started(&self, region: &str) {
        self.bar.set_message(format!("{region}: listing detectors..."));
    }

    fn detectors_listed(&self, region: &str, count: usize) {
        debug!("{region}: {count} detector(s)");
        self.bar
            .set_message(format!("{region}: {count} detector(s) found"));
    }

    fn page_processed(&self, region: &str, detector_id: &str, page_rows: usize, total_rows: u64) {
        debug!("{region}/{detector_id}: page with {page_rows} finding(s), {total_rows} total");
        self.bar.set_message(format!(
            "{region}: {total_rows} finding(s) exported so far"
        ));
    }

    fn region_finished(&self, region: &str, region_rows: u64, total_rows: u64) {
        self.bar
            .println(format!("  {region}: {region_rows} finding(s)"));
        self.bar
            .set_message(format!("{total_rows} finding(s) exported so far"));
    }
}

#[cfg(test)]
pub mod testing {
    use super::ProgressObserver;
    use std::sync::Mutex;

    /// Records observations for assertions in aggregator tests.
    #[derive(Default)]
    pub struct RecordingProgress {
        pub events: Mutex<Vec<String>>,
        pub totals: Mutex<Vec<u64>>,
    }

    impl RecordingProgress {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }

        pub fn totals(&self) -> Vec<u64> {
            self.totals.lock().unwrap().clone()
        }
    }

    impl ProgressObserver for RecordingProgress {
        fn region_started(&self, region: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start:{region}"));
        }

        fn detectors_listed(&self, region: &str, count: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("detectors:{region}:{count}"));
        }

        fn page_processed(
            &self,
            region: &str,
            detector_id: &str,
            page_rows: usize,
            total_rows: u64,
        ) {
            self.events
                .lock()
                .unwrap()
                .push(format!("page:{region}:{detector_id}:{page_rows}"));
            self.totals.lock().unwrap().push(total_rows);
        }

        fn region_finished(&self, region: &str, region_rows: u64, total_rows: u64) {
            self.events
                .lock()
                .unwrap()
                .push(format!("finish:{region}:{region_rows}"));
            self.totals.lock().unwrap().push(total_rows);
        }
    }
}
