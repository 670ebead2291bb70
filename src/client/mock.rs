//! Mock threat-detection client for testing
//!
//! Scriptable implementation of [`GuardApi`] for unit tests, without real
//! network calls. Pages, detectors, and findings are configured up front via
//! builder methods; calls and continuation tokens are captured for
//! assertions.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::api::GuardApi;
use crate::client::models::{Finding, FindingPage, Region};
use crate::error::{ApiError, Result};

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub list_regions: usize,
    pub list_detectors: usize,
    pub list_finding_ids: usize,
    pub get_findings: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.list_regions + self.list_detectors + self.list_finding_ids + self.get_findings
    }
}

/// Mock API client for testing.
///
/// # Example
/// ```ignore
/// let mock = MockGuardClient::new()
///     .with_regions(&["us-east-1"])
///     .with_detectors("us-east-1", &["det-1"]);
/// ```
#[derive(Default)]
pub struct MockGuardClient {
    /// Regions to return from list_regions
    regions: Mutex<Vec<Region>>,
    /// Detector ids per region
    detectors: Mutex<HashMap<String, Vec<String>>>,
    /// Scripted page sequence per detector, consumed in order
    pages: Mutex<HashMap<String, Vec<FindingPage>>>,
    /// Next page index per detector
    page_cursor: Mutex<HashMap<String, usize>>,
    /// Resolvable findings, keyed by finding id
    findings: Mutex<HashMap<String, Finding>>,
    /// One-shot error returned by the next call of any kind
    error: Mutex<Option<ApiError>>,
    /// Regions whose detector listing fails
    failing_regions: Mutex<HashMap<String, ApiError>>,
    /// Call counts for verification
    call_count: Mutex<CallCounts>,
    /// Continuation tokens passed to list_finding_ids, in call order
    captured_tokens: Mutex<Vec<Option<String>>>,
    /// Identifier batches passed to get_findings, in call order
    captured_batches: Mutex<Vec<Vec<String>>>,
}

impl MockGuardClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure regions to return from list_regions.
    pub fn with_regions(self, names: &[&str]) -> Self {
        *self.regions.lock().unwrap() = names
            .iter()
            .map(|n| Region {
                name: n.to_string(),
            })
            .collect();
        self
    }

    /// Configure detector ids for a region.
    pub fn with_detectors(self, region: &str, ids: &[&str]) -> Self {
        self.detectors.lock().unwrap().insert(
            region.to_string(),
            ids.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    /// Configure the scripted page sequence for a detector.
    pub fn with_pages(self, detector_id: &str, pages: Vec<FindingPage>) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(detector_id.to_string(), pages);
        self
    }

    /// Configure a resolvable finding record.
    pub fn with_finding(self, finding: Finding) -> Self {
        let id = finding.id.clone().expect("mock finding needs an id");
        self.findings.lock().unwrap().insert(id, finding);
        self
    }

    /// Configure an error to return on the next API call.
    /// The error is consumed after one use.
    pub fn with_error(self, error: ApiError) -> Self {
        *self.error.lock().unwrap() = Some(error);
        self
    }

    /// Make detector listing fail for one region. Consumed on first use.
    pub fn with_failing_region(self, region: &str, error: ApiError) -> Self {
        self.failing_regions
            .lock()
            .unwrap()
            .insert(region.to_string(), error);
        self
    }

    /// Get the call counts for verification in tests.
    pub fn call_counts(&self) -> CallCounts {
        self.call_count.lock().unwrap().clone()
    }

    /// Continuation tokens seen by list_finding_ids, in call order.
    pub fn captured_tokens(&self) -> Vec<Option<String>> {
        self.captured_tokens.lock().unwrap().clone()
    }

    /// Identifier batches seen by get_findings, in call order.
    pub fn captured_batches(&self) -> Vec<Vec<String>> {
        self.captured_batches.lock().unwrap().clone()
    }

    /// Check for a pending one-shot error and consume it.
    fn check_error(&self) -> Result<()> {
        if let Some(e) = self.error.lock().unwrap().take() {
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl GuardApi for MockGuardClient {
    async fn list_regions(&self) -> Result<Vec<Region>> {
        self.check_error()?;
        self.call_count.lock().unwrap().list_regions += 1;

        Ok(self.regions.lock().unwrap().clone())
    }

    async fn list_detectors(&self, region: &str) -> Result<Vec<String>> {
        self.check_error()?;
        if let Some(err) = self.failing_regions.lock().unwrap().remove(region) {
            return Err(err.into());
        }
        self.call_count.lock().unwrap().list_detectors += 1;

        Ok(self
            .detectors
            .lock()
            .unwrap()
            .get(region)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_finding_ids(
        &self,
        _region: &str,
        detector_id: &str,
        token: Option<&str>,
    ) -> Result<FindingPage> {
        self.check_error()?;
        self.call_count.lock().unwrap().list_finding_ids += 1;
        self.captured_tokens
            .lock()
            .unwrap()
            .push(token.map(|t| t.to_string()));

        let mut cursors = self.page_cursor.lock().unwrap();
        let idx = cursors.entry(detector_id.to_string()).or_insert(0);
        // A token-less call starts a fresh traversal of the scripted pages.
        if token.is_none() {
            *idx = 0;
        }

        let pages = self.pages.lock().unwrap();
        let page = pages
            .get(detector_id)
            .and_then(|seq| seq.get(*idx))
            .cloned()
            // Past the scripted sequence: a final empty page.
            .unwrap_or_default();
        *idx += 1;

        Ok(page)
    }

    async fn get_findings(
        &self,
        _region: &str,
        _detector_id: &str,
        ids: &[String],
    ) -> Result<Vec<Finding>> {
        self.check_error()?;
        self.call_count.lock().unwrap().get_findings += 1;
        self.captured_batches.lock().unwrap().push(ids.to_vec());

        let findings = self.findings.lock().unwrap();
        // Identifiers the mock has no record for are silently omitted,
        // matching the provider's batch-get contract.
        Ok(ids.iter().filter_map(|id| findings.get(id).cloned()).collect())
    }
}
