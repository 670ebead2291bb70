//! API trait for the threat-detection service
//!
//! One method per remote endpoint. Implementations: [`GuardClient`] over
//! HTTPS, and `MockGuardClient` for tests.
//!
//! [`GuardClient`]: crate::client::GuardClient

use async_trait::async_trait;

use crate::client::models::{Finding, FindingPage, Region};
use crate::error::Result;

/// Remote operations used by the export pipeline
#[async_trait]
pub trait GuardApi: Send + Sync {
    /// List all regions known to the provider, in provider order.
    ///
    /// Served by the home-region endpoint; region lists are small and
    /// unpaginated.
    async fn list_regions(&self) -> Result<Vec<Region>>;

    /// List the detector identifiers active in one region.
    ///
    /// An empty list is a valid answer, not an error.
    async fn list_detectors(&self, region: &str) -> Result<Vec<String>>;

    /// Fetch one page of finding identifiers for a detector.
    ///
    /// `token` is the continuation token from the previous page, or `None`
    /// for the first call.
    async fn list_finding_ids(
        &self,
        region: &str,
        detector_id: &str,
        token: Option<&str>,
    ) -> Result<FindingPage>;

    /// Batch-resolve finding identifiers into full records.
    ///
    /// Must short-circuit to an empty vec without a remote call when `ids`
    /// is empty. The provider may omit identifiers it cannot resolve, so
    /// callers use the returned set as-is.
    async fn get_findings(
        &self,
        region: &str,
        detector_id: &str,
        ids: &[String],
    ) -> Result<Vec<Finding>>;
}

/// List regions whose name starts with `prefix`, preserving provider order.
///
/// One remote call; the prefix filter is applied client-side. An empty
/// prefix matches every region.
pub async fn matching_regions(api: &dyn GuardApi, prefix: &str) -> Result<Vec<Region>> {
    let regions = api.list_regions().await?;
    Ok(regions
        .into_iter()
        .filter(|r| r.name.starts_with(prefix))
        .collect())
}
