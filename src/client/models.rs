//! Wire models for the threat-detection service API

use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// A deployment zone of the cloud provider.
///
/// Fetched fresh per export request; never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    /// Region name, e.g. `us-east-1`
    #[serde(rename = "regionName")]
    pub name: String,
}

/// Response body of the region-listing endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RegionsResponse {
    pub regions: Vec<Region>,
}

/// Response body of the detector-listing endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectorsResponse {
    #[serde(default)]
    pub detector_ids: Vec<String>,
}

/// One page of finding identifiers plus the continuation token for the next.
///
/// No identifiers and no token means end-of-stream for the detector. No
/// identifiers with a token is a valid intermediate page and must not stop
/// traversal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingPage {
    #[serde(default)]
    pub finding_ids: Vec<String>,

    #[serde(default)]
    pub next_token: Option<String>,
}

impl FindingPage {
    /// Continuation token for the next page, with empty strings normalized
    /// away (the provider emits `""` on the last page of some endpoints).
    pub fn continuation(&self) -> Option<&str> {
        match self.next_token.as_deref() {
            Some("") | None => None,
            Some(token) => Some(token),
        }
    }

    /// Whether this is the last page of the detector's sequence.
    pub fn is_final(&self) -> bool {
        self.continuation().is_none()
    }
}

/// A finding record as returned by the batch-resolve endpoint.
///
/// Every field the export needs is optional on the wire; absence is caught
/// when flattening to a row, not at deserialization time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub severity: Option<f64>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Finding {
    /// Error for a missing required field, naming the finding when possible.
    pub(crate) fn missing(&self, field: &'static str) -> ExportError {
        ExportError::IncompleteRecord {
            id: self.id.clone().unwrap_or_else(|| "<unknown>".to_string()),
            field,
        }
    }
}

/// Response body of the batch-resolve endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct FindingsResponse {
    #[serde(default)]
    pub findings: Vec<Finding>,
}
