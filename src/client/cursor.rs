//! Page cursor for a detector's finding-identifier stream
//!
//! The provider's pagination is an opaque continuation token: each listing
//! call returns a page of identifiers plus the token for the next call. The
//! cursor keeps that token as explicit state so the traversal is a plain,
//! testable value rather than hidden client state.

use crate::client::api::GuardApi;
use crate::client::models::FindingPage;
use crate::error::Result;

/// Single-forward-pass cursor over one detector's pages.
///
/// Each `next_page` call issues exactly one remote listing call carrying the
/// previous page's token. The sequence ends after the first page that
/// carries no continuation token; every page before that is yielded exactly
/// once, in provider order. A remote error aborts the traversal.
pub struct FindingPageCursor<'a> {
    api: &'a dyn GuardApi,
    region: &'a str,
    detector_id: &'a str,
    token: Option<String>,
    done: bool,
}

impl<'a> FindingPageCursor<'a> {
    pub fn new(api: &'a dyn GuardApi, region: &'a str, detector_id: &'a str) -> Self {
        Self {
            api,
            region,
            detector_id,
            token: None,
            done: false,
        }
    }

    /// Advance to the next page, or `Ok(None)` once the stream is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<FindingPage>> {
        if self.done {
            return Ok(None);
        }

        let page = self
            .api
            .list_finding_ids(self.region, self.detector_id, self.token.as_deref())
            .await?;

        match page.continuation() {
            Some(token) => self.token = Some(token.to_string()),
            None => self.done = true,
        }

        Ok(Some(page))
    }
}
