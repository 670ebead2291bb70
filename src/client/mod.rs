//! Threat-detection service client

pub mod api;
pub mod cursor;
pub mod http;
#[cfg(test)]
pub mod mock;
pub mod models;

pub use api::{GuardApi, matching_regions};
pub use cursor::FindingPageCursor;
pub use http::GuardClient;
#[cfg(test)]
#[allow(unused_imports)]
pub use mock::MockGuardClient;
#[allow(unused_imports)]
pub use models::{Finding, FindingPage, Region};
