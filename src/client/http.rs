//! HTTPS client for the threat-detection service

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::client::api::GuardApi;
use crate::client::models::{
    DetectorsResponse, Finding, FindingPage, FindingsResponse, Region, RegionsResponse,
};
use crate::error::{ApiError, Result};

/// Maximum identifiers per listing page, the provider's cap
pub const MAX_PAGE_SIZE: usize = 50;

/// Per-request deadline; expiry surfaces as a network error
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Rate limit: 8 requests per second, under the service's throttling ceiling
const RATE_LIMIT_PER_SECOND: u32 = 8;

/// Threat-detection API client.
///
/// The service is deployed per region; `host_template` carries a `{region}`
/// placeholder that is substituted per call. Region listing is served from
/// the home region's endpoint.
pub struct GuardClient {
    http: HttpClient,
    host_template: String,
    home_region: String,
    token: String,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl GuardClient {
    /// Create a new client from an immutable configuration snapshot.
    pub fn new(
        host_template: impl Into<String>,
        home_region: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota = Quota::per_second(std::num::NonZeroU32::new(RATE_LIMIT_PER_SECOND).unwrap());
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            http,
            host_template: host_template.into(),
            home_region: home_region.into(),
            token: token.into(),
            rate_limiter,
        })
    }

    /// Base URL of the service endpoint in one region.
    fn endpoint(&self, region: &str) -> String {
        self.host_template.replace("{region}", region)
    }

    /// Issue a GET request and decode the JSON response.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        self.rate_limiter.until_ready().await;
        debug!("GET {url}");

        let response = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(ApiError::from)?;

        Self::decode(response).await
    }

    /// Issue a POST request with a JSON body and decode the JSON response.
    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        self.rate_limiter.until_ready().await;
        debug!("POST {url}");

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(ApiError::from)?;

        Self::decode(response).await
    }

    /// Map the response status to a result, decoding the body on success.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        match status {
            StatusCode::OK => {
                let data = response.json::<T>().await.map_err(|e| {
                    ApiError::InvalidResponse(format!("Failed to parse response: {e}"))
                })?;
                Ok(data)
            }
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized.into()),
            StatusCode::FORBIDDEN => Err(ApiError::Forbidden.into()),
            StatusCode::NOT_FOUND => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Resource not found".to_string());
                Err(ApiError::NotFound(error_msg).into())
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                Err(ApiError::Throttled(Duration::from_secs(retry_after)).into())
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Bad request".to_string());
                Err(ApiError::BadRequest(error_msg).into())
            }
            status if status.is_server_error() => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("Server error: {status}"));
                Err(ApiError::ServerError(error_msg).into())
            }
            _ => {
                let error_msg = format!("Unexpected status code: {status}");
                Err(ApiError::InvalidResponse(error_msg).into())
            }
        }
    }
}

#[async_trait]
impl GuardApi for GuardClient {
    async fn list_regions(&self) -> Result<Vec<Region>> {
        let url = format!("{}/regions", self.endpoint(&self.home_region));
        let resp: RegionsResponse = self.get_json(&url, &[]).await?;
        Ok(resp.regions)
    }

    async fn list_detectors(&self, region: &str) -> Result<Vec<String>> {
        let url = format!("{}/detector", self.endpoint(region));
        let resp: DetectorsResponse = self.get_json(&url, &[]).await?;
        Ok(resp.detector_ids)
    }

    async fn list_finding_ids(
        &self,
        region: &str,
        detector_id: &str,
        token: Option<&str>,
    ) -> Result<FindingPage> {
        let url = format!("{}/detector/{detector_id}/findings", self.endpoint(region));
        let max_results = MAX_PAGE_SIZE.to_string();

        let mut query = vec![("maxResults", max_results.as_str())];
        if let Some(token) = token {
            query.push(("nextToken", token));
        }

        self.get_json(&url, &query).await
    }

    async fn get_findings(
        &self,
        region: &str,
        detector_id: &str,
        ids: &[String],
    ) -> Result<Vec<Finding>> {
        // Empty pages never reach the wire.
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct BatchGetRequest<'a> {
            finding_ids: &'a [String],
        }

        let url = format!(
            "{}/detector/{detector_id}/findings/get",
            self.endpoint(region)
        );
        let resp: FindingsResponse = self
            .post_json(&url, &BatchGetRequest { finding_ids: ids })
            .await?;
        Ok(resp.findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> GuardClient {
        // No {region} placeholder: every region resolves to the test server.
        GuardClient::new(server.url(), "us-east-1", "test-token").unwrap()
    }

    #[test]
    fn test_endpoint_substitutes_region() {
        let client = GuardClient::new(
            "https://guard.{region}.example.com/api/v1",
            "us-east-1",
            "tok",
        )
        .unwrap();

        assert_eq!(
            client.endpoint("us-west-2"),
            "https://guard.us-west-2.example.com/api/v1"
        );
    }

    #[tokio::test]
    async fn test_get_findings_empty_ids_skips_network() {
        // Unroutable host: a remote call would fail, the short-circuit must not.
        let client = GuardClient::new("http://127.0.0.1:1/api", "us-east-1", "tok").unwrap();

        let findings = client.get_findings("us-east-1", "det-1", &[]).await.unwrap();
        assert!(findings.is_empty());
    }

    #[tokio::test]
    async fn test_list_regions_hits_home_region_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/regions")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_body(r#"{"regions":[{"regionName":"us-east-1"},{"regionName":"us-west-2"}]}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let regions = client.list_regions().await.unwrap();

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].name, "us-east-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_detectors_maps_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/detector")
            .with_status(401)
            .create_async()
            .await;

        let client = client_for(&server);
        match client.list_detectors("us-east-1").await {
            Err(Error::Api(ApiError::Unauthorized)) => (),
            other => panic!("Expected Unauthorized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_finding_ids_carries_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/detector/det-1/findings")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("maxResults".into(), MAX_PAGE_SIZE.to_string()),
                Matcher::UrlEncoded("nextToken".into(), "t-1".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"findingIds":["a"],"nextToken":""}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let page = client
            .list_finding_ids("us-east-1", "det-1", Some("t-1"))
            .await
            .unwrap();

        assert_eq!(page.finding_ids, vec!["a"]);
        assert!(page.is_final());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_findings_posts_batch() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/detector/det-1/findings/get")
            .match_body(Matcher::JsonString(
                r#"{"findingIds":["a","b"]}"#.to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"findings":[{"id":"a","title":"T","severity":5.0}]}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let ids = vec!["a".to_string(), "b".to_string()];
        let findings = client.get_findings("us-east-1", "det-1", &ids).await.unwrap();

        // Provider resolved only one of two identifiers; taken as-is.
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].id.as_deref(), Some("a"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_maps_to_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/detector")
            .with_status(500)
            .with_body("internal")
            .create_async()
            .await;

        let client = client_for(&server);
        match client.list_detectors("us-east-1").await {
            Err(Error::Api(ApiError::ServerError(msg))) => assert!(msg.contains("internal")),
            other => panic!("Expected ServerError, got {other:?}"),
        }
    }
}
