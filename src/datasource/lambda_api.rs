//! Lambda REST API implementation of the layer version listing

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::datasource::client::{
    LayerVersion, LayerVersionLister, ListLayerVersionsOutput, ListLayerVersionsRequest,
};
use crate::datasource::error::ListingError;

/// API version segment of the Lambda REST paths
const API_VERSION: &str = "2018-10-31";

/// Default endpoint for a region
pub fn default_endpoint(region: &str) -> String {
    format!("https://lambda.{}.amazonaws.com", region)
}

/// One page of `ListLayerVersions`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListLayerVersionsPage {
    layer_versions: Option<Vec<LayerVersion>>,
    next_marker: Option<String>,
}

/// Error body returned by the Lambda API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "Message")]
    message: Option<String>,
}

/// Lister talking to a Lambda-compatible REST endpoint
///
/// Requests are sent unsigned; point `endpoint` at a signing proxy or a local
/// emulator when talking to a real account.
#[derive(Clone)]
pub struct LambdaApiClient {
    client: reqwest::Client,
    endpoint: String,
    max_items: Option<u32>,
}

impl LambdaApiClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ListingError> {
        let client = reqwest::Client::builder()
            .user_agent("lambda-layer-releases")
            .timeout(timeout)
            .build()
            .map_err(|e| ListingError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            max_items: None,
        })
    }

    /// Limits the number of versions requested per page
    pub fn with_max_items(mut self, max_items: Option<u32>) -> Self {
        self.max_items = max_items;
        self
    }

    /// Encode layer name as a single URL path segment (ARNs contain `:`)
    ///
    /// Everything outside the unreserved set is percent-encoded, so a name can
    /// never reach into the query or another path segment.
    fn encode_layer_name(layer_name: &str) -> String {
        let mut encoded = String::with_capacity(layer_name.len());
        for byte in layer_name.bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    encoded.push(char::from(byte))
                }
                _ => encoded.push_str(&format!("%{:02X}", byte)),
            }
        }
        encoded
    }

    async fn fetch_page(
        &self,
        url: &str,
        request: &ListLayerVersionsRequest,
        marker: Option<&str>,
    ) -> Result<Option<ListLayerVersionsPage>, ListingError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(runtime) = &request.compatible_runtime {
            query.push(("CompatibleRuntime", runtime.clone()));
        }
        if let Some(architecture) = &request.compatible_architecture {
            query.push(("CompatibleArchitecture", architecture.clone()));
        }
        if let Some(max_items) = self.max_items {
            query.push(("MaxItems", max_items.to_string()));
        }
        if let Some(marker) = marker {
            query.push(("Marker", marker.to_string()));
        }

        let mut request_url =
            reqwest::Url::parse(url).map_err(|e| ListingError::Client(e.to_string()))?;
        if !query.is_empty() {
            request_url.query_pairs_mut().extend_pairs(&query);
        }

        let response = self
            .client
            .get(request_url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();

        // An unknown layer lists no versions. A page vanishing mid-listing is an error.
        if status == reqwest::StatusCode::NOT_FOUND && marker.is_none() {
            debug!("Layer {} not found, treating as empty", request.layer_name);
            return Ok(None);
        }

        if !status.is_success() {
            warn!("Lambda API returned status {}: {}", status, url);
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(body);
            return Err(ListingError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let page = response.json().await.map_err(|e| {
            warn!("Failed to parse Lambda API response: {}", e);
            ListingError::InvalidResponse(e.to_string())
        })?;

        Ok(Some(page))
    }
}

#[async_trait::async_trait]
impl LayerVersionLister for LambdaApiClient {
    async fn list_layer_versions(
        &self,
        request: &ListLayerVersionsRequest,
    ) -> Result<ListLayerVersionsOutput, ListingError> {
        let url = format!(
            "{}/{}/layers/{}/versions",
            self.endpoint,
            API_VERSION,
            Self::encode_layer_name(&request.layer_name)
        );

        let mut layer_versions: Option<Vec<LayerVersion>> = None;
        let mut marker: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let Some(page) = self.fetch_page(&url, request, marker.as_deref()).await? else {
                break;
            };
            pages += 1;

            if let Some(versions) = page.layer_versions {
                layer_versions.get_or_insert_with(Vec::new).extend(versions);
            }

            match page.next_marker {
                Some(next) if !next.is_empty() && marker.as_deref() != Some(next.as_str()) => {
                    marker = Some(next);
                }
                _ => break,
            }
        }

        debug!(
            "Listed {} versions of {} in {} pages",
            layer_versions.as_ref().map_or(0, Vec::len),
            request.layer_name,
            pages
        );

        Ok(ListLayerVersionsOutput { layer_versions })
    }
}
