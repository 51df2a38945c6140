//! Release types consumed by the update engine

use serde::{Deserialize, Serialize};

use crate::datasource::client::LayerVersion;

/// A single installable release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_digest: Option<String>,
    pub is_deprecated: bool,
}

impl From<&LayerVersion> for Release {
    fn from(layer: &LayerVersion) -> Self {
        Self {
            version: layer.version.unwrap_or(0).to_string(),
            release_timestamp: layer.created_date.clone(),
            new_digest: layer.layer_version_arn.clone(),
            // Lambda exposes no deprecation state for layer versions
            is_deprecated: false,
        }
    }
}

/// Releases of one package, oldest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseResult {
    pub releases: Vec<Release>,
}

/// Maps ordered layer versions to releases, preserving order
///
/// Returns `None` when there is nothing to release.
pub fn to_releases(versions: &[LayerVersion]) -> Option<ReleaseResult> {
    if versions.is_empty() {
        return None;
    }

    Some(ReleaseResult {
        releases: versions.iter().map(Release::from).collect(),
    })
}
