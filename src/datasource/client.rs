//! Remote listing client abstraction for Lambda layer versions

use std::sync::Arc;

#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::info;

use crate::datasource::error::ListingError;
use crate::datasource::filter::LayerFilter;

/// One published version of a layer, as returned by the listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LayerVersion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer_version_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatible_runtimes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatible_architectures: Option<Vec<String>>,
}

/// Input of a single list call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListLayerVersionsRequest {
    pub layer_name: String,
    pub compatible_runtime: Option<String>,
    pub compatible_architecture: Option<String>,
}

impl From<&LayerFilter> for ListLayerVersionsRequest {
    fn from(filter: &LayerFilter) -> Self {
        Self {
            layer_name: filter.arn.clone(),
            compatible_runtime: filter.runtime.clone(),
            compatible_architecture: filter.architecture.clone(),
        }
    }
}

/// Fully materialized listing
///
/// `layer_versions` mirrors the API: it may be missing altogether.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListLayerVersionsOutput {
    pub layer_versions: Option<Vec<LayerVersion>>,
}

/// Trait for listing the versions of a layer
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait LayerVersionLister: Send + Sync {
    /// Lists every version matching the request
    ///
    /// Implementations that talk to a paginated API must follow all pages
    /// before returning. The order of the returned versions is unspecified.
    async fn list_layer_versions(
        &self,
        request: &ListLayerVersionsRequest,
    ) -> Result<ListLayerVersionsOutput, ListingError>;
}

type ListerFactory = Box<dyn Fn() -> Result<Arc<dyn LayerVersionLister>, ListingError> + Send + Sync>;

/// Lister handle constructed on first use
///
/// Concurrent first calls share a single construction. A failed construction
/// is reported to the caller and attempted again on the next call.
pub struct LazyLister {
    factory: ListerFactory,
    cell: OnceCell<Arc<dyn LayerVersionLister>>,
}

impl LazyLister {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn LayerVersionLister>, ListingError> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            cell: OnceCell::new(),
        }
    }

    /// Wraps an already constructed lister
    pub fn ready(lister: Arc<dyn LayerVersionLister>) -> Self {
        let cloned = lister.clone();
        Self {
            factory: Box::new(move || Ok(cloned.clone())),
            cell: OnceCell::from(lister),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn get(&self) -> Result<&Arc<dyn LayerVersionLister>, ListingError> {
        self.cell
            .get_or_try_init(|| async {
                info!("Constructing Lambda layer lister");
                (self.factory)()
            })
            .await
    }
}
