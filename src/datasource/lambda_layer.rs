//! AWS Lambda layer datasource
//!
//! Package names are serialized [`LayerFilter`]s. Releases are the layer's
//! versions in ascending version-number order.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cache::{CacheStore, cache_key, with_cache};
use crate::config::Config;
use crate::datasource::client::{
    LayerVersion, LayerVersionLister, LazyLister, ListLayerVersionsRequest,
};
use crate::datasource::error::{DatasourceError, ListingError};
use crate::datasource::filter::LayerFilter;
use crate::datasource::lambda_api::LambdaApiClient;
use crate::datasource::release::{ReleaseResult, to_releases};
use crate::datasource::traits::Datasource;

pub const DATASOURCE_ID: &str = "aws-lambda-layer";

/// Cache namespace shared by both memoized operations
pub const CACHE_NAMESPACE: &str = "datasource-aws-lambda-layer";

const SORTED_VERSIONS_OPERATION: &str = "getSortedLambdaLayerVersions";
const RELEASES_OPERATION: &str = "getReleases";

pub struct AwsLambdaLayerDatasource<S: CacheStore> {
    store: Arc<S>,
    cache_ttl: Duration,
    lambda: LazyLister,
}

impl<S: CacheStore> AwsLambdaLayerDatasource<S> {
    /// Creates a datasource whose lister is built by `factory` on first use
    pub fn new<F>(store: Arc<S>, cache_ttl: Duration, factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn LayerVersionLister>, ListingError> + Send + Sync + 'static,
    {
        Self {
            store,
            cache_ttl,
            lambda: LazyLister::new(factory),
        }
    }

    /// Creates a datasource around an existing lister
    pub fn with_lister(
        store: Arc<S>,
        cache_ttl: Duration,
        lister: Arc<dyn LayerVersionLister>,
    ) -> Self {
        Self {
            store,
            cache_ttl,
            lambda: LazyLister::ready(lister),
        }
    }

    /// Creates a datasource talking to the Lambda API described by `config`
    pub fn from_config(store: Arc<S>, config: &Config) -> Self {
        let lambda = config.lambda.clone();
        Self::new(store, config.cache.ttl(), move || {
            let client = LambdaApiClient::new(&lambda.endpoint_url(), lambda.timeout())?
                .with_max_items(lambda.max_items);
            Ok(Arc::new(client) as Arc<dyn LayerVersionLister>)
        })
    }

    /// Whether the lister has been constructed yet
    pub fn is_client_initialized(&self) -> bool {
        self.lambda.is_initialized()
    }

    /// Lists the versions matching `filter`, ordered by ascending version number
    ///
    /// Versions without a number sort as `0`. Versions with equal numbers keep
    /// the order the API returned them in. A missing listing yields an empty
    /// list.
    ///
    /// Results are cached under the canonical [`LayerFilter::encode`] form, so
    /// differently spelled package names for the same filter share one listing.
    /// `get_releases` instead keys its entries on the raw package name.
    pub async fn list_sorted_versions(
        &self,
        filter: &LayerFilter,
    ) -> Result<Vec<LayerVersion>, DatasourceError> {
        let key = cache_key(SORTED_VERSIONS_OPERATION, &filter.encode());
        with_cache(
            self.store.as_ref(),
            CACHE_NAMESPACE,
            &key,
            self.cache_ttl,
            || self.fetch_sorted_versions(filter),
        )
        .await
    }

    async fn fetch_sorted_versions(
        &self,
        filter: &LayerFilter,
    ) -> Result<Vec<LayerVersion>, DatasourceError> {
        let lister = self.lambda.get().await?;
        let output = lister
            .list_layer_versions(&ListLayerVersionsRequest::from(filter))
            .await?;

        let mut versions = output.layer_versions.unwrap_or_default();

        // The API does not specify the order of the versions
        versions.sort_by_key(|layer| layer.version.unwrap_or(0));

        Ok(versions)
    }
}

#[async_trait::async_trait]
impl<S: CacheStore> Datasource for AwsLambdaLayerDatasource<S> {
    fn id(&self) -> &'static str {
        DATASOURCE_ID
    }

    async fn get_releases(
        &self,
        package_name: &str,
    ) -> Result<Option<ReleaseResult>, DatasourceError> {
        let key = cache_key(RELEASES_OPERATION, package_name);
        with_cache(
            self.store.as_ref(),
            CACHE_NAMESPACE,
            &key,
            self.cache_ttl,
            || async {
                let filter = LayerFilter::decode(package_name)?;
                let versions = self.list_sorted_versions(&filter).await?;

                info!("Resolved {} versions for {}", versions.len(), filter.arn);

                Ok::<_, DatasourceError>(to_releases(&versions))
            },
        )
        .await
    }
}
