//! Datasource trait for resolving the releases of a package

use crate::datasource::error::DatasourceError;
use crate::datasource::release::ReleaseResult;

/// Trait for resolving the available releases of a package
#[async_trait::async_trait]
pub trait Datasource: Send + Sync {
    /// Identifier the update engine uses to select this datasource
    fn id(&self) -> &'static str;

    /// Fetches all releases for a package, oldest first
    ///
    /// # Arguments
    /// * `package_name` - Datasource-specific package identifier
    ///
    /// # Returns
    /// * `Ok(Some(ReleaseResult))` - At least one release exists
    /// * `Ok(None)` - The package has no releases or does not exist
    /// * `Err(DatasourceError)` - The identifier is invalid or the lookup failed
    async fn get_releases(&self, package_name: &str)
    -> Result<Option<ReleaseResult>, DatasourceError>;
}
