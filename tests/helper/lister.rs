//! Lister and cache test utilities

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;

use lambda_layer_releases::cache::SqliteCacheStore;
use lambda_layer_releases::datasource::{
    LayerVersion, LayerVersionLister, ListLayerVersionsOutput, ListLayerVersionsRequest,
    ListingError,
};

type Response = Result<Option<Vec<LayerVersion>>, ListingError>;

/// Lister replaying queued responses and recording every request
///
/// Once the queue is drained every call returns the fallback listing.
pub struct StubLister {
    responses: Mutex<VecDeque<Response>>,
    fallback: Option<Vec<LayerVersion>>,
    requests: Mutex<Vec<ListLayerVersionsRequest>>,
    calls: AtomicUsize,
}

impl StubLister {
    pub fn new(layer_versions: Option<Vec<LayerVersion>>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: layer_versions,
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queues a failure returned before the fallback listing
    pub fn failing_first(self, error: ListingError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ListLayerVersionsRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LayerVersionLister for StubLister {
    async fn list_layer_versions(
        &self,
        request: &ListLayerVersionsRequest,
    ) -> Result<ListLayerVersionsOutput, ListingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let queued = self.responses.lock().unwrap().pop_front();
        let layer_versions = match queued {
            Some(response) => response?,
            None => self.fallback.clone(),
        };

        Ok(ListLayerVersionsOutput { layer_versions })
    }
}

/// Layer version as the Lambda API reports it
pub fn layer(version: i64, created: &str) -> LayerVersion {
    LayerVersion {
        version: Some(version),
        created_date: Some(created.to_string()),
        layer_version_arn: Some(format!(
            "arn:aws:lambda:us-east-1:123456789012:layer:my-layer:{}",
            version
        )),
        ..Default::default()
    }
}

/// Create a SQLite cache store in a fresh temporary directory
pub fn create_test_store() -> (TempDir, Arc<SqliteCacheStore>) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let store = SqliteCacheStore::new(&db_path).unwrap();

    (temp_dir, Arc::new(store))
}
