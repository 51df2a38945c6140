//! Namespaced result cache
//!
//! [`CacheStore`] is the storage seam: it keeps opaque JSON text under a
//! `(namespace, key)` pair until a TTL elapses. [`with_cache`] memoizes an
//! async computation on top of any store.
//!
//! # Modules
//!
//! - [`sqlite`]: persistent store shared across processes
//! - [`memory`]: process-local store
//! - [`error`]: store errors

pub mod error;
pub mod memory;
pub mod sqlite;

use std::future::Future;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub use error::CacheError;
pub use memory::MemoryCacheStore;
pub use sqlite::SqliteCacheStore;

/// Storage for cached values
///
/// Implementations must tolerate concurrent callers. Expired entries are
/// reported as missing.
#[cfg_attr(test, automock)]
pub trait CacheStore: Send + Sync {
    /// Returns the live entry stored under `namespace`/`key`
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value`, replacing any previous entry, for `ttl`
    fn set(&self, namespace: &str, key: &str, value: &str, ttl: Duration)
    -> Result<(), CacheError>;

    /// Removes expired entries, returning how many were dropped
    fn purge_expired(&self) -> Result<usize, CacheError>;

    /// Removes every entry
    fn clear(&self) -> Result<(), CacheError>;
}

/// Builds the `<operation>:<argument>` key used for memoized calls
pub fn cache_key(operation: &str, argument: &str) -> String {
    format!("{}:{}", operation, argument)
}

/// Returns the cached value for `key`, or runs `compute` and caches its result
///
/// `compute` runs at most once per call. Errors are returned as-is and never
/// cached. Store failures only cost a cache hit; they are logged and the
/// computation proceeds. Concurrent misses for the same key are not
/// coalesced: each caller computes and the last write wins.
pub async fn with_cache<S, T, E, F, Fut>(
    store: &S,
    namespace: &str,
    key: &str,
    ttl: Duration,
    compute: F,
) -> Result<T, E>
where
    S: CacheStore + ?Sized,
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match store.get(namespace, key) {
        Ok(Some(cached)) => match serde_json::from_str::<T>(&cached) {
            Ok(value) => {
                debug!("Cache hit for {}/{}", namespace, key);
                return Ok(value);
            }
            Err(e) => warn!(
                "Discarding unreadable cache entry {}/{}: {}",
                namespace, key, e
            ),
        },
        Ok(None) => debug!("Cache miss for {}/{}", namespace, key),
        Err(e) => warn!("Failed to read cache entry {}/{}: {}", namespace, key, e),
    }

    let value = compute().await?;

    let stored = serde_json::to_string(&value)
        .map_err(CacheError::from)
        .and_then(|serialized| store.set(namespace, key, &serialized, ttl));
    if let Err(e) = stored {
        warn!("Failed to store cache entry {}/{}: {}", namespace, key, e);
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const NS: &str = "test-namespace";
    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn cache_key_joins_operation_and_argument() {
        assert_eq!(
            cache_key("getReleases", r#"{"arn":"a"}"#),
            r#"getReleases:{"arn":"a"}"#
        );
    }

    #[tokio::test]
    async fn with_cache_computes_and_stores_on_miss() {
        let store = MemoryCacheStore::new();
        let calls = Cell::new(0);

        let value: Result<Vec<i64>, String> = with_cache(&store, NS, "k", TTL, || async {
            calls.set(calls.get() + 1);
            Ok(vec![1, 2, 3])
        })
        .await;

        assert_eq!(value.unwrap(), vec![1, 2, 3]);
        assert_eq!(calls.get(), 1);
        assert_eq!(store.get(NS, "k").unwrap(), Some("[1,2,3]".to_string()));
    }

    #[tokio::test]
    async fn with_cache_returns_live_entry_without_computing() {
        let store = MemoryCacheStore::new();
        store.set(NS, "k", "[4,5]", TTL).unwrap();
        let calls = Cell::new(0);

        let value: Result<Vec<i64>, String> = with_cache(&store, NS, "k", TTL, || async {
            calls.set(calls.get() + 1);
            Ok(vec![])
        })
        .await;

        assert_eq!(value.unwrap(), vec![4, 5]);
        assert_eq!(calls.get(), 0);
    }

    #[tokio::test]
    async fn with_cache_caches_empty_and_absent_values() {
        let store = MemoryCacheStore::new();

        let empty: Result<Vec<i64>, String> =
            with_cache(&store, NS, "empty", TTL, || async { Ok(vec![]) }).await;
        let absent: Result<Option<i64>, String> =
            with_cache(&store, NS, "absent", TTL, || async { Ok(None) }).await;

        assert_eq!(empty.unwrap(), Vec::<i64>::new());
        assert_eq!(absent.unwrap(), None);

        let calls = Cell::new(0);
        let cached_absent: Result<Option<i64>, String> =
            with_cache(&store, NS, "absent", TTL, || async {
                calls.set(calls.get() + 1);
                Ok(Some(1))
            })
            .await;
        assert_eq!(cached_absent.unwrap(), None);
        assert_eq!(calls.get(), 0);
    }

    #[tokio::test]
    async fn with_cache_does_not_cache_errors() {
        let store = MemoryCacheStore::new();

        let failed: Result<Vec<i64>, String> =
            with_cache(&store, NS, "k", TTL, || async { Err("boom".to_string()) }).await;

        assert_eq!(failed, Err("boom".to_string()));
        assert_eq!(store.get(NS, "k").unwrap(), None);
    }

    #[tokio::test]
    async fn with_cache_keeps_namespaces_apart() {
        let store = MemoryCacheStore::new();
        store.set("other", "k", "[9]", TTL).unwrap();

        let value: Result<Vec<i64>, String> =
            with_cache(&store, NS, "k", TTL, || async { Ok(vec![1]) }).await;

        assert_eq!(value.unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn with_cache_recomputes_unreadable_entry() {
        let store = MemoryCacheStore::new();
        store.set(NS, "k", "not json", TTL).unwrap();

        let value: Result<Vec<i64>, String> =
            with_cache(&store, NS, "k", TTL, || async { Ok(vec![7]) }).await;

        assert_eq!(value.unwrap(), vec![7]);
        assert_eq!(store.get(NS, "k").unwrap(), Some("[7]".to_string()));
    }

    #[tokio::test]
    async fn with_cache_survives_store_failures() {
        let mut store = MockCacheStore::new();
        store
            .expect_get()
            .times(1)
            .returning(|_, _| Err(CacheError::LockPoisoned));
        store
            .expect_set()
            .times(1)
            .returning(|_, _, _, _| Err(CacheError::LockPoisoned));

        let value: Result<Vec<i64>, String> =
            with_cache(&store, NS, "k", TTL, || async { Ok(vec![1]) }).await;

        assert_eq!(value.unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn with_cache_passes_ttl_to_store() {
        let mut store = MockCacheStore::new();
        store.expect_get().returning(|_, _| Ok(None));
        store
            .expect_set()
            .withf(|namespace, key, value, ttl| {
                namespace == NS && key == "k" && value == "1" && *ttl == Duration::from_secs(900)
            })
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        let value: Result<i64, String> =
            with_cache(&store, NS, "k", Duration::from_secs(900), || async { Ok(1) }).await;

        assert_eq!(value.unwrap(), 1);
    }
}
