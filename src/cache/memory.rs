use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use crate::cache::CacheStore;
use crate::cache::error::CacheError;

/// Value and expiry; `None` never expires
type Entries = HashMap<(String, String), (String, Option<Instant>)>;

fn is_live(expires_at: &Option<Instant>, now: Instant) -> bool {
    expires_at.is_none_or(|at| at > now)
}

/// Process-local cache store
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: RwLock<Entries>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Entries>, CacheError> {
        self.entries.read().map_err(|_| CacheError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Entries>, CacheError> {
        self.entries.write().map_err(|_| CacheError::LockPoisoned)
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.read()?;
        let value = entries
            .get(&(namespace.to_string(), key.to_string()))
            .filter(|(_, expires_at)| is_live(expires_at, Instant::now()))
            .map(|(value, _)| value.clone());
        Ok(value)
    }

    fn set(
        &self,
        namespace: &str,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let expires_at = Instant::now().checked_add(ttl);
        self.write()?.insert(
            (namespace.to_string(), key.to_string()),
            (value.to_string(), expires_at),
        );
        Ok(())
    }

    fn purge_expired(&self) -> Result<usize, CacheError> {
        let now = Instant::now();
        let mut entries = self.write()?;
        let before = entries.len();
        entries.retain(|_, (_, expires_at)| is_live(expires_at, now));
        Ok(before - entries.len())
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.write()?.clear();
        Ok(())
    }
}
