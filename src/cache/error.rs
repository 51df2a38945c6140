use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Cache lock poisoned")]
    LockPoisoned,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
