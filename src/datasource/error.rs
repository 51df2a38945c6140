use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasourceError {
    #[error("Malformed layer filter: {0}")]
    MalformedFilter(String),

    #[error("Remote listing failed: {0}")]
    RemoteListing(#[from] ListingError),
}

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Lambda API returned status {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to create Lambda client: {0}")]
    Client(String),
}
