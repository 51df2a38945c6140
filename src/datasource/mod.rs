//! Lambda layer datasource
//!
//! Resolves the versions of an AWS Lambda layer into releases for the update
//! engine.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Filter    │────▶│  Datasource │────▶│   Release   │
//! │  (decode)   │     │  (resolve)  │     │   (map)     │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                       │         │
//!                       ▼         ▼
//!              ┌─────────────┐ ┌─────────────┐
//!              │    Cache    │ │   Lister    │
//!              │ (memoize)   │ │ (Lambda API)│
//!              └─────────────┘ └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`filter`]: Package name encoding of the layer query
//! - [`client`]: Lister trait, listing types and the lazy lister handle
//! - [`lambda_api`]: Lister backed by the Lambda REST API
//! - [`lambda_layer`]: The datasource: sorting, caching and release mapping
//! - [`release`]: Release types and mapping
//! - [`traits`]: `Datasource` trait
//! - [`error`]: Error types for decoding and listing

pub mod client;
pub mod error;
pub mod filter;
pub mod lambda_api;
pub mod lambda_layer;
pub mod release;
pub mod traits;

pub use client::{LayerVersion, LayerVersionLister, ListLayerVersionsOutput, ListLayerVersionsRequest};
pub use error::{DatasourceError, ListingError};
pub use filter::LayerFilter;
pub use lambda_api::LambdaApiClient;
pub use lambda_layer::AwsLambdaLayerDatasource;
pub use release::{Release, ReleaseResult};
pub use traits::Datasource;
