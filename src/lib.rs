//! Resolves the versions of an AWS Lambda layer into an ordered release list
//! for dependency-update tooling.
//!
//! - [`datasource`]: filter decoding, the Lambda API lister and the datasource itself
//! - [`cache`]: namespaced result cache and its stores
//! - [`config`]: configuration and data directory layout
//! - [`logging`]: tracing setup for the CLI

pub mod cache;
pub mod config;
pub mod datasource;
pub mod logging;
