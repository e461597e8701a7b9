//! Signed REST client module for the bookmarking provider.
//!
//! This module provides the `ApiClient` for issuing OAuth1-signed calls
//! against the provider's REST API and feed endpoints, and the `ApiError`
//! taxonomy every call returns.

pub mod client;
pub mod error;

pub use client::{ApiClient, USER_AGENT};
pub use error::ApiError;
