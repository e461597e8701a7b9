//! Core library for readlater.
//!
//! A client for a bookmarking service's "read later" queue:
//! - OAuth1 three-legged login (`auth`)
//! - the tagged RSS 1.0 feed, fetched and parsed into entries (`feed`)
//! - marking an entry read by rewriting its comment and tags (`bookmarks`)
//!
//! Every call is a single signed request with no retries. Session storage
//! belongs to the caller; the core only consumes and produces
//! `SessionState` values.

pub mod api;
pub mod auth;
pub mod bookmarks;
pub mod config;
pub mod feed;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthState, ConsumerCredentials, DeviceClass, SessionSealer, SessionState, TokenPair};
pub use config::{Config, Endpoints};
pub use models::{BookmarkDetail, BookmarkEntry, BookmarkUpdate};
