//! Web front-end for the read-later queue.
//!
//! An axum router over `readlater_core`: login through the provider's OAuth1
//! pages, a listing of read-later bookmarks, and endpoints that mark entries
//! read. The session lives entirely in a sealed cookie.

pub mod device;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;
pub mod templates;

pub use routes::app;
pub use state::AppState;
