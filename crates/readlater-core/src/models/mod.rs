//! Data models for the bookmarking provider.

pub mod bookmark;

pub use bookmark::{BookmarkDetail, BookmarkEntry, BookmarkUpdate};
