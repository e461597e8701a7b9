//! Read-later feed fetching.
//!
//! The provider publishes each user's bookmarks as an RSS 1.0 feed,
//! filterable by tag and paginated. Only the read-later marker tag is ever
//! requested.

pub mod parser;

use tracing::debug;

pub use parser::{display_timestamp, parse_feed};

use crate::api::{ApiClient, ApiError};
use crate::bookmarks::MARKER_TAG;
use crate::models::BookmarkEntry;

impl ApiClient {
    /// Raw feed XML for one page of the user's read-later bookmarks.
    pub async fn fetch_feed(&self, username: &str, page: u32) -> Result<String, ApiError> {
        let url = format!(
            "{}/{}/bookmark.rss",
            self.endpoints().feed_base,
            urlencoding::encode(username)
        );
        let page = page.to_string();
        let response = self
            .get(&url, &[("tag", MARKER_TAG), ("page", page.as_str())])
            .await?;
        Ok(response.text().await?)
    }

    /// One page of read-later entries, in the provider's order.
    pub async fn fetch_bookmarks(&self, username: &str, page: u32) -> Result<Vec<BookmarkEntry>, ApiError> {
        let xml = self.fetch_feed(username, page).await?;
        let entries = parse_feed(&xml)?;
        debug!(count = entries.len(), page, "Parsed read-later feed");
        Ok(entries)
    }
}
