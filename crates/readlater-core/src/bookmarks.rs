//! Mark-as-read: strip the read-later marker from a bookmark's comment and
//! tags and write it back.
//!
//! The read and the write are two separate calls. An edit made elsewhere
//! between them is overwritten by the write (last writer wins).

use tracing::debug;

use crate::api::{ApiClient, ApiError};
use crate::models::{BookmarkDetail, BookmarkUpdate};

/// Tag marking a bookmark as "read later"
pub const MARKER_TAG: &str = "あとで読む";

/// The same marker as it appears inline in a comment
pub const MARKER_COMMENT: &str = "[あとで読む]";

/// Remove the first inline marker from a comment.
pub fn strip_marker_comment(comment: &str) -> String {
    comment.replacen(MARKER_COMMENT, "", 1)
}

/// Remove the first marker tag; a list without one is returned unchanged.
pub fn strip_marker_tag(mut tags: Vec<String>) -> Vec<String> {
    if let Some(pos) = tags.iter().position(|tag| tag == MARKER_TAG) {
        tags.remove(pos);
    }
    tags
}

impl BookmarkDetail {
    /// The write-back that takes this bookmark off the read-later list.
    pub fn mark_read(self, url: &str) -> BookmarkUpdate {
        BookmarkUpdate {
            url: url.to_string(),
            comment: strip_marker_comment(&self.comment_raw),
            tags: strip_marker_tag(self.tags),
        }
    }
}

impl ApiClient {
    /// Fetch the signed-in user's bookmark for `url`.
    pub async fn get_bookmark(&self, url: &str) -> Result<BookmarkDetail, ApiError> {
        let endpoint = format!("{}/rest/1/my/bookmark", self.endpoints().api_base);
        let response = self.get(&endpoint, &[("url", url)]).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse bookmark: {e}")))
    }

    /// Overwrite the bookmark's comment and tags.
    pub async fn update_bookmark(&self, update: &BookmarkUpdate) -> Result<(), ApiError> {
        let endpoint = format!("{}/rest/1/my/bookmark", self.endpoints().api_base);
        self.post(&endpoint, &update.params()).await?;
        Ok(())
    }

    /// Take `url` off the read-later list. Always writes back, so calling it
    /// on an already-read bookmark rewrites the same comment and tags.
    pub async fn mark_as_read(&self, url: &str) -> Result<BookmarkUpdate, ApiError> {
        let detail = self.get_bookmark(url).await?;
        let update = detail.mark_read(url);
        self.update_bookmark(&update).await?;
        debug!(url = url, tags = update.tags.len(), "Marked bookmark as read");
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_strip_marker_comment() {
        assert_eq!(strip_marker_comment("[あとで読む]interesting"), "interesting");
        assert_eq!(strip_marker_comment("[rust][あとで読む] later"), "[rust] later");
        assert_eq!(strip_marker_comment("no marker"), "no marker");
        // Only the first occurrence goes
        assert_eq!(strip_marker_comment("[あとで読む][あとで読む]"), "[あとで読む]");
        // The bare tag text is not the inline marker
        assert_eq!(strip_marker_comment("あとで読む"), "あとで読む");
    }

    #[test]
    fn test_strip_marker_tag() {
        assert_eq!(strip_marker_tag(tags(&["rust", "あとで読む", "web"])), tags(&["rust", "web"]));
        assert_eq!(strip_marker_tag(tags(&["rust"])), tags(&["rust"]));
        assert!(strip_marker_tag(Vec::new()).is_empty());
    }

    #[test]
    fn test_mark_read_is_idempotent() {
        let detail = BookmarkDetail {
            url: None,
            comment_raw: "[あとで読む]good read".into(),
            tags: tags(&["あとで読む", "rust"]),
        };

        let first = detail.mark_read("https://example.com/");
        assert_eq!(first.comment, "good read");
        assert_eq!(first.tags, tags(&["rust"]));

        let again = BookmarkDetail {
            url: None,
            comment_raw: first.comment.clone(),
            tags: first.tags.clone(),
        }
        .mark_read("https://example.com/");
        assert_eq!(again, first);
    }
}
