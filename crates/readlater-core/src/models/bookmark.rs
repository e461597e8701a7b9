use serde::{Deserialize, Serialize};

/// One entry of the read-later feed. Produced per fetch, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkEntry {
    pub url: String,
    pub title: String,
    /// `dc:date` with the `T` separator replaced by a space
    pub timestamp: String,
}

/// A single bookmark as returned by `GET /rest/1/my/bookmark`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookmarkDetail {
    #[serde(default)]
    pub url: Option<String>,
    /// Required, like `tags`; a read without them fails
    pub comment_raw: String,
    pub tags: Vec<String>,
}

/// Body of a bookmark write-back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookmarkUpdate {
    pub url: String,
    pub comment: String,
    pub tags: Vec<String>,
}

impl BookmarkUpdate {
    /// Query parameters for `POST /rest/1/my/bookmark`; `tags` repeats once
    /// per tag.
    pub fn params(&self) -> Vec<(&str, &str)> {
        let mut params = vec![("url", self.url.as_str()), ("comment", self.comment.as_str())];
        params.extend(self.tags.iter().map(|tag| ("tags", tag.as_str())));
        params
    }
}
