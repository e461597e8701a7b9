use askama::Template;
use readlater_core::BookmarkEntry;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub logged_in: bool,
    pub username: Option<String>,
    pub bookmarks: Vec<BookmarkEntry>,
    pub page: u32,
    pub has_next: bool,
}
