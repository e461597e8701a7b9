//! RSS 1.0 (RDF) feed parser.
//!
//! Entries are the `item` elements in the RSS 1.0 namespace that sit
//! directly under the document root. Each must carry a non-blank `link`,
//! `title` and Dublin Core `date`; the first item that does not aborts the
//! whole parse. Field text is kept exactly as written.

use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use crate::api::ApiError;
use crate::models::BookmarkEntry;

const RSS_NS: &[u8] = b"http://purl.org/rss/1.0/";
const DC_NS: &[u8] = b"http://purl.org/dc/elements/1.1/";

/// Depth of `item` elements (root is 1)
const ITEM_DEPTH: usize = 2;
const FIELD_DEPTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ns {
    Rss,
    DublinCore,
    Other,
}

impl Ns {
    fn of(resolved: ResolveResult<'_>) -> Self {
        match resolved {
            ResolveResult::Bound(Namespace(uri)) if uri == RSS_NS => Ns::Rss,
            ResolveResult::Bound(Namespace(uri)) if uri == DC_NS => Ns::DublinCore,
            _ => Ns::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Link,
    Title,
    Date,
}

impl Field {
    fn of(ns: Ns, local_name: &[u8]) -> Option<Self> {
        match (ns, local_name) {
            (Ns::Rss, b"link") => Some(Field::Link),
            (Ns::Rss, b"title") => Some(Field::Title),
            (Ns::DublinCore, b"date") => Some(Field::Date),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct PartialItem {
    link: Option<String>,
    title: Option<String>,
    date: Option<String>,
}

impl PartialItem {
    /// Record a field; the first occurrence wins.
    fn set(&mut self, field: Field, text: String) {
        let slot = match field {
            Field::Link => &mut self.link,
            Field::Title => &mut self.title,
            Field::Date => &mut self.date,
        };
        if slot.is_none() {
            *slot = Some(text);
        }
    }

    fn finish(self, position: usize) -> Result<BookmarkEntry, ApiError> {
        let url = required(self.link, "link", position)?;
        let title = required(self.title, "title", position)?;
        let date = required(self.date, "dc:date", position)?;
        Ok(BookmarkEntry {
            url,
            title,
            timestamp: display_timestamp(&date),
        })
    }
}

fn required(value: Option<String>, name: &str, position: usize) -> Result<String, ApiError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ApiError::Parse(format!("item {position} has no {name}"))),
    }
}

/// `2023-05-01T12:00:00+09:00` -> `2023-05-01 12:00:00+09:00`
pub fn display_timestamp(raw: &str) -> String {
    raw.replacen('T', " ", 1)
}

/// Parse an RSS 1.0 document into entries, in document order.
pub fn parse_feed(xml: &str) -> Result<Vec<BookmarkEntry>, ApiError> {
    let mut reader = NsReader::from_str(xml);

    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;
    let mut item: Option<PartialItem> = None;
    let mut capture: Option<(Field, String)> = None;

    loop {
        let (resolved, event) = reader
            .read_resolved_event()
            .map_err(|e| ApiError::Parse(e.to_string()))?;
        let ns = Ns::of(resolved);

        match event {
            Event::Start(start) => {
                depth += 1;
                saw_root = true;
                let local = start.local_name();
                if depth == ITEM_DEPTH && ns == Ns::Rss && local.as_ref() == b"item" {
                    item = Some(PartialItem::default());
                } else if depth == FIELD_DEPTH && item.is_some() {
                    capture = Field::of(ns, local.as_ref()).map(|field| (field, String::new()));
                }
            }
            Event::Empty(empty) => {
                saw_root = true;
                let local = empty.local_name();
                if depth + 1 == ITEM_DEPTH && ns == Ns::Rss && local.as_ref() == b"item" {
                    PartialItem::default().finish(entries.len() + 1)?;
                } else if depth + 1 == FIELD_DEPTH {
                    if let (Some(item), Some(field)) = (item.as_mut(), Field::of(ns, local.as_ref())) {
                        item.set(field, String::new());
                    }
                }
            }
            Event::Text(text) => {
                if let Some((_, buf)) = capture.as_mut() {
                    let unescaped = text.unescape().map_err(|e| ApiError::Parse(e.to_string()))?;
                    buf.push_str(&unescaped);
                }
            }
            Event::CData(cdata) => {
                if let Some((_, buf)) = capture.as_mut() {
                    let raw = cdata.into_inner();
                    let text = std::str::from_utf8(&raw).map_err(|e| ApiError::Parse(e.to_string()))?;
                    buf.push_str(text);
                }
            }
            Event::End(_) => {
                if depth == FIELD_DEPTH {
                    if let (Some(item), Some((field, text))) = (item.as_mut(), capture.take()) {
                        item.set(field, text);
                    }
                } else if depth == ITEM_DEPTH {
                    if let Some(done) = item.take() {
                        entries.push(done.finish(entries.len() + 1)?);
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(ApiError::Parse("document has no root element".to_string()));
    }
    if depth != 0 {
        return Err(ApiError::Parse("unexpected end of document".to_string()));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(items: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns="http://purl.org/rss/1.0/"
         xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:dc="http://purl.org/dc/elements/1.1/"
         xmlns:hatena="http://www.hatena.ne.jp/info/xmlns#">
  <channel rdf:about="https://b.hatena.ne.jp/alice/bookmark">
    <title>alice's bookmarks</title>
    <link>https://b.hatena.ne.jp/alice/bookmark</link>
    <description>read later</description>
    <items><rdf:Seq><rdf:li rdf:resource="https://example.com/a"/></rdf:Seq></items>
  </channel>
{items}
</rdf:RDF>"#
        )
    }

    fn item(url: &str, title: &str, date: &str) -> String {
        format!(
            r#"  <item rdf:about="{url}">
    <title>{title}</title>
    <link>{url}</link>
    <description>desc</description>
    <dc:creator>alice</dc:creator>
    <dc:date>{date}</dc:date>
    <dc:subject>あとで読む</dc:subject>
  </item>"#
        )
    }

    #[test]
    fn test_display_timestamp() {
        assert_eq!(display_timestamp("2023-05-01T12:00:00"), "2023-05-01 12:00:00");
        assert_eq!(
            display_timestamp("2023-05-01T12:00:00+09:00"),
            "2023-05-01 12:00:00+09:00"
        );
        assert_eq!(display_timestamp("2023-05-01"), "2023-05-01");
    }

    #[test]
    fn test_parse_feed_keeps_document_order() {
        let xml = feed(&[
            item("https://example.com/c", "Third", "2023-05-03T09:00:00+09:00"),
            item("https://example.com/a", "First", "2023-05-01T12:00:00+09:00"),
            item("https://example.com/b", "Second", "2023-05-02T08:30:00+09:00"),
        ]
        .join("\n"));

        let entries = parse_feed(&xml).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].url, "https://example.com/c");
        assert_eq!(entries[1].title, "First");
        assert_eq!(entries[2].timestamp, "2023-05-02 08:30:00+09:00");
        for entry in &entries {
            assert!(!entry.url.is_empty());
            assert!(!entry.title.is_empty());
            assert!(!entry.timestamp.is_empty());
        }
    }

    #[test]
    fn test_channel_fields_are_not_entries() {
        let entries = parse_feed(&feed("")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_unescapes_text_and_cdata() {
        let xml = feed(
            r#"  <item rdf:about="https://example.com/q?a=1&amp;b=2">
    <title><![CDATA[Rust & <Friends>]]></title>
    <link>https://example.com/q?a=1&amp;b=2</link>
    <dc:date>2023-05-01T12:00:00Z</dc:date>
  </item>"#,
        );

        let entries = parse_feed(&xml).unwrap();
        assert_eq!(entries[0].url, "https://example.com/q?a=1&b=2");
        assert_eq!(entries[0].title, "Rust & <Friends>");
        assert_eq!(entries[0].timestamp, "2023-05-01 12:00:00Z");
    }

    #[test]
    fn test_missing_date_aborts_parse() {
        let xml = feed(&format!(
            "{}\n{}",
            item("https://example.com/a", "Fine", "2023-05-01T12:00:00"),
            r#"  <item rdf:about="https://example.com/b">
    <title>No date</title>
    <link>https://example.com/b</link>
  </item>"#
        ));

        match parse_feed(&xml) {
            Err(ApiError::Parse(msg)) => assert!(msg.contains("item 2 has no dc:date")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_title_aborts_parse() {
        let xml = feed(
            r#"  <item rdf:about="https://example.com/a">
    <title/>
    <link>https://example.com/a</link>
    <dc:date>2023-05-01T12:00:00</dc:date>
  </item>"#,
        );
        assert!(matches!(parse_feed(&xml), Err(ApiError::Parse(_))));
    }

    #[test]
    fn test_field_text_is_not_trimmed() {
        let xml = feed(
            r#"  <item rdf:about="https://example.com/a">
    <title>  Rust  Go  </title>
    <link>https://example.com/a</link>
    <dc:date>2023-05-01T12:00:00</dc:date>
  </item>
  <item rdf:about="https://example.com/b">
    <title>Rust <![CDATA[&]]> Go</title>
    <link>https://example.com/b</link>
    <dc:date>2023-05-02T12:00:00</dc:date>
  </item>"#,
        );
        let entries = parse_feed(&xml).unwrap();
        assert_eq!(entries[0].title, "  Rust  Go  ");
        assert_eq!(entries[1].title, "Rust & Go");
    }

    #[test]
    fn test_blank_link_aborts_parse() {
        let xml = feed(
            r#"  <item rdf:about="https://example.com/a">
    <title>Title</title>
    <link>   </link>
    <dc:date>2023-05-01T12:00:00</dc:date>
  </item>"#,
        );
        match parse_feed(&xml) {
            Err(ApiError::Parse(msg)) => assert!(msg.contains("item 1 has no link")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_elements_outside_rss_namespace_are_ignored() {
        let xml = feed(
            r#"  <item rdf:about="https://example.com/a">
    <title>Title</title>
    <rdf:link>https://wrong.example/</rdf:link>
    <link>https://example.com/a</link>
    <dc:date>2023-05-01T12:00:00</dc:date>
  </item>"#,
        );
        let entries = parse_feed(&xml).unwrap();
        assert_eq!(entries[0].url, "https://example.com/a");
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        assert!(matches!(parse_feed(""), Err(ApiError::Parse(_))));
        assert!(matches!(parse_feed("not xml"), Err(ApiError::Parse(_))));
        assert!(matches!(
            parse_feed("<rdf:RDF xmlns:rdf=\"x\"><item></rdf:RDF>"),
            Err(ApiError::Parse(_))
        ));
        assert!(matches!(
            parse_feed("<rdf:RDF xmlns:rdf=\"x\">"),
            Err(ApiError::Parse(_))
        ));
    }
}
