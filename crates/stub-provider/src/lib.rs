//! Local stand-in for the bookmarking provider.
//!
//! Serves the OAuth1 token endpoints, the two REST endpoints and the RSS 1.0
//! feed with fixed credentials and an in-memory bookmark list. It checks the
//! shape of the `Authorization` header (consumer key, token, verifier) but
//! does not verify signatures.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};

pub const CONSUMER_KEY: &str = "stub-consumer-key";
pub const CONSUMER_SECRET: &str = "stub-consumer-secret";
pub const REQUEST_TOKEN: &str = "stub-request-token";
pub const REQUEST_TOKEN_SECRET: &str = "stub-request-secret";
pub const VERIFIER: &str = "stub-verifier";
pub const ACCESS_TOKEN: &str = "stub-access-token";
pub const ACCESS_TOKEN_SECRET: &str = "stub-access-secret";
pub const USERNAME: &str = "alice";
pub const MARKER_TAG: &str = "あとで読む";

#[derive(Clone, Debug, Serialize)]
pub struct Bookmark {
    pub url: String,
    pub title: String,
    pub comment_raw: String,
    pub tags: Vec<String>,
    pub created: String,
}

impl Bookmark {
    pub fn new(url: &str, title: &str, comment_raw: &str, tags: &[&str], created: &str) -> Self {
        Self {
            url: url.to_string(),
            title: title.to_string(),
            comment_raw: comment_raw.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created: created.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Provider {
    /// Feed order
    pub bookmarks: Vec<Bookmark>,
    /// Query parameters of every accepted bookmark write, in arrival order
    pub updates: Vec<Vec<(String, String)>>,
    /// Number of requests that reached any endpoint
    pub hits: usize,
    /// Reject the access token on every REST and feed call
    pub revoked: bool,
    /// Answer bookmark writes with 500
    pub fail_updates: bool,
    /// Leave `comment_raw` out of bookmark reads
    pub omit_comment_raw: bool,
}

pub type Db = Arc<RwLock<Provider>>;

/// Two read-later bookmarks and one ordinary one.
pub fn seeded() -> Db {
    let provider = Provider {
        bookmarks: vec![
            Bookmark::new(
                "https://example.com/rust-async",
                "Async Rust & You",
                "[あとで読む]long but good",
                &[MARKER_TAG, "rust"],
                "2023-05-02T08:30:00+09:00",
            ),
            Bookmark::new(
                "https://example.com/oauth1",
                "OAuth 1.0a explained",
                "[あとで読む]",
                &[MARKER_TAG],
                "2023-05-01T12:00:00+09:00",
            ),
            Bookmark::new(
                "https://example.com/already-read",
                "Already read",
                "done",
                &["misc"],
                "2023-04-30T07:00:00+09:00",
            ),
        ],
        ..Provider::default()
    };
    Arc::new(RwLock::new(provider))
}

pub fn app(db: Db) -> Router {
    Router::new()
        .route("/oauth/initiate", post(initiate))
        .route("/oauth/token", post(token))
        .route("/rest/1/my", get(my))
        .route("/rest/1/my/bookmark", get(get_bookmark).post(update_bookmark))
        .route("/{user}/bookmark.rss", get(feed))
        .with_state(db)
}

pub async fn run(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app(db)).await
}

/// Serve on a random local port in the background; returns the base URL.
pub async fn spawn(db: Db) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub provider");
    let addr = listener.local_addr().expect("stub provider address");
    tokio::spawn(run(listener, db));
    format!("http://{addr}")
}

/// `OAuth k="v", ...` header fields.
fn oauth_fields(headers: &HeaderMap) -> HashMap<String, String> {
    let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return HashMap::new();
    };
    let Some(fields) = value.strip_prefix("OAuth ") else {
        return HashMap::new();
    };
    fields
        .split(',')
        .filter_map(|field| {
            let (key, value) = field.trim().split_once('=')?;
            Some((key.to_string(), value.trim_matches('"').to_string()))
        })
        .collect()
}

fn query_pairs(query: Option<String>) -> Vec<(String, String)> {
    url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .into_owned()
        .collect()
}

fn first<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

fn signed_by_consumer(fields: &HashMap<String, String>) -> bool {
    fields.get("oauth_consumer_key").map(String::as_str) == Some(CONSUMER_KEY)
        && fields.get("oauth_signature_method").map(String::as_str) == Some("HMAC-SHA1")
        && fields.contains_key("oauth_signature")
        && fields.contains_key("oauth_nonce")
        && fields.contains_key("oauth_timestamp")
}

fn form(body: String) -> Response {
    (
        [(header::CONTENT_TYPE, "application/x-www-form-urlencoded")],
        body,
    )
        .into_response()
}

fn rejected(problem: &str) -> Response {
    (StatusCode::UNAUTHORIZED, format!("oauth_problem={problem}")).into_response()
}

async fn initiate(State(db): State<Db>, headers: HeaderMap, RawQuery(query): RawQuery) -> Response {
    db.write().await.hits += 1;
    let fields = oauth_fields(&headers);
    let params = query_pairs(query);

    if !signed_by_consumer(&fields) || fields.contains_key("oauth_token") {
        return rejected("signature_invalid");
    }
    if first(&params, "oauth_callback").is_none() || first(&params, "scope").is_none() {
        return (StatusCode::BAD_REQUEST, "oauth_problem=parameter_absent").into_response();
    }
    form(format!(
        "oauth_token={REQUEST_TOKEN}&oauth_token_secret={REQUEST_TOKEN_SECRET}&oauth_callback_confirmed=true"
    ))
}

async fn token(State(db): State<Db>, headers: HeaderMap) -> Response {
    db.write().await.hits += 1;
    let fields = oauth_fields(&headers);

    if !signed_by_consumer(&fields)
        || fields.get("oauth_token").map(String::as_str) != Some(REQUEST_TOKEN)
    {
        return rejected("token_rejected");
    }
    if fields.get("oauth_verifier").map(String::as_str) != Some(VERIFIER) {
        return rejected("verifier_invalid");
    }
    form(format!(
        "oauth_token={ACCESS_TOKEN}&oauth_token_secret={ACCESS_TOKEN_SECRET}&url_name={USERNAME}"
    ))
}

/// Count the hit and check the access token.
async fn authorize(db: &Db, headers: &HeaderMap) -> Result<(), Response> {
    let mut provider = db.write().await;
    provider.hits += 1;
    let fields = oauth_fields(headers);
    if provider.revoked
        || !signed_by_consumer(&fields)
        || fields.get("oauth_token").map(String::as_str) != Some(ACCESS_TOKEN)
    {
        return Err(rejected("token_rejected"));
    }
    Ok(())
}

async fn my(State(db): State<Db>, headers: HeaderMap) -> Response {
    if let Err(resp) = authorize(&db, &headers).await {
        return resp;
    }
    Json(json!({ "name": USERNAME, "plususer": false })).into_response()
}

fn bookmark_json(bookmark: &Bookmark) -> serde_json::Value {
    json!({
        "comment": bookmark.comment_raw,
        "comment_raw": bookmark.comment_raw,
        "tags": bookmark.tags,
        "created_datetime": bookmark.created,
        "private": false,
        "user": USERNAME,
        "permalink": format!("https://b.example/{USERNAME}/bookmark"),
    })
}

async fn get_bookmark(State(db): State<Db>, headers: HeaderMap, RawQuery(query): RawQuery) -> Response {
    if let Err(resp) = authorize(&db, &headers).await {
        return resp;
    }
    let params = query_pairs(query);
    let Some(url) = first(&params, "url") else {
        return (StatusCode::BAD_REQUEST, "url is required").into_response();
    };

    let provider = db.read().await;
    match provider.bookmarks.iter().find(|b| b.url == url) {
        Some(bookmark) => {
            let mut body = bookmark_json(bookmark);
            if provider.omit_comment_raw {
                if let Some(fields) = body.as_object_mut() {
                    fields.remove("comment_raw");
                }
            }
            Json(body).into_response()
        }
        None => (StatusCode::NOT_FOUND, "bookmark not found").into_response(),
    }
}

async fn update_bookmark(State(db): State<Db>, headers: HeaderMap, RawQuery(query): RawQuery) -> Response {
    if let Err(resp) = authorize(&db, &headers).await {
        return resp;
    }
    let params = query_pairs(query);
    let mut provider = db.write().await;
    if provider.fail_updates {
        return (StatusCode::INTERNAL_SERVER_ERROR, "update failed").into_response();
    }
    let Some(url) = first(&params, "url").map(str::to_string) else {
        return (StatusCode::BAD_REQUEST, "url is required").into_response();
    };

    let comment = first(&params, "comment").unwrap_or_default().to_string();
    let tags: Vec<String> = params
        .iter()
        .filter(|(k, _)| k == "tags")
        .map(|(_, v)| v.clone())
        .collect();

    let body = match provider.bookmarks.iter_mut().find(|b| b.url == url) {
        Some(bookmark) => {
            bookmark.comment_raw = comment;
            bookmark.tags = tags;
            bookmark_json(bookmark)
        }
        None => return (StatusCode::NOT_FOUND, "bookmark not found").into_response(),
    };
    provider.updates.push(params);
    Json(body).into_response()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

async fn feed(
    State(db): State<Db>,
    Path(user): Path<String>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    if let Err(resp) = authorize(&db, &headers).await {
        return resp;
    }
    if user != USERNAME {
        return (StatusCode::NOT_FOUND, "no such user").into_response();
    }
    let params = query_pairs(query);
    let tag = first(&params, "tag").unwrap_or_default();
    let page: usize = first(&params, "page").and_then(|p| p.parse().ok()).unwrap_or(1);

    let provider = db.read().await;
    let items: Vec<String> = if page == 1 {
        provider
            .bookmarks
            .iter()
            .filter(|b| tag.is_empty() || b.tags.iter().any(|t| t == tag))
            .map(|b| {
                format!(
                    r#"<item rdf:about="{url}"><title>{title}</title><link>{url}</link><description>{comment}</description><dc:date>{date}</dc:date></item>"#,
                    url = escape(&b.url),
                    title = escape(&b.title),
                    comment = escape(&b.comment_raw),
                    date = escape(&b.created),
                )
            })
            .collect()
    } else {
        Vec::new()
    };

    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rdf:RDF xmlns="http://purl.org/rss/1.0/" xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:dc="http://purl.org/dc/elements/1.1/">
<channel rdf:about="https://b.example/{USERNAME}/bookmark"><title>{USERNAME}'s bookmarks</title><link>https://b.example/{USERNAME}/bookmark</link><description>stub</description></channel>
{items}
</rdf:RDF>"#,
        items = items.join("\n")
    );
    ([(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")], xml).into_response()
}
