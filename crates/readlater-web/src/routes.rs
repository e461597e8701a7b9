//! Route handlers.
//!
//! Each handler loads the session from the cookie, does its work through the
//! core client, and writes the session back only if it changed.

use askama::Template;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use readlater_core::{ApiClient, ApiError, BookmarkEntry, SessionState, TokenPair};
use serde::Deserialize;
use tracing::{info, warn};

use crate::device::device_class;
use crate::error::AppError;
use crate::state::AppState;
use crate::templates::IndexTemplate;

const MAIN_JS: &str = include_str!("../static/js/main.js");

/// Build the HTTP router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/oauth", get(login))
        .route("/oauth/callback", get(callback))
        .route("/oauth/logout", get(logout))
        .route("/feed", get(feed))
        .route("/feed/read", post(mark_read))
        .route("/feed/read_all", post(mark_all_read))
        .route("/static/js/main.js", get(script))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<u32>,
}

impl PageQuery {
    fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    oauth_token: Option<String>,
    oauth_verifier: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReadQuery {
    url: Option<String>,
}

/// The session's username, fetched and cached on first use.
async fn ensure_username(client: &ApiClient, session: &mut SessionState) -> Result<String, ApiError> {
    if let Some(name) = &session.username {
        return Ok(name.clone());
    }
    let name = client.fetch_username().await?;
    session.username = Some(name.clone());
    Ok(name)
}

async fn load_bookmarks(
    state: &AppState,
    session: &mut SessionState,
    page: u32,
) -> Result<Vec<BookmarkEntry>, ApiError> {
    let client = state.api.for_session(session)?;
    let username = ensure_username(&client, session).await?;
    client.fetch_bookmarks(&username, page).await
}

/// Listing view. A provider that rejects the session's token logs the user
/// out instead of failing the page.
async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let page = query.page();
    let before = state.load_session(&headers);
    let mut session = before.clone();

    let mut bookmarks = Vec::new();
    if session.is_logged_in() {
        match load_bookmarks(&state, &mut session, page).await {
            Ok(entries) => bookmarks = entries,
            Err(err) if err.is_auth() => {
                warn!(error = %err, "Provider rejected session, logging out");
                session = session.flush();
            }
            Err(err) => return Err(err.into()),
        }
    }

    // The feed carries no total count, so any non-empty page links onward
    // and the last one leads to an empty page.
    let has_next = !bookmarks.is_empty();
    let html = IndexTemplate {
        logged_in: session.is_logged_in(),
        username: session.username.clone(),
        bookmarks,
        page,
        has_next,
    }
    .render()?;

    Ok(state.respond(&before, &session, Html(html))?)
}

/// Start the handshake and send the browser to the provider.
async fn login(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    let config = &state.config;
    let request = state
        .api
        .request_token(&config.callback_url, &config.scope)
        .await?;

    let device = device_class(&headers);
    let target = state.api.authorize_url(&request.token, device);
    let session = state.load_session(&headers).begin_authorization(&request);
    info!(?device, "Redirecting to provider authorization page");

    Ok(state.with_session(&session, Redirect::to(&target))?)
}

/// Provider redirect target: trade the verifier for an access token.
async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, AppError> {
    let session = state.load_session(&headers);

    let (Some(token), Some(verifier)) = (query.oauth_token, query.oauth_verifier) else {
        return Ok((StatusCode::BAD_REQUEST, "Missing oauth_token or oauth_verifier").into_response());
    };
    let Some(secret) = session.pending_secret().map(str::to_string) else {
        return Ok((StatusCode::BAD_REQUEST, "No login in progress").into_response());
    };

    let request = TokenPair::new(token, secret);
    match state.api.exchange_access_token(&request, &verifier).await {
        Ok(access) => {
            info!("Login completed");
            let session = session.complete_authorization(access);
            Ok(state.with_session(&session, Redirect::to("/"))?)
        }
        Err(err) => {
            warn!(error = %err, "Access token exchange failed");
            let cookie = state.session_cookie(&session.flush())?;
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::SET_COOKIE, cookie)],
                "Login failed",
            )
                .into_response())
        }
    }
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    let session = state.load_session(&headers);
    if !session.is_logged_in() {
        return Ok(StatusCode::BAD_REQUEST.into_response());
    }
    info!("Logging out");
    Ok(state.with_session(&session.flush(), Redirect::to("/"))?)
}

/// The raw feed XML, for feed readers.
async fn feed(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Result<Response, AppError> {
    let before = state.load_session(&headers);
    if !before.is_logged_in() {
        return Ok(Redirect::to("/").into_response());
    }
    let mut session = before.clone();

    let client = state.api.for_session(&session)?;
    let username = ensure_username(&client, &mut session).await?;
    let xml = client.fetch_feed(&username, query.page()).await?;

    let body = ([(header::CONTENT_TYPE, "text/xml; charset=utf-8")], xml);
    Ok(state.respond(&before, &session, body)?)
}

async fn mark_read(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ReadQuery>,
) -> Result<Response, AppError> {
    let session = state.load_session(&headers);
    if !session.is_logged_in() {
        return Ok(StatusCode::FORBIDDEN.into_response());
    }
    let Some(url) = query.url.filter(|url| !url.is_empty()) else {
        return Ok((StatusCode::BAD_REQUEST, "url is required").into_response());
    };

    let client = state.api.for_session(&session)?;
    client.mark_as_read(&url).await?;
    info!(url = %url, "Marked as read");
    Ok("ok".into_response())
}

/// Mark every entry on the first page read, one after another. Stops at the
/// first failure.
async fn mark_all_read(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, AppError> {
    let before = state.load_session(&headers);
    if !before.is_logged_in() {
        return Ok(StatusCode::FORBIDDEN.into_response());
    }
    let mut session = before.clone();

    let client = state.api.for_session(&session)?;
    let username = ensure_username(&client, &mut session).await?;
    let entries = client.fetch_bookmarks(&username, 1).await?;
    for entry in &entries {
        client.mark_as_read(&entry.url).await?;
    }
    info!(count = entries.len(), "Marked all entries as read");

    Ok(state.respond(&before, &session, Redirect::to("/"))?)
}

async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        MAIN_JS,
    )
}
