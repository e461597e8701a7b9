use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use readlater_core::{ApiClient, Config, SessionSealer, SessionState};

use crate::session::{cookie_value, set_cookie, SESSION_COOKIE};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Consumer-only client; per-request clients are derived from it
    pub api: ApiClient,
    sealer: Arc<SessionSealer>,
    /// Mark the session cookie `Secure`; set when the callback URL is https
    secure_cookie: bool,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::from_config(&config).context("Failed to build API client")?;
        let sealer =
            SessionSealer::new(&config.session_secret).context("Failed to derive session key")?;

        let secure_cookie = config.callback_url.starts_with("https://");

        Ok(Self {
            config: Arc::new(config),
            api,
            sealer: Arc::new(sealer),
            secure_cookie,
        })
    }

    /// The request's session; missing or unreadable cookies give an empty
    /// one.
    pub fn load_session(&self, headers: &HeaderMap) -> SessionState {
        cookie_value(headers, SESSION_COOKIE)
            .and_then(|value| self.sealer.open(value))
            .unwrap_or_default()
    }

    pub fn session_cookie(&self, session: &SessionState) -> Result<String> {
        let sealed = self.sealer.seal(session).context("Failed to seal session")?;
        Ok(set_cookie(&sealed, self.secure_cookie))
    }

    /// `body` with the session stored in the response cookie.
    pub fn with_session(&self, session: &SessionState, body: impl IntoResponse) -> Result<Response> {
        let cookie = self.session_cookie(session)?;
        Ok(([(header::SET_COOKIE, cookie)], body).into_response())
    }

    /// Like `with_session`, but only touches the cookie when the handler
    /// changed the session.
    pub fn respond(
        &self,
        before: &SessionState,
        after: &SessionState,
        body: impl IntoResponse,
    ) -> Result<Response> {
        if before == after {
            Ok(body.into_response())
        } else {
            self.with_session(after, body)
        }
    }
}
