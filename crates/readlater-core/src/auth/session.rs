use serde::{Deserialize, Serialize};

use super::TokenPair;

/// Where a session stands in the OAuth handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    /// Request-token secret stored, waiting for the provider to redirect
    /// back with a verifier
    PendingAuthorization,
    Authenticated,
}

/// Per-user session value. The web layer loads it at the start of a request
/// and stores whatever the handler returns; the core never keeps one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub oauth_token: String,
    #[serde(default)]
    pub oauth_token_secret: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl SessionState {
    /// Logged in only when both the token and its secret are present.
    pub fn is_logged_in(&self) -> bool {
        !self.oauth_token.is_empty() && !self.oauth_token_secret.is_empty()
    }

    pub fn auth_state(&self) -> AuthState {
        if self.is_logged_in() {
            AuthState::Authenticated
        } else if self.oauth_token.is_empty() && !self.oauth_token_secret.is_empty() {
            AuthState::PendingAuthorization
        } else {
            AuthState::Unauthenticated
        }
    }

    /// The access token pair, if the session is logged in.
    pub fn access_token(&self) -> Option<TokenPair> {
        if self.is_logged_in() {
            TokenPair::complete(&self.oauth_token, &self.oauth_token_secret)
        } else {
            None
        }
    }

    /// Secret of the request token issued at the start of the handshake.
    pub fn pending_secret(&self) -> Option<&str> {
        match self.auth_state() {
            AuthState::PendingAuthorization => Some(self.oauth_token_secret.as_str()),
            _ => None,
        }
    }

    /// Unauthenticated -> PendingAuthorization. Only the secret is kept; the
    /// token itself comes back on the callback URL.
    pub fn begin_authorization(self, request_token: &TokenPair) -> Self {
        Self {
            oauth_token: String::new(),
            oauth_token_secret: request_token.secret.clone(),
            username: None,
        }
    }

    /// PendingAuthorization -> Authenticated.
    pub fn complete_authorization(self, access_token: TokenPair) -> Self {
        Self {
            oauth_token: access_token.token,
            oauth_token_secret: access_token.secret,
            username: None,
        }
    }

    /// Back to Unauthenticated from any state.
    pub fn flush(self) -> Self {
        Self::default()
    }
}
