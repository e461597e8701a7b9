use serde::{Deserialize, Serialize};

/// Application-wide OAuth consumer key and secret.
#[derive(Debug, Clone)]
pub struct ConsumerCredentials {
    pub key: String,
    pub secret: String,
}

impl ConsumerCredentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }
}

/// An OAuth token and its secret, either a temporary request token or an
/// access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub token: String,
    pub secret: String,
}

impl TokenPair {
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
        }
    }

    /// Build a pair only when both halves are non-empty. A half-filled pair
    /// cannot sign a request.
    pub fn complete(token: &str, secret: &str) -> Option<Self> {
        if token.is_empty() || secret.is_empty() {
            None
        } else {
            Some(Self::new(token, secret))
        }
    }
}
