//! OAuth 1.0a request signing (RFC 5849, HMAC-SHA1).
//!
//! The signer covers every query parameter of the request URL plus the
//! `oauth_*` protocol parameters, and renders the result as an
//! `Authorization: OAuth ...` header value. Request parameters are always
//! carried in the query string so there is no form body to sign.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::{distributions::Alphanumeric, Rng};
use reqwest::Method;
use sha1::Sha1;
use url::Url;

use super::{ConsumerCredentials, TokenPair};
use crate::api::ApiError;

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";
const NONCE_LENGTH: usize = 32;

/// Signs one request with the consumer credentials and, once the handshake
/// has produced them, a token pair and verifier.
#[derive(Debug, Clone, Copy)]
pub struct RequestSigner<'a> {
    consumer: &'a ConsumerCredentials,
    token: Option<&'a TokenPair>,
    verifier: Option<&'a str>,
}

impl<'a> RequestSigner<'a> {
    pub fn new(consumer: &'a ConsumerCredentials) -> Self {
        Self {
            consumer,
            token: None,
            verifier: None,
        }
    }

    pub fn with_token(mut self, token: &'a TokenPair) -> Self {
        self.token = Some(token);
        self
    }

    pub fn with_verifier(mut self, verifier: &'a str) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Build the `Authorization` header value with a fresh nonce and the
    /// current time.
    pub fn authorization(&self, method: &Method, url: &Url) -> Result<String, ApiError> {
        let nonce = generate_nonce();
        self.authorization_at(method, url, &nonce, Utc::now().timestamp())
    }

    pub fn authorization_at(
        &self,
        method: &Method,
        url: &Url,
        nonce: &str,
        timestamp: i64,
    ) -> Result<String, ApiError> {
        let mut oauth_params: Vec<(&str, String)> = vec![
            ("oauth_consumer_key", self.consumer.key.clone()),
            ("oauth_nonce", nonce.to_string()),
            ("oauth_signature_method", SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp", timestamp.to_string()),
            ("oauth_version", OAUTH_VERSION.to_string()),
        ];
        if let Some(token) = self.token {
            oauth_params.push(("oauth_token", token.token.clone()));
        }
        if let Some(verifier) = self.verifier {
            oauth_params.push(("oauth_verifier", verifier.to_string()));
        }

        let mut params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        params.extend(oauth_params.iter().map(|(k, v)| (k.to_string(), v.clone())));

        let base = signature_base_string(method, url, &params);
        let token_secret = self.token.map(|t| t.secret.as_str()).unwrap_or("");
        let signature = hmac_sha1(&base, &self.consumer.secret, token_secret)?;
        oauth_params.push(("oauth_signature", signature));

        let fields = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!("OAuth {fields}"))
    }
}

/// RFC 3986 percent-encoding: everything but `A-Z a-z 0-9 - . _ ~`.
pub fn encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Scheme, host, non-default port and path; no query or fragment.
pub fn base_string_uri(url: &Url) -> String {
    let scheme = url.scheme().to_ascii_lowercase();
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    match url.port() {
        Some(port) => format!("{}://{}:{}{}", scheme, host, port, url.path()),
        None => format!("{}://{}{}", scheme, host, url.path()),
    }
}

pub fn signature_base_string(method: &Method, url: &Url, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();

    let normalized = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.as_str(),
        encode(&base_string_uri(url)),
        encode(&normalized)
    )
}

fn hmac_sha1(base: &str, consumer_secret: &str, token_secret: &str) -> Result<String, ApiError> {
    let key = format!("{}&{}", encode(consumer_secret), encode(token_secret));
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| ApiError::Signing(e.to_string()))?;
    mac.update(base.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}
