//! Three-legged OAuth1 handshake: request token, user authorization
//! redirect, access-token exchange.

use reqwest::Method;
use tracing::debug;

use super::{RequestSigner, TokenPair};
use crate::api::{ApiClient, ApiError};
use crate::config::Endpoints;

/// Which authorization page the user should be sent to. Decided by the web
/// layer; the core never looks at request headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceClass {
    #[default]
    Desktop,
    Mobile,
}

impl Endpoints {
    /// Authorization page URL carrying the request token.
    pub fn authorize_url(&self, request_token: &str, device: DeviceClass) -> String {
        let base = match device {
            DeviceClass::Desktop => &self.authorize_url,
            DeviceClass::Mobile => &self.authorize_url_mobile,
        };
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("oauth_token", request_token)
            .finish();
        format!("{base}?{query}")
    }
}

/// Pull `oauth_token` and `oauth_token_secret` out of a form-encoded token
/// endpoint response.
pub fn parse_token_response(body: &str) -> Result<TokenPair, ApiError> {
    let mut token = None;
    let mut secret = None;
    for (key, value) in url::form_urlencoded::parse(body.as_bytes()) {
        match key.as_ref() {
            "oauth_token" if token.is_none() => token = Some(value.into_owned()),
            "oauth_token_secret" if secret.is_none() => secret = Some(value.into_owned()),
            _ => {}
        }
    }

    match (token, secret) {
        (Some(token), Some(secret)) => TokenPair::complete(&token, &secret)
            .ok_or_else(|| ApiError::Auth("empty oauth_token or oauth_token_secret".to_string())),
        (None, _) => Err(ApiError::Auth("response has no oauth_token".to_string())),
        (_, None) => Err(ApiError::Auth("response has no oauth_token_secret".to_string())),
    }
}

/// Any failure of a token endpoint is an authentication failure, except
/// transport errors which stay as they are.
fn into_auth_error(err: ApiError) -> ApiError {
    match err {
        ApiError::Network(_) | ApiError::Auth(_) => err,
        other => ApiError::Auth(other.to_string()),
    }
}

impl ApiClient {
    /// Step 1: obtain a request token, signed with the consumer credentials
    /// only.
    pub async fn request_token(&self, callback_url: &str, scope: &str) -> Result<TokenPair, ApiError> {
        let url = self.endpoints().request_token_url.clone();
        let params = [("oauth_callback", callback_url), ("scope", scope)];
        let signer = RequestSigner::new(self.consumer());

        let response = self
            .send_signed(Method::POST, &url, &params, signer)
            .await
            .map_err(into_auth_error)?;
        let body = response.text().await?;
        let pair = parse_token_response(&body)?;
        debug!("Obtained request token");
        Ok(pair)
    }

    /// Step 2: where to send the user to approve the request token.
    pub fn authorize_url(&self, request_token: &str, device: DeviceClass) -> String {
        self.endpoints().authorize_url(request_token, device)
    }

    /// Step 3: trade the approved request token and verifier for an access
    /// token.
    pub async fn exchange_access_token(
        &self,
        request_token: &TokenPair,
        verifier: &str,
    ) -> Result<TokenPair, ApiError> {
        let url = self.endpoints().access_token_url.clone();
        let signer = RequestSigner::new(self.consumer())
            .with_token(request_token)
            .with_verifier(verifier);

        let response = self
            .send_signed(Method::POST, &url, &[], signer)
            .await
            .map_err(into_auth_error)?;
        let body = response.text().await?;
        let pair = parse_token_response(&body)?;
        debug!("Exchanged verifier for access token");
        Ok(pair)
    }
}
