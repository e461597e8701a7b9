//! Signed HTTP client for the bookmarking provider.
//!
//! Every request carries a fixed User-Agent and an OAuth1 `Authorization`
//! header, and every non-2xx response becomes an `ApiError`, so call sites
//! never inspect status codes themselves. There are no retries and no
//! timeout override.

use reqwest::{header, Client, Method, Response};
use tracing::debug;
use url::Url;

use crate::auth::{ConsumerCredentials, RequestSigner, SessionState, TokenPair};
use crate::config::{Config, Endpoints};

use super::ApiError;

/// User-Agent sent with every request
pub const USER_AGENT: &str = concat!("readlater/", env!("CARGO_PKG_VERSION"));

/// API client for the bookmarking provider.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    consumer: ConsumerCredentials,
    endpoints: Endpoints,
    token: Option<TokenPair>,
}

impl ApiClient {
    /// Create a client that can only make consumer-signed calls until a
    /// token pair is attached.
    pub fn new(consumer: ConsumerCredentials, endpoints: Endpoints) -> Result<Self, ApiError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            consumer,
            endpoints,
            token: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(config.consumer(), config.endpoints.clone())
    }

    /// Create a new ApiClient with the given access token, sharing the
    /// connection pool.
    pub fn with_token(&self, token: TokenPair) -> Self {
        Self {
            client: self.client.clone(),
            consumer: self.consumer.clone(),
            endpoints: self.endpoints.clone(),
            token: Some(token),
        }
    }

    /// Client for the session's access token. A session without a complete
    /// token pair is not authenticated and gets no client.
    pub fn for_session(&self, session: &SessionState) -> Result<Self, ApiError> {
        session
            .access_token()
            .map(|token| self.with_token(token))
            .ok_or(ApiError::NotAuthenticated)
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub(crate) fn consumer(&self) -> &ConsumerCredentials {
        &self.consumer
    }

    fn access_token(&self) -> Result<&TokenPair, ApiError> {
        self.token.as_ref().ok_or(ApiError::NotAuthenticated)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Send a request with `params` in the query string, signed by `signer`.
    pub(crate) async fn send_signed(
        &self,
        method: Method,
        url: &str,
        params: &[(&str, &str)],
        signer: RequestSigner<'_>,
    ) -> Result<Response, ApiError> {
        let mut url = Url::parse(url)
            .map_err(|e| ApiError::InvalidResponse(format!("Bad request URL {url}: {e}")))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.iter());
        }

        let authorization = signer.authorization(&method, &url)?;
        debug!(method = %method, url = %url, "Sending signed request");

        let response = self
            .client
            .request(method, url)
            .header(header::AUTHORIZATION, authorization)
            .send()
            .await?;

        debug!(status = %response.status(), "Received response");
        Self::check_response(response).await
    }

    /// GET signed with the attached access token.
    pub(crate) async fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<Response, ApiError> {
        let token = self.access_token()?;
        let signer = RequestSigner::new(&self.consumer).with_token(token);
        self.send_signed(Method::GET, url, params, signer).await
    }

    /// POST signed with the attached access token.
    pub(crate) async fn post(&self, url: &str, params: &[(&str, &str)]) -> Result<Response, ApiError> {
        let token = self.access_token()?;
        let signer = RequestSigner::new(&self.consumer).with_token(token);
        self.send_signed(Method::POST, url, params, signer).await
    }

    /// Fetch the logged-in user's name from `/rest/1/my`.
    pub async fn fetch_username(&self) -> Result<String, ApiError> {
        let url = format!("{}/rest/1/my", self.endpoints.api_base);
        let response = self.get(&url, &[]).await?;
        let profile: MyProfile = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse profile: {e}")))?;
        Ok(profile.name)
    }
}

#[derive(Debug, serde::Deserialize)]
struct MyProfile {
    name: String,
}
