//! Authentication module for the OAuth1 handshake and session state.
//!
//! This module provides:
//! - `RequestSigner`: RFC 5849 HMAC-SHA1 request signing
//! - the three-legged handshake (`request_token`, `authorize_url`,
//!   `exchange_access_token`) as `ApiClient` methods
//! - `SessionState`: the per-user token pair, owned by the web layer
//! - `SessionSealer`: encrypts the session into a cookie value

pub mod credentials;
pub mod oauth;
pub mod seal;
pub mod session;
pub mod signature;

pub use credentials::{ConsumerCredentials, TokenPair};
pub use oauth::{parse_token_response, DeviceClass};
pub use seal::{SessionError, SessionSealer};
pub use session::{AuthState, SessionState};
pub use signature::RequestSigner;
