//! Session cookie sealing.
//!
//! The session secret is stretched with Argon2 into a ChaCha20-Poly1305 key
//! once at startup. A sealed value is `base64url(nonce || ciphertext)` of
//! the session's JSON form.

use argon2::Argon2;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::RngCore;
use thiserror::Error;

use super::SessionState;

/// Fixed salt; the secret itself is the only per-deployment input.
const KEY_SALT: &[u8] = b"readlater-session-cookie-v1";
const NONCE_LEN: usize = 12;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Session serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Session encryption failed")]
    Encrypt,
}

pub struct SessionSealer {
    cipher: ChaCha20Poly1305,
}

impl std::fmt::Debug for SessionSealer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSealer").finish_non_exhaustive()
    }
}

impl SessionSealer {
    pub fn new(secret: &str) -> Result<Self, SessionError> {
        let mut key = [0u8; 32];
        Argon2::default()
            .hash_password_into(secret.as_bytes(), KEY_SALT, &mut key)
            .map_err(|e| SessionError::KeyDerivation(e.to_string()))?;

        Ok(Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(&key)),
        })
    }

    pub fn seal(&self, session: &SessionState) -> Result<String, SessionError> {
        let plaintext = serde_json::to_vec(session)?;

        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_ref())
            .map_err(|_| SessionError::Encrypt)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }

    /// Open a sealed value. Anything that does not decrypt (tampered,
    /// truncated, sealed under another secret) yields `None`.
    pub fn open(&self, sealed: &str) -> Option<SessionState> {
        let bytes = URL_SAFE_NO_PAD.decode(sealed).ok()?;
        if bytes.len() <= NONCE_LEN {
            return None;
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .ok()?;
        serde_json::from_slice(&plaintext).ok()
    }
}
