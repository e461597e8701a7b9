//! Application configuration management.
//!
//! Configuration comes from an optional JSON file at
//! `~/.config/readlater/config.json`, overridden field by field by
//! `READLATER_*` environment variables. Consumer credentials, the callback
//! URL and the session secret must end up non-empty.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::ConsumerCredentials;

/// Application name used for the config directory path
const APP_NAME: &str = "readlater";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_SCOPE: &str = "read_public,read_private,write_public";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Provider URLs. Defaults point at the public service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub request_token_url: String,
    pub authorize_url: String,
    pub authorize_url_mobile: String,
    pub access_token_url: String,
    /// Base for `/rest/1/...` calls
    pub api_base: String,
    /// Base for `/{username}/bookmark.rss`
    pub feed_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            request_token_url: "https://www.hatena.com/oauth/initiate".to_string(),
            authorize_url: "https://www.hatena.ne.jp/oauth/authorize".to_string(),
            authorize_url_mobile: "https://www.hatena.ne.jp/touch/oauth/authorize".to_string(),
            access_token_url: "https://www.hatena.com/oauth/token".to_string(),
            api_base: "https://bookmark.hatenaapis.com".to_string(),
            feed_base: "https://b.hatena.ne.jp".to_string(),
        }
    }
}

impl Endpoints {
    /// Every endpoint under a single origin, laid out like the provider's
    /// own paths. Used to point the client at a local stand-in.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            request_token_url: format!("{base}/oauth/initiate"),
            authorize_url: format!("{base}/oauth/authorize"),
            authorize_url_mobile: format!("{base}/touch/oauth/authorize"),
            access_token_url: format!("{base}/oauth/token"),
            api_base: base.to_string(),
            feed_base: base.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub callback_url: String,
    pub scope: String,
    /// Secret the session cookie key is derived from
    pub session_secret: String,
    pub bind_addr: String,
    pub endpoints: Endpoints,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            consumer_key: String::new(),
            consumer_secret: String::new(),
            callback_url: String::new(),
            scope: DEFAULT_SCOPE.to_string(),
            session_secret: String::new(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            endpoints: Endpoints::default(),
        }
    }
}

impl Config {
    /// Load the config file (if any), apply environment overrides and
    /// validate.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Ok(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Apply `READLATER_*` overrides. `lookup` is `std::env::var` in
    /// production.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fields: [(&str, &mut String); 12] = [
            ("READLATER_CONSUMER_KEY", &mut self.consumer_key),
            ("READLATER_CONSUMER_SECRET", &mut self.consumer_secret),
            ("READLATER_CALLBACK_URL", &mut self.callback_url),
            ("READLATER_SCOPE", &mut self.scope),
            ("READLATER_SESSION_SECRET", &mut self.session_secret),
            ("READLATER_BIND_ADDR", &mut self.bind_addr),
            ("READLATER_REQUEST_TOKEN_URL", &mut self.endpoints.request_token_url),
            ("READLATER_AUTHORIZE_URL", &mut self.endpoints.authorize_url),
            ("READLATER_AUTHORIZE_URL_MOBILE", &mut self.endpoints.authorize_url_mobile),
            ("READLATER_ACCESS_TOKEN_URL", &mut self.endpoints.access_token_url),
            ("READLATER_API_BASE", &mut self.endpoints.api_base),
            ("READLATER_FEED_BASE", &mut self.endpoints.feed_base),
        ];
        for (name, field) in fields {
            if let Some(value) = lookup(name) {
                *field = value;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("consumer_key", &self.consumer_key),
            ("consumer_secret", &self.consumer_secret),
            ("callback_url", &self.callback_url),
            ("session_secret", &self.session_secret),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                bail!("Missing required configuration value: {name}");
            }
        }
        Ok(())
    }

    pub fn consumer(&self) -> ConsumerCredentials {
        ConsumerCredentials::new(&self.consumer_key, &self.consumer_secret)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let vars = env(&[
            ("READLATER_CONSUMER_KEY", "key"),
            ("READLATER_CONSUMER_SECRET", "secret"),
            ("READLATER_CALLBACK_URL", "http://localhost:5000/oauth/callback"),
            ("READLATER_SESSION_SECRET", "s3cret"),
            ("READLATER_API_BASE", "http://127.0.0.1:9000"),
        ]);
        let mut config = Config::default();
        config.apply_overrides(|name| vars.get(name).cloned());

        assert_eq!(config.consumer_key, "key");
        assert_eq!(config.endpoints.api_base, "http://127.0.0.1:9000");
        assert_eq!(config.scope, DEFAULT_SCOPE);
        assert_eq!(config.endpoints.feed_base, "https://b.hatena.ne.jp");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_secret() {
        let config = Config {
            consumer_key: "key".into(),
            consumer_secret: "secret".into(),
            callback_url: "http://localhost/cb".into(),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("session_secret"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"consumer_key":"k","endpoints":{"api_base":"http://localhost:1"}}"#,
        )
        .unwrap();
        assert_eq!(config.consumer_key, "k");
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.endpoints.api_base, "http://localhost:1");
        assert_eq!(
            config.endpoints.request_token_url,
            "https://www.hatena.com/oauth/initiate"
        );
    }

    #[test]
    fn test_endpoints_with_base() {
        let endpoints = Endpoints::with_base("http://127.0.0.1:4000/");
        assert_eq!(endpoints.request_token_url, "http://127.0.0.1:4000/oauth/initiate");
        assert_eq!(endpoints.access_token_url, "http://127.0.0.1:4000/oauth/token");
        assert_eq!(endpoints.api_base, "http://127.0.0.1:4000");
    }
}
