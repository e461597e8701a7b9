//! Session cookie plumbing.

use axum::http::{header, HeaderMap};

pub const SESSION_COOKIE: &str = "readlater_session";

/// Value of the named cookie across all `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// `Set-Cookie` value for a sealed session. `secure` adds the `Secure`
/// attribute for apps served over https.
pub fn set_cookie(sealed: &str, secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE}={sealed}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, "theme=dark; readlater_session=abc-123".parse().unwrap());
        headers.append(header::COOKIE, "other=1".parse().unwrap());

        assert_eq!(cookie_value(&headers, SESSION_COOKIE), Some("abc-123"));
        assert_eq!(cookie_value(&headers, "other"), Some("1"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_set_cookie_attributes() {
        let cookie = set_cookie("sealed", false);
        assert!(cookie.starts_with("readlater_session=sealed;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(!cookie.contains("Secure"));

        assert!(set_cookie("sealed", true).ends_with("; Secure"));
    }
}
