use axum::http::{header, HeaderMap};
use readlater_core::DeviceClass;

/// User-Agent fragments that get the mobile authorization page
const SMARTPHONE_USER_AGENTS: &[&str] = &["iPhone", "iPod", "Android", "Windows Phone", "BlackBerry"];

pub fn from_user_agent(user_agent: &str) -> DeviceClass {
    if SMARTPHONE_USER_AGENTS
        .iter()
        .any(|fragment| user_agent.contains(fragment))
    {
        DeviceClass::Mobile
    } else {
        DeviceClass::Desktop
    }
}

/// Device class of the requesting browser; no User-Agent means desktop.
pub fn device_class(headers: &HeaderMap) -> DeviceClass {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(from_user_agent)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_user_agent() {
        assert_eq!(
            from_user_agent("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)"),
            DeviceClass::Mobile
        );
        assert_eq!(
            from_user_agent("Mozilla/5.0 (Linux; Android 14; Pixel 8)"),
            DeviceClass::Mobile
        );
        assert_eq!(
            from_user_agent("Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0"),
            DeviceClass::Desktop
        );
    }

    #[test]
    fn test_missing_user_agent_is_desktop() {
        assert_eq!(device_class(&HeaderMap::new()), DeviceClass::Desktop);
    }
}
