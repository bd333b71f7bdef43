//! Upstream HTTP gateway and shared client utilities.

use std::borrow::Cow;
use std::time::Duration;

use crate::error::MyGeneError;

pub(crate) mod mygene;

const ERROR_BODY_MAX_BYTES: usize = 2048;
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub(crate) const TIMEOUT_ENV: &str = "MYGENE_MCP_TIMEOUT_SECS";

pub(crate) fn env_base(default: &'static str, env_var: &str) -> Cow<'static, str> {
    std::env::var(env_var)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(Cow::Owned)
        .unwrap_or_else(|| Cow::Borrowed(default))
}

fn parse_timeout_secs(raw: Option<&str>) -> Duration {
    let secs = raw
        .map(str::trim)
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

pub(crate) fn env_timeout() -> Duration {
    parse_timeout_secs(std::env::var(TIMEOUT_ENV).ok().as_deref())
}

/// Builds the HTTP client used by the gateway.
///
/// Idle connections are never kept, so every request opens and tears down
/// its own connection. There is no retry or cache layer.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, MyGeneError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .pool_max_idle_per_host(0)
        .user_agent(concat!("mygene-mcp/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(MyGeneError::HttpClientInit)
}

pub(crate) fn body_excerpt(bytes: &[u8]) -> String {
    let full = String::from_utf8_lossy(bytes);

    let truncated: &str = if full.len() > ERROR_BODY_MAX_BYTES {
        let mut end = ERROR_BODY_MAX_BYTES;
        while end > 0 && !full.is_char_boundary(end) {
            end -= 1;
        }
        &full[..end]
    } else {
        full.as_ref()
    };

    let mut s = truncated.trim().replace(['\n', '\r', '\t'], " ");
    if full.len() > ERROR_BODY_MAX_BYTES {
        s.push_str(" …");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_timeout_secs_defaults_when_missing_or_invalid() {
        assert_eq!(parse_timeout_secs(None), Duration::from_secs(30));
        assert_eq!(parse_timeout_secs(Some("abc")), Duration::from_secs(30));
        assert_eq!(parse_timeout_secs(Some("0")), Duration::from_secs(30));
        assert_eq!(parse_timeout_secs(Some(" 5 ")), Duration::from_secs(5));
    }

    #[test]
    fn body_excerpt_flattens_whitespace() {
        assert_eq!(body_excerpt(b"line one\nline\ttwo"), "line one line two");
    }

    #[test]
    fn body_excerpt_truncates_long_bodies() {
        let body = "x".repeat(ERROR_BODY_MAX_BYTES + 10);
        let excerpt = body_excerpt(body.as_bytes());
        assert!(excerpt.ends_with(" …"));
        assert!(excerpt.len() < body.len());
    }

    #[test]
    fn env_base_falls_back_to_default_for_unset_var() {
        let base = env_base("https://mygene.info/v3", "MYGENE_MCP_TEST_UNSET_BASE");
        assert_eq!(base, "https://mygene.info/v3");
    }
}
