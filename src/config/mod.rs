//! Application configuration management

use std::env;
use std::fmt;

use anyhow::{Context, Result};
use url::Url;

use crate::services::rate_limiter::RateLimitConfig;

/// Default XRPC service for session creation and reads
pub const DEFAULT_SERVICE_URL: &str = "https://bsky.social";

/// Largest page size the list endpoints accept
pub const MAX_PAGE_SIZE: u32 = 100;

/// Bluesky integration configuration loaded from environment variables
#[derive(Clone)]
pub struct Config {
    /// XRPC service base URL (no trailing `/xrpc`)
    pub service_url: String,

    /// Handle or DID used to create the session
    pub identifier: Option<String>,

    /// App password for the identifier
    pub app_password: Option<String>,

    /// Page size sent as `limit` on list endpoints
    pub page_size: u32,

    /// Maximum pages walked per listing, 0 = unbounded
    pub max_pages: usize,

    /// Per-request HTTP timeout in seconds
    pub request_timeout_secs: u64,

    /// Sustained outbound request rate
    pub requests_per_second: u32,

    /// Burst capacity above the sustained rate
    pub burst_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        let pacing = RateLimitConfig::default();
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            identifier: None,
            app_password: None,
            page_size: MAX_PAGE_SIZE,
            max_pages: 10_000,
            request_timeout_secs: 30,
            requests_per_second: pacing.requests_per_second,
            burst_size: pacing.burst_size,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("service_url", &self.service_url)
            .field("identifier", &self.identifier)
            .field("app_password", &self.app_password.as_ref().map(|_| "***"))
            .field("page_size", &self.page_size)
            .field("max_pages", &self.max_pages)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("requests_per_second", &self.requests_per_second)
            .field("burst_size", &self.burst_size)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Missing credentials are not an error here; the first call that needs a
    /// session reports them.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let service_url = lookup("BLUESKY_SERVICE_URL").unwrap_or(defaults.service_url);
        Url::parse(&service_url).context("Invalid BLUESKY_SERVICE_URL")?;

        let page_size = match lookup("BLUESKY_PAGE_SIZE") {
            Some(v) => v.parse().context("Invalid BLUESKY_PAGE_SIZE")?,
            None => defaults.page_size,
        };
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            anyhow::bail!("BLUESKY_PAGE_SIZE must be between 1 and {MAX_PAGE_SIZE}, got {page_size}");
        }

        Ok(Self {
            service_url: service_url.trim_end_matches('/').to_string(),

            identifier: lookup("BLUESKY_IDENTIFIER").filter(|v| !v.is_empty()),

            app_password: lookup("BLUESKY_APP_PASSWORD").filter(|v| !v.is_empty()),

            page_size,

            max_pages: match lookup("BLUESKY_MAX_PAGES") {
                Some(v) => v.parse().context("Invalid BLUESKY_MAX_PAGES")?,
                None => defaults.max_pages,
            },

            request_timeout_secs: match lookup("BLUESKY_REQUEST_TIMEOUT_SECS") {
                Some(v) => v.parse().context("Invalid BLUESKY_REQUEST_TIMEOUT_SECS")?,
                None => defaults.request_timeout_secs,
            },

            requests_per_second: match lookup("BLUESKY_REQUESTS_PER_SECOND") {
                Some(v) => v.parse().context("Invalid BLUESKY_REQUESTS_PER_SECOND")?,
                None => defaults.requests_per_second,
            },

            burst_size: match lookup("BLUESKY_BURST_SIZE") {
                Some(v) => v.parse().context("Invalid BLUESKY_BURST_SIZE")?,
                None => defaults.burst_size,
            },
        })
    }

    /// Point the client at a different XRPC service
    pub fn with_service_url(mut self, service_url: impl Into<String>) -> Self {
        self.service_url = service_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the login identity
    pub fn with_credentials(
        mut self,
        identifier: impl Into<String>,
        app_password: impl Into<String>,
    ) -> Self {
        self.identifier = Some(identifier.into());
        self.app_password = Some(app_password.into());
        self
    }

    /// Outbound pacing for the HTTP client
    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            requests_per_second: self.requests_per_second,
            burst_size: self.burst_size,
        }
    }

    /// Both identifier and app password are present
    pub fn is_configured(&self) -> bool {
        self.identifier.is_some() && self.app_password.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_env() {
        let config = load(&[]).unwrap();
        assert_eq!(config.service_url, DEFAULT_SERVICE_URL);
        assert_eq!(config.page_size, 100);
        assert_eq!(config.max_pages, 10_000);
        assert!(!config.is_configured());
    }

    #[test]
    fn test_pacing_defaults_follow_rate_limiter() {
        let pacing = load(&[]).unwrap().rate_limit();
        assert_eq!(pacing.requests_per_second, RateLimitConfig::default().requests_per_second);
        assert_eq!(pacing.burst_size, RateLimitConfig::default().burst_size);

        let pacing = load(&[("BLUESKY_REQUESTS_PER_SECOND", "3"), ("BLUESKY_BURST_SIZE", "5")])
            .unwrap()
            .rate_limit();
        assert_eq!(pacing.requests_per_second, 3);
        assert_eq!(pacing.burst_size, 5);
    }

    #[test]
    fn test_credentials_from_env() {
        let config = load(&[
            ("BLUESKY_IDENTIFIER", "user.test"),
            ("BLUESKY_APP_PASSWORD", "pw"),
            ("BLUESKY_SERVICE_URL", "http://localhost:2583/"),
        ])
        .unwrap();
        assert!(config.is_configured());
        assert_eq!(config.identifier.as_deref(), Some("user.test"));
        assert_eq!(config.service_url, "http://localhost:2583");
    }

    #[test]
    fn test_empty_secret_is_not_configured() {
        let config = load(&[("BLUESKY_IDENTIFIER", "user.test"), ("BLUESKY_APP_PASSWORD", "")]).unwrap();
        assert!(!config.is_configured());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(load(&[("BLUESKY_PAGE_SIZE", "0")]).is_err());
        assert!(load(&[("BLUESKY_PAGE_SIZE", "101")]).is_err());
        assert!(load(&[("BLUESKY_MAX_PAGES", "lots")]).is_err());
        assert!(load(&[("BLUESKY_SERVICE_URL", "not a url")]).is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = Config::default().with_credentials("user.test", "hunter2");
        let printed = format!("{config:?}");
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("user.test"));
    }
}
