//! Facade configuration.
//!
//! # Design
//! Configuration is an explicit value handed to `HttpClient` at construction.
//! The client copies what it needs, so later changes to the config (or the
//! environment) never reach a live client.

use std::env;
use std::time::Duration;

use serde::Deserialize;

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/platform-webapp/rest/mockTenant/opb/remoting/";

pub const BASE_URL_ENV: &str = "HTTP_FACADE_BASE_URL";
pub const TIMEOUT_ENV: &str = "HTTP_FACADE_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prefix every request path is appended to, verbatim.
    #[serde(alias = "base.url")]
    pub base_url: String,
    /// Headers sent with every request before caller headers are applied.
    pub default_headers: Vec<(String, String)>,
    /// Whole-exchange timeout enforced by the HTTP engine. `None` waits forever.
    pub timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_headers: Vec::new(),
            timeout_ms: None,
        }
    }
}

impl ClientConfig {
    /// Read `HTTP_FACADE_BASE_URL` and `HTTP_FACADE_TIMEOUT_MS`, falling back
    /// to the defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            base_url: lookup(BASE_URL_ENV).unwrap_or(defaults.base_url),
            timeout_ms: lookup(TIMEOUT_ENV)
                .and_then(|v| v.trim().parse().ok())
                .or(defaults.timeout_ms),
            default_headers: defaults.default_headers,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}
