//! Client configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_REFRESH_COOKIE_NAME: &str = "refreshToken";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timeouts {
    /// Whole-request timeout. `None` leaves the transport default in place.
    pub request: Option<Duration>,
    pub connect: Option<Duration>,
    /// Upper bound on one refresh call. `None` waits indefinitely.
    pub refresh: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub refresh_cookie_name: String,
    pub timeouts: Timeouts,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_owned(),
            refresh_cookie_name: DEFAULT_REFRESH_COOKIE_NAME.to_owned(),
            timeouts: Timeouts::default(),
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// All optional:
    /// - `API_BASE_URL`: default `http://localhost:8000/api/v1`
    /// - `REFRESH_COOKIE_NAME`: default `refreshToken`
    /// - `API_REQUEST_TIMEOUT_SECS`, `API_CONNECT_TIMEOUT_SECS`: unset keeps transport defaults
    /// - `API_REFRESH_TIMEOUT_SECS`: unset means the refresh call is not bounded
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var("API_BASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        let refresh_cookie_name = std::env::var("REFRESH_COOKIE_NAME")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REFRESH_COOKIE_NAME.to_owned());
        let timeouts = Timeouts {
            request: env_secs("API_REQUEST_TIMEOUT_SECS"),
            connect: env_secs("API_CONNECT_TIMEOUT_SECS"),
            refresh: env_secs("API_REFRESH_TIMEOUT_SECS"),
        };

        Self::new(base_url).with_cookie_name(refresh_cookie_name).with_timeouts(timeouts)
    }

    /// Config for `base_url` with every other setting at its default.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_owned();
        Self { base_url, ..Self::default() }
    }

    #[must_use]
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.refresh_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Absolute URL for a path below the base URL.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.is_empty() {
            return self.base_url.clone();
        }
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

fn env_secs(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
