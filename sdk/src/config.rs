//! Client configuration.
//!
//! Built programmatically or loaded from `DEVGRID_`-prefixed environment
//! variables (`DEVGRID_API_KEY`, `DEVGRID_BASE_URL`, ...).

use std::time::Duration;

use serde::Deserialize;

use crate::error::Error;

/// Configuration for [`crate::Client`].
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Bearer token used on every request.
    pub api_key: String,

    /// API origin (default: `https://api.devgrid.dev`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds for ordinary calls (default: 30).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Per-request timeout in seconds for the long-poll status endpoint
    /// (default: 90). Must exceed the server's own long-poll budget, which is
    /// what produces the HTTP 408 continuation signal.
    #[serde(default = "default_long_poll_timeout_secs")]
    pub long_poll_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.devgrid.dev".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_long_poll_timeout_secs() -> u64 {
    90
}

impl ClientConfig {
    /// Build a config with defaults for everything but the key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            long_poll_timeout_secs: default_long_poll_timeout_secs(),
        }
    }

    /// Load from `DEVGRID_`-prefixed environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `DEVGRID_API_KEY` is unset or a variable fails to
    /// parse.
    pub fn from_env() -> Result<Self, Error> {
        envy::prefixed("DEVGRID_")
            .from_env::<Self>()
            .map_err(|e| Error::Config(e.to_string()))
    }

    /// Override the API origin.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub(crate) fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub(crate) fn long_poll_timeout(&self) -> Duration {
        Duration::from_secs(self.long_poll_timeout_secs)
    }

    /// # Errors
    ///
    /// Returns an error if any field would make the client unusable.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Config("api_key must not be empty".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "base_url must be an http(s) origin, got '{}'",
                self.base_url
            )));
        }
        if self.request_timeout_secs == 0 || self.long_poll_timeout_secs == 0 {
            return Err(Error::Config(
                "request timeouts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, unsafe_code)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn defaults_point_at_the_public_api() {
        let cfg = ClientConfig::new("dgk-test");
        assert_eq!(cfg.base_url, "https://api.devgrid.dev");
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.long_poll_timeout_secs, 90);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let cfg = ClientConfig::new("  ");
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let cfg = ClientConfig::new("dgk-test").with_base_url("ftp://api.devgrid.dev");
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut cfg = ClientConfig::new("dgk-test");
        cfg.request_timeout_secs = 0;
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    #[serial]
    fn from_env_reads_prefixed_variables() {
        // SAFETY: serialized against other env-mutating tests via #[serial]
        unsafe {
            std::env::set_var("DEVGRID_API_KEY", "dgk-env");
            std::env::set_var("DEVGRID_BASE_URL", "https://staging.devgrid.dev");
        }
        let cfg = ClientConfig::from_env().unwrap();
        assert_eq!(cfg.api_key, "dgk-env");
        assert_eq!(cfg.base_url, "https://staging.devgrid.dev");
        unsafe {
            std::env::remove_var("DEVGRID_API_KEY");
            std::env::remove_var("DEVGRID_BASE_URL");
        }
    }

    #[test]
    #[serial]
    fn from_env_requires_api_key() {
        // SAFETY: serialized against other env-mutating tests via #[serial]
        unsafe {
            std::env::remove_var("DEVGRID_API_KEY");
        }
        assert!(matches!(ClientConfig::from_env(), Err(Error::Config(_))));
    }
}
