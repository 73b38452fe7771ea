//! Client configuration
//!
//! Settings can be deserialized from any serde source or loaded from
//! `INFOBLOX_*` environment variables.

use crate::error::InfobloxError;
use serde::Deserialize;
use std::env;

/// Default WAPI version used in the base path (`/wapi/v2.7`)
pub const DEFAULT_WAPI_VERSION: &str = "2.7";

/// Default cap sent as `_max_results` on searches
pub const DEFAULT_MAX_RESULTS: u32 = 1000;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for an Infoblox appliance
#[derive(Clone, Deserialize)]
pub struct InfobloxConfig {
    /// Appliance URL, e.g. `https://gm.example.com`
    pub url: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_wapi_version")]
    pub wapi_version: String,
    /// Set to false for appliances with self-signed certificates
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Upper bound on results per search, also the page size for paged searches
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

fn default_wapi_version() -> String {
    DEFAULT_WAPI_VERSION.to_string()
}

fn default_verify_tls() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_results() -> u32 {
    DEFAULT_MAX_RESULTS
}

// Keeps the password out of logs.
impl std::fmt::Debug for InfobloxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InfobloxConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("wapi_version", &self.wapi_version)
            .field("verify_tls", &self.verify_tls)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_results", &self.max_results)
            .finish()
    }
}

impl InfobloxConfig {
    /// Create a configuration with default WAPI version, TLS, timeout and limits
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            wapi_version: default_wapi_version(),
            verify_tls: default_verify_tls(),
            timeout_secs: default_timeout_secs(),
            max_results: default_max_results(),
        }
    }

    /// Load configuration from environment variables
    ///
    /// Required: `INFOBLOX_URL`, `INFOBLOX_USERNAME`, `INFOBLOX_PASSWORD`.
    /// Optional: `INFOBLOX_WAPI_VERSION`, `INFOBLOX_SSL_VERIFY`,
    /// `INFOBLOX_TIMEOUT_SECS`, `INFOBLOX_MAX_RESULTS`.
    pub fn from_env() -> Result<Self, InfobloxError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, InfobloxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| InfobloxError::Config(format!("{} environment variable is required", key)))
        };

        let mut config = Self::new(
            required("INFOBLOX_URL")?,
            required("INFOBLOX_USERNAME")?,
            required("INFOBLOX_PASSWORD")?,
        );

        if let Some(version) = lookup("INFOBLOX_WAPI_VERSION") {
            config.wapi_version = version;
        }
        if let Some(verify) = lookup("INFOBLOX_SSL_VERIFY") {
            config.verify_tls = parse_bool("INFOBLOX_SSL_VERIFY", &verify)?;
        }
        if let Some(timeout) = lookup("INFOBLOX_TIMEOUT_SECS") {
            config.timeout_secs = timeout.parse().map_err(|e| {
                InfobloxError::Config(format!("INFOBLOX_TIMEOUT_SECS={}: {}", timeout, e))
            })?;
        }
        if let Some(max) = lookup("INFOBLOX_MAX_RESULTS") {
            config.max_results = max.parse().map_err(|e| {
                InfobloxError::Config(format!("INFOBLOX_MAX_RESULTS={}: {}", max, e))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the settings can produce a working client
    pub fn validate(&self) -> Result<(), InfobloxError> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(InfobloxError::Config(format!(
                "url must start with http:// or https://, got {:?}",
                self.url
            )));
        }
        if self.wapi_version.is_empty() {
            return Err(InfobloxError::Config("wapi_version must not be empty".to_string()));
        }
        if self.max_results == 0 {
            return Err(InfobloxError::Config("max_results must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// Versioned WAPI root, e.g. `https://gm.example.com/wapi/v2.7`
    pub fn wapi_url(&self) -> String {
        format!(
            "{}/wapi/v{}",
            self.url.trim_end_matches('/'),
            self.wapi_version.trim_start_matches('v')
        )
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, InfobloxError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(InfobloxError::Config(format!("{}={} is not a boolean", key, other))),
    }
}
