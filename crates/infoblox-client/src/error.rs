//! Infoblox client errors

use thiserror::Error;

/// Errors that can occur when interacting with the Infoblox WAPI
#[derive(Debug, Error)]
pub enum InfobloxError {
    /// HTTP request/response error
    #[error("HTTP error: {context}: {source}")]
    Http {
        /// Operation and target, e.g. `POST record:host`
        context: String,
        #[source]
        source: reqwest::Error,
    },

    /// WAPI returned a non-success status
    #[error("Infoblox API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Operation context plus the server's error text
        message: String,
    },

    /// Authentication failed (bad credentials, locked account, etc.)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Reference does not resolve to an object
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body did not have the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Request payload could not be encoded
    #[error("Serialization error: {context}: {source}")]
    Serialization {
        /// Operation and target the payload was meant for
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid request (e.g., empty reference, duplicate search fields)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl InfobloxError {
    /// Wrap a reqwest failure with the operation it interrupted
    pub fn http(context: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            context: context.into(),
            source,
        }
    }

    /// True when the remote object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// True for network, protocol and server-reported failures
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::Api { .. } | Self::Authentication(_)
        )
    }
}
