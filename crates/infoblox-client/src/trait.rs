//! Transport trait for mocking
//!
//! This trait abstracts the HTTP layer so the resource code can run against a
//! real appliance or an in-memory WAPI in unit tests.

use crate::error::InfobloxError;

/// HTTP method used by a WAPI call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Read an object or search
    Get,
    /// Create an object
    Post,
    /// Replace fields of an object
    Put,
    /// Remove an object
    Delete,
}

impl Method {
    /// Upper-case method name as sent on the wire
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// A WAPI request described as plain data.
///
/// `path` is relative to the versioned WAPI root: either an object type
/// (`record:host`) or a reference (`record:host/ZG5z...:a.example.com/default`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WapiRequest {
    /// HTTP method
    pub method: Method,
    /// Object type or reference, relative to the WAPI root
    pub path: String,
    /// Query parameters in send order
    pub query: Vec<(String, String)>,
    /// JSON payload for POST and PUT
    pub body: Option<Vec<u8>>,
}

impl WapiRequest {
    /// Request without query or body
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Attach query parameters
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Attach a JSON body
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Body as UTF-8 text, for logging and assertions
    pub fn body_text(&self) -> Option<&str> {
        self.body.as_deref().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Whether the path addresses one object (`type/id`) rather than a type
    pub fn targets_reference(&self) -> bool {
        self.path.contains('/')
    }
}

/// Raw WAPI response: status plus undecoded body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WapiResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: Vec<u8>,
}

impl WapiResponse {
    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as lossy UTF-8 text
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Trait for WAPI transport operations
///
/// Implementations return non-2xx responses as `Ok`; only failures to
/// complete the exchange are errors. All methods must be `Send` to work with
/// Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Get the versioned WAPI base URL
    fn base_url(&self) -> &str;

    /// Perform one request/response exchange
    async fn request(&self, request: WapiRequest) -> Result<WapiResponse, InfobloxError>;
}
