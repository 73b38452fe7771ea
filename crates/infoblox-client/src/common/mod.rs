//! Common utilities for the Infoblox WAPI client
//!
//! Provides the reqwest transport and the status handling shared by every
//! resource.

pub mod query;

use crate::config::InfobloxConfig;
use crate::error::InfobloxError;
use crate::transport::{Method, Transport, WapiRequest, WapiResponse};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Error body returned by WAPI on failure
#[derive(Debug, Clone, Deserialize)]
pub struct WapiErrorBody {
    #[serde(rename = "Error", default)]
    pub error: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub text: String,
}

/// WAPI error code for a reference that does not resolve
pub const NOT_FOUND_CODE: &str = "Client.Ibap.Data.NotFound";

/// HTTP transport with basic authentication
pub struct HttpTransport {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// Build a transport from configuration
    pub fn new(config: &InfobloxConfig) -> Result<Self, InfobloxError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| InfobloxError::http("build HTTP client", e))?;

        Ok(Self::with_client(
            client,
            config.wapi_url(),
            config.username.clone(),
            config.password.clone(),
        ))
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client, base_url: String, username: String, password: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
        }
    }

    /// Build a full URL from a WAPI path and query
    pub fn build_url(&self, path: &str, query: &[(String, String)]) -> String {
        let mut url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        if !query.is_empty() {
            url.push('?');
            url.push_str(&build_query_string(query));
        }
        url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request(&self, request: WapiRequest) -> Result<WapiResponse, InfobloxError> {
        let url = self.build_url(&request.path, &request.query);
        let context = format!("{} {}", request.method.as_str(), request.path);
        debug!("{} {}", request.method.as_str(), url);

        let builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        let mut builder = builder
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json");

        if let Some(body) = request.body {
            debug!("Request body: {}", String::from_utf8_lossy(&body));
            builder = builder.header("Content-Type", "application/json").body(body);
        }

        let response = builder.send().await.map_err(|e| InfobloxError::http(&context, e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| InfobloxError::http(&context, e))?
            .to_vec();

        debug!("{} {} -> {}", request.method.as_str(), url, status);
        Ok(WapiResponse { status, body })
    }
}

/// Build query string from key/value pairs
pub fn build_query_string(query: &[(String, String)]) -> String {
    query
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Turn a non-success response into an error carrying the operation context
///
/// `context` names the operation and target, e.g. `GET record:host/...`.
/// A bare 404 only means "not found" when `by_reference` is set; on an object
/// type path it means the WAPI root itself is wrong.
pub fn check_response(
    response: WapiResponse,
    context: &str,
    by_reference: bool,
) -> Result<WapiResponse, InfobloxError> {
    if response.is_success() {
        return Ok(response);
    }

    let raw = response.text();
    let parsed: Option<WapiErrorBody> = serde_json::from_slice(&response.body).ok();
    let message = match &parsed {
        Some(body) if !body.text.is_empty() => body.text.clone(),
        Some(body) if !body.error.is_empty() => body.error.clone(),
        _ => raw,
    };

    let not_found = (by_reference && response.status == 404)
        || parsed.as_ref().is_some_and(|b| b.code == NOT_FOUND_CODE);
    if not_found {
        return Err(InfobloxError::NotFound(format!("{} - {}", context, message)));
    }

    if response.status == 401 || response.status == 403 {
        return Err(InfobloxError::Authentication(format!(
            "{} failed: {} - {}",
            context, response.status, message
        )));
    }

    Err(InfobloxError::Api {
        status: response.status,
        message: format!("{} failed: {}", context, message),
    })
}

/// Decode a JSON body, keeping a prefix of the body for diagnostics
pub fn decode<T: for<'de> Deserialize<'de>>(response: &WapiResponse, context: &str) -> Result<T, InfobloxError> {
    serde_json::from_slice(&response.body).map_err(|e| {
        InfobloxError::Decode(format!(
            "{}: {} - Response (first 500 chars): {}",
            context,
            e,
            response.text().chars().take(500).collect::<String>()
        ))
    })
}
