//! Remote gateway: the HTTP client behind every server call.

use crate::error::{Result, ServerClientError};
use crate::types::{ErrorBody, HealthResponse, ServerConfig};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, info};
use url::Url;

/// Client for a Dharma Player server.
///
/// Implements [`PersistenceGateway`](dharma_core::PersistenceGateway): each
/// gateway operation is one request/response round trip. The access token
/// returned by `authenticate` is kept and sent as a bearer token afterwards.
pub struct RemoteGateway {
    http: Client,
    base_url: String,
    access_token: RwLock<Option<String>>,
}

impl RemoteGateway {
    /// Create a new client with the given configuration.
    pub fn new(config: ServerConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(ServerClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let parsed =
            Url::parse(&config.url).map_err(|e| ServerClientError::InvalidUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ServerClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout.min(std::time::Duration::from_secs(10)))
            .user_agent(format!("DharmaPlayer/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            access_token: RwLock::new(config.access_token),
        })
    }

    /// Get the server URL.
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// Check if the client has an access token.
    pub async fn is_authenticated(&self) -> bool {
        self.access_token.read().await.is_some()
    }

    /// Current access token, if any.
    pub async fn access_token(&self) -> Option<String> {
        self.access_token.read().await.clone()
    }

    /// Set the access token directly (e.g., from stored credentials).
    pub async fn set_access_token(&self, token: impl Into<String>) {
        *self.access_token.write().await = Some(token.into());
    }

    /// Forget the access token.
    pub async fn logout(&self) {
        *self.access_token.write().await = None;
        info!("Logged out");
    }

    /// Server liveness and version. Does not require authentication.
    pub async fn health(&self) -> Result<HealthResponse> {
        let request = self.request(Method::GET, "/api/health").await;
        self.send_json(request).await
    }

    // ========================================================================
    // Request plumbing
    // ========================================================================

    /// Build a request for `path` (relative to the base URL), with bearer
    /// auth when a token is held.
    pub(crate) async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, url = %url, "Server request");

        let builder = self.http.request(method, url);
        match self.access_token.read().await.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and decode a JSON success body.
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| ServerClientError::ParseError(format!("Failed to parse response: {e}")))
    }

    /// Send and turn any non-success status into `ServerError`.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(ErrorBody {
                error,
                details: Some(details),
            }) => format!("{error}: {details}"),
            Ok(body) => body.error,
            Err(_) if text.is_empty() => status.canonical_reason().unwrap_or("Unknown error").to_string(),
            Err(_) => text,
        };

        debug!(status = status.as_u16(), message = %message, "Server returned error");
        Err(ServerClientError::ServerError {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_validation() {
        // Valid URLs
        assert!(RemoteGateway::new(ServerConfig::new("https://example.com")).is_ok());
        assert!(RemoteGateway::new(ServerConfig::new("http://localhost:3000")).is_ok());

        // Invalid URLs
        assert!(RemoteGateway::new(ServerConfig::new("")).is_err());
        assert!(RemoteGateway::new(ServerConfig::new("not-a-url")).is_err());
        assert!(RemoteGateway::new(ServerConfig::new("ftp://example.com")).is_err());
    }

    #[test]
    fn test_url_normalization() {
        let client =
            RemoteGateway::new(ServerConfig::new("https://example.com/")).expect("valid url");
        assert_eq!(client.url(), "https://example.com");
    }
}
