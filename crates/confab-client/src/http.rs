//! Generation client trait and reqwest-backed implementation

use async_trait::async_trait;
use std::time::Duration;

use crate::{
    error::{Error, Result},
    types::{GenerationReply, GenerationRequest},
};

/// Default timeout for connect and request phases (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// A client that turns a prompt into exactly one network round-trip.
///
/// This is the seam between the conversation store and the transport:
/// tests substitute a mock, production code uses [`HttpGenerationClient`].
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Generate a reply for the given prompt. One attempt, no retries.
    async fn generate(&self, prompt: &str) -> Result<GenerationReply>;
}

/// Configuration for the HTTP generation client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the service; `generate/` is appended
    pub base_url: String,
    /// Time allowed to establish a connection
    pub connect_timeout: Duration,
    /// Total time allowed for the request, including reading the body
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Create a config with default timeouts
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the total request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Join the base URL and the generate path, normalizing the trailing slash.
fn generate_url(base_url: &str) -> Result<String> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() || !trimmed.starts_with("http") {
        return Err(Error::InvalidBaseUrl(base_url.to_string()));
    }
    Ok(format!("{}/generate/", trimmed.trim_end_matches('/')))
}

/// reqwest-backed generation client.
///
/// Constructed once at startup and shared; holds no per-request state.
pub struct HttpGenerationClient {
    client: reqwest::Client,
    url: String,
}

impl HttpGenerationClient {
    /// Create a new client from a config
    pub fn new(config: ClientConfig) -> Result<Self> {
        let url = generate_url(&config.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { client, url })
    }

    /// The fully-joined endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate(&self, prompt: &str) -> Result<GenerationReply> {
        let request = GenerationRequest::new(prompt);
        tracing::debug!(url = %self.url, prompt_len = prompt.len(), "sending generation request");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout
                } else {
                    Error::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "generation request failed");
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        // Read the body as text first so a malformed payload surfaces
        // as a Json error rather than a transport error.
        let body = response.text().await?;
        let reply: GenerationReply = serde_json::from_str(&body)?;
        tracing::debug!(reply_len = reply.text.len(), "generation request succeeded");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_url_appends_path() {
        let url = generate_url("https://example.com/").unwrap();
        assert_eq!(url, "https://example.com/generate/");
    }

    #[test]
    fn test_generate_url_normalizes_missing_slash() {
        let url = generate_url("https://example.com").unwrap();
        assert_eq!(url, "https://example.com/generate/");
    }

    #[test]
    fn test_generate_url_rejects_empty() {
        assert!(generate_url("").is_err());
        assert!(generate_url("   ").is_err());
    }

    #[test]
    fn test_generate_url_rejects_non_http() {
        assert!(generate_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_client_builds_with_defaults() {
        let client = HttpGenerationClient::new(ClientConfig::new("https://example.com/")).unwrap();
        assert_eq!(client.url(), "https://example.com/generate/");
    }

    #[test]
    fn test_config_builder_overrides_timeouts() {
        let config = ClientConfig::new("https://example.com/")
            .with_connect_timeout(Duration::from_secs(5))
            .with_request_timeout(Duration::from_secs(10));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }
}
