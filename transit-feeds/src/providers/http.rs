//! Shared HTTP transport.
//!
//! One `reqwest::Client` (and therefore one connection pool) is built at
//! startup and handed to every provider client. Clients clone the handle;
//! they never build their own.

use std::time::Duration;

use serde_json::Value;

use super::error::ProviderError;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent sent to every upstream.
const USER_AGENT: &str = concat!("transit-feeds/", env!("CARGO_PKG_VERSION"));

/// Configuration for the shared transport.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header value
    pub user_agent: String,
}

impl HttpConfig {
    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Build the shared HTTP client.
pub fn build_http_client(config: &HttpConfig) -> Result<reqwest::Client, ProviderError> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Send a GET and decode a JSON body.
///
/// This is the one place status codes and bodies are interpreted. There
/// are no retries: a failed call waits for the owning feed's next tick.
pub(crate) async fn get_json(request: reqwest::RequestBuilder) -> Result<Value, ProviderError> {
    let response = request.send().await?;
    let status = response.status();

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(ProviderError::Unauthorized);
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::RateLimited);
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            status: status.as_u16(),
            message: body.chars().take(500).collect(),
        });
    }

    let body = response.text().await?;
    parse_body(&body)
}

fn parse_body(body: &str) -> Result<Value, ProviderError> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(ProviderError::NoContent);
    }

    serde_json::from_str(trimmed).map_err(|e| ProviderError::malformed(e.to_string(), body))
}
