//! Upstream provider error types.
//!
//! Every variant is folded into [`ProviderResult::Empty`](super::ProviderResult)
//! at the client boundary; callers see the error only as the recorded
//! cause of an empty result.

/// Errors from an upstream HTTP provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Connection failure, timeout, or body read failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Upstream returned a non-2xx status
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// Invalid or missing credentials
    #[error("unauthorized (check API key)")]
    Unauthorized,

    /// Rate limited by the upstream
    #[error("rate limited")]
    RateLimited,

    /// Body was not the expected JSON shape
    #[error("JSON parse error: {message}")]
    Malformed {
        message: String,
        body: Option<String>,
    },

    /// 2xx with an empty or `null` body
    #[error("no usable response body")]
    NoContent,

    /// Credential cannot be sent as configured
    #[error("invalid credential: {0}")]
    InvalidCredential(&'static str),
}

impl ProviderError {
    pub(crate) fn malformed(message: impl Into<String>, body: &str) -> Self {
        ProviderError::Malformed {
            message: message.into(),
            body: Some(body.chars().take(500).collect()),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transport(err.to_string())
    }
}
