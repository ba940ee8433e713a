//! Errors surfaced by the remote completion service

use thiserror::Error;

/// Failure talking to the model provider.
///
/// Nothing here is retried; callers see the error as-is.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} environment variable not set")]
    MissingApiKey(String),

    #[error("Failed to reach the API: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API rejected the credentials: {0}")]
    Unauthorized(String),

    #[error("API rate limit reached: {0}")]
    RateLimited(String),

    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response stream: {0}")]
    MalformedStream(String),

    #[error("API stream sent nothing for {0:?}")]
    Stalled(std::time::Duration),

    #[error("Completion returned no choices")]
    EmptyCompletion,
}

impl ApiError {
    /// Classify a non-success HTTP response
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = error_summary(body);
        match status {
            401 | 403 => ApiError::Unauthorized(message),
            429 => ApiError::RateLimited(message),
            _ => ApiError::Status { status, message },
        }
    }
}

/// Pull `error.message` out of an OpenAI-style error body, else the raw text
fn error_summary(body: &str) -> String {
    let trimmed = body.trim();
    serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| {
            if trimmed.is_empty() {
                "<empty body>".to_string()
            } else {
                trimmed.to_string()
            }
        })
}
