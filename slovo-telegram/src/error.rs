//! Transport error types for the messaging boundary.

use thiserror::Error;

/// Errors from talking to the Bot API.
///
/// Any of these abandons the current poll cycle; the dispatcher retries
/// on the next one without advancing its offset.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// The HTTP request could not be sent or completed.
    #[error("telegram request failed: {0}")]
    RequestFailed(String),

    /// The API answered with a non-success HTTP status.
    #[error("telegram API returned HTTP {0}")]
    Status(u16),

    /// The response body did not match the expected shape.
    #[error("malformed telegram response: {0}")]
    MalformedResponse(String),

    /// The API answered 200 but reported failure (`ok: false`).
    #[error("telegram API error: {0}")]
    Api(String),

    /// The request timed out.
    #[error("telegram request timed out")]
    Timeout,
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}
