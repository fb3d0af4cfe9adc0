//! Error types for the booking Lambda.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Body returned to the caller for every server-side failure.
pub const SERVER_ERROR_MESSAGE: &str = "Server error";

/// Errors that can occur while handling a booking or availability request.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid inbound fields
    #[error("Validation error: {0}")]
    Validation(String),

    /// POST body in a content type we cannot decode
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// No route for the method/path
    #[error("Not found: {0}")]
    NotFound(String),

    /// Identity provider rejected the client-credentials grant
    #[error("Token acquisition failed: {0}")]
    TokenAcquisition(String),

    /// Calendar service rejected the schedule lookup
    #[error("Schedule fetch failed: {0}")]
    ScheduleFetch(String),

    /// Calendar service did not confirm the event
    #[error("Event creation failed: {0}")]
    EventCreation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// AWS SDK error
    #[error("AWS error: {0}")]
    Aws(String),

    /// Outbound transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Response construction error
    #[error("Response error: {0}")]
    Response(#[from] lambda_http::http::Error),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation(_) => 400,
            Error::NotFound(_) => 404,
            Error::UnsupportedMediaType(_) => 415,
            _ => 500,
        }
    }

    /// Message safe to hand back to the caller.
    ///
    /// Client errors carry their own message; anything server-side collapses
    /// to [`SERVER_ERROR_MESSAGE`] and the detail only goes to the logs.
    pub fn client_message(&self) -> String {
        match self {
            Error::Validation(msg) | Error::UnsupportedMediaType(msg) | Error::NotFound(msg) => {
                msg.clone()
            }
            _ => SERVER_ERROR_MESSAGE.to_string(),
        }
    }
}
