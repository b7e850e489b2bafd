use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Session expired - please log in again")]
    SessionExpired,

    #[error("Request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Token cannot be sent as a header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error payloads the backend is known to send.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Human-readable message for a failed response body.
    fn message_from_body(status: StatusCode, body: &str) -> String {
        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
            if let Some(message) = parsed.message.or(parsed.error) {
                if !message.trim().is_empty() {
                    return message;
                }
            }
        }

        let trimmed = body.trim();
        if trimmed.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        } else {
            Self::truncate_body(trimmed)
        }
    }

    /// Build the error for a non-2xx, non-401 response.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        ApiError::RequestFailed {
            status: status.as_u16(),
            message: Self::message_from_body(status, body),
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::SessionExpired | ApiError::InvalidCredentials => Some(401),
            ApiError::RequestFailed { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Message suitable for an inline error notification.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::SessionExpired => "Session expired. Please log in again.".to_string(),
            ApiError::InvalidCredentials => "Invalid email or password".to_string(),
            ApiError::RequestFailed { message, .. } => message.clone(),
            ApiError::Network(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::Network(_) => {
                "Unable to connect to server. Check your internet connection.".to_string()
            }
            ApiError::InvalidResponse(_) => "Unexpected response from server".to_string(),
            ApiError::InvalidHeader(_) => "Stored session is corrupt. Please log in again.".to_string(),
            ApiError::Encode(_) => "Could not prepare the request".to_string(),
        }
    }
}
