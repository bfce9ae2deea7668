use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LuminaError>;

/// Billing/permission wording the remote service uses when a key is not
/// allowed to run Veo models.
const AUTH_MARKERS: [&str; 4] = [
    "permission",
    "billing",
    "api key not valid",
    "unauthenticated",
];

#[derive(Error, Debug)]
pub enum LuminaError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("A generation is already in progress")]
    Busy,

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Operation not found: {0}")]
    NotFound(String),

    #[error("Video generation failed to return a URI.")]
    MissingResult,

    #[error("Remote generation failed ({code}): {message}")]
    OperationFailed { code: i32, message: String },

    #[error("Timed out after {attempts} polls ({elapsed:?})")]
    Timeout { attempts: u32, elapsed: Duration },

    #[error("Generation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LuminaError {
    /// Only transport failures may be retried, and only for the single call
    /// that failed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Build an error from a remote status code and message.
    pub fn from_remote(code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        if code == 401 || code == 403 || looks_like_auth(&message) {
            return Self::Auth(message);
        }

        match code {
            400 => Self::Validation(message),
            404 => Self::NotFound(message),
            _ => Self::Transport(format!("HTTP {}: {}", code, message)),
        }
    }
}

/// True when a message reads like a rejected credential or missing billing.
pub fn looks_like_auth(message: &str) -> bool {
    let lower = message.to_lowercase();
    AUTH_MARKERS.iter().any(|marker| lower.contains(marker))
}

impl From<reqwest::Error> for LuminaError {
    fn from(err: reqwest::Error) -> Self {
        // The download URL carries the API key, never render it.
        let err = err.without_url();
        if let Some(status) = err.status() {
            return Self::from_remote(status.as_u16(), err.to_string());
        }
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_classification() {
        assert!(LuminaError::from_remote(403, "denied").is_auth());
        assert!(LuminaError::from_remote(401, "bad key").is_auth());
        assert!(matches!(LuminaError::from_remote(404, "gone"), LuminaError::NotFound(_)));
        assert!(matches!(LuminaError::from_remote(400, "no image"), LuminaError::Validation(_)));
        assert!(LuminaError::from_remote(503, "unavailable").is_retryable());
    }

    #[test]
    fn test_billing_message_is_auth() {
        let err = LuminaError::from_remote(500, "Billing is not enabled for this project");
        assert!(err.is_auth());
        assert!(looks_like_auth("The caller does not have PERMISSION"));
        assert!(!looks_like_auth("Deadline exceeded"));
    }

    #[test]
    fn test_only_transport_is_retryable() {
        assert!(LuminaError::Transport("reset".into()).is_retryable());
        assert!(!LuminaError::Busy.is_retryable());
        assert!(!LuminaError::MissingResult.is_retryable());
    }
}
