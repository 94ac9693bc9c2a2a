use thiserror::Error;

pub type Result<T> = std::result::Result<T, SdkError>;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Invalid signing key material: {0}")]
    InvalidKeyMaterial(String),
    #[error("Serialization failed: {0}")]
    Serialization(String),
    #[error("Transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Coordinator returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },
    #[error("Coordinator response is not a JSON object: {0}")]
    InvalidResponse(#[source] serde_json::Error),
    #[error("Malformed package archive: {0}")]
    InvalidArchive(String),
}

impl SdkError {
    /// True for failures a caller may reasonably retry: unreachable coordinator
    /// or a 5xx status. The SDK itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            SdkError::Transport(_) => true,
            SdkError::Remote { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            SdkError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(e: serde_json::Error) -> Self {
        SdkError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for SdkError {
    fn from(e: reqwest::Error) -> Self {
        SdkError::Transport(Box::new(e))
    }
}

impl From<hex::FromHexError> for SdkError {
    fn from(e: hex::FromHexError) -> Self {
        SdkError::InvalidKeyMaterial(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_classification() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(SdkError::Transport(Box::new(io)).is_retryable());
        assert!(SdkError::Remote { status: 503, body: String::new() }.is_retryable());
        assert!(!SdkError::Remote { status: 400, body: String::new() }.is_retryable());
        assert!(!SdkError::InvalidKeyMaterial("short".into()).is_retryable());
    }

    #[test]
    fn remote_error_carries_status_and_body() {
        let err = SdkError::Remote { status: 404, body: "no active task".into() };
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Coordinator returned HTTP 404: no active task");
    }
}
