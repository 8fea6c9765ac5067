//! Error types for push delivery.

use thiserror::Error;

/// Why a push could not be delivered.
///
/// Delivery is best effort: callers get this back so the failure is visible
/// in the type, but are free to ignore it. Nothing is retried.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Relay configuration error: {0}")]
    Config(String),
    #[error("Relay request failed: {0}")]
    Request(String),
    #[error("Relay request timed out: {0}")]
    Timeout(String),
    #[error("Relay returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    #[error("No async runtime available for background delivery")]
    NoRuntime,
}

impl From<reqwest::Error> for DeliveryError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            return Self::Timeout(value.to_string());
        }
        Self::Request(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_error_display() {
        let err = DeliveryError::Status {
            status: 429,
            body: "limit reached".to_string(),
        };
        assert_eq!(err.to_string(), "Relay returned status 429: limit reached");

        let err = DeliveryError::Config("empty server url".to_string());
        assert_eq!(err.to_string(), "Relay configuration error: empty server url");
    }
}
