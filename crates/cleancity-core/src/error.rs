use thiserror::Error;

/// Top-level error type for CleanCity.
///
/// Validation failures are not errors: they come back as a
/// `ValidationResult`. Notification delivery has its own `DeliveryError` in
/// `cleancity-notify` because callers are allowed to ignore it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CleanCityError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// A call to the hosted backend failed. The message carries the
    /// operation prefix, e.g. `"Failed to load reports: timeout"`.
    #[error("{operation}: {message}")]
    Upstream { operation: String, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CleanCityError {
    /// Wrap a backend failure with the operation that produced it.
    pub fn upstream(operation: impl Into<String>, err: impl std::fmt::Display) -> Self {
        CleanCityError::Upstream {
            operation: operation.into(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CleanCityError {
    fn from(err: toml::de::Error) -> Self {
        CleanCityError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for CleanCityError {
    fn from(err: toml::ser::Error) -> Self {
        CleanCityError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for CleanCityError {
    fn from(err: serde_json::Error) -> Self {
        CleanCityError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for CleanCity operations.
pub type Result<T> = std::result::Result<T, CleanCityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CleanCityError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_upstream_error_is_prefixed() {
        let err = CleanCityError::upstream("Failed to update report status", "row not found");
        assert_eq!(
            err.to_string(),
            "Failed to update report status: row not found"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CleanCityError = io_err.into();
        assert!(matches!(err, CleanCityError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let err: CleanCityError = bad.unwrap_err().into();
        assert!(matches!(err, CleanCityError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let err: CleanCityError = bad.unwrap_err().into();
        assert!(matches!(err, CleanCityError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let parsed: serde_json::Value = serde_json::from_str("{\"a\": 1}")?;
            Ok(parsed["a"].to_string())
        }

        assert_eq!(inner().unwrap(), "1");
    }
}
