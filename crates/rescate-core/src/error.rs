//! Unified error handling for Rescate
//!
//! Read operations of the entitlement engine never fail across the public
//! boundary: they return report objects carrying their own validity. This
//! error type covers everything else (mutation collaborators, configuration,
//! alert handoff, snapshot decoding).

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Entitlement Errors ====================
    #[error("Subscriber not found: {0}")]
    SubscriberNotFound(String),

    #[error("Service exhausted: {0}")]
    ServiceExhausted(String),

    #[error("Service not covered by plan: {0}")]
    ServiceNotCovered(String),

    #[error("Service is unlimited and cannot be purchased: {0}")]
    UnlimitedService(String),

    #[error("Unsupported alert action: {0}")]
    UnsupportedAction(String),

    #[error("Usage shape mismatch: {0}")]
    UsageShapeMismatch(String),

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::SubscriberNotFound(_) => "subscriber_not_found",
            AppError::ServiceExhausted(_) => "service_exhausted",
            AppError::ServiceNotCovered(_) => "service_not_covered",
            AppError::UnlimitedService(_) => "unlimited_service",
            AppError::UnsupportedAction(_) => "unsupported_action",
            AppError::UsageShapeMismatch(_) => "usage_shape_mismatch",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::MissingField(_) => "missing_field",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }

    /// Whether the error was caused by the caller's input rather than the system
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            AppError::Internal(_) | AppError::Config(_) | AppError::Serialization(_)
        )
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::ServiceExhausted("URGENCIA".to_string()).error_code(),
            "service_exhausted"
        );
        assert_eq!(
            AppError::UnsupportedAction("upgrade".to_string()).error_code(),
            "unsupported_action"
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(AppError::Validation("bad".to_string()).is_client_error());
        assert!(AppError::SubscriberNotFound("7".to_string()).is_client_error());
        assert!(!AppError::Internal("boom".to_string()).is_client_error());
        assert!(!AppError::Config("missing".to_string()).is_client_error());
    }

    #[test]
    fn test_from_serde_error() {
        let err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let app: AppError = err.into();
        assert_eq!(app.error_code(), "serialization_error");
    }
}
