//! Application-wide error type

use thiserror::Error;

/// Top-level error every crate-specific error converts into.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn external_service(msg: impl Into<String>) -> Self {
        Self::ExternalService(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Errors caused by a missing or failing dependency rather than a bug.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ExternalService(_) | Self::Unavailable(_) | Self::Database(_))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Result type for application operations
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_and_display() {
        assert_eq!(
            AppError::validation("bad input").to_string(),
            "Validation error: bad input"
        );
        assert_eq!(
            AppError::unavailable("llm").to_string(),
            "Service unavailable: llm"
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(AppError::database("down").is_transient());
        assert!(AppError::external_service("timeout").is_transient());
        assert!(!AppError::configuration("missing").is_transient());
        assert!(!AppError::internal("bug").is_transient());
    }

    #[test]
    fn test_from_config_error() {
        let err: AppError = config::ConfigError::NotFound("llm.model".to_string()).into();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}
