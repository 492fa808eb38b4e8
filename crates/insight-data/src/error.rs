//! Data-access error types

use insight_nlp::Intent;
use thiserror::Error;

/// Failures while retrieving the data behind an intent.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Database query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("Missing required slot '{0}'")]
    MissingSlot(&'static str),

    #[error("Invalid slot '{slot}': {reason}")]
    InvalidSlot { slot: &'static str, reason: String },

    #[error("Analysis not implemented for '{0}'")]
    Unsupported(Intent),
}

impl DataError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn invalid_slot(slot: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSlot {
            slot,
            reason: reason.into(),
        }
    }

    /// Short description safe to show to an end user. Driver details stay in
    /// the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::Connection(_) => "Database connection failed".to_string(),
            Self::Query(_) => "Database query failed".to_string(),
            Self::MissingSlot("city") => "City name not identified".to_string(),
            Self::MissingSlot(_) | Self::InvalidSlot { .. } => {
                "Internal error: request parameters invalid".to_string()
            }
            Self::Unsupported(intent) => format!("Analysis not implemented for '{}' yet", intent),
        }
    }
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Connection(err.to_string())
            }
            other => Self::Query(other),
        }
    }
}

/// Result type for data-access operations
pub type Result<T> = std::result::Result<T, DataError>;

// Convert to insight_core AppError
impl From<DataError> for insight_core::AppError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::Connection(msg) => insight_core::AppError::unavailable(msg),
            DataError::Query(e) => insight_core::AppError::database(e.to_string()),
            DataError::MissingSlot(_) | DataError::InvalidSlot { .. } => {
                insight_core::AppError::validation(err.to_string())
            }
            DataError::Unsupported(_) => insight_core::AppError::internal(err.to_string()),
        }
    }
}
