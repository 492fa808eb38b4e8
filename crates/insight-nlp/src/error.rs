//! NLP-specific error types

use serde::Serialize;
use thiserror::Error;

/// Message returned when no rule in the chain matches.
pub const NOT_UNDERSTOOD: &str = "Intent not understood. Try asking 'help'.";

/// Which slot could not be resolved when a category keyword was present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    City,
    Countries,
}

/// User-facing classification failures.
///
/// Every variant carries a message that can be shown to the end user as is.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassificationError {
    /// No rule matched the query.
    #[error("{message}")]
    Unrecognized { message: String },

    /// A category keyword was present but the named entity could not be resolved.
    #[error("{message}")]
    AmbiguousEntity { entity: EntityKind, message: String },

    /// A definitional lead-in was present but the term is not in the glossary
    /// and no later rule matched either.
    #[error("{message}")]
    UnknownTerm { term: String, message: String },
}

impl ClassificationError {
    pub fn unrecognized() -> Self {
        Self::Unrecognized {
            message: NOT_UNDERSTOOD.to_string(),
        }
    }

    pub fn ambiguous(entity: EntityKind, message: impl Into<String>) -> Self {
        Self::AmbiguousEntity {
            entity,
            message: message.into(),
        }
    }

    pub fn unknown_term(term: impl Into<String>) -> Self {
        Self::UnknownTerm {
            term: term.into(),
            message: NOT_UNDERSTOOD.to_string(),
        }
    }

    /// The ready-to-display message.
    pub fn message(&self) -> &str {
        match self {
            Self::Unrecognized { message }
            | Self::AmbiguousEntity { message, .. }
            | Self::UnknownTerm { message, .. } => message,
        }
    }
}

/// Errors raised while building the engine's fixed tables.
#[derive(Error, Debug)]
pub enum NlpError {
    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Invalid entity pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl NlpError {
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }
}

/// Result type for NLP operations
pub type Result<T> = std::result::Result<T, NlpError>;
