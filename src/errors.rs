//! Errors for the navigation backend
use serde::Serialize;
use thiserror::Error;

/// A single rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid PIN")]
    Unauthorized,

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Configuration error")]
    ConfigError(#[from] config::ConfigError),

    /// Displayed verbatim, upload failures surface the OS message to callers
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error")]
    SerdeError(#[from] serde_json::Error),

    #[error("Corrupt document {key} in {collection}: {message}")]
    CorruptDocument {
        collection: &'static str,
        key: String,
        message: String,
    },

    #[error("Duplicate key {key} in {collection}")]
    DuplicateKey { collection: &'static str, key: String },

    #[error("Database migration error")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),
}

impl NavigationError {
    /// Shorthand for a validation failure on one field
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }
}
