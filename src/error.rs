//! Error types for Lectern

use thiserror::Error;

/// Main application error type
///
/// Duplicate adds and missing removes share the same taxonomy as lending
/// failures so callers can branch on the kind instead of parsing messages.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
