//! Error types for the seniorfit_core library.

use std::io;
use uuid::Uuid;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for seniorfit_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Request rejected before any engine logic ran
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced exercise is not in the catalog
    #[error("Exercise not found: {0}")]
    ExerciseNotFound(String),

    /// Referenced user has no stored document
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Storage backend error
    #[error("Store error: {0}")]
    Store(String),

    /// Recommendation engine error
    #[error("Recommendation error: {0}")]
    Recommendation(String),
}
