//! Error types for gymwatch
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for gymwatch operations
///
/// Covers input validation, the save-in-flight guard, storage failures,
/// and configuration problems. Soft failures (a missing or unparsable
/// stored blob) are deliberately *not* represented here: they degrade
/// to an empty collection and are only logged.
#[derive(Error, Debug)]
pub enum GymwatchError {
    /// Input failed a precondition; no state was mutated
    #[error("Validation error: {0}")]
    Validation(String),

    /// A mutation was attempted while another save is still persisting
    #[error("A save is already in flight; retry when it completes")]
    ConcurrentSave,

    /// The store's write failed; raised only after the in-memory view
    /// was restored to the last persisted state
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for gymwatch operations
///
/// Uses `anyhow::Error` so call sites get rich context and easy
/// propagation; callers that need the taxonomy downcast to
/// [`GymwatchError`].
pub type Result<T> = anyhow::Result<T>;
