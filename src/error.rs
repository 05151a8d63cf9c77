//! Error types for the card gate.

use crate::submission::PurchaseKind;
use thiserror::Error;

/// Result type alias for gate operations
pub type Result<T> = std::result::Result<T, GateError>;

/// Errors that can occur during gate operation.
///
/// Field validation failures are not errors: they are reported inside a
/// [`Rejection`](crate::engine::Rejection).
#[derive(Error, Debug)]
pub enum GateError {
    /// Failed to open or read an input file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid card pool entry
    #[error("Invalid card pool entry at row {row}: {message}")]
    InvalidPoolEntry { row: usize, message: String },

    /// Invalid configuration value
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The status store could not record or read an outcome
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),

    /// Missing input file argument
    #[error("Missing input file argument. Usage: card-gate <pools.csv> <submissions.csv>")]
    MissingArgument,
}

/// Failures of the transaction status store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("corrupt store row for {kind}: {message}")]
    Corrupt { kind: PurchaseKind, message: String },

    #[error("store lock poisoned")]
    Poisoned,
}

/// Invalid environment configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {name} value '{value}': expected {expected}")]
    InvalidValue {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}
