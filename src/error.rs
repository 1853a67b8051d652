//! Custom error types for Notas
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for Notas operations
#[derive(Error, Debug)]
pub enum NotasError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// CSV reading/writing errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// Input format and field validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Query period whose end precedes its start
    #[error("Invalid period: end date {end} is before start date {start}")]
    InvalidRange { start: String, end: String },

    /// Cancellation target is missing or already cancelled
    #[error("Folio {0} does not exist or is already cancelled")]
    NotFoundOrCancelled(u32),

    /// Recovery requested while nothing is cancelled
    #[error("There are no cancelled notes to recover")]
    NoCancelled,

    /// A query matched nothing
    #[error("No notes found: {0}")]
    EmptyResult(String),

    /// A workflow stopped before committing anything
    #[error("Operation aborted: {0}")]
    Aborted(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// The note was written but its audit entry was not
    #[error("Folio {folio} was saved, but its audit entry could not be written: {reason}")]
    Audit { folio: String, reason: String },

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl NotasError {
    /// Create a "not found" error for invoices
    pub fn invoice_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Note",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for customers
    pub fn customer_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Customer",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::NotFoundOrCancelled(_) | Self::NoCancelled
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Persistence failures leave the store in an unknown state; the
    /// interactive loop stops on these and reports everything else.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Storage(_) | Self::Io(_) | Self::Csv(_) | Self::Json(_)
        )
    }
}

impl From<std::io::Error> for NotasError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for NotasError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for NotasError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

impl From<crate::models::FolioParseError> for NotasError {
    fn from(err: crate::models::FolioParseError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Result type alias for Notas operations
pub type NotasResult<T> = Result<T, NotasError>;
