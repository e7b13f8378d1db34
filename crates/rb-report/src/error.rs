//! Error types for the report layer

use std::path::PathBuf;
use thiserror::Error;

use rb_core::data::DataError;
use rb_core::formula::FormulaError;
use rb_models::ModelError;

/// Errors raised while reading or writing a workbook
#[derive(Debug, Error)]
pub enum WorkbookError {
    /// The workbook file could not be read or written
    #[error("Failed to access workbook '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The workbook file is not a valid workbook document
    #[error("Failed to parse workbook '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// A cell address is malformed or out of range
    #[error("Invalid cell reference '{reference}': {reason}")]
    InvalidCell { reference: String, reason: String },

    /// The formula cell is empty
    #[error("No regression formula found in {cell}")]
    MissingFormula { cell: String },
}

impl WorkbookError {
    pub(crate) fn invalid_cell(reference: &str, reason: impl Into<String>) -> Self {
        WorkbookError::InvalidCell {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by the regbook pipeline
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Workbook(#[from] WorkbookError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Formula(#[from] FormulaError),

    /// A plot file could not be written
    #[error("Failed to write plot '{}': {source}", path.display())]
    Plot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is unreadable or inconsistent
    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ReportError>;
