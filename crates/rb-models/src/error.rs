//! Errors raised while fitting or querying a model

use thiserror::Error;

use rb_core::data::DataError;
use rb_core::formula::error::FormulaError;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Formula error: {0}")]
    Formula(#[from] FormulaError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// A linear algebra step produced no usable result
    #[error("Numerical failure in {step}: {message}")]
    Numerical { step: &'static str, message: String },

    /// A design column looked up by name, e.g. for a plot, does not exist
    #[error("Unknown model term '{name}' (design columns: {})", .available.join(", "))]
    UnknownTerm { name: String, available: Vec<String> },

    #[error("Invalid model configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Model has not been fitted")]
    NotFitted,
}

impl ModelError {
    pub(crate) fn numerical(step: &'static str, message: impl Into<String>) -> Self {
        ModelError::Numerical {
            step,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        ModelError::InvalidConfig {
            message: message.into(),
        }
    }
}
