//! Errors raised while parsing a formula or building its design matrix

use crate::data::DataError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormulaError {
    /// The formula text does not follow the grammar
    #[error("Syntax error at column {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("Variable '{variable}' not found in the data (columns: {})", .columns.join(", "))]
    UnknownVariable {
        variable: String,
        columns: Vec<String>,
    },

    /// The response must be numeric
    #[error("Response '{variable}' must be numeric, found {dtype}")]
    NonNumericResponse { variable: String, dtype: String },

    #[error("Formula has no response variable on the left of '~'")]
    MissingResponse,

    #[error("Formula produces no design columns; keep the intercept or add a predictor")]
    EmptyDesign,

    /// A term that cannot become a design column, e.g. a bare literal
    #[error("'{term}' cannot be used as a model term")]
    InvalidTerm { term: String },

    #[error("{function}(): {message}")]
    Function { function: String, message: String },

    /// A transform met a value outside its domain, e.g. `log` of a negative
    #[error("{function}() is undefined for value {value}")]
    Domain { function: String, value: f64 },

    /// Categorical encoding at predict time does not match the fit
    #[error("Variable '{variable}': {message}")]
    Levels { variable: String, message: String },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Data(#[from] DataError),
}

pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

impl FormulaError {
    pub fn syntax(position: usize, message: impl Into<String>) -> Self {
        FormulaError::Syntax {
            position,
            message: message.into(),
        }
    }

    pub fn unknown_variable(variable: &str, columns: &[&str]) -> Self {
        FormulaError::UnknownVariable {
            variable: variable.to_string(),
            columns: columns.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn function(function: &str, message: impl Into<String>) -> Self {
        FormulaError::Function {
            function: function.to_string(),
            message: message.into(),
        }
    }

    pub fn levels(variable: &str, message: impl Into<String>) -> Self {
        FormulaError::Levels {
            variable: variable.to_string(),
            message: message.into(),
        }
    }
}
