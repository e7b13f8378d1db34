//! Tabular input for the regression
//!
//! A [`DataFrame`] is an ordered set of equally long, typed [`Series`]
//! columns. [`read_csv`] builds one from a file with a header row, inferring
//! each column's type.

mod dataframe;
mod reader;
mod series;


pub use dataframe::DataFrame;
pub use reader::{CsvOptions, read_csv, read_csv_from};
pub use series::{Series, Value};

pub type FloatArray = ndarray::Array1<f64>;
pub type Matrix = ndarray::Array2<f64>;

#[derive(thiserror::Error, Debug)]
pub enum DataError {
    #[error("Length mismatch in {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("Operation requires numeric data, got {0}")]
    NonNumericData(&'static str),

    #[error("Insufficient data: {rows} complete rows for {params} parameters (need rows > parameters)")]
    InsufficientRows { rows: usize, params: usize },

    #[error(
        "Design matrix is rank deficient: rank {rank} < {params} parameters \
         (condition number {condition:.3e}); check for collinear columns among {columns:?}"
    )]
    RankDeficient {
        rank: usize,
        params: usize,
        condition: f64,
        columns: Vec<String>,
    },

    #[error("Failed to read CSV '{path}': {message}")]
    Csv { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, DataError>;
