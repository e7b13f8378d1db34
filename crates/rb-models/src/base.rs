//! Core types shared by the models
//!
//! Coefficient tables, fit statistics and the printable summary, plus the
//! [`ModelResultTrait`] the report layer reads fitted models through.

use ndarray::Array1;

pub use coefficient::Coefficient;
pub use statistics::{ModelStatistics, ResidualStatistics};
pub use summary::ModelSummary;

pub use crate::error::ModelError;

pub mod coefficient;
pub mod statistics;
pub mod summary;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Read access to a fitted model
pub trait ModelResultTrait {
    /// Coefficient table in design column order
    fn coefficients(&self) -> Vec<Coefficient>;

    /// Get fitted values
    fn fitted_values(&self) -> &Array1<f64>;

    /// Get residuals
    fn residuals(&self) -> &Array1<f64>;

    /// Goodness-of-fit statistics
    fn statistics(&self) -> &ModelStatistics;

    /// Get R-squared value
    fn r_squared(&self) -> f64 {
        self.statistics().r_squared
    }

    /// Get adjusted R-squared value
    fn adj_r_squared(&self) -> f64 {
        self.statistics().adj_r_squared
    }

    /// Get AIC
    fn aic(&self) -> f64 {
        self.statistics().aic
    }

    /// Get BIC
    fn bic(&self) -> f64 {
        self.statistics().bic
    }

    /// p-value of the overall F test
    fn f_p_value(&self) -> f64 {
        self.statistics().f_p_value
    }
}
