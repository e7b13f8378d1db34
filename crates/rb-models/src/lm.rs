//! Linear regression models
//!
//! Ordinary least squares fitted from a formula, together with the
//! diagnostics run on the fitted model.

pub mod diagnostics;
pub mod ols;
pub mod result;

#[cfg(test)]
mod tests;

pub use diagnostics::{DiagnosticResults, Diagnostics};
pub use ols::LinearRegression;
pub use result::{LinearRegressionResult, PredictionIntervals};

use crate::base::Result;
use crate::ModelError;
use ndarray::Array1;
use rb_core::data::DataFrame;
use serde::{Deserialize, Serialize};

/// Linear model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearConfig {
    /// Confidence level for coefficient and prediction intervals
    pub confidence_level: f64,
    /// Relative singular value tolerance for the rank check.
    ///
    /// `None` uses `max(n, p) · ε`.
    pub rank_tolerance: Option<f64>,
    /// Cook's distance threshold for influential points; `None` uses `4 / n`
    pub influence_threshold: Option<f64>,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            confidence_level: 0.95,
            rank_tolerance: None,
            influence_threshold: None,
        }
    }
}

impl LinearConfig {
    /// Reject levels and tolerances outside the open unit interval, and
    /// influence thresholds that are not finite and positive
    pub fn validate(&self) -> Result<()> {
        let in_unit = |v: f64| v > 0.0 && v < 1.0;
        if !in_unit(self.confidence_level) {
            return Err(ModelError::invalid_config(format!(
                "confidence_level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        if let Some(tol) = self.rank_tolerance.filter(|&t| !in_unit(t)) {
            return Err(ModelError::invalid_config(format!(
                "rank_tolerance must be in (0, 1), got {}",
                tol
            )));
        }
        match self.influence_threshold {
            Some(d) if !(d.is_finite() && d > 0.0) => Err(ModelError::invalid_config(format!(
                "influence_threshold must be a positive number, got {}",
                d
            ))),
            _ => Ok(()),
        }
    }
}

/// Linear model trait
pub trait LinearModel {
    /// Fit the model
    fn fit(&mut self) -> Result<&mut Self>;

    /// Get coefficients
    fn coefficients(&self) -> Option<&Array1<f64>>;

    /// Get standard errors
    fn standard_errors(&self) -> Option<&Array1<f64>>;

    /// Get predictions
    fn predict(&self, data: &DataFrame) -> Result<Array1<f64>>;

    /// Get fitted values
    fn fitted_values(&self) -> Option<&Array1<f64>>;

    /// Get residuals
    fn residuals(&self) -> Option<&Array1<f64>>;
}

/// Convenience function for OLS regression
pub fn lm(formula: &str, data: &DataFrame) -> Result<LinearRegression> {
    LinearRegression::new(formula)?.data(data).fit()
}
