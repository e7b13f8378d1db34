//! Linear regression result structure
//!
//! This module defines the result structure for linear regression models,
//! containing all the information from fitting a linear model.

use ndarray::Axis;
use std::fmt;

use rb_core::data::DataFrame;
use rb_core::formula::{Formula, LevelMap};

use crate::base::{
    Coefficient, ModelError, ModelResultTrait, ModelStatistics, ModelSummary, ResidualStatistics,
    Result,
};
use crate::distributions::students_t_critical;
use crate::lm::ols::{Matrix, Vector};

/// OLS linear regression result
#[derive(Debug, Clone)]
pub struct LinearRegressionResult {
    /// Formula the model was fitted from
    pub formula: Formula,
    /// Coefficients (β)
    pub coefficients: Vector,
    /// Standard errors of coefficients
    pub standard_errors: Vector,
    /// t-statistics for coefficients
    pub t_statistics: Vector,
    /// p-values for coefficients
    pub p_values: Vector,
    /// Lower bounds of confidence intervals
    pub ci_lower: Vector,
    /// Upper bounds of confidence intervals
    pub ci_upper: Vector,
    /// Fitted values (ŷ)
    pub fitted_values: Vector,
    /// Residuals (y - ŷ)
    pub residuals: Vector,
    /// Hat matrix diagonal (leverage)
    pub hat_diagonal: Vector,
    /// Cook's distances
    pub cooks_distance: Vector,
    /// (X'X)⁻¹
    pub xtx_inv: Matrix,
    /// Design matrix (X)
    pub x: Matrix,
    /// Response vector (y)
    pub y: Vector,
    /// Design column names
    pub variable_names: Vec<String>,
    /// Source row of each observation used in the fit
    pub rows: Vec<usize>,
    /// Categorical levels seen while fitting, reused for prediction
    pub levels: LevelMap,
    /// Model statistics
    pub model_statistics: ModelStatistics,
    /// Has intercept
    pub has_intercept: bool,
    /// Confidence level of the coefficient intervals
    pub confidence_level: f64,
    /// Cook's distance threshold override
    pub influence_threshold: Option<f64>,
}

/// Point predictions with mean confidence and observation prediction intervals
#[derive(Debug, Clone)]
pub struct PredictionIntervals {
    /// Predicted mean
    pub mean: Vector,
    /// Lower bound for the mean
    pub ci_lower: Vector,
    /// Upper bound for the mean
    pub ci_upper: Vector,
    /// Lower bound for a new observation
    pub pi_lower: Vector,
    /// Upper bound for a new observation
    pub pi_upper: Vector,
}

impl LinearRegressionResult {
    /// Coefficient table in design column order
    pub fn to_coefficients(&self) -> Vec<Coefficient> {
        (0..self.coefficients.len())
            .map(|i| Coefficient {
                name: self.variable_names[i].clone(),
                estimate: self.coefficients[i],
                std_error: self.standard_errors[i],
                t_value: self.t_statistics[i],
                p_value: self.p_values[i],
                conf_int: (self.ci_lower[i], self.ci_upper[i]),
            })
            .collect()
    }

    /// Get the number of observations
    pub fn n_obs(&self) -> usize {
        self.y.len()
    }

    /// Get the number of predictors (including intercept)
    pub fn n_predictors(&self) -> usize {
        self.coefficients.len()
    }

    /// Get residual sum of squares
    pub fn rss(&self) -> f64 {
        self.residuals.dot(&self.residuals)
    }

    /// Total sum of squares, centred when the model has an intercept
    pub fn tss(&self) -> f64 {
        if self.has_intercept {
            let y_mean = self.y.mean().unwrap_or(f64::NAN);
            self.y.iter().map(|&yi| (yi - y_mean).powi(2)).sum()
        } else {
            self.y.dot(&self.y)
        }
    }

    /// Residual variance `RSS / (n - p)`
    pub fn sigma2(&self) -> f64 {
        self.model_statistics.residual_std_error.powi(2)
    }

    /// Covariance matrix of the coefficients, `σ² (X'X)⁻¹`
    pub fn cov_matrix(&self) -> Matrix {
        &self.xtx_inv * self.sigma2()
    }

    /// Residuals divided by the residual standard error
    pub fn standardized_residuals(&self) -> Vector {
        let rse = self.model_statistics.residual_std_error;
        self.residuals.mapv(|r| r / rse)
    }

    /// Internally studentized residuals, `e_i / (s √(1 - h_ii))`
    pub fn studentized_residuals(&self) -> Vector {
        let rse = self.model_statistics.residual_std_error;
        self.residuals
            .iter()
            .zip(self.hat_diagonal.iter())
            .map(|(&r, &h)| r / (rse * (1.0 - h).sqrt()))
            .collect()
    }

    /// Cook's distance threshold: the configured override or `4 / n`
    pub fn influence_threshold(&self) -> f64 {
        self.influence_threshold.unwrap_or(4.0 / self.n_obs() as f64)
    }

    /// Positions whose Cook's distance exceeds the influence threshold
    pub fn influential_points(&self) -> Vec<usize> {
        let threshold = self.influence_threshold();
        self.cooks_distance
            .iter()
            .enumerate()
            .filter(|(_, d)| **d > threshold)
            .map(|(i, _)| i)
            .collect()
    }

    /// Leverage threshold `2p / n`
    pub fn leverage_threshold(&self) -> f64 {
        2.0 * self.n_predictors() as f64 / self.n_obs() as f64
    }

    /// Positions whose leverage exceeds `2p / n`
    pub fn high_leverage_points(&self) -> Vec<usize> {
        let threshold = self.leverage_threshold();
        self.hat_diagonal
            .iter()
            .enumerate()
            .filter(|(_, h)| **h > threshold)
            .map(|(i, _)| i)
            .collect()
    }

    /// Position of a design column by name
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.variable_names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| ModelError::UnknownTerm {
                name: name.to_string(),
                available: self.variable_names.clone(),
            })
    }

    /// Get predictions for a design matrix laid out like `x`
    pub fn predict(&self, x_new: &Matrix) -> Result<Vector> {
        self.check_width(x_new)?;
        Ok(x_new.dot(&self.coefficients))
    }

    /// Build the design for new data with the fitted formula and predict
    pub fn predict_frame(&self, data: &DataFrame) -> Result<Vector> {
        let design = self.formula.exog(data, &self.levels)?;
        self.predict(&design.x)
    }

    /// Predictions with confidence intervals for the mean and prediction
    /// intervals for a new observation, at the fitted confidence level
    pub fn predict_intervals(&self, x_new: &Matrix) -> Result<PredictionIntervals> {
        let mean = self.predict(x_new)?;
        let sigma2 = self.sigma2();
        let t = students_t_critical(
            self.confidence_level,
            self.model_statistics.df_residual as f64,
        );

        let h: Vector = x_new
            .axis_iter(Axis(0))
            .map(|row| row.dot(&self.xtx_inv.dot(&row)))
            .collect();
        let se_mean = h.mapv(|h| (sigma2 * h).max(0.0).sqrt());
        let se_obs = h.mapv(|h| (sigma2 * (1.0 + h)).max(0.0).sqrt());

        Ok(PredictionIntervals {
            ci_lower: &mean - &(&se_mean * t),
            ci_upper: &mean + &(&se_mean * t),
            pi_lower: &mean - &(&se_obs * t),
            pi_upper: &mean + &(&se_obs * t),
            mean,
        })
    }

    fn check_width(&self, x_new: &Matrix) -> Result<()> {
        if x_new.ncols() != self.n_predictors() {
            return Err(rb_core::data::DataError::DimensionMismatch {
                what: "design columns",
                expected: self.n_predictors(),
                actual: x_new.ncols(),
            }
            .into());
        }
        Ok(())
    }

    /// Printable summary table
    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            formula: self.formula.to_string(),
            n_obs: self.n_obs(),
            n_predictors: self.n_predictors(),
            coefficients: self.to_coefficients(),
            model_statistics: self.model_statistics,
            residual_statistics: ResidualStatistics::from_residuals(&self.residuals),
        }
    }
}

impl ModelResultTrait for LinearRegressionResult {
    fn coefficients(&self) -> Vec<Coefficient> {
        self.to_coefficients()
    }

    fn fitted_values(&self) -> &Vector {
        &self.fitted_values
    }

    fn residuals(&self) -> &Vector {
        &self.residuals
    }

    fn statistics(&self) -> &ModelStatistics {
        &self.model_statistics
    }
}

impl fmt::Display for LinearRegressionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}
