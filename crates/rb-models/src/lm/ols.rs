//! Ordinary Least Squares (OLS) linear regression
//!
//! This module implements the standard linear regression model
//! using the ordinary least squares estimator.

use ndarray::{Array1, Array2};
use tracing::{debug, info};

use crate::base::{ModelError, ModelStatistics, ModelSummary, ResidualStatistics, Result};
use crate::distributions::{f_upper_tail, students_t_critical, students_t_two_tailed};
use crate::linalg;
use crate::lm::result::LinearRegressionResult;
use crate::lm::{LinearConfig, LinearModel};
use rb_core::data::{DataError, DataFrame};
use rb_core::formula::{Formula, FormulaError};

/// Matrix type alias for 2D arrays
pub type Matrix = Array2<f64>;

/// Vector type alias for 1D arrays
pub type Vector = Array1<f64>;

/// Least-squares quantities shared by the main fit and the auxiliary
/// regressions run by the diagnostics
#[derive(Debug, Clone)]
pub(crate) struct OlsCore {
    pub beta: Vector,
    pub fitted: Vector,
    pub residuals: Vector,
    pub rank: usize,
    pub rss: f64,
    pub r_squared: f64,
    pub df_resid: f64,
    pub f_statistic: f64,
    pub f_p_value: f64,
}

impl OlsCore {
    /// Fit `y ~ x` by SVD least squares.
    ///
    /// `has_intercept` selects centred (true) or uncentred total sum of squares.
    pub(crate) fn fit(x: &Matrix, y: &Vector, has_intercept: bool) -> Result<Self> {
        let n = x.nrows();
        let rank = linalg::rank(x).rank;
        let beta = linalg::lstsq(x, y)
            .ok_or_else(|| ModelError::numerical("lstsq", "SVD least squares did not converge"))?;

        let fitted = x.dot(&beta);
        let residuals = y - &fitted;
        let rss = residuals.dot(&residuals);

        let tss = if has_intercept {
            let mean = y.mean().unwrap_or(f64::NAN);
            y.iter().map(|v| (v - mean).powi(2)).sum()
        } else {
            y.dot(y)
        };

        let r_squared = if tss > 0.0 { 1.0 - rss / tss } else { f64::NAN };

        let k0 = usize::from(has_intercept);
        let df_model = rank.saturating_sub(k0) as f64;
        let df_resid = n as f64 - rank as f64;

        let f_statistic = if df_model > 0.0 && df_resid > 0.0 && rss > 0.0 {
            ((tss - rss) / df_model) / (rss / df_resid)
        } else {
            f64::NAN
        };
        let f_p_value = f_upper_tail(f_statistic, df_model, df_resid);

        Ok(Self {
            beta,
            fitted,
            residuals,
            rank,
            rss,
            r_squared,
            df_resid,
            f_statistic,
            f_p_value,
        })
    }
}

/// OLS linear regression model
#[derive(Debug, Clone)]
pub struct LinearRegression {
    /// Model formula
    formula: Formula,
    /// Data
    data: Option<DataFrame>,
    /// Configuration
    config: LinearConfig,
    /// Fitted result
    result: Option<LinearRegressionResult>,
}

impl LinearRegression {
    /// Create a new linear regression model
    pub fn new(formula: &str) -> Result<Self> {
        let formula = Formula::parse(formula)?;

        Ok(Self {
            formula,
            data: None,
            config: LinearConfig::default(),
            result: None,
        })
    }

    /// Set data for the model
    pub fn data(mut self, data: &DataFrame) -> Self {
        self.data = Some(data.clone());
        self
    }

    /// Set configuration
    pub fn config(mut self, config: LinearConfig) -> Self {
        self.config = config;
        self
    }

    /// Consume the model, returning the fitted result
    pub fn into_result(self) -> Result<LinearRegressionResult> {
        self.result.ok_or(ModelError::NotFitted)
    }

    /// Fit the OLS model
    pub fn fit(mut self) -> Result<Self> {
        self.config.validate()?;

        let data = self.data.as_ref().ok_or_else(|| ModelError::invalid_config("No data provided"))?;

        let design = self.formula.design(data)?;
        let y = design.y.clone().ok_or(FormulaError::MissingResponse)?;
        let x = design.x.clone();

        let n = x.nrows();
        let p = x.ncols();

        if n <= p {
            return Err(DataError::InsufficientRows { rows: n, params: p }.into());
        }

        let rank_info = linalg::rank_with_tolerance(&x, self.config.rank_tolerance);
        if rank_info.rank < p {
            return Err(DataError::RankDeficient {
                rank: rank_info.rank,
                params: p,
                condition: rank_info.condition,
                columns: design.column_names.clone(),
            }
            .into());
        }
        debug!(condition = rank_info.condition, "design matrix has full column rank");

        let has_intercept = self.formula.has_intercept;
        let core = OlsCore::fit(&x, &y, has_intercept)?;

        let xtx_inv = linalg::xtx_inverse(&x)
            .ok_or_else(|| ModelError::numerical("standard errors", "X'X is not invertible"))?;

        let df_resid = (n - p) as f64;
        let sigma2 = core.rss / df_resid;
        let residual_std_error = sigma2.sqrt();

        let standard_errors = xtx_inv.diag().mapv(|v| (v * sigma2).max(0.0).sqrt());

        let (t_statistics, p_values, ci_lower, ci_upper) =
            self.calculate_inference(&core.beta, &standard_errors, df_resid);

        let k0 = if has_intercept { 1.0 } else { 0.0 };
        let adj_r_squared = 1.0 - (1.0 - core.r_squared) * (n as f64 - k0) / df_resid;

        let log_likelihood = log_likelihood(n, core.rss);
        let aic = -2.0 * log_likelihood + 2.0 * p as f64;
        let bic = -2.0 * log_likelihood + (n as f64).ln() * p as f64;

        let hat_diagonal = hat_matrix_diagonal(&x, &xtx_inv);
        let cooks_distance = cooks_distance(&core.residuals, &hat_diagonal, p, sigma2);

        let model_statistics = ModelStatistics {
            n_obs: n,
            r_squared: core.r_squared,
            adj_r_squared,
            residual_std_error,
            f_statistic: core.f_statistic,
            f_p_value: core.f_p_value,
            log_likelihood,
            aic,
            bic,
            df_residual: n - p,
            df_model: p - usize::from(has_intercept),
        };

        info!(
            formula = %self.formula,
            nobs = n,
            params = p,
            r_squared = core.r_squared,
            "fitted OLS model"
        );

        self.result = Some(LinearRegressionResult {
            formula: self.formula.clone(),
            coefficients: core.beta,
            standard_errors,
            t_statistics,
            p_values,
            ci_lower,
            ci_upper,
            fitted_values: core.fitted,
            residuals: core.residuals,
            hat_diagonal,
            cooks_distance,
            xtx_inv,
            x,
            y,
            variable_names: design.column_names,
            rows: design.rows,
            levels: design.levels,
            model_statistics,
            has_intercept,
            confidence_level: self.config.confidence_level,
            influence_threshold: self.config.influence_threshold,
        });

        Ok(self)
    }

    /// Calculate inference statistics
    fn calculate_inference(
        &self,
        coefficients: &Vector,
        std_errors: &Vector,
        df: f64,
    ) -> (Vector, Vector, Vector, Vector) {
        let t_statistics: Vector = coefficients
            .iter()
            .zip(std_errors.iter())
            .map(|(&coef, &se)| if se > 0.0 { coef / se } else { f64::NAN })
            .collect();

        let p_values = t_statistics.mapv(|t| students_t_two_tailed(t, df));

        let t_critical = students_t_critical(self.config.confidence_level, df);
        let ci_lower = coefficients - &(std_errors * t_critical);
        let ci_upper = coefficients + &(std_errors * t_critical);

        (t_statistics, p_values, ci_lower, ci_upper)
    }

    /// Get model summary
    pub fn summary(&self) -> Result<ModelSummary> {
        let result = self.result.as_ref().ok_or(ModelError::NotFitted)?;
        Ok(result.summary())
    }

    /// Residual summary of the fitted model
    pub fn residual_statistics(&self) -> Result<ResidualStatistics> {
        let result = self.result.as_ref().ok_or(ModelError::NotFitted)?;
        Ok(ResidualStatistics::from_residuals(&result.residuals))
    }
}

/// Gaussian log-likelihood at the maximum likelihood variance `RSS / n`
pub(crate) fn log_likelihood(n: usize, rss: f64) -> f64 {
    let n = n as f64;
    -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + (rss / n).ln() + 1.0)
}

/// Diagonal of the hat matrix: `h_ii = x_i (X'X)^{-1} x_i'`
fn hat_matrix_diagonal(x: &Matrix, xtx_inv: &Matrix) -> Vector {
    x.rows()
        .into_iter()
        .map(|xi| xi.dot(&xtx_inv.dot(&xi)))
        .collect()
}

/// Cook's distances
fn cooks_distance(residuals: &Vector, hat_diag: &Vector, p: usize, sigma2: f64) -> Vector {
    residuals
        .iter()
        .zip(hat_diag.iter())
        .map(|(&r, &h)| (r * r * h) / (p as f64 * sigma2 * (1.0 - h).powi(2)))
        .collect()
}

impl LinearModel for LinearRegression {
    fn fit(&mut self) -> Result<&mut Self> {
        let fitted = self.clone().fit()?;
        *self = fitted;
        Ok(self)
    }

    fn coefficients(&self) -> Option<&Vector> {
        self.result.as_ref().map(|r| &r.coefficients)
    }

    fn standard_errors(&self) -> Option<&Vector> {
        self.result.as_ref().map(|r| &r.standard_errors)
    }

    fn predict(&self, data: &DataFrame) -> Result<Vector> {
        let result = self.result.as_ref().ok_or(ModelError::NotFitted)?;
        result.predict_frame(data)
    }

    fn fitted_values(&self) -> Option<&Vector> {
        self.result.as_ref().map(|r| &r.fitted_values)
    }

    fn residuals(&self) -> Option<&Vector> {
        self.result.as_ref().map(|r| &r.residuals)
    }
}
