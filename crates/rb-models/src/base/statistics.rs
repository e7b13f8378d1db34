//! Statistical structures for model results

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Goodness-of-fit statistics of a fitted model.
///
/// Undefined quantities (for example R² of a constant response) are `NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelStatistics {
    /// Number of observations used in the fit
    pub n_obs: usize,
    /// R-squared
    pub r_squared: f64,
    /// Adjusted R-squared
    pub adj_r_squared: f64,
    /// Residual standard error
    pub residual_std_error: f64,
    /// F-statistic
    pub f_statistic: f64,
    /// F-statistic p-value
    pub f_p_value: f64,
    /// Log-likelihood
    pub log_likelihood: f64,
    /// AIC
    pub aic: f64,
    /// BIC
    pub bic: f64,
    /// Residual degrees of freedom
    pub df_residual: usize,
    /// Model degrees of freedom
    pub df_model: usize,
}

/// Residual statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidualStatistics {
    /// Minimum residual
    pub min: f64,
    /// First quartile
    pub q1: f64,
    /// Median
    pub median: f64,
    /// Third quartile
    pub q3: f64,
    /// Maximum residual
    pub max: f64,
    /// Mean residual
    pub mean: f64,
    /// Standard deviation
    pub std_dev: f64,
    /// Skewness
    pub skewness: f64,
    /// Kurtosis (normal = 3)
    pub kurtosis: f64,
    /// Durbin-Watson statistic
    pub durbin_watson: f64,
}

impl ResidualStatistics {
    /// Summarize a residual vector
    pub fn from_residuals(residuals: &Array1<f64>) -> Self {
        let (skewness, kurtosis) = moments(residuals);

        Self {
            min: residuals.iter().copied().fold(f64::NAN, f64::min),
            q1: quantile(residuals, 0.25),
            median: quantile(residuals, 0.5),
            q3: quantile(residuals, 0.75),
            max: residuals.iter().copied().fold(f64::NAN, f64::max),
            mean: residuals.mean().unwrap_or(f64::NAN),
            std_dev: if residuals.len() > 1 {
                residuals.std(1.0)
            } else {
                f64::NAN
            },
            skewness,
            kurtosis,
            durbin_watson: durbin_watson(residuals),
        }
    }
}

/// Linear-interpolated sample quantile
pub fn quantile(data: &Array1<f64>, q: f64) -> f64 {
    if data.is_empty() {
        return f64::NAN;
    }

    let mut sorted: Vec<f64> = data.to_vec();
    sorted.sort_by(f64::total_cmp);

    let idx = (sorted.len() as f64 - 1.0) * q;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let weight = idx - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

/// Biased sample skewness and Pearson kurtosis (normal = 3)
pub fn moments(data: &Array1<f64>) -> (f64, f64) {
    let n = data.len() as f64;
    if data.is_empty() {
        return (f64::NAN, f64::NAN);
    }

    let mean = data.sum() / n;
    let (m2, m3, m4) = data.iter().fold((0.0, 0.0, 0.0), |(m2, m3, m4), &x| {
        let d = x - mean;
        let d2 = d * d;
        (m2 + d2, m3 + d2 * d, m4 + d2 * d2)
    });
    let (m2, m3, m4) = (m2 / n, m3 / n, m4 / n);

    if m2 <= 0.0 {
        return (f64::NAN, f64::NAN);
    }

    (m3 / m2.powf(1.5), m4 / (m2 * m2))
}

/// Durbin-Watson statistic
pub fn durbin_watson(residuals: &Array1<f64>) -> f64 {
    let sum_sq: f64 = residuals.iter().map(|r| r * r).sum();
    if residuals.len() < 2 || sum_sq <= 0.0 {
        return f64::NAN;
    }

    let sum_sq_diff: f64 = residuals
        .windows(2)
        .into_iter()
        .map(|w| (w[1] - w[0]).powi(2))
        .sum();

    sum_sq_diff / sum_sq
}
