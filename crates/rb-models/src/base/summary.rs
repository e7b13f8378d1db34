//! Model summary structures

use super::coefficient::Coefficient;
use super::statistics::{ModelStatistics, ResidualStatistics};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Printable summary of a fitted model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    /// Model formula
    pub formula: String,
    /// Number of observations
    pub n_obs: usize,
    /// Number of predictors (including intercept)
    pub n_predictors: usize,
    /// Coefficients table
    pub coefficients: Vec<Coefficient>,
    /// Model statistics
    pub model_statistics: ModelStatistics,
    /// Residual statistics
    pub residual_statistics: ResidualStatistics,
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.model_statistics;
        let resid = &self.residual_statistics;

        writeln!(f, "OLS Regression Results")?;
        writeln!(f, "======================")?;
        writeln!(f, "Formula:             {}", self.formula)?;
        writeln!(f, "Observations:        {}", self.n_obs)?;
        writeln!(f, "Df Residuals:        {}", stats.df_residual)?;
        writeln!(f, "Df Model:            {}", stats.df_model)?;
        writeln!(f, "R-squared:           {:.4}", stats.r_squared)?;
        writeln!(f, "Adj. R-squared:      {:.4}", stats.adj_r_squared)?;
        writeln!(f, "F-statistic:         {:.4}", stats.f_statistic)?;
        writeln!(f, "Prob (F-statistic):  {:.4e}", stats.f_p_value)?;
        writeln!(f, "Log-Likelihood:      {:.4}", stats.log_likelihood)?;
        writeln!(f, "AIC:                 {:.4}", stats.aic)?;
        writeln!(f, "BIC:                 {:.4}", stats.bic)?;
        writeln!(f)?;

        writeln!(
            f,
            "{:<20} {:>12} {:>12} {:>10} {:>10} {:>12} {:>12}",
            "", "coef", "std err", "t", "P>|t|", "[lower", "upper]"
        )?;
        writeln!(f, "{:-<98}", "")?;

        for coeff in &self.coefficients {
            writeln!(
                f,
                "{:<20} {:>12.4} {:>12.4} {:>10.3} {:>10.3} {:>12.4} {:>12.4} {}",
                coeff.name,
                coeff.estimate,
                coeff.std_error,
                coeff.t_value,
                coeff.p_value,
                coeff.conf_int.0,
                coeff.conf_int.1,
                coeff.stars()
            )?;
        }
        writeln!(f, "{:-<98}", "")?;
        writeln!(f, "Signif. codes: 0 '***' 0.001 '**' 0.01 '*' 0.05 '.' 0.1 ' ' 1")?;

        writeln!(
            f,
            "Residuals: min {:.4}  q1 {:.4}  median {:.4}  q3 {:.4}  max {:.4}",
            resid.min, resid.q1, resid.median, resid.q3, resid.max
        )?;
        writeln!(
            f,
            "Skew: {:.4}  Kurtosis: {:.4}  Durbin-Watson: {:.4}",
            resid.skewness, resid.kurtosis, resid.durbin_watson
        )?;

        Ok(())
    }
}
