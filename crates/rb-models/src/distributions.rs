//! Tail probabilities used by the fit and the diagnostics.
//!
//! Invalid parameters (zero degrees of freedom, non-finite statistics)
//! yield `NaN`.

use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, StudentsT};

/// Two-tailed p-value of a Student-t statistic
pub(crate) fn students_t_two_tailed(t: f64, df: f64) -> f64 {
    if !t.is_finite() || df <= 0.0 {
        return f64::NAN;
    }
    StudentsT::new(0.0, 1.0, df)
        .map(|dist| (2.0 * dist.sf(t.abs())).min(1.0))
        .unwrap_or(f64::NAN)
}

/// Two-sided critical value of the Student-t distribution
pub(crate) fn students_t_critical(confidence: f64, df: f64) -> f64 {
    if df <= 0.0 {
        return f64::NAN;
    }
    StudentsT::new(0.0, 1.0, df)
        .map(|dist| dist.inverse_cdf(1.0 - (1.0 - confidence) / 2.0))
        .unwrap_or(f64::NAN)
}

/// Upper tail of the F distribution
pub(crate) fn f_upper_tail(f: f64, df_num: f64, df_denom: f64) -> f64 {
    if !f.is_finite() || f < 0.0 || df_num <= 0.0 || df_denom <= 0.0 {
        return f64::NAN;
    }
    FisherSnedecor::new(df_num, df_denom)
        .map(|dist| dist.sf(f))
        .unwrap_or(f64::NAN)
}

/// Upper tail of the χ² distribution
pub(crate) fn chi_squared_upper_tail(x: f64, df: f64) -> f64 {
    if !x.is_finite() || x < 0.0 || df <= 0.0 {
        return f64::NAN;
    }
    ChiSquared::new(df).map(|dist| dist.sf(x)).unwrap_or(f64::NAN)
}
