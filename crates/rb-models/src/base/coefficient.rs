//! One row of the coefficient table

use rb_core::formula::INTERCEPT;
use serde::{Deserialize, Serialize};

/// Estimate and inference for a single design column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_value: f64,
    /// Two-sided p-value of the t test
    pub p_value: f64,
    /// Confidence interval at the fitted confidence level
    pub conf_int: (f64, f64),
}

impl Coefficient {
    pub fn is_intercept(&self) -> bool {
        self.name == INTERCEPT
    }

    /// Significance code as printed by R: `***` below 0.001 down to blank
    pub fn stars(&self) -> &'static str {
        match self.p_value {
            p if p < 0.001 => "***",
            p if p < 0.01 => "**",
            p if p < 0.05 => "*",
            p if p < 0.1 => ".",
            _ => "",
        }
    }
}
