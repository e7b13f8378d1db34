//! Diagnostic report assembled from a fitted model
//!
//! [`DiagnosticReport::extract`] only copies fields out of the fitted
//! result and its diagnostics; nothing is recomputed here.

use serde::Serialize;

use rb_models::lm::{DiagnosticResults, LinearRegressionResult};
use rb_models::{Coefficient, ModelResultTrait};

use crate::workbook::CellValue;

/// Stable keys naming each report entry, used by the cell layout
pub mod keys {
    pub const R_SQUARED: &str = "r_squared";
    pub const R_SQUARED_ADJ: &str = "r_squared_adj";
    pub const F_P_VALUE: &str = "f_p_value";
    pub const AIC: &str = "aic";
    pub const HARVEY_COLLIER_T: &str = "harvey_collier_t";
    pub const HARVEY_COLLIER_P: &str = "harvey_collier_p";
    pub const RAINBOW_F: &str = "rainbow_f";
    pub const RAINBOW_P: &str = "rainbow_p";
    pub const JARQUE_BERA: &str = "jarque_bera";
    pub const JARQUE_BERA_P: &str = "jarque_bera_p";
    pub const SKEW: &str = "skew";
    pub const KURTOSIS: &str = "kurtosis";
    pub const BP_LM: &str = "breusch_pagan_lm";
    pub const BP_LM_P: &str = "breusch_pagan_lm_p";
    pub const BP_F: &str = "breusch_pagan_f";
    pub const BP_F_P: &str = "breusch_pagan_f_p";

    pub const RESIDUALS: &str = "residuals";
    pub const COEFFICIENTS: &str = "coefficients";
    pub const P_VALUES: &str = "p_values";
}

/// A labelled scalar statistic
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalarEntry {
    pub key: String,
    pub label: String,
    pub value: f64,
}

/// A labelled column of `(key, value)` pairs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorBlock {
    pub key: String,
    pub label: String,
    pub entries: Vec<(CellValue, f64)>,
}

/// Everything written to the results sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticReport {
    pub scalars: Vec<ScalarEntry>,
    pub blocks: Vec<VectorBlock>,
}

impl DiagnosticReport {
    /// Collect the report entries from a fitted model and its diagnostics
    pub fn extract(result: &LinearRegressionResult, diagnostics: &DiagnosticResults) -> Self {
        let stats = result.statistics();
        let jb = &diagnostics.jarque_bera;
        let bp = &diagnostics.breusch_pagan;
        let hc = &diagnostics.harvey_collier;
        let rainbow = &diagnostics.rainbow;

        let scalars = [
            (keys::R_SQUARED, "R^2", stats.r_squared),
            (keys::R_SQUARED_ADJ, "R^2 Adjusted", stats.adj_r_squared),
            (keys::F_P_VALUE, "p-value", stats.f_p_value),
            (keys::AIC, "AIC", stats.aic),
            (keys::HARVEY_COLLIER_T, "Harvey-Collier t-value", hc.t_statistic),
            (keys::HARVEY_COLLIER_P, "Harvey-Collier p-value", hc.p_value),
            (keys::RAINBOW_F, "Rainbow F-value", rainbow.f_statistic),
            (keys::RAINBOW_P, "Rainbow p-value", rainbow.p_value),
            (keys::JARQUE_BERA, "Jarque-Bera", jb.statistic),
            (keys::JARQUE_BERA_P, "Chi^2 two-tail", jb.p_value),
            (keys::SKEW, "Skew", jb.skewness),
            (keys::KURTOSIS, "Kurtosis", jb.kurtosis),
            (keys::BP_LM, "Lagrange Multiplier", bp.lm_statistic),
            (keys::BP_LM_P, "p-value", bp.lm_p_value),
            (keys::BP_F, "f-value", bp.f_statistic),
            (keys::BP_F_P, "f p-value", bp.f_p_value),
        ]
        .into_iter()
        .map(|(key, label, value)| ScalarEntry {
            key: key.to_string(),
            label: label.to_string(),
            value,
        })
        .collect();

        let residuals = result
            .rows
            .iter()
            .zip(result.residuals.iter())
            .map(|(&row, &e)| (CellValue::Number(row as f64), e))
            .collect();

        let table = result.coefficients();
        let by_name = |value: fn(&Coefficient) -> f64| {
            table
                .iter()
                .map(|c| (CellValue::text(c.name.as_str()), value(c)))
                .collect::<Vec<_>>()
        };

        let blocks = vec![
            VectorBlock {
                key: keys::RESIDUALS.to_string(),
                label: "residuals".to_string(),
                entries: residuals,
            },
            VectorBlock {
                key: keys::COEFFICIENTS.to_string(),
                label: "Coefficients".to_string(),
                entries: by_name(|c| c.estimate),
            },
            VectorBlock {
                key: keys::P_VALUES.to_string(),
                label: "P>|t|".to_string(),
                entries: by_name(|c| c.p_value),
            },
        ];

        Self { scalars, blocks }
    }

    /// Value of a scalar entry by key
    pub fn scalar(&self, key: &str) -> Option<f64> {
        self.scalars.iter().find(|s| s.key == key).map(|s| s.value)
    }

    /// Vector block by key
    pub fn block(&self, key: &str) -> Option<&VectorBlock> {
        self.blocks.iter().find(|b| b.key == key)
    }
}

impl std::fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Diagnostics")?;
        writeln!(f, "===========")?;
        for entry in &self.scalars {
            let label = format!("{} ({})", entry.label, entry.key);
            writeln!(f, "{label:<44} {:>14.6}", entry.value)?;
        }
        Ok(())
    }
}
