//! Cell layout of the results sheet
//!
//! Every report entry has a label cell and a value cell. Vector blocks use
//! their value cell as the top-left anchor of a two-column `key | value`
//! table growing downward.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::report::keys;
use crate::workbook::CellRef;

/// Default `(key, label cell, value cell)` table of the results sheet
const DEFAULT_CELLS: &[(&str, &str, &str)] = &[
    (keys::R_SQUARED, "O6", "P6"),
    (keys::R_SQUARED_ADJ, "O7", "P7"),
    (keys::F_P_VALUE, "O8", "P8"),
    (keys::AIC, "O9", "P9"),
    (keys::HARVEY_COLLIER_T, "O10", "P10"),
    (keys::HARVEY_COLLIER_P, "O11", "P11"),
    (keys::RAINBOW_F, "O12", "P12"),
    (keys::RAINBOW_P, "O13", "P13"),
    (keys::JARQUE_BERA, "R6", "S6"),
    (keys::JARQUE_BERA_P, "R7", "S7"),
    (keys::SKEW, "R8", "S8"),
    (keys::KURTOSIS, "R9", "S9"),
    (keys::BP_LM, "R12", "S12"),
    (keys::BP_LM_P, "R13", "S13"),
    (keys::BP_F, "R14", "S14"),
    (keys::BP_F_P, "R15", "S15"),
    (keys::RESIDUALS, "Z3", "Z6"),
    (keys::COEFFICIENTS, "R17", "S17"),
    (keys::P_VALUES, "O17", "P17"),
];

/// Label and value cell of an entry, as written in the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellPair {
    pub label: String,
    pub value: String,
}

/// `[layout]` section of the configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Sheet holding the report and the formula cell
    pub sheet: String,
    /// Sheet the source data is copied to
    pub data_sheet: String,
    /// Top-left cell of the copied data
    pub data_anchor: String,
    /// Cell holding the model formula
    pub formula_cell: String,
    /// Per-entry overrides of the default cells
    pub cells: BTreeMap<String, CellPair>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            sheet: "Results".to_string(),
            data_sheet: "Data".to_string(),
            data_anchor: "A1".to_string(),
            formula_cell: "K5".to_string(),
            cells: BTreeMap::new(),
        }
    }
}

/// Where a report entry is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub label: CellRef,
    pub value: CellRef,
}

/// Resolved cell layout
#[derive(Debug, Clone)]
pub struct Layout {
    pub data_anchor: CellRef,
    pub formula_cell: CellRef,
    placements: IndexMap<String, Placement>,
}

impl Layout {
    /// Resolve a layout config into cell references, applying overrides
    pub fn from_config(config: &LayoutConfig) -> Result<Self> {
        if let Some(key) = config
            .cells
            .keys()
            .find(|key| !DEFAULT_CELLS.iter().any(|(k, _, _)| k == key))
        {
            return Err(ReportError::Config {
                message: format!(
                    "unknown layout entry '{key}'; known entries: {}",
                    DEFAULT_CELLS
                        .iter()
                        .map(|(k, _, _)| *k)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            });
        }

        let sheet = config.sheet.as_str();
        let mut placements = IndexMap::with_capacity(DEFAULT_CELLS.len());
        for &(key, label, value) in DEFAULT_CELLS {
            let placement = match config.cells.get(key) {
                Some(pair) => Placement {
                    label: CellRef::parse(&pair.label, sheet)?,
                    value: CellRef::parse(&pair.value, sheet)?,
                },
                None => Placement {
                    label: CellRef::parse(label, sheet)?,
                    value: CellRef::parse(value, sheet)?,
                },
            };
            placements.insert(key.to_string(), placement);
        }

        Ok(Self {
            data_anchor: CellRef::parse(&config.data_anchor, &config.data_sheet)?,
            formula_cell: CellRef::parse(&config.formula_cell, sheet)?,
            placements,
        })
    }

    /// Default layout
    pub fn standard() -> Result<Self> {
        Self::from_config(&LayoutConfig::default())
    }

    /// Placement of a report entry
    pub fn placement(&self, key: &str) -> Option<&Placement> {
        self.placements.get(key)
    }

    /// All placements in layout order
    pub fn placements(&self) -> impl Iterator<Item = (&str, &Placement)> {
        self.placements.iter().map(|(k, p)| (k.as_str(), p))
    }
}
