//! Spreadsheet workbook abstraction
//!
//! Cells are addressed with [`CellRef`] (A1 notation qualified by a sheet)
//! and hold a [`CellValue`]. [`JsonWorkbook`] is the on-disk implementation:
//! a JSON document mapping sheet names to `{ "A1": value }` maps.

mod cell;
mod json;

#[cfg(test)]
mod tests;

pub use cell::{column_name, CellRef, MAX_COLUMN, MAX_ROW};
pub use json::JsonWorkbook;

use serde::{Deserialize, Serialize};

/// Value stored in a single cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Bool(bool),
    Text(String),
    Empty,
}

impl CellValue {
    /// Numeric cell; non-finite values are stored as their text form
    /// (`NaN`, `inf`) since JSON has no representation for them
    pub fn number(value: f64) -> Self {
        if value.is_finite() {
            CellValue::Number(value)
        } else {
            CellValue::Text(value.to_string())
        }
    }

    /// Text cell
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Text content, if this is a non-blank text cell
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric content, parsing `NaN`/`inf` text written by [`CellValue::number`]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            CellValue::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::number(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::text(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

/// Cell-level access to a workbook
pub trait Workbook {
    /// Value of a cell, `None` when the cell was never written
    fn read(&self, cell: &CellRef) -> Option<CellValue>;

    /// Overwrite a cell; writing [`CellValue::Empty`] clears it
    fn write(&mut self, cell: &CellRef, value: CellValue);

    /// Clear the `width` columns starting at `anchor`, from the anchor row down
    fn clear_below(&mut self, anchor: &CellRef, width: u32);

    /// Names of the sheets that hold at least one cell
    fn sheet_names(&self) -> Vec<String>;
}
