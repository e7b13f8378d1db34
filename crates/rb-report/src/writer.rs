//! Writes data, formula and the diagnostic report into a workbook

use tracing::{debug, info};

use rb_core::data::{DataFrame, Value};

use crate::error::{ReportError, Result, WorkbookError};
use crate::layout::Layout;
use crate::report::DiagnosticReport;
use crate::workbook::{CellRef, CellValue, Workbook};


/// Write every report entry to its labelled cells.
///
/// Vector blocks are cleared from their anchor down before being written,
/// so a shorter block never leaves stale rows behind. Returns the number of
/// cells written.
pub fn write_report<W: Workbook + ?Sized>(
    workbook: &mut W,
    report: &DiagnosticReport,
    layout: &Layout,
) -> Result<usize> {
    let mut written = 0;

    for entry in &report.scalars {
        let placement = layout
            .placement(&entry.key)
            .ok_or_else(|| missing_placement(&entry.key))?;
        workbook.write(&placement.label, CellValue::text(entry.label.as_str()));
        workbook.write(&placement.value, CellValue::number(entry.value));
        written += 2;
    }

    for block in &report.blocks {
        let placement = layout
            .placement(&block.key)
            .ok_or_else(|| missing_placement(&block.key))?;
        workbook.write(&placement.label, CellValue::text(block.label.as_str()));
        written += 1;

        let anchor = &placement.value;
        workbook.clear_below(anchor, 2);
        for (i, (key, value)) in block.entries.iter().enumerate() {
            let row = index_offset(anchor, i)?;
            workbook.write(&anchor.offset(row, 0)?, key.clone());
            workbook.write(&anchor.offset(row, 1)?, CellValue::number(*value));
            written += 2;
        }
        debug!(block = %block.key, rows = block.entries.len(), anchor = %anchor, "wrote block");
    }

    info!(cells = written, "wrote diagnostic report");
    Ok(written)
}

/// Copy a data frame to the workbook with its header row at `anchor`.
///
/// Missing values become empty cells. Returns the number of cells written.
pub fn write_data<W: Workbook + ?Sized>(
    workbook: &mut W,
    data: &DataFrame,
    anchor: &CellRef,
) -> Result<usize> {
    let width = u32::try_from(data.ncols())
        .map_err(|_| WorkbookError::invalid_cell(&anchor.to_string(), "too many columns"))?;
    workbook.clear_below(anchor, width);

    let mut written = 0;
    for (j, (name, series)) in data.columns().enumerate() {
        let col = index_offset(anchor, j)?;
        workbook.write(&anchor.offset(0, col)?, CellValue::text(name));
        written += 1;

        for i in 0..series.len() {
            let value = if series.is_missing(i) {
                CellValue::Empty
            } else {
                match series.get(i) {
                    Some(Value::Float(v)) => CellValue::number(v),
                    Some(Value::Int(v)) => CellValue::Number(v as f64),
                    Some(Value::Bool(v)) => CellValue::Bool(v),
                    Some(Value::Text(s)) => CellValue::Text(s),
                    None => CellValue::Empty,
                }
            };
            if !value.is_empty() {
                written += 1;
            }
            workbook.write(&anchor.offset(index_offset(anchor, i + 1)?, col)?, value);
        }
    }

    info!(rows = data.nrows(), cols = data.ncols(), anchor = %anchor, "copied data to workbook");
    Ok(written)
}

/// Read the regression formula from `cell`
pub fn read_formula<W: Workbook + ?Sized>(
    workbook: &W,
    cell: &CellRef,
) -> std::result::Result<String, WorkbookError> {
    let value = workbook.read(cell);
    value
        .as_ref()
        .and_then(CellValue::as_text)
        .map(|s| s.trim().to_string())
        .ok_or_else(|| WorkbookError::MissingFormula {
            cell: cell.to_string(),
        })
}

/// Store the regression formula in `cell`
pub fn write_formula<W: Workbook + ?Sized>(workbook: &mut W, cell: &CellRef, formula: &str) {
    workbook.write(cell, CellValue::text(formula.trim()));
}

fn index_offset(anchor: &CellRef, i: usize) -> std::result::Result<u32, WorkbookError> {
    u32::try_from(i)
        .map_err(|_| WorkbookError::invalid_cell(&anchor.to_string(), "offset leaves the sheet"))
}

fn missing_placement(key: &str) -> ReportError {
    ReportError::Config {
        message: format!("no cell layout for report entry '{key}'"),
    }
}
