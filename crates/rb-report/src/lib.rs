//! Workbook reporting for regbook
//!
//! [`pipeline::run`] loads a CSV, fits the formula found in the workbook (or
//! given on the command line), writes the labelled diagnostics into fixed
//! cells through [`writer`] and renders the [`plot`] SVGs.

pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod plot;
pub mod report;
pub mod workbook;
pub mod writer;

pub use config::Config;
pub use error::{ReportError, WorkbookError};
pub use report::DiagnosticReport;
pub use workbook::{CellRef, CellValue, JsonWorkbook, Workbook};
