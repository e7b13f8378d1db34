//! End-to-end regression run
//!
//! 1. Load the CSV
//! 2. Copy it into the workbook and resolve the formula cell
//! 3. Fit OLS and run the diagnostics
//! 4. Write the labelled report cells
//! 5. Render plots and save the workbook

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use rb_core::data::{read_csv, DataFrame, Series};
use rb_models::lm::{DiagnosticResults, Diagnostics, LinearRegression, PredictionIntervals};
use rb_models::LinearRegressionResult;

use crate::config::{Config, DataConfig, ModelConfig, PlotConfig};
use crate::error::{ReportError, Result};
use crate::layout::Layout;
use crate::plot::{self, PlotSize};
use crate::report::DiagnosticReport;
use crate::workbook::JsonWorkbook;
use crate::writer;


/// Inputs of a full run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub data: PathBuf,
    pub workbook: PathBuf,
}

/// Everything a run produced
#[derive(Debug)]
pub struct RunOutcome {
    pub formula: String,
    pub result: LinearRegressionResult,
    pub diagnostics: DiagnosticResults,
    pub report: DiagnosticReport,
    pub cells_written: usize,
    pub plots: Vec<PathBuf>,
}

/// Run the whole notebook against a workbook file.
///
/// With `model.formula` set the formula is written to the formula cell and
/// a missing workbook is created; otherwise the formula is read from the
/// existing workbook.
pub fn run(config: &Config, options: &RunOptions) -> Result<RunOutcome> {
    let data = load_data(&options.data, &config.data)?;
    let layout = Layout::from_config(&config.layout)?;

    let mut workbook = match config.model.formula {
        Some(_) => JsonWorkbook::open_or_create(&options.workbook)?,
        None => JsonWorkbook::open(&options.workbook)?,
    };

    writer::write_data(&mut workbook, &data, &layout.data_anchor)?;

    let formula = match &config.model.formula {
        Some(formula) => {
            writer::write_formula(&mut workbook, &layout.formula_cell, formula);
            formula.trim().to_string()
        }
        None => writer::read_formula(&workbook, &layout.formula_cell)?,
    };
    info!(formula = %formula, cell = %layout.formula_cell, "using formula");

    let result = fit(&data, &formula, &config.model)?;
    let diagnostics = Diagnostics::run_all(&result);
    log_influence(&result, &diagnostics);

    let report = DiagnosticReport::extract(&result, &diagnostics);
    let cells_written = writer::write_report(&mut workbook, &report, &layout)?;

    let plots = if config.plots.enabled {
        render_plots(&result, &config.plots)?
    } else {
        debug!("plots disabled");
        Vec::new()
    };

    workbook.save()?;

    Ok(RunOutcome {
        formula,
        result,
        diagnostics,
        report,
        cells_written,
        plots,
    })
}

/// Read the CSV with the configured parsing options
pub fn load_data(path: &Path, config: &DataConfig) -> Result<DataFrame> {
    let data = read_csv(path, &config.csv_options()?)?;
    info!(path = %path.display(), rows = data.nrows(), cols = data.ncols(), "loaded data");
    Ok(data)
}

/// Fit OLS for `formula` with the configured fit settings
pub fn fit(data: &DataFrame, formula: &str, config: &ModelConfig) -> Result<LinearRegressionResult> {
    let result = LinearRegression::new(formula)?
        .data(data)
        .config(config.linear_config())
        .fit()?
        .into_result()?;

    let dropped = data.nrows() - result.n_obs();
    if dropped > 0 {
        warn!(dropped, "rows with missing values were excluded from the fit");
    }
    info!(
        n = result.n_obs(),
        p = result.n_predictors(),
        r_squared = result.model_statistics.r_squared,
        "fitted OLS model"
    );
    Ok(result)
}

/// Render the partial regression grid and the per-predictor plots into
/// `config.dir`, returning the written paths
pub fn render_plots(result: &LinearRegressionResult, config: &PlotConfig) -> Result<Vec<PathBuf>> {
    let terms = plot::plot_terms(result);
    if terms.is_empty() {
        warn!("model has no predictors, skipping plots");
        return Ok(Vec::new());
    }

    let size: PlotSize = config.size();
    let mut written = Vec::new();

    let grid = config.dir.join("partregress_grid.svg");
    plot::write_plot(&grid, &plot::partial_regression_grid(result, size)?)?;
    written.push(grid);

    let predictors: Vec<String> = if config.predictors.is_empty() {
        terms.into_iter().take(2).collect()
    } else {
        config.predictors.clone()
    };

    for name in &predictors {
        let path = config.dir.join(format!("regress_exog_{}.svg", file_stem(name)));
        plot::write_plot(&path, &plot::regress_exog(result, name, size)?)?;
        written.push(path);
    }

    Ok(written)
}

/// Predict one new observation given as `name=value` pairs.
///
/// Values that parse as numbers become numeric columns and `true`/`false`
/// boolean ones; anything else is treated as a categorical level.
pub fn predict_one(
    result: &LinearRegressionResult,
    values: &[(String, String)],
) -> Result<PredictionIntervals> {
    let mut frame = DataFrame::new();
    for (name, value) in values {
        let series = match (value.parse::<f64>(), value.as_str()) {
            (Ok(v), _) => Series::float(vec![v]),
            (Err(_), "true" | "True" | "TRUE") => Series::bool(vec![true]),
            (Err(_), "false" | "False" | "FALSE") => Series::bool(vec![false]),
            (Err(_), _) => Series::string(vec![value.clone()]),
        };
        frame = frame.with_column(name.as_str(), series)?;
    }

    let design = result.formula.exog(&frame, &result.levels)?;
    if design.nobs() != 1 {
        return Err(ReportError::Config {
            message: "prediction values contain a missing value".to_string(),
        });
    }
    Ok(result.predict_intervals(&design.x)?)
}

fn log_influence(result: &LinearRegressionResult, diagnostics: &DiagnosticResults) {
    for point in &diagnostics.cooks_outliers {
        warn!(
            row = point.row,
            cooks_distance = point.distance,
            threshold = point.threshold,
            "influential observation"
        );
    }
    for (i, t) in result.studentized_residuals().iter().enumerate() {
        if t.abs() > 3.0 {
            warn!(row = result.rows[i], studentized = *t, "outlying residual");
        }
    }
    if !diagnostics.high_leverage.is_empty() {
        debug!(count = diagnostics.high_leverage.len(), "high-leverage observations");
    }
}

/// File-name-safe form of a design column name
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
