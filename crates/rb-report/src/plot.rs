//! Diagnostic plots rendered as SVG
//!
//! - [`partial_regression_grid`]: one added-variable panel per predictor
//! - [`regress_exog`]: fit, residual, partial regression and CCPR panels
//!   for a single predictor

mod svg;


use std::path::Path;

use tracing::info;

use rb_core::formula::INTERCEPT;
use rb_models::lm::{Diagnostics, LinearRegressionResult};

use crate::error::{ReportError, Result};
use svg::{Canvas, Layer, Panel, BLUE, GREY, RED};

/// Output size of a rendered plot, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotSize {
    pub width: u32,
    pub height: u32,
}

impl Default for PlotSize {
    fn default() -> Self {
        Self {
            width: 960,
            height: 720,
        }
    }
}

/// Design columns that get a panel: every column except the intercept
pub fn plot_terms(result: &LinearRegressionResult) -> Vec<String> {
    result
        .variable_names
        .iter()
        .filter(|name| name.as_str() != INTERCEPT)
        .cloned()
        .collect()
}

/// Added-variable plots of every predictor on a near-square grid
pub fn partial_regression_grid(result: &LinearRegressionResult, size: PlotSize) -> Result<String> {
    let terms = plot_terms(result);
    if terms.is_empty() {
        return Err(ReportError::Config {
            message: "model has no predictors to plot".to_string(),
        });
    }

    let response = response_name(result);
    let mut panels = Vec::with_capacity(terms.len());
    for name in &terms {
        panels.push(partial_regression_panel(result, name, &response, name.clone())?);
    }

    let columns = (terms.len() as f64).sqrt().ceil() as usize;
    Ok(Canvas {
        width: size.width,
        height: size.height,
        title: Some("Partial Regression Plot".to_string()),
        columns,
        panels,
    }
    .render())
}

/// Four-panel regression plot for the predictor `name`
pub fn regress_exog(result: &LinearRegressionResult, name: &str, size: PlotSize) -> Result<String> {
    let j = result.column_index(name)?;
    let response = response_name(result);
    let x = result.x.column(j).to_vec();
    let y = result.y.to_vec();
    let fitted = result.fitted_values.to_vec();
    let residuals = result.residuals.to_vec();

    let fit = Panel::new(format!("Y and Fitted vs. {name}"), name, response.as_str())
        .layer(Layer::points(&x, &y, BLUE))
        .layer(Layer::points(&x, &fitted, RED));

    let resid = Panel::new(format!("Residuals versus {name}"), name, "resid")
        .layer(Layer::points(&x, &residuals, BLUE))
        .layer(Layer::fit_line(&x, 0.0, 0.0, GREY));

    let partial = partial_regression_panel(result, name, &response, "Partial regression plot".to_string())?;

    let ccpr = Diagnostics::ccpr(result, name)?;
    let component = Panel::new("CCPR Plot", name, format!("{name} * beta + resid"))
        .layer(Layer::points(&ccpr.x.to_vec(), &ccpr.partial_residuals.to_vec(), BLUE))
        .layer(Layer::fit_line(&ccpr.x.to_vec(), 0.0, ccpr.slope, RED));

    Ok(Canvas {
        width: size.width,
        height: size.height,
        title: Some(format!("Regression Plots for {name}")),
        columns: 2,
        panels: vec![fit, resid, partial, component],
    }
    .render())
}

/// Write a rendered plot to `path`, creating parent directories
pub fn write_plot(path: &Path, svg: &str) -> Result<()> {
    let plot_error = |source: std::io::Error| ReportError::Plot {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(plot_error)?;
    }
    std::fs::write(path, svg).map_err(plot_error)?;
    info!(path = %path.display(), "wrote plot");
    Ok(())
}

fn partial_regression_panel(
    result: &LinearRegressionResult,
    name: &str,
    response: &str,
    title: String,
) -> Result<Panel> {
    let partial = Diagnostics::partial_regression(result, name)?;
    let xs = partial.x_resid.to_vec();
    let ys = partial.y_resid.to_vec();
    Ok(Panel::new(title, format!("e({name} | X)"), format!("e({response} | X)"))
        .layer(Layer::points(&xs, &ys, BLUE))
        .layer(Layer::fit_line(&xs, 0.0, partial.slope, RED)))
}

fn response_name(result: &LinearRegressionResult) -> String {
    result
        .formula
        .response
        .clone()
        .unwrap_or_else(|| "y".to_string())
}
