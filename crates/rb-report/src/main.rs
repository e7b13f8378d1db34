//! regbook - OLS regression notebook
//!
//! Loads a CSV, fits the model formula, writes the diagnostics into a
//! workbook and renders the diagnostic plots.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (bad formula, unreadable data or workbook, config error)

use anyhow::{bail, Context, Result};
use std::path::Path;
use tracing::{debug, error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rb_models::lm::Diagnostics;
use rb_report::cli::{Args, Command, ModelArgs, PredictArgs, RunArgs};
use rb_report::config::{Config, CONFIG_FILE};
use rb_report::pipeline::{self, RunOptions};
use rb_report::DiagnosticReport;

fn main() {
    let args = Args::parse_args();

    if let Command::InitConfig { force } = args.command {
        if let Err(e) = handle_init_config(force) {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = init_logging(&args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

    info!("regbook v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = dispatch(&args) {
        error!("regbook failed: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn dispatch(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    match &args.command {
        Command::Run(run) => handle_run(config, run),
        Command::Summary(model) => handle_summary(config, model),
        Command::Predict(predict) => handle_predict(config, predict),
        Command::InitConfig { force } => handle_init_config(*force),
    }
}

/// Handle `init-config`: generate a default regbook.toml.
fn handle_init_config(force: bool) -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() && !force {
        bail!("{CONFIG_FILE} already exists. Remove it first, edit it manually or pass --force.");
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {CONFIG_FILE}"))?;

    println!("Created {CONFIG_FILE} with default settings.");
    println!("Edit it to set the formula, cell layout and plot options.");
    Ok(())
}

/// Initialize logging from RUST_LOG, falling back to the verbosity flags.
fn init_logging(args: &Args) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::default().add_directive(LevelFilter::from_level(args.log_level()).into()),
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    match &args.config {
        Some(path) => Config::load(path),
        None => Ok(Config::load_default()?.unwrap_or_default()),
    }
}

fn handle_run(mut config: Config, args: &RunArgs) -> Result<()> {
    config.merge_with_args(args);
    let options = RunOptions {
        data: args.data.clone(),
        workbook: args.workbook.clone(),
    };

    let outcome = pipeline::run(&config, &options).with_context(|| {
        format!(
            "Failed to run {} against {}",
            options.data.display(),
            options.workbook.display()
        )
    })?;

    println!("Formula:  {}", outcome.formula);
    println!("Workbook: {} ({} cells written)", options.workbook.display(), outcome.cells_written);
    for plot in &outcome.plots {
        println!("Plot:     {}", plot.display());
    }
    Ok(())
}

fn handle_summary(config: Config, args: &ModelArgs) -> Result<()> {
    let result = fit_from_args(config, args)?;
    let diagnostics = Diagnostics::run_all(&result);
    let report = DiagnosticReport::extract(&result, &diagnostics);

    println!("{result}");
    println!("{report}");
    Ok(())
}

fn handle_predict(config: Config, args: &PredictArgs) -> Result<()> {
    let result = fit_from_args(config, &args.model)?;
    let prediction = pipeline::predict_one(&result, &args.values)
        .context("Failed to build the prediction design")?;

    let level = result.confidence_level * 100.0;
    println!("Prediction: {:.6}", prediction.mean[0]);
    println!(
        "{level:.0}% CI (mean):        [{:.6}, {:.6}]",
        prediction.ci_lower[0], prediction.ci_upper[0]
    );
    println!(
        "{level:.0}% PI (observation): [{:.6}, {:.6}]",
        prediction.pi_lower[0], prediction.pi_upper[0]
    );
    Ok(())
}

fn fit_from_args(mut config: Config, args: &ModelArgs) -> Result<rb_models::LinearRegressionResult> {
    if let Some(delimiter) = args.delimiter {
        config.data.delimiter = delimiter.to_string();
    }
    let Some(formula) = args.formula.clone().or(config.model.formula.clone()) else {
        bail!("No formula given: pass --formula or set model.formula in {CONFIG_FILE}");
    };

    let data = pipeline::load_data(&args.data, &config.data)
        .with_context(|| format!("Failed to load {}", args.data.display()))?;
    let result = pipeline::fit(&data, &formula, &config.model)
        .with_context(|| format!("Failed to fit '{formula}'"))?;
    Ok(result)
}
