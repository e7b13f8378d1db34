//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// regbook - OLS regression notebook for spreadsheets
///
/// Fits an ordinary least squares model from an R-style formula, runs the
/// regression diagnostics and writes labelled results into a workbook.
///
/// Examples:
///   regbook run --data cars.csv --workbook book.json --formula "mpg ~ wt + hp"
///   regbook run --data cars.csv --workbook book.json --no-plots
///   regbook summary --data cars.csv --formula "mpg ~ wt * hp"
///   regbook predict --data cars.csv --formula "mpg ~ wt" --set wt=3.2
///   regbook init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for regbook.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true, env = "REGBOOK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fit the model, write diagnostics to the workbook and render plots
    Run(RunArgs),

    /// Print the model summary and diagnostics
    Summary(ModelArgs),

    /// Predict the response for one new observation
    Predict(PredictArgs),

    /// Generate a default regbook.toml configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Arguments of `regbook run`.
#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    /// CSV file with a header row
    #[arg(short, long, value_name = "CSV")]
    pub data: PathBuf,

    /// Workbook file (JSON); created when missing and a formula is given
    #[arg(short, long, value_name = "FILE")]
    pub workbook: PathBuf,

    /// Regression formula, also stored in the workbook formula cell
    ///
    /// When omitted the formula is read from the workbook (Results!K5).
    #[arg(short, long, value_name = "FORMULA")]
    pub formula: Option<String>,

    /// Directory for the SVG plots
    #[arg(long, value_name = "DIR")]
    pub plots: Option<PathBuf>,

    /// Skip plot rendering
    #[arg(long, conflicts_with = "plots")]
    pub no_plots: bool,

    /// CSV field delimiter
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,

    /// Predictors that get a four-panel regression plot (comma-separated)
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub predictors: Vec<String>,
}

/// Data and formula for the commands that only fit a model.
#[derive(ClapArgs, Debug, Clone)]
pub struct ModelArgs {
    /// CSV file with a header row
    #[arg(short, long, value_name = "CSV")]
    pub data: PathBuf,

    /// Regression formula; falls back to `model.formula` from the config
    #[arg(short, long, value_name = "FORMULA")]
    pub formula: Option<String>,

    /// CSV field delimiter
    #[arg(long, value_name = "CHAR")]
    pub delimiter: Option<char>,
}

/// Arguments of `regbook predict`.
#[derive(ClapArgs, Debug, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Predictor value of the new observation, repeatable
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment, required = true)]
    pub values: Vec<(String, String)>,
}

/// Parse a `name=value` pair.
fn parse_assignment(text: &str) -> Result<(String, String), String> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{text}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in '{text}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args() {
        let args = Args::try_parse_from([
            "regbook", "run", "--data", "cars.csv", "--workbook", "book.json", "--formula",
            "mpg ~ wt", "--predictors", "wt,hp", "-v",
        ])
        .unwrap();

        assert!(args.verbose);
        match args.command {
            Command::Run(run) => {
                assert_eq!(run.data, PathBuf::from("cars.csv"));
                assert_eq!(run.workbook, PathBuf::from("book.json"));
                assert_eq!(run.formula.as_deref(), Some("mpg ~ wt"));
                assert_eq!(run.predictors, vec!["wt", "hp"]);
                assert!(!run.no_plots);
            }
            other => panic!("Expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_run_requires_workbook() {
        assert!(Args::try_parse_from(["regbook", "run", "--data", "cars.csv"]).is_err());
    }

    #[test]
    fn test_conflicting_options() {
        assert!(Args::try_parse_from(["regbook", "-v", "-q", "init-config"]).is_err());
        assert!(Args::try_parse_from([
            "regbook", "run", "-d", "a.csv", "-w", "b.json", "--plots", "out", "--no-plots",
        ])
        .is_err());
    }

    #[test]
    fn test_predict_assignments() {
        let args = Args::try_parse_from([
            "regbook", "predict", "--data", "cars.csv", "--formula", "mpg ~ wt + g", "--set",
            "wt=3.2", "--set", "g = b",
        ])
        .unwrap();

        match args.command {
            Command::Predict(predict) => {
                assert_eq!(predict.model.data, PathBuf::from("cars.csv"));
                assert_eq!(
                    predict.values,
                    vec![
                        ("wt".to_string(), "3.2".to_string()),
                        ("g".to_string(), "b".to_string())
                    ]
                );
            }
            other => panic!("Expected predict, got {other:?}"),
        }

        assert!(parse_assignment("wt").is_err());
        assert!(parse_assignment("=3").is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = Args::try_parse_from(["regbook", "init-config"]).unwrap();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
