//! Configuration file handling.
//!
//! Settings are read from `regbook.toml`; CLI flags override them through
//! [`Config::merge_with_args`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use rb_core::data::CsvOptions;
use rb_models::LinearConfig;

use crate::cli::RunArgs;
use crate::error::ReportError;
use crate::layout::LayoutConfig;
use crate::plot::PlotSize;

/// Default configuration file name
pub const CONFIG_FILE: &str = "regbook.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// CSV parsing settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Results sheet layout.
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Diagnostic plot settings.
    #[serde(default)]
    pub plots: PlotConfig,
}

/// CSV parsing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Field delimiter, a single ASCII character.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Tokens read as missing values.
    #[serde(default = "default_na_values")]
    pub na_values: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            na_values: default_na_values(),
        }
    }
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_na_values() -> Vec<String> {
    CsvOptions::default().na_values
}

impl DataConfig {
    /// CSV reader options for these settings.
    pub fn csv_options(&self) -> crate::error::Result<CsvOptions> {
        let delimiter = match self.delimiter.as_bytes() {
            [byte] if byte.is_ascii() => *byte,
            _ => {
                return Err(ReportError::Config {
                    message: format!(
                        "data.delimiter must be a single ASCII character, got {:?}",
                        self.delimiter
                    ),
                })
            }
        };
        Ok(CsvOptions {
            delimiter,
            na_values: self.na_values.clone(),
            ..CsvOptions::default()
        })
    }
}

/// Model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Formula used when neither the CLI nor the workbook gives one.
    #[serde(default)]
    pub formula: Option<String>,

    /// Confidence level for coefficient and prediction intervals.
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,

    /// Relative singular value tolerance for the rank check.
    #[serde(default)]
    pub rank_tolerance: Option<f64>,

    /// Cook's distance threshold for influential points.
    #[serde(default)]
    pub influence_threshold: Option<f64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            formula: None,
            confidence_level: default_confidence_level(),
            rank_tolerance: None,
            influence_threshold: None,
        }
    }
}

fn default_confidence_level() -> f64 {
    0.95
}

impl ModelConfig {
    /// Fit settings for the linear model.
    pub fn linear_config(&self) -> LinearConfig {
        LinearConfig {
            confidence_level: self.confidence_level,
            rank_tolerance: self.rank_tolerance,
            influence_threshold: self.influence_threshold,
        }
    }
}

/// Diagnostic plot settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Render plots during `run`.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Output directory for SVG files.
    #[serde(default = "default_plot_dir")]
    pub dir: PathBuf,

    /// Predictors that get a four-panel regression plot.
    /// Empty means the first two non-intercept design columns.
    #[serde(default)]
    pub predictors: Vec<String>,

    /// Image width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Image height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: default_plot_dir(),
            predictors: Vec::new(),
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_plot_dir() -> PathBuf {
    PathBuf::from("plots")
}

fn default_width() -> u32 {
    PlotSize::default().width
}

fn default_height() -> u32 {
    PlotSize::default().height
}

impl PlotConfig {
    /// Rendered image size.
    pub fn size(&self) -> PlotSize {
        PlotSize {
            width: self.width,
            height: self.height,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with `run` arguments.
    ///
    /// Only values given explicitly on the command line take precedence.
    pub fn merge_with_args(&mut self, args: &RunArgs) {
        if let Some(ref formula) = args.formula {
            self.model.formula = Some(formula.clone());
        }
        if let Some(ref dir) = args.plots {
            self.plots.dir = dir.clone();
        }
        if args.no_plots {
            self.plots.enabled = false;
        }
        if let Some(delimiter) = args.delimiter {
            self.data.delimiter = delimiter.to_string();
        }
        if !args.predictors.is_empty() {
            self.plots.predictors = args.predictors.clone();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.delimiter, ",");
        assert!(config.data.na_values.contains(&"NA".to_string()));
        assert_eq!(config.model.confidence_level, 0.95);
        assert_eq!(config.layout.formula_cell, "K5");
        assert!(config.plots.enabled);
        assert_eq!(config.plots.dir, PathBuf::from("plots"));
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[data]
delimiter = ";"

[model]
formula = "y ~ x1 + x2"
confidence_level = 0.9

[layout]
formula_cell = "B2"

[layout.cells.r_squared]
label = "A1"
value = "B1"

[plots]
enabled = false
predictors = ["x2"]
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.data.delimiter, ";");
        assert_eq!(config.data.csv_options().unwrap().delimiter, b';');
        assert_eq!(config.model.formula.as_deref(), Some("y ~ x1 + x2"));
        assert_eq!(config.model.linear_config().confidence_level, 0.9);
        assert_eq!(config.layout.formula_cell, "B2");
        assert_eq!(config.layout.sheet, "Results");
        assert_eq!(config.layout.cells["r_squared"].value, "B1");
        assert!(!config.plots.enabled);
        assert_eq!(config.plots.predictors, vec!["x2"]);
        assert_eq!(config.plots.width, 960);
    }

    #[test]
    fn test_bad_delimiter() {
        let config = Config {
            data: DataConfig {
                delimiter: "||".to_string(),
                ..DataConfig::default()
            },
            ..Config::default()
        };
        assert!(config.data.csv_options().is_err());
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        let args = RunArgs {
            data: PathBuf::from("data.csv"),
            workbook: PathBuf::from("book.json"),
            formula: Some("y ~ x".to_string()),
            plots: Some(PathBuf::from("out")),
            no_plots: false,
            delimiter: Some('\t'),
            predictors: vec![],
        };
        config.merge_with_args(&args);

        assert_eq!(config.model.formula.as_deref(), Some("y ~ x"));
        assert_eq!(config.plots.dir, PathBuf::from("out"));
        assert!(config.plots.enabled);
        assert_eq!(config.data.csv_options().unwrap().delimiter, b'\t');
        assert!(config.plots.predictors.is_empty());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[model]"));
        assert!(toml_str.contains("[layout]"));
        assert!(toml_str.contains("[plots]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[plots]\nwidth = 640\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.plots.width, 640);
        assert_eq!(config.plots.height, 720);

        assert!(Config::load(&dir.path().join("missing.toml")).is_err());
    }
}
