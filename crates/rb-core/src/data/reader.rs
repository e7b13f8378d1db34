//! CSV loading with per-column type inference
//!
//! Every column is read as text first, then narrowed to the most specific
//! type all of its present values agree on: Int, then Float, then Bool,
//! falling back to String. Integer columns with missing values become Float
//! so the gap can be carried as `NaN`.

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use super::*;

/// Options controlling how a CSV file is parsed
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter
    pub delimiter: u8,
    /// Tokens read as a missing value
    pub na_values: Vec<String>,
    /// Trim whitespace around fields and headers
    pub trim: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            na_values: ["", "NA", "N/A", "NaN", "nan", "null", "NULL"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            trim: true,
        }
    }
}

/// Read a CSV file with a header row into a DataFrame
pub fn read_csv(path: impl AsRef<Path>, options: &CsvOptions) -> Result<DataFrame> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| DataError::Csv {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    read_with_source(file, options, &path.display().to_string())
}

/// Read CSV data with a header row from any reader
pub fn read_csv_from<R: Read>(reader: R, options: &CsvOptions) -> Result<DataFrame> {
    read_with_source(reader, options, "<reader>")
}

fn read_with_source<R: Read>(reader: R, options: &CsvOptions, source: &str) -> Result<DataFrame> {
    let csv_error = |message: String| DataError::Csv {
        path: source.to_string(),
        message,
    };

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .trim(if options.trim {
            csv::Trim::All
        } else {
            csv::Trim::None
        })
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| csv_error(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let names = column_names(&headers);

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); names.len()];
    for record in rdr.records() {
        let record = record.map_err(|e| csv_error(e.to_string()))?;
        for (column, field) in raw.iter_mut().zip(record.iter()) {
            column.push(field.to_string());
        }
    }

    let na: HashSet<&str> = options.na_values.iter().map(String::as_str).collect();
    names
        .into_iter()
        .zip(raw)
        .try_fold(DataFrame::new(), |frame, (name, values)| {
            let series = infer_series(&values, &na);
            debug!(
                column = %name,
                dtype = series.dtype(),
                missing = series.missing_count(),
                "inferred column type"
            );
            frame.with_column(name, series)
        })
}

/// Header names with blanks replaced by `Unnamed: <i>` and repeats suffixed
fn column_names(headers: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let base = if header.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                header.clone()
            };

            let mut name = base.clone();
            let mut suffix = 1;
            while !seen.insert(name.clone()) {
                name = format!("{}.{}", base, suffix);
                suffix += 1;
            }
            name
        })
        .collect()
}

fn infer_series(values: &[String], na: &HashSet<&str>) -> Series {
    let missing: Vec<bool> = values.iter().map(|v| na.contains(v.as_str())).collect();
    let any_missing = missing.iter().any(|m| *m);
    let present = || {
        values
            .iter()
            .zip(missing.iter())
            .filter(|(_, m)| !**m)
            .map(|(v, _)| v.as_str())
    };

    if present().next().is_none() {
        return Series::float(vec![f64::NAN; values.len()]);
    }

    if !any_missing {
        if let Some(ints) = present().map(|v| v.parse::<i64>().ok()).collect::<Option<Vec<_>>>() {
            return Series::int(ints);
        }
    }

    if present().all(|v| v.parse::<f64>().is_ok()) {
        let floats: Vec<f64> = values
            .iter()
            .zip(missing.iter())
            .map(|(v, m)| if *m { f64::NAN } else { v.parse().unwrap_or(f64::NAN) })
            .collect();
        return Series::float(floats);
    }

    if !any_missing {
        if let Some(bools) = present().map(parse_bool).collect::<Option<Vec<_>>>() {
            return Series::bool(bools);
        }
    }

    let strings: Vec<String> = values
        .iter()
        .zip(missing.iter())
        .map(|(v, m)| if *m { String::new() } else { v.clone() })
        .collect();
    Series::string(strings)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}
