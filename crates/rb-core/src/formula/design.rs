//! Design matrix construction
//!
//! Turns the terms of a parsed [`Formula`] into named numeric columns.
//! String and categorical variables are treatment coded against their first
//! sorted level. When the formula has no intercept, the first categorical
//! main effect is coded with every level so the model keeps full rank.

use crate::data::{DataFrame, Matrix, Series};
use crate::formula::error::{FormulaError, FormulaResult};
use crate::formula::{Formula, Term};

use ndarray::{Array1, Axis};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Name of the constant column added for the intercept
pub const INTERCEPT: &str = "Intercept";

/// Levels of each categorical variable, in coding order
pub type LevelMap = BTreeMap<String, Vec<String>>;

/// Numeric design built from a formula and a data frame
#[derive(Debug, Clone)]
pub struct Design {
    /// Design matrix, one column per entry of `column_names`
    pub x: Matrix,
    /// Response vector, present when the formula names one
    pub y: Option<Array1<f64>>,
    /// Column labels, e.g. `Intercept`, `x`, `g[T.b]`, `a:b`
    pub column_names: Vec<String>,
    /// Positions of the source rows that survived missing-value deletion
    pub rows: Vec<usize>,
    /// Categorical levels used for coding
    pub levels: LevelMap,
}

impl Design {
    /// Number of observations
    pub fn nobs(&self) -> usize {
        self.x.nrows()
    }

    /// Number of design columns
    pub fn ncols(&self) -> usize {
        self.x.ncols()
    }

    /// Position of a named design column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|c| c == name)
    }
}

type Column = (String, Array1<f64>);

impl Formula {
    /// Build the design matrix and response for fitting.
    ///
    /// Rows with a missing value in any referenced variable are dropped.
    pub fn design(&self, df: &DataFrame) -> FormulaResult<Design> {
        let response = self.response.as_deref().ok_or(FormulaError::MissingResponse)?;
        let (data, rows) = self.complete_rows(df)?;

        let series = column(&data, response)?;
        let y = series
            .to_f64_array()
            .map_err(|_| FormulaError::NonNumericResponse {
                variable: response.to_string(),
                dtype: series.dtype().to_string(),
            })?;

        let mut encoder = Encoder::fitting(&data, self.has_intercept);
        let (x, column_names) = self.assemble(&mut encoder)?;

        debug!(
            formula = %self,
            nobs = x.nrows(),
            ncols = x.ncols(),
            "built design matrix"
        );

        Ok(Design {
            x,
            y: Some(y),
            column_names,
            rows,
            levels: encoder.levels,
        })
    }

    /// Build the design matrix for new data, reusing fitted categorical levels.
    ///
    /// The response is not required to be present.
    pub fn exog(&self, df: &DataFrame, levels: &LevelMap) -> FormulaResult<Design> {
        let (data, rows) = self.complete_rows_excluding_response(df)?;

        let mut encoder = Encoder::predicting(&data, levels, self.has_intercept);
        let (x, column_names) = self.assemble(&mut encoder)?;

        Ok(Design {
            x,
            y: None,
            column_names,
            rows,
            levels: encoder.levels,
        })
    }

    fn complete_rows(&self, df: &DataFrame) -> FormulaResult<(DataFrame, Vec<usize>)> {
        self.select_complete(df, &self.variables())
    }

    fn complete_rows_excluding_response(
        &self,
        df: &DataFrame,
    ) -> FormulaResult<(DataFrame, Vec<usize>)> {
        let variables: Vec<String> = self
            .variables()
            .into_iter()
            .filter(|v| Some(v.as_str()) != self.response.as_deref())
            .collect();
        self.select_complete(df, &variables)
    }

    fn select_complete(
        &self,
        df: &DataFrame,
        variables: &[String],
    ) -> FormulaResult<(DataFrame, Vec<usize>)> {
        for var in variables {
            if !df.has_column(var) {
                return Err(FormulaError::unknown_variable(var, &df.column_names()));
            }
        }

        let mask = df.complete_cases(variables)?;
        let rows: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, keep)| keep.then_some(i))
            .collect();

        let dropped = df.nrows() - rows.len();
        if dropped > 0 {
            warn!(
                dropped,
                kept = rows.len(),
                "dropping rows with missing values in model variables"
            );
        }

        let data = if variables.is_empty() {
            let mut empty = DataFrame::new();
            empty.nrows = rows.len();
            empty
        } else {
            df.select(variables)?.filter(&mask)?
        };
        Ok((data, rows))
    }

    fn assemble(&self, encoder: &mut Encoder<'_>) -> FormulaResult<(Matrix, Vec<String>)> {
        let nrows = encoder.df.nrows();
        let mut columns: Vec<Column> = Vec::new();

        if self.has_intercept {
            columns.push((INTERCEPT.to_string(), Array1::ones(nrows)));
        }

        for term in &self.terms {
            for (name, values) in encoder.term_columns(term)? {
                if columns.iter().any(|(existing, _)| *existing == name) {
                    continue;
                }
                columns.push((name, values));
            }
        }

        if columns.is_empty() {
            return Err(FormulaError::EmptyDesign);
        }

        let views: Vec<_> = columns.iter().map(|(_, values)| values.view()).collect();
        let x = ndarray::stack(Axis(1), &views)?;
        let names = columns.into_iter().map(|(name, _)| name).collect();

        Ok((x, names))
    }
}

fn column<'a>(df: &'a DataFrame, name: &str) -> FormulaResult<&'a Series> {
    df.get_column(name)
        .ok_or_else(|| FormulaError::unknown_variable(name, &df.column_names()))
}

/// Evaluates terms against a data frame
struct Encoder<'a> {
    df: &'a DataFrame,
    levels: LevelMap,
    frozen: bool,
    full_rank_pending: bool,
}

impl<'a> Encoder<'a> {
    fn fitting(df: &'a DataFrame, has_intercept: bool) -> Self {
        Self {
            df,
            levels: LevelMap::new(),
            frozen: false,
            full_rank_pending: !has_intercept,
        }
    }

    fn predicting(df: &'a DataFrame, levels: &LevelMap, has_intercept: bool) -> Self {
        Self {
            df,
            levels: levels.clone(),
            frozen: true,
            full_rank_pending: !has_intercept,
        }
    }

    fn term_columns(&mut self, term: &Term) -> FormulaResult<Vec<Column>> {
        match term {
            Term::Variable(name) => self.variable_columns(name, true),
            Term::Interaction(variables) => {
                let mut acc: Vec<Column> = vec![(String::new(), Array1::ones(self.df.nrows()))];
                for var in variables {
                    let factor = self.variable_columns(var, false)?;
                    acc = acc
                        .iter()
                        .flat_map(|(left_name, left)| {
                            factor.iter().map(move |(right_name, right)| {
                                let name = if left_name.is_empty() {
                                    right_name.clone()
                                } else {
                                    format!("{}:{}", left_name, right_name)
                                };
                                (name, left * right)
                            })
                        })
                        .collect();
                }
                Ok(acc)
            }
            Term::Function { name, args } => self.function_columns(term, name, args),
            Term::Literal(text) => Err(FormulaError::InvalidTerm { term: text.clone() }),
        }
    }

    fn variable_columns(&mut self, name: &str, main_effect: bool) -> FormulaResult<Vec<Column>> {
        let series = column(self.df, name)?;

        if series.is_numeric() && !self.levels.contains_key(name) {
            return Ok(vec![(name.to_string(), series.to_f64_array()?)]);
        }

        let (levels, codes) = self.factor_levels(name, series)?;
        let full_rank = main_effect && std::mem::replace(&mut self.full_rank_pending, false);
        let start = if full_rank { 0 } else { 1 };

        Ok(levels
            .iter()
            .enumerate()
            .skip(start)
            .map(|(k, level)| {
                let label = if full_rank {
                    format!("{}[{}]", name, level)
                } else {
                    format!("{}[T.{}]", name, level)
                };
                let values = codes.iter().map(|&c| if c == k { 1.0 } else { 0.0 }).collect();
                (label, values)
            })
            .collect())
    }

    fn factor_levels(
        &mut self,
        name: &str,
        series: &Series,
    ) -> FormulaResult<(Vec<String>, Vec<usize>)> {
        if !self.frozen {
            let (levels, codes) = series.levels()?;
            self.levels.insert(name.to_string(), levels.clone());
            return Ok((levels, codes));
        }

        let known = self.levels.get(name).ok_or_else(|| {
            FormulaError::levels(name, "was not categorical when the model was fitted")
        })?;

        let values: Vec<String> = (0..series.len())
            .map(|i| series.get(i).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        let codes = values
            .iter()
            .map(|value| {
                known.iter().position(|level| level == value).ok_or_else(|| {
                    FormulaError::levels(name, format!("level '{}' was not seen in the fit", value))
                })
            })
            .collect::<FormulaResult<Vec<_>>>()?;

        Ok((known.clone(), codes))
    }

    fn function_columns(
        &mut self,
        term: &Term,
        function: &str,
        args: &[Term],
    ) -> FormulaResult<Vec<Column>> {
        let label = term.to_string();

        match function.to_lowercase().as_str() {
            "poly" => {
                if args.len() != 2 {
                    return Err(FormulaError::function(
                        function,
                        "expects a variable and a degree, e.g. poly(x, 2)",
                    ));
                }
                let degree = match &args[1] {
                    Term::Literal(text) => text.parse::<usize>().ok().filter(|d| *d >= 1),
                    _ => None,
                }
                .ok_or_else(|| {
                    FormulaError::function(
                        function,
                        format!("degree must be a positive integer, got '{}'", args[1]),
                    )
                })?;

                let base = self.single_column(function, &args[0])?;
                Ok((1..=degree)
                    .map(|d| (format!("{}[{}]", label, d), base.mapv(|v| v.powi(d as i32))))
                    .collect())
            }
            other => {
                if args.len() != 1 {
                    return Err(FormulaError::function(function, "expects exactly one argument"));
                }
                let values = self.single_column(function, &args[0])?;

                let transformed = match other {
                    "i" => values,
                    "log" => checked(function, values, |v| v > 0.0, f64::ln)?,
                    "log10" => checked(function, values, |v| v > 0.0, f64::log10)?,
                    "log2" => checked(function, values, |v| v > 0.0, f64::log2)?,
                    "sqrt" => checked(function, values, |v| v >= 0.0, f64::sqrt)?,
                    "exp" => values.mapv(f64::exp),
                    "abs" => values.mapv(f64::abs),
                    _ => {
                        return Err(FormulaError::function(
                            function,
                            format!("unsupported function '{}'", function),
                        ));
                    }
                };

                Ok(vec![(label, transformed)])
            }
        }
    }

    fn single_column(&mut self, function: &str, arg: &Term) -> FormulaResult<Array1<f64>> {
        let mut columns = self.term_columns(arg)?;
        if columns.len() != 1 {
            return Err(FormulaError::function(
                function,
                format!("'{}' is not a single numeric column", arg),
            ));
        }
        Ok(columns.remove(0).1)
    }
}

fn checked(
    function: &str,
    values: Array1<f64>,
    valid: impl Fn(f64) -> bool,
    f: impl Fn(f64) -> f64,
) -> FormulaResult<Array1<f64>> {
    if let Some(bad) = values.iter().find(|v| !valid(**v)) {
        return Err(FormulaError::Domain {
            function: function.to_string(),
            value: *bad,
        });
    }
    Ok(values.mapv(f))
}
