//! Typed data columns
//!
//! Missing values are `NaN` in float columns and the empty string in string
//! columns. Integer and boolean columns are always complete; the CSV reader
//! widens an integer column with gaps to float.

use super::*;

use ndarray::Array1;

#[derive(Clone, Debug, PartialEq)]
pub enum Series {
    Float(FloatArray),
    Int(Array1<i64>),
    Bool(Array1<bool>),
    String(Vec<String>),
    /// Level codes into a sorted level list
    Categorical(Array1<u32>, Vec<String>),
}

/// A single cell of a [`Series`]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Float(f64),
    Int(i64),
    Bool(bool),
    Text(String),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
        }
    }
}

/// Sorted distinct values and each value's position in that list
fn encode<'a>(values: impl Iterator<Item = &'a str> + Clone) -> (Vec<String>, Vec<usize>) {
    let mut levels: Vec<String> = values.clone().map(str::to_string).collect();
    levels.sort();
    levels.dedup();

    let codes = values
        .map(|v| levels.binary_search_by(|l| l.as_str().cmp(v)).unwrap_or_default())
        .collect();
    (levels, codes)
}

impl Series {
    pub fn float(data: impl Into<FloatArray>) -> Self {
        Series::Float(data.into())
    }

    pub fn int(data: impl Into<Array1<i64>>) -> Self {
        Series::Int(data.into())
    }

    pub fn bool(data: impl Into<Array1<bool>>) -> Self {
        Series::Bool(data.into())
    }

    pub fn string(data: impl Into<Vec<String>>) -> Self {
        Series::String(data.into())
    }

    /// Categorical column with levels in sorted order
    pub fn categorical<T: AsRef<str>>(data: &[T]) -> Self {
        let (levels, codes) = encode(data.iter().map(|s| s.as_ref()));
        Series::Categorical(codes.into_iter().map(|c| c as u32).collect(), levels)
    }

    pub fn len(&self) -> usize {
        match self {
            Series::Float(a) => a.len(),
            Series::Int(a) => a.len(),
            Series::Bool(a) => a.len(),
            Series::String(v) => v.len(),
            Series::Categorical(codes, _) => codes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> &'static str {
        match self {
            Series::Float(_) => "float64",
            Series::Int(_) => "int64",
            Series::Bool(_) => "bool",
            Series::String(_) => "string",
            Series::Categorical(..) => "categorical",
        }
    }

    /// Whether the column enters a design matrix as a single numeric column
    pub fn is_numeric(&self) -> bool {
        matches!(self, Series::Float(_) | Series::Int(_) | Series::Bool(_))
    }

    pub fn is_missing(&self, idx: usize) -> bool {
        match self {
            Series::Float(a) => a.get(idx).is_some_and(|v| v.is_nan()),
            Series::String(v) => v.get(idx).is_some_and(String::is_empty),
            _ => false,
        }
    }

    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_missing(i)).count()
    }

    /// Value at `idx`; categorical cells come back as their level text
    pub fn get(&self, idx: usize) -> Option<Value> {
        match self {
            Series::Float(a) => a.get(idx).map(|&v| Value::Float(v)),
            Series::Int(a) => a.get(idx).map(|&v| Value::Int(v)),
            Series::Bool(a) => a.get(idx).map(|&v| Value::Bool(v)),
            Series::String(v) => v.get(idx).map(|s| Value::Text(s.clone())),
            Series::Categorical(codes, levels) => codes
                .get(idx)
                .and_then(|&c| levels.get(c as usize))
                .map(|s| Value::Text(s.clone())),
        }
    }

    /// Rows where `mask` is true
    pub fn filter(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.len() {
            return Err(DataError::DimensionMismatch {
                what: "row mask",
                expected: self.len(),
                actual: mask.len(),
            });
        }

        fn pick<T: Clone>(items: impl IntoIterator<Item = T>, mask: &[bool]) -> Vec<T> {
            items
                .into_iter()
                .zip(mask)
                .filter_map(|(item, &keep)| keep.then_some(item))
                .collect()
        }

        Ok(match self {
            Series::Float(a) => Series::Float(pick(a.iter().copied(), mask).into()),
            Series::Int(a) => Series::Int(pick(a.iter().copied(), mask).into()),
            Series::Bool(a) => Series::Bool(pick(a.iter().copied(), mask).into()),
            Series::String(v) => Series::String(pick(v.iter().cloned(), mask)),
            Series::Categorical(codes, levels) => {
                Series::Categorical(pick(codes.iter().copied(), mask).into(), levels.clone())
            }
        })
    }

    /// Numeric column as floats, booleans as 0/1
    pub fn to_f64_array(&self) -> Result<FloatArray> {
        match self {
            Series::Float(a) => Ok(a.clone()),
            Series::Int(a) => Ok(a.mapv(|v| v as f64)),
            Series::Bool(a) => Ok(a.mapv(|v| f64::from(u8::from(v)))),
            other => Err(DataError::NonNumericData(other.dtype())),
        }
    }

    /// Sorted distinct levels and the per-row level index.
    ///
    /// Strings are treated as categorical; numeric series are rejected.
    pub fn levels(&self) -> Result<(Vec<String>, Vec<usize>)> {
        match self {
            Series::Categorical(codes, levels) => {
                Ok((levels.clone(), codes.iter().map(|&c| c as usize).collect()))
            }
            Series::String(values) => Ok(encode(values.iter().map(String::as_str))),
            other => Err(DataError::NonNumericData(other.dtype())),
        }
    }
}
