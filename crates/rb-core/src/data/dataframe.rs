//! Named columns of equal length

use super::*;

use indexmap::IndexMap;

/// Columns in insertion order, all with `nrows` entries
#[derive(Clone, Debug, Default)]
pub struct DataFrame {
    pub(crate) columns: IndexMap<String, Series>,
    pub(crate) nrows: usize,
}

impl DataFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// `(name, series)` pairs in column order
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Series)> {
        self.columns.iter().map(|(name, series)| (name.as_str(), series))
    }

    pub fn get_column(&self, name: &str) -> Option<&Series> {
        self.columns.get(name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Append a column. The first column fixes the row count.
    pub fn with_column(mut self, name: impl Into<String>, series: Series) -> Result<Self> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(DataError::DuplicateColumn(name));
        }
        if self.columns.is_empty() {
            self.nrows = series.len();
        } else if series.len() != self.nrows {
            return Err(DataError::DimensionMismatch {
                what: "column length",
                expected: self.nrows,
                actual: series.len(),
            });
        }

        self.columns.insert(name, series);
        Ok(self)
    }

    /// New frame with only `names`, in the given order
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        names.iter().try_fold(DataFrame::new(), |frame, name| {
            let name = name.as_ref();
            let series = self
                .get_column(name)
                .ok_or_else(|| DataError::ColumnNotFound(name.to_string()))?;
            frame.with_column(name, series.clone())
        })
    }

    /// Rows where `mask` is true
    pub fn filter(&self, mask: &[bool]) -> Result<Self> {
        if mask.len() != self.nrows {
            return Err(DataError::DimensionMismatch {
                what: "row mask",
                expected: self.nrows,
                actual: mask.len(),
            });
        }

        let columns = self
            .columns
            .iter()
            .map(|(name, series)| Ok((name.clone(), series.filter(mask)?)))
            .collect::<Result<IndexMap<_, _>>>()?;

        Ok(DataFrame {
            columns,
            nrows: mask.iter().filter(|&&keep| keep).count(),
        })
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> Result<Self> {
        let mask: Vec<bool> = (0..self.nrows).map(|i| i < n).collect();
        self.filter(&mask)
    }

    /// Rows with no missing value in any of `names`
    pub fn complete_cases<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<bool>> {
        let mut mask = vec![true; self.nrows];
        for name in names {
            let series = self
                .get_column(name.as_ref())
                .ok_or_else(|| DataError::ColumnNotFound(name.as_ref().to_string()))?;
            for (i, keep) in mask.iter_mut().enumerate() {
                *keep &= !series.is_missing(i);
            }
        }
        Ok(mask)
    }
}

impl std::fmt::Display for DataFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} rows x {} columns [{}]",
            self.nrows,
            self.ncols(),
            self.column_names().join(", ")
        )
    }
}
