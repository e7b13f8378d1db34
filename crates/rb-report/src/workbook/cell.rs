//! A1-style cell references

use std::fmt;

use crate::error::WorkbookError;

/// Last addressable column (`XFD`)
pub const MAX_COLUMN: u32 = 16_384;

/// Last addressable row
pub const MAX_ROW: u32 = 1_048_576;

/// A cell address: sheet plus 1-based column and row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub sheet: String,
    pub col: u32,
    pub row: u32,
}

impl CellRef {
    /// Build a reference from 1-based coordinates
    pub fn new(sheet: impl Into<String>, col: u32, row: u32) -> Result<Self, WorkbookError> {
        let sheet = sheet.into();
        if !(1..=MAX_COLUMN).contains(&col) || !(1..=MAX_ROW).contains(&row) {
            return Err(WorkbookError::invalid_cell(
                &format!("{}!C{}R{}", sheet, col, row),
                format!("column must be in 1..={MAX_COLUMN} and row in 1..={MAX_ROW}"),
            ));
        }
        Ok(Self { sheet, col, row })
    }

    /// Parse `"O6"` or `"Results!O6"`; unqualified addresses land in
    /// `default_sheet`
    pub fn parse(text: &str, default_sheet: &str) -> Result<Self, WorkbookError> {
        let trimmed = text.trim();
        let (sheet, address) = match trimmed.rsplit_once('!') {
            Some((sheet, address)) => {
                let sheet = sheet.trim_matches('\'');
                if sheet.is_empty() {
                    return Err(WorkbookError::invalid_cell(text, "empty sheet name"));
                }
                (sheet, address)
            }
            None => (default_sheet, trimmed),
        };

        let split = address
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(address.len());
        let (letters, digits) = address.split_at(split);

        if letters.is_empty() {
            return Err(WorkbookError::invalid_cell(text, "missing column letters"));
        }
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(WorkbookError::invalid_cell(text, "missing or malformed row number"));
        }

        let col = column_index(letters)
            .ok_or_else(|| WorkbookError::invalid_cell(text, "column is past XFD"))?;
        let row: u32 = digits
            .parse()
            .map_err(|_| WorkbookError::invalid_cell(text, "row number out of range"))?;
        if !(1..=MAX_ROW).contains(&row) {
            return Err(WorkbookError::invalid_cell(
                text,
                format!("row must be in 1..={MAX_ROW}"),
            ));
        }

        Ok(Self {
            sheet: sheet.to_string(),
            col,
            row,
        })
    }

    /// Address without the sheet, e.g. `"O6"`
    pub fn address(&self) -> String {
        format!("{}{}", column_name(self.col), self.row)
    }

    /// Reference shifted by `rows` down and `cols` right
    pub fn offset(&self, rows: u32, cols: u32) -> Result<Self, WorkbookError> {
        let out_of_range = || WorkbookError::invalid_cell(&self.to_string(), "offset leaves the sheet");
        let col = self.col.checked_add(cols).ok_or_else(out_of_range)?;
        let row = self.row.checked_add(rows).ok_or_else(out_of_range)?;
        Self::new(self.sheet.clone(), col, row)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.sheet, self.address())
    }
}

/// Column letters for a 1-based column index (`1 → "A"`, `27 → "AA"`)
pub fn column_name(mut col: u32) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(b'A' + rem as u8);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// 1-based column index of column letters, `None` past `XFD`
fn column_index(letters: &str) -> Option<u32> {
    let mut col: u32 = 0;
    for c in letters.chars() {
        let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
        if col > MAX_COLUMN {
            return None;
        }
    }
    Some(col)
}
