//! JSON-backed workbook

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{CellRef, CellValue, Workbook};
use crate::error::WorkbookError;

type Sheet = BTreeMap<String, CellValue>;

/// On-disk document layout
#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    sheets: BTreeMap<String, Sheet>,
}

/// Workbook stored as a JSON document of `sheet → { "A1": value }` maps
#[derive(Debug, Clone, Default)]
pub struct JsonWorkbook {
    path: Option<PathBuf>,
    sheets: BTreeMap<String, Sheet>,
}

impl JsonWorkbook {
    /// Empty in-memory workbook
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an existing workbook file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WorkbookError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| WorkbookError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut workbook = Self::from_json(&content).map_err(|e| match e {
            WorkbookError::Parse { message, .. } => WorkbookError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        workbook.path = Some(path.to_path_buf());

        debug!(path = %path.display(), sheets = workbook.sheets.len(), "opened workbook");
        Ok(workbook)
    }

    /// Open a workbook file, starting an empty one bound to `path` if the
    /// file does not exist yet
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self, WorkbookError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::open(path);
        }
        info!(path = %path.display(), "creating new workbook");
        Ok(Self {
            path: Some(path.to_path_buf()),
            sheets: BTreeMap::new(),
        })
    }

    /// Parse a workbook from JSON text
    pub fn from_json(content: &str) -> Result<Self, WorkbookError> {
        let document: Document =
            serde_json::from_str(content).map_err(|e| WorkbookError::Parse {
                path: PathBuf::from("<memory>"),
                message: e.to_string(),
            })?;

        let mut sheets = BTreeMap::new();
        for (name, cells) in document.sheets {
            // Normalise keys so "o6" and "O6" address the same cell
            let mut normalised = Sheet::new();
            for (address, value) in cells {
                let cell = CellRef::parse(&address, &name)?;
                normalised.insert(cell.address(), value);
            }
            sheets.insert(name, normalised);
        }

        Ok(Self { path: None, sheets })
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, WorkbookError> {
        let document = Document {
            sheets: self.sheets.clone(),
        };
        serde_json::to_string_pretty(&document).map_err(|e| WorkbookError::Parse {
            path: self.path.clone().unwrap_or_default(),
            message: e.to_string(),
        })
    }

    /// Path the workbook was opened from
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write to the path the workbook was opened from
    pub fn save(&self) -> Result<(), WorkbookError> {
        let path = self.path.clone().ok_or_else(|| WorkbookError::Io {
            path: PathBuf::new(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "workbook has no file path",
            ),
        })?;
        self.save_as(path)
    }

    /// Write to `path` through a temporary file in the same directory, then
    /// rename over the target
    pub fn save_as(&self, path: impl AsRef<Path>) -> Result<(), WorkbookError> {
        let path = path.as_ref();
        let io_error = |source: std::io::Error| WorkbookError::Io {
            path: path.to_path_buf(),
            source,
        };

        let content = self.to_json()?;
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_error)?;
        tmp.write_all(content.as_bytes()).map_err(io_error)?;
        tmp.flush().map_err(io_error)?;
        tmp.persist(path).map_err(|e| io_error(e.error))?;

        info!(path = %path.display(), "saved workbook");
        Ok(())
    }

    /// Number of non-empty cells across all sheets
    pub fn cell_count(&self) -> usize {
        self.sheets.values().map(|s| s.len()).sum()
    }
}

impl Workbook for JsonWorkbook {
    fn read(&self, cell: &CellRef) -> Option<CellValue> {
        self.sheets.get(&cell.sheet)?.get(&cell.address()).cloned()
    }

    fn write(&mut self, cell: &CellRef, value: CellValue) {
        if value.is_empty() {
            if let Some(sheet) = self.sheets.get_mut(&cell.sheet) {
                sheet.remove(&cell.address());
            }
            return;
        }
        self.sheets
            .entry(cell.sheet.clone())
            .or_default()
            .insert(cell.address(), value);
    }

    fn clear_below(&mut self, anchor: &CellRef, width: u32) {
        let Some(sheet) = self.sheets.get_mut(&anchor.sheet) else {
            return;
        };
        let cols = anchor.col..anchor.col + width;
        sheet.retain(|address, _| match CellRef::parse(address, &anchor.sheet) {
            Ok(cell) => !(cols.contains(&cell.col) && cell.row >= anchor.row),
            Err(_) => true,
        });
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets
            .iter()
            .filter(|(_, cells)| !cells.is_empty())
            .map(|(name, _)| name.clone())
            .collect()
    }
}
