//! Annotation catalog.
//!
//! A two-column table (`type`, `name_file`) listing the annotation sets
//! available to a lab, e.g.
//!
//! | type | name_file |
//! |------|-----------|
//! | AT   | at_locus.tsv |
//! | SL   | sl_locus.tsv |
//!
//! The code to use comes from configuration; lookup is case-insensitive.
//! The catalog may be delimited text or the first sheet of a workbook.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use postdeseq_common::{AnnotationTable, PostDeseqError, Result};

use crate::annotations::{read_workbook, TableFormat};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Short code, e.g. "AT"
    #[serde(rename = "type")]
    pub type_code: String,
    /// Annotation file name, relative to the annotation directory
    pub name_file: String,
}

#[derive(Debug, Clone, Default)]
pub struct AnnotationCatalog {
    entries: Vec<CatalogEntry>,
}

impl AnnotationCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Load a catalog file: TSV, CSV or workbook by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let catalog = match TableFormat::for_path(path) {
            TableFormat::Delimited(delimiter) => {
                let file = std::fs::File::open(path).map_err(|e| {
                    PostDeseqError::Catalog(format!("cannot open catalog {}: {e}", path.display()))
                })?;
                Self::from_reader(file, delimiter)?
            }
            TableFormat::Workbook => Self::from_table(&read_workbook(path)?)?,
        };
        debug!(path = %path.display(), n_entries = catalog.len(), "Annotation catalog loaded");
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let entries = rdr
            .deserialize::<CatalogEntry>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Build from an already-read table with `type` and `name_file` columns.
    /// Rows with an empty type code are skipped.
    pub fn from_table(table: &AnnotationTable) -> Result<Self> {
        let column = |name: &str| {
            table.column_index(name).ok_or_else(|| {
                PostDeseqError::Catalog(format!(
                    "catalog has no '{name}' column (available: {})",
                    table.columns.join(", ")
                ))
            })
        };
        let (type_idx, file_idx) = (column("type")?, column("name_file")?);

        let entries = table
            .rows
            .iter()
            .filter(|row| !row[type_idx].is_empty())
            .map(|row| CatalogEntry {
                type_code: row[type_idx].clone(),
                name_file: row[file_idx].clone(),
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The single entry whose code matches `code` (case-insensitive).
    pub fn resolve(&self, code: &str) -> Result<&CatalogEntry> {
        let code = code.trim();
        let mut hits = self
            .entries
            .iter()
            .filter(|e| e.type_code.eq_ignore_ascii_case(code));

        match (hits.next(), hits.next()) {
            (Some(entry), None) => Ok(entry),
            (Some(_), Some(_)) => Err(PostDeseqError::Catalog(format!(
                "annotation type '{code}' is listed more than once"
            ))),
            (None, _) => Err(PostDeseqError::Catalog(format!(
                "unknown annotation type '{code}' (available: {})",
                self.codes().join(", ")
            ))),
        }
    }

    /// Path of the annotation file for `code` inside `annotation_dir`.
    pub fn path_for(&self, code: &str, annotation_dir: &Path) -> Result<PathBuf> {
        Ok(annotation_dir.join(&self.resolve(code)?.name_file))
    }

    pub fn codes(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.type_code.as_str()).collect()
    }
}
