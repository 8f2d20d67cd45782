//! Annotation table reader.
//!
//! Annotation tables are opaque to the pipeline apart from their key column
//! (`GeneID` or `locus`). A header row is required; records may be ragged.
//! Labs keep them as spreadsheets, so the first sheet of an Excel/ODS
//! workbook is read the same way as a delimited text file.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::info;

use postdeseq_common::{AnnotationTable, PostDeseqError, Result};

/// On-disk layout of an annotation table or catalog, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Delimited text with the given field separator.
    Delimited(u8),
    /// Spreadsheet workbook; the first sheet is read.
    Workbook,
}

impl TableFormat {
    /// `,` for `.csv`, workbook for `.xlsx`/`.xlsm`/`.xlsb`/`.xls`/`.ods`,
    /// tab for everything else.
    pub fn for_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => TableFormat::Delimited(b','),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => TableFormat::Workbook,
            _ => TableFormat::Delimited(b'\t'),
        }
    }
}

/// Parse a delimited annotation table with a header row.
pub fn parse_annotation_table<R: Read>(reader: R, delimiter: u8) -> Result<AnnotationTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(AnnotationTable::new(columns, rows))
}

/// Read the first sheet of a workbook: first non-blank row is the header,
/// fully blank rows are skipped.
pub fn read_workbook(path: &Path) -> Result<AnnotationTable> {
    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_err(path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| workbook_err(path, "workbook has no sheets"))?
        .map_err(|e| workbook_err(path, e))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|c| !c.is_empty()));
    let columns = rows.next().ok_or_else(|| workbook_err(path, "first sheet is empty"))?;

    Ok(AnnotationTable::new(columns, rows.collect()))
}

fn workbook_err(path: &Path, e: impl std::fmt::Display) -> PostDeseqError {
    PostDeseqError::Workbook(format!("{}: {e}", path.display()))
}

/// Cell text as a delimited export would carry it. Whole floats lose
/// their `.0` (`1200`, not `1200.0`).
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        other => other.to_string(),
    }
}

/// Read an annotation table from disk, delimited text or workbook.
pub fn read_annotation_table(path: &Path) -> Result<AnnotationTable> {
    let table = match TableFormat::for_path(path) {
        TableFormat::Delimited(delimiter) => parse_annotation_table(File::open(path)?, delimiter)?,
        TableFormat::Workbook => read_workbook(path)?,
    };
    info!(
        path = %path.display(),
        n_rows = table.len(),
        n_columns = table.columns.len(),
        "Annotation table loaded"
    );
    Ok(table)
}
