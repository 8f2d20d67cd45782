//! DESeq2 result table reader.
//!
//! Format: seven positional columns (GeneID, BaseMean, log2FC, StdErr,
//! WaldStat, Pvalue, Padj) separated by any run of whitespace, `.` as the
//! decimal separator. Exports differ in whether they carry a header row, so
//! a first row whose numeric columns are all column names (not numbers and
//! not missing-value markers such as `NA`) is treated as a header.

use std::path::Path;

use tracing::{debug, info, warn};

use postdeseq_common::records::parse_numeric;
use postdeseq_common::{Result, ResultRecord, ResultTable};

/// Number of positional columns in a result row.
pub const RESULT_WIDTH: usize = 7;

/// Parse result rows from text. Never fails: bad numbers become NaN.
pub fn parse_result_table(name: &str, text: &str) -> ResultTable {
    let mut records = Vec::new();
    let mut short_rows = 0usize;
    let mut first = true;

    for line in text.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if std::mem::take(&mut first) && looks_like_header(&fields) {
            info!(table = name, header = %fields.join(" "), "Skipping header row");
            continue;
        }
        if fields.len() < RESULT_WIDTH {
            short_rows += 1;
        }
        records.push(ResultRecord::from_fields(&fields));
    }

    if short_rows > 0 {
        warn!(table = name, short_rows, "Rows with fewer than 7 fields padded with NaN");
    }
    ResultTable::new(name, records)
}

/// Markers DESeq2 and R exports use for a missing statistic.
const MISSING_MARKERS: [&str; 5] = ["NA", "N/A", "NaN", "null", "-"];

fn is_missing_marker(field: &str) -> bool {
    MISSING_MARKERS.iter().any(|m| m.eq_ignore_ascii_case(field))
}

/// A header has at least one numeric slot, none of them parse, and at
/// least one is a real name rather than a missing-value marker. A data row
/// whose statistics are all `NA` is therefore kept.
fn looks_like_header(fields: &[&str]) -> bool {
    let numeric = &fields[1.min(fields.len())..fields.len().min(RESULT_WIDTH)];
    !numeric.is_empty()
        && numeric.iter().all(|f| parse_numeric(f).is_nan())
        && numeric.iter().any(|f| !is_missing_marker(f))
}

/// Read one result file; the table is named after the file.
pub fn read_result_table(path: &Path) -> Result<ResultTable> {
    let text = std::fs::read_to_string(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let table = parse_result_table(&name, &text);
    debug!(table = %name, rows = table.len(), "Result table loaded");
    Ok(table)
}

/// Read every regular, non-hidden file in `dir`, sorted by file name.
pub fn read_result_dir(dir: &Path) -> Result<Vec<ResultTable>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if entry.file_type()?.is_file() && !hidden {
            paths.push(entry.path());
        }
    }
    paths.sort();

    let tables = paths
        .iter()
        .map(|p| read_result_table(p))
        .collect::<Result<Vec<_>>>()?;
    info!(dir = %dir.display(), n_tables = tables.len(), "Result tables loaded");
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use postdeseq_test_utils::{write_file, RESULT_TSV};

    #[test]
    fn test_header_row_is_skipped() {
        let t = parse_result_table("x.txt", RESULT_TSV);
        assert_eq!(t.len(), 4);
        assert_eq!(t.records[0].gene_id, "gene:ATX1.1");
    }

    #[test]
    fn test_headerless_input_keeps_first_row() {
        let t = parse_result_table("x.txt", "AT1\t1\t2\t3\t4\t0.5\t0.6\nAT2 1 2 3 4 0.5 0.6\n");
        assert_eq!(t.len(), 2);
        assert_eq!(t.records[1].gene_id, "AT2");
    }

    #[test]
    fn test_first_row_with_na_values_is_data_not_header() {
        // Only some numeric fields unparsable → still a data row.
        let t = parse_result_table("x.txt", "AT1\t5.0\tNA\tNA\tNA\tNA\tNA\n");
        assert_eq!(t.len(), 1);
        assert!(t.records[0].p_adj.is_nan());
    }

    #[test]
    fn test_headerless_first_row_with_all_na_is_kept() {
        let t = parse_result_table(
            "x.txt",
            "AT1\tNA\tNA\tNA\tNA\tNA\tNA\nAT2 1 2 3 4 0.5 0.6\n",
        );
        assert_eq!(t.len(), 2);
        assert_eq!(t.records[0].gene_id, "AT1");
        assert!(t.records[0].base_mean.is_nan());
        assert_eq!(t.records[1].gene_id, "AT2");
    }

    #[test]
    fn test_header_mixing_names_and_markers_is_skipped() {
        let t = parse_result_table("x.txt", "id baseMean NA - NA pvalue padj\nAT2 1 2 3 4 0.5 0.6\n");
        assert_eq!(t.len(), 1);
        assert_eq!(t.records[0].gene_id, "AT2");
    }

    #[test]
    fn test_mixed_whitespace_and_na() {
        let t = parse_result_table("x.txt", RESULT_TSV);
        assert!(t.records[2].p_adj.is_nan());
        assert_eq!(t.records[3].gene_id, "AT4G00002");
        assert_eq!(t.records[3].p_adj, 0.045);
    }

    #[test]
    fn test_blank_lines_and_short_rows() {
        let t = parse_result_table("x.txt", "\nAT1 1.0 2.0\n\n");
        assert_eq!(t.len(), 1);
        assert_eq!(t.records[0].log2_fc, 2.0);
        assert!(t.records[0].p_adj.is_nan());
    }

    #[test]
    fn test_read_dir_sorted_and_skips_hidden() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "b.txt", "B 1 1 1 1 0.1 0.1\n").unwrap();
        write_file(dir.path(), "a.txt", "A 1 1 1 1 0.1 0.1\n").unwrap();
        write_file(dir.path(), ".DS_Store", "junk").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let tables = read_result_dir(dir.path()).unwrap();
        let names: Vec<_> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }
}
