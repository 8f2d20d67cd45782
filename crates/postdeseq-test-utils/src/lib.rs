//! Fixture builders shared by the postdeseq test suites.

use std::path::Path;

use postdeseq_common::{AnnotatedRecord, AnnotationTable, ResultRecord, ResultTable};

/// A result row with the given id, log2FC and padj; the remaining
/// statistics are fixed, finite placeholders.
pub fn record(gene_id: &str, log2_fc: f64, p_adj: f64) -> ResultRecord {
    ResultRecord {
        gene_id: gene_id.to_string(),
        base_mean: 100.0,
        log2_fc,
        std_err: 0.1,
        wald_stat: 5.0,
        p_value: 1e-6,
        p_adj,
    }
}

pub fn result_table(name: &str, records: Vec<ResultRecord>) -> ResultTable {
    ResultTable::new(name, records)
}

/// An unannotated row, as the joiner would produce it on a miss.
pub fn annotated(gene_id: &str, log2_fc: f64, p_adj: f64) -> AnnotatedRecord {
    AnnotatedRecord {
        result: record(gene_id, log2_fc, p_adj),
        join_key: gene_id.to_string(),
        annotation: None,
    }
}

pub fn annotation_table(columns: &[&str], rows: &[&[&str]]) -> AnnotationTable {
    AnnotationTable::new(
        columns.iter().map(|c| c.to_string()).collect(),
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

/// The worked example row: `gene:ATX1.1`, strongly up, padj 0.002.
pub fn scenario_row() -> ResultRecord {
    ResultRecord {
        gene_id: "gene:ATX1.1".to_string(),
        base_mean: 100.0,
        log2_fc: 2.0,
        std_err: 0.1,
        wald_stat: 5.0,
        p_value: 1e-6,
        p_adj: 0.002,
    }
}

/// Whitespace-delimited DESeq2 export with a header row, one NA padj and
/// one `gene:`-prefixed, versioned identifier.
pub const RESULT_TSV: &str = "\
GeneID\tBaseMean\tlog2FC\tStdErr\tWaldStat\tPvalue\tPadj
gene:ATX1.1\t100.0\t2.0\t0.1\t5.0\t1e-6\t0.002
gene:ATX2.1\t50.5\t-1.4\t0.2\t-4.1\t1e-4\t0.008
AT3G00001\t12.0\t0.3\t0.5\t0.6\t0.5\tNA
AT4G00002  7.5  -0.2  0.4  -0.5  0.04  0.045
";

/// Locus-keyed annotation table matching [`RESULT_TSV`].
pub const LOCUS_ANNOTATION_TSV: &str = "\
locus\tSymbol\tDescription
ATX1\tATX1\ttrithorax 1
ATX2\tATX2\ttrithorax 2
ATX1\tATX1-dup\tshould never be used
";

/// Catalog mapping type codes to annotation files.
pub const CATALOG_TSV: &str = "\
type\tname_file
AT\tat_locus.tsv
SL\tsl_locus.tsv
";

/// Write `contents` to `dir/name`, creating parent directories.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> anyhow::Result<std::path::PathBuf> {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, contents)?;
    Ok(path)
}

/// Write `rows` (header first) to the first sheet of an `.xlsx` workbook at
/// `dir/name`. Cells that parse as numbers are stored as numbers, the way
/// spreadsheet tools save them.
pub fn write_workbook(dir: &Path, name: &str, rows: &[&[&str]]) -> anyhow::Result<std::path::PathBuf> {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let (r, c) = (u32::try_from(r)?, u16::try_from(c)?);
            match cell.parse::<f64>() {
                Ok(n) if r > 0 && n.is_finite() => sheet.write_number(r, c, n)?,
                _ => sheet.write_string(r, c, *cell)?,
            };
        }
    }
    workbook.save(&path)?;
    Ok(path)
}

/// Temporary workspace laid out like a real run: `input/`, `annotations/`
/// with a catalog, and an (empty) `output/` location.
pub fn scratch_workspace() -> anyhow::Result<tempfile::TempDir> {
    let dir = tempfile::tempdir()?;
    write_file(dir.path(), "input/WT_vs_KO.txt", RESULT_TSV)?;
    write_file(dir.path(), "annotations/at_locus.tsv", LOCUS_ANNOTATION_TSV)?;
    write_file(dir.path(), "annotations.tsv", CATALOG_TSV)?;
    Ok(dir)
}
