//! Output tables and sinks.
//!
//! Each pipeline output renders to a fixed set of named tab-separated
//! tables, relative to the output root:
//!
//! - `annotated/annotated_{file}`: annotated table
//! - `annotated/{file}`: per-row subset flags (optional)
//! - `sigOnly/sig_{stem}_{label}.tab`: one per subset
//! - `expression/expression_{stem}_{label}.tab`: GOseq calls, one per subset
//!
//! NaN is written as an empty cell.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use postdeseq_annotate::classify::{flag_columns, SubsetLabel};
use postdeseq_annotate::normalise::version_suffix;
use postdeseq_annotate::{PipelineOutput, RunSummary};
use postdeseq_common::{AnnotatedRecord, ExpressionCall, IdMode, Result, RESULT_COLUMNS};

/// Summary file written next to the tables.
pub const SUMMARY_FILE: &str = "summary.json";

/// A rendered table, named by its path relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTable {
    pub name: PathBuf,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl NamedTable {
    /// Cells of column `column`, top to bottom.
    pub fn column(&self, column: &str) -> Option<Vec<&str>> {
        let idx = self.header.iter().position(|h| h == column)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }
}

/// Destination for rendered tables.
pub trait TableSink {
    fn accept(&mut self, table: NamedTable) -> Result<()>;
}

// ── Directory sink ────────────────────────────────────────────────────────────

/// Writes tables as TSV files under a root directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
    written: usize,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            written: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of tables written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Write the run summary as pretty JSON.
    pub fn write_summary(&self, summary: &RunSummary) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.root.join(SUMMARY_FILE);
        std::fs::write(&path, serde_json::to_string_pretty(summary)?)?;
        info!(path = %path.display(), "Run summary written");
        Ok(path)
    }
}

impl TableSink for DirectorySink {
    fn accept(&mut self, table: NamedTable) -> Result<()> {
        let path = self.root.join(&table.name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut wtr = csv::WriterBuilder::new().delimiter(b'\t').from_path(&path)?;
        wtr.write_record(&table.header)?;
        for row in &table.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;

        self.written += 1;
        debug!(path = %path.display(), rows = table.rows.len(), "Table written");
        Ok(())
    }
}

// ── Memory sink ───────────────────────────────────────────────────────────────

/// Keeps tables in memory; used by tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub tables: Vec<NamedTable>,
}

impl MemorySink {
    pub fn get(&self, name: impl AsRef<Path>) -> Option<&NamedTable> {
        self.tables.iter().find(|t| t.name == name.as_ref())
    }
}

impl TableSink for MemorySink {
    fn accept(&mut self, table: NamedTable) -> Result<()> {
        self.tables.push(table);
        Ok(())
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct EmitOptions {
    /// Also write the per-row flag table.
    pub flagged: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self { flagged: true }
    }
}

/// Render every output table of one pipeline run.
pub fn render(output: &PipelineOutput, opts: EmitOptions) -> Vec<NamedTable> {
    let mut tables = Vec::with_capacity(16);
    let header = annotated_header(output);

    tables.push(NamedTable {
        name: Path::new("annotated").join(format!("annotated_{}", output.table)),
        header: header.clone(),
        rows: annotated_rows(&output.annotated, output.annotation_columns.len()),
    });

    if opts.flagged {
        tables.push(flagged_table(output));
    }

    for label in SubsetLabel::ALL {
        tables.push(NamedTable {
            name: Path::new("sigOnly").join(format!("sig_{}_{}.tab", output.stem, label)),
            header: header.clone(),
            rows: annotated_rows(output.subset(label), output.annotation_columns.len()),
        });
    }

    for (label, calls) in &output.expression_by_label {
        tables.push(NamedTable {
            name: Path::new("expression").join(format!("expression_{}_{}.tab", output.stem, label)),
            header: vec!["GeneID".to_string(), "Expression".to_string()],
            rows: expression_rows(calls),
        });
    }

    tables
}

/// Render and hand every table of `output` to `sink`.
/// Returns the number of tables emitted.
pub fn emit<S: TableSink + ?Sized>(output: &PipelineOutput, sink: &mut S, opts: EmitOptions) -> Result<usize> {
    let tables = render(output, opts);
    let n = tables.len();
    for table in tables {
        sink.accept(table)?;
    }
    info!(table = %output.table, n_tables = n, "Outputs emitted");
    Ok(n)
}

fn annotated_header(output: &PipelineOutput) -> Vec<String> {
    RESULT_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(std::iter::once(output.mode.join_key_header().to_string()))
        .chain(output.annotation_columns.iter().cloned())
        .collect()
}

fn annotated_rows(rows: &[AnnotatedRecord], n_annotation: usize) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            let mut cells = result_cells(row);
            cells.push(row.join_key.clone());
            match &row.annotation {
                Some(annotation) => cells.extend(annotation.iter().cloned()),
                None => cells.extend(std::iter::repeat(String::new()).take(n_annotation)),
            }
            cells
        })
        .collect()
}

fn flagged_table(output: &PipelineOutput) -> NamedTable {
    let header = RESULT_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(["loc".to_string(), "Last".to_string()])
        .chain(SubsetLabel::ALL.iter().map(|l| l.description().to_string()))
        .collect();

    let rows = output
        .annotated
        .iter()
        .zip(flag_columns(&output.annotated))
        .map(|(row, flags)| {
            let mut cells = result_cells(row);
            let (loc, last) = match output.mode {
                IdMode::Locus => (
                    row.join_key.clone(),
                    version_suffix(row.gene_id()).unwrap_or_default().to_string(),
                ),
                IdMode::GeneId => (row.gene_id().to_string(), row.gene_id().to_string()),
            };
            cells.push(loc);
            cells.push(last);
            cells.extend(flags);
            cells
        })
        .collect();

    NamedTable {
        name: Path::new("annotated").join(&output.table),
        header,
        rows,
    }
}

fn result_cells(row: &AnnotatedRecord) -> Vec<String> {
    std::iter::once(row.gene_id().to_string())
        .chain(row.result.numeric_fields().into_iter().map(format_float))
        .collect()
}

fn expression_rows(calls: &[ExpressionCall]) -> Vec<Vec<String>> {
    calls
        .iter()
        .map(|c| vec![c.gene_id.clone(), c.as_goseq().to_string()])
        .collect()
}

/// Below this magnitude floats are written in exponent notation.
const EXP_SMALL: f64 = 1e-4;
/// At or above this magnitude floats are written in exponent notation.
const EXP_LARGE: f64 = 1e16;

/// Shortest round-trip representation, in exponent notation outside
/// `[1e-4, 1e16)` like pandas; NaN becomes an empty cell.
pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        return String::new();
    }
    let magnitude = v.abs();
    if v != 0.0 && v.is_finite() && !(EXP_SMALL..EXP_LARGE).contains(&magnitude) {
        format!("{v:e}")
    } else {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use postdeseq_annotate::run;
    use postdeseq_test_utils::{annotation_table, record, result_table, scenario_row};

    fn locus_output() -> PipelineOutput {
        let table = result_table("WT_vs_KO.txt", vec![scenario_row(), record("gene:MISS.2", -0.5, f64::NAN)]);
        let annotations = annotation_table(&["locus", "Symbol"], &[&["ATX1", "ATX1"]]);
        run(&table, &annotations, IdMode::Locus).unwrap()
    }

    #[test]
    fn test_render_names_follow_output_layout() {
        let tables = render(&locus_output(), EmitOptions::default());
        assert_eq!(tables.len(), 16);
        assert_eq!(tables[0].name, PathBuf::from("annotated/annotated_WT_vs_KO.txt"));
        assert_eq!(tables[1].name, PathBuf::from("annotated/WT_vs_KO.txt"));
        assert_eq!(tables[2].name, PathBuf::from("sigOnly/sig_WT_vs_KO_padj_low_005.tab"));
        assert_eq!(
            tables[15].name,
            PathBuf::from("expression/expression_WT_vs_KO_log2FC_higher_1_or_log2FC_low_minus_1_and_padj_001.tab")
        );
    }

    #[test]
    fn test_annotated_table_columns_and_miss_padding() {
        let tables = render(&locus_output(), EmitOptions { flagged: false });
        let annotated = &tables[0];
        assert_eq!(
            annotated.header,
            vec!["GeneID", "Base mean", "log2FC", "StdErr", "Wald-Stats", "P-value", "P-adj", "locus", "Symbol"]
        );
        assert_eq!(annotated.rows[0], vec!["ATX1.1", "100", "2", "0.1", "5", "1e-6", "0.002", "ATX1", "ATX1"]);
        assert_eq!(annotated.rows[1][6], "");
        assert_eq!(annotated.rows[1][7], "MISS");
        assert_eq!(annotated.rows[1][8], "");
    }

    #[test]
    fn test_flagged_table_splits_locus_and_version() {
        let tables = render(&locus_output(), EmitOptions::default());
        let flagged = &tables[1];
        assert_eq!(flagged.column("loc").unwrap(), vec!["ATX1", "MISS"]);
        assert_eq!(flagged.column("Last").unwrap(), vec!["1", "2"]);
        assert_eq!(flagged.column("padj<0.01").unwrap(), vec!["ATX1.1", ""]);
        assert_eq!(flagged.column("log2FC<0 and padj<0.05").unwrap(), vec!["", ""]);
    }

    #[test]
    fn test_expression_tables_use_goseq_values() {
        let mut sink = MemorySink::default();
        emit(&locus_output(), &mut sink, EmitOptions::default()).unwrap();
        let t = sink.get("expression/expression_WT_vs_KO_padj_low_005.tab").unwrap();
        assert_eq!(t.header, vec!["GeneID", "Expression"]);
        assert_eq!(t.rows, vec![vec!["ATX1.1", "True"], vec!["MISS.2", "False"]]);
        let down = sink.get("expression/expression_WT_vs_KO_log2FC_low_0_and_padj_low005.tab").unwrap();
        assert_eq!(down.column("Expression").unwrap(), vec!["False", "False"]);
    }

    #[test]
    fn test_directory_sink_writes_tsv() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        let n = emit(&locus_output(), &mut sink, EmitOptions::default()).unwrap();
        assert_eq!(n, sink.written());

        let text = std::fs::read_to_string(dir.path().join("sigOnly/sig_WT_vs_KO_padj_low_001.tab")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("GeneID\tBase mean\tlog2FC"));
        assert!(lines[1].starts_with("ATX1.1\t100\t2\t"));
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(f64::NAN), "");
        assert_eq!(format_float(0.25), "0.25");
        assert_eq!(format_float(-3.0), "-3");
        assert_eq!(format_float(0.0), "0");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(1e-300), "1e-300");
        assert_eq!(format_float(-2.5e-7), "-2.5e-7");
        assert_eq!(format_float(3e20), "3e20");
    }

    #[test]
    fn test_colliding_annotation_columns_render_distinctly() {
        let table = result_table("t.txt", vec![scenario_row()]);
        let annotations = annotation_table(&["locus", "GeneID", "P-adj"], &[&["ATX1", "AT-ATX1", "annot"]]);
        let output = run(&table, &annotations, IdMode::Locus).unwrap();

        let tables = render(&output, EmitOptions { flagged: false });
        let annotated = &tables[0];
        assert_eq!(&annotated.header[7..], &["locus", "GeneID_y", "P-adj_y"]);
        assert_eq!(annotated.column("P-adj").unwrap(), vec!["0.002"]);
        assert_eq!(annotated.column("P-adj_y").unwrap(), vec!["annot"]);
        assert_eq!(annotated.column("GeneID").unwrap(), vec!["ATX1.1"]);
    }
}
