//! Left join of result rows against an annotation table.
//!
//! The annotation table is indexed once on its key column and can then be
//! shared read-only (e.g. as `Arc<AnnotationIndex>`) by every per-table
//! join in a batch.
//!
//! Duplicate keys: the first row seen for a key wins and later rows are
//! ignored. This keeps results reproducible for a given annotation file
//! ordering; the number of ignored rows is reported, never raised.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use postdeseq_common::{
    AnnotatedRecord, AnnotationTable, IdMode, ResultRecord, SchemaError, RESULT_COLUMNS,
};

use crate::normalise::{normalise, strip_gene_prefix};

/// In-memory lookup from join key → first annotation row with that key.
#[derive(Debug, Clone)]
pub struct AnnotationIndex {
    mode: IdMode,
    /// Annotation columns carried into the output (key column excluded).
    columns: Vec<String>,
    lookup: HashMap<String, Arc<[String]>>,
    /// Rows ignored because an earlier row had the same key.
    duplicate_keys: usize,
    n_rows: usize,
}

impl AnnotationIndex {
    // ── Constructors ──────────────────────────────────────────────────────────

    /// Index `table` on the key column `mode` requires.
    ///
    /// Fails only when that column is absent. Rows with an empty key are not
    /// indexed, so an empty identifier never picks up an arbitrary row.
    pub fn build(table: &AnnotationTable, mode: IdMode) -> Result<Self, SchemaError> {
        let key_column = mode.key_column();
        let key_idx = table.column_index(key_column).ok_or_else(|| SchemaError {
            column: key_column.to_string(),
            available: table.columns.clone(),
        })?;

        let columns = output_columns(
            table
                .columns
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != key_idx)
                .map(|(_, c)| c.as_str()),
            mode,
        );

        let mut lookup: HashMap<String, Arc<[String]>> = HashMap::with_capacity(table.len());
        let mut duplicate_keys = 0usize;

        for row in &table.rows {
            let key = row.get(key_idx).map(|k| k.trim()).unwrap_or("");
            if key.is_empty() {
                continue;
            }
            if lookup.contains_key(key) {
                duplicate_keys += 1;
                continue;
            }
            let cells: Arc<[String]> = row
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != key_idx)
                .map(|(_, c)| c.clone())
                .collect();
            lookup.insert(key.to_string(), cells);
        }

        if duplicate_keys > 0 {
            warn!(
                key_column,
                duplicate_keys, "Annotation table has duplicate keys; first occurrence kept"
            );
        }
        debug!(
            key_column,
            n_rows = table.len(),
            n_keys = lookup.len(),
            "Annotation index built"
        );

        Ok(Self {
            mode,
            columns,
            lookup,
            duplicate_keys,
            n_rows: table.len(),
        })
    }

    // ── Lookup ────────────────────────────────────────────────────────────────

    /// Annotation cells for an already-normalised key.
    pub fn get(&self, key: &str) -> Option<&Arc<[String]>> {
        self.lookup.get(key)
    }

    pub fn mode(&self) -> IdMode {
        self.mode
    }

    /// Name of the column the index was keyed on.
    pub fn key_column(&self) -> &'static str {
        self.mode.key_column()
    }

    /// Output annotation columns, in annotation-table order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn duplicate_keys(&self) -> usize {
        self.duplicate_keys
    }

    /// Number of distinct keys indexed.
    pub fn n_keys(&self) -> usize {
        self.lookup.len()
    }

    /// Number of rows in the source table.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    // ── Join ──────────────────────────────────────────────────────────────────

    /// Left-join `results` against this index.
    ///
    /// One output row per input row, in input order.
    pub fn join(&self, results: &[ResultRecord]) -> Joined {
        let mut stats = JoinStats {
            duplicate_keys: self.duplicate_keys,
            ..JoinStats::default()
        };

        let rows = results
            .iter()
            .map(|record| {
                let join_key = normalise(&record.gene_id, self.mode);
                let annotation = self.lookup.get(&join_key).cloned();
                if annotation.is_some() {
                    stats.matched += 1;
                } else {
                    stats.unmatched += 1;
                }
                let mut result = record.clone();
                result.gene_id = strip_gene_prefix(&record.gene_id).to_string();
                AnnotatedRecord {
                    result,
                    join_key,
                    annotation,
                }
            })
            .collect();

        Joined {
            columns: self.columns.clone(),
            rows,
            stats,
        }
    }
}

/// Suffix appended to an annotation column whose name is already taken.
pub const COLLISION_SUFFIX: &str = "_y";

/// Annotation header as carried into the output. Names that clash with a
/// result column, the join-key column or an earlier annotation column get
/// [`COLLISION_SUFFIX`] until unique, like a pandas merge's right side.
fn output_columns<'a>(names: impl Iterator<Item = &'a str>, mode: IdMode) -> Vec<String> {
    let mut taken: HashSet<String> = RESULT_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .chain(std::iter::once(mode.join_key_header().to_string()))
        .collect();

    names
        .map(|name| {
            let mut unique = name.to_string();
            while taken.contains(&unique) {
                unique.push_str(COLLISION_SUFFIX);
            }
            if unique != name {
                debug!(column = name, renamed = %unique, "Annotation column renamed");
            }
            taken.insert(unique.clone());
            unique
        })
        .collect()
}

/// Match counts of one join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinStats {
    pub matched: usize,
    pub unmatched: usize,
    pub duplicate_keys: usize,
}

/// Output of a join: annotated rows plus the annotation header they carry.
#[derive(Debug, Clone)]
pub struct Joined {
    pub columns: Vec<String>,
    pub rows: Vec<AnnotatedRecord>,
    pub stats: JoinStats,
}

/// One-shot join: index `annotations` and join `results` against it.
pub fn join(
    results: &[ResultRecord],
    annotations: &AnnotationTable,
    mode: IdMode,
) -> Result<Joined, SchemaError> {
    Ok(AnnotationIndex::build(annotations, mode)?.join(results))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use postdeseq_test_utils::{annotation_table, record};

    fn locus_annotations() -> AnnotationTable {
        annotation_table(
            &["locus", "Description", "GO"],
            &[
                &["ATX1", "trithorax 1", "GO:0003677"],
                &["ATX2", "trithorax 2", ""],
                &["ATX1", "duplicate row", "GO:9999999"],
            ],
        )
    }

    #[test]
    fn test_left_join_keeps_every_result_row() {
        let results = vec![
            record("gene:ATX1.1", 2.0, 0.002),
            record("gene:UNKNOWN.3", -1.0, 0.5),
            record("ATX2", 0.5, 0.04),
        ];
        let joined = join(&results, &locus_annotations(), IdMode::Locus).unwrap();
        assert_eq!(joined.rows.len(), results.len());
        assert_eq!(joined.stats.matched, 2);
        assert_eq!(joined.stats.unmatched, 1);
        assert!(joined.rows[0].is_annotated());
        assert!(!joined.rows[1].is_annotated());
    }

    #[test]
    fn test_key_column_excluded_from_carried_columns() {
        let joined = join(&[], &locus_annotations(), IdMode::Locus).unwrap();
        assert_eq!(joined.columns, vec!["Description", "GO"]);
    }

    #[test]
    fn test_first_duplicate_wins() {
        let results = vec![record("ATX1.2", 1.0, 0.01)];
        let joined = join(&results, &locus_annotations(), IdMode::Locus).unwrap();
        let cells = joined.rows[0].annotation.as_ref().unwrap();
        assert_eq!(&cells[..], &["trithorax 1".to_string(), "GO:0003677".to_string()]);
        assert_eq!(joined.stats.duplicate_keys, 1);
    }

    #[test]
    fn test_missing_key_column_is_schema_error() {
        let err = join(&[], &locus_annotations(), IdMode::GeneId).unwrap_err();
        assert_eq!(err.column, "GeneID");
        assert_eq!(err.available, vec!["locus", "Description", "GO"]);
    }

    #[test]
    fn test_output_gene_id_is_prefix_stripped_but_versioned() {
        let results = vec![record("gene:ATX1.1", 2.0, 0.002)];
        let joined = join(&results, &locus_annotations(), IdMode::Locus).unwrap();
        assert_eq!(joined.rows[0].gene_id(), "ATX1.1");
        assert_eq!(joined.rows[0].join_key, "ATX1");
    }

    #[test]
    fn test_gene_id_mode_requires_exact_match() {
        let annotations = annotation_table(&["GeneID", "Symbol"], &[&["AT1G01010", "NAC001"]]);
        let results = vec![
            record("gene:AT1G01010", 1.0, 0.01),
            record("AT1G01010.1", 1.0, 0.01),
        ];
        let joined = join(&results, &annotations, IdMode::GeneId).unwrap();
        assert!(joined.rows[0].is_annotated());
        assert!(!joined.rows[1].is_annotated());
    }

    #[test]
    fn test_empty_keys_are_not_indexed() {
        let annotations = annotation_table(&["GeneID", "Symbol"], &[&["", "orphan"]]);
        let index = AnnotationIndex::build(&annotations, IdMode::GeneId).unwrap();
        assert_eq!(index.n_keys(), 0);
        let joined = index.join(&[record("", 0.0, 0.5)]);
        assert!(!joined.rows[0].is_annotated());
    }

    #[test]
    fn test_colliding_annotation_columns_are_suffixed() {
        let annotations = annotation_table(
            &["locus", "GeneID", "P-adj", "P-adj_y", "Note", "Note"],
            &[&["ATX1", "AT-ATX1", "annot", "x", "n1", "n2"]],
        );
        let index = AnnotationIndex::build(&annotations, IdMode::Locus).unwrap();
        assert_eq!(
            index.columns(),
            &["GeneID_y", "P-adj_y", "P-adj_y_y", "Note", "Note_y"]
        );
        // Cells stay aligned with the renamed header.
        let cells = index.get("ATX1").unwrap();
        assert_eq!(&cells[..2], &["AT-ATX1".to_string(), "annot".to_string()]);
    }

    #[test]
    fn test_gene_id_mode_reserves_join_key_header() {
        let annotations = annotation_table(&["GeneID", "JoinKey", "Symbol"], &[]);
        let index = AnnotationIndex::build(&annotations, IdMode::GeneId).unwrap();
        assert_eq!(index.columns(), &["JoinKey_y", "Symbol"]);
    }
}
