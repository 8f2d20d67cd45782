//! Per-table annotate → classify → call pipeline.
//!
//! For each result table:
//!   1. Normalise identifiers into join keys (GeneID or locus mode)
//!   2. Left-join against the shared annotation index
//!   3. Split the annotated rows into the seven subsets
//!   4. Derive GOseq expression calls (default + one per subset label)
//!
//! Tables never share mutable state, so a batch can run in parallel. A
//! missing key column fails each table with a `SchemaError`; it never
//! aborts the batch.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use postdeseq_common::{
    AnnotatedRecord, AnnotationTable, ExpressionCall, IdMode, ResultTable, SchemaError,
};

use crate::classify::{classify, SubsetLabel, Subsets};
use crate::expression::{call_expression, call_expression_for};
use crate::join::{AnnotationIndex, JoinStats, Joined};

// ── Config ────────────────────────────────────────────────────────────────────

/// Run-wide pipeline parameters. The mode is fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub mode: IdMode,
    /// Process batch tables on the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_parallel() -> bool { true }

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: IdMode::default(),
            parallel: default_parallel(),
        }
    }
}

impl PipelineConfig {
    pub fn new(mode: IdMode) -> Self {
        Self { mode, ..Default::default() }
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

// ── Outputs ───────────────────────────────────────────────────────────────────

/// Everything derived from one result table.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Source file name.
    pub table: String,
    /// File name up to its first `.`.
    pub stem: String,
    pub mode: IdMode,
    /// Annotation header carried by every annotated row.
    pub annotation_columns: Vec<String>,
    pub annotated: Vec<AnnotatedRecord>,
    pub subsets: Subsets,
    /// Default GOseq calls (padj < 0.05).
    pub expression: Vec<ExpressionCall>,
    /// GOseq calls for each subset predicate.
    pub expression_by_label: BTreeMap<SubsetLabel, Vec<ExpressionCall>>,
    pub join_stats: JoinStats,
}

impl PipelineOutput {
    pub fn subset(&self, label: SubsetLabel) -> &[AnnotatedRecord] {
        self.subsets.get(&label).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn expressed_count(&self) -> usize {
        self.expression.iter().filter(|c| c.expressed).count()
    }
}

/// Result of one table within a batch.
#[derive(Debug, Clone)]
pub struct TableOutcome {
    pub table: String,
    pub result: Result<PipelineOutput, SchemaError>,
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

/// Pipeline bound to one resolved annotation table.
///
/// The annotation index is built once at construction and shared read-only
/// by every table run.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    index: Result<Arc<AnnotationIndex>, SchemaError>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, annotations: &AnnotationTable) -> Self {
        let index = AnnotationIndex::build(annotations, config.mode).map(Arc::new);
        match &index {
            Ok(idx) => info!(
                mode = %config.mode,
                key_column = idx.key_column(),
                n_keys = idx.n_keys(),
                "Annotation index ready"
            ),
            Err(e) => warn!(mode = %config.mode, "Annotation index unusable: {e}"),
        }
        Self { config, index }
    }

    /// Reuse an index built elsewhere; its mode overrides `config.mode`.
    pub fn with_index(config: PipelineConfig, index: Arc<AnnotationIndex>) -> Self {
        let config = PipelineConfig { mode: index.mode(), ..config };
        Self { config, index: Ok(index) }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn index(&self) -> Result<&AnnotationIndex, &SchemaError> {
        self.index.as_deref()
    }

    /// Run all stages for one table.
    #[instrument(skip(self, table), fields(table = %table.name, rows = table.len()))]
    pub fn run_table(&self, table: &ResultTable) -> Result<PipelineOutput, SchemaError> {
        let index = self.index.as_ref().map_err(Clone::clone)?;
        let joined = index.join(&table.records);

        info!(
            matched = joined.stats.matched,
            unmatched = joined.stats.unmatched,
            "Table annotated"
        );

        let output = assemble(table, self.config.mode, joined);
        debug!(
            expressed = output.expressed_count(),
            padj_low_005 = output.subset(SubsetLabel::PadjLow005).len(),
            padj_low_001 = output.subset(SubsetLabel::PadjLow001).len(),
            "Table classified"
        );
        Ok(output)
    }

    /// Run every table; outcomes come back in input order.
    pub fn run_batch(&self, tables: &[ResultTable]) -> Vec<TableOutcome> {
        let run_one = |table: &ResultTable| {
            let result = self.run_table(table);
            if let Err(ref e) = result {
                warn!(table = %table.name, "Skipping table: {e}");
            }
            TableOutcome { table: table.name.clone(), result }
        };

        if self.config.parallel {
            tables.par_iter().map(run_one).collect()
        } else {
            tables.iter().map(run_one).collect()
        }
    }
}

/// One-shot run of a single table against an annotation table.
pub fn run(
    input: &ResultTable,
    annotations: &AnnotationTable,
    mode: IdMode,
) -> Result<PipelineOutput, SchemaError> {
    let index = AnnotationIndex::build(annotations, mode)?;
    Ok(assemble(input, mode, index.join(&input.records)))
}

fn assemble(table: &ResultTable, mode: IdMode, joined: Joined) -> PipelineOutput {
    let Joined { columns, rows, stats } = joined;

    let subsets = classify(&rows);
    let expression = call_expression(&rows);
    let expression_by_label = SubsetLabel::ALL
        .into_iter()
        .map(|label| (label, call_expression_for(&rows, label)))
        .collect();

    PipelineOutput {
        table: table.name.clone(),
        stem: table.stem().to_string(),
        mode,
        annotation_columns: columns,
        annotated: rows,
        subsets,
        expression,
        expression_by_label,
        join_stats: stats,
    }
}

// ── Run summary ───────────────────────────────────────────────────────────────

/// Serialisable account of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub mode: IdMode,
    /// Where the annotation table came from (path or catalog code).
    pub annotation_source: Option<String>,
    pub tables: Vec<TableSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub table: String,
    pub rows: usize,
    pub join: Option<JoinStats>,
    pub subsets: BTreeMap<SubsetLabel, usize>,
    pub expressed: usize,
    pub error: Option<String>,
}

impl RunSummary {
    pub fn from_outcomes(mode: IdMode, outcomes: &[TableOutcome]) -> Self {
        let tables = outcomes
            .iter()
            .map(|outcome| match &outcome.result {
                Ok(out) => TableSummary {
                    table: outcome.table.clone(),
                    rows: out.annotated.len(),
                    join: Some(out.join_stats),
                    subsets: out.subsets.iter().map(|(l, rows)| (*l, rows.len())).collect(),
                    expressed: out.expressed_count(),
                    error: None,
                },
                Err(e) => TableSummary {
                    table: outcome.table.clone(),
                    rows: 0,
                    join: None,
                    subsets: BTreeMap::new(),
                    expressed: 0,
                    error: Some(e.to_string()),
                },
            })
            .collect();

        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            mode,
            annotation_source: None,
            tables,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.annotation_source = Some(source.into());
        self
    }

    pub fn failed(&self) -> usize {
        self.tables.iter().filter(|t| t.error.is_some()).count()
    }
}
