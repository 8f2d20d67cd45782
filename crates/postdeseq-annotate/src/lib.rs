//! postdeseq-annotate: Annotation join and significance classification.
//!
//! Stages, leaves first:
//! - `normalise`: raw gene identifier → join key (GeneID or locus mode)
//! - `join`: left join of result rows against an annotation table
//! - `classify`: seven fixed padj / log2FC subsets
//! - `expression`: GOseq True/False calls
//! - `pipeline`: per-table orchestration and batch runs

pub mod normalise;
pub mod join;
pub mod classify;
pub mod expression;
pub mod pipeline;

pub use classify::{classify, SubsetLabel, Subsets};
pub use expression::{call_expression, call_expression_for};
pub use join::{join, AnnotationIndex, JoinStats, Joined};
pub use normalise::normalise;
pub use pipeline::{run, Pipeline, PipelineConfig, PipelineOutput, RunSummary, TableOutcome};
