//! GOseq-compatible expression calls.
//!
//! GOseq takes one boolean per gene: expressed (differentially) or not.
//! The default call is `padj < 0.05`; `call_expression_for` produces the
//! same table for any of the seven subset predicates.

use postdeseq_common::{AnnotatedRecord, ExpressionCall};

use crate::classify::SubsetLabel;

/// Predicate behind the default expression call.
pub const EXPRESSION_LABEL: SubsetLabel = SubsetLabel::PadjLow005;

/// One call per row: `true` iff padj < 0.05 (NaN padj → `false`).
/// Annotation success plays no part.
pub fn call_expression(rows: &[AnnotatedRecord]) -> Vec<ExpressionCall> {
    call_expression_for(rows, EXPRESSION_LABEL)
}

/// One call per row against an arbitrary subset predicate.
pub fn call_expression_for(rows: &[AnnotatedRecord], label: SubsetLabel) -> Vec<ExpressionCall> {
    rows.iter()
        .map(|row| ExpressionCall {
            gene_id: row.gene_id().to_string(),
            expressed: label.matches_record(row),
        })
        .collect()
}
