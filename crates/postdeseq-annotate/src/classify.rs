//! Significance / fold-change subsets.
//!
//! | Label | Predicate |
//! |-------|-----------|
//! | padj_low_005 | padj < 0.05 |
//! | log2FC_high_0_padj_low_005 | log2FC > 0 and padj < 0.05 |
//! | log2FC_low_0_and_padj_low005 | log2FC < 0 and padj < 0.05 |
//! | padj_low_001 | padj < 0.01 |
//! | log2FC_high_1_and_padj_low_001 | log2FC > 1 and padj < 0.01 |
//! | log2FC_low_minus_1_and_padj_low_001 | log2FC < -1 and padj < 0.01 |
//! | log2FC_higher_1_or_log2FC_low_minus_1_and_padj_001 | \|log2FC\| > 1 and padj < 0.01 |
//!
//! A NaN in either operand makes a predicate false, so rows with a missing
//! padj belong to no subset.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use postdeseq_common::{AnnotatedRecord, PostDeseqError};

/// Loose significance cut-off.
pub const PADJ_LOOSE: f64 = 0.05;
/// Strict significance cut-off.
pub const PADJ_STRICT: f64 = 0.01;
/// |log2FC| cut-off used with the strict padj.
pub const LOG2FC_STRONG: f64 = 1.0;

/// The seven fixed subsets. Declaration order is output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubsetLabel {
    #[serde(rename = "padj_low_005")]
    PadjLow005,
    #[serde(rename = "log2FC_high_0_padj_low_005")]
    UpPadjLow005,
    #[serde(rename = "log2FC_low_0_and_padj_low005")]
    DownPadjLow005,
    #[serde(rename = "padj_low_001")]
    PadjLow001,
    #[serde(rename = "log2FC_high_1_and_padj_low_001")]
    StrongUpPadjLow001,
    #[serde(rename = "log2FC_low_minus_1_and_padj_low_001")]
    StrongDownPadjLow001,
    #[serde(rename = "log2FC_higher_1_or_log2FC_low_minus_1_and_padj_001")]
    StrongEitherPadjLow001,
}

impl SubsetLabel {
    pub const ALL: [SubsetLabel; 7] = [
        SubsetLabel::PadjLow005,
        SubsetLabel::UpPadjLow005,
        SubsetLabel::DownPadjLow005,
        SubsetLabel::PadjLow001,
        SubsetLabel::StrongUpPadjLow001,
        SubsetLabel::StrongDownPadjLow001,
        SubsetLabel::StrongEitherPadjLow001,
    ];

    /// Label as used in output file names.
    pub fn as_str(self) -> &'static str {
        match self {
            SubsetLabel::PadjLow005 => "padj_low_005",
            SubsetLabel::UpPadjLow005 => "log2FC_high_0_padj_low_005",
            SubsetLabel::DownPadjLow005 => "log2FC_low_0_and_padj_low005",
            SubsetLabel::PadjLow001 => "padj_low_001",
            SubsetLabel::StrongUpPadjLow001 => "log2FC_high_1_and_padj_low_001",
            SubsetLabel::StrongDownPadjLow001 => "log2FC_low_minus_1_and_padj_low_001",
            SubsetLabel::StrongEitherPadjLow001 => {
                "log2FC_higher_1_or_log2FC_low_minus_1_and_padj_001"
            }
        }
    }

    /// Human-readable predicate, used as the flag column header.
    pub fn description(self) -> &'static str {
        match self {
            SubsetLabel::PadjLow005 => "padj<0.05",
            SubsetLabel::UpPadjLow005 => "log2FC>0 and padj<0.05",
            SubsetLabel::DownPadjLow005 => "log2FC<0 and padj<0.05",
            SubsetLabel::PadjLow001 => "padj<0.01",
            SubsetLabel::StrongUpPadjLow001 => "log2FC>1 and padj<0.01",
            SubsetLabel::StrongDownPadjLow001 => "log2FC<-1 and padj<0.01",
            SubsetLabel::StrongEitherPadjLow001 => "(log2FC>1 or log2FC<-1) and padj<0.01",
        }
    }

    /// Evaluate the predicate. NaN in a tested operand is always false.
    pub fn matches(self, log2_fc: f64, p_adj: f64) -> bool {
        if p_adj.is_nan() {
            return false;
        }
        let loose = p_adj < PADJ_LOOSE;
        let strict = p_adj < PADJ_STRICT;
        // Sign predicates below must not see NaN either.
        let fc = (!log2_fc.is_nan()).then_some(log2_fc);

        match self {
            SubsetLabel::PadjLow005 => loose,
            SubsetLabel::UpPadjLow005 => loose && fc.is_some_and(|v| v > 0.0),
            SubsetLabel::DownPadjLow005 => loose && fc.is_some_and(|v| v < 0.0),
            SubsetLabel::PadjLow001 => strict,
            SubsetLabel::StrongUpPadjLow001 => strict && fc.is_some_and(|v| v > LOG2FC_STRONG),
            SubsetLabel::StrongDownPadjLow001 => {
                strict && fc.is_some_and(|v| v < -LOG2FC_STRONG)
            }
            SubsetLabel::StrongEitherPadjLow001 => {
                strict && fc.is_some_and(|v| v > LOG2FC_STRONG || v < -LOG2FC_STRONG)
            }
        }
    }

    pub fn matches_record(self, row: &AnnotatedRecord) -> bool {
        self.matches(row.log2_fc(), row.p_adj())
    }
}

impl fmt::Display for SubsetLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubsetLabel {
    type Err = PostDeseqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SubsetLabel::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| PostDeseqError::Config(format!("unknown subset label '{s}'")))
    }
}

/// Subset tables keyed by label; always holds all seven labels.
pub type Subsets = BTreeMap<SubsetLabel, Vec<AnnotatedRecord>>;

/// Partition `rows` into the seven (overlapping) subsets.
/// Rows are copied, never modified; input order is kept within a subset.
pub fn classify(rows: &[AnnotatedRecord]) -> Subsets {
    SubsetLabel::ALL
        .into_iter()
        .map(|label| {
            let members = rows
                .iter()
                .filter(|row| label.matches_record(row))
                .cloned()
                .collect();
            (label, members)
        })
        .collect()
}

/// Labels a single row belongs to, in output order.
pub fn labels_for(log2_fc: f64, p_adj: f64) -> Vec<SubsetLabel> {
    SubsetLabel::ALL
        .into_iter()
        .filter(|l| l.matches(log2_fc, p_adj))
        .collect()
}

/// Per-row flag view: the gene id under each label it satisfies, else "".
pub fn flag_columns(rows: &[AnnotatedRecord]) -> Vec<[String; 7]> {
    rows.iter()
        .map(|row| {
            SubsetLabel::ALL.map(|label| {
                if label.matches_record(row) {
                    row.gene_id().to_string()
                } else {
                    String::new()
                }
            })
        })
        .collect()
}
