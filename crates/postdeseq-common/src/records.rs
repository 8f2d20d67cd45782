//! Record types flowing through the annotate/classify pipeline.
//! Every value here is built once per input table and never mutated.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::PostDeseqError;

/// Positional column names of a DESeq2 result table, as written in outputs.
pub const RESULT_COLUMNS: [&str; 7] = [
    "GeneID",
    "Base mean",
    "log2FC",
    "StdErr",
    "Wald-Stats",
    "P-value",
    "P-adj",
];

// ---------------------------------------------------------------------------
// Identifier mode
// ---------------------------------------------------------------------------

/// How result identifiers are turned into annotation join keys.
///
/// Serialises as `gene_id` / `locus`; deserialises through [`FromStr`], so
/// config files accept the same case-insensitive spellings as the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum IdMode {
    /// Join on the identifier verbatim (after `gene:` stripping).
    #[default]
    GeneId,
    /// Join on the identifier with its `.version` suffix dropped.
    Locus,
}

impl IdMode {
    /// Name of the annotation column holding the join key.
    pub fn key_column(self) -> &'static str {
        match self {
            IdMode::GeneId => "GeneID",
            IdMode::Locus => "locus",
        }
    }

    /// Header of the derived join-key column in annotated output.
    /// GeneID is already taken by the result column, hence the distinct name.
    pub fn join_key_header(self) -> &'static str {
        match self {
            IdMode::GeneId => "JoinKey",
            IdMode::Locus => "locus",
        }
    }
}

impl fmt::Display for IdMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdMode::GeneId => f.write_str("gene_id"),
            IdMode::Locus => f.write_str("locus"),
        }
    }
}

impl FromStr for IdMode {
    type Err = PostDeseqError;

    /// Accepts the long names and the legacy single-letter species codes
    /// (`A` = GeneID, `S` = locus).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gene_id" | "geneid" | "gene-id" | "a" => Ok(IdMode::GeneId),
            "locus" | "s" => Ok(IdMode::Locus),
            other => Err(PostDeseqError::Config(format!(
                "unknown identifier mode '{other}' (expected gene_id/A or locus/S)"
            ))),
        }
    }
}

impl TryFrom<String> for IdMode {
    type Error = PostDeseqError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ---------------------------------------------------------------------------
// DESeq2 result rows
// ---------------------------------------------------------------------------

/// One row of a differential-expression result table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub gene_id: String,
    pub base_mean: f64,
    pub log2_fc: f64,
    pub std_err: f64,
    pub wald_stat: f64,
    pub p_value: f64,
    pub p_adj: f64,
}

impl ResultRecord {
    /// Build a record from positional fields.
    ///
    /// Missing or unparsable numeric fields become NaN; fields past the
    /// seventh are ignored.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Self {
        let num = |i: usize| fields.get(i).map_or(f64::NAN, |s| parse_numeric(s.as_ref()));
        Self {
            gene_id: fields
                .first()
                .map(|s| s.as_ref().trim().to_string())
                .unwrap_or_default(),
            base_mean: num(1),
            log2_fc: num(2),
            std_err: num(3),
            wald_stat: num(4),
            p_value: num(5),
            p_adj: num(6),
        }
    }

    /// Numeric columns in positional order.
    pub fn numeric_fields(&self) -> [f64; 6] {
        [
            self.base_mean,
            self.log2_fc,
            self.std_err,
            self.wald_stat,
            self.p_value,
            self.p_adj,
        ]
    }
}

/// Parse a decimal field (`.` separator); anything else is NaN.
pub fn parse_numeric(s: &str) -> f64 {
    s.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// A named result table, one per input file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    /// File name the table was read from, e.g. "WT_vs_KO.txt".
    pub name: String,
    pub records: Vec<ResultRecord>,
}

impl ResultTable {
    pub fn new(name: impl Into<String>, records: Vec<ResultRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    /// File name up to its first `.`, used to name derived outputs.
    pub fn stem(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Annotation table
// ---------------------------------------------------------------------------

/// An annotation table with an opaque schema.
/// Every row has exactly `columns.len()` cells; absent cells are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl AnnotationTable {
    /// Build a table, padding or truncating rows to the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Joined rows and calls
// ---------------------------------------------------------------------------

/// A result row joined with (at most) one annotation row.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRecord {
    /// The result row; `gene_id` already has its `gene:` prefix stripped.
    pub result: ResultRecord,
    pub join_key: String,
    /// Non-key annotation cells of the matched row; `None` on a join miss.
    pub annotation: Option<Arc<[String]>>,
}

impl AnnotatedRecord {
    pub fn gene_id(&self) -> &str {
        &self.result.gene_id
    }

    pub fn log2_fc(&self) -> f64 {
        self.result.log2_fc
    }

    pub fn p_adj(&self) -> f64 {
        self.result.p_adj
    }

    pub fn is_annotated(&self) -> bool {
        self.annotation.is_some()
    }
}

/// GOseq-style expressed/not-expressed call for one gene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionCall {
    pub gene_id: String,
    pub expressed: bool,
}

impl ExpressionCall {
    /// `True` / `False`, as GOseq expects them.
    pub fn as_goseq(&self) -> &'static str {
        if self.expressed {
            "True"
        } else {
            "False"
        }
    }
}
