//! Gene identifier normalisation.
//!
//! DESeq2 exports from Ensembl-style annotations prefix identifiers with
//! `gene:` and often carry a transcript/version suffix
//! (`gene:Solyc05g012345.2.1`). Annotation workbooks key on either the bare
//! identifier (`GeneID`) or the unversioned locus (`locus`).

use postdeseq_common::IdMode;

/// Literal prefix removed from every identifier (case-sensitive, once).
pub const GENE_PREFIX: &str = "gene:";

/// Remove a single leading `gene:`; identifiers without it pass through.
pub fn strip_gene_prefix(raw: &str) -> &str {
    raw.strip_prefix(GENE_PREFIX).unwrap_or(raw)
}

/// Canonicalise a raw identifier into the join key for `mode`.
///
/// Never fails: an empty identifier yields an empty key.
pub fn normalise(raw: &str, mode: IdMode) -> String {
    let stripped = strip_gene_prefix(raw);
    match mode {
        IdMode::GeneId => stripped.to_string(),
        IdMode::Locus => locus_of(stripped).to_string(),
    }
}

/// Segment before the first `.`, or the whole string.
fn locus_of(id: &str) -> &str {
    id.split_once('.').map_or(id, |(locus, _)| locus)
}

/// Everything after the first `.` of a prefix-stripped identifier.
pub fn version_suffix(id: &str) -> Option<&str> {
    strip_gene_prefix(id).split_once('.').map(|(_, rest)| rest)
}
