//! postdeseq-common: Shared record types and errors used across all postdeseq crates.

pub mod error;
pub mod records;

// Re-export commonly used types
pub use error::{PostDeseqError, Result, SchemaError};
pub use records::{
    AnnotatedRecord, AnnotationTable, ExpressionCall, IdMode, ResultRecord, ResultTable,
    RESULT_COLUMNS,
};
