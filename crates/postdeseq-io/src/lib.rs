//! postdeseq-io: Table readers and output sinks around the annotate pipeline.
//!
//! - `results`: whitespace-delimited DESeq2 result files
//! - `annotations`: annotation tables (TSV / CSV, or a workbook's first sheet)
//! - `catalog`: annotation catalog (`type` code → annotation file)
//! - `sink`: named output tables written to a directory (or kept in memory)

pub mod results;
pub mod annotations;
pub mod catalog;
pub mod sink;

pub use annotations::{parse_annotation_table, read_annotation_table, read_workbook, TableFormat};
pub use catalog::{AnnotationCatalog, CatalogEntry};
pub use results::{parse_result_table, read_result_dir, read_result_table};
pub use sink::{emit, render, DirectorySink, EmitOptions, MemorySink, NamedTable, TableSink};
