//! postdeseq-cli: wires configuration, table IO and the annotate pipeline.

pub mod cli;
pub mod run;

pub use cli::Cli;
pub use run::{execute, load_annotations};
