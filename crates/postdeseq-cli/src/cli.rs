//! Command-line arguments. Every flag overrides the matching config value.

use std::path::PathBuf;

use clap::Parser;

use postdeseq_common::IdMode;
use postdeseq_config::{Config, CONFIG_ENV};

#[derive(Debug, Parser)]
#[command(name = "postdeseq")]
#[command(version)]
#[command(about = "Annotate DESeq2 result tables and split them into significance subsets")]
#[command(after_help = r#"Identifier modes:
  gene_id (A)   join on GeneID after stripping the gene: prefix
  locus   (S)   join on locus, dropping the .version suffix"#)]
pub struct Cli {
    /// Config file (default: postdeseq.toml)
    #[arg(short, long, value_name = "FILE", env = CONFIG_ENV, help_heading = "Config")]
    pub config: Option<PathBuf>,

    /// Directory of DESeq2 result tables
    #[arg(short, long, value_name = "DIR", help_heading = "Input")]
    pub input: Option<PathBuf>,

    /// Identifier mode: gene_id/A or locus/S
    #[arg(short, long, value_name = "MODE", help_heading = "Input")]
    pub mode: Option<IdMode>,

    /// Annotation table, bypassing the catalog
    #[arg(short, long, value_name = "FILE", help_heading = "Annotation")]
    pub annotation: Option<PathBuf>,

    /// Annotation type code looked up in the catalog
    #[arg(short = 't', long = "annotation-type", value_name = "CODE", help_heading = "Annotation")]
    pub annotation_type: Option<String>,

    /// Annotation catalog (type -> file)
    #[arg(long, value_name = "FILE", help_heading = "Annotation")]
    pub catalog: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, value_name = "DIR", help_heading = "Output")]
    pub output: Option<PathBuf>,

    /// Process tables one at a time
    #[arg(long, help_heading = "Execution")]
    pub sequential: bool,
}

impl Cli {
    /// Load the config file, then apply flags. An explicit `--config` path
    /// must exist; without one a missing default file means defaults.
    pub fn resolve_config(&self) -> postdeseq_common::Result<Config> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        Ok(self.apply(config))
    }

    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.input {
            config.input.dir = dir.clone();
        }
        if let Some(mode) = self.mode {
            config.annotation.mode = mode;
        }
        if let Some(file) = &self.annotation {
            config.annotation.file = Some(file.clone());
        }
        if let Some(code) = &self.annotation_type {
            config.annotation.type_code = Some(code.clone());
        }
        if let Some(catalog) = &self.catalog {
            config.annotation.catalog = catalog.clone();
        }
        if let Some(dir) = &self.output {
            config.output.dir = dir.clone();
        }
        if self.sequential {
            config.execution.parallel = false;
        }
        config
    }
}
