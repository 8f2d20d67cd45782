//! Configuration loading for postdeseq.
//! Reads postdeseq.toml from the current directory or the path in the
//! POSTDESEQ_CONFIG env var. A missing file means all defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use postdeseq_common::{IdMode, PostDeseqError, Result};

/// Env var naming the config file.
pub const CONFIG_ENV: &str = "POSTDESEQ_CONFIG";
/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "postdeseq.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub annotation: AnnotationConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory holding the DESeq2 result tables.
    #[serde(default = "default_input_dir")]
    pub dir: PathBuf,
}

fn default_input_dir() -> PathBuf { PathBuf::from("input") }

impl Default for InputConfig {
    fn default() -> Self {
        Self { dir: default_input_dir() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationConfig {
    #[serde(default)]
    pub mode: IdMode,
    /// Catalog mapping type codes to annotation files.
    #[serde(default = "default_catalog")]
    pub catalog: PathBuf,
    /// Directory the catalog's file names are relative to.
    #[serde(default = "default_annotation_dir")]
    pub dir: PathBuf,
    /// Catalog code, e.g. "AT".
    #[serde(rename = "type", default)]
    pub type_code: Option<String>,
    /// Direct annotation path; wins over catalog + type.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_catalog()        -> PathBuf { PathBuf::from("annotations.tsv") }
fn default_annotation_dir() -> PathBuf { PathBuf::from("annotations") }

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            mode: IdMode::default(),
            catalog: default_catalog(),
            dir: default_annotation_dir(),
            type_code: None,
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Write the per-row flag table next to the annotated table.
    #[serde(default = "bool_true")]
    pub write_flagged: bool,
    #[serde(default = "bool_true")]
    pub write_summary: bool,
}

fn default_output_dir() -> PathBuf { PathBuf::from("output") }
fn bool_true()          -> bool    { true }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            write_flagged: true,
            write_summary: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Process result tables on the rayon pool.
    #[serde(default = "bool_true")]
    pub parallel: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Where the annotation table for a run comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationSource {
    File(PathBuf),
    Catalog {
        catalog: PathBuf,
        dir: PathBuf,
        code: String,
    },
}

impl std::fmt::Display for AnnotationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnotationSource::File(path) => write!(f, "{}", path.display()),
            AnnotationSource::Catalog { catalog, code, .. } => {
                write!(f, "{code} (catalog {})", catalog.display())
            }
        }
    }
}

impl AnnotationConfig {
    /// Resolve the configured annotation source. A direct file wins;
    /// otherwise a catalog code is required.
    pub fn source(&self) -> Result<AnnotationSource> {
        if let Some(file) = &self.file {
            return Ok(AnnotationSource::File(file.clone()));
        }
        match self.type_code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => Ok(AnnotationSource::Catalog {
                catalog: self.catalog.clone(),
                dir: self.dir.clone(),
                code: code.to_string(),
            }),
            _ => Err(PostDeseqError::Config(
                "no annotation configured: set annotation.file or annotation.type".to_string(),
            )),
        }
    }
}

mod tests;

impl Config {
    /// Load configuration from postdeseq.toml.
    /// Checks POSTDESEQ_CONFIG first, then the current directory.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_or_default(Path::new(&path))
    }

    /// Like [`Config::load_from`], but a missing file yields defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)
            .map_err(|e| PostDeseqError::Config(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), mode = %config.annotation.mode, "Configuration loaded");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PostDeseqError::Config(e.to_string()))
    }
}
