use thiserror::Error;

/// The annotation table does not carry the key column required by the
/// selected identifier mode.
///
/// Kept separate from [`PostDeseqError`] so a pipeline can hold on to it
/// and report it again for every table it is asked to process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("annotation table has no '{column}' column (available: {})", available.join(", "))]
pub struct SchemaError {
    pub column: String,
    pub available: Vec<String>,
}

#[derive(Debug, Error)]
pub enum PostDeseqError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Annotation catalog error: {0}")]
    Catalog(String),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PostDeseqError {
    /// True for the one error that is fatal to a single table only.
    pub fn is_schema(&self) -> bool {
        matches!(self, PostDeseqError::Schema(_))
    }
}

impl From<csv::Error> for PostDeseqError {
    fn from(err: csv::Error) -> Self {
        PostDeseqError::Csv(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PostDeseqError>;
