//! Error types for the xmlsheet library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for xmlsheet operations.
#[derive(Debug, Error)]
pub enum XmlSheetError {
    /// The input is not well-formed XML.
    #[error("XML parse error at byte {position}: {message}")]
    Parse { position: u64, message: String },

    /// Well-formed XML without a usable record shape.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Loading XML from a URL failed or returned a non-success status.
    #[error("Fetch error for '{url}': {message}")]
    Fetch { url: String, message: String },

    /// Error reading or accessing a local file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Local file does not carry an `.xml` extension.
    #[error("Not an XML file: '{0}'")]
    WrongExtension(PathBuf),

    /// Overlay store could not be read or written.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Export projection could not be produced.
    #[error("Export error: {0}")]
    Export(String),

    /// Invalid user input (empty field name, unknown record, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl XmlSheetError {
    /// Build a schema error with the given reason.
    pub fn schema(reason: impl Into<String>) -> Self {
        XmlSheetError::Schema(reason.into())
    }

    /// Short machine-readable kind, used by the HTTP API.
    pub fn kind(&self) -> &'static str {
        match self {
            XmlSheetError::Parse { .. } => "parse_error",
            XmlSheetError::Schema(_) => "schema_error",
            XmlSheetError::Fetch { .. } => "fetch_error",
            XmlSheetError::Io { .. } | XmlSheetError::WrongExtension(_) => "io_error",
            XmlSheetError::Persistence(_) => "persistence_error",
            XmlSheetError::Export(_) => "export_error",
            XmlSheetError::Validation(_) => "validation_error",
            XmlSheetError::Config(_) => "config_error",
            XmlSheetError::Csv(_) => "csv_error",
            XmlSheetError::Json(_) => "json_error",
        }
    }

    /// Whether the failure was caused by the caller's input rather than the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            XmlSheetError::Parse { .. }
                | XmlSheetError::Schema(_)
                | XmlSheetError::WrongExtension(_)
                | XmlSheetError::Validation(_)
        )
    }
}

/// Result type alias for xmlsheet operations.
pub type Result<T> = std::result::Result<T, XmlSheetError>;
