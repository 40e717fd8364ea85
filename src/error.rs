use thiserror::Error;

/// Convenience result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Error type returned by upload validation, guards, and import functions.
///
/// One shared enum across the pipeline. Reaching a row/depth/leaf ceiling is
/// never an error; callers get a smaller result instead.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Underlying I/O error while reading an upload.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Upload failed the pre-parse gate (size/extension/signature); no parser ran.
    #[error("upload rejected: {reason}")]
    Rejected { reason: String },

    /// A resource ceiling tripped (byte cap or archive inflate ratio).
    #[error("resource limit exceeded: {message}")]
    ResourceExceeded { message: String },

    /// The input does not have the required columns or structure.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// Workbook container or sheet data is structurally invalid.
    #[error("parse failure: {0}")]
    Workbook(#[from] calamine::XlsxError),

    /// Archive central directory could not be read.
    #[error("parse failure: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Sample document is not valid JSON.
    #[error("parse failure: {0}")]
    Json(#[from] serde_json::Error),

    /// Schema definition is not well-formed XML.
    #[error("parse failure: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Delimited text could not be split into records.
    #[error("parse failure: {0}")]
    Csv(#[from] csv::Error),
}
