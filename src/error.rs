use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for store, import and report operations.
pub type WicsResult<T> = Result<T, WicsError>;

/// Error type returned by spreadsheet ingestion.
///
/// A single enum shared by the CSV and (optional) Excel readers. Header problems abort an
/// import; bad cell values are reported per row by the importers instead of through here.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Workbook read error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV read error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The sheet does not match the expected header map (missing sheet, missing or repeated
    /// columns, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be coerced into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}

/// Crate-level error for everything above ingestion.
#[derive(Debug, Error)]
pub enum WicsError {
    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    #[error("database error: {0}")]
    Store(#[from] rusqlite::Error),

    #[cfg(feature = "xlsx_export")]
    #[error("xlsx export error: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl WicsError {
    /// Returns `true` when the error came from a malformed sheet header or a missing sheet.
    pub fn is_bad_header(&self) -> bool {
        matches!(
            self,
            WicsError::Ingestion(IngestionError::SchemaMismatch { .. })
        )
    }
}
