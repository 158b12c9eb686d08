//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest_from_path`] (from [`unified`]) which:
//!
//! - auto-detects format by file extension (or you can override via [`IngestionOptions`])
//! - projects the header row onto a header map ([`crate::types::Schema`])
//! - reads the data rows into an in-memory [`crate::types::DataSet`] of raw values
//! - optionally reports success/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific functions are also available under [`csv`] and (with the `excel`
//! feature) `excel`.

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod header;
pub mod observability;
pub mod unified;

pub use observability::{
    announce_interval, CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity,
    IngestionStats, TracingObserver,
};
pub use unified::{ingest_from_path, ExcelSheetSelection, IngestionFormat, IngestionOptions};
