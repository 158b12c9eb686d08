//! `wics` is a warehouse inventory counting library: it reconciles SAP exports with a
//! material master, imports cycle-count sheets, and reports count accuracy against SAP
//! stock on hand. Everything is kept in one SQLite database ([`store::Store`]).
//!
//! ## Workflows
//!
//! - [`material_sync::sync_material_list`]: reconcile the material master with an SAP
//!   material export (MM60 / ZMSQV001). Adds new materials, optionally removes missing
//!   ones and refreshes selected SAP fields.
//! - [`count_import::import_count_sheet`]: import the `Counts` sheet of a count-entry
//!   workbook. Bad rows are logged with their sheet row number and skipped.
//! - [`soh_import::import_soh_sheet`]: load an MB52 stock-on-hand export as a dated
//!   snapshot.
//! - [`report::count_summary`]: counted versus SAP quantities for one count date, per
//!   organization, with an optional `.xlsx` export.
//!
//! Spreadsheets are read through [`ingestion::ingest_from_path`], which maps header cells
//! onto the fields of a header map ([`types::Schema`]); the maps for each import live in
//! [`sheets`].
//!
//! ## Quick example: count summary
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use wics::count_import::{import_count_sheet, CountImportOptions};
//! use wics::report::{count_summary, CountSummaryOptions, ReportVariation};
//! use wics::store::Store;
//!
//! # fn main() -> Result<(), wics::WicsError> {
//! let mut store = Store::open("wics.sqlite3")?;
//! let imported = import_count_sheet(&mut store, "counts.xlsx", &CountImportOptions::default())?;
//! println!("added={} errors={}", imported.rows_added, imported.rows_errors);
//!
//! let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
//! let report = count_summary(
//!     store.connection(),
//!     date,
//!     ReportVariation::All,
//!     &CountSummaryOptions::default(),
//! )?;
//! for line in report.summary_lines() {
//!     println!("{} {} {:.1}% {}", line.org_name, line.material, line.accuracy, line.level);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Count quantity expressions
//!
//! Counters write quantities as arithmetic, which [`expr::evaluate`] computes:
//!
//! ```rust
//! assert_eq!(wics::expr::evaluate("=3*24+5"), Ok(77.0));
//! assert!(wics::expr::evaluate("3 boxes").is_err());
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`], [`types`], [`sheets`]: spreadsheet reading and header maps
//! - [`store`], [`models`]: SQLite schema and row types
//! - [`material_sync`], [`count_import`], [`soh_import`]: imports
//! - [`sap_list`], [`report`], [`lookups`]: queries and reports
//! - [`config`]: layered application configuration
//! - [`error`]: error types

pub mod config;
pub mod count_import;
pub mod error;
pub mod expr;
pub mod ingestion;
pub mod lookups;
pub mod material_sync;
pub mod models;
pub mod report;
pub mod sap_list;
pub mod sheets;
pub mod soh_import;
pub mod store;
pub mod types;

pub use error::{IngestionError, IngestionResult, WicsError, WicsResult};
