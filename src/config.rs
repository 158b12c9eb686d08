//! Application configuration.
//!
//! Loaded in layers, later ones overriding earlier ones:
//! 1. Default values in code
//! 2. An optional `wics.toml` (or the file given on the command line)
//! 3. Environment variables with the `WICS__` prefix, e.g. `WICS__DATABASE__PATH`
//!
//! A `.env` file in the working directory is read first, so its variables take part in
//! step 3.

use std::path::{Path, PathBuf};

use config::{Environment, File};
use serde::Deserialize;

use crate::error::WicsResult;
use crate::report::{AccuracyCutoffs, CountSummaryOptions};

pub const DEFAULT_CONFIG_FILE: &str = "wics.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub report: ReportConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Directory for exported count summaries.
    pub output_dir: PathBuf,
    pub accuracy: AccuracyCutoffs,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directives, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl AppConfig {
    /// Load from `wics.toml` in the working directory, if present, and the environment.
    pub fn load() -> WicsResult<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE), false)
    }

    /// Load with `path` as the config file. A missing file is an error only when
    /// `required` is set.
    pub fn load_from(path: &Path, required: bool) -> WicsResult<Self> {
        // A missing .env is normal.
        let _ = dotenvy::dotenv();

        let cfg = config::Config::builder()
            .set_default("database.path", "wics.sqlite3")?
            .set_default("report.output_dir", ".")?
            .set_default("report.accuracy.danger", 70.0)?
            .set_default("report.accuracy.warning", 90.0)?
            .set_default("report.accuracy.ok", 99.0)?
            .set_default("log.filter", "info")?
            .add_source(File::from(path).required(required))
            .add_source(
                Environment::with_prefix("WICS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(cfg.try_deserialize()?)
    }

    pub fn count_summary_options(&self) -> CountSummaryOptions {
        CountSummaryOptions {
            cutoffs: self.report.accuracy,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wics.toml");
        std::fs::write(
            &path,
            "[database]\npath = \"/data/counts.sqlite3\"\n\n[report.accuracy]\nwarning = 85.0\n",
        )
        .unwrap();

        let cfg = AppConfig::load_from(&path, true).unwrap();
        assert_eq!(cfg.database.path, PathBuf::from("/data/counts.sqlite3"));
        assert_eq!(cfg.report.accuracy.warning, 85.0);
        assert_eq!(cfg.report.accuracy.danger, 70.0);
        assert_eq!(cfg.count_summary_options().cutoffs.warning, 85.0);
        assert!(cfg.count_summary_options().evaluate_quantities);
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(AppConfig::load_from(&missing, true).is_err());
        assert!(AppConfig::load_from(&missing, false).is_ok());
    }
}
