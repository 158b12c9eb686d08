//! `wics`: command-line front end for the warehouse inventory counting library.
//!
//! Every command opens the configured SQLite database (creating it on first use) and
//! prints its result as JSON on stdout. Logs go to stderr.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use wics::config::AppConfig;
use wics::count_import::{import_count_sheet, CountImportOptions};
use wics::ingestion::{CompositeObserver, FileObserver, IngestionObserver, IngestionOptions, TracingObserver};
use wics::lookups;
use wics::material_sync::{sync_material_list, MaterialSyncOptions, UpdateField};
use wics::models::{Material, NewCountScheduleEntry};
use wics::report::{count_summary, ReportVariation};
use wics::soh_import::{import_soh_sheet, SohImportOptions};
use wics::store::{counts, materials, soh, staging, Store};

/// Warehouse inventory counting.
#[derive(Parser, Debug)]
#[command(name = "wics", version, about = "Warehouse inventory count imports and reports")]
struct Cli {
    /// Config file (default: ./wics.toml if present).
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    /// SQLite database, overriding `database.path`.
    #[arg(long = "db", global = true)]
    db: Option<PathBuf>,

    /// Also append progress and status messages to this file.
    #[arg(long = "log-file", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the database schema.
    Init,

    /// Reference data: organizations, SAP plants, units of measure, part types.
    Setup {
        #[command(subcommand)]
        action: SetupAction,
    },

    /// Reconcile the material master with an SAP material list export.
    SyncMaterials {
        /// MM60 / ZMSQV001 export (.xlsx or .csv).
        file: PathBuf,
        /// Field groups to refresh on existing materials (repeatable).
        #[arg(long = "update")]
        update: Vec<UpdateField>,
        /// Refresh every field group.
        #[arg(long = "update-all")]
        update_all: bool,
        /// Remove materials that are gone from SAP and never counted or stocked.
        #[arg(long = "delete-missing")]
        delete_missing: bool,
    },

    /// Import a count-entry workbook.
    ImportCounts {
        file: PathBuf,
        /// Sheet holding the counts.
        #[arg(long, default_value = wics::sheets::count::SHEET_NAME)]
        sheet: String,
    },

    /// Load an MB52 stock-on-hand export as the snapshot for a date.
    ImportSoh {
        file: PathBuf,
        /// Snapshot date (YYYY-MM-DD).
        #[arg(long)]
        date: NaiveDate,
    },

    /// Schedule a material for counting.
    Schedule {
        /// Count date (YYYY-MM-DD).
        #[arg(long)]
        date: NaiveDate,
        /// Material number.
        material: String,
        /// Organization name, needed when the number exists in several orgs.
        #[arg(long)]
        org: Option<String>,
        #[arg(long)]
        requestor: Option<String>,
        #[arg(long)]
        counter: Option<String>,
        #[arg(long)]
        reason: Option<String>,
    },

    /// Count-accuracy summary for a date.
    CountSummary {
        /// Count date (YYYY-MM-DD).
        #[arg(long)]
        date: NaiveDate,
        /// Only schedule entries with a requestor.
        #[arg(long)]
        requested: bool,
        /// Do not evaluate CTD_QTY expressions.
        #[arg(long = "no-eval")]
        no_eval: bool,
        /// Also write the summary workbook (to `report.output_dir` unless a directory is given).
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        export: Option<PathBuf>,
    },

    /// Where a material was counted.
    FoundAt {
        material: String,
        #[arg(long)]
        org: Option<String>,
        /// Every count date, not just the last one.
        #[arg(long)]
        all: bool,
    },

    /// Show the log of the last count or SOH import.
    Results,
}

#[derive(Subcommand, Debug)]
enum SetupAction {
    /// Add an organization.
    Org { name: String },
    /// Map an SAP plant code to an organization.
    Plant { plant: String, org: String },
    /// Add or change a unit of measure.
    Uom {
        uom: String,
        multiplier: f64,
        #[arg(long)]
        text: Option<String>,
    },
    /// Add a warehouse part type.
    PartType {
        name: String,
        #[arg(long)]
        priority: Option<i64>,
    },
    /// List the reference data and the loaded SOH snapshot dates.
    List,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn ingestion_options(log_file: Option<&Path>) -> IngestionOptions {
    let mut observers: Vec<Arc<dyn IngestionObserver>> = vec![Arc::new(TracingObserver)];
    if let Some(path) = log_file {
        observers.push(Arc::new(FileObserver::new(path)));
    }
    IngestionOptions {
        observer: Some(Arc::new(CompositeObserver::new(observers))),
        ..Default::default()
    }
}

fn org_id(store: &Store, name: &str) -> anyhow::Result<i64> {
    materials::organization_by_name(store.connection(), name)?
        .map(|o| o.id)
        .with_context(|| format!("unknown organization '{name}'"))
}

fn find_material(store: &Store, number: &str, org: Option<&str>) -> anyhow::Result<Material> {
    let mut candidates = materials::materials_by_number(store.connection(), number)?;
    if let Some(org) = org {
        let org = org_id(store, org)?;
        candidates.retain(|m| m.org_id == org);
    }
    match candidates.len() {
        0 => bail!("material {number} not found"),
        1 => Ok(candidates.remove(0)),
        _ => bail!("material {number} exists in several organizations; pass --org"),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path, true),
        None => AppConfig::load(),
    }
    .context("loading configuration")?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let db_path = cli.db.clone().unwrap_or_else(|| config.database.path.clone());
    let mut store = Store::open(&db_path).with_context(|| format!("opening {}", db_path.display()))?;
    let ingestion = ingestion_options(cli.log_file.as_deref());

    match cli.command {
        Commands::Init => {
            tracing::info!(path = %db_path.display(), "database ready");
            print_json(&serde_json::json!({ "database": db_path }))?;
        }

        Commands::Setup { action } => {
            let conn = store.connection();
            match action {
                SetupAction::Org { name } => {
                    let id = materials::insert_organization(conn, &name)?;
                    print_json(&serde_json::json!({ "id": id, "orgname": name }))?;
                }
                SetupAction::Plant { plant, org } => {
                    let org_id = org_id(&store, &org)?;
                    materials::map_plant(store.connection(), &plant, org_id)?;
                    print_json(&serde_json::json!({ "sap_plant": plant, "org_id": org_id }))?;
                }
                SetupAction::Uom { uom, multiplier, text } => {
                    materials::upsert_uom(conn, &uom, text.as_deref(), multiplier)?;
                    print_json(&materials::units_of_measure(conn)?)?;
                }
                SetupAction::PartType { name, priority } => {
                    let id = materials::insert_part_type(conn, &name, priority)?;
                    print_json(&serde_json::json!({ "id": id, "whse_part_type": name }))?;
                }
                SetupAction::List => {
                    print_json(&serde_json::json!({
                        "organizations": materials::organizations(conn)?,
                        "plants": materials::plants(conn)?,
                        "units_of_measure": materials::units_of_measure(conn)?,
                        "part_types": materials::part_types(conn)?,
                        "soh_snapshots": soh::snapshot_dates(conn)?,
                    }))?;
                }
            }
        }

        Commands::SyncMaterials {
            file,
            update,
            update_all,
            delete_missing,
        } => {
            let update_fields: BTreeSet<UpdateField> = if update_all {
                UpdateField::ALL.into_iter().collect()
            } else {
                update.into_iter().collect()
            };
            let options = MaterialSyncOptions {
                update_fields,
                delete_missing,
                ingestion,
            };
            let report = sync_material_list(&mut store, &file, &options)
                .with_context(|| format!("syncing material list from {}", file.display()))?;
            print_json(&report)?;
        }

        Commands::ImportCounts { file, sheet } => {
            let options = CountImportOptions {
                sheet_name: sheet,
                ingestion,
            };
            let report = import_count_sheet(&mut store, &file, &options)
                .with_context(|| format!("importing counts from {}", file.display()))?;
            print_json(&report)?;
        }

        Commands::ImportSoh { file, date } => {
            let report = import_soh_sheet(&mut store, &file, date, &SohImportOptions { ingestion })
                .with_context(|| format!("importing stock on hand from {}", file.display()))?;
            print_json(&report)?;
        }

        Commands::Schedule {
            date,
            material,
            org,
            requestor,
            counter,
            reason,
        } => {
            let m = find_material(&store, &material, org.as_deref())?;
            let entry = NewCountScheduleEntry {
                count_date: date,
                material_id: m.id,
                requestor,
                counter,
                reason_scheduled: reason,
                ..Default::default()
            };
            let conn = store.connection();
            let id = counts::insert_schedule(conn, &entry)?;
            print_json(&serde_json::json!({
                "id": id,
                "count_date": date,
                "scheduled": counts::schedule_for_date(conn, date)?,
            }))?;
        }

        Commands::CountSummary {
            date,
            requested,
            no_eval,
            export,
        } => {
            let variation = if requested {
                ReportVariation::Requested
            } else {
                ReportVariation::All
            };
            let mut options = config.count_summary_options();
            options.evaluate_quantities = !no_eval;
            let report = count_summary(store.connection(), date, variation, &options)?;

            if let Some(dir) = export {
                let dir = if dir.as_os_str().is_empty() {
                    config.report.output_dir.clone()
                } else {
                    dir
                };
                export_report(&report, &dir)?;
            }
            print_json(&report)?;
        }

        Commands::FoundAt { material, org, all } => {
            let m = find_material(&store, &material, org.as_deref())?;
            let conn = store.connection();
            let label = lookups::material_org_label(conn, &m)?;
            if all {
                print_json(&serde_json::json!({
                    "material": label,
                    "found_at": lookups::found_at(conn, m.id)?,
                }))?;
            } else {
                print_json(&serde_json::json!({
                    "material": label,
                    "last_found_at": lookups::last_found_at(conn, m.id)?,
                }))?;
            }
        }

        Commands::Results => {
            print_json(&staging::upload_results(store.connection())?)?;
        }
    }

    Ok(())
}

#[cfg(feature = "xlsx_export")]
fn export_report(report: &wics::report::CountSummaryReport, dir: &Path) -> anyhow::Result<()> {
    let path = wics::report::export_summary_xlsx(report, dir)?;
    eprintln!("summary written to {}", path.display());
    Ok(())
}

#[cfg(not(feature = "xlsx_export"))]
fn export_report(_report: &wics::report::CountSummaryReport, _dir: &Path) -> anyhow::Result<()> {
    bail!("this build has no workbook export; enable the `xlsx_export` feature")
}
