//! Count-entry sheet import.
//!
//! Every data row of the `Counts` sheet is validated on its own. Problems are written to
//! the import log (`uploadsapresults`) with the sheet row number and the row is skipped;
//! clean rows become `actualcounts` rows. Only a missing sheet or a bad header row aborts
//! the import.

use std::path::Path;

use rusqlite::Connection;
use serde::Serialize;

use crate::error::WicsResult;
use crate::expr;
use crate::ingestion::observability::{report_progress, report_status};
use crate::ingestion::{ingest_from_path, IngestionOptions};
use crate::models::{Material, NewActualCount, UploadResult};
use crate::sheets::{self, count};
use crate::store::{counts, materials, staging, Store};
use crate::types::{DataSet, DataType, Record, Value};

/// Options for [`import_count_sheet`].
#[derive(Debug, Clone)]
pub struct CountImportOptions {
    /// Workbook sheet holding the counts.
    pub sheet_name: String,
    /// Sheet reading and observer options. The sheet selection is replaced by `sheet_name`.
    pub ingestion: IngestionOptions,
}

impl Default for CountImportOptions {
    fn default() -> Self {
        Self {
            sheet_name: count::SHEET_NAME.to_string(),
            ingestion: IngestionOptions::default(),
        }
    }
}

/// Outcome of a count-sheet import.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CountImportReport {
    pub rows_total: usize,
    pub rows_added: usize,
    pub rows_errors: usize,
    pub rows_ignored: usize,
    /// The import log, in the order it was written.
    pub results: Vec<UploadResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowOutcome {
    Added,
    Error,
    Ignored,
}

/// Import a count-entry workbook into `actualcounts`.
pub fn import_count_sheet(
    store: &mut Store,
    path: impl AsRef<Path>,
    options: &CountImportOptions,
) -> WicsResult<CountImportReport> {
    let observer = options.ingestion.observer.as_ref();
    report_status(observer, "Initializing Upload of Count Entry Spreadsheet...");
    staging::truncate_results(store.connection())?;

    report_status(observer, "Reading Count Entry Spreadsheet...");
    let ingestion = options.ingestion.with_sheet(&options.sheet_name);
    let ds = match ingest_from_path(path, &sheets::count_entry_schema(), &ingestion) {
        Ok(ds) => ds,
        Err(e) => {
            report_status(observer, &format!("Error: {e}"));
            return Err(e.into());
        }
    };

    let mut report = CountImportReport {
        rows_total: ds.row_count(),
        ..Default::default()
    };

    let tx = store.transaction()?;
    for (n, rec) in ds.rows.iter().enumerate() {
        report_progress(observer, n + 1, report.rows_total);
        match import_row(&tx, &ds, rec)? {
            RowOutcome::Added => report.rows_added += 1,
            RowOutcome::Error => report.rows_errors += 1,
            RowOutcome::Ignored => report.rows_ignored += 1,
        }
    }

    for (state, n) in [
        ("nRowsTotal", report.rows_total),
        ("nRowsAdded", report.rows_added),
        ("nRowsErrors", report.rows_errors),
        ("nRowsIgnored", report.rows_ignored),
    ] {
        staging::log_result(&tx, state, "", Some(n))?;
    }
    tx.commit()?;

    report.results = staging::upload_results(store.connection())?;
    report_status(observer, "Finished Processing Count Entry Spreadsheet...");
    tracing::info!(
        total = report.rows_total,
        added = report.rows_added,
        errors = report.rows_errors,
        ignored = report.rows_ignored,
        "count sheet import finished"
    );
    Ok(report)
}

fn log_error(conn: &Connection, msg: &str, row: usize) -> WicsResult<()> {
    staging::log_result(conn, "error", msg, Some(row))?;
    Ok(())
}

fn display_org(org_id: Option<i64>) -> String {
    org_id.map_or_else(|| "none".to_string(), |o| o.to_string())
}

/// Resolve the material of a row. `Err` holds the message to log.
fn resolve_material(
    conn: &Connection,
    matlnum: &str,
    org_id: Option<i64>,
) -> WicsResult<Result<Material, String>> {
    let mut candidates = materials::materials_by_number(conn, matlnum)?;
    if candidates.len() == 1 {
        return Ok(Ok(candidates.remove(0)));
    }
    if candidates.is_empty() {
        return Ok(Err(format!(
            "either {matlnum} does not exist in MaterialList or incorrect org_id ({}) given",
            display_org(org_id)
        )));
    }

    let orgs = candidates
        .iter()
        .map(|m| m.org_id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let Some(org_id) = org_id else {
        return Ok(Err(format!(
            "{matlnum} in multiple org_id's ({orgs}), but no org_id given"
        )));
    };
    match candidates.into_iter().find(|m| m.org_id == org_id) {
        Some(m) => Ok(Ok(m)),
        None => Ok(Err(format!(
            "{matlnum} in multiple org_id's ({orgs}), but org_id given ({org_id}) is not one of them"
        ))),
    }
}

/// Trimmed cell text; `None` for empty and whitespace-only cells.
fn text(v: &Value) -> Option<String> {
    let s = v.to_string();
    let s = s.trim();
    if s.is_empty() { None } else { Some(s.to_string()) }
}

/// Integer cleaning for `org_id`, `LocationOnly` and the flags. `None` for an empty cell.
fn int_field(v: &Value, field: &str, errs: &mut Vec<String>) -> Option<i64> {
    match v.coerce(DataType::Int64) {
        Ok(Value::Int64(i)) => Some(i),
        Ok(_) => None,
        Err(_) => {
            errs.push(format!("{v} is invalid for {field}"));
            None
        }
    }
}

fn import_row(conn: &Connection, ds: &DataSet, rec: &Record) -> WicsResult<RowOutcome> {
    let material_cell = ds.get(rec, count::MATERIAL);
    if ds.get(rec, count::IGNORE).is_truthy() || material_cell.is_blank() {
        return Ok(RowOutcome::Ignored);
    }
    let matlnum = material_cell.to_string();

    let sheet_org = match ds.get(rec, count::ORG_ID).coerce(DataType::Int64) {
        Ok(Value::Int64(o)) => Some(o),
        _ => None,
    };
    let mut material = match resolve_material(conn, &matlnum, sheet_org)? {
        Ok(m) => m,
        Err(msg) => {
            log_error(conn, &msg, rec.row)?;
            return Ok(RowOutcome::Error);
        }
    };

    let mut errs: Vec<String> = Vec::new();
    let mut new_count = NewActualCount {
        material_id: material.id,
        ..Default::default()
    };

    let date_cell = ds.get(rec, count::COUNT_DATE);
    let count_date = match date_cell.coerce(DataType::Date) {
        Ok(Value::Date(d)) => Some(d),
        Ok(_) => None,
        Err(_) => {
            errs.push(format!("{date_cell} is invalid for {}", count::COUNT_DATE));
            None
        }
    };
    let counter = text(ds.get(rec, count::COUNTER));
    new_count.location = text(ds.get(rec, count::LOCATION));
    new_count.notes = text(ds.get(rec, count::NOTES));
    new_count.pkgid_desc = text(ds.get(rec, count::PKGID_DESC));
    new_count.tagqty = text(ds.get(rec, count::TAGQTY));

    int_field(ds.get(rec, count::ORG_ID), count::ORG_ID, &mut errs);
    // A LocationOnly cell counts as given even when it holds 0; only non-zero marks the count.
    let location_only = int_field(ds.get(rec, count::LOCATION_ONLY), count::LOCATION_ONLY, &mut errs);
    let location_only_given = location_only.is_some();
    new_count.location_only = location_only.is_some_and(|v| v != 0);
    new_count.flag_possibly_not_received =
        int_field(ds.get(rec, count::POSS_NOT_RECEIVED), count::POSS_NOT_RECEIVED, &mut errs)
            .is_some_and(|v| v != 0);
    new_count.flag_movement_during_count = int_field(
        ds.get(rec, count::MOVEMENT_DURING_COUNT),
        count::MOVEMENT_DURING_COUNT,
        &mut errs,
    )
    .is_some_and(|v| v != 0);

    // An unusable expression is only an error when the row is not a location-only count.
    let expr_cell = ds.get(rec, count::CTD_QTY_EXPR);
    new_count.ctd_qty_expr = text(expr_cell)
        .map(|s| expr::normalize(&s).to_string())
        .filter(|s| expr::evaluate(s).is_ok());

    let mut material_changed = false;
    for (field, current) in [
        (count::TYP_CONTAINER_QTY, &mut material.typical_container_qty),
        (count::TYP_PALLET_QTY, &mut material.typical_pallet_qty),
    ] {
        if let Some(v) = text(ds.get(rec, field)) {
            if !v.is_empty() && v != "0" && current.as_deref() != Some(v.as_str()) {
                *current = Some(v);
                material_changed = true;
            }
        }
    }

    if !location_only_given && new_count.ctd_qty_expr.is_none() {
        let shown = if expr_cell.is_blank() { "(blank)".to_string() } else { expr_cell.to_string() };
        errs.push(format!(
            "record is not marked LocationOnly and {shown} is invalid for {}",
            count::CTD_QTY_EXPR
        ));
    }
    for (name, present) in [
        (count::COUNT_DATE, count_date.is_some()),
        (count::COUNTER, counter.is_some()),
        (count::LOCATION, new_count.location.is_some()),
        ("Both LocationOnly and CTD_QTY", location_only_given || new_count.ctd_qty_expr.is_some()),
    ] {
        if !present {
            errs.push(format!("{name} missing"));
        }
    }

    let (Some(count_date), Some(counter), true) = (count_date, counter, errs.is_empty()) else {
        for msg in &errs {
            log_error(conn, msg, rec.row)?;
        }
        return Ok(RowOutcome::Error);
    };

    new_count.count_date = count_date;
    new_count.counter = counter;
    let id = counts::insert_actual_count(conn, &new_count)?;
    if material_changed {
        materials::update_typical_qtys(
            conn,
            material.id,
            material.typical_container_qty.as_deref(),
            material.typical_pallet_qty.as_deref(),
        )?;
    }

    let mut line = format!(
        "{id}: {} / {} / {} / {}",
        new_count.count_date.format("%Y-%m-%d"),
        material.material,
        new_count.counter,
        new_count.location.as_deref().unwrap_or_default(),
    );
    if new_count.location_only {
        line.push_str(" / LOCATION ONLY");
    } else {
        line.push_str(&format!(" / Qty= {}", new_count.ctd_qty_expr.as_deref().unwrap_or_default()));
    }
    if material_changed {
        line.push_str(" (Typ Cont Qty/Typ Plt Qty also changed)");
    }
    staging::log_result(conn, "success", &line, Some(rec.row))?;
    Ok(RowOutcome::Added)
}
