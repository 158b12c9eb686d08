//! SAP MB52 stock-on-hand import.
//!
//! Loads one dated snapshot into `sap_sohrecs`. Loading the same date again replaces
//! that snapshot.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use crate::error::WicsResult;
use crate::ingestion::observability::{report_progress, report_status};
use crate::ingestion::{ingest_from_path, IngestionOptions};
use crate::models::{SohRecord, UploadResult};
use crate::sheets::{self, soh};
use crate::store::{materials, soh as soh_store, staging, Store};
use crate::types::{DataSet, DataType, Record, Value};

#[derive(Debug, Clone, Default)]
pub struct SohImportOptions {
    pub ingestion: IngestionOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct SohImportReport {
    pub uploaded_at: NaiveDate,
    pub rows_total: usize,
    pub rows_added: usize,
    pub rows_errors: usize,
    pub rows_ignored: usize,
    /// Lines of an earlier load of the same date that were dropped.
    pub replaced: usize,
    /// Added lines whose material is not in the material master.
    pub unlinked: usize,
    pub results: Vec<UploadResult>,
}

/// Import an MB52 export as the snapshot for `uploaded_at`.
pub fn import_soh_sheet(
    store: &mut Store,
    path: impl AsRef<Path>,
    uploaded_at: NaiveDate,
    options: &SohImportOptions,
) -> WicsResult<SohImportReport> {
    let observer = options.ingestion.observer.as_ref();
    staging::truncate_results(store.connection())?;

    report_status(observer, "Reading SAP Stock on Hand Spreadsheet");
    let ds = ingest_from_path(path, &sheets::stock_on_hand_schema(), &options.ingestion)?;

    let plants: HashMap<String, i64> = materials::plants(store.connection())?
        .into_iter()
        .map(|p| (p.sap_plant, p.org_id))
        .collect();

    let mut report = SohImportReport {
        uploaded_at,
        rows_total: ds.row_count(),
        rows_added: 0,
        rows_errors: 0,
        rows_ignored: 0,
        replaced: 0,
        unlinked: 0,
        results: Vec::new(),
    };

    let tx = store.transaction()?;
    report.replaced = soh_store::delete_snapshot(&tx, uploaded_at)?;
    if report.replaced > 0 {
        report_status(observer, &format!("Replacing {} lines loaded for {uploaded_at}", report.replaced));
    }

    for (n, rec) in ds.rows.iter().enumerate() {
        report_progress(observer, n + 1, report.rows_total);
        let Some(material) = text(ds.get(rec, soh::MATERIAL)) else {
            report.rows_ignored += 1;
            continue;
        };
        match build_record(&tx, &ds, rec, &material, uploaded_at, &plants)? {
            Ok(line) => {
                if line.material_id.is_none() {
                    report.unlinked += 1;
                }
                soh_store::insert_soh(&tx, &line)?;
                report.rows_added += 1;
            }
            Err(errs) => {
                for msg in errs {
                    staging::log_result(&tx, "error", &msg, Some(rec.row))?;
                }
                report.rows_errors += 1;
            }
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
    report_status(observer, "Finished Processing SAP Stock on Hand Spreadsheet");
    tracing::info!(
        %uploaded_at,
        added = report.rows_added,
        errors = report.rows_errors,
        unlinked = report.unlinked,
        replaced = report.replaced,
        "stock on hand import finished"
    );
    Ok(report)
}

fn text(v: &Value) -> Option<String> {
    if v.is_blank() { None } else { Some(v.to_string()) }
}

fn float_field(v: &Value, field: &str, errs: &mut Vec<String>) -> Option<f64> {
    match v.coerce(DataType::Float64) {
        Ok(Value::Float64(f)) => Some(f),
        Ok(_) => None,
        Err(_) => {
            errs.push(format!("{v} is invalid for {field}"));
            None
        }
    }
}

/// The SOH line for one sheet row, or the messages to log for it.
fn build_record(
    conn: &Connection,
    ds: &DataSet,
    rec: &Record,
    material: &str,
    uploaded_at: NaiveDate,
    plants: &HashMap<String, i64>,
) -> WicsResult<Result<SohRecord, Vec<String>>> {
    let mut errs = Vec::new();
    let plant = text(ds.get(rec, soh::PLANT));
    let org_id = plant.as_deref().and_then(|p| plants.get(p)).copied();
    if org_id.is_none() {
        errs.push(format!(
            "plant {} of {material} is not assigned to an org",
            plant.as_deref().unwrap_or("(blank)")
        ));
    }

    let line = SohRecord {
        id: 0,
        uploaded_at: Some(uploaded_at),
        org_id,
        material_part_num: material.to_string(),
        material_id: None,
        description: text(ds.get(rec, soh::DESCRIPTION)),
        plant,
        material_type: text(ds.get(rec, soh::MATERIAL_TYPE)),
        storage_location: text(ds.get(rec, soh::STORAGE_LOCATION)),
        base_unit_of_measure: text(ds.get(rec, soh::BASE_UOM)),
        amount: float_field(ds.get(rec, soh::AMOUNT), soh::AMOUNT, &mut errs).unwrap_or(0.0),
        currency: text(ds.get(rec, soh::CURRENCY)),
        value_unrestricted: float_field(
            ds.get(rec, soh::VALUE_UNRESTRICTED),
            soh::VALUE_UNRESTRICTED,
            &mut errs,
        ),
        special_stock: text(ds.get(rec, soh::SPECIAL_STOCK)),
        blocked: float_field(ds.get(rec, soh::BLOCKED), soh::BLOCKED, &mut errs),
        value_blocked: float_field(ds.get(rec, soh::VALUE_BLOCKED), soh::VALUE_BLOCKED, &mut errs),
        batch: text(ds.get(rec, soh::BATCH)),
        vendor: text(ds.get(rec, soh::VENDOR)),
    };

    if !errs.is_empty() {
        return Ok(Err(errs));
    }
    let Some(org_id) = org_id else {
        return Ok(Err(errs));
    };
    let material_id = materials::material_by_org_and_number(conn, org_id, material)?.map(|m| m.id);
    Ok(Ok(SohRecord { material_id, ..line }))
}
