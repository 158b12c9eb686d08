#![cfg(all(feature = "excel", feature = "xlsx_export"))]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use wics::count_import::{import_count_sheet, CountImportOptions};
use wics::ingestion::{IngestionObserver, IngestionOptions};
use wics::models::NewMaterial;
use wics::store::counts::counts_for_date;
use wics::store::materials::{insert_material, insert_organization, material_by_org_and_number};
use wics::store::Store;

fn tmp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("wics-{name}-{nanos}.xlsx"))
}

const HEADERS: [&str; 10] = [
    "CountDate",
    "Counter",
    "LOCATION",
    "org_id",
    "Material",
    "LocationOnly",
    "CTD_QTY_Expr",
    "Typ Cntner Qty",
    "Notes",
    "WICSignore",
];

enum Cell {
    Blank,
    Text(&'static str),
    Number(f64),
}

use Cell::{Blank, Number, Text};

fn write_count_sheet(path: &PathBuf, sheet: &str, rows: &[[Cell; 10]]) {
    use rust_xlsxwriter::Workbook;

    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name(sheet).unwrap();
    for (col, h) in HEADERS.iter().enumerate() {
        ws.write_string(0, col as u16, *h).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let (r, c) = (r as u32 + 1, c as u16);
            match cell {
                Blank => {}
                Text(s) => {
                    ws.write_string(r, c, *s).unwrap();
                }
                Number(n) => {
                    ws.write_number(r, c, *n).unwrap();
                }
            }
        }
    }
    wb.save(path).unwrap();
}

/// Org 1 (MAIN) has materials 100 and 200; org 2 (EAST) also has a 200.
fn seeded_store() -> Store {
    let store = Store::open_in_memory().unwrap();
    let conn = store.connection();
    let main = insert_organization(conn, "MAIN").unwrap();
    let east = insert_organization(conn, "EAST").unwrap();
    for (org, number) in [(main, "100"), (main, "200"), (east, "200")] {
        insert_material(
            conn,
            &NewMaterial {
                org_id: org,
                material: number.to_string(),
                ..Default::default()
            },
        )
        .unwrap();
    }
    store
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

#[test]
fn imports_good_rows_and_logs_the_rest() {
    let path = tmp_file("counts");
    write_count_sheet(
        &path,
        "Counts",
        &[
            // row 2: counted, and sets the typical container quantity
            [Text("2024-03-04"), Text("Al"), Text("A-01"), Blank, Text("100"), Blank, Text("3*24+5"), Number(24.0), Blank, Blank],
            // row 3: ignored
            [Text("2024-03-04"), Text("Al"), Text("A-02"), Blank, Text("100"), Blank, Text("1"), Blank, Blank, Number(1.0)],
            // row 4: unknown material
            [Text("2024-03-04"), Text("Al"), Text("A-03"), Blank, Text("999"), Blank, Text("1"), Blank, Blank, Blank],
            // row 5: location only, date as a serial
            [Number(45355.0), Text("Bo"), Text("B-01"), Blank, Text("100"), Number(1.0), Blank, Blank, Text("top shelf"), Blank],
            // row 6: neither a quantity nor location-only
            [Text("2024-03-04"), Text("Bo"), Text("B-02"), Blank, Text("100"), Blank, Blank, Blank, Blank, Blank],
            // row 7: ambiguous material without org
            [Text("2024-03-04"), Text("Cy"), Text("C-01"), Blank, Text("200"), Blank, Text("5"), Blank, Blank, Blank],
            // row 8: same material with org
            [Text("2024-03-04"), Text("Cy"), Text("C-01"), Number(2.0), Text("200"), Blank, Text("=2*3"), Blank, Blank, Blank],
        ],
    );
    let mut store = seeded_store();

    let report = import_count_sheet(&mut store, &path, &CountImportOptions::default()).unwrap();
    assert_eq!(report.rows_total, 7);
    assert_eq!(report.rows_added, 3);
    assert_eq!(report.rows_errors, 3);
    assert_eq!(report.rows_ignored, 1);

    let log: Vec<(&str, Option<i64>, &str)> = report
        .results
        .iter()
        .map(|r| (r.err_state.as_str(), r.row_num, r.errmsg.as_str()))
        .collect();
    assert_eq!(
        log[0],
        (
            "success",
            Some(2),
            "1: 2024-03-04 / 100 / Al / A-01 / Qty= 3*24+5 (Typ Cont Qty/Typ Plt Qty also changed)"
        )
    );
    assert_eq!(
        log[1],
        (
            "error",
            Some(4),
            "either 999 does not exist in MaterialList or incorrect org_id (none) given"
        )
    );
    assert_eq!(log[2], ("success", Some(5), "2: 2024-03-04 / 100 / Bo / B-01 / LOCATION ONLY"));
    assert_eq!(
        log[3],
        (
            "error",
            Some(6),
            "record is not marked LocationOnly and (blank) is invalid for CTD_QTY_Expr"
        )
    );
    assert_eq!(log[4], ("error", Some(6), "Both LocationOnly and CTD_QTY missing"));
    assert_eq!(
        log[5],
        ("error", Some(7), "200 in multiple org_id's (1, 2), but no org_id given")
    );
    assert_eq!(log[6], ("success", Some(8), "3: 2024-03-04 / 200 / Cy / C-01 / Qty= 2*3"));

    let totals: Vec<(&str, Option<i64>)> = log[7..].iter().map(|(s, n, _)| (*s, *n)).collect();
    assert_eq!(
        totals,
        vec![
            ("nRowsTotal", Some(7)),
            ("nRowsAdded", Some(3)),
            ("nRowsErrors", Some(3)),
            ("nRowsIgnored", Some(1)),
        ]
    );

    let conn = store.connection();
    let counts = counts_for_date(conn, day()).unwrap();
    assert_eq!(counts.len(), 3);
    assert!(counts[1].location_only);
    assert_eq!(counts[1].notes.as_deref(), Some("top shelf"));
    assert_eq!(counts[2].ctd_qty_expr.as_deref(), Some("2*3"));

    let m100 = material_by_org_and_number(conn, 1, "100").unwrap().unwrap();
    assert_eq!(m100.typical_container_qty.as_deref(), Some("24"));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn missing_counts_sheet_is_fatal() {
    let path = tmp_file("counts-wrong-sheet");
    write_count_sheet(&path, "Sheet1", &[]);
    let mut store = seeded_store();

    let err = import_count_sheet(&mut store, &path, &CountImportOptions::default()).unwrap_err();
    assert!(err.is_bad_header());
    assert!(counts_for_date(store.connection(), day()).unwrap().is_empty());
    let _ = std::fs::remove_file(&path);
}

#[derive(Default)]
struct StatusRecorder {
    status: Mutex<Vec<String>>,
    progress: Mutex<Vec<(usize, usize)>>,
}

impl IngestionObserver for StatusRecorder {
    fn on_status(&self, message: &str) {
        self.status.lock().unwrap().push(message.to_string());
    }

    fn on_progress(&self, done: usize, total: usize) {
        self.progress.lock().unwrap().push((done, total));
    }
}

#[test]
fn observer_sees_status_and_progress() {
    let path = tmp_file("counts-observer");
    write_count_sheet(
        &path,
        "Counts",
        &[[Text("2024-03-04"), Text("Al"), Text("A-01"), Blank, Text("100"), Blank, Text("4"), Blank, Blank, Blank]],
    );
    let mut store = seeded_store();
    let recorder = Arc::new(StatusRecorder::default());
    let options = CountImportOptions {
        ingestion: IngestionOptions {
            observer: Some(recorder.clone()),
            ..Default::default()
        },
        ..Default::default()
    };

    import_count_sheet(&mut store, &path, &options).unwrap();

    let status = recorder.status.lock().unwrap().clone();
    assert_eq!(status.first().map(String::as_str), Some("Initializing Upload of Count Entry Spreadsheet..."));
    assert_eq!(status.last().map(String::as_str), Some("Finished Processing Count Entry Spreadsheet..."));
    assert!(!recorder.progress.lock().unwrap().is_empty());
    let _ = std::fs::remove_file(&path);
}

#[test]
fn zero_location_only_counts_as_given_and_blank_text_as_missing() {
    let path = tmp_file("counts-blank-cells");
    write_count_sheet(
        &path,
        "Counts",
        &[
            // row 2: LocationOnly given as 0, no quantity
            [Text("2024-03-04"), Text("Al"), Text("A-01"), Blank, Text("100"), Number(0.0), Blank, Blank, Blank, Blank],
            // row 3: whitespace-only counter
            [Text("2024-03-04"), Text("   "), Text("A-02"), Blank, Text("100"), Blank, Text("4"), Blank, Blank, Blank],
            // row 4: whitespace-only location, padded counter
            [Text("2024-03-04"), Text(" Bo "), Text(" "), Blank, Text("100"), Blank, Text("4"), Blank, Blank, Blank],
        ],
    );
    let mut store = seeded_store();

    let report = import_count_sheet(&mut store, &path, &CountImportOptions::default()).unwrap();
    assert_eq!(report.rows_added, 1);
    assert_eq!(report.rows_errors, 2);

    let log: Vec<(&str, Option<i64>, &str)> = report
        .results
        .iter()
        .map(|r| (r.err_state.as_str(), r.row_num, r.errmsg.as_str()))
        .collect();
    assert_eq!(log[0], ("success", Some(2), "1: 2024-03-04 / 100 / Al / A-01 / Qty= "));
    assert_eq!(log[1], ("error", Some(3), "Counter missing"));
    assert_eq!(log[2], ("error", Some(4), "LOCATION missing"));

    let counts = counts_for_date(store.connection(), day()).unwrap();
    assert_eq!(counts.len(), 1);
    assert!(!counts[0].location_only);
    assert_eq!(counts[0].ctd_qty_expr, None);
    let _ = std::fs::remove_file(&path);
}
