#![cfg(all(feature = "excel", feature = "xlsx_export"))]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use wics::ingestion::excel::ingest_excel_from_path;
use wics::ingestion::{ingest_from_path, IngestionOptions};
use wics::sheets::{self, count, soh};
use wics::types::{DataType, Value};

fn tmp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("wics-{name}-{nanos}.xlsx"))
}

/// An MB52-style export with two blank rows above the header.
fn write_mb52_xlsx(path: &PathBuf) {
    use rust_xlsxwriter::Workbook;

    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name("Sheet1").unwrap();

    for (col, h) in ["Material", "Plnt", "SLoc", "BUn", "Unrestricted"].iter().enumerate() {
        ws.write_string(2, col as u16, *h).unwrap();
    }
    ws.write_number(3, 0, 100234).unwrap();
    ws.write_string(3, 1, "P100").unwrap();
    ws.write_string(3, 2, "0001").unwrap();
    ws.write_string(3, 3, "EA").unwrap();
    ws.write_number(3, 4, 12.5).unwrap();

    wb.save(path).unwrap();
}

/// A workbook whose counts are on a second sheet, with a formatted date cell.
fn write_count_workbook(path: &PathBuf) {
    use rust_xlsxwriter::{Format, Workbook};

    let mut wb = Workbook::new();
    let notes = wb.add_worksheet();
    notes.set_name("Instructions").unwrap();
    notes.write_string(0, 0, "Fill in the Counts sheet").unwrap();

    let ws = wb.add_worksheet();
    ws.set_name("Counts").unwrap();
    for (col, h) in ["CountDate", "Counter", "LOCATION", "Material", "CTD_QTY_Expr"].iter().enumerate() {
        ws.write_string(0, col as u16, *h).unwrap();
    }
    let date = Format::new().set_num_format("yyyy-mm-dd");
    ws.write_number_with_format(1, 0, 45355, &date).unwrap();
    ws.write_string(1, 1, "Al").unwrap();
    ws.write_string(1, 2, "A-01").unwrap();
    ws.write_string(1, 3, "100").unwrap();
    ws.write_string(1, 4, "2*12").unwrap();

    wb.save(path).unwrap();
}

#[test]
fn header_row_is_the_first_non_empty_row() {
    let path = tmp_file("mb52");
    write_mb52_xlsx(&path);

    let ds = ingest_excel_from_path(&path, None, &sheets::stock_on_hand_schema()).unwrap();
    assert_eq!(ds.row_count(), 1);
    let rec = &ds.rows[0];
    // Sheet row numbers stay Excel-like.
    assert_eq!(rec.row, 4);
    assert_eq!(ds.get(rec, soh::MATERIAL).to_string(), "100234");
    assert_eq!(ds.get(rec, soh::STORAGE_LOCATION), &Value::Utf8("0001".to_string()));
    assert_eq!(ds.get(rec, soh::AMOUNT), &Value::Float64(12.5));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn named_sheet_is_read_and_dates_come_through() {
    let path = tmp_file("counts-workbook");
    write_count_workbook(&path);

    let options = IngestionOptions::default().with_sheet(count::SHEET_NAME);
    let ds = ingest_from_path(&path, &sheets::count_entry_schema(), &options).unwrap();
    assert_eq!(ds.row_count(), 1);
    let rec = &ds.rows[0];
    let expected = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    assert_eq!(
        ds.get(rec, count::COUNT_DATE).coerce(DataType::Date),
        Ok(Value::Date(expected))
    );
    assert_eq!(ds.get(rec, count::CTD_QTY_EXPR), &Value::Utf8("2*12".to_string()));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn first_sheet_is_used_by_default() {
    let path = tmp_file("counts-first-sheet");
    write_count_workbook(&path);

    // The instructions sheet has none of the count headers.
    let err = ingest_from_path(&path, &sheets::count_entry_schema(), &IngestionOptions::default()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("sheet 'Instructions'"));
    assert!(msg.contains("missing columns"));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn missing_named_sheet_is_a_schema_mismatch() {
    let path = tmp_file("mb52-no-counts");
    write_mb52_xlsx(&path);

    let err = ingest_excel_from_path(&path, Some("Counts"), &sheets::count_entry_schema()).unwrap_err();
    assert!(err.to_string().contains("does not contain a sheet named Counts"));
    let _ = std::fs::remove_file(&path);
}
