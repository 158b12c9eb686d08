use wics::ingestion::csv::ingest_csv_from_reader;
use wics::sheets::{self, count, material};
use wics::types::Value;

fn reader(input: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input.as_bytes())
}

#[test]
fn material_list_headers_map_through_aliases() {
    let input = "Plnt,Material,Material description,MTyp,per\nP100,M-1,Bolt,ROH,10\n";
    let ds = ingest_csv_from_reader(&mut reader(input), &sheets::material_list_schema()).unwrap();

    assert_eq!(ds.row_count(), 1);
    let rec = &ds.rows[0];
    assert_eq!(ds.get(rec, material::MATERIAL), &Value::Utf8("M-1".to_string()));
    assert_eq!(ds.get(rec, material::PLANT), &Value::Utf8("P100".to_string()));
    assert_eq!(ds.get(rec, material::MATERIAL_TYPE), &Value::Utf8("ROH".to_string()));
    assert_eq!(ds.get(rec, material::PRICE_UNIT), &Value::Utf8("10".to_string()));
    assert!(!ds.has_column(material::PRICE));
    assert_eq!(ds.get(rec, material::PRICE), &Value::Null);
}

#[test]
fn count_sheet_rejects_repeated_columns() {
    let input = "CountDate,Counter,LOCATION,Material,Material\n2024-03-04,Al,A-01,100,200\n";
    let err = ingest_csv_from_reader(&mut reader(input), &sheets::count_entry_schema()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("schema mismatch"));
    assert!(msg.contains("more than one column named Material"));
}

#[test]
fn count_sheet_requires_its_key_columns() {
    let input = "CountDate,Material\n2024-03-04,100\n";
    let err = ingest_csv_from_reader(&mut reader(input), &sheets::count_entry_schema()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains(count::COUNTER));
    assert!(msg.contains(count::LOCATION));
}

#[test]
fn short_rows_and_blank_cells_read_as_null() {
    let input = "CountDate,Counter,LOCATION,Material,CTD_QTY_Expr\n2024-03-04,Al,,100\n";
    let ds = ingest_csv_from_reader(&mut reader(input), &sheets::count_entry_schema()).unwrap();
    let rec = &ds.rows[0];
    assert_eq!(rec.row, 2);
    assert_eq!(ds.get(rec, count::LOCATION), &Value::Null);
    assert_eq!(ds.get(rec, count::CTD_QTY_EXPR), &Value::Null);
}
