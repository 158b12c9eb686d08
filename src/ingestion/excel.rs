#![cfg(feature = "excel")]

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Record, Schema, Value};

use super::header::project_headers;

/// Read one sheet of a workbook (`.xlsx`, `.xls`, `.ods`, etc.) into an in-memory `DataSet`.
///
/// Behavior:
/// - Picks `sheet_name` if provided (its absence is a schema mismatch); otherwise uses the
///   first sheet in the workbook
/// - Detects the first non-empty row as the header row
/// - Projects header cells onto the schema fields (aliases, duplicates, required fields)
/// - Reads remaining rows as raw [`Value`]s; coercion is left to the caller
pub fn ingest_excel_from_path(
    path: impl AsRef<Path>,
    sheet_name: Option<&str>,
    schema: &Schema,
) -> IngestionResult<DataSet> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_names = workbook.sheet_names();

    let sheet = match sheet_name {
        Some(name) => {
            if !sheet_names.iter().any(|s| s == name) {
                return Err(IngestionError::SchemaMismatch {
                    message: format!("workbook does not contain a sheet named {name}"),
                });
            }
            name.to_string()
        }
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| IngestionError::SchemaMismatch {
                message: "workbook has no sheets".to_string(),
            })?,
    };

    let range = workbook.worksheet_range(&sheet)?;
    ingest_sheet_range(&range, schema).map_err(|e| wrap_schema_err_with_sheet(&sheet, e))
}

fn ingest_sheet_range(range: &calamine::Range<Data>, schema: &Schema) -> IngestionResult<DataSet> {
    // Range rows are relative to the first used cell.
    let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);

    let (header_row_idx, header_cells) = find_header_row(range)?;
    let col_idxs = project_headers(schema, &header_cells)?;

    let mut rows: Vec<Record> = Vec::new();
    for (idx0, row) in range.rows().enumerate() {
        if idx0 <= header_row_idx {
            continue;
        }

        let values = col_idxs
            .iter()
            .map(|col| match col {
                Some(c) => row.get(*c).map(cell_to_value).unwrap_or(Value::Null),
                None => Value::Null,
            })
            .collect();
        rows.push(Record {
            // Report 1-based row number (Excel-like).
            row: first_row + idx0 + 1,
            values,
        });
    }

    let present = col_idxs.iter().map(Option::is_some).collect();
    Ok(DataSet::new(schema.clone(), present, rows))
}

fn wrap_schema_err_with_sheet(sheet: &str, err: IngestionError) -> IngestionError {
    match err {
        IngestionError::SchemaMismatch { message } => IngestionError::SchemaMismatch {
            message: format!("sheet '{sheet}': {message}"),
        },
        other => other,
    }
}

fn find_header_row(range: &calamine::Range<Data>) -> IngestionResult<(usize, Vec<String>)> {
    range
        .rows()
        .enumerate()
        .find(|(_, row)| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|(idx0, row)| (idx0, row.iter().map(cell_to_header_string).collect()))
        .ok_or_else(|| IngestionError::SchemaMismatch {
            message: "sheet has no non-empty rows (no header row found)".to_string(),
        })
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => cell_to_value(other).to_string(),
    }
}

fn cell_to_value(c: &Data) -> Value {
    match c {
        Data::Empty => Value::Null,
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::Utf8(s.clone()),
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => Value::Float64(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| Value::Date(d.date()))
            .unwrap_or_else(|| Value::Float64(dt.as_f64())),
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(Value::Date)
            .unwrap_or_else(|| Value::Utf8(s.clone())),
        Data::DurationIso(s) => Value::Utf8(s.clone()),
        Data::Error(e) => Value::Utf8(format!("{e:?}")),
    }
}
