//! CSV ingestion implementation.

use std::path::Path;

use crate::error::IngestionResult;
use crate::types::{DataSet, Record, Schema, Value};

use super::header::project_headers;

/// Read a CSV file into an in-memory [`DataSet`].
///
/// Rules:
///
/// - CSV must have headers; they are projected onto the schema like a sheet header row.
/// - Short rows are allowed; missing trailing cells read as null.
/// - Values are kept as raw text (blank cells become [`Value::Null`]).
pub fn ingest_csv_from_path(path: impl AsRef<Path>, schema: &Schema) -> IngestionResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    ingest_csv_from_reader(&mut rdr, schema)
}

/// Read CSV data from an existing CSV reader.
pub fn ingest_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    schema: &Schema,
) -> IngestionResult<DataSet> {
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let col_idxs = project_headers(schema, &headers)?;

    let mut rows: Vec<Record> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        let record = result?;

        let values = col_idxs
            .iter()
            .map(|col| match col.and_then(|c| record.get(c)) {
                Some(raw) if !raw.trim().is_empty() => Value::Utf8(raw.to_owned()),
                _ => Value::Null,
            })
            .collect();
        rows.push(Record {
            // 1-based, and the header is row 1.
            row: row_idx0 + 2,
            values,
        });
    }

    let present = col_idxs.iter().map(Option::is_some).collect();
    Ok(DataSet::new(schema.clone(), present, rows))
}

#[cfg(test)]
mod tests {
    use super::ingest_csv_from_reader;
    use crate::types::{DataType, Field, Schema, Value};

    #[test]
    fn reads_raw_text_and_row_numbers() {
        let data = "Material,Plnt,Extra\nM-1,P100,x\n,P200\n";
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data.as_bytes());
        let schema = Schema::new(vec![
            Field::new("Material", DataType::Utf8).required(),
            Field::new("Plant", DataType::Utf8).with_headers(&["Plant", "Plnt"]),
            Field::new("Price", DataType::Float64),
        ]);

        let ds = ingest_csv_from_reader(&mut rdr, &schema).unwrap();
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.present, vec![true, true, false]);
        assert_eq!(ds.rows[0].row, 2);
        assert_eq!(ds.rows[0].values[0], Value::Utf8("M-1".to_string()));
        assert_eq!(ds.rows[1].values[0], Value::Null);
        assert_eq!(ds.rows[1].values[1], Value::Utf8("P200".to_string()));
        assert_eq!(ds.rows[1].values[2], Value::Null);
    }
}
