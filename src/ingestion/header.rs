//! Header row -> schema field projection shared by the CSV and Excel readers.

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DuplicateHeaders, Schema};

/// Map each schema field to the column index of its header, if present.
///
/// - Header cells are matched against each field's accepted names after trimming.
/// - A field matched by two columns is an error under [`DuplicateHeaders::Reject`];
///   otherwise the right-most column wins.
/// - Every missing required field is reported in a single error.
pub fn project_headers(schema: &Schema, headers: &[String]) -> IngestionResult<Vec<Option<usize>>> {
    let mut col_idxs: Vec<Option<usize>> = vec![None; schema.fields.len()];

    for (col, header) in headers.iter().enumerate() {
        let Some(field_idx) = schema.field_for_header(header) else {
            continue;
        };
        if col_idxs[field_idx].is_some() && schema.duplicates == DuplicateHeaders::Reject {
            return Err(IngestionError::SchemaMismatch {
                message: format!("bad header row - more than one column named {}", header.trim()),
            });
        }
        col_idxs[field_idx] = Some(col);
    }

    let missing: Vec<&str> = schema
        .fields
        .iter()
        .zip(col_idxs.iter())
        .filter(|(f, c)| f.required && c.is_none())
        .map(|(f, _)| f.name.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(IngestionError::SchemaMismatch {
            message: format!("bad header row - missing columns {missing:?}. headers={headers:?}"),
        });
    }

    Ok(col_idxs)
}

#[cfg(test)]
mod tests {
    use super::project_headers;
    use crate::types::{DataType, DuplicateHeaders, Field, Schema};

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn schema(dups: DuplicateHeaders) -> Schema {
        Schema::new(vec![
            Field::new("Material", DataType::Utf8).required(),
            Field::new("Plant", DataType::Utf8).with_headers(&["Plant", "Plnt"]).required(),
            Field::new("Price", DataType::Float64).with_headers(&["Price", "Standard price"]),
        ])
        .with_duplicates(dups)
    }

    #[test]
    fn projects_aliases_in_any_order() {
        let idx = project_headers(
            &schema(DuplicateHeaders::LastWins),
            &headers(&["Standard price", "junk", "Material", "Plnt"]),
        )
        .unwrap();
        assert_eq!(idx, vec![Some(2), Some(3), Some(0)]);
    }

    #[test]
    fn last_alias_wins_when_allowed() {
        let idx = project_headers(
            &schema(DuplicateHeaders::LastWins),
            &headers(&["Plant", "Material", "Plnt"]),
        )
        .unwrap();
        assert_eq!(idx[1], Some(2));
        assert_eq!(idx[2], None);
    }

    #[test]
    fn duplicate_rejected_when_strict() {
        let err = project_headers(
            &schema(DuplicateHeaders::Reject),
            &headers(&["Material", "Plant", "Material"]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than one column named Material"));
    }

    #[test]
    fn reports_all_missing_required_fields() {
        let err = project_headers(&schema(DuplicateHeaders::LastWins), &headers(&["Price"])).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("\"Material\""));
        assert!(msg.contains("\"Plant\""));
    }
}
