//! Material master reconciliation against an SAP MM60 / ZMSQV001 export.
//!
//! The sheet is copied into the staging table, then a sequence of set-based passes
//! classifies every staged row and every existing material:
//!
//! - `FOUND`: the (org, material) pair already exists; `material_link` points at it
//! - `ADD`: new to the material master
//! - `DEL <id>`: a material not in the sheet and not referenced by counts, schedules or
//!   SAP stock records
//! - `err-*`: unusable sheet rows
//!
//! Selected fields of `FOUND` materials are then refreshed, `DEL` materials optionally
//! removed and `ADD` rows inserted. Each pass commits on its own.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::error::WicsResult;
use crate::ingestion::observability::{report_progress, report_status};
use crate::ingestion::{ingest_from_path, IngestionOptions};
use crate::models::StagedMaterial;
use crate::sheets::{self, material};
use crate::store::{materials, staging, Store};
use crate::types::{DataSet, DataType, Record, Value};

/// Field groups of an existing material that a sync may overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UpdateField {
    Description,
    SapMatlType,
    SapMatlGroup,
    SapManuf,
    SapMpn,
    SapAbc,
    /// Price, price unit and currency together.
    SapPrice,
}

impl UpdateField {
    pub const ALL: [UpdateField; 7] = [
        UpdateField::Description,
        UpdateField::SapMatlType,
        UpdateField::SapMatlGroup,
        UpdateField::SapManuf,
        UpdateField::SapMpn,
        UpdateField::SapAbc,
        UpdateField::SapPrice,
    ];

    /// Columns written by this group, each with its "zero" SQL literal.
    fn columns(self) -> &'static [(&'static str, &'static str)] {
        match self {
            UpdateField::Description => &[("description", "''")],
            UpdateField::SapMatlType => &[("sap_material_type", "''")],
            UpdateField::SapMatlGroup => &[("sap_material_group", "''")],
            UpdateField::SapManuf => &[("sap_manuf", "''")],
            UpdateField::SapMpn => &[("sap_mpn", "''")],
            UpdateField::SapAbc => &[("sap_abc", "''")],
            UpdateField::SapPrice => &[("price", "0"), ("price_unit", "0"), ("currency", "''")],
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            UpdateField::Description => "description",
            UpdateField::SapMatlType => "matl-type",
            UpdateField::SapMatlGroup => "matl-group",
            UpdateField::SapManuf => "manuf",
            UpdateField::SapMpn => "mpn",
            UpdateField::SapAbc => "abc",
            UpdateField::SapPrice => "price",
        }
    }
}

impl fmt::Display for UpdateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdateField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        UpdateField::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = UpdateField::ALL.iter().map(|f| f.as_str()).collect();
                format!("unknown update field '{s}' (expected one of {})", names.join(", "))
            })
    }
}

/// Options for [`sync_material_list`].
#[derive(Debug, Clone, Default)]
pub struct MaterialSyncOptions {
    /// Field groups to refresh on materials already in the master. Empty: none.
    pub update_fields: BTreeSet<UpdateField>,
    /// Remove materials that are missing from the sheet and unreferenced.
    pub delete_missing: bool,
    /// Sheet reading and observer options.
    pub ingestion: IngestionOptions,
}

/// Rows changed by one update column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldUpdate {
    pub column: &'static str,
    pub rows: usize,
}

/// Outcome of a material-list sync.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MaterialSyncReport {
    /// Data rows in the sheet.
    pub rows_read: usize,
    /// Sheet rows written to staging (blank material numbers are skipped).
    pub staged: usize,
    /// Staged rows matching an existing material.
    pub found: usize,
    /// Unusable sheet rows (`err-*`).
    pub errors: Vec<StagedMaterial>,
    /// New materials (`ADD`).
    pub additions: Vec<StagedMaterial>,
    /// Materials no longer in SAP (`DEL <id>`), whether or not they were removed.
    pub removals: Vec<StagedMaterial>,
    pub field_updates: Vec<FieldUpdate>,
    /// Materials inserted.
    pub added: usize,
    /// Materials deleted.
    pub removed: usize,
}

// Rows with an err-* status are linked too, so their material is not proposed for deletion.
const LINK_EXISTING_SQL: &str = "
    UPDATE tmpmateriallistupdate
    SET material_link = (
            SELECT m.id FROM materiallist m
            WHERE m.org_id = tmpmateriallistupdate.org_id
              AND m.material = tmpmateriallistupdate.material)
    WHERE EXISTS (
            SELECT 1 FROM materiallist m
            WHERE m.org_id = tmpmateriallistupdate.org_id
              AND m.material = tmpmateriallistupdate.material)";

const MARK_FOUND_SQL: &str = "
    UPDATE tmpmateriallistupdate SET rec_status = 'FOUND'
    WHERE rec_status IS NULL AND material_link IS NOT NULL";

// NOT IN over a nullable column needs the IS NOT NULL filter or it never matches.
const STAGE_DELETIONS_SQL: &str = "
    INSERT INTO tmpmateriallistupdate (rec_status, del_material_link, material_link, org_id,
        material, description, plant, sap_material_type, sap_material_group, currency)
    SELECT 'DEL ' || m.id, m.id, NULL, m.org_id, m.material, m.description, m.plant,
        m.sap_material_type, m.sap_material_group, m.currency
    FROM materiallist m
    WHERE m.id NOT IN (SELECT material_link FROM tmpmateriallistupdate WHERE material_link IS NOT NULL)
      AND m.id NOT IN (SELECT material_id FROM actualcounts)
      AND m.id NOT IN (SELECT material_id FROM countschedule)
      AND m.id NOT IN (SELECT material_id FROM sap_sohrecs WHERE material_id IS NOT NULL)
    ORDER BY m.id";

const MARK_ADDITIONS_SQL: &str = "
    UPDATE tmpmateriallistupdate SET rec_status = 'ADD'
    WHERE material_link IS NULL AND rec_status IS NULL";

const REMOVE_SQL: &str = "
    DELETE FROM materiallist
    WHERE id IN (SELECT del_material_link FROM tmpmateriallistupdate WHERE rec_status LIKE 'DEL%')";

// A repeated (org, material) in the sheet stages two ADD rows; the second is skipped.
const ADD_SQL: &str = "
    INSERT OR IGNORE INTO materiallist (org_id, material, description, plant,
        sap_material_type, sap_material_group, sap_manuf, sap_mpn, sap_abc, price,
        price_unit, currency)
    SELECT org_id, material, description, plant, sap_material_type, sap_material_group,
        sap_manuf, sap_mpn, sap_abc, price, price_unit, currency
    FROM tmpmateriallistupdate
    WHERE rec_status = 'ADD'
    ORDER BY id";

/// Bring the material master in line with an SAP material list export.
///
/// A sheet without `Material` or `Plant` headers aborts before the master is touched.
/// Everything else is reported in the returned [`MaterialSyncReport`].
pub fn sync_material_list(
    store: &mut Store,
    path: impl AsRef<Path>,
    options: &MaterialSyncOptions,
) -> WicsResult<MaterialSyncReport> {
    let observer = options.ingestion.observer.as_ref();
    let mut report = MaterialSyncReport::default();

    staging::truncate_staging(store.connection())?;

    report_status(observer, "Reading Spreadsheet");
    let ds = ingest_from_path(path, &sheets::material_list_schema(), &options.ingestion)?;
    report.rows_read = ds.row_count();

    let plants: HashMap<String, i64> = materials::plants(store.connection())?
        .into_iter()
        .map(|p| (p.sap_plant, p.org_id))
        .collect();

    let tx = store.transaction()?;
    for (n, rec) in ds.rows.iter().enumerate() {
        report_progress(observer, n + 1, report.rows_read);
        if let Some(staged) = stage_row(&ds, rec, &plants) {
            staging::insert_staged(&tx, &staged)?;
            report.staged += 1;
        }
    }
    tx.commit()?;

    report_status(observer, "Identifying Existing Materials ...");
    let tx = store.transaction()?;
    tx.execute(LINK_EXISTING_SQL, [])?;
    report.found = tx.execute(MARK_FOUND_SQL, [])?;
    tx.commit()?;

    report_status(observer, "Identifying WICS Materials no longer in SAP MM60 Materials");
    let tx = store.transaction()?;
    tx.execute(STAGE_DELETIONS_SQL, [])?;
    tx.commit()?;

    report_status(observer, "Identifying SAP MM60 Materials new to WICS");
    let tx = store.transaction()?;
    tx.execute(MARK_ADDITIONS_SQL, [])?;
    tx.commit()?;

    for field in &options.update_fields {
        for &(column, zero) in field.columns() {
            report_status(observer, &format!("Updating _{column}_ Field in Existing Records"));
            let tx = store.transaction()?;
            let rows = update_existing(&tx, column, zero)?;
            tx.commit()?;
            report.field_updates.push(FieldUpdate { column, rows });
        }
    }

    if options.delete_missing {
        report_status(observer, "Removing WICS Materials no longer in SAP MM60 Materials");
        let tx = store.transaction()?;
        report.removed = tx.execute(REMOVE_SQL, [])?;
        tx.commit()?;
    }

    report_status(observer, "Adding New WICS Materials from SAP MM60 Materials");
    let tx = store.transaction()?;
    report.added = tx.execute(ADD_SQL, [])?;
    tx.commit()?;

    let conn = store.connection();
    report.errors = staging::staged_with_status(conn, "err-%")?;
    report.additions = staging::staged_with_status(conn, "ADD")?;
    report.removals = staging::staged_with_status(conn, "DEL%")?;
    staging::truncate_staging(conn)?;

    report_status(observer, "Finished Processing Spreadsheet");
    tracing::info!(
        rows = report.rows_read,
        found = report.found,
        added = report.added,
        removed = report.removed,
        errors = report.errors.len(),
        "material list sync finished"
    );
    Ok(report)
}

fn update_existing(conn: &Connection, column: &str, zero: &str) -> WicsResult<usize> {
    let sql = format!(
        "UPDATE materiallist SET {column} = t.{column}
         FROM tmpmateriallistupdate AS t
         WHERE t.material_link = materiallist.id
           AND IFNULL(t.{column}, {zero}) != {zero}
           AND IFNULL(materiallist.{column}, {zero}) != IFNULL(t.{column}, {zero})"
    );
    Ok(conn.execute(&sql, [])?)
}

/// Build the staging row for one sheet row, or `None` when the material number is blank.
fn stage_row(ds: &DataSet, rec: &Record, plants: &HashMap<String, i64>) -> Option<StagedMaterial> {
    let material = text(ds.get(rec, material::MATERIAL))?;
    let plant = text(ds.get(rec, material::PLANT));
    let mut bad_values: Vec<String> = Vec::new();

    let mut row = StagedMaterial {
        material: Some(material.clone()),
        description: text(ds.get(rec, material::DESCRIPTION)),
        plant: plant.clone(),
        sap_material_type: text(ds.get(rec, material::MATERIAL_TYPE)),
        sap_material_group: text(ds.get(rec, material::MATERIAL_GROUP)),
        sap_manuf: text(ds.get(rec, material::MANUF)),
        sap_mpn: text(ds.get(rec, material::MPN)),
        sap_abc: text(ds.get(rec, material::ABC)),
        price: number(ds.get(rec, material::PRICE), material::PRICE, &mut bad_values),
        price_unit: integer(ds.get(rec, material::PRICE_UNIT), material::PRICE_UNIT, &mut bad_values),
        currency: text(ds.get(rec, material::CURRENCY)),
        ..Default::default()
    };

    if material.contains(['\n', '\t', '\u{a0}']) {
        row.rec_status = Some("err-MatlNum".to_string());
        row.errmsg = Some(format!(
            "error: {} is an unusable part number. It contains invalid characters and cannot be added to WICS",
            ascii_repr(&material)
        ));
        return Some(row);
    }

    match plant.as_deref().and_then(|p| plants.get(p)) {
        Some(org_id) => row.org_id = Some(*org_id),
        None => {
            row.rec_status = Some("err-Plant".to_string());
            row.errmsg = Some(format!(
                "error: plant {} of {material} is not assigned to an org",
                plant.as_deref().unwrap_or("(blank)")
            ));
            return Some(row);
        }
    }

    if !bad_values.is_empty() {
        row.rec_status = Some("err-Value".to_string());
        row.errmsg = Some(format!("error: {material} row {}: {}", rec.row, bad_values.join("; ")));
    }
    Some(row)
}

fn text(v: &Value) -> Option<String> {
    if v.is_blank() { None } else { Some(v.to_string()) }
}

fn number(v: &Value, field: &str, bad: &mut Vec<String>) -> Option<f64> {
    match v.coerce(DataType::Float64) {
        Ok(Value::Float64(f)) => Some(f),
        Ok(_) => None,
        Err(_) => {
            bad.push(format!("{v} is invalid for {field}"));
            None
        }
    }
}

fn integer(v: &Value, field: &str, bad: &mut Vec<String>) -> Option<i64> {
    match v.coerce(DataType::Int64) {
        Ok(Value::Int64(i)) => Some(i),
        Ok(_) => None,
        Err(_) => {
            bad.push(format!("{v} is invalid for {field}"));
            None
        }
    }
}

/// Quoted, ASCII-only rendering of a string with control and non-ASCII characters escaped.
fn ascii_repr(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            ' '..='~' => out.push(ch),
            c if (c as u32) < 0x100 => out.push_str(&format!("\\x{:02x}", c as u32)),
            c if (c as u32) < 0x10000 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push_str(&format!("\\U{:08x}", c as u32)),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_repr_escapes_control_and_non_ascii() {
        assert_eq!(ascii_repr("AB-1"), "'AB-1'");
        assert_eq!(ascii_repr("AB\n1"), "'AB\\n1'");
        assert_eq!(ascii_repr("A\u{a0}B"), "'A\\xa0B'");
        assert_eq!(ascii_repr("tab\there"), "'tab\\there'");
    }

    #[test]
    fn update_field_names_parse() {
        assert_eq!("price".parse::<UpdateField>(), Ok(UpdateField::SapPrice));
        assert_eq!(" Description ".parse::<UpdateField>(), Ok(UpdateField::Description));
        assert!("colour".parse::<UpdateField>().is_err());
        for f in UpdateField::ALL {
            assert_eq!(f.to_string().parse::<UpdateField>(), Ok(f));
        }
    }

    #[test]
    fn price_group_touches_three_columns() {
        let cols: Vec<&str> = UpdateField::SapPrice.columns().iter().map(|(c, _)| *c).collect();
        assert_eq!(cols, vec!["price", "price_unit", "currency"]);
    }
}
