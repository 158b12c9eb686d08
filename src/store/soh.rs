//! SAP stock-on-hand snapshots (`sap_sohrecs`).

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::WicsResult;
use crate::models::SohRecord;

/// Insert one SOH line. `rec.id` is ignored.
pub fn insert_soh(conn: &Connection, rec: &SohRecord) -> WicsResult<i64> {
    conn.execute(
        "INSERT INTO sap_sohrecs (uploaded_at, org_id, material_part_num, material_id, description,
             plant, material_type, storage_location, base_unit_of_measure, amount, currency,
             value_unrestricted, special_stock, blocked, value_blocked, batch, vendor)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            rec.uploaded_at,
            rec.org_id,
            rec.material_part_num,
            rec.material_id,
            rec.description,
            rec.plant,
            rec.material_type,
            rec.storage_location,
            rec.base_unit_of_measure,
            rec.amount,
            rec.currency,
            rec.value_unrestricted,
            rec.special_stock,
            rec.blocked,
            rec.value_blocked,
            rec.batch,
            rec.vendor,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Remove every line of the snapshot taken on `uploaded_at`.
pub fn delete_snapshot(conn: &Connection, uploaded_at: NaiveDate) -> WicsResult<usize> {
    Ok(conn.execute(
        "DELETE FROM sap_sohrecs WHERE uploaded_at = ?1",
        params![uploaded_at],
    )?)
}

/// Distinct snapshot dates, oldest first.
pub fn snapshot_dates(conn: &Connection) -> WicsResult<Vec<NaiveDate>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT uploaded_at FROM sap_sohrecs WHERE uploaded_at IS NOT NULL ORDER BY uploaded_at",
    )?;
    let rows = stmt
        .query_map([], |r| r.get(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Latest snapshot date on or before `date`.
pub fn latest_snapshot_on_or_before(conn: &Connection, date: NaiveDate) -> WicsResult<Option<NaiveDate>> {
    Ok(conn
        .query_row(
            "SELECT MAX(uploaded_at) FROM sap_sohrecs WHERE uploaded_at <= ?1",
            params![date],
            |r| r.get::<_, Option<NaiveDate>>(0),
        )
        .optional()?
        .flatten())
}

pub fn earliest_snapshot(conn: &Connection) -> WicsResult<Option<NaiveDate>> {
    Ok(conn
        .query_row("SELECT MIN(uploaded_at) FROM sap_sohrecs", [], |r| {
            r.get::<_, Option<NaiveDate>>(0)
        })
        .optional()?
        .flatten())
}

pub(crate) const SOH_COLUMNS: &str = "s.id, s.uploaded_at, s.org_id, s.material_part_num, \
     s.material_id, s.description, s.plant, s.material_type, s.storage_location, \
     s.base_unit_of_measure, s.amount, s.currency, s.value_unrestricted, s.special_stock, \
     s.blocked, s.value_blocked, s.batch, s.vendor";

pub(crate) fn soh_from_row(r: &Row<'_>) -> rusqlite::Result<SohRecord> {
    Ok(SohRecord {
        id: r.get(0)?,
        uploaded_at: r.get(1)?,
        org_id: r.get(2)?,
        material_part_num: r.get(3)?,
        material_id: r.get(4)?,
        description: r.get(5)?,
        plant: r.get(6)?,
        material_type: r.get(7)?,
        storage_location: r.get(8)?,
        base_unit_of_measure: r.get(9)?,
        amount: r.get(10)?,
        currency: r.get(11)?,
        value_unrestricted: r.get(12)?,
        special_stock: r.get(13)?,
        blocked: r.get(14)?,
        value_blocked: r.get(15)?,
        batch: r.get(16)?,
        vendor: r.get(17)?,
    })
}

/// Every line of one snapshot, by org, part number and storage location.
pub fn snapshot(conn: &Connection, uploaded_at: NaiveDate) -> WicsResult<Vec<SohRecord>> {
    let sql = format!(
        "SELECT {SOH_COLUMNS} FROM sap_sohrecs s WHERE s.uploaded_at = ?1
         ORDER BY s.org_id, s.material_part_num, s.storage_location"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![uploaded_at], soh_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}
