//! Transient tables rebuilt by every import run: the material-sync staging table and the
//! import result log.

use rusqlite::{params, Connection};

use crate::error::WicsResult;
use crate::models::{StagedMaterial, UploadResult};

pub fn truncate_staging(conn: &Connection) -> WicsResult<()> {
    conn.execute("DELETE FROM tmpmateriallistupdate", [])?;
    Ok(())
}

/// Stage one sheet row. `row.id` is ignored.
pub fn insert_staged(conn: &Connection, row: &StagedMaterial) -> WicsResult<i64> {
    conn.execute(
        "INSERT INTO tmpmateriallistupdate (rec_status, errmsg, org_id, material, material_link,
             del_material_link, description, plant, sap_material_type, sap_material_group,
             sap_manuf, sap_mpn, sap_abc, price, price_unit, currency)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            row.rec_status,
            row.errmsg,
            row.org_id,
            row.material,
            row.material_link,
            row.del_material_link,
            row.description,
            row.plant,
            row.sap_material_type,
            row.sap_material_group,
            row.sap_manuf,
            row.sap_mpn,
            row.sap_abc,
            row.price,
            row.price_unit,
            row.currency,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Staged rows whose status matches the SQL `LIKE` pattern, in staging order.
pub fn staged_with_status(conn: &Connection, like: &str) -> WicsResult<Vec<StagedMaterial>> {
    let mut stmt = conn.prepare(
        "SELECT id, rec_status, errmsg, org_id, material, material_link, del_material_link,
                description, plant, sap_material_type, sap_material_group, sap_manuf, sap_mpn,
                sap_abc, price, price_unit, currency
         FROM tmpmateriallistupdate WHERE rec_status LIKE ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![like], |r| {
            Ok(StagedMaterial {
                id: r.get(0)?,
                rec_status: r.get(1)?,
                errmsg: r.get(2)?,
                org_id: r.get(3)?,
                material: r.get(4)?,
                material_link: r.get(5)?,
                del_material_link: r.get(6)?,
                description: r.get(7)?,
                plant: r.get(8)?,
                sap_material_type: r.get(9)?,
                sap_material_group: r.get(10)?,
                sap_manuf: r.get(11)?,
                sap_mpn: r.get(12)?,
                sap_abc: r.get(13)?,
                price: r.get(14)?,
                price_unit: r.get(15)?,
                currency: r.get(16)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn staged_count(conn: &Connection) -> WicsResult<usize> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM tmpmateriallistupdate", [], |r| r.get(0))?;
    Ok(n as usize)
}

pub fn truncate_results(conn: &Connection) -> WicsResult<()> {
    conn.execute("DELETE FROM uploadsapresults", [])?;
    Ok(())
}

/// Append a line to the import log.
pub fn log_result(
    conn: &Connection,
    err_state: &str,
    errmsg: &str,
    row_num: Option<usize>,
) -> WicsResult<i64> {
    conn.execute(
        "INSERT INTO uploadsapresults (err_state, errmsg, row_num) VALUES (?1, ?2, ?3)",
        params![err_state, errmsg, row_num.map(|n| n as i64)],
    )?;
    Ok(conn.last_insert_rowid())
}

/// The import log of the last run, in the order it was written.
pub fn upload_results(conn: &Connection) -> WicsResult<Vec<UploadResult>> {
    let mut stmt =
        conn.prepare("SELECT id, err_state, errmsg, row_num FROM uploadsapresults ORDER BY id")?;
    let rows = stmt
        .query_map([], |r| {
            Ok(UploadResult {
                id: r.get(0)?,
                err_state: r.get(1)?,
                errmsg: r.get(2)?,
                row_num: r.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    #[test]
    fn staged_rows_filter_by_status_pattern() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.connection();
        for status in ["ADD", "DEL 4", "err-MatlNum", "DEL 9"] {
            insert_staged(
                conn,
                &StagedMaterial {
                    rec_status: Some(status.to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        }
        assert_eq!(staged_with_status(conn, "DEL%").unwrap().len(), 2);
        assert_eq!(staged_with_status(conn, "err-%").unwrap().len(), 1);
        assert_eq!(staged_count(conn).unwrap(), 4);
        truncate_staging(conn).unwrap();
        assert_eq!(staged_count(conn).unwrap(), 0);
    }

    #[test]
    fn result_log_keeps_write_order() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.connection();
        log_result(conn, "error", "bad", Some(3)).unwrap();
        log_result(conn, "nRowsTotal", "1", None).unwrap();
        let rows = upload_results(conn).unwrap();
        assert_eq!(rows[0].err_state, "error");
        assert_eq!(rows[0].row_num, Some(3));
        assert_eq!(rows[1].row_num, None);
    }
}
