//! Count schedule and actual counts.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

use crate::error::WicsResult;
use crate::models::{ActualCount, CountScheduleEntry, NewActualCount, NewCountScheduleEntry};

pub fn insert_schedule(conn: &Connection, e: &NewCountScheduleEntry) -> WicsResult<i64> {
    conn.execute(
        "INSERT INTO countschedule (count_date, material_id, requestor, request_filled, counter,
             priority, reason_scheduled, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            e.count_date,
            e.material_id,
            e.requestor,
            e.request_filled,
            e.counter,
            e.priority,
            e.reason_scheduled,
            e.notes,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn schedule_from_row(r: &Row<'_>) -> rusqlite::Result<CountScheduleEntry> {
    Ok(CountScheduleEntry {
        id: r.get(0)?,
        count_date: r.get(1)?,
        material_id: r.get(2)?,
        requestor: r.get(3)?,
        request_filled: r.get(4)?,
        counter: r.get(5)?,
        priority: r.get(6)?,
        reason_scheduled: r.get(7)?,
        notes: r.get(8)?,
    })
}

pub fn schedule_for_date(conn: &Connection, date: NaiveDate) -> WicsResult<Vec<CountScheduleEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, count_date, material_id, requestor, request_filled, counter, priority,
                reason_scheduled, notes
         FROM countschedule WHERE count_date = ?1 ORDER BY material_id",
    )?;
    let rows = stmt
        .query_map(params![date], schedule_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn insert_actual_count(conn: &Connection, c: &NewActualCount) -> WicsResult<i64> {
    conn.execute(
        "INSERT INTO actualcounts (count_date, cyc_ct_id, material_id, counter, location_only,
             ctd_qty_expr, location, pkgid_desc, tagqty, flag_possibly_not_received,
             flag_movement_during_count, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            c.count_date,
            c.cyc_ct_id,
            c.material_id,
            c.counter,
            c.location_only,
            c.ctd_qty_expr,
            c.location,
            c.pkgid_desc,
            c.tagqty,
            c.flag_possibly_not_received,
            c.flag_movement_during_count,
            c.notes,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

const COUNT_COLUMNS: &str = "id, count_date, cyc_ct_id, material_id, counter, location_only, \
     ctd_qty_expr, location, pkgid_desc, tagqty, flag_possibly_not_received, \
     flag_movement_during_count, notes";

fn count_from_row(r: &Row<'_>) -> rusqlite::Result<ActualCount> {
    Ok(ActualCount {
        id: r.get(0)?,
        count_date: r.get(1)?,
        cyc_ct_id: r.get(2)?,
        material_id: r.get(3)?,
        counter: r.get(4)?,
        location_only: r.get(5)?,
        ctd_qty_expr: r.get(6)?,
        location: r.get(7)?,
        pkgid_desc: r.get(8)?,
        tagqty: r.get(9)?,
        flag_possibly_not_received: r.get(10)?,
        flag_movement_during_count: r.get(11)?,
        notes: r.get(12)?,
    })
}

pub fn counts_for_date(conn: &Connection, date: NaiveDate) -> WicsResult<Vec<ActualCount>> {
    let sql = format!("SELECT {COUNT_COLUMNS} FROM actualcounts WHERE count_date = ?1 ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![date], count_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Counts of one material, newest date first.
pub fn counts_for_material(conn: &Connection, material_id: i64) -> WicsResult<Vec<ActualCount>> {
    let sql = format!(
        "SELECT {COUNT_COLUMNS} FROM actualcounts WHERE material_id = ?1 ORDER BY count_date DESC, id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![material_id], count_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}
