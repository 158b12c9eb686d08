//! Lookup of the SAP stock-on-hand snapshot that applies to a date.

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::error::WicsResult;
use crate::models::SohRecord;
use crate::store::soh::{self, soh_from_row, SOH_COLUMNS};

/// One SOH line plus the multiplier of its unit of measure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SapLine {
    #[serde(flatten)]
    pub record: SohRecord,
    /// `unitsofmeasure.multiplier1`, or 1.0 for unknown units.
    pub multiplier: f64,
}

impl SapLine {
    /// Amount converted with the unit multiplier.
    pub fn quantity(&self) -> f64 {
        self.record.amount * self.multiplier
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SapList {
    pub requested_date: NaiveDate,
    /// Date of the snapshot used; `None` when no lines were selected.
    pub sap_date: Option<NaiveDate>,
    /// Ordered by org, part number and storage location.
    pub lines: Vec<SapLine>,
}

impl SapList {
    /// Lines linked to one material.
    pub fn lines_for(&self, material_id: i64) -> impl Iterator<Item = &SapLine> {
        self.lines
            .iter()
            .filter(move |l| l.record.material_id == Some(material_id))
    }
}

/// Select the snapshot for `for_date`: the latest upload on or before it, else the
/// earliest upload there is.
///
/// With `material_ids`, only lines linked to those materials are kept.
pub fn sap_list(
    conn: &Connection,
    for_date: NaiveDate,
    material_ids: Option<&[i64]>,
) -> WicsResult<SapList> {
    let snapshot_date = match soh::latest_snapshot_on_or_before(conn, for_date)? {
        Some(d) => Some(d),
        None => soh::earliest_snapshot(conn)?,
    };

    let mut lines = Vec::new();
    if let Some(date) = snapshot_date {
        let sql = format!(
            "SELECT {SOH_COLUMNS}, IFNULL(u.multiplier1, 1.0)
             FROM sap_sohrecs s
             LEFT JOIN unitsofmeasure u ON u.uom = s.base_unit_of_measure
             WHERE s.uploaded_at = ?1
             ORDER BY s.org_id, s.material_part_num, s.storage_location"
        );
        let mut stmt = conn.prepare(&sql)?;
        lines = stmt
            .query_map(params![date], |r| {
                Ok(SapLine {
                    record: soh_from_row(r)?,
                    multiplier: r.get(18)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
    }

    if let Some(ids) = material_ids {
        lines.retain(|l| l.record.material_id.is_some_and(|id| ids.contains(&id)));
    }

    Ok(SapList {
        requested_date: for_date,
        sap_date: if lines.is_empty() { None } else { snapshot_date },
        lines,
    })
}
