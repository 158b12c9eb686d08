//! Small read-only queries shared by the CLI and the reports.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::error::{WicsError, WicsResult};
use crate::models::Material;

/// `<material> (<orgname>)` when the same material number exists in another org,
/// otherwise the bare material number.
pub fn material_org_label(conn: &Connection, material: &Material) -> WicsResult<String> {
    let others: i64 = conn.query_row(
        "SELECT COUNT(*) FROM materiallist WHERE material = ?1 AND org_id <> ?2",
        params![material.material, material.org_id],
        |r| r.get(0),
    )?;
    if others == 0 {
        return Ok(material.material.clone());
    }
    let orgname: String = conn
        .query_row(
            "SELECT orgname FROM organizations WHERE id = ?1",
            params![material.org_id],
            |r| r.get(0),
        )
        .optional()?
        .ok_or_else(|| WicsError::NotFound {
            entity: "organization",
            key: material.org_id.to_string(),
        })?;
    Ok(format!("{} ({orgname})", material.material))
}

/// Where a material was last seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundAt {
    pub count_date: NaiveDate,
    /// Distinct locations, sorted.
    pub locations: Vec<String>,
}

/// Locations recorded for a material on its most recent count date; `None` if it was
/// never counted.
pub fn last_found_at(conn: &Connection, material_id: i64) -> WicsResult<Option<FoundAt>> {
    let last: Option<NaiveDate> = conn.query_row(
        "SELECT MAX(count_date) FROM actualcounts WHERE material_id = ?1",
        params![material_id],
        |r| r.get(0),
    )?;
    let Some(count_date) = last else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT DISTINCT location FROM actualcounts
         WHERE material_id = ?1 AND count_date = ?2 AND location IS NOT NULL
         ORDER BY location",
    )?;
    let locations = stmt
        .query_map(params![material_id, count_date], |r| r.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(Some(FoundAt {
        count_date,
        locations,
    }))
}

/// Every count date of a material with the locations recorded on it, newest first.
pub fn found_at(conn: &Connection, material_id: i64) -> WicsResult<Vec<FoundAt>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT count_date, location FROM actualcounts
         WHERE material_id = ?1 AND location IS NOT NULL
         ORDER BY count_date DESC, location",
    )?;
    let pairs = stmt
        .query_map(params![material_id], |r| {
            Ok((r.get::<_, NaiveDate>(0)?, r.get::<_, String>(1)?))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut out: Vec<FoundAt> = Vec::new();
    for (count_date, location) in pairs {
        match out.last_mut() {
            Some(last) if last.count_date == count_date => last.locations.push(location),
            _ => out.push(FoundAt {
                count_date,
                locations: vec![location],
            }),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewActualCount, NewMaterial};
    use crate::store::counts::insert_actual_count;
    use crate::store::materials::{insert_material, insert_organization, material_by_id};
    use crate::store::Store;

    fn count(material_id: i64, date: NaiveDate, location: &str) -> NewActualCount {
        NewActualCount {
            count_date: date,
            material_id,
            counter: "Al".to_string(),
            location: Some(location.to_string()),
            location_only: true,
            ..Default::default()
        }
    }

    #[test]
    fn label_names_the_org_only_when_ambiguous() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.connection();
        let main = insert_organization(conn, "MAIN").unwrap();
        let east = insert_organization(conn, "EAST").unwrap();
        let new = |org_id, material: &str| NewMaterial {
            org_id,
            material: material.to_string(),
            ..Default::default()
        };
        let shared = insert_material(conn, &new(main, "100")).unwrap();
        insert_material(conn, &new(east, "100")).unwrap();
        let single = insert_material(conn, &new(main, "200")).unwrap();

        let shared = material_by_id(conn, shared).unwrap().unwrap();
        let single = material_by_id(conn, single).unwrap().unwrap();
        assert_eq!(material_org_label(conn, &shared).unwrap(), "100 (MAIN)");
        assert_eq!(material_org_label(conn, &single).unwrap(), "200");
    }

    #[test]
    fn last_and_all_found_locations() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.connection();
        let org = insert_organization(conn, "MAIN").unwrap();
        let id = insert_material(
            conn,
            &NewMaterial {
                org_id: org,
                material: "100".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(last_found_at(conn, id).unwrap(), None);

        let d1 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 2, 2).unwrap();
        insert_actual_count(conn, &count(id, d1, "X-9")).unwrap();
        insert_actual_count(conn, &count(id, d2, "B-2")).unwrap();
        insert_actual_count(conn, &count(id, d2, "A-1")).unwrap();
        insert_actual_count(conn, &count(id, d2, "A-1")).unwrap();

        let last = last_found_at(conn, id).unwrap().unwrap();
        assert_eq!(last.count_date, d2);
        assert_eq!(last.locations, vec!["A-1", "B-2"]);

        let all = found_at(conn, id).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].count_date, d1);
        assert_eq!(all[1].locations, vec!["X-9"]);
    }
}
