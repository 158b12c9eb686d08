//! Organizations, part types, plants, units of measure and the material master.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::WicsResult;
use crate::models::{Material, NewMaterial, Organization, PartType, SapPlant, UnitOfMeasure};

pub fn insert_organization(conn: &Connection, orgname: &str) -> WicsResult<i64> {
    conn.execute("INSERT INTO organizations (orgname) VALUES (?1)", params![orgname])?;
    Ok(conn.last_insert_rowid())
}

/// All organizations, by id.
pub fn organizations(conn: &Connection) -> WicsResult<Vec<Organization>> {
    let mut stmt = conn.prepare("SELECT id, orgname FROM organizations ORDER BY id")?;
    let rows = stmt
        .query_map([], |r| {
            Ok(Organization {
                id: r.get(0)?,
                orgname: r.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn organization_by_name(conn: &Connection, orgname: &str) -> WicsResult<Option<Organization>> {
    Ok(conn
        .query_row(
            "SELECT id, orgname FROM organizations WHERE orgname = ?1",
            params![orgname],
            |r| {
                Ok(Organization {
                    id: r.get(0)?,
                    orgname: r.get(1)?,
                })
            },
        )
        .optional()?)
}

pub fn insert_part_type(conn: &Connection, name: &str, priority: Option<i64>) -> WicsResult<i64> {
    conn.execute(
        "INSERT INTO whseparttypes (whse_part_type, part_type_priority) VALUES (?1, ?2)",
        params![name, priority],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn part_types(conn: &Connection) -> WicsResult<Vec<PartType>> {
    let mut stmt = conn.prepare(
        "SELECT id, whse_part_type, part_type_priority FROM whseparttypes ORDER BY whse_part_type",
    )?;
    let rows = stmt
        .query_map([], |r| {
            Ok(PartType {
                id: r.get(0)?,
                whse_part_type: r.get(1)?,
                part_type_priority: r.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Map an SAP plant code to an org. Re-mapping a plant replaces the old mapping.
pub fn map_plant(conn: &Connection, sap_plant: &str, org_id: i64) -> WicsResult<()> {
    conn.execute(
        "INSERT INTO sapplants_org (sap_plant, org_id) VALUES (?1, ?2)
         ON CONFLICT(sap_plant) DO UPDATE SET org_id = excluded.org_id",
        params![sap_plant, org_id],
    )?;
    Ok(())
}

pub fn org_for_plant(conn: &Connection, sap_plant: &str) -> WicsResult<Option<i64>> {
    Ok(conn
        .query_row(
            "SELECT org_id FROM sapplants_org WHERE sap_plant = ?1",
            params![sap_plant],
            |r| r.get(0),
        )
        .optional()?)
}

pub fn plants(conn: &Connection) -> WicsResult<Vec<SapPlant>> {
    let mut stmt = conn.prepare("SELECT sap_plant, org_id FROM sapplants_org ORDER BY sap_plant")?;
    let rows = stmt
        .query_map([], |r| {
            Ok(SapPlant {
                sap_plant: r.get(0)?,
                org_id: r.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Insert or update a unit of measure.
pub fn upsert_uom(
    conn: &Connection,
    uom: &str,
    uom_text: Option<&str>,
    multiplier1: f64,
) -> WicsResult<()> {
    conn.execute(
        "INSERT INTO unitsofmeasure (uom, uom_text, multiplier1) VALUES (?1, ?2, ?3)
         ON CONFLICT(uom) DO UPDATE SET uom_text = excluded.uom_text, multiplier1 = excluded.multiplier1",
        params![uom, uom_text, multiplier1],
    )?;
    Ok(())
}

pub fn units_of_measure(conn: &Connection) -> WicsResult<Vec<UnitOfMeasure>> {
    let mut stmt =
        conn.prepare("SELECT id, uom, uom_text, multiplier1 FROM unitsofmeasure ORDER BY uom")?;
    let rows = stmt
        .query_map([], |r| {
            Ok(UnitOfMeasure {
                id: r.get(0)?,
                uom: r.get(1)?,
                uom_text: r.get(2)?,
                multiplier1: r.get(3)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub(crate) const MATERIAL_COLUMNS: &str = "id, org_id, material, description, part_type_id, plant, \
     sap_material_type, sap_material_group, sap_manuf, sap_mpn, sap_abc, price, price_unit, \
     currency, typical_container_qty, typical_pallet_qty, notes";

pub(crate) fn material_from_row(r: &Row<'_>) -> rusqlite::Result<Material> {
    Ok(Material {
        id: r.get(0)?,
        org_id: r.get(1)?,
        material: r.get(2)?,
        description: r.get(3)?,
        part_type_id: r.get(4)?,
        plant: r.get(5)?,
        sap_material_type: r.get(6)?,
        sap_material_group: r.get(7)?,
        sap_manuf: r.get(8)?,
        sap_mpn: r.get(9)?,
        sap_abc: r.get(10)?,
        price: r.get(11)?,
        price_unit: r.get(12)?,
        currency: r.get(13)?,
        typical_container_qty: r.get(14)?,
        typical_pallet_qty: r.get(15)?,
        notes: r.get(16)?,
    })
}

pub fn insert_material(conn: &Connection, m: &NewMaterial) -> WicsResult<i64> {
    conn.execute(
        "INSERT INTO materiallist (org_id, material, description, part_type_id, plant,
             sap_material_type, sap_material_group, sap_manuf, sap_mpn, sap_abc, price,
             price_unit, currency, typical_container_qty, typical_pallet_qty, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            m.org_id,
            m.material,
            m.description,
            m.part_type_id,
            m.plant,
            m.sap_material_type,
            m.sap_material_group,
            m.sap_manuf,
            m.sap_mpn,
            m.sap_abc,
            m.price,
            m.price_unit,
            m.currency,
            m.typical_container_qty,
            m.typical_pallet_qty,
            m.notes,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn material_by_id(conn: &Connection, id: i64) -> WicsResult<Option<Material>> {
    let sql = format!("SELECT {MATERIAL_COLUMNS} FROM materiallist WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], material_from_row).optional()?)
}

pub fn material_by_org_and_number(
    conn: &Connection,
    org_id: i64,
    material: &str,
) -> WicsResult<Option<Material>> {
    let sql = format!("SELECT {MATERIAL_COLUMNS} FROM materiallist WHERE org_id = ?1 AND material = ?2");
    Ok(conn
        .query_row(&sql, params![org_id, material], material_from_row)
        .optional()?)
}

/// Every material with this number, across orgs, by org id.
pub fn materials_by_number(conn: &Connection, material: &str) -> WicsResult<Vec<Material>> {
    let sql = format!("SELECT {MATERIAL_COLUMNS} FROM materiallist WHERE material = ?1 ORDER BY org_id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![material], material_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// The whole material master, by org then material number.
pub fn materials(conn: &Connection) -> WicsResult<Vec<Material>> {
    let sql = format!("SELECT {MATERIAL_COLUMNS} FROM materiallist ORDER BY org_id, material");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], material_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub fn update_typical_qtys(
    conn: &Connection,
    material_id: i64,
    typical_container_qty: Option<&str>,
    typical_pallet_qty: Option<&str>,
) -> WicsResult<()> {
    conn.execute(
        "UPDATE materiallist SET typical_container_qty = ?2, typical_pallet_qty = ?3 WHERE id = ?1",
        params![material_id, typical_container_qty, typical_pallet_qty],
    )?;
    Ok(())
}
