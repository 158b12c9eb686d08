//! Row types for the WICS tables.
//!
//! These mirror the tables created by [`crate::store::Store`]. Insert payloads use the
//! `New*` structs; the plain structs carry the database id.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub orgname: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartType {
    pub id: i64,
    pub whse_part_type: String,
    pub part_type_priority: Option<i64>,
}

/// SAP plant mapped to the org that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SapPlant {
    pub sap_plant: String,
    pub org_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitOfMeasure {
    pub id: i64,
    pub uom: String,
    pub uom_text: Option<String>,
    pub multiplier1: f64,
}

/// Material master row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: i64,
    pub org_id: i64,
    pub material: String,
    pub description: Option<String>,
    pub part_type_id: Option<i64>,
    pub plant: Option<String>,
    pub sap_material_type: Option<String>,
    pub sap_material_group: Option<String>,
    pub sap_manuf: Option<String>,
    pub sap_mpn: Option<String>,
    pub sap_abc: Option<String>,
    pub price: Option<f64>,
    pub price_unit: Option<i64>,
    pub currency: Option<String>,
    pub typical_container_qty: Option<String>,
    pub typical_pallet_qty: Option<String>,
    pub notes: Option<String>,
}

/// Material fields supplied on insert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMaterial {
    pub org_id: i64,
    pub material: String,
    pub description: Option<String>,
    pub part_type_id: Option<i64>,
    pub plant: Option<String>,
    pub sap_material_type: Option<String>,
    pub sap_material_group: Option<String>,
    pub sap_manuf: Option<String>,
    pub sap_mpn: Option<String>,
    pub sap_abc: Option<String>,
    pub price: Option<f64>,
    pub price_unit: Option<i64>,
    pub currency: Option<String>,
    pub typical_container_qty: Option<String>,
    pub typical_pallet_qty: Option<String>,
    pub notes: Option<String>,
}

/// A scheduled (or requested) count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountScheduleEntry {
    pub id: i64,
    pub count_date: NaiveDate,
    pub material_id: i64,
    pub requestor: Option<String>,
    pub request_filled: bool,
    pub counter: Option<String>,
    pub priority: Option<String>,
    pub reason_scheduled: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewCountScheduleEntry {
    pub count_date: NaiveDate,
    pub material_id: i64,
    pub requestor: Option<String>,
    pub request_filled: bool,
    pub counter: Option<String>,
    pub priority: Option<String>,
    pub reason_scheduled: Option<String>,
    pub notes: Option<String>,
}

/// One counted location of a material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActualCount {
    pub id: i64,
    pub count_date: NaiveDate,
    pub cyc_ct_id: Option<String>,
    pub material_id: i64,
    pub counter: String,
    pub location_only: bool,
    pub ctd_qty_expr: Option<String>,
    pub location: Option<String>,
    pub pkgid_desc: Option<String>,
    pub tagqty: Option<String>,
    pub flag_possibly_not_received: bool,
    pub flag_movement_during_count: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewActualCount {
    pub count_date: NaiveDate,
    pub cyc_ct_id: Option<String>,
    pub material_id: i64,
    pub counter: String,
    pub location_only: bool,
    pub ctd_qty_expr: Option<String>,
    pub location: Option<String>,
    pub pkgid_desc: Option<String>,
    pub tagqty: Option<String>,
    pub flag_possibly_not_received: bool,
    pub flag_movement_during_count: bool,
    pub notes: Option<String>,
}

/// One MB52 stock-on-hand line from an SAP snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SohRecord {
    pub id: i64,
    pub uploaded_at: Option<NaiveDate>,
    pub org_id: Option<i64>,
    pub material_part_num: String,
    pub material_id: Option<i64>,
    pub description: Option<String>,
    pub plant: Option<String>,
    pub material_type: Option<String>,
    pub storage_location: Option<String>,
    pub base_unit_of_measure: Option<String>,
    pub amount: f64,
    pub currency: Option<String>,
    pub value_unrestricted: Option<f64>,
    pub special_stock: Option<String>,
    pub blocked: Option<f64>,
    pub value_blocked: Option<f64>,
    pub batch: Option<String>,
    pub vendor: Option<String>,
}

/// Row of the material-sync staging table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StagedMaterial {
    pub id: i64,
    pub rec_status: Option<String>,
    pub errmsg: Option<String>,
    pub org_id: Option<i64>,
    pub material: Option<String>,
    pub material_link: Option<i64>,
    pub del_material_link: Option<i64>,
    pub description: Option<String>,
    pub plant: Option<String>,
    pub sap_material_type: Option<String>,
    pub sap_material_group: Option<String>,
    pub sap_manuf: Option<String>,
    pub sap_mpn: Option<String>,
    pub sap_abc: Option<String>,
    pub price: Option<f64>,
    pub price_unit: Option<i64>,
    pub currency: Option<String>,
}

/// Import log row (`uploadsapresults`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    pub id: i64,
    pub err_state: String,
    pub errmsg: String,
    pub row_num: Option<i64>,
}
