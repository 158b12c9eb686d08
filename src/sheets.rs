//! Header maps for each spreadsheet the system imports.
//!
//! Field names are the logical column names the importers read back with
//! [`crate::types::DataSet::get`]; the header aliases are the texts SAP (or the count-sheet
//! template) puts in the first row.

use crate::types::{DataType, DuplicateHeaders, Field, Schema};

/// Field names of the material-list (MM60 / ZMSQV001) sheet.
pub mod material {
    pub const MATERIAL: &str = "Material";
    pub const DESCRIPTION: &str = "Description";
    pub const PLANT: &str = "Plant";
    pub const MATERIAL_TYPE: &str = "SAPMaterialType";
    pub const MATERIAL_GROUP: &str = "SAPMaterialGroup";
    pub const MANUF: &str = "SAPManuf";
    pub const MPN: &str = "SAPMPN";
    pub const ABC: &str = "SAPABC";
    pub const PRICE: &str = "Price";
    pub const PRICE_UNIT: &str = "PriceUnit";
    pub const CURRENCY: &str = "Currency";
}

/// Field names of the count-entry sheet.
pub mod count {
    pub const SHEET_NAME: &str = "Counts";

    pub const COUNT_DATE: &str = "CountDate";
    pub const COUNTER: &str = "Counter";
    pub const LOCATION: &str = "LOCATION";
    pub const ORG_ID: &str = "org_id";
    pub const MATERIAL: &str = "Material";
    pub const LOCATION_ONLY: &str = "LocationOnly";
    pub const CTD_QTY_EXPR: &str = "CTD_QTY_Expr";
    pub const TYP_CONTAINER_QTY: &str = "TypicalContainerQty";
    pub const TYP_PALLET_QTY: &str = "TypicalPalletQty";
    pub const NOTES: &str = "Notes";
    pub const PKGID_DESC: &str = "PKGID_Desc";
    pub const TAGQTY: &str = "TAGQTY";
    pub const POSS_NOT_RECEIVED: &str = "FLAG_PossiblyNotRecieved";
    pub const MOVEMENT_DURING_COUNT: &str = "FLAG_MovementDuringCount";
    pub const IGNORE: &str = "WICSignore";
}

/// Field names of the stock-on-hand (MB52) sheet.
pub mod soh {
    pub const MATERIAL: &str = "Material";
    pub const DESCRIPTION: &str = "Description";
    pub const PLANT: &str = "Plant";
    pub const MATERIAL_TYPE: &str = "MaterialType";
    pub const STORAGE_LOCATION: &str = "StorageLocation";
    pub const BASE_UOM: &str = "BaseUnitofMeasure";
    pub const AMOUNT: &str = "Amount";
    pub const CURRENCY: &str = "Currency";
    pub const VALUE_UNRESTRICTED: &str = "ValueUnrestricted";
    pub const SPECIAL_STOCK: &str = "SpecialStock";
    pub const BLOCKED: &str = "Blocked";
    pub const VALUE_BLOCKED: &str = "ValueBlocked";
    pub const BATCH: &str = "Batch";
    pub const VENDOR: &str = "Vendor";
}

/// SAP MM60 / ZMSQV001 material list export.
pub fn material_list_schema() -> Schema {
    use material::*;
    Schema::new(vec![
        Field::new(MATERIAL, DataType::Utf8).required(),
        Field::new(DESCRIPTION, DataType::Utf8).with_headers(&["Material description"]),
        Field::new(PLANT, DataType::Utf8).with_headers(&["Plant", "Plnt"]).required(),
        Field::new(MATERIAL_TYPE, DataType::Utf8).with_headers(&["Material type", "MTyp"]),
        Field::new(MATERIAL_GROUP, DataType::Utf8).with_headers(&["Material Group", "Matl Group"]),
        Field::new(MANUF, DataType::Utf8).with_headers(&["Manufact."]),
        Field::new(MPN, DataType::Utf8).with_headers(&["MPN"]),
        Field::new(ABC, DataType::Utf8).with_headers(&["ABC", "ABC Indicator"]),
        Field::new(PRICE, DataType::Float64).with_headers(&["Price", "Standard price"]),
        Field::new(PRICE_UNIT, DataType::Int64).with_headers(&["Price unit", "per"]),
        Field::new(CURRENCY, DataType::Utf8).with_headers(&["Currency"]),
    ])
    .with_duplicates(DuplicateHeaders::LastWins)
}

/// Count-entry template (sheet `Counts`).
pub fn count_entry_schema() -> Schema {
    use count::*;
    Schema::new(vec![
        Field::new(COUNT_DATE, DataType::Date).required(),
        Field::new(COUNTER, DataType::Utf8).required(),
        Field::new(LOCATION, DataType::Utf8).required(),
        Field::new(ORG_ID, DataType::Int64),
        Field::new(MATERIAL, DataType::Utf8).required(),
        Field::new(LOCATION_ONLY, DataType::Int64),
        Field::new(CTD_QTY_EXPR, DataType::Utf8),
        Field::new(TYP_CONTAINER_QTY, DataType::Utf8).with_headers(&["Typ Cntner Qty"]),
        Field::new(TYP_PALLET_QTY, DataType::Utf8).with_headers(&["Typ Plt Qty"]),
        Field::new(NOTES, DataType::Utf8),
        Field::new(PKGID_DESC, DataType::Utf8),
        Field::new(TAGQTY, DataType::Utf8),
        Field::new(POSS_NOT_RECEIVED, DataType::Int64).with_headers(&["Poss Not Rcvd"]),
        Field::new(MOVEMENT_DURING_COUNT, DataType::Int64).with_headers(&["Mvmt Dur Ct"]),
        Field::new(IGNORE, DataType::Bool),
    ])
    .with_duplicates(DuplicateHeaders::Reject)
}

/// SAP MB52 stock-on-hand export.
pub fn stock_on_hand_schema() -> Schema {
    use soh::*;
    Schema::new(vec![
        Field::new(MATERIAL, DataType::Utf8).required(),
        Field::new(DESCRIPTION, DataType::Utf8).with_headers(&["Material description", "Material Description"]),
        Field::new(PLANT, DataType::Utf8).with_headers(&["Plant", "Plnt"]).required(),
        Field::new(MATERIAL_TYPE, DataType::Utf8).with_headers(&["Material type", "MTyp"]),
        Field::new(STORAGE_LOCATION, DataType::Utf8).with_headers(&["Storage location", "SLoc"]),
        Field::new(BASE_UOM, DataType::Utf8).with_headers(&["Base Unit of Measure", "BUn"]),
        Field::new(AMOUNT, DataType::Float64).with_headers(&["Unrestricted"]),
        Field::new(CURRENCY, DataType::Utf8).with_headers(&["Currency", "Crcy"]),
        Field::new(VALUE_UNRESTRICTED, DataType::Float64).with_headers(&["Value Unrestricted"]),
        Field::new(SPECIAL_STOCK, DataType::Utf8).with_headers(&["Special stock", "S"]),
        Field::new(BLOCKED, DataType::Float64).with_headers(&["Blocked"]),
        Field::new(VALUE_BLOCKED, DataType::Float64).with_headers(&["Value BlockedStock"]),
        Field::new(BATCH, DataType::Utf8).with_headers(&["Batch"]),
        Field::new(VENDOR, DataType::Utf8).with_headers(&["Vendor"]),
    ])
    .with_duplicates(DuplicateHeaders::LastWins)
}
