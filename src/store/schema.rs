//! SQLite DDL. Dates are stored as ISO `YYYY-MM-DD` text, so they compare correctly as
//! strings.

pub(crate) const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS organizations (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    orgname     TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS whseparttypes (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    whse_part_type      TEXT NOT NULL UNIQUE,
    part_type_priority  INTEGER
);

CREATE TABLE IF NOT EXISTS sapplants_org (
    sap_plant   TEXT PRIMARY KEY,
    org_id      INTEGER NOT NULL REFERENCES organizations(id)
);

CREATE TABLE IF NOT EXISTS unitsofmeasure (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    uom         TEXT NOT NULL UNIQUE,
    uom_text    TEXT,
    multiplier1 REAL NOT NULL DEFAULT 1.0
);

CREATE TABLE IF NOT EXISTS materiallist (
    id                      INTEGER PRIMARY KEY AUTOINCREMENT,
    org_id                  INTEGER NOT NULL REFERENCES organizations(id),
    material                TEXT NOT NULL,
    description             TEXT,
    part_type_id            INTEGER REFERENCES whseparttypes(id),
    plant                   TEXT,
    sap_material_type       TEXT,
    sap_material_group      TEXT,
    sap_manuf               TEXT,
    sap_mpn                 TEXT,
    sap_abc                 TEXT,
    price                   REAL,
    price_unit              INTEGER,
    currency                TEXT,
    typical_container_qty   TEXT,
    typical_pallet_qty      TEXT,
    notes                   TEXT,
    UNIQUE (org_id, material)
);
CREATE INDEX IF NOT EXISTS idx_materiallist_material ON materiallist(material);

CREATE TABLE IF NOT EXISTS countschedule (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    count_date          TEXT NOT NULL,
    material_id         INTEGER NOT NULL REFERENCES materiallist(id),
    requestor           TEXT,
    request_filled      INTEGER NOT NULL DEFAULT 0,
    counter             TEXT,
    priority            TEXT,
    reason_scheduled    TEXT,
    notes               TEXT,
    UNIQUE (count_date, material_id)
);

CREATE TABLE IF NOT EXISTS actualcounts (
    id                          INTEGER PRIMARY KEY AUTOINCREMENT,
    count_date                  TEXT NOT NULL,
    cyc_ct_id                   TEXT,
    material_id                 INTEGER NOT NULL REFERENCES materiallist(id),
    counter                     TEXT NOT NULL,
    location_only               INTEGER NOT NULL DEFAULT 0,
    ctd_qty_expr                TEXT,
    location                    TEXT,
    pkgid_desc                  TEXT,
    tagqty                      TEXT,
    flag_possibly_not_received  INTEGER NOT NULL DEFAULT 0,
    flag_movement_during_count  INTEGER NOT NULL DEFAULT 0,
    notes                       TEXT
);
CREATE INDEX IF NOT EXISTS idx_actualcounts_date_matl ON actualcounts(count_date, material_id);

CREATE TABLE IF NOT EXISTS sap_sohrecs (
    id                      INTEGER PRIMARY KEY AUTOINCREMENT,
    uploaded_at             TEXT,
    org_id                  INTEGER REFERENCES organizations(id),
    material_part_num       TEXT NOT NULL,
    material_id             INTEGER REFERENCES materiallist(id) ON DELETE SET NULL,
    description             TEXT,
    plant                   TEXT,
    material_type           TEXT,
    storage_location        TEXT,
    base_unit_of_measure    TEXT,
    amount                  REAL NOT NULL DEFAULT 0,
    currency                TEXT,
    value_unrestricted      REAL,
    special_stock           TEXT,
    blocked                 REAL,
    value_blocked           REAL,
    batch                   TEXT,
    vendor                  TEXT
);
CREATE INDEX IF NOT EXISTS idx_sap_sohrecs_upload ON sap_sohrecs(uploaded_at, org_id, material_part_num);

CREATE TABLE IF NOT EXISTS tmpmateriallistupdate (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    rec_status          TEXT,
    errmsg              TEXT,
    org_id              INTEGER,
    material            TEXT,
    material_link       INTEGER,
    del_material_link   INTEGER,
    description         TEXT,
    plant               TEXT,
    sap_material_type   TEXT,
    sap_material_group  TEXT,
    sap_manuf           TEXT,
    sap_mpn             TEXT,
    sap_abc             TEXT,
    price               REAL,
    price_unit          INTEGER,
    currency            TEXT
);
CREATE INDEX IF NOT EXISTS idx_tmpmatl_org_matl ON tmpmateriallistupdate(org_id, material);
CREATE INDEX IF NOT EXISTS idx_tmpmatl_status ON tmpmateriallistupdate(rec_status);
CREATE INDEX IF NOT EXISTS idx_tmpmatl_del ON tmpmateriallistupdate(del_material_link);

CREATE TABLE IF NOT EXISTS uploadsapresults (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    err_state   TEXT NOT NULL,
    errmsg      TEXT NOT NULL,
    row_num     INTEGER
);
"#;
