//! Count-accuracy summary for one count date.
//!
//! For every organization the report has three sections, each a list of rows already
//! ordered by `<orgname>-<material>`:
//!
//! - materials scheduled for the date and counted,
//! - materials counted on the date without a schedule entry,
//! - materials scheduled for the date but not counted.
//!
//! Location-only counts never contribute. Within a section the rows are walked in order:
//! every row becomes a [`DetailLine`], and every change of material closes the previous
//! group with a [`SummaryLine`] comparing the counted total with the SAP stock on hand.

use std::fmt;
#[cfg(feature = "xlsx_export")]
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::WicsResult;
use crate::expr;
use crate::sap_list::{sap_list, SapList};
use crate::store::materials;

/// Which schedule entries the report considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportVariation {
    /// Every schedule entry.
    #[default]
    All,
    /// Only schedule entries with a requestor. Unscheduled counts are still listed.
    Requested,
}

/// Accuracy percentages below which a summary line is flagged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyCutoffs {
    pub danger: f64,
    pub warning: f64,
    pub ok: f64,
}

impl Default for AccuracyCutoffs {
    fn default() -> Self {
        Self {
            danger: 70.0,
            warning: 90.0,
            ok: 99.0,
        }
    }
}

impl AccuracyCutoffs {
    pub fn level(&self, accuracy: f64) -> AccuracyLevel {
        if accuracy < self.danger {
            AccuracyLevel::Danger
        } else if accuracy < self.warning {
            AccuracyLevel::Warning
        } else if accuracy < self.ok {
            AccuracyLevel::Ok
        } else {
            AccuracyLevel::Good
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccuracyLevel {
    Danger,
    Warning,
    Ok,
    Good,
}

impl fmt::Display for AccuracyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccuracyLevel::Danger => "DANGER",
            AccuracyLevel::Warning => "WARNING",
            AccuracyLevel::Ok => "OK",
            AccuracyLevel::Good => "GOOD",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct CountSummaryOptions {
    /// Evaluate `CTD_QTY_Expr`. When off, detail lines show `----` and totals stay at zero.
    pub evaluate_quantities: bool,
    pub cutoffs: AccuracyCutoffs,
}

impl Default for CountSummaryOptions {
    fn default() -> Self {
        Self {
            evaluate_quantities: true,
            cutoffs: AccuracyCutoffs::default(),
        }
    }
}

/// The evaluated quantity of one count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CountedQty {
    Value(f64),
    /// The expression is missing or does not evaluate.
    Invalid,
    NotEvaluated,
}

impl CountedQty {
    fn of(expr: Option<&str>, evaluate: bool) -> Self {
        if !evaluate {
            return CountedQty::NotEvaluated;
        }
        match expr.map(expr::evaluate) {
            Some(Ok(v)) => CountedQty::Value(v),
            _ => CountedQty::Invalid,
        }
    }
}

impl fmt::Display for CountedQty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountedQty::Value(v) => write!(f, "{v}"),
            CountedQty::Invalid => f.write_str("????"),
            CountedQty::NotEvaluated => f.write_str("----"),
        }
    }
}

impl Serialize for CountedQty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CountedQty::Value(v) => serializer.serialize_f64(*v),
            other => serializer.serialize_str(&other.to_string()),
        }
    }
}

/// One count (or, for scheduled-but-not-counted rows, one schedule entry).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailLine {
    pub cyc_ct_id: Option<String>,
    pub material_id: i64,
    pub material: String,
    pub description: Option<String>,
    pub org_name: String,
    pub counter: Option<String>,
    pub location: Option<String>,
    pub pkgid_desc: Option<String>,
    pub tagqty: Option<String>,
    pub possibly_not_received: bool,
    pub movement_during_count: bool,
    pub ctd_qty_expr: Option<String>,
    pub ctd_qty: CountedQty,
    pub notes: Option<String>,
}

/// SAP quantity of a material in one storage location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SapQuantity {
    pub storage_location: Option<String>,
    pub amount: f64,
    pub uom: Option<String>,
}

/// Counted total versus SAP for one material.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryLine {
    pub org_name: String,
    pub material_id: i64,
    pub material: String,
    pub description: Option<String>,
    pub part_type: Option<String>,
    pub sched_counter: Option<String>,
    /// Distinct counters, in the order they appear, joined with `", "`.
    pub counters: String,
    pub requestor: Option<String>,
    pub request_filled: bool,
    pub reason_scheduled: Option<String>,
    pub sched_notes: Option<String>,
    pub material_notes: Option<String>,
    pub typical_container_qty: Option<String>,
    pub typical_pallet_qty: Option<String>,
    pub sap: Vec<SapQuantity>,
    pub count_total: f64,
    pub sap_total: i64,
    pub diff: i64,
    pub accuracy: f64,
    pub level: AccuracyLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputRow {
    Detail(DetailLine),
    Summary(SummaryLine),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSection {
    pub org_id: i64,
    pub org_name: String,
    pub title: String,
    pub rows: Vec<OutputRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountSummaryReport {
    pub count_date: NaiveDate,
    pub variation: ReportVariation,
    /// Date of the SAP snapshot compared against; `None` without SAP data.
    pub sap_date: Option<NaiveDate>,
    pub sections: Vec<ReportSection>,
}

impl CountSummaryReport {
    /// Every summary line, section by section.
    pub fn summary_lines(&self) -> impl Iterator<Item = &SummaryLine> {
        self.sections.iter().flat_map(|s| {
            s.rows.iter().filter_map(|r| match r {
                OutputRow::Summary(line) => Some(line),
                OutputRow::Detail(_) => None,
            })
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    ScheduledAndCounted,
    Unscheduled,
    ScheduledNotCounted,
}

impl SectionKind {
    const ALL: [SectionKind; 3] = [
        SectionKind::ScheduledAndCounted,
        SectionKind::Unscheduled,
        SectionKind::ScheduledNotCounted,
    ];

    fn title(self, variation: ReportVariation) -> &'static str {
        match (self, variation) {
            (SectionKind::ScheduledAndCounted, ReportVariation::All) => "Scheduled and Counted",
            (SectionKind::ScheduledAndCounted, ReportVariation::Requested) => "Requested and Counted",
            (SectionKind::Unscheduled, _) => "UnScheduled",
            (SectionKind::ScheduledNotCounted, ReportVariation::All) => "Scheduled but Not Counted",
            (SectionKind::ScheduledNotCounted, ReportVariation::Requested) => "Requested but Not Counted",
        }
    }

    fn sql(self, variation: ReportVariation) -> String {
        let requested = match variation {
            ReportVariation::Requested if self != SectionKind::Unscheduled => {
                " AND cs.requestor IS NOT NULL"
            }
            _ => "",
        };
        let from = match self {
            SectionKind::ScheduledAndCounted => {
                "FROM countschedule cs
                 JOIN (SELECT * FROM actualcounts WHERE location_only = 0) ac
                   ON ac.count_date = cs.count_date AND ac.material_id = cs.material_id
                 JOIN materiallist mtl ON mtl.id = ac.material_id"
            }
            SectionKind::Unscheduled => {
                "FROM (SELECT * FROM actualcounts WHERE location_only = 0) ac
                 JOIN materiallist mtl ON mtl.id = ac.material_id
                 LEFT JOIN countschedule cs
                   ON cs.count_date = ac.count_date AND cs.material_id = ac.material_id"
            }
            SectionKind::ScheduledNotCounted => {
                "FROM countschedule cs
                 JOIN materiallist mtl ON mtl.id = cs.material_id
                 LEFT JOIN (SELECT * FROM actualcounts WHERE location_only = 0) ac
                   ON ac.count_date = cs.count_date AND ac.material_id = cs.material_id"
            }
        };
        let missing = match self {
            SectionKind::ScheduledAndCounted => "",
            SectionKind::Unscheduled => " AND cs.id IS NULL",
            SectionKind::ScheduledNotCounted => " AND ac.id IS NULL",
        };
        format!(
            "SELECT {ROW_COLUMNS}
             {from}
             JOIN organizations o ON o.id = mtl.org_id
             LEFT JOIN whseparttypes pt ON pt.id = mtl.part_type_id
             WHERE (ac.count_date = ?1 OR cs.count_date = ?1)
               AND mtl.org_id = ?2{missing}{requested}
             ORDER BY o.orgname || '-' || mtl.material, cs.id, ac.id"
        )
    }
}

const ROW_COLUMNS: &str = "cs.counter, cs.reason_scheduled, cs.requestor, cs.request_filled, \
    cs.notes, ac.cyc_ct_id, ac.counter, ac.ctd_qty_expr, ac.location, ac.pkgid_desc, ac.tagqty, \
    ac.flag_possibly_not_received, ac.flag_movement_during_count, ac.notes, mtl.id, mtl.material, \
    mtl.description, pt.whse_part_type, mtl.typical_container_qty, mtl.typical_pallet_qty, mtl.notes";

/// A joined schedule/count/material row, before grouping.
#[derive(Debug, Clone, Default)]
struct CountRow {
    sched_counter: Option<String>,
    reason_scheduled: Option<String>,
    requestor: Option<String>,
    request_filled: Option<bool>,
    sched_notes: Option<String>,
    cyc_ct_id: Option<String>,
    counter: Option<String>,
    ctd_qty_expr: Option<String>,
    location: Option<String>,
    pkgid_desc: Option<String>,
    tagqty: Option<String>,
    possibly_not_received: Option<bool>,
    movement_during_count: Option<bool>,
    count_notes: Option<String>,
    material_id: i64,
    material: String,
    description: Option<String>,
    part_type: Option<String>,
    typical_container_qty: Option<String>,
    typical_pallet_qty: Option<String>,
    material_notes: Option<String>,
}

fn count_row(r: &Row<'_>) -> rusqlite::Result<CountRow> {
    Ok(CountRow {
        sched_counter: r.get(0)?,
        reason_scheduled: r.get(1)?,
        requestor: r.get(2)?,
        request_filled: r.get(3)?,
        sched_notes: r.get(4)?,
        cyc_ct_id: r.get(5)?,
        counter: r.get(6)?,
        ctd_qty_expr: r.get(7)?,
        location: r.get(8)?,
        pkgid_desc: r.get(9)?,
        tagqty: r.get(10)?,
        possibly_not_received: r.get(11)?,
        movement_during_count: r.get(12)?,
        count_notes: r.get(13)?,
        material_id: r.get(14)?,
        material: r.get(15)?,
        description: r.get(16)?,
        part_type: r.get(17)?,
        typical_container_qty: r.get(18)?,
        typical_pallet_qty: r.get(19)?,
        material_notes: r.get(20)?,
    })
}

/// Build the count summary for `count_date`.
pub fn count_summary(
    conn: &Connection,
    count_date: NaiveDate,
    variation: ReportVariation,
    options: &CountSummaryOptions,
) -> WicsResult<CountSummaryReport> {
    let sap = sap_list(conn, count_date, None)?;
    let mut sections = Vec::new();

    for org in materials::organizations(conn)? {
        for kind in SectionKind::ALL {
            let mut stmt = conn.prepare(&kind.sql(variation))?;
            let rows = stmt
                .query_map(params![count_date, org.id], count_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            tracing::debug!(org = %org.orgname, section = kind.title(variation), rows = rows.len());
            sections.push(ReportSection {
                org_id: org.id,
                org_name: org.orgname.clone(),
                title: kind.title(variation).to_string(),
                rows: create_output_rows(&rows, &org.orgname, &sap, options),
            });
        }
    }

    let report = CountSummaryReport {
        count_date,
        variation,
        sap_date: sap.sap_date,
        sections,
    };
    tracing::info!(
        %count_date,
        sap_date = ?report.sap_date,
        materials = report.summary_lines().count(),
        "count summary built"
    );
    Ok(report)
}

/// Running state of the material currently being walked.
struct Group<'a> {
    first: &'a CountRow,
    counted: f64,
    counters: Vec<String>,
}

impl<'a> Group<'a> {
    fn start(first: &'a CountRow) -> Self {
        Self {
            first,
            counted: 0.0,
            counters: Vec::new(),
        }
    }

    fn add_counter(&mut self, counter: Option<&str>) {
        if let Some(c) = counter {
            if !self.counters.iter().any(|known| known == c) {
                self.counters.push(c.to_string());
            }
        }
    }

    fn close(self, org_name: &str, sap: &SapList, cutoffs: &AccuracyCutoffs) -> SummaryLine {
        let first = self.first;
        let mut sap_lines = Vec::new();
        let mut sap_total = 0.0;
        for line in sap.lines_for(first.material_id) {
            sap_total += line.quantity();
            sap_lines.push(SapQuantity {
                storage_location: line.record.storage_location.clone(),
                amount: line.record.amount,
                uom: line.record.base_unit_of_measure.clone(),
            });
        }

        let counted = self.counted;
        let larger = counted.max(sap_total);
        let divisor = if larger == 0.0 { 1.0 } else { larger };
        let accuracy = counted.min(sap_total) / divisor * 100.0;

        SummaryLine {
            org_name: org_name.to_string(),
            material_id: first.material_id,
            material: first.material.clone(),
            description: first.description.clone(),
            part_type: first.part_type.clone(),
            sched_counter: first.sched_counter.clone(),
            counters: self.counters.join(", "),
            requestor: first.requestor.clone(),
            request_filled: first.request_filled.unwrap_or(false),
            reason_scheduled: first.reason_scheduled.clone(),
            sched_notes: first.sched_notes.clone(),
            material_notes: first.material_notes.clone(),
            typical_container_qty: first.typical_container_qty.clone(),
            typical_pallet_qty: first.typical_pallet_qty.clone(),
            sap: sap_lines,
            count_total: counted,
            sap_total: sap_total as i64,
            diff: (counted - sap_total) as i64,
            accuracy,
            level: cutoffs.level(accuracy),
        }
    }
}

fn create_output_rows(
    rows: &[CountRow],
    org_name: &str,
    sap: &SapList,
    options: &CountSummaryOptions,
) -> Vec<OutputRow> {
    let mut out = Vec::with_capacity(rows.len() + rows.len() / 2);
    let mut group: Option<Group<'_>> = None;

    for row in rows {
        if group.as_ref().is_some_and(|g| g.first.material_id != row.material_id) {
            if let Some(done) = group.take() {
                out.push(OutputRow::Summary(done.close(org_name, sap, &options.cutoffs)));
            }
        }
        let g = group.get_or_insert_with(|| Group::start(row));

        let ctd_qty = CountedQty::of(row.ctd_qty_expr.as_deref(), options.evaluate_quantities);
        if let CountedQty::Value(v) = ctd_qty {
            g.counted += v;
        }
        g.add_counter(row.counter.as_deref());

        out.push(OutputRow::Detail(DetailLine {
            cyc_ct_id: row.cyc_ct_id.clone(),
            material_id: row.material_id,
            material: row.material.clone(),
            description: row.description.clone(),
            org_name: org_name.to_string(),
            counter: row.counter.clone(),
            location: row.location.clone(),
            pkgid_desc: row.pkgid_desc.clone(),
            tagqty: row.tagqty.clone(),
            possibly_not_received: row.possibly_not_received.unwrap_or(false),
            movement_during_count: row.movement_during_count.unwrap_or(false),
            ctd_qty_expr: row.ctd_qty_expr.clone(),
            ctd_qty,
            notes: row.count_notes.clone(),
        }));
    }

    if let Some(done) = group {
        out.push(OutputRow::Summary(done.close(org_name, sap, &options.cutoffs)));
    }
    out
}

#[cfg(feature = "xlsx_export")]
const EXPORT_HEADERS: [&str; 9] = [
    "OrgName",
    "Material",
    "PartType",
    "Description",
    "CountTotal",
    "SAPTotal",
    "Diff",
    "Accuracy",
    "Counters",
];

/// First `Count_Summary_<date>_<kk>.xlsx` in `dir` that does not exist yet.
#[cfg(feature = "xlsx_export")]
fn export_path(dir: &Path, count_date: NaiveDate) -> WicsResult<PathBuf> {
    let date = count_date.format("%Y-%m-%d");
    (0..=0xffffu32)
        .map(|k| dir.join(format!("Count_Summary_{date}_{k:02x}.xlsx")))
        .find(|p| !p.exists())
        .ok_or_else(|| {
            crate::error::WicsError::InvalidInput(format!(
                "no unused Count_Summary file name left for {date} in {}",
                dir.display()
            ))
        })
}

/// Write the summary lines of `report` to a new workbook in `dir`.
#[cfg(feature = "xlsx_export")]
pub fn export_summary_xlsx(report: &CountSummaryReport, dir: impl AsRef<Path>) -> WicsResult<PathBuf> {
    use rust_xlsxwriter::{Format, Workbook};

    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let path = export_path(dir, report.count_date)?;

    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name("Count Summary")?;
    let bold = Format::new().set_bold();
    for (col, header) in EXPORT_HEADERS.iter().enumerate() {
        ws.write_string_with_format(0, col as u16, *header, &bold)?;
    }

    for (i, line) in report.summary_lines().enumerate() {
        let row = (i + 1) as u32;
        ws.write_string(row, 0, line.org_name.as_str())?;
        ws.write_string(row, 1, line.material.as_str())?;
        ws.write_string(row, 2, line.part_type.as_deref().unwrap_or_default())?;
        ws.write_string(row, 3, line.description.as_deref().unwrap_or_default())?;
        ws.write_number(row, 4, line.count_total)?;
        ws.write_number(row, 5, line.sap_total as f64)?;
        ws.write_number(row, 6, line.diff as f64)?;
        ws.write_number(row, 7, line.accuracy)?;
        ws.write_string(row, 8, line.counters.as_str())?;
    }

    wb.save(&path)?;
    tracing::info!(path = %path.display(), "count summary exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewActualCount, NewCountScheduleEntry, NewMaterial, SohRecord};
    use crate::store::counts::{insert_actual_count, insert_schedule};
    use crate::store::materials::{insert_material, insert_organization, upsert_uom};
    use crate::store::soh::insert_soh;
    use crate::store::Store;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn count(material_id: i64, counter: &str, expr: Option<&str>, location_only: bool) -> NewActualCount {
        NewActualCount {
            count_date: day(),
            material_id,
            counter: counter.to_string(),
            location: Some("A-01".to_string()),
            location_only,
            ctd_qty_expr: expr.map(str::to_string),
            ..Default::default()
        }
    }

    fn soh(material_id: i64, part: &str, uom: &str, amount: f64) -> SohRecord {
        SohRecord {
            uploaded_at: Some(day()),
            material_part_num: part.to_string(),
            material_id: Some(material_id),
            storage_location: Some("0001".to_string()),
            base_unit_of_measure: Some(uom.to_string()),
            amount,
            ..Default::default()
        }
    }

    /// A: scheduled and counted twice. B: counted without a schedule.
    /// C: requested, only a location-only count.
    fn seeded_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        let conn = store.connection();
        let org = insert_organization(conn, "MAIN").unwrap();
        let mut ids = Vec::new();
        for m in ["A", "B", "C"] {
            ids.push(
                insert_material(
                    conn,
                    &NewMaterial {
                        org_id: org,
                        material: m.to_string(),
                        description: Some(format!("part {m}")),
                        ..Default::default()
                    },
                )
                .unwrap(),
            );
        }
        let (a, b, c) = (ids[0], ids[1], ids[2]);

        insert_schedule(
            conn,
            &NewCountScheduleEntry {
                count_date: day(),
                material_id: a,
                counter: Some("JD".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        insert_schedule(
            conn,
            &NewCountScheduleEntry {
                count_date: day(),
                material_id: c,
                requestor: Some("Ann".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        insert_actual_count(conn, &count(a, "Al", Some("3*24+5"), false)).unwrap();
        insert_actual_count(conn, &count(a, "Bo", Some("10"), false)).unwrap();
        insert_actual_count(conn, &count(a, "Al", Some("0"), false)).unwrap();
        insert_actual_count(conn, &count(b, "Bo", Some("5"), false)).unwrap();
        insert_actual_count(conn, &count(c, "Cy", None, true)).unwrap();

        upsert_uom(conn, "BOX", None, 12.0).unwrap();
        insert_soh(conn, &soh(a, "A", "EA", 80.0)).unwrap();
        insert_soh(conn, &soh(c, "C", "BOX", 2.0)).unwrap();
        store
    }

    fn summaries(section: &ReportSection) -> Vec<&SummaryLine> {
        section
            .rows
            .iter()
            .filter_map(|r| match r {
                OutputRow::Summary(s) => Some(s),
                OutputRow::Detail(_) => None,
            })
            .collect()
    }

    fn details(section: &ReportSection) -> Vec<&DetailLine> {
        section
            .rows
            .iter()
            .filter_map(|r| match r {
                OutputRow::Detail(d) => Some(d),
                OutputRow::Summary(_) => None,
            })
            .collect()
    }

    #[test]
    fn sections_group_counts_and_compare_with_sap() {
        let store = seeded_store();
        let report = count_summary(
            store.connection(),
            day(),
            ReportVariation::All,
            &CountSummaryOptions::default(),
        )
        .unwrap();
        assert_eq!(report.sap_date, Some(day()));

        let titles: Vec<&str> = report.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Scheduled and Counted", "UnScheduled", "Scheduled but Not Counted"]
        );

        let counted = &report.sections[0];
        assert_eq!(details(counted).len(), 3);
        let a = summaries(counted);
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].material, "A");
        assert_eq!(a[0].count_total, 87.0);
        assert_eq!(a[0].sap_total, 80);
        assert_eq!(a[0].diff, 7);
        assert!((a[0].accuracy - 80.0 / 87.0 * 100.0).abs() < 1e-9);
        assert_eq!(a[0].level, AccuracyLevel::Ok);
        assert_eq!(a[0].counters, "Al, Bo");
        assert_eq!(a[0].sched_counter.as_deref(), Some("JD"));
        // The summary closes the group, after its details.
        assert!(matches!(counted.rows.last(), Some(OutputRow::Summary(_))));

        let b = summaries(&report.sections[1]);
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].material, "B");
        assert_eq!(b[0].sap_total, 0);
        assert_eq!(b[0].accuracy, 0.0);
        assert_eq!(b[0].level, AccuracyLevel::Danger);

        let not_counted = &report.sections[2];
        let c = summaries(not_counted);
        assert_eq!(c[0].material, "C");
        assert_eq!(c[0].sap_total, 24);
        assert_eq!(c[0].diff, -24);
        assert_eq!(c[0].counters, "");
        assert_eq!(details(not_counted)[0].ctd_qty, CountedQty::Invalid);

        assert_eq!(report.summary_lines().count(), 3);
    }

    #[test]
    fn requested_variation_keeps_only_requested_schedule_rows() {
        let store = seeded_store();
        let report = count_summary(
            store.connection(),
            day(),
            ReportVariation::Requested,
            &CountSummaryOptions::default(),
        )
        .unwrap();

        assert_eq!(report.sections[0].title, "Requested and Counted");
        assert!(report.sections[0].rows.is_empty());
        assert_eq!(summaries(&report.sections[1])[0].material, "B");
        assert_eq!(report.sections[2].title, "Requested but Not Counted");
        let c = summaries(&report.sections[2]);
        assert_eq!(c[0].requestor.as_deref(), Some("Ann"));
    }

    #[test]
    fn evaluation_can_be_switched_off() {
        let store = seeded_store();
        let options = CountSummaryOptions {
            evaluate_quantities: false,
            ..Default::default()
        };
        let report = count_summary(store.connection(), day(), ReportVariation::All, &options).unwrap();
        let first = details(&report.sections[0])[0];
        assert_eq!(first.ctd_qty, CountedQty::NotEvaluated);
        assert_eq!(first.ctd_qty.to_string(), "----");
        assert_eq!(summaries(&report.sections[0])[0].count_total, 0.0);
    }

    #[test]
    fn other_dates_are_empty() {
        let store = seeded_store();
        let other = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let report = count_summary(
            store.connection(),
            other,
            ReportVariation::All,
            &CountSummaryOptions::default(),
        )
        .unwrap();
        assert_eq!(report.summary_lines().count(), 0);
    }

    #[test]
    fn accuracy_levels_follow_cutoffs() {
        let cutoffs = AccuracyCutoffs::default();
        assert_eq!(cutoffs.level(0.0), AccuracyLevel::Danger);
        assert_eq!(cutoffs.level(70.0), AccuracyLevel::Warning);
        assert_eq!(cutoffs.level(95.0), AccuracyLevel::Ok);
        assert_eq!(cutoffs.level(99.0), AccuracyLevel::Good);
        assert_eq!(cutoffs.level(100.0), AccuracyLevel::Good);
    }

    #[test]
    fn invalid_expression_renders_question_marks() {
        let q = CountedQty::of(Some("2x"), true);
        assert_eq!(q, CountedQty::Invalid);
        assert_eq!(q.to_string(), "????");
        assert_eq!(serde_json::to_string(&q).unwrap(), "\"????\"");
        assert_eq!(serde_json::to_string(&CountedQty::Value(4.5)).unwrap(), "4.5");
    }

    #[cfg(feature = "xlsx_export")]
    #[test]
    fn export_picks_the_next_free_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let store = seeded_store();
        let report = count_summary(
            store.connection(),
            day(),
            ReportVariation::All,
            &CountSummaryOptions::default(),
        )
        .unwrap();

        let first = export_summary_xlsx(&report, dir.path()).unwrap();
        let second = export_summary_xlsx(&report, dir.path()).unwrap();
        assert_eq!(first.file_name().unwrap(), "Count_Summary_2024-03-04_00.xlsx");
        assert_eq!(second.file_name().unwrap(), "Count_Summary_2024-03-04_01.xlsx");
        assert!(second.exists());
    }
}
