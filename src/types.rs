//! Core data model types for spreadsheet ingestion.
//!
//! Imports read a sheet into an in-memory [`DataSet`] using a [`Schema`]: a list of logical
//! [`Field`]s, each accepting one or more header names. Cells are kept raw and coerced per
//! field by the importer, so one bad cell becomes a row-level error instead of aborting the
//! whole sheet.

use std::fmt;

use chrono::{Days, NaiveDate};

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
    /// Calendar date (Excel date cells, 1900-system serials, or text dates).
    Date,
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Logical field name (usually the target column name).
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
    /// Header cell texts that map to this field. Compared after trimming.
    pub headers: Vec<String>,
    /// Whether the header must be present for the sheet to be accepted.
    pub required: bool,
}

impl Field {
    /// Create a new optional field whose only accepted header is its name.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        let name = name.into();
        Self {
            headers: vec![name.clone()],
            name,
            data_type,
            required: false,
        }
    }

    /// Replace the accepted header names.
    pub fn with_headers(mut self, headers: &[&str]) -> Self {
        self.headers = headers.iter().map(|h| h.to_string()).collect();
        self
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Returns `true` if `header` (trimmed) is one of this field's header names.
    pub fn matches_header(&self, header: &str) -> bool {
        let header = header.trim();
        !header.is_empty() && self.headers.iter().any(|h| h.trim() == header)
    }
}

/// What to do when two header cells map to the same field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateHeaders {
    /// The right-most matching column is used.
    #[default]
    LastWins,
    /// The sheet is rejected.
    Reject,
}

/// A list of fields describing the expected shape of an incoming sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
    /// Duplicate header policy.
    pub duplicates: DuplicateHeaders,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            duplicates: DuplicateHeaders::default(),
        }
    }

    /// Set the duplicate header policy.
    pub fn with_duplicates(mut self, duplicates: DuplicateHeaders) -> Self {
        self.duplicates = duplicates;
        self
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns the index of the field a header cell maps to, if any.
    pub fn field_for_header(&self, header: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.matches_header(header))
    }

    /// Names of all required fields, in schema order.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
    }
}

/// A single raw cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Calendar date.
    Date(NaiveDate),
}

static NULL_VALUE: Value = Value::Null;

impl Value {
    /// `true` only for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `true` for null and whitespace-only strings.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Utf8(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Spreadsheet-style truthiness: zero, empty, null and text such as `0` or `no` are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Int64(i) => *i != 0,
            Value::Float64(f) => *f != 0.0,
            Value::Bool(b) => *b,
            Value::Utf8(s) => parse_bool_str(s).unwrap_or(true),
            Value::Date(_) => true,
        }
    }

    /// Coerce into `data_type`. `Null` stays `Null`.
    ///
    /// The error is a short human-readable reason; callers attach row and column.
    pub fn coerce(&self, data_type: DataType) -> Result<Value, String> {
        if self.is_null() {
            return Ok(Value::Null);
        }
        match data_type {
            DataType::Utf8 => Ok(Value::Utf8(self.to_string())),
            DataType::Int64 => self.coerce_i64().map(Value::Int64),
            DataType::Float64 => self.coerce_f64().map(Value::Float64),
            DataType::Bool => self.coerce_bool().map(Value::Bool),
            DataType::Date => self.coerce_date().map(Value::Date),
        }
    }

    fn coerce_i64(&self) -> Result<i64, String> {
        match self {
            Value::Int64(i) => Ok(*i),
            Value::Float64(f) if f.fract() == 0.0 => Ok(*f as i64),
            Value::Float64(_) => Err("expected integer (got non-integer number)".to_string()),
            Value::Bool(b) => Ok(i64::from(*b)),
            Value::Utf8(s) => s.trim().parse::<i64>().map_err(|e| e.to_string()),
            _ => Err("expected integer".to_string()),
        }
    }

    fn coerce_f64(&self) -> Result<f64, String> {
        match self {
            Value::Float64(f) => Ok(*f),
            Value::Int64(i) => Ok(*i as f64),
            Value::Utf8(s) => s.trim().parse::<f64>().map_err(|e| e.to_string()),
            _ => Err("expected number".to_string()),
        }
    }

    fn coerce_bool(&self) -> Result<bool, String> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Int64(i) => Ok(*i != 0),
            Value::Float64(f) => Ok(*f != 0.0),
            Value::Utf8(s) => parse_bool_str(s),
            _ => Err("expected bool".to_string()),
        }
    }

    fn coerce_date(&self) -> Result<NaiveDate, String> {
        match self {
            Value::Date(d) => Ok(*d),
            Value::Int64(i) => {
                excel_serial_to_date(*i as f64).ok_or_else(|| "date serial out of range".to_string())
            }
            Value::Float64(f) => {
                excel_serial_to_date(*f).ok_or_else(|| "date serial out of range".to_string())
            }
            Value::Utf8(s) => parse_date_str(s),
            Value::Bool(_) | Value::Null => Err("expected date".to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int64(i) => write!(f, "{i}"),
            Value::Float64(v) => {
                if v.fract() == 0.0 && v.abs() < 1e15 {
                    write!(f, "{}", *v as i64)
                } else {
                    write!(f, "{v}")
                }
            }
            Value::Bool(b) => write!(f, "{b}"),
            Value::Utf8(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

fn parse_bool_str(s: &str) -> Result<bool, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | "x" => Ok(true),
        "false" | "f" | "0" | "no" | "n" | "" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%Y/%m/%d", "%d-%b-%Y", "%Y%m%d"];

fn parse_date_str(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    // Accept "2024-03-01 00:00:00" style timestamps by dropping the time part.
    let date_part = s.split([' ', 'T']).next().unwrap_or(s);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .ok_or_else(|| format!("unrecognized date '{s}'"))
}

/// Convert a 1900-system Excel serial into a calendar date.
///
/// Serials below 60 are shifted by one day to undo the phantom 1900-02-29.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let mut days = serial.floor() as u64;
    if days < 60 {
        days += 1;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(days))
}

/// One data row from a sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 1-based sheet row number (Excel-like; the header is usually row 1).
    pub row: usize,
    /// Values in schema field order. Fields whose header is absent hold [`Value::Null`].
    pub values: Vec<Value>,
}

/// In-memory sheet contents projected onto a [`Schema`].
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// For each schema field, whether its header was found.
    pub present: Vec<bool>,
    /// Data rows, in sheet order.
    pub rows: Vec<Record>,
}

impl DataSet {
    /// Create a dataset from schema, header presence and rows.
    pub fn new(schema: Schema, present: Vec<bool>, rows: Vec<Record>) -> Self {
        Self {
            schema,
            present,
            rows,
        }
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the sheet had a header for `name`.
    pub fn has_column(&self, name: &str) -> bool {
        self.schema
            .index_of(name)
            .and_then(|idx| self.present.get(idx).copied())
            .unwrap_or(false)
    }

    /// Value of field `name` in `record`, or `Null` if the field is unknown.
    pub fn get<'a>(&self, record: &'a Record, name: &str) -> &'a Value {
        self.schema
            .index_of(name)
            .and_then(|idx| record.values.get(idx))
            .unwrap_or(&NULL_VALUE)
    }
}
