//! Reads delimited or JSON files (or a remote CSV) into an [`ObservationTable`].

use crate::schema::{ColumnKind, SourceColumns, TableSchema};
use crate::table::{Observation, ObservationTable};
use epitrend_common::{EpiError, Result, SourceFormat};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Cell contents treated as missing values.
pub const MISSING_MARKERS: [&str; 8] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Untyped cells as read from the source, before column kinds are decided.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct RawTable {
    headers: Vec<String>,
    records: Vec<Vec<Option<String>>>,
}

/// Loads `path` in the given format; `Auto` picks the format from the extension.
pub fn load(path: impl AsRef<Path>, format: SourceFormat, columns: &SourceColumns) -> Result<ObservationTable> {
    let path = path.as_ref();
    match format.resolve(path) {
        SourceFormat::Json => load_json(path, columns),
        SourceFormat::Csv | SourceFormat::Auto => load_csv(path, columns),
    }
}

/// Loads a comma-separated file with a header row.
///
/// A missing file is reported as [`EpiError::MissingSource`].
pub fn load_csv(path: impl AsRef<Path>, columns: &SourceColumns) -> Result<ObservationTable> {
    let path = path.as_ref();
    let file = open_source(path)?;
    let table = build_table(read_csv(file)?, columns)?;
    let (rows, cols) = table.shape();
    info!("Loaded CSV: {} ({rows} rows, {cols} columns)", path.display());
    Ok(table)
}

/// Loads a JSON array of records.
///
/// A missing file is reported as [`EpiError::MissingSource`].
pub fn load_json(path: impl AsRef<Path>, columns: &SourceColumns) -> Result<ObservationTable> {
    let path = path.as_ref();
    let file = open_source(path)?;
    let table = build_table(read_json(io::BufReader::new(file))?, columns)?;
    let (rows, cols) = table.shape();
    info!("Loaded JSON: {} ({rows} rows, {cols} columns)", path.display());
    Ok(table)
}

/// Downloads a CSV over plain HTTP GET and parses it like [`load_csv`].
pub fn fetch_remote(url: &str, timeout: Duration, columns: &SourceColumns) -> Result<ObservationTable> {
    info!("Fetching data from: {url}");

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| EpiError::network_with_source("failed to build HTTP client", e))?;
    let response = client
        .get(url)
        .send()
        .map_err(|e| EpiError::network_with_source(format!("GET {url} failed"), e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(EpiError::network_with_status(
            format!("GET {url} returned {status}"),
            status.as_u16(),
        ));
    }

    let body = response
        .bytes()
        .map_err(|e| EpiError::network_with_source(format!("failed to read body of {url}"), e))?;
    debug!("Downloaded {} bytes", body.len());

    let table = build_table(read_csv(body.as_ref())?, columns)?;
    info!("Downloaded {} rows.", epitrend_common::format_count(table.len()));
    Ok(table)
}

/// Parses CSV text already held in memory.
pub fn parse_csv_str(text: &str, columns: &SourceColumns) -> Result<ObservationTable> {
    build_table(read_csv(text.as_bytes())?, columns)
}

/// Parses JSON records already held in memory.
pub fn parse_json_str(text: &str, columns: &SourceColumns) -> Result<ObservationTable> {
    build_table(read_json(text.as_bytes())?, columns)
}

fn open_source(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => EpiError::missing_source(path),
        _ => EpiError::Io(e),
    })
}

fn read_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| EpiError::data_with_source("failed to read CSV header", e))?
        .iter()
        .map(ToString::to_string)
        .collect();

    let mut records = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| EpiError::data_with_source(format!("malformed CSV record {}", line + 1), e))?;
        records.push(record.iter().map(normalize_cell).collect());
    }

    Ok(RawTable { headers, records })
}

fn read_json<R: Read>(reader: R) -> Result<RawTable> {
    let value: Value = serde_json::from_reader(reader)?;
    let Value::Array(items) = value else {
        return Err(EpiError::data("JSON source must be an array of records"));
    };

    let objects = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(map),
            _ => Err(EpiError::data(format!("JSON record {index} is not an object"))),
        })
        .collect::<Result<Vec<Map<String, Value>>>>()?;

    let mut headers: Vec<String> = Vec::new();
    for object in &objects {
        for key in object.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let records = objects
        .iter()
        .map(|object| {
            headers
                .iter()
                .map(|header| object.get(header).and_then(json_cell))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, records })
}

fn json_cell(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => normalize_cell(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        other => Some(other.to_string()),
    }
}

fn normalize_cell(cell: &str) -> Option<String> {
    let cell = cell.trim();
    if MISSING_MARKERS.contains(&cell) {
        None
    } else {
        Some(cell.to_string())
    }
}

fn is_numeric(raw: &RawTable, index: usize) -> bool {
    raw.records
        .iter()
        .filter_map(|record| record[index].as_deref())
        .all(|cell| cell.parse::<f64>().is_ok())
}

/// Decides the kind of every column and converts the raw cells.
fn build_table(raw: RawTable, columns: &SourceColumns) -> Result<ObservationTable> {
    let mut schema = TableSchema::new(columns.clone());
    let mut kinds = Vec::with_capacity(raw.headers.len());
    for (index, header) in raw.headers.iter().enumerate() {
        let kind = if *header == columns.entity {
            ColumnKind::Entity
        } else if *header == columns.date {
            ColumnKind::Date
        } else if is_numeric(&raw, index) {
            ColumnKind::Numeric
        } else {
            ColumnKind::Text
        };
        schema.push_column(header.clone(), kind)?;
        kinds.push(kind);
    }
    schema.validate()?;

    let rows = raw
        .records
        .into_iter()
        .map(|record| {
            let mut row = Observation {
                entity: String::new(),
                date_text: String::new(),
                date: None,
                text: Vec::with_capacity(schema.text_count()),
                values: Vec::with_capacity(schema.numeric_count()),
                flags: Vec::new(),
            };
            for (kind, cell) in kinds.iter().zip(record) {
                match kind {
                    ColumnKind::Entity => row.entity = cell.unwrap_or_default(),
                    ColumnKind::Date => row.date_text = cell.unwrap_or_default(),
                    ColumnKind::Numeric => row.values.push(cell.and_then(|c| c.parse().ok())),
                    ColumnKind::Text => row.text.push(cell),
                    ColumnKind::Flag => {}
                }
            }
            row
        })
        .collect();

    ObservationTable::new(schema, rows)
}
