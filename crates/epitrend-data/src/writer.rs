//! Snapshot output of the cleaned table.

use crate::schema::ColumnKind;
use crate::table::ObservationTable;
use epitrend_common::{format_date, EpiError, Result};
use std::path::Path;
use tracing::info;

/// Writes every column, in schema order, as CSV.
///
/// Missing numeric cells and undated rows are written as empty fields. The
/// parent directory must already exist.
pub fn write_snapshot(table: &ObservationTable, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| EpiError::data_with_source(format!("cannot create {}", path.display()), e))?;

    let columns = table.schema().columns();
    writer
        .write_record(columns.iter().map(|column| column.name.as_str()))
        .map_err(write_error)?;

    for row in table.rows() {
        let record = columns.iter().map(|column| match column.kind {
            ColumnKind::Entity => row.entity.clone(),
            ColumnKind::Date => row.date.map(format_date).unwrap_or_default(),
            ColumnKind::Numeric => row.value(column.slot).map(|v| v.to_string()).unwrap_or_default(),
            ColumnKind::Text => row.text[column.slot].clone().unwrap_or_default(),
            ColumnKind::Flag => row.flags[column.slot].to_string(),
        });
        writer.write_record(record).map_err(write_error)?;
    }

    writer.flush()?;
    info!("Cleaned data saved to {}", path.display());
    Ok(())
}

fn write_error(err: csv::Error) -> EpiError {
    EpiError::data_with_source("failed to write snapshot record", err)
}
