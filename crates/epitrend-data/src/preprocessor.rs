//! Cleaning stage: entity filter, date parsing, ordering, gap filling and
//! de-duplication, plus the optional column transforms run after cleaning.

use crate::table::ObservationTable;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use epitrend_common::{format_count, EpiError, Result};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, info};

/// Date-only layouts tried in order.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y%m%d"];

/// Timestamp layouts whose date part is kept.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parses a date cell; `None` when no accepted layout matches.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|dt| dt.date())
        })
}

/// Cleans a freshly loaded table.
///
/// Rows without an entity are dropped, since they belong to no group.
/// When `allow_list` is non-empty only those entities are kept. Dates are
/// parsed leniently, rows are ordered by (entity, date) with undated rows
/// last, numeric gaps are filled per entity and exact duplicates removed.
pub fn clean(mut table: ObservationTable, allow_list: Option<&[String]>) -> ObservationTable {
    let before = table.len();
    table.rows_mut().retain(|row| !row.entity.trim().is_empty());
    let unnamed = before - table.len();
    if unnamed > 0 {
        debug!("Dropped {unnamed} rows without an entity");
    }

    if let Some(allowed) = allow_list.filter(|list| !list.is_empty()) {
        let allowed: HashSet<&str> = allowed.iter().map(String::as_str).collect();
        table
            .rows_mut()
            .retain(|row| allowed.contains(row.entity.as_str()));
        info!(
            "Filtered to {} entities ({} rows).",
            allowed.len(),
            format_count(table.len())
        );
    }

    let mut unparsed = 0usize;
    for row in table.rows_mut().iter_mut() {
        row.date = parse_date(&row.date_text);
        if row.date.is_none() {
            unparsed += 1;
        }
    }
    if unparsed > 0 {
        debug!("{unparsed} rows have an unparsable date and are kept undated");
    }

    table.rows_mut().sort_by(|a, b| {
        a.entity
            .cmp(&b.entity)
            .then_with(|| compare_dates(a.date, b.date))
    });

    fill_gaps(&mut table);

    let before = table.len();
    drop_duplicates(&mut table);
    let removed = before - table.len();
    if removed > 0 {
        debug!("Removed {removed} duplicate rows");
    }

    info!("Data cleaned: {} rows remain.", format_count(table.len()));
    table
}

/// Orders dates ascending with `None` after every present date.
pub fn compare_dates(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Forward fill, then backward fill within each entity, then zero.
fn fill_gaps(table: &mut ObservationTable) {
    let groups = table.entity_groups();
    let slots = table.schema().numeric_count();
    let rows = table.rows_mut();

    for group in &groups {
        for slot in 0..slots {
            let mut last = None;
            for &index in group {
                match rows[index].values[slot] {
                    Some(value) => last = Some(value),
                    None => rows[index].values[slot] = last,
                }
            }

            let mut next = None;
            for &index in group.iter().rev() {
                match rows[index].values[slot] {
                    Some(value) => next = Some(value),
                    None => rows[index].values[slot] = next,
                }
            }

            for &index in group {
                rows[index].values[slot].get_or_insert(0.0);
            }
        }
    }
}

/// Keeps the first of every set of identical rows.
fn drop_duplicates(table: &mut ObservationTable) {
    let keep: Vec<bool> = {
        let mut seen = HashSet::with_capacity(table.len());
        table
            .rows()
            .iter()
            .map(|row| seen.insert(row.duplicate_key()))
            .collect()
    };

    let mut keep = keep.into_iter();
    table
        .rows_mut()
        .retain(|_| keep.next().unwrap_or(true));
}

/// Appends `<column>_normalized` holding min-max scaled values in [0, 1].
///
/// A constant column scales to `0.0` everywhere.
pub fn normalize_column(table: &mut ObservationTable, column: &str) -> Result<String> {
    let values = table.numeric_column(column)?;
    let present = values.iter().flatten().copied();
    let (min, max) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    let normalized = if min.is_finite() && max.is_finite() && max == min {
        vec![Some(0.0); values.len()]
    } else {
        let range = max - min;
        values
            .iter()
            .map(|value| value.map(|v| (v - min) / range))
            .collect()
    };

    let name = format!("{column}_normalized");
    table.set_numeric_column(&name, normalized)?;
    debug!("Normalized column '{column}' into '{name}'");
    Ok(name)
}

/// Appends the flag column `<column>_outlier`, true where |z| exceeds `z_threshold`.
///
/// Uses the sample standard deviation; when it is zero or undefined no row
/// is flagged.
pub fn flag_outliers(table: &mut ObservationTable, column: &str, z_threshold: f64) -> Result<String> {
    if !z_threshold.is_finite() || z_threshold <= 0.0 {
        return Err(EpiError::validation_field(
            format!("z threshold must be a positive number, got {z_threshold}"),
            "outlier_z_threshold",
        ));
    }

    let values = table.numeric_column(column)?;
    let present: Vec<f64> = values.iter().flatten().copied().collect();

    let flags = match sample_mean_std(&present) {
        Some((mean, std)) if std > 0.0 && std.is_finite() => values
            .iter()
            .map(|value| value.is_some_and(|v| ((v - mean) / std).abs() > z_threshold))
            .collect(),
        _ => vec![false; values.len()],
    };

    let flagged = flags.iter().filter(|flag| **flag).count();
    let name = format!("{column}_outlier");
    table.set_flag_column(&name, flags)?;
    info!("Flagged {flagged} outliers in '{column}'");
    Ok(name)
}

#[allow(clippy::cast_precision_loss)]
fn sample_mean_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some((mean, variance.sqrt()))
}
