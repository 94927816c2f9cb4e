//! Derived metrics over a cleaned table.

use crate::table::ObservationTable;
use chrono::NaiveDate;
use epitrend_common::{EpiError, Result};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, info, warn};

/// Name of the column appended by [`coverage_ratio`].
pub const COVERAGE_COLUMN: &str = "vaccination_pct";

/// Number of numeric columns used when none of the preferred columns exist.
pub const DEFAULT_FALLBACK_LIMIT: usize = 8;

/// Name of the column appended by [`rolling_average`].
pub fn rolling_column_name(column: &str, window: usize) -> String {
    format!("{column}_rolling_{window}d")
}

/// Appends the per-entity trailing mean of `column` over `window` rows.
///
/// Missing cells inside a window are skipped; a window without any value
/// yields a missing cell. Returns the new column name.
pub fn rolling_average(table: &mut ObservationTable, column: &str, window: usize) -> Result<String> {
    if window == 0 {
        return Err(EpiError::validation_field(
            "rolling window must be at least 1",
            "rolling_window",
        ));
    }

    let values = table.numeric_column(column)?;
    let mut averaged = vec![None; values.len()];

    for group in table.entity_groups() {
        let mut recent: VecDeque<Option<f64>> = VecDeque::with_capacity(window);
        for index in group {
            if recent.len() == window {
                recent.pop_front();
            }
            recent.push_back(values[index]);
            averaged[index] = mean(recent.iter().flatten().copied());
        }
    }

    let name = rolling_column_name(column, window);
    table.set_numeric_column(&name, averaged)?;
    info!("Rolling average computed for '{column}'.");
    Ok(name)
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Appends [`COVERAGE_COLUMN`], `vaccinated / population * 100` clipped to [0, 100].
///
/// When either source column is absent the new column is entirely missing
/// and a warning is logged.
pub fn coverage_ratio(table: &mut ObservationTable, vaccinated: &str, population: &str) -> Result<String> {
    let schema = table.schema();
    let ratios = match (schema.numeric_index(vaccinated), schema.numeric_index(population)) {
        (Some(vax), Some(pop)) => table
            .rows()
            .iter()
            .map(|row| match (row.value(vax), row.value(pop)) {
                (Some(v), Some(p)) => percentage(v, p),
                _ => None,
            })
            .collect(),
        _ => {
            warn!("Vaccination or population column missing; '{COVERAGE_COLUMN}' left empty.");
            vec![None; table.len()]
        }
    };

    table.set_numeric_column(COVERAGE_COLUMN, ratios)?;
    info!("Vaccination rate calculated.");
    Ok(COVERAGE_COLUMN.to_string())
}

fn percentage(vaccinated: f64, population: f64) -> Option<f64> {
    let pct = vaccinated / population * 100.0;
    (!pct.is_nan()).then(|| pct.clamp(0.0, 100.0))
}

/// Square matrix of pairwise Pearson coefficients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    /// Column names, in row/column order.
    pub columns: Vec<String>,
    /// Row-major coefficients; `NaN` where undefined.
    pub values: Vec<f64>,
}

impl CorrelationMatrix {
    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the matrix is empty.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Coefficient at (`row`, `col`).
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        (row < self.len() && col < self.len()).then(|| self.values[row * self.len() + col])
    }

    /// Whether `m[i][j] == m[j][i]` everywhere, treating `NaN` as equal to `NaN`.
    pub fn is_symmetric(&self) -> bool {
        let n = self.len();
        (0..n).all(|i| {
            (0..n).all(|j| {
                let (a, b) = (self.values[i * n + j], self.values[j * n + i]);
                a == b || (a.is_nan() && b.is_nan())
            })
        })
    }
}

/// Pearson correlation among the selected numeric columns.
///
/// Uses the `preferred` columns that exist (in that order); when none do,
/// the first `fallback_limit` numeric columns of the table.
pub fn correlation_matrix(
    table: &ObservationTable,
    preferred: &[String],
    fallback_limit: usize,
) -> Result<CorrelationMatrix> {
    let schema = table.schema();
    let mut columns: Vec<String> = preferred
        .iter()
        .filter(|name| schema.numeric_index(name).is_some())
        .cloned()
        .collect();
    if columns.is_empty() {
        columns = schema
            .numeric_columns()
            .take(fallback_limit)
            .map(ToString::to_string)
            .collect();
        debug!("No preferred correlation columns present; using {columns:?}");
    }

    let series = columns
        .iter()
        .map(|name| table.numeric_column(name))
        .collect::<Result<Vec<_>>>()?;

    let n = columns.len();
    let mut values = vec![f64::NAN; n * n];
    for i in 0..n {
        for j in i..n {
            let mut r = pearson(&series[i], &series[j]);
            if i == j && !r.is_nan() {
                r = 1.0;
            }
            values[i * n + j] = r;
            values[j * n + i] = r;
        }
    }

    info!("Correlation matrix computed over {n} columns.");
    Ok(CorrelationMatrix { columns, values })
}

/// Pearson coefficient over rows where both cells are present.
#[allow(clippy::cast_precision_loss)]
fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

/// Maximum of a column for one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakRecord {
    /// Entity name.
    pub entity: String,
    /// Date of the first occurrence of the maximum.
    pub date_of_peak: Option<NaiveDate>,
    /// The maximum; `None` when the entity has no values.
    pub peak_value: Option<f64>,
}

/// One [`PeakRecord`] per entity, ordered by entity name.
pub fn find_peaks(table: &ObservationTable, column: &str) -> Result<Vec<PeakRecord>> {
    let slot = table.schema().require_numeric(column)?;
    let mut peaks: BTreeMap<&str, PeakRecord> = BTreeMap::new();

    for row in table.rows() {
        let record = peaks.entry(row.entity.as_str()).or_insert_with(|| PeakRecord {
            entity: row.entity.clone(),
            date_of_peak: None,
            peak_value: None,
        });
        if let Some(value) = row.value(slot).filter(|v| !v.is_nan()) {
            if record.peak_value.map_or(true, |peak| value > peak) {
                record.peak_value = Some(value);
                record.date_of_peak = row.date;
            }
        }
    }

    info!("Peaks found for {} entities.", peaks.len());
    Ok(peaks.into_values().collect())
}
