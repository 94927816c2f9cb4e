//! Interactive scatter of the latest observation per entity.

use super::document::PlotlyFigure;
use crate::palette::{get_colors, to_hex};
use crate::{ColorScheme, GraphRenderer};
use epitrend_common::{format_date, Result};
use epitrend_data::{compare_dates, Observation, ObservationTable};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Largest marker diameter in pixels when sizing by population.
const MAX_MARKER_SIZE: f64 = 20.0;

/// One marker of the scatter.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    /// Entity name.
    pub entity: String,
    /// Date of the observation, if known.
    pub date: Option<chrono::NaiveDate>,
    /// Horizontal value.
    pub x: f64,
    /// Vertical value.
    pub y: f64,
    /// Marker size driver, when a population column exists.
    pub size: Option<f64>,
}

/// Scatter of `x_column` against `y_column` at each entity's latest row.
#[derive(Debug, Clone)]
pub struct InteractiveScatter {
    /// Horizontal column, e.g. `vaccination_pct`.
    pub x_column: String,
    /// Vertical column, e.g. `new_deaths`.
    pub y_column: String,
    /// Column sizing the markers when present.
    pub size_column: String,
    /// Figure title.
    pub title: String,
}

impl InteractiveScatter {
    /// Default output file.
    pub const FILE_NAME: &'static str = "scatter_interactive.html";

    /// Creates the scatter; markers are sized by `population` when it exists.
    pub fn new(x_column: impl Into<String>, y_column: impl Into<String>) -> Self {
        Self {
            x_column: x_column.into(),
            y_column: y_column.into(),
            size_column: "population".to_string(),
            title: "Vaccination Coverage vs. New Deaths (Latest Date)".to_string(),
        }
    }

    /// Last row per entity after ordering rows by date, kept when both
    /// coordinates are present. Ordered by entity.
    ///
    /// Undated rows order after every dated row, so an entity that has an
    /// undated row is represented by it.
    pub fn latest_points(&self, table: &ObservationTable) -> Result<Vec<ScatterPoint>> {
        let schema = table.schema();
        let x_slot = schema.require_numeric(&self.x_column)?;
        let y_slot = schema.require_numeric(&self.y_column)?;
        let size_slot = schema.numeric_index(&self.size_column);

        let mut ordered: Vec<&Observation> = table.rows().iter().collect();
        ordered.sort_by(|a, b| compare_dates(a.date, b.date));

        let mut latest: BTreeMap<&str, &Observation> = BTreeMap::new();
        for row in ordered {
            latest.insert(row.entity.as_str(), row);
        }

        Ok(latest
            .into_values()
            .filter_map(|row| {
                Some(ScatterPoint {
                    entity: row.entity.clone(),
                    date: row.date,
                    x: row.value(x_slot).filter(|v| !v.is_nan())?,
                    y: row.value(y_slot).filter(|v| !v.is_nan())?,
                    size: size_slot.and_then(|slot| row.value(slot)),
                })
            })
            .collect())
    }

    /// Builds the Plotly figure, one trace per entity.
    pub fn figure(&self, table: &ObservationTable) -> Result<PlotlyFigure> {
        let points = self.latest_points(table)?;
        let colors = get_colors(&ColorScheme::Default);
        let sized = table.schema().numeric_index(&self.size_column).is_some();
        let max_size = points
            .iter()
            .filter_map(|p| p.size)
            .fold(0.0, f64::max);
        // area sizing: the largest value maps to MAX_MARKER_SIZE
        let size_ref = if max_size > 0.0 {
            2.0 * max_size / (MAX_MARKER_SIZE * MAX_MARKER_SIZE)
        } else {
            1.0
        };

        let traces: Vec<Value> = points
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let mut marker = json!({"color": to_hex(colors[i % colors.len()])});
                if sized {
                    marker["size"] = json!([point.size.unwrap_or(0.0)]);
                    marker["sizemode"] = json!("area");
                    marker["sizeref"] = json!(size_ref);
                    marker["sizemin"] = json!(4);
                }
                json!({
                    "type": "scatter",
                    "mode": "markers",
                    "name": point.entity,
                    "x": [point.x],
                    "y": [point.y],
                    "text": [point.entity],
                    "customdata": [point.date.map(format_date)],
                    "marker": marker,
                    "hovertemplate": format!(
                        "<b>%{{text}}</b><br>{}: %{{x:.1f}}<br>{}: %{{y:,.0f}}<br>%{{customdata}}<extra></extra>",
                        self.x_column, self.y_column
                    ),
                })
            })
            .collect();

        let layout = json!({
            "title": {"text": self.title},
            "xaxis": {"title": {"text": "Population Vaccinated (%)"}},
            "yaxis": {"title": {"text": "New Deaths"}},
            "hovermode": "closest",
            "legend": {"title": {"text": "Country"}},
            "plot_bgcolor": "#ffffff",
        });

        Ok(PlotlyFigure::new(traces, layout))
    }
}

impl GraphRenderer for InteractiveScatter {
    type Data = ObservationTable;

    fn render(&self, table: &ObservationTable, path: &Path) -> Result<()> {
        self.figure(table)?.write_html(&self.title, self.description(), path)?;
        info!("Saved: {}", path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "interactive scatter"
    }

    fn description(&self) -> &'static str {
        "Latest value per entity, sized by population"
    }

    fn file_name(&self) -> &'static str {
        Self::FILE_NAME
    }
}
