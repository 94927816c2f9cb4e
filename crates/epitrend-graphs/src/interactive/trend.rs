//! Interactive multi-series trend with a range slider.

use super::document::PlotlyFigure;
use crate::palette::{get_colors, to_hex};
use crate::{ColorScheme, GraphRenderer};
use epitrend_common::{format_date, Result};
use epitrend_data::ObservationTable;
use serde_json::{json, Value};
use std::path::Path;
use tracing::info;

/// Line per entity on a date axis, with range slider and unified hover.
#[derive(Debug, Clone)]
pub struct InteractiveTrend {
    /// Entities to draw, in legend order.
    pub entities: Vec<String>,
    /// Numeric column on the y axis.
    pub column: String,
    /// Figure title.
    pub title: String,
}

impl InteractiveTrend {
    /// Default output file.
    pub const FILE_NAME: &'static str = "cases_trend_interactive.html";

    /// Creates the figure for `column` (e.g. `new_cases_rolling_7d`).
    pub fn new(entities: Vec<String>, column: impl Into<String>) -> Self {
        Self {
            entities,
            column: column.into(),
            title: "COVID-19 Daily New Cases (7-Day Rolling Average, Interactive)".to_string(),
        }
    }

    /// Builds the Plotly figure.
    pub fn figure(&self, table: &ObservationTable) -> Result<PlotlyFigure> {
        let slot = table.schema().require_numeric(&self.column)?;
        let colors = get_colors(&ColorScheme::Default);

        let traces: Vec<Value> = self
            .entities
            .iter()
            .enumerate()
            .map(|(i, entity)| {
                let (x, y): (Vec<String>, Vec<Option<f64>>) = table
                    .rows()
                    .iter()
                    .filter(|row| &row.entity == entity)
                    .filter_map(|row| row.date.map(|date| (format_date(date), row.value(slot))))
                    .unzip();
                json!({
                    "type": "scatter",
                    "mode": "lines",
                    "name": entity,
                    "x": x,
                    "y": y,
                    "line": {"color": to_hex(colors[i % colors.len()]), "width": 2},
                    "hovertemplate": format!("{entity}: %{{y:,.0f}}<extra></extra>"),
                })
            })
            .collect();

        let layout = json!({
            "title": {"text": self.title},
            "xaxis": {
                "title": {"text": "Date"},
                "type": "date",
                "rangeslider": {"visible": true},
            },
            "yaxis": {"title": {"text": "New Cases (7-day avg)"}},
            "hovermode": "x unified",
            "legend": {"orientation": "h", "y": 1.05, "title": {"text": "Country"}},
            "plot_bgcolor": "#ffffff",
        });

        Ok(PlotlyFigure::new(traces, layout))
    }
}

impl GraphRenderer for InteractiveTrend {
    type Data = ObservationTable;

    fn render(&self, table: &ObservationTable, path: &Path) -> Result<()> {
        self.figure(table)?.write_html(&self.title, self.description(), path)?;
        info!("Saved: {}", path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "interactive trend"
    }

    fn description(&self) -> &'static str {
        "Zoomable trend lines with a range slider"
    }

    fn file_name(&self) -> &'static str {
        Self::FILE_NAME
    }
}
