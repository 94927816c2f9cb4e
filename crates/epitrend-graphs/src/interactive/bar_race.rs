//! Animated monthly bar race.

use super::document::{Frame, PlotlyFigure};
use crate::palette::{get_colors, to_hex};
use crate::{ColorScheme, GraphRenderer};
use epitrend_common::{format_millions, Result, YearMonth};
use epitrend_data::ObservationTable;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// Milliseconds each month stays on screen while playing.
const FRAME_DURATION_MS: u64 = 500;
const TRANSITION_MS: u64 = 300;

/// Bars shown for one month, smallest first.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyFrame {
    /// The month.
    pub month: YearMonth,
    /// `(entity, monthly maximum)` in drawing order.
    pub bars: Vec<(String, f64)>,
}

/// Entities ranked per month, animated month by month.
#[derive(Debug, Clone)]
pub struct BarRace {
    /// Ranked column, e.g. `total_cases`.
    pub column: String,
    /// Bars per frame; `None` keeps every entity.
    pub limit: Option<usize>,
    /// Figure title.
    pub title: String,
}

impl BarRace {
    /// Default output file.
    pub const FILE_NAME: &'static str = "bar_race.html";

    /// Creates the race over `column` showing every entity each month.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            limit: None,
            title: "Monthly COVID-19 Total Cases: Top Countries".to_string(),
        }
    }

    /// Keeps only the `limit` largest bars of each month.
    #[must_use]
    pub const fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Monthly maximum per entity, ranked within each month.
    ///
    /// Rows without a date or a value are skipped. Months are chronological;
    /// equal values rank by entity name. With a limit set, only the largest
    /// bars of each month are kept.
    pub fn monthly_frames(&self, table: &ObservationTable) -> Result<Vec<MonthlyFrame>> {
        let slot = table.schema().require_numeric(&self.column)?;

        let mut monthly: BTreeMap<YearMonth, BTreeMap<&str, f64>> = BTreeMap::new();
        for row in table.rows() {
            let (Some(date), Some(value)) = (row.date, row.value(slot)) else {
                continue;
            };
            if value.is_nan() {
                continue;
            }
            monthly
                .entry(YearMonth::from(date))
                .or_default()
                .entry(row.entity.as_str())
                .and_modify(|max| *max = max.max(value))
                .or_insert(value);
        }

        Ok(monthly
            .into_iter()
            .map(|(month, maxima)| {
                let mut ranked: Vec<(String, f64)> = maxima
                    .into_iter()
                    .map(|(entity, value)| (entity.to_string(), value))
                    .collect();
                // stable: ties stay in name order
                ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
                if let Some(limit) = self.limit {
                    ranked.truncate(limit);
                }
                ranked.reverse();
                MonthlyFrame { month, bars: ranked }
            })
            .collect())
    }

    /// Builds the animated figure from prepared frames.
    pub fn figure_from_frames(&self, frames: &[MonthlyFrame]) -> PlotlyFigure {
        let entities: BTreeSet<&str> = frames
            .iter()
            .flat_map(|frame| frame.bars.iter().map(|(name, _)| name.as_str()))
            .collect();
        let colors = get_colors(&ColorScheme::Vibrant);
        let color_of = |name: &str| {
            let index = entities.iter().position(|e| *e == name).unwrap_or(0);
            to_hex(colors[index % colors.len()])
        };

        let bar_trace = |frame: &MonthlyFrame| {
            let names: Vec<&str> = frame.bars.iter().map(|(name, _)| name.as_str()).collect();
            let values: Vec<f64> = frame.bars.iter().map(|(_, value)| *value).collect();
            let labels: Vec<String> = values.iter().map(|v| format_millions(*v)).collect();
            let bar_colors: Vec<String> = names.iter().copied().map(&color_of).collect();
            json!({
                "type": "bar",
                "orientation": "h",
                "x": values,
                "y": names,
                "text": labels,
                "textposition": "outside",
                "marker": {"color": bar_colors},
                "hovertemplate": "%{y}: %{x:,.0f}<extra></extra>",
            })
        };

        let max = frames
            .iter()
            .flat_map(|frame| frame.bars.iter().map(|(_, value)| *value))
            .fold(0.0, f64::max);
        let x_end = if max > 0.0 { max * 1.15 } else { 1.0 };

        let plotly_frames: Vec<Frame> = frames
            .iter()
            .map(|frame| Frame {
                name: frame.month.to_string(),
                data: vec![bar_trace(frame)],
            })
            .collect();

        let steps: Vec<Value> = plotly_frames
            .iter()
            .map(|frame| {
                json!({
                    "label": frame.name,
                    "method": "animate",
                    "args": [[frame.name], {
                        "mode": "immediate",
                        "frame": {"duration": TRANSITION_MS, "redraw": true},
                        "transition": {"duration": 0},
                    }],
                })
            })
            .collect();

        let layout = json!({
            "title": {"text": self.title},
            "xaxis": {"title": {"text": "Total Cases"}, "range": [0.0, x_end], "autorange": false},
            "yaxis": {"title": {"text": "Country"}},
            "showlegend": false,
            "margin": {"l": 160},
            "updatemenus": [{
                "type": "buttons",
                "direction": "left",
                "showactive": false,
                "x": 0.1,
                "y": 0,
                "xanchor": "right",
                "yanchor": "top",
                "pad": {"r": 10, "t": 70},
                "buttons": [
                    {
                        "label": "Play",
                        "method": "animate",
                        "args": [null, {
                            "frame": {"duration": FRAME_DURATION_MS, "redraw": true},
                            "fromcurrent": true,
                            "transition": {"duration": TRANSITION_MS},
                        }],
                    },
                    {
                        "label": "Pause",
                        "method": "animate",
                        "args": [[null], {
                            "frame": {"duration": 0, "redraw": false},
                            "mode": "immediate",
                            "transition": {"duration": 0},
                        }],
                    },
                ],
            }],
            "sliders": [{
                "active": 0,
                "x": 0.1,
                "len": 0.9,
                "pad": {"t": 50},
                "currentvalue": {"prefix": "Month: "},
                "steps": steps,
            }],
        });

        let initial = frames.first().map(bar_trace).into_iter().collect();
        let mut figure = PlotlyFigure::new(initial, layout);
        figure.frames = plotly_frames;
        figure
    }
}

impl GraphRenderer for BarRace {
    type Data = ObservationTable;

    fn render(&self, table: &ObservationTable, path: &Path) -> Result<()> {
        let frames = self.monthly_frames(table)?;
        if frames.is_empty() {
            warn!("No dated '{}' values; bar race has no frames", self.column);
        } else {
            debug!("Bar race spans {} months", frames.len());
        }

        self.figure_from_frames(&frames).write_html(&self.title, self.description(), path)?;
        info!("Saved: {}", path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "bar race"
    }

    fn description(&self) -> &'static str {
        "Animated monthly ranking of entities by value"
    }

    fn file_name(&self) -> &'static str {
        Self::FILE_NAME
    }
}
