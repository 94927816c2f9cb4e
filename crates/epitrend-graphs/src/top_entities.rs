//! Top entities horizontal bar chart implementation

use crate::palette::blues_gradient;
use crate::utils::{category_range, chart_builder, top_entities_by_max};
use crate::{draw_error, DrawResult, GraphConfig, GraphRenderer};
use epitrend_common::{format_millions, truncate_string, Result};
use epitrend_data::ObservationTable;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use tracing::{info, warn};

/// Horizontal bars of the entities with the largest maximum of a column.
#[derive(Debug, Clone)]
pub struct TopEntitiesChart {
    /// Number of bars.
    pub limit: usize,
    /// Ranked column, e.g. `total_cases`.
    pub column: String,
    /// Chart configuration.
    pub config: GraphConfig,
}

impl TopEntitiesChart {
    /// Default output file.
    pub const FILE_NAME: &'static str = "top_countries.png";

    /// Creates the chart for the top `limit` entities by `column`.
    pub fn new(limit: usize, column: impl Into<String>) -> Self {
        let mut config = GraphConfig::titled(
            &format!("Top {limit} Countries by Total COVID-19 Cases"),
            Some("Total Cases"),
            None,
        )
        .with_size(1500, 900);
        config.style.margins.y_label_area = 260;

        Self {
            limit,
            column: column.into(),
            config,
        }
    }

    /// Replaces the chart configuration.
    #[must_use]
    pub fn with_config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    /// Bars in drawing order, smallest first so the largest ends up on top.
    pub fn bars(&self, table: &ObservationTable) -> Result<Vec<(String, f64)>> {
        let mut ranked = top_entities_by_max(table, &self.column, self.limit)?;
        ranked.reverse();
        Ok(ranked)
    }

    /// Draws the bars onto `root` without presenting it.
    pub fn draw_on<DB>(&self, root: &DrawingArea<DB, Shift>, bars: &[(String, f64)]) -> DrawResult<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let config = &self.config;
        let style = &config.style;
        let to_i32 = |v: usize| i32::try_from(v).unwrap_or(i32::MAX);
        let max = bars.iter().map(|(_, v)| *v).fold(0.0, f64::max);
        let x_end = if max > 0.0 { max * 1.05 } else { 1.0 };

        let label_font = (style.label_font.family.as_str(), style.label_font.size);
        let mut chart = chart_builder(root, config)?
            .build_cartesian_2d(0.0..x_end, category_range(bars.len()).into_segmented())?;

        let entity_name = |value: &SegmentValue<i32>| match value {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => usize::try_from(*i)
                .ok()
                .and_then(|i| bars.get(i))
                .map(|(name, _)| truncate_string(name, 24))
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        };
        let millions = |x: &f64| format_millions(*x);

        let mut mesh = chart.configure_mesh();
        mesh.disable_y_mesh()
            .y_labels(bars.len())
            .y_label_formatter(&entity_name)
            .x_label_formatter(&millions)
            .x_label_style(label_font)
            .y_label_style(label_font)
            .light_line_style(&RGBColor(235, 235, 235));
        if !style.hide_text {
            mesh.x_desc(config.x_label.as_deref().unwrap_or(""));
        }
        mesh.draw()?;

        let colors = blues_gradient(bars.len());
        chart.draw_series(bars.iter().zip(&colors).enumerate().map(|(i, ((_, value), color))| {
            let y = to_i32(i);
            let mut bar = Rectangle::new(
                [(0.0, SegmentValue::Exact(y)), (*value, SegmentValue::Exact(y + 1))],
                color.filled(),
            );
            bar.set_margin(6, 6, 0, 0);
            bar
        }))?;
        Ok(())
    }

    fn draw(&self, bars: &[(String, f64)], path: &Path) -> DrawResult<()> {
        let root = BitMapBackend::new(path, (self.config.width, self.config.height)).into_drawing_area();
        self.draw_on(&root, bars)?;
        root.present()?;
        Ok(())
    }
}

impl GraphRenderer for TopEntitiesChart {
    type Data = ObservationTable;

    fn render(&self, table: &ObservationTable, path: &Path) -> Result<()> {
        let bars = self.bars(table)?;
        if bars.is_empty() {
            warn!("No '{}' values to rank; drawing an empty chart", self.column);
        }

        self.draw(&bars, path)
            .map_err(draw_error(self.name(), path))?;
        info!("Saved: {}", path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "top entities chart"
    }

    fn description(&self) -> &'static str {
        "Horizontal bars of the top entities by maximum value"
    }

    fn file_name(&self) -> &'static str {
        Self::FILE_NAME
    }
}
