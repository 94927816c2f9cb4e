//! Lower-triangle correlation heatmap.

use crate::palette::{diverging_color, needs_light_text};
use crate::utils::{category_range, chart_builder};
use crate::{draw_error, DrawResult, GraphConfig, GraphRenderer};
use epitrend_common::{EpiError, Result};
use epitrend_data::CorrelationMatrix;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use tracing::info;

/// One visible cell of the heatmap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatmapCell {
    /// Matrix row, drawn top to bottom.
    pub row: usize,
    /// Matrix column, drawn left to right.
    pub col: usize,
    /// Correlation coefficient.
    pub value: f64,
}

/// Cells strictly below the diagonal; the diagonal and upper triangle are masked.
pub fn lower_triangle_cells(matrix: &CorrelationMatrix) -> Vec<HeatmapCell> {
    let n = matrix.len();
    (0..n)
        .flat_map(|row| (0..row).map(move |col| (row, col)))
        .filter_map(|(row, col)| {
            matrix
                .get(row, col)
                .map(|value| HeatmapCell { row, col, value })
        })
        .collect()
}

/// Annotation text of a cell, two decimals.
pub fn cell_label(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{value:.2}")
    }
}

/// Correlation heatmap on a diverging scale over [-1, 1].
#[derive(Debug, Clone)]
pub struct CorrelationHeatmap {
    /// Chart configuration.
    pub config: GraphConfig,
}

impl Default for CorrelationHeatmap {
    fn default() -> Self {
        Self::new()
    }
}

impl CorrelationHeatmap {
    /// Default output file.
    pub const FILE_NAME: &'static str = "heatmap.png";

    /// Creates the heatmap with its default title and a square-ish canvas.
    pub fn new() -> Self {
        let mut config = GraphConfig::titled("Feature Correlation Matrix", None, None).with_size(1500, 1200);
        config.style.margins.x_label_area = 160;
        config.style.margins.y_label_area = 220;
        Self { config }
    }

    /// Replaces the chart configuration.
    #[must_use]
    pub fn with_config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    /// Draws the heatmap onto `root` without presenting it.
    pub fn draw_on<DB>(&self, root: &DrawingArea<DB, Shift>, matrix: &CorrelationMatrix) -> DrawResult<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let config = &self.config;
        let style = &config.style;
        let n = matrix.len();
        let names = &matrix.columns;
        let to_i32 = |v: usize| i32::try_from(v).unwrap_or(i32::MAX);
        let from_i32 = |v: i32| usize::try_from(v).ok();

        let label_font = (style.label_font.family.as_str(), style.label_font.size);
        let mut chart = chart_builder(root, config)?.build_cartesian_2d(
            category_range(n).into_segmented(),
            category_range(n).into_segmented(),
        )?;

        // row 0 is drawn at the top
        let column_name = |value: &SegmentValue<i32>| match value {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => from_i32(*i)
                .and_then(|i| names.get(i))
                .cloned()
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        };
        let row_name = |value: &SegmentValue<i32>| match value {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => from_i32(*i)
                .and_then(|i| n.checked_sub(i + 1))
                .and_then(|i| names.get(i))
                .cloned()
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        };

        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(n)
            .y_labels(n)
            .x_label_formatter(&column_name)
            .y_label_formatter(&row_name)
            .x_label_style(label_font)
            .y_label_style(label_font)
            .draw()?;

        let cells = lower_triangle_cells(matrix);
        chart.draw_series(cells.iter().filter(|c| !c.value.is_nan()).map(|cell| {
            let x = to_i32(cell.col);
            let y = to_i32(n - 1 - cell.row);
            Rectangle::new(
                [
                    (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                    (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
                ],
                diverging_color(cell.value).filled(),
            )
        }))?;

        if style.hide_text {
            return Ok(());
        }
        let centered = Pos::new(HPos::Center, VPos::Center);
        chart.draw_series(cells.iter().filter(|c| !c.value.is_nan()).map(|cell| {
            let fill = diverging_color(cell.value);
            let text_color = if needs_light_text(fill) { WHITE } else { BLACK };
            Text::new(
                cell_label(cell.value),
                (
                    SegmentValue::CenterOf(to_i32(cell.col)),
                    SegmentValue::CenterOf(to_i32(n - 1 - cell.row)),
                ),
                label_font.into_font().color(&text_color).pos(centered),
            )
        }))?;
        Ok(())
    }

    fn draw(&self, matrix: &CorrelationMatrix, path: &Path) -> DrawResult<()> {
        let root = BitMapBackend::new(path, (self.config.width, self.config.height)).into_drawing_area();
        self.draw_on(&root, matrix)?;
        root.present()?;
        Ok(())
    }
}

impl GraphRenderer for CorrelationHeatmap {
    type Data = CorrelationMatrix;

    fn render(&self, matrix: &CorrelationMatrix, path: &Path) -> Result<()> {
        if matrix.len() < 2 {
            return Err(EpiError::graph(
                "correlation heatmap needs at least two columns",
            ));
        }

        self.draw(matrix, path)
            .map_err(draw_error(self.name(), path))?;
        info!("Saved: {}", path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "correlation heatmap"
    }

    fn description(&self) -> &'static str {
        "Lower-triangle Pearson correlation heatmap"
    }

    fn file_name(&self) -> &'static str {
        Self::FILE_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{is_png, Canvas};

    fn matrix() -> CorrelationMatrix {
        CorrelationMatrix {
            columns: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            values: vec![1.0, 0.5, -0.25, 0.5, 1.0, f64::NAN, -0.25, f64::NAN, 1.0],
        }
    }

    #[test]
    fn test_only_lower_triangle_is_visible() {
        let cells = lower_triangle_cells(&matrix());
        let positions: Vec<(usize, usize)> = cells.iter().map(|c| (c.row, c.col)).collect();
        assert_eq!(positions, vec![(1, 0), (2, 0), (2, 1)]);
        assert_eq!(cells[0].value, 0.5);
        assert!(cells[2].value.is_nan());
    }

    #[test]
    fn test_cell_label() {
        assert_eq!(cell_label(0.5), "0.50");
        assert_eq!(cell_label(-0.256), "-0.26");
        assert_eq!(cell_label(f64::NAN), "");
    }

    #[test]
    fn test_single_column_is_rejected() {
        let matrix = CorrelationMatrix {
            columns: vec!["a".to_string()],
            values: vec![1.0],
        };
        let dir = tempfile::tempdir().unwrap();
        let err = CorrelationHeatmap::new()
            .render(&matrix, &dir.path().join("heatmap.png"))
            .unwrap_err();
        assert_eq!(err.category(), "graph");
    }

    #[test]
    fn test_only_lower_triangle_is_painted() {
        let mut heatmap = CorrelationHeatmap::new();
        heatmap.config = heatmap.config.without_text().with_size(300, 300);

        let canvas = Canvas::draw(300, 300, |root| heatmap.draw_on(root, &matrix()));

        assert!(canvas.count(diverging_color(0.5)) > 0);
        assert!(canvas.count(diverging_color(-0.25)) > 0);
        // the diagonal is masked
        assert_eq!(canvas.count(diverging_color(1.0)), 0);
    }

    #[test]
    fn test_render_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heatmap.png");
        let mut heatmap = CorrelationHeatmap::new();
        heatmap.config = heatmap.config.without_text();
        heatmap.render(&matrix(), &path).unwrap();
        assert!(is_png(&path));
    }
}
