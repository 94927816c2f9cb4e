//! Multi-series time trend line chart.

use crate::palette::get_colors;
use crate::utils::{chart_builder, data_bounds, format_date_tick, padded_range, trend_datasets};
use crate::{draw_error, DataSet, DrawResult, GraphConfig, GraphRenderer};
use epitrend_common::Result;
use epitrend_data::ObservationTable;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;
use tracing::{info, warn};

/// One line per entity over time.
#[derive(Debug, Clone)]
pub struct TrendChart {
    /// Entities to draw, in legend order.
    pub entities: Vec<String>,
    /// Numeric column on the y axis.
    pub column: String,
    /// Fixed y range; computed from the data when `None`.
    pub y_range: Option<Range<f64>>,
    /// Output file name.
    pub file_name: &'static str,
    /// Chart configuration.
    pub config: GraphConfig,
}

impl TrendChart {
    /// Default output file of the rolling case trend.
    pub const FILE_NAME: &'static str = "cases_trend.png";

    /// Default output file of the bounded coverage trend.
    pub const BOUNDED_FILE_NAME: &'static str = "vax_rate.png";

    /// Trend of `column` (e.g. `new_cases_rolling_7d`) with an automatic y range.
    pub fn new(entities: Vec<String>, column: impl Into<String>) -> Self {
        Self {
            entities,
            column: column.into(),
            y_range: None,
            file_name: Self::FILE_NAME,
            config: GraphConfig::titled(
                "COVID-19 Daily New Cases (7-Day Rolling Average)",
                Some("Date"),
                Some("New Cases (7-day avg)"),
            ),
        }
    }

    /// Trend of a percentage column (e.g. `vaccination_pct`) on a fixed 0-100 axis.
    pub fn bounded(entities: Vec<String>, column: impl Into<String>) -> Self {
        Self {
            entities,
            column: column.into(),
            y_range: Some(0.0..100.0),
            file_name: Self::BOUNDED_FILE_NAME,
            config: GraphConfig::titled(
                "COVID-19 Vaccination Coverage by Country",
                Some("Date"),
                Some("Population Vaccinated (%)"),
            ),
        }
    }

    /// Replaces the chart configuration.
    #[must_use]
    pub fn with_config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    /// Axis ranges for `datasets`: the fixed y range when set, otherwise the
    /// padded data range. A single day is widened so it stays visible.
    pub fn axis_ranges(&self, datasets: &[DataSet]) -> (Range<f64>, Range<f64>) {
        let (x_range, y_range) = match data_bounds(datasets) {
            Some((x, y)) => (x, self.y_range.clone().unwrap_or_else(|| padded_range(y))),
            None => (0.0..1.0, self.y_range.clone().unwrap_or(0.0..1.0)),
        };
        let x_range = if x_range.end > x_range.start {
            x_range
        } else {
            (x_range.start - 1.0)..(x_range.end + 1.0)
        };
        (x_range, y_range)
    }

    /// Draws the chart onto `root` without presenting it.
    pub fn draw_on<DB>(&self, root: &DrawingArea<DB, Shift>, datasets: &[DataSet]) -> DrawResult<()>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let config = &self.config;
        let style = &config.style;
        let (x_range, y_range) = self.axis_ranges(datasets);

        let label_font = (style.label_font.family.as_str(), style.label_font.size);
        let mut chart = chart_builder(root, config)?.build_cartesian_2d(x_range, y_range)?;

        let date_tick = |x: &f64| format_date_tick(*x);
        let mut mesh = chart.configure_mesh();
        mesh.x_labels(10)
            .x_label_formatter(&date_tick)
            .x_label_style(label_font)
            .y_label_style(label_font)
            .light_line_style(&RGBColor(235, 235, 235));
        if !style.hide_text {
            mesh.x_desc(config.x_label.as_deref().unwrap_or(""))
                .y_desc(config.y_label.as_deref().unwrap_or(""));
        }
        mesh.draw()?;

        let colors = get_colors(&style.color_scheme);
        let width = style.line_width;
        for (i, dataset) in datasets.iter().enumerate() {
            let color = colors[i % colors.len()];
            for (j, segment) in dataset.segments.iter().enumerate() {
                let series = chart.draw_series(LineSeries::new(
                    segment.iter().map(|p| (p.x, p.y)),
                    color.stroke_width(width),
                ))?;
                if j == 0 {
                    series
                        .label(dataset.name.as_str())
                        .legend(move |(x, y)| {
                            PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(width))
                        });
                }
            }
        }

        if !style.hide_text && datasets.iter().any(|d| !d.is_empty()) {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .label_font(label_font)
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;
        }
        Ok(())
    }

    fn draw(&self, datasets: &[DataSet], path: &Path) -> DrawResult<()> {
        let root = BitMapBackend::new(path, (self.config.width, self.config.height)).into_drawing_area();
        self.draw_on(&root, datasets)?;
        root.present()?;
        Ok(())
    }
}

impl GraphRenderer for TrendChart {
    type Data = ObservationTable;

    fn render(&self, table: &ObservationTable, path: &Path) -> Result<()> {
        let datasets = trend_datasets(table, &self.entities, &self.column)?;
        for empty in datasets.iter().filter(|d| d.is_empty()) {
            warn!("No '{}' values for {}", self.column, empty.name);
        }

        self.draw(&datasets, path)
            .map_err(draw_error(self.name(), path))?;
        info!("Saved: {}", path.display());
        Ok(())
    }

    fn name(&self) -> &'static str {
        if self.y_range.is_some() {
            "bounded trend chart"
        } else {
            "trend chart"
        }
    }

    fn description(&self) -> &'static str {
        "One line per entity over time"
    }

    fn file_name(&self) -> &'static str {
        self.file_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{is_png, Canvas};
    use crate::DataPoint;
    use epitrend_data::{clean, parse_csv_str, SourceColumns};

    fn entities(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_constructors() {
        let trend = TrendChart::new(entities(&["A"]), "new_cases_rolling_7d");
        assert!(trend.y_range.is_none());
        assert_eq!(trend.file_name(), "cases_trend.png");

        let bounded = TrendChart::bounded(entities(&["A"]), "vaccination_pct");
        assert_eq!(bounded.y_range, Some(0.0..100.0));
        assert_eq!(bounded.file_name(), "vax_rate.png");
        assert_eq!(bounded.config.y_label.as_deref(), Some("Population Vaccinated (%)"));
    }

    #[test]
    fn test_unknown_column_fails_before_drawing() {
        let table = clean(
            parse_csv_str("location,date,x\nA,2021-01-01,1\n", &SourceColumns::default()).unwrap(),
            None,
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trend.png");
        let err = TrendChart::new(entities(&["A"]), "y").render(&table, &path).unwrap_err();
        assert_eq!(err.category(), "missing_column");
        assert!(!path.exists());
    }

    fn flat_series(value: f64) -> Vec<DataSet> {
        vec![DataSet {
            name: "A".to_string(),
            segments: vec![vec![DataPoint { x: 0.0, y: value }, DataPoint { x: 10.0, y: value }]],
        }]
    }

    #[test]
    fn test_axis_ranges() {
        let series = flat_series(30.0);
        let bounded = TrendChart::bounded(entities(&["A"]), "vaccination_pct");
        assert_eq!(bounded.axis_ranges(&series), (0.0..10.0, 0.0..100.0));

        let (_, y) = TrendChart::new(entities(&["A"]), "x").axis_ranges(&series);
        assert_eq!(y.start, 0.0);
        assert!((y.end - 33.0).abs() < 1e-9);

        // a single day gets a visible span
        let single = vec![DataSet {
            name: "A".to_string(),
            segments: vec![vec![DataPoint { x: 5.0, y: 1.0 }]],
        }];
        let (x, _) = bounded.axis_ranges(&single);
        assert_eq!(x, 4.0..6.0);
    }

    #[test]
    fn test_bounded_line_sits_at_its_percentage() {
        let mut chart = TrendChart::bounded(entities(&["A"]), "vaccination_pct");
        chart.config = chart.config.without_text().with_size(400, 300);
        chart.config.style.line_width = 5;
        let series = flat_series(50.0);

        let canvas = Canvas::draw(400, 300, |root| chart.draw_on(root, &series));

        let line = get_colors(&chart.config.style.color_scheme)[0];
        let rows = canvas.rows_with(line);
        assert!(!rows.is_empty());
        // 50 of 0..100 is the middle of the plot area
        let middle = canvas.height / 2;
        assert!(rows.iter().all(|row| row.abs_diff(middle) <= 6), "{rows:?}");
    }

    #[test]
    fn test_empty_series_draws_blank_plot() {
        let mut chart = TrendChart::new(entities(&["A"]), "x");
        chart.config = chart.config.without_text().with_size(300, 200);
        let empty = vec![DataSet {
            name: "A".to_string(),
            segments: vec![Vec::new()],
        }];

        let canvas = Canvas::draw(300, 200, |root| chart.draw_on(root, &empty));
        assert_eq!(canvas.count(get_colors(&chart.config.style.color_scheme)[0]), 0);
    }

    #[test]
    fn test_render_to_file() {
        let table = clean(
            parse_csv_str(
                "location,date,x\nA,2021-01-01,1\nA,2021-02-01,3\nB,2021-01-01,2\n",
                &SourceColumns::default(),
            )
            .unwrap(),
            None,
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trend.png");
        let chart = TrendChart::new(entities(&["A", "B"]), "x")
            .with_config(GraphConfig::titled("Test", None, None).with_size(640, 480).without_text());

        chart.render(&table, &path).unwrap();
        assert!(is_png(&path));
    }
}
