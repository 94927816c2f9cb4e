//! Data preparation shared by the renderers.

use crate::palette::parse_color;
use crate::{DataPoint, DataSet, DrawResult, GraphConfig};
use chrono::{Datelike, NaiveDate};
use epitrend_common::Result;
use epitrend_data::ObservationTable;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;

/// Maps a date onto the numeric x axis (days since the common era).
pub fn date_to_x(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

/// Inverse of [`date_to_x`], rounding to the nearest day.
#[allow(clippy::cast_possible_truncation)]
pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

/// Tick label for a date axis position, e.g. `Mar 2021`.
pub fn format_date_tick(x: f64) -> String {
    x_to_date(x).map_or_else(String::new, |date| date.format("%b %Y").to_string())
}

/// One series per entity, split wherever the date or the value is missing.
///
/// Entities absent from the table yield an empty series.
pub fn trend_datasets(table: &ObservationTable, entities: &[String], column: &str) -> Result<Vec<DataSet>> {
    let slot = table.schema().require_numeric(column)?;

    Ok(entities
        .iter()
        .map(|entity| {
            let mut segments: Vec<Vec<DataPoint>> = vec![Vec::new()];
            for row in table.rows().iter().filter(|row| &row.entity == entity) {
                match (row.date, row.value(slot).filter(|v| v.is_finite())) {
                    (Some(date), Some(y)) => {
                        if let Some(current) = segments.last_mut() {
                            current.push(DataPoint { x: date_to_x(date), y });
                        }
                    }
                    _ => {
                        if segments.last().is_some_and(|s| !s.is_empty()) {
                            segments.push(Vec::new());
                        }
                    }
                }
            }
            segments.retain(|segment| !segment.is_empty());
            DataSet {
                name: entity.clone(),
                segments,
            }
        })
        .collect())
}

/// Bounding box of every point, `None` when there are no points.
pub fn data_bounds(datasets: &[DataSet]) -> Option<(Range<f64>, Range<f64>)> {
    let mut points = datasets.iter().flat_map(DataSet::points).peekable();
    points.peek()?;

    let (mut x_min, mut x_max, mut y_min, mut y_max) =
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
    for point in points {
        x_min = x_min.min(point.x);
        x_max = x_max.max(point.x);
        y_min = y_min.min(point.y);
        y_max = y_max.max(point.y);
    }
    Some((x_min..x_max, y_min..y_max))
}

/// Pads a value range for plotting: starts at zero for non-negative data and
/// leaves 10% headroom; a degenerate range is widened to stay drawable.
pub fn padded_range(range: Range<f64>) -> Range<f64> {
    let start = range.start.min(0.0);
    let end = if range.end > start { range.end * 1.1 } else { start + 1.0 };
    start..end
}

/// Entities ranked by the maximum of `column`, largest first, at most `n`.
///
/// Ties keep the table's row order; entities without any value are left out.
pub fn top_entities_by_max(table: &ObservationTable, column: &str, n: usize) -> Result<Vec<(String, f64)>> {
    let slot = table.schema().require_numeric(column)?;

    let mut maxima: Vec<(String, f64)> = table
        .entity_groups()
        .into_iter()
        .filter_map(|group| {
            let entity = table.rows()[group[0]].entity.clone();
            group
                .iter()
                .filter_map(|&index| table.rows()[index].value(slot))
                .filter(|v| !v.is_nan())
                .reduce(f64::max)
                .map(|max| (entity, max))
        })
        .collect();

    maxima.sort_by(|a, b| b.1.total_cmp(&a.1));
    maxima.truncate(n);
    Ok(maxima)
}

/// Fills `root` with the configured background and returns a builder with
/// margins and label areas applied.
///
/// With `hide_text` set there is no caption and no label area, so the chart
/// draws no text at all.
pub fn chart_builder<'a, 'b, DB>(
    root: &'a DrawingArea<DB, Shift>,
    config: &'b GraphConfig,
) -> DrawResult<ChartBuilder<'a, 'b, DB>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let style = &config.style;
    let background = style.background_color.as_deref().map_or(WHITE, parse_color);
    root.fill(&background)?;

    let mut builder = ChartBuilder::on(root);
    builder.margin(style.margins.outer);
    if !style.hide_text {
        builder
            .caption(&config.title, (style.title_font.family.as_str(), style.title_font.size))
            .x_label_area_size(style.margins.x_label_area)
            .y_label_area_size(style.margins.y_label_area);
    }
    Ok(builder)
}

/// Range for a categorical axis built with `into_segmented`, one segment per item.
pub fn category_range(len: usize) -> Range<i32> {
    let last = i32::try_from(len.saturating_sub(1)).unwrap_or(i32::MAX);
    0..last.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use epitrend_common::test_utils::assert_approx_eq;
    use epitrend_data::{clean, parse_csv_str, parse_date, SourceColumns};

    fn table(csv: &str) -> ObservationTable {
        clean(parse_csv_str(csv, &SourceColumns::default()).unwrap(), None)
    }

    #[test]
    fn test_date_axis_round_trip() {
        let date = NaiveDate::from_ymd_opt(2021, 3, 15).unwrap();
        assert_eq!(x_to_date(date_to_x(date)), Some(date));
        assert_eq!(format_date_tick(date_to_x(date)), "Mar 2021");
        assert_eq!(format_date_tick(f64::NAN), "");
    }

    #[test]
    fn test_trend_datasets_break_on_gaps() {
        let raw = parse_csv_str(
            "location,date,x\nA,2021-01-01,1\nA,2021-01-02,NaN\nA,2021-01-03,3\nA,bad,4\n",
            &SourceColumns::default(),
        )
        .unwrap();
        // dates parsed, gaps left unfilled
        let mut rows = raw.rows().to_vec();
        for row in &mut rows {
            row.date = parse_date(&row.date_text);
        }
        let table = ObservationTable::new(raw.schema().clone(), rows).unwrap();

        let sets = trend_datasets(&table, &["A".to_string(), "Z".to_string()], "x").unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].segments.len(), 2);
        assert_eq!(sets[0].segments[0][0].y, 1.0);
        assert_eq!(sets[0].segments[1][0].y, 3.0);
        assert_eq!(sets[0].points().count(), 2);
        assert!(sets[1].is_empty());
    }

    #[test]
    fn test_top_entities_by_max() {
        let table = table("location,date,total\nA,2021-01-01,5\nA,2021-01-02,7\nB,2021-01-01,9\nC,2021-01-01,7\n");
        let top = top_entities_by_max(&table, "total", 2).unwrap();
        assert_eq!(top, vec![("B".to_string(), 9.0), ("A".to_string(), 7.0)]);
        assert!(top_entities_by_max(&table, "missing", 2).is_err());
    }

    #[test]
    fn test_ranges() {
        let padded = padded_range(2.0..10.0);
        assert_eq!(padded.start, 0.0);
        assert_approx_eq(padded.end, 11.0, 1e-9);
        assert_eq!(padded_range(-5.0..10.0).start, -5.0);
        assert_eq!(padded_range(0.0..0.0), 0.0..1.0);
        assert_eq!(category_range(5), 0..4);
        assert_eq!(category_range(1), 0..1);
        assert!(data_bounds(&[]).is_none());
    }
}
