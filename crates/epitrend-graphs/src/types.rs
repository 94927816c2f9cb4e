//! Graph types and data structures

use serde::{Deserialize, Serialize};

/// Chart configuration shared by the static renderers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Caption drawn above the plot.
    pub title: String,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// X axis description.
    pub x_label: Option<String>,
    /// Y axis description.
    pub y_label: Option<String>,
    /// Visual styling.
    pub style: StyleConfig,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            title: "Graph".to_string(),
            width: 1800,
            height: 900,
            x_label: None,
            y_label: None,
            style: StyleConfig::default(),
        }
    }
}

impl GraphConfig {
    /// Creates a configuration with a title and axis descriptions.
    pub fn titled(title: &str, x_label: Option<&str>, y_label: Option<&str>) -> Self {
        Self {
            title: title.to_string(),
            x_label: x_label.map(ToString::to_string),
            y_label: y_label.map(ToString::to_string),
            ..Self::default()
        }
    }

    /// Draws the chart without any text.
    #[must_use]
    pub const fn without_text(mut self) -> Self {
        self.style.hide_text = true;
        self
    }

    /// Overrides the image size.
    #[must_use]
    pub const fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Point of a series on a numeric plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// A named series; every inner vector is one unbroken line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    /// Legend label.
    pub name: String,
    /// Contiguous runs of points.
    pub segments: Vec<Vec<DataPoint>>,
}

impl DataSet {
    /// Whether the series has no points at all.
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(Vec::is_empty)
    }

    /// Iterates over every point of every segment.
    pub fn points(&self) -> impl Iterator<Item = &DataPoint> {
        self.segments.iter().flatten()
    }
}

/// Color scheme for graphs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorScheme {
    /// Ten categorical colors.
    Default,
    /// High-contrast categorical colors.
    Vibrant,
    /// Hex colors such as `#1f77b4`.
    Custom(Vec<String>),
}

/// Font configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontConfig {
    /// Font family name.
    pub family: String,
    /// Size in points.
    pub size: u32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            size: 18,
        }
    }
}

/// Margin configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarginConfig {
    /// Space around the chart.
    pub outer: u32,
    /// Height of the x label area.
    pub x_label_area: u32,
    /// Width of the y label area.
    pub y_label_area: u32,
}

impl Default for MarginConfig {
    fn default() -> Self {
        Self {
            outer: 30,
            x_label_area: 80,
            y_label_area: 110,
        }
    }
}

/// Comprehensive styling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Series colors.
    pub color_scheme: ColorScheme,
    /// Background as a hex color.
    pub background_color: Option<String>,
    /// Caption font.
    pub title_font: FontConfig,
    /// Tick label font.
    pub label_font: FontConfig,
    /// Margins and label areas.
    pub margins: MarginConfig,
    /// Stroke width of line series.
    pub line_width: u32,
    /// Skips the caption, tick labels, axis descriptions, legends and
    /// annotations.
    #[serde(default)]
    pub hide_text: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            color_scheme: ColorScheme::Default,
            background_color: Some("#FFFFFF".to_string()),
            title_font: FontConfig {
                family: "sans-serif".to_string(),
                size: 32,
            },
            label_font: FontConfig::default(),
            margins: MarginConfig::default(),
            line_width: 2,
            hide_text: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titled_keeps_default_style() {
        let config = GraphConfig::titled("Cases", Some("Date"), None).with_size(640, 480);
        assert_eq!(config.title, "Cases");
        assert_eq!(config.x_label.as_deref(), Some("Date"));
        assert!(config.y_label.is_none());
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.style.color_scheme, ColorScheme::Default);
        assert!(!config.style.hide_text);
        assert!(config.without_text().style.hide_text);
    }

    #[test]
    fn test_dataset_emptiness() {
        let empty = DataSet {
            name: "A".to_string(),
            segments: vec![Vec::new()],
        };
        assert!(empty.is_empty());

        let filled = DataSet {
            name: "A".to_string(),
            segments: vec![vec![DataPoint { x: 1.0, y: 2.0 }], vec![DataPoint { x: 3.0, y: 4.0 }]],
        };
        assert!(!filled.is_empty());
        assert_eq!(filled.points().count(), 2);
    }
}
