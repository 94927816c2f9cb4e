//! Configuration schema definitions using serde.

use epitrend_common::{EpiError, LoggingConfig, SourceFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for epitrend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source dataset configuration.
    pub data: DataConfig,
    /// Analysis parameters.
    pub analysis: AnalysisConfig,
    /// Graph selection and sizing.
    pub graphs: GraphsConfig,
    /// Output locations.
    pub output: OutputConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Source dataset configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Local path of the dataset.
    pub source_path: PathBuf,
    /// Remote location of the same dataset.
    pub source_url: String,
    /// Read from `source_url` instead of `source_path`.
    pub fetch_remote: bool,
    /// Format of the local file.
    pub format: SourceFormat,
    /// Column holding the entity key.
    pub entity_column: String,
    /// Column holding the observation date.
    pub date_column: String,
    /// Entities to keep; empty keeps every entity.
    pub entities: Vec<String>,
    /// Timeout for the remote fetch, in seconds.
    pub request_timeout_seconds: u64,
}

/// Analysis parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Column smoothed by the rolling average.
    pub rolling_column: String,
    /// Rolling window size, in rows.
    pub rolling_window: usize,
    /// Column with the vaccinated head count.
    pub vaccinated_column: String,
    /// Column with the population.
    pub population_column: String,
    /// Preferred correlation columns, in display order.
    pub correlation_columns: Vec<String>,
    /// Number of numeric columns used when none of the preferred ones exist.
    pub correlation_fallback_limit: usize,
    /// Column whose per-entity peak is reported.
    pub peak_column: String,
    /// Columns to min-max normalize.
    pub normalize_columns: Vec<String>,
    /// Columns to flag outliers in.
    pub outlier_columns: Vec<String>,
    /// Z-score above which a value is flagged.
    pub outlier_z_threshold: f64,
}

/// Graph selection and sizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphsConfig {
    /// Enabled graphs.
    pub enabled: EnabledGraphsConfig,
    /// Number of entities in the ranking charts.
    pub top_n: usize,
    /// Column ranked by the top-entities chart.
    pub top_column: String,
    /// Column animated by the bar race.
    pub bar_race_column: String,
    /// Bars per bar race frame; every entity is shown when unset.
    pub bar_race_limit: Option<usize>,
    /// Column on the x axis of the interactive scatter.
    pub scatter_x_column: String,
    /// Column on the y axis of the interactive scatter.
    pub scatter_y_column: String,
    /// Static image width in pixels.
    pub width: u32,
    /// Static image height in pixels.
    pub height: u32,
}

/// Enabled graphs configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct EnabledGraphsConfig {
    /// Rolling-average trend image.
    pub cases_trend: bool,
    /// Vaccination coverage trend image.
    pub vaccination_rate: bool,
    /// Correlation heatmap image.
    pub correlation_heatmap: bool,
    /// Top entities bar chart image.
    pub top_entities: bool,
    /// Interactive trend document.
    pub interactive_trend: bool,
    /// Interactive scatter document.
    pub interactive_scatter: bool,
    /// Animated bar race document.
    pub bar_race: bool,
}

/// Output locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Cleaned snapshot CSV.
    pub processed_path: PathBuf,
    /// Directory for static images.
    pub figures_dir: PathBuf,
    /// Directory for interactive documents.
    pub html_dir: PathBuf,
}

impl Config {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), EpiError> {
        crate::validator::ConfigValidator::validate(self)
    }
}

impl DataConfig {
    /// Allow-list of entities, `None` when every entity is kept.
    pub fn entity_filter(&self) -> Option<&[String]> {
        if self.entities.is_empty() {
            None
        } else {
            Some(&self.entities)
        }
    }
}

impl EnabledGraphsConfig {
    /// Whether any static image is enabled.
    pub const fn any_static(&self) -> bool {
        self.cases_trend || self.vaccination_rate || self.correlation_heatmap || self.top_entities
    }

    /// Whether any interactive document is enabled.
    pub const fn any_interactive(&self) -> bool {
        self.interactive_trend || self.interactive_scatter || self.bar_race
    }
}
