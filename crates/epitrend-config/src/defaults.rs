//! Default values for every configuration section.

use crate::schema::*;
use epitrend_common::{LoggingConfig, SourceFormat};
use std::path::PathBuf;

/// Default location of the raw dataset.
pub const DEFAULT_SOURCE_PATH: &str = "data/raw/owid-covid-data.csv";

/// Public download location of the Our World in Data COVID-19 dataset.
pub const DEFAULT_SOURCE_URL: &str = "https://covid.ourworldindata.org/data/owid-covid-data.csv";

/// Entities tracked when no allow-list is configured.
pub const DEFAULT_ENTITIES: [&str; 5] = ["United States", "India", "Brazil", "United Kingdom", "Germany"];

/// Correlation columns used when present, in display order.
pub const PREFERRED_CORRELATION_COLUMNS: [&str; 6] = [
    "new_cases",
    "new_deaths",
    "new_vaccinations",
    "people_vaccinated",
    "icu_patients",
    "hosp_patients",
];

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            analysis: AnalysisConfig::default(),
            graphs: GraphsConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE_PATH),
            source_url: DEFAULT_SOURCE_URL.to_string(),
            fetch_remote: false,
            format: SourceFormat::Auto,
            entity_column: "location".to_string(),
            date_column: "date".to_string(),
            entities: DEFAULT_ENTITIES.iter().map(ToString::to_string).collect(),
            request_timeout_seconds: 60,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rolling_column: "new_cases".to_string(),
            rolling_window: 7,
            vaccinated_column: "people_vaccinated".to_string(),
            population_column: "population".to_string(),
            correlation_columns: PREFERRED_CORRELATION_COLUMNS
                .iter()
                .map(ToString::to_string)
                .collect(),
            correlation_fallback_limit: 8,
            peak_column: "new_cases".to_string(),
            normalize_columns: Vec::new(),
            outlier_columns: Vec::new(),
            outlier_z_threshold: 3.0,
        }
    }
}

impl Default for GraphsConfig {
    fn default() -> Self {
        Self {
            enabled: EnabledGraphsConfig::default(),
            top_n: 10,
            top_column: "total_cases".to_string(),
            bar_race_column: "total_cases".to_string(),
            bar_race_limit: None,
            scatter_x_column: "vaccination_pct".to_string(),
            scatter_y_column: "new_deaths".to_string(),
            width: 1800,
            height: 900,
        }
    }
}

impl Default for EnabledGraphsConfig {
    fn default() -> Self {
        Self {
            cases_trend: true,
            vaccination_rate: true,
            correlation_heatmap: true,
            top_entities: true,
            interactive_trend: true,
            interactive_scatter: true,
            bar_race: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            processed_path: PathBuf::from("data/processed/cleaned_covid.csv"),
            figures_dir: PathBuf::from("outputs/figures"),
            html_dir: PathBuf::from("outputs/html"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_pipeline() {
        let config = Config::default();
        assert_eq!(config.data.entities.len(), 5);
        assert_eq!(config.analysis.rolling_window, 7);
        assert_eq!(config.analysis.correlation_fallback_limit, 8);
        assert_eq!(config.graphs.top_n, 10);
        assert_eq!(config.graphs.bar_race_limit, None);
        assert!(config.graphs.enabled.any_static());
        assert!(config.graphs.enabled.any_interactive());
        assert_eq!(config.output.html_dir, PathBuf::from("outputs/html"));
    }
}
