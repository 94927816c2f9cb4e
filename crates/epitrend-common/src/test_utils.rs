//! Test utilities and shared fixtures for the epitrend workspace.
//!
//! Enabled for this crate's own tests and, through the `testing` feature,
//! for the unit and integration tests of every other crate.

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Assert that two floating point numbers are approximately equal within a tolerance.
pub fn assert_approx_eq(left: f64, right: f64, tolerance: f64) {
    let diff = (left - right).abs();
    assert!(
        diff <= tolerance,
        "assertion failed: `{left}` is not approximately equal to `{right}` (tolerance: {tolerance}, diff: {diff})"
    );
}

/// Create a temporary directory for tests that automatically cleans up.
#[cfg(feature = "tempfile")]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Sample datasets in the Our World in Data layout.
pub mod dataset_fixtures {
    /// Header shared by the CSV fixtures.
    pub const OWID_HEADER: &str = "iso_code,continent,location,date,total_cases,new_cases,new_deaths,people_vaccinated,population";

    /// A small, messy OWID-style CSV: gaps, an unparsable date, a duplicate
    /// row and a location outside the usual allow-list.
    pub fn owid_sample_csv() -> String {
        [
            OWID_HEADER,
            "DEU,Europe,Germany,2021-01-02,1000,,5,,83000000",
            "DEU,Europe,Germany,2021-01-01,900,100,4,10,83000000",
            "DEU,Europe,Germany,2021-01-03,1200,200,,30,83000000",
            "DEU,Europe,Germany,not-a-date,1300,100,6,40,83000000",
            "IND,Asia,India,2021-01-01,5000,500,20,,1380000000",
            "IND,Asia,India,2021-01-02,5600,600,25,,1380000000",
            "IND,Asia,India,2021-01-02,5600,600,25,,1380000000",
            "FRA,Europe,France,2021-01-01,700,70,3,5,67000000",
        ]
        .join("\n")
    }

    /// A tiny CSV with one location and three consecutive days.
    pub fn single_series_csv(values: &[f64]) -> String {
        let mut lines = vec!["location,date,new_cases".to_string()];
        for (day, value) in values.iter().enumerate() {
            lines.push(format!("A,2021-01-{:02},{value}", day + 1));
        }
        lines.join("\n")
    }

    /// The same shape as [`owid_sample_csv`] as a JSON array of records.
    pub fn owid_sample_json() -> &'static str {
        r#"[
  {"iso_code": "DEU", "location": "Germany", "date": "2021-01-01", "new_cases": 100, "population": 83000000},
  {"iso_code": "DEU", "location": "Germany", "date": "2021-01-02", "new_cases": null, "population": 83000000},
  {"iso_code": "IND", "location": "India", "date": "2021-01-01", "new_cases": 500, "population": 1380000000, "tests_units": "tests performed"}
]"#
    }
}

/// Configuration-related test utilities.
pub mod config_fixtures {
    /// Create a minimal valid test configuration as YAML string.
    pub fn minimal_config_yaml() -> &'static str {
        r#"
data:
  source_path: "data/raw/owid-covid-data.csv"
  entities: ["Germany", "India"]

analysis:
  rolling_window: 7
"#
    }

    /// Create a full test configuration as YAML string.
    pub fn full_config_yaml() -> &'static str {
        concat!(
            "data:\n",
            "  source_path: \"input/covid.json\"\n",
            "  source_url: \"https://example.org/owid.csv\"\n",
            "  fetch_remote: false\n",
            "  format: json\n",
            "  entity_column: \"location\"\n",
            "  date_column: \"date\"\n",
            "  entities: [\"Brazil\", \"Germany\"]\n",
            "  request_timeout_seconds: 15\n",
            "\n",
            "analysis:\n",
            "  rolling_column: \"new_deaths\"\n",
            "  rolling_window: 14\n",
            "  vaccinated_column: \"people_vaccinated\"\n",
            "  population_column: \"population\"\n",
            "  correlation_columns: [\"new_cases\", \"new_deaths\"]\n",
            "  correlation_fallback_limit: 6\n",
            "  peak_column: \"new_deaths\"\n",
            "  normalize_columns: [\"new_cases\"]\n",
            "  outlier_columns: [\"new_deaths\"]\n",
            "  outlier_z_threshold: 2.5\n",
            "\n",
            "graphs:\n",
            "  top_n: 5\n",
            "  top_column: \"total_deaths\"\n",
            "  width: 1024\n",
            "  height: 768\n",
            "  enabled:\n",
            "    cases_trend: true\n",
            "    vaccination_rate: false\n",
            "    correlation_heatmap: true\n",
            "    top_entities: true\n",
            "    interactive_trend: true\n",
            "    interactive_scatter: false\n",
            "    bar_race: true\n",
            "\n",
            "output:\n",
            "  processed_path: \"out/processed/clean.csv\"\n",
            "  figures_dir: \"out/figures\"\n",
            "  html_dir: \"out/html\"\n",
            "\n",
            "logging:\n",
            "  level: \"debug\"\n",
            "  format: \"pretty\"\n",
        )
    }
}

/// Property-based testing utilities using proptest.
#[cfg(feature = "proptest")]
pub mod property_testing {
    use proptest::prelude::*;

    /// Strategy for a per-entity series of optional non-negative counts.
    pub fn sparse_series_strategy(max_len: usize) -> impl Strategy<Value = Vec<Option<f64>>> {
        prop::collection::vec(prop::option::of(0.0f64..1.0e6), 1..=max_len)
    }

    /// Strategy for a series of present, non-negative counts.
    pub fn dense_series_strategy(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(0.0f64..1.0e6, 1..=max_len)
    }

    /// Strategy for short entity names.
    pub fn entity_name_strategy() -> impl Strategy<Value = String> {
        r"[A-Z][a-z]{2,8}".prop_map(|s| s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_multiple_calls() {
        init_test_logging();
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_assert_approx_eq() {
        assert_approx_eq(1.0, 1.0001, 0.001);
        assert_approx_eq(1.0, 0.9999, 0.001);
    }

    #[test]
    #[should_panic]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq(1.0, 1.1, 0.05);
    }

    #[test]
    fn test_sample_csv_shape() {
        let csv = dataset_fixtures::owid_sample_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], dataset_fixtures::OWID_HEADER);
        assert_eq!(lines.len(), 9);
    }

    #[test]
    fn test_single_series_csv() {
        let csv = dataset_fixtures::single_series_csv(&[10.0, 20.0]);
        assert_eq!(csv, "location,date,new_cases\nA,2021-01-01,10\nA,2021-01-02,20");
    }
}
