//! Integration tests for the epitrend binary crate.
//!
//! These run the whole pipeline against the fixture dataset with only the
//! HTML outputs enabled, so no system fonts are needed.

use epitrend::{prepare_output_dirs, run, RunOutcome};
use epitrend_common::test_utils::{dataset_fixtures, init_test_logging};
use epitrend_config::{Config, EnabledGraphsConfig};
use std::fs;
use std::path::Path;

fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.data.source_path = root.join("raw/owid.csv");
    config.data.entities = vec!["Germany".to_string(), "India".to_string()];
    config.output.processed_path = root.join("processed/cleaned.csv");
    config.output.figures_dir = root.join("figures");
    config.output.html_dir = root.join("html");
    config.graphs.enabled = EnabledGraphsConfig {
        cases_trend: false,
        vaccination_rate: false,
        correlation_heatmap: false,
        top_entities: false,
        interactive_trend: true,
        interactive_scatter: true,
        bar_race: true,
    };
    config
}

fn write_source(config: &Config) {
    let path = &config.data.source_path;
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, dataset_fixtures::owid_sample_csv()).unwrap();
}

#[test]
fn test_full_pipeline_run() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    write_source(&config);

    let RunOutcome::Completed(report) = run(&config).unwrap() else {
        panic!("expected a completed run");
    };

    assert_eq!(report.rows, 6);
    let snapshot = fs::read_to_string(&report.snapshot).unwrap();
    assert_eq!(snapshot.lines().count(), 7);
    assert!(snapshot.lines().next().unwrap().starts_with("iso_code,continent,location,date"));

    assert_eq!(report.peaks.len(), 2);
    assert_eq!(report.peaks[1].entity, "India");
    assert_eq!(report.peaks[1].peak_value, Some(600.0));

    assert_eq!(
        report.correlation_columns,
        vec!["new_cases".to_string(), "new_deaths".to_string(), "people_vaccinated".to_string()]
    );
    assert_eq!(report.outputs.len(), 3);
    assert!(report.outputs.iter().all(|p| p.exists()));
}

#[test]
fn test_missing_source_stops_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let outcome = run(&config).unwrap();
    assert!(matches!(outcome, RunOutcome::SourceMissing));
    assert!(!config.output.processed_path.exists());
    assert!(config.output.html_dir.is_dir());
}

#[test]
fn test_unknown_rolling_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.analysis.rolling_column = "weekly_cases".to_string();
    write_source(&config);

    let err = run(&config).unwrap_err();
    assert_eq!(err.category(), "missing_column");
    // the snapshot is written before analysis starts
    assert!(config.output.processed_path.exists());
}

#[test]
fn test_optional_transforms_run_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.analysis.normalize_columns = vec!["new_cases".to_string()];
    config.analysis.outlier_columns = vec!["new_cases".to_string()];
    config.analysis.outlier_z_threshold = 1.0;
    write_source(&config);

    assert!(matches!(run(&config).unwrap(), RunOutcome::Completed(_)));
}

#[test]
fn test_prepare_output_dirs_creates_every_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    prepare_output_dirs(&config).unwrap();
    assert!(dir.path().join("processed").is_dir());
    assert!(config.output.figures_dir.is_dir());
    assert!(config.output.html_dir.is_dir());

    // idempotent
    prepare_output_dirs(&config).unwrap();
}
