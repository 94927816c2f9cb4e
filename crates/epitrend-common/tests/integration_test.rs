//! Integration tests for epitrend-common crate.

use chrono::NaiveDate;
use epitrend_common::{
    format_count, format_date, format_millions, truncate_string, EpiError, LoggingConfig,
    SourceFormat, YearMonth,
};
use std::path::Path;

#[test]
fn test_format_helpers() {
    assert_eq!(format_date(NaiveDate::from_ymd_opt(2020, 2, 29).unwrap()), "2020-02-29");
    assert_eq!(format_millions(103_000_000.0), "103.0M");
    assert_eq!(format_count(87_654), "87,654");
    assert_eq!(truncate_string("United Kingdom", 8), "Unite...");
}

#[test]
fn test_source_format_roundtrip_through_serde() {
    let format: SourceFormat = serde_json::from_str("\"json\"").unwrap();
    assert_eq!(format, SourceFormat::Json);
    assert_eq!(format.to_string(), "json");
    assert_eq!(SourceFormat::default().resolve(Path::new("owid.csv")), SourceFormat::Csv);
}

#[test]
fn test_year_month_serializes_as_struct() {
    let month = YearMonth::new(2022, 5).unwrap();
    let json = serde_json::to_string(&month).unwrap();
    assert_eq!(json, r#"{"year":2022,"month":5}"#);
}

#[test]
fn test_error_categories_are_distinct() {
    let errors = [
        EpiError::config("c"),
        EpiError::missing_source("x.csv"),
        EpiError::missing_column("new_cases"),
        EpiError::data("d"),
        EpiError::network_with_status("n", 503),
        EpiError::graph("g"),
        EpiError::validation_field("v", "rolling_window"),
    ];
    let mut categories: Vec<&str> = errors.iter().map(EpiError::category).collect();
    categories.sort_unstable();
    categories.dedup();
    assert_eq!(categories.len(), errors.len());
}

#[test]
fn test_logging_config_from_yaml_like_json() {
    let config: LoggingConfig =
        serde_json::from_str(r#"{"file_path":"logs/epitrend.log","include_spans":true}"#).unwrap();
    assert_eq!(config.level, "info");
    assert_eq!(config.file_path.as_deref(), Some("logs/epitrend.log"));
    assert!(config.include_spans);
}
