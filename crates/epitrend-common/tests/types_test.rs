//! Tests for the shared domain types in epitrend-common.

use chrono::NaiveDate;
use epitrend_common::types::*;
use std::collections::BTreeSet;

#[test]
fn test_year_month_orders_chronologically_across_years() {
    let months: BTreeSet<YearMonth> = [
        NaiveDate::from_ymd_opt(2021, 2, 10).unwrap(),
        NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
        NaiveDate::from_ymd_opt(2021, 2, 1).unwrap(),
        NaiveDate::from_ymd_opt(2020, 11, 5).unwrap(),
    ]
    .into_iter()
    .map(YearMonth::from)
    .collect();

    let labels: Vec<String> = months.iter().map(ToString::to_string).collect();
    assert_eq!(labels, vec!["2020-11", "2020-12", "2021-02"]);
}

#[test]
fn test_year_month_rejects_invalid_month() {
    assert!(YearMonth::new(2021, 0).is_none());
    assert!(YearMonth::new(2021, 12).is_some());
}

#[test]
fn test_source_format_is_hashable() {
    let formats: BTreeSet<String> = [SourceFormat::Auto, SourceFormat::Csv, SourceFormat::Json]
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(formats.len(), 3);
}
