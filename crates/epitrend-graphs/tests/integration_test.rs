//! Integration tests for epitrend-graphs crate.
//!
//! HTML documents and PNG images are rendered for real. The images are
//! drawn without text so no system fonts are needed.

use epitrend_common::test_utils::{dataset_fixtures, init_test_logging};
use epitrend_config::Config;
use epitrend_data::{
    clean, correlation_matrix, coverage_ratio, parse_csv_str, rolling_average, ObservationTable,
    SourceColumns,
};
use epitrend_graphs::{
    BarRace, CorrelationHeatmap, GraphManager, GraphRenderer, InteractiveScatter,
    InteractiveTrend, TopEntitiesChart, TrendChart, PLOTLY_CDN,
};
use std::fs;

fn analysed_table() -> ObservationTable {
    let raw = parse_csv_str(&dataset_fixtures::owid_sample_csv(), &SourceColumns::default()).unwrap();
    let allow = vec!["Germany".to_string(), "India".to_string()];
    let mut table = clean(raw, Some(&allow));
    rolling_average(&mut table, "new_cases", 7).unwrap();
    coverage_ratio(&mut table, "people_vaccinated", "population").unwrap();
    table
}

fn entities() -> Vec<String> {
    vec!["Germany".to_string(), "India".to_string()]
}

/// Extracts the embedded figure JSON from a rendered page.
fn embedded_figure(html: &str) -> serde_json::Value {
    let start = html.find("var figure = ").unwrap() + "var figure = ".len();
    let end = start + html[start..].find(";\nPlotly.newPlot").unwrap();
    serde_json::from_str(&html[start..end]).unwrap()
}

#[test]
fn test_interactive_documents_embed_their_figures() {
    init_test_logging();
    let table = analysed_table();
    let dir = tempfile::tempdir().unwrap();

    let trend_path = dir.path().join(InteractiveTrend::FILE_NAME);
    InteractiveTrend::new(entities(), "new_cases_rolling_7d")
        .render(&table, &trend_path)
        .unwrap();
    let trend_html = fs::read_to_string(&trend_path).unwrap();
    assert!(trend_html.contains(PLOTLY_CDN));
    let trend = embedded_figure(&trend_html);
    assert_eq!(trend["data"].as_array().unwrap().len(), 2);
    // Germany's undated row is not plotted
    assert_eq!(trend["data"][0]["x"].as_array().unwrap().len(), 3);

    let scatter_path = dir.path().join(InteractiveScatter::FILE_NAME);
    InteractiveScatter::new("vaccination_pct", "new_deaths")
        .render(&table, &scatter_path)
        .unwrap();
    let scatter = embedded_figure(&fs::read_to_string(&scatter_path).unwrap());
    let names: Vec<&str> = scatter["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|trace| trace["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Germany", "India"]);

    let race_path = dir.path().join(BarRace::FILE_NAME);
    BarRace::new("total_cases").render(&table, &race_path).unwrap();
    let race = embedded_figure(&fs::read_to_string(&race_path).unwrap());
    assert_eq!(race["frames"].as_array().unwrap().len(), 1);
    assert_eq!(race["frames"][0]["name"], "2021-01");
    assert_eq!(race["frames"][0]["data"][0]["y"], serde_json::json!(["Germany", "India"]));
}

#[test]
fn test_manager_writes_into_configured_directories() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.output.figures_dir = dir.path().join("figures");
    config.output.html_dir = dir.path().join("html");
    config.graphs.enabled.cases_trend = false;
    config.graphs.enabled.vaccination_rate = false;
    config.graphs.enabled.correlation_heatmap = false;
    config.graphs.enabled.top_entities = false;
    fs::create_dir_all(&config.output.html_dir).unwrap();

    let table = analysed_table();
    let matrix = correlation_matrix(&table, &config.analysis.correlation_columns, 8).unwrap();
    let written = GraphManager::new(&config).render_all(&table, &matrix).unwrap();

    assert_eq!(written.len(), 3);
    for path in &written {
        assert!(path.starts_with(&config.output.html_dir));
        assert!(fs::metadata(path).unwrap().len() > 0);
    }
}

#[test]
fn test_missing_column_is_reported() {
    let table = analysed_table();
    let dir = tempfile::tempdir().unwrap();
    let err = InteractiveTrend::new(entities(), "hosp_patients")
        .render(&table, &dir.path().join("t.html"))
        .unwrap_err();
    assert_eq!(err.category(), "missing_column");
}

#[test]
fn test_static_images_are_written() {
    let table = analysed_table();
    let dir = tempfile::tempdir().unwrap();

    let mut trend = TrendChart::new(entities(), "new_cases_rolling_7d");
    trend.config = trend.config.without_text();
    trend.render(&table, &dir.path().join(trend.file_name())).unwrap();

    let mut bounded = TrendChart::bounded(entities(), "vaccination_pct");
    bounded.config = bounded.config.without_text();
    bounded.render(&table, &dir.path().join(bounded.file_name())).unwrap();

    let matrix = correlation_matrix(
        &table,
        &["new_cases".to_string(), "new_deaths".to_string(), "total_cases".to_string()],
        8,
    )
    .unwrap();
    let mut heatmap = CorrelationHeatmap::new();
    heatmap.config = heatmap.config.without_text();
    heatmap
        .render(&matrix, &dir.path().join(CorrelationHeatmap::FILE_NAME))
        .unwrap();

    let mut top = TopEntitiesChart::new(10, "total_cases");
    top.config = top.config.without_text();
    top.render(&table, &dir.path().join(TopEntitiesChart::FILE_NAME))
        .unwrap();

    for name in ["cases_trend.png", "vax_rate.png", "heatmap.png", "top_countries.png"] {
        let bytes = fs::read(dir.path().join(name)).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"), "{name} is not a PNG");
    }
}
