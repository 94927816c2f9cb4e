//! Graph manager for orchestrating every configured output.

use crate::interactive::{BarRace, InteractiveScatter, InteractiveTrend};
use crate::utils::top_entities_by_max;
use crate::{CorrelationHeatmap, GraphRenderer, TopEntitiesChart, TrendChart};
use epitrend_common::Result;
use epitrend_config::{Config, EnabledGraphsConfig};
use epitrend_data::{rolling_column_name, CorrelationMatrix, ObservationTable, COVERAGE_COLUMN};
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn};

/// Renders the enabled static images and interactive documents.
#[derive(Debug, Clone)]
pub struct GraphManager {
    enabled: EnabledGraphsConfig,
    entities: Vec<String>,
    trend_column: String,
    top_n: usize,
    top_column: String,
    bar_race_column: String,
    bar_race_limit: Option<usize>,
    scatter_x_column: String,
    scatter_y_column: String,
    width: u32,
    height: u32,
    figures_dir: PathBuf,
    html_dir: PathBuf,
}

impl GraphManager {
    /// Creates a manager from the loaded configuration.
    pub fn new(config: &Config) -> Self {
        let graphs = &config.graphs;
        Self {
            enabled: graphs.enabled,
            entities: config.data.entities.clone(),
            trend_column: rolling_column_name(
                &config.analysis.rolling_column,
                config.analysis.rolling_window,
            ),
            top_n: graphs.top_n,
            top_column: graphs.top_column.clone(),
            bar_race_column: graphs.bar_race_column.clone(),
            bar_race_limit: graphs.bar_race_limit,
            scatter_x_column: graphs.scatter_x_column.clone(),
            scatter_y_column: graphs.scatter_y_column.clone(),
            width: graphs.width,
            height: graphs.height,
            figures_dir: config.output.figures_dir.clone(),
            html_dir: config.output.html_dir.clone(),
        }
    }

    /// Column drawn by both trend outputs.
    pub fn trend_column(&self) -> &str {
        &self.trend_column
    }

    /// Entities drawn by the trend outputs.
    ///
    /// The configured allow-list when it is set, otherwise the top entities
    /// by the ranking column.
    pub fn trend_entities(&self, table: &ObservationTable) -> Result<Vec<String>> {
        if !self.entities.is_empty() {
            return Ok(self.entities.clone());
        }
        Ok(top_entities_by_max(table, &self.top_column, self.top_n)?
            .into_iter()
            .map(|(entity, _)| entity)
            .collect())
    }

    /// Renders every enabled output and returns the written paths.
    ///
    /// Both output directories must already exist.
    pub fn render_all(
        &self,
        table: &ObservationTable,
        correlation: &CorrelationMatrix,
    ) -> Result<Vec<PathBuf>> {
        let _span = info_span!("visualize").entered();
        let mut written = Vec::new();
        let enabled = self.enabled;
        let needs_entities = enabled.cases_trend || enabled.vaccination_rate || enabled.interactive_trend;
        let entities = if needs_entities {
            self.trend_entities(table)?
        } else {
            Vec::new()
        };
        debug!("Trend entities: {}", entities.join(", "));

        if enabled.cases_trend {
            let mut chart = TrendChart::new(entities.clone(), self.trend_column.as_str());
            self.apply_size(&mut chart);
            self.render_one(&chart, table, &self.figures_dir, &mut written)?;
        }

        if enabled.vaccination_rate {
            let mut chart = TrendChart::bounded(entities.clone(), COVERAGE_COLUMN);
            self.apply_size(&mut chart);
            self.render_one(&chart, table, &self.figures_dir, &mut written)?;
        }

        if enabled.correlation_heatmap {
            if correlation.len() < 2 {
                warn!(
                    "Correlation matrix has {} column(s); skipping the heatmap",
                    correlation.len()
                );
            } else {
                let heatmap = CorrelationHeatmap::new();
                self.render_one(&heatmap, correlation, &self.figures_dir, &mut written)?;
            }
        }

        if enabled.top_entities {
            let chart = TopEntitiesChart::new(self.top_n, self.top_column.as_str());
            self.render_one(&chart, table, &self.figures_dir, &mut written)?;
        }

        if enabled.any_static() {
            info!("Static figures generated.");
        }

        if enabled.interactive_trend {
            let trend = InteractiveTrend::new(entities, self.trend_column.as_str());
            self.render_one(&trend, table, &self.html_dir, &mut written)?;
        }

        if enabled.interactive_scatter {
            let scatter = InteractiveScatter::new(
                self.scatter_x_column.as_str(),
                self.scatter_y_column.as_str(),
            );
            self.render_one(&scatter, table, &self.html_dir, &mut written)?;
        }

        if enabled.bar_race {
            let race =
                BarRace::new(self.bar_race_column.as_str()).with_limit(self.bar_race_limit);
            self.render_one(&race, table, &self.html_dir, &mut written)?;
        }

        if enabled.any_interactive() {
            info!("Interactive visualizations saved.");
        }

        Ok(written)
    }

    fn apply_size(&self, chart: &mut TrendChart) {
        chart.config.width = self.width;
        chart.config.height = self.height;
    }

    fn render_one<R: GraphRenderer>(
        &self,
        renderer: &R,
        data: &R::Data,
        dir: &Path,
        written: &mut Vec<PathBuf>,
    ) -> Result<()> {
        let path = dir.join(renderer.file_name());
        debug!(
            "Rendering {} ({}) to {}",
            renderer.name(),
            renderer.description(),
            path.display()
        );
        renderer.render(data, &path)?;
        written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use epitrend_common::test_utils::dataset_fixtures;
    use epitrend_data::{
        clean, correlation_matrix, coverage_ratio, parse_csv_str, rolling_average, SourceColumns,
    };

    fn html_only_config(dir: &Path) -> Config {
        let mut config = Config::default();
        config.graphs.enabled = EnabledGraphsConfig {
            cases_trend: false,
            vaccination_rate: false,
            correlation_heatmap: false,
            top_entities: false,
            interactive_trend: true,
            interactive_scatter: true,
            bar_race: true,
        };
        config.output.figures_dir = dir.join("figures");
        config.output.html_dir = dir.join("html");
        config
    }

    fn analysed_table() -> ObservationTable {
        let raw = parse_csv_str(&dataset_fixtures::owid_sample_csv(), &SourceColumns::default()).unwrap();
        let mut table = clean(raw, None);
        rolling_average(&mut table, "new_cases", 7).unwrap();
        coverage_ratio(&mut table, "people_vaccinated", "population").unwrap();
        table
    }

    #[test]
    fn test_trend_column_follows_rolling_settings() {
        let mut config = Config::default();
        config.analysis.rolling_column = "new_deaths".to_string();
        config.analysis.rolling_window = 14;
        assert_eq!(GraphManager::new(&config).trend_column(), "new_deaths_rolling_14d");
    }

    #[test]
    fn test_trend_entities_fall_back_to_top_ranked() {
        let mut config = Config::default();
        config.data.entities.clear();
        config.graphs.top_n = 2;
        let manager = GraphManager::new(&config);
        assert_eq!(
            manager.trend_entities(&analysed_table()).unwrap(),
            vec!["India".to_string(), "Germany".to_string()]
        );

        config.data.entities = vec!["France".to_string()];
        let manager = GraphManager::new(&config);
        assert_eq!(
            manager.trend_entities(&analysed_table()).unwrap(),
            vec!["France".to_string()]
        );
    }

    #[test]
    fn test_render_all_writes_enabled_documents() {
        let dir = tempfile::tempdir().unwrap();
        let config = html_only_config(dir.path());
        std::fs::create_dir_all(&config.output.html_dir).unwrap();

        let table = analysed_table();
        let matrix = correlation_matrix(&table, &["new_cases".to_string()], 8).unwrap();
        let written = GraphManager::new(&config).render_all(&table, &matrix).unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "cases_trend_interactive.html",
                "scatter_interactive.html",
                "bar_race.html"
            ]
        );
        assert!(written.iter().all(|p| p.starts_with(&config.output.html_dir) && p.exists()));
        assert!(!config.output.figures_dir.exists());
    }

    #[test]
    fn test_documents_carry_renderer_description() {
        let dir = tempfile::tempdir().unwrap();
        let config = html_only_config(dir.path());
        std::fs::create_dir_all(&config.output.html_dir).unwrap();

        let table = analysed_table();
        let matrix = correlation_matrix(&table, &[], 8).unwrap();
        GraphManager::new(&config).render_all(&table, &matrix).unwrap();

        let race = std::fs::read_to_string(config.output.html_dir.join(BarRace::FILE_NAME)).unwrap();
        let expected = BarRace::new("total_cases").description();
        assert!(race.contains(&format!(r#"<meta name="description" content="{expected}">"#)));

        let scatter =
            std::fs::read_to_string(config.output.html_dir.join(InteractiveScatter::FILE_NAME)).unwrap();
        assert!(!scatter.contains(expected));
    }

    #[test]
    fn test_nothing_enabled_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = html_only_config(dir.path());
        config.graphs.enabled.interactive_trend = false;
        config.graphs.enabled.interactive_scatter = false;
        config.graphs.enabled.bar_race = false;

        let table = analysed_table();
        let matrix = correlation_matrix(&table, &[], 8).unwrap();
        let written = GraphManager::new(&config).render_all(&table, &matrix).unwrap();
        assert!(written.is_empty());
    }

    #[test]
    fn test_heatmap_is_skipped_for_a_single_column() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = html_only_config(dir.path());
        config.graphs.enabled = EnabledGraphsConfig {
            cases_trend: false,
            vaccination_rate: false,
            correlation_heatmap: true,
            top_entities: false,
            interactive_trend: false,
            interactive_scatter: false,
            bar_race: false,
        };

        let table = analysed_table();
        let matrix = correlation_matrix(&table, &["new_cases".to_string()], 8).unwrap();
        assert_eq!(matrix.len(), 1);
        let written = GraphManager::new(&config).render_all(&table, &matrix).unwrap();
        assert!(written.is_empty());
    }
}
