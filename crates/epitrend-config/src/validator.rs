//! Runtime validation of a loaded configuration.

use crate::schema::Config;
use epitrend_common::EpiError;

/// A single configuration problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a configuration, reporting every problem at once.
    pub fn validate(config: &Config) -> Result<(), EpiError> {
        let issues = Self::collect_issues(config);
        let Some(first) = issues.first() else {
            return Ok(());
        };

        let message = issues
            .iter()
            .map(|issue| format!("{}: {}", issue.field, issue.message))
            .collect::<Vec<_>>()
            .join("; ");
        Err(EpiError::validation_field(message, first.field))
    }

    /// Lists every problem in the configuration.
    pub fn collect_issues(config: &Config) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        let mut push = |field: &'static str, message: &str| {
            issues.push(ValidationIssue {
                field,
                message: message.to_string(),
            });
        };

        let data = &config.data;
        if data.entity_column.trim().is_empty() {
            push("data.entity_column", "must not be empty");
        }
        if data.date_column.trim().is_empty() {
            push("data.date_column", "must not be empty");
        }
        if data.entity_column == data.date_column {
            push("data.date_column", "must differ from data.entity_column");
        }
        if data.fetch_remote {
            if let Err(e) = url::Url::parse(&data.source_url) {
                push("data.source_url", &format!("invalid URL: {e}"));
            }
            if data.request_timeout_seconds == 0 {
                push("data.request_timeout_seconds", "must be greater than zero");
            }
        } else if data.source_path.as_os_str().is_empty() {
            push("data.source_path", "must not be empty");
        }

        let analysis = &config.analysis;
        if analysis.rolling_window == 0 {
            push("analysis.rolling_window", "must be greater than zero");
        }
        if analysis.rolling_column.trim().is_empty() {
            push("analysis.rolling_column", "must not be empty");
        }
        if analysis.peak_column.trim().is_empty() {
            push("analysis.peak_column", "must not be empty");
        }
        if analysis.correlation_fallback_limit < 2 {
            push("analysis.correlation_fallback_limit", "must be at least 2");
        }
        if !(analysis.outlier_z_threshold.is_finite() && analysis.outlier_z_threshold > 0.0) {
            push("analysis.outlier_z_threshold", "must be a positive number");
        }

        let graphs = &config.graphs;
        if graphs.top_n == 0 {
            push("graphs.top_n", "must be greater than zero");
        }
        if graphs.bar_race_limit == Some(0) {
            push("graphs.bar_race_limit", "must be greater than zero when set");
        }
        if graphs.width < 200 || graphs.height < 200 {
            push("graphs.width", "images must be at least 200x200 pixels");
        }

        issues
    }
}
