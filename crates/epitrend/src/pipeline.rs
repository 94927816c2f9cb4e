//! The fixed load → clean → analyze → visualize run.

use crate::error::{AppError, AppResult};
use epitrend_common::{format_count, format_date, EpiError};
use epitrend_config::Config;
use epitrend_data::{
    clean, correlation_matrix, coverage_ratio, fetch_remote, find_peaks, flag_outliers, load,
    normalize_column, rolling_average, write_snapshot, CorrelationMatrix, ObservationTable,
    PeakRecord, SourceColumns,
};
use epitrend_graphs::GraphManager;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, info_span, warn};

/// Summary of a completed run.
#[derive(Debug)]
pub struct PipelineReport {
    /// Rows left after cleaning.
    pub rows: usize,
    /// Where the cleaned snapshot was written.
    pub snapshot: PathBuf,
    /// Peak per entity of the configured column.
    pub peaks: Vec<PeakRecord>,
    /// Columns of the correlation matrix.
    pub correlation_columns: Vec<String>,
    /// Every rendered image and document.
    pub outputs: Vec<PathBuf>,
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every stage ran.
    Completed(PipelineReport),
    /// The local dataset does not exist; guidance was logged.
    SourceMissing,
}

/// Creates the snapshot parent and both output directories.
pub fn prepare_output_dirs(config: &Config) -> AppResult<()> {
    let output = &config.output;
    let snapshot_dir = output
        .processed_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty());

    for dir in snapshot_dir
        .into_iter()
        .chain([output.figures_dir.as_path(), output.html_dir.as_path()])
    {
        fs::create_dir_all(dir).map_err(|source| AppError::OutputDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Runs every stage against `config`.
///
/// Output directories are created first. A missing local dataset ends the
/// run early with [`RunOutcome::SourceMissing`]; every other failure is an
/// error.
pub fn run(config: &Config) -> AppResult<RunOutcome> {
    prepare_output_dirs(config)?;

    info!("[1/5] Loading data...");
    let table = match load_source(config) {
        Ok(table) => table,
        Err(err) if err.is_missing_source() => {
            report_missing_source(config);
            return Ok(RunOutcome::SourceMissing);
        }
        Err(err) => return Err(err.into()),
    };
    info!("Loaded {} rows.", format_count(table.len()));

    info!("[2/5] Cleaning and preprocessing...");
    let table = {
        let _span = info_span!("clean").entered();
        clean(table, config.data.entity_filter())
    };
    write_snapshot(&table, &config.output.processed_path)?;

    info!("[3/5] Analysing...");
    let (table, correlation, peaks) = analyze(config, table)?;

    info!("[4/5] Generating visualizations...");
    let outputs = GraphManager::new(config).render_all(&table, &correlation)?;
    info!("[5/5] {} outputs written.", outputs.len());

    Ok(RunOutcome::Completed(PipelineReport {
        rows: table.len(),
        snapshot: config.output.processed_path.clone(),
        peaks,
        correlation_columns: correlation.columns,
        outputs,
    }))
}

fn load_source(config: &Config) -> epitrend_common::Result<ObservationTable> {
    let _span = info_span!("load").entered();
    let data = &config.data;
    let columns = SourceColumns::new(data.entity_column.as_str(), data.date_column.as_str());

    if data.fetch_remote {
        fetch_remote(
            &data.source_url,
            Duration::from_secs(data.request_timeout_seconds),
            &columns,
        )
    } else {
        load(&data.source_path, data.format, &columns)
    }
}

fn report_missing_source(config: &Config) {
    let data = &config.data;
    warn!("Local file not found: {}", data.source_path.display());
    warn!("Download the dataset from {}", data.source_url);
    warn!(
        "and place it at {}, or enable data.fetch_remote",
        data.source_path.display()
    );
}

fn analyze(
    config: &Config,
    mut table: ObservationTable,
) -> Result<(ObservationTable, CorrelationMatrix, Vec<PeakRecord>), EpiError> {
    let _span = info_span!("analyze").entered();
    let analysis = &config.analysis;

    for column in &analysis.normalize_columns {
        normalize_column(&mut table, column)?;
    }
    for column in &analysis.outlier_columns {
        let flag = flag_outliers(&mut table, column, analysis.outlier_z_threshold)?;
        let flagged = table.flag_column(&flag)?.iter().filter(|f| **f).count();
        info!("{flagged} outliers flagged in '{column}'.");
    }

    rolling_average(&mut table, &analysis.rolling_column, analysis.rolling_window)?;
    coverage_ratio(
        &mut table,
        &analysis.vaccinated_column,
        &analysis.population_column,
    )?;
    let correlation = correlation_matrix(
        &table,
        &analysis.correlation_columns,
        analysis.correlation_fallback_limit,
    )?;

    let peaks = find_peaks(&table, &analysis.peak_column)?;
    for peak in &peaks {
        match (peak.date_of_peak, peak.peak_value) {
            (Some(date), Some(value)) => info!(
                "Peak {} for {}: {} on {}",
                analysis.peak_column,
                peak.entity,
                format_count(value_as_count(value)),
                format_date(date)
            ),
            _ => info!("Peak {} for {}: no data", analysis.peak_column, peak.entity),
        }
    }

    Ok((table, correlation, peaks))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn value_as_count(value: f64) -> usize {
    if value.is_finite() && value > 0.0 {
        value.round() as usize
    } else {
        0
    }
}
