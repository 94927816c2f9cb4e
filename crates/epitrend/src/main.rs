//! Main entry point for epitrend.

use anyhow::Context;
use epitrend::{run, RunOutcome};
use epitrend_common::init_logging;
use epitrend_config::ConfigLoader;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load().context("failed to load configuration")?;
    init_logging(&config.logging).context("failed to initialize logging")?;

    info!("Starting epitrend pipeline");

    match run(&config) {
        Ok(RunOutcome::Completed(report)) => {
            info!(
                rows = report.rows,
                outputs = report.outputs.len(),
                "Pipeline complete. Results are in {} and {}",
                config.output.figures_dir.display(),
                config.output.html_dir.display()
            );
            Ok(())
        }
        Ok(RunOutcome::SourceMissing) => Ok(()),
        Err(e) => {
            error!(category = e.category(), "Pipeline failed: {}", e);
            Err(e.into())
        }
    }
}
