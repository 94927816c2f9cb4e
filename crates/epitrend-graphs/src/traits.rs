//! Graph renderer trait definitions for polymorphic graph types.

use epitrend_common::{BoxedError, EpiError, Result};
use std::path::Path;

/// Result of the drawing calls inside a renderer.
///
/// Plotters reports failures through backend-specific error types; they are
/// boxed here and converted to [`EpiError::Graph`] once per chart.
pub type DrawResult<T> = std::result::Result<T, BoxedError>;

/// Trait for graph renderers that write one output file.
pub trait GraphRenderer {
    /// The type of data this renderer expects.
    type Data: ?Sized;

    /// Renders `data` to `path`; the file is complete when this returns.
    fn render(&self, data: &Self::Data, path: &Path) -> Result<()>;

    /// Gets the name of this graph type.
    fn name(&self) -> &'static str;

    /// Gets the description of this graph type.
    fn description(&self) -> &'static str;

    /// Default file name inside the output directory.
    fn file_name(&self) -> &'static str;
}

/// Converts a drawing failure into [`EpiError::Graph`], naming the chart and path.
pub fn draw_error(chart: &str, path: &Path) -> impl FnOnce(BoxedError) -> EpiError {
    let message = format!("failed to render {chart} to {}", path.display());
    move |source| EpiError::graph_boxed(message, source)
}
