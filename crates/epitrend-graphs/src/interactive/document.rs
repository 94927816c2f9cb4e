//! Plotly figure model and the standalone HTML page that hosts it.

use epitrend_common::{EpiError, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// plotly.js build loaded by every document.
pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.0.min.js";

/// One animation frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// Frame name, also used as the slider label.
    pub name: String,
    /// Traces shown in this frame.
    pub data: Vec<Value>,
}

/// A Plotly figure: traces, layout and optional animation frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotlyFigure {
    /// Initial traces.
    pub data: Vec<Value>,
    /// Layout object.
    pub layout: Value,
    /// Animation frames; empty for static figures.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<Frame>,
}

impl PlotlyFigure {
    /// Creates a figure without frames.
    pub const fn new(data: Vec<Value>, layout: Value) -> Self {
        Self {
            data,
            layout,
            frames: Vec::new(),
        }
    }

    /// Serializes the figure for embedding inside a `<script>` element.
    pub fn to_script_json(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(json.replace("</", "<\\/"))
    }

    /// Renders the complete HTML page; `description` fills the page's
    /// description meta tag.
    pub fn to_html(&self, title: &str, description: &str) -> Result<String> {
        let figure = self.to_script_json()?;
        let title = escape_html(title);
        let description = escape_html(description);
        Ok(format!(
            r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>{title}</title>
<meta name="description" content="{description}">
<script src="{PLOTLY_CDN}"></script>
<style>
html,body{{margin:0;padding:0;height:100%;font-family:system-ui,-apple-system,sans-serif;background:#fff}}
#figure{{width:100%;height:100vh}}
</style></head><body>
<div id="figure"></div>
<script>
var figure = {figure};
Plotly.newPlot('figure', figure.data, figure.layout, {{responsive: true}}).then(function () {{
  if (figure.frames) {{ Plotly.addFrames('figure', figure.frames); }}
}});
</script>
</body></html>
"#
        ))
    }

    /// Writes the HTML page to `path`; the parent directory must exist.
    pub fn write_html(&self, title: &str, description: &str, path: &Path) -> Result<()> {
        let html = self.to_html(title, description)?;
        fs::write(path, html).map_err(|e| {
            EpiError::graph_boxed(format!("failed to write {}", path.display()), Box::new(e))
        })
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_script_json_cannot_close_the_script_element() {
        let figure = PlotlyFigure::new(vec![json!({"name": "</script><b>"})], json!({}));
        let script = figure.to_script_json().unwrap();
        assert!(!script.contains("</script>"));
        assert!(script.contains(r"<\/script>"));
    }

    #[test]
    fn test_frames_are_omitted_when_empty() {
        let figure = PlotlyFigure::new(Vec::new(), json!({"title": "t"}));
        let value = serde_json::to_value(&figure).unwrap();
        assert!(value.get("frames").is_none());
        assert_eq!(value["layout"]["title"], "t");
    }

    #[test]
    fn test_html_loads_plotly_from_cdn() {
        let figure = PlotlyFigure::new(Vec::new(), json!({}));
        let html = figure.to_html("Cases & Deaths", "Daily \"new\" cases").unwrap();
        assert!(html.contains(PLOTLY_CDN));
        assert!(html.contains("<title>Cases &amp; Deaths</title>"));
        assert!(html.contains(r#"<meta name="description" content="Daily &quot;new&quot; cases">"#));
        assert!(html.contains("Plotly.newPlot('figure'"));
    }

    #[test]
    fn test_write_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figure.html");
        PlotlyFigure::new(Vec::new(), json!({})).write_html("t", "d", &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("<!DOCTYPE html>"));

        let missing = dir.path().join("nested/figure.html");
        assert!(PlotlyFigure::new(Vec::new(), json!({})).write_html("t", "d", &missing).is_err());
    }
}
