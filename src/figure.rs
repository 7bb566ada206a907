//! Chart figures and the pluggable renderer capability.
//!
//! Rendering a chart is delegated to a [`FigureRenderer`]; the built-in
//! [`PlotlyHtml`] emits a plotly div with an inline `Plotly.newPlot` call.
//! The fragment never contains the plotly script itself: that is supplied
//! exactly once through the asset header (see [`crate::resource`]).

use std::sync::atomic::{AtomicU64, Ordering};

use base64::Engine;
use serde_json::Value as Json;

use crate::error::Result;

/// A chart in one of the two supported representations.
#[derive(Debug, Clone)]
pub enum Figure {
  /// A plotly figure spec: an object with `data` traces and an optional
  /// `layout`. A bare trace object is accepted and treated as a single-trace
  /// figure.
  Plotly(Json),
  /// A pre-rasterized PNG image, embedded as a base64 data URL.
  Png(Vec<u8>),
}

/// Capability seam for turning a [`Figure`] into an embeddable fragment.
pub trait FigureRenderer: Send + Sync {
  /// Produce an embeddable HTML fragment for `figure`.
  ///
  /// Must not include the plotting script tag; the header emits it once.
  fn render_figure(&self, figure: &Figure) -> Result<String>;
}

/// Built-in figure renderer.
#[derive(Debug, Default)]
pub struct PlotlyHtml;

// Ids only need to be unique within a document; a process counter is enough
// and keeps fragments deterministic per process order.
static NEXT_PLOT_ID: AtomicU64 = AtomicU64::new(0);

impl FigureRenderer for PlotlyHtml {
  fn render_figure(&self, figure: &Figure) -> Result<String> {
    match figure {
      Figure::Plotly(spec) => {
        let id = NEXT_PLOT_ID.fetch_add(1, Ordering::Relaxed);
        let (data, layout) = split_figure_spec(spec);
        Ok(format!(
          "<div id=\"plot-{id}\" class=\"plotly-graph-div\"></div>\
           <script type=\"text/javascript\">\
           Plotly.newPlot(\"plot-{id}\", {data}, {layout}, {{\"showLink\": false}});\
           </script>"
        ))
      }
      Figure::Png(bytes) => {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(format!(
          "<img class=\"img-responsive\" src=\"data:image/png;base64,{encoded}\">"
        ))
      }
    }
  }
}

/// Split a figure spec into its `data` and `layout` JSON literals.
fn split_figure_spec(spec: &Json) -> (String, String) {
  let data = match spec.get("data") {
    Some(data @ Json::Array(_)) => data.clone(),
    _ => Json::Array(vec![spec.clone()]),
  };
  let layout = spec
    .get("layout")
    .cloned()
    .unwrap_or_else(|| Json::Object(Default::default()));
  (data.to_string(), layout.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn plotly_fragment_has_div_and_call_but_no_script_src() {
    let fig = Figure::Plotly(json!({
      "data": [{"x": [1, 2], "y": [3, 4], "type": "scatter"}],
      "layout": {"title": "t"}
    }));
    let html = PlotlyHtml.render_figure(&fig).unwrap();
    assert!(html.contains("plotly-graph-div"));
    assert!(html.contains("Plotly.newPlot"));
    assert!(html.contains("\"title\":\"t\""));
    assert!(!html.contains("src=\"http"));
  }

  #[test]
  fn bare_trace_becomes_single_trace_figure() {
    let fig = Figure::Plotly(json!({"x": [1], "y": [2], "type": "bar"}));
    let html = PlotlyHtml.render_figure(&fig).unwrap();
    assert!(html.contains("[{\"type\":\"bar\""));
  }

  #[test]
  fn png_figures_embed_as_data_url() {
    let fig = Figure::Png(b"hello".to_vec());
    let html = PlotlyHtml.render_figure(&fig).unwrap();
    assert!(html.contains("data:image/png;base64,aGVsbG8="));
  }

  #[test]
  fn plot_ids_are_unique() {
    let fig = Figure::Plotly(json!({"data": []}));
    let a = PlotlyHtml.render_figure(&fig).unwrap();
    let b = PlotlyHtml.render_figure(&fig).unwrap();
    assert_ne!(a, b);
  }
}
