//! The render contract and the terminal (leaf) node kinds.
//!
//! Everything that can appear in a report implements [`Render`]: produce an
//! HTML fragment given the current heading depth. Nodes are pure functions
//! of their own fields; depth is a render-time parameter, never stored, so
//! a subtree is depth-agnostic and reusable at any nesting level.
//!
//! None of the leaves escape their input. Callers are responsible for
//! producing safe markup.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::figure::{Figure, FigureRenderer};
use crate::format::{TableFormatter, TABLE_CLASSES};
use crate::value::{Frame, Matrix, Value};

/// Default display clip for matrices, matching the original report tool.
pub const DEFAULT_MAX_ROWS: usize = 50;
pub const DEFAULT_MAX_COLS: usize = 15;

/// Contract implemented by every renderable node.
pub trait Render: Send {
  /// Produce the HTML fragment for this node at heading depth `depth`.
  fn render(&self, depth: usize) -> Result<String>;
}

impl Render for Box<dyn Render> {
  fn render(&self, depth: usize) -> Result<String> {
    (**self).render(depth)
  }
}

impl std::fmt::Debug for dyn Render {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str("dyn Render")
  }
}

/// Raw HTML source rendered verbatim.
pub struct RawText {
  text: String,
}

impl RawText {
  pub fn new(text: impl Into<String>) -> Self {
    Self { text: text.into() }
  }
}

impl Render for RawText {
  fn render(&self, _depth: usize) -> Result<String> {
    Ok(self.text.clone())
  }
}

/// A `<p>` wrapper around a dispatched inner value.
pub struct Paragraph {
  inner: Box<dyn Render>,
}

impl Paragraph {
  /// Normalize `value` through the default dispatcher and wrap it.
  pub fn new(value: impl Into<Value>) -> Result<Self> {
    let inner = crate::dispatch::default_dispatcher().normalize(value)?;
    Ok(Self { inner })
  }
}

impl Render for Paragraph {
  fn render(&self, depth: usize) -> Result<String> {
    Ok(format!("<p>{}</p>", self.inner.render(depth)?))
  }
}

/// Key/value pairs rendered as a two-column table, in insertion order.
pub struct KeyValueTable {
  entries: Vec<(String, String)>,
}

impl KeyValueTable {
  pub fn new<K, V, I>(entries: I) -> Self
  where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
  {
    Self {
      entries: entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect(),
    }
  }
}

impl Render for KeyValueTable {
  fn render(&self, _depth: usize) -> Result<String> {
    let mut rows = String::new();
    for (k, v) in &self.entries {
      rows.push_str(&format!("<tr><th><b>{k}</b></th><td>{v}</td></tr>"));
    }
    Ok(format!(
      "<table class='{TABLE_CLASSES}'><tbody>{rows}</tbody></table>"
    ))
  }
}

/// A numeric matrix rendered as a clipped, header-less table.
pub struct MatrixTable {
  matrix: Matrix,
  max_rows: usize,
  max_cols: usize,
  formatter: Option<Arc<dyn TableFormatter>>,
}

impl MatrixTable {
  pub fn new(matrix: Matrix) -> Self {
    Self {
      matrix,
      max_rows: DEFAULT_MAX_ROWS,
      max_cols: DEFAULT_MAX_COLS,
      formatter: Some(Arc::new(crate::format::HtmlTableFormatter)),
    }
  }

  /// Override the display clip.
  pub fn with_limits(mut self, max_rows: usize, max_cols: usize) -> Self {
    self.max_rows = max_rows;
    self.max_cols = max_cols;
    self
  }

  /// Inject (or remove) the formatting capability.
  pub fn with_formatter(mut self, formatter: Option<Arc<dyn TableFormatter>>) -> Self {
    self.formatter = formatter;
    self
  }
}

impl Render for MatrixTable {
  fn render(&self, _depth: usize) -> Result<String> {
    match &self.formatter {
      Some(fmt) => Ok(format!(
        "<div class='table-responsive'>{}</div>",
        fmt.format_matrix(&self.matrix, self.max_rows, self.max_cols, 2)
      )),
      // Formatting capability absent: degrade to the plain string form.
      None => Ok(self.matrix.to_string()),
    }
  }
}

/// A tabular frame rendered in full, with headers and a row index.
pub struct FrameTable {
  frame: Frame,
  formatter: Option<Arc<dyn TableFormatter>>,
}

impl FrameTable {
  pub fn new(frame: Frame) -> Self {
    Self {
      frame,
      formatter: Some(Arc::new(crate::format::HtmlTableFormatter)),
    }
  }

  /// Inject (or remove) the formatting capability.
  pub fn with_formatter(mut self, formatter: Option<Arc<dyn TableFormatter>>) -> Self {
    self.formatter = formatter;
    self
  }
}

impl Render for FrameTable {
  fn render(&self, _depth: usize) -> Result<String> {
    match &self.formatter {
      Some(fmt) => Ok(format!(
        "<div class='table-responsive'>{}</div>",
        fmt.format_frame(&self.frame, 3)
      )),
      None => Ok(self.frame.to_string()),
    }
  }
}

/// A chart embed delegating to the figure-rendering capability.
pub struct ChartEmbed {
  figure: Figure,
  renderer: Option<Arc<dyn FigureRenderer>>,
}

impl ChartEmbed {
  pub fn new(figure: Figure) -> Self {
    Self {
      figure,
      renderer: Some(Arc::new(crate::figure::PlotlyHtml)),
    }
  }

  /// Inject (or remove) the plotting capability.
  pub fn with_renderer(mut self, renderer: Option<Arc<dyn FigureRenderer>>) -> Self {
    self.renderer = renderer;
    self
  }
}

impl Render for ChartEmbed {
  fn render(&self, _depth: usize) -> Result<String> {
    match &self.renderer {
      Some(r) => r.render_figure(&self.figure),
      None => Err(Error::PlottingUnavailable),
    }
  }
}
