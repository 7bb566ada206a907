//! Container nodes: ordered composites, headed sections, bootstrap grids.
//!
//! Containers own their children, so a node can never have two parents:
//! attaching a subtree moves it. Children render in insertion order and the
//! order never changes after `add`.

use crate::dispatch::{default_dispatcher, TypeDispatcher};
use crate::error::{Error, Result};
use crate::node::Render;
use crate::value::Value;

/// An ordered sequence of child nodes.
#[derive(Default)]
pub struct Composite {
  children: Vec<Box<dyn Render>>,
}

impl Composite {
  pub fn new() -> Self {
    Self::default()
  }

  /// Normalize `value` through the process-default dispatcher and append it.
  ///
  /// Unlike report tools whose `add` returns the created child for chained
  /// building, children here are built first and attached afterwards: fill a
  /// [`Section`] or [`Grid`], then hand it over with [`Composite::push`].
  /// Attaching moves the subtree, so no node can end up under two parents.
  pub fn add(&mut self, value: impl Into<Value>) -> Result<()> {
    self.add_with(default_dispatcher(), value)
  }

  /// Normalize `value` through `dispatcher` and append it.
  pub fn add_with(&mut self, dispatcher: &TypeDispatcher, value: impl Into<Value>) -> Result<()> {
    self.children.push(dispatcher.normalize(value)?);
    Ok(())
  }

  /// Attach a pre-built node or subtree.
  pub fn push(&mut self, node: impl Render + 'static) {
    self.children.push(Box::new(node));
  }

  pub fn len(&self) -> usize {
    self.children.len()
  }

  pub fn is_empty(&self) -> bool {
    self.children.is_empty()
  }

  pub(crate) fn nodes(&self) -> &[Box<dyn Render>] {
    &self.children
  }
}

impl Render for Composite {
  fn render(&self, depth: usize) -> Result<String> {
    self.children.iter().map(|c| c.render(depth)).collect()
  }
}

/// A heading with nested content; the heading level is the render depth.
pub struct Section {
  title: String,
  children: Composite,
}

impl Section {
  pub fn new(title: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      children: Composite::new(),
    }
  }

  pub fn add(&mut self, value: impl Into<Value>) -> Result<()> {
    self.children.add(value)
  }

  pub fn add_with(&mut self, dispatcher: &TypeDispatcher, value: impl Into<Value>) -> Result<()> {
    self.children.add_with(dispatcher, value)
  }

  pub fn push(&mut self, node: impl Render + 'static) {
    self.children.push(node)
  }

  pub fn title(&self) -> &str {
    &self.title
  }
}

impl Render for Section {
  fn render(&self, depth: usize) -> Result<String> {
    // h7+ is not valid HTML; clamp instead of degrading silently.
    let level = depth.clamp(1, 6);
    Ok(format!(
      "<div><h{level}>{title}</h{level}>{content}</div>",
      title = self.title,
      content = self.children.render(depth + 1)?
    ))
  }
}

/// Valid bootstrap column counts: divisors of the 12-unit grid row.
const VALID_COLUMNS: [usize; 6] = [1, 2, 3, 4, 6, 12];

/// A bootstrap grid that wraps its children into rows of `columns` cells.
pub struct Grid {
  columns: usize,
  children: Composite,
}

impl Grid {
  /// Create a grid. `columns` must be one of 1, 2, 3, 4, 6 or 12.
  pub fn new(columns: usize) -> Result<Self> {
    if !VALID_COLUMNS.contains(&columns) {
      return Err(Error::invalid_config(format!(
        "grid columns must be one of 1, 2, 3, 4, 6 or 12 (got {columns})"
      )));
    }
    Ok(Self {
      columns,
      children: Composite::new(),
    })
  }

  pub fn add(&mut self, value: impl Into<Value>) -> Result<()> {
    self.children.add(value)
  }

  pub fn add_with(&mut self, dispatcher: &TypeDispatcher, value: impl Into<Value>) -> Result<()> {
    self.children.add_with(dispatcher, value)
  }

  pub fn push(&mut self, node: impl Render + 'static) {
    self.children.push(node)
  }

  pub fn columns(&self) -> usize {
    self.columns
  }
}

impl Render for Grid {
  fn render(&self, depth: usize) -> Result<String> {
    let nodes = self.children.nodes();
    if nodes.is_empty() {
      return Ok(String::new());
    }

    let k = self.columns;
    let span = 12 / k;
    let mut out = String::new();
    for (i, child) in nodes.iter().enumerate() {
      if i % k == 0 {
        out.push_str("<div class='row'>");
      }
      out.push_str(&format!(
        "<div class='col-md-{span}'>{}</div>",
        child.render(depth)?
      ));
      // Close the row at the k-th cell or at the final child, so every row
      // wrapper is closed exactly once even when the last row is partial.
      if (i + 1) % k == 0 || i + 1 == nodes.len() {
        out.push_str("</div>");
      }
    }
    Ok(out)
  }
}
