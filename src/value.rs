//! Input values accepted by the dispatcher.
//!
//! [`Value`] is the closed set of things a caller may hand to
//! [`Composite::add`](crate::tree::Composite::add): already-built nodes,
//! scalars, ordered key/value pairs, numeric matrices, tabular frames and
//! chart figures. Anything else travels through [`Value::Other`], which
//! carries the runtime type name so unsupported inputs can be reported
//! precisely.

use std::any::Any;
use std::fmt;

use crate::figure::Figure;
use crate::node::Render;

/// A 2-D numeric matrix, row-major.
///
/// Rows need not all have the same length; ragged rows are rendered as-is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matrix {
  pub rows: Vec<Vec<f64>>,
}

impl Matrix {
  pub fn new(rows: Vec<Vec<f64>>) -> Self {
    Self { rows }
  }

  pub fn n_rows(&self) -> usize {
    self.rows.len()
  }

  /// Width of the widest row.
  pub fn n_cols(&self) -> usize {
    self.rows.iter().map(Vec::len).max().unwrap_or(0)
  }
}

impl fmt::Display for Matrix {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, row) in self.rows.iter().enumerate() {
      if i > 0 {
        writeln!(f)?;
      }
      let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
      write!(f, "{}", line.join(" "))?;
    }
    Ok(())
  }
}

/// A single cell of a [`Frame`].
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
  Num(f64),
  Text(String),
}

impl fmt::Display for Cell {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Cell::Num(v) => write!(f, "{v}"),
      Cell::Text(s) => write!(f, "{s}"),
    }
  }
}

impl From<f64> for Cell {
  fn from(v: f64) -> Self {
    Cell::Num(v)
  }
}

impl From<i64> for Cell {
  fn from(v: i64) -> Self {
    Cell::Num(v as f64)
  }
}

impl From<&str> for Cell {
  fn from(v: &str) -> Self {
    Cell::Text(v.to_string())
  }
}

impl From<String> for Cell {
  fn from(v: String) -> Self {
    Cell::Text(v)
  }
}

/// A tabular frame: named columns over rows of cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
  columns: Vec<String>,
  rows: Vec<Vec<Cell>>,
}

impl Frame {
  pub fn new(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
    Self {
      columns: columns.into_iter().map(Into::into).collect(),
      rows: Vec::new(),
    }
  }

  /// Append a row. Short rows are padded with empty cells at render time;
  /// extra cells beyond the column count are kept and rendered too.
  pub fn push_row(&mut self, row: impl IntoIterator<Item = impl Into<Cell>>) {
    self.rows.push(row.into_iter().map(Into::into).collect());
  }

  pub fn columns(&self) -> &[String] {
    &self.columns
  }

  pub fn rows(&self) -> &[Vec<Cell>] {
    &self.rows
  }

  pub fn n_rows(&self) -> usize {
    self.rows.len()
  }
}

impl fmt::Display for Frame {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.columns.join(" "))?;
    for row in &self.rows {
      let line: Vec<String> = row.iter().map(|c| c.to_string()).collect();
      write!(f, "\n{}", line.join(" "))?;
    }
    Ok(())
  }
}

/// The dispatchable input universe.
///
/// `From` impls cover the common cases so builder methods can take
/// `impl Into<Value>`. Conversion into render nodes happens in
/// [`TypeDispatcher`](crate::dispatch::TypeDispatcher).
pub enum Value {
  /// An already-built render node; passed through unchanged.
  Node(Box<dyn Render>),
  /// Raw HTML source. Not escaped.
  Text(String),
  Int(i64),
  Float(f64),
  /// Ordered key/value pairs. A `Vec` keeps insertion order; unordered maps
  /// are deliberately not accepted.
  Pairs(Vec<(String, String)>),
  Matrix(Matrix),
  Frame(Frame),
  Figure(Figure),
  /// Escape hatch for caller-defined kinds handled by custom dispatch rules.
  Other {
    type_name: &'static str,
    value: Box<dyn Any + Send>,
  },
}

impl Value {
  /// Wrap an arbitrary caller type for custom dispatch rules, capturing its
  /// runtime type name for error reporting.
  pub fn other<T: Any + Send>(value: T) -> Self {
    Value::Other {
      type_name: std::any::type_name::<T>(),
      value: Box::new(value),
    }
  }

  /// Wrap an already-built node.
  pub fn node(node: impl Render + 'static) -> Self {
    Value::Node(Box::new(node))
  }

  /// Name of the wrapped kind, used in `UnsupportedType` errors.
  pub fn type_name(&self) -> &str {
    match self {
      Value::Node(_) => "node",
      Value::Text(_) => "str",
      Value::Int(_) => "i64",
      Value::Float(_) => "f64",
      Value::Pairs(_) => "pairs",
      Value::Matrix(_) => "matrix",
      Value::Frame(_) => "frame",
      Value::Figure(_) => "figure",
      Value::Other { type_name, .. } => type_name,
    }
  }
}

impl fmt::Debug for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Value::{}", self.type_name())
  }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self {
    Value::Text(v.to_string())
  }
}

impl From<String> for Value {
  fn from(v: String) -> Self {
    Value::Text(v)
  }
}

impl From<i64> for Value {
  fn from(v: i64) -> Self {
    Value::Int(v)
  }
}

impl From<i32> for Value {
  fn from(v: i32) -> Self {
    Value::Int(v as i64)
  }
}

impl From<f64> for Value {
  fn from(v: f64) -> Self {
    Value::Float(v)
  }
}

impl From<Vec<(String, String)>> for Value {
  fn from(v: Vec<(String, String)>) -> Self {
    Value::Pairs(v)
  }
}

impl From<Vec<(&str, &str)>> for Value {
  fn from(v: Vec<(&str, &str)>) -> Self {
    Value::Pairs(
      v.into_iter()
        .map(|(k, val)| (k.to_string(), val.to_string()))
        .collect(),
    )
  }
}

impl From<Matrix> for Value {
  fn from(v: Matrix) -> Self {
    Value::Matrix(v)
  }
}

impl From<Vec<Vec<f64>>> for Value {
  fn from(v: Vec<Vec<f64>>) -> Self {
    Value::Matrix(Matrix::new(v))
  }
}

impl From<Frame> for Value {
  fn from(v: Frame) -> Self {
    Value::Frame(v)
  }
}

impl From<Figure> for Value {
  fn from(v: Figure) -> Self {
    Value::Figure(v)
  }
}

impl From<Box<dyn Render>> for Value {
  fn from(v: Box<dyn Render>) -> Self {
    Value::Node(v)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn matrix_dimensions() {
    let m = Matrix::new(vec![vec![1.0, 2.0, 3.0], vec![4.0]]);
    assert_eq!(m.n_rows(), 2);
    assert_eq!(m.n_cols(), 3);
    assert_eq!(Matrix::default().n_cols(), 0);
  }

  #[test]
  fn frame_rows_keep_order() {
    let mut f = Frame::new(["a", "b"]);
    f.push_row([1.0, 2.0]);
    f.push_row([3.0, 4.0]);
    assert_eq!(f.n_rows(), 2);
    assert_eq!(f.columns(), ["a", "b"]);
  }

  #[test]
  fn frame_display_fallback() {
    let mut f = Frame::new(["x"]);
    f.push_row(["hi"]);
    assert_eq!(f.to_string(), "x\nhi");
  }

  #[test]
  fn other_values_capture_type_name() {
    let v = Value::other(true);
    assert_eq!(v.type_name(), "bool");
  }

  #[test]
  fn scalar_conversions() {
    assert_eq!(Value::from(3i64).type_name(), "i64");
    assert_eq!(Value::from(3.5f64).type_name(), "f64");
    assert_eq!(Value::from("hi").type_name(), "str");
  }
}
