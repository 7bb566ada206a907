//! Tabular formatting capability.
//!
//! Matrix and frame leaves delegate their HTML table generation to a
//! [`TableFormatter`]; when the capability is absent they degrade to the
//! value's plain string form instead of failing. [`HtmlTableFormatter`] is
//! the built-in implementation.

use crate::value::{Cell, Frame, Matrix};

/// Bootstrap classes shared by every generated table.
pub const TABLE_CLASSES: &str = "table table-condensed table-striped table-hover table-bordered";

/// Capability seam for rendering tabular values as HTML.
pub trait TableFormatter: Send + Sync {
  /// Format a matrix clipped to `max_rows` x `max_cols`, header-less and
  /// index-less, with `sig_digits` significant digits per number.
  fn format_matrix(&self, matrix: &Matrix, max_rows: usize, max_cols: usize, sig_digits: usize)
    -> String;

  /// Format a full frame (no clipping) with column headers and a row index.
  fn format_frame(&self, frame: &Frame, sig_digits: usize) -> String;
}

/// Built-in HTML table formatter.
#[derive(Debug, Default)]
pub struct HtmlTableFormatter;

impl TableFormatter for HtmlTableFormatter {
  fn format_matrix(
    &self,
    matrix: &Matrix,
    max_rows: usize,
    max_cols: usize,
    sig_digits: usize,
  ) -> String {
    let mut body = String::new();
    for row in matrix.rows.iter().take(max_rows) {
      body.push_str("<tr>");
      for v in row.iter().take(max_cols) {
        body.push_str("<td>");
        body.push_str(&format_sig(*v, sig_digits));
        body.push_str("</td>");
      }
      body.push_str("</tr>");
    }
    format!("<table class='{TABLE_CLASSES}'><tbody>{body}</tbody></table>")
  }

  fn format_frame(&self, frame: &Frame, sig_digits: usize) -> String {
    let mut head = String::from("<tr><th></th>");
    for col in frame.columns() {
      head.push_str("<th>");
      head.push_str(col);
      head.push_str("</th>");
    }
    head.push_str("</tr>");

    let mut body = String::new();
    for (i, row) in frame.rows().iter().enumerate() {
      body.push_str(&format!("<tr><th>{i}</th>"));
      for cell in row {
        body.push_str("<td>");
        match cell {
          Cell::Num(v) => body.push_str(&format_sig(*v, sig_digits)),
          Cell::Text(s) => body.push_str(s),
        }
        body.push_str("</td>");
      }
      body.push_str("</tr>");
    }
    format!(
      "<table class='{TABLE_CLASSES}'><thead>{head}</thead><tbody>{body}</tbody></table>"
    )
  }
}

/// Format `value` with `sig` significant digits.
///
/// Mirrors printf `%g`: fixed notation for moderate magnitudes, exponent
/// notation for very large/small ones, trailing zeros stripped.
pub fn format_sig(value: f64, sig: usize) -> String {
  let sig = sig.max(1);
  if value == 0.0 {
    return "0".to_string();
  }
  if !value.is_finite() {
    return value.to_string();
  }

  let exp = value.abs().log10().floor() as i32;
  if exp < -4 || exp >= sig as i32 {
    let s = format!("{:.*e}", sig - 1, value);
    trim_exponent_zeros(&s)
  } else {
    let decimals = (sig as i32 - 1 - exp).max(0) as usize;
    let s = format!("{value:.decimals$}");
    trim_fraction_zeros(&s)
  }
}

fn trim_fraction_zeros(s: &str) -> String {
  if !s.contains('.') {
    return s.to_string();
  }
  s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn trim_exponent_zeros(s: &str) -> String {
  // "1.20e3" -> "1.2e3"; the mantissa is everything before 'e'.
  match s.split_once('e') {
    Some((mantissa, exp)) => format!("{}e{exp}", trim_fraction_zeros(mantissa)),
    None => s.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sig_formatting_matches_g_style() {
    assert_eq!(format_sig(0.5, 2), "0.5");
    assert_eq!(format_sig(1.0, 2), "1");
    assert_eq!(format_sig(3.14159, 3), "3.14");
    assert_eq!(format_sig(1234.5, 2), "1.2e3");
    assert_eq!(format_sig(0.000012, 2), "1.2e-5");
    assert_eq!(format_sig(0.0, 2), "0");
    assert_eq!(format_sig(-2.5, 2), "-2.5");
  }

  #[test]
  fn matrix_is_clipped_and_headerless() {
    let m = Matrix::new(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![7.0, 8.0, 9.0]]);
    let html = HtmlTableFormatter.format_matrix(&m, 2, 2, 2);
    assert_eq!(html.matches("<tr>").count(), 2);
    assert_eq!(html.matches("<td>").count(), 4);
    assert!(!html.contains("<thead>"));
    assert!(html.contains("<td>1</td>"));
    assert!(!html.contains("9"));
  }

  #[test]
  fn frame_keeps_headers_and_index() {
    let mut f = Frame::new(["name", "score"]);
    f.push_row([Cell::from("a"), Cell::from(1.23456)]);
    let html = HtmlTableFormatter.format_frame(&f, 3);
    assert!(html.contains("<thead>"));
    assert!(html.contains("<th>name</th>"));
    assert!(html.contains("<th>0</th>"));
    assert!(html.contains("<td>1.23</td>"));
  }
}
