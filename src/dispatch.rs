//! Ordered type dispatch: convert input values into render nodes.
//!
//! A [`TypeDispatcher`] owns a small, explicitly ordered list of conversion
//! rules. `normalize` walks the list and the first rule that claims the value
//! wins; rules are not mutually exclusive at the type level, so order is
//! authoritative. A value no rule claims fails with
//! [`Error::UnsupportedType`], naming the runtime type.
//!
//! The dispatcher also carries the optional capabilities (table formatting,
//! figure rendering) and injects them into the leaves it builds, so capability
//! absence is a constructor-time property of the node, not a runtime import
//! check.

use std::sync::{Arc, OnceLock};

use crate::error::{Error, Result};
use crate::figure::{FigureRenderer, PlotlyHtml};
use crate::format::{HtmlTableFormatter, TableFormatter};
use crate::node::{ChartEmbed, FrameTable, KeyValueTable, MatrixTable, RawText, Render};
use crate::value::Value;

/// Optional external capabilities injected into leaf nodes at build time.
#[derive(Clone)]
pub struct Capabilities {
  pub table_formatter: Option<Arc<dyn TableFormatter>>,
  pub figure_renderer: Option<Arc<dyn FigureRenderer>>,
}

impl Default for Capabilities {
  fn default() -> Self {
    Self {
      table_formatter: Some(Arc::new(HtmlTableFormatter)),
      figure_renderer: Some(Arc::new(PlotlyHtml)),
    }
  }
}

impl Capabilities {
  /// Drop the plotting capability; chart nodes will fail at render time.
  pub fn without_plotting(mut self) -> Self {
    self.figure_renderer = None;
    self
  }

  /// Drop the table-formatting capability; tabular leaves degrade to their
  /// plain string form.
  pub fn without_table_formatting(mut self) -> Self {
    self.table_formatter = None;
    self
  }
}

/// A single conversion rule: claim the value and build a node, or hand the
/// value back unchanged for the next rule.
pub struct Rule {
  pub name: &'static str,
  pub convert: fn(Value, &Capabilities) -> std::result::Result<Box<dyn Render>, Value>,
}

/// Converts arbitrary [`Value`]s into render nodes via ordered rules.
pub struct TypeDispatcher {
  rules: Vec<Rule>,
  caps: Capabilities,
}

impl Default for TypeDispatcher {
  fn default() -> Self {
    Self::new(Capabilities::default())
  }
}

impl TypeDispatcher {
  /// Dispatcher with the built-in rule order and the given capabilities.
  pub fn new(caps: Capabilities) -> Self {
    Self {
      rules: builtin_rules(),
      caps,
    }
  }

  /// Append a rule after the built-in ones.
  pub fn push_rule(&mut self, rule: Rule) {
    self.rules.push(rule);
  }

  /// Insert a rule at `index`; earlier rules take precedence.
  pub fn insert_rule(&mut self, index: usize, rule: Rule) {
    self.rules.insert(index, rule);
  }

  pub fn rule_names(&self) -> Vec<&'static str> {
    self.rules.iter().map(|r| r.name).collect()
  }

  /// Convert `value` into a render node. Pure; no side effects.
  pub fn normalize(&self, value: impl Into<Value>) -> Result<Box<dyn Render>> {
    let mut value = value.into();
    for rule in &self.rules {
      match (rule.convert)(value, &self.caps) {
        Ok(node) => return Ok(node),
        Err(unclaimed) => value = unclaimed,
      }
    }
    Err(Error::UnsupportedType {
      type_name: value.type_name().to_string(),
    })
  }
}

/// The built-in rules, in dispatch order.
fn builtin_rules() -> Vec<Rule> {
  vec![
    Rule {
      name: "node",
      convert: |value, _| match value {
        Value::Node(node) => Ok(node),
        other => Err(other),
      },
    },
    Rule {
      name: "scalar",
      convert: |value, _| match value {
        Value::Text(s) => Ok(Box::new(RawText::new(s))),
        Value::Int(i) => Ok(Box::new(RawText::new(i.to_string()))),
        Value::Float(f) => Ok(Box::new(RawText::new(f.to_string()))),
        other => Err(other),
      },
    },
    Rule {
      name: "pairs",
      convert: |value, _| match value {
        Value::Pairs(entries) => Ok(Box::new(KeyValueTable::new(entries))),
        other => Err(other),
      },
    },
    Rule {
      name: "matrix",
      convert: |value, caps| match value {
        Value::Matrix(m) => {
          Ok(Box::new(MatrixTable::new(m).with_formatter(caps.table_formatter.clone())))
        }
        other => Err(other),
      },
    },
    Rule {
      name: "frame",
      convert: |value, caps| match value {
        Value::Frame(f) => {
          Ok(Box::new(FrameTable::new(f).with_formatter(caps.table_formatter.clone())))
        }
        other => Err(other),
      },
    },
    Rule {
      name: "figure",
      convert: |value, caps| match value {
        Value::Figure(fig) => {
          Ok(Box::new(ChartEmbed::new(fig).with_renderer(caps.figure_renderer.clone())))
        }
        other => Err(other),
      },
    },
  ]
}

/// Process-wide default dispatcher used by `Composite::add`.
pub fn default_dispatcher() -> &'static TypeDispatcher {
  static DISPATCHER: OnceLock<TypeDispatcher> = OnceLock::new();
  DISPATCHER.get_or_init(TypeDispatcher::default)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::figure::Figure;
  use crate::value::{Frame, Matrix};
  use serde_json::json;

  #[test]
  fn scalars_become_raw_text() {
    let d = TypeDispatcher::default();
    assert_eq!(d.normalize("hi").unwrap().render(1).unwrap(), "hi");
    assert_eq!(d.normalize(7).unwrap().render(1).unwrap(), "7");
    assert_eq!(d.normalize(2.5).unwrap().render(1).unwrap(), "2.5");
  }

  #[test]
  fn nodes_pass_through_unchanged() {
    let d = TypeDispatcher::default();
    let node = d.normalize(Value::node(RawText::new("x"))).unwrap();
    assert_eq!(node.render(1).unwrap(), "x");
  }

  #[test]
  fn supported_kinds_render_without_error() {
    let d = TypeDispatcher::default();
    let values: Vec<Value> = vec![
      Value::from("text"),
      Value::from(1),
      Value::from(1.5),
      Value::from(vec![("k", "v")]),
      Value::from(Matrix::new(vec![vec![1.0]])),
      Value::from(Frame::new(["c"])),
      Value::from(Figure::Plotly(json!({"data": []}))),
    ];
    for value in values {
      let node = d.normalize(value).unwrap();
      node.render(1).unwrap();
    }
  }

  #[test]
  fn unsupported_values_name_their_type() {
    let d = TypeDispatcher::default();
    let err = d.normalize(Value::other(3u8)).unwrap_err();
    match err {
      Error::UnsupportedType { type_name } => assert_eq!(type_name, "u8"),
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn custom_rules_extend_the_dispatch_order() {
    let mut d = TypeDispatcher::default();
    d.push_rule(Rule {
      name: "bool",
      convert: |value, _| match value {
        Value::Other { value, type_name } => match value.downcast::<bool>() {
          Ok(b) => Ok(Box::new(RawText::new(if *b { "yes" } else { "no" }))),
          Err(value) => Err(Value::Other { value, type_name }),
        },
        other => Err(other),
      },
    });
    let node = d.normalize(Value::other(true)).unwrap();
    assert_eq!(node.render(1).unwrap(), "yes");
    // Still unsupported: a type the new rule does not claim.
    assert!(d.normalize(Value::other('c')).is_err());
  }

  #[test]
  fn earlier_rules_win() {
    let mut d = TypeDispatcher::default();
    d.insert_rule(0, Rule {
      name: "shadow-text",
      convert: |value, _| match value {
        Value::Text(_) => Ok(Box::new(RawText::new("shadowed"))),
        other => Err(other),
      },
    });
    assert_eq!(d.normalize("hi").unwrap().render(1).unwrap(), "shadowed");
  }

  #[test]
  fn dispatch_respects_missing_plotting_capability() {
    let d = TypeDispatcher::new(Capabilities::default().without_plotting());
    let node = d.normalize(Figure::Plotly(json!({"data": []}))).unwrap();
    assert!(matches!(node.render(1), Err(Error::PlottingUnavailable)));
  }
}
