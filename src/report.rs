//! The report root: a title plus the body tree, and the unit of persistence.

use std::path::PathBuf;

use chrono::Local;

use crate::dispatch::TypeDispatcher;
use crate::document;
use crate::error::Result;
use crate::node::Render;
use crate::persist::{self, SaveOptions};
use crate::resource::{AssetResolver, HeaderMode};
use crate::tree::Composite;
use crate::value::Value;

/// A report: a title and an ordered body of render nodes.
///
/// # Example
///
/// ```no_run
/// use lightreport::{Report, Section, SaveOptions};
///
/// let mut report = Report::new("Experiment 42");
/// report.add("Everything <b>below</b> is raw HTML.").unwrap();
/// let mut results = Section::new("Results");
/// results.add(vec![("accuracy", "0.93"), ("loss", "0.11")]).unwrap();
/// report.push(results);
/// report.save(&SaveOptions::default()).unwrap();
/// ```
pub struct Report {
  title: String,
  body: Composite,
}

impl Report {
  pub fn new(title: impl Into<String>) -> Self {
    Self {
      title: title.into(),
      body: Composite::new(),
    }
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  /// Normalize `value` through the default dispatcher and append it to the
  /// body.
  pub fn add(&mut self, value: impl Into<Value>) -> Result<()> {
    self.body.add(value)
  }

  /// Like [`Report::add`] with an explicit dispatcher.
  pub fn add_with(&mut self, dispatcher: &TypeDispatcher, value: impl Into<Value>) -> Result<()> {
    self.body.add_with(dispatcher, value)
  }

  /// Attach a pre-built node or subtree to the body.
  pub fn push(&mut self, node: impl Render + 'static) {
    self.body.push(node)
  }

  /// Render the report to a single HTML string using a fresh resolver.
  ///
  /// [`HeaderMode::Remote`] needs no network access;
  /// [`HeaderMode::Inline`] fetches every asset (once) and produces a fully
  /// standalone document. [`HeaderMode::Local`] only makes sense together
  /// with [`AssetResolver::materialize`]; prefer [`Report::save`] for that.
  pub fn to_html(&self, mode: HeaderMode) -> Result<String> {
    self.to_html_with(&AssetResolver::new(), mode)
  }

  /// Render with a caller-owned resolver (and thus a caller-owned fetch
  /// cache, reusable across reports in one session).
  pub fn to_html_with(&self, resolver: &AssetResolver, mode: HeaderMode) -> Result<String> {
    let header = resolver.header(mode)?;
    let content = self.body.render(1)?;
    let generated_at = Local::now().format("%a %b %e %H:%M:%S %Y").to_string();
    Ok(document::assemble(&self.title, &header, &content, &generated_at))
  }

  /// Save the report as an HTML file; returns the written path.
  pub fn save(&self, options: &SaveOptions) -> Result<PathBuf> {
    self.save_with(&AssetResolver::new(), options)
  }

  /// Save with a caller-owned resolver.
  pub fn save_with(&self, resolver: &AssetResolver, options: &SaveOptions) -> Result<PathBuf> {
    persist::save(self, resolver, options)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tree::Section;

  #[test]
  fn remote_report_renders_without_network() {
    let mut report = Report::new("Demo Report");
    report.push(crate::node::Paragraph::new("hello world").unwrap());
    report.add(vec![("a", "1"), ("b", "2")]).unwrap();

    let html = report.to_html(HeaderMode::Remote).unwrap();
    assert!(html.contains("<h1 data-toc-skip>Demo Report</h1>"));
    assert!(html.contains("<p>hello world</p>"));
    assert!(html.contains("bootstrap.min.css"));
  }

  #[test]
  fn body_sections_start_at_h1() {
    let mut report = Report::new("r");
    report.push(Section::new("Top"));
    let html = report.to_html(HeaderMode::Remote).unwrap();
    assert!(html.contains("<h1>Top</h1>"));
  }
}
