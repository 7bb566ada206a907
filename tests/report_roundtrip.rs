//! End-to-end rendering scenarios over the public API.

use lightreport::{
  Figure, Grid, HeaderMode, KeyValueTable, Matrix, Paragraph, Report, Section,
};
use serde_json::json;

#[test]
fn demo_report_roundtrip() {
  let mut report = Report::new("Demo Report");
  report.push(Paragraph::new("An <i>introduction</i>.").unwrap());
  report.push(KeyValueTable::new([("rows", "2"), ("cols", "2")]));

  let html = report.to_html(HeaderMode::Remote).unwrap();

  // The title appears exactly once inside the page-header heading.
  assert_eq!(html.matches("<h1 data-toc-skip>Demo Report</h1>").count(), 1);
  assert_eq!(html.matches("<p>").count(), 1);
  assert_eq!(html.matches("<table").count(), 1);
  assert_eq!(html.matches("<tr>").count(), 2);
}

#[test]
fn nested_sections_and_grids_render_together() {
  let mut report = Report::new("Quarterly");

  let mut overview = Section::new("Overview");
  overview.add("All numbers are preliminary.").unwrap();

  let mut details = Section::new("Details");
  let mut grid = Grid::new(2).unwrap();
  grid.add(Matrix::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]])).unwrap();
  grid
    .add(Figure::Plotly(json!({"data": [{"y": [1, 2, 3]}]})))
    .unwrap();
  grid.add("third cell").unwrap();
  details.push(grid);

  overview.push(details);
  report.push(overview);

  let html = report.to_html(HeaderMode::Remote).unwrap();
  assert!(html.contains("<h1>Overview</h1>"));
  assert!(html.contains("<h2>Details</h2>"));
  // Three children in a 2-column grid: two rows, the second partial.
  assert_eq!(html.matches("<div class='row'>").count(), 2);
  assert_eq!(html.matches("<div class='col-md-6'>").count(), 3);
  assert!(html.contains("table-responsive"));
  assert!(html.contains("Plotly.newPlot"));
}

#[test]
fn unsupported_values_are_rejected_at_add_time() {
  let mut report = Report::new("r");
  let err = report.add(lightreport::Value::other(vec![0u8])).unwrap_err();
  assert!(matches!(err, lightreport::Error::UnsupportedType { .. }));
  // Nothing was appended; the report still renders cleanly.
  let html = report.to_html(HeaderMode::Remote).unwrap();
  assert_eq!(html.matches("<p>").count(), 0);
}
