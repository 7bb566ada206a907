//! Lightweight, standalone HTML reports for common in-memory values.
//!
//! - Common value kinds: raw HTML text, numbers, ordered key/value pairs,
//!   numeric matrices, tabular frames, plotly figures
//! - Standalone output: exactly one HTML document per report, with assets
//!   referenced remotely, cached locally or inlined
//! - Minimal design based on bootstrap, with auto-generated in-page
//!   navigation via bootstrap-toc
//!
//! Build a tree with [`Report`], [`Section`] and [`Grid`], then render with
//! [`Report::to_html`] or persist with [`Report::save`].

pub mod dispatch;
pub mod document;
pub mod error;
pub mod figure;
pub mod format;
pub mod node;
pub mod persist;
pub mod report;
pub mod resource;
pub mod tree;
pub mod value;

pub use dispatch::{Capabilities, Rule, TypeDispatcher};
pub use error::{Error, Result};
pub use figure::{Figure, FigureRenderer, PlotlyHtml};
pub use format::{HtmlTableFormatter, TableFormatter};
pub use node::{ChartEmbed, FrameTable, KeyValueTable, MatrixTable, Paragraph, RawText, Render};
pub use persist::{default_directory, open_default_directory, SaveOptions};
pub use report::Report;
pub use resource::{
  Asset, AssetKind, AssetResolver, FetchCache, FetchedResource, HeaderMode, HttpFetcher,
  ResourceFetcher,
};
pub use tree::{Composite, Grid, Section};
pub use value::{Cell, Frame, Matrix, Value};
