//! Error types for lightreport
//!
//! One top-level [`Error`] enum covers the whole pipeline:
//! - dispatch errors (a value no conversion rule recognizes)
//! - configuration errors (bad grid sizes, conflicting output modes)
//! - resource errors (network fetch failures for css/js assets)
//! - chart errors (figure renderer missing)
//! - I/O errors from the save pipeline
//!
//! All errors use the `thiserror` crate for minimal boilerplate and proper
//! error trait implementations.

use thiserror::Error;

/// Result type alias for lightreport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for lightreport.
#[derive(Error, Debug)]
pub enum Error {
  /// A value that no dispatch rule can convert into a render node.
  ///
  /// Surfaced immediately at `add` time, never deferred to rendering.
  #[error("Type '{type_name}' is not supported for rendering")]
  UnsupportedType { type_name: String },

  /// Conflicting or invalid construction parameters.
  ///
  /// Raised at construction/call time (invalid grid column count, zero or
  /// more than one output mode selected), before any rendering or I/O.
  #[error("Invalid configuration: {message}")]
  InvalidConfiguration { message: String },

  /// A network fetch for an external asset failed.
  ///
  /// Aborts the entire save; no partial document is written.
  #[error("Failed to fetch resource '{url}': {reason}")]
  ResourceFetch { url: String, reason: String },

  /// A chart node was rendered but no figure renderer is available.
  #[error("No figure renderer is available to render charts")]
  PlottingUnavailable,

  /// I/O error (directory creation, file writing).
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

impl Error {
  /// Shorthand for an [`Error::InvalidConfiguration`].
  pub fn invalid_config(message: impl Into<String>) -> Self {
    Error::InvalidConfiguration {
      message: message.into(),
    }
  }

  /// Shorthand for an [`Error::ResourceFetch`].
  pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
    Error::ResourceFetch {
      url: url.into(),
      reason: reason.into(),
    }
  }
}
