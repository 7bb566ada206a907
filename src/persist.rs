//! Save pipeline: directory resolution, filename derivation, atomic write.
//!
//! A save runs Building -> ResolvingAssets -> Writing -> Done; any failure
//! aborts before the document file exists, so there is never a partial
//! report on disk. The default save directory is resolved here, once, at the
//! boundary; the render core never reads configuration.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::Local;
use regex::Regex;

use crate::error::{Error, Result};
use crate::report::Report;
use crate::resource::{AssetResolver, HeaderMode};

/// Environment variable overriding the default save directory.
pub const PATH_ENV_VAR: &str = "LIGHTREPORT_PATH";

/// Options controlling [`Report::save`].
///
/// Exactly one of `remote`, `local` and `inline` must be selected; the
/// default is `remote`.
#[derive(Debug, Clone)]
pub struct SaveOptions {
  /// Target directory; `None` resolves via [`default_directory`].
  pub dir: Option<PathBuf>,
  /// Filename (without prefix); `None` slugifies the report title.
  pub filename: Option<String>,
  /// Filename prefix; `None` uses a sortable timestamp.
  pub prefix: Option<String>,
  /// Reference assets from their CDN URLs.
  pub remote: bool,
  /// Materialize assets next to the report and reference them relatively.
  pub local: bool,
  /// Embed asset contents into the document.
  pub inline: bool,
  /// Open the written file in the default viewer (best effort).
  pub auto_open: bool,
}

impl Default for SaveOptions {
  fn default() -> Self {
    Self {
      dir: None,
      filename: None,
      prefix: None,
      remote: true,
      local: false,
      inline: false,
      auto_open: false,
    }
  }
}

impl SaveOptions {
  /// Options selecting local-cached assets.
  pub fn local() -> Self {
    Self {
      remote: false,
      local: true,
      ..Self::default()
    }
  }

  /// Options selecting inlined assets (fully standalone document).
  pub fn inline() -> Self {
    Self {
      remote: false,
      inline: true,
      ..Self::default()
    }
  }

  pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.dir = Some(dir.into());
    self
  }

  pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
    self.filename = Some(filename.into());
    self
  }

  pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.prefix = Some(prefix.into());
    self
  }

  pub fn with_auto_open(mut self, auto_open: bool) -> Self {
    self.auto_open = auto_open;
    self
  }

  /// Validate the mode flags. Fails with [`Error::InvalidConfiguration`]
  /// when zero or more than one mode is selected.
  pub fn mode(&self) -> Result<HeaderMode> {
    match (self.remote, self.local, self.inline) {
      (true, false, false) => Ok(HeaderMode::Remote),
      (false, true, false) => Ok(HeaderMode::Local),
      (false, false, true) => Ok(HeaderMode::Inline),
      (false, false, false) => Err(Error::invalid_config(
        "one of remote, local or inline must be selected",
      )),
      _ => Err(Error::invalid_config(
        "output modes are mutually exclusive: select exactly one of remote, local or inline",
      )),
    }
  }
}

/// Pipeline stages, logged as the save progresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
  Building,
  ResolvingAssets,
  Writing,
  Done,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Stage::Building => "building",
      Stage::ResolvingAssets => "resolving-assets",
      Stage::Writing => "writing",
      Stage::Done => "done",
    };
    f.write_str(name)
  }
}

pub(crate) fn save(
  report: &Report,
  resolver: &AssetResolver,
  options: &SaveOptions,
) -> Result<PathBuf> {
  let mut stage = Stage::Building;
  let result = run_save(report, resolver, options, &mut stage);
  match &result {
    Ok(path) => log::info!("saved report '{}' to {}", report.title(), path.display()),
    Err(err) => log::warn!("save of '{}' failed at stage {stage}: {err}", report.title()),
  }
  result
}

fn run_save(
  report: &Report,
  resolver: &AssetResolver,
  options: &SaveOptions,
  stage: &mut Stage,
) -> Result<PathBuf> {
  // Mode conflicts fail before any I/O happens.
  let mode = options.mode()?;

  let dir = options.dir.clone().unwrap_or_else(default_directory);
  fs::create_dir_all(&dir)?;

  *stage = Stage::ResolvingAssets;
  if mode == HeaderMode::Local {
    resolver.materialize(&dir)?;
  }
  // Render the complete document up front; fetch failures abort here, before
  // the output file exists.
  let html = report.to_html_with(resolver, mode)?;

  *stage = Stage::Writing;
  let filename = options
    .filename
    .clone()
    .unwrap_or_else(|| format!("{}.html", slugify(report.title())));
  let prefix = options.prefix.clone().unwrap_or_else(timestamp_prefix);
  let path = dir.join(format!("{prefix}{filename}"));
  write_atomic(&path, html.as_bytes())?;

  *stage = Stage::Done;
  if options.auto_open {
    open_in_viewer(&path);
  }
  Ok(path)
}

/// Single complete-buffer write through a temp file and rename, so a failed
/// save never leaves a partial document behind.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
  let mut tmp = path.as_os_str().to_owned();
  tmp.push(".tmp");
  let tmp = PathBuf::from(tmp);
  fs::write(&tmp, bytes)?;
  fs::rename(&tmp, path).map_err(|e| {
    let _ = fs::remove_file(&tmp);
    Error::Io(e)
  })
}

/// The default save directory: `$LIGHTREPORT_PATH` when set (with `~`
/// expanded), otherwise `~/lightreports`.
pub fn default_directory() -> PathBuf {
  match env::var(PATH_ENV_VAR) {
    Ok(dir) if !dir.is_empty() => expand_home(&dir),
    _ => home_dir().join("lightreports"),
  }
}

/// Open the default save directory in the system file viewer.
pub fn open_default_directory() {
  open_in_viewer(&default_directory());
}

fn home_dir() -> PathBuf {
  env::var_os("HOME")
    .or_else(|| env::var_os("USERPROFILE"))
    .map(PathBuf::from)
    .unwrap_or_else(|| PathBuf::from("."))
}

fn expand_home(raw: &str) -> PathBuf {
  if raw == "~" {
    return home_dir();
  }
  if let Some(rest) = raw.strip_prefix("~/") {
    return home_dir().join(rest);
  }
  PathBuf::from(raw)
}

/// Derive a filesystem-safe slug from a title: drop everything that is not a
/// word character, whitespace or hyphen, then collapse whitespace runs into
/// single underscores. Case is preserved.
pub fn slugify(title: &str) -> String {
  static STRIP: OnceLock<Regex> = OnceLock::new();
  static SPACES: OnceLock<Regex> = OnceLock::new();
  let strip = STRIP.get_or_init(|| Regex::new(r"[^\w\s-]").expect("static regex"));
  let spaces = SPACES.get_or_init(|| Regex::new(r"\s+").expect("static regex"));

  let cleaned = strip.replace_all(title, "");
  spaces.replace_all(cleaned.trim(), "_").into_owned()
}

/// Sortable timestamp prefix for default filenames.
pub fn timestamp_prefix() -> String {
  Local::now().format("%Y_%m_%d-%H_%M_%S-").to_string()
}

/// Open `path` in the platform's default viewer. Best effort: failures are
/// logged, never propagated, so a report save cannot fail on a missing
/// desktop environment.
fn open_in_viewer(path: &Path) {
  #[cfg(target_os = "macos")]
  let mut command = {
    let mut c = std::process::Command::new("open");
    c.arg(path);
    c
  };
  #[cfg(target_os = "windows")]
  let mut command = {
    let mut c = std::process::Command::new("cmd");
    c.args(["/C", "start", ""]).arg(path);
    c
  };
  #[cfg(not(any(target_os = "macos", target_os = "windows")))]
  let mut command = {
    let mut c = std::process::Command::new("xdg-open");
    c.arg(path);
    c
  };

  if let Err(err) = command.spawn() {
    log::warn!("could not open {} in viewer: {err}", path.display());
  }
}
