//! Asset fetching, caching and header resolution.
//!
//! Reports reference a fixed set of front-end assets (bootstrap css/js,
//! bootstrap-toc, jquery, plotly). At save time the caller picks one of three
//! mutually exclusive header modes:
//!
//! - [`HeaderMode::Remote`]: tags point at the CDN URLs, no network access.
//! - [`HeaderMode::Local`]: tags reference content-addressed files written
//!   next to the report by [`AssetResolver::materialize`].
//! - [`HeaderMode::Inline`]: fetched contents are embedded literally.
//!
//! Fetching goes through a [`ResourceFetcher`] seam (mockable in tests,
//! offline via `file://`) and a process-lifetime [`FetchCache`] so each URL
//! is fetched at most once per session, shared across local and inline
//! resolution.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use base64::Engine;
use sha2::{Digest, Sha256};
use url::Url;

use crate::error::{Error, Result};

/// Default User-Agent string sent by [`HttpFetcher`].
pub const DEFAULT_USER_AGENT: &str = concat!("lightreport/", env!("CARGO_PKG_VERSION"));

/// The kind of a front-end asset, deciding both tag shape and file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
  Stylesheet,
  Script,
}

impl AssetKind {
  pub fn extension(&self) -> &'static str {
    match self {
      AssetKind::Stylesheet => "css",
      AssetKind::Script => "js",
    }
  }
}

/// One referenced asset: a URL plus its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
  pub url: String,
  pub kind: AssetKind,
}

impl Asset {
  pub fn new(url: impl Into<String>, kind: AssetKind) -> Self {
    Self {
      url: url.into(),
      kind,
    }
  }
}

/// The fixed asset set every report references, stylesheets first.
pub fn default_assets() -> Vec<Asset> {
  const CSS: [&str; 3] = [
    "https://maxcdn.bootstrapcdn.com/bootstrap/3.3.7/css/bootstrap.min.css",
    "https://maxcdn.bootstrapcdn.com/bootstrap/3.3.7/css/bootstrap-theme.min.css",
    "https://cdn.rawgit.com/afeld/bootstrap-toc/v0.4.1/dist/bootstrap-toc.min.css",
  ];
  const JS: [&str; 4] = [
    "https://ajax.googleapis.com/ajax/libs/jquery/1.12.4/jquery.min.js",
    "https://maxcdn.bootstrapcdn.com/bootstrap/3.3.7/js/bootstrap.min.js",
    "https://cdn.rawgit.com/afeld/bootstrap-toc/v0.4.1/dist/bootstrap-toc.min.js",
    "https://cdn.plot.ly/plotly-latest.min.js",
  ];
  CSS
    .iter()
    .map(|u| Asset::new(*u, AssetKind::Stylesheet))
    .chain(JS.iter().map(|u| Asset::new(*u, AssetKind::Script)))
    .collect()
}

/// How asset references are emitted into the document head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMode {
  /// Reference the remote URLs directly.
  Remote,
  /// Reference content-addressed local files.
  Local,
  /// Embed the fetched contents literally.
  Inline,
}

/// Result of fetching an external resource.
#[derive(Debug, Clone)]
pub struct FetchedResource {
  /// Raw bytes of the resource.
  pub bytes: Vec<u8>,
  /// Content-Type header value, if available.
  pub content_type: Option<String>,
}

impl FetchedResource {
  pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
    Self { bytes, content_type }
  }
}

/// Trait for fetching external resources.
///
/// URLs can be `http://`/`https://` (network), `file://` (filesystem) or
/// `data:` (decoded inline). Implementations must be `Send + Sync` so a
/// resolver can be shared across threads.
pub trait ResourceFetcher: Send + Sync {
  fn fetch(&self, url: &str) -> Result<FetchedResource>;
}

impl<T: ResourceFetcher + ?Sized> ResourceFetcher for Arc<T> {
  fn fetch(&self, url: &str) -> Result<FetchedResource> {
    (**self).fetch(url)
  }
}

/// Default HTTP resource fetcher with an explicit timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
  timeout: Duration,
  user_agent: String,
  max_size: usize,
}

impl Default for HttpFetcher {
  fn default() -> Self {
    Self {
      timeout: Duration::from_secs(30),
      user_agent: DEFAULT_USER_AGENT.to_string(),
      max_size: 50 * 1024 * 1024,
    }
  }
}

impl HttpFetcher {
  pub fn new() -> Self {
    Self::default()
  }

  /// Set the request timeout. Expiry surfaces as [`Error::ResourceFetch`].
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
    self.user_agent = user_agent.into();
    self
  }

  pub fn with_max_size(mut self, max_size: usize) -> Self {
    self.max_size = max_size;
    self
  }

  fn fetch_http(&self, url: &str) -> Result<FetchedResource> {
    let config = ureq::Agent::config_builder()
      .timeout_global(Some(self.timeout))
      .build();
    let agent: ureq::Agent = config.into();

    let mut current = url.to_string();
    for _ in 0..10 {
      let mut response = agent
        .get(&current)
        .header("User-Agent", &self.user_agent)
        .call()
        .map_err(|e| Error::fetch(url, e.to_string()))?;

      let status = response.status();
      if (300..400).contains(&status.as_u16()) {
        if let Some(location) = response.headers().get("location").and_then(|h| h.to_str().ok()) {
          current = Url::parse(&current)
            .ok()
            .and_then(|base| base.join(location).ok())
            .map(|u| u.to_string())
            .unwrap_or_else(|| location.to_string());
          continue;
        }
      }
      if !status.is_success() {
        return Err(Error::fetch(url, format!("HTTP status {status}")));
      }

      let content_type = response
        .headers()
        .get("content-type")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());

      let bytes = response
        .body_mut()
        .with_config()
        .limit(self.max_size as u64)
        .read_to_vec()
        .map_err(|e| Error::fetch(url, e.into_io().to_string()))?;

      log::debug!("fetched {} ({} bytes)", url, bytes.len());
      return Ok(FetchedResource::new(bytes, content_type));
    }

    Err(Error::fetch(url, "too many redirects"))
  }

  fn fetch_file(&self, url: &str) -> Result<FetchedResource> {
    let path = url.strip_prefix("file://").unwrap_or(url);
    let bytes = std::fs::read(path).map_err(|e| Error::fetch(url, e.to_string()))?;
    Ok(FetchedResource::new(bytes, None))
  }

  fn fetch_data(&self, url: &str) -> Result<FetchedResource> {
    decode_data_url(url)
  }
}

impl ResourceFetcher for HttpFetcher {
  fn fetch(&self, url: &str) -> Result<FetchedResource> {
    if url.starts_with("data:") {
      self.fetch_data(url)
    } else if url.starts_with("file://") {
      self.fetch_file(url)
    } else if url.starts_with("http://") || url.starts_with("https://") {
      self.fetch_http(url)
    } else {
      Err(Error::fetch(url, "unsupported URL scheme"))
    }
  }
}

/// Decode a `data:` URL into bytes. Base64 payloads are decoded; other
/// payloads are taken verbatim.
fn decode_data_url(url: &str) -> Result<FetchedResource> {
  let rest = url
    .strip_prefix("data:")
    .ok_or_else(|| Error::fetch(url, "not a data URL"))?;
  let (header, data) = rest
    .split_once(',')
    .ok_or_else(|| Error::fetch(url, "missing comma in data URL"))?;

  let media_type = header
    .split(';')
    .next()
    .filter(|s| s.contains('/'))
    .map(|s| s.to_string());

  let bytes = if header.ends_with(";base64") {
    base64::engine::general_purpose::STANDARD
      .decode(data)
      .map_err(|e| Error::fetch(url, format!("invalid base64: {e}")))?
  } else {
    data.as_bytes().to_vec()
  };

  Ok(FetchedResource::new(bytes, media_type))
}

/// Process-lifetime cache of fetched asset bytes, keyed by URL.
///
/// Populated lazily, never evicted; the asset set is small and fixed. Safe to
/// share across threads: two callers racing on the same URL may both fetch,
/// but one result wins and all callers observe the same bytes afterwards.
#[derive(Default)]
pub struct FetchCache {
  entries: Mutex<HashMap<String, Arc<Vec<u8>>>>,
}

impl FetchCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// Return the cached bytes for `url`, fetching through `fetcher` on a miss.
  pub fn get_or_fetch(&self, fetcher: &dyn ResourceFetcher, url: &str) -> Result<Arc<Vec<u8>>> {
    if let Some(hit) = self.lock().get(url).cloned() {
      return Ok(hit);
    }
    // Fetch outside the lock; a concurrent duplicate fetch is benign and the
    // first inserted entry wins.
    let fetched = fetcher.fetch(url)?;
    let bytes = Arc::new(fetched.bytes);
    let mut entries = self.lock();
    Ok(entries.entry(url.to_string()).or_insert(bytes).clone())
  }

  pub fn contains(&self, url: &str) -> bool {
    self.lock().contains_key(url)
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Vec<u8>>>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

/// Resolves the asset list into head markup and local files.
pub struct AssetResolver {
  assets: Vec<Asset>,
  fetcher: Arc<dyn ResourceFetcher>,
  cache: FetchCache,
}

impl Default for AssetResolver {
  fn default() -> Self {
    Self::new()
  }
}

impl AssetResolver {
  /// Resolver over the default asset set and HTTP fetcher.
  pub fn new() -> Self {
    Self::with(default_assets(), Arc::new(HttpFetcher::new()))
  }

  /// Resolver over a custom asset list and fetcher.
  pub fn with(assets: Vec<Asset>, fetcher: Arc<dyn ResourceFetcher>) -> Self {
    Self {
      assets,
      fetcher,
      cache: FetchCache::new(),
    }
  }

  pub fn assets(&self) -> &[Asset] {
    &self.assets
  }

  pub fn cache(&self) -> &FetchCache {
    &self.cache
  }

  /// Produce the head markup for `mode`; stylesheets first, then scripts.
  ///
  /// `Remote` performs no I/O. `Local` and `Inline` fetch every asset through
  /// the shared cache and fail with [`Error::ResourceFetch`] on the first
  /// unreachable URL, before any output is produced.
  pub fn header(&self, mode: HeaderMode) -> Result<String> {
    let mut out = String::new();
    for kind in [AssetKind::Stylesheet, AssetKind::Script] {
      for asset in self.assets.iter().filter(|a| a.kind == kind) {
        out.push_str(&self.asset_tag(asset, mode)?);
      }
    }
    Ok(out)
  }

  fn asset_tag(&self, asset: &Asset, mode: HeaderMode) -> Result<String> {
    let tag = match (mode, asset.kind) {
      (HeaderMode::Remote, AssetKind::Stylesheet) => {
        format!("<link rel=\"stylesheet\" href=\"{}\">", asset.url)
      }
      (HeaderMode::Remote, AssetKind::Script) => {
        format!("<script src=\"{}\"></script>", asset.url)
      }
      (HeaderMode::Local, AssetKind::Stylesheet) => {
        format!("<link rel=\"stylesheet\" href=\"{}\">", self.local_filename(asset)?)
      }
      (HeaderMode::Local, AssetKind::Script) => {
        format!("<script src=\"{}\"></script>", self.local_filename(asset)?)
      }
      (HeaderMode::Inline, AssetKind::Stylesheet) => {
        format!(
          "<style type=\"text/css\" media=\"screen\">{}</style>",
          self.inline_text(asset)?
        )
      }
      (HeaderMode::Inline, AssetKind::Script) => {
        format!("<script>{}</script>", self.inline_text(asset)?)
      }
    };
    Ok(tag)
  }

  /// Content-addressed filename for an asset: a hash of the fetched bytes
  /// (not the URL) plus the kind's extension, so changed upstream content
  /// gets a fresh name while stable content keeps one.
  pub fn local_filename(&self, asset: &Asset) -> Result<String> {
    let bytes = self.fetch_cached(asset)?;
    Ok(format!(
      "{hash}.{ext}",
      hash = &hex_sha256(&bytes)[..32],
      ext = asset.kind.extension()
    ))
  }

  /// Write every asset into `dir` under its content-addressed name.
  ///
  /// Idempotent: existing files are left alone (the name pins the content),
  /// and the network is touched only on cache misses.
  pub fn materialize(&self, dir: &Path) -> Result<()> {
    for asset in &self.assets {
      let bytes = self.fetch_cached(asset)?;
      let path = dir.join(self.local_filename(asset)?);
      if path.exists() {
        continue;
      }
      let tmp = path.with_extension(format!("{}.tmp", asset.kind.extension()));
      std::fs::write(&tmp, bytes.as_slice())?;
      std::fs::rename(&tmp, &path)?;
      log::info!("materialized {} -> {}", asset.url, path.display());
    }
    Ok(())
  }

  /// Fetched asset content as text, for the inline arms. Silently inlining
  /// mangled bytes would ship a subtly broken standalone document, so
  /// invalid UTF-8 is a fetch error, not a lossy conversion.
  fn inline_text(&self, asset: &Asset) -> Result<String> {
    let bytes = self.fetch_cached(asset)?;
    match std::str::from_utf8(&bytes) {
      Ok(text) => Ok(text.to_string()),
      Err(_) => Err(Error::fetch(&asset.url, "asset content is not valid UTF-8")),
    }
  }

  fn fetch_cached(&self, asset: &Asset) -> Result<Arc<Vec<u8>>> {
    self.cache.get_or_fetch(&*self.fetcher, &asset.url)
  }
}

fn hex_sha256(bytes: &[u8]) -> String {
  let mut hasher = Sha256::new();
  hasher.update(bytes);
  let digest = hasher.finalize();
  const HEX: &[u8; 16] = b"0123456789abcdef";
  let mut out = String::with_capacity(64);
  for &b in digest.iter() {
    out.push(HEX[(b >> 4) as usize] as char);
    out.push(HEX[(b & 0x0f) as usize] as char);
  }
  out
}
