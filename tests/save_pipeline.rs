//! Save pipeline behavior: filenames, modes, materialization, atomicity.

use std::fs;
use std::sync::Arc;

use lightreport::{
  Asset, AssetKind, AssetResolver, HttpFetcher, Report, SaveOptions,
};

/// Assets resolvable without any network: data URLs through the stock
/// fetcher.
fn offline_assets() -> Vec<Asset> {
  vec![
    Asset::new("data:text/css,body { margin: 0 }", AssetKind::Stylesheet),
    Asset::new("data:text/javascript,console.log(1)", AssetKind::Script),
  ]
}

fn offline_resolver() -> AssetResolver {
  AssetResolver::with(offline_assets(), Arc::new(HttpFetcher::new()))
}

#[test]
fn remote_save_derives_slug_filename() {
  let tmp = tempfile::tempdir().unwrap();
  let report = Report::new("My Report! (v2)");
  let options = SaveOptions::default()
    .with_dir(tmp.path())
    .with_prefix("run1-");

  let path = report.save(&options).unwrap();
  assert_eq!(path, tmp.path().join("run1-My_Report_v2.html"));
  let html = fs::read_to_string(&path).unwrap();
  assert!(html.contains("My Report! (v2)"));
  assert!(html.contains("bootstrap.min.css"));
}

#[test]
fn default_prefix_is_a_timestamp() {
  let tmp = tempfile::tempdir().unwrap();
  let report = Report::new("Stamped");
  let path = report.save(&SaveOptions::default().with_dir(tmp.path())).unwrap();
  let name = path.file_name().unwrap().to_string_lossy().into_owned();
  assert!(name.ends_with("-Stamped.html"), "name: {name}");
  // YYYY_MM_DD-HH_MM_SS- prefix.
  assert_eq!(name.len(), "YYYY_MM_DD-HH_MM_SS-".len() + "Stamped.html".len());
}

#[test]
fn save_creates_missing_directories() {
  let tmp = tempfile::tempdir().unwrap();
  let nested = tmp.path().join("a").join("b");
  let report = Report::new("Nested");
  let path = report
    .save(&SaveOptions::default().with_dir(&nested).with_prefix(""))
    .unwrap();
  assert_eq!(path, nested.join("Nested.html"));
  assert!(path.is_file());
}

#[test]
fn conflicting_modes_fail_before_any_io() {
  let tmp = tempfile::tempdir().unwrap();
  let target = tmp.path().join("untouched");
  let report = Report::new("Conflict");

  let mut options = SaveOptions::inline().with_dir(&target);
  options.remote = true;
  let err = report.save(&options).unwrap_err();
  assert!(matches!(err, lightreport::Error::InvalidConfiguration { .. }));
  // The target directory was never created.
  assert!(!target.exists());
}

#[test]
fn local_save_materializes_content_addressed_assets() {
  let tmp = tempfile::tempdir().unwrap();
  let mut report = Report::new("Local Mode");
  report.add("body text").unwrap();

  let resolver = offline_resolver();
  let path = report
    .save_with(&resolver, &SaveOptions::local().with_dir(tmp.path()).with_prefix(""))
    .unwrap();

  let names: Vec<String> = fs::read_dir(tmp.path())
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
    .collect();
  let css = names.iter().find(|n| n.ends_with(".css")).expect("css file");
  let js = names.iter().find(|n| n.ends_with(".js")).expect("js file");
  assert_eq!(
    fs::read_to_string(tmp.path().join(css)).unwrap(),
    "body { margin: 0 }"
  );

  // The document references the materialized names, not the source URLs.
  let html = fs::read_to_string(&path).unwrap();
  assert!(html.contains(&format!("href=\"{css}\"")));
  assert!(html.contains(&format!("src=\"{js}\"")));
  assert!(!html.contains("data:text/css"));
}

#[test]
fn inline_save_is_standalone() {
  let tmp = tempfile::tempdir().unwrap();
  let report = Report::new("Standalone");
  let resolver = offline_resolver();
  let path = report
    .save_with(&resolver, &SaveOptions::inline().with_dir(tmp.path()))
    .unwrap();

  let html = fs::read_to_string(&path).unwrap();
  assert!(html.contains("<style type=\"text/css\" media=\"screen\">body { margin: 0 }</style>"));
  assert!(html.contains("<script>console.log(1)</script>"));

  // Only the document itself was written.
  assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
}

#[test]
fn failed_resolution_leaves_no_document_behind() {
  let tmp = tempfile::tempdir().unwrap();
  let assets = vec![Asset::new("ftp://nope.example/style.css", AssetKind::Stylesheet)];
  let resolver = AssetResolver::with(assets, Arc::new(HttpFetcher::new()));
  let report = Report::new("Doomed");

  let err = report
    .save_with(&resolver, &SaveOptions::inline().with_dir(tmp.path()))
    .unwrap_err();
  assert!(matches!(err, lightreport::Error::ResourceFetch { .. }));
  assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
}
