//! End-to-end build over a content tree that has a page for every
//! navigation entry.
//!
//! Run with: `cargo test --test build_site`

use java_cheatsheet::generate::{self, BuildOptions};
use java_cheatsheet::{meta, navigation, scan};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use walkdir::WalkDir;

const BASE_URL: &str = "javacheatsheet.dev";

// ---------------------------------------------------------------------------
// Setup helpers
// ---------------------------------------------------------------------------

fn copy_fixtures(dst: &Path) {
    let src = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    for entry in WalkDir::new(&src) {
        let entry = entry.unwrap();
        let rel = entry.path().strip_prefix(&src).unwrap();
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).unwrap();
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
}

/// Content file that produces `route` under the stock content dirs.
fn source_for(route: &str) -> String {
    match route.trim_start_matches('/') {
        "" => "pages/index.md".to_string(),
        rest => format!("docs/{rest}.md"),
    }
}

/// Fixture tree plus a stub page for every navigation path it lacks.
fn complete_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    copy_fixtures(tmp.path());
    for collection in navigation::collections() {
        for item in collection.items {
            let path = tmp.path().join(source_for(item.path));
            if !path.exists() {
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(&path, format!("# {}\n\nStub.\n", item.name)).unwrap();
            }
        }
    }
    tmp
}

fn build(source: &Path, output: &Path) -> generate::GenerateReport {
    let manifest = scan::scan(source).unwrap();
    let options = BuildOptions {
        base_url: BASE_URL.to_string(),
        use_cache: true,
        version: "test".to_string(),
    };
    generate::generate(&manifest, source, output, &options).unwrap()
}

fn html_files(output: &Path) -> Vec<(String, String)> {
    WalkDir::new(output)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|x| x == "html"))
        .map(|e| {
            let rel = e.path().strip_prefix(output).unwrap().to_string_lossy().to_string();
            (rel, fs::read_to_string(e.path()).unwrap())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn every_navigation_path_resolves_after_build() {
    let src = complete_site();
    let out = TempDir::new().unwrap();
    build(src.path(), out.path());

    for collection in navigation::collections() {
        for item in collection.items {
            let file = out.path().join(generate::output_path_for(item.path));
            assert!(
                file.is_file(),
                "{}: {} has no rendered page",
                collection.key,
                item.path
            );
        }
    }

    let routes: BTreeSet<String> = scan::scan(src.path()).unwrap().routes();
    assert!(navigation::check(&routes).is_empty());
}

#[test]
fn fixture_alone_is_incomplete() {
    let src = TempDir::new().unwrap();
    copy_fixtures(src.path());
    let routes = scan::scan(src.path()).unwrap().routes();
    let issues = navigation::check(&routes);
    assert!(!issues.is_empty());
    assert!(
        issues
            .iter()
            .any(|i| i.to_string().contains("/cheatsheet/functions"))
    );
}

#[test]
fn sitemap_has_exactly_one_entry_per_route() {
    let src = complete_site();
    let out = TempDir::new().unwrap();
    let report = build(src.path(), out.path());
    let xml = fs::read_to_string(out.path().join("sitemap.xml")).unwrap();

    assert_eq!(xml.matches("<url>").count(), report.pages.len());
    let mut seen = BTreeSet::new();
    for loc in xml.split("<loc>").skip(1) {
        let url = loc.split("</loc>").next().unwrap();
        assert!(seen.insert(url.to_string()), "duplicate sitemap entry {url}");
    }
    for page in &report.pages {
        assert!(seen.contains(&format!("https://{BASE_URL}{}", page.route)));
    }
}

#[test]
fn canonical_link_is_scheme_host_path() {
    let src = complete_site();
    let out = TempDir::new().unwrap();
    let report = build(src.path(), out.path());

    for page in &report.pages {
        let html = fs::read_to_string(out.path().join(&page.output)).unwrap();
        let expected = format!(
            r#"<link rel="canonical" href="https://{BASE_URL}{}">"#,
            page.route
        );
        assert!(html.contains(&expected), "{}: missing {expected}", page.route);
    }
}

#[test]
fn theme_color_is_light_or_dark_only() {
    let src = complete_site();
    let out = TempDir::new().unwrap();
    build(src.path(), out.path());

    for (file, html) in html_files(out.path()) {
        for tag in html.split("<meta name=\"theme-color\"").skip(1) {
            let content = tag.split("content=\"").nth(1).unwrap();
            let value = content.split('"').next().unwrap();
            assert!(
                value == meta::THEME_COLOR_LIGHT || value == meta::THEME_COLOR_DARK,
                "{file}: unexpected theme color {value}"
            );
        }
    }
}

#[test]
fn service_worker_carries_runtime_rules() {
    let src = complete_site();
    let out = TempDir::new().unwrap();
    build(src.path(), out.path());
    let sw = fs::read_to_string(out.path().join("sw.js")).unwrap();

    assert!(sw.contains(r#""cacheName":"google-fonts""#));
    assert!(sw.contains(r#""cacheName":"jsdelivr-cdn""#));
    assert!(sw.contains(r#""url":"/cheatsheet/functions/index.html""#));
}

#[test]
fn sidebar_links_match_navigation_table() {
    let src = complete_site();
    let out = TempDir::new().unwrap();
    build(src.path(), out.path());
    let html = fs::read_to_string(out.path().join("oops/class/index.html")).unwrap();

    for collection in navigation::collections() {
        for item in collection.items {
            assert!(
                html.contains(&format!("href=\"{}\"", item.path)),
                "sidebar missing {}",
                item.path
            );
        }
    }
}
