//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Each page leads with
//! its positional index and title; routes, source files and output paths are
//! secondary context, either after `→` or on indented lines below.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! pages/ → /
//!     001 Getting Started → /
//!         Source: pages/index.md
//!         Layout: home
//! docs/cheatsheet/ → /cheatsheet
//!     001 Java Basics → /cheatsheet/basics
//!         Source: docs/cheatsheet/basics.md
//!         Description: Primitive types, variables and operators.
//!
//! Skipped
//!     docs/builtin/ (not found)
//!
//! Config
//!     config.toml
//!     public/
//! ```
//!
//! ## Build
//!
//! ```text
//! Pages
//!     001 Getting Started → index.html
//!     002 Java Basics → cheatsheet/basics/index.html (cached)
//!
//! Assets
//!     favicon.svg
//!
//! Site
//!     sitemap.xml (2 URLs)
//!     robots.txt
//!     manifest.webmanifest
//!     sw.js (4 precached)
//!
//! Built 2 pages: 1 cached, 1 rendered (2 total)
//! ```
//!
//! ## Check
//!
//! ```text
//! Navigation
//!     Getting Started: 1 entry
//!     Cheatsheet: 11 entries
//!
//! 2 problems
//!     cheatsheet: "Functions" points at /cheatsheet/functions, which has no page
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions never write. `format_scan_output` is the one that reads the
//! filesystem, to report whether `config.toml` and the assets directory exist.

use crate::generate::{GenerateReport, PageStatus, ROBOTS_FILENAME, SITEMAP_FILENAME};
use crate::navigation::{NavigationCollection, NavigationIssue};
use crate::pwa;
use crate::scan::Manifest;
use std::net::SocketAddr;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{} {}", n, one)
    } else {
        format!("{} {}", n, many)
    }
}

// ============================================================================
// scan
// ============================================================================

/// Format scan output: pages grouped by content directory.
pub fn format_scan_output(manifest: &Manifest, source_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    for content_dir in &manifest.config.content.dirs {
        let docs: Vec<_> = manifest
            .documents
            .iter()
            .filter(|d| d.source.starts_with(&content_dir.dir))
            .collect();
        if docs.is_empty() {
            continue;
        }

        lines.push(format!(
            "{}/ \u{2192} /{}",
            content_dir.dir, content_dir.base_route
        ));
        for (i, doc) in docs.iter().enumerate() {
            lines.push(format!(
                "{}{} {} \u{2192} {}",
                indent(1),
                format_index(i + 1),
                doc.title,
                doc.route
            ));
            lines.push(format!(
                "{}Source: {}",
                indent(2),
                doc.source.display().to_string().replace('\\', "/")
            ));
            if let Some(desc) = doc.description.as_deref() {
                let truncated = truncate_desc(desc.trim(), 60);
                if !truncated.is_empty() {
                    lines.push(format!("{}Description: {}", indent(2), truncated));
                }
            }
            if doc.layout != "default" {
                lines.push(format!("{}Layout: {}", indent(2), doc.layout));
            }
        }
    }

    if manifest.documents.is_empty() {
        lines.push("No pages found".to_string());
    }

    if !manifest.skipped_dirs.is_empty() {
        lines.push(String::new());
        lines.push("Skipped".to_string());
        for dir in &manifest.skipped_dirs {
            lines.push(format!(
                "{}{}/ (not found)",
                indent(1),
                dir.display().to_string().replace('\\', "/")
            ));
        }
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if source_root.join(crate::config::CONFIG_FILENAME).exists() {
        lines.push(format!("{}{}", indent(1), crate::config::CONFIG_FILENAME));
    } else {
        lines.push(format!("{}(stock defaults)", indent(1)));
    }
    let assets_dir = &manifest.config.content.assets_dir;
    if source_root.join(assets_dir).is_dir() {
        lines.push(format!("{}{}/", indent(1), assets_dir));
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &Manifest, source_root: &Path) {
    for line in format_scan_output(manifest, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// build
// ============================================================================

/// Format build output: every page with its output file, then the site files.
pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Pages".to_string());
    for (i, page) in report.pages.iter().enumerate() {
        let status = match page.status {
            PageStatus::Cached => " (cached)",
            PageStatus::Rendered => "",
        };
        lines.push(format!(
            "{}{} {} \u{2192} {}{}",
            indent(1),
            format_index(i + 1),
            page.title,
            page.output,
            status
        ));
    }

    if !report.assets.is_empty() {
        lines.push(String::new());
        lines.push("Assets".to_string());
        for asset in &report.assets {
            lines.push(format!("{}{}", indent(1), asset));
        }
    }

    if !report.removed.is_empty() {
        lines.push(String::new());
        lines.push("Removed".to_string());
        for stale in &report.removed {
            lines.push(format!("{}{}", indent(1), stale));
        }
    }

    lines.push(String::new());
    lines.push("Site".to_string());
    lines.push(format!(
        "{}{} ({})",
        indent(1),
        SITEMAP_FILENAME,
        plural(report.sitemap_urls, "URL", "URLs")
    ));
    lines.push(format!("{}{}", indent(1), ROBOTS_FILENAME));
    if let Some(precached) = report.precached {
        lines.push(format!("{}{}", indent(1), pwa::MANIFEST_FILENAME));
        lines.push(format!(
            "{}{} ({} precached)",
            indent(1),
            pwa::SERVICE_WORKER_FILENAME,
            precached
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "Built {}: {}",
        plural(report.pages.len(), "page", "pages"),
        report.cache
    ));
    lines
}

/// Print build output to stdout.
pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// check
// ============================================================================

/// Format check output: navigation sections, then any problems found.
pub fn format_check_output(
    collections: &[NavigationCollection],
    route_count: usize,
    issues: &[NavigationIssue],
) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Navigation".to_string());
    for collection in collections.iter().filter(|c| !c.items.is_empty()) {
        lines.push(format!(
            "{}{}: {}",
            indent(1),
            collection.title,
            plural(collection.items.len(), "entry", "entries")
        ));
    }

    lines.push(String::new());
    if issues.is_empty() {
        let entries: usize = collections.iter().map(|c| c.items.len()).sum();
        lines.push(format!(
            "All {} resolve to one of {}",
            plural(entries, "entry", "entries"),
            plural(route_count, "page", "pages")
        ));
    } else {
        lines.push(plural(issues.len(), "problem", "problems"));
        for issue in issues {
            lines.push(format!("{}{}", indent(1), issue));
        }
    }
    lines
}

/// Print check output to stdout.
pub fn print_check_output(
    collections: &[NavigationCollection],
    route_count: usize,
    issues: &[NavigationIssue],
) {
    for line in format_check_output(collections, route_count, issues) {
        println!("{}", line);
    }
}

// ============================================================================
// serve
// ============================================================================

pub fn format_serve_banner(
    addr: SocketAddr,
    output_dir: &Path,
    newsletter_path: &str,
    newsletter_endpoint: Option<&str>,
) -> Vec<String> {
    let mut lines = vec![
        format!("Serving {} at http://{}", output_dir.display(), addr),
    ];
    match newsletter_endpoint {
        Some(endpoint) => lines.push(format!(
            "{}{} \u{2192} {}",
            indent(1),
            newsletter_path,
            endpoint
        )),
        None => lines.push(format!(
            "{}{} \u{2192} (no NEWSLETTER_ENDPOINT, answers 503)",
            indent(1),
            newsletter_path
        )),
    }
    lines.push("Press Ctrl+C to stop".to_string());
    lines
}

pub fn print_serve_banner(
    addr: SocketAddr,
    output_dir: &Path,
    newsletter_path: &str,
    newsletter_endpoint: Option<&str>,
) {
    for line in format_serve_banner(addr, output_dir, newsletter_path, newsletter_endpoint) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
