//! Filesystem scanning and manifest generation.
//!
//! Stage 1 of the build pipeline. Walks the configured content directories,
//! maps every markdown file to a route, and produces a [`Manifest`] that the
//! generate and check stages consume.
//!
//! ## Directory Structure
//!
//! ```text
//! content/                         # Content root
//! ├── config.toml                  # Site configuration (optional)
//! ├── .env                         # SITE_BASE_URL, NEWSLETTER_ENDPOINT (optional)
//! ├── public/                      # Copied verbatim to the output root
//! │   └── favicon.svg
//! ├── pages/                       # Mounted at /
//! │   └── index.md                 # → /
//! └── docs/
//!     ├── cheatsheet/              # Mounted at /cheatsheet
//!     │   ├── basics.md            # → /cheatsheet/basics
//!     │   └── control-flow.md      # → /cheatsheet/control-flow
//!     ├── oops/
//!     │   └── class.md             # → /oops/class
//!     └── blog/
//!         └── 2024/records.md      # → /blog/2024/records
//! ```
//!
//! ## Routing Rules
//!
//! - `dir/a/b.md` maps to `/{base_route}/a/b`
//! - `index.md` maps to its directory (`pages/index.md` → `/`)
//! - Hidden files and directories, and non-markdown files, are ignored
//! - A content directory that does not exist is skipped with a warning
//! - Two files mapping to the same route is an error
//!
//! ## Titles
//!
//! Front matter `title`, then the first `# heading`, then the file stem with
//! dashes as spaces.

use crate::config::{self, ContentDir, SiteConfig};
use crate::frontmatter::{self, FrontmatterError};
use crate::naming::{join_route, parse_entry_name};
use crate::types::{Document, Layout};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("{0}")]
    Frontmatter(#[from] FrontmatterError),
    #[error(
        "Route {route} is produced by both {} and {}",
        .first.display(),
        .second.display()
    )]
    DuplicateRoute {
        route: String,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Manifest output from the scan stage
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub documents: Vec<Document>,
    /// Configured content directories that do not exist.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_dirs: Vec<PathBuf>,
    pub config: SiteConfig,
}

impl Manifest {
    pub fn routes(&self) -> BTreeSet<String> {
        self.documents.iter().map(|d| d.route.clone()).collect()
    }

    pub fn document(&self, route: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.route == route)
    }
}

/// Scan a content root, loading `config.toml` from it.
pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    let config = config::load_config(root)?;
    scan_with_config(root, config)
}

/// Scan a content root with an already-loaded config.
pub fn scan_with_config(root: &Path, config: SiteConfig) -> Result<Manifest, ScanError> {
    let mut documents = Vec::new();
    let mut skipped_dirs = Vec::new();
    let mut seen: HashMap<String, PathBuf> = HashMap::new();

    for content_dir in &config.content.dirs {
        let dir = root.join(&content_dir.dir);
        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "content directory not found, skipping");
            skipped_dirs.push(PathBuf::from(&content_dir.dir));
            continue;
        }

        for path in collect_markdown(&dir)? {
            let document = parse_document(root, &dir, &path, content_dir)?;
            if let Some(first) = seen.get(&document.route) {
                return Err(ScanError::DuplicateRoute {
                    route: document.route,
                    first: first.clone(),
                    second: document.source,
                });
            }
            tracing::debug!(route = %document.route, source = %document.source.display(), "found page");
            seen.insert(document.route.clone(), document.source.clone());
            documents.push(document);
        }
    }

    Ok(Manifest {
        documents,
        skipped_dirs,
        config,
    })
}

/// Markdown files under `dir`, sorted, skipping hidden entries.
fn collect_markdown(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && is_markdown(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|n| n.starts_with('.')).unwrap_or(false)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

fn parse_document(
    root: &Path,
    dir: &Path,
    path: &Path,
    content_dir: &ContentDir,
) -> Result<Document, ScanError> {
    let source = path.strip_prefix(root).unwrap_or(path).to_path_buf();
    let content = fs::read_to_string(path)?;
    let (front, body) = frontmatter::parse_frontmatter(&content, &source)?;

    let route = route_for(dir, path, &content_dir.base_route);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let parsed = parse_entry_name(&stem);

    let explicit_title = front.title.as_deref().is_some_and(|t| !t.trim().is_empty());
    let title = front
        .title
        .filter(|t| !t.trim().is_empty())
        .or_else(|| first_heading(&body))
        .unwrap_or_else(|| fallback_title(&parsed.display_title, path));

    let layout = front
        .layout
        .unwrap_or_else(|| Layout::for_route(&route).name().to_string());

    Ok(Document {
        route,
        section: content_dir.base_route.clone(),
        source,
        title,
        description: front.description,
        layout,
        keywords: front.keywords,
        explicit_title,
        body,
    })
}

/// Route for a markdown file inside a content directory.
fn route_for(dir: &Path, path: &Path, base_route: &str) -> String {
    let rel = path.strip_prefix(dir).unwrap_or(path);
    let mut segments: Vec<String> = rel
        .parent()
        .map(|p| {
            p.components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default();
    let stem = rel
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    segments.push(parse_entry_name(&stem).segment);
    join_route(base_route, segments.iter().map(String::as_str))
}

/// First `# heading` outside fenced code.
fn first_heading(body: &str) -> Option<String> {
    let mut in_fence = false;
    for line in body.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if !in_fence && let Some(heading) = trimmed.strip_prefix("# ") {
            let heading = heading.trim().trim_end_matches('#').trim();
            if !heading.is_empty() {
                return Some(heading.to_string());
            }
        }
    }
    None
}

/// Stem-derived title. `index.md` has an empty stem title, so it takes the
/// name of its directory instead.
fn fallback_title(display_title: &str, path: &Path) -> String {
    if !display_title.is_empty() {
        return display_title.to_string();
    }
    path.parent()
        .and_then(|dir| dir.file_name())
        .map(|n| n.to_string_lossy().replace('-', " "))
        .unwrap_or_default()
}
