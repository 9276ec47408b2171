//! HTML site generation.
//!
//! Stage 2 of the build pipeline. Takes the scanned manifest and writes the
//! final static site.
//!
//! ## Generated Files
//!
//! - **Pages** (`/{route}/index.html`): every document through its layout
//! - **Stylesheet** (`/style.css`): config colors + `static/style.css`
//! - **Assets**: the `public/` directory copied verbatim
//! - **SEO**: `sitemap.xml` (one `<url>` per route) and `robots.txt`
//! - **PWA**: `manifest.webmanifest` and `sw.js` (unless `pwa.enabled = false`)
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                     # /
//! ├── cheatsheet/
//! │   ├── basics/index.html          # /cheatsheet/basics
//! │   └── control-flow/index.html
//! ├── oops/class/index.html
//! ├── style.css
//! ├── favicon.svg                    # from public/
//! ├── sitemap.xml
//! ├── robots.txt
//! ├── manifest.webmanifest
//! ├── sw.js
//! └── .render-cache.json
//! ```
//!
//! ## Layouts
//!
//! - `default`: sidebar, article, table of contents and prev/next pager
//! - `home`: sidebar and article
//!
//! Any other `layout` in front matter fails the build before anything is
//! written.
//!
//! ## Stale Pages
//!
//! The render cache lists every page the previous build wrote. Pages whose
//! document is gone are deleted, along with directories left empty.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Pages are rendered in parallel on the rayon pool.

use crate::cache::{self, CacheManifest, CacheStats};
use crate::config::{self, SiteConfig};
use crate::markdown::{MarkdownRenderer, TocEntry};
use crate::meta::PageMetadata;
use crate::navigation::{self, NavigationItem};
use crate::pwa;
use crate::scan::Manifest;
use crate::sitemap;
use crate::types::{Document, Layout};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use rayon::prelude::*;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error(
        "Unknown layout '{layout}' in {} (expected 'default' or 'home')",
        .source_path.display()
    )]
    UnknownLayout { layout: String, source_path: PathBuf },
}

const CSS_STATIC: &str = include_str!("../static/style.css");

pub const STYLESHEET_FILENAME: &str = "style.css";
pub const SITEMAP_FILENAME: &str = "sitemap.xml";
pub const ROBOTS_FILENAME: &str = "robots.txt";

/// Per-build inputs that do not come from `config.toml`.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Host for canonical links and the sitemap, without scheme.
    pub base_url: String,
    /// Skip pages whose inputs are unchanged since the last build.
    pub use_cache: bool,
    /// Generator version; part of the cache key and the service worker.
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Rendered,
    Cached,
}

#[derive(Debug, Clone)]
pub struct GeneratedPage {
    pub route: String,
    pub title: String,
    pub layout: Layout,
    /// Output file relative to the output directory.
    pub output: String,
    pub status: PageStatus,
}

/// What a build wrote.
#[derive(Debug)]
pub struct GenerateReport {
    pub pages: Vec<GeneratedPage>,
    /// Files copied from the assets directory, relative to the output directory.
    pub assets: Vec<String>,
    /// Pages left over from an earlier build whose source is gone.
    pub removed: Vec<String>,
    pub sitemap_urls: usize,
    /// Precache entry count, `None` when the PWA is disabled.
    pub precached: Option<usize>,
    pub cache: CacheStats,
}

/// Output file for a route: `/` → `index.html`, `/a/b` → `a/b/index.html`.
pub fn output_path_for(route: &str) -> String {
    let trimmed = route.trim_matches('/');
    if trimmed.is_empty() {
        "index.html".to_string()
    } else {
        format!("{trimmed}/index.html")
    }
}

pub fn generate(
    manifest: &Manifest,
    source_root: &Path,
    output_dir: &Path,
    options: &BuildOptions,
) -> Result<GenerateReport, GenerateError> {
    let config = &manifest.config;

    let layouts = manifest
        .documents
        .iter()
        .map(|doc| {
            Layout::from_name(&doc.layout).ok_or_else(|| GenerateError::UnknownLayout {
                layout: doc.layout.clone(),
                source_path: doc.source.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    fs::create_dir_all(output_dir)?;

    let color_css = config::generate_color_css(&config.colors);
    let css = format!("{}\n\n{}", color_css, CSS_STATIC);
    fs::write(output_dir.join(STYLESHEET_FILENAME), css)?;

    // Loaded even with the cache off: its entries are the pages the last
    // build wrote, which is what stale-page removal needs.
    let mut cache_manifest = CacheManifest::load(output_dir);

    let renderer = MarkdownRenderer::new(&config.markdown);
    let fingerprint = config_fingerprint(config)?;
    let ctx = PageContext {
        config,
        options,
        renderer: &renderer,
        cache: &cache_manifest,
        fingerprint: &fingerprint,
        output_dir,
    };

    let rendered = manifest
        .documents
        .par_iter()
        .zip(layouts.par_iter())
        .map(|(doc, layout)| render_to_disk(&ctx, doc, *layout))
        .collect::<Result<Vec<_>, GenerateError>>()?;

    let mut stats = CacheStats::default();
    let mut pages = Vec::with_capacity(rendered.len());
    for outcome in rendered {
        match outcome.page.status {
            PageStatus::Cached => stats.hit(),
            PageStatus::Rendered => stats.miss(),
        }
        cache_manifest.insert(
            outcome.page.output.clone(),
            outcome.source_hash,
            outcome.params_hash,
        );
        pages.push(outcome.page);
    }
    let removed = cache_manifest.retain_outputs(pages.iter().map(|p| p.output.as_str()));
    remove_stale_outputs(output_dir, &removed)?;
    cache_manifest.save(output_dir)?;

    let assets = copy_assets(&source_root.join(&config.content.assets_dir), output_dir)?;

    let routes: Vec<&str> = manifest.documents.iter().map(|d| d.route.as_str()).collect();
    let sitemap_xml = sitemap::generate_sitemap(&options.base_url, routes.iter().copied());
    let sitemap_urls = sitemap_xml.matches("<url>").count();
    fs::write(output_dir.join(SITEMAP_FILENAME), sitemap_xml)?;
    fs::write(
        output_dir.join(ROBOTS_FILENAME),
        sitemap::robots_txt(&options.base_url),
    )?;

    let precached = if config.pwa.enabled {
        Some(write_pwa(config, output_dir, &pages, &assets, &options.version)?)
    } else {
        None
    };

    Ok(GenerateReport {
        pages,
        assets,
        removed,
        sitemap_urls,
        precached,
        cache: stats,
    })
}

/// Shared, read-only inputs for rendering one page.
struct PageContext<'a> {
    config: &'a SiteConfig,
    options: &'a BuildOptions,
    renderer: &'a MarkdownRenderer,
    cache: &'a CacheManifest,
    fingerprint: &'a str,
    output_dir: &'a Path,
}

struct RenderOutcome {
    page: GeneratedPage,
    source_hash: String,
    params_hash: String,
}

fn render_to_disk(
    ctx: &PageContext,
    doc: &Document,
    layout: Layout,
) -> Result<RenderOutcome, GenerateError> {
    let output = output_path_for(&doc.route);
    let source_hash = cache::hash_bytes(&serde_json::to_vec(doc)?);
    let params_hash = cache::hash_render_params(&[
        &ctx.options.version,
        &ctx.options.base_url,
        &doc.route,
        layout.name(),
        ctx.fingerprint,
    ]);

    let status = if ctx.options.use_cache
        && ctx
            .cache
            .is_fresh(&output, &source_hash, &params_hash, ctx.output_dir)
    {
        tracing::debug!(route = %doc.route, "cache hit");
        PageStatus::Cached
    } else {
        let markup = render_page(ctx.config, doc, layout, &ctx.options.base_url, ctx.renderer);
        let path = ctx.output_dir.join(&output);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, markup.into_string())?;
        tracing::debug!(route = %doc.route, output = %output, "rendered");
        PageStatus::Rendered
    };

    Ok(RenderOutcome {
        page: GeneratedPage {
            route: doc.route.clone(),
            title: doc.title.clone(),
            layout,
            output,
            status,
        },
        source_hash,
        params_hash,
    })
}

/// Config sections the templates read, serialized for the cache key.
fn config_fingerprint(config: &SiteConfig) -> Result<String, serde_json::Error> {
    serde_json::to_string(&(&config.site, &config.markdown, &config.pwa))
}

/// Delete pages an earlier build wrote for documents that no longer exist,
/// then any directories that removal left empty.
fn remove_stale_outputs(output_dir: &Path, stale: &[String]) -> Result<(), GenerateError> {
    for rel in stale {
        let rel_path = Path::new(rel);
        if !rel_path
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            tracing::warn!(output = %rel, "ignoring stale cache entry outside the output directory");
            continue;
        }
        let path = output_dir.join(rel_path);
        match fs::remove_file(&path) {
            Ok(()) => tracing::info!(output = %rel, "removed stale page"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let mut dir = path.parent();
        while let Some(current) = dir {
            if current == output_dir {
                break;
            }
            let empty = match fs::read_dir(current) {
                Ok(mut entries) => entries.next().is_none(),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
                Err(e) => return Err(e.into()),
            };
            if !empty {
                break;
            }
            fs::remove_dir(current)?;
            dir = current.parent();
        }
    }
    Ok(())
}

/// Copy the assets directory into the output root.
///
/// Returns the copied files relative to the output directory, sorted.
/// A missing assets directory copies nothing.
fn copy_assets(src: &Path, dst: &Path) -> Result<Vec<String>, GenerateError> {
    let mut copied = Vec::new();
    if !src.is_dir() {
        return Ok(copied);
    }
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
        if rel.as_os_str().is_empty() {
            continue;
        }
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
    Ok(copied)
}

/// Write `manifest.webmanifest` and `sw.js`. Returns the precache size.
fn write_pwa(
    config: &SiteConfig,
    output_dir: &Path,
    pages: &[GeneratedPage],
    assets: &[String],
    version: &str,
) -> Result<usize, GenerateError> {
    let web_manifest = pwa::WebManifest::from_config(&config.pwa).to_json()?;
    fs::write(output_dir.join(pwa::MANIFEST_FILENAME), web_manifest)?;

    let files = pages
        .iter()
        .map(|p| p.output.as_str())
        .chain([STYLESHEET_FILENAME, pwa::MANIFEST_FILENAME])
        .chain(config.pwa.include_assets.iter().map(String::as_str))
        .chain(assets.iter().map(String::as_str));
    let entries = pwa::precache_entries(output_dir, files)?;

    let sw = pwa::service_worker_js(version, &entries, &config.pwa.runtime_caching)?;
    fs::write(output_dir.join(pwa::SERVICE_WORKER_FILENAME), sw)?;
    Ok(entries.len())
}

// ============================================================================
// HTML Components
// ============================================================================

/// Render one document to a full HTML page.
pub fn render_page(
    config: &SiteConfig,
    doc: &Document,
    layout: Layout,
    base_url: &str,
    renderer: &MarkdownRenderer,
) -> Markup {
    let meta = PageMetadata::for_route(&doc.route, Some(base_url), false, &config.site).with_page(
        doc.explicit_title.then_some(doc.title.as_str()),
        doc.description.as_deref(),
        &doc.keywords,
        &config.site,
    );

    let rendered = renderer.render(&doc.body);
    let article = html! {
        article.prose {
            (PreEscaped(&rendered.html))
        }
    };

    let main = match layout {
        Layout::Home => html! {
            main.content.home {
                (article)
            }
        },
        Layout::Default => html! {
            main.content {
                (article)
                (render_pager(&doc.route))
            }
            (render_toc(&rendered.toc))
        },
    };

    let body = html! {
        (site_header(&config.site.name))
        div.layout {
            (render_sidebar(&doc.route))
            (main)
        }
    };

    base_document(&meta, config, body)
}

/// Renders the base HTML document structure
fn base_document(meta: &PageMetadata, config: &SiteConfig, content: Markup) -> Markup {
    let pwa_enabled = config.pwa.enabled;
    html! {
        (DOCTYPE)
        html lang=(config.site.lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                (meta.render_head())
                link rel="icon" type="image/svg+xml" href="/favicon.svg";
                link rel="stylesheet" href={ "/" (STYLESHEET_FILENAME) };
                @if pwa_enabled {
                    link rel="manifest" href={ "/" (pwa::MANIFEST_FILENAME) };
                    link rel="apple-touch-icon" href="/apple-touch-icon.png";
                    link rel="mask-icon" href="/safari-pinned-tab.svg" color=(config.pwa.theme_color);
                    script { (PreEscaped(pwa::registration_script())) }
                }
            }
            body {
                (content)
            }
        }
    }
}

fn site_header(site_name: &str) -> Markup {
    html! {
        header.site-header {
            a.site-title href="/" { (site_name) }
            label.nav-toggle for="nav-open" { "Menu" }
        }
    }
}

/// Renders the sidebar: one section per non-empty navigation collection.
pub fn render_sidebar(current_route: &str) -> Markup {
    html! {
        input.nav-open type="checkbox" id="nav-open";
        nav.sidebar {
            @for collection in navigation::collections().iter().filter(|c| !c.items.is_empty()) {
                section.nav-section {
                    h2.nav-title { (collection.title) }
                    ul {
                        @for item in collection.items {
                            (render_nav_item(item, current_route))
                        }
                    }
                }
            }
        }
    }
}

fn render_nav_item(item: &NavigationItem, current_route: &str) -> Markup {
    let is_current = item.path == current_route;
    let external = item.path.starts_with("http://") || item.path.starts_with("https://");
    html! {
        li class=[is_current.then_some("current")] {
            @if external {
                a href=(item.path) target="_blank" rel="noopener" { (item.name) }
            } @else {
                a href=(item.path) aria-current=[is_current.then_some("page")] { (item.name) }
            }
            @if item.updated {
                " "
                span.badge { "New" }
            }
        }
    }
}

/// Table of contents for second and third level headings.
fn render_toc(toc: &[TocEntry]) -> Markup {
    let entries: Vec<&TocEntry> = toc.iter().filter(|e| (2..=3).contains(&e.level)).collect();
    html! {
        @if !entries.is_empty() {
            aside.toc {
                h2.toc-title { "On this page" }
                ul {
                    @for entry in entries {
                        li class={ "toc-level-" (entry.level) } {
                            a href={ "#" (entry.id) } { (entry.text) }
                        }
                    }
                }
            }
        }
    }
}

/// Previous/next links within the page's navigation collection.
fn render_pager(route: &str) -> Markup {
    let neighbors = navigation::neighbors(route);
    html! {
        @if neighbors.prev.is_some() || neighbors.next.is_some() {
            nav.pager {
                @if let Some(prev) = neighbors.prev {
                    a.pager-prev href=(prev.path) {
                        span.pager-label { "Previous" }
                        span.pager-name { (prev.name) }
                    }
                }
                @if let Some(next) = neighbors.next {
                    a.pager-next href=(next.path) {
                        span.pager-label { "Next" }
                        span.pager-name { (next.name) }
                    }
                }
            }
        }
    }
}
