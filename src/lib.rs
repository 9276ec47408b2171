//! # Java Cheatsheet
//!
//! Static site generator for the Java Cheatsheet documentation site.
//! Markdown pages under the content root become styled HTML pages with a
//! fixed navigation sidebar, per-page SEO metadata, a sitemap and an
//! offline-capable service worker.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Scan      content/  →  Manifest   (markdown files → routed documents)
//! 2. Generate  Manifest  →  dist/      (final HTML site)
//! ```
//!
//! The scan manifest serializes to JSON (`scan --json`), so what the
//! generator is about to render can be inspected without building.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: walks the content directories, parses front matter, assigns routes |
//! | [`generate`] | Stage 2: renders pages with Maud, writes CSS, assets, sitemap and PWA files |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation, color CSS |
//! | [`environment`] | `SITE_BASE_URL` / `NEWSLETTER_ENDPOINT` from the process or `.env` |
//! | [`meta`] | Site constants and per-route `<head>` metadata |
//! | [`navigation`] | The compiled-in sidebar table and its completeness checks |
//! | [`markdown`] | pulldown-cmark rendering with heading anchors and syntect highlighting |
//! | [`frontmatter`] | YAML (`---`) and TOML (`+++`) front matter |
//! | [`sitemap`] | `sitemap.xml` and `robots.txt` |
//! | [`pwa`] | Web app manifest and service worker |
//! | [`cache`] | Render cache for incremental builds |
//! | [`serve`] | Local preview server with the newsletter proxy |
//! | [`types`] | Shared types (`Document`, `Layout`) |
//! | [`naming`] | File names to route segments and titles |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Routes Come From the Filesystem
//!
//! Each configured content directory is mounted at a base route
//! (`docs/cheatsheet` → `/cheatsheet`); a file's route is its path inside
//! that directory without the extension, and `index.md` stands for its
//! folder. Two files claiming one route fail the scan.
//!
//! ## Navigation Is Compiled In
//!
//! The sidebar is a static table in [`navigation`]. It never changes at
//! runtime, and `check` verifies every entry against the scanned routes so
//! a renamed page cannot leave a dead link behind.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time
//! HTML macro system. Malformed markup is a build error and all
//! interpolation is escaped.
//!
//! ## Highlighting at Build Time
//!
//! Code blocks are highlighted by syntect while generating, so pages ship
//! without a client-side highlighter.

pub mod cache;
pub mod config;
pub mod environment;
pub mod frontmatter;
pub mod generate;
pub mod markdown;
pub mod meta;
pub mod naming;
pub mod navigation;
pub mod output;
pub mod pwa;
pub mod scan;
pub mod serve;
pub mod sitemap;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

/// Install the global `tracing` subscriber.
///
/// Without `-v`, `RUST_LOG` decides and defaults to `WARN`. Each `-v` raises
/// the global level (`INFO`, `DEBUG`, `TRACE`) over whatever `RUST_LOG`
/// says; its per-target directives still apply.
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let rust_log = std::env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(log_filter(verbose, rust_log.as_deref()))
        .init();
}

fn log_filter(verbose: u8, rust_log: Option<&str>) -> tracing_subscriber::EnvFilter {
    use tracing_subscriber::EnvFilter;

    let rust_log = rust_log.map(str::trim).filter(|s| !s.is_empty());
    let level = match verbose {
        0 => return EnvFilter::new(rust_log.unwrap_or("warn")),
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    EnvFilter::new(rust_log.unwrap_or_default()).add_directive(level.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn warn_by_default() {
        assert_eq!(log_filter(0, None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(0, Some("  ")).max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn rust_log_applies_without_verbose() {
        assert_eq!(log_filter(0, Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(0, Some("error")).max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn verbose_raises_the_global_level() {
        assert_eq!(log_filter(1, None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(2, Some("warn")).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter(5, None).max_level_hint(), Some(LevelFilter::TRACE));
    }
}
