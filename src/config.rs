//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the content root and is sparse: stock defaults are serialized to a TOML
//! table, the user file is merged on top key-by-key, and the result is
//! deserialized and validated.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! name = "Java Cheatsheet"
//! title = "Java Cheatsheet - Java Cheatsheet"
//! author = "Java Cheatsheet"
//! # base_url = "javacheatsheet.example"   # host only, no scheme
//!
//! [content]
//! assets_dir = "public"
//! dirs = [
//!     { dir = "pages", base_route = "" },
//!     { dir = "docs/cheatsheet", base_route = "cheatsheet" },
//!     # ...
//! ]
//!
//! [markdown]
//! syntax_theme = "base16-ocean.dark"
//! external_links_new_tab = true
//!
//! [colors.light]
//! background = "#ffffff"
//!
//! [pwa]
//! name = "Java Cheatsheet"
//!
//! [[pwa.runtime_caching]]
//! cache_name = "google-fonts"
//! url_pattern = '^https://fonts\.(?:googleapis|gstatic)\.com/.*'
//! handler = "CacheFirst"
//! max_entries = 10
//! max_age_seconds = 31536000
//!
//! [serve]
//! port = 3000
//!
//! [processing]
//! max_processes = 4         # Max parallel render workers (omit for auto)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::meta;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name of the site config inside the content root.
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults matching the published Java Cheatsheet site.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identity used in page metadata.
    pub site: SiteInfo,
    /// Content directories and their base routes.
    pub content: ContentConfig,
    /// Markdown rendering options.
    pub markdown: MarkdownConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
    /// Web app manifest and service worker settings.
    pub pwa: PwaConfig,
    /// Local preview server settings.
    pub serve: ServeConfig,
    /// Parallel rendering settings.
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content.dirs.is_empty() {
            return Err(ConfigError::Validation(
                "content.dirs must not be empty".into(),
            ));
        }
        for dir in &self.content.dirs {
            if dir.dir.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "content.dirs entries need a non-empty dir".into(),
                ));
            }
            if dir.base_route.starts_with('/') || dir.base_route.ends_with('/') {
                return Err(ConfigError::Validation(format!(
                    "content.dirs base_route '{}' must not start or end with '/'",
                    dir.base_route
                )));
            }
        }

        let mut cache_names = HashSet::new();
        for rule in &self.pwa.runtime_caching {
            if rule.cache_name.is_empty() {
                return Err(ConfigError::Validation(
                    "pwa.runtime_caching cache_name must not be empty".into(),
                ));
            }
            if !cache_names.insert(rule.cache_name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "pwa.runtime_caching cache_name '{}' is used twice",
                    rule.cache_name
                )));
            }
            if let Err(e) = Regex::new(&rule.url_pattern) {
                return Err(ConfigError::Validation(format!(
                    "pwa.runtime_caching '{}' has an invalid url_pattern: {e}",
                    rule.cache_name
                )));
            }
            if rule.max_entries == 0 {
                return Err(ConfigError::Validation(format!(
                    "pwa.runtime_caching '{}' max_entries must be non-zero",
                    rule.cache_name
                )));
            }
        }

        if !self.serve.newsletter_path.starts_with('/') {
            return Err(ConfigError::Validation(
                "serve.newsletter_path must start with '/'".into(),
            ));
        }
        Ok(())
    }
}

/// Site identity: the fixed title, description, and keyword set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    /// Short site name, used for social titles and page title suffixes.
    pub name: String,
    /// Full `<title>` for pages without their own title.
    pub title: String,
    pub description: String,
    pub author: String,
    /// Description used for the `twitter:description` card.
    pub twitter_description: String,
    pub keywords: Vec<String>,
    /// Host (and optional port) the site is published on, without scheme.
    /// Overridden by `SITE_BASE_URL` and `--base-url`.
    pub base_url: Option<String>,
    /// `lang` attribute of the generated documents.
    pub lang: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: meta::SITE_NAME.to_string(),
            title: meta::SITE_TITLE.to_string(),
            description: meta::DESCRIPTION.to_string(),
            author: meta::SITE_NAME.to_string(),
            twitter_description: meta::TWITTER_DESCRIPTION.to_string(),
            keywords: meta::KEYWORDS.iter().map(|k| k.to_string()).collect(),
            base_url: None,
            lang: "en".to_string(),
        }
    }
}

/// A content directory mounted at a base route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentDir {
    /// Directory relative to the content root.
    pub dir: String,
    /// Route prefix without slashes; empty mounts at `/`.
    pub base_route: String,
}

impl ContentDir {
    fn new(dir: &str, base_route: &str) -> Self {
        Self {
            dir: dir.to_string(),
            base_route: base_route.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    /// Directories scanned for markdown pages, in route-priority order.
    pub dirs: Vec<ContentDir>,
    /// Static assets copied verbatim to the output root.
    pub assets_dir: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dirs: vec![
                ContentDir::new("pages", ""),
                ContentDir::new("docs/cheatsheet", "cheatsheet"),
                ContentDir::new("docs/oops", "oops"),
                ContentDir::new("docs/wrapperclass", "wrapperclass"),
                ContentDir::new("docs/collection", "collection"),
                ContentDir::new("docs/multithread", "multithread"),
                ContentDir::new("docs/builtin", "builtin"),
                ContentDir::new("docs/modules", "modules"),
                ContentDir::new("docs/blog", "blog"),
            ],
            assets_dir: "public".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    /// syntect theme used for build-time code highlighting.
    pub syntax_theme: String,
    /// Open `http(s)://` links in a new tab with `rel="noopener"`.
    pub external_links_new_tab: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            syntax_theme: "base16-ocean.dark".to_string(),
            external_links_new_tab: true,
        }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Sidebar section titles, table of contents, pager labels.
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
    /// Background behind inline code.
    pub code_background: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: meta::THEME_COLOR_LIGHT.to_string(),
            text: "#1f2937".to_string(),
            text_muted: "#6b7280".to_string(),
            border: "#e5e7eb".to_string(),
            link: "#0ea5e9".to_string(),
            link_hover: "#0369a1".to_string(),
            code_background: "#f3f4f6".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: meta::THEME_COLOR_DARK.to_string(),
            text: "#e5e7eb".to_string(),
            text_muted: "#9ca3af".to_string(),
            border: "#374151".to_string(),
            link: "#38bdf8".to_string(),
            link_hover: "#7dd3fc".to_string(),
            code_background: "#111827".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

/// Web app manifest and service worker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PwaConfig {
    /// When false, no manifest or service worker is emitted.
    pub enabled: bool,
    pub name: String,
    pub short_name: String,
    pub theme_color: String,
    pub background_color: String,
    pub display: String,
    pub orientation: String,
    pub start_url: String,
    pub scope: String,
    /// Files from the assets directory added to the precache list.
    pub include_assets: Vec<String>,
    pub icons: Vec<PwaIcon>,
    pub runtime_caching: Vec<CacheRule>,
}

impl Default for PwaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: meta::SITE_NAME.to_string(),
            short_name: meta::SITE_NAME.to_string(),
            theme_color: meta::THEME_COLOR_LIGHT.to_string(),
            background_color: meta::THEME_COLOR_LIGHT.to_string(),
            display: "standalone".to_string(),
            orientation: "portrait".to_string(),
            start_url: "/".to_string(),
            scope: "/".to_string(),
            include_assets: [
                "favicon.svg",
                "safari-pinned-tab.svg",
                "android-chrome-192x192.png",
                "android-chrome-512x512.png",
                "apple-touch-icon.png",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            icons: vec![
                PwaIcon::png("/android-chrome-192x192.png", "192x192", None),
                PwaIcon::png("/android-chrome-512x512.png", "512x512", None),
                PwaIcon::png("/apple-touch-icon.png", "180x180", Some("any maskable")),
            ],
            runtime_caching: vec![
                CacheRule::cache_first_for_a_year(
                    "google-fonts",
                    r"^https://fonts\.(?:googleapis|gstatic)\.com/.*",
                ),
                CacheRule::cache_first_for_a_year("jsdelivr-cdn", r"^https://cdn\.jsdelivr\.net/.*"),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PwaIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl PwaIcon {
    fn png(src: &str, sizes: &str, purpose: Option<&str>) -> Self {
        Self {
            src: src.to_string(),
            sizes: sizes.to_string(),
            mime_type: "image/png".to_string(),
            purpose: purpose.map(str::to_string),
        }
    }
}

/// Service worker strategy for a runtime caching rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheHandler {
    CacheFirst,
    NetworkFirst,
    StaleWhileRevalidate,
}

impl CacheHandler {
    /// Identifier used by the generated service worker.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CacheFirst => "CacheFirst",
            Self::NetworkFirst => "NetworkFirst",
            Self::StaleWhileRevalidate => "StaleWhileRevalidate",
        }
    }
}

/// Runtime caching rule for requests to third-party origins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheRule {
    pub cache_name: String,
    /// Regular expression matched case-insensitively against the request URL.
    pub url_pattern: String,
    pub handler: CacheHandler,
    pub max_entries: u32,
    pub max_age_seconds: u64,
}

/// One year, the expiry used for both CDN caches.
pub const ONE_YEAR_SECONDS: u64 = 60 * 60 * 24 * 365;

impl CacheRule {
    fn cache_first_for_a_year(cache_name: &str, url_pattern: &str) -> Self {
        Self {
            cache_name: cache_name.to_string(),
            url_pattern: url_pattern.to_string(),
            handler: CacheHandler::CacheFirst,
            max_entries: 10,
            max_age_seconds: ONE_YEAR_SECONDS,
        }
    }

    /// Whether a request URL falls under this rule.
    ///
    /// Returns false for patterns that do not compile; `validate` rejects
    /// those before a build gets here.
    pub fn matches(&self, url: &str) -> bool {
        regex::RegexBuilder::new(&self.url_pattern)
            .case_insensitive(true)
            .build()
            .map(|re| re.is_match(url))
            .unwrap_or(false)
    }
}

/// Local preview server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
    /// Requests under this prefix are proxied to `NEWSLETTER_ENDPOINT`.
    pub newsletter_path: String,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            newsletter_path: "/newsletter".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel render workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so arrays
///   such as `content.dirs` are replaced, not appended to.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no config file.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the content root.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Java Cheatsheet Configuration
# =============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site identity (page titles, descriptions, social cards)
# ---------------------------------------------------------------------------
[site]
name = "Java Cheatsheet"
title = "Java Cheatsheet - Java Cheatsheet"
description = "Anyone can forget how to make character classes for a regex, slice a list or do a for loop. This cheat sheet tries to provide a basic reference for beginner and advanced developers, lower the entry barrier for newcomers and help veterans refresh the old tricks."
author = "Java Cheatsheet"
twitter_description = "The Java Cheatsheet"
keywords = [
    "java", "cheatsheet", "cheat", "sheet", "functions", "args", "kwargs",
    "sets", "dictionary", "list", "string", "regular", "expression",
    "formatting", "file", "path", "json", "test", "vscode", "comprehension",
    "exception", "debugging", "dataclasses", "environments", "flow control",
    "itertools",
]
lang = "en"

# Host the site is published on, without scheme. Used for canonical links
# and the sitemap. SITE_BASE_URL and --base-url take precedence.
# base_url = "localhost:3000"

# ---------------------------------------------------------------------------
# Content directories, each mounted at a base route
# ---------------------------------------------------------------------------
[content]
# Copied verbatim to the output root (favicons, icons, fonts).
assets_dir = "public"

dirs = [
    { dir = "pages", base_route = "" },
    { dir = "docs/cheatsheet", base_route = "cheatsheet" },
    { dir = "docs/oops", base_route = "oops" },
    { dir = "docs/wrapperclass", base_route = "wrapperclass" },
    { dir = "docs/collection", base_route = "collection" },
    { dir = "docs/multithread", base_route = "multithread" },
    { dir = "docs/builtin", base_route = "builtin" },
    { dir = "docs/modules", base_route = "modules" },
    { dir = "docs/blog", base_route = "blog" },
]

# ---------------------------------------------------------------------------
# Markdown rendering
# ---------------------------------------------------------------------------
[markdown]
# syntect theme for code blocks.
syntax_theme = "base16-ocean.dark"

# Open http(s) links in a new tab with rel="noopener".
external_links_new_tab = true

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#1f2937"
text_muted = "#6b7280"    # Sidebar titles, table of contents, pager
border = "#e5e7eb"
link = "#0ea5e9"
link_hover = "#0369a1"
code_background = "#f3f4f6"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#1f2937"
text = "#e5e7eb"
text_muted = "#9ca3af"
border = "#374151"
link = "#38bdf8"
link_hover = "#7dd3fc"
code_background = "#111827"

# ---------------------------------------------------------------------------
# Progressive web app: manifest.webmanifest and sw.js
# ---------------------------------------------------------------------------
[pwa]
enabled = true
name = "Java Cheatsheet"
short_name = "Java Cheatsheet"
theme_color = "#ffffff"
background_color = "#ffffff"
display = "standalone"
orientation = "portrait"
start_url = "/"
scope = "/"

# Files from assets_dir added to the service worker precache.
include_assets = [
    "favicon.svg",
    "safari-pinned-tab.svg",
    "android-chrome-192x192.png",
    "android-chrome-512x512.png",
    "apple-touch-icon.png",
]

[[pwa.icons]]
src = "/android-chrome-192x192.png"
sizes = "192x192"
type = "image/png"

[[pwa.icons]]
src = "/android-chrome-512x512.png"
sizes = "512x512"
type = "image/png"

[[pwa.icons]]
src = "/apple-touch-icon.png"
sizes = "180x180"
type = "image/png"
purpose = "any maskable"

# Runtime caching for third-party origins. Patterns are regular
# expressions matched case-insensitively against the request URL.
# handler is one of CacheFirst, NetworkFirst, StaleWhileRevalidate.
[[pwa.runtime_caching]]
cache_name = "google-fonts"
url_pattern = '^https://fonts\.(?:googleapis|gstatic)\.com/.*'
handler = "CacheFirst"
max_entries = 10
max_age_seconds = 31536000

[[pwa.runtime_caching]]
cache_name = "jsdelivr-cdn"
url_pattern = '^https://cdn\.jsdelivr\.net/.*'
handler = "CacheFirst"
max_entries = 10
max_age_seconds = 31536000

# ---------------------------------------------------------------------------
# Local preview server (`java-cheatsheet serve`)
# ---------------------------------------------------------------------------
[serve]
host = "127.0.0.1"
port = 3000

# Requests under this prefix are proxied to NEWSLETTER_ENDPOINT with the
# prefix stripped.
newsletter_path = "/newsletter"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel render workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
    --color-link-hover: {light_link_hover};
    --color-code-bg: {light_code_bg};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-link: {dark_link};
        --color-link-hover: {dark_link_hover};
        --color-code-bg: {dark_code_bg};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        light_link_hover = colors.light.link_hover,
        light_code_bg = colors.light.code_background,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
        dark_link_hover = colors.dark.link_hover,
        dark_code_bg = colors.dark.code_background,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_mirrors_published_site() {
        let config = SiteConfig::default();
        assert_eq!(config.site.name, "Java Cheatsheet");
        assert_eq!(config.site.title, "Java Cheatsheet - Java Cheatsheet");
        assert_eq!(config.site.base_url, None);
        assert_eq!(config.content.dirs.len(), 9);
        assert_eq!(config.content.dirs[0], ContentDir::new("pages", ""));
        assert_eq!(config.pwa.runtime_caching.len(), 2);
    }

    #[test]
    fn default_runtime_caching_rules() {
        let rules = SiteConfig::default().pwa.runtime_caching;
        for rule in &rules {
            assert_eq!(rule.handler, CacheHandler::CacheFirst);
            assert_eq!(rule.max_entries, 10);
            assert_eq!(rule.max_age_seconds, 31_536_000);
        }
        assert_eq!(rules[0].cache_name, "google-fonts");
        assert_eq!(rules[1].cache_name, "jsdelivr-cdn");
    }

    #[test]
    fn cache_rule_matches_its_origin_only() {
        let rules = SiteConfig::default().pwa.runtime_caching;
        let fonts = &rules[0];
        assert!(fonts.matches("https://fonts.googleapis.com/css2?family=Inter"));
        assert!(fonts.matches("https://fonts.gstatic.com/s/inter/v12/a.woff2"));
        assert!(fonts.matches("HTTPS://FONTS.GSTATIC.COM/x"));
        assert!(!fonts.matches("https://cdn.jsdelivr.net/npm/x"));

        let cdn = &rules[1];
        assert!(cdn.matches("https://cdn.jsdelivr.net/npm/prismjs/themes/a.css"));
        assert!(!cdn.matches("http://cdn.jsdelivr.net/npm/x"));
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[colors.light]
background = "#fafafa"
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.colors.light.background, "#fafafa");
        assert_eq!(config.colors.light.text, "#1f2937");
        assert_eq!(config.colors.dark.background, "#1f2937");
        assert_eq!(config.content.assets_dir, "public");
    }

    #[test]
    fn parse_content_dirs_replace_defaults() {
        let toml = r#"
[content]
dirs = [{ dir = "docs", base_route = "docs" }]
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.content.dirs, vec![ContentDir::new("docs", "docs")]);
    }

    #[test]
    fn generate_css_uses_config_colors() {
        let mut colors = ColorConfig::default();
        colors.light.background = "#f0f0f0".to_string();
        colors.dark.background = "#1a1a1a".to_string();

        let css = generate_color_css(&colors);
        assert!(css.contains("--color-bg: #f0f0f0"));
        assert!(css.contains("--color-bg: #1a1a1a"));
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
        assert!(css.contains("--color-code-bg:"));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.colors.light.background, "#ffffff");
        assert_eq!(config.serve.port, 3000);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
[site]
base_url = "javacheatsheet.dev"

[serve]
port = 4000
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.site.base_url.as_deref(), Some("javacheatsheet.dev"));
        assert_eq!(config.serve.port, 4000);
        assert_eq!(config.serve.host, "127.0.0.1");
        assert_eq!(config.site.name, "Java Cheatsheet");
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILENAME), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_rejects_bad_cache_pattern() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILENAME),
            r#"
[[pwa.runtime_caching]]
cache_name = "broken"
url_pattern = "^https://(unclosed"
handler = "CacheFirst"
max_entries = 5
max_age_seconds = 60
"#,
        )
        .unwrap();

        let err = load_config(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("broken"));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[site]
nmae = "typo"
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[sitez]\nname = \"x\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_handler_rejected() {
        let toml_str = r#"
[[pwa.runtime_caching]]
cache_name = "x"
url_pattern = ".*"
handler = "CacheLast"
max_entries = 1
max_age_seconds = 1
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_empty_dirs() {
        let mut config = SiteConfig::default();
        config.content.dirs.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_base_route_slashes() {
        let mut config = SiteConfig::default();
        config.content.dirs = vec![ContentDir::new("docs", "/docs")];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("/docs"));
    }

    #[test]
    fn validate_duplicate_cache_names() {
        let mut config = SiteConfig::default();
        let first = config.pwa.runtime_caching[0].clone();
        config.pwa.runtime_caching.push(first);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("used twice"));
    }

    #[test]
    fn validate_zero_max_entries() {
        let mut config = SiteConfig::default();
        config.pwa.runtime_caching[1].max_entries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_newsletter_path() {
        let mut config = SiteConfig::default();
        config.serve.newsletter_path = "newsletter".to_string();
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_deep_nested() {
        let base: toml::Value = toml::from_str(
            r##"
[colors.light]
background = "#fff"
text = "#000"
"##,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r##"
[colors.light]
background = "#fafafa"
"##,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let light = merged.get("colors").unwrap().get("light").unwrap();
        assert_eq!(light.get("background").unwrap().as_str(), Some("#fafafa"));
        assert_eq!(light.get("text").unwrap().as_str(), Some("#000"));
    }

    #[test]
    fn merge_toml_replaces_arrays() {
        let base: toml::Value = toml::from_str("keywords = [\"a\", \"b\"]").unwrap();
        let overlay: toml::Value = toml::from_str("keywords = [\"c\"]").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("keywords").unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn resolve_config_with_overlay() {
        let overlay: toml::Value = toml::from_str("[markdown]\nexternal_links_new_tab = false\n").unwrap();
        let config = resolve_config(stock_defaults_value(), Some(overlay)).unwrap();
        assert!(!config.markdown.external_links_new_tab);
        assert_eq!(config.markdown.syntax_theme, "base16-ocean.dark");
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(99999),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let parsed: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(parsed.site.description, defaults.site.description);
        assert_eq!(parsed.site.keywords, defaults.site.keywords);
        assert_eq!(parsed.content.dirs, defaults.content.dirs);
        assert_eq!(parsed.pwa.icons, defaults.pwa.icons);
        assert_eq!(parsed.pwa.runtime_caching, defaults.pwa.runtime_caching);
        assert_eq!(parsed.pwa.include_assets, defaults.pwa.include_assets);
        assert_eq!(parsed.colors.dark.background, defaults.colors.dark.background);
        assert_eq!(parsed.serve.newsletter_path, defaults.serve.newsletter_path);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        for section in ["site", "content", "markdown", "colors", "pwa", "serve", "processing"] {
            assert!(val.get(section).is_some(), "missing section {section}");
        }
    }
}
