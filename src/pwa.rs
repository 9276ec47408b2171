//! Web app manifest and service worker.
//!
//! The service worker is `static/sw.js` with its placeholders filled in at
//! build time:
//!
//! | placeholder | value |
//! |-------------|-------|
//! | `__VERSION__` | generator version, for humans reading the file |
//! | `__CACHE_PREFIX__` | prefix shared by every precache this site creates |
//! | `__CACHE_NAME__` | precache name, versioned by the precache content |
//! | `__PRECACHE_MANIFEST__` | JSON list of `{url, revision}` |
//! | `__RUNTIME_CACHING__` | JSON list of runtime caching rules |
//!
//! The worker updates itself as soon as a new build is deployed: it skips
//! the waiting phase, claims open clients, and deletes precaches from older
//! builds.

use crate::cache::{hash_bytes, hash_file};
use crate::config::{CacheRule, PwaConfig, PwaIcon};
use serde::Serialize;
use std::io;
use std::path::Path;

pub const MANIFEST_FILENAME: &str = "manifest.webmanifest";
pub const SERVICE_WORKER_FILENAME: &str = "sw.js";
pub const CACHE_PREFIX: &str = "java-cheatsheet-precache";

const SW_TEMPLATE: &str = include_str!("../static/sw.js");

/// `manifest.webmanifest` contents.
#[derive(Debug, Serialize)]
pub struct WebManifest<'a> {
    pub name: &'a str,
    pub short_name: &'a str,
    pub theme_color: &'a str,
    pub background_color: &'a str,
    pub display: &'a str,
    pub orientation: &'a str,
    pub start_url: &'a str,
    pub scope: &'a str,
    pub icons: &'a [PwaIcon],
}

impl<'a> WebManifest<'a> {
    pub fn from_config(pwa: &'a PwaConfig) -> Self {
        Self {
            name: &pwa.name,
            short_name: &pwa.short_name,
            theme_color: &pwa.theme_color,
            background_color: &pwa.background_color,
            display: &pwa.display,
            orientation: &pwa.orientation,
            start_url: &pwa.start_url,
            scope: &pwa.scope,
            icons: &pwa.icons,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// One precached file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrecacheEntry {
    /// Absolute URL path, e.g. `/cheatsheet/basics/index.html`.
    pub url: String,
    /// SHA-256 of the file contents.
    pub revision: String,
}

/// Hash every file in `files` (paths relative to `output_dir`).
///
/// Files that do not exist are skipped with a warning, so a missing
/// `include_assets` entry does not fail the build.
pub fn precache_entries<'a>(
    output_dir: &Path,
    files: impl IntoIterator<Item = &'a str>,
) -> io::Result<Vec<PrecacheEntry>> {
    let mut entries = Vec::new();
    for rel in files {
        let path = output_dir.join(rel);
        if !path.is_file() {
            tracing::warn!(file = rel, "precache file missing from output, skipping");
            continue;
        }
        let url = format!("/{}", rel.trim_start_matches('/').replace('\\', "/"));
        if entries.iter().any(|e: &PrecacheEntry| e.url == url) {
            continue;
        }
        entries.push(PrecacheEntry {
            url,
            revision: hash_file(&path)?,
        });
    }
    Ok(entries)
}

/// Precache name derived from the entries, so any content change yields a
/// new cache and the old one is dropped on activation.
pub fn cache_name(entries: &[PrecacheEntry]) -> String {
    let mut key = String::new();
    for entry in entries {
        key.push_str(&entry.url);
        key.push('\0');
        key.push_str(&entry.revision);
        key.push('\n');
    }
    let hash = hash_bytes(key.as_bytes());
    format!("{CACHE_PREFIX}-{}", &hash[..12])
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RuntimeRule<'a> {
    cache_name: &'a str,
    url_pattern: &'a str,
    handler: &'static str,
    max_entries: u32,
    max_age_seconds: u64,
}

/// Render the service worker script.
pub fn service_worker_js(
    version: &str,
    entries: &[PrecacheEntry],
    rules: &[CacheRule],
) -> serde_json::Result<String> {
    let runtime: Vec<RuntimeRule> = rules
        .iter()
        .map(|r| RuntimeRule {
            cache_name: &r.cache_name,
            url_pattern: &r.url_pattern,
            handler: r.handler.as_str(),
            max_entries: r.max_entries,
            max_age_seconds: r.max_age_seconds,
        })
        .collect();

    Ok(SW_TEMPLATE
        .replace("__VERSION__", version)
        .replace("__CACHE_PREFIX__", CACHE_PREFIX)
        .replace("__CACHE_NAME__", &cache_name(entries))
        .replace("__PRECACHE_MANIFEST__", &serde_json::to_string(entries)?)
        .replace("__RUNTIME_CACHING__", &serde_json::to_string(&runtime)?))
}

/// Inline script that registers the service worker once the page has loaded.
pub fn registration_script() -> String {
    format!(
        "if ('serviceWorker' in navigator) {{ window.addEventListener('load', () => {{ navigator.serviceWorker.register('/{SERVICE_WORKER_FILENAME}', {{ scope: '/' }}); }}); }}"
    )
}
