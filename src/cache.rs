//! Render cache for incremental builds.
//!
//! Highlighting every fenced block with syntect is the slowest part of a
//! build. This module lets the generate stage skip pages whose markdown and
//! render parameters have not changed since the last build.
//!
//! ## Cache keys
//!
//! - **`source_hash`**: SHA-256 of the scanned document (front matter and
//!   body). Content-based rather than mtime-based so it survives
//!   `git checkout` (which resets modification times).
//!
//! - **`params_hash`**: SHA-256 of everything else that reaches the page:
//!   the generator version, base URL, route, layout and the config sections
//!   the templates read. Changing any of them re-renders the page.
//!
//! A cache hit requires:
//! 1. An entry for the output path with matching `source_hash` and `params_hash`
//! 2. The previously-written output file still exists on disk
//!
//! ## Storage
//!
//! The manifest is a JSON file at `<output_dir>/.render-cache.json`, so it
//! travels with the output directory when `dist/` is cached in CI.
//!
//! ## Bypassing the cache
//!
//! `build --no-cache` ignores the stored hashes, so every page is rendered
//! again and the old files are overwritten. The stored output list is still
//! used to delete pages whose source is gone.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache manifest file within the output directory.
pub const MANIFEST_FILENAME: &str = ".render-cache.json";

/// Bump to invalidate all existing caches when the format or key
/// computation changes.
const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub source_hash: String,
    pub params_hash: String,
}

/// On-disk manifest mapping output paths (relative to the output
/// directory) to the hashes they were rendered from.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: BTreeMap<String, CacheEntry>,
}

impl CacheManifest {
    /// Create an empty manifest (first build, or an unreadable one).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: BTreeMap::new(),
        }
    }

    /// Load from the output directory. Returns an empty manifest if the
    /// file doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(output_dir: &Path) -> Self {
        let path = manifest_path(output_dir);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        match serde_json::from_str::<Self>(&content) {
            Ok(m) if m.version == MANIFEST_VERSION => m,
            Ok(_) | Err(_) => {
                tracing::debug!(path = %path.display(), "discarding unreadable render cache");
                Self::empty()
            }
        }
    }

    /// Save to the output directory.
    pub fn save(&self, output_dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(manifest_path(output_dir), json)
    }

    /// Whether `output_path` was rendered from these hashes and is still on disk.
    pub fn is_fresh(
        &self,
        output_path: &str,
        source_hash: &str,
        params_hash: &str,
        output_dir: &Path,
    ) -> bool {
        self.entries.get(output_path).is_some_and(|entry| {
            entry.source_hash == source_hash && entry.params_hash == params_hash
        }) && output_dir.join(output_path).exists()
    }

    /// Record the hashes an output file was rendered from.
    pub fn insert(&mut self, output_path: String, source_hash: String, params_hash: String) {
        self.entries.insert(
            output_path,
            CacheEntry {
                source_hash,
                params_hash,
            },
        );
    }

    /// Drop entries for outputs that are no longer produced.
    ///
    /// Returns the dropped output paths, sorted, so the caller can delete
    /// the stale files.
    pub fn retain_outputs<'a>(&mut self, outputs: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let keep: std::collections::HashSet<&str> = outputs.into_iter().collect();
        let mut dropped = Vec::new();
        self.entries.retain(|path, _| {
            let kept = keep.contains(path.as_str());
            if !kept {
                dropped.push(path.clone());
            }
            kept
        });
        dropped
    }
}

/// SHA-256 of a byte slice, returned as a hex string.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(hash_bytes(&bytes))
}

/// SHA-256 hash of the parameters a page is rendered with.
///
/// Parts are NUL-separated so `["ab", "c"]` and `["a", "bc"]` differ.
pub fn hash_render_params(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"page\0");
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update(b"\0");
    }
    format!("{:x}", hasher.finalize())
}

/// Summary of cache performance for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn miss(&mut self) {
        self.misses += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} rendered ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} rendered", self.misses)
        }
    }
}

/// Resolve the cache manifest path for an output directory.
pub fn manifest_path(output_dir: &Path) -> PathBuf {
    output_dir.join(MANIFEST_FILENAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // =========================================================================
    // CacheManifest basics
    // =========================================================================

    #[test]
    fn empty_manifest_has_no_entries() {
        let m = CacheManifest::empty();
        assert_eq!(m.version, MANIFEST_VERSION);
        assert!(m.entries.is_empty());
    }

    #[test]
    fn fresh_when_hashes_match_and_output_exists() {
        let tmp = TempDir::new().unwrap();
        let mut m = CacheManifest::empty();
        m.insert("oops/class/index.html".into(), "src".into(), "prm".into());

        let out = tmp.path().join("oops/class");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("index.html"), "<html>").unwrap();

        assert!(m.is_fresh("oops/class/index.html", "src", "prm", tmp.path()));
    }

    #[test]
    fn stale_when_source_changes() {
        let tmp = TempDir::new().unwrap();
        let mut m = CacheManifest::empty();
        m.insert("index.html".into(), "old".into(), "prm".into());
        fs::write(tmp.path().join("index.html"), "x").unwrap();

        assert!(!m.is_fresh("index.html", "new", "prm", tmp.path()));
    }

    #[test]
    fn stale_when_params_change() {
        let tmp = TempDir::new().unwrap();
        let mut m = CacheManifest::empty();
        m.insert("index.html".into(), "src".into(), "a".into());
        fs::write(tmp.path().join("index.html"), "x").unwrap();

        assert!(!m.is_fresh("index.html", "src", "b", tmp.path()));
    }

    #[test]
    fn stale_when_output_deleted() {
        let tmp = TempDir::new().unwrap();
        let mut m = CacheManifest::empty();
        m.insert("index.html".into(), "src".into(), "prm".into());

        assert!(!m.is_fresh("index.html", "src", "prm", tmp.path()));
    }

    #[test]
    fn unknown_output_is_stale() {
        let tmp = TempDir::new().unwrap();
        assert!(!CacheManifest::empty().is_fresh("a.html", "s", "p", tmp.path()));
    }

    #[test]
    fn retain_outputs_drops_removed_pages() {
        let mut m = CacheManifest::empty();
        m.insert("a/index.html".into(), "1".into(), "1".into());
        m.insert("b/index.html".into(), "2".into(), "2".into());
        let dropped = m.retain_outputs(["b/index.html"]);
        assert_eq!(m.entries.keys().collect::<Vec<_>>(), vec!["b/index.html"]);
        assert_eq!(dropped, vec!["a/index.html".to_string()]);
    }

    // =========================================================================
    // Save / load
    // =========================================================================

    #[test]
    fn save_and_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let mut m = CacheManifest::empty();
        m.insert("index.html".into(), "s".into(), "p".into());
        m.save(tmp.path()).unwrap();

        let loaded = CacheManifest::load(tmp.path());
        assert_eq!(loaded.entries, m.entries);
    }

    #[test]
    fn load_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(CacheManifest::load(tmp.path()).entries.is_empty());
    }

    #[test]
    fn load_corrupt_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(manifest_path(tmp.path()), "{not json").unwrap();
        assert!(CacheManifest::load(tmp.path()).entries.is_empty());
    }

    #[test]
    fn load_wrong_version_is_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            manifest_path(tmp.path()),
            r#"{"version": 999, "entries": {"index.html": {"source_hash": "a", "params_hash": "b"}}}"#,
        )
        .unwrap();
        assert!(CacheManifest::load(tmp.path()).entries.is_empty());
    }

    // =========================================================================
    // Hashing
    // =========================================================================

    #[test]
    fn hash_file_matches_hash_bytes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.md");
        fs::write(&path, "# Basics").unwrap();
        assert_eq!(hash_file(&path).unwrap(), hash_bytes(b"# Basics"));
        assert_eq!(hash_bytes(b"").len(), 64);
    }

    #[test]
    fn render_params_are_separated() {
        assert_ne!(hash_render_params(&["ab", "c"]), hash_render_params(&["a", "bc"]));
        assert_eq!(hash_render_params(&["x"]), hash_render_params(&["x"]));
    }

    // =========================================================================
    // CacheStats
    // =========================================================================

    #[test]
    fn stats_display_all_rendered() {
        let stats = CacheStats { hits: 0, misses: 5 };
        assert_eq!(stats.to_string(), "5 rendered");
    }

    #[test]
    fn stats_display_mixed() {
        let mut stats = CacheStats::default();
        stats.hit();
        stats.hit();
        stats.miss();
        assert_eq!(stats.to_string(), "2 cached, 1 rendered (3 total)");
    }
}
