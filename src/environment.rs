//! Environment inputs: `SITE_BASE_URL` and `NEWSLETTER_ENDPOINT`.
//!
//! Values come from the process environment first, then from a `.env` file
//! in the content root. The `.env` file is parsed without touching the
//! process environment.

use crate::config::SiteConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const BASE_URL_VAR: &str = "SITE_BASE_URL";
pub const NEWSLETTER_ENDPOINT_VAR: &str = "NEWSLETTER_ENDPOINT";

/// Host used when no base URL is configured anywhere.
pub const DEFAULT_BASE_URL: &str = "localhost:3000";

#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("Failed to read {}: {source}", .path.display())]
    Dotenv {
        path: PathBuf,
        source: dotenvy::Error,
    },
}

/// Environment values that affect a build or the preview server.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildEnv {
    pub base_url: Option<String>,
    pub newsletter_endpoint: Option<String>,
}

impl BuildEnv {
    /// Read the process environment, falling back to `<root>/.env`.
    pub fn load(root: &Path) -> Result<Self, EnvironmentError> {
        let dotenv = read_dotenv(&root.join(".env"))?;
        Ok(Self::from_sources(|key| std::env::var(key).ok(), &dotenv))
    }

    /// Combine a variable lookup with parsed `.env` values. Lookup wins.
    pub fn from_sources(
        lookup: impl Fn(&str) -> Option<String>,
        dotenv: &HashMap<String, String>,
    ) -> Self {
        let get = |key: &str| {
            lookup(key)
                .or_else(|| dotenv.get(key).cloned())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            base_url: get(BASE_URL_VAR),
            newsletter_endpoint: get(NEWSLETTER_ENDPOINT_VAR),
        }
    }
}

/// Parse a `.env` file into a map. A missing file yields an empty map.
pub fn read_dotenv(path: &Path) -> Result<HashMap<String, String>, EnvironmentError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let to_err = |source| EnvironmentError::Dotenv {
        path: path.to_path_buf(),
        source,
    };
    let iter = dotenvy::from_path_iter(path).map_err(to_err)?;
    let mut vars = HashMap::new();
    for item in iter {
        let (key, value) = item.map_err(to_err)?;
        vars.insert(key, value);
    }
    Ok(vars)
}

/// Resolve the published host.
///
/// Precedence: `--base-url`, then environment (process or `.env`), then
/// `site.base_url`, then `localhost:3000`. Blank values are skipped. A
/// scheme prefix and trailing slash are stripped so canonical URLs come out
/// as `https://{host}{path}`.
pub fn resolve_base_url(cli: Option<&str>, env: &BuildEnv, config: &SiteConfig) -> String {
    let raw = [cli, env.base_url.as_deref(), config.site.base_url.as_deref()]
        .into_iter()
        .flatten()
        .find(|v| !v.trim().is_empty())
        .unwrap_or(DEFAULT_BASE_URL);
    normalize_host(raw)
}

fn normalize_host(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    without_scheme.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn no_process_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn process_env_wins_over_dotenv() {
        let dotenv = HashMap::from([(BASE_URL_VAR.to_string(), "from-file.dev".to_string())]);
        let env = BuildEnv::from_sources(
            |key| (key == BASE_URL_VAR).then(|| "from-process.dev".to_string()),
            &dotenv,
        );
        assert_eq!(env.base_url.as_deref(), Some("from-process.dev"));
        assert_eq!(env.newsletter_endpoint, None);
    }

    #[test]
    fn dotenv_fills_missing_values() {
        let dotenv = HashMap::from([(
            NEWSLETTER_ENDPOINT_VAR.to_string(),
            "https://api.example.com/subscribe".to_string(),
        )]);
        let env = BuildEnv::from_sources(no_process_env, &dotenv);
        assert_eq!(
            env.newsletter_endpoint.as_deref(),
            Some("https://api.example.com/subscribe")
        );
    }

    #[test]
    fn blank_values_are_ignored() {
        let dotenv = HashMap::from([(BASE_URL_VAR.to_string(), "   ".to_string())]);
        let env = BuildEnv::from_sources(no_process_env, &dotenv);
        assert_eq!(env.base_url, None);
    }

    #[test]
    fn read_dotenv_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let vars = read_dotenv(&tmp.path().join(".env")).unwrap();
        assert!(vars.is_empty());
    }

    #[test]
    fn read_dotenv_parses_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".env");
        fs::write(
            &path,
            "# local overrides\nSITE_BASE_URL=javacheatsheet.dev\nNEWSLETTER_ENDPOINT=\"http://127.0.0.1:9000\"\n",
        )
        .unwrap();
        let vars = read_dotenv(&path).unwrap();
        assert_eq!(vars.get(BASE_URL_VAR).map(String::as_str), Some("javacheatsheet.dev"));
        assert_eq!(
            vars.get(NEWSLETTER_ENDPOINT_VAR).map(String::as_str),
            Some("http://127.0.0.1:9000")
        );
    }

    // =========================================================================
    // resolve_base_url tests
    // =========================================================================

    #[test]
    fn base_url_defaults_to_localhost() {
        let url = resolve_base_url(None, &BuildEnv::default(), &SiteConfig::default());
        assert_eq!(url, "localhost:3000");
    }

    #[test]
    fn base_url_precedence() {
        let mut config = SiteConfig::default();
        config.site.base_url = Some("config.dev".to_string());
        let env = BuildEnv {
            base_url: Some("env.dev".to_string()),
            newsletter_endpoint: None,
        };

        assert_eq!(resolve_base_url(Some("cli.dev"), &env, &config), "cli.dev");
        assert_eq!(resolve_base_url(None, &env, &config), "env.dev");
        assert_eq!(
            resolve_base_url(None, &BuildEnv::default(), &config),
            "config.dev"
        );
    }

    #[test]
    fn blank_base_url_falls_through() {
        let mut config = SiteConfig::default();
        config.site.base_url = Some("config.dev".to_string());
        let env = BuildEnv {
            base_url: Some("env.dev".to_string()),
            newsletter_endpoint: None,
        };

        assert_eq!(resolve_base_url(Some(""), &env, &config), "env.dev");
        assert_eq!(resolve_base_url(Some("  "), &BuildEnv::default(), &config), "config.dev");

        let blank_env = BuildEnv {
            base_url: Some(String::new()),
            newsletter_endpoint: None,
        };
        assert_eq!(resolve_base_url(None, &blank_env, &config), "config.dev");
    }

    #[test]
    fn base_url_strips_scheme_and_trailing_slash() {
        let url = resolve_base_url(
            Some("https://javacheatsheet.dev/"),
            &BuildEnv::default(),
            &SiteConfig::default(),
        );
        assert_eq!(url, "javacheatsheet.dev");
    }
}
