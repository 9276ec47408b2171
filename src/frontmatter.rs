//! Optional front matter at the top of content pages.
//!
//! YAML between `---` fences or TOML between `+++` fences. Only the keys the
//! site uses are read; anything else is ignored so pages can carry extra
//! editor metadata.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Invalid YAML front matter in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Invalid TOML front matter in {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `default` or `home`.
    pub layout: Option<String>,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterFormat {
    Yaml,
    Toml,
}

impl FrontmatterFormat {
    fn delimiter(&self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }
}

/// Split content into `(format, front matter, body)`.
///
/// The fences must sit on their own lines. Returns `None` when the content
/// has no front matter or the closing fence is missing.
pub fn split_frontmatter(content: &str) -> Option<(FrontmatterFormat, &str, &str)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let first_line = content.lines().next()?.trim_end();
    let format = match first_line {
        "---" => FrontmatterFormat::Yaml,
        "+++" => FrontmatterFormat::Toml,
        _ => return None,
    };
    let delimiter = format.delimiter();

    let after_open = content[first_line.len()..].trim_start_matches(['\r', '\n']);
    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == delimiter {
            let front = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            return Some((format, front, body.trim_start_matches(['\r', '\n'])));
        }
        offset += line.len();
    }
    None
}

/// Parse front matter, returning it with the remaining markdown body.
///
/// Content without front matter yields the defaults and the full text.
pub fn parse_frontmatter(content: &str, path: &Path) -> Result<(Frontmatter, String), FrontmatterError> {
    let Some((format, raw, body)) = split_frontmatter(content) else {
        return Ok((Frontmatter::default(), content.to_string()));
    };

    if raw.trim().is_empty() {
        return Ok((Frontmatter::default(), body.to_string()));
    }

    let frontmatter = match format {
        FrontmatterFormat::Yaml => {
            serde_yaml::from_str(raw).map_err(|source| FrontmatterError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
        }
        FrontmatterFormat::Toml => toml::from_str(raw).map_err(|source| FrontmatterError::Toml {
            path: path.to_path_buf(),
            source,
        })?,
    };
    Ok((frontmatter, body.to_string()))
}
