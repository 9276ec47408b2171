//! Shared types used across pipeline stages.
//!
//! The scan stage produces [`Document`]s; `scan --json` serializes them and
//! the generate stage renders them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A content page mapped to one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Absolute route, e.g. `/cheatsheet/basics` or `/`.
    pub route: String,
    /// Base route of the content directory the page came from. Empty for `pages/`.
    pub section: String,
    /// Source file relative to the content root.
    pub source: PathBuf,
    /// Front matter title, first `# heading`, or the file stem with dashes as spaces.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Layout name as written; resolved to a [`Layout`] at render time.
    pub layout: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Whether the title came from front matter, and so overrides the site title.
    #[serde(default)]
    pub explicit_title: bool,
    /// Markdown with front matter stripped.
    pub body: String,
}

/// Page template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Sidebar, article, table of contents and pager.
    Default,
    /// Landing page: sidebar and article only.
    Home,
}

impl Layout {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::Default),
            "home" => Some(Self::Home),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Home => "home",
        }
    }

    /// Layout for a page without a front matter `layout`.
    pub fn for_route(route: &str) -> Self {
        if route == "/" { Self::Home } else { Self::Default }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_names_round_trip() {
        for layout in [Layout::Default, Layout::Home] {
            assert_eq!(Layout::from_name(layout.name()), Some(layout));
        }
        assert_eq!(Layout::from_name("blog"), None);
        assert_eq!(Layout::from_name("Default"), None);
    }

    #[test]
    fn root_defaults_to_home() {
        assert_eq!(Layout::for_route("/"), Layout::Home);
        assert_eq!(Layout::for_route("/cheatsheet/basics"), Layout::Default);
    }
}
