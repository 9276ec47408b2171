//! Centralized name handling for routes, titles, and heading anchors.
//!
//! Content files map to routes by file path. The same stem also yields the
//! fallback display title, and heading text yields anchor ids:
//! - `control-flow.md` → route segment `control-flow`, title "control flow"
//! - `index.md` → route segment `` (the directory itself)
//! - `## Hello, World!` → anchor `hello-world`

/// Result of parsing a content file stem like `control-flow`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Route segment. Empty for `index`, which maps to its directory.
    pub segment: String,
    /// Display title: stem with dashes converted to spaces.
    pub display_title: String,
}

/// Parse a markdown file stem into its route segment and display title.
///
/// - `"control-flow"` → segment="control-flow", display_title="control flow"
/// - `"basics"` → segment="basics", display_title="basics"
/// - `"index"` → segment="", display_title=""
pub fn parse_entry_name(stem: &str) -> ParsedName {
    if stem == "index" {
        return ParsedName {
            segment: String::new(),
            display_title: String::new(),
        };
    }
    ParsedName {
        segment: stem.to_string(),
        display_title: stem.replace('-', " "),
    }
}

/// Join a base route and path segments into an absolute route.
///
/// Empty segments are dropped, so `("", [""])` is `/` and
/// `("cheatsheet", ["basics"])` is `/cheatsheet/basics`.
pub fn join_route<'a>(base_route: &'a str, segments: impl IntoIterator<Item = &'a str>) -> String {
    let parts: Vec<&str> = std::iter::once(base_route)
        .chain(segments)
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", parts.join("/"))
}

/// Convert heading text into an anchor id.
///
/// Lowercases, keeps alphanumerics, turns whitespace, `-` and `_` into a
/// single dash, and drops everything else.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }
    slug
}
