//! Per-page SEO and social metadata.
//!
//! Every page gets the same site-wide description and keyword set. Only the
//! canonical URL (and, with front matter, the title and description) varies
//! by route.

use crate::config::SiteInfo;
use crate::environment::DEFAULT_BASE_URL;
use maud::{Markup, html};
use serde::Serialize;

pub const SITE_NAME: &str = "Java Cheatsheet";
pub const SITE_TITLE: &str = "Java Cheatsheet - Java Cheatsheet";
pub const DESCRIPTION: &str = "Anyone can forget how to make character classes for a regex, slice a list or do a for loop. This cheat sheet tries to provide a basic reference for beginner and advanced developers, lower the entry barrier for newcomers and help veterans refresh the old tricks.";
pub const TWITTER_DESCRIPTION: &str = "The Java Cheatsheet";
pub const KEYWORDS: &[&str] = &[
    "java",
    "cheatsheet",
    "cheat",
    "sheet",
    "functions",
    "args",
    "kwargs",
    "sets",
    "dictionary",
    "list",
    "string",
    "regular",
    "expression",
    "formatting",
    "file",
    "path",
    "json",
    "test",
    "vscode",
    "comprehension",
    "exception",
    "debugging",
    "dataclasses",
    "environments",
    "flow control",
    "itertools",
];

pub const THEME_COLOR_LIGHT: &str = "#ffffff";
pub const THEME_COLOR_DARK: &str = "#1f2937";

pub fn theme_color(dark: bool) -> &'static str {
    if dark { THEME_COLOR_DARK } else { THEME_COLOR_LIGHT }
}

/// `https://{base_url}{route_path}`, with `localhost:3000` for a missing host.
pub fn canonical_url(base_url: Option<&str>, route_path: &str) -> String {
    let host = base_url
        .filter(|b| !b.is_empty())
        .unwrap_or(DEFAULT_BASE_URL);
    format!("https://{host}{route_path}")
}

/// Which attribute names a meta tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaKey {
    Name,
    Property,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaTag {
    pub key: MetaKey,
    /// Value of the `name` or `property` attribute.
    pub id: String,
    pub content: String,
}

impl MetaTag {
    fn name(id: &str, content: impl Into<String>) -> Self {
        Self {
            key: MetaKey::Name,
            id: id.to_string(),
            content: content.into(),
        }
    }

    fn property(id: &str, content: impl Into<String>) -> Self {
        Self {
            key: MetaKey::Property,
            id: id.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkTag {
    pub rel: String,
    pub href: String,
}

/// Metadata bag injected into a page's `<head>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub meta: Vec<MetaTag>,
    pub link: Vec<LinkTag>,
}

impl PageMetadata {
    pub fn for_route(route_path: &str, base_url: Option<&str>, dark: bool, site: &SiteInfo) -> Self {
        let url = canonical_url(base_url, route_path);
        let meta = vec![
            MetaTag::name("theme-color", theme_color(dark)),
            MetaTag::name("description", site.description.as_str()),
            MetaTag::name("author", site.author.as_str()),
            MetaTag::name("keywords", site.keywords.join(", ")),
            MetaTag::property("og:title", site.name.as_str()),
            MetaTag::property("og:description", site.description.as_str()),
            MetaTag::property("og:url", url.as_str()),
            MetaTag::property("og:type", "article"),
            MetaTag::name("twitter:title", site.name.as_str()),
            MetaTag::name("twitter:description", site.twitter_description.as_str()),
            MetaTag::name("twitter:card", "summary"),
        ];
        Self {
            title: site.title.clone(),
            description: site.description.clone(),
            keywords: site.keywords.clone(),
            meta,
            link: vec![LinkTag {
                rel: "canonical".to_string(),
                href: url,
            }],
        }
    }

    /// Apply front matter overrides.
    ///
    /// A page title becomes `{title} - {site name}`. A page description
    /// replaces the `description` and `og:description` tags. Extra keywords
    /// are appended to the site keywords.
    pub fn with_page(
        mut self,
        title: Option<&str>,
        description: Option<&str>,
        keywords: &[String],
        site: &SiteInfo,
    ) -> Self {
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            self.title = format!("{title} - {}", site.name);
        }
        if let Some(description) = description.filter(|d| !d.is_empty()) {
            self.description = description.to_string();
            for tag in &mut self.meta {
                if tag.id == "description" || tag.id == "og:description" {
                    tag.content = description.to_string();
                }
            }
        }
        if !keywords.is_empty() {
            for keyword in keywords {
                if !self.keywords.contains(keyword) {
                    self.keywords.push(keyword.clone());
                }
            }
            let joined = self.keywords.join(", ");
            if let Some(tag) = self.meta.iter_mut().find(|t| t.id == "keywords") {
                tag.content = joined;
            }
        }
        self
    }

    pub fn canonical(&self) -> Option<&str> {
        self.link
            .iter()
            .find(|l| l.rel == "canonical")
            .map(|l| l.href.as_str())
    }

    pub fn tag(&self, id: &str) -> Option<&str> {
        self.meta
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.content.as_str())
    }

    /// `<title>`, meta and link tags for the document head.
    ///
    /// A static page cannot know the visitor's color scheme, so the dark
    /// theme color follows the default one as a media-qualified tag.
    pub fn render_head(&self) -> Markup {
        html! {
            title { (self.title) }
            @for tag in &self.meta {
                @match tag.key {
                    MetaKey::Name => {
                        meta name=(tag.id) content=(tag.content);
                    }
                    MetaKey::Property => {
                        meta property=(tag.id) content=(tag.content);
                    }
                }
                @if tag.id == "theme-color" && tag.content != THEME_COLOR_DARK {
                    meta name="theme-color" media="(prefers-color-scheme: dark)" content=(THEME_COLOR_DARK);
                }
            }
            @for link in &self.link {
                link rel=(link.rel) href=(link.href);
            }
        }
    }
}
