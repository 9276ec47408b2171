//! Markdown to HTML for content pages.
//!
//! Parsing is pulldown-cmark with tables, footnotes, strikethrough, task
//! lists and `{#id}` heading attributes. The event stream is rewritten before
//! it reaches the HTML writer:
//!
//! - headings get a unique `id` and are collected into a table of contents
//! - fenced code blocks are highlighted with syntect
//! - `http(s)://` links open in a new tab with `rel="noopener"`

mod highlight;

pub use highlight::{DEFAULT_THEME, Highlighter};

use crate::config::MarkdownConfig;
use crate::naming::slugify;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};
use std::collections::HashSet;

/// One heading in the table of contents.
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    pub level: u8,
    pub text: String,
    pub id: String,
}

#[derive(Debug, Clone, Default)]
pub struct RenderedMarkdown {
    pub html: String,
    pub toc: Vec<TocEntry>,
}

pub struct MarkdownRenderer {
    highlighter: Highlighter,
    options: Options,
    external_links_new_tab: bool,
}

impl MarkdownRenderer {
    pub fn new(config: &MarkdownConfig) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Self {
            highlighter: Highlighter::new(&config.syntax_theme),
            options,
            external_links_new_tab: config.external_links_new_tab,
        }
    }

    pub fn render(&self, markdown: &str) -> RenderedMarkdown {
        let mut events: Vec<Event> = Vec::new();
        let mut toc = Vec::new();
        let mut ids = HeadingIds::default();
        let mut heading: Option<PendingHeading> = None;
        let mut code: Option<PendingCode> = None;

        for event in Parser::new_ext(markdown, self.options) {
            let event = self.rewrite_link(event);

            if code.is_some() {
                match event {
                    Event::End(TagEnd::CodeBlock) => {
                        if let Some(block) = code.take() {
                            let highlighted =
                                self.highlighter.highlight(&block.text, block.lang.as_deref());
                            events.push(Event::Html(highlighted.into()));
                        }
                    }
                    Event::Text(text) => {
                        if let Some(block) = code.as_mut() {
                            block.text.push_str(&text);
                        }
                    }
                    _ => {}
                }
                continue;
            }

            if heading.is_some() {
                match event {
                    Event::End(TagEnd::Heading(_)) => {
                        if let Some(pending) = heading.take() {
                            let (markup, entry) = pending.finish(&mut ids);
                            toc.push(entry);
                            events.push(Event::Html(markup.into()));
                        }
                    }
                    other => {
                        if let Some(pending) = heading.as_mut() {
                            pending.push(other);
                        }
                    }
                }
                continue;
            }

            match event {
                Event::Start(Tag::Heading {
                    level, id, classes, ..
                }) => {
                    heading = Some(PendingHeading {
                        level: level as u8,
                        explicit_id: id.map(|i| i.to_string()),
                        classes: classes.iter().map(|c| c.to_string()).collect(),
                        text: String::new(),
                        events: Vec::new(),
                    });
                }
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code = Some(PendingCode {
                        lang,
                        text: String::new(),
                    });
                }
                other => events.push(other),
            }
        }

        let mut out = String::with_capacity(markdown.len() * 2);
        html::push_html(&mut out, events.into_iter());
        RenderedMarkdown { html: out, toc }
    }

    fn rewrite_link<'a>(&self, event: Event<'a>) -> Event<'a> {
        match event {
            Event::Start(Tag::Link {
                dest_url, title, ..
            }) if self.external_links_new_tab && is_external(&dest_url) => {
                let title_attr = if title.is_empty() {
                    String::new()
                } else {
                    format!(" title=\"{}\"", escape_html(&title))
                };
                Event::InlineHtml(CowStr::from(format!(
                    "<a href=\"{}\"{title_attr} target=\"_blank\" rel=\"noopener\">",
                    escape_html(&dest_url)
                )))
            }
            other => other,
        }
    }
}

fn is_external(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

struct PendingCode {
    lang: Option<String>,
    text: String,
}

struct PendingHeading<'a> {
    level: u8,
    explicit_id: Option<String>,
    classes: Vec<String>,
    /// Plain text for the table of contents and the slug.
    text: String,
    events: Vec<Event<'a>>,
}

impl<'a> PendingHeading<'a> {
    fn push(&mut self, event: Event<'a>) {
        if let Event::Text(t) | Event::Code(t) = &event {
            self.text.push_str(t);
        }
        self.events.push(event);
    }

    fn finish(self, ids: &mut HeadingIds) -> (String, TocEntry) {
        let base = self
            .explicit_id
            .unwrap_or_else(|| slugify(&self.text));
        let id = ids.claim(base);

        let mut inner = String::new();
        html::push_html(&mut inner, self.events.into_iter());

        let class_attr = if self.classes.is_empty() {
            String::new()
        } else {
            format!(" class=\"{}\"", escape_html(&self.classes.join(" ")))
        };
        let level = self.level;
        let markup = format!(
            "<h{level} id=\"{}\"{class_attr}>{inner}</h{level}>\n",
            escape_html(&id)
        );
        let entry = TocEntry {
            level,
            text: self.text.trim().to_string(),
            id,
        };
        (markup, entry)
    }
}

/// Hands out unique heading ids within one page.
#[derive(Default)]
struct HeadingIds {
    used: HashSet<String>,
}

impl HeadingIds {
    fn claim(&mut self, base: String) -> String {
        let base = if base.is_empty() {
            "section".to_string()
        } else {
            base
        };
        if self.used.insert(base.clone()) {
            return base;
        }
        let mut n = 1;
        loop {
            let candidate = format!("{base}-{n}");
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Escape text for HTML content and double-quoted attributes.
pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}
