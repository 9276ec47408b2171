//! Build-time syntax highlighting for fenced code blocks.

use super::escape_html;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

/// Fallback when the configured theme is not bundled with syntect.
pub const DEFAULT_THEME: &str = "base16-ocean.dark";

pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    pub fn new(theme_name: &str) -> Self {
        let mut themes = ThemeSet::load_defaults().themes;
        let theme = match themes.remove(theme_name) {
            Some(theme) => theme,
            None => {
                tracing::warn!(
                    theme = theme_name,
                    fallback = DEFAULT_THEME,
                    "unknown syntax theme"
                );
                themes
                    .remove(DEFAULT_THEME)
                    .or_else(|| themes.into_values().next())
                    .unwrap_or_default()
            }
        };
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
        }
    }

    /// Highlight `code` as `lang`.
    ///
    /// Blocks without a language, or with one syntect does not know, come out
    /// as an escaped `<pre><code>` with a `language-*` class when a language
    /// was named.
    pub fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let Some(syntax) = lang.and_then(|l| self.syntax_set.find_syntax_by_token(l)) else {
            return plain_block(code, lang);
        };
        match highlighted_html_for_string(code, &self.syntax_set, syntax, &self.theme) {
            Ok(html) => html,
            Err(e) => {
                tracing::debug!(?lang, error = %e, "highlighting failed, emitting plain block");
                plain_block(code, lang)
            }
        }
    }
}

fn plain_block(code: &str, lang: Option<&str>) -> String {
    let class = lang
        .map(|l| format!(" class=\"language-{}\"", escape_html(l)))
        .unwrap_or_default();
    format!("<pre><code{class}>{}</code></pre>\n", escape_html(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn java_is_highlighted() {
        let h = Highlighter::new(DEFAULT_THEME);
        let html = h.highlight("public class Main {}\n", Some("java"));
        assert!(html.starts_with("<pre style="));
        assert!(html.contains("<span"));
        assert!(html.contains("Main"));
    }

    #[test]
    fn unknown_language_falls_back() {
        let h = Highlighter::new(DEFAULT_THEME);
        let html = h.highlight("a < b\n", Some("nosuchlang"));
        assert_eq!(
            html,
            "<pre><code class=\"language-nosuchlang\">a &lt; b\n</code></pre>\n"
        );
    }

    #[test]
    fn no_language_is_plain() {
        let h = Highlighter::new(DEFAULT_THEME);
        let html = h.highlight("plain & simple\n", None);
        assert_eq!(html, "<pre><code>plain &amp; simple\n</code></pre>\n");
    }

    #[test]
    fn unknown_theme_still_highlights() {
        let h = Highlighter::new("no-such-theme");
        let html = h.highlight("int x = 1;\n", Some("java"));
        assert!(html.contains("<span"));
    }
}
