//! `sitemap.xml` and `robots.txt`.
//!
//! Both are pure string builders; the generate stage writes them.

use std::collections::HashSet;

/// `https://{base_url}`, the origin every sitemap `<loc>` starts with.
pub fn hostname(base_url: &str) -> String {
    format!("https://{base_url}")
}

/// Sitemap with exactly one `<url>` per distinct route, in first-seen order.
pub fn generate_sitemap<'a>(base_url: &str, routes: impl IntoIterator<Item = &'a str>) -> String {
    let origin = hostname(base_url);
    let mut seen = HashSet::new();

    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    xml.push('\n');

    for route in routes {
        if !seen.insert(route) {
            continue;
        }
        xml.push_str("  <url>\n");
        xml.push_str(&format!(
            "    <loc>{}</loc>\n",
            escape_xml(&format!("{origin}{route}"))
        ));
        xml.push_str("    <changefreq>daily</changefreq>\n");
        xml.push_str("    <priority>1.0</priority>\n");
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    tracing::debug!(urls = seen.len(), "generated sitemap");
    xml
}

/// Allow everything and point crawlers at the sitemap.
pub fn robots_txt(base_url: &str) -> String {
    format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}/sitemap.xml\n",
        hostname(base_url)
    )
}

/// Escape XML special characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
