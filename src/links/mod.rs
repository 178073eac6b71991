//! Same-origin link discovery
//!
//! Parses a scraped page's HTML and extracts candidate sublinks for the
//! rest of the analysis. The result is deterministic: document order of
//! first appearance, capped at ten URLs total with the base URL first.

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Maximum number of URLs an analysis will ever visit (base + 9 sublinks)
pub const MAX_PAGES: usize = 10;

/// Path substrings that mark a link as not worth scoring
/// (auth flows, admin surfaces, API routes, build assets)
const EXCLUDED_PATH_PATTERNS: &[&str] = &[
    "/login", "/logout", "/signup", "/register", "/api/", "/admin", "/_next", "/assets",
    "/static", "/cdn",
];

/// File extensions for binary or document payloads that are never HTML
const EXCLUDED_EXTENSIONS: &[&str] = &[
    ".pdf", ".zip", ".gz", ".tar", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".ico",
    ".mp4", ".mp3", ".avi", ".mov", ".exe", ".dmg", ".apk", ".doc", ".docx", ".xls", ".xlsx",
    ".ppt", ".pptx",
];

/// Extracts same-origin candidate links from a page, in document order
///
/// # Filtering Rules
///
/// **Exclude:**
/// - Fragment-only, `mailto:`, `tel:`, and `javascript:` hrefs
/// - Links whose origin differs from the base origin
/// - Denylisted path patterns (auth, admin, API, build assets)
/// - Binary/document file extensions
/// - The base URL itself
/// - Duplicates (by absolute URL with the fragment stripped)
///
/// # Arguments
///
/// * `base_url` - The page the HTML was fetched from
/// * `html` - The page's HTML content
///
/// # Returns
///
/// At most ten candidate URLs beyond the base, first appearance wins
pub fn extract_links(base_url: &Url, html: &str) -> Vec<Url> {
    let origin = base_url.origin();

    // Relative hrefs resolve against the origin root, not the page path
    let origin_url = match Url::parse(&origin.ascii_serialization()) {
        Ok(u) => u,
        Err(_) => return Vec::new(),
    };

    let mut base_stripped = base_url.clone();
    base_stripped.set_fragment(None);

    let document = Html::parse_document(html);
    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for element in document.select(&selector) {
        let href = match element.value().attr("href") {
            Some(h) => h.trim(),
            None => continue,
        };

        if href.is_empty()
            || href.starts_with('#')
            || href.starts_with("mailto:")
            || href.starts_with("tel:")
            || href.starts_with("javascript:")
        {
            continue;
        }

        let mut absolute = match origin_url.join(href) {
            Ok(u) => u,
            Err(_) => continue,
        };
        absolute.set_fragment(None);

        if absolute.origin() != origin {
            continue;
        }

        let path_lower = absolute.path().to_ascii_lowercase();
        if EXCLUDED_PATH_PATTERNS.iter().any(|p| path_lower.contains(p)) {
            continue;
        }
        if EXCLUDED_EXTENSIONS.iter().any(|ext| path_lower.ends_with(ext)) {
            continue;
        }

        if absolute == base_stripped {
            continue;
        }

        if !seen.insert(absolute.clone()) {
            continue;
        }

        results.push(absolute);
        if results.len() >= MAX_PAGES {
            break;
        }
    }

    results
}

/// Builds the bounded page set for one analysis: the base URL followed by
/// at most nine discovered sublinks
pub fn discover_sublinks(base_url: &Url, html: &str) -> Vec<Url> {
    let links = extract_links(base_url, html);
    let mut pages = Vec::with_capacity(MAX_PAGES);
    pages.push(base_url.clone());
    pages.extend(links.into_iter().take(MAX_PAGES - 1));
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[test]
    fn test_first_element_is_base() {
        let html = r#"<html><body><a href="/about">About</a></body></html>"#;
        let pages = discover_sublinks(&base(), html);
        assert_eq!(pages[0], base());
        assert_eq!(pages[1].as_str(), "https://example.com/about");
    }

    #[test]
    fn test_caps_at_ten_pages() {
        let mut html = String::from("<html><body>");
        for i in 0..30 {
            html.push_str(&format!(r#"<a href="/page-{}">p</a>"#, i));
        }
        html.push_str("</body></html>");

        let pages = discover_sublinks(&base(), &html);
        assert_eq!(pages.len(), 10);
        assert_eq!(pages[0], base());
        // Document order of first appearance
        assert_eq!(pages[1].as_str(), "https://example.com/page-0");
        assert_eq!(pages[9].as_str(), "https://example.com/page-8");
    }

    #[test]
    fn test_drops_cross_origin_links() {
        let html = r#"<html><body>
            <a href="https://other.com/page">External</a>
            <a href="https://sub.example.com/page">Subdomain</a>
            <a href="/internal">Internal</a>
        </body></html>"#;
        let pages = discover_sublinks(&base(), html);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].as_str(), "https://example.com/internal");
    }

    #[test]
    fn test_drops_special_schemes_and_fragments() {
        let html = r##"<html><body>
            <a href="#section">Anchor</a>
            <a href="mailto:hi@example.com">Mail</a>
            <a href="tel:+123">Call</a>
            <a href="javascript:void(0)">JS</a>
            <a href="/real">Real</a>
        </body></html>"##;
        let pages = discover_sublinks(&base(), html);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].as_str(), "https://example.com/real");
    }

    #[test]
    fn test_drops_denylisted_paths() {
        let html = r#"<html><body>
            <a href="/login">Login</a>
            <a href="/admin/panel">Admin</a>
            <a href="/api/v1/data">API</a>
            <a href="/static/app.js">Asset</a>
            <a href="/blog">Blog</a>
        </body></html>"#;
        let pages = discover_sublinks(&base(), html);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].as_str(), "https://example.com/blog");
    }

    #[test]
    fn test_drops_binary_extensions() {
        let html = r#"<html><body>
            <a href="/report.pdf">PDF</a>
            <a href="/photo.JPG">Image</a>
            <a href="/archive.zip">Zip</a>
            <a href="/docs">Docs</a>
        </body></html>"#;
        let pages = discover_sublinks(&base(), html);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].as_str(), "https://example.com/docs");
    }

    #[test]
    fn test_deduplicates_and_strips_fragments() {
        let html = r#"<html><body>
            <a href="/pricing">One</a>
            <a href="/pricing#plans">Two</a>
            <a href="https://example.com/pricing">Three</a>
        </body></html>"#;
        let pages = discover_sublinks(&base(), html);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].as_str(), "https://example.com/pricing");
    }

    #[test]
    fn test_excludes_base_url_itself() {
        let html = r#"<html><body>
            <a href="/">Home</a>
            <a href="https://example.com/">Home again</a>
            <a href="/other">Other</a>
        </body></html>"#;
        let pages = discover_sublinks(&base(), html);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].as_str(), "https://example.com/other");
    }

    #[test]
    fn test_relative_links_resolve_against_origin() {
        let deep = Url::parse("https://example.com/blog/post").unwrap();
        let html = r#"<html><body><a href="about">About</a></body></html>"#;
        let pages = discover_sublinks(&deep, html);
        // Resolution is against the origin root, matching the discovery
        // contract, not against the page path
        assert_eq!(pages[1].as_str(), "https://example.com/about");
    }

    #[test]
    fn test_empty_html_returns_only_base() {
        let pages = discover_sublinks(&base(), "");
        assert_eq!(pages, vec![base()]);
    }
}
