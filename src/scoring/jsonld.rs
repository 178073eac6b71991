//! JSON-LD and text extraction helpers for the scorer
//!
//! The rubric factors share three inputs computed once per page: the
//! parsed JSON-LD blocks, the flattened list of schema.org `@type`
//! names (including one level of `@graph`), and the visible body text
//! with whitespace collapsed.

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

/// Parses every `<script type="application/ld+json">` block on the page
///
/// Top-level arrays are flattened into individual items; blocks that are
/// not valid JSON are skipped.
pub fn parse_json_ld(document: &Html) -> Vec<Value> {
    let mut items = Vec::new();

    let selector = match Selector::parse(r#"script[type="application/ld+json"]"#) {
        Ok(s) => s,
        Err(_) => return items,
    };

    for script in document.select(&selector) {
        let raw = script.text().collect::<String>();
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(entries)) => items.extend(entries),
            Ok(value) => items.push(value),
            Err(_) => {} // malformed JSON-LD, skip
        }
    }

    items
}

/// Collects every schema.org `@type` across the JSON-LD items
///
/// Handles string and string-array `@type` values, plus the `@type` of
/// each entry one level down inside `@graph`.
pub fn collect_schema_types(items: &[Value]) -> Vec<String> {
    let mut types = Vec::new();

    for item in items {
        push_types(item, &mut types);

        if let Some(graph) = item.get("@graph").and_then(Value::as_array) {
            for entry in graph {
                push_types(entry, &mut types);
            }
        }
    }

    types
}

fn push_types(item: &Value, types: &mut Vec<String>) {
    match item.get("@type") {
        Some(Value::String(t)) => types.push(t.clone()),
        Some(Value::Array(list)) => {
            for t in list {
                if let Some(t) = t.as_str() {
                    types.push(t.to_string());
                }
            }
        }
        _ => {}
    }
}

/// Extracts the visible body text with whitespace collapsed
///
/// Script, style, and noscript subtrees are excluded so word counts
/// reflect prose, not embedded code.
pub fn body_text(document: &Html) -> String {
    let body_selector = match Selector::parse("body") {
        Ok(s) => s,
        Err(_) => return String::new(),
    };

    let Some(body) = document.select(&body_selector).next() else {
        return String::new();
    };

    let mut raw = String::new();
    collect_text(body, &mut raw);

    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        } else if let Some(el) = child.value().as_element() {
            if matches!(el.name(), "script" | "style" | "noscript") {
                continue;
            }
            if let Some(child_ref) = ElementRef::wrap(child) {
                collect_text(child_ref, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_single_object() {
        let html = Html::parse_document(
            r#"<html><head><script type="application/ld+json">
            {"@type": "Article", "headline": "Hi"}
            </script></head><body></body></html>"#,
        );
        let items = parse_json_ld(&html);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["@type"], "Article");
    }

    #[test]
    fn test_flattens_top_level_array() {
        let html = Html::parse_document(
            r#"<html><head><script type="application/ld+json">
            [{"@type": "WebSite"}, {"@type": "Organization"}]
            </script></head><body></body></html>"#,
        );
        let items = parse_json_ld(&html);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_skips_malformed_blocks() {
        let html = Html::parse_document(
            r#"<html><head>
            <script type="application/ld+json">{not json</script>
            <script type="application/ld+json">{"@type": "WebPage"}</script>
            </head><body></body></html>"#,
        );
        let items = parse_json_ld(&html);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_collects_types_from_graph_and_arrays() {
        let items = vec![
            serde_json::json!({"@type": ["Article", "BlogPosting"]}),
            serde_json::json!({"@graph": [{"@type": "Person"}, {"@type": "WebPage"}]}),
        ];
        let types = collect_schema_types(&items);
        assert_eq!(types, ["Article", "BlogPosting", "Person", "WebPage"]);
    }

    #[test]
    fn test_body_text_excludes_scripts_and_collapses_whitespace() {
        let html = Html::parse_document(
            "<html><body><p>Hello   \n  world</p><script>var x = 1;</script>\
             <style>p { color: red }</style></body></html>",
        );
        assert_eq!(body_text(&html), "Hello world");
    }

    #[test]
    fn test_body_text_empty_document() {
        let html = Html::parse_document("<html><head></head></html>");
        // parse_document synthesizes an empty body
        assert_eq!(body_text(&html), "");
    }
}
