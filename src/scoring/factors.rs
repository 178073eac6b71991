//! The ten rubric factors
//!
//! Each function scores one dimension of generative-engine readiness and
//! returns a `GeoFactor` carrying the points awarded, the cap, and a
//! human-readable evidence string. Factors only inspect the parsed
//! document and the shared precomputed inputs; none of them touch the
//! network, so the same HTML always yields the same score.

use crate::model::GeoFactor;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use url::Url;

/// Counts elements matching a CSS selector, treating an unparseable
/// selector as zero matches
fn count(document: &Html, css: &str) -> usize {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).count(),
        Err(_) => 0,
    }
}

fn exists(document: &Html, css: &str) -> bool {
    count(document, css) > 0
}

/// Returns the named attribute of the first element matching `css`
fn first_attr(document: &Html, css: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|v| v.to_string())
}

/// Renders a JSON-LD value for an evidence string
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn schema_markup(document: &Html, types: &[String]) -> GeoFactor {
    let label = "Schema Markup".to_string();
    let max_score = 20;

    let high_value = ["Article", "NewsArticle", "FAQPage", "HowTo", "Product"];
    let mid_value = ["WebPage", "Organization", "WebSite"];

    let has_high = types.iter().any(|t| high_value.contains(&t.as_str()));
    let has_mid = types.iter().any(|t| mid_value.contains(&t.as_str()));
    let has_microdata = exists(document, "[itemtype], [itemscope]");

    let (score, details) = if has_high {
        (20, format!("Found schema types: {}", types.join(", ")))
    } else if has_mid {
        (15, format!("Found schema types: {}", types.join(", ")))
    } else if !types.is_empty() {
        (10, format!("Found JSON-LD with types: {}", types.join(", ")))
    } else if has_microdata {
        (5, "Found microdata attributes but no JSON-LD".to_string())
    } else {
        (0, "No structured data found".to_string())
    };

    GeoFactor {
        score,
        max_score,
        label,
        details,
    }
}

pub fn content_structure(document: &Html) -> GeoFactor {
    let label = "Content Structure".to_string();
    let max_score = 15;

    let semantic_tags = ["article", "main", "section", "nav", "aside", "header", "footer"];
    let found: Vec<&str> = semantic_tags
        .iter()
        .copied()
        .filter(|tag| exists(document, tag))
        .collect();
    let has_h1 = exists(document, "h1");
    let has_h2 = exists(document, "h2");
    let paragraph_count = count(document, "p");

    let mut score = 0;
    let mut details = Vec::new();

    // Semantic tags: up to 6pts
    let semantic_score =
        ((found.len() as f64 / semantic_tags.len() as f64) * 6.0).round() as u32;
    score += semantic_score.min(6);
    details.push(format!(
        "Semantic tags: {}",
        if found.is_empty() {
            "none".to_string()
        } else {
            found.join(", ")
        }
    ));

    // Heading hierarchy: up to 5pts
    if has_h1 && has_h2 {
        score += 5;
        details.push("Good heading hierarchy (H1 + H2)".to_string());
    } else if has_h1 {
        score += 3;
        details.push("H1 present but no H2s".to_string());
    } else {
        details.push("Missing H1".to_string());
    }

    // Paragraph count: up to 4pts
    if paragraph_count > 3 {
        score += 4;
        details.push(format!("{} paragraphs", paragraph_count));
    } else if paragraph_count > 0 {
        score += 2;
        details.push(format!("Only {} paragraph(s)", paragraph_count));
    } else {
        details.push("No paragraphs found".to_string());
    }

    GeoFactor {
        score: score.min(15),
        max_score,
        label,
        details: details.join("; "),
    }
}

pub fn meta_tags(document: &Html) -> GeoFactor {
    let label = "Meta Tags".to_string();
    let max_score = 10;

    let title_present = Selector::parse("title")
        .ok()
        .and_then(|sel| {
            document
                .select(&sel)
                .next()
                .map(|el| !el.text().collect::<String>().trim().is_empty())
        })
        .unwrap_or(false);

    let checks = [
        ("title", title_present),
        ("description", exists(document, r#"meta[name="description"]"#)),
        ("og:title", exists(document, r#"meta[property="og:title"]"#)),
        (
            "og:description",
            exists(document, r#"meta[property="og:description"]"#),
        ),
        (
            "canonical",
            exists(document, r#"link[rel="canonical"]"#)
                || exists(document, r#"meta[name="canonical"]"#),
        ),
    ];

    let found: Vec<&str> = checks.iter().filter(|(_, f)| *f).map(|(n, _)| *n).collect();
    let missing: Vec<&str> = checks.iter().filter(|(_, f)| !*f).map(|(n, _)| *n).collect();
    let score = found.len() as u32 * 2;

    let mut parts = Vec::new();
    if !found.is_empty() {
        parts.push(format!("Found: {}", found.join(", ")));
    }
    if !missing.is_empty() {
        parts.push(format!("Missing: {}", missing.join(", ")));
    }

    GeoFactor {
        score,
        max_score,
        label,
        details: parts.join("; "),
    }
}

pub fn faq_content(document: &Html, types: &[String], body: &str) -> GeoFactor {
    let label = "FAQ Content".to_string();
    let max_score = 10;

    if types.iter().any(|t| t == "FAQPage") {
        return GeoFactor {
            score: 10,
            max_score,
            label,
            details: "FAQPage schema found".to_string(),
        };
    }

    let mut score = 0;
    let mut details = Vec::new();

    if exists(document, "dl dt") {
        score = 5;
        details.push("Definition list (dl/dt/dd) found".to_string());
    }

    if exists(
        document,
        r#"[class*="question"], [class*="answer"], [class*="faq"], [class*="accordion"]"#,
    ) {
        score = 5;
        details.push("Q&A class patterns found".to_string());
    }

    let question_headings = Selector::parse("h2, h3, h4")
        .map(|sel| {
            document
                .select(&sel)
                .filter(|el| el.text().collect::<String>().trim().ends_with('?'))
                .count()
        })
        .unwrap_or(0);
    if question_headings >= 2 {
        score = 5;
        details.push(format!("{} question-style headings found", question_headings));
    }

    if let Ok(re) = Regex::new(r"(?i)frequently asked questions|faq") {
        if re.is_match(body) {
            score = 5;
            details.push("FAQ section text found".to_string());
        }
    }

    if details.is_empty() {
        details.push("No FAQ patterns found".to_string());
    }

    GeoFactor {
        score,
        max_score,
        label,
        details: details.join("; "),
    }
}

pub fn author_eeat(document: &Html, items: &[Value]) -> GeoFactor {
    let label = "Author E-E-A-T".to_string();
    let max_score = 10;

    let mut signals: Vec<&str> = Vec::new();
    let push = |signals: &mut Vec<&str>, s: &'static str| {
        if !signals.contains(&s) {
            signals.push(s);
        }
    };

    if exists(document, r#"meta[name="author"]"#) {
        push(&mut signals, r#"meta[name="author"]"#);
    }
    if exists(document, r#"meta[property="article:author"]"#) {
        push(&mut signals, "article:author meta");
    }
    if exists(
        document,
        r#"[class*="author"], [class*="byline"], [class*="writer"], [id*="author"], [id*="byline"]"#,
    ) {
        push(&mut signals, "Author/byline element");
    }
    if exists(document, r#"a[rel="author"]"#) {
        push(&mut signals, r#"rel="author" link"#);
    }

    for item in items {
        if item.get("author").is_some() {
            push(&mut signals, "JSON-LD author property");
        }
        if item.get("@type").and_then(Value::as_str) == Some("Person") {
            push(&mut signals, "Person schema");
        }
        if let Some(graph) = item.get("@graph").and_then(Value::as_array) {
            for entry in graph {
                if entry.get("@type").and_then(Value::as_str) == Some("Person") {
                    push(&mut signals, "Person schema in @graph");
                }
                if entry.get("author").is_some() {
                    push(&mut signals, "JSON-LD author in @graph");
                }
            }
        }
    }

    match signals.len() {
        n if n >= 2 => GeoFactor {
            score: 10,
            max_score,
            label,
            details: format!("Multiple E-E-A-T signals: {}", signals.join(", ")),
        },
        1 => GeoFactor {
            score: 5,
            max_score,
            label,
            details: format!("Basic author info: {}", signals[0]),
        },
        _ => GeoFactor {
            score: 0,
            max_score,
            label,
            details: "No author information found".to_string(),
        },
    }
}

pub fn content_freshness(document: &Html, items: &[Value]) -> GeoFactor {
    let label = "Content Freshness".to_string();
    let max_score = 5;

    let mut details = Vec::new();
    let mut has_modified = false;
    let mut has_published = false;
    let mut has_any_date = false;

    let mut scan = |entry: &Value, details: &mut Vec<String>| {
        if let Some(v) = entry.get("dateModified") {
            has_modified = true;
            details.push(format!("dateModified: {}", value_text(v)));
        }
        if let Some(v) = entry.get("datePublished") {
            has_published = true;
            details.push(format!("datePublished: {}", value_text(v)));
        }
    };

    for item in items {
        scan(item, &mut details);
        if let Some(graph) = item.get("@graph").and_then(Value::as_array) {
            for entry in graph {
                scan(entry, &mut details);
            }
        }
    }

    let meta_date = first_attr(document, r#"meta[name="date"]"#, "content").or_else(|| {
        first_attr(document, r#"meta[property="article:published_time"]"#, "content")
    });
    if let Some(date) = meta_date {
        has_published = true;
        details.push(format!("Meta date: {}", date));
    }

    if let Some(modified) = first_attr(
        document,
        r#"meta[property="article:modified_time"]"#,
        "content",
    ) {
        has_modified = true;
        details.push(format!("Modified meta: {}", modified));
    }

    if exists(document, "time[datetime]") {
        has_any_date = true;
        details.push("<time> element found".to_string());
    }

    let (score, details) = if has_modified {
        (5, details.join("; "))
    } else if has_published {
        (3, details.join("; "))
    } else if has_any_date {
        (1, details.join("; "))
    } else {
        (0, "No date information found".to_string())
    };

    GeoFactor {
        score,
        max_score,
        label,
        details,
    }
}

pub fn internal_linking(document: &Html, page_url: &Url, types: &[String]) -> GeoFactor {
    let label = "Internal Linking".to_string();
    let max_score = 5;

    let origin = page_url.origin().ascii_serialization();

    let mut internal_count = 0;
    if let Ok(selector) = Selector::parse("a[href]") {
        for anchor in document.select(&selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            // Relative links are internal
            if !href.starts_with("http") {
                if !href.starts_with("mailto:")
                    && !href.starts_with("tel:")
                    && !href.starts_with("javascript:")
                {
                    internal_count += 1;
                }
                continue;
            }
            if let Ok(parsed) = Url::parse(href) {
                if parsed.origin().ascii_serialization() == origin {
                    internal_count += 1;
                }
            }
        }
    }

    let aria_breadcrumb = Selector::parse("nav[aria-label]")
        .map(|sel| {
            document.select(&sel).any(|el| {
                el.value()
                    .attr("aria-label")
                    .map(|v| v.to_lowercase().contains("breadcrumb"))
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false);
    let has_breadcrumbs = aria_breadcrumb
        || exists(document, r#"[class*="breadcrumb"]"#)
        || types.iter().any(|t| t == "BreadcrumbList");

    let details = format!(
        "{} internal links{}",
        internal_count,
        if has_breadcrumbs {
            ", breadcrumbs found"
        } else {
            ", no breadcrumbs"
        }
    );

    let (score, details) = if internal_count > 10 && has_breadcrumbs {
        (5, details)
    } else if internal_count > 5 || has_breadcrumbs {
        (3, details)
    } else if internal_count > 0 {
        (1, details)
    } else {
        (0, "No internal links found".to_string())
    };

    GeoFactor {
        score,
        max_score,
        label,
        details,
    }
}

pub fn image_alt_text(document: &Html) -> GeoFactor {
    let label = "Image Alt Text".to_string();
    let max_score = 5;

    let Ok(selector) = Selector::parse("img") else {
        return GeoFactor {
            score: 0,
            max_score,
            label,
            details: "Error checking image alt text".to_string(),
        };
    };

    let images: Vec<_> = document.select(&selector).collect();
    let total = images.len();

    if total == 0 {
        return GeoFactor {
            score: 5,
            max_score,
            label,
            details: "No images on page (not penalized)".to_string(),
        };
    }

    let with_alt = images
        .iter()
        .filter(|img| {
            img.value()
                .attr("alt")
                .map(|alt| !alt.trim().is_empty())
                .unwrap_or(false)
        })
        .count();

    let score = ((with_alt as f64 / total as f64) * 5.0).round() as u32;

    GeoFactor {
        score,
        max_score,
        label,
        details: format!("{}/{} images have alt text", with_alt, total),
    }
}

pub fn ai_crawlability(document: &Html, body: &str) -> GeoFactor {
    let label = "AI Crawlability".to_string();
    let max_score = 10;

    let mut issues = Vec::new();

    let robots = first_attr(document, r#"meta[name="robots"]"#, "content")
        .unwrap_or_default()
        .to_lowercase();
    if robots.contains("noindex") {
        issues.push("noindex found".to_string());
    }
    if robots.contains("noai") {
        issues.push("noai directive found".to_string());
    }
    if robots.contains("noimageai") {
        issues.push("noimageai directive found".to_string());
    }

    for bot in ["GPTBot", "ChatGPT-User", "Claude-Web", "PerplexityBot"] {
        let directive = first_attr(document, &format!(r#"meta[name="{}"]"#, bot), "content")
            .unwrap_or_default()
            .to_lowercase();
        if directive.contains("noindex") || directive.contains("none") {
            issues.push(format!("{} blocked", bot));
        }
    }

    let word_count = body.split_whitespace().count();
    if word_count <= 200 {
        issues.push(format!("Low word count ({} words)", word_count));
    }

    let blocking = issues
        .iter()
        .any(|i| i.contains("noindex") || i.contains("blocked") || i.contains("noai"));

    let (score, details) = if blocking {
        (0, issues.join("; "))
    } else if !issues.is_empty() {
        (5, issues.join("; "))
    } else {
        (
            10,
            format!("No blocking signals, {} words of content", word_count),
        )
    };

    GeoFactor {
        score,
        max_score,
        label,
        details,
    }
}

pub fn answer_forward_writing(document: &Html, body: &str) -> GeoFactor {
    let label = "Answer-Forward Writing".to_string();
    let max_score = 10;

    let mut score = 0;
    let mut signals = Vec::new();

    let first_paragraph = Selector::parse("p")
        .ok()
        .and_then(|sel| {
            document
                .select(&sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
        })
        .unwrap_or_default();
    if first_paragraph.chars().count() > 80 {
        score += 3;
        signals.push("Substantive opening paragraph".to_string());
    }

    if exists(document, "dl, aside, blockquote") {
        score += 2;
        signals.push("Definition lists or callout boxes".to_string());
    }

    if count(document, "ol li, ul li") >= 3 {
        score += 2;
        signals.push("Structured lists found".to_string());
    }

    let word_count = body.split_whitespace().count();
    let heading_count = count(document, "h1, h2, h3, h4, h5, h6");
    if heading_count > 0 && word_count as f64 / heading_count as f64 > 100.0 {
        score += 1;
        signals.push("Dense informational content".to_string());
    }

    let definitional = Regex::new(r"(?i)\b(is|are|means|refers to|defined as)\b")
        .map(|re| re.find_iter(body).count())
        .unwrap_or(0);
    if definitional >= 5 {
        score += 2;
        signals.push(format!("{} definitional phrases", definitional));
    } else if definitional >= 2 {
        score += 1;
        signals.push(format!("{} definitional phrases", definitional));
    }

    GeoFactor {
        score: score.min(10),
        max_score,
        label,
        details: if signals.is_empty() {
            "No answer-forward signals found".to_string()
        } else {
            signals.join("; ")
        },
    }
}
