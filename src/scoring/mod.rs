//! Deterministic GEO content scorer
//!
//! Scores a single page's HTML against a ten-factor, 100-point rubric
//! measuring how ready the content is for generative engines. Scoring is
//! pure: it never touches the network, and the same HTML plus URL always
//! produces the same result.

mod factors;
mod jsonld;

use crate::model::ScoreBreakdown;
use scraper::Html;
use url::Url;

/// A fully scored page
#[derive(Debug, Clone)]
pub struct PageScore {
    /// Sum of the ten factor scores, 0 to 100
    pub total_score: u32,

    /// Per-factor scores with evidence
    pub breakdown: ScoreBreakdown,
}

/// Scores one page against the ten-factor rubric
///
/// # Arguments
///
/// * `html` - The raw page HTML
/// * `page_url` - The URL the page was fetched from, used for
///   same-origin link counting
pub fn score_page(html: &str, page_url: &Url) -> PageScore {
    let document = Html::parse_document(html);
    let jsonld_items = jsonld::parse_json_ld(&document);
    let schema_types = jsonld::collect_schema_types(&jsonld_items);
    let body = jsonld::body_text(&document);

    let breakdown = ScoreBreakdown {
        schema_markup: factors::schema_markup(&document, &schema_types),
        content_structure: factors::content_structure(&document),
        meta_tags: factors::meta_tags(&document),
        faq_content: factors::faq_content(&document, &schema_types, &body),
        author_eeat: factors::author_eeat(&document, &jsonld_items),
        content_freshness: factors::content_freshness(&document, &jsonld_items),
        internal_linking: factors::internal_linking(&document, page_url, &schema_types),
        image_alt_text: factors::image_alt_text(&document),
        ai_crawlability: factors::ai_crawlability(&document, &body),
        answer_forward_writing: factors::answer_forward_writing(&document, &body),
    };

    PageScore {
        total_score: breakdown.total(),
        breakdown,
    }
}
