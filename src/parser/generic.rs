use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use super::{anchors, ListingParser, Variant};
use crate::job::RawListing;

static LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(Variant::Generic.link_selector()).unwrap());
static JOBISH_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(careers|jobs|positions|vacanc|job)").unwrap());
static APPLY_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(apply|role|position|opening|read more)\b").unwrap());
static EXCLUDED_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(privacy|cookie|terms|facebook\.com|twitter\.com|instagram\.com)").unwrap()
});
static NAV_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(careers|jobs|open positions|open roles)$").unwrap());

/// Keyword scan over every link on a careers page.
pub struct Generic;

impl ListingParser for Generic {
    fn extract(&self, html: &str, base: &Url) -> Vec<RawListing> {
        let doc = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for a in anchors(&doc, &LINK_SEL, base) {
            if a.text.chars().count() < 3 || EXCLUDED_URL_RE.is_match(&a.url) {
                continue;
            }
            if !JOBISH_URL_RE.is_match(&a.url) && !APPLY_TEXT_RE.is_match(&a.text) {
                continue;
            }
            if !seen.insert((a.text.to_lowercase(), a.url.clone())) {
                continue;
            }
            out.push(RawListing::new(a.text, a.url));
        }

        // Section headers linking to the careers page itself aren't postings.
        out.retain(|j| !NAV_LABEL_RE.is_match(&j.title));
        out
    }
}
