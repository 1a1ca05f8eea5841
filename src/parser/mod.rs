pub mod detail;
pub mod generic;
pub mod sites;

use std::fmt;
use std::str::FromStr;

use scraper::{ElementRef, Html, Selector};
use tracing::warn;
use url::Url;

use crate::job::{RawListing, RemoteOption};
use crate::source::Source;
use crate::utils::clean_text;

/// Listing layouts the crawler knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Generic,
    Climeworks,
    Ccp,
    Umsokn,
    Tvinna,
    Alfred,
}

/// How a source asks for its parser: by URL detection or by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserHint {
    Auto,
    Explicit(Variant),
}

/// URL substrings for auto-detection. The longest matching pattern wins.
const AUTO_PATTERNS: &[(&str, Variant)] = &[
    ("climeworks.com/jobs", Variant::Climeworks),
    ("careers.ccpgames.com", Variant::Ccp),
    ("umsokn.is", Variant::Umsokn),
    ("tvinna.is", Variant::Tvinna),
    ("tvinna.is/jobs", Variant::Tvinna),
    ("alfred.is", Variant::Alfred),
];

impl Variant {
    pub fn tag(self) -> &'static str {
        match self {
            Variant::Generic => "generic",
            Variant::Climeworks => "climeworks",
            Variant::Ccp => "ccp",
            Variant::Umsokn => "umsokn",
            Variant::Tvinna => "tvinna",
            Variant::Alfred => "alfred",
        }
    }

    fn parser(self) -> &'static dyn ListingParser {
        match self {
            Variant::Generic => &generic::Generic,
            Variant::Climeworks => &sites::Climeworks,
            Variant::Ccp => &sites::Ccp,
            Variant::Umsokn => &sites::Umsokn,
            Variant::Tvinna => &sites::Tvinna,
            Variant::Alfred => &sites::Alfred,
        }
    }

    /// Anchors that can lead to a posting on this layout's listing page.
    pub fn link_selector(self) -> &'static str {
        match self {
            Variant::Climeworks | Variant::Tvinna => r#"a[href*="/jobs/"]"#,
            Variant::Ccp => r#"a[href*="/en/postings/"]"#,
            Variant::Alfred => r#"a[href*="/starf/"]"#,
            Variant::Generic | Variant::Umsokn => "a[href]",
        }
    }

    /// ATS listings already carry everything the posting page would.
    pub fn follows_details(self) -> bool {
        !matches!(self, Variant::Umsokn)
    }

    /// Remote option used when neither the page nor the rules say otherwise.
    pub fn default_remote(self) -> Option<RemoteOption> {
        match self {
            Variant::Climeworks => Some(RemoteOption::Hybrid),
            _ => None,
        }
    }

    /// Job boards listing many employers; each posting names its own company.
    pub fn is_aggregator(self) -> bool {
        matches!(self, Variant::Tvinna | Variant::Alfred)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "generic" => Ok(Variant::Generic),
            "climeworks" => Ok(Variant::Climeworks),
            "ccp" => Ok(Variant::Ccp),
            "umsokn" => Ok(Variant::Umsokn),
            "tvinna" => Ok(Variant::Tvinna),
            "alfred" => Ok(Variant::Alfred),
            other => Err(format!("unknown parser '{}'", other)),
        }
    }
}

impl FromStr for ParserHint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") || s.trim().is_empty() {
            Ok(ParserHint::Auto)
        } else {
            s.parse().map(ParserHint::Explicit)
        }
    }
}

/// One listing-page layout.
pub trait ListingParser {
    fn extract(&self, html: &str, base: &Url) -> Vec<RawListing>;

    /// Link to the next listing page, for paginated boards.
    fn next_page(&self, _html: &str, _base: &Url) -> Option<String> {
        None
    }
}

pub fn resolve_variant(url: &str, hint: ParserHint) -> Variant {
    match hint {
        ParserHint::Explicit(v) => v,
        ParserHint::Auto => {
            let u = url.to_lowercase();
            AUTO_PATTERNS
                .iter()
                .filter(|(pat, _)| u.contains(pat))
                .max_by_key(|(pat, _)| pat.len())
                .map(|(_, v)| *v)
                .unwrap_or(Variant::Generic)
        }
    }
}

/// Rewrite listing pages known to be thin pointers to an external ATS.
/// Pure: runs before any fetch.
pub fn rewrite_source(mut source: Source) -> Source {
    if source.listing_url.to_lowercase().contains("syndis.com/careers") {
        source.listing_url = "https://syndis.umsokn.is/en".to_string();
        source.hint = ParserHint::Explicit(Variant::Umsokn);
        if source.name.is_empty() {
            source.name = "Syndis".to_string();
        }
    }
    source
}

/// Run the variant's extractor. A page with no postings yields an empty list.
pub fn extract(variant: Variant, html: &str, base_url: &str) -> Vec<RawListing> {
    match Url::parse(base_url) {
        Ok(base) => variant.parser().extract(html, &base),
        Err(e) => {
            warn!(base_url, error = %e, "Unparseable listing URL");
            Vec::new()
        }
    }
}

pub fn next_page(variant: Variant, html: &str, base_url: &str) -> Option<String> {
    let base = Url::parse(base_url).ok()?;
    variant.parser().next_page(html, &base)
}

/// Anchor with its visible text and href resolved against the page URL.
#[derive(Debug, Clone)]
pub struct Anchor<'a> {
    pub element: ElementRef<'a>,
    pub href: String,
    pub text: String,
    pub url: String,
}

/// All anchors matching `selector` with an http(s) target.
pub fn anchors<'a>(doc: &'a Html, selector: &Selector, base: &Url) -> Vec<Anchor<'a>> {
    doc.select(selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?.trim().to_string();
            if href.is_empty() {
                return None;
            }
            let url = base.join(&href).ok()?;
            if !matches!(url.scheme(), "http" | "https") {
                return None;
            }
            Some(Anchor {
                element,
                text: element_text(element),
                href,
                url: url.to_string(),
            })
        })
        .collect()
}

pub fn element_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}
