use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{anchors, element_text, ListingParser, Variant};
use crate::job::{EmploymentType, RawListing};
use crate::utils::clean_text;

static CLIMEWORKS_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(Variant::Climeworks.link_selector()).unwrap());
static CCP_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(Variant::Ccp.link_selector()).unwrap());
static UMSOKN_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(Variant::Umsokn.link_selector()).unwrap());
static TVINNA_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(Variant::Tvinna.link_selector()).unwrap());
static PAGE_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="page"]"#).unwrap());
static ALFRED_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(Variant::Alfred.link_selector()).unwrap());
static EMPLOYER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[class*="company"], [class*="employer"]"#).unwrap());

static UMSOKN_HREF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/[a-z]{2}/\d+$").unwrap());
static UMSOKN_DEADLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bApplication deadline\b|\bUmsóknarfrestur\b").unwrap());
static UMSOKN_PART_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bPart time\b|\bHlutastarf\b").unwrap());
static UMSOKN_CONTRACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bContract\b|\bVerkefni\b").unwrap());
static UMSOKN_INTERN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bIntern\b|\bStarfsnám\b").unwrap());

static CARD_COMPANY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)[|·–-]\s+([^|·–\n]+?)(?:\s*[|·–]|$)").unwrap());
static CARD_PART_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(hlutastarf|part[- ]?time)\b").unwrap());
static CARD_CONTRACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(freelance|verktaki)\b").unwrap());

/// Anchors matching a site's posting path, deduped on (lowercased title, url).
fn scan_postings(html: &str, base: &Url, selector: &Selector) -> Vec<RawListing> {
    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for a in anchors(&doc, selector, base) {
        if a.text.chars().count() < 3 {
            continue;
        }
        if seen.insert((a.text.to_lowercase(), a.url.clone())) {
            out.push(RawListing::new(a.text, a.url));
        }
    }
    out
}

/// Nearest enclosing listing card.
fn card<'a>(a: ElementRef<'a>, tags: &[&str]) -> Option<ElementRef<'a>> {
    a.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| tags.contains(&e.value().name()))
}

/// `climeworks.com/jobs`: links under `/jobs/`.
pub struct Climeworks;

impl ListingParser for Climeworks {
    fn extract(&self, html: &str, base: &Url) -> Vec<RawListing> {
        scan_postings(html, base, &CLIMEWORKS_SEL)
    }
}

/// `careers.ccpgames.com`: links under `/en/postings/`.
pub struct Ccp;

impl ListingParser for Ccp {
    fn extract(&self, html: &str, base: &Url) -> Vec<RawListing> {
        scan_postings(html, base, &CCP_SEL)
    }
}

/// `*.umsokn.is` applicant tracking: `/<lang>/<id>` links whose text also
/// carries the deadline and the employment type.
pub struct Umsokn;

impl ListingParser for Umsokn {
    fn extract(&self, html: &str, base: &Url) -> Vec<RawListing> {
        let doc = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for a in anchors(&doc, &UMSOKN_SEL, base) {
            if a.text.is_empty() || !UMSOKN_HREF_RE.is_match(&a.href) {
                continue;
            }
            let title = UMSOKN_DEADLINE_RE
                .split(&a.text)
                .next()
                .unwrap_or("")
                .trim()
                .to_string();
            if title.chars().count() < 3 {
                continue;
            }

            let mut employment = EmploymentType::FullTime;
            if UMSOKN_PART_RE.is_match(&a.text) {
                employment = EmploymentType::PartTime;
            }
            if UMSOKN_CONTRACT_RE.is_match(&a.text) {
                employment = EmploymentType::Contract;
            }
            if UMSOKN_INTERN_RE.is_match(&a.text) {
                employment = EmploymentType::Internship;
            }

            if !seen.insert((title.to_lowercase(), a.url.clone())) {
                continue;
            }
            out.push(RawListing {
                employment_type: Some(employment),
                ..RawListing::new(title, a.url)
            });
        }
        out
    }
}

/// `tvinna.is` job board: paginated cards naming the employer.
pub struct Tvinna;

impl ListingParser for Tvinna {
    fn extract(&self, html: &str, base: &Url) -> Vec<RawListing> {
        let doc = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for a in anchors(&doc, &TVINNA_SEL, base) {
            if a.href == "/jobs/" || a.href.to_lowercase().contains("page") {
                continue;
            }
            if a.text.chars().count() < 3 || !seen.insert(a.url.clone()) {
                continue;
            }

            let mut listing = RawListing::new(a.text.clone(), a.url.clone());
            if let Some(c) = card(a.element, &["article", "div", "li"]) {
                let text = element_text(c);
                listing.company = CARD_COMPANY_RE
                    .captures(&text)
                    .map(|caps| clean_text(&caps[1]))
                    .filter(|name| !name.is_empty() && *name != a.text);
                listing.employment_type = Some(if CARD_PART_RE.is_match(&text) {
                    EmploymentType::PartTime
                } else if CARD_CONTRACT_RE.is_match(&text) {
                    EmploymentType::Contract
                } else {
                    EmploymentType::FullTime
                });
            }
            out.push(listing);
        }
        out
    }

    fn next_page(&self, html: &str, base: &Url) -> Option<String> {
        let doc = Html::parse_document(html);
        doc.select(&PAGE_LINK_SEL).find_map(|a| {
            let text = element_text(a).to_lowercase();
            if text.contains("next") || text.contains('»') || text.contains("næsta") {
                base.join(a.value().attr("href")?).ok().map(|u| u.to_string())
            } else {
                None
            }
        })
    }
}

/// `alfred.is` job board: `/starf/` links inside cards with an employer element.
pub struct Alfred;

impl ListingParser for Alfred {
    fn extract(&self, html: &str, base: &Url) -> Vec<RawListing> {
        let doc = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for a in anchors(&doc, &ALFRED_SEL, base) {
            if !seen.insert(a.url.clone()) || a.text.chars().count() < 3 {
                continue;
            }
            let company = card(a.element, &["article", "div", "li", "section"])
                .and_then(|c| c.select(&EMPLOYER_SEL).next())
                .map(element_text)
                .filter(|name| !name.is_empty());
            out.push(RawListing {
                company,
                ..RawListing::new(a.text, a.url)
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(url: &str) -> Url {
        Url::parse(url).unwrap()
    }

    #[test]
    fn climeworks_jobs_only() {
        let html = std::fs::read_to_string("tests/fixtures/climeworks.html").unwrap();
        let jobs = Climeworks.extract(&html, &base("https://climeworks.com/jobs"));
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].title, "Process Engineer");
        assert_eq!(jobs[0].url, "https://climeworks.com/jobs/process-engineer");
        assert!(jobs.iter().all(|j| j.url.contains("/jobs/")));
    }

    #[test]
    fn ccp_postings() {
        let html = r#"
            <a href="/en/postings/123">Senior Gameplay Programmer</a>
            <a href="/en/postings/123">Senior Gameplay Programmer</a>
            <a href="/en/teams">Teams</a>
        "#;
        let jobs = Ccp.extract(html, &base("https://careers.ccpgames.com/"));
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].url, "https://careers.ccpgames.com/en/postings/123");
    }

    #[test]
    fn umsokn_splits_deadline_and_reads_type() {
        let html = std::fs::read_to_string("tests/fixtures/umsokn.html").unwrap();
        let jobs = Umsokn.extract(&html, &base("https://syndis.umsokn.is/en"));
        assert_eq!(jobs.len(), 3);

        assert_eq!(jobs[0].title, "Penetration Tester");
        assert_eq!(jobs[0].employment_type, Some(EmploymentType::FullTime));
        assert_eq!(jobs[0].url, "https://syndis.umsokn.is/en/101");

        assert_eq!(jobs[1].title, "Security Analyst");
        assert_eq!(jobs[1].employment_type, Some(EmploymentType::PartTime));

        assert_eq!(jobs[2].title, "Sumarstarf í öryggisteymi");
        assert_eq!(jobs[2].employment_type, Some(EmploymentType::Internship));
    }

    #[test]
    fn tvinna_cards_and_pagination() {
        let html = std::fs::read_to_string("tests/fixtures/tvinna.html").unwrap();
        let b = base("https://www.tvinna.is/jobs/");
        let jobs = Tvinna.extract(&html, &b);
        assert_eq!(jobs.len(), 2);

        assert_eq!(jobs[0].title, "Frontend Developer");
        assert_eq!(jobs[0].company.as_deref(), Some("Controlant"));
        assert_eq!(jobs[0].employment_type, Some(EmploymentType::FullTime));

        assert_eq!(jobs[1].title, "Þjónustufulltrúi");
        assert_eq!(jobs[1].employment_type, Some(EmploymentType::PartTime));

        assert_eq!(
            Tvinna.next_page(&html, &b).as_deref(),
            Some("https://www.tvinna.is/jobs/page/2/")
        );
    }

    #[test]
    fn hyphenated_titles_keep_the_card_employer() {
        let html = r#"<article><a href="/jobs/fullstack-controlant/">Full-stack Developer</a> – Controlant · Reykjavík</article>"#;
        let jobs = Tvinna.extract(html, &base("https://www.tvinna.is/jobs/"));
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].title, "Full-stack Developer");
        assert_eq!(jobs[0].company.as_deref(), Some("Controlant"));
    }

    #[test]
    fn alfred_reads_employer_from_card() {
        let html = r#"
            <ul>
              <li><a href="/starf/777">Backend Developer</a><span class="company-name">Lucinity</span></li>
              <li><a href="/starf/778">UX Designer</a></li>
            </ul>
        "#;
        let jobs = Alfred.extract(html, &base("https://alfred.is/storf"));
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].company.as_deref(), Some("Lucinity"));
        assert_eq!(jobs[0].url, "https://alfred.is/starf/777");
        assert_eq!(jobs[1].company, None);
    }

    #[test]
    fn empty_pages_yield_empty_lists() {
        let b = base("https://example.is/");
        assert!(Climeworks.extract("", &b).is_empty());
        assert!(Ccp.extract("<p>none</p>", &b).is_empty());
        assert!(Umsokn.extract("<p>none</p>", &b).is_empty());
        assert!(Tvinna.next_page("<p>none</p>", &b).is_none());
    }
}
