use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{element_text, Variant};
use crate::directory::Directory;
use crate::job::{EmploymentType, JobDetail, RemoteOption};
use crate::utils::clean_text;

static H1_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static EMPLOYER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[class*="company"], [class*="employer"]"#).unwrap());
static CONTAINER_SELS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ["main", "article", "section", "body"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});

const HIDDEN_TAGS: &[&str] = &["script", "style", "nav", "footer", "header", "noscript"];
const SOCIAL_HINTS: &[&str] = &["linkedin", "facebook", "twitter", "instagram", "mailto:"];
const CITIES: &[(&[&str], &str)] = &[
    (&["reykjavík", "reykjavik"], "Reykjavik, Iceland"),
    (&["akureyri"], "Akureyri, Iceland"),
    (&["ísafjörður", "isafjordur"], "Ísafjörður, Iceland"),
];

/// Value following `label` in document order: the first element within
/// `max_hops` steps whose text is non-empty and isn't the label itself.
/// Empty when the label is absent or the budget runs out.
pub fn find_value(doc: &Html, label: &str, max_hops: usize) -> String {
    find_value_traced(doc, label, max_hops).0
}

/// `find_value` plus the number of element steps taken.
fn find_value_traced(doc: &Html, label: &str, max_hops: usize) -> (String, usize) {
    let wanted = label.trim().to_lowercase();
    let nodes: Vec<_> = doc.tree.root().descendants().collect();

    let Some(pos) = nodes.iter().position(|n| {
        n.value()
            .as_text()
            .is_some_and(|t| t.trim().to_lowercase() == wanted)
    }) else {
        return (String::new(), 0);
    };

    let start = nodes[pos]
        .parent()
        .and_then(|p| nodes[..pos].iter().rposition(|n| n.id() == p.id()))
        .unwrap_or(pos);

    let mut hops = 0;
    for node in &nodes[start + 1..] {
        let Some(el) = ElementRef::wrap(*node) else {
            continue;
        };
        if hops == max_hops {
            break;
        }
        hops += 1;
        let text = element_text(el);
        if !text.is_empty() && text.to_lowercase() != wanted {
            return (text, hops);
        }
    }
    (String::new(), hops)
}

/// Visible text of the main content area, minus scripts and page chrome.
pub fn description_snippet(doc: &Html) -> String {
    let Some(container) = CONTAINER_SELS.iter().find_map(|s| doc.select(s).next()) else {
        return String::new();
    };

    let mut parts = Vec::new();
    for node in container.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .take_while(|a| a.id() != container.id())
            .filter_map(|a| a.value().as_element())
            .any(|e| HIDDEN_TAGS.contains(&e.name()));
        if !hidden {
            parts.push(&**text);
        }
    }
    clean_text(&parts.join(" "))
}

pub fn workplace_from(value: &str) -> Option<RemoteOption> {
    let v = value.to_lowercase();
    if v.contains("remote") {
        Some(RemoteOption::Remote)
    } else if v.contains("hybrid") {
        Some(RemoteOption::Hybrid)
    } else if v.contains("onsite") || v.contains("on site") || v.contains("on-site") {
        Some(RemoteOption::Onsite)
    } else {
        None
    }
}

pub fn employment_from(value: &str) -> Option<EmploymentType> {
    let v = value.trim().to_lowercase();
    if v.is_empty() {
        None
    } else if v.contains("part") {
        Some(EmploymentType::PartTime)
    } else if v.contains("contract") {
        Some(EmploymentType::Contract)
    } else {
        Some(EmploymentType::FullTime)
    }
}

fn detect_city(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    CITIES
        .iter()
        .find(|(names, _)| names.iter().any(|n| lower.contains(n)))
        .map(|(_, city)| city.to_string())
}

/// Employer link on a job-board posting. Candidates are external http(s)
/// links off the board's host, not social or mail, with 2–49 characters of
/// text. Directory matches are preferred; among the preferred candidates the
/// one closest to the page's first `h1` in document order wins, earlier
/// position breaking ties. Without an `h1` the first candidate wins.
pub fn company_from_links(doc: &Html, board_host: &str, directory: &Directory) -> Option<String> {
    let board_host = board_host.trim_start_matches("www.").to_lowercase();
    let mut title_at = None;
    let mut candidates: Vec<(usize, String)> = Vec::new();

    for (idx, node) in doc.tree.root().descendants().enumerate() {
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        match el.value().name() {
            "h1" if title_at.is_none() => title_at = Some(idx),
            "a" => {
                let Some(href) = el.value().attr("href") else {
                    continue;
                };
                let lower = href.to_lowercase();
                if SOCIAL_HINTS.iter().any(|s| lower.contains(s)) {
                    continue;
                }
                let Ok(url) = Url::parse(href) else {
                    continue;
                };
                let host = url.host_str().unwrap_or("").to_lowercase();
                let on_board = host == board_host || host.ends_with(&format!(".{}", board_host));
                if !matches!(url.scheme(), "http" | "https") || on_board {
                    continue;
                }
                let text = element_text(el);
                let len = text.chars().count();
                if (2..50).contains(&len) {
                    candidates.push((idx, text));
                }
            }
            _ => {}
        }
    }

    let known: Vec<&(usize, String)> = candidates
        .iter()
        .filter(|(_, name)| directory.contains_company(name))
        .collect();
    let pool: Vec<&(usize, String)> = if known.is_empty() {
        candidates.iter().collect()
    } else {
        known
    };

    let chosen = match title_at {
        Some(t) => pool.into_iter().min_by_key(|(idx, _)| (idx.abs_diff(t), *idx)),
        None => pool.into_iter().next(),
    };
    chosen.map(|(_, name)| name.clone())
}

/// Everything the crawler reads off one posting page.
pub fn parse_detail(
    variant: Variant,
    html: &str,
    page_url: &str,
    directory: &Directory,
    max_hops: usize,
) -> JobDetail {
    let doc = Html::parse_document(html);
    let mut detail = JobDetail {
        description: description_snippet(&doc),
        ..JobDetail::default()
    };

    match variant {
        Variant::Ccp => {
            let non_empty = |s: String| Some(s).filter(|s| !s.is_empty());
            detail.department = non_empty(find_value(&doc, "Department", max_hops));
            detail.location = non_empty(find_value(&doc, "Location", max_hops));
            detail.employment_type = employment_from(&find_value(&doc, "Employment Type", max_hops));
            detail.workplace = workplace_from(&find_value(&doc, "Workplace type", max_hops));
        }
        Variant::Tvinna | Variant::Alfred => {
            detail.title = doc
                .select(&H1_SEL)
                .next()
                .map(element_text)
                .filter(|t| t.chars().count() > 3);

            let host = Url::parse(page_url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_string))
                .unwrap_or_default();
            let from_markup = if variant == Variant::Alfred {
                doc.select(&EMPLOYER_SEL).next().map(element_text)
            } else {
                None
            };
            detail.company = from_markup
                .filter(|c| !c.is_empty())
                .or_else(|| company_from_links(&doc, &host, directory));

            let page_text = clean_text(&doc.root_element().text().collect::<Vec<_>>().join(" "));
            detail.location = detect_city(&page_text);
        }
        _ => {}
    }

    detail
}
