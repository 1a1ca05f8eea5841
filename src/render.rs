use std::collections::HashSet;

use tracing::{debug, info};

/// A live, script-rendered page driven by an external browser engine.
pub trait RenderedPage {
    /// Every anchor matching `selector` as `(href, visible text)`.
    fn anchors(&self, selector: &str) -> Vec<(String, String)>;

    /// Trigger loading of further content.
    fn scroll(&mut self);
}

/// Scroll until a round adds no new URLs or `max_scrolls` rounds have run.
/// Links come back in first-seen order, one per href.
pub fn collect_rendered_links<P: RenderedPage + ?Sized>(
    page: &mut P,
    selector: &str,
    max_scrolls: usize,
) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for round in 0..max_scrolls.max(1) {
        let before = links.len();
        for (href, text) in page.anchors(selector) {
            if !href.is_empty() && seen.insert(href.clone()) {
                links.push((href, text));
            }
        }
        debug!(round = round + 1, found = links.len(), "Rendered links");
        if links.len() == before {
            break;
        }
        page.scroll();
    }

    info!(selector, links = links.len(), "Collected rendered links");
    links
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Infinite-scroll board that reveals one batch of links per scroll.
    pub(crate) struct FakeBoard {
        pub batches: Vec<Vec<(String, String)>>,
        pub revealed: usize,
        pub scrolls: usize,
    }

    impl FakeBoard {
        pub(crate) fn new(batches: &[&[(&str, &str)]]) -> Self {
            FakeBoard {
                batches: batches
                    .iter()
                    .map(|b| b.iter().map(|(h, t)| (h.to_string(), t.to_string())).collect())
                    .collect(),
                revealed: 1,
                scrolls: 0,
            }
        }
    }

    impl RenderedPage for FakeBoard {
        fn anchors(&self, _selector: &str) -> Vec<(String, String)> {
            self.batches[..self.revealed.min(self.batches.len())].concat()
        }

        fn scroll(&mut self) {
            self.scrolls += 1;
            self.revealed += 1;
        }
    }

    #[test]
    fn stops_once_scrolling_adds_nothing() {
        let mut page = FakeBoard::new(&[
            &[("/starf/1", "Backend Developer"), ("/starf/2", "Designer")],
            &[("/starf/2", "Designer"), ("/starf/3", "Accountant")],
        ]);
        let links = collect_rendered_links(&mut page, r#"a[href*="/starf/"]"#, 20);
        let hrefs: Vec<&str> = links.iter().map(|(h, _)| h.as_str()).collect();
        assert_eq!(hrefs, ["/starf/1", "/starf/2", "/starf/3"]);
        // Two productive rounds, then one that found nothing new.
        assert_eq!(page.scrolls, 2);
    }

    #[test]
    fn scroll_cap_is_respected() {
        let batches: Vec<Vec<(String, String)>> = (0..50)
            .map(|i| vec![(format!("/starf/{}", i), format!("Job {}", i))])
            .collect();
        let mut page = FakeBoard { batches, revealed: 1, scrolls: 0 };
        let links = collect_rendered_links(&mut page, "a", 5);
        assert_eq!(links.len(), 5);
        assert_eq!(page.scrolls, 5);
    }

    #[test]
    fn empty_page_yields_nothing() {
        let mut page = FakeBoard::new(&[&[]]);
        assert!(collect_rendered_links(&mut page, "a", 10).is_empty());
        assert_eq!(page.scrolls, 0);
    }
}
