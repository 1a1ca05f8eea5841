use std::collections::HashSet;

use tracing::{debug, info, warn};
use url::Url;

use crate::config::Settings;
use crate::directory::Directory;
use crate::fetch::Fetch;
use crate::job::{Job, RawListing};
use crate::normalize;
use crate::parser::{self, detail::parse_detail, resolve_variant, rewrite_source, Variant};
use crate::render::{collect_rendered_links, RenderedPage};
use crate::source::Source;
use crate::utils::clean_text;

/// Sequential per-source pipeline: listing page, optional pagination,
/// one detail page per stub, then normalization.
pub struct Crawler<'a, F> {
    fetcher: F,
    settings: &'a Settings,
    directory: &'a Directory,
    follow_details: bool,
}

impl<'a, F: Fetch> Crawler<'a, F> {
    pub fn new(fetcher: F, settings: &'a Settings, directory: &'a Directory) -> Self {
        Crawler {
            fetcher,
            settings,
            directory,
            follow_details: true,
        }
    }

    pub fn with_details(mut self, follow: bool) -> Self {
        self.follow_details = follow;
        self
    }

    /// Fetch, then wait out the cooldown whatever the outcome.
    async fn get(&self, url: &str) -> Option<String> {
        let page = self.fetcher.fetch(url).await;
        tokio::time::sleep(self.settings.cooldown()).await;
        page
    }

    pub async fn crawl_source(&self, source: &Source) -> Vec<Job> {
        let source = rewrite_source(source.clone());
        let variant = resolve_variant(&source.listing_url, source.hint);
        info!(source = %source.name, %variant, url = %source.listing_url, "Crawling");

        let Some(mut html) = self.get(&source.listing_url).await else {
            return Vec::new();
        };
        let mut page_url = source.listing_url.clone();
        let mut listings = parser::extract(variant, &html, &page_url);

        let mut pages = 1;
        while pages < self.settings.max_pages {
            let Some(next) = parser::next_page(variant, &html, &page_url) else {
                break;
            };
            if next == page_url {
                break;
            }
            let Some(next_html) = self.get(&next).await else {
                break;
            };
            listings.extend(parser::extract(variant, &next_html, &next));
            debug!(page = pages + 1, total = listings.len(), "Followed pagination");
            html = next_html;
            page_url = next;
            pages += 1;
        }

        self.finish(&source, variant, listings).await
    }

    /// Same pipeline for a board whose listing only exists after script
    /// rendering; `page` is the browser-driven listing page.
    pub async fn crawl_rendered<P: RenderedPage + ?Sized>(
        &self,
        source: &Source,
        page: &mut P,
    ) -> Vec<Job> {
        let source = rewrite_source(source.clone());
        let variant = resolve_variant(&source.listing_url, source.hint);
        let base = match Url::parse(&source.listing_url) {
            Ok(u) => u,
            Err(e) => {
                warn!(url = %source.listing_url, error = %e, "Unparseable listing URL");
                return Vec::new();
            }
        };

        let links = collect_rendered_links(page, variant.link_selector(), self.settings.max_scrolls);
        let listings = links
            .into_iter()
            .filter_map(|(href, text)| {
                let url = base.join(&href).ok()?;
                Some(RawListing::new(clean_text(&text), url.to_string()))
            })
            .collect();

        self.finish(&source, variant, listings).await
    }

    async fn finish(&self, source: &Source, variant: Variant, listings: Vec<RawListing>) -> Vec<Job> {
        let mut seen = HashSet::new();
        let listings: Vec<RawListing> = listings
            .into_iter()
            .filter(|l| seen.insert(l.url.clone()))
            .take(self.settings.max_jobs)
            .collect();
        info!(source = %source.name, listings = listings.len(), "Extracted listings");

        let mut jobs = Vec::new();
        for raw in &listings {
            if raw.title.chars().count() < 3 {
                continue;
            }

            let detail = if self.follow_details && variant.follows_details() {
                self.get(&raw.url).await.map(|html| {
                    parse_detail(variant, &html, &raw.url, self.directory, self.settings.max_hops)
                })
            } else {
                None
            };

            if variant.is_aggregator() {
                let employer = detail
                    .as_ref()
                    .and_then(|d| d.company.as_deref())
                    .or(raw.company.as_deref());
                match employer {
                    None => {
                        debug!(url = %raw.url, "No employer on posting");
                        continue;
                    }
                    Some(name) if !self.directory.is_empty() && !self.directory.contains_company(name) => {
                        debug!(company = name, "Employer not in directory");
                        continue;
                    }
                    Some(_) => {}
                }
            }

            let job = normalize::build(raw, detail.as_ref(), source, variant, self.settings);
            if job.title.chars().count() < 3 {
                continue;
            }
            jobs.push(job);
        }

        info!(source = %source.name, jobs = jobs.len(), "Source done");
        jobs
    }
}
