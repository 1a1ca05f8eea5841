use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use crate::job::Job;
use crate::store::StoredRecord;

static PUNCT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Legal-entity and country tokens that don't distinguish employers.
const COMPANY_NOISE: &[&str] = &["ehf", "ehf.", "hf", "hf.", "slf", "ses", "inc", "ltd", "iceland"];

/// Lowercase company name without trailing legal-entity or country tokens.
/// The first token is always kept.
pub fn normalize_company(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    let mut tokens: Vec<&str> = lower.split_whitespace().collect();
    while tokens.len() > 1 && tokens.last().is_some_and(|t| COMPANY_NOISE.contains(t)) {
        tokens.pop();
    }
    tokens.join(" ")
}

/// `company::title` with the title lowercased, punctuation stripped and
/// whitespace collapsed.
pub fn identity_key(company: &str, title: &str) -> String {
    let title = title.to_lowercase();
    let title = PUNCT_RE.replace_all(&title, "");
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("{}::{}", normalize_company(company), title)
}

/// Application URL folded to lowercase with trailing slashes removed.
pub fn url_key(url: &str) -> String {
    url.trim().to_lowercase().trim_end_matches('/').to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateOf {
    StoreTitle,
    StoreUrl,
    BatchTitle,
    BatchUrl,
}

/// Two key spaces (identity and URL), each split into the store-seeded
/// index and the index grown by the current batch.
#[derive(Debug, Default)]
pub struct Deduplicator {
    store_keys: HashSet<String>,
    store_urls: HashSet<String>,
    batch_keys: HashSet<String>,
    batch_urls: HashSet<String>,
}

impl Deduplicator {
    pub fn seeded<'a>(records: impl IntoIterator<Item = &'a StoredRecord>) -> Self {
        let mut dedup = Deduplicator::default();
        for r in records {
            dedup.store_keys.insert(identity_key(&r.company, &r.title));
            let u = url_key(&r.application_url);
            if !u.is_empty() {
                dedup.store_urls.insert(u);
            }
        }
        dedup
    }

    pub fn check(&self, company: &str, title: &str, url: &str) -> Option<DuplicateOf> {
        let key = identity_key(company, title);
        let u = url_key(url);
        let has_url = !u.is_empty();

        if self.store_keys.contains(&key) {
            Some(DuplicateOf::StoreTitle)
        } else if has_url && self.store_urls.contains(&u) {
            Some(DuplicateOf::StoreUrl)
        } else if self.batch_keys.contains(&key) {
            Some(DuplicateOf::BatchTitle)
        } else if has_url && self.batch_urls.contains(&u) {
            Some(DuplicateOf::BatchUrl)
        } else {
            None
        }
    }

    /// Accept the posting unless either key was seen; accepted keys join
    /// the batch index so later repeats in the same batch are rejected.
    pub fn accept(&mut self, company: &str, title: &str, url: &str) -> bool {
        if let Some(dup) = self.check(company, title, url) {
            info!(?dup, company, title, "Skipping duplicate");
            return false;
        }
        self.batch_keys.insert(identity_key(company, title));
        let u = url_key(url);
        if !u.is_empty() {
            self.batch_urls.insert(u);
        }
        true
    }

    /// Keep the first occurrence of every posting, in input order.
    pub fn filter(&mut self, jobs: Vec<Job>) -> Vec<Job> {
        jobs.into_iter()
            .filter(|j| self.accept(&j.company, &j.title, &j.application_url))
            .collect()
    }
}
