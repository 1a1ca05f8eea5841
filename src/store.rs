use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::Local;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{read_required, ScrapeError};
use crate::job::Job;

static JOBS_ARRAY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"jobs\s*:\s*\[").unwrap());
static RECORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\s*id:\s*(\d+),(.*?)\n\s*\}").unwrap());
static STRING_FIELD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\w+):\s*"((?:[^"\\]|\\.)*)""#).unwrap());
static TOTAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"totalJobs:\s*(\d+)").unwrap());
static UPDATED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"lastUpdated:\s*"([^"]*)""#).unwrap());

/// The parts of a committed record that deduplication needs.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: u64,
    pub company: String,
    pub title: String,
    pub application_url: String,
}

/// The jobs data asset: its full text plus the records parsed out of it.
#[derive(Debug, Clone)]
pub struct Store {
    pub path: PathBuf,
    content: String,
    pub records: Vec<StoredRecord>,
    /// Byte offset where new records are spliced in, if the array was found.
    insert_at: Option<Insert>,
}

#[derive(Debug, Clone, Copy)]
enum Insert {
    AfterRecord(usize),
    EmptyArray(usize),
}

impl Store {
    /// Read the store file. A missing file is fatal.
    pub fn load(path: &Path) -> Result<Self, ScrapeError> {
        let content = read_required(path)?;
        Ok(Self::parse(path, content))
    }

    /// Parse store text. Unrecognized structure yields an empty store.
    pub fn parse(path: &Path, content: String) -> Self {
        let mut store = Store {
            path: path.to_path_buf(),
            content,
            records: Vec::new(),
            insert_at: None,
        };

        let Some(array) = JOBS_ARRAY_RE.find(&store.content) else {
            let err = ScrapeError::StructureNotFound {
                what: "jobs array",
                path: store.path.clone(),
            };
            warn!(error = %err, "Treating store as empty");
            return store;
        };

        let Some(close) = closing_bracket(&store.content, array.end()) else {
            let err = ScrapeError::StructureNotFound {
                what: "end of jobs array",
                path: store.path.clone(),
            };
            warn!(error = %err, "Treating store as empty");
            return store;
        };

        let mut last_end = None;
        for caps in RECORD_RE.captures_iter(&store.content[array.end()..close]) {
            let Ok(id) = caps[1].parse::<u64>() else {
                continue;
            };
            let mut record = StoredRecord {
                id,
                company: String::new(),
                title: String::new(),
                application_url: String::new(),
            };
            for field in STRING_FIELD_RE.captures_iter(&caps[2]) {
                let value = unescape(&field[2]);
                match &field[1] {
                    "company" => record.company = value,
                    "title" => record.title = value,
                    "applicationUrl" => record.application_url = value,
                    _ => {}
                }
            }
            store.records.push(record);
            last_end = caps.get(0).map(|m| array.end() + m.end());
        }

        store.insert_at = Some(match last_end {
            Some(end) => Insert::AfterRecord(end),
            None => Insert::EmptyArray(array.end()),
        });
        debug!(records = store.records.len(), "Parsed store");
        store
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn max_id(&self) -> u64 {
        self.records.iter().map(|r| r.id).max().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    /// The `totalJobs` value as written in the file.
    pub fn total_jobs(&self) -> Option<u64> {
        TOTAL_RE.captures(&self.content)?[1].parse().ok()
    }

    pub fn last_updated(&self) -> Option<&str> {
        UPDATED_RE
            .captures(&self.content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    /// Write the current content with a single atomic replace.
    pub fn commit(&self) -> Result<(), ScrapeError> {
        let tmp = self.path.with_extension("js.tmp");
        std::fs::write(&tmp, &self.content).map_err(|e| ScrapeError::unavailable(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| ScrapeError::unavailable(&self.path, e))?;
        info!(path = %self.path.display(), records = self.records.len(), "Store written");
        Ok(())
    }
}

/// Append `accepted` to the store, numbering from the current max id.
/// Returns the updated store and the jobs with their ids assigned. An
/// empty batch leaves the store untouched.
pub fn merge(store: &Store, accepted: Vec<Job>) -> Result<(Store, Vec<Job>), ScrapeError> {
    if accepted.is_empty() {
        return Ok((store.clone(), accepted));
    }
    let Some(insert) = store.insert_at else {
        return Err(ScrapeError::StructureNotFound {
            what: "jobs array",
            path: store.path.clone(),
        });
    };

    for (re, what) in [(&*TOTAL_RE, "totalJobs"), (&*UPDATED_RE, "lastUpdated")] {
        if !re.is_match(&store.content) {
            return Err(ScrapeError::StructureNotFound {
                what,
                path: store.path.clone(),
            });
        }
    }

    let mut next_id = store.max_id();
    let added: Vec<Job> = accepted
        .into_iter()
        .map(|mut job| {
            next_id += 1;
            job.id = Some(next_id);
            job
        })
        .collect();

    let rendered = added
        .iter()
        .map(|j| render_record(j, j.id.unwrap_or_default()))
        .collect::<Vec<_>>()
        .join(",\n");

    let mut content = store.content.clone();
    match insert {
        Insert::AfterRecord(at) => content.insert_str(at, &format!(",\n{}", rendered)),
        Insert::EmptyArray(at) => content.insert_str(at, &format!("\n{}\n    ", rendered)),
    }

    let total = store.total() + added.len();
    let today = Local::now().format("%Y-%m-%d").to_string();
    let content = TOTAL_RE.replace(&content, format!("totalJobs: {}", total).as_str());
    let content = UPDATED_RE.replace(&content, format!("lastUpdated: \"{}\"", today).as_str());

    let updated = Store::parse(&store.path, content.into_owned());
    Ok((updated, added))
}

/// One record in the store's object-literal layout.
pub fn render_record(job: &Job, id: u64) -> String {
    format!(
        r#"        {{
            id: {id},
            company: "{company}",
            companyLogo: null,
            title: "{title}",
            description: "{description}",
            category: "{category}",
            type: "{kind}",
            experienceLevel: "{level}",
            location: "{location}",
            remote: "{remote}",
            salary: null,
            postedDate: "{posted}",
            applicationUrl: "{url}",
            featured: {featured}
        }}"#,
        company = escape(&job.company),
        title = escape(&job.title),
        description = escape(&job.description),
        category = job.category.slug(),
        kind = job.employment_type.slug(),
        level = job.experience_level.slug(),
        location = escape(&job.location),
        remote = job.remote_option.slug(),
        posted = escape(&job.posted_date),
        url = escape(&job.application_url),
        featured = job.featured,
    )
}

/// Byte offset of the `]` closing the array whose body starts at `start`.
/// Brackets inside string literals don't count.
fn closing_bracket(content: &str, start: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in content[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + i);
                }
            }
            _ => {}
        }
    }
    None
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\r', "")
        .replace('\n', "\\n")
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
