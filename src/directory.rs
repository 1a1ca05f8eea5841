use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::dedup::normalize_company;
use crate::error::{read_required, ScrapeError};

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"name:\s*"([^"]+)""#).unwrap());

const SUFFIXES: &[&str] = &[" ehf", " ehf.", " hf", " hf.", " slf", " ses", " inc", " ltd"];

/// Known organization names, loaded once per run and passed down by reference.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    names: HashSet<String>,
}

impl Directory {
    pub fn load(path: &Path) -> Result<Self, ScrapeError> {
        let text = read_required(path)?;
        Ok(Self::parse(&text))
    }

    /// Pull every `name: "…"` entry out of a directory data asset.
    pub fn parse(text: &str) -> Self {
        Self::from_names(NAME_RE.captures_iter(text).map(|c| c[1].to_string()))
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = HashSet::new();
        for name in names {
            let lower = name.as_ref().trim().to_lowercase();
            for suffix in SUFFIXES {
                if let Some(stripped) = lower.strip_suffix(suffix) {
                    set.insert(stripped.trim().to_string());
                }
            }
            set.insert(lower);
        }
        set.remove("");
        Directory { names: set }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Exact match on the normalized name, or containment either way.
    pub fn contains_company(&self, company: &str) -> bool {
        let normalized = normalize_company(company);
        if normalized.is_empty() {
            return false;
        }
        if self.names.contains(&normalized) {
            return true;
        }
        self.names
            .iter()
            .any(|known| known.contains(&normalized) || normalized.contains(known.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATA: &str = r#"
var STARTUPS = [
    { id: 'a', name: "Lucinity ehf.", sector: 'fintech' },
    { id: 'b', name: "Controlant", sector: 'saas' },
];
"#;

    #[test]
    fn parses_names_and_suffix_variants() {
        let dir = Directory::parse(DATA);
        assert!(dir.names.contains("lucinity ehf."));
        assert!(dir.names.contains("lucinity"));
        assert!(dir.names.contains("controlant"));
        assert_eq!(dir.len(), 3);
    }

    #[test]
    fn matches_on_normalized_and_contained_names() {
        let dir = Directory::parse(DATA);
        assert!(dir.contains_company("Lucinity hf"));
        assert!(dir.contains_company("CONTROLANT"));
        assert!(dir.contains_company("Controlant Iceland"));
        assert!(!dir.contains_company("Bakery"));
        assert!(!dir.contains_company("   "));
    }
}
