use std::path::Path;

use url::Url;

use crate::error::{read_required, ScrapeError};
use crate::parser::ParserHint;

/// One organization's career-listing entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub name: String,
    pub listing_url: String,
    pub default_location: String,
    pub featured: bool,
    pub hint: ParserHint,
}

impl Source {
    pub fn new(name: impl Into<String>, listing_url: impl Into<String>) -> Self {
        Source {
            name: name.into(),
            listing_url: listing_url.into(),
            default_location: "Iceland".to_string(),
            featured: false,
            hint: ParserHint::Auto,
        }
    }

    pub fn with_hint(mut self, hint: ParserHint) -> Self {
        self.hint = hint;
        self
    }
}

/// Read a sources file. Missing file is fatal.
pub fn load_sources(path: &Path, default_location: &str) -> Result<Vec<Source>, ScrapeError> {
    let text = read_required(path)?;
    let mut sources = parse_sources(&text)?;
    for s in &mut sources {
        s.default_location = default_location.to_string();
    }
    Ok(sources)
}

/// `url`, `company|url` or `company|url|hint` per line; `#` comments and
/// blank lines are skipped.
pub fn parse_sources(text: &str) -> Result<Vec<Source>, ScrapeError> {
    let mut sources = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split('|').map(str::trim).collect();
        let source = match parts.as_slice() {
            [url] => Source::new(infer_company_name(url), *url),
            [company, url] => Source::new(*company, *url),
            [company, url, hint, ..] => {
                let hint = hint.parse::<ParserHint>().map_err(|_| ScrapeError::InvalidSource {
                    line: idx + 1,
                    reason: format!("unknown parser hint '{}'", hint),
                })?;
                Source::new(*company, *url).with_hint(hint)
            }
            [] => continue,
        };

        if source.listing_url.is_empty() {
            return Err(ScrapeError::InvalidSource {
                line: idx + 1,
                reason: "missing url".to_string(),
            });
        }
        sources.push(source);
    }

    Ok(sources)
}

/// Company name from a URL host: `www.` stripped, first label, hyphens to
/// spaces, title-cased. `https://www.open-source.is/jobs` → "Open Source".
pub fn infer_company_name(url: &str) -> String {
    let host = match Url::parse(url) {
        Ok(u) => u.host_str().unwrap_or("").to_string(),
        Err(_) => url
            .split("//")
            .nth(1)
            .unwrap_or(url)
            .split(['/', ':'])
            .next()
            .unwrap_or("")
            .to_string(),
    };
    let host = host.trim_start_matches("www.");
    let base = host.split('.').next().unwrap_or("");

    base.replace('-', " ")
        .split(' ')
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Variant;

    #[test]
    fn parses_all_three_line_shapes() {
        let text = "\
# comment line

https://www.marel-tech.com/careers
Acme | https://acme.example/careers
CCP|https://careers.ccpgames.com/|ccp
";
        let sources = parse_sources(text).unwrap();
        assert_eq!(sources.len(), 3);

        assert_eq!(sources[0].name, "Marel Tech");
        assert_eq!(sources[0].hint, ParserHint::Auto);

        assert_eq!(sources[1].name, "Acme");
        assert_eq!(sources[1].listing_url, "https://acme.example/careers");

        assert_eq!(sources[2].hint, ParserHint::Explicit(Variant::Ccp));
    }

    #[test]
    fn unknown_hint_names_the_line() {
        let err = parse_sources("\nX|https://x.is|bogus").unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidSource { line: 2, .. }));
    }

    #[test]
    fn auto_hint_is_accepted_explicitly() {
        let s = parse_sources("X|https://x.is|auto").unwrap();
        assert_eq!(s[0].hint, ParserHint::Auto);
    }

    #[test]
    fn company_inference() {
        assert_eq!(infer_company_name("https://www.open-source.is/jobs"), "Open Source");
        assert_eq!(infer_company_name("https://lucinity.com:8443/careers"), "Lucinity");
        assert_eq!(infer_company_name("not a url"), "Not A Url");
    }

    #[test]
    fn missing_sources_file_is_fatal() {
        let err = load_sources(Path::new("does/not/exist.txt"), "Iceland").unwrap_err();
        assert!(matches!(err, ScrapeError::InputUnavailable { .. }));
    }
}
