use std::sync::LazyLock;

use regex::Regex;

use crate::job::{Category, EmploymentType, ExperienceLevel, RemoteOption};

/// Ordered (pattern, label) table. The first rule that matches wins, so
/// declaration order is part of the behavior.
pub struct RuleTable<L: 'static> {
    rules: Vec<(Regex, L)>,
    fallback: L,
}

impl<L: Copy> RuleTable<L> {
    fn new(rows: &[(&[&str], L)], fallback: L) -> Self {
        let rules = rows
            .iter()
            .map(|(words, label)| (word_pattern(words), *label))
            .collect();
        RuleTable { rules, fallback }
    }

    pub fn matched(&self, text: &str) -> Option<L> {
        self.rules
            .iter()
            .find(|(re, _)| re.is_match(text))
            .map(|(_, label)| *label)
    }

    pub fn classify(&self, text: &str) -> L {
        self.matched(text).unwrap_or(self.fallback)
    }

    pub fn fallback(&self) -> L {
        self.fallback
    }
}

/// Case-insensitive alternation where each alternative is bounded by `\b`
/// on any side that ends in a word character ("sr\." stays open on the right).
fn word_pattern(words: &[&str]) -> Regex {
    let alts: Vec<String> = words
        .iter()
        .map(|w| {
            let lead = if w.starts_with(char::is_alphanumeric) { r"\b" } else { "" };
            let tail = if w.ends_with(char::is_alphanumeric) { r"\b" } else { "" };
            format!("{lead}{w}{tail}")
        })
        .collect();
    Regex::new(&format!("(?i)(?:{})", alts.join("|"))).expect("static rule pattern")
}

pub static CATEGORY: LazyLock<RuleTable<Category>> = LazyLock::new(|| {
    RuleTable::new(
        &[
            (
                &[
                    "engineer", "developer", "backend", "frontend", "full[- ]?stack", "devops",
                    "sre", "software", "forritari", "hugbúnaðar", "programmer",
                ],
                Category::Engineering,
            ),
            (
                &["data", "scientist", "analytics", "ml", "machine learning", "ai", "artificial"],
                Category::Engineering,
            ),
            (
                &["design", "ux", "ui", "grafísk", "hönnuður", "hönnun", "visual"],
                Category::Design,
            ),
            (
                &["marketing", "markaðs", "growth", "content", "seo", "community", "samfélagsmiðla"],
                Category::Marketing,
            ),
            (
                &["sales", "sölu", "account executive", "ae", "sdr", "bdr", "revenue"],
                Category::Sales,
            ),
            (
                &["operations", "ops", "people", "hr", "talent", "recruit", "starfsmannamál", "ráðning"],
                Category::Operations,
            ),
            (&["product manager", "pm", "vörustjór", "product"], Category::Product),
            (
                &["finance", "accountant", "controller", "cfo", "fjármál", "bókhald"],
                Category::Finance,
            ),
            (&["quality", "qa", "gæða", "test"], Category::Operations),
            (&["cto", "ceo", "chief", "framkvæmdastjór"], Category::Operations),
        ],
        Category::Other,
    )
});

pub static EMPLOYMENT: LazyLock<RuleTable<EmploymentType>> = LazyLock::new(|| {
    RuleTable::new(
        &[
            (&["intern", "internship", "starfsnám", "nám"], EmploymentType::Internship),
            (&["contract", "freelance", "verktaki"], EmploymentType::Contract),
            (&["part[- ]?time", "hlutastarf"], EmploymentType::PartTime),
        ],
        EmploymentType::FullTime,
    )
});

pub static EXPERIENCE: LazyLock<RuleTable<ExperienceLevel>> = LazyLock::new(|| {
    RuleTable::new(
        &[
            (
                &["chief", "vp", "head of", "director", "cxo", "cto", "ceo", "framkvæmdastjór"],
                ExperienceLevel::Executive,
            ),
            (&["lead", "principal", "staff", "leiðtogi", "yfir"], ExperienceLevel::Lead),
            (&["senior", r"sr\.", "reyndur"], ExperienceLevel::Senior),
            (&["mid", "intermediate"], ExperienceLevel::Mid),
            (
                &["junior", r"jr\.", "entry", "graduate", "nýútskrifaður"],
                ExperienceLevel::Entry,
            ),
        ],
        ExperienceLevel::Mid,
    )
});

pub static REMOTE: LazyLock<RuleTable<RemoteOption>> = LazyLock::new(|| {
    RuleTable::new(
        &[
            (&["remote", "fjarvinnu", "heimavinn"], RemoteOption::Remote),
            (&["hybrid", "blönduð"], RemoteOption::Hybrid),
            (&["on[- ]site", "onsite"], RemoteOption::Onsite),
        ],
        RemoteOption::Onsite,
    )
});

/// Rule matches on all four axes; `None` where no rule fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guesses {
    pub category: Option<Category>,
    pub employment_type: Option<EmploymentType>,
    pub experience_level: Option<ExperienceLevel>,
    pub remote_option: Option<RemoteOption>,
}

pub fn guess_all(text: &str) -> Guesses {
    Guesses {
        category: CATEGORY.matched(text),
        employment_type: EMPLOYMENT.matched(text),
        experience_level: EXPERIENCE.matched(text),
        remote_option: REMOTE.matched(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallbacks_when_nothing_matches() {
        let text = "Barista";
        assert_eq!(CATEGORY.classify(text), Category::Other);
        assert_eq!(EMPLOYMENT.classify(text), EmploymentType::FullTime);
        assert_eq!(EXPERIENCE.classify(text), ExperienceLevel::Mid);
        assert_eq!(REMOTE.classify(text), RemoteOption::Onsite);
    }

    #[test]
    fn every_axis_is_total() {
        let samples = [
            "",
            "   ",
            "!!!",
            "Senior Backend Engineer",
            "Hlutastarf í sölu",
            "Head of Product, remote",
            "ææææ 1234 \u{1F600}",
        ];
        for s in samples {
            assert!(Category::ALL.contains(&CATEGORY.classify(s)));
            assert!(EmploymentType::ALL.contains(&EMPLOYMENT.classify(s)));
            assert!(ExperienceLevel::ALL.contains(&EXPERIENCE.classify(s)));
            assert!(RemoteOption::ALL.contains(&REMOTE.classify(s)));
        }
    }

    #[test]
    fn earlier_rule_wins_on_conflict() {
        // Engineering is declared before Design.
        assert_eq!(CATEGORY.classify("UX Engineer"), Category::Engineering);
        // Executive is declared before Lead and Senior.
        assert_eq!(EXPERIENCE.classify("Senior Lead, Head of Platform"), ExperienceLevel::Executive);
        assert_eq!(EXPERIENCE.classify("Senior Staff Engineer"), ExperienceLevel::Lead);
        // Internship before Part-time.
        assert_eq!(EMPLOYMENT.classify("Part-time internship"), EmploymentType::Internship);
        // Remote before Hybrid.
        assert_eq!(REMOTE.classify("hybrid or remote"), RemoteOption::Remote);
    }

    #[test]
    fn chief_roles_are_operations_unless_a_narrower_role_matches() {
        assert_eq!(CATEGORY.classify("Chief of Staff"), Category::Operations);
        assert_eq!(CATEGORY.classify("CTO"), Category::Operations);
        // cfo sits in the Finance row, which precedes the catch-all.
        assert_eq!(CATEGORY.classify("CFO"), Category::Finance);
        assert_eq!(CATEGORY.classify("Chief Data Officer"), Category::Engineering);
    }

    #[test]
    fn whole_word_matching_only() {
        // "ai" must not fire inside "maintenance", "pm" not inside "pmt".
        assert_eq!(CATEGORY.classify("Maintenance"), Category::Other);
        assert_eq!(CATEGORY.classify("AI researcher"), Category::Engineering);
        assert_eq!(EXPERIENCE.classify("Leadership coach"), ExperienceLevel::Mid);
    }

    #[test]
    fn dotted_abbreviations_match() {
        assert_eq!(EXPERIENCE.classify("Sr. Designer"), ExperienceLevel::Senior);
        assert_eq!(EXPERIENCE.classify("Jr. Developer"), ExperienceLevel::Entry);
    }

    #[test]
    fn hyphen_and_space_variants() {
        assert_eq!(EMPLOYMENT.classify("part time"), EmploymentType::PartTime);
        assert_eq!(EMPLOYMENT.classify("Part-Time"), EmploymentType::PartTime);
        assert_eq!(EMPLOYMENT.classify("parttime"), EmploymentType::PartTime);
        assert_eq!(REMOTE.classify("On-site in Reykjavik"), RemoteOption::Onsite);
        assert_eq!(CATEGORY.classify("Fullstack dev"), Category::Engineering);
    }

    #[test]
    fn icelandic_vocabulary() {
        assert_eq!(CATEGORY.classify("Hugbúnaðar sérfræðingur"), Category::Engineering);
        assert_eq!(EMPLOYMENT.classify("Hlutastarf"), EmploymentType::PartTime);
        assert_eq!(REMOTE.classify("möguleiki á fjarvinnu"), RemoteOption::Remote);
    }

    #[test]
    fn guess_all_reports_misses_as_none() {
        let g = guess_all("Senior Backend Engineer Iceland remote · full-time");
        assert_eq!(g.category, Some(Category::Engineering));
        assert_eq!(g.experience_level, Some(ExperienceLevel::Senior));
        assert_eq!(g.remote_option, Some(RemoteOption::Remote));
        assert_eq!(g.employment_type, None);
    }
}
