use chrono::Local;

use crate::classify::{guess_all, CATEGORY, EMPLOYMENT, EXPERIENCE, REMOTE};
use crate::config::Settings;
use crate::job::{Job, JobDetail, RawListing};
use crate::parser::Variant;
use crate::source::Source;
use crate::utils::{clean_text, truncate_words};

/// Turn a listing stub and its optional detail page into a canonical job.
///
/// Each label axis resolves in order: structured value from the page,
/// classifier match over title, location and description, the variant's
/// default, and finally the axis fallback.
pub fn build(
    raw: &RawListing,
    detail: Option<&JobDetail>,
    source: &Source,
    variant: Variant,
    settings: &Settings,
) -> Job {
    let empty = JobDetail::default();
    let detail = detail.unwrap_or(&empty);

    let title = if variant.is_aggregator() {
        detail.title.as_deref().unwrap_or(raw.title.as_str())
    } else {
        raw.title.as_str()
    };
    let title = clean_text(title);

    let company = if variant.is_aggregator() {
        detail.company.as_deref().or(raw.company.as_deref()).unwrap_or(source.name.as_str())
    } else {
        source.name.as_str()
    };

    let location = detail
        .location
        .as_deref()
        .or(raw.location.as_deref())
        .map(clean_text)
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| clean_text(&source.default_location));

    let description = clean_text(&detail.description);
    let best_text = format!("{} {} {}", title, location, description);
    let guesses = guess_all(&best_text);

    let employment_type = detail
        .employment_type
        .or(raw.employment_type)
        .or(guesses.employment_type)
        .unwrap_or(EMPLOYMENT.fallback());
    let remote_option = detail
        .workplace
        .or(guesses.remote_option)
        .or(variant.default_remote())
        .unwrap_or(REMOTE.fallback());

    Job {
        id: None,
        company: clean_text(company),
        title,
        description: truncate_words(&description, settings.description_limit),
        category: guesses.category.unwrap_or(CATEGORY.fallback()),
        employment_type,
        experience_level: guesses.experience_level.unwrap_or(EXPERIENCE.fallback()),
        location,
        remote_option,
        application_url: raw.url.trim().to_string(),
        featured: source.featured,
        source: variant.tag().to_string(),
        posted_date: Local::now().format("%Y-%m-%d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{Category, EmploymentType, ExperienceLevel, RemoteOption};

    fn acme() -> Source {
        Source::new("Acme", "https://acme.example/careers")
    }

    #[test]
    fn acme_posting_end_to_end() {
        let raw = RawListing::new("Senior Backend Engineer", "https://acme.example/jobs/42");
        let detail = JobDetail {
            description: "remote · full-time".into(),
            ..JobDetail::default()
        };
        let job = build(&raw, Some(&detail), &acme(), Variant::Generic, &Settings::default());

        assert_eq!(job.company, "Acme");
        assert_eq!(job.title, "Senior Backend Engineer");
        assert_eq!(job.category, Category::Engineering);
        assert_eq!(job.employment_type, EmploymentType::FullTime);
        assert_eq!(job.experience_level, ExperienceLevel::Senior);
        assert_eq!(job.remote_option, RemoteOption::Remote);
        assert_eq!(job.application_url, "https://acme.example/jobs/42");
        assert_eq!(job.location, "Iceland");
        assert_eq!(job.source, "generic");
        assert_eq!(job.posted_date, Local::now().format("%Y-%m-%d").to_string());
    }

    #[test]
    fn structured_values_beat_classifier() {
        let raw = RawListing::new("Remote Backend Engineer", "https://careers.ccpgames.com/en/postings/1");
        let detail = JobDetail {
            description: "Part-time role".into(),
            location: Some("London, UK".into()),
            employment_type: Some(EmploymentType::Contract),
            workplace: Some(RemoteOption::Onsite),
            ..JobDetail::default()
        };
        let job = build(&raw, Some(&detail), &acme(), Variant::Ccp, &Settings::default());
        assert_eq!(job.employment_type, EmploymentType::Contract);
        assert_eq!(job.remote_option, RemoteOption::Onsite);
        assert_eq!(job.location, "London, UK");
    }

    #[test]
    fn listing_type_used_without_detail() {
        let raw = RawListing {
            employment_type: Some(EmploymentType::Internship),
            ..RawListing::new("Sumarstarf", "https://syndis.umsokn.is/en/7")
        };
        let job = build(&raw, None, &acme(), Variant::Umsokn, &Settings::default());
        assert_eq!(job.employment_type, EmploymentType::Internship);
        assert_eq!(job.description, "");
        assert_eq!(job.category, Category::Other);
        assert_eq!(job.experience_level, ExperienceLevel::Mid);
        assert_eq!(job.remote_option, RemoteOption::Onsite);
    }

    #[test]
    fn variant_default_only_when_rules_are_silent() {
        let source = Source::new("Climeworks", "https://climeworks.com/jobs");
        let plain = RawListing::new("Plant Operator", "https://climeworks.com/jobs/plant-operator");
        let job = build(&plain, None, &source, Variant::Climeworks, &Settings::default());
        assert_eq!(job.remote_option, RemoteOption::Hybrid);

        let remote = RawListing::new("Remote Process Engineer", "https://climeworks.com/jobs/pe");
        let job = build(&remote, None, &source, Variant::Climeworks, &Settings::default());
        assert_eq!(job.remote_option, RemoteOption::Remote);
    }

    #[test]
    fn aggregator_uses_posting_employer() {
        let source = Source::new("Tvinna", "https://www.tvinna.is/jobs/");
        let raw = RawListing {
            company: Some("end Developer".into()),
            ..RawListing::new("Front-end Developer", "https://www.tvinna.is/jobs/fe/")
        };
        let detail = JobDetail {
            title: Some("Frontend  Developer".into()),
            company: Some("Controlant".into()),
            location: Some("Reykjavik, Iceland".into()),
            ..JobDetail::default()
        };
        let job = build(&raw, Some(&detail), &source, Variant::Tvinna, &Settings::default());
        assert_eq!(job.company, "Controlant");
        assert_eq!(job.title, "Frontend Developer");
        assert_eq!(job.location, "Reykjavik, Iceland");
    }

    #[test]
    fn aggregator_falls_back_to_card_employer() {
        let source = Source::new("Tvinna", "https://www.tvinna.is/jobs/");
        let raw = RawListing {
            company: Some("Controlant".into()),
            ..RawListing::new("Frontend Developer", "https://www.tvinna.is/jobs/fe/")
        };
        let job = build(&raw, None, &source, Variant::Tvinna, &Settings::default());
        assert_eq!(job.company, "Controlant");
    }

    #[test]
    fn description_is_collapsed_and_truncated() {
        let raw = RawListing::new("Designer", "https://acme.example/jobs/1");
        let detail = JobDetail {
            description: format!("{}  tail", "word ".repeat(100)),
            ..JobDetail::default()
        };
        let settings = Settings {
            description_limit: 20,
            ..Settings::default()
        };
        let job = build(&raw, Some(&detail), &acme(), Variant::Generic, &settings);
        assert_eq!(job.description, "word word word word…");
    }
}
