use std::time::Duration;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

pub const USER_AGENT: &str = "StartupIcelandJobsBot/1.0 (+https://startupiceland.com/jobs/)";

/// Run-wide knobs. Defaults, then `scraper.toml` if present, then
/// `SCRAPER_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub timeout_secs: u64,
    pub delay_ms: u64,
    pub user_agent: String,
    pub description_limit: usize,
    pub max_jobs: usize,
    pub max_pages: usize,
    pub max_hops: usize,
    pub max_scrolls: usize,
    pub default_location: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            timeout_secs: 20,
            delay_ms: 600,
            user_agent: USER_AGENT.to_string(),
            description_limit: 350,
            max_jobs: 120,
            max_pages: 10,
            max_hops: 10,
            max_scrolls: 20,
            default_location: "Iceland".to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let d = Settings::default();
        let settings = Config::builder()
            .set_default("timeout_secs", d.timeout_secs as i64)?
            .set_default("delay_ms", d.delay_ms as i64)?
            .set_default("user_agent", d.user_agent)?
            .set_default("description_limit", d.description_limit as i64)?
            .set_default("max_jobs", d.max_jobs as i64)?
            .set_default("max_pages", d.max_pages as i64)?
            .set_default("max_hops", d.max_hops as i64)?
            .set_default("max_scrolls", d.max_scrolls as i64)?
            .set_default("default_location", d.default_location)?
            .add_source(File::with_name("scraper").required(false))
            .add_source(Environment::with_prefix("SCRAPER").try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_site_observed_values() {
        let s = Settings::default();
        assert_eq!(s.timeout(), Duration::from_secs(20));
        assert_eq!(s.cooldown(), Duration::from_millis(600));
        assert_eq!(s.description_limit, 350);
        assert_eq!(s.max_hops, 10);
        assert!(s.user_agent.starts_with("StartupIcelandJobsBot/"));
    }
}
