use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use career_scraper::config::Settings;
use career_scraper::crawler::Crawler;
use career_scraper::dedup::Deduplicator;
use career_scraper::directory::Directory;
use career_scraper::error::read_required;
use career_scraper::fetch::HttpFetcher;
use career_scraper::job::Job;
use career_scraper::source::load_sources;
use career_scraper::store::{self, Store};
use career_scraper::utils::format_duration;

#[derive(Parser)]
#[command(name = "career_scraper", about = "Career-page job scraper and jobs-board merger")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CrawlArgs {
    /// Sources file: `url`, `company|url` or `company|url|parser` per line
    #[arg(short, long)]
    sources: PathBuf,
    /// Skip individual posting pages
    #[arg(long)]
    no_details: bool,
    /// Max postings per source
    #[arg(long)]
    max_jobs: Option<usize>,
    /// Directory data file used to filter job-board postings
    #[arg(long)]
    directory: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl every source and write the jobs as JSON
    Crawl {
        #[command(flatten)]
        args: CrawlArgs,
        #[arg(short, long, default_value = "scraped_jobs.json")]
        output: PathBuf,
    },
    /// Merge a scraped JSON file into the jobs data store
    Merge {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        store: PathBuf,
    },
    /// Crawl + merge in one pipeline
    Run {
        #[command(flatten)]
        args: CrawlArgs,
        #[arg(long)]
        store: PathBuf,
        /// Also keep the crawled jobs as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show store statistics
    Stats {
        #[arg(long)]
        store: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let mut settings = Settings::load().context("Failed to load settings")?;

    let result = match cli.command {
        Commands::Crawl { args, output } => {
            let jobs = crawl(&args, &mut settings).await?;
            write_json(&output, &jobs)?;
            println!("Wrote {} jobs to {}", jobs.len(), output.display());
            Ok(())
        }
        Commands::Merge { input, store } => {
            let text = read_required(&input)?;
            let jobs: Vec<Job> = serde_json::from_str(&text)
                .with_context(|| format!("Invalid jobs JSON in {}", input.display()))?;
            merge_into(&store, jobs)
        }
        Commands::Run { args, store, output } => {
            let t_crawl = Instant::now();
            let jobs = crawl(&args, &mut settings).await?;
            println!(
                "Crawled {} jobs in {:.1}s",
                jobs.len(),
                t_crawl.elapsed().as_secs_f64()
            );
            if let Some(path) = output {
                write_json(&path, &jobs)?;
            }
            merge_into(&store, jobs)
        }
        Commands::Stats { store } => {
            let s = Store::load(&store)?;
            println!("Records:     {}", s.total());
            println!("Max id:      {}", s.max_id());
            println!(
                "totalJobs:   {}",
                s.total_jobs().map(|n| n.to_string()).unwrap_or_else(|| "-".into())
            );
            println!("lastUpdated: {}", s.last_updated().unwrap_or("-"));

            let mut per_company: BTreeMap<&str, usize> = BTreeMap::new();
            for r in &s.records {
                *per_company.entry(r.company.as_str()).or_default() += 1;
            }
            if !per_company.is_empty() {
                println!("\n--- Companies ---");
                for (company, n) in &per_company {
                    println!("  {:>4}  {}", n, company);
                }
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn crawl(args: &CrawlArgs, settings: &mut Settings) -> Result<Vec<Job>> {
    if let Some(n) = args.max_jobs {
        settings.max_jobs = n;
    }
    let sources = load_sources(&args.sources, &settings.default_location)?;
    let directory = match &args.directory {
        Some(path) => Directory::load(path)?,
        None => Directory::default(),
    };
    info!(sources = sources.len(), known_companies = directory.len(), "Starting crawl");

    let fetcher = HttpFetcher::new(settings)?;
    let crawler = Crawler::new(fetcher, settings, &directory).with_details(!args.no_details);

    let pb = ProgressBar::new(sources.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut jobs = Vec::new();
    for source in &sources {
        pb.set_message(source.name.clone());
        jobs.extend(crawler.crawl_source(source).await);
        pb.inc(1);
    }
    pb.finish_and_clear();

    let mut dedup = Deduplicator::default();
    let jobs = dedup.filter(jobs);
    println!("Found {} unique jobs across {} sources", jobs.len(), sources.len());
    Ok(jobs)
}

fn merge_into(path: &Path, jobs: Vec<Job>) -> Result<()> {
    let current = Store::load(path)?;
    let scraped = jobs.len();
    let accepted = Deduplicator::seeded(&current.records).filter(jobs);

    let (updated, added) = store::merge(&current, accepted)?;
    if added.is_empty() {
        println!("No new jobs ({} scraped, all already present).", scraped);
        return Ok(());
    }
    updated.commit()?;

    println!(
        "Added {} jobs ({} duplicates skipped). Store now holds {}.",
        added.len(),
        scraped - added.len(),
        updated.total()
    );
    for job in &added {
        println!("  #{:<4} {} - {}", job.id.unwrap_or_default(), job.company, job.title);
    }
    Ok(())
}

fn write_json(path: &Path, jobs: &[Job]) -> Result<()> {
    let json = serde_json::to_string_pretty(jobs)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
