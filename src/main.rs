//! # Front Pages
//!
//! A batch job that posts a random sample of today's newspaper front pages to
//! Twitter, one every few minutes, each tagged with where the paper is
//! published.
//!
//! ## Usage
//!
//! ```sh
//! TWITTER_CONSUMER_KEY=... TWITTER_CONSUMER_SECRET=... \
//! TWITTER_ACCESS_TOKEN=... TWITTER_ACCESS_TOKEN_SECRET=... frontpages
//! ```
//!
//! ## Architecture
//!
//! The job is a straight pipeline:
//! 1. **Indexing**: Scrape the directory of every paper with a front page today
//! 2. **Cleaning**: Normalize places of publication (full US state names)
//! 3. **Sampling**: Draw a random sample, split between US and world papers
//! 4. **Posting**: For each sampled paper, one at a time: scrape its detail
//!    page, download the front page, geocode the place, compose and post the
//!    status, then pause
//!
//! Failing to get the directory or to log in ends the run. A failure on a
//! single paper is logged and the job moves on after a longer pause.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{info, instrument};

mod cli;
mod config;
mod error;
mod geocode;
mod images;
mod logging;
mod models;
mod pipeline;
mod places;
mod publish;
mod sampler;
mod scrapers;
mod status;
mod twitter;
mod utils;

use cli::Cli;
use config::Config;
use geocode::Nominatim;
use logging::LogRegistry;
use pipeline::Pipeline;
use scrapers::newseum::Newseum;
use twitter::TwitterClient;
use utils::ensure_writable_dir;

/// Name of the log stream the job writes to.
const LOG_STREAM: &str = "fp";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let today = Local::now().date_naive();
    let mut logs = LogRegistry::new(&config.log_folder, today);
    let stream = logs.stream(LOG_STREAM)?;
    let log_path = stream.path().to_path_buf();
    logging::init(stream)?;
    info!(path = %log_path.display(), "Logging to file");

    run(args, config).await.inspect_err(|e| {
        tracing::error!(error = %e, "Run aborted");
    })
}

#[instrument(level = "info", skip_all)]
async fn run(args: Cli, config: Config) -> Result<(), Box<dyn Error>> {
    let start_time = std::time::Instant::now();
    info!("script started");
    info!(config = %config.summary(), "Loaded configuration");

    let keys = args
        .twitter_keys()
        .or_else(|| config.twitter.keys.clone())
        .ok_or_else(|| error::Error::Config("twitter credentials are not set".to_string()))?;

    let client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;

    // ---- Index, clean and sample ----
    let newseum = Newseum::new(client.clone(), &config.sources);
    let mut papers = newseum.index_papers().await?;
    places::normalize_listings(&mut papers);
    info!(count = papers.len(), "Extracted and cleaned newspaper details");

    let sample = sampler::sample_papers(papers, config.n, config.usa_proportion, &mut rand::rng());

    // ---- Prepare image folder and log in ----
    let save_folder = config.save_folder(Local::now().date_naive());
    ensure_writable_dir(&save_folder).await?;

    let twitter = TwitterClient::new(client.clone(), &config.twitter, keys);
    twitter.verify_credentials().await?;

    // ---- Post ----
    let geocoder = Nominatim::new(client, &config.geocoder);
    let pipeline = Pipeline {
        source: &newseum,
        geocoder: &geocoder,
        publisher: &twitter,
        save_folder: &save_folder,
        pause: config.pause_policy(),
    };
    let report = pipeline.run(&sample).await;

    let elapsed = start_time.elapsed();
    info!(
        published = report.published(),
        failed = report.failed(),
        geotagged = report.geotagged(),
        secs = elapsed.as_secs(),
        "Execution complete"
    );
    Ok(())
}
