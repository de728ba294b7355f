mod analysis;
mod config;
mod error;
mod models;
mod pipeline;
mod scraper;
mod storage;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::AppConfig;
use crate::models::League;
use crate::pipeline::{Pipeline, analyze_file};
use crate::scraper::{HttpFetcher, PageFetcher, SeasonCatalog};
use crate::storage::CheckpointStore;

#[derive(Parser)]
#[command(name = "halftime-comebacks", about = "Halftime comeback finder for basketball box scores", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Discover, scrape (resumable) and filter one league season
    Scrape {
        #[arg(short, long, value_enum)]
        league: League,

        #[arg(short, long)]
        season: i32,

        /// Minimum halftime deficit (default: league profile)
        #[arg(short, long)]
        threshold: Option<u32>,
    },

    /// Filter an existing raw-data CSV for comeback candidates
    Analyze {
        #[arg(short, long, value_enum)]
        league: League,

        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        threshold: Option<u32>,
    },

    /// Print the discovered game URLs for a season
    Discover {
        #[arg(short, long, value_enum)]
        league: League,

        #[arg(short, long)]
        season: i32,
    },

    /// Show checkpoint statistics for a season
    Stats {
        #[arg(short, long, value_enum)]
        league: League,

        #[arg(short, long)]
        season: i32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "halftime_comebacks=info,warn",
        1 => "halftime_comebacks=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::new(filter))
        .init();

    let config = AppConfig::load()?;

    match cli.command {
        Command::Scrape { league, season, threshold } => {
            let _t = utils::Timer::start(format!("{} {} scrape", league, season));
            let stats = Pipeline::new(config, league, season, threshold).run().await?;
            info!(
                "Done: {} discovered ({} already stored), {} scraped, {} failed, {} games in dataset, {} candidates",
                stats.run.discovered,
                stats.run.already_scraped,
                stats.run.scraped,
                stats.run.failed_urls.len(),
                stats.dataset_games,
                stats.candidates,
            );
            if let Some(file) = stats.candidates_file {
                println!("{}", file.display());
            }
        }

        Command::Analyze { league, input, threshold } => {
            let threshold = config.pipeline.threshold_for(league, threshold);
            analyze_file(league, &input, threshold, &config.storage.data_dir)?;
        }

        Command::Discover { league, season } => {
            let mut fetcher = HttpFetcher::new(config.scraper.resolve(league))?;
            let catalog = SeasonCatalog::new(&config.scraper.base_url, league, season)
                .context("Bad scraper.base_url")?;
            let found = catalog.discover(&mut fetcher).await;
            fetcher.close().await;
            for url in found? {
                println!("{}", url);
            }
        }

        Command::Stats { league, season } => {
            let path = config.storage.data_dir.join(league.raw_data_filename(season));
            let records = storage::latest_by_url(CheckpointStore::new(&path).load()?);
            let range = utils::date_range(&records);
            println!("─────────────────────────────────");
            println!("  {} {} — Checkpoint Stats", league, season);
            println!("─────────────────────────────────");
            println!("  File   : {}", path.display());
            println!("  Games  : {}", records.len());
            println!("  Teams  : {}", utils::teams(&records).len());
            println!("  From   : {}", range.map(|r| r.0.to_string()).unwrap_or("—".into()));
            println!("  To     : {}", range.map(|r| r.1.to_string()).unwrap_or("—".into()));
            println!("─────────────────────────────────");
        }
    }

    Ok(())
}
