//! Pipeline orchestrator: ties discovery → scraping → checkpoint → filter together.
//!
//! ## Stages
//!
//! `ScrapeDriver::run()` — ingestion:
//!   1. Reload the checkpoint and rediscover the season's game URLs
//!   2. Fetch + parse only URLs not already in the checkpoint
//!   3. Rewrite the checkpoint every `save_every` processed URLs, and once more at the end
//!   Failed URLs are reported, never persisted, so the next run retries them.
//!
//! `Pipeline::run()` — ingestion followed by the comeback filter over the
//!   deduplicated checkpoint snapshot.

use crate::analysis::{find_comebacks, render_table};
use crate::config::AppConfig;
use crate::error::{GameError, ScrapeError};
use crate::models::{GameRecord, League};
use crate::scraper::parsers::parse_box_score;
use crate::scraper::{HttpFetcher, PageFetcher, SeasonCatalog};
use crate::storage::{CheckpointStore, latest_by_url, write_candidates};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

// ── Scrape driver ─────────────────────────────────────────────────────────────

/// Owns the fetch session for one league season and is the checkpoint's only writer.
pub struct ScrapeDriver<F: PageFetcher> {
    fetcher: F,
    catalog: SeasonCatalog,
    store: CheckpointStore,
    league: League,
    element_wait: Duration,
    save_every: usize,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub discovered: usize,
    pub already_scraped: usize,
    pub attempted: usize,
    pub scraped: usize,
    pub failed_urls: Vec<String>,
    pub total_records: usize,
    pub interrupted: bool,
}

impl<F: PageFetcher> ScrapeDriver<F> {
    pub fn new(
        fetcher: F,
        catalog: SeasonCatalog,
        store: CheckpointStore,
        league: League,
        element_wait: Duration,
        save_every: usize,
    ) -> Self {
        Self {
            fetcher,
            catalog,
            store,
            league,
            element_wait,
            save_every: save_every.max(1),
        }
    }

    pub async fn run(self) -> Result<RunSummary, ScrapeError> {
        self.run_until(std::future::pending::<()>()).await
    }

    /// Run until done or until `shutdown` resolves. The fetch session is
    /// closed on every exit path.
    pub async fn run_until<S>(mut self, shutdown: S) -> Result<RunSummary, ScrapeError>
    where
        S: Future<Output = ()>,
    {
        let result = self.drive(shutdown).await;
        self.fetcher.close().await;
        result
    }

    async fn drive<S>(&mut self, shutdown: S) -> Result<RunSummary, ScrapeError>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut summary = RunSummary::default();

        let mut records = self.store.load()?;
        if !records.is_empty() {
            info!("Found existing data file {:?}. Resuming scrape.", self.store.path());
        }

        let discovered = tokio::select! {
            biased;
            _ = &mut shutdown => None,
            urls = self.catalog.discover(&mut self.fetcher) => Some(urls?),
        };

        match discovered {
            None => summary.interrupted = true,
            Some(urls) => {
                summary.discovered = urls.len();
                let seen: HashSet<&str> = records.iter().map(|r| r.source_url.as_str()).collect();
                let pending: Vec<String> = urls.into_iter().filter(|u| !seen.contains(u.as_str())).collect();
                summary.already_scraped = summary.discovered - pending.len();

                if pending.is_empty() {
                    info!("All discovered games have already been scraped.");
                } else {
                    info!("Starting scrape for {} remaining games.", pending.len());
                    self.scrape_pending(&pending, &mut records, &mut summary, shutdown.as_mut())
                        .await?;
                }
            }
        }

        if summary.interrupted {
            warn!("Interrupted; saving what has been scraped so far.");
        }
        if !records.is_empty() {
            self.store.save(&records)?;
            info!("Performing final save ({} games).", records.len());
        }

        summary.total_records = records.len();
        Ok(summary)
    }

    async fn scrape_pending<S>(
        &mut self,
        pending: &[String],
        records: &mut Vec<GameRecord>,
        summary: &mut RunSummary,
        mut shutdown: std::pin::Pin<&mut S>,
    ) -> Result<(), ScrapeError>
    where
        S: Future<Output = ()>,
    {
        for (i, url) in pending.iter().enumerate() {
            info!("Scraping game {}/{}: {}", records.len() + 1, summary.discovered, url);

            let outcome = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    summary.interrupted = true;
                    break;
                }
                outcome = self.scrape_game(url) => outcome,
            };

            summary.attempted += 1;
            match outcome {
                Ok(record) => {
                    records.push(record);
                    summary.scraped += 1;
                }
                Err(e) => {
                    warn!("FAILED on {}. Will be skipped. {}", url, e);
                    summary.failed_urls.push(url.clone());
                }
            }

            if (i + 1) % self.save_every == 0 && !records.is_empty() {
                self.store.save(records)?;
                info!("Saving progress ({} games).", records.len());
            }
        }
        Ok(())
    }

    async fn scrape_game(&mut self, url: &str) -> Result<GameRecord, GameError> {
        let page = self
            .fetcher
            .fetch_with_element(url, self.league.line_score_wrapper_id(), self.element_wait)
            .await?;
        Ok(parse_box_score(
            url,
            &page.element_html,
            &page.html,
            self.league.line_score_table_id(),
        )?)
    }
}

// ── Pipeline ──────────────────────────────────────────────────────────────────

pub struct Pipeline {
    config: AppConfig,
    league: League,
    season: i32,
    threshold: u32,
}

#[derive(Debug)]
pub struct PipelineStats {
    pub run: RunSummary,
    pub dataset_games: usize,
    pub candidates: usize,
    pub candidates_file: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(config: AppConfig, league: League, season: i32, threshold: Option<u32>) -> Self {
        let threshold = config.pipeline.threshold_for(league, threshold);
        Self { config, league, season, threshold }
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.config.storage.data_dir.join(self.league.raw_data_filename(self.season))
    }

    /// Scrape with Ctrl-C handling, then filter the finished dataset.
    pub async fn run(&self) -> Result<PipelineStats> {
        let settings = self.config.scraper.resolve(self.league);
        let element_wait = settings.element_wait;
        let fetcher = HttpFetcher::new(settings)?;
        let catalog = SeasonCatalog::new(&self.config.scraper.base_url, self.league, self.season)
            .context("Bad scraper.base_url")?;
        let store = CheckpointStore::new(self.checkpoint_path());

        info!("=== {} {}: discovery + scrape ===", self.league, self.season);
        let driver = ScrapeDriver::new(
            fetcher,
            catalog,
            store,
            self.league,
            element_wait,
            self.config.pipeline.save_every,
        );
        let run = driver
            .run_until(async {
                if tokio::signal::ctrl_c().await.is_err() {
                    std::future::pending::<()>().await;
                }
            })
            .await
            .context("Scrape run failed")?;

        report_failures(&run);

        let mut stats = PipelineStats {
            run,
            dataset_games: 0,
            candidates: 0,
            candidates_file: None,
        };
        if stats.run.interrupted {
            return Ok(stats);
        }

        info!("=== {} {}: comeback filter (threshold {}) ===", self.league, self.season, self.threshold);
        let dataset = latest_by_url(CheckpointStore::new(self.checkpoint_path()).load()?);
        stats.dataset_games = dataset.len();
        if dataset.is_empty() {
            info!("No data was scraped.");
            return Ok(stats);
        }
        info!("Final dataset has {} games.", dataset.len());

        let candidates = find_comebacks(&dataset, self.threshold);
        stats.candidates = candidates.len();
        let out = self
            .config
            .storage
            .data_dir
            .join(self.league.season_candidates_filename(self.season));
        if write_candidates(&out, &candidates)? {
            info!("SUCCESS! Found {} comeback candidates → {:?}", candidates.len(), out);
            stats.candidates_file = Some(out);
        } else {
            info!("COMPLETE. No games found that met the {}-point threshold.", self.threshold);
        }

        Ok(stats)
    }
}

fn report_failures(run: &RunSummary) {
    if run.failed_urls.is_empty() {
        return;
    }
    warn!("{} games failed to scrape and were skipped.", run.failed_urls.len());
    for url in &run.failed_urls {
        warn!("  failed: {}", url);
    }
}

// ── Filter-only tool ──────────────────────────────────────────────────────────

/// Filter an existing raw-data file. A missing input file is a logged no-op.
pub fn analyze_file(league: League, input: &Path, threshold: u32, out_dir: &Path) -> Result<Option<PathBuf>> {
    info!("--- Analyzing {} data ---", league);

    let store = CheckpointStore::new(input);
    if !store.exists() {
        warn!("Cannot find the data file {:?}; nothing to analyze.", input);
        return Ok(None);
    }

    let dataset = latest_by_url(store.load().with_context(|| format!("Failed to read {:?}", input))?);
    info!("Read {} games from {:?}.", dataset.len(), input);

    let candidates = find_comebacks(&dataset, threshold);
    let out = out_dir.join(league.candidates_filename());
    if !write_candidates(&out, &candidates)? {
        info!("COMPLETE. No {} games met the {}-point threshold for a comeback win.", league, threshold);
        return Ok(None);
    }

    info!("SUCCESS! Found {} comeback candidates for the {}. Saved to {:?}", candidates.len(), league, out);
    info!("\n{}", render_table(&candidates));
    Ok(Some(out))
}
