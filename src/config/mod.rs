use crate::models::League;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Scraper configuration. Unset timings fall back to the league profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub page_load_timeout_secs: Option<u64>,

    #[serde(default)]
    pub element_wait_secs: Option<u64>,

    #[serde(default)]
    pub delay_min_ms: Option<u64>,

    #[serde(default)]
    pub delay_max_ms: Option<u64>,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default = "default_save_every")]
    pub save_every: usize,

    #[serde(default)]
    pub threshold: Option<u32>,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "https://www.basketball-reference.com".to_string()
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
        .to_string()
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_save_every() -> usize {
    5
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            page_load_timeout_secs: None,
            element_wait_secs: None,
            delay_min_ms: None,
            delay_max_ms: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: default_data_dir() }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            save_every: default_save_every(),
            threshold: None,
        }
    }
}

// ── Resolved per-league settings ─────────────────────────────────────────────

/// Fetch settings after applying league defaults.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub user_agent: String,
    pub page_load_timeout: Duration,
    pub element_wait: Duration,
    pub delay_min: Duration,
    pub delay_max: Duration,
}

impl ScraperConfig {
    pub fn resolve(&self, league: League) -> FetchSettings {
        let (min_ms, max_ms) = league.default_delay_window_ms();
        let min_ms = self.delay_min_ms.unwrap_or(min_ms);
        let max_ms = self.delay_max_ms.unwrap_or(max_ms);
        let (min_ms, max_ms) = if min_ms > max_ms { (max_ms, min_ms) } else { (min_ms, max_ms) };

        FetchSettings {
            user_agent: self.user_agent.clone(),
            page_load_timeout: self
                .page_load_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or_else(|| league.default_page_load_timeout()),
            element_wait: self
                .element_wait_secs
                .map(Duration::from_secs)
                .unwrap_or_else(|| league.default_element_wait()),
            delay_min: Duration::from_millis(min_ms),
            delay_max: Duration::from_millis(max_ms),
        }
    }
}

impl PipelineConfig {
    /// CLI flag wins, then config, then the league default.
    pub fn threshold_for(&self, league: League, cli: Option<u32>) -> u32 {
        cli.or(self.threshold).unwrap_or_else(|| league.default_threshold())
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("COMEBACK").separator("__"))
            .build()
            .context("Failed to read configuration sources")?;

        cfg.try_deserialize().context("Invalid configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn league_defaults_fill_unset_timings() {
        let s = ScraperConfig::default().resolve(League::Wnba);
        assert_eq!(s.page_load_timeout, Duration::from_secs(30));
        assert_eq!(s.element_wait, Duration::from_secs(20));
        assert_eq!(s.delay_min, Duration::from_millis(3_000));
        assert_eq!(s.delay_max, Duration::from_millis(7_000));
    }

    #[test]
    fn inverted_delay_window_is_swapped() {
        let cfg = ScraperConfig {
            delay_min_ms: Some(900),
            delay_max_ms: Some(100),
            ..ScraperConfig::default()
        };
        let s = cfg.resolve(League::Nba);
        assert_eq!(s.delay_min, Duration::from_millis(100));
        assert_eq!(s.delay_max, Duration::from_millis(900));
    }

    #[test]
    fn threshold_precedence() {
        let mut p = PipelineConfig::default();
        assert_eq!(p.threshold_for(League::Nba, None), 20);
        p.threshold = Some(15);
        assert_eq!(p.threshold_for(League::Nba, None), 15);
        assert_eq!(p.threshold_for(League::Nba, Some(8)), 8);
    }
}
