use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// ── Per-game failures (recorded, never fatal) ─────────────────────────────────

#[derive(Debug, Error)]
#[error("fetch failed for {url}: {cause}")]
pub struct FetchError {
    pub url: String,
    pub cause: FetchCause,
}

#[derive(Debug, Error)]
pub enum FetchCause {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("element #{0} not present")]
    ElementMissing(String),
}

impl FetchError {
    pub fn new(url: impl Into<String>, cause: FetchCause) -> Self {
        Self { url: url.into(), cause }
    }
}

#[derive(Debug, Error)]
#[error("parse failed for {url}: {issue}")]
pub struct ParseError {
    pub url: String,
    pub issue: ParseIssue,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseIssue {
    #[error("table #{0} not found")]
    MissingTable(String),

    #[error("expected 2 team rows, found {0}")]
    MissingRows(usize),

    #[error("{side} row has no team name")]
    MissingTeam { side: &'static str },

    #[error("{side} row has no '{stat}' cell")]
    MissingCell { side: &'static str, stat: &'static str },

    #[error("{side} row '{stat}' cell is not a score: {value:?}")]
    NonNumeric {
        side: &'static str,
        stat: &'static str,
        value: String,
    },

    #[error("{side} row halftime score overflows")]
    ScoreOverflow { side: &'static str },

    #[error("no game date in URL or page metadata")]
    MissingDate,
}

/// Either half of a single game's fetch+parse cycle.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

// ── Fatal failures ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint I/O on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("checkpoint CSV on {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("checkpoint {path:?} has columns {found:?}, expected {expected:?}")]
    SchemaMismatch {
        path: PathBuf,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("checkpoint {path:?} line {line}: unreadable Game_Date {value:?}")]
    BadDate { path: PathBuf, line: u64, value: String },
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    #[error("season root page unavailable: {0}")]
    RootFetch(#[from] FetchError),

    #[error("no game URLs discovered for {league} {season}")]
    Empty { league: String, season: i32 },
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}
