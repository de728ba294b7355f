//! Checkpoint file: the full scraped dataset as one CSV snapshot.
//!
//! Every save rewrites the whole file through a temp file + rename, so the
//! checkpoint on disk is always a complete, loadable snapshot.

use crate::error::CheckpointError;
use crate::models::{CandidateRow, ComebackCandidate, GAME_RECORD_COLUMNS, GameRecord};
use crate::scraper::cleaner::{date_from_url, parse_date};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// ── Checkpoint store ──────────────────────────────────────────────────────────

pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load every persisted record. A missing file is an empty dataset.
    ///
    /// `Game_Date` may be ISO, or the human-readable page date older files
    /// carry ("7:30 PM, October 24, 2023"); the URL date token wins over the
    /// latter. Records are saved back as ISO.
    pub fn load(&self) -> Result<Vec<GameRecord>, CheckpointError> {
        if !self.path.exists() {
            debug!("No checkpoint at {:?}", self.path);
            return Ok(Vec::new());
        }

        let csv_err = |source| CheckpointError::Csv { path: self.path.clone(), source };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .map_err(csv_err)?;

        let found: Vec<String> = reader.headers().map_err(csv_err)?.iter().map(str::to_string).collect();
        if found != GAME_RECORD_COLUMNS {
            return Err(CheckpointError::SchemaMismatch {
                path: self.path.clone(),
                expected: GAME_RECORD_COLUMNS.iter().map(|c| c.to_string()).collect(),
                found,
            });
        }

        let headers = reader.headers().map_err(csv_err)?.clone();
        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(csv_err)?;
            let stored: StoredRow = row.deserialize(Some(&headers)).map_err(csv_err)?;
            let line = row.position().map_or(0, |p| p.line());
            records.push(stored.into_record().map_err(|value| CheckpointError::BadDate {
                path: self.path.clone(),
                line,
                value,
            })?);
        }

        info!("Loaded {} games from {:?}", records.len(), self.path);
        Ok(records)
    }

    /// Overwrite the checkpoint with `records`.
    pub fn save(&self, records: &[GameRecord]) -> Result<(), CheckpointError> {
        write_csv(&self.path, records.iter())?;
        debug!("Checkpoint saved: {} games → {:?}", records.len(), self.path);
        Ok(())
    }
}

/// A checkpoint row before its date is resolved.
#[derive(Deserialize)]
struct StoredRow {
    #[serde(rename = "Game_Date")]
    game_date: String,
    #[serde(rename = "Home_Team")]
    home_team: String,
    #[serde(rename = "Away_Team")]
    away_team: String,
    #[serde(rename = "Halftime_Score_Home")]
    halftime_score_home: u32,
    #[serde(rename = "Halftime_Score_Away")]
    halftime_score_away: u32,
    #[serde(rename = "Final_Score_Home")]
    final_score_home: u32,
    #[serde(rename = "Final_Score_Away")]
    final_score_away: u32,
    #[serde(rename = "Game_URL")]
    source_url: String,
}

impl StoredRow {
    /// Err carries the unreadable date text.
    fn into_record(self) -> Result<GameRecord, String> {
        let raw = self.game_date.trim();
        let game_date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| date_from_url(&self.source_url))
            .or_else(|| parse_date(raw))
            .ok_or_else(|| self.game_date.clone())?;

        Ok(GameRecord {
            game_date,
            home_team: self.home_team,
            away_team: self.away_team,
            halftime_score_home: self.halftime_score_home,
            halftime_score_away: self.halftime_score_away,
            final_score_home: self.final_score_home,
            final_score_away: self.final_score_away,
            source_url: self.source_url,
        })
    }
}

/// Keep the last occurrence of each URL, at that occurrence's position.
pub fn latest_by_url(records: Vec<GameRecord>) -> Vec<GameRecord> {
    let last: HashMap<&str, usize> = records
        .iter()
        .enumerate()
        .map(|(i, r)| (r.source_url.as_str(), i))
        .collect();
    let keep: Vec<bool> = records
        .iter()
        .enumerate()
        .map(|(i, r)| last[r.source_url.as_str()] == i)
        .collect();

    records
        .into_iter()
        .zip(keep)
        .filter_map(|(r, k)| k.then_some(r))
        .collect()
}

// ── Candidate export ──────────────────────────────────────────────────────────

/// Write candidates to `path`. Nothing is written for an empty list.
pub fn write_candidates(path: &Path, candidates: &[ComebackCandidate]) -> Result<bool, CheckpointError> {
    if candidates.is_empty() {
        return Ok(false);
    }
    write_csv(path, candidates.iter().map(CandidateRow::from))?;
    Ok(true)
}

fn write_csv<T, I>(path: &Path, rows: I) -> Result<(), CheckpointError>
where
    T: serde::Serialize,
    I: IntoIterator<Item = T>,
{
    let io_err = |source| CheckpointError::Io { path: path.to_path_buf(), source };
    let csv_err = |source| CheckpointError::Csv { path: path.to_path_buf(), source };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let tmp = tmp_path(path);
    let mut writer = csv::Writer::from_path(&tmp).map_err(csv_err)?;
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush().map_err(io_err)?;
    drop(writer);

    fs::rename(&tmp, path).map_err(io_err)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
