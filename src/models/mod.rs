use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ── League profile ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum League {
    Nba,
    Wnba,
}

impl League {
    pub fn code(self) -> &'static str {
        match self {
            League::Nba => "NBA",
            League::Wnba => "WNBA",
        }
    }

    /// Page the season catalog is discovered from.
    pub fn season_root_path(self, season: i32) -> String {
        match self {
            League::Nba => format!("/leagues/NBA_{}_games-october.html", season),
            League::Wnba => format!("/wnba/years/{}_games.html", season),
        }
    }

    /// Element that wraps the (usually comment-hidden) line-score table.
    pub fn line_score_wrapper_id(self) -> &'static str {
        match self {
            League::Nba => "all_line_score",
            League::Wnba => "all_line-score",
        }
    }

    pub fn line_score_table_id(self) -> &'static str {
        match self {
            League::Nba => "line_score",
            League::Wnba => "line-score",
        }
    }

    pub fn default_threshold(self) -> u32 {
        match self {
            League::Nba => 20,
            League::Wnba => 11,
        }
    }

    pub fn default_page_load_timeout(self) -> Duration {
        match self {
            League::Nba => Duration::from_secs(20),
            League::Wnba => Duration::from_secs(30),
        }
    }

    pub fn default_element_wait(self) -> Duration {
        match self {
            League::Nba => Duration::from_secs(15),
            League::Wnba => Duration::from_secs(20),
        }
    }

    /// Polite delay window in milliseconds (min, max).
    pub fn default_delay_window_ms(self) -> (u64, u64) {
        match self {
            League::Nba => (2_000, 5_000),
            League::Wnba => (3_000, 7_000),
        }
    }

    /// NBA checkpoints keep their `_bball_ref` suffix so existing files resume.
    pub fn raw_data_filename(self, season: i32) -> String {
        match self {
            League::Nba => format!("nba_raw_data_{}_bball_ref.csv", season),
            League::Wnba => format!("wnba_raw_data_{}.csv", season),
        }
    }

    pub fn season_candidates_filename(self, season: i32) -> String {
        format!("{}_COMEBACK_CANDIDATES_{}.csv", self.code().to_lowercase(), season)
    }

    pub fn candidates_filename(self) -> String {
        format!("{}_COMEBACK_CANDIDATES.csv", self.code())
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ── Game record ───────────────────────────────────────────────────────────────

/// Persisted column layout of the checkpoint file, in order.
pub const GAME_RECORD_COLUMNS: [&str; 8] = [
    "Game_Date",
    "Home_Team",
    "Away_Team",
    "Halftime_Score_Home",
    "Halftime_Score_Away",
    "Final_Score_Home",
    "Final_Score_Away",
    "Game_URL",
];

/// One scraped box score. `source_url` is the identity key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameRecord {
    #[serde(rename = "Game_Date")]
    pub game_date: NaiveDate,
    #[serde(rename = "Home_Team")]
    pub home_team: String,
    #[serde(rename = "Away_Team")]
    pub away_team: String,
    #[serde(rename = "Halftime_Score_Home")]
    pub halftime_score_home: u32,
    #[serde(rename = "Halftime_Score_Away")]
    pub halftime_score_away: u32,
    #[serde(rename = "Final_Score_Home")]
    pub final_score_home: u32,
    #[serde(rename = "Final_Score_Away")]
    pub final_score_away: u32,
    #[serde(rename = "Game_URL")]
    pub source_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

impl GameRecord {
    pub fn halftime_deficit(&self) -> u32 {
        self.halftime_score_home.abs_diff(self.halftime_score_away)
    }

    /// Strictly lower halftime score trails; a tie counts the away side as trailing.
    pub fn trailing_side(&self) -> Side {
        if self.halftime_score_home < self.halftime_score_away {
            Side::Home
        } else {
            Side::Away
        }
    }

    pub fn team(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.home_team,
            Side::Away => &self.away_team,
        }
    }

    pub fn final_score(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.final_score_home,
            Side::Away => self.final_score_away,
        }
    }
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

// ── Comeback candidate ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComebackCandidate {
    pub record: GameRecord,
    pub halftime_deficit: u32,
    pub trailing_team: String,
}

/// Flat CSV shape of a candidate: record columns plus the two derived ones.
#[derive(Debug, Serialize)]
pub struct CandidateRow<'a> {
    #[serde(rename = "Game_Date")]
    pub game_date: NaiveDate,
    #[serde(rename = "Home_Team")]
    pub home_team: &'a str,
    #[serde(rename = "Away_Team")]
    pub away_team: &'a str,
    #[serde(rename = "Halftime_Score_Home")]
    pub halftime_score_home: u32,
    #[serde(rename = "Halftime_Score_Away")]
    pub halftime_score_away: u32,
    #[serde(rename = "Final_Score_Home")]
    pub final_score_home: u32,
    #[serde(rename = "Final_Score_Away")]
    pub final_score_away: u32,
    #[serde(rename = "Game_URL")]
    pub source_url: &'a str,
    #[serde(rename = "Halftime_Deficit_Amount")]
    pub halftime_deficit: u32,
    #[serde(rename = "Trailing_Team_Halftime")]
    pub trailing_team: &'a str,
}

impl<'a> From<&'a ComebackCandidate> for CandidateRow<'a> {
    fn from(c: &'a ComebackCandidate) -> Self {
        let r = &c.record;
        Self {
            game_date: r.game_date,
            home_team: &r.home_team,
            away_team: &r.away_team,
            halftime_score_home: r.halftime_score_home,
            halftime_score_away: r.halftime_score_away,
            final_score_home: r.final_score_home,
            final_score_away: r.final_score_away,
            source_url: &r.source_url,
            halftime_deficit: c.halftime_deficit,
            trailing_team: &c.trailing_team,
        }
    }
}

#[cfg(test)]
pub(crate) fn game(url: &str, halftime: (u32, u32), finals: (u32, u32)) -> GameRecord {
    GameRecord {
        game_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        home_team: "Home".to_string(),
        away_team: "Away".to_string(),
        halftime_score_home: halftime.0,
        halftime_score_away: halftime.1,
        final_score_home: finals.0,
        final_score_away: finals.1,
        source_url: url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deficit_and_trailing_home() {
        let g = game("a", (30, 50), (95, 90));
        assert_eq!(g.halftime_deficit(), 20);
        assert_eq!(g.trailing_side(), Side::Home);
        assert_eq!(g.team(g.trailing_side()), "Home");
    }

    #[test]
    fn tie_trails_away() {
        let g = game("a", (40, 40), (100, 80));
        assert_eq!(g.halftime_deficit(), 0);
        assert_eq!(g.trailing_side(), Side::Away);
    }

    #[test]
    fn filenames_follow_league() {
        assert_eq!(League::Nba.raw_data_filename(2025), "nba_raw_data_2025_bball_ref.csv");
        assert_eq!(League::Wnba.raw_data_filename(2023), "wnba_raw_data_2023.csv");
        assert_eq!(
            League::Wnba.season_candidates_filename(2023),
            "wnba_COMEBACK_CANDIDATES_2023.csv"
        );
        assert_eq!(League::Wnba.candidates_filename(), "WNBA_COMEBACK_CANDIDATES.csv");
    }
}
