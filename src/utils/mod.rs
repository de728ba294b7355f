use crate::models::GameRecord;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::info;

/// Logs how long a command took when dropped.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!("Starting: {}", label);
        Self { label, start: Instant::now() }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let secs = self.start.elapsed().as_secs();
        info!("Finished: {} in {}m{:02}s", self.label, secs / 60, secs % 60);
    }
}

/// Earliest and latest game date in a dataset.
pub fn date_range(records: &[GameRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let min = records.iter().map(|r| r.game_date).min()?;
    let max = records.iter().map(|r| r.game_date).max()?;
    Some((min, max))
}

/// Distinct team names, sorted.
pub fn teams(records: &[GameRecord]) -> BTreeSet<&str> {
    records
        .iter()
        .flat_map(|r| [r.home_team.as_str(), r.away_team.as_str()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::game;

    #[test]
    fn test_date_range() {
        assert_eq!(date_range(&[]), None);

        let mut late = game("b", (1, 1), (1, 1));
        late.game_date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let early = game("a", (1, 1), (1, 1));
        assert_eq!(
            date_range(&[late, early.clone()]),
            Some((early.game_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()))
        );
    }

    #[test]
    fn test_teams() {
        let mut g = game("a", (1, 1), (1, 1));
        g.away_team = "Zeta".into();
        let games = [g, game("b", (1, 1), (1, 1))];
        let set = teams(&games);
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["Away", "Home", "Zeta"]);
    }
}
