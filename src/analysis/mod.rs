//! Comeback filter over a finished dataset.

use crate::models::{ComebackCandidate, GameRecord};

/// Games where the halftime-trailing team, down by at least `threshold`,
/// won outright. Sorted by deficit, largest first; equal deficits keep
/// their dataset order. An empty result means nothing qualified.
pub fn find_comebacks(records: &[GameRecord], threshold: u32) -> Vec<ComebackCandidate> {
    let mut candidates: Vec<ComebackCandidate> = records
        .iter()
        .filter(|r| r.halftime_deficit() >= threshold)
        .filter(|r| {
            let trailing = r.trailing_side();
            r.final_score(trailing) > r.final_score(trailing.opponent())
        })
        .map(|r| ComebackCandidate {
            record: r.clone(),
            halftime_deficit: r.halftime_deficit(),
            trailing_team: r.team(r.trailing_side()).to_string(),
        })
        .collect();

    candidates.sort_by(|a, b| b.halftime_deficit.cmp(&a.halftime_deficit));
    candidates
}

/// Console table of candidates, one line per game.
pub fn render_table(candidates: &[ComebackCandidate]) -> String {
    let mut out = format!(
        "{:<10}  {:<24} {:<24} {:>7} {:>7}  {:<24} {:>7}\n",
        "Date", "Home", "Away", "HT", "Final", "Trailing", "Deficit"
    );
    for c in candidates {
        let r = &c.record;
        out.push_str(&format!(
            "{:<10}  {:<24} {:<24} {:>7} {:>7}  {:<24} {:>7}\n",
            r.game_date,
            r.home_team,
            r.away_team,
            format!("{}-{}", r.halftime_score_home, r.halftime_score_away),
            format!("{}-{}", r.final_score_home, r.final_score_away),
            c.trailing_team,
            c.halftime_deficit,
        ));
    }
    out
}
