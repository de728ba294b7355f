use crate::error::{ParseError, ParseIssue};
use crate::models::GameRecord;
use crate::scraper::cleaner::{date_from_url, parse_date, parse_score, strip_comment_markers};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

fn selector(css: &str) -> Selector {
    // Only called with the static selectors below.
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e:?}"))
}

// ── Season index pages ────────────────────────────────────────────────────────

/// Month sub-pages linked from a season index (`..._games-<month>.html`).
pub fn extract_month_links(html: &str, base: &Url) -> Vec<String> {
    extract_links(html, base, "a[href*=\"_games-\"]")
}

/// Per-game box-score links from a schedule page.
pub fn extract_game_links(html: &str, base: &Url) -> Vec<String> {
    extract_links(html, base, "td[data-stat='box_score_text'] a")
}

fn extract_links(html: &str, base: &Url, css: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let sel = selector(css);

    doc.select(&sel)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| match base.join(href) {
            Ok(u) => Some(u.to_string()),
            Err(e) => {
                debug!("Skipping unresolvable href {:?}: {}", href, e);
                None
            }
        })
        .collect()
}

// ── Box score page ────────────────────────────────────────────────────────────

/// Extract one game from the line-score fragment plus the full page.
///
/// The fragment is the inner HTML of the line-score wrapper and may hide the
/// table inside an HTML comment. Row order is fixed by the site: away first,
/// home second. Final scores are the page's own total column, which already
/// includes overtime periods that have no quarter cell.
pub fn parse_box_score(
    url: &str,
    fragment_html: &str,
    page_html: &str,
    table_id: &str,
) -> Result<GameRecord, ParseError> {
    let fail = |issue: ParseIssue| ParseError { url: url.to_string(), issue };

    let fragment = Html::parse_fragment(&strip_comment_markers(fragment_html));
    let table_sel = Selector::parse(&format!("table[id='{}']", table_id))
        .map_err(|_| fail(ParseIssue::MissingTable(table_id.to_string())))?;
    let table = fragment
        .select(&table_sel)
        .next()
        .ok_or_else(|| fail(ParseIssue::MissingTable(table_id.to_string())))?;

    let rows: Vec<ElementRef> = table.select(&selector("tbody tr")).collect();
    if rows.len() < 2 {
        return Err(fail(ParseIssue::MissingRows(rows.len())));
    }

    let away = read_row(rows[0], "away").map_err(fail)?;
    let home = read_row(rows[1], "home").map_err(fail)?;
    let halftime_score_away = away.halftime().map_err(fail)?;
    let halftime_score_home = home.halftime().map_err(fail)?;

    let game_date = date_from_url(url)
        .or_else(|| date_from_page(page_html))
        .ok_or_else(|| fail(ParseIssue::MissingDate))?;

    Ok(GameRecord {
        game_date,
        home_team: home.team,
        away_team: away.team,
        halftime_score_home,
        halftime_score_away,
        final_score_home: home.total,
        final_score_away: away.total,
        source_url: url.to_string(),
    })
}

struct TeamLine {
    side: &'static str,
    team: String,
    q1: u32,
    q2: u32,
    total: u32,
}

impl TeamLine {
    fn halftime(&self) -> Result<u32, ParseIssue> {
        self.q1
            .checked_add(self.q2)
            .ok_or(ParseIssue::ScoreOverflow { side: self.side })
    }
}

fn read_row(row: ElementRef, side: &'static str) -> Result<TeamLine, ParseIssue> {
    let team = row
        .select(&selector("th a"))
        .next()
        .map(|a| a.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(ParseIssue::MissingTeam { side })?;

    Ok(TeamLine {
        side,
        team,
        q1: read_cell(row, side, "1")?,
        q2: read_cell(row, side, "2")?,
        total: read_cell(row, side, "T")?,
    })
}

fn read_cell(row: ElementRef, side: &'static str, stat: &'static str) -> Result<u32, ParseIssue> {
    let sel = selector(&format!("td[data-stat='{}']", stat));
    let cell = row
        .select(&sel)
        .next()
        .ok_or(ParseIssue::MissingCell { side, stat })?;
    let text = cell.text().collect::<String>();

    parse_score(&text).ok_or_else(|| ParseIssue::NonNumeric {
        side,
        stat,
        value: text.trim().to_string(),
    })
}

/// Metadata date: scorebox line first, then the page heading.
fn date_from_page(page_html: &str) -> Option<chrono::NaiveDate> {
    let doc = Html::parse_document(page_html);
    [".scorebox_meta div", "h1"].iter().find_map(|css| {
        doc.select(&selector(css))
            .next()
            .and_then(|el| parse_date(&el.text().collect::<String>()))
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use chrono::NaiveDate;

    const NBA_URL: &str = "https://www.basketball-reference.com/boxscores/202310240DEN.html";

    #[test]
    fn parses_commented_line_score() {
        let frag = line_score_fragment("line_score", ("Los Angeles Lakers", "21", "30", "107"), ("Denver Nuggets", "29", "30", "119"));
        let rec = parse_box_score(NBA_URL, &frag, "", "line_score").unwrap();

        assert_eq!(rec.away_team, "Los Angeles Lakers");
        assert_eq!(rec.home_team, "Denver Nuggets");
        assert_eq!(rec.halftime_score_away, 51);
        assert_eq!(rec.halftime_score_home, 59);
        assert_eq!(rec.final_score_away, 107);
        assert_eq!(rec.final_score_home, 119);
        assert_eq!(rec.game_date, NaiveDate::from_ymd_opt(2023, 10, 24).unwrap());
        assert_eq!(rec.source_url, NBA_URL);
    }

    #[test]
    fn final_score_is_total_cell_not_sum() {
        // Quarter cells sum to 110 / 100 but an unitemized overtime lifts the totals.
        let frag = line_score_fragment("line_score", ("A", "25", "25", "118"), ("H", "25", "25", "121"));
        let rec = parse_box_score(NBA_URL, &frag, "", "line_score").unwrap();
        assert_eq!(rec.final_score_home, 121);
        assert_eq!(rec.final_score_away, 118);
    }

    #[test]
    fn uncommented_table_also_parses() {
        let frag = line_score_fragment("line-score", ("Sky", "20", "18", "80"), ("Aces", "22", "25", "90"))
            .replace("<!--", "")
            .replace("-->", "");
        let url = "https://www.basketball-reference.com/wnba/boxscores/202305190LVA.html";
        let rec = parse_box_score(url, &frag, "", "line-score").unwrap();
        assert_eq!(rec.halftime_score_home, 47);
        assert_eq!(rec.halftime_score_away, 38);
    }

    #[test]
    fn date_falls_back_to_page_metadata() {
        let frag = line_score_fragment("line_score", ("A", "1", "2", "3"), ("H", "4", "5", "9"));
        let page = page("all_line_score", &frag, "7:30 PM, October 24, 2023");
        let rec = parse_box_score("https://example.com/game/42", &frag, &page, "line_score").unwrap();
        assert_eq!(rec.game_date, NaiveDate::from_ymd_opt(2023, 10, 24).unwrap());
    }

    #[test]
    fn non_numeric_cell_is_parse_failure() {
        let frag = line_score_fragment("line_score", ("A", "2x", "30", "107"), ("H", "29", "30", "119"));
        let err = parse_box_score(NBA_URL, &frag, "", "line_score").unwrap_err();
        assert_eq!(err.url, NBA_URL);
        assert_eq!(
            err.issue,
            ParseIssue::NonNumeric { side: "away", stat: "1", value: "2x".to_string() }
        );
    }

    #[test]
    fn oversized_quarter_cell_is_parse_failure() {
        let frag = line_score_fragment("line_score", ("A", "4294967295", "1", "3"), ("H", "4", "5", "9"));
        let err = parse_box_score(NBA_URL, &frag, "", "line_score").unwrap_err();
        assert_eq!(err.issue, ParseIssue::ScoreOverflow { side: "away" });
    }

    #[test]
    fn missing_table_and_date() {
        let err = parse_box_score(NBA_URL, "<div>nothing here</div>", "", "line_score").unwrap_err();
        assert_eq!(err.issue, ParseIssue::MissingTable("line_score".to_string()));

        let frag = line_score_fragment("line_score", ("A", "1", "2", "3"), ("H", "4", "5", "9"));
        let err = parse_box_score("https://example.com/game/42", &frag, "<html></html>", "line_score").unwrap_err();
        assert_eq!(err.issue, ParseIssue::MissingDate);
    }

    #[test]
    fn extracts_links_against_base() {
        let base = Url::parse("https://www.basketball-reference.com").unwrap();
        let html = r#"<div class="filter">
            <a href="/leagues/NBA_2025_games-october.html">October</a>
            <a href="/leagues/NBA_2025_games-november.html">November</a>
            <a href="/leagues/NBA_2025.html">Season</a></div>
            <table><tr><td data-stat="box_score_text"><a href="/boxscores/202410220BOS.html">Box Score</a></td>
            <td data-stat="notes"><a href="/boxscores/ignored.html">x</a></td></tr></table>"#;

        assert_eq!(
            extract_month_links(html, &base),
            vec![
                "https://www.basketball-reference.com/leagues/NBA_2025_games-october.html",
                "https://www.basketball-reference.com/leagues/NBA_2025_games-november.html",
            ]
        );
        assert_eq!(
            extract_game_links(html, &base),
            vec!["https://www.basketball-reference.com/boxscores/202410220BOS.html"]
        );
    }
}
