use chrono::NaiveDate;

// ── Cell values ───────────────────────────────────────────────────────────────

/// Parse a line-score cell. "  27 " → 27 | "" / "—" / "2a" → None
pub fn parse_score(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Drop HTML comment markers so commented-out markup parses as live nodes.
pub fn strip_comment_markers(html: &str) -> String {
    html.replace("<!--", "").replace("-->", "")
}

// ── Dates ─────────────────────────────────────────────────────────────────────

/// Date token embedded in a box-score file name.
/// ".../boxscores/202310240DEN.html" → 2023-10-24
pub fn date_from_url(url: &str) -> Option<NaiveDate> {
    let file = url.rsplit('/').next()?;
    let stem = file.strip_suffix(".html")?;
    if stem.len() < 12 || !stem.is_ascii() {
        return None;
    }

    let (digits, team) = stem.split_at(stem.len() - 3);
    if !team.chars().all(|c| c.is_ascii_uppercase()) {
        return None;
    }
    // YYYYMMDD followed by at least one game-number digit
    if digits.len() < 9 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    NaiveDate::parse_from_str(&digits[..8], "%Y%m%d").ok()
}

/// Parse human-readable page dates.
/// "7:30 PM, October 24, 2023" | "Aces vs Sky Box Score, May 19, 2023" | "Oct 24, 2023"
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() < 2 {
        return None;
    }

    let candidate = format!("{}, {}", parts[parts.len() - 2], parts[parts.len() - 1]);
    // Titles like "... Box Score May 19" keep only the trailing month/day words.
    let words: Vec<&str> = parts[parts.len() - 2].split_whitespace().collect();
    let tail = if words.len() >= 2 {
        Some(format!("{} {}, {}", words[words.len() - 2], words[words.len() - 1], parts[parts.len() - 1]))
    } else {
        None
    };

    for text in std::iter::once(candidate).chain(tail) {
        if let Ok(d) = NaiveDate::parse_from_str(&text, "%B %d, %Y") {
            return Some(d);
        }
        if let Ok(d) = NaiveDate::parse_from_str(&text, "%b %d, %Y") {
            return Some(d);
        }
    }

    None
}

// ── Tests ─────────────────────────────────────────────────────────────────────
