//! Season URL catalog: every box-score page of one league season.
//!
//! The season root page either links to per-month schedule pages or, for
//! seasons short enough to fit on one page, carries the schedule itself.

use crate::error::DiscoveryError;
use crate::models::League;
use crate::scraper::PageFetcher;
use crate::scraper::parsers::{extract_game_links, extract_month_links};
use std::collections::BTreeSet;
use tracing::{info, warn};
use url::Url;

pub struct SeasonCatalog {
    base: Url,
    league: League,
    season: i32,
}

impl SeasonCatalog {
    pub fn new(base_url: &str, league: League, season: i32) -> Result<Self, DiscoveryError> {
        Ok(Self {
            base: Url::parse(base_url)?,
            league,
            season,
        })
    }

    pub fn root_url(&self) -> Result<Url, DiscoveryError> {
        Ok(self.base.join(&self.league.season_root_path(self.season))?)
    }

    /// Discover all game URLs, sorted and duplicate-free.
    ///
    /// A month page that fails to load is logged and skipped; an unreachable
    /// root page or an empty result is fatal.
    pub async fn discover<F>(&self, fetcher: &mut F) -> Result<Vec<String>, DiscoveryError>
    where
        F: PageFetcher + ?Sized,
    {
        let root = self.root_url()?.to_string();
        info!("Pulling all game URLs for {} {} from {}", self.league, self.season, root);

        let root_html = fetcher.fetch_page(&root).await?;

        let mut month_pages: BTreeSet<String> = extract_month_links(&root_html, &self.base).into_iter().collect();
        if month_pages.is_empty() {
            month_pages.insert(root.clone());
        }
        info!("Found {} page(s) to check for game links", month_pages.len());

        let mut games = BTreeSet::new();
        for page in &month_pages {
            let html = if *page == root {
                root_html.clone()
            } else {
                match fetcher.fetch_page(page).await {
                    Ok(html) => html,
                    Err(e) => {
                        warn!("Could not load month page {}: {}", page, e);
                        continue;
                    }
                }
            };

            let found = extract_game_links(&html, &self.base);
            info!("  {}: {} game links", page, found.len());
            games.extend(found);
        }

        if games.is_empty() {
            return Err(DiscoveryError::Empty {
                league: self.league.to_string(),
                season: self.season,
            });
        }

        info!("Discovered {} unique game URLs", games.len());
        Ok(games.into_iter().collect())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Schedule page with box-score links for the given paths.
    pub fn schedule(month_links: &[&str], game_paths: &[&str]) -> String {
        let months: String = month_links
            .iter()
            .map(|m| format!(r#"<a href="{m}">month</a>"#))
            .collect();
        let rows: String = game_paths
            .iter()
            .map(|g| format!(r#"<tr><td data-stat="box_score_text"><a href="{g}">Box Score</a></td></tr>"#))
            .collect();
        format!("<html><body><div class=\"filter\">{months}</div><table><tbody>{rows}</tbody></table></body></html>")
    }
}
