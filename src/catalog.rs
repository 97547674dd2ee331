//! Paginated discovery of open sports markets.

use crate::clients::ExchangeClient;
use crate::event::{ApiEvent, Market, MarketEvent, Sport};
use regex::{Regex, RegexBuilder};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Ticker-group prefix → league. First matching prefix wins.
const SERIES_PREFIXES: &[(&str, Sport)] = &[
    ("KXNBAGAME", Sport::Nba),
    ("KXNCAAMBGAME", Sport::Ncaab),
    ("KXNCAABGAME", Sport::Ncaab),
    ("KXNFLGAME", Sport::Nfl),
    ("KXNHLGAME", Sport::Nhl),
    ("KXSHLGAME", Sport::Nhl),
    ("KXMLBGAME", Sport::Mlb),
    ("KXNCAAFGAME", Sport::Ncaaf),
    ("KXUNRIVALEDGAME", Sport::Nba),
    ("KXNCAAMBSPREAD", Sport::Ncaab),
    ("KXNBASPREAD", Sport::Nba),
    ("KXNFLSPREAD", Sport::Nfl),
    ("KXNHLSPREAD", Sport::Nhl),
    ("KXNCAAMBTOTAL", Sport::Ncaab),
    ("KXNBATOTAL", Sport::Nba),
    ("KXNFLTOTAL", Sport::Nfl),
    ("KXNHLTOTAL", Sport::Nhl),
    ("KXNCAABBGAME", Sport::Ncaab),
    ("KXNCAABASEBALL", Sport::Ncaab),
    ("KXCBGAME", Sport::Ncaab),
];

pub const DEFAULT_EXCLUDED_LEAGUES: &str = "NCAAWB|WNBA|WCBB|WOMEN";

pub fn sport_for_event_ticker(event_ticker: &str) -> Option<Sport> {
    let upper = event_ticker.to_uppercase();
    SERIES_PREFIXES
        .iter()
        .find(|(prefix, _)| upper.starts_with(prefix))
        .map(|(_, sport)| sport.clone())
}

/// Leagues deliberately left out of the catalog, matched case-insensitively
/// against the event ticker. An empty pattern excludes nothing.
#[derive(Debug, Clone)]
pub struct LeagueExclusionFilter {
    pattern: Option<Regex>,
}

impl LeagueExclusionFilter {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        if pattern.trim().is_empty() {
            return Ok(Self::none());
        }
        let re = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self { pattern: Some(re) })
    }

    pub fn none() -> Self {
        Self { pattern: None }
    }

    pub fn is_excluded(&self, event_ticker: &str) -> bool {
        self.pattern
            .as_ref()
            .map(|re| re.is_match(event_ticker))
            .unwrap_or(false)
    }
}

impl Default for LeagueExclusionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_LEAGUES).unwrap_or_else(|_| Self::none())
    }
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub page_size: u32,
    pub max_pages: u32,
    pub page_delay: Duration,
    pub rate_limit_backoff: Duration,
    pub exclusion: LeagueExclusionFilter,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: 200,
            max_pages: 25,
            page_delay: Duration::from_millis(150),
            rate_limit_backoff: Duration::from_millis(2000),
            exclusion: LeagueExclusionFilter::default(),
        }
    }
}

/// Result of one catalog pass. `error` is set whenever a page failed; markets
/// gathered before the failure are kept.
#[derive(Debug, Clone, Default)]
pub struct CatalogFetch {
    pub markets: Vec<Market>,
    pub error: Option<String>,
    pub pages: u32,
}

pub struct MarketCatalog {
    config: CatalogConfig,
}

impl MarketCatalog {
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Keep sports events from known series that are not excluded.
    pub fn classify_event(&self, event: ApiEvent) -> Option<MarketEvent> {
        let category = event.category.as_deref().unwrap_or("").to_uppercase();
        if category != "SPORTS" {
            return None;
        }

        let event_ticker = event.event_ticker.as_deref().unwrap_or("");
        if self.config.exclusion.is_excluded(event_ticker) {
            return None;
        }

        let sport = sport_for_event_ticker(event_ticker)?;
        Some(event.into_market_event(Some(sport)))
    }

    /// Walk the open-event listing sequentially. Never fails; see `CatalogFetch`.
    pub async fn fetch(&self, client: &dyn ExchangeClient) -> CatalogFetch {
        let mut result = CatalogFetch::default();
        let mut cursor: Option<String> = None;

        for page in 0..self.config.max_pages {
            let response = client
                .list_open_events(self.config.page_size, cursor.as_deref())
                .await;
            result.pages += 1;

            let events_page = match response {
                Ok(p) => p,
                Err(e) => {
                    warn!(page, "Market catalog fetch failed: {}", e);
                    if e.is_rate_limited() {
                        tokio::time::sleep(self.config.rate_limit_backoff).await;
                    }
                    result.error = Some(e.to_string());
                    break;
                }
            };

            let event_count = events_page.events.len();
            if page == 0 && event_count == 0 {
                result.error = Some("No events returned".to_string());
                break;
            }

            for event in events_page.events {
                if let Some(market_event) = self.classify_event(event) {
                    result.markets.extend(market_event.markets);
                }
            }

            debug!(page, event_count, total_markets = result.markets.len(), "Fetched events page");

            cursor = events_page.cursor.filter(|c| !c.is_empty());
            if event_count < self.config.page_size as usize || cursor.is_none() {
                break;
            }
            tokio::time::sleep(self.config.page_delay).await;
        }

        info!(
            markets = result.markets.len(),
            pages = result.pages,
            "Market catalog loaded"
        );
        result
    }
}
