use crate::catalog::{CatalogFetch, MarketCatalog};
use crate::clients::ExchangeClient;
use crate::error::PreviewError;
use crate::event::{Market, Pick, PickOrigin, Side};
use crate::event_matcher::TeamMatcher;
use crate::pick_store::{select_best_picks, PickStore};
use crate::side_resolver::SideResolver;
use crate::tiers::{TierAllocator, TieredPicks};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

pub const NOT_CONFIGURED: &str = "exchange not configured";

#[derive(Debug, Clone)]
pub struct PreviewSettings {
    pub min_confidence: f64,
    pub max_picks: usize,
    pub default_stake_cents: u32,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            min_confidence: 50.0,
            max_picks: 40,
            default_stake_cents: 500,
        }
    }
}

/// One pick as shown to the operator, with its market if any.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewPick {
    pub pick: String,
    pub home_team: String,
    pub away_team: String,
    pub sport: String,
    pub league: Option<String>,
    pub confidence: f64,
    pub odds: Option<serde_json::Value>,
    pub expected_value: Option<f64>,
    pub is_home_pick: bool,
    pub source: Option<PickOrigin>,
    pub matched: bool,
    pub ticker: Option<String>,
    pub market_title: Option<String>,
    pub side: Option<Side>,
    pub price: Option<u32>,
    pub contracts: Option<u32>,
    pub estimated_cost_cents: Option<u32>,
    pub default_stake_cents: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub success: bool,
    pub date: NaiveDate,
    pub total_picks: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub markets_fetched: usize,
    pub market_error: Option<String>,
    pub picks: Vec<PreviewPick>,
}

/// Composes pick loading, catalog discovery, matching and side resolution.
/// Holds no state between calls.
pub struct PreviewService {
    picks: Arc<dyn PickStore>,
    exchange: Arc<dyn ExchangeClient>,
    catalog: MarketCatalog,
    matcher: TeamMatcher,
    sides: SideResolver,
    allocator: TierAllocator,
    settings: PreviewSettings,
}

impl PreviewService {
    pub fn new(
        picks: Arc<dyn PickStore>,
        exchange: Arc<dyn ExchangeClient>,
        catalog: MarketCatalog,
        settings: PreviewSettings,
    ) -> Self {
        Self {
            picks,
            exchange,
            catalog,
            matcher: TeamMatcher::new(),
            sides: SideResolver::new(),
            allocator: TierAllocator::new(),
            settings,
        }
    }

    /// Best picks for the date; an empty day is an error.
    pub async fn load_best_picks(&self, date: NaiveDate) -> Result<Vec<Pick>, PreviewError> {
        let all = self
            .picks
            .load_picks(date)
            .await
            .map_err(PreviewError::PickStore)?;
        let best = select_best_picks(all, self.settings.min_confidence, self.settings.max_picks);
        if best.is_empty() {
            return Err(PreviewError::NoPicks { date });
        }
        Ok(best)
    }

    pub async fn fetch_markets(&self) -> CatalogFetch {
        if !self.exchange.is_configured() {
            warn!("Exchange credentials missing; skipping market fetch");
            return CatalogFetch {
                error: Some(NOT_CONFIGURED.to_string()),
                ..CatalogFetch::default()
            };
        }
        self.catalog.fetch(self.exchange.as_ref()).await
    }

    pub async fn preview(&self, date: NaiveDate) -> Result<PreviewResponse, PreviewError> {
        let span = info_span!("preview", request_id = %Uuid::new_v4(), %date);
        async {
            let picks = self.load_best_picks(date).await?;
            let fetch = self.fetch_markets().await;

            let preview_picks: Vec<PreviewPick> = picks
                .iter()
                .map(|p| self.preview_pick(p, &fetch.markets))
                .collect();
            let matched = preview_picks.iter().filter(|p| p.matched).count();

            info!(
                picks = preview_picks.len(),
                matched,
                markets = fetch.markets.len(),
                market_error = ?fetch.error,
                "Preview built"
            );

            Ok(PreviewResponse {
                success: true,
                date,
                total_picks: preview_picks.len(),
                matched,
                unmatched: preview_picks.len() - matched,
                markets_fetched: fetch.markets.len(),
                market_error: fetch.error,
                picks: preview_picks,
            })
        }
        .instrument(span)
        .await
    }

    pub fn preview_pick(&self, pick: &Pick, markets: &[Market]) -> PreviewPick {
        let market = self.matcher.match_pick(pick, markets).map(|m| m.market);
        let side = market.map(|m| self.sides.resolve(pick, m));
        let price = market.zip(side).map(|(m, s)| m.ask(s));
        let stake = self.settings.default_stake_cents;
        let contracts = price.map(|p| (stake / p.max(1)).max(1));

        PreviewPick {
            pick: pick.pick.clone(),
            home_team: pick.home_team.clone(),
            away_team: pick.away_team.clone(),
            sport: pick.normalized_sport().to_string(),
            league: pick.league_or_sport(),
            confidence: pick.confidence,
            odds: pick.odds.clone(),
            expected_value: pick.expected_value,
            is_home_pick: pick.is_home_pick(),
            source: pick.source,
            matched: market.is_some(),
            ticker: market.map(|m| m.ticker.clone()),
            market_title: market.map(|m| m.title.clone()),
            side,
            price,
            contracts,
            estimated_cost_cents: price.zip(contracts).map(|(p, c)| p * c),
            default_stake_cents: stake,
        }
    }

    /// Tier split of the whole day's slate.
    pub async fn tiered_picks(&self, date: NaiveDate) -> Result<TieredPicks, PreviewError> {
        let picks = self
            .picks
            .load_picks(date)
            .await
            .map_err(PreviewError::PickStore)?;
        if picks.is_empty() {
            return Err(PreviewError::NoPicks { date });
        }
        Ok(self.allocator.allocate(&picks))
    }
}
