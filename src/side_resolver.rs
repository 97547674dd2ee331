use crate::abbreviations;
use crate::event::{Market, Pick, Side};
use crate::event_matcher::{away_part, significant_words};

/// Decides whether a matched market is bought "yes" or "no" for a pick.
#[derive(Debug, Default, Clone)]
pub struct SideResolver;

impl SideResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, pick: &Pick, market: &Market) -> Side {
        let pick_lower = pick.pick.to_lowercase();
        let suffix = market.suffix();

        let keywords = abbreviations::keywords(market.sport.as_ref(), &suffix);
        if !keywords.is_empty() {
            return if keywords.iter().any(|kw| pick_lower.contains(kw)) {
                Side::Yes
            } else {
                Side::No
            };
        }

        if pick_lower.contains(&suffix.to_lowercase()) {
            return Side::Yes;
        }

        // The contract names the away team in "Away at Home" titles.
        let title = market.title.to_lowercase();
        if let Some(away) = away_part(&title) {
            if significant_words(&pick_lower).any(|w| away.contains(w)) {
                return Side::Yes;
            }
        }

        Side::No
    }
}
