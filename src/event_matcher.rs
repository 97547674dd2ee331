use crate::abbreviations;
use crate::event::{Market, Pick, Sport};
use std::collections::HashMap;
use tracing::debug;

/// Event-group type, in the order groups are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MarketKind {
    Game,
    Spread,
    Total,
    Other,
}

impl MarketKind {
    pub fn from_event_ticker(event_ticker: &str) -> Self {
        let u = event_ticker.to_uppercase();
        if u.contains("GAME") {
            MarketKind::Game
        } else if u.contains("SPREAD") {
            MarketKind::Spread
        } else if u.contains("TOTAL") {
            MarketKind::Total
        } else {
            MarketKind::Other
        }
    }
}

/// How the market inside the winning group was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// A suffix keyword appears in the pick text.
    Keyword,
    /// The raw suffix appears in the pick text.
    SuffixText,
    /// "Away at Home" title structure decided the side.
    Positional,
    /// No textual evidence; the group's first market.
    FirstInGroup,
}

#[derive(Debug, Clone, Copy)]
pub struct TeamMatch<'a> {
    pub market: &'a Market,
    pub strategy: MatchStrategy,
}

/// Words of at least four characters.
pub fn significant_words(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace().filter(|w| w.chars().count() >= 4)
}

/// Away-team part of an "Away at Home" title.
pub fn away_part(title: &str) -> Option<&str> {
    match title.find(" at ") {
        Some(idx) if idx > 0 => Some(&title[..idx]),
        _ => None,
    }
}

fn keywords_for(market: &Market) -> &'static [&'static str] {
    abbreviations::keywords(market.sport.as_ref(), &market.suffix())
}

#[derive(Debug, Default, Clone)]
pub struct TeamMatcher;

impl TeamMatcher {
    pub fn new() -> Self {
        Self
    }

    pub fn team_matches_suffix(&self, team_lower: &str, sport: Option<&Sport>, suffix: &str) -> bool {
        if abbreviations::keywords(sport, suffix)
            .iter()
            .any(|kw| team_lower.contains(kw))
        {
            return true;
        }
        let suffix_lower = suffix.to_lowercase();
        team_lower.split_whitespace().any(|w| w == suffix_lower)
    }

    /// Both teams resolve through the group's suffixes, or failing that both
    /// share a significant word with the title.
    pub fn title_matches_both_teams(
        &self,
        title: &str,
        home_lower: &str,
        away_lower: &str,
        group: &[&Market],
    ) -> bool {
        let home_matched = group
            .iter()
            .any(|m| self.team_matches_suffix(home_lower, m.sport.as_ref(), &m.suffix()));
        let away_matched = group
            .iter()
            .any(|m| self.team_matches_suffix(away_lower, m.sport.as_ref(), &m.suffix()));
        if home_matched && away_matched {
            return true;
        }

        significant_words(home_lower).any(|w| title.contains(w))
            && significant_words(away_lower).any(|w| title.contains(w))
    }

    /// Markets for the pick's league (unscoped markets included), grouped by
    /// event ticker and ordered game > spread > total > other. Groups of equal
    /// kind keep catalog order.
    pub fn candidate_groups<'a>(&self, sport: &Sport, markets: &'a [Market]) -> Vec<Vec<&'a Market>> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<(&str, Vec<&'a Market>)> = Vec::new();

        for market in markets {
            if market.sport.as_ref().is_some_and(|s| s != sport) {
                continue;
            }
            let key = if market.event_ticker.is_empty() {
                market.ticker.as_str()
            } else {
                market.event_ticker.as_str()
            };
            match index.get(key) {
                Some(&i) => groups[i].1.push(market),
                None => {
                    index.insert(key, groups.len());
                    groups.push((key, vec![market]));
                }
            }
        }

        groups.sort_by_key(|(key, _)| MarketKind::from_event_ticker(key));
        groups.into_iter().map(|(_, group)| group).collect()
    }

    pub fn match_pick<'a>(&self, pick: &Pick, markets: &'a [Market]) -> Option<TeamMatch<'a>> {
        let pick_lower = pick.pick.to_lowercase();
        let home_lower = pick.home_team.to_lowercase();
        let away_lower = pick.away_team.to_lowercase();
        let sport = pick.normalized_sport();

        for group in self.candidate_groups(&sport, markets) {
            let title = group[0].title.to_lowercase().replace("winner?", "");
            if !self.title_matches_both_teams(&title, &home_lower, &away_lower, &group) {
                continue;
            }

            let found = self.select_market(&pick_lower, &away_lower, &title, &group);
            debug!(
                ticker = %found.market.ticker,
                strategy = ?found.strategy,
                "Matched {} vs {}",
                pick.away_team,
                pick.home_team
            );
            return Some(found);
        }

        None
    }

    /// Choose the market inside a group that both teams matched.
    fn select_market<'a>(
        &self,
        pick_lower: &str,
        away_lower: &str,
        title: &str,
        group: &[&'a Market],
    ) -> TeamMatch<'a> {
        for &market in group {
            if keywords_for(market).iter().any(|kw| pick_lower.contains(kw)) {
                return TeamMatch { market, strategy: MatchStrategy::Keyword };
            }
        }

        for &market in group {
            if pick_lower.contains(&market.suffix().to_lowercase()) {
                return TeamMatch { market, strategy: MatchStrategy::SuffixText };
            }
        }

        if let Some(away) = away_part(title) {
            let pick_is_away = significant_words(pick_lower).any(|w| away.contains(w));
            for &market in group {
                let suffix = market.suffix();
                let suffix_is_away = keywords_for(market).iter().any(|kw| away_lower.contains(kw))
                    || away_lower.contains(&suffix.to_lowercase());
                if pick_is_away == suffix_is_away {
                    return TeamMatch { market, strategy: MatchStrategy::Positional };
                }
            }
        }

        // Weak: nothing in the text ties the pick to a side of this game.
        TeamMatch {
            market: group[0],
            strategy: MatchStrategy::FirstInGroup,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn market(event_ticker: &str, suffix: &str, title: &str, sport: Option<Sport>) -> Market {
        Market {
            ticker: format!("{event_ticker}-{suffix}"),
            event_ticker: event_ticker.to_string(),
            title: title.to_string(),
            sport,
            yes_ask: Some(60),
            no_ask: Some(41),
        }
    }

    pub(crate) fn chiefs_eagles_catalog() -> Vec<Market> {
        let title = "Philadelphia at Kansas City Winner?";
        vec![
            market("KXNFLSPREAD-25SEP07PHIKC", "KC", "Kansas City wins by over 2.5 points?", Some(Sport::Nfl)),
            market("KXNFLSPREAD-25SEP07PHIKC", "PHI", "Philadelphia wins by over 2.5 points?", Some(Sport::Nfl)),
            market("KXNFLGAME-25SEP07PHIKC", "PHI", title, Some(Sport::Nfl)),
            market("KXNFLGAME-25SEP07PHIKC", "KC", title, Some(Sport::Nfl)),
        ]
    }

    #[test]
    fn test_chiefs_pick_matches_kc_game_market() {
        let catalog = chiefs_eagles_catalog();
        let pick = Pick::new("Kansas City Chiefs", "Philadelphia Eagles", "NFL", "Chiefs -3", 90.0);

        let found = TeamMatcher::new().match_pick(&pick, &catalog).unwrap();
        assert_eq!(found.market.ticker, "KXNFLGAME-25SEP07PHIKC-KC");
        assert_eq!(found.strategy, MatchStrategy::Keyword);
    }

    #[test]
    fn test_game_group_preferred_over_spread_group() {
        let catalog = chiefs_eagles_catalog();
        let pick = Pick::new("Kansas City Chiefs", "Philadelphia Eagles", "NFL", "Eagles +3", 70.0);

        let found = TeamMatcher::new().match_pick(&pick, &catalog).unwrap();
        assert!(found.market.event_ticker.starts_with("KXNFLGAME"));
        assert_eq!(found.market.suffix(), "PHI");
    }

    #[test]
    fn test_returns_market_from_the_matching_group_only() {
        let mut catalog = vec![
            market("KXNBAGAME-25NOV01BOSNYK", "BOS", "Boston at New York Winner?", Some(Sport::Nba)),
            market("KXNBAGAME-25NOV01BOSNYK", "NYK", "Boston at New York Winner?", Some(Sport::Nba)),
        ];
        catalog.push(market("KXNBAGAME-25NOV01MIAORL", "MIA", "Miami at Orlando Winner?", Some(Sport::Nba)));
        catalog.push(market("KXNBAGAME-25NOV01MIAORL", "ORL", "Miami at Orlando Winner?", Some(Sport::Nba)));

        let pick = Pick::new("Orlando Magic", "Miami Heat", "NBA", "Magic ML", 75.0);
        let found = TeamMatcher::new().match_pick(&pick, &catalog).unwrap();
        assert_eq!(found.market.event_ticker, "KXNBAGAME-25NOV01MIAORL");
        assert_eq!(found.market.suffix(), "ORL");
    }

    #[test]
    fn test_other_league_markets_are_skipped() {
        let catalog = vec![
            market("KXNHLGAME-25NOV01BOSTOR", "BOS", "Boston at Toronto Winner?", Some(Sport::Nhl)),
            market("KXNHLGAME-25NOV01BOSTOR", "TOR", "Boston at Toronto Winner?", Some(Sport::Nhl)),
        ];
        let pick = Pick::new("Toronto Raptors", "Boston Celtics", "NBA", "Celtics -4", 72.0);
        assert!(TeamMatcher::new().match_pick(&pick, &catalog).is_none());

        let unscoped: Vec<Market> = catalog
            .into_iter()
            .map(|m| Market { sport: None, ..m })
            .collect();
        let found = TeamMatcher::new().match_pick(&pick, &unscoped).unwrap();
        assert_eq!(found.market.suffix(), "BOS");
    }

    fn gonzaga_catalog(suffix: &str, title: &str) -> Vec<Market> {
        vec![
            market("KXNCAAMBGAME-25NOV01GONZSMC", suffix, title, Some(Sport::Ncaab)),
            market("KXNCAAMBGAME-25NOV01GONZSMC", "SMC", title, Some(Sport::Ncaab)),
        ]
    }

    fn gonzaga_pick(text: &str) -> Pick {
        Pick::new("Saint Mary's Gaels", "Gonzaga Bulldogs", "NCAAB", text, 68.0)
    }

    #[test]
    fn test_title_word_overlap_with_suffix_text() {
        let catalog = gonzaga_catalog("GONZ", "Gonzaga at Saint Mary's Winner?");
        let found = TeamMatcher::new()
            .match_pick(&gonzaga_pick("Gonzaga -4.5"), &catalog)
            .unwrap();
        assert_eq!(found.market.suffix(), "GONZ");
        assert_eq!(found.strategy, MatchStrategy::SuffixText);
    }

    #[test]
    fn test_positional_picks_home_side() {
        let catalog = gonzaga_catalog("GONZ", "Gonzaga at Saint Mary's Winner?");
        let found = TeamMatcher::new()
            .match_pick(&gonzaga_pick("Take the hosts"), &catalog)
            .unwrap();
        assert_eq!(found.market.suffix(), "SMC");
        assert_eq!(found.strategy, MatchStrategy::Positional);
    }

    #[test]
    fn test_first_in_group_when_nothing_disambiguates() {
        let catalog = gonzaga_catalog("GONZ", "Gonzaga vs Saint Mary's Winner?");
        let found = TeamMatcher::new()
            .match_pick(&gonzaga_pick("Take the hosts"), &catalog)
            .unwrap();
        assert_eq!(found.market.suffix(), "GONZ");
        assert_eq!(found.strategy, MatchStrategy::FirstInGroup);
    }

    #[test]
    fn test_no_group_matches_both_teams() {
        let catalog = chiefs_eagles_catalog();
        let pick = Pick::new("Kansas City Chiefs", "Denver Broncos", "NFL", "Chiefs", 80.0);
        assert!(TeamMatcher::new().match_pick(&pick, &catalog).is_none());
        assert!(TeamMatcher::new().match_pick(&pick, &[]).is_none());
    }

    #[test]
    fn test_market_kind_priority() {
        assert!(MarketKind::from_event_ticker("KXNBAGAME-X") < MarketKind::from_event_ticker("KXNBASPREAD-X"));
        assert!(MarketKind::from_event_ticker("KXNBASPREAD-X") < MarketKind::from_event_ticker("KXNBATOTAL-X"));
        assert_eq!(MarketKind::from_event_ticker("KXMVP-26"), MarketKind::Other);
    }
}
