use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Normalized league code shared by picks and markets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Sport {
    Nba,
    Ncaab,
    Ncaaf,
    Nfl,
    Nhl,
    Mlb,
    Other(String),
}

impl Sport {
    /// Map free-form sport/league text onto a league code.
    pub fn normalize(text: &str) -> Self {
        let u = text.to_uppercase();
        if u.contains("NBA") {
            Sport::Nba
        } else if u.contains("NCAAB") || u.contains("CBB") || u.contains("COLLEGE BASKETBALL") {
            Sport::Ncaab
        } else if u.contains("NCAAF") || u.contains("CFB") || u.contains("COLLEGE FOOTBALL") {
            Sport::Ncaaf
        } else if u.contains("NFL") {
            Sport::Nfl
        } else if u.contains("NHL") || u.contains("HOCKEY") {
            Sport::Nhl
        } else if u.contains("NCAA") || u.contains("COLLEGE") {
            Sport::Ncaab
        } else if u.contains("MLB") || (u.contains("BASEBALL") && !u.contains("NCAA")) {
            Sport::Mlb
        } else {
            Sport::Other(u)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Sport::Nba => "NBA",
            Sport::Ncaab => "NCAAB",
            Sport::Ncaaf => "NCAAF",
            Sport::Nfl => "NFL",
            Sport::Nhl => "NHL",
            Sport::Mlb => "MLB",
            Sport::Other(s) => s,
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Sport {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Which predictions file a pick came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickOrigin {
    Regular,
    Early,
}

/// One upstream prediction. Read-only to this crate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pick {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub home_team: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub away_team: String,
    #[serde(default)]
    pub sport: Option<String>,
    #[serde(default)]
    pub league: Option<String>,
    /// Free-text selection, e.g. "Chiefs -3".
    #[serde(default, deserialize_with = "null_as_default")]
    pub pick: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub confidence: f64,
    #[serde(default, alias = "value_bet_edge", deserialize_with = "null_as_default")]
    pub edge: f64,
    #[serde(default)]
    pub expected_value: Option<f64>,
    #[serde(default)]
    pub odds: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_home_pick: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PickOrigin>,

    // Premium analysis, stripped before free-tier exposure.
    #[serde(default, alias = "reasoning", deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub key_factors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    #[serde(default, alias = "mc_predicted_score", skip_serializing_if = "Option::is_none")]
    pub predicted_score: Option<serde_json::Value>,
}

/// Upstream writes `null` where a value is unknown; read it as the default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Ids arrive as strings or bare numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected string or number id, got {other}"))),
    }
}

impl Pick {
    pub fn new(home_team: &str, away_team: &str, sport: &str, pick: &str, confidence: f64) -> Self {
        Self {
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            sport: Some(sport.to_string()),
            pick: pick.to_string(),
            confidence,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_edge(mut self, edge: f64) -> Self {
        self.edge = edge;
        self
    }

    /// Stable identity: game id, then id, then the team pair.
    pub fn key(&self) -> String {
        self.game_id
            .clone()
            .or_else(|| self.id.clone())
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| format!("{}|{}", self.home_team, self.away_team))
    }

    pub fn normalized_sport(&self) -> Sport {
        let raw = self
            .league
            .as_deref()
            .filter(|l| !l.is_empty())
            .or(self.sport.as_deref())
            .unwrap_or("");
        Sport::normalize(raw)
    }

    pub fn league_or_sport(&self) -> Option<String> {
        self.league
            .clone()
            .filter(|l| !l.is_empty())
            .or_else(|| self.sport.clone())
    }

    pub fn is_home_pick(&self) -> bool {
        self.is_home_pick.unwrap_or(self.pick == self.home_team)
    }

    /// `edge*2.5 + confidence`; edge dominates because value drives profit.
    pub fn quality_score(&self) -> f64 {
        self.edge * 2.5 + self.confidence
    }

    pub fn without_premium_fields(mut self) -> Self {
        self.key_factors.clear();
        self.rationale = None;
        self.analysis = None;
        self.predicted_score = None;
        self
    }
}

/// A single tradable binary contract, validated at the exchange boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Market {
    pub ticker: String,
    pub event_ticker: String,
    pub title: String,
    /// `None` means the market is not scoped to a league.
    pub sport: Option<Sport>,
    pub yes_ask: Option<u32>,
    pub no_ask: Option<u32>,
}

impl Market {
    /// Trailing token of the ticker, upper-cased: `KXNFLGAME-25SEP07PHIKC-KC` → `KC`.
    pub fn suffix(&self) -> String {
        ticker_suffix(&self.ticker)
    }

    /// Ask in cents for the given side, 50 when the book is empty.
    pub fn ask(&self, side: Side) -> u32 {
        let ask = match side {
            Side::Yes => self.yes_ask,
            Side::No => self.no_ask,
        };
        ask.filter(|p| *p > 0).unwrap_or(50)
    }
}

pub fn ticker_suffix(ticker: &str) -> String {
    ticker.rsplit('-').next().unwrap_or(ticker).to_uppercase()
}

/// Markets sharing one event ticker: one real game.
#[derive(Debug, Clone)]
pub struct MarketEvent {
    pub event_ticker: String,
    pub category: Option<String>,
    pub markets: Vec<Market>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Yes,
    No,
}

// Raw exchange payloads. Every field is optional on the wire.

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiMarket {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub event_ticker: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub yes_ask: Option<i64>,
    #[serde(default)]
    pub no_ask: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiEvent {
    #[serde(default)]
    pub event_ticker: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub markets: Vec<ApiMarket>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventsPage {
    #[serde(default)]
    pub events: Vec<ApiEvent>,
    #[serde(default)]
    pub cursor: Option<String>,
}

impl ApiEvent {
    /// Drops markets with no ticker and clamps prices into cents.
    pub fn into_market_event(self, sport: Option<Sport>) -> MarketEvent {
        let event_ticker = self.event_ticker.unwrap_or_default();
        let markets = self
            .markets
            .into_iter()
            .filter_map(|m| {
                let ticker = m.ticker.filter(|t| !t.is_empty())?;
                Some(Market {
                    event_ticker: if event_ticker.is_empty() {
                        m.event_ticker.unwrap_or_else(|| ticker.clone())
                    } else {
                        event_ticker.clone()
                    },
                    ticker,
                    title: m.title.unwrap_or_default(),
                    sport: sport.clone(),
                    yes_ask: m.yes_ask.and_then(cents),
                    no_ask: m.no_ask.and_then(cents),
                })
            })
            .collect();

        MarketEvent {
            event_ticker,
            category: self.category,
            markets,
        }
    }
}

fn cents(price: i64) -> Option<u32> {
    u32::try_from(price).ok().filter(|p| *p <= 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sport_normalization() {
        assert_eq!(Sport::normalize("nba"), Sport::Nba);
        assert_eq!(Sport::normalize("College Basketball"), Sport::Ncaab);
        assert_eq!(Sport::normalize("americanfootball_ncaaf"), Sport::Ncaaf);
        assert_eq!(Sport::normalize("NFL"), Sport::Nfl);
        assert_eq!(Sport::normalize("ice hockey"), Sport::Nhl);
        assert_eq!(Sport::normalize("NCAA Baseball"), Sport::Ncaab);
        assert_eq!(Sport::normalize("baseball_mlb"), Sport::Mlb);
        assert_eq!(Sport::normalize("soccer"), Sport::Other("SOCCER".to_string()));
    }

    #[test]
    fn test_pick_key_fallbacks() {
        let pick = Pick::new("Kansas City Chiefs", "Philadelphia Eagles", "NFL", "Chiefs", 70.0);
        assert_eq!(pick.key(), "Kansas City Chiefs|Philadelphia Eagles");
        assert_eq!(pick.clone().with_id("p1").key(), "p1");

        let mut with_game = pick.with_id("p1");
        with_game.game_id = Some("g1".to_string());
        assert_eq!(with_game.key(), "g1");
    }

    #[test]
    fn test_pick_league_takes_precedence() {
        let mut pick = Pick::new("Duke", "UNC", "basketball", "Duke", 70.0);
        pick.league = Some("NCAAB".to_string());
        assert_eq!(pick.normalized_sport(), Sport::Ncaab);
    }

    #[test]
    fn test_empty_league_falls_back_to_sport() {
        let mut pick = Pick::new("Duke", "UNC", "NCAAB", "Duke", 70.0);
        pick.league = Some(String::new());
        assert_eq!(pick.league_or_sport().as_deref(), Some("NCAAB"));
        assert_eq!(pick.normalized_sport(), Sport::Ncaab);
    }

    #[test]
    fn test_progno_record_fields() {
        let pick: Pick = serde_json::from_value(serde_json::json!({
            "game_id": "abc123",
            "home_team": "Kansas City Chiefs",
            "away_team": "Philadelphia Eagles",
            "sport": "NFL",
            "league": "NFL",
            "pick": "Kansas City Chiefs",
            "confidence": 82,
            "value_bet_edge": 12,
            "reasoning": ["Rest advantage", "Line moved toward KC"],
            "mc_predicted_score": { "home": 27, "away": 20 },
            "analysis": "Chiefs control the trenches."
        }))
        .unwrap();

        assert_eq!(pick.edge, 12.0);
        assert_eq!(pick.quality_score(), 112.0);
        assert_eq!(pick.key_factors.len(), 2);
        assert_eq!(pick.predicted_score.as_ref().unwrap()["home"], 27);

        let free = pick.without_premium_fields();
        assert!(free.key_factors.is_empty() && free.predicted_score.is_none() && free.analysis.is_none());
    }

    #[test]
    fn test_nulls_and_numeric_ids_are_tolerated() {
        let pick: Pick = serde_json::from_value(serde_json::json!({
            "id": 4017,
            "game_id": null,
            "home_team": "Boston Celtics",
            "away_team": null,
            "pick": "Celtics",
            "confidence": null,
            "value_bet_edge": null,
            "reasoning": null
        }))
        .unwrap();

        assert_eq!(pick.key(), "4017");
        assert_eq!(pick.away_team, "");
        assert_eq!(pick.confidence, 0.0);
        assert_eq!(pick.edge, 0.0);
        assert!(pick.key_factors.is_empty());
    }

    #[test]
    fn test_api_event_validation() {
        let event = ApiEvent {
            event_ticker: Some("KXNBAGAME-25NOV01BOSNYK".to_string()),
            category: Some("Sports".to_string()),
            title: None,
            markets: vec![
                ApiMarket {
                    ticker: Some("KXNBAGAME-25NOV01BOSNYK-BOS".to_string()),
                    yes_ask: Some(44),
                    no_ask: Some(-3),
                    ..ApiMarket::default()
                },
                ApiMarket::default(),
            ],
        };

        let parsed = event.into_market_event(Some(Sport::Nba));
        assert_eq!(parsed.markets.len(), 1);
        let market = &parsed.markets[0];
        assert_eq!(market.suffix(), "BOS");
        assert_eq!(market.event_ticker, "KXNBAGAME-25NOV01BOSNYK");
        assert_eq!(market.ask(Side::Yes), 44);
        assert_eq!(market.ask(Side::No), 50);
    }
}
