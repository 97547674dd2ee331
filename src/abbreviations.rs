//! Ticker-suffix → team keyword tables.
//!
//! Data only. The base table is shared by every league; a league table
//! overrides it where the same suffix means a different franchise.

use crate::event::Sport;

type Table = &'static [(&'static str, &'static [&'static str])];

const BASE: Table = &[
    ("NYK", &["knicks", "new york k"]),
    ("HOU", &["houston", "rockets", "astros"]),
    ("DET", &["detroit", "pistons", "tigers", "red wings"]),
    ("CHI", &["chicago", "bulls", "cubs", "blackhawks"]),
    ("SAS", &["san antonio", "spurs"]),
    ("SAC", &["sacramento", "kings"]),
    ("MEM", &["memphis", "grizzlies"]),
    ("UTA", &["utah", "jazz"]),
    ("MIL", &["milwaukee", "bucks", "brewers"]),
    ("ATL", &["atlanta", "hawks", "braves"]),
    ("PHI", &["philadelphia", "76ers", "sixers", "phillies", "flyers"]),
    ("NOP", &["new orleans", "pelicans"]),
    ("MIA", &["miami", "heat", "marlins"]),
    ("BOS", &["boston", "celtics", "red sox", "bruins"]),
    ("GSW", &["golden state", "warriors"]),
    ("LAL", &["lakers"]),
    ("LAC", &["clippers"]),
    ("DEN", &["denver", "nuggets", "rockies"]),
    ("MIN", &["minnesota", "timberwolves", "twins", "wild"]),
    ("OKC", &["oklahoma", "thunder"]),
    ("POR", &["portland", "trail blazers"]),
    ("PHX", &["phoenix", "suns"]),
    ("DAL", &["dallas", "mavericks"]),
    ("IND", &["indiana", "pacers"]),
    ("CLE", &["cleveland", "cavaliers", "guardians"]),
    ("TOR", &["toronto", "raptors", "blue jays", "maple leafs"]),
    ("BKN", &["brooklyn", "nets"]),
    ("WAS", &["washington", "wizards", "nationals", "capitals"]),
    ("CHA", &["charlotte", "hornets"]),
    ("ORL", &["orlando", "magic"]),
    ("NYY", &["yankees"]),
    ("NYM", &["mets"]),
    ("NYR", &["rangers", "new york r"]),
    ("NYI", &["islanders"]),
    ("NJD", &["devils", "new jersey"]),
    ("CHC", &["cubs"]),
    ("CWS", &["white sox"]),
    ("LAD", &["dodgers"]),
    ("LAA", &["angels"]),
    ("SFG", &["giants", "san francisco"]),
    ("SDP", &["padres", "san diego"]),
    ("ATH", &["athletics", "a's", "oakland"]),
    ("STL", &["cardinals", "st. louis", "st louis", "blues"]),
    ("PIT", &["pirates", "pittsburgh", "penguins"]),
    ("CIN", &["reds", "cincinnati"]),
    ("KCR", &["royals", "kansas city"]),
    ("SEA", &["mariners", "seattle", "kraken"]),
    ("TEX", &["rangers", "texas"]),
    ("BAL", &["orioles", "baltimore"]),
    ("TBR", &["rays", "tampa bay"]),
    ("WSN", &["nationals"]),
    ("FLA", &["marlins", "florida", "panthers"]),
    ("COL", &["rockies", "colorado", "avalanche"]),
    ("AZ", &["diamondbacks", "arizona"]),
    ("ARI", &["diamondbacks", "arizona", "coyotes"]),
    ("WSH", &["capitals"]),
    ("CAR", &["hurricanes", "carolina"]),
    ("TBL", &["lightning"]),
    ("CBJ", &["blue jackets", "columbus"]),
    ("NSH", &["predators", "nashville"]),
    ("WPG", &["jets", "winnipeg"]),
    ("SJS", &["sharks", "san jose"]),
    ("ANA", &["ducks", "anaheim"]),
    ("LAK", &["kings"]),
    ("VAN", &["canucks", "vancouver"]),
    ("CGY", &["flames", "calgary"]),
    ("EDM", &["oilers", "edmonton"]),
    ("VGK", &["golden knights", "vegas"]),
    ("MTL", &["canadiens", "montreal"]),
    ("OTT", &["senators", "ottawa"]),
    ("BUF", &["sabres", "buffalo"]),
];

const NFL: Table = &[
    ("ARI", &["cardinals", "arizona"]),
    ("ATL", &["falcons", "atlanta"]),
    ("BAL", &["ravens", "baltimore"]),
    ("BUF", &["bills", "buffalo"]),
    ("CAR", &["panthers", "carolina"]),
    ("CHI", &["bears", "chicago"]),
    ("CIN", &["bengals", "cincinnati"]),
    ("CLE", &["browns", "cleveland"]),
    ("DAL", &["cowboys", "dallas"]),
    ("DEN", &["broncos", "denver"]),
    ("DET", &["lions", "detroit"]),
    ("GB", &["packers", "green bay"]),
    ("HOU", &["texans", "houston"]),
    ("IND", &["colts", "indianapolis"]),
    ("JAC", &["jaguars", "jacksonville"]),
    ("JAX", &["jaguars", "jacksonville"]),
    ("KC", &["chiefs", "kansas city"]),
    ("LAC", &["chargers"]),
    ("LA", &["rams"]),
    ("LAR", &["rams"]),
    ("LV", &["raiders", "las vegas"]),
    ("MIA", &["dolphins", "miami"]),
    ("MIN", &["vikings", "minnesota"]),
    ("NE", &["patriots", "new england"]),
    ("NO", &["saints", "new orleans"]),
    ("NYG", &["giants"]),
    ("NYJ", &["jets"]),
    ("PHI", &["eagles", "philadelphia"]),
    ("PIT", &["steelers", "pittsburgh"]),
    ("SEA", &["seahawks", "seattle"]),
    ("SF", &["49ers", "niners", "san francisco"]),
    ("TB", &["buccaneers", "bucs", "tampa bay"]),
    ("TEN", &["titans", "tennessee"]),
    ("WAS", &["commanders", "washington"]),
];

fn league_table(sport: &Sport) -> Option<Table> {
    match sport {
        Sport::Nfl => Some(NFL),
        _ => None,
    }
}

const LEAGUE_TABLES: &[Table] = &[NFL];

fn find(table: Table, suffix: &str) -> Option<&'static [&'static str]> {
    table
        .iter()
        .find(|(abbr, _)| *abbr == suffix)
        .map(|(_, keywords)| *keywords)
}

/// Keywords for a market suffix. Empty when the suffix is unknown.
pub fn keywords(sport: Option<&Sport>, suffix: &str) -> &'static [&'static str] {
    let suffix = suffix.to_uppercase();

    if let Some(kws) = sport.and_then(league_table).and_then(|t| find(t, &suffix)) {
        return kws;
    }
    if let Some(kws) = find(BASE, &suffix) {
        return kws;
    }
    if sport.is_none() {
        if let Some(kws) = LEAGUE_TABLES.iter().find_map(|t| find(t, &suffix)) {
            return kws;
        }
    }
    &[]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_league_table_overrides_base() {
        assert!(keywords(Some(&Sport::Nfl), "SEA").contains(&"seahawks"));
        assert!(keywords(Some(&Sport::Mlb), "SEA").contains(&"mariners"));
    }

    #[test]
    fn test_falls_back_to_base() {
        assert!(keywords(Some(&Sport::Nfl), "NYK").contains(&"knicks"));
        assert!(keywords(Some(&Sport::Nba), "kc").is_empty());
    }

    #[test]
    fn test_unscoped_market_searches_league_tables() {
        assert!(keywords(None, "KC").contains(&"chiefs"));
        assert!(keywords(None, "PHI").contains(&"76ers"));
        assert!(keywords(None, "XYZ").is_empty());
    }
}
