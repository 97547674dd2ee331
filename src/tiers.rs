//! Ranking and partitioning of picks into subscription tiers.

use crate::event::Pick;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const ELITE_TARGET: usize = 5;
pub const PRO_TARGET: usize = 3;
pub const FREE_CAP: usize = 2;

const ELITE_MIN_CONFIDENCE: f64 = 80.0;
const PRO_MIN_CONFIDENCE: f64 = 65.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Pro,
    Elite,
}

/// What the payments side says about a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierAccess {
    pub has_access: bool,
    pub tier: Tier,
}

impl TierAccess {
    pub fn free() -> Self {
        Self {
            has_access: false,
            tier: Tier::Free,
        }
    }

    /// Tier actually granted; no access means free.
    pub fn effective_tier(&self) -> Tier {
        if self.has_access {
            self.tier
        } else {
            Tier::Free
        }
    }
}

/// Disjoint tier lists. Free picks carry no premium analysis.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TieredPicks {
    pub free: Vec<Pick>,
    pub pro: Vec<Pick>,
    pub elite: Vec<Pick>,
}

impl TieredPicks {
    pub fn total(&self) -> usize {
        self.free.len() + self.pro.len() + self.elite.len()
    }

    /// Picks a subscriber may see. Higher tiers include the lower ones.
    pub fn visible_to(&self, access: &TierAccess) -> Vec<Pick> {
        let mut visible = Vec::new();
        match access.effective_tier() {
            Tier::Elite => {
                visible.extend(self.elite.iter().cloned());
                visible.extend(self.pro.iter().cloned());
            }
            Tier::Pro => visible.extend(self.pro.iter().cloned()),
            Tier::Free => {}
        }
        visible.extend(self.free.iter().cloned());
        visible
    }
}

#[derive(Debug, Default, Clone)]
pub struct TierAllocator;

impl TierAllocator {
    pub fn new() -> Self {
        Self
    }

    /// Highest quality score first; ties keep input order.
    pub fn rank<'a>(&self, picks: &'a [Pick]) -> Vec<&'a Pick> {
        let mut ranked: Vec<&Pick> = picks.iter().collect();
        ranked.sort_by(|a, b| {
            b.quality_score()
                .partial_cmp(&a.quality_score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    pub fn allocate(&self, picks: &[Pick]) -> TieredPicks {
        let ranked = self.rank(picks);
        let mut used: HashSet<String> = HashSet::new();

        let elite_band = ranked.iter().copied().filter(|p| p.confidence >= ELITE_MIN_CONFIDENCE);
        let pro_band = || {
            ranked
                .iter()
                .copied()
                .filter(|p| p.confidence >= PRO_MIN_CONFIDENCE && p.confidence < ELITE_MIN_CONFIDENCE)
        };
        let low_band = ranked.iter().copied().filter(|p| p.confidence < PRO_MIN_CONFIDENCE);

        let mut elite = take_unused(elite_band, ELITE_TARGET, &mut used);
        if elite.len() < ELITE_TARGET {
            let missing = ELITE_TARGET - elite.len();
            elite.extend(take_unused(pro_band(), missing, &mut used));
        }

        let mut pro = take_unused(pro_band(), PRO_TARGET, &mut used);
        if pro.len() < PRO_TARGET {
            let missing = PRO_TARGET - pro.len();
            pro.extend(take_unused(low_band, missing, &mut used));
        }

        let free = take_unused(ranked.iter().copied(), FREE_CAP, &mut used)
            .into_iter()
            .map(Pick::without_premium_fields)
            .collect();

        TieredPicks { free, pro, elite }
    }
}

/// Take up to `limit` picks whose key is not yet used, marking each as used.
fn take_unused<'a>(
    candidates: impl Iterator<Item = &'a Pick>,
    limit: usize,
    used: &mut HashSet<String>,
) -> Vec<Pick> {
    let mut taken = Vec::new();
    for pick in candidates {
        if taken.len() >= limit {
            break;
        }
        if used.insert(pick.key()) {
            taken.push(pick.clone());
        }
    }
    taken
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picks_with(confidences: &[f64]) -> Vec<Pick> {
        confidences
            .iter()
            .enumerate()
            .map(|(i, c)| Pick::new(&format!("Home {i}"), &format!("Away {i}"), "NBA", "Home", *c).with_id(&format!("p{i}")))
            .collect()
    }

    fn ids(picks: &[Pick]) -> Vec<String> {
        picks.iter().map(Pick::key).collect()
    }

    fn assert_disjoint(tiers: &TieredPicks) {
        let elite: HashSet<String> = ids(&tiers.elite).into_iter().collect();
        let pro: HashSet<String> = ids(&tiers.pro).into_iter().collect();
        let free: HashSet<String> = ids(&tiers.free).into_iter().collect();
        assert!(elite.is_disjoint(&pro));
        assert!(free.is_disjoint(&elite));
        assert!(free.is_disjoint(&pro));
        assert!(tiers.elite.len() <= ELITE_TARGET);
        assert!(tiers.pro.len() <= PRO_TARGET);
        assert!(tiers.free.len() <= FREE_CAP);
    }

    #[test]
    fn test_elite_backfills_from_pro_band() {
        let picks = picks_with(&[90.0, 85.0, 82.0, 80.0, 70.0, 68.0]);
        let tiers = TierAllocator::new().allocate(&picks);

        assert_eq!(ids(&tiers.elite), vec!["p0", "p1", "p2", "p3", "p4"]);
        assert_eq!(ids(&tiers.pro), vec!["p5"]);
        assert!(tiers.free.is_empty());
        assert_disjoint(&tiers);
    }

    #[test]
    fn test_pro_backfills_from_low_band_and_free_takes_rest() {
        let picks = picks_with(&[95.0, 91.0, 88.0, 86.0, 84.0, 83.0, 72.0, 60.0, 55.0, 50.0, 45.0]);
        let tiers = TierAllocator::new().allocate(&picks);

        assert_eq!(ids(&tiers.elite), vec!["p0", "p1", "p2", "p3", "p4"]);
        assert_eq!(ids(&tiers.pro), vec!["p6", "p7", "p8"]);
        // p5 is ≥80 but elite is full, so it falls through to free.
        assert_eq!(ids(&tiers.free), vec!["p5", "p9"]);
        assert_disjoint(&tiers);
    }

    #[test]
    fn test_edge_outweighs_confidence() {
        let picks = vec![
            Pick::new("A", "B", "NBA", "A", 90.0).with_id("steady"),
            Pick::new("C", "D", "NBA", "C", 82.0).with_id("value").with_edge(6.0),
        ];
        let tiers = TierAllocator::new().allocate(&picks);
        assert_eq!(ids(&tiers.elite), vec!["value", "steady"]);
    }

    #[test]
    fn test_upstream_value_edge_drives_ranking() {
        let picks: Vec<Pick> = serde_json::from_value(serde_json::json!([
            { "id": "steady", "home_team": "A", "away_team": "B", "pick": "A", "confidence": 90, "value_bet_edge": 0 },
            { "id": "value", "home_team": "C", "away_team": "D", "pick": "C", "confidence": 82, "value_bet_edge": 12 }
        ]))
        .unwrap();

        let tiers = TierAllocator::new().allocate(&picks);
        assert_eq!(ids(&tiers.elite), vec!["value", "steady"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let picks = picks_with(&[70.0, 70.0, 70.0]);
        let ranked = TierAllocator::new().rank(&picks);
        assert_eq!(ranked.iter().map(|p| p.key()).collect::<Vec<_>>(), vec!["p0", "p1", "p2"]);
    }

    #[test]
    fn test_duplicate_ids_never_cross_tiers() {
        let mut picks = picks_with(&[90.0, 70.0, 50.0]);
        for p in &mut picks {
            p.id = Some("same-game".to_string());
        }
        let tiers = TierAllocator::new().allocate(&picks);
        assert_eq!(tiers.total(), 1);
        assert_disjoint(&tiers);
    }

    #[test]
    fn test_free_tier_strips_premium_analysis() {
        let mut pick = Pick::new("A", "B", "NBA", "A", 40.0).with_id("free-one");
        pick.key_factors = vec!["rest advantage".to_string()];
        pick.rationale = Some("model likes the matchup".to_string());
        pick.predicted_score = Some(serde_json::json!({ "home": 110, "away": 101 }));

        let tiers = TierAllocator::new().allocate(&[pick]);
        assert_eq!(tiers.pro.len(), 1);

        let mut lone = Pick::new("C", "D", "NBA", "C", 40.0).with_id("a");
        lone.rationale = Some("secret".to_string());
        let crowd: Vec<Pick> = picks_with(&[40.0, 40.0, 40.0])
            .into_iter()
            .chain(std::iter::once(lone))
            .collect();
        let tiers = TierAllocator::new().allocate(&crowd);
        assert_eq!(ids(&tiers.free), vec!["a"]);
        assert!(tiers.free.iter().all(|p| p.rationale.is_none() && p.key_factors.is_empty()));
    }

    #[test]
    fn test_invariants_hold_for_mixed_lists() {
        let allocator = TierAllocator::new();
        for n in 0..20usize {
            let confidences: Vec<f64> = (0..n).map(|i| ((i * 37) % 60) as f64 + 40.0).collect();
            let picks = picks_with(&confidences);
            let tiers = allocator.allocate(&picks);
            assert_disjoint(&tiers);
            assert!(tiers.total() <= picks.len());
        }
    }

    #[test]
    fn test_visibility_by_tier() {
        let tiers = TierAllocator::new().allocate(&picks_with(&[90.0, 70.0, 50.0, 45.0, 40.0, 35.0]));
        let elite = TierAccess { has_access: true, tier: Tier::Elite };
        let pro = TierAccess { has_access: true, tier: Tier::Pro };
        let lapsed = TierAccess { has_access: false, tier: Tier::Elite };

        assert_eq!(tiers.visible_to(&elite).len(), tiers.total());
        assert_eq!(tiers.visible_to(&pro).len(), tiers.pro.len() + tiers.free.len());
        assert_eq!(ids(&tiers.visible_to(&lapsed)), ids(&tiers.free));
        assert_eq!(ids(&tiers.visible_to(&TierAccess::free())), ids(&tiers.free));
    }
}
