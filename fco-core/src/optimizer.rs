//! Chooses which stats to spend upgrade allocations on.
//!
//! Stats are ranked by their weight at the position. The full plan boosts the top
//! five; the efficient plan finds the shortest prefix of that ranking whose
//! floored rating already matches the full plan's floored rating.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::MAX_STAT_UPGRADES;
use crate::data::{PositionCatalog, WeightEntry};
use crate::numbers::floor_f64_to_i64;
use crate::scoring::{StatTable, score_with_upgrades};

/// Stat names picked for a boost plan; never more than five.
pub type BoostTargets = SmallVec<[String; MAX_STAT_UPGRADES]>;

/// Weights sorted heaviest first. Equal weights keep declaration order.
#[must_use]
pub fn ranked_weights(weights: &[WeightEntry]) -> Vec<&WeightEntry> {
    let mut ranked: Vec<&WeightEntry> = weights.iter().collect();
    ranked.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    ranked
}

/// The `max_count` heaviest stats of a position. Unknown positions yield nothing.
#[must_use]
pub fn top_upgrade_targets(
    catalog: &PositionCatalog,
    position_id: &str,
    max_count: usize,
) -> Vec<WeightEntry> {
    catalog.get(position_id).map_or_else(Vec::new, |position| {
        ranked_weights(&position.stats)
            .into_iter()
            .take(max_count)
            .cloned()
            .collect()
    })
}

/// Result of the minimum-allocation search for one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EfficientPlan {
    pub full_boost_score: f64,
    pub floored_full_boost_score: i64,
    pub minimum_boosts_needed: usize,
    pub minimum_boost_score: f64,
    pub saved_boosts: usize,
    pub recommended_stats: BoostTargets,
}

/// Plan against a raw weight list.
#[must_use]
pub fn plan_for_weights(stats: &StatTable, weights: &[WeightEntry]) -> EfficientPlan {
    let ranked: Vec<&str> = ranked_weights(weights)
        .into_iter()
        .take(MAX_STAT_UPGRADES)
        .map(|entry| entry.stat.as_str())
        .collect();

    let full_boost_score = score_with_upgrades(stats, weights, &ranked);
    let target = floor_f64_to_i64(full_boost_score);

    // The full prefix always reaches the target, so the loop breaks on or before it.
    let mut needed = ranked.len();
    let mut needed_score = full_boost_score;
    for count in 1..=ranked.len() {
        let prefix_score = score_with_upgrades(stats, weights, &ranked[..count]);
        if floor_f64_to_i64(prefix_score) >= target {
            needed = count;
            needed_score = prefix_score;
            break;
        }
    }

    log::debug!(
        "efficient plan: full {full_boost_score:.2} (floor {target}), {needed} boosts reach {needed_score:.2}"
    );
    EfficientPlan {
        full_boost_score,
        floored_full_boost_score: target,
        minimum_boosts_needed: needed,
        minimum_boost_score: needed_score,
        saved_boosts: MAX_STAT_UPGRADES.saturating_sub(needed),
        recommended_stats: ranked[..needed]
            .iter()
            .map(|stat| (*stat).to_string())
            .collect(),
    }
}

/// Plan for a known position, `None` when the position does not exist.
#[must_use]
pub fn efficient_upgrade_plan(
    catalog: &PositionCatalog,
    stats: &StatTable,
    position_id: &str,
) -> Option<EfficientPlan> {
    catalog
        .get(position_id)
        .map(|position| plan_for_weights(stats, &position.stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PositionWeights;

    fn weights(entries: &[(&str, f64)]) -> Vec<WeightEntry> {
        entries
            .iter()
            .map(|(stat, weight)| WeightEntry {
                stat: (*stat).to_string(),
                weight: *weight,
            })
            .collect()
    }

    fn stats(entries: &[(&str, i32)]) -> StatTable {
        entries
            .iter()
            .map(|(stat, value)| ((*stat).to_string(), *value))
            .collect()
    }

    fn catalog() -> PositionCatalog {
        PositionCatalog::new(vec![PositionWeights {
            id: "CM".to_string(),
            display_name: "Centre".to_string(),
            stats: weights(&[
                ("a", 10.0),
                ("b", 30.0),
                ("c", 10.0),
                ("d", 20.0),
                ("e", 5.0),
                ("f", 25.0),
            ]),
        }])
        .unwrap()
    }

    #[test]
    fn targets_are_sorted_with_stable_ties() {
        let top = top_upgrade_targets(&catalog(), "CM", 5);
        let names: Vec<&str> = top.iter().map(|entry| entry.stat.as_str()).collect();
        assert_eq!(names, vec!["b", "f", "d", "a", "c"]);
        assert_eq!(top_upgrade_targets(&catalog(), "CM", 2).len(), 2);
    }

    #[test]
    fn unknown_position_has_no_targets_or_plan() {
        assert!(top_upgrade_targets(&catalog(), "XX", 5).is_empty());
        assert!(efficient_upgrade_plan(&catalog(), &StatTable::new(), "XX").is_none());
    }

    #[test]
    fn plan_stops_at_first_prefix_reaching_full_floor() {
        let w = weights(&[("a", 20.0), ("b", 20.0), ("c", 20.0), ("d", 20.0), ("e", 20.0)]);
        let s = stats(&[("a", 80), ("b", 80), ("c", 80), ("d", 80), ("e", 88)]);
        // base 81.6, full 83.6, prefixes 82.0 / 82.4 / 82.8 / 83.2
        let plan = plan_for_weights(&s, &w);
        assert_eq!(plan.floored_full_boost_score, 83);
        assert_eq!(plan.minimum_boosts_needed, 4);
        assert_eq!(plan.saved_boosts, 1);
        assert_eq!(plan.recommended_stats.len(), 4);
    }

    #[test]
    fn one_boost_plan_saves_four() {
        let w = weights(&[("a", 96.0), ("b", 1.0), ("c", 1.0), ("d", 1.0), ("e", 1.0)]);
        let s = stats(&[("a", 50), ("b", 50), ("c", 50), ("d", 50), ("e", 60)]);
        // base 50.10, one boost 52.02, full 52.10
        let plan = plan_for_weights(&s, &w);
        assert_eq!(plan.recommended_stats.as_slice(), ["a".to_string()]);
        assert_eq!(plan.minimum_boosts_needed, 1);
        assert_eq!(plan.saved_boosts, 4);
        assert_eq!(plan.floored_full_boost_score, 52);
        assert!((plan.minimum_boost_score - 52.02).abs() < 1e-9);
        assert!((plan.full_boost_score - 52.1).abs() < 1e-9);
    }

    #[test]
    fn plan_counts_boosts_until_floor_matches() {
        let w = weights(&[("a", 20.0), ("b", 20.0), ("c", 20.0), ("d", 20.0), ("e", 20.0)]);
        let s = stats(&[("a", 79), ("b", 80), ("c", 80), ("d", 80), ("e", 80)]);
        // base 79.8, full 81.8, three boosts reach 81.0
        let plan = plan_for_weights(&s, &w);
        assert_eq!(plan.floored_full_boost_score, 81);
        assert_eq!(plan.minimum_boosts_needed, 3);
    }

    #[test]
    fn plan_prefix_is_minimal() {
        let cat = catalog();
        let s = stats(&[("a", 70), ("b", 71), ("c", 72), ("d", 73), ("e", 74), ("f", 75)]);
        let plan = efficient_upgrade_plan(&cat, &s, "CM").unwrap();
        let position = cat.get("CM").unwrap();
        assert_eq!(
            floor_f64_to_i64(plan.minimum_boost_score),
            plan.floored_full_boost_score
        );
        let ranked: Vec<&str> = ranked_weights(&position.stats)
            .into_iter()
            .map(|entry| entry.stat.as_str())
            .collect();
        for count in 1..plan.minimum_boosts_needed {
            let prefix = score_with_upgrades(&s, &position.stats, &ranked[..count]);
            assert!(floor_f64_to_i64(prefix) < plan.floored_full_boost_score);
        }
    }

    #[test]
    fn short_positions_boost_everything_available() {
        let w = weights(&[("a", 60.0), ("b", 40.0)]);
        let s = stats(&[("a", 50), ("b", 50)]);
        let plan = plan_for_weights(&s, &w);
        assert!((plan.full_boost_score - 52.0).abs() < 1e-9);
        assert_eq!(plan.minimum_boosts_needed, 2);
        assert_eq!(plan.saved_boosts, 3);
    }
}
