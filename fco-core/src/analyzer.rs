//! Ranks every position by the rating a player would reach there.
use serde::{Deserialize, Serialize};

use crate::constants::MAX_STAT_UPGRADES;
use crate::data::PositionCatalog;
use crate::optimizer::{BoostTargets, ranked_weights};
use crate::scoring::{StatTable, score, score_with_upgrades};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionResult {
    pub position_id: String,
    pub display_name: String,
    pub base_score: f64,
    pub boosted_score: f64,
    pub top_boost_targets: BoostTargets,
}

impl PositionResult {
    #[must_use]
    pub fn gain(&self) -> f64 {
        self.boosted_score - self.base_score
    }
}

/// Every position scored before and after a full boost, best boosted score first.
///
/// Equal boosted scores keep catalog order.
#[must_use]
pub fn rank_positions(catalog: &PositionCatalog, stats: &StatTable) -> Vec<PositionResult> {
    let mut results: Vec<PositionResult> = catalog
        .iter()
        .map(|position| {
            let top_boost_targets: BoostTargets = ranked_weights(&position.stats)
                .into_iter()
                .take(MAX_STAT_UPGRADES)
                .map(|entry| entry.stat.clone())
                .collect();
            PositionResult {
                position_id: position.id.clone(),
                display_name: position.display_name.clone(),
                base_score: score(stats, &position.stats),
                boosted_score: score_with_upgrades(stats, &position.stats, &top_boost_targets),
                top_boost_targets,
            }
        })
        .collect();
    results.sort_by(|a, b| b.boosted_score.total_cmp(&a.boosted_score));
    if let Some(best) = results.first() {
        log::debug!(
            "best position {} at {:.2} of {} ranked",
            best.position_id,
            best.boosted_score,
            results.len()
        );
    }
    results
}

/// The top-ranked position, `None` for an empty catalog.
#[must_use]
pub fn best_position(catalog: &PositionCatalog, stats: &StatTable) -> Option<PositionResult> {
    rank_positions(catalog, stats).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PositionWeights, ReferenceData, WeightEntry};

    fn catalog() -> PositionCatalog {
        let position = |id: &str, stats: &[(&str, f64)]| PositionWeights {
            id: id.to_string(),
            display_name: format!("{id} name"),
            stats: stats
                .iter()
                .map(|(stat, weight)| WeightEntry {
                    stat: (*stat).to_string(),
                    weight: *weight,
                })
                .collect(),
        };
        PositionCatalog::new(vec![
            position("DEF", &[("tackle", 60.0), ("pace", 40.0)]),
            position("ATT", &[("shot", 70.0), ("pace", 30.0)]),
            position("TWIN", &[("shot", 70.0), ("pace", 30.0)]),
        ])
        .unwrap()
    }

    fn stats() -> StatTable {
        [("tackle", 50), ("pace", 80), ("shot", 90)]
            .into_iter()
            .map(|(stat, value)| (stat.to_string(), value))
            .collect()
    }

    #[test]
    fn positions_sort_by_boosted_score() {
        let ranked = rank_positions(&catalog(), &stats());
        let ids: Vec<&str> = ranked.iter().map(|r| r.position_id.as_str()).collect();
        assert_eq!(ids, vec!["ATT", "TWIN", "DEF"]);
        let att = &ranked[0];
        assert!((att.base_score - 87.0).abs() < 1e-9);
        assert!((att.boosted_score - 89.0).abs() < 1e-9);
        assert!((att.gain() - 2.0).abs() < 1e-9);
        assert_eq!(att.top_boost_targets.as_slice(), ["shot", "pace"]);
    }

    #[test]
    fn every_embedded_position_is_ranked() {
        let data = ReferenceData::embedded().unwrap();
        let stats: StatTable = data
            .positions
            .all_stat_names()
            .into_iter()
            .map(|stat| (stat.to_string(), 80))
            .collect();
        let ranked = rank_positions(&data.positions, &stats);
        assert_eq!(ranked.len(), data.positions.len());
        for result in &ranked {
            assert!((result.base_score - 80.0).abs() < 1e-9);
            assert!((result.boosted_score - result.base_score).abs() > 0.0);
            assert!(result.top_boost_targets.len() <= MAX_STAT_UPGRADES);
        }
        assert!(
            ranked
                .windows(2)
                .all(|pair| pair[0].boosted_score >= pair[1].boosted_score)
        );
    }

    #[test]
    fn empty_stats_rank_at_zero() {
        let best = best_position(&catalog(), &StatTable::new()).unwrap();
        assert!(best.base_score.abs() < f64::EPSILON);
        assert!(best.boosted_score.abs() < f64::EPSILON);
    }
}
