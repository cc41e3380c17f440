//! Weighted rating (OVR) computation.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::{STAT_UPGRADE_VALUE, WEIGHT_SCALE};
use crate::data::{PositionCatalog, WeightEntry};
use crate::numbers::floor_f64_to_i64;

/// Stat name to stat value, as entered by the player.
pub type StatTable = HashMap<String, i32>;

/// Weighted sum of `stats` divided by the weight scale.
///
/// Stats missing from the table count as zero. An empty weight list scores 0.
#[must_use]
pub fn score(stats: &StatTable, weights: &[WeightEntry]) -> f64 {
    weights
        .iter()
        .map(|entry| f64::from(stats.get(&entry.stat).copied().unwrap_or(0)) * entry.weight)
        .sum::<f64>()
        / WEIGHT_SCALE
}

/// Score after adding `boost` to each named stat that already exists in `stats`.
///
/// The caller's table is left untouched. A name listed twice is boosted twice.
#[must_use]
pub fn score_with_boosts<S>(
    stats: &StatTable,
    weights: &[WeightEntry],
    boosted: &[S],
    boost: i32,
) -> f64
where
    S: AsRef<str>,
{
    let mut upgraded = stats.clone();
    for name in boosted {
        if let Some(value) = upgraded.get_mut(name.as_ref()) {
            *value = value.saturating_add(boost);
        }
    }
    score(&upgraded, weights)
}

/// [`score_with_boosts`] with the standard +2 allocation.
#[must_use]
pub fn score_with_upgrades<S>(stats: &StatTable, weights: &[WeightEntry], boosted: &[S]) -> f64
where
    S: AsRef<str>,
{
    score_with_boosts(stats, weights, boosted, STAT_UPGRADE_VALUE)
}

/// Rating gained at a position by one +2 allocation on a stat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpgradeImpact {
    pub impact: f64,
    pub weight: f64,
}

#[must_use]
pub fn upgrade_impact(
    catalog: &PositionCatalog,
    stat: &str,
    position_id: &str,
) -> Option<UpgradeImpact> {
    let weight = catalog.get(position_id)?.weight_of(stat)?;
    Some(UpgradeImpact {
        impact: weight * f64::from(STAT_UPGRADE_VALUE) / WEIGHT_SCALE,
        weight,
    })
}

/// Two decimals, or the floored integer rating the game displays.
#[must_use]
pub fn format_ovr(value: f64, show_decimal: bool) -> String {
    if show_decimal {
        format!("{value:.2}")
    } else {
        floor_f64_to_i64(value).to_string()
    }
}
