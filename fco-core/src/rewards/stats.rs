use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::VecDeque;

use super::{BoxDefinition, DrawResult, Rarity, profit_loss};
use crate::constants::MAX_DRAW_HISTORY;
use crate::numbers::u64_to_f64;

/// Number of draws per rarity. Every rarity is always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RarityCounts {
    pub legendary: u64,
    pub epic: u64,
    pub rare: u64,
    pub uncommon: u64,
    pub common: u64,
}

impl RarityCounts {
    #[must_use]
    pub const fn get(&self, rarity: Rarity) -> u64 {
        match rarity {
            Rarity::Legendary => self.legendary,
            Rarity::Epic => self.epic,
            Rarity::Rare => self.rare,
            Rarity::Uncommon => self.uncommon,
            Rarity::Common => self.common,
        }
    }

    pub const fn record(&mut self, rarity: Rarity) {
        let slot = match rarity {
            Rarity::Legendary => &mut self.legendary,
            Rarity::Epic => &mut self.epic,
            Rarity::Rare => &mut self.rare,
            Rarity::Uncommon => &mut self.uncommon,
            Rarity::Common => &mut self.common,
        };
        *slot = slot.saturating_add(1);
    }

    #[must_use]
    pub const fn total(&self) -> u64 {
        self.legendary + self.epic + self.rare + self.uncommon + self.common
    }

    /// Pairs in rarity order, highest first.
    pub fn iter(&self) -> impl Iterator<Item = (Rarity, u64)> + '_ {
        Rarity::ALL.into_iter().map(|rarity| (rarity, self.get(rarity)))
    }
}

/// Sum of realized values; 0 for no draws.
#[must_use]
pub fn sum_values(results: &[DrawResult]) -> u64 {
    results
        .iter()
        .fold(0_u64, |total, result| total.saturating_add(result.realized_value))
}

/// Rarity first, then realized value.
fn compare_draws(a: &DrawResult, b: &DrawResult) -> Ordering {
    a.reward
        .rarity
        .cmp(&b.reward.rarity)
        .then(a.realized_value.cmp(&b.realized_value))
}

/// Best draw by rarity, ties broken by value. On a full tie the earliest draw wins.
#[must_use]
pub fn best_result(results: &[DrawResult]) -> Option<&DrawResult> {
    results.iter().reduce(|best, current| {
        if compare_draws(current, best) == Ordering::Greater {
            current
        } else {
            best
        }
    })
}

#[must_use]
pub fn counts_by_rarity(results: &[DrawResult]) -> RarityCounts {
    let mut counts = RarityCounts::default();
    for result in results {
        counts.record(result.reward.rarity);
    }
    counts
}

/// Running totals of a box-opening session, owned by the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxSession {
    total_opened: u64,
    total_earned: u64,
    total_spent: u64,
    best: Option<DrawResult>,
    rarity_counts: RarityCounts,
    history: VecDeque<DrawResult>,
}

impl BoxSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a batch of draws from `definition` into the session.
    pub fn record(&mut self, definition: &BoxDefinition, results: &[DrawResult]) {
        let opened = u64::try_from(results.len()).unwrap_or(u64::MAX);
        self.total_opened = self.total_opened.saturating_add(opened);
        self.total_earned = self.total_earned.saturating_add(sum_values(results));
        self.total_spent = self
            .total_spent
            .saturating_add(definition.cost().saturating_mul(opened));
        for result in results {
            self.rarity_counts.record(result.reward.rarity);
            let improves = self
                .best
                .as_ref()
                .is_none_or(|best| compare_draws(result, best) == Ordering::Greater);
            if improves {
                self.best = Some(result.clone());
            }
            self.history.push_front(result.clone());
        }
        self.history.truncate(MAX_DRAW_HISTORY);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub const fn total_opened(&self) -> u64 {
        self.total_opened
    }

    #[must_use]
    pub const fn total_earned(&self) -> u64 {
        self.total_earned
    }

    #[must_use]
    pub const fn total_spent(&self) -> u64 {
        self.total_spent
    }

    #[must_use]
    pub const fn best(&self) -> Option<&DrawResult> {
        self.best.as_ref()
    }

    #[must_use]
    pub const fn rarity_counts(&self) -> &RarityCounts {
        &self.rarity_counts
    }

    /// Most recent draws, newest first.
    pub fn history(&self) -> impl Iterator<Item = &DrawResult> {
        self.history.iter()
    }

    /// Earned minus spent at a 1:1 exchange rate.
    #[must_use]
    pub fn profit(&self) -> f64 {
        profit_loss(
            u64_to_f64(self.total_earned),
            u64_to_f64(self.total_spent),
            None,
        )
    }
}
