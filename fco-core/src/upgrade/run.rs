use rand::Rng;
use serde::{Deserialize, Serialize};

use super::machine::{OutcomeKind, UpgradeOutcome, attempt_upgrade_with, effective_chance};
use super::{UpgradeTable, is_max_level};
use crate::constants::{BOOST_CARD_COUNT, MAX_BOOST, MAX_LEVEL, MIN_LEVEL};
use crate::numbers::percent_of;

/// Fill state of one material card feeding the boost gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoostCard {
    Empty,
    Half,
    #[default]
    Full,
}

impl BoostCard {
    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::Empty => 0.0,
            Self::Half => 0.5,
            Self::Full => 1.0,
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Empty => Self::Half,
            Self::Half => Self::Full,
            Self::Full => Self::Empty,
        }
    }
}

/// Five material cards whose values add up to the boost amount (0.0 to 5.0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoostGauge {
    cards: [BoostCard; BOOST_CARD_COUNT],
}

impl BoostGauge {
    #[must_use]
    pub const fn new(cards: [BoostCard; BOOST_CARD_COUNT]) -> Self {
        Self { cards }
    }

    #[must_use]
    pub const fn full() -> Self {
        Self::new([BoostCard::Full; BOOST_CARD_COUNT])
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self::new([BoostCard::Empty; BOOST_CARD_COUNT])
    }

    /// Closest gauge to `amount`, filled left to right in half steps.
    #[must_use]
    pub fn from_amount(amount: f64) -> Self {
        let mut remaining = if amount.is_finite() { amount } else { 0.0 };
        let mut gauge = Self::empty();
        for card in &mut gauge.cards {
            *card = if remaining >= 1.0 {
                BoostCard::Full
            } else if remaining >= 0.5 {
                BoostCard::Half
            } else {
                BoostCard::Empty
            };
            remaining -= card.value();
        }
        gauge
    }

    #[must_use]
    pub fn amount(&self) -> f64 {
        self.cards.iter().map(|card| card.value()).sum()
    }

    #[must_use]
    pub const fn cards(&self) -> &[BoostCard; BOOST_CARD_COUNT] {
        &self.cards
    }

    /// Rotate one card Empty -> Half -> Full -> Empty. Out-of-range indexes are ignored.
    pub fn cycle(&mut self, index: usize) {
        if let Some(card) = self.cards.get_mut(index) {
            *card = card.next();
        }
    }
}

/// Caller-owned state of an upgrade session on one card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeRun {
    start_level: u8,
    current_level: u8,
    gauge: BoostGauge,
    /// Raw boost amount replacing the gauge when set.
    boost: Option<f64>,
    protect: bool,
    attempts: u32,
    successes: u32,
    failures: u32,
    catastrophic_drops: u32,
    highest_level_reached: u8,
    last_outcome: Option<UpgradeOutcome>,
}

impl Default for UpgradeRun {
    fn default() -> Self {
        Self::new(MIN_LEVEL)
    }
}

impl UpgradeRun {
    #[must_use]
    pub fn new(start_level: u8) -> Self {
        let start_level = start_level.clamp(MIN_LEVEL, MAX_LEVEL);
        Self {
            start_level,
            current_level: start_level,
            gauge: BoostGauge::full(),
            boost: None,
            protect: false,
            attempts: 0,
            successes: 0,
            failures: 0,
            catastrophic_drops: 0,
            highest_level_reached: start_level,
            last_outcome: None,
        }
    }

    /// Change the starting level and start over.
    pub fn set_start_level(&mut self, level: u8) {
        *self = Self {
            protect: self.protect,
            ..Self::new(level)
        };
    }

    /// Back to the start level with cleared counters and a full gauge.
    pub fn reset(&mut self) {
        self.set_start_level(self.start_level);
    }

    pub const fn set_protection(&mut self, protect: bool) {
        self.protect = protect;
    }

    pub const fn set_gauge(&mut self, gauge: BoostGauge) {
        self.gauge = gauge;
        self.boost = None;
    }

    pub const fn gauge_mut(&mut self) -> &mut BoostGauge {
        self.boost = None;
        &mut self.gauge
    }

    /// Use `amount` as is instead of the gauge, clamped to 0..=5. Non-finite input counts as 0.
    pub fn set_boost(&mut self, amount: f64) {
        let amount = if amount.is_finite() { amount } else { 0.0 };
        self.boost = Some(amount.clamp(0.0, MAX_BOOST));
    }

    /// Boost applied to the next attempt.
    #[must_use]
    pub fn boost(&self) -> f64 {
        self.boost.unwrap_or_else(|| self.gauge.amount())
    }

    /// One attempt with the current gauge. At max level nothing is counted.
    pub fn attempt<R>(&mut self, table: &UpgradeTable, rng: &mut R) -> UpgradeOutcome
    where
        R: Rng + ?Sized,
    {
        let outcome = attempt_upgrade_with(
            table,
            self.current_level,
            self.boost(),
            self.protect,
            rng,
        );
        if is_max_level(self.current_level) {
            return outcome;
        }

        self.attempts = self.attempts.saturating_add(1);
        if outcome.success {
            self.successes = self.successes.saturating_add(1);
        } else {
            self.failures = self.failures.saturating_add(1);
        }
        if outcome.is_catastrophic {
            self.catastrophic_drops = self.catastrophic_drops.saturating_add(1);
        }
        self.current_level = outcome.new_level;
        self.highest_level_reached = self.highest_level_reached.max(outcome.new_level);
        self.last_outcome = Some(outcome);
        outcome
    }

    #[must_use]
    pub const fn start_level(&self) -> u8 {
        self.start_level
    }

    #[must_use]
    pub const fn current_level(&self) -> u8 {
        self.current_level
    }

    #[must_use]
    pub const fn gauge(&self) -> &BoostGauge {
        &self.gauge
    }

    #[must_use]
    pub const fn is_protected(&self) -> bool {
        self.protect
    }

    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    #[must_use]
    pub const fn successes(&self) -> u32 {
        self.successes
    }

    #[must_use]
    pub const fn failures(&self) -> u32 {
        self.failures
    }

    #[must_use]
    pub const fn catastrophic_drops(&self) -> u32 {
        self.catastrophic_drops
    }

    #[must_use]
    pub const fn highest_level_reached(&self) -> u8 {
        self.highest_level_reached
    }

    #[must_use]
    pub const fn last_outcome(&self) -> Option<UpgradeOutcome> {
        self.last_outcome
    }

    #[must_use]
    pub fn last_kind(&self) -> Option<OutcomeKind> {
        self.last_outcome.map(|outcome| outcome.kind())
    }

    #[must_use]
    pub fn success_rate(&self) -> f64 {
        percent_of(u64::from(self.successes), u64::from(self.attempts))
    }

    #[must_use]
    pub fn rating_bonus(&self, table: &UpgradeTable) -> u32 {
        table.cumulative_bonus_at(self.current_level)
    }

    /// Chance of the next attempt succeeding, 0 at max level.
    #[must_use]
    pub fn current_chance(&self, table: &UpgradeTable) -> f64 {
        effective_chance(table.base_chance(self.current_level), self.boost())
    }
}
