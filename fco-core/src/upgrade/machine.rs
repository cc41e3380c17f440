use rand::Rng;
use serde::{Deserialize, Serialize};

use super::UpgradeTable;
use crate::constants::{
    CATASTROPHIC_CHANCE, MAX_BOOST, MAX_LEVEL, MIN_LEVEL, PERCENT_SCALE, REGRESSION_TIERS,
};
use crate::numbers::round_to_hundredths;

/// Result of a single upgrade attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeOutcome {
    pub success: bool,
    pub previous_level: u8,
    pub new_level: u8,
    pub is_catastrophic: bool,
}

impl UpgradeOutcome {
    const fn unchanged(level: u8) -> Self {
        Self {
            success: false,
            previous_level: level,
            new_level: level,
            is_catastrophic: false,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> OutcomeKind {
        if self.success {
            OutcomeKind::Success
        } else if self.is_catastrophic {
            OutcomeKind::Catastrophic
        } else {
            OutcomeKind::Fail
        }
    }

    #[must_use]
    pub const fn levels_lost(&self) -> u8 {
        self.previous_level.saturating_sub(self.new_level)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    Fail,
    Catastrophic,
}

/// Level change applied after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regression {
    pub new_level: u8,
    pub is_catastrophic: bool,
    pub drop: u8,
}

/// Success chance (percent, two decimals) once `boost` scales the base chance.
///
/// A boost of 5 keeps the base chance, 0 makes success impossible. The result is
/// clamped to 0..=100 and non-finite inputs yield 0.
#[must_use]
pub fn effective_chance(base_chance: f64, boost: f64) -> f64 {
    let scaled = base_chance * (boost / MAX_BOOST);
    if !scaled.is_finite() {
        return 0.0;
    }
    round_to_hundredths(scaled.clamp(0.0, PERCENT_SCALE))
}

/// Level drop after a failure at `level`. Level 1 is the floor and never drops.
pub fn apply_regression<R>(level: u8, rng: &mut R) -> Regression
where
    R: Rng + ?Sized,
{
    if level <= MIN_LEVEL {
        return Regression {
            new_level: MIN_LEVEL,
            is_catastrophic: false,
            drop: 0,
        };
    }

    let catastrophic_roll: f64 = rng.r#gen();
    let is_catastrophic = catastrophic_roll < CATASTROPHIC_CHANCE;
    let tier = REGRESSION_TIERS
        .iter()
        .find(|tier| level <= tier.max_level)
        .unwrap_or(&REGRESSION_TIERS[REGRESSION_TIERS.len() - 1]);
    let (min_drop, max_drop) = if is_catastrophic {
        tier.catastrophic
    } else {
        tier.normal
    };
    let drop = rng.gen_range(min_drop..=max_drop);
    let new_level = level.saturating_sub(drop).max(MIN_LEVEL);
    log::trace!(
        "regression at level {level}: catastrophic roll {catastrophic_roll:.4}, drop {drop}"
    );
    Regression {
        new_level,
        is_catastrophic,
        drop,
    }
}

/// Attempt to advance from `level` with regression on failure.
pub fn attempt_upgrade<R>(table: &UpgradeTable, level: u8, boost: f64, rng: &mut R) -> UpgradeOutcome
where
    R: Rng + ?Sized,
{
    attempt_upgrade_with(table, level, boost, false, rng)
}

/// Attempt to advance from `level`; with `protect` a failure keeps the level.
pub fn attempt_upgrade_with<R>(
    table: &UpgradeTable,
    level: u8,
    boost: f64,
    protect: bool,
    rng: &mut R,
) -> UpgradeOutcome
where
    R: Rng + ?Sized,
{
    if level >= MAX_LEVEL {
        return UpgradeOutcome::unchanged(level);
    }

    let chance = effective_chance(table.base_chance(level), boost);
    let roll = rng.r#gen::<f64>() * PERCENT_SCALE;
    log::trace!("upgrade roll {roll:.4} against {chance:.2}% at level {level}");

    let outcome = if roll < chance {
        UpgradeOutcome {
            success: true,
            previous_level: level,
            new_level: level + 1,
            is_catastrophic: false,
        }
    } else if protect {
        UpgradeOutcome::unchanged(level)
    } else {
        let regression = apply_regression(level, rng);
        UpgradeOutcome {
            success: false,
            previous_level: level,
            new_level: regression.new_level,
            is_catastrophic: regression.is_catastrophic,
        }
    };
    log::debug!(
        "upgrade {:?}: level {} -> {} (chance {chance:.2}%)",
        outcome.kind(),
        outcome.previous_level,
        outcome.new_level
    );
    outcome
}
