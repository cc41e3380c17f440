//! Card upgrade levels: the static level table, success chances and regression.
use serde::{Deserialize, Serialize};

use crate::constants::{BASE_LEVEL_BONUS, MAX_LEVEL, MIN_LEVEL, PERCENT_SCALE};
use crate::data::{DataError, UPGRADE_LEVELS_ASSET};

pub mod machine;
pub mod run;

pub use machine::{
    OutcomeKind, Regression, UpgradeOutcome, apply_regression, attempt_upgrade,
    attempt_upgrade_with, effective_chance,
};
pub use run::{BoostCard, BoostGauge, UpgradeRun};

/// One level transition, `from` -> `from + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeLevelRule {
    pub from: u8,
    pub to: u8,
    pub rating_gain: u32,
    pub cumulative_rating_gain: u32,
    pub base_success_chance: f64,
}

/// The full level table, rows ordered by `from`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UpgradeTable {
    #[serde(default)]
    levels: Vec<UpgradeLevelRule>,
}

impl UpgradeTable {
    /// Build a table from rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows do not describe levels 1 through 13.
    pub fn new(levels: Vec<UpgradeLevelRule>) -> Result<Self, DataError> {
        let table = Self { levels };
        table.validate()?;
        Ok(table)
    }

    /// # Errors
    ///
    /// Returns an error on gaps, bad steps, out-of-range chances or a
    /// cumulative gain that is not the running total.
    pub fn validate(&self) -> Result<(), DataError> {
        let expected_rows = usize::from(MAX_LEVEL - MIN_LEVEL);
        if self.levels.is_empty() {
            return Err(DataError::EmptyCatalog {
                asset: UPGRADE_LEVELS_ASSET,
            });
        }
        if self.levels.len() != expected_rows {
            return Err(DataError::LevelCount {
                expected: expected_rows,
                found: self.levels.len(),
            });
        }
        let mut running = BASE_LEVEL_BONUS;
        for (index, (rule, expected_from)) in self.levels.iter().zip(MIN_LEVEL..).enumerate() {
            if rule.from != expected_from {
                return Err(DataError::LevelSequence {
                    index,
                    expected: expected_from,
                    found: rule.from,
                });
            }
            if rule.to != rule.from.saturating_add(1) {
                return Err(DataError::LevelStep {
                    from: rule.from,
                    to: rule.to,
                });
            }
            if !(0.0..=PERCENT_SCALE).contains(&rule.base_success_chance) {
                return Err(DataError::BaseChanceRange {
                    from: rule.from,
                    chance: rule.base_success_chance,
                });
            }
            running = running.saturating_add(rule.rating_gain);
            if rule.cumulative_rating_gain != running {
                return Err(DataError::CumulativeMismatch {
                    to: rule.to,
                    expected: running,
                    found: rule.cumulative_rating_gain,
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn rules(&self) -> &[UpgradeLevelRule] {
        &self.levels
    }

    /// The transition that starts at `level`.
    #[must_use]
    pub fn rule_from(&self, level: u8) -> Option<&UpgradeLevelRule> {
        self.levels.iter().find(|rule| rule.from == level)
    }

    /// Base success chance (percent) for an attempt at `level`; 0 when there is no row.
    #[must_use]
    pub fn base_chance(&self, level: u8) -> f64 {
        self.rule_from(level)
            .map_or(0.0, |rule| rule.base_success_chance)
    }

    /// Total rating bonus a card carries at `level`.
    #[must_use]
    pub fn cumulative_bonus_at(&self, level: u8) -> u32 {
        match level {
            0 => 0,
            MIN_LEVEL => BASE_LEVEL_BONUS,
            _ => self
                .levels
                .iter()
                .find(|rule| rule.to == level)
                .map_or(0, |rule| rule.cumulative_rating_gain),
        }
    }
}

#[must_use]
pub const fn is_max_level(level: u8) -> bool {
    level >= MAX_LEVEL
}

#[must_use]
pub const fn is_min_level(level: u8) -> bool {
    level <= MIN_LEVEL
}

/// Display colour band of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelTier {
    Gray,
    Bronze,
    Silver,
    Gold,
    Rainbow,
}

impl LevelTier {
    #[must_use]
    pub const fn from_level(level: u8) -> Self {
        match level {
            0..=1 => Self::Gray,
            2..=4 => Self::Bronze,
            5..=7 => Self::Silver,
            8..=9 => Self::Gold,
            _ => Self::Rainbow,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Gray => "gray",
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Rainbow => "rainbow",
        }
    }
}
