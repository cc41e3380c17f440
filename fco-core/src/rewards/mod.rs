//! Loot boxes: reward tables, weighted draws and session aggregates.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::constants::{
    DEFAULT_EXCHANGE_RATE, EXPECTED_CHANCE_SUM, MAX_DRAW_COUNT, MIN_DRAW_COUNT, SUM_TOLERANCE,
};
use crate::data::{BOXES_ASSET, DataError};
use crate::numbers::u64_to_f64;

pub mod draw;
pub mod stats;

pub use draw::{DrawResult, draw_many, draw_once, roll_value, select_reward};
pub use stats::{BoxSession, RarityCounts, best_result, counts_by_rarity, sum_values};

/// Reward rarity, ordered from common to legendary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Highest first.
    pub const ALL: [Self; 5] = [
        Self::Legendary,
        Self::Epic,
        Self::Rare,
        Self::Uncommon,
        Self::Common,
    ];

    /// Rank used when comparing draws: legendary 5 down to common 1.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Legendary => 5,
            Self::Epic => 4,
            Self::Rare => 3,
            Self::Uncommon => 2,
            Self::Common => 1,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Legendary => "legendary",
            Self::Epic => "epic",
            Self::Rare => "rare",
            Self::Uncommon => "uncommon",
            Self::Common => "common",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// What a box pays out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueUnit {
    #[default]
    Bp,
    Count,
}

/// One reward tier of a box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardEntry {
    pub id: String,
    pub name: String,
    pub min_value: u64,
    pub max_value: u64,
    /// Percent, relative to the sum over the box.
    pub chance: f64,
    pub rarity: Rarity,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBox {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    value_unit: ValueUnit,
    cost: u64,
    #[serde(default)]
    expires_at: Option<String>,
    #[serde(default)]
    purchase_limit: Option<u32>,
    #[serde(default)]
    rewards: Vec<RewardEntry>,
}

impl TryFrom<RawBox> for BoxDefinition {
    type Error = DataError;

    fn try_from(raw: RawBox) -> Result<Self, Self::Error> {
        let definition = Self {
            id: raw.id,
            name: raw.name,
            description: raw.description,
            value_unit: raw.value_unit,
            cost: raw.cost,
            expires_at: raw.expires_at,
            purchase_limit: raw.purchase_limit,
            rewards: raw.rewards,
        };
        definition.validate()?;
        Ok(definition)
    }
}

/// A box with at least one reward. Construction validates the reward table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawBox")]
pub struct BoxDefinition {
    id: String,
    name: String,
    description: String,
    value_unit: ValueUnit,
    cost: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purchase_limit: Option<u32>,
    rewards: Vec<RewardEntry>,
}

impl BoxDefinition {
    /// # Errors
    ///
    /// Returns an error if `rewards` is empty or any reward is malformed.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        cost: u64,
        rewards: Vec<RewardEntry>,
    ) -> Result<Self, DataError> {
        RawBox {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            value_unit: ValueUnit::default(),
            cost,
            expires_at: None,
            purchase_limit: None,
            rewards,
        }
        .try_into()
    }

    fn validate(&self) -> Result<(), DataError> {
        if self.rewards.is_empty() {
            return Err(DataError::EmptyRewards {
                box_id: self.id.clone(),
            });
        }
        for reward in &self.rewards {
            if reward.min_value > reward.max_value {
                return Err(DataError::RewardRange {
                    box_id: self.id.clone(),
                    reward: reward.id.clone(),
                    min: reward.min_value,
                    max: reward.max_value,
                });
            }
            if !reward.chance.is_finite() || reward.chance < 0.0 {
                return Err(DataError::InvalidChance {
                    box_id: self.id.clone(),
                    reward: reward.id.clone(),
                    chance: reward.chance,
                });
            }
        }
        let sum = self.total_chance();
        if (sum - EXPECTED_CHANCE_SUM).abs() > SUM_TOLERANCE {
            log::warn!("box {} drop chances sum to {sum:.2}, draws are normalised", self.id);
        }
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn value_unit(&self) -> ValueUnit {
        self.value_unit
    }

    /// Price of one draw.
    #[must_use]
    pub const fn cost(&self) -> u64 {
        self.cost
    }

    #[must_use]
    pub fn expires_at(&self) -> Option<&str> {
        self.expires_at.as_deref()
    }

    #[must_use]
    pub const fn purchase_limit(&self) -> Option<u32> {
        self.purchase_limit
    }

    /// Never empty.
    #[must_use]
    pub fn rewards(&self) -> &[RewardEntry] {
        &self.rewards
    }

    #[must_use]
    pub fn total_chance(&self) -> f64 {
        self.rewards.iter().map(|reward| reward.chance).sum()
    }

    /// Mean value of one draw, each tier valued at the middle of its range.
    #[must_use]
    pub fn expected_value(&self) -> f64 {
        let total = self.total_chance();
        if total <= 0.0 {
            return 0.0;
        }
        self.rewards
            .iter()
            .map(|reward| {
                let mid = (u64_to_f64(reward.min_value) + u64_to_f64(reward.max_value)) / 2.0;
                mid * reward.chance / total
            })
            .sum()
    }
}

/// All boxes in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BoxCatalog {
    #[serde(default)]
    boxes: Vec<BoxDefinition>,
}

impl BoxCatalog {
    /// # Errors
    ///
    /// Returns an error if box ids repeat or the catalog is empty.
    pub fn new(boxes: Vec<BoxDefinition>) -> Result<Self, DataError> {
        let catalog = Self { boxes };
        catalog.validate()?;
        Ok(catalog)
    }

    /// # Errors
    ///
    /// Returns an error if box ids repeat or the catalog is empty.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.boxes.is_empty() {
            return Err(DataError::EmptyCatalog { asset: BOXES_ASSET });
        }
        let mut seen = HashSet::new();
        for definition in &self.boxes {
            if !seen.insert(definition.id()) {
                return Err(DataError::DuplicateBox {
                    box_id: definition.id.clone(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&BoxDefinition> {
        self.boxes.iter().find(|definition| definition.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoxDefinition> {
        self.boxes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// Net result of a batch given the exchange rate between spend and reward units.
#[must_use]
pub fn profit_loss(earned: f64, spent: f64, rate: Option<f64>) -> f64 {
    earned - spent * rate.unwrap_or(DEFAULT_EXCHANGE_RATE)
}

/// Draw count a caller should request for user input `count`.
#[must_use]
pub fn clamp_draw_count(count: u32) -> u32 {
    count.clamp(MIN_DRAW_COUNT, MAX_DRAW_COUNT)
}

/// Compact BP amount with one decimal: `1.5T`, `2.0B`, `3.0M`, `4.5K`.
#[must_use]
pub fn format_bp(value: u64) -> String {
    const SUFFIXES: [(u64, &str); 4] = [
        (1_000_000_000_000, "T"),
        (1_000_000_000, "B"),
        (1_000_000, "M"),
        (1_000, "K"),
    ];
    SUFFIXES
        .iter()
        .find(|(limit, _)| value >= *limit)
        .map_or_else(
            || value.to_string(),
            |(limit, suffix)| format!("{:.1}{suffix}", u64_to_f64(value) / u64_to_f64(*limit)),
        )
}
