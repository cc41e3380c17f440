//! Static reference data: position weights, the upgrade table and box definitions.
//!
//! All three ship as JSON assets embedded in the crate. They are loaded through
//! [`DataLoader`] and validated once, before any simulation runs, so the hot
//! paths never have to deal with malformed data.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::DataLoader;
use crate::constants::{EXPECTED_WEIGHT_SUM, SUM_TOLERANCE};
use crate::rewards::BoxCatalog;
use crate::upgrade::UpgradeTable;

pub const POSITIONS_ASSET: &str = "positions";
pub const UPGRADE_LEVELS_ASSET: &str = "upgrade_levels";
pub const BOXES_ASSET: &str = "boxes";

const POSITIONS_JSON: &str = include_str!("../assets/data/positions.json");
const UPGRADE_LEVELS_JSON: &str = include_str!("../assets/data/upgrade_levels.json");
const BOXES_JSON: &str = include_str!("../assets/data/boxes.json");

/// Validation failures found while loading reference data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataError {
    #[error("{asset} contains no entries")]
    EmptyCatalog { asset: &'static str },
    #[error("position {position} has no weighted stats")]
    EmptyWeights { position: String },
    #[error("position {position} is declared more than once")]
    DuplicatePosition { position: String },
    #[error("position {position} has invalid weight {weight} for stat {stat}")]
    InvalidWeight {
        position: String,
        stat: String,
        weight: f64,
    },
    #[error("box {box_id} has no rewards")]
    EmptyRewards { box_id: String },
    #[error("box {box_id} reward {reward} has min {min} above max {max}")]
    RewardRange {
        box_id: String,
        reward: String,
        min: u64,
        max: u64,
    },
    #[error("box {box_id} reward {reward} has invalid drop chance {chance}")]
    InvalidChance {
        box_id: String,
        reward: String,
        chance: f64,
    },
    #[error("box {box_id} is declared more than once")]
    DuplicateBox { box_id: String },
    #[error("upgrade table must have {expected} rows (got {found})")]
    LevelCount { expected: usize, found: usize },
    #[error("upgrade row {index} starts at level {found}, expected {expected}")]
    LevelSequence { index: usize, expected: u8, found: u8 },
    #[error("upgrade row {from} -> {to} must advance exactly one level")]
    LevelStep { from: u8, to: u8 },
    #[error("upgrade row {from} base chance {chance} is outside 0-100")]
    BaseChanceRange { from: u8, chance: f64 },
    #[error("upgrade row to level {to} has cumulative gain {found}, expected {expected}")]
    CumulativeMismatch { to: u8, expected: u32, found: u32 },
}

/// Errors produced by [`StaticDataLoader`].
#[derive(Debug, Error)]
pub enum StaticDataError {
    #[error("unknown asset {0}")]
    UnknownAsset(String),
    #[error("failed to parse asset {asset}")]
    Parse {
        asset: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Serves the JSON assets compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDataLoader;

impl StaticDataLoader {
    /// Raw JSON for a named asset.
    #[must_use]
    pub fn raw(name: &str) -> Option<&'static str> {
        match name {
            POSITIONS_ASSET => Some(POSITIONS_JSON),
            UPGRADE_LEVELS_ASSET => Some(UPGRADE_LEVELS_JSON),
            BOXES_ASSET => Some(BOXES_JSON),
            _ => None,
        }
    }
}

impl DataLoader for StaticDataLoader {
    type Error = StaticDataError;

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        let raw = Self::raw(config_name)
            .ok_or_else(|| StaticDataError::UnknownAsset(config_name.to_string()))?;
        serde_json::from_str(raw).map_err(|source| StaticDataError::Parse {
            asset: config_name.to_string(),
            source,
        })
    }
}

/// Failure while assembling [`ReferenceData`] from a loader.
#[derive(Debug, Error)]
pub enum LoadError<E>
where
    E: std::error::Error + 'static,
{
    #[error("failed to load asset {asset}")]
    Source {
        asset: &'static str,
        #[source]
        source: E,
    },
    #[error(transparent)]
    Invalid(#[from] DataError),
}

/// One weighted stat in a position's rating formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub stat: String,
    pub weight: f64,
}

/// Rating weights for a single playable position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionWeights {
    pub id: String,
    pub display_name: String,
    pub stats: Vec<WeightEntry>,
}

impl PositionWeights {
    #[must_use]
    pub fn weight_of(&self, stat: &str) -> Option<f64> {
        self.stats
            .iter()
            .find(|entry| entry.stat == stat)
            .map(|entry| entry.weight)
    }

    #[must_use]
    pub fn weight_sum(&self) -> f64 {
        self.stats.iter().map(|entry| entry.weight).sum()
    }
}

/// All known positions in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PositionCatalog {
    #[serde(default)]
    positions: Vec<PositionWeights>,
}

impl PositionCatalog {
    /// Build a catalog from already-parsed positions.
    ///
    /// # Errors
    ///
    /// Returns an error if any position fails validation.
    pub fn new(positions: Vec<PositionWeights>) -> Result<Self, DataError> {
        let catalog = Self { positions };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check structural invariants and log soft anomalies.
    ///
    /// # Errors
    ///
    /// Returns an error for empty or duplicate positions and invalid weights.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.positions.is_empty() {
            return Err(DataError::EmptyCatalog {
                asset: POSITIONS_ASSET,
            });
        }
        let mut seen = HashSet::new();
        for position in &self.positions {
            if !seen.insert(position.id.as_str()) {
                return Err(DataError::DuplicatePosition {
                    position: position.id.clone(),
                });
            }
            if position.stats.is_empty() {
                return Err(DataError::EmptyWeights {
                    position: position.id.clone(),
                });
            }
            if let Some(bad) = position
                .stats
                .iter()
                .find(|entry| !entry.weight.is_finite() || entry.weight < 0.0)
            {
                return Err(DataError::InvalidWeight {
                    position: position.id.clone(),
                    stat: bad.stat.clone(),
                    weight: bad.weight,
                });
            }
            let sum = position.weight_sum();
            if (sum - EXPECTED_WEIGHT_SUM).abs() > SUM_TOLERANCE {
                log::warn!(
                    "position {} weights sum to {sum}, ratings lose their 0-100 scale",
                    position.id
                );
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PositionWeights> {
        self.positions.iter().find(|position| position.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.positions.iter().map(|position| position.id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PositionWeights> {
        self.positions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Every stat name used by any position, first-seen order, no repeats.
    #[must_use]
    pub fn all_stat_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.positions
            .iter()
            .flat_map(|position| position.stats.iter())
            .map(|entry| entry.stat.as_str())
            .filter(|stat| seen.insert(*stat))
            .collect()
    }
}

/// Validated reference data shared by every calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceData {
    pub positions: PositionCatalog,
    pub upgrades: UpgradeTable,
    pub boxes: BoxCatalog,
}

impl ReferenceData {
    /// Load and validate all assets from `loader`.
    ///
    /// # Errors
    ///
    /// Returns an error if an asset cannot be loaded or fails validation.
    pub fn load<L>(loader: &L) -> Result<Self, LoadError<L::Error>>
    where
        L: DataLoader,
    {
        let positions: PositionCatalog = loader
            .load_config(POSITIONS_ASSET)
            .map_err(|source| LoadError::Source {
                asset: POSITIONS_ASSET,
                source,
            })?;
        positions.validate()?;

        let upgrades: UpgradeTable = loader
            .load_config(UPGRADE_LEVELS_ASSET)
            .map_err(|source| LoadError::Source {
                asset: UPGRADE_LEVELS_ASSET,
                source,
            })?;
        upgrades.validate()?;

        let boxes: BoxCatalog = loader
            .load_config(BOXES_ASSET)
            .map_err(|source| LoadError::Source {
                asset: BOXES_ASSET,
                source,
            })?;
        boxes.validate()?;

        log::debug!(
            "loaded {} positions, {} upgrade rows, {} boxes",
            positions.len(),
            upgrades.rules().len(),
            boxes.len()
        );
        Ok(Self {
            positions,
            upgrades,
            boxes,
        })
    }

    /// Load the assets compiled into the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded assets are malformed.
    pub fn embedded() -> Result<Self, LoadError<StaticDataError>> {
        Self::load(&StaticDataLoader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(id: &str, stats: &[(&str, f64)]) -> PositionWeights {
        PositionWeights {
            id: id.to_string(),
            display_name: id.to_string(),
            stats: stats
                .iter()
                .map(|(stat, weight)| WeightEntry {
                    stat: (*stat).to_string(),
                    weight: *weight,
                })
                .collect(),
        }
    }

    #[test]
    fn embedded_assets_load_and_validate() {
        let data = ReferenceData::embedded().expect("embedded data is valid");
        assert_eq!(data.positions.len(), 11);
        assert_eq!(data.upgrades.rules().len(), 12);
        assert_eq!(data.boxes.len(), 2);
        assert!(data.positions.get("ST").is_some());
        assert!(data.boxes.get("champions-chest-dec-2025").is_some());
    }

    #[test]
    fn unknown_asset_is_reported() {
        let err = StaticDataLoader
            .load_config::<serde_json::Value>("season-meta")
            .unwrap_err();
        assert!(matches!(err, StaticDataError::UnknownAsset(name) if name == "season-meta"));
    }

    #[test]
    fn empty_weight_table_is_rejected() {
        let err = PositionCatalog::new(vec![position("ST", &[])]).unwrap_err();
        assert_eq!(
            err,
            DataError::EmptyWeights {
                position: "ST".to_string()
            }
        );
    }

    #[test]
    fn duplicate_position_is_rejected() {
        let err = PositionCatalog::new(vec![
            position("CB", &[("a", 100.0)]),
            position("CB", &[("b", 100.0)]),
        ])
        .unwrap_err();
        assert!(matches!(err, DataError::DuplicatePosition { position } if position == "CB"));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let err = PositionCatalog::new(vec![position("GK", &[("a", -1.0)])]).unwrap_err();
        assert!(matches!(err, DataError::InvalidWeight { stat, .. } if stat == "a"));
    }

    #[test]
    fn off_scale_weights_are_still_usable() {
        let catalog = PositionCatalog::new(vec![position("X", &[("a", 40.0), ("b", 20.0)])])
            .expect("soft anomaly only");
        assert!((catalog.get("X").map_or(0.0, PositionWeights::weight_sum) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn stat_names_are_unique_in_first_seen_order() {
        let catalog = PositionCatalog::new(vec![
            position("A", &[("x", 50.0), ("y", 50.0)]),
            position("B", &[("y", 50.0), ("z", 50.0)]),
        ])
        .unwrap();
        assert_eq!(catalog.all_stat_names(), vec!["x", "y", "z"]);
        assert_eq!(catalog.ids().collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn weight_lookup_misses_unknown_stat() {
        let entry = position("A", &[("x", 50.0)]);
        assert_eq!(entry.weight_of("x"), Some(50.0));
        assert_eq!(entry.weight_of("nope"), None);
    }
}
