//! FC Online toolkit core
//!
//! Platform-agnostic rating and simulation logic: weighted OVR scoring, upgrade
//! planning, the card upgrade state machine and loot box draws. Nothing here
//! performs I/O apart from reading the JSON reference data compiled into the crate.

pub mod analyzer;
pub mod clock;
pub mod constants;
pub mod data;
pub mod numbers;
pub mod optimizer;
pub mod rewards;
pub mod rng;
pub mod scoring;
pub mod upgrade;

// Re-export commonly used types
pub use analyzer::{PositionResult, best_position, rank_positions};
pub use clock::{Clock, FixedClock, SystemClock};
pub use data::{
    DataError, LoadError, PositionCatalog, PositionWeights, ReferenceData, StaticDataError,
    StaticDataLoader, WeightEntry,
};
pub use optimizer::{BoostTargets, EfficientPlan, efficient_upgrade_plan, top_upgrade_targets};
pub use rewards::{
    BoxCatalog, BoxDefinition, BoxSession, DrawResult, Rarity, RarityCounts, RewardEntry,
    ValueUnit, best_result, clamp_draw_count, counts_by_rarity, draw_many, draw_once, format_bp,
    profit_loss, sum_values,
};
pub use rng::{CountingRng, RngBundle, Stream};
pub use scoring::{StatTable, UpgradeImpact, format_ovr, score, score_with_boosts, upgrade_impact};
pub use upgrade::{
    BoostCard, BoostGauge, LevelTier, OutcomeKind, UpgradeLevelRule, UpgradeOutcome, UpgradeRun,
    UpgradeTable, attempt_upgrade, attempt_upgrade_with, effective_chance,
};

use rand::Rng;

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load configuration data for a specific asset
    ///
    /// # Errors
    ///
    /// Returns an error if the asset cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Entry points shaped like the HTTP API, backed by validated reference data.
#[derive(Debug, Clone)]
pub struct Toolkit {
    data: ReferenceData,
}

impl Toolkit {
    /// Load and validate reference data through `loader`.
    ///
    /// # Errors
    ///
    /// Returns an error if an asset cannot be loaded or fails validation.
    pub fn load<L>(loader: &L) -> anyhow::Result<Self>
    where
        L: DataLoader,
    {
        let data = ReferenceData::load(loader)?;
        Ok(Self { data })
    }

    /// Toolkit over the assets compiled into the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded assets are malformed.
    pub fn embedded() -> anyhow::Result<Self> {
        Self::load(&StaticDataLoader)
    }

    #[must_use]
    pub const fn from_data(data: ReferenceData) -> Self {
        Self { data }
    }

    #[must_use]
    pub const fn data(&self) -> &ReferenceData {
        &self.data
    }

    #[must_use]
    pub const fn positions(&self) -> &PositionCatalog {
        &self.data.positions
    }

    #[must_use]
    pub const fn upgrades(&self) -> &UpgradeTable {
        &self.data.upgrades
    }

    #[must_use]
    pub const fn boxes(&self) -> &BoxCatalog {
        &self.data.boxes
    }

    /// Rating at a position; 0 for an unknown position.
    #[must_use]
    pub fn score_position(&self, stats: &StatTable, position_id: &str) -> f64 {
        self.positions()
            .get(position_id)
            .map_or(0.0, |position| score(stats, &position.stats))
    }

    #[must_use]
    pub fn top_upgrade_targets(&self, position_id: &str, max_count: usize) -> Vec<WeightEntry> {
        top_upgrade_targets(self.positions(), position_id, max_count)
    }

    #[must_use]
    pub fn efficient_upgrade_plan(
        &self,
        stats: &StatTable,
        position_id: &str,
    ) -> Option<EfficientPlan> {
        efficient_upgrade_plan(self.positions(), stats, position_id)
    }

    #[must_use]
    pub fn rank_positions(&self, stats: &StatTable) -> Vec<PositionResult> {
        rank_positions(self.positions(), stats)
    }

    #[must_use]
    pub fn upgrade_impact(&self, stat: &str, position_id: &str) -> Option<UpgradeImpact> {
        upgrade_impact(self.positions(), stat, position_id)
    }

    /// Effective chance of an attempt at `level` with `boost`.
    #[must_use]
    pub fn effective_chance(&self, level: u8, boost: f64) -> f64 {
        effective_chance(self.upgrades().base_chance(level), boost)
    }

    pub fn attempt_upgrade<R>(&self, level: u8, boost: f64, rng: &mut R) -> UpgradeOutcome
    where
        R: Rng + ?Sized,
    {
        attempt_upgrade(self.upgrades(), level, boost, rng)
    }

    /// Open `count` boxes; an unknown box id yields no draws.
    pub fn draw<R, C>(&self, box_id: &str, count: usize, rng: &mut R, clock: &C) -> Vec<DrawResult>
    where
        R: Rng + ?Sized,
        C: Clock + ?Sized,
    {
        self.boxes()
            .get(box_id)
            .map_or_else(Vec::new, |definition| draw_many(definition, count, rng, clock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use serde::de::DeserializeOwned;
    use std::collections::HashMap;

    #[derive(Debug, thiserror::Error)]
    #[error("fixture asset {0} missing")]
    struct MissingAsset(String);

    /// Serves assets from memory so tests can swap in malformed data.
    #[derive(Default)]
    struct FixtureLoader {
        assets: HashMap<&'static str, String>,
    }

    impl FixtureLoader {
        fn embedded() -> Self {
            let assets = [
                data::POSITIONS_ASSET,
                data::UPGRADE_LEVELS_ASSET,
                data::BOXES_ASSET,
            ]
            .into_iter()
            .filter_map(|name| StaticDataLoader::raw(name).map(|raw| (name, raw.to_string())))
            .collect();
            Self { assets }
        }
    }

    impl DataLoader for FixtureLoader {
        type Error = MissingAsset;

        fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
        where
            T: DeserializeOwned,
        {
            let raw = self
                .assets
                .get(config_name)
                .ok_or_else(|| MissingAsset(config_name.to_string()))?;
            serde_json::from_str(raw).map_err(|err| MissingAsset(err.to_string()))
        }
    }

    #[test]
    fn toolkit_loads_through_custom_loader() {
        let toolkit = Toolkit::load(&FixtureLoader::embedded()).unwrap();
        assert_eq!(toolkit.positions().len(), 11);
        assert!((toolkit.effective_chance(1, 5.0) - 100.0).abs() < f64::EPSILON);
        assert!((toolkit.effective_chance(2, 2.5) - 40.5).abs() < 1e-9);
    }

    #[test]
    fn empty_reward_list_fails_at_load_time() {
        let mut loader = FixtureLoader::embedded();
        loader.assets.insert(
            data::BOXES_ASSET,
            r#"{"boxes":[{"id":"broken","name":"Broken","cost":1,"rewards":[]}]}"#.to_string(),
        );
        let err = Toolkit::load(&loader).unwrap_err();
        assert!(format!("{err:#}").contains("no rewards"));
    }

    #[test]
    fn empty_weight_table_fails_at_load_time() {
        let mut loader = FixtureLoader::embedded();
        loader.assets.insert(
            data::POSITIONS_ASSET,
            r#"{"positions":[{"id":"GK","displayName":"Keeper","stats":[]}]}"#.to_string(),
        );
        let err = Toolkit::load(&loader).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError<MissingAsset>>(),
            Some(LoadError::Invalid(DataError::EmptyWeights { .. }))
        ));
    }

    #[test]
    fn missing_asset_is_reported() {
        let mut loader = FixtureLoader::embedded();
        loader.assets.remove(data::UPGRADE_LEVELS_ASSET);
        let err = Toolkit::load(&loader).unwrap_err();
        assert!(format!("{err:#}").contains("upgrade_levels"));
    }

    #[test]
    fn unknown_keys_degrade_to_empty_results() {
        let toolkit = Toolkit::embedded().unwrap();
        let stats = StatTable::new();
        assert!(toolkit.score_position(&stats, "XX").abs() < f64::EPSILON);
        assert!(toolkit.top_upgrade_targets("XX", 5).is_empty());
        assert!(toolkit.efficient_upgrade_plan(&stats, "XX").is_none());
        assert!(toolkit.upgrade_impact("nope", "ST").is_none());
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        assert!(
            toolkit
                .draw("no-such-box", 10, &mut rng, &FixedClock::from_millis(0))
                .is_empty()
        );
    }

    #[test]
    fn upgrade_impact_uses_position_weight() {
        let toolkit = Toolkit::embedded().unwrap();
        let position = toolkit.positions().get("ST").unwrap();
        let entry = &position.stats[0];
        let impact = toolkit.upgrade_impact(&entry.stat, "ST").unwrap();
        assert!((impact.weight - entry.weight).abs() < f64::EPSILON);
        assert!((impact.impact - entry.weight * 2.0 / 100.0).abs() < 1e-12);
    }

    #[test]
    fn toolkit_draws_from_named_box() {
        let toolkit = Toolkit::embedded().unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(77);
        let draws = toolkit.draw(
            "champions-chest-dec-2025",
            25,
            &mut rng,
            &FixedClock::from_millis(5),
        );
        assert_eq!(draws.len(), 25);
        assert!(draws.iter().all(|d| d.realized_value == d.reward.min_value));
    }
}
