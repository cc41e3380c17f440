//! Centralized tuning constants for the rating and simulation math.
//!
//! These values reproduce the in-game behaviour the tools model. Keeping them
//! together means the mechanics can only change through reviewed code, never
//! through the JSON reference data.

// Rating --------------------------------------------------------------------
/// Weights for a position are expressed as percentages.
pub const WEIGHT_SCALE: f64 = 100.0;
/// Points added to a stat by a single upgrade allocation.
pub const STAT_UPGRADE_VALUE: i32 = 2;
/// Number of stats a full upgrade allocation touches.
pub const MAX_STAT_UPGRADES: usize = 5;
pub const EXPECTED_WEIGHT_SUM: f64 = 100.0;

// Upgrade levels ------------------------------------------------------------
pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 13;
/// Rating bonus granted by a level-1 card before any upgrade.
pub const BASE_LEVEL_BONUS: u32 = 3;
pub const MAX_BOOST: f64 = 5.0;
pub const PERCENT_SCALE: f64 = 100.0;
/// Probability (0..1) that a failed attempt turns catastrophic.
pub const CATASTROPHIC_CHANCE: f64 = 0.10;
pub const BOOST_CARD_COUNT: usize = 5;

/// Inclusive level-drop ranges applied on failure, keyed by the highest level
/// of each bucket. The last bucket covers every level above the previous one.
pub(crate) const REGRESSION_TIERS: [RegressionTier; 4] = [
    RegressionTier {
        max_level: 4,
        normal: (1, 1),
        catastrophic: (2, 3),
    },
    RegressionTier {
        max_level: 7,
        normal: (2, 3),
        catastrophic: (4, 5),
    },
    RegressionTier {
        max_level: 9,
        normal: (3, 4),
        catastrophic: (5, 6),
    },
    RegressionTier {
        max_level: MAX_LEVEL,
        normal: (4, 6),
        catastrophic: (6, 8),
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RegressionTier {
    pub max_level: u8,
    pub normal: (u8, u8),
    pub catastrophic: (u8, u8),
}

// Boxes ---------------------------------------------------------------------
pub const EXPECTED_CHANCE_SUM: f64 = 100.0;
pub const MIN_DRAW_COUNT: u32 = 1;
pub const MAX_DRAW_COUNT: u32 = 100;
pub const MAX_DRAW_HISTORY: usize = 50;
/// Length of the random suffix in a draw id.
pub const DRAW_ID_SUFFIX_LEN: usize = 9;
pub const DEFAULT_EXCHANGE_RATE: f64 = 1.0;

// Data validation -------------------------------------------------------------
/// Tolerance used by soft sum checks on reference data.
pub const SUM_TOLERANCE: f64 = 1e-6;
