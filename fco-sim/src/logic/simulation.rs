//! Repeated upgrade campaigns and box-opening batches on top of the core engine.
use anyhow::{Result, bail};
use fco_core::constants::{MAX_BOOST, MAX_LEVEL, MIN_LEVEL};
use fco_core::numbers::{percent_of, round_to_hundredths, u64_to_f64};
use fco_core::{
    BoxSession, Clock, DrawResult, RarityCounts, RngBundle, Stream, Toolkit, UpgradeRun,
    ValueUnit, clamp_draw_count, draw_many,
};
use serde::Serialize;

use super::seeds::SeedInfo;

/// How a batch of upgrade campaigns is run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpgradeCampaign {
    pub start_level: u8,
    pub target_level: u8,
    pub boost: f64,
    pub protect: bool,
    pub max_attempts: u32,
    pub iterations: u32,
}

impl UpgradeCampaign {
    /// Clamp inputs into the ranges the engine accepts.
    #[must_use]
    pub fn normalized(self) -> Self {
        let start_level = self.start_level.clamp(MIN_LEVEL, MAX_LEVEL);
        Self {
            start_level,
            target_level: self.target_level.clamp(start_level, MAX_LEVEL),
            boost: if self.boost.is_finite() {
                self.boost.clamp(0.0, MAX_BOOST)
            } else {
                0.0
            },
            max_attempts: self.max_attempts.max(1),
            iterations: self.iterations.max(1),
            ..self
        }
    }
}

/// Aggregate of every campaign in a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeCampaignSummary {
    pub seed: SeedInfo,
    pub start_level: u8,
    pub target_level: u8,
    pub boost: f64,
    pub protect: bool,
    pub max_attempts: u32,
    pub iterations: u32,
    pub first_attempt_chance: f64,
    pub campaigns_reaching_target: u32,
    pub total_attempts: u64,
    pub total_successes: u64,
    pub total_failures: u64,
    pub catastrophic_drops: u64,
    /// Percent of attempts that succeeded.
    pub success_rate: f64,
    /// Mean attempts over the campaigns that reached the target.
    pub mean_attempts_to_target: Option<f64>,
    pub highest_level: u8,
    pub mean_final_level: f64,
    pub mean_rating_bonus: f64,
}

/// Play `campaign.iterations` independent campaigns on the bundle's upgrade stream.
#[must_use]
pub fn run_upgrade_campaigns(
    toolkit: &Toolkit,
    campaign: UpgradeCampaign,
    seed: SeedInfo,
    rngs: &RngBundle,
) -> UpgradeCampaignSummary {
    let campaign = campaign.normalized();
    let table = toolkit.upgrades();
    let mut rng = rngs.stream(Stream::Upgrade);

    let mut reached = 0_u32;
    let mut attempts_to_target = 0_u64;
    let mut total_attempts = 0_u64;
    let mut total_successes = 0_u64;
    let mut total_failures = 0_u64;
    let mut catastrophic_drops = 0_u64;
    let mut highest_level = campaign.start_level;
    let mut final_levels = 0_u64;
    let mut rating_bonus = 0_u64;

    for iteration in 0..campaign.iterations {
        let mut run = UpgradeRun::new(campaign.start_level);
        run.set_protection(campaign.protect);
        run.set_boost(campaign.boost);

        while run.current_level() < campaign.target_level && run.attempts() < campaign.max_attempts
        {
            run.attempt(table, &mut *rng);
        }

        if run.current_level() >= campaign.target_level {
            reached += 1;
            attempts_to_target += u64::from(run.attempts());
        }
        log::debug!(
            "campaign {iteration}: level {} after {} attempts ({} catastrophic)",
            run.current_level(),
            run.attempts(),
            run.catastrophic_drops()
        );

        total_attempts += u64::from(run.attempts());
        total_successes += u64::from(run.successes());
        total_failures += u64::from(run.failures());
        catastrophic_drops += u64::from(run.catastrophic_drops());
        highest_level = highest_level.max(run.highest_level_reached());
        final_levels += u64::from(run.current_level());
        rating_bonus += u64::from(run.rating_bonus(table));
    }

    let iterations = u64_to_f64(u64::from(campaign.iterations));
    let mean_attempts_to_target = (reached > 0)
        .then(|| round_to_hundredths(u64_to_f64(attempts_to_target) / f64::from(reached)));

    UpgradeCampaignSummary {
        seed,
        start_level: campaign.start_level,
        target_level: campaign.target_level,
        boost: campaign.boost,
        protect: campaign.protect,
        max_attempts: campaign.max_attempts,
        iterations: campaign.iterations,
        first_attempt_chance: toolkit.effective_chance(campaign.start_level, campaign.boost),
        campaigns_reaching_target: reached,
        total_attempts,
        total_successes,
        total_failures,
        catastrophic_drops,
        success_rate: percent_of(total_successes, total_attempts),
        mean_attempts_to_target,
        highest_level,
        mean_final_level: round_to_hundredths(u64_to_f64(final_levels) / iterations),
        mean_rating_bonus: round_to_hundredths(u64_to_f64(rating_bonus) / iterations),
    }
}

/// How a batch of box openings is run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawBatch {
    pub box_id: String,
    pub count: u32,
    pub iterations: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawBatchSummary {
    pub seed: SeedInfo,
    pub box_id: String,
    pub box_name: String,
    pub value_unit: ValueUnit,
    pub cost_per_draw: u64,
    pub draws_per_batch: u32,
    pub batches: u32,
    pub total_opened: u64,
    pub total_earned: u64,
    pub total_spent: u64,
    pub profit: f64,
    pub expected_value_per_draw: f64,
    pub mean_value_per_draw: f64,
    pub best: Option<DrawResult>,
    pub rarity_counts: RarityCounts,
    pub recent: Vec<DrawResult>,
}

/// Open the box `count` times per batch, `iterations` batches, folding everything into one session.
///
/// # Errors
///
/// Returns an error for an unknown box id.
pub fn run_draw_batches<C>(
    toolkit: &Toolkit,
    batch: &DrawBatch,
    seed: SeedInfo,
    rngs: &RngBundle,
    clock: &C,
) -> Result<DrawBatchSummary>
where
    C: Clock + ?Sized,
{
    let Some(definition) = toolkit.boxes().get(&batch.box_id) else {
        let known: Vec<&str> = toolkit.boxes().iter().map(|b| b.id()).collect();
        bail!("unknown box {} (known: {})", batch.box_id, known.join(", "));
    };
    let count = clamp_draw_count(batch.count);
    if count != batch.count {
        log::warn!("draw count {} clamped to {count}", batch.count);
    }
    let batches = batch.iterations.max(1);

    let per_batch = usize::try_from(count).unwrap_or(usize::MAX);
    let mut rng = rngs.stream(Stream::Rewards);
    let mut session = BoxSession::new();
    for _ in 0..batches {
        let results = draw_many(definition, per_batch, &mut *rng, clock);
        session.record(definition, &results);
    }

    let mean_value_per_draw = if session.total_opened() == 0 {
        0.0
    } else {
        u64_to_f64(session.total_earned()) / u64_to_f64(session.total_opened())
    };

    Ok(DrawBatchSummary {
        seed,
        box_id: definition.id().to_string(),
        box_name: definition.name().to_string(),
        value_unit: definition.value_unit(),
        cost_per_draw: definition.cost(),
        draws_per_batch: count,
        batches,
        total_opened: session.total_opened(),
        total_earned: session.total_earned(),
        total_spent: session.total_spent(),
        profit: session.profit(),
        expected_value_per_draw: round_to_hundredths(definition.expected_value()),
        mean_value_per_draw: round_to_hundredths(mean_value_per_draw),
        best: session.best().cloned(),
        rarity_counts: *session.rarity_counts(),
        recent: session.history().cloned().collect(),
    })
}
