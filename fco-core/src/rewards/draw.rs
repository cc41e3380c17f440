use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{BoxDefinition, RewardEntry};
use crate::clock::Clock;
use crate::constants::DRAW_ID_SUFFIX_LEN;

const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// One opened box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawResult {
    pub id: String,
    pub reward: RewardEntry,
    pub realized_value: u64,
    pub timestamp: DateTime<Utc>,
}

/// Pick a reward tier proportionally to its chance.
///
/// The roll is scaled by the actual sum of chances, so tables that do not add up
/// to 100 are normalised. If rounding leaves the roll positive after the last
/// entry, the last entry is returned.
pub fn select_reward<'a, R>(definition: &'a BoxDefinition, rng: &mut R) -> &'a RewardEntry
where
    R: Rng + ?Sized,
{
    let rewards = definition.rewards();
    let total = definition.total_chance();
    let draw = rng.r#gen::<f64>();
    let mut roll = if total > 0.0 { draw * total } else { 0.0 };
    log::trace!("box {} roll {roll:.4} of {total:.2}", definition.id());

    for reward in rewards {
        roll -= reward.chance;
        if roll <= 0.0 {
            return reward;
        }
    }
    &rewards[rewards.len() - 1]
}

/// Uniform integer in the reward's inclusive range.
pub fn roll_value<R>(reward: &RewardEntry, rng: &mut R) -> u64
where
    R: Rng + ?Sized,
{
    if reward.min_value >= reward.max_value {
        return reward.min_value;
    }
    rng.gen_range(reward.min_value..=reward.max_value)
}

fn draw_id<R>(timestamp: DateTime<Utc>, rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    let suffix: String = (0..DRAW_ID_SUFFIX_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())]))
        .collect();
    format!("{}-{suffix}", timestamp.timestamp_millis())
}

/// Open `definition` once.
pub fn draw_once<R, C>(definition: &BoxDefinition, rng: &mut R, clock: &C) -> DrawResult
where
    R: Rng + ?Sized,
    C: Clock + ?Sized,
{
    let reward = select_reward(definition, rng);
    let realized_value = roll_value(reward, rng);
    let timestamp = clock.now();
    let id = draw_id(timestamp, rng);
    log::debug!(
        "box {} drew {} ({}) worth {realized_value}",
        definition.id(),
        reward.id,
        reward.rarity
    );
    DrawResult {
        id,
        reward: reward.clone(),
        realized_value,
        timestamp,
    }
}

/// Open `definition` `count` times with independent draws.
pub fn draw_many<R, C>(
    definition: &BoxDefinition,
    count: usize,
    rng: &mut R,
    clock: &C,
) -> Vec<DrawResult>
where
    R: Rng + ?Sized,
    C: Clock + ?Sized,
{
    (0..count)
        .map(|_| draw_once(definition, rng, clock))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::rewards::Rarity;
    use crate::rewards::tests::reward;
    use rand::SeedableRng;
    use rand::rngs::mock::StepRng;
    use rand_chacha::ChaCha20Rng;

    fn fixed_box() -> BoxDefinition {
        BoxDefinition::new("fixed", "Fixed", 1, vec![reward("a", 10, 10, 100.0, Rarity::Common)])
            .unwrap()
    }

    fn three_tier_box() -> BoxDefinition {
        BoxDefinition::new(
            "tiers",
            "Tiers",
            100,
            vec![
                reward("gold", 1_000, 2_000, 10.0, Rarity::Legendary),
                reward("silver", 100, 200, 30.0, Rarity::Rare),
                reward("bronze", 1, 50, 60.0, Rarity::Common),
            ],
        )
        .unwrap()
    }

    #[test]
    fn single_fixed_reward_always_returns_its_value() {
        let definition = fixed_box();
        let clock = FixedClock::from_millis(1_000);
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        for result in draw_many(&definition, 50, &mut rng, &clock) {
            assert_eq!(result.realized_value, 10);
            assert_eq!(result.reward.id, "a");
        }
    }

    #[test]
    fn zero_count_is_empty() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        assert!(draw_many(&fixed_box(), 0, &mut rng, &FixedClock::from_millis(0)).is_empty());
    }

    #[test]
    fn extreme_rolls_hit_first_and_last_tiers() {
        let definition = three_tier_box();
        let mut low = StepRng::new(0, 0);
        assert_eq!(select_reward(&definition, &mut low).id, "gold");
        let mut high = StepRng::new(u64::MAX, 0);
        assert_eq!(select_reward(&definition, &mut high).id, "bronze");
    }

    #[test]
    fn zero_total_chance_selects_first_entry() {
        let definition = BoxDefinition::new(
            "zero",
            "Zero",
            1,
            vec![
                reward("first", 1, 1, 0.0, Rarity::Common),
                reward("second", 2, 2, 0.0, Rarity::Rare),
            ],
        )
        .unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        assert_eq!(select_reward(&definition, &mut rng).id, "first");
    }

    #[test]
    fn values_stay_in_range() {
        let definition = three_tier_box();
        let clock = FixedClock::from_millis(0);
        let mut rng = ChaCha20Rng::seed_from_u64(17);
        for result in draw_many(&definition, 2_000, &mut rng, &clock) {
            assert!(result.realized_value >= result.reward.min_value);
            assert!(result.realized_value <= result.reward.max_value);
        }
    }

    #[test]
    fn ids_carry_timestamp_and_base36_suffix() {
        let clock = FixedClock::from_millis(1_735_689_600_123);
        let mut rng = ChaCha20Rng::seed_from_u64(8);
        let result = draw_once(&fixed_box(), &mut rng, &clock);
        let (millis, suffix) = result.id.split_once('-').unwrap();
        assert_eq!(millis, "1735689600123");
        assert_eq!(suffix.len(), DRAW_ID_SUFFIX_LEN);
        assert!(suffix.bytes().all(|byte| ID_ALPHABET.contains(&byte)));
        assert_eq!(result.timestamp, clock.now());
    }

    #[test]
    fn same_seed_replays_same_draws() {
        let definition = three_tier_box();
        let clock = FixedClock::from_millis(42);
        let a = draw_many(&definition, 20, &mut ChaCha20Rng::seed_from_u64(9), &clock);
        let b = draw_many(&definition, 20, &mut ChaCha20Rng::seed_from_u64(9), &clock);
        assert_eq!(a, b);
    }
}
