//! Post-combat reward calculation.

use core_types::Difficulty;

const BASE_XP_PER_MONSTER: u32 = 25;
const BASE_GOLD_PER_MONSTER: u32 = 10;

/// `xp = base_xp_per_monster * monsters_slain * difficulty_multiplier`,
/// rounded down. Computed once, at `combat_ended`, from the event log's
/// count of `unit_killed` events against monster units.
pub fn compute_xp(monsters_slain: u32, difficulty: Difficulty) -> u32 {
    ((BASE_XP_PER_MONSTER * monsters_slain) as f64 * difficulty.reward_multiplier()) as u32
}

/// `gold = base_gold_per_monster * monsters_slain * difficulty_multiplier`,
/// the same shape as `compute_xp` with its own base rate.
pub fn compute_gold(monsters_slain: u32, difficulty: Difficulty) -> u32 {
    ((BASE_GOLD_PER_MONSTER * monsters_slain) as f64 * difficulty.reward_multiplier()) as u32
}
