//! Random rolls used by combat formulas
//!
//! Every randomized formula takes an `Option<&mut dyn RngCore>`; `None`
//! means "do not randomize" and yields the deterministic value.

use rand::{Rng, RngCore};

/// Uniform integer in `[0, n)`, or 0 when `n <= 0`
pub fn random(rng: &mut dyn RngCore, n: i32) -> i32 {
    if n <= 0 {
        return 0;
    }
    rng.random_range(0..n)
}

/// To-hit offset in `[-25, 75]`
pub fn to_hit_offset(rng: &mut dyn RngCore) -> i32 {
    random(rng, 101) - 25
}

/// Damage perturbation: `+damage/8 - random(damage/4)`, truncated
pub fn damage_variance(rng: &mut dyn RngCore, damage: i32) -> i32 {
    let spread = random(rng, damage / 4);
    (damage as f64 / 8.0 - spread as f64) as i32
}

/// Pick a uniformly random element index
pub fn pick(rng: &mut dyn RngCore, len: usize) -> usize {
    if len <= 1 {
        return 0;
    }
    rng.random_range(0..len)
}
