//! RNG module - seedable randomness for filling and shuffling
//!
//! Wraps `rand`'s `SmallRng` (xoshiro256++). Seeded boards replay identically,
//! which the tests and the demo's `--seed` flag rely on.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Random source shared by the filler, blocker spawning and shuffle recovery
#[derive(Debug, Clone)]
pub struct GameRng {
    inner: SmallRng,
}

impl GameRng {
    /// Create with a specific seed for deterministic behavior
    pub fn new(seed: u64) -> Self {
        Self {
            inner: SmallRng::seed_from_u64(seed),
        }
    }

    /// Create from system entropy
    pub fn from_entropy() -> Self {
        Self {
            inner: SmallRng::from_os_rng(),
        }
    }

    /// Random value in `[0, max)`; 0 when `max` is 0
    #[inline]
    pub fn next_range(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        self.inner.random_range(0..max)
    }

    /// Random value in `[low, high]`
    #[inline]
    pub fn range_inclusive(&mut self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }
        self.inner.random_range(low..=high)
    }

    /// True with probability `p` (a draw in `[0, 1)` compared with `<= p`)
    pub fn chance(&mut self, p: f64) -> bool {
        self.inner.random::<f64>() <= p
    }

    /// Index drawn proportionally to `weights`; `None` if every weight is zero
    pub fn weighted_index(&mut self, weights: &[u32]) -> Option<usize> {
        let total: u64 = weights.iter().map(|&w| u64::from(w)).sum();
        if total == 0 {
            return None;
        }
        let mut roll = self.inner.random_range(0..total);
        for (i, &w) in weights.iter().enumerate() {
            let w = u64::from(w);
            if roll < w {
                return Some(i);
            }
            roll -= w;
        }
        None
    }

    /// Fisher-Yates: for `i` in `0..n-1` draw `r` from `[i, n-1]` and swap
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        let n = slice.len();
        if n < 2 {
            return;
        }
        for i in 0..n - 1 {
            let r = self.range_inclusive(i, n - 1);
            if r != i {
                slice.swap(i, r);
            }
        }
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::new(1)
    }
}
