//! Seeded randomness for layout generation.
//!
//! Every draw in a run flows through one [`LayoutRng`], strictly in order, so the
//! same seed string and configuration always consume the same sequence. Sampling
//! without replacement removes the drawn element from its pool, which makes the
//! consumption order part of the result.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Stable 64-bit hash of a seed string (FNV-1a).
pub fn hash_seed(seed: &str) -> u64 {
    fnv1a(FNV_OFFSET_BASIS, seed.as_bytes())
}

fn fnv1a(mut state: u64, bytes: &[u8]) -> u64 {
    for byte in bytes {
        state ^= u64::from(*byte);
        state = state.wrapping_mul(FNV_PRIME);
    }
    state
}

/// Seed string derived from the wall clock, for random-seed mode.
pub fn time_seed() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    nanos.to_string()
}

/// The single random stream of a generation run.
#[derive(Debug, Clone)]
pub struct LayoutRng {
    inner: StdRng,
    draws: u64,
}

impl LayoutRng {
    pub fn from_seed_str(seed: &str) -> Self {
        Self::from_u64(hash_seed(seed))
    }

    pub fn from_u64(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
            draws: 0,
        }
    }

    /// Uniform integer in `min..max`. An empty range yields `min` without drawing.
    pub fn range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.draws += 1;
        self.inner.gen_range(min..max)
    }

    /// Uniform index in `0..len`, or `None` for an empty collection.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        self.draws += 1;
        Some(self.inner.gen_range(0..len))
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        self.index(items.len()).map(|i| &items[i])
    }

    /// Removes and returns a uniformly chosen element. The remaining elements keep
    /// their relative order.
    pub fn take<T>(&mut self, pool: &mut Vec<T>) -> Option<T> {
        self.index(pool.len()).map(|i| pool.remove(i))
    }

    /// Number of draws consumed so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl RngCore for LayoutRng {
    fn next_u32(&mut self) -> u32 {
        self.draws += 1;
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws += 1;
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws += 1;
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws += 1;
        self.inner.try_fill_bytes(dest)
    }
}
