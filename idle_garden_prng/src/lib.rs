// Deterministic, portable pseudo-random number generator.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// Hand-rolled so that the garden plays out identically on every platform
// given the same seed: planter wander targets, harvester target picks,
// automation cooldown rolls, withered-plant seed yields and automation names
// all draw from one `GameRng` owned by the simulation.
//
// The generator state is serializable. A saved game stores it verbatim so a
// loaded game continues the same random stream the saved one would have.
//
// **Critical constraint: determinism.** Every method must produce identical
// output given the same prior state, regardless of platform, compiler version
// or optimization level. No floating point in the core generator, no OS
// entropy, no stdlib hashing.

use serde::{Deserialize, Serialize};

/// Xoshiro256++ PRNG, the garden's sole source of randomness.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRng {
    s: [u64; 4],
}

impl GameRng {
    /// Create a new PRNG seeded from a `u64`.
    ///
    /// Uses SplitMix64 to expand the seed into the 256-bit internal state.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform integer in `[low, high)`, rejection-sampled to avoid modulo
    /// bias. Returns `low` when the range is empty.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        if low >= high {
            return low;
        }
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        let threshold = range.wrapping_neg() % range;
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }

    /// Uniform `u32` in `[low, high)`. Returns `low` when the range is empty.
    pub fn range_u32(&mut self, low: u32, high: u32) -> u32 {
        self.range_u64(u64::from(low), u64::from(high)) as u32
    }

    /// Uniform `u32` in `[low, high]`.
    pub fn range_u32_inclusive(&mut self, low: u32, high: u32) -> u32 {
        if low > high {
            return low;
        }
        self.range_u64(u64::from(low), u64::from(high) + 1) as u32
    }

    /// Uniform `i32` in `[low, high)`. Garden coordinates are signed, so the
    /// range is shifted into unsigned space before sampling.
    pub fn range_i32(&mut self, low: i32, high: i32) -> i32 {
        if low >= high {
            return low;
        }
        let span = (i64::from(high) - i64::from(low)) as u64;
        (i64::from(low) + self.range_u64(0, span) as i64) as i32
    }

    /// Uniform `usize` in `[low, high)`.
    pub fn range_usize(&mut self, low: usize, high: usize) -> usize {
        self.range_u64(low as u64, high as u64) as usize
    }

    /// Pick a uniformly random index into a collection of length `len`.
    /// `None` for an empty collection.
    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.range_usize(0, len))
        }
    }
}

/// SplitMix64, used only for seeding xoshiro256++ from a single `u64`.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
