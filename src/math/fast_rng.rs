//! Seeded, stream-splittable pseudo-random generators.
//!
//! Every generator is derived from a `(base_seed, stream)` pair. Streams are
//! decorrelated by pushing the pair through SplitMix64 before it seeds the
//! generator state, so adjacent stream indices start far apart.

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::math::fast_norm::{clamp_probability, norm_inv_cdf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FastRngKind {
    #[default]
    Xoshiro256PlusPlus,
    Pcg64,
    StdRng,
}

#[derive(Debug, Clone)]
pub struct Xoshiro256PlusPlus {
    state: [u64; 4],
}

impl Xoshiro256PlusPlus {
    #[inline]
    pub fn seed_from_u64(seed: u64) -> Self {
        let mut sm = SplitMix64::new(seed);
        let mut state = [0_u64; 4];
        for word in &mut state {
            *word = sm.next_u64();
        }
        // The all-zero state is a fixed point.
        if state.iter().all(|&w| w == 0) {
            state[0] = 1;
        }
        Self { state }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s = &mut self.state;
        let out = s[0].wrapping_add(s[3]).rotate_left(23).wrapping_add(s[0]);
        let t = s[1] << 17;

        s[2] ^= s[0];
        s[3] ^= s[1];
        s[1] ^= s[2];
        s[0] ^= s[3];
        s[2] ^= t;
        s[3] = s[3].rotate_left(45);

        out
    }
}

#[derive(Debug, Clone)]
pub struct Pcg64 {
    state: u128,
    inc: u128,
}

impl Pcg64 {
    const MULTIPLIER: u128 = 47_026_247_687_942_121_848_144_207_491_837_523_525;

    #[inline]
    pub fn seed_from_u64(seed: u64) -> Self {
        let mut sm = SplitMix64::new(seed);
        let hi = u128::from(sm.next_u64());
        let lo = u128::from(sm.next_u64());
        let stream = u128::from(sm.next_u64());

        let mut rng = Self {
            state: (hi << 64) | lo,
            inc: (stream << 1) | 1,
        };
        rng.next_u64();
        rng
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let old = self.state;
        self.state = old.wrapping_mul(Self::MULTIPLIER).wrapping_add(self.inc);
        // XSL-RR output permutation.
        let xored = ((old >> 64) ^ old) as u64;
        xored.rotate_right((old >> 122) as u32)
    }
}

/// Generator owned by exactly one simulation worker.
#[derive(Debug)]
pub enum FastRng {
    Xoshiro256PlusPlus(Xoshiro256PlusPlus),
    Pcg64(Pcg64),
    StdRng(Box<StdRng>),
}

impl FastRng {
    #[inline]
    pub fn from_seed(kind: FastRngKind, seed: u64) -> Self {
        match kind {
            FastRngKind::Xoshiro256PlusPlus => {
                Self::Xoshiro256PlusPlus(Xoshiro256PlusPlus::seed_from_u64(seed))
            }
            FastRngKind::Pcg64 => Self::Pcg64(Pcg64::seed_from_u64(seed)),
            FastRngKind::StdRng => Self::StdRng(Box::new(StdRng::seed_from_u64(seed))),
        }
    }

    /// Generator positioned at the start of stream `stream` under `base_seed`.
    #[inline]
    pub fn for_stream(kind: FastRngKind, base_seed: u64, stream: u64) -> Self {
        Self::from_seed(kind, stream_seed(base_seed, stream))
    }

    pub fn kind(&self) -> FastRngKind {
        match self {
            Self::Xoshiro256PlusPlus(_) => FastRngKind::Xoshiro256PlusPlus,
            Self::Pcg64(_) => FastRngKind::Pcg64,
            Self::StdRng(_) => FastRngKind::StdRng,
        }
    }

    #[inline]
    pub fn random_u64(&mut self) -> u64 {
        match self {
            Self::Xoshiro256PlusPlus(rng) => rng.next_u64(),
            Self::Pcg64(rng) => rng.next_u64(),
            Self::StdRng(rng) => rng.random::<u64>(),
        }
    }

    /// Uniform draw on `[0, 1)` with 53 bits of precision.
    #[inline]
    pub fn random_f64(&mut self) -> f64 {
        (self.random_u64() >> 11) as f64 * (1.0 / (1_u64 << 53) as f64)
    }

    /// Standard normal draw by inversion.
    #[inline]
    pub fn standard_normal(&mut self) -> f64 {
        norm_inv_cdf(clamp_probability(self.random_f64()))
    }

    /// Fills `out` with independent standard normals.
    #[inline]
    pub fn fill_standard_normal(&mut self, out: &mut [f64]) {
        for z in out {
            *z = self.standard_normal();
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    const GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

    #[inline]
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(Self::GAMMA);
        mix64(self.state)
    }
}

#[inline]
fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed of stream `stream` under `base_seed`.
///
/// Distinct streams of one base seed never map to the same seed.
#[inline]
pub fn stream_seed(base_seed: u64, stream: u64) -> u64 {
    mix64(base_seed) ^ mix64(stream.wrapping_add(1).wrapping_mul(SplitMix64::GAMMA))
}
