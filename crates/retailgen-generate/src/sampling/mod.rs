//! Seeded sampling primitives shared by every generator.

mod segments;
mod weighted;

pub use segments::{Segment, Segments};
pub use weighted::WeightedRandom;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seeded stream type used throughout generation.
pub type Stream = ChaCha8Rng;

/// Build a private stream from a derived seed.
pub fn stream(seed: u64) -> Stream {
    ChaCha8Rng::seed_from_u64(seed)
}
