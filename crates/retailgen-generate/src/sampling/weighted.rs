use rand::{Rng, RngCore};

use super::{Stream, stream};

/// Biased Bernoulli and index draws over a private uniform stream.
///
/// Every draw consumes exactly one uniform value in `[0, 1)` per trial,
/// so two instances built from the same seed stay in lockstep.
#[derive(Debug, Clone)]
pub struct WeightedRandom {
    rng: Stream,
    bias: f64,
}

impl WeightedRandom {
    pub fn new(seed: u64, bias: f64) -> Self {
        Self {
            rng: stream(seed),
            bias,
        }
    }

    /// Seed a new instance from the next value of `parent`.
    pub fn derive(parent: &mut impl RngCore, bias: f64) -> Self {
        Self::new(parent.next_u64(), bias)
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// True with the construction-time probability.
    pub fn next_bool(&mut self) -> bool {
        self.next_bool_with(self.bias)
    }

    /// True with probability `probability`.
    pub fn next_bool_with(&mut self, probability: f64) -> bool {
        self.rng.random::<f64>() < probability
    }

    /// Weighted index in `[0, bound)`.
    ///
    /// Walks the indices in order and stops at the first trial that
    /// succeeds with the construction bias; the last index absorbs the
    /// remaining mass. Low indices are therefore favored when the bias is
    /// high. A zero `bound` is treated as one.
    pub fn next_index(&mut self, bound: usize) -> usize {
        let last = bound.max(1) - 1;
        for index in 0..last {
            if self.next_bool() {
                return index;
            }
        }
        last
    }
}
