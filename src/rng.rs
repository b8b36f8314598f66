//! Single seeded RNG shared by every random draw in a run.
//!
//! All nondeterministic choices (backoff draws, gNB desync offsets) must
//! flow through one `StdRng` seeded once per run, never `thread_rng()`,
//! so that identical seed and configuration reproduce byte-identical
//! output (determinism property P6).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct SimRng(StdRng);

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng(StdRng::seed_from_u64(seed))
    }

    /// Uniform integer draw in `[0, upper]` inclusive, as used by backoff
    /// countdown draws.
    pub fn uniform_inclusive(&mut self, upper: u64) -> u64 {
        self.0.gen_range(0..=upper)
    }

    /// Uniform integer draw in `[low, high]` inclusive, as used by gNB
    /// sync-slot desynchronization offsets.
    pub fn uniform_range_inclusive(&mut self, low: u64, high: u64) -> u64 {
        if low >= high {
            return low;
        }
        self.0.gen_range(low..=high)
    }
}
