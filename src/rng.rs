//! Seedable randomness for the pre-run shuffle.
//!
//! The engine never reaches for a process-wide generator: callers pass one in.
//! A run is reproducible from its seed, so the seed is always logged.

use rand::{Error, RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub struct ScheduleRng {
    seed: u64,
    inner: Pcg64Mcg,
}

impl ScheduleRng {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Draws a fresh seed; log it to replay the run later
    pub fn from_entropy() -> Self {
        let seed = rand::random::<u64>();
        log::info!("rng: drew seed {seed}");
        Self::seeded(seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RngCore for ScheduleRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.inner.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;

    #[test]
    fn same_seed_same_shuffle() {
        let mut a: Vec<u32> = (0..20).collect();
        let mut b = a.clone();
        a.shuffle(&mut ScheduleRng::seeded(7));
        b.shuffle(&mut ScheduleRng::seeded(7));
        assert_eq!(a, b);
    }

    #[test]
    fn seed_is_remembered() {
        assert_eq!(ScheduleRng::seeded(42).seed(), 42);
    }
}
