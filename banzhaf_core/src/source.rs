use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Probability of a single coin coming up yes.
pub const YES_PROBABILITY: f64 = 0.5;

/// Generator of uniform draws in `[0, 1)`.
pub trait UniformSource {
    fn next_unit(&mut self) -> f64;

    /// Fair coin: yes when the draw falls below one half.
    #[inline]
    fn flip(&mut self) -> bool {
        self.next_unit() < YES_PROBABILITY
    }
}

impl<R: RngCore> UniformSource for R {
    #[inline]
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Portable seeded generator used for every reproducible run.
pub fn seeded(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Generator for one parallel worker: same seed, independent stream.
pub fn seeded_stream(seed: u64, stream: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(stream);
    rng
}

/// Replays a fixed sequence of draws, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    /// # Panics
    ///
    /// Panics if `draws` is empty.
    pub fn new(draws: Vec<f64>) -> Self {
        assert!(!draws.is_empty(), "scripted source needs at least one draw");
        Self { draws, cursor: 0 }
    }

    /// Draws that make successive coins come up as `votes`.
    pub fn from_votes(votes: &[bool]) -> Self {
        Self::new(
            votes
                .iter()
                .map(|&yes| if yes { 0.25 } else { 0.75 })
                .collect(),
        )
    }
}

impl UniformSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        let draw = self.draws[self.cursor];
        self.cursor = (self.cursor + 1) % self.draws.len();
        draw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_votes_replay_in_order_and_cycle() {
        let mut source = ScriptedSource::from_votes(&[true, false, false]);
        let flips: Vec<bool> = (0..6).map(|_| source.flip()).collect();
        assert_eq!(flips, vec![true, false, false, true, false, false]);
    }

    #[test]
    #[should_panic(expected = "at least one draw")]
    fn scripted_source_needs_draws() {
        ScriptedSource::new(Vec::new());
    }

    #[test]
    fn seeded_generators_repeat() {
        let mut a = seeded(7);
        let mut b = seeded(7);
        for _ in 0..32 {
            assert_eq!(a.next_unit().to_bits(), b.next_unit().to_bits());
        }
    }

    #[test]
    fn streams_diverge() {
        let mut a = seeded_stream(7, 0);
        let mut b = seeded_stream(7, 1);
        let same = (0..32)
            .filter(|_| a.next_unit().to_bits() == b.next_unit().to_bits())
            .count();
        assert!(same < 32);
    }

    #[test]
    fn stream_zero_matches_plain_seed() {
        let mut a = seeded(11);
        let mut b = seeded_stream(11, 0);
        assert_eq!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn fair_coin_is_roughly_balanced() {
        let mut rng = seeded(3);
        let yes = (0..20_000).filter(|_| rng.flip()).count();
        assert!((9_500..10_500).contains(&yes), "yes = {yes}");
    }
}
