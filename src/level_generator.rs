use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Geometric};

use crate::config::{DEFAULT_PROBABILITY, MAX_LEVEL};
use crate::error::SkipListError;

/// Decides how tall the tower of a newly inserted node will be.
pub trait LevelGenerator {
    /// The tallest tower this generator will ever produce.
    fn max_level(&self) -> usize;

    /// Generate a tower height in the range `[1, max_level]`.
    fn random_level(&mut self) -> usize;
}

/// A level generator producing geometrically distributed heights.
///
/// Every node gets one level. Each further level is granted independently with probability `p`,
/// and the result is capped at `max_level`.
#[derive(Debug)]
pub struct GeometricLevelGenerator {
    max_level: usize,
    probability: f64,
    /// Counts the promotions granted before the first refusal.
    distribution: Geometric,
    rng: StdRng,
}

impl GeometricLevelGenerator {
    /// Create a generator seeded from OS entropy.
    pub fn new(max_level: usize, probability: f64) -> Result<Self, SkipListError> {
        Self::with_rng(max_level, probability, StdRng::from_entropy())
    }

    /// Create a generator that yields the same sequence of heights for the same `seed`.
    pub fn with_seed(
        max_level: usize,
        probability: f64,
        seed: u64,
    ) -> Result<Self, SkipListError> {
        Self::with_rng(max_level, probability, StdRng::seed_from_u64(seed))
    }

    /// The probability of granting one more level.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    fn with_rng(max_level: usize, probability: f64, rng: StdRng) -> Result<Self, SkipListError> {
        if max_level == 0 {
            return Err(SkipListError::InvalidMaxLevel(max_level));
        }

        // `NaN` fails both comparisons, so it is rejected here as well.
        if !(probability > 0.0 && probability < 1.0) {
            return Err(SkipListError::InvalidProbability(probability));
        }

        // `Geometric` counts failures before the first success, so a "success" is the draw that
        // stops the tower from growing.
        let distribution = Geometric::new(1.0 - probability)
            .map_err(|_| SkipListError::InvalidProbability(probability))?;

        Ok(GeometricLevelGenerator {
            max_level,
            probability,
            distribution,
            rng,
        })
    }
}

impl Default for GeometricLevelGenerator {
    /// A generator with a maximum of 100 levels and a promotion probability of 0.25.
    fn default() -> Self {
        Self::new(MAX_LEVEL, DEFAULT_PROBABILITY).expect("default level options are valid")
    }
}

impl LevelGenerator for GeometricLevelGenerator {
    fn max_level(&self) -> usize {
        self.max_level
    }

    fn random_level(&mut self) -> usize {
        let promotions = self.distribution.sample(&mut self.rng);
        let promotions = usize::try_from(promotions).unwrap_or(usize::MAX);

        promotions.saturating_add(1).min(self.max_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_rejects_a_zero_max_level() {
        let result = GeometricLevelGenerator::new(0, 0.25);

        assert_eq!(result.err(), Some(SkipListError::InvalidMaxLevel(0)));
    }

    #[test]
    fn new_rejects_probabilities_outside_of_the_open_unit_interval() {
        for probability in [0.0, 1.0, -0.5, 1.5] {
            let result = GeometricLevelGenerator::new(8, probability);

            assert_eq!(
                result.err(),
                Some(SkipListError::InvalidProbability(probability))
            );
        }

        assert!(GeometricLevelGenerator::new(8, f64::NAN).is_err());
    }

    #[test]
    fn default_uses_the_default_options() {
        let generator = GeometricLevelGenerator::default();

        assert_eq!(generator.max_level(), 100);
        assert_eq!(generator.probability(), 0.25);
    }

    #[test]
    fn random_level_stays_within_bounds() {
        let mut generator = GeometricLevelGenerator::with_seed(4, 0.9, 0x726f62696e).unwrap();

        for _ in 0..10_000 {
            let level = generator.random_level();
            assert!((1..=4).contains(&level), "level {} out of bounds", level);
        }
    }

    #[test]
    fn a_max_level_of_one_always_yields_one() {
        let mut generator = GeometricLevelGenerator::with_seed(1, 0.5, 1).unwrap();

        for _ in 0..1_000 {
            assert_eq!(generator.random_level(), 1);
        }
    }

    #[test]
    fn seeded_generators_are_deterministic() {
        // 0x6261746d616e6e => Batmann
        let seed = 0x6261746d616e6e;
        let mut first = GeometricLevelGenerator::with_seed(100, 0.25, seed).unwrap();
        let mut second = GeometricLevelGenerator::with_seed(100, 0.25, seed).unwrap();

        let first_levels: Vec<usize> = (0..500).map(|_| first.random_level()).collect();
        let second_levels: Vec<usize> = (0..500).map(|_| second.random_level()).collect();

        assert_eq!(first_levels, second_levels);
    }

    #[test]
    fn heights_follow_the_promotion_probability() {
        let mut generator = GeometricLevelGenerator::with_seed(100, 0.25, 42).unwrap();
        let samples = 100_000;

        let promoted = (0..samples)
            .filter(|_| generator.random_level() > 1)
            .count();

        // Expect roughly a quarter of the towers to reach a second level.
        let ratio = promoted as f64 / samples as f64;
        assert!((0.23..0.27).contains(&ratio), "promotion ratio was {}", ratio);
    }
}
