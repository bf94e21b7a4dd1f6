/// The default cap on tower height. Enough headroom for about 2^100 elements.
pub const MAX_LEVEL: usize = 100;

/// The default probability that a node is promoted one level higher.
pub const DEFAULT_PROBABILITY: f64 = 0.25;

/// Options used to build a [`SkipList`](crate::SkipList).
///
/// # Examples
/// ```
/// use skipjack::{SkipList, SkipListOptions};
///
/// let options = SkipListOptions::default().max_level(16).seed(7);
/// let skiplist = SkipList::<String, u32>::with_options(options).unwrap();
/// assert!(skiplist.is_empty());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkipListOptions {
    /// The maximum number of levels a tower can have.
    pub max_level: usize,
    /// The probability of success used when deciding whether a new node gets another level.
    pub probability: f64,
    /// Seed for the level generator. Entropy is used when this is `None`.
    pub seed: Option<u64>,
}

impl SkipListOptions {
    pub fn max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for SkipListOptions {
    fn default() -> Self {
        SkipListOptions {
            max_level: MAX_LEVEL,
            probability: DEFAULT_PROBABILITY,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_options_match_the_constants() {
        let options = SkipListOptions::default();

        assert_eq!(options.max_level, 100);
        assert_eq!(options.probability, 0.25);
        assert_eq!(options.seed, None);
    }

    #[test]
    fn setters_can_be_chained() {
        let options = SkipListOptions::default()
            .max_level(12)
            .probability(0.5)
            .seed(0x6261746d616e6e);

        assert_eq!(
            options,
            SkipListOptions {
                max_level: 12,
                probability: 0.5,
                seed: Some(0x6261746d616e6e),
            }
        );
    }
}
