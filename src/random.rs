use rand::Rng;

const MULTIPLIER_A: i64 = 1103515245;
const INCREMENT_C: i64 = 12345;
const DEFAULT_SEED: i64 = 3819201;

/// Source of randomness used by the tree search when expanding nodes.
pub trait RandomGenerator: Default {
    /// Returns the next raw value.
    fn next(&mut self) -> u32;

    /// Returns a number in `0..bound`. `bound` must be non-zero.
    fn next_below(&mut self, bound: usize) -> usize;

    /// Picks one element of `items`, `None` if it is empty.
    fn choose<'a, K>(&mut self, items: &'a [K]) -> Option<&'a K> {
        if items.is_empty() {
            return None;
        }
        items.get(self.next_below(items.len()))
    }
}

/// Thread-local generator from `rand`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardRandomGenerator;

impl RandomGenerator for StandardRandomGenerator {
    fn next(&mut self) -> u32 {
        rand::random()
    }

    fn next_below(&mut self, bound: usize) -> usize {
        rand::rng().random_range(0..bound)
    }
}

/// Linear congruential generator. The same seed always yields the same search.
#[derive(Debug, Clone)]
pub struct SeededGenerator {
    seed: i64,
}

impl Default for SeededGenerator {
    fn default() -> Self {
        SeededGenerator::new(DEFAULT_SEED)
    }
}

impl SeededGenerator {
    /// Creates a generator from `seed`, reduced modulo `i32::MAX`.
    pub const fn new(seed: i64) -> Self {
        Self {
            seed: seed.rem_euclid(i32::MAX as i64),
        }
    }
}

impl RandomGenerator for SeededGenerator {
    fn next(&mut self) -> u32 {
        self.seed = (self.seed * MULTIPLIER_A + INCREMENT_C) % (i32::MAX as i64);
        self.seed as u32
    }

    fn next_below(&mut self, bound: usize) -> usize {
        self.next() as usize % bound
    }
}
