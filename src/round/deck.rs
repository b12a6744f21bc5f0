//! Shuffled prompt deck
//!
//! A deck is a permutation of a category's prompts plus a cursor. The
//! cursor only moves forward; `cursor == len` means the deck is exhausted.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Unbiased in-place Fisher-Yates shuffle
pub fn shuffle<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    words: Vec<String>,
    cursor: usize,
}

impl Deck {
    /// Fresh shuffle of `prompts`
    pub fn shuffled<R: Rng>(prompts: &[String], rng: &mut R) -> Self {
        let mut words = prompts.to_vec();
        shuffle(&mut words, rng);
        Self { words, cursor: 0 }
    }

    /// Deck in exactly the given order
    pub fn from_order(words: Vec<String>) -> Self {
        Self { words, cursor: 0 }
    }

    /// Word under the cursor, `None` once exhausted
    pub fn current(&self) -> Option<&str> {
        self.words.get(self.cursor).map(String::as_str)
    }

    /// Move past the current word and return it
    pub fn advance(&mut self) -> Option<String> {
        let word = self.words.get(self.cursor)?.clone();
        self.cursor += 1;
        Some(word)
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.words.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.words.len() - self.cursor
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn words(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("word-{i}")).collect()
    }

    #[test]
    fn test_cursor_walks_to_exhaustion() {
        let mut deck = Deck::from_order(words(2));
        assert_eq!(deck.current(), Some("word-0"));
        assert_eq!(deck.advance().as_deref(), Some("word-0"));
        assert_eq!(deck.remaining(), 1);
        assert_eq!(deck.advance().as_deref(), Some("word-1"));
        assert!(deck.is_exhausted());
        assert_eq!(deck.cursor(), 2);
        assert_eq!(deck.advance(), None);
        assert_eq!(deck.cursor(), 2);
        assert_eq!(deck.current(), None);
    }

    #[test]
    fn test_empty_and_single() {
        let mut rng = Pcg32::seed_from_u64(1);
        let empty = Deck::shuffled(&[], &mut rng);
        assert!(empty.is_exhausted());
        let one = Deck::shuffled(&words(1), &mut rng);
        assert_eq!(one.words(), &words(1)[..]);
    }

    #[test]
    fn test_repeated_shuffles_differ() {
        let input = words(20);
        let mut rng = Pcg32::seed_from_u64(42);
        let first = Deck::shuffled(&input, &mut rng);
        let distinct = (0..10)
            .map(|_| Deck::shuffled(&input, &mut rng))
            .filter(|d| d.words() != first.words())
            .count();
        // 20! orderings; an identical draw is astronomically unlikely
        assert!(distinct >= 9);
    }

    #[test]
    fn test_shuffle_roughly_uniform() {
        // Each of the 6 orderings of 3 items should show up near 1/6 of the time
        let mut rng = Pcg32::seed_from_u64(7);
        let mut counts = std::collections::HashMap::new();
        let trials = 60_000;
        for _ in 0..trials {
            let mut items = [0u8, 1, 2];
            shuffle(&mut items, &mut rng);
            *counts.entry(items).or_insert(0u32) += 1;
        }
        assert_eq!(counts.len(), 6);
        for &count in counts.values() {
            let share = count as f64 / trials as f64;
            assert!((share - 1.0 / 6.0).abs() < 0.01, "share {share}");
        }
    }

    proptest! {
        #[test]
        fn prop_shuffle_is_permutation(n in 0usize..60, seed in any::<u64>()) {
            let input = words(n);
            let mut rng = Pcg32::seed_from_u64(seed);
            let deck = Deck::shuffled(&input, &mut rng);
            let mut sorted = deck.words().to_vec();
            sorted.sort();
            let mut expected = input.clone();
            expected.sort();
            prop_assert_eq!(sorted, expected);
            prop_assert_eq!(deck.cursor(), 0);
        }
    }
}
