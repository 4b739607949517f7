//! Concurrent word → count table.
//!
//! Backed by a [`DashMap`], which shards its buckets by key hash behind
//! independent read/write locks, so writers touching different words rarely
//! contend. Create-or-increment goes through the entry API and holds the
//! shard's write lock for the whole update; no increment is ever lost.
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A word and how many times it was seen
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

impl WordCount {
    pub fn new(word: impl Into<String>, count: u64) -> Self {
        Self {
            word: word.into(),
            count,
        }
    }

    /// Ranking order: larger counts first, equal counts by ascending word.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .count
            .cmp(&self.count)
            .then_with(|| self.word.cmp(&other.word))
    }
}

/// Shared frequency table, safe to update from any number of threads
#[derive(Debug, Default)]
pub struct FrequencyTable {
    counts: DashMap<Box<str>, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table with at least `shards` shards, rounded up to a power
    /// of two no smaller than two.
    pub fn with_shards(shards: usize) -> Self {
        Self {
            counts: DashMap::with_shard_amount(shards.max(2).next_power_of_two()),
        }
    }

    /// Records one occurrence of `word`, returning its new count.
    pub fn increment(&self, word: &str) -> u64 {
        self.increment_by(word, 1)
    }

    /// Records `n` occurrences of `word`, returning its new count.
    pub fn increment_by(&self, word: &str, n: u64) -> u64 {
        // Most words repeat; avoid allocating a key when the entry exists.
        if let Some(mut count) = self.counts.get_mut(word) {
            *count += n;
            return *count;
        }
        let mut count = self.counts.entry(Box::from(word)).or_insert(0);
        *count += n;
        *count
    }

    pub fn get(&self, word: &str) -> Option<u64> {
        self.counts.get(word).map(|count| *count)
    }

    /// Number of distinct words
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|entry| *entry.value()).sum()
    }

    /// Every (word, count) pair in ranking order.
    ///
    /// Only consistent once all writers have finished; taken mid-scan it may
    /// mix older and newer counts across shards.
    pub fn snapshot(&self) -> Vec<WordCount> {
        let mut words: Vec<WordCount> = self
            .counts
            .iter()
            .map(|entry| WordCount::new(entry.key().to_string(), *entry.value()))
            .collect();
        words.sort_unstable_by(WordCount::rank_cmp);
        words
    }
}
