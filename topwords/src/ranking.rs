//! Running ranking of words by count.
//!
//! [`RankHeap`] is a binary max-heap with a word → slot index, so bumping the
//! count of a word already in the heap is a lookup plus a sift-up instead of a
//! linear search. Counts only ever grow, which means an entry can only move
//! towards the root on update. A heap entry and its index key share one
//! `Arc<str>`.
//!
//! [`TopKSelector`] spreads words over several heaps by hash so that writers
//! recording different words mostly take different locks. Any word lives in
//! exactly one shard, so the global top `n` is always contained in the union
//! of every shard's own top `n`.
//!
//! Order is count descending, then word ascending. The word tie-break keeps
//! the output identical between runs regardless of how many threads did the
//! counting or in which order files were visited.
use std::cmp::Ordering;
use std::collections::hash_map::RandomState;
use std::collections::{BinaryHeap, HashMap};
use std::hash::BuildHasher;
use std::sync::{Arc, Mutex, PoisonError};

use crate::frequency::WordCount;

#[derive(Debug, Clone)]
struct Entry {
    word: Arc<str>,
    count: u64,
}

impl Entry {
    fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .count
            .cmp(&self.count)
            .then_with(|| self.word.cmp(&other.word))
    }

    fn to_word_count(&self) -> WordCount {
        WordCount::new(&*self.word, self.count)
    }
}

/// Indexed max-heap of words ordered by count
#[derive(Debug, Clone, Default)]
pub struct RankHeap {
    entries: Vec<Entry>,
    slots: HashMap<Arc<str>, usize>,
}

impl RankHeap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, word: &str) -> Option<u64> {
        self.slots.get(word).map(|&slot| self.entries[slot].count)
    }

    /// Adds one occurrence of `word`, returning its new count.
    pub fn record(&mut self, word: &str) -> u64 {
        self.record_n(word, 1)
    }

    /// Adds `n` occurrences of `word`, returning its new count.
    pub fn record_n(&mut self, word: &str, n: u64) -> u64 {
        let slot = match self.slots.get(word) {
            Some(&slot) => {
                self.entries[slot].count += n;
                slot
            }
            None => {
                let slot = self.entries.len();
                let word: Arc<str> = Arc::from(word);
                self.slots.insert(Arc::clone(&word), slot);
                self.entries.push(Entry { word, count: n });
                slot
            }
        };
        let count = self.entries[slot].count;
        self.sift_up(slot);
        count
    }

    /// The best-ranked entry
    pub fn peek(&self) -> Option<WordCount> {
        self.entries.first().map(Entry::to_word_count)
    }

    /// Removes and returns the best-ranked entry.
    pub fn pop(&mut self) -> Option<WordCount> {
        if self.entries.is_empty() {
            return None;
        }
        let last = self.entries.len() - 1;
        self.swap(0, last);
        let top = self.entries.pop()?;
        self.slots.remove(&top.word);
        if !self.entries.is_empty() {
            self.sift_down(0);
        }
        Some(top.to_word_count())
    }

    /// The `n` best-ranked entries in order, leaving the heap untouched.
    ///
    /// Walks the heap best-first from the root with a small frontier, so the
    /// cost depends on `n` rather than on the number of words held.
    pub fn top_k(&self, n: usize) -> Vec<WordCount> {
        let mut out = Vec::with_capacity(n.min(self.entries.len()));
        let mut frontier = BinaryHeap::new();
        if n > 0 && !self.entries.is_empty() {
            frontier.push(Candidate(&self.entries[0], 0));
        }
        while let Some(Candidate(entry, slot)) = frontier.pop() {
            out.push(entry.to_word_count());
            if out.len() == n {
                break;
            }
            for child in [2 * slot + 1, 2 * slot + 2] {
                if let Some(entry) = self.entries.get(child) {
                    frontier.push(Candidate(entry, child));
                }
            }
        }
        out
    }

    /// Consumes the heap, returning its `n` best-ranked entries in order.
    pub fn into_top_k(mut self, n: usize) -> Vec<WordCount> {
        let mut out = Vec::with_capacity(n.min(self.entries.len()));
        while out.len() < n {
            match self.pop() {
                Some(entry) => out.push(entry),
                None => break,
            }
        }
        out
    }

    fn outranks(&self, a: usize, b: usize) -> bool {
        self.entries[a].rank_cmp(&self.entries[b]) == Ordering::Less
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.entries.swap(a, b);
        for slot in [a, b] {
            if let Some(index) = self.slots.get_mut(&self.entries[slot].word) {
                *index = slot;
            }
        }
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.outranks(slot, parent) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.entries.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut best = slot;
            if left < len && self.outranks(left, best) {
                best = left;
            }
            if right < len && self.outranks(right, best) {
                best = right;
            }
            if best == slot {
                break;
            }
            self.swap(slot, best);
            slot = best;
        }
    }
}

/// Frontier entry for [`RankHeap::top_k`]; greater means better ranked.
struct Candidate<'a>(&'a Entry, usize);

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate<'_> {}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.rank_cmp(self.0)
    }
}

/// Concurrent top-K tracker made of hash-sharded [`RankHeap`]s
#[derive(Debug)]
pub struct TopKSelector {
    shards: Vec<Mutex<RankHeap>>,
    hasher: RandomState,
}

impl Default for TopKSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl TopKSelector {
    pub fn new() -> Self {
        Self::with_shards(1)
    }

    /// Creates a selector with `shards` heaps, rounded up to a power of two.
    pub fn with_shards(shards: usize) -> Self {
        let shards = shards.max(1).next_power_of_two();
        Self {
            shards: (0..shards).map(|_| Mutex::new(RankHeap::new())).collect(),
            hasher: RandomState::new(),
        }
    }

    /// A shard count suited to `threads` concurrent writers
    pub fn shards_for(threads: usize) -> usize {
        (threads.max(1) * 4).next_power_of_two()
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard(&self, word: &str) -> &Mutex<RankHeap> {
        let index = self.hasher.hash_one(word) as usize & (self.shards.len() - 1);
        &self.shards[index]
    }

    /// Records one occurrence of `word`, returning its new count.
    pub fn record(&self, word: &str) -> u64 {
        self.record_n(word, 1)
    }

    /// Records `n` occurrences of `word`, returning its new count.
    pub fn record_n(&self, word: &str, n: u64) -> u64 {
        self.shard(word)
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record_n(word, n)
    }

    pub fn get(&self, word: &str) -> Option<u64> {
        self.shard(word)
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(word)
    }

    /// Number of distinct words tracked
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `n` best-ranked words, strictly by count then word.
    ///
    /// Safe to call mid-scan, but the answer only reflects a settled state
    /// once every writer has finished.
    pub fn top_k(&self, n: usize) -> Vec<WordCount> {
        let candidates = self
            .shards
            .iter()
            .flat_map(|shard| {
                shard
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .top_k(n)
            })
            .collect();
        merge(candidates, n)
    }

    /// Consumes the selector, returning the `n` best-ranked words.
    pub fn into_top_k(self, n: usize) -> Vec<WordCount> {
        let candidates = self
            .shards
            .into_iter()
            .flat_map(|shard| {
                shard
                    .into_inner()
                    .unwrap_or_else(PoisonError::into_inner)
                    .into_top_k(n)
            })
            .collect();
        merge(candidates, n)
    }
}

fn merge(mut candidates: Vec<WordCount>, n: usize) -> Vec<WordCount> {
    candidates.sort_unstable_by(WordCount::rank_cmp);
    candidates.truncate(n);
    candidates
}
