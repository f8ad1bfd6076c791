//! Per-run ambiguity memo backed by `DashMap`.

use dashmap::DashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Memoized outcome of an ambiguity-sensitive phase, keyed by a hash of the raw
/// identifier.
///
/// Both outcomes are stored: `Some(index)` for a unique candidate and `None`
/// for "ambiguous or nothing". Each resolver owns one memo and clears it at the
/// start of every batch.
#[derive(Debug, Default)]
pub struct AmbiguityMemo {
    store: DashMap<u64, Option<usize>>,
}

/// Stable-within-process hash of an identifier.
pub fn identifier_hash(identifier: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    identifier.hash(&mut hasher);
    hasher.finish()
}

impl AmbiguityMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// The memoized outcome for `identifier`, or `None` if never computed.
    pub fn get(&self, identifier: &str) -> Option<Option<usize>> {
        self.store.get(&identifier_hash(identifier)).map(|e| *e)
    }

    pub fn set(&self, identifier: &str, outcome: Option<usize>) {
        self.store.insert(identifier_hash(identifier), outcome);
    }

    /// Return the memoized outcome or compute and store it.
    pub fn get_or_compute<F>(&self, identifier: &str, compute: F) -> Option<usize>
    where
        F: FnOnce() -> Option<usize>,
    {
        if let Some(outcome) = self.get(identifier) {
            return outcome;
        }
        let outcome = compute();
        self.set(identifier, outcome);
        outcome
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Removes all entries.
    pub fn reset(&self) {
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn memo_miss() {
        let memo = AmbiguityMemo::new();
        assert_eq!(memo.get("Mario Rossi"), None);
    }

    #[test]
    fn memo_stores_both_outcomes() {
        let memo = AmbiguityMemo::new();
        memo.set("Mario Rossi", Some(3));
        memo.set("M Rossi", None);
        assert_eq!(memo.get("Mario Rossi"), Some(Some(3)));
        assert_eq!(memo.get("M Rossi"), Some(None));
        assert_eq!(memo.len(), 2);
    }

    #[test]
    fn memo_computes_once() {
        let memo = AmbiguityMemo::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Some(1)
        };
        assert_eq!(memo.get_or_compute("x", compute), Some(1));
        assert_eq!(memo.get_or_compute("x", compute), Some(1));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn memo_reset() {
        let memo = AmbiguityMemo::new();
        memo.set("a", Some(0));
        memo.reset();
        assert!(memo.is_empty());
        assert_eq!(memo.get("a"), None);
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(identifier_hash("Mario Rossi"), identifier_hash("Mario Rossi"));
        assert_ne!(identifier_hash("Mario Rossi"), identifier_hash("Rossi Mario"));
    }
}
