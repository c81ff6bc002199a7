use std::collections::HashSet;

use crate::Record;

/// Accepted records in first-encounter order, at most one per key.
#[derive(Debug, Clone, Default)]
pub struct DedupLedger {
    seen: HashSet<String>,
    accepted: Vec<Record>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a candidate unless its key is empty or already seen.
    /// A rejected candidate leaves the ledger untouched.
    pub fn accept(&mut self, candidate: Record) -> bool {
        if candidate.key().is_empty() || self.seen.contains(candidate.key()) {
            return false;
        }
        self.seen.insert(candidate.key().to_owned());
        self.accepted.push(candidate);
        true
    }

    /// Offer every candidate in order; returns how many were newly accepted.
    pub fn accept_all(&mut self, candidates: impl IntoIterator<Item = Record>) -> usize {
        candidates
            .into_iter()
            .map(|candidate| usize::from(self.accept(candidate)))
            .sum()
    }

    pub fn size(&self) -> usize {
        self.accepted.len()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    pub fn records(&self) -> &[Record] {
        &self.accepted
    }

    pub fn into_records(self) -> Vec<Record> {
        self.accepted
    }
}
