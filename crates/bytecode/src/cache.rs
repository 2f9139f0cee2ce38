//! Bounded cache of analyzed instruction streams.
//!
//! Analysis is content-addressed: the key is `(keccak256(code), spec)`.
//! Repeated execution of the same code within a transaction, or across a
//! fork-backed session, reuses the cached stream. The bound is enforced
//! with least-recently-used eviction.

use crate::stream::InstructionStream;
use primitives::{HashMap, SpecId, B256};
use std::collections::VecDeque;
use std::sync::Arc;

type Key = (B256, SpecId);

/// LRU cache of [`InstructionStream`]s keyed by code hash and hardfork.
#[derive(Clone, Debug)]
pub struct AnalysisCache {
    map: HashMap<Key, Arc<InstructionStream>>,
    order: VecDeque<Key>,
    capacity: usize,
}

impl AnalysisCache {
    /// Creates a cache holding at most `capacity` streams. A capacity of
    /// zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::default(),
            order: VecDeque::new(),
            capacity,
        }
    }

    /// Number of cached streams.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if nothing is cached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Looks up a cached stream, marking it most recently used.
    pub fn get(&mut self, code_hash: B256, spec: SpecId) -> Option<Arc<InstructionStream>> {
        let key = (code_hash, spec);
        let stream = self.map.get(&key).cloned()?;
        self.touch(&key);
        Some(stream)
    }

    /// Inserts a stream, evicting the least recently used entry when full.
    pub fn insert(&mut self, stream: Arc<InstructionStream>) {
        if self.capacity == 0 {
            return;
        }
        let key = (stream.code_hash(), stream.spec());
        if self.map.insert(key, stream).is_none() {
            self.order.push_back(key);
            if self.map.len() > self.capacity {
                if let Some(evicted) = self.order.pop_front() {
                    self.map.remove(&evicted);
                }
            }
        } else {
            self.touch(&key);
        }
    }

    /// Drops every cached stream.
    pub fn clear(&mut self) {
        self.map.clear();
        self.order.clear();
    }

    fn touch(&mut self, key: &Key) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
            self.order.push_back(*key);
        }
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new(primitives::DEFAULT_ANALYSIS_CACHE_SIZE)
    }
}
