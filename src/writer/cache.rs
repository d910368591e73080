//! Per-session cache of active staged resources

use crate::stage::StagedResource;
use crate::types::BatchKey;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

/// Counters for one batch, from first resolution to finalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    /// Number of non-empty chunks appended
    pub appends: u64,
    /// Bytes appended
    pub bytes: u64,
    /// When the batch's resource was first resolved in this session
    pub started_at: DateTime<Utc>,
    /// When the batch was finalized
    pub finished_at: Option<DateTime<Utc>>,
}

impl BatchStats {
    pub fn new() -> Self {
        Self {
            appends: 0,
            bytes: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Record one appended chunk
    pub fn record_append(&mut self, text: &str) {
        self.appends += 1;
        self.bytes += text.len() as u64;
    }
}

impl Default for BatchStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache entry: the active resource plus its counters
#[derive(Debug, Clone)]
pub struct CachedResource {
    pub resource: Arc<dyn StagedResource>,
    pub stats: BatchStats,
}

/// Mapping from batch identity to the resource currently receiving its writes
///
/// Holds at most one entry per batch. Owned and mutated by a single writer.
#[derive(Debug, Default)]
pub struct ResourceCache {
    entries: HashMap<BatchKey, CachedResource>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached entry for `key`, or cache the resource produced by
    /// `resolve`. `resolve` is not called on a hit.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: BatchKey,
        resolve: impl FnOnce() -> Result<Arc<dyn StagedResource>, E>,
    ) -> Result<&mut CachedResource, E> {
        match self.entries.entry(key) {
            Entry::Occupied(occupied) => Ok(occupied.into_mut()),
            Entry::Vacant(vacant) => Ok(vacant.insert(CachedResource {
                resource: resolve()?,
                stats: BatchStats::new(),
            })),
        }
    }

    pub fn remove(&mut self, key: &BatchKey) -> Option<CachedResource> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &BatchKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Batches with an active resource, in key order
    pub fn keys(&self) -> Vec<BatchKey> {
        let mut keys: Vec<_> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }
}
