use crate::model::AttributeValue;
use crate::store::{CacheKey, ValueCache};

/// One optimistic mutation against a cache slot, as an explicit command
/// object: the pre-mutation snapshot is captured up front, the optimistic
/// write is staged, and the command either commits the server's canonical
/// row or rolls the slot back to the snapshot.
pub struct Mutation<'a> {
    cache: &'a ValueCache,
    key: CacheKey,
    snapshot: Vec<AttributeValue>,
}

impl<'a> Mutation<'a> {
    /// Cancel-then-snapshot-then-mutate: supersede any in-flight refetch for
    /// the slot first, so a stale response can no longer overwrite what this
    /// mutation stages, then capture the snapshot.
    pub fn begin(cache: &'a ValueCache, key: CacheKey) -> Self {
        cache.supersede(&key);
        let snapshot = cache.snapshot(&key);
        Self {
            cache,
            key,
            snapshot,
        }
    }

    /// The slot contents as they were before this mutation.
    pub fn snapshot(&self) -> &[AttributeValue] {
        &self.snapshot
    }

    /// Stage the optimistic write.
    pub fn stage(&self, value: AttributeValue) {
        self.cache.upsert(&self.key, value);
    }

    /// Stage an optimistic removal.
    pub fn stage_removal(&self, value_id: &str) {
        self.cache.remove(&self.key, value_id);
    }

    /// Server accepted: replace the staged row with the canonical response.
    pub fn commit(self, staged_id: &str, canonical: AttributeValue) {
        self.cache.remove(&self.key, staged_id);
        self.cache.upsert(&self.key, canonical);
    }

    /// Server accepted a removal: the staged state is already correct.
    pub fn commit_removal(self) {}

    /// Server rejected: restore the pre-mutation snapshot.
    pub fn rollback(self) {
        self.cache.restore(&self.key, self.snapshot);
    }
}
