use crate::model::{AttributeValue, Id, Scope};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Cache key: one slot per product and requested scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub product_id: Id,
    pub scope: Scope,
}

impl CacheKey {
    pub fn new(product_id: Id, scope: Scope) -> Self {
        Self { product_id, scope }
    }
}

#[derive(Debug, Default)]
struct CacheSlot {
    values: Vec<AttributeValue>,
    /// Bumped by every optimistic mutation. In-flight fetches that started
    /// before the bump are ignored on completion.
    generation: u64,
    loaded: bool,
}

/// Token handed out when a fetch starts; carries the slot generation the
/// fetch is allowed to overwrite.
#[derive(Debug, Clone)]
pub struct FetchToken {
    key: CacheKey,
    generation: u64,
}

/// In-memory cache of attribute value lists with supersession tracking.
///
/// The ordering guarantee: before an optimistic mutation touches a slot, its
/// generation is bumped, so a stale refetch completing afterwards can never
/// overwrite the newer optimistic value.
#[derive(Debug, Default)]
pub struct ValueCache {
    slots: RwLock<HashMap<CacheKey, CacheSlot>>,
}

impl ValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cached values for a slot, `None` when never loaded.
    pub fn get(&self, key: &CacheKey) -> Option<Vec<AttributeValue>> {
        let slots = self.slots.read();
        slots
            .get(key)
            .filter(|slot| slot.loaded)
            .map(|slot| slot.values.clone())
    }

    /// Start a fetch for a slot. The returned token pins the generation the
    /// result may be applied against.
    pub fn begin_fetch(&self, key: &CacheKey) -> FetchToken {
        let slots = self.slots.read();
        FetchToken {
            key: key.clone(),
            generation: slots.get(key).map(|slot| slot.generation).unwrap_or(0),
        }
    }

    /// Apply a completed fetch. Returns false (and leaves the slot alone)
    /// when a mutation superseded the fetch while it was in flight.
    pub fn complete_fetch(&self, token: FetchToken, values: Vec<AttributeValue>) -> bool {
        let mut slots = self.slots.write();
        let slot = slots.entry(token.key.clone()).or_default();
        if slot.generation != token.generation {
            log::debug!(
                "discarding stale fetch for product {} ({}): generation {} superseded by {}",
                token.key.product_id,
                token.key.scope,
                token.generation,
                slot.generation
            );
            return false;
        }
        slot.values = values;
        slot.loaded = true;
        true
    }

    /// Supersede any in-flight fetch for the slot. Called at the start of
    /// every optimistic mutation, before the snapshot is taken.
    pub fn supersede(&self, key: &CacheKey) {
        let mut slots = self.slots.write();
        slots.entry(key.clone()).or_default().generation += 1;
    }

    /// Copy of the slot contents, for rollback.
    pub fn snapshot(&self, key: &CacheKey) -> Vec<AttributeValue> {
        let slots = self.slots.read();
        slots.get(key).map(|slot| slot.values.clone()).unwrap_or_default()
    }

    /// Restore a slot to a previously captured snapshot.
    pub fn restore(&self, key: &CacheKey, snapshot: Vec<AttributeValue>) {
        let mut slots = self.slots.write();
        let slot = slots.entry(key.clone()).or_default();
        slot.values = snapshot;
        slot.loaded = true;
    }

    /// Insert or replace a single value row (matched by id).
    pub fn upsert(&self, key: &CacheKey, value: AttributeValue) {
        let mut slots = self.slots.write();
        let slot = slots.entry(key.clone()).or_default();
        match slot.values.iter_mut().find(|v| v.id == value.id) {
            Some(existing) => *existing = value,
            None => slot.values.push(value),
        }
        slot.loaded = true;
    }

    /// Remove a single value row by id.
    pub fn remove(&self, key: &CacheKey, value_id: &str) {
        let mut slots = self.slots.write();
        if let Some(slot) = slots.get_mut(key) {
            slot.values.retain(|v| v.id != value_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ValueBody;
    use chrono::Utc;

    fn key() -> CacheKey {
        CacheKey::new("p1".to_string(), Scope::global())
    }

    fn value(id: &str, text: &str) -> AttributeValue {
        AttributeValue {
            id: id.to_string(),
            attribute_id: "color".to_string(),
            body: ValueBody::Text {
                value: text.to_string(),
            },
            locale: None,
            channel: None,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn fetch_populates_slot() {
        let cache = ValueCache::new();
        assert!(cache.get(&key()).is_none());

        let token = cache.begin_fetch(&key());
        assert!(cache.complete_fetch(token, vec![value("v1", "red")]));
        assert_eq!(cache.get(&key()).unwrap().len(), 1);
    }

    #[test]
    fn stale_fetch_does_not_overwrite_optimistic_value() {
        let cache = ValueCache::new();
        let token = cache.begin_fetch(&key());

        // A mutation lands while the fetch is in flight.
        cache.supersede(&key());
        cache.upsert(&key(), value("v1", "optimistic"));

        assert!(!cache.complete_fetch(token, vec![value("v1", "stale")]));
        let values = cache.get(&key()).unwrap();
        assert_eq!(
            values[0].body,
            ValueBody::Text {
                value: "optimistic".to_string()
            }
        );
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let cache = ValueCache::new();
        cache.upsert(&key(), value("v1", "red"));
        let snapshot = cache.snapshot(&key());

        cache.upsert(&key(), value("v1", "blue"));
        cache.upsert(&key(), value("v2", "extra"));
        cache.restore(&key(), snapshot.clone());

        assert_eq!(cache.get(&key()).unwrap(), snapshot);
    }

    #[test]
    fn upsert_replaces_by_id() {
        let cache = ValueCache::new();
        cache.upsert(&key(), value("v1", "red"));
        cache.upsert(&key(), value("v1", "blue"));
        let values = cache.get(&key()).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(
            values[0].body,
            ValueBody::Text {
                value: "blue".to_string()
            }
        );
    }

    #[test]
    fn remove_deletes_only_the_named_row() {
        let cache = ValueCache::new();
        cache.upsert(&key(), value("v1", "red"));
        cache.upsert(&key(), value("v2", "blue"));
        cache.remove(&key(), "v1");
        let values = cache.get(&key()).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].id, "v2");
    }
}
