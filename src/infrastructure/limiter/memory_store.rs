use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};

use crate::{
    entities::rate_window::RateWindow,
    errors::StoreError,
    repositories::rate_store::RateStore,
};

type Key = String;

/// Process-local rate store keyed by client identity.
///
/// Updates go through the map's entry API, which holds the shard lock for the
/// key until the new record is written.
#[derive(Clone, Default)]
pub struct MemoryRateStore {
    map: Arc<DashMap<Key, RateWindow>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracked_identities(&self) -> usize {
        self.map.len()
    }
}

impl RateStore for MemoryRateStore {
    fn get(&self, key: &str) -> Result<Option<RateWindow>, StoreError> {
        Ok(self.map.get(key).map(|entry| entry.value().clone()))
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<RateWindow>) -> RateWindow,
    ) -> Result<(), StoreError> {
        match self.map.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                let next = apply(Some(entry.get().clone()));
                entry.insert(next);
            }
            Entry::Vacant(entry) => {
                entry.insert(apply(None));
            }
        }
        Ok(())
    }

    fn purge_expired(&self, is_expired: &dyn Fn(&RateWindow) -> bool) -> Result<usize, StoreError> {
        let before = self.map.len();
        self.map.retain(|_, record| !is_expired(record));
        let purged = before.saturating_sub(self.map.len());
        if purged > 0 {
            tracing::debug!("Purged {} expired rate windows", purged);
        }
        Ok(purged)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.map.remove(key);
        Ok(())
    }
}
