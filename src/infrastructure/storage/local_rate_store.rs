use parking_lot::Mutex;

use crate::{
    entities::rate_window::RateWindow,
    errors::StoreError,
    repositories::{key_value::KeyValueStorage, rate_store::RateStore},
};

pub const RATE_LIMIT_KEY: &str = "contact_form_submissions";

/// Rate store for the single implicit identity of a client install.
///
/// Every identity maps onto the same persisted document. A document that
/// cannot be parsed is reported as [`StoreError::Corrupt`] and left as is.
pub struct LocalRateStore<S>
where
    S: KeyValueStorage,
{
    storage: S,
    lock: Mutex<()>,
}

impl<S> LocalRateStore<S>
where
    S: KeyValueStorage,
{
    pub fn new(storage: S) -> Self {
        LocalRateStore {
            storage,
            lock: Mutex::new(()),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn read(&self) -> Result<Option<RateWindow>, StoreError> {
        match self.storage.get_item(RATE_LIMIT_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

impl<S> RateStore for LocalRateStore<S>
where
    S: KeyValueStorage,
{
    fn get(&self, _key: &str) -> Result<Option<RateWindow>, StoreError> {
        let _guard = self.lock.lock();
        self.read()
    }

    fn update(
        &self,
        _key: &str,
        apply: &mut dyn FnMut(Option<RateWindow>) -> RateWindow,
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let current = self.read()?;
        let unchanged = current.clone();
        let next = apply(current);
        if unchanged.as_ref() != Some(&next) {
            let raw = serde_json::to_string(&next)?;
            self.storage.set_item(RATE_LIMIT_KEY, &raw)?;
        }
        Ok(())
    }

    fn purge_expired(&self, is_expired: &dyn Fn(&RateWindow) -> bool) -> Result<usize, StoreError> {
        let _guard = self.lock.lock();
        match self.read()? {
            Some(record) if is_expired(&record) => {
                self.storage.remove_item(RATE_LIMIT_KEY)?;
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        self.storage.remove_item(RATE_LIMIT_KEY)?;
        Ok(())
    }
}
