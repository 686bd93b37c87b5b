use crate::{entities::rate_window::RateWindow, errors::StoreError};

/// Storage capability behind the rate limiter.
///
/// `update` must apply the closure atomically for the given key: no other
/// `update` on the same key may interleave between the read and the write.
pub trait RateStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<RateWindow>, StoreError>;

    /// Reads the record for `key`, hands it to `apply` and stores the result.
    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<RateWindow>) -> RateWindow,
    ) -> Result<(), StoreError>;

    /// Deletes every record matching `is_expired`, returning how many went.
    fn purge_expired(&self, is_expired: &dyn Fn(&RateWindow) -> bool) -> Result<usize, StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
