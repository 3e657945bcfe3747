//! Configuration for [`AuthStateStore`](super::AuthStateStore).

use std::num::NonZeroUsize;

/// Store settings independent of the backend.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum number of cached values (`None` = unbounded).
    ///
    /// When set, the least recently used value is evicted; an evicted key is
    /// simply read through from the backend again.
    pub cache_capacity: Option<NonZeroUsize>,

    /// Whether to provision the schema during bootstrap.
    pub provision_schema: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cache_capacity: None,
            provision_schema: true,
        }
    }
}

impl StoreConfig {
    /// Builder: bound the cache to `capacity` entries (0 = unbounded).
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = NonZeroUsize::new(capacity);
        self
    }

    /// Builder: enable or disable schema provisioning.
    pub fn provision_schema(mut self, enabled: bool) -> Self {
        self.provision_schema = enabled;
        self
    }
}
