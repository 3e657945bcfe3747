//! Cache-coherent auth state store.
//!
//! [`AuthStateStore<S, C>`] wraps any [`KeyStore`] and provides:
//! - Read-through caching (cache, then backend, then populate the cache)
//! - Write-through caching (backend upsert first, cache only on success)
//! - Best-effort deletes and identity-wide clears
//! - Concurrent batch reads and writes

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, error, info, warn};

use crate::capabilities::KeyDataDecoder;
use crate::codec::Codec;
use crate::error::AuthStateError;
use crate::identity::Identity;
use crate::lookup::Lookup;
use crate::traits::KeyStore;

use super::cache::{CacheStats, KeyCache};
use super::record::{APP_STATE_SYNC_KEY, key_name};

/// Batch write input: category → id → value, where `None` deletes the key.
pub type KeyBatch<V> = HashMap<String, HashMap<String, Option<V>>>;

/// Identity-scoped store that keeps a [`KeyCache`] coherent with a [`KeyStore`].
///
/// # Type parameters
///
/// - `S`: the durable backend (e.g. `SqlStore`, `MemoryStore`)
/// - `C`: the value codec
pub struct AuthStateStore<S: KeyStore, C: Codec> {
    identity: Identity,
    store: S,
    codec: Arc<C>,
    key_data_decoder: KeyDataDecoder<C::Value>,
    cache: Arc<KeyCache<C::Value>>,
}

impl<S: KeyStore, C: Codec> AuthStateStore<S, C> {
    pub(crate) fn new(
        identity: Identity,
        store: S,
        codec: Arc<C>,
        key_data_decoder: KeyDataDecoder<C::Value>,
        cache: Arc<KeyCache<C::Value>>,
    ) -> Self {
        Self {
            identity,
            store,
            codec,
            key_data_decoder,
            cache,
        }
    }

    /// Identity this store is bound to.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Get a reference to the underlying backend.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a reference to the cache.
    pub fn cache(&self) -> &KeyCache<C::Value> {
        &self.cache
    }

    /// Get cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Read a value.
    ///
    /// A cache hit returns without touching the backend. On a miss the value
    /// is selected, decoded and cached. Failures are logged and returned as
    /// [`Lookup::Failed`]; they never populate the cache.
    pub async fn get(&self, key_name: &str) -> Lookup<C::Value> {
        if let Some(value) = self.cache.get(&self.identity, key_name) {
            debug!(identity = %self.identity, key = key_name, "auth state cache hit");
            return Lookup::Found(value);
        }

        // Deletes and clears that land while the select is in flight
        // invalidate what it returns.
        let generation = self.cache.generation();
        let lookup = match self.store.select(&self.identity, key_name).await {
            Ok(Some(raw)) => match self.codec.decode(&raw) {
                Ok(value) => Lookup::Found(self.cache.fill(
                    &self.identity,
                    key_name,
                    value,
                    generation,
                )),
                Err(e) => Lookup::Failed(e),
            },
            Ok(None) => Lookup::NotFound,
            Err(e) => Lookup::Failed(e),
        };

        if let Lookup::Failed(ref e) = lookup {
            warn!(identity = %self.identity, key = key_name, error = %e, "failed to read auth state");
        }
        lookup
    }

    /// Write a value.
    ///
    /// The backend upsert happens first; the cache is updated only once it
    /// succeeds. Encode and backend errors are returned to the caller and
    /// leave the cache untouched.
    pub async fn set(&self, key_name: &str, value: C::Value) -> Result<(), AuthStateError> {
        let result = match self.codec.encode(&value) {
            Ok(encoded) => self.store.upsert(&self.identity, key_name, &encoded).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            error!(identity = %self.identity, key = key_name, error = %e, "failed to write auth state");
            return Err(e);
        }

        self.cache.set(&self.identity, key_name, value);
        Ok(())
    }

    /// Delete a value. Best effort: backend failures are logged and swallowed,
    /// and the cached value is kept so it still mirrors the surviving row.
    pub async fn delete(&self, key_name: &str) {
        match self.store.delete(&self.identity, key_name).await {
            Ok(()) => self.cache.delete(&self.identity, key_name),
            Err(e) => {
                warn!(identity = %self.identity, key = key_name, error = %e, "failed to delete auth state");
            }
        }
    }

    /// Delete every value of this identity, in the backend and the cache.
    /// Best effort: failures are logged and swallowed.
    pub async fn clear_identity(&self) {
        match self.store.delete_all(&self.identity).await {
            Ok(rows) => {
                let cached = self.cache.clear(&self.identity);
                info!(identity = %self.identity, rows, cached, "cleared auth state");
            }
            Err(e) => {
                warn!(identity = %self.identity, error = %e, "failed to clear auth state");
            }
        }
    }

    /// Read `category-id` for every id concurrently.
    ///
    /// The result has one entry per requested id; absent keys and failed
    /// reads map to `None` and never abort the batch. Values of the
    /// `app-state-sync-key` category pass through the key data decoder.
    pub async fn get_many<I>(&self, category: &str, ids: I) -> HashMap<String, Option<C::Value>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let decode_key_data = category == APP_STATE_SYNC_KEY;

        let reads = ids.into_iter().map(|id| {
            let id = id.as_ref().to_string();
            async move {
                let value = self.get(&key_name(category, &id)).await.found();
                let value = if decode_key_data {
                    value.map(|v| (self.key_data_decoder)(v))
                } else {
                    value
                };
                (id, value)
            }
        });

        join_all(reads).await.into_iter().collect()
    }

    /// Apply a batch of writes and deletes concurrently.
    ///
    /// Every operation runs to completion. If any write fails, the first
    /// failure is returned after all siblings have finished; delete failures
    /// are only logged (see [`delete`](Self::delete)).
    pub async fn set_many(&self, data: KeyBatch<C::Value>) -> Result<(), AuthStateError> {
        let ops: Vec<(String, Option<C::Value>)> = data
            .into_iter()
            .flat_map(|(category, entries)| {
                entries
                    .into_iter()
                    .map(move |(id, value)| (key_name(&category, &id), value))
            })
            .collect();

        let total = ops.len();
        let results = join_all(ops.into_iter().map(|(key, value)| async move {
            match value {
                Some(value) => self.set(&key, value).await,
                None => {
                    self.delete(&key).await;
                    Ok(())
                }
            }
        }))
        .await;

        let mut first_error = None;
        let mut failed = 0usize;
        for result in results {
            if let Err(e) = result {
                failed += 1;
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => {
                warn!(identity = %self.identity, total, failed, "auth state batch write failed");
                Err(e)
            }
            None => Ok(()),
        }
    }
}

impl<S: KeyStore + std::fmt::Debug, C: Codec> std::fmt::Debug for AuthStateStore<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStateStore")
            .field("identity", &self.identity)
            .field("store", &self.store)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}
