//! Session handle: credentials bootstrap on top of an [`AuthStateStore`].

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::capabilities::{Capabilities, ResolvedCapabilities};
use crate::codec::Codec;
use crate::error::AuthStateError;
use crate::identity::Identity;
use crate::lookup::Lookup;
use crate::traits::KeyStore;

use super::auth::{AuthStateStore, KeyBatch};
use super::cache::KeyCache;
use super::config::StoreConfig;
use super::record::CREDS_KEY;

/// Auth state of one identity: live credentials plus the key store.
///
/// Built by [`bootstrap`](Self::bootstrap), which guarantees that a
/// credentials row exists in the backend before the handle is returned.
///
/// # Example
///
/// ```
/// use authstate::{AuthState, Capabilities, JsonCodec, MemoryStore, StoreConfig};
/// use serde_json::{Value, json};
///
/// # async fn example() -> Result<(), authstate::AuthStateError> {
/// let caps = Capabilities::new()
///     .codec(JsonCodec::<Value>::new())
///     .credential_factory(|| json!({ "registrationId": 42 }))
///     .key_data_decoder(|v| v);
///
/// let state = AuthState::bootstrap(MemoryStore::new(), "5511999999999", caps, StoreConfig::default()).await?;
/// state.update_creds(|creds| creds["registered"] = json!(true));
/// state.save_creds().await?;
/// # Ok(())
/// # }
/// ```
pub struct AuthState<S: KeyStore, C: Codec> {
    keys: AuthStateStore<S, C>,
    creds: RwLock<C::Value>,
}

impl<S: KeyStore, C: Codec> AuthState<S, C> {
    /// Validate inputs, provision the schema and load or create credentials.
    ///
    /// Invalid identities and incomplete capability bundles fail with
    /// [`AuthStateError::Config`] before the backend is touched.
    pub async fn bootstrap(
        store: S,
        identity: &str,
        capabilities: Capabilities<C>,
        config: StoreConfig,
    ) -> Result<Self, AuthStateError> {
        let identity = Identity::parse(identity)?;
        let capabilities = capabilities.resolve()?;
        let cache = Arc::new(KeyCache::new(config.cache_capacity));
        Self::bootstrap_resolved(store, identity, capabilities, &config, cache).await
    }

    /// Like [`bootstrap`](Self::bootstrap), but use a caller-owned cache.
    ///
    /// Lets several identities share one cache; `config.cache_capacity` is
    /// ignored in favour of the given cache's own capacity.
    pub async fn bootstrap_with_cache(
        store: S,
        identity: &str,
        capabilities: Capabilities<C>,
        config: StoreConfig,
        cache: Arc<KeyCache<C::Value>>,
    ) -> Result<Self, AuthStateError> {
        let identity = Identity::parse(identity)?;
        let capabilities = capabilities.resolve()?;
        Self::bootstrap_resolved(store, identity, capabilities, &config, cache).await
    }

    pub(crate) async fn bootstrap_resolved(
        store: S,
        identity: Identity,
        capabilities: ResolvedCapabilities<C>,
        config: &StoreConfig,
        cache: Arc<KeyCache<C::Value>>,
    ) -> Result<Self, AuthStateError> {
        if config.provision_schema {
            store.provision().await?;
        }

        let ResolvedCapabilities {
            codec,
            credential_factory,
            key_data_decoder,
        } = capabilities;

        let keys = AuthStateStore::new(identity, store, codec, key_data_decoder, cache);

        let creds = match keys.get(CREDS_KEY).await {
            Lookup::Found(creds) => {
                debug!(identity = %keys.identity(), "loaded stored credentials");
                creds
            }
            lookup => {
                if lookup.is_failed() {
                    warn!(
                        identity = %keys.identity(),
                        "stored credentials unreadable, generating new ones"
                    );
                }
                let fresh = credential_factory();
                keys.set(CREDS_KEY, fresh.clone()).await?;
                info!(identity = %keys.identity(), "generated and persisted new credentials");
                fresh
            }
        };

        Ok(Self {
            keys,
            creds: RwLock::new(creds),
        })
    }

    /// Identity this state belongs to.
    pub fn identity(&self) -> &Identity {
        self.keys.identity()
    }

    /// The key store backing this state.
    pub fn keys(&self) -> &AuthStateStore<S, C> {
        &self.keys
    }

    /// Snapshot of the live credentials.
    pub fn creds(&self) -> C::Value {
        self.creds.read().clone()
    }

    /// Mutate the live credentials in place.
    ///
    /// Changes are only persisted by [`save_creds`](Self::save_creds).
    pub fn update_creds<R>(&self, f: impl FnOnce(&mut C::Value) -> R) -> R {
        f(&mut self.creds.write())
    }

    /// Replace the live credentials.
    pub fn replace_creds(&self, creds: C::Value) {
        *self.creds.write() = creds;
    }

    /// Persist the current credentials.
    pub async fn save_creds(&self) -> Result<(), AuthStateError> {
        let creds = self.creds();
        self.keys.set(CREDS_KEY, creds).await
    }

    /// Delete every stored key of this identity (credentials included).
    ///
    /// The live credentials are left as they are; saving them again
    /// recreates the credentials row.
    pub async fn reset_session(&self) {
        self.keys.clear_identity().await;
    }

    /// Batch read; see [`AuthStateStore::get_many`].
    pub async fn get_many<I>(&self, category: &str, ids: I) -> HashMap<String, Option<C::Value>>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.keys.get_many(category, ids).await
    }

    /// Batch write; see [`AuthStateStore::set_many`].
    pub async fn set_many(&self, data: KeyBatch<C::Value>) -> Result<(), AuthStateError> {
        self.keys.set_many(data).await
    }
}

impl<S: KeyStore + std::fmt::Debug, C: Codec> std::fmt::Debug for AuthState<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}
