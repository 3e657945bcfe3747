//! Caller-supplied capabilities: codec, credential factory and the
//! app-state-sync key decoder.

use std::fmt;
use std::sync::Arc;

use crate::codec::Codec;
use crate::error::AuthStateError;

/// Produces fresh credentials for an identity that has none stored.
pub type CredentialFactory<V> = Arc<dyn Fn() -> V + Send + Sync>;

/// Transform applied to values read from the `app-state-sync-key` category.
pub type KeyDataDecoder<V> = Arc<dyn Fn(V) -> V + Send + Sync>;

/// Capability bundle handed to the store at construction.
///
/// Every capability is required; a missing one is reported as
/// [`AuthStateError::Config`] when the store is built.
///
/// # Example
///
/// ```
/// use authstate::{Capabilities, JsonCodec};
/// use serde_json::{Value, json};
///
/// let caps = Capabilities::new()
///     .codec(JsonCodec::<Value>::new())
///     .credential_factory(|| json!({ "registrationId": 1 }))
///     .key_data_decoder(|v| v);
/// ```
pub struct Capabilities<C: Codec> {
    codec: Option<Arc<C>>,
    credential_factory: Option<CredentialFactory<C::Value>>,
    key_data_decoder: Option<KeyDataDecoder<C::Value>>,
}

impl<C: Codec> Capabilities<C> {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self {
            codec: None,
            credential_factory: None,
            key_data_decoder: None,
        }
    }

    /// Builder: set the value codec.
    pub fn codec(mut self, codec: C) -> Self {
        self.codec = Some(Arc::new(codec));
        self
    }

    /// Builder: set a shared value codec.
    pub fn shared_codec(mut self, codec: Arc<C>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Builder: set the credential factory.
    pub fn credential_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> C::Value + Send + Sync + 'static,
    {
        self.credential_factory = Some(Arc::new(factory));
        self
    }

    /// Builder: set the app-state-sync key decoder.
    pub fn key_data_decoder<F>(mut self, decoder: F) -> Self
    where
        F: Fn(C::Value) -> C::Value + Send + Sync + 'static,
    {
        self.key_data_decoder = Some(Arc::new(decoder));
        self
    }

    /// Check that every capability is present.
    pub(crate) fn resolve(self) -> Result<ResolvedCapabilities<C>, AuthStateError> {
        let codec = self
            .codec
            .ok_or_else(|| AuthStateError::config("missing codec capability"))?;
        let credential_factory = self
            .credential_factory
            .ok_or_else(|| AuthStateError::config("missing credential factory capability"))?;
        let key_data_decoder = self
            .key_data_decoder
            .ok_or_else(|| AuthStateError::config("missing key data decoder capability"))?;

        Ok(ResolvedCapabilities {
            codec,
            credential_factory,
            key_data_decoder,
        })
    }
}

impl<C: Codec> Default for Capabilities<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec> fmt::Debug for Capabilities<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("codec", &self.codec.is_some())
            .field("credential_factory", &self.credential_factory.is_some())
            .field("key_data_decoder", &self.key_data_decoder.is_some())
            .finish()
    }
}

/// Capabilities after validation.
pub(crate) struct ResolvedCapabilities<C: Codec> {
    pub(crate) codec: Arc<C>,
    pub(crate) credential_factory: CredentialFactory<C::Value>,
    pub(crate) key_data_decoder: KeyDataDecoder<C::Value>,
}
