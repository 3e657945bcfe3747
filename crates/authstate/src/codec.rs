//! Value codecs.
//!
//! A [`Codec`] turns structured values into the JSON text stored in the
//! value column and back. It must be deterministic and lossless for the
//! values it is used with.

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AuthStateError;

/// Encode/decode pair for stored values.
pub trait Codec: Send + Sync + 'static {
    /// Decoded value type held by the cache and handed to callers.
    type Value: Clone + Send + Sync + 'static;

    /// Encode a value into its stored JSON text.
    fn encode(&self, value: &Self::Value) -> Result<String, AuthStateError>;

    /// Decode stored JSON text into a value.
    fn decode(&self, raw: &str) -> Result<Self::Value, AuthStateError>;
}

/// [`Codec`] backed by `serde_json` for any serde type.
///
/// Use `JsonCodec<serde_json::Value>` to store untyped documents.
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    /// Create a new JSON codec.
    #[inline]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JsonCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonCodec")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> Codec for JsonCodec<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    type Value = T;

    fn encode(&self, value: &T) -> Result<String, AuthStateError> {
        serde_json::to_string(value).map_err(AuthStateError::codec)
    }

    fn decode(&self, raw: &str) -> Result<T, AuthStateError> {
        serde_json::from_str(raw).map_err(AuthStateError::codec)
    }
}
