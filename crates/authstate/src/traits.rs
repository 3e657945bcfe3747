//! Durable backend trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AuthStateError;
use crate::identity::Identity;
use crate::store::StoredEntry;

/// Data-access layer for the durable auth state table.
///
/// Implementations only move encoded values in and out of storage. Caching,
/// decoding and failure policy live in
/// [`AuthStateStore`](crate::store::AuthStateStore), which wraps a `KeyStore`.
///
/// Implementations must be thread-safe (`Send + Sync`); the store issues
/// concurrent calls for different keys of the same identity.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Create the schema if it does not exist. Must be idempotent.
    async fn provision(&self) -> Result<(), AuthStateError>;

    /// Insert or overwrite the value for `(identity, key_name)`.
    async fn upsert(
        &self,
        identity: &Identity,
        key_name: &str,
        value: &str,
    ) -> Result<(), AuthStateError>;

    /// Look up the encoded value for `(identity, key_name)`.
    ///
    /// Returns `None` if no row exists (or the stored value is NULL).
    async fn select(
        &self,
        identity: &Identity,
        key_name: &str,
    ) -> Result<Option<String>, AuthStateError>;

    /// Remove the row for `(identity, key_name)` if present.
    async fn delete(&self, identity: &Identity, key_name: &str) -> Result<(), AuthStateError>;

    /// Remove every row of `identity`, returning how many were removed.
    async fn delete_all(&self, identity: &Identity) -> Result<u64, AuthStateError>;

    /// List every stored entry of `identity`, ordered by key name.
    async fn entries(&self, identity: &Identity) -> Result<Vec<StoredEntry>, AuthStateError>;
}

/// Blanket implementation for `Arc<S>` where `S: KeyStore`.
///
/// This allows several stores (or a store and a CLI) to share one backend.
#[async_trait]
impl<S: KeyStore + ?Sized> KeyStore for Arc<S> {
    #[inline]
    async fn provision(&self) -> Result<(), AuthStateError> {
        (**self).provision().await
    }

    #[inline]
    async fn upsert(
        &self,
        identity: &Identity,
        key_name: &str,
        value: &str,
    ) -> Result<(), AuthStateError> {
        (**self).upsert(identity, key_name, value).await
    }

    #[inline]
    async fn select(
        &self,
        identity: &Identity,
        key_name: &str,
    ) -> Result<Option<String>, AuthStateError> {
        (**self).select(identity, key_name).await
    }

    #[inline]
    async fn delete(&self, identity: &Identity, key_name: &str) -> Result<(), AuthStateError> {
        (**self).delete(identity, key_name).await
    }

    #[inline]
    async fn delete_all(&self, identity: &Identity) -> Result<u64, AuthStateError> {
        (**self).delete_all(identity).await
    }

    #[inline]
    async fn entries(&self, identity: &Identity) -> Result<Vec<StoredEntry>, AuthStateError> {
        (**self).entries(identity).await
    }
}

/// Blanket implementation for `Box<S>` where `S: KeyStore`.
#[async_trait]
impl<S: KeyStore + ?Sized> KeyStore for Box<S> {
    #[inline]
    async fn provision(&self) -> Result<(), AuthStateError> {
        (**self).provision().await
    }

    #[inline]
    async fn upsert(
        &self,
        identity: &Identity,
        key_name: &str,
        value: &str,
    ) -> Result<(), AuthStateError> {
        (**self).upsert(identity, key_name, value).await
    }

    #[inline]
    async fn select(
        &self,
        identity: &Identity,
        key_name: &str,
    ) -> Result<Option<String>, AuthStateError> {
        (**self).select(identity, key_name).await
    }

    #[inline]
    async fn delete(&self, identity: &Identity, key_name: &str) -> Result<(), AuthStateError> {
        (**self).delete(identity, key_name).await
    }

    #[inline]
    async fn delete_all(&self, identity: &Identity) -> Result<u64, AuthStateError> {
        (**self).delete_all(identity).await
    }

    #[inline]
    async fn entries(&self, identity: &Identity) -> Result<Vec<StoredEntry>, AuthStateError> {
        (**self).entries(identity).await
    }
}
