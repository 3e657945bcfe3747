//! In-memory key store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::AuthStateError;
use crate::identity::Identity;
use crate::store::StoredEntry;
use crate::traits::KeyStore;

/// Process-local [`KeyStore`] backed by an ordered map.
///
/// Suitable for ephemeral sessions and tests. Nothing survives the process;
/// for durable state use the SQL backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// `(identity, key_name)` → encoded value.
    rows: RwLock<BTreeMap<(i64, String), String>>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of rows across all identities.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

#[async_trait]
impl KeyStore for MemoryStore {
    async fn provision(&self) -> Result<(), AuthStateError> {
        Ok(())
    }

    async fn upsert(
        &self,
        identity: &Identity,
        key_name: &str,
        value: &str,
    ) -> Result<(), AuthStateError> {
        self.rows
            .write()
            .insert((identity.number(), key_name.to_string()), value.to_string());
        Ok(())
    }

    async fn select(
        &self,
        identity: &Identity,
        key_name: &str,
    ) -> Result<Option<String>, AuthStateError> {
        Ok(self
            .rows
            .read()
            .get(&(identity.number(), key_name.to_string()))
            .cloned())
    }

    async fn delete(&self, identity: &Identity, key_name: &str) -> Result<(), AuthStateError> {
        self.rows
            .write()
            .remove(&(identity.number(), key_name.to_string()));
        Ok(())
    }

    async fn delete_all(&self, identity: &Identity) -> Result<u64, AuthStateError> {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|(number, _), _| *number != identity.number());
        Ok((before - rows.len()) as u64)
    }

    async fn entries(&self, identity: &Identity) -> Result<Vec<StoredEntry>, AuthStateError> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|((number, _), _)| *number == identity.number())
            .map(|((_, key_name), value)| StoredEntry {
                key_name: key_name.clone(),
                value: value.clone(),
            })
            .collect())
    }
}
