//! Stored entry as returned by a [`KeyStore`](crate::KeyStore) listing.

/// Separator between a category and an id in key names.
pub const CATEGORY_SEPARATOR: char = '-';

/// Key name of the bootstrap credentials entry.
pub const CREDS_KEY: &str = "creds";

/// Category whose values pass through the key data decoder on read.
pub const APP_STATE_SYNC_KEY: &str = "app-state-sync-key";

/// Compose the key name for `id` within `category`.
#[inline]
pub fn key_name(category: &str, id: &str) -> String {
    format!("{category}{CATEGORY_SEPARATOR}{id}")
}

/// One row of the auth state table, value still encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    /// Key name within the identity's namespace.
    pub key_name: String,
    /// Encoded (JSON) value.
    pub value: String,
}
