//! Cache-coherent auth state store.
//!
//! This module provides:
//!
//! - [`AuthStateStore`]: read-through/write-through store over any [`KeyStore`](crate::KeyStore)
//! - [`AuthState`]: session handle with credentials bootstrap
//! - [`KeyCache`] / [`CacheStats`]: identity-scoped value cache
//! - [`StoreConfig`]: cache capacity and provisioning settings
//! - [`StoredEntry`]: raw row returned by backend listings
//!
//! # Adding a new backend
//!
//! ```ignore
//! use authstate::{AuthState, AuthStateError, Identity, KeyStore, StoredEntry};
//!
//! struct MyStore { /* ... */ }
//!
//! #[async_trait::async_trait]
//! impl KeyStore for MyStore {
//!     async fn provision(&self) -> Result<(), AuthStateError> { todo!() }
//!     async fn upsert(&self, identity: &Identity, key: &str, value: &str) -> Result<(), AuthStateError> { todo!() }
//!     // ...
//! }
//!
//! // Then construct: AuthState::bootstrap(MyStore { .. }, "5511999999999", caps, config)
//! ```

mod auth;
mod cache;
mod config;
mod record;
mod session;


pub use auth::{AuthStateStore, KeyBatch};
pub use cache::{CacheStats, KeyCache};
pub use config::StoreConfig;
pub use record::{APP_STATE_SYNC_KEY, CATEGORY_SEPARATOR, CREDS_KEY, StoredEntry, key_name};
pub use session::AuthState;
