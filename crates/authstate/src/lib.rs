//! Identity-scoped, cache-coherent persistence for session auth state.
//!
//! A messaging client keeps its long-lived credentials and a large number of
//! small cryptographic keys (pre-keys, sessions, sender keys, app-state sync
//! keys) per phone-number identity. This crate stores them in a durable
//! backend and fronts it with an in-process cache:
//!
//! - reads go to the cache first and fall back to the backend
//! - writes go to the backend first and reach the cache only on success
//! - an identity can be wiped without touching any other identity
//!
//! # Example
//!
//! ```
//! use authstate::{AuthState, Capabilities, JsonCodec, MemoryStore, StoreConfig};
//! use serde_json::{Value, json};
//!
//! # async fn example() -> Result<(), authstate::AuthStateError> {
//! let caps = Capabilities::new()
//!     .codec(JsonCodec::<Value>::new())
//!     .credential_factory(|| json!({ "registrationId": 1 }))
//!     .key_data_decoder(|v| v);
//!
//! let state = AuthState::bootstrap(MemoryStore::new(), "5511999999999", caps, StoreConfig::default()).await?;
//! state.keys().set("pre-key-1", json!({ "public": "..." })).await?;
//! assert!(state.keys().get("pre-key-1").await.is_found());
//! # Ok(())
//! # }
//! ```

mod capabilities;
mod codec;
mod error;
mod identity;
mod lookup;
mod memory;
mod traits;

pub mod config;
pub mod store;

#[cfg(feature = "sql")]
pub mod sql;

#[cfg(feature = "cli")]
pub mod cli;

pub use capabilities::{Capabilities, CredentialFactory, KeyDataDecoder};
pub use codec::{Codec, JsonCodec};
pub use error::AuthStateError;
pub use identity::Identity;
pub use lookup::Lookup;
pub use memory::MemoryStore;
pub use store::{
    APP_STATE_SYNC_KEY, AuthState, AuthStateStore, CREDS_KEY, CacheStats, KeyBatch, KeyCache,
    StoreConfig, StoredEntry, key_name,
};
pub use traits::KeyStore;

#[cfg(feature = "cli")]
pub use cli::AuthStateArgs;
