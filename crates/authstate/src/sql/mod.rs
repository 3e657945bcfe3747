//! SQL database key store.
//!
//! This module provides a [`KeyStore`](crate::KeyStore) over SQL databases
//! (PostgreSQL, MySQL, SQLite) through the SQLx library.
//!
//! # Features
//!
//! Enable one or more database features in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! authstate = { version = "0.1", features = ["sql-postgres"] }
//! # or
//! authstate = { version = "0.1", features = ["sql-mysql"] }
//! # or
//! authstate = { version = "0.1", features = ["sql-sqlite"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use authstate::sql::{SqlStore, SqlStoreConfig};
//! use authstate::{AuthState, StoreConfig};
//!
//! let store = SqlStore::connect(&SqlStoreConfig::new("sqlite:auth.db")).await?;
//! let state = AuthState::bootstrap(store, "5511999999999", caps, StoreConfig::default()).await?;
//! ```
//!
//! # Database Schema
//!
//! Provisioned automatically during bootstrap (PostgreSQL shown):
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS auth_state (
//!     id SERIAL PRIMARY KEY,
//!     phone_number BIGINT NOT NULL,
//!     key_name TEXT NOT NULL,
//!     value JSONB,
//!     UNIQUE (phone_number, key_name)
//! );
//! ```

mod backend;
mod config;
mod queries;

#[cfg(all(test, feature = "sql-sqlite"))]
mod tests;

pub use backend::{DatabaseType, SqlStore};
pub use config::SqlStoreConfig;
