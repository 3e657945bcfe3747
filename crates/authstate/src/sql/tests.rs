//! Tests for the SQL key store.

use std::sync::Arc;

use serde_json::{Value, json};
use sqlx::Row;

use crate::sql::{DatabaseType, SqlStore, SqlStoreConfig};
use crate::{AuthState, AuthStateError, Capabilities, Identity, JsonCodec, KeyStore, StoreConfig};

/// Create a test SqlStore with in-memory SQLite and the schema in place.
async fn setup_test_db() -> SqlStore {
    let config = SqlStoreConfig::new("sqlite::memory:").max_connections(1);
    let store = SqlStore::connect(&config).await.expect("Failed to connect");
    store.provision().await.expect("Failed to provision schema");
    store
}

/// Count rows for one `(identity, key_name)` pair.
async fn count_rows(store: &SqlStore, identity: &Identity, key_name: &str) -> i64 {
    let row = sqlx::query(
        "SELECT COUNT(*) AS n FROM auth_state WHERE phone_number = ? AND key_name = ?",
    )
    .bind(identity.number())
    .bind(key_name)
    .fetch_one(store.pool())
    .await
    .expect("Failed to count rows");
    row.try_get("n").expect("Failed to read count")
}

fn id(raw: &str) -> Identity {
    Identity::parse(raw).unwrap()
}

fn capabilities() -> Capabilities<JsonCodec<Value>> {
    Capabilities::new()
        .codec(JsonCodec::new())
        .credential_factory(|| json!({ "registrationId": 4242, "registered": false }))
        .key_data_decoder(|v| v)
}

#[tokio::test]
async fn test_database_type_detection() {
    assert_eq!(
        DatabaseType::from_url("postgres://localhost/db"),
        Some(DatabaseType::PostgreSQL)
    );
    assert_eq!(
        DatabaseType::from_url("postgresql://localhost/db"),
        Some(DatabaseType::PostgreSQL)
    );
    assert_eq!(
        DatabaseType::from_url("mysql://localhost/db"),
        Some(DatabaseType::MySQL)
    );
    assert_eq!(
        DatabaseType::from_url("mariadb://localhost/db"),
        Some(DatabaseType::MySQL)
    );
    assert_eq!(
        DatabaseType::from_url("sqlite:test.db"),
        Some(DatabaseType::SQLite)
    );
    assert_eq!(
        DatabaseType::from_url("sqlite::memory:"),
        Some(DatabaseType::SQLite)
    );
    assert_eq!(DatabaseType::from_url("invalid://localhost"), None);
}

#[tokio::test]
async fn test_invalid_config_is_rejected_before_connecting() {
    let empty = SqlStore::connect(&SqlStoreConfig::new("")).await;
    assert!(matches!(empty, Err(AuthStateError::Config(_))));

    let scheme = SqlStore::connect(&SqlStoreConfig::new("redis://localhost")).await;
    assert!(matches!(scheme, Err(AuthStateError::Config(_))));

    let pool = SqlStore::connect(&SqlStoreConfig::new("sqlite::memory:").max_connections(0)).await;
    assert!(matches!(pool, Err(AuthStateError::Config(_))));
}

#[tokio::test]
async fn test_connect_sqlite() {
    let store = setup_test_db().await;
    assert_eq!(store.database_type(), DatabaseType::SQLite);
}

#[tokio::test]
async fn test_provision_is_idempotent() {
    let store = setup_test_db().await;
    let alice = id("5511900000001");

    store.upsert(&alice, "creds", "{}").await.unwrap();
    store.provision().await.unwrap();
    store.provision().await.unwrap();

    assert_eq!(store.select(&alice, "creds").await.unwrap().as_deref(), Some("{}"));
}

#[tokio::test]
async fn test_select_missing_key() {
    let store = setup_test_db().await;
    assert_eq!(store.select(&id("1"), "pre-key-1").await.unwrap(), None);
}

#[tokio::test]
async fn test_upsert_keeps_single_row() {
    let store = setup_test_db().await;
    let alice = id("5511900000001");

    store.upsert(&alice, "session-1", r#"{"v":1}"#).await.unwrap();
    store.upsert(&alice, "session-1", r#"{"v":2}"#).await.unwrap();

    assert_eq!(count_rows(&store, &alice, "session-1").await, 1);
    assert_eq!(
        store.select(&alice, "session-1").await.unwrap().as_deref(),
        Some(r#"{"v":2}"#)
    );
}

#[tokio::test]
async fn test_delete_single_key() {
    let store = setup_test_db().await;
    let alice = id("77");

    store.upsert(&alice, "pre-key-1", "1").await.unwrap();
    store.upsert(&alice, "pre-key-2", "2").await.unwrap();
    store.delete(&alice, "pre-key-1").await.unwrap();
    // Deleting a missing row is not an error
    store.delete(&alice, "pre-key-1").await.unwrap();

    assert_eq!(store.select(&alice, "pre-key-1").await.unwrap(), None);
    assert_eq!(store.select(&alice, "pre-key-2").await.unwrap().as_deref(), Some("2"));
}

#[tokio::test]
async fn test_delete_all_does_not_cross_identities() {
    let store = setup_test_db().await;
    let short = id("123");
    let long = id("1234");

    store.upsert(&short, "creds", "{}").await.unwrap();
    store.upsert(&short, "pre-key-1", "{}").await.unwrap();
    store.upsert(&long, "creds", "{}").await.unwrap();

    assert_eq!(store.delete_all(&short).await.unwrap(), 2);
    assert!(store.entries(&short).await.unwrap().is_empty());
    assert_eq!(store.select(&long, "creds").await.unwrap().as_deref(), Some("{}"));
}

#[tokio::test]
async fn test_entries_ordered_by_key() {
    let store = setup_test_db().await;
    let alice = id("5");

    store.upsert(&alice, "session-b", "2").await.unwrap();
    store.upsert(&alice, "creds", "0").await.unwrap();
    store.upsert(&alice, "session-a", "1").await.unwrap();

    let entries = store.entries(&alice).await.unwrap();
    let keys: Vec<&str> = entries.iter().map(|e| e.key_name.as_str()).collect();
    assert_eq!(keys, ["creds", "session-a", "session-b"]);
    assert_eq!(entries[0].value, "0");
}

#[tokio::test]
async fn test_bootstrap_persists_fresh_credentials() {
    let store = Arc::new(setup_test_db().await);
    let alice = id("5511900000001");

    let state = AuthState::bootstrap(
        Arc::clone(&store),
        alice.as_str(),
        capabilities(),
        StoreConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(state.creds()["registrationId"], 4242);
    assert_eq!(count_rows(&store, &alice, "creds").await, 1);
}

#[tokio::test]
async fn test_second_bootstrap_reuses_stored_credentials() {
    let store = Arc::new(setup_test_db().await);
    let counter = Arc::new(std::sync::atomic::AtomicU32::new(0));

    let caps = || {
        let counter = Arc::clone(&counter);
        Capabilities::new()
            .codec(JsonCodec::<Value>::new())
            .credential_factory(move || {
                let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                json!({ "registrationId": n })
            })
            .key_data_decoder(|v| v)
    };

    let first = AuthState::bootstrap(Arc::clone(&store), "99", caps(), StoreConfig::default())
        .await
        .unwrap();
    first.update_creds(|c| c["registered"] = json!(true));
    first.save_creds().await.unwrap();

    // Fresh cache, same database
    let second = AuthState::bootstrap(Arc::clone(&store), "99", caps(), StoreConfig::default())
        .await
        .unwrap();

    assert_eq!(counter.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(second.creds(), json!({ "registrationId": 0, "registered": true }));
}

#[tokio::test]
async fn test_reset_session_clears_rows() {
    let store = Arc::new(setup_test_db().await);

    let state = AuthState::bootstrap(Arc::clone(&store), "123", capabilities(), StoreConfig::default())
        .await
        .unwrap();
    let other = AuthState::bootstrap(Arc::clone(&store), "1234", capabilities(), StoreConfig::default())
        .await
        .unwrap();

    let mut batch = crate::KeyBatch::new();
    batch.insert(
        "pre-key".to_string(),
        [("1".to_string(), Some(json!({"k": 1})))].into_iter().collect(),
    );
    state.set_many(batch).await.unwrap();

    state.reset_session().await;

    assert!(store.entries(state.identity()).await.unwrap().is_empty());
    assert_eq!(store.entries(other.identity()).await.unwrap().len(), 1);
    assert!(state.get_many("pre-key", ["1"]).await["1"].is_none());
}

#[tokio::test]
async fn test_malformed_stored_value_reads_as_failure() {
    let store = Arc::new(setup_test_db().await);
    let state = AuthState::bootstrap(Arc::clone(&store), "8", capabilities(), StoreConfig::default())
        .await
        .unwrap();

    store
        .upsert(state.identity(), "sender-key-x", "{not json")
        .await
        .unwrap();

    assert!(state.keys().get("sender-key-x").await.is_failed());
    let out = state.get_many("sender-key", ["x"]).await;
    assert_eq!(out.len(), 1);
    assert!(out["x"].is_none());
}

#[tokio::test]
async fn test_connect_validates_identity_first() {
    let result = AuthState::connect(
        SqlStoreConfig::new("sqlite::memory:").max_connections(1),
        "not-a-number",
        capabilities(),
        StoreConfig::default(),
    )
    .await;
    assert!(matches!(result, Err(AuthStateError::Config(_))));

    let state = AuthState::connect(
        SqlStoreConfig::new("sqlite::memory:").max_connections(1),
        "5511900000001",
        capabilities(),
        StoreConfig::default(),
    )
    .await
    .unwrap();
    assert!(state.keys().cache().contains(state.identity(), crate::CREDS_KEY));
}
