//! Integration tests for LogStore using PostgreSQL via testcontainers
//!
//! These tests spin up real PostgreSQL instances using Docker.

mod common;

use serde_json::json;
use sessionlog_core::{Backend, Error, ListSessionsOptions, LogStoreConfig, SessionLogStore};
use sessionlog_store::LogStore;
use std::time::Duration;
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS logs (
        session_id TEXT NOT NULL,
        date TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
        text TEXT NOT NULL,
        data TEXT
    )
"#;

const JSONB_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS logs (
        session_id TEXT NOT NULL,
        date TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
        text TEXT NOT NULL,
        data JSONB
    )
"#;

const JSON_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS logs (
        session_id TEXT NOT NULL,
        date TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
        text TEXT NOT NULL,
        data JSON
    )
"#;

async fn create_test_store(strict: bool) -> (ContainerAsync<Postgres>, LogStore) {
    create_store_with_schema(strict, SCHEMA).await
}

/// Helper to create a test PostgreSQL container and a store on `schema`
async fn create_store_with_schema(strict: bool, schema: &str) -> (ContainerAsync<Postgres>, LogStore) {
    let container = Postgres::default()
        .with_tag("17-alpine")
        .start()
        .await
        .expect("Failed to start PostgreSQL container");

    let host_port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get container port");

    // Wait a moment for PostgreSQL to be ready
    tokio::time::sleep(Duration::from_secs(2)).await;

    let config = LogStoreConfig::new(Backend::Postgres)
        .with_port(host_port)
        .with_database("postgres")
        .with_credentials("postgres", "postgres")
        .with_strict(strict);

    let store = LogStore::connect(config)
        .await
        .expect("Failed to create PostgreSQL log store");
    common::provision(&store, schema).await;

    (container, store)
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_basic_scenario() {
    let (_container, store) = create_test_store(true).await;
    common::assert_basic_scenario(&store).await;
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_payload_round_trip() {
    let (_container, store) = create_test_store(true).await;
    common::assert_payload_round_trip(&store).await;
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_jsonb_data_column() {
    let (_container, store) = create_store_with_schema(true, JSONB_SCHEMA).await;

    common::assert_basic_scenario(&store).await;
    common::assert_payload_round_trip(&store).await;

    store.log("plain".into(), "no payload", None).await.unwrap();
    store
        .log_with_data("plain", "array payload", &vec![1, 2, 3])
        .await
        .unwrap();

    let entries = store.session_log("plain".into()).await.unwrap();
    assert_eq!(entries[0].data, None);
    assert_eq!(entries[1].data, Some(json!([1, 2, 3])));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_json_data_column() {
    let (_container, store) = create_store_with_schema(true, JSON_SCHEMA).await;

    common::assert_payload_round_trip(&store).await;

    store.log("plain".into(), "no payload", None).await.unwrap();
    let entries = store.session_log("plain".into()).await.unwrap();
    assert_eq!(entries[0].data, None);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_microsecond_dates() {
    let (_container, store) = create_test_store(true).await;

    sqlx::query("INSERT INTO logs (session_id, date, text) VALUES ('p', '2024-01-01 10:00:00.123456+00', 'precise')")
        .execute(store.pool())
        .await
        .unwrap();

    let entries = store.session_log("p".into()).await.unwrap();
    assert_eq!(
        entries[0].date.to_rfc3339(),
        "2024-01-01T10:00:00.123456+00:00"
    );
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_lenient_mode_disables_synchronous_commit() {
    let (_container, store) = create_test_store(false).await;

    let setting: String = sqlx::query_scalar("SELECT current_setting('synchronous_commit')")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(setting, "off");

    store.log(1.into(), "still written", None).await.unwrap();
    assert_eq!(store.session_log(1.into()).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_remove_and_unlimited_listing() {
    let (_container, store) = create_test_store(true).await;

    for i in 0..12 {
        store.log(i.into(), "entry", None).await.unwrap();
    }

    let all = store
        .list_sessions(&ListSessionsOptions::new().unlimited())
        .await
        .unwrap();
    assert_eq!(all.len(), 12);

    assert_eq!(store.remove_session_logs(0.into()).await.unwrap(), 1);
    let all = store
        .list_sessions(&ListSessionsOptions::new().unlimited())
        .await
        .unwrap();
    assert_eq!(all.len(), 11);
    assert!(all.iter().all(|s| s.id.as_str() != "0"));
}

#[tokio::test]
async fn test_refused_connection_is_connection_error() {
    let config = LogStoreConfig::new(Backend::Postgres)
        .with_port(1)
        .with_credentials("postgres", "postgres")
        .with_acquire_timeout(Duration::from_secs(1));

    let result = LogStore::connect(config).await;
    assert!(matches!(result, Err(Error::Connection(_))));
}
