//! Shared helpers for LogStore integration tests

#![allow(dead_code)]

use serde_json::json;
use sessionlog_core::{ListSessionsOptions, SessionLogStore};
use sessionlog_store::LogStore;
use std::time::Duration;

/// Run operator-provisioned DDL through the store's own pool
pub async fn provision(store: &LogStore, ddl: &str) {
    sqlx::query(ddl)
        .execute(store.pool())
        .await
        .expect("Failed to provision log table");
}

/// Log two entries to session 1, wait, then one to session 2, and check the
/// listing and the per-session read.
pub async fn assert_basic_scenario(store: &LogStore) {
    store
        .log(1.into(), "What's up?", None)
        .await
        .expect("first log failed");
    store
        .log(1.into(), "Some data", Some(json!({"hey": "there"})))
        .await
        .expect("second log failed");

    tokio::time::sleep(Duration::from_millis(50)).await;

    store
        .log(2.into(), "Yo yo ma", None)
        .await
        .expect("third log failed");

    let sessions = store
        .list_sessions(&ListSessionsOptions::default())
        .await
        .expect("list_sessions failed");
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].id.as_str(), "2");
    assert_eq!(sessions[1].id.as_str(), "1");
    assert!(sessions[0].date > sessions[1].date);

    let entries = store.session_log(1.into()).await.expect("session_log failed");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "What's up?");
    assert_eq!(entries[0].data, None);
    assert_eq!(entries[1].text, "Some data");
    assert_eq!(entries[1].data.as_ref().unwrap()["hey"], "there");
    assert!(entries[0].date <= entries[1].date);
}

/// Payloads of every JSON shape come back equal
pub async fn assert_payload_round_trip(store: &LogStore) {
    let payload = json!({
        "user": {"name": "ada", "roles": ["admin", "ops"]},
        "count": 3,
        "ratio": 0.25,
        "flag": false,
        "missing": null,
        "dotted.key": "kept as is"
    });

    store
        .log("payloads".into(), "with payload", Some(payload.clone()))
        .await
        .expect("log failed");

    let entries = store.session_log("payloads".into()).await.expect("read failed");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].data, Some(payload));
}
