//! Session log store trait
//!
//! The `SessionLogStore` trait is the contract every backend implementation
//! fulfils. Each operation is a single auto-committed statement.

use async_trait::async_trait;
use serde_json::Value;

use crate::{ListSessionsOptions, LogEntry, Result, SessionId, SessionSummary};

/// Session log store trait
///
/// Implementations:
/// - `LogStore`: sqlx-backed store for Postgres, MySQL and SQLite
///
/// # Example
/// ```no_run
/// # use sessionlog_core::{ListSessionsOptions, SessionLogStore};
/// # async fn example(store: &dyn SessionLogStore) -> sessionlog_core::Result<()> {
/// store.log(1.into(), "What's up?", None).await?;
/// store
///     .log(1.into(), "Some data", Some(serde_json::json!({"hey": "there"})))
///     .await?;
///
/// let entries = store.session_log("1".into()).await?;
/// let recent = store.list_sessions(&ListSessionsOptions::default()).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait SessionLogStore: Send + Sync {
    /// Append one entry to a session
    ///
    /// The entry's timestamp is assigned by the database server.
    ///
    /// # Errors
    /// - `Error::Write` on constraint violation, lost connectivity or a
    ///   payload that cannot be serialized
    async fn log(&self, session_id: SessionId, text: &str, data: Option<Value>) -> Result<()>;

    /// All entries of a session, oldest first
    ///
    /// Unknown sessions yield an empty list.
    ///
    /// # Errors
    /// - `Error::Read` on lost connectivity or a stored payload that cannot
    ///   be decoded
    async fn session_log(&self, session_id: SessionId) -> Result<Vec<LogEntry>>;

    /// Sessions with the date of their first entry, ordered and windowed by
    /// `options`
    ///
    /// # Errors
    /// - `Error::Read` on lost connectivity
    async fn list_sessions(&self, options: &ListSessionsOptions) -> Result<Vec<SessionSummary>>;

    /// Delete every entry of a session, returning the number removed
    ///
    /// # Errors
    /// - `Error::Write` on lost connectivity
    async fn remove_session_logs(&self, session_id: SessionId) -> Result<u64>;
}
