//! Relational session log storage
//!
//! This crate implements the `SessionLogStore` trait on top of sqlx's `Any`
//! driver, so one store type serves every supported backend.
//!
//! # Features
//! - Postgres, MySQL and SQLite (file or in-memory)
//! - Server-assigned timestamps with sub-second resolution
//! - JSON payloads from any `serde::Serialize` value
//! - Session listing ordered by each session's first entry
//!
//! The log table is provisioned by the operator; this crate never creates or
//! alters it.
//!
//! # Example
//! ```no_run
//! # use sessionlog_core::{LogStoreConfig, Backend, SessionLogStore};
//! # use sessionlog_store::LogStore;
//! # async fn example() -> sessionlog_core::Result<()> {
//! let config = LogStoreConfig::new(Backend::Postgres)
//!     .with_database("app")
//!     .with_credentials("app", "secret");
//! let store = LogStore::connect(config).await?;
//!
//! store.log(1.into(), "What's up?", None).await?;
//! let entries = store.session_log(1.into()).await?;
//! # Ok(())
//! # }
//! ```

mod statements;
mod sql_log_store;

pub use sql_log_store::LogStore;
