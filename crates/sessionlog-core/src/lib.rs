//! SessionLog Core Types and Traits
//!
//! This crate provides the pieces shared by every SessionLog store:
//! - Error taxonomy (`Config`, `Connection`, `Write`, `Read`)
//! - Store configuration and config-file loading
//! - Backend kinds and their SQL dialect fragments
//! - The JSON payload codec
//! - Log entry / session types and the `SessionLogStore` trait

pub mod backend;
pub mod codec;
pub mod config;
pub mod error;
pub mod log_store;
pub mod types;

pub use backend::{Backend, Dialect};
pub use codec::JsonCodec;
pub use config::{LogStoreConfig, PoolConfig};
pub use error::{Error, Result};
pub use log_store::SessionLogStore;
pub use types::{
    ListSessionsOptions, LogEntry, SessionField, SessionId, SessionSummary, SortKey, SortOrder,
};
