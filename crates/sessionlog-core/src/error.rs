//! Error types for SessionLog

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Connection errors
    #[error("Connection error: {0}")]
    Connection(String),

    // Insert/delete failures
    #[error("Write error: {0}")]
    Write(String),

    // Select or payload decoding failures
    #[error("Read error: {0}")]
    Read(String),
}

pub type Result<T> = std::result::Result<T, Error>;
