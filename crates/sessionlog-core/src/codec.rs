//! JSON codec for structured log payloads

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Error, Result};

/// Converts payloads to and from the text stored in the `data` column
///
/// Anything implementing `Serialize` can be stored, so types with a
/// hand-written `Serialize` impl control their own stored shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn new() -> Self {
        Self
    }

    /// Encode a payload for storage
    ///
    /// # Errors
    /// - `Error::Write` if the value cannot be represented as JSON
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        serde_json::to_string(value)
            .map_err(|e| Error::Write(format!("Failed to serialize log data: {}", e)))
    }

    /// Decode a stored payload
    ///
    /// # Errors
    /// - `Error::Read` if the stored text is not valid JSON
    pub fn decode(&self, text: &str) -> Result<Value> {
        serde_json::from_str(text)
            .map_err(|e| Error::Read(format!("Failed to deserialize log data: {}", e)))
    }

    /// Convert a decoded payload into a caller type
    pub fn convert<T: DeserializeOwned>(&self, value: &Value) -> Result<T> {
        T::deserialize(value)
            .map_err(|e| Error::Read(format!("Log data has unexpected shape: {}", e)))
    }
}
