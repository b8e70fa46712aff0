//! Log entry and session types

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::codec::JsonCodec;
use crate::{Error, Result};

/// Session identifier
///
/// Always held as text. Numeric ids are converted through their decimal
/// form, so `SessionId::from(1)` and `SessionId::from("1")` name the same
/// session on every backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&String> for SessionId {
    fn from(id: &String) -> Self {
        Self(id.clone())
    }
}

impl From<&SessionId> for SessionId {
    fn from(id: &SessionId) -> Self {
        id.clone()
    }
}

macro_rules! session_id_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for SessionId {
                fn from(id: $ty) -> Self {
                    Self(id.to_string())
                }
            }
        )*
    };
}

session_id_from_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// One stored log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub session_id: SessionId,
    /// Server-assigned insert time
    pub date: DateTime<Utc>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl LogEntry {
    /// Decode the payload into a caller type, `None` when the entry has none
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.data
            .as_ref()
            .map(|value| JsonCodec::new().convert(value))
            .transpose()
    }
}

/// A session as seen by listings: its id and the date of its first entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub date: DateTime<Utc>,
}

/// Column a session listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionField {
    Id,
    /// Earliest entry time of the session
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: SessionField,
    pub order: SortOrder,
}

impl SortKey {
    pub fn new(field: SessionField, order: SortOrder) -> Self {
        Self { field, order }
    }

    pub fn ascending(field: SessionField) -> Self {
        Self::new(field, SortOrder::Ascending)
    }

    pub fn descending(field: SessionField) -> Self {
        Self::new(field, SortOrder::Descending)
    }
}

/// Parses `date`, `+date`, `-date`, `id`, `+id`, `-id`; a leading `-` means
/// descending.
impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (order, name) = match s.strip_prefix('-') {
            Some(rest) => (SortOrder::Descending, rest),
            None => (SortOrder::Ascending, s.strip_prefix('+').unwrap_or(s)),
        };

        let field = match name.to_ascii_lowercase().as_str() {
            "id" | "session_id" => SessionField::Id,
            "date" => SessionField::Date,
            _ => {
                return Err(Error::Config(format!(
                    "Unknown sort key '{}' (expected id or date)",
                    s
                )));
            }
        };

        Ok(Self { field, order })
    }
}

/// Window and ordering for `list_sessions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSessionsOptions {
    /// Sessions to skip after ordering
    #[serde(default)]
    pub skip: u64,

    /// Maximum sessions returned, `None` for no limit
    #[serde(default = "default_limit")]
    pub limit: Option<u64>,

    /// Sort keys applied in order; empty means newest first
    #[serde(default = "default_sort")]
    pub sort: Vec<SortKey>,
}

impl Default for ListSessionsOptions {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
            sort: default_sort(),
        }
    }
}

impl ListSessionsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn unlimited(mut self) -> Self {
        self.limit = None;
        self
    }

    /// Replace the ordering
    pub fn with_sort(mut self, sort: Vec<SortKey>) -> Self {
        self.sort = sort;
        self
    }

    /// Sort keys to use, falling back to newest first when none are set
    pub fn effective_sort(&self) -> Vec<SortKey> {
        if self.sort.is_empty() {
            default_sort()
        } else {
            self.sort.clone()
        }
    }
}

fn default_limit() -> Option<u64> {
    Some(10)
}

fn default_sort() -> Vec<SortKey> {
    vec![SortKey::descending(SessionField::Date)]
}
