//! Supported relational backends and their SQL dialects
//!
//! `Backend` is what configuration names; `Dialect` is the matching set of
//! SQL fragments the store splices into its statements. A store picks its
//! dialect once, at construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Relational backend a log store can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Backend {
    #[default]
    Postgres,
    MySql,
    Sqlite,
}

impl Backend {
    /// Canonical lowercase name, as accepted in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Postgres => "postgres",
            Backend::MySql => "mysql",
            Backend::Sqlite => "sqlite",
        }
    }

    /// Default TCP port, `None` for file-backed databases
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Backend::Postgres => Some(5432),
            Backend::MySql => Some(3306),
            Backend::Sqlite => None,
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Backend::Postgres => Dialect::Postgres,
            Backend::MySql => Dialect::MySql,
            Backend::Sqlite => Dialect::Sqlite,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Backend::Postgres),
            "mysql" | "mariadb" => Ok(Backend::MySql),
            "sqlite" | "sqlite3" => Ok(Backend::Sqlite),
            other => Err(Error::Config(format!(
                "Unsupported backend '{}' (expected postgres, mysql or sqlite)",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Backend {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// SQL fragments that differ between backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
}

impl Dialect {
    /// Bind parameter marker for the 1-based parameter `index`
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", index),
            Dialect::MySql | Dialect::Sqlite => "?".to_string(),
        }
    }

    /// Bind marker for a JSON payload parameter
    ///
    /// Postgres has no implicit cast from a text parameter to `json`/`jsonb`,
    /// so the marker is cast explicitly; `json` in turn assigns to TEXT, JSON
    /// and JSONB columns alike.
    pub fn payload_param(&self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("CAST(${} AS JSON)", index),
            Dialect::MySql | Dialect::Sqlite => self.placeholder(index),
        }
    }

    /// Server-side current time with sub-second resolution
    ///
    /// SQLite only reaches millisecond resolution; Postgres and MySQL give
    /// microseconds.
    pub fn now(&self) -> &'static str {
        match self {
            Dialect::Postgres => "CURRENT_TIMESTAMP",
            Dialect::MySql => "CURRENT_TIMESTAMP(6)",
            Dialect::Sqlite => "strftime('%Y-%m-%d %H:%M:%f', 'now')",
        }
    }

    /// Render a timestamp expression as `YYYY-MM-DDTHH:MM:SS.fff` text in UTC
    ///
    /// Postgres and MySQL rely on the session time zone being UTC, which
    /// `session_setup` arranges.
    pub fn date_text(&self, expr: &str) -> String {
        match self {
            Dialect::Postgres => format!(r#"to_char({}, 'YYYY-MM-DD"T"HH24:MI:SS.US')"#, expr),
            Dialect::MySql => format!("DATE_FORMAT({}, '%Y-%m-%dT%H:%i:%s.%f')", expr),
            Dialect::Sqlite => format!("strftime('%Y-%m-%dT%H:%M:%f', {})", expr),
        }
    }

    /// Read a payload column as text, whether it is declared TEXT or JSON
    pub fn payload_text(&self, column: &str) -> String {
        match self {
            Dialect::MySql => format!("CAST({} AS CHAR)", column),
            Dialect::Postgres | Dialect::Sqlite => format!("CAST({} AS TEXT)", column),
        }
    }

    /// Extra ORDER BY key keeping same-timestamp entries in insertion order
    ///
    /// SQLite timestamps only reach milliseconds, so rapid writes tie; its
    /// `rowid` grows with every insert.
    pub fn entry_tiebreaker(&self) -> Option<&'static str> {
        match self {
            Dialect::Sqlite => Some("rowid ASC"),
            Dialect::Postgres | Dialect::MySql => None,
        }
    }

    /// LIMIT operand meaning "no limit", for use together with OFFSET
    pub fn unbounded_limit(&self) -> &'static str {
        match self {
            Dialect::Postgres => "ALL",
            Dialect::MySql => "18446744073709551615",
            Dialect::Sqlite => "-1",
        }
    }

    /// Statements run on every new connection
    ///
    /// `strict` selects whether the server rejects marginal writes and how
    /// durably it acknowledges them.
    pub fn session_setup(&self, strict: bool) -> Vec<&'static str> {
        match (self, strict) {
            (Dialect::Postgres, true) => {
                vec!["SET TIME ZONE 'UTC'", "SET synchronous_commit = on"]
            }
            (Dialect::Postgres, false) => {
                vec!["SET TIME ZONE 'UTC'", "SET synchronous_commit = off"]
            }
            (Dialect::MySql, true) => vec![
                "SET time_zone = '+00:00'",
                "SET SESSION sql_mode = 'STRICT_ALL_TABLES,NO_ZERO_IN_DATE,NO_ZERO_DATE,ERROR_FOR_DIVISION_BY_ZERO,NO_ENGINE_SUBSTITUTION'",
            ],
            (Dialect::MySql, false) => vec![
                "SET time_zone = '+00:00'",
                "SET SESSION sql_mode = 'NO_ENGINE_SUBSTITUTION'",
            ],
            (Dialect::Sqlite, true) => vec!["PRAGMA synchronous = FULL"],
            (Dialect::Sqlite, false) => vec!["PRAGMA synchronous = OFF"],
        }
    }
}
