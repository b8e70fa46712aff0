//! Log store configuration
//!
//! Configuration is plain data: the embedding application builds it in code
//! or loads it from a YAML/TOML file, then hands it to the store.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::backend::Backend;
use crate::{Error, Result};

/// Name of the in-memory SQLite database
pub const SQLITE_MEMORY: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogStoreConfig {
    #[serde(default)]
    pub backend: Backend,

    #[serde(default = "default_host")]
    pub host: String,

    /// Falls back to the backend's default port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Database name; for SQLite, the database file path or `:memory:`
    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_table")]
    pub table: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Strict server-side write checking and durable acknowledgement
    #[serde(default = "default_true")]
    pub strict: bool,

    #[serde(default)]
    pub pool: PoolConfig,
}

/// Settings for the driver's connection pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

impl PoolConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

impl Default for LogStoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            host: default_host(),
            port: None,
            database: default_database(),
            table: default_table(),
            username: None,
            password: None,
            strict: true,
            pool: PoolConfig::default(),
        }
    }
}

impl LogStoreConfig {
    /// Create a configuration for `backend` with default connection settings
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    /// SQLite database at `path` (or `:memory:`)
    pub fn sqlite(path: impl AsRef<Path>) -> Self {
        Self::new(Backend::Sqlite).with_database(path.as_ref().to_string_lossy())
    }

    /// Load configuration from a YAML or TOML file
    ///
    /// The format is picked by extension: `.toml` is TOML, anything else YAML.
    ///
    /// # Errors
    /// - `Error::Config` if the file cannot be read or parsed
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Invalid TOML in {}: {}", path.display(), e))
            })?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents).map_err(|e| {
                Error::Config(format!("Invalid YAML in {}: {}", path.display(), e))
            })?
        };

        Ok(config)
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.pool.max_connections = max_connections;
        self
    }

    /// Set the pool acquire timeout, rounded up to whole seconds
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.pool.acquire_timeout_secs = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
        self
    }

    /// Port actually used: the configured one or the backend default
    pub fn effective_port(&self) -> Option<u16> {
        self.port.or_else(|| self.backend.default_port())
    }

    pub fn is_in_memory(&self) -> bool {
        self.backend == Backend::Sqlite && self.database == SQLITE_MEMORY
    }

    /// Check the settings that would otherwise surface as confusing SQL errors
    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(Error::Config("Database name must not be empty".to_string()));
        }

        if self.backend != Backend::Sqlite && self.host.trim().is_empty() {
            return Err(Error::Config("Host must not be empty".to_string()));
        }

        // The path goes into a URL unescaped, where these would be misread
        if self.backend == Backend::Sqlite
            && !self.is_in_memory()
            && self.database.contains(['?', '#', '%'])
        {
            return Err(Error::Config(format!(
                "SQLite path '{}' must not contain '?', '#' or '%'",
                self.database
            )));
        }

        validate_table_name(&self.table)?;

        if self.pool.max_connections == 0 {
            return Err(Error::Config(
                "pool.max_connections must be at least 1".to_string(),
            ));
        }

        if self.pool.acquire_timeout_secs == 0 {
            return Err(Error::Config(
                "pool.acquire_timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the backend connection string
    ///
    /// Credentials are percent-encoded. SQLite files are created if missing;
    /// the log table itself is never created.
    pub fn connection_url(&self) -> Result<String> {
        self.validate()?;

        if self.backend == Backend::Sqlite {
            if self.is_in_memory() {
                return Ok("sqlite::memory:".to_string());
            }
            return Ok(format!("sqlite://{}?mode=rwc", self.database));
        }

        let mut url = Url::parse(&format!("{}://placeholder", self.backend.as_str()))
            .map_err(|e| Error::Config(format!("Invalid connection URL: {}", e)))?;

        url.set_host(Some(&self.host))
            .map_err(|e| Error::Config(format!("Invalid host '{}': {}", self.host, e)))?;
        url.set_port(self.effective_port())
            .map_err(|_| Error::Config("Cannot set port on connection URL".to_string()))?;

        if let Some(username) = &self.username {
            url.set_username(username)
                .map_err(|_| Error::Config("Cannot set username on connection URL".to_string()))?;
        }
        if let Some(password) = &self.password {
            url.set_password(Some(password))
                .map_err(|_| Error::Config("Cannot set password on connection URL".to_string()))?;
        }

        url.set_path(&self.database);
        Ok(url.into())
    }
}

/// Table names are spliced into SQL, so only plain identifiers are allowed,
/// optionally qualified by one schema name.
fn validate_table_name(table: &str) -> Result<()> {
    let parts: Vec<&str> = table.split('.').collect();
    let valid = parts.len() <= 2
        && parts.iter().all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        });

    if valid {
        Ok(())
    } else {
        Err(Error::Config(format!("Invalid table name '{}'", table)))
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_database() -> String {
    "sessionlog".to_string()
}

fn default_table() -> String {
    "logs".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    5
}
