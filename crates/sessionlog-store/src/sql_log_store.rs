//! LogStore - SessionLogStore trait implementation over sqlx's `Any` driver
//!
//! Every operation is one auto-committed statement on a pooled connection.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, Executor, Row};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::statements::{Statements, bind_count, parse_date_text};
use sessionlog_core::{
    Backend, Error, JsonCodec, ListSessionsOptions, LogEntry, LogStoreConfig, Result, SessionId,
    SessionLogStore, SessionSummary,
};

/// Session log store backed by a relational database
///
/// Cloning is cheap; clones share the same connection pool.
#[derive(Clone)]
pub struct LogStore {
    /// Connection pool
    pool: Arc<AnyPool>,
    /// SQL rendered for the configured dialect and table
    statements: Arc<Statements>,
    codec: JsonCodec,
    config: Arc<LogStoreConfig>,
}

impl LogStore {
    /// Connect to the backend described by `config`
    ///
    /// The log table must already exist; it is not created here.
    ///
    /// # Errors
    /// - `Error::Config` if the configuration is invalid
    /// - `Error::Connection` if the backend cannot be reached or rejects
    ///   the credentials
    ///
    /// # Example
    /// ```no_run
    /// # use sessionlog_core::LogStoreConfig;
    /// # use sessionlog_store::LogStore;
    /// # async fn example() -> sessionlog_core::Result<()> {
    /// let store = LogStore::connect(LogStoreConfig::sqlite("/var/lib/app/logs.db")).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(config: LogStoreConfig) -> Result<Self> {
        let url = config.connection_url()?;
        sqlx::any::install_default_drivers();

        let dialect = config.backend.dialect();
        let strict = config.strict;

        let mut options = AnyPoolOptions::new()
            .max_connections(config.pool.max_connections)
            .acquire_timeout(config.pool.acquire_timeout())
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    for statement in dialect.session_setup(strict) {
                        conn.execute(statement).await?;
                    }
                    Ok(())
                })
            });

        // An in-memory database lives exactly as long as its one connection
        if config.is_in_memory() {
            options = options
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = options.connect(&url).await.map_err(|e| match e {
            sqlx::Error::Configuration(e) => {
                Error::Config(format!("Invalid connection settings: {}", e))
            }
            e => Error::Connection(format!(
                "Failed to connect to {} at {}: {}",
                config.backend,
                describe_target(&config),
                e
            )),
        })?;

        info!(
            backend = %config.backend,
            target = %describe_target(&config),
            table = %config.table,
            strict = config.strict,
            "Connected session log store"
        );

        Ok(Self::from_pool(pool, config))
    }

    /// Create from an existing pool (useful for testing)
    ///
    /// The pool's connections are used as they are; no session setup runs.
    pub fn from_pool(pool: AnyPool, config: LogStoreConfig) -> Self {
        let statements = Statements::new(config.backend.dialect(), &config.table);
        Self {
            pool: Arc::new(pool),
            statements: Arc::new(statements),
            codec: JsonCodec::new(),
            config: Arc::new(config),
        }
    }

    /// Append an entry whose payload is any serializable value
    ///
    /// The value is encoded through its own `Serialize` impl.
    ///
    /// # Errors
    /// - `Error::Write` if the payload cannot be serialized or the insert
    ///   fails
    pub async fn log_with_data<T: Serialize + ?Sized>(
        &self,
        session_id: impl Into<SessionId>,
        text: &str,
        data: &T,
    ) -> Result<()> {
        let payload = self.codec.encode(data)?;
        self.insert(session_id.into(), text, Some(payload)).await
    }

    /// Close every pooled connection
    ///
    /// Other clones of this store become unusable afterwards.
    pub async fn close(&self) {
        self.pool.close().await;
        info!(backend = %self.config.backend, "Closed session log store");
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn config(&self) -> &LogStoreConfig {
        &self.config
    }

    pub fn table(&self) -> &str {
        &self.config.table
    }

    async fn insert(&self, session_id: SessionId, text: &str, payload: Option<String>) -> Result<()> {
        debug!(
            session_id = %session_id,
            has_data = payload.is_some(),
            "Inserting log entry"
        );

        let result = sqlx::query(&self.statements.insert)
            .bind(session_id.as_str())
            .bind(text)
            .bind(payload)
            .execute(&*self.pool)
            .await
            .map_err(|e| {
                Error::Write(format!(
                    "Failed to insert log entry for session {}: {}",
                    session_id, e
                ))
            })?;

        if result.rows_affected() != 1 {
            return Err(Error::Write(format!(
                "Insert for session {} affected {} rows",
                session_id,
                result.rows_affected()
            )));
        }

        Ok(())
    }

    fn entry_from_row(&self, session_id: &SessionId, row: &AnyRow) -> Result<LogEntry> {
        let logged_at: String = row
            .try_get("logged_at")
            .map_err(|e| Error::Read(format!("Failed to read log date: {}", e)))?;
        let text: String = row
            .try_get("text")
            .map_err(|e| Error::Read(format!("Failed to read log text: {}", e)))?;
        let payload: Option<String> = row
            .try_get("payload")
            .map_err(|e| Error::Read(format!("Failed to read log data: {}", e)))?;

        let data = payload
            .as_deref()
            .map(|payload| self.codec.decode(payload))
            .transpose()
            .inspect_err(|e| {
                warn!(session_id = %session_id, error = %e, "Stored log data could not be decoded");
            })?;

        Ok(LogEntry {
            session_id: session_id.clone(),
            date: parse_date_text(&logged_at)?,
            text,
            data,
        })
    }
}

#[async_trait]
impl SessionLogStore for LogStore {
    async fn log(&self, session_id: SessionId, text: &str, data: Option<Value>) -> Result<()> {
        let payload = data
            .as_ref()
            .map(|value| self.codec.encode(value))
            .transpose()?;
        self.insert(session_id, text, payload).await
    }

    async fn session_log(&self, session_id: SessionId) -> Result<Vec<LogEntry>> {
        let rows = sqlx::query(&self.statements.select_session)
            .bind(session_id.as_str())
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| {
                Error::Read(format!(
                    "Failed to read logs for session {}: {}",
                    session_id, e
                ))
            })?;

        debug!(session_id = %session_id, entries = rows.len(), "Read session log");

        rows.iter()
            .map(|row| self.entry_from_row(&session_id, row))
            .collect()
    }

    async fn list_sessions(&self, options: &ListSessionsOptions) -> Result<Vec<SessionSummary>> {
        let sql = self.statements.list_sessions(options);

        let mut query = sqlx::query(&sql);
        if let Some(limit) = options.limit {
            query = query.bind(bind_count(limit));
        }
        query = query.bind(bind_count(options.skip));

        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| Error::Read(format!("Failed to list sessions: {}", e)))?;

        debug!(
            skip = options.skip,
            limit = ?options.limit,
            sessions = rows.len(),
            "Listed sessions"
        );

        rows.iter()
            .map(|row| {
                let id: String = row
                    .try_get("session_id")
                    .map_err(|e| Error::Read(format!("Failed to read session id: {}", e)))?;
                let first_logged_at: String = row
                    .try_get("first_logged_at")
                    .map_err(|e| Error::Read(format!("Failed to read session date: {}", e)))?;

                Ok(SessionSummary {
                    id: SessionId::from(id),
                    date: parse_date_text(&first_logged_at)?,
                })
            })
            .collect()
    }

    async fn remove_session_logs(&self, session_id: SessionId) -> Result<u64> {
        let result = sqlx::query(&self.statements.delete_session)
            .bind(session_id.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| {
                Error::Write(format!(
                    "Failed to remove logs for session {}: {}",
                    session_id, e
                ))
            })?;

        info!(
            session_id = %session_id,
            removed = result.rows_affected(),
            "Removed session logs"
        );

        Ok(result.rows_affected())
    }
}

/// Where the store points, without credentials
fn describe_target(config: &LogStoreConfig) -> String {
    match (config.backend, config.effective_port()) {
        (Backend::Sqlite, _) => config.database.clone(),
        (_, Some(port)) => format!("{}:{}/{}", config.host, port, config.database),
        (_, None) => format!("{}/{}", config.host, config.database),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_target_omits_credentials() {
        let config = LogStoreConfig::new(Backend::Postgres)
            .with_host("db.internal")
            .with_credentials("app", "s3cret");
        let target = describe_target(&config);

        assert_eq!(target, "db.internal:5432/sessionlog");
        assert!(!target.contains("s3cret"));
    }

    #[test]
    fn test_describe_target_sqlite_uses_path() {
        let config = LogStoreConfig::sqlite("/tmp/logs.db");
        assert_eq!(describe_target(&config), "/tmp/logs.db");
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_table() {
        let config = LogStoreConfig::sqlite(":memory:").with_table("logs; DROP TABLE logs");
        let result = LogStore::connect(config).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
