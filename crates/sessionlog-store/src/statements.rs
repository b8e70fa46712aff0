//! SQL text for the log table, rendered once per store for its dialect

use chrono::{DateTime, NaiveDateTime, Utc};
use sessionlog_core::{Dialect, Error, ListSessionsOptions, Result, SessionField, SortOrder};

/// Format produced by `Dialect::date_text`
const DATE_TEXT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

#[derive(Debug, Clone)]
pub(crate) struct Statements {
    dialect: Dialect,
    table: String,
    pub insert: String,
    pub select_session: String,
    pub delete_session: String,
}

impl Statements {
    pub fn new(dialect: Dialect, table: &str) -> Self {
        let insert = format!(
            "INSERT INTO {table} (session_id, date, text, data) VALUES ({}, {}, {}, {})",
            dialect.placeholder(1),
            dialect.now(),
            dialect.placeholder(2),
            dialect.payload_param(3),
        );

        let entry_order = match dialect.entry_tiebreaker() {
            Some(tiebreaker) => format!("date ASC, {}", tiebreaker),
            None => "date ASC".to_string(),
        };

        // Aliases must not shadow `date`, or ORDER BY would sort the text form
        let select_session = format!(
            "SELECT {} AS logged_at, text, {} AS payload FROM {table} WHERE session_id = {} ORDER BY {}",
            dialect.date_text("date"),
            dialect.payload_text("data"),
            dialect.placeholder(1),
            entry_order,
        );

        let delete_session = format!(
            "DELETE FROM {table} WHERE session_id = {}",
            dialect.placeholder(1)
        );

        Self {
            dialect,
            table: table.to_string(),
            insert,
            select_session,
            delete_session,
        }
    }

    /// Session listing for `options`
    ///
    /// Bind order: the limit (only when one is set), then the skip count.
    pub fn list_sessions(&self, options: &ListSessionsOptions) -> String {
        let order_by = options
            .effective_sort()
            .iter()
            .map(|key| {
                let column = match key.field {
                    SessionField::Id => "session_id",
                    SessionField::Date => "MIN(date)",
                };
                let direction = match key.order {
                    SortOrder::Ascending => "ASC",
                    SortOrder::Descending => "DESC",
                };
                format!("{} {}", column, direction)
            })
            .collect::<Vec<_>>()
            .join(", ");

        let (limit, offset) = match options.limit {
            Some(_) => (self.dialect.placeholder(1), self.dialect.placeholder(2)),
            None => (
                self.dialect.unbounded_limit().to_string(),
                self.dialect.placeholder(1),
            ),
        };

        format!(
            "SELECT session_id, {} AS first_logged_at FROM {} GROUP BY session_id ORDER BY {} LIMIT {} OFFSET {}",
            self.dialect.date_text("MIN(date)"),
            self.table,
            order_by,
            limit,
            offset,
        )
    }
}

/// Parse a timestamp rendered by `Dialect::date_text`
pub(crate) fn parse_date_text(text: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, DATE_TEXT_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| Error::Read(format!("Invalid log timestamp '{}': {}", text, e)))
}

/// Bind value for LIMIT/OFFSET; saturates instead of wrapping
pub(crate) fn bind_count(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}
