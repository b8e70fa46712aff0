//! SessionLog CLI
//!
//! Command-line front end for writing and inspecting session logs

mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sessionlog_core::{ListSessionsOptions, SessionLogStore, SortKey};
use sessionlog_store::LogStore;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sessionlog")]
#[command(about = "SessionLog - session-oriented logging on a relational database", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "SESSIONLOG_CONFIG",
        global = true
    )]
    config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `sessionlog_store=debug`; overrides RUST_LOG
    #[arg(long, value_name = "FILTER", env = "SESSIONLOG_LOG_LEVEL", global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Append an entry to a session
    Log {
        session_id: String,
        text: String,

        /// Structured payload as JSON
        #[arg(long, value_name = "JSON")]
        data: Option<String>,
    },
    /// Print every entry of a session, oldest first
    Show {
        session_id: String,

        /// Print entries as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// List sessions by the date of their first entry
    Sessions {
        /// Number of sessions to skip
        #[arg(long, default_value = "0")]
        skip: u64,

        /// Maximum number of sessions to print
        #[arg(long, default_value = "10", conflicts_with = "all")]
        limit: u64,

        /// Print every session
        #[arg(long)]
        all: bool,

        /// Sort key: date, -date, id or -id (repeatable)
        #[arg(long = "sort", value_name = "KEY", allow_hyphen_values = true)]
        sort: Vec<SortKey>,
    },
    /// Delete every entry of a session
    Purge { session_id: String },
}

const DEFAULT_LOG_FILTER: &str = "warn";

/// Filter directive: an explicit `--log-level` wins, then RUST_LOG
fn filter_directive(log_level: Option<&str>, rust_log: Option<String>) -> String {
    log_level
        .map(str::to_string)
        .or(rust_log)
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

fn init_tracing(log_level: Option<&str>) {
    let directive = filter_directive(log_level, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    let filter =
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let config = config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    debug!(backend = %config.backend, table = %config.table, "Loaded configuration");

    let store = LogStore::connect(config).await?;
    let result = run(&store, cli.command).await;
    store.close().await;
    result
}

async fn run(store: &LogStore, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Log {
            session_id,
            text,
            data,
        } => {
            let data: Option<serde_json::Value> = data
                .map(|raw| serde_json::from_str(&raw))
                .transpose()
                .context("--data is not valid JSON")?;
            store.log(session_id.into(), &text, data).await?;
        }
        Commands::Show { session_id, json } => {
            for entry in store.session_log(session_id.into()).await? {
                if json {
                    println!("{}", serde_json::to_string(&entry)?);
                } else {
                    match &entry.data {
                        Some(data) => println!("{}  {}  {}", entry.date.to_rfc3339(), entry.text, data),
                        None => println!("{}  {}", entry.date.to_rfc3339(), entry.text),
                    }
                }
            }
        }
        Commands::Sessions {
            skip,
            limit,
            all,
            sort,
        } => {
            let mut options = ListSessionsOptions::new().with_skip(skip).with_sort(sort);
            options = if all {
                options.unlimited()
            } else {
                options.with_limit(limit)
            };

            for session in store.list_sessions(&options).await? {
                println!("{}\t{}", session.id, session.date.to_rfc3339());
            }
        }
        Commands::Purge { session_id } => {
            let removed = store.remove_session_logs(session_id.into()).await?;
            println!("Removed {} entries", removed);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sessionlog_core::SessionField;

    #[test]
    fn test_parse_sessions_command() {
        let cli = Cli::try_parse_from([
            "sessionlog", "sessions", "--skip", "5", "--sort", "-date", "--sort", "id",
        ])
        .unwrap();

        match cli.command {
            Commands::Sessions {
                skip,
                limit,
                all,
                sort,
            } => {
                assert_eq!(skip, 5);
                assert_eq!(limit, 10);
                assert!(!all);
                assert_eq!(
                    sort,
                    vec![
                        SortKey::descending(SessionField::Date),
                        SortKey::ascending(SessionField::Id)
                    ]
                );
            }
            _ => panic!("expected sessions command"),
        }
    }

    #[test]
    fn test_limit_conflicts_with_all() {
        let result = Cli::try_parse_from(["sessionlog", "sessions", "--all", "--limit", "3"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_sort_key_rejected() {
        let result = Cli::try_parse_from(["sessionlog", "sessions", "--sort", "text"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_level_flag_overrides_rust_log() {
        let cli = Cli::try_parse_from(["sessionlog", "--log-level", "debug", "purge", "1"]).unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(
            filter_directive(cli.log_level.as_deref(), Some("error".to_string())),
            "debug"
        );

        assert_eq!(filter_directive(None, Some("info".to_string())), "info");
        assert_eq!(filter_directive(None, None), "warn");
    }

    #[test]
    fn test_parse_log_command_with_data() {
        let cli = Cli::try_parse_from([
            "sessionlog", "--config", "logs.yaml", "log", "1", "Some data", "--data", r#"{"hey":"there"}"#,
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("logs.yaml")));
        match cli.command {
            Commands::Log {
                session_id,
                text,
                data,
            } => {
                assert_eq!(session_id, "1");
                assert_eq!(text, "Some data");
                assert_eq!(data.as_deref(), Some(r#"{"hey":"there"}"#));
            }
            _ => panic!("expected log command"),
        }
    }
}
