//! Configuration loading for the sessionlog CLI

use sessionlog_core::{Error, LogStoreConfig, Result};
use std::path::Path;

/// Load the store configuration: file (if any), then environment overrides
pub fn load(path: Option<&Path>) -> Result<LogStoreConfig> {
    let mut config = match path {
        Some(path) => LogStoreConfig::from_file(path)?,
        None => LogStoreConfig::default(),
    };
    merge_env(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Merge `SESSIONLOG_*` environment variables into config (env vars take precedence)
pub fn merge_env(config: &mut LogStoreConfig) -> Result<()> {
    merge_vars(config, |key| std::env::var(key).ok())
}

fn merge_vars(config: &mut LogStoreConfig, var: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(val) = var("SESSIONLOG_BACKEND") {
        config.backend = val.parse()?;
    }

    if let Some(val) = var("SESSIONLOG_HOST") {
        config.host = val;
    }

    if let Some(val) = var("SESSIONLOG_PORT") {
        let port = val
            .parse::<u16>()
            .map_err(|_| Error::Config(format!("Invalid SESSIONLOG_PORT '{}'", val)))?;
        config.port = Some(port);
    }

    if let Some(val) = var("SESSIONLOG_DATABASE") {
        config.database = val;
    }

    if let Some(val) = var("SESSIONLOG_TABLE") {
        config.table = val;
    }

    if let Some(val) = var("SESSIONLOG_USERNAME") {
        config.username = Some(val);
    }

    if let Some(val) = var("SESSIONLOG_PASSWORD") {
        config.password = Some(val);
    }

    if let Some(val) = var("SESSIONLOG_STRICT") {
        config.strict = val
            .parse::<bool>()
            .map_err(|_| Error::Config(format!("Invalid SESSIONLOG_STRICT '{}'", val)))?;
    }

    Ok(())
}
