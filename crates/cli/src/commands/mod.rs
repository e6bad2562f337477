//! Subcommand implementations.

pub mod calc;
pub mod chat;
pub mod history;
pub mod onboard;
pub mod subjects;

use anyhow::Context;
use nova_config::AppConfig;
use nova_memory::JsonFileStore;
use std::path::{Path, PathBuf};

/// Load config from `--config`, `NOVA_CONFIG`, or the default location.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    };
    config.context("Failed to load config")
}

/// Where `onboard` writes and `load_config` reads by default.
pub fn config_path(path: Option<&Path>) -> PathBuf {
    match path {
        Some(path) => path.to_path_buf(),
        None => std::env::var("NOVA_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| AppConfig::config_dir().join("config.toml")),
    }
}

pub fn open_store(config: &AppConfig) -> anyhow::Result<JsonFileStore> {
    JsonFileStore::new(&config.history.dir, config.history.max_length).with_context(|| {
        format!(
            "Failed to open history directory {}",
            config.history.dir.display()
        )
    })
}
