//! # Configuration Loader / 配置加载器
//!
//! Reads the TOML file into the [`AppConfig`] DTO. No validation happens
//! here: whatever the file says is taken as a fact. Keys the file leaves out
//! keep their system default, so a partial file never switches a feature off
//! by omission.

use std::path::{Path, PathBuf};

use ab_core::app_dirs::AppDirs;
use ab_core::config::AppConfig;
use anyhow::Context;
use tracing::debug;

pub const DEFAULT_APP_NAME: &str = "appbridge";

/// Load configuration from a TOML file, layered over [`system_defaults`]
/// 从 TOML 文件加载配置
///
/// # Errors / 错误
///
/// Returns error if the file cannot be read or is not valid TOML.
pub fn load_config(config_path: PathBuf) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    system_defaults().merge_toml(&toml_value)
}

/// Configuration used for every key no config file sets.
pub fn system_defaults() -> AppConfig {
    AppConfig::with_system_defaults(DEFAULT_APP_NAME, env!("CARGO_PKG_VERSION"))
}

/// Pick the configuration for this launch.
///
/// An explicit path must exist. Otherwise `config.toml` in the data root is
/// used when present, and system defaults when not.
pub fn resolve_config(explicit: Option<&Path>, app_dirs: &AppDirs) -> anyhow::Result<AppConfig> {
    if let Some(path) = explicit {
        return load_config(path.to_path_buf());
    }

    let default_path = app_dirs.config_file();
    if default_path.exists() {
        debug!(path = %default_path.display(), "Loading config file");
        return load_config(default_path);
    }

    Ok(system_defaults())
}
