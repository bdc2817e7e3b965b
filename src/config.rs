use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::connections::ConnectionConfig;
use crate::gate::{ActionGate, ActionPredicateRegistry, RegistryError};

/// Application configuration loaded from `~/.config/actiongate/config.toml`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Gate behaviour
    pub gate: GateConfig,
    /// Guard expressions overriding or extending the built-in action table
    pub actions: BTreeMap<String, String>,
    /// Saved connections shown in the explorer
    pub connections: Vec<ConnectionConfig>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Actions removed from the table; they always deny
    pub disabled: Vec<String>,
    /// Log denials at info level instead of debug
    pub log_denials: bool,
}

impl AppConfig {
    /// Built-in table with this config's overrides and removals applied.
    pub fn build_registry(&self) -> Result<ActionPredicateRegistry, RegistryError> {
        let mut registry = ActionPredicateRegistry::builtin();
        registry.apply_overrides(
            self.actions
                .iter()
                .map(|(name, expr)| (name.as_str(), expr.as_str())),
            self.gate.disabled.iter().map(String::as_str),
        )?;
        Ok(registry)
    }

    pub fn build_gate(&self) -> Result<ActionGate, RegistryError> {
        Ok(ActionGate::new(self.build_registry()?).with_denial_logging(self.gate.log_denials))
    }
}

/// Get the configuration directory path.
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "actiongate").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the config file path.
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location, or return defaults.
pub fn load_config() -> AppConfig {
    match config_file_path() {
        Some(path) if path.exists() => load_config_from(&path).unwrap_or_else(|e| {
            log::warn!("ignoring config file: {e:#}");
            AppConfig::default()
        }),
        _ => AppConfig::default(),
    }
}

/// Load configuration from an explicit path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("invalid config file {}", path.display()))
}

/// Save the configuration to `path`, creating parent directories.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

/// Save the configuration to the default location.
pub fn save_config(config: &AppConfig) -> Result<()> {
    if let Some(path) = config_file_path() {
        save_config_to(config, &path)?;
    }
    Ok(())
}
