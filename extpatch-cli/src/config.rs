//! Configuration file loading for extpatch.
//!
//! Discovers and loads `extpatch.toml` from the Cordova project root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use extpatch_core::ExtensionSettings;
use fs_err as fs;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "extpatch.toml";

/// Top-level configuration from extpatch.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtpatchConfig {
    /// Names used for the target, group and folders.
    pub extension: ExtensionConfig,

    /// Template token values.
    pub tokens: TokensConfig,

    /// Backup settings.
    pub backups: BackupsConfig,
}

/// Extension section of the config. Unset keys keep the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    pub target_name: Option<String>,
    pub group_name: Option<String>,
    pub folder_name: Option<String>,
    pub parent_group: Option<String>,
    pub bundle_suffix: Option<String>,
    pub plugin_id: Option<String>,
}

/// Tokens section of the config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TokensConfig {
    pub url_scheme: Option<String>,
    pub uniform_type_identifier: Option<String>,

    /// Additional `__TOKEN__` → value pairs, applied after the standard ones.
    pub extra: BTreeMap<String, String>,
}

/// Backups section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackupsConfig {
    /// Whether to back up the manifest before writing it.
    pub enabled: bool,

    /// Suffix for backup files.
    pub suffix: String,
}

impl Default for BackupsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            suffix: ".extpatch.bak".to_string(),
        }
    }
}

/// Discover the extpatch.toml config file.
///
/// Returns `None` if no config file is found in the project root.
pub fn discover_config(project_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = project_root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse an extpatch.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<ExtpatchConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<ExtpatchConfig> {
    let config: ExtpatchConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the project root, or return default if not found.
pub fn load_or_default(project_root: &Utf8Path) -> anyhow::Result<ExtpatchConfig> {
    match discover_config(project_root) {
        Some(path) => load_config(&path),
        None => Ok(ExtpatchConfig::default()),
    }
}

/// What the command line says, before merging.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub project_root: Utf8PathBuf,
    pub ios_dir: Option<Utf8PathBuf>,
    pub dry_run: bool,
    pub target_name: Option<String>,
    pub plugin_id: Option<String>,
    pub tokens: BTreeMap<String, String>,
    pub backup: bool,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: ExtpatchConfig,
}

impl ConfigMerger {
    /// Create a new merger from a loaded config.
    pub fn new(config: ExtpatchConfig) -> Self {
        Self { config }
    }

    /// Merge with run command CLI arguments.
    ///
    /// CLI values win over the file, the file wins over the defaults. CLI
    /// tokens extend the file's extra tokens. `--backup` turns backups on
    /// even when the file leaves them off.
    pub fn merge_run_args(self, cli: RunOverrides) -> ExtensionSettings {
        let defaults = ExtensionSettings::default();
        let ext = self.config.extension;
        let tokens = self.config.tokens;

        let mut extra_tokens = tokens.extra;
        for (k, v) in cli.tokens {
            extra_tokens.insert(k, v);
        }

        ExtensionSettings {
            project_root: cli.project_root,
            ios_dir: cli.ios_dir,
            dry_run: cli.dry_run,
            target_name: cli
                .target_name
                .or(ext.target_name)
                .unwrap_or(defaults.target_name),
            group_name: ext.group_name.unwrap_or(defaults.group_name),
            folder_name: ext.folder_name.unwrap_or(defaults.folder_name),
            parent_group: ext.parent_group.unwrap_or(defaults.parent_group),
            bundle_suffix: ext.bundle_suffix.unwrap_or(defaults.bundle_suffix),
            plugin_id: cli
                .plugin_id
                .or(ext.plugin_id)
                .unwrap_or(defaults.plugin_id),
            url_scheme: tokens.url_scheme.unwrap_or(defaults.url_scheme),
            uniform_type_identifier: tokens
                .uniform_type_identifier
                .unwrap_or(defaults.uniform_type_identifier),
            extra_tokens,
            backup_enabled: cli.backup || self.config.backups.enabled,
            backup_suffix: self.config.backups.suffix,
        }
    }
}

/// Parse CLI tokens from KEY=VALUE strings. Values may be empty.
pub fn parse_cli_tokens(tokens: &[String]) -> anyhow::Result<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for entry in tokens {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("invalid token '{}': expected KEY=VALUE", entry))?;
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("invalid token '{}': missing key", entry);
        }
        out.insert(key.to_string(), value.to_string());
    }
    Ok(out)
}
