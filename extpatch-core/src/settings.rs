//! Clap-free settings for the extension pipelines.

use camino::Utf8PathBuf;
use std::collections::BTreeMap;

pub const DEFAULT_TARGET_NAME: &str = "ShareExt";
pub const DEFAULT_GROUP_NAME: &str = "ShareExtension";
pub const DEFAULT_FOLDER_NAME: &str = "ShareExtension";
pub const DEFAULT_PARENT_GROUP: &str = "CustomTemplate";
pub const DEFAULT_BUNDLE_SUFFIX: &str = ".shareextension";
pub const DEFAULT_PLUGIN_ID: &str = "cordova-plugin-openwith-cxm";

/// Settings shared by `add-target`, `copy-extension` and `install`.
#[derive(Debug, Clone)]
pub struct ExtensionSettings {
    /// Cordova project root (holds config.xml, platforms/, plugins/).
    pub project_root: Utf8PathBuf,
    /// iOS platform folder; `<project_root>/platforms/ios` when unset.
    pub ios_dir: Option<Utf8PathBuf>,
    pub dry_run: bool,

    // Extension
    pub target_name: String,
    pub group_name: String,
    pub folder_name: String,
    pub parent_group: String,
    pub bundle_suffix: String,
    pub plugin_id: String,

    // Tokens
    pub url_scheme: String,
    pub uniform_type_identifier: String,
    pub extra_tokens: BTreeMap<String, String>,

    // Backups
    pub backup_enabled: bool,
    pub backup_suffix: String,
}

impl Default for ExtensionSettings {
    fn default() -> Self {
        Self {
            project_root: Utf8PathBuf::from("."),
            ios_dir: None,
            dry_run: false,
            target_name: DEFAULT_TARGET_NAME.to_string(),
            group_name: DEFAULT_GROUP_NAME.to_string(),
            folder_name: DEFAULT_FOLDER_NAME.to_string(),
            parent_group: DEFAULT_PARENT_GROUP.to_string(),
            bundle_suffix: DEFAULT_BUNDLE_SUFFIX.to_string(),
            plugin_id: DEFAULT_PLUGIN_ID.to_string(),
            url_scheme: extpatch_edit::DEFAULT_URL_SCHEME.to_string(),
            uniform_type_identifier: extpatch_edit::DEFAULT_UNIFORM_TYPE_IDENTIFIER.to_string(),
            extra_tokens: BTreeMap::new(),
            backup_enabled: false,
            backup_suffix: ".extpatch.bak".to_string(),
        }
    }
}

impl ExtensionSettings {
    pub fn ios_dir(&self) -> Utf8PathBuf {
        self.ios_dir
            .clone()
            .unwrap_or_else(|| self.project_root.join("platforms").join("ios"))
    }

    pub fn config_xml(&self) -> Utf8PathBuf {
        self.project_root.join("config.xml")
    }

    /// Where the plugin ships its extension folder.
    pub fn plugin_extension_dir(&self) -> Utf8PathBuf {
        self.project_root
            .join("plugins")
            .join(&self.plugin_id)
            .join("src")
            .join("ios")
            .join(&self.folder_name)
    }

    /// Where the extension folder lives once copied into the platform.
    pub fn extension_dir(&self) -> Utf8PathBuf {
        self.ios_dir().join(&self.folder_name)
    }
}
