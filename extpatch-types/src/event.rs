use crate::file::FileKind;
use serde::{Deserialize, Serialize};

/// Severity of a run event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warn,
}

/// A structured record of one step taken (or skipped) during a run.
///
/// Components emit these instead of printing, so callers can log, collect
/// or assert on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PatchEvent {
    TargetExists {
        name: String,
        key: String,
    },
    TargetCreated {
        name: String,
        key: String,
        phases: Vec<String>,
    },
    HostEmbedAdded {
        host: String,
        product: String,
    },
    BuildSettingPatched {
        configuration: String,
        key: String,
        setting: String,
        value: String,
    },
    BuildSettingsUnmatched {
        product_name: String,
    },
    GroupExists {
        name: String,
        key: String,
    },
    GroupCreated {
        name: String,
        key: String,
        parent: String,
    },
    FileAttached {
        name: String,
        kind: FileKind,
        group: String,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        phase: Option<String>,
    },
    FileAlreadyAttached {
        name: String,
        kind: FileKind,
    },
    FileCopied {
        path: String,
    },
    TokensReplaced {
        path: String,
        replacements: u64,
    },
    ManifestWritten {
        path: String,
    },
    ManifestUnchanged {
        path: String,
    },
}

impl PatchEvent {
    pub fn severity(&self) -> Severity {
        match self {
            PatchEvent::BuildSettingsUnmatched { .. } => Severity::Warn,
            _ => Severity::Info,
        }
    }

    /// True for events that record a skipped, already-satisfied step.
    pub fn is_noop(&self) -> bool {
        matches!(
            self,
            PatchEvent::TargetExists { .. }
                | PatchEvent::GroupExists { .. }
                | PatchEvent::FileAlreadyAttached { .. }
                | PatchEvent::BuildSettingsUnmatched { .. }
                | PatchEvent::ManifestUnchanged { .. }
        )
    }

    /// One-line human description.
    pub fn message(&self) -> String {
        match self {
            PatchEvent::TargetExists { name, .. } => format!("{name} target already exists"),
            PatchEvent::TargetCreated { name, phases, .. } => {
                format!("created target {name} ({} build phases)", phases.len())
            }
            PatchEvent::HostEmbedAdded { host, product } => {
                format!("embedding {product} into {host}")
            }
            PatchEvent::BuildSettingPatched {
                configuration,
                setting,
                value,
                ..
            } => format!("{configuration}: set {setting} to {value}"),
            PatchEvent::BuildSettingsUnmatched { product_name } => {
                format!("no build configuration has PRODUCT_NAME {product_name}")
            }
            PatchEvent::GroupExists { name, .. } => format!("{name} group already exists"),
            PatchEvent::GroupCreated { name, parent, .. } => {
                format!("created group {name} under {parent}")
            }
            PatchEvent::FileAttached {
                name, group, phase, ..
            } => match phase {
                Some(phase) => format!("added {name} to {group} and {phase}"),
                None => format!("added {name} to {group}"),
            },
            PatchEvent::FileAlreadyAttached { name, .. } => {
                format!("{name} already attached")
            }
            PatchEvent::FileCopied { path } => format!("copied {path}"),
            PatchEvent::TokensReplaced { path, replacements } => {
                format!("updated {path} ({replacements} replacements)")
            }
            PatchEvent::ManifestWritten { path } => format!("wrote {path}"),
            PatchEvent::ManifestUnchanged { path } => format!("{path} unchanged"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn events_are_internally_tagged() {
        let ev = PatchEvent::GroupCreated {
            name: "ShareExtension".to_string(),
            key: "ABC".to_string(),
            parent: "CustomTemplate".to_string(),
        };
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "event": "group_created",
                "name": "ShareExtension",
                "key": "ABC",
                "parent": "CustomTemplate",
            })
        );
    }

    #[test]
    fn file_attached_omits_missing_phase() {
        let ev = PatchEvent::FileAttached {
            name: "Info.plist".to_string(),
            kind: FileKind::ManifestFragment,
            group: "ShareExtension".to_string(),
            phase: None,
        };
        let v = serde_json::to_value(&ev).unwrap();
        assert!(v.get("phase").is_none());
        assert_eq!(ev.message(), "added Info.plist to ShareExtension");
    }

    #[test]
    fn unmatched_settings_warn() {
        let ev = PatchEvent::BuildSettingsUnmatched {
            product_name: "ShareExt".to_string(),
        };
        assert_eq!(ev.severity(), Severity::Warn);
        assert!(ev.is_noop());
    }
}
