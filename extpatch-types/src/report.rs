use crate::event::{PatchEvent, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchReport {
    pub schema: String,
    pub tool: ReportToolInfo,
    pub run: ReportRunInfo,
    pub status: ReportStatus,
    pub summary: ReportSummary,

    /// True when nothing was written and the events describe planned changes.
    #[serde(default)]
    pub dry_run: bool,

    #[serde(default)]
    pub events: Vec<PatchEvent>,

    /// Manifest path relative to the Cordova project root, when one was patched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest_digest: Option<ManifestDigest>,
}

impl PatchReport {
    pub fn new(tool: ReportToolInfo, started_at: DateTime<Utc>, events: Vec<PatchEvent>) -> Self {
        let summary = ReportSummary::from_events(&events);
        let status = if summary.warnings > 0 {
            ReportStatus::Warn
        } else if summary.changes() == 0 {
            ReportStatus::Unchanged
        } else {
            ReportStatus::Pass
        };
        Self {
            schema: crate::schema::EXTPATCH_REPORT_V1.to_string(),
            tool,
            run: ReportRunInfo {
                started_at,
                ended_at: Some(Utc::now()),
            },
            status,
            summary,
            dry_run: false,
            events,
            manifest: None,
            manifest_digest: None,
        }
    }
}

/// Manifest content hashes around the run, hex sha256.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestDigest {
    pub before_sha256: String,
    pub after_sha256: String,
}

impl ManifestDigest {
    pub fn changed(&self) -> bool {
        self.before_sha256 != self.after_sha256
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRunInfo {
    pub started_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pass,
    Unchanged,
    Warn,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub targets_created: u64,
    pub groups_created: u64,
    pub settings_patched: u64,
    pub files_attached: u64,
    pub files_skipped: u64,
    pub files_copied: u64,
    pub files_rewritten: u64,
    pub manifest_written: bool,
    pub warnings: u64,
}

impl ReportSummary {
    pub fn from_events(events: &[PatchEvent]) -> Self {
        let mut s = ReportSummary::default();
        for ev in events {
            if ev.severity() == Severity::Warn {
                s.warnings += 1;
            }
            match ev {
                PatchEvent::TargetCreated { .. } => s.targets_created += 1,
                PatchEvent::GroupCreated { .. } => s.groups_created += 1,
                PatchEvent::BuildSettingPatched { .. } => s.settings_patched += 1,
                PatchEvent::FileAttached { .. } => s.files_attached += 1,
                PatchEvent::FileAlreadyAttached { .. } => s.files_skipped += 1,
                PatchEvent::FileCopied { .. } => s.files_copied += 1,
                PatchEvent::TokensReplaced { .. } => s.files_rewritten += 1,
                PatchEvent::ManifestWritten { .. } => s.manifest_written = true,
                _ => {}
            }
        }
        s
    }

    /// Number of mutations recorded (copies and rewrites included).
    pub fn changes(&self) -> u64 {
        self.targets_created
            + self.groups_created
            + self.settings_patched
            + self.files_attached
            + self.files_copied
            + self.files_rewritten
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::FileKind;
    use pretty_assertions::assert_eq;

    fn tool() -> ReportToolInfo {
        ReportToolInfo {
            name: "extpatch".to_string(),
            version: "0.0.0".to_string(),
        }
    }

    #[test]
    fn summary_counts_events() {
        let events = vec![
            PatchEvent::TargetCreated {
                name: "ShareExt".to_string(),
                key: "A".to_string(),
                phases: vec!["B".to_string(), "C".to_string()],
            },
            PatchEvent::FileAttached {
                name: "a.m".to_string(),
                kind: FileKind::Source,
                group: "ShareExtension".to_string(),
                phase: Some("Sources".to_string()),
            },
            PatchEvent::FileAlreadyAttached {
                name: "b.h".to_string(),
                kind: FileKind::Source,
            },
            PatchEvent::ManifestWritten {
                path: "x".to_string(),
            },
        ];
        let s = ReportSummary::from_events(&events);
        assert_eq!(s.targets_created, 1);
        assert_eq!(s.files_attached, 1);
        assert_eq!(s.files_skipped, 1);
        assert!(s.manifest_written);
        assert_eq!(s.changes(), 2);
    }

    #[test]
    fn report_without_changes_is_unchanged() {
        let report = PatchReport::new(
            tool(),
            Utc::now(),
            vec![PatchEvent::TargetExists {
                name: "ShareExt".to_string(),
                key: "A".to_string(),
            }],
        );
        assert_eq!(report.status, ReportStatus::Unchanged);
        assert_eq!(report.schema, "extpatch.report.v1");
    }

    #[test]
    fn report_with_warning_is_warn() {
        let report = PatchReport::new(
            tool(),
            Utc::now(),
            vec![PatchEvent::BuildSettingsUnmatched {
                product_name: "ShareExt".to_string(),
            }],
        );
        assert_eq!(report.status, ReportStatus::Warn);
        let v = serde_json::to_value(&report).unwrap();
        assert_eq!(v["status"], "warn");
        assert!(v.get("manifest").is_none());
    }
}
