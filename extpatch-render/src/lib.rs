//! Rendering helpers (markdown) for human-readable artifacts.

use extpatch_types::event::{PatchEvent, Severity};
use extpatch_types::report::{PatchReport, ReportStatus};

pub fn render_report_md(report: &PatchReport) -> String {
    let mut out = String::new();
    out.push_str("# extpatch report\n\n");
    out.push_str(&format!("- Status: `{}`\n", status_label(report.status)));
    if report.dry_run {
        out.push_str("- Mode: dry run (nothing written)\n");
    }
    if let Some(manifest) = &report.manifest {
        out.push_str(&format!("- Manifest: `{}`\n", manifest));
    }
    if let Some(digest) = &report.manifest_digest {
        out.push_str(&format!(
            "- Manifest sha256: {} → {}\n",
            short(&digest.before_sha256),
            short(&digest.after_sha256)
        ));
    }

    let s = &report.summary;
    out.push_str(&format!(
        "- Targets created: {}\n- Groups created: {}\n- Settings patched: {}\n- Files attached: {} (already attached {})\n- Files copied: {} (tokens filled in {})\n- Warnings: {}\n\n",
        s.targets_created,
        s.groups_created,
        s.settings_patched,
        s.files_attached,
        s.files_skipped,
        s.files_copied,
        s.files_rewritten,
        s.warnings
    ));

    out.push_str("## Events\n\n");
    if report.events.is_empty() {
        out.push_str("_No events._\n");
        return out;
    }

    for ev in &report.events {
        let marker = match ev.severity() {
            Severity::Warn => "⚠️ ",
            Severity::Info if ev.is_noop() => "· ",
            Severity::Info => "",
        };
        out.push_str(&format!("- {}{}", marker, ev.message()));
        if let Some(key) = event_key(ev) {
            out.push_str(&format!(" `{}`", key));
        }
        out.push('\n');
    }

    out
}

fn event_key(ev: &PatchEvent) -> Option<&str> {
    match ev {
        PatchEvent::TargetExists { key, .. }
        | PatchEvent::TargetCreated { key, .. }
        | PatchEvent::GroupExists { key, .. }
        | PatchEvent::GroupCreated { key, .. }
        | PatchEvent::BuildSettingPatched { key, .. } => Some(key),
        _ => None,
    }
}

fn short(sha: &str) -> &str {
    sha.get(..12).unwrap_or(sha)
}

fn status_label(s: ReportStatus) -> &'static str {
    match s {
        ReportStatus::Pass => "pass",
        ReportStatus::Unchanged => "unchanged",
        ReportStatus::Warn => "warn",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use extpatch_types::file::FileKind;
    use extpatch_types::report::{ManifestDigest, ReportToolInfo};
    use pretty_assertions::assert_eq;

    fn report(events: Vec<PatchEvent>) -> PatchReport {
        PatchReport::new(
            ReportToolInfo {
                name: "extpatch".to_string(),
                version: "0.0.0".to_string(),
            },
            Utc::now(),
            events,
        )
    }

    #[test]
    fn empty_report_says_so() {
        let md = render_report_md(&report(vec![]));
        assert!(md.starts_with("# extpatch report\n\n- Status: `unchanged`\n"));
        assert!(md.ends_with("## Events\n\n_No events._\n"));
    }

    #[test]
    fn events_are_listed_with_keys_and_markers() {
        let mut r = report(vec![
            PatchEvent::TargetCreated {
                name: "ShareExt".to_string(),
                key: "AAAABBBBCCCCDDDDEEEEFFFF".to_string(),
                phases: vec!["Sources".to_string(), "Resources".to_string()],
            },
            PatchEvent::FileAlreadyAttached {
                name: "ShareViewController.m".to_string(),
                kind: FileKind::Source,
            },
            PatchEvent::BuildSettingsUnmatched {
                product_name: "ShareExt".to_string(),
            },
        ]);
        r.manifest = Some("platforms/ios/App.xcodeproj/project.pbxproj".to_string());
        r.manifest_digest = Some(ManifestDigest {
            before_sha256: "0123456789abcdef".to_string(),
            after_sha256: "fedcba9876543210".to_string(),
        });
        let md = render_report_md(&r);

        assert!(md.contains("- Status: `warn`\n"));
        assert!(md.contains("- Manifest sha256: 0123456789ab → fedcba987654\n"));
        let events: Vec<&str> = md
            .lines()
            .skip_while(|l| *l != "## Events")
            .skip(2)
            .collect();
        assert_eq!(
            events,
            vec![
                "- created target ShareExt (2 build phases) `AAAABBBBCCCCDDDDEEEEFFFF`",
                "- · ShareViewController.m already attached",
                "- ⚠️ no build configuration has PRODUCT_NAME ShareExt",
            ]
        );
    }
}
