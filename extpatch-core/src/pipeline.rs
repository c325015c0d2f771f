//! Core add-target, copy-extension and install pipelines.
//!
//! Every input is read and every mutation is computed before the first
//! write. Writes go through [`WritePort`]; a dry run skips them and still
//! returns the events and the diff.

use crate::discover::{XcodeProject, discover_project};
use crate::error::ToolError;
use crate::identity::{BundleVersions, read_app_id, read_bundle_versions};
use crate::ports::WritePort;
use crate::settings::ExtensionSettings;
use anyhow::Context;
use camino::Utf8Path;
use chrono::{DateTime, Utc};
use extpatch_domain::{
    EventSink, ExtensionPlan, ProjectGraph, TargetKind, Traced, ensure_extension, ensure_integrity,
};
use extpatch_edit::{
    CopyPlan, TokenTable, TokenValues, backup_file, list_candidates, plan_extension_copy,
    render_patch, sha256_hex,
};
use extpatch_types::event::PatchEvent;
use extpatch_types::file::CandidateFile;
use extpatch_types::report::{ManifestDigest, PatchReport, ReportToolInfo};
use fs_err as fs;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Outcome of a pipeline run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub events: Vec<PatchEvent>,
    pub report: PatchReport,
    /// Unified diff of every text file the run changed (or would change).
    pub patch: String,
}

/// Add the extension target, group and files to the Xcode project.
///
/// The extension folder must already be in the iOS platform folder; when it
/// is missing the run fails before the manifest is touched.
pub fn run_add_target(
    settings: &ExtensionSettings,
    writer: &dyn WritePort,
    tool: ReportToolInfo,
) -> Result<RunOutcome, ToolError> {
    let started = Utc::now();
    let project = discover_project(&settings.ios_dir())?;
    let app_id = read_app_id(&settings.config_xml())?;
    let files = list_candidates(&settings.extension_dir())?;

    let mut sink = Traced::new(Vec::<PatchEvent>::new());
    let edit = plan_manifest(settings, &project, &app_id, &files, &mut sink)?;
    let manifest = commit_manifest(settings, &project, edit, writer, &mut sink)?;
    Ok(finish(
        settings,
        tool,
        started,
        sink.into_inner(),
        manifest.patch.clone(),
        Some(manifest),
    ))
}

/// Copy the plugin's extension folder into the iOS platform folder and fill
/// in its template tokens.
pub fn run_copy_extension(
    settings: &ExtensionSettings,
    writer: &dyn WritePort,
    tool: ReportToolInfo,
) -> Result<RunOutcome, ToolError> {
    let started = Utc::now();
    let ios = settings.ios_dir();
    let project = discover_project(&ios)?;
    let app_id = read_app_id(&settings.config_xml())?;
    let versions = read_bundle_versions(&project.info_plist(&ios))?;

    let tokens = token_table(settings, &project, &app_id, &versions);
    let plan = plan_extension_copy(&settings.plugin_extension_dir(), &ios, &tokens)?;

    let mut sink = Traced::new(Vec::<PatchEvent>::new());
    let patch = apply_copy(settings, &plan, writer, &mut sink)?;
    Ok(finish(settings, tool, started, sink.into_inner(), patch, None))
}

/// Copy the extension folder, then add the target.
///
/// Both steps are planned from what is on disk before anything is written,
/// so a manifest that cannot be patched leaves the platform folder alone
/// too.
pub fn run_install(
    settings: &ExtensionSettings,
    writer: &dyn WritePort,
    tool: ReportToolInfo,
) -> Result<RunOutcome, ToolError> {
    let started = Utc::now();
    let ios = settings.ios_dir();
    let project = discover_project(&ios)?;
    let app_id = read_app_id(&settings.config_xml())?;
    let versions = read_bundle_versions(&project.info_plist(&ios))?;

    let tokens = token_table(settings, &project, &app_id, &versions);
    let plan = plan_extension_copy(&settings.plugin_extension_dir(), &ios, &tokens)?;
    let files = install_candidates(settings)?;

    let mut manifest_events = Vec::<PatchEvent>::new();
    let edit = plan_manifest(settings, &project, &app_id, &files, &mut manifest_events)?;

    let mut sink = Traced::new(Vec::<PatchEvent>::new());
    let copy_patch = apply_copy(settings, &plan, writer, &mut sink)?;
    for event in manifest_events {
        sink.emit(event);
    }
    let manifest = commit_manifest(settings, &project, edit, writer, &mut sink)?;

    let patch = format!("{copy_patch}{}", manifest.patch);
    Ok(finish(
        settings,
        tool,
        started,
        sink.into_inner(),
        patch,
        Some(manifest),
    ))
}

/// Write `report.json`, `report.md` and `patch.diff` to `out_dir`.
pub fn write_artifacts(
    outcome: &RunOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    let report_json =
        serde_json::to_string_pretty(&outcome.report).context("serialize report")?;
    writer.write_file(&out_dir.join("report.json"), report_json.as_bytes())?;

    #[cfg(feature = "reporting")]
    {
        let report_md = extpatch_render::render_report_md(&outcome.report);
        writer.write_file(&out_dir.join("report.md"), report_md.as_bytes())?;
    }

    writer.write_file(&out_dir.join("patch.diff"), outcome.patch.as_bytes())?;
    Ok(())
}

struct ManifestPatch {
    relative: String,
    digest: ManifestDigest,
    patch: String,
}

/// Manifest text before and after the extension edit, nothing written yet.
struct ManifestEdit {
    before: String,
    after: String,
}

fn plan_manifest(
    settings: &ExtensionSettings,
    project: &XcodeProject,
    app_id: &str,
    files: &[CandidateFile],
    sink: &mut dyn EventSink,
) -> Result<ManifestEdit, ToolError> {
    let text = read_manifest(project)?;
    let mut graph = ProjectGraph::parse(&text)?;
    graph.set_display_name(project.name.as_str());

    let plan = ExtensionPlan {
        target_name: settings.target_name.clone(),
        kind: TargetKind::AppExtension,
        subfolder: settings.folder_name.clone(),
        group_name: settings.group_name.clone(),
        group_path: settings.folder_name.clone(),
        parent_group: settings.parent_group.clone(),
        bundle_identifier: format!("{app_id}{}", settings.bundle_suffix),
    };
    let outcome = ensure_extension(&mut graph, &plan, files, sink)?;
    ensure_integrity(&graph)?;

    // Untouched graphs keep the original bytes, whatever their layout.
    let changed = outcome.target_created
        || outcome.group_created
        || outcome.phases_created > 0
        || outcome.files_attached > 0;
    let after = if changed { graph.to_pbxproj() } else { text.clone() };
    Ok(ManifestEdit { before: text, after })
}

fn commit_manifest(
    settings: &ExtensionSettings,
    project: &XcodeProject,
    edit: ManifestEdit,
    writer: &dyn WritePort,
    sink: &mut dyn EventSink,
) -> Result<ManifestPatch, ToolError> {
    let ManifestEdit { before: text, after } = edit;
    let relative = relative_to(&settings.project_root, &project.manifest);
    if after == text {
        sink.emit(PatchEvent::ManifestUnchanged {
            path: relative.clone(),
        });
    } else if settings.dry_run {
        debug!(manifest = %project.manifest, "dry-run: manifest not written");
    } else {
        if settings.backup_enabled {
            let backup = backup_file(&project.manifest, &settings.backup_suffix)?;
            info!(backup = %backup, "backed up manifest");
        }
        writer.write_file(&project.manifest, after.as_bytes())?;
        sink.emit(PatchEvent::ManifestWritten {
            path: relative.clone(),
        });
    }

    let patch = render_patch(
        &BTreeMap::from([(relative.clone(), text.clone())]),
        &BTreeMap::from([(relative.clone(), after.clone())]),
    );
    Ok(ManifestPatch {
        relative,
        digest: ManifestDigest {
            before_sha256: sha256_hex(text.as_bytes()),
            after_sha256: sha256_hex(after.as_bytes()),
        },
        patch,
    })
}

fn apply_copy(
    settings: &ExtensionSettings,
    plan: &CopyPlan,
    writer: &dyn WritePort,
    sink: &mut dyn EventSink,
) -> Result<String, ToolError> {
    let mut before = BTreeMap::new();
    let mut after = BTreeMap::new();

    for write in &plan.writes {
        if !settings.dry_run {
            writer.write_file(&write.path, &write.contents)?;
        }
        sink.emit(PatchEvent::FileCopied {
            path: write.relative.clone(),
        });
        if write.replacements > 0 {
            sink.emit(PatchEvent::TokensReplaced {
                path: write.relative.clone(),
                replacements: write.replacements,
            });
        }

        let Ok(new) = std::str::from_utf8(&write.contents) else {
            continue;
        };
        if let Some(old) = &write.before {
            match std::str::from_utf8(old) {
                Ok(old) => {
                    before.insert(write.relative.clone(), old.to_string());
                }
                Err(_) => continue,
            }
        }
        after.insert(write.relative.clone(), new.to_string());
    }
    debug!(
        folder = %plan.folder,
        written = plan.writes.len(),
        unchanged = plan.unchanged.len(),
        dry_run = settings.dry_run,
        "extension copy done"
    );
    Ok(render_patch(&before, &after))
}

/// Candidate files for an install: what the copy brings plus anything
/// already in the destination folder.
fn install_candidates(settings: &ExtensionSettings) -> Result<Vec<CandidateFile>, ToolError> {
    let mut files = list_candidates(&settings.plugin_extension_dir())?;
    let dest = settings.extension_dir();
    if dest.is_dir() {
        for file in list_candidates(&dest)? {
            if !files.iter().any(|f| f.name == file.name) {
                files.push(file);
            }
        }
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

fn token_table(
    settings: &ExtensionSettings,
    project: &XcodeProject,
    app_id: &str,
    versions: &BundleVersions,
) -> TokenTable {
    let values = TokenValues {
        display_name: project.name.clone(),
        app_id: app_id.to_string(),
        bundle_suffix: settings.bundle_suffix.clone(),
        short_version: versions.short_version.clone(),
        bundle_version: versions.bundle_version.clone(),
        url_scheme: settings.url_scheme.clone(),
        uniform_type_identifier: settings.uniform_type_identifier.clone(),
    };
    TokenTable::standard(&values).with_extra(settings.extra_tokens.clone())
}

fn read_manifest(project: &XcodeProject) -> Result<String, ToolError> {
    Ok(fs::read_to_string(&project.manifest)
        .with_context(|| format!("read {}", project.manifest))?)
}

fn relative_to(root: &Utf8Path, path: &Utf8Path) -> String {
    path.strip_prefix(root)
        .map(|p| p.as_str().replace('\\', "/"))
        .unwrap_or_else(|_| path.to_string())
}

fn finish(
    settings: &ExtensionSettings,
    tool: ReportToolInfo,
    started: DateTime<Utc>,
    events: Vec<PatchEvent>,
    patch: String,
    manifest: Option<ManifestPatch>,
) -> RunOutcome {
    let mut report = PatchReport::new(tool, started, events.clone());
    report.dry_run = settings.dry_run;
    if let Some(manifest) = manifest {
        report.manifest = Some(manifest.relative);
        report.manifest_digest = Some(manifest.digest);
    }
    RunOutcome {
        events,
        report,
        patch,
    }
}
