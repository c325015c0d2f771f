//! The "ensure extension" workflow: target, settings, group, files.

use crate::attach::{TargetPhases, attach_file, classify};
use crate::error::GraphError;
use crate::events::EventSink;
use crate::graph::ProjectGraph;
use crate::group::add_group;
use crate::ids::{GroupId, PhaseId, TargetId};
use crate::model::PhaseKind;
use crate::resolve::{find_group_by_name, find_phase, find_target_by_name};
use crate::settings::patch_bundle_identifier;
use crate::target::{TargetKind, add_target, ensure_phase};
use extpatch_types::event::PatchEvent;
use extpatch_types::file::{CandidateFile, FileKind};

/// What to ensure in the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionPlan {
    pub target_name: String,
    pub kind: TargetKind,
    /// Folder holding the extension's files and Info.plist.
    pub subfolder: String,
    pub group_name: String,
    pub group_path: String,
    pub parent_group: String,
    /// Written to `PRODUCT_BUNDLE_IDENTIFIER` when the target is created.
    pub bundle_identifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowOutcome {
    pub target: TargetId,
    pub group: GroupId,
    pub target_created: bool,
    pub group_created: bool,
    /// Phases added to a target that already existed.
    pub phases_created: usize,
    pub settings_patched: usize,
    pub files_attached: usize,
    pub files_skipped: usize,
}

/// Ensure the extension target and group exist and every candidate file is
/// attached.
///
/// Each step checks before it creates, so running this twice over the same
/// graph and files leaves the graph as the first run did. Build settings are
/// only patched when the target is created here. Files are attached
/// manifests first, then sources, then resources, by name within each kind.
///
/// Everything that can fail for layout reasons is checked before the first
/// mutation.
pub fn ensure_extension(
    graph: &mut ProjectGraph,
    plan: &ExtensionPlan,
    files: &[CandidateFile],
    sink: &mut dyn EventSink,
) -> Result<WorkflowOutcome, GraphError> {
    let existing_target = find_target_by_name(graph, &plan.target_name);
    let existing_group = find_group_by_name(graph, &plan.group_name);
    if existing_group.is_none() && find_group_by_name(graph, &plan.parent_group).is_none() {
        return Err(GraphError::ParentGroupMissing {
            parent: plan.parent_group.clone(),
            group: plan.group_name.clone(),
        });
    }

    let mut settings_patched = 0;
    let mut phases_created = 0;
    let target_created = existing_target.is_none();
    let (target, phases) = match existing_target {
        Some(target) => {
            sink.emit(PatchEvent::TargetExists {
                name: plan.target_name.clone(),
                key: target.to_string(),
            });
            let phases = TargetPhases {
                sources: ensure_counted(graph, &target, PhaseKind::Sources, &mut phases_created)?,
                resources: ensure_counted(
                    graph,
                    &target,
                    PhaseKind::Resources,
                    &mut phases_created,
                )?,
            };
            (target, phases)
        }
        None => {
            let new = add_target(graph, &plan.target_name, plan.kind, &plan.subfolder, sink)?;
            settings_patched =
                patch_bundle_identifier(graph, &plan.target_name, &plan.bundle_identifier, sink);
            let phases = TargetPhases {
                sources: new.sources,
                resources: new.resources,
            };
            (new.target, phases)
        }
    };

    let group_created = existing_group.is_none();
    let group = match existing_group {
        Some(group) => {
            sink.emit(PatchEvent::GroupExists {
                name: plan.group_name.clone(),
                key: group.to_string(),
            });
            group
        }
        None => add_group(
            graph,
            &plan.group_name,
            &plan.group_path,
            &plan.parent_group,
            sink,
        )?,
    };

    let mut ordered: Vec<&CandidateFile> = files.iter().collect();
    ordered.sort_by(|a, b| {
        kind_rank(classify(a))
            .cmp(&kind_rank(classify(b)))
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut files_attached = 0;
    let mut files_skipped = 0;
    for file in ordered {
        let attachment = attach_file(graph, file, &group, &phases, sink)?;
        if attachment.changed {
            files_attached += 1;
        } else {
            files_skipped += 1;
        }
    }

    Ok(WorkflowOutcome {
        target,
        group,
        target_created,
        group_created,
        phases_created,
        settings_patched,
        files_attached,
        files_skipped,
    })
}

fn ensure_counted(
    graph: &mut ProjectGraph,
    target: &TargetId,
    kind: PhaseKind,
    created: &mut usize,
) -> Result<PhaseId, GraphError> {
    if find_phase(graph, target, kind).is_none() {
        *created += 1;
    }
    ensure_phase(graph, target, kind)
}

fn kind_rank(kind: FileKind) -> u8 {
    match kind {
        FileKind::ManifestFragment => 0,
        FileKind::Source => 1,
        FileKind::Resource => 2,
    }
}
