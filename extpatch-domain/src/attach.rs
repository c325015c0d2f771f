//! File classification and attachment.

use crate::error::GraphError;
use crate::events::EventSink;
use crate::graph::ProjectGraph;
use crate::ids::{BuildFileId, FileRefId, GroupId, ObjectId, PhaseId};
use crate::model::{BuildFile, FileReference, Node};
use extpatch_pbx::{Dict, PbxString, Value};
use extpatch_types::event::PatchEvent;
use extpatch_types::file::{CandidateFile, FileKind};

/// Classify by extension alone: `.h`/`.m` are sources, `.plist` files are
/// manifest fragments, everything else is a resource. Case-sensitive.
pub fn classify_extension(extension: &str) -> FileKind {
    match extension {
        ".h" | ".m" => FileKind::Source,
        ".plist" => FileKind::ManifestFragment,
        _ => FileKind::Resource,
    }
}

pub fn classify(file: &CandidateFile) -> FileKind {
    classify_extension(&file.extension)
}

/// The phases a target's files are attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPhases {
    pub sources: PhaseId,
    pub resources: PhaseId,
}

impl TargetPhases {
    fn for_kind(&self, kind: FileKind) -> Option<&PhaseId> {
        match kind {
            FileKind::Source => Some(&self.sources),
            FileKind::Resource => Some(&self.resources),
            FileKind::ManifestFragment => None,
        }
    }
}

/// Where a file ended up after [`attach_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub kind: FileKind,
    /// The group child holding the file: a file reference, or a variant
    /// group Xcode created when the file was localized.
    pub file_ref: ObjectId,
    pub build_file: Option<BuildFileId>,
    /// False when the file was already in the group (and phase).
    pub changed: bool,
}

/// Attach `file` to `group` and, for built kinds, to the matching phase.
///
/// Membership is checked by file name in both places before anything is
/// appended. An item already in the group is reused for the phase, whether it
/// is a file reference or a variant group.
pub fn attach_file(
    graph: &mut ProjectGraph,
    file: &CandidateFile,
    group: &GroupId,
    phases: &TargetPhases,
    sink: &mut dyn EventSink,
) -> Result<Attachment, GraphError> {
    let kind = classify(file);
    let mut changed = false;

    let file_ref = match file_in_group(graph, group, &file.name)? {
        Some(existing) => existing,
        None => {
            let group_name = graph.group(group)?.display_name().unwrap_or("").to_string();
            let created: FileRefId = graph.insert(
                &format!("{group_name}|file|{}", file.name),
                Node::FileReference(file_reference(file)),
            );
            let created = ObjectId::from(created);
            graph.group_mut(group)?.children.push(created.clone());
            changed = true;
            created
        }
    };

    let mut build_file = None;
    let mut phase_name = None;
    if let Some(phase) = phases.for_kind(kind) {
        let existing = file_in_phase(graph, phase, &file.name)?;
        let id = match existing {
            Some(id) => id,
            None => {
                let created: BuildFileId = graph.insert(
                    &format!("{}|build|{}", phase, file.name),
                    Node::BuildFile(BuildFile {
                        file_ref: Some(file_ref.clone()),
                        extra: Dict::new(),
                    }),
                );
                graph.phase_mut(phase)?.files.push(created.clone());
                changed = true;
                created
            }
        };
        build_file = Some(id);
        phase_name = Some(graph.phase(phase)?.display_name().to_string());
    }

    if changed {
        sink.emit(PatchEvent::FileAttached {
            name: file.name.clone(),
            kind,
            group: graph.group(group)?.display_name().unwrap_or("").to_string(),
            phase: phase_name,
        });
    } else {
        sink.emit(PatchEvent::FileAlreadyAttached {
            name: file.name.clone(),
            kind,
        });
    }

    Ok(Attachment {
        kind,
        file_ref,
        build_file,
        changed,
    })
}

/// Direct child of `group` named `name` that is not itself a `PBXGroup`.
///
/// Matches file references as well as variant and version groups, which
/// stand in for a file once Xcode has localized it.
pub fn file_in_group(
    graph: &ProjectGraph,
    group: &GroupId,
    name: &str,
) -> Result<Option<ObjectId>, GraphError> {
    let found = graph
        .group(group)?
        .children
        .iter()
        .filter(|child| graph.typed::<GroupId>(child).is_none())
        .find(|child| graph.item_name(child) == Some(name));
    Ok(found.cloned())
}

/// Build file in `phase` whose referenced item is named `name`.
pub fn file_in_phase(
    graph: &ProjectGraph,
    phase: &PhaseId,
    name: &str,
) -> Result<Option<BuildFileId>, GraphError> {
    let found = graph.phase(phase)?.files.iter().find(|id| {
        graph
            .build_file(id)
            .ok()
            .and_then(|b| b.file_ref.as_ref())
            .and_then(|r: &ObjectId| graph.item_name(r))
            == Some(name)
    });
    Ok(found.cloned())
}

/// `lastKnownFileType` Xcode assigns by extension.
fn last_known_file_type(extension: &str) -> &'static str {
    match extension {
        ".h" => "sourcecode.c.h",
        ".m" => "sourcecode.c.objc",
        ".swift" => "sourcecode.swift",
        ".plist" => "text.plist.xml",
        ".storyboard" => "file.storyboard",
        ".xib" => "file.xib",
        ".png" => "image.png",
        ".jpg" | ".jpeg" => "image.jpeg",
        ".xcassets" => "folder.assetcatalog",
        ".strings" => "text.plist.strings",
        ".json" => "text.json",
        ".entitlements" => "text.plist.entitlements",
        _ => "file",
    }
}

fn is_text_type(file_type: &str) -> bool {
    file_type.starts_with("sourcecode.") || file_type.starts_with("text")
}

fn file_reference(file: &CandidateFile) -> FileReference {
    let file_type = last_known_file_type(&file.extension);
    let mut extra = Dict::new();
    if is_text_type(file_type) {
        extra.insert("fileEncoding".to_string(), Value::string("4"));
    }
    extra.insert("lastKnownFileType".to_string(), Value::string(file_type));
    FileReference {
        name: None,
        path: Some(PbxString::new(file.name.as_str())),
        source_tree: Some(PbxString::quoted("<group>")),
        extra,
    }
}
