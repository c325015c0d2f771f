//! Domain logic: a typed Xcode project graph and the idempotent mutations
//! that add an extension target to it.
//!
//! This crate owns *what* changes in the project. Reading and writing files
//! is the job of `extpatch-core`; the text format lives in `extpatch-pbx`.

mod attach;
mod error;
mod events;
mod graph;
mod group;
mod ids;
mod integrity;
mod model;
mod resolve;
mod settings;
mod target;
mod workflow;

pub use attach::{
    Attachment, TargetPhases, attach_file, classify, classify_extension, file_in_group,
    file_in_phase,
};
pub use error::GraphError;
pub use events::{EventSink, Traced};
pub use graph::{CommentTable, ProjectGraph};
pub use group::add_group;
pub use ids::{
    BuildFileId, ConfigId, ConfigListId, DependencyId, FileRefId, GroupId, ObjectId, PhaseId,
    ProjectId, TargetId, TypedId,
};
pub use integrity::{IntegrityIssue, check as check_integrity, ensure as ensure_integrity};
pub use model::{
    BuildConfiguration, BuildFile, BuildPhase, ConfigurationList, FileReference, Group, Node,
    OpaqueNode, PhaseKind, Project, Target, TargetClass, TargetDependency,
};
pub use resolve::{find_group_by_name, find_phase, find_target_by_name, host_target};
pub use settings::{
    PRODUCT_BUNDLE_IDENTIFIER, PRODUCT_NAME, patch_build_setting, patch_bundle_identifier,
};
pub use target::{NewTarget, TargetKind, add_target, ensure_phase};
pub use workflow::{ExtensionPlan, WorkflowOutcome, ensure_extension};
