//! Name lookups over the graph. None of these mutate.

use crate::graph::ProjectGraph;
use crate::ids::{GroupId, PhaseId, TargetId};
use crate::model::PhaseKind;

/// The target called `name`, compared with quotes stripped.
pub fn find_target_by_name(graph: &ProjectGraph, name: &str) -> Option<TargetId> {
    graph
        .targets()
        .find(|(_, t)| t.name.matches(name))
        .map(|(id, _)| id)
}

/// The group called `name`. Groups without a `name` are matched on `path`.
pub fn find_group_by_name(graph: &ProjectGraph, name: &str) -> Option<GroupId> {
    graph
        .groups()
        .find(|(_, g)| match (&g.name, &g.path) {
            (Some(n), _) => n.matches(name),
            (None, Some(p)) => p.matches(name),
            (None, None) => false,
        })
        .map(|(id, _)| id)
}

/// The project's first target, which hosts embedded extensions.
pub fn host_target(graph: &ProjectGraph) -> Option<TargetId> {
    graph.project().ok()?.targets.first().cloned()
}

/// First build phase of `kind` owned by `target`.
pub fn find_phase(graph: &ProjectGraph, target: &TargetId, kind: PhaseKind) -> Option<PhaseId> {
    let target = graph.target(target).ok()?;
    target
        .build_phases
        .iter()
        .find(|p| graph.phase(p).is_ok_and(|phase| phase.kind == kind))
        .cloned()
}
