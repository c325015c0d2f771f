use crate::error::GraphError;
use crate::events::EventSink;
use crate::graph::ProjectGraph;
use crate::ids::{GroupId, ObjectId};
use crate::model::{Group, Node};
use crate::resolve::find_group_by_name;
use extpatch_pbx::PbxString;
use extpatch_types::event::PatchEvent;

/// Create group `name` (at `path`, relative to its parent) and link it as a
/// child of the group called `parent`.
///
/// The parent is resolved before anything is inserted; a host project
/// without it is an unsupported layout and nothing is created.
pub fn add_group(
    graph: &mut ProjectGraph,
    name: &str,
    path: &str,
    parent: &str,
    sink: &mut dyn EventSink,
) -> Result<GroupId, GraphError> {
    if find_group_by_name(graph, name).is_some() {
        return Err(GraphError::GroupExists {
            name: name.to_string(),
        });
    }
    let parent_id = find_group_by_name(graph, parent).ok_or_else(|| GraphError::ParentGroupMissing {
        parent: parent.to_string(),
        group: name.to_string(),
    })?;

    let group: GroupId = graph.insert(
        &format!("{name}|group"),
        Node::Group(Group {
            children: Vec::new(),
            name: Some(PbxString::new(name)),
            path: Some(PbxString::new(path)),
            source_tree: Some(PbxString::quoted("<group>")),
            extra: Default::default(),
        }),
    );

    let children = &mut graph.group_mut(&parent_id)?.children;
    let child: ObjectId = group.clone().into();
    if !children.contains(&child) {
        children.push(child);
    }
    tracing::debug!(group = %group, parent = %parent_id, "group linked");

    sink.emit(PatchEvent::GroupCreated {
        name: name.to_string(),
        key: group.to_string(),
        parent: parent.to_string(),
    });
    Ok(group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TEXT: &str = r#"{
	objects = {
		AA0000000000000000000001 = {isa = PBXProject; buildConfigurationList = AA0000000000000000000002; mainGroup = AA0000000000000000000003; targets = (); };
		AA0000000000000000000002 = {isa = XCConfigurationList; buildConfigurations = (); };
		AA0000000000000000000003 = {isa = PBXGroup; children = (AA0000000000000000000004); sourceTree = "<group>"; };
		AA0000000000000000000004 = {isa = PBXGroup; children = (); name = CustomTemplate; sourceTree = "<group>"; };
	};
	rootObject = AA0000000000000000000001;
}"#;

    #[test]
    fn new_group_is_child_of_parent_exactly_once() {
        let mut graph = ProjectGraph::parse(TEXT).unwrap();
        let mut events = Vec::<PatchEvent>::new();
        let group = add_group(
            &mut graph,
            "ShareExtension",
            "ShareExtension",
            "CustomTemplate",
            &mut events,
        )
        .unwrap();

        let parent = find_group_by_name(&graph, "CustomTemplate").unwrap();
        let child: ObjectId = group.clone().into();
        let children = &graph.group(&parent).unwrap().children;
        assert_eq!(children.iter().filter(|c| **c == child).count(), 1);

        let created = graph.group(&group).unwrap();
        assert_eq!(created.display_name(), Some("ShareExtension"));
        assert_eq!(created.source_tree.as_ref().map(PbxString::as_str), Some("<group>"));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn missing_parent_aborts_without_inserting() {
        let mut graph = ProjectGraph::parse(TEXT).unwrap();
        let before = graph.len();
        let mut events = Vec::<PatchEvent>::new();
        let err = add_group(&mut graph, "ShareExtension", "ShareExtension", "Plugins", &mut events)
            .unwrap_err();
        assert!(matches!(err, GraphError::ParentGroupMissing { .. }));
        assert!(err.is_layout_error());
        assert_eq!(graph.len(), before);
        assert!(events.is_empty());
    }

    #[test]
    fn existing_group_is_rejected() {
        let mut graph = ProjectGraph::parse(TEXT).unwrap();
        let mut events = Vec::<PatchEvent>::new();
        let err = add_group(&mut graph, "CustomTemplate", "x", "CustomTemplate", &mut events)
            .unwrap_err();
        assert!(matches!(err, GraphError::GroupExists { .. }));
    }
}
