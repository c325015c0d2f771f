//! The project graph: an arena of typed nodes keyed by object id.

use crate::error::GraphError;
use crate::ids::{
    BuildFileId, ConfigId, ConfigListId, DependencyId, FileRefId, GroupId, ObjectId, PhaseId,
    ProjectId, TargetId, TypedId, derive_id, sealed::Mint,
};
use crate::model::{
    BuildConfiguration, BuildFile, BuildPhase, ConfigurationList, FileReference, Group, Node,
    OpaqueNode, PhaseKind, Project, Target, TargetClass, TargetDependency,
};
use extpatch_pbx::{Annotator, Dict, PbxString, Value};
use std::collections::{BTreeMap, HashMap};

/// A loaded `project.pbxproj`.
///
/// The graph owns every object of the manifest. Cross-references between
/// modeled fields are typed ids that were checked against the referenced
/// node's class at load time (or minted by the graph itself), and nodes are
/// never removed, so a typed id taken from a graph stays valid for it.
#[derive(Debug, Clone)]
pub struct ProjectGraph {
    /// Top-level entries in file order; `objects` is a placeholder.
    header: Dict,
    nodes: BTreeMap<ObjectId, Node>,
    root: ProjectId,
    display_name: Option<String>,
}

macro_rules! node_accessors {
    ($get:ident, $get_mut:ident, $id:ty, $ty:ty, $variant:path) => {
        pub fn $get(&self, id: &$id) -> Result<&$ty, GraphError> {
            match self.nodes.get(id.object_id()) {
                Some($variant(n)) => Ok(n),
                _ => Err(unknown(id)),
            }
        }

        pub fn $get_mut(&mut self, id: &$id) -> Result<&mut $ty, GraphError> {
            match self.nodes.get_mut(id.object_id()) {
                Some($variant(n)) => Ok(n),
                _ => Err(unknown(id)),
            }
        }
    };
}

fn unknown<T: TypedId>(id: &T) -> GraphError {
    GraphError::UnknownId {
        kind: T::KIND,
        id: id.object_id().to_string(),
    }
}

impl ProjectGraph {
    /// Parse manifest text and load it.
    pub fn parse(text: &str) -> Result<Self, GraphError> {
        let value = extpatch_pbx::parse(text)?;
        Self::from_value(value)
    }

    /// Load a parsed manifest, checking every typed reference.
    pub fn from_value(value: Value) -> Result<Self, GraphError> {
        let Value::Dict(mut header) = value else {
            return Err(GraphError::RootNotDict);
        };
        let objects = match header.get_mut("objects") {
            Some(Value::Dict(objects)) => std::mem::take(objects),
            Some(_) => {
                return Err(GraphError::WrongType {
                    id: "<root>".to_string(),
                    key: "objects",
                    expected: "a dictionary",
                });
            }
            None => return Err(GraphError::MissingRootKey { key: "objects" }),
        };
        let root = header
            .get("rootObject")
            .and_then(Value::as_str)
            .map(ObjectId::new)
            .ok_or(GraphError::MissingRootKey { key: "rootObject" })?;

        let mut classes = HashMap::with_capacity(objects.len());
        for (id, obj) in &objects {
            let isa = obj
                .get("isa")
                .and_then(Value::as_str)
                .ok_or_else(|| GraphError::MissingField {
                    id: id.clone(),
                    isa: "?".to_string(),
                    key: "isa",
                })?;
            classes.insert(id.clone(), isa.to_string());
        }

        let loader = Loader { classes: &classes };
        let root: ProjectId = loader.reference("<root>", "rootObject", &root)?;

        let mut nodes = BTreeMap::new();
        for (id, obj) in objects {
            let Value::Dict(fields) = obj else {
                return Err(GraphError::NotAnObject { id });
            };
            let node = loader.node(&id, fields)?;
            nodes.insert(ObjectId::new(id), node);
        }

        tracing::debug!(objects = nodes.len(), root = %root, "loaded project graph");
        Ok(Self {
            header,
            nodes,
            root,
            display_name: None,
        })
    }

    /// Rebuild the manifest value tree.
    pub fn to_value(&self) -> Value {
        let mut root = self.header.clone();
        let objects: Dict = self
            .nodes
            .iter()
            .map(|(id, node)| (id.as_str().to_string(), Value::Dict(node.to_dict())))
            .collect();
        root.insert("objects".to_string(), Value::Dict(objects));
        Value::Dict(root)
    }

    /// Serialize in Xcode layout with regenerated reference comments.
    pub fn to_pbxproj(&self) -> String {
        extpatch_pbx::to_string(&self.to_value(), &self.comments())
    }

    /// Name used in the project's configuration-list comment. Xcode derives
    /// it from the `.xcodeproj` folder, which the graph cannot see.
    pub fn set_display_name(&mut self, name: impl Into<String>) {
        self.display_name = Some(name.into());
    }

    /// The project name: the configured display name, else the first target's.
    pub fn display_name(&self) -> Option<&str> {
        if let Some(name) = &self.display_name {
            return Some(name);
        }
        let first = self.project().ok()?.targets.first()?;
        self.target(first).ok().map(|t| t.name.as_str())
    }

    pub fn root(&self) -> &ProjectId {
        &self.root
    }

    pub fn project(&self) -> Result<&Project, GraphError> {
        match self.nodes.get(self.root.object_id()) {
            Some(Node::Project(p)) => Ok(p),
            _ => Err(unknown(&self.root)),
        }
    }

    pub fn project_mut(&mut self) -> Result<&mut Project, GraphError> {
        match self.nodes.get_mut(self.root.object_id()) {
            Some(Node::Project(p)) => Ok(p),
            _ => Err(unknown(&self.root)),
        }
    }

    node_accessors!(target, target_mut, TargetId, Target, Node::Target);
    node_accessors!(group, group_mut, GroupId, Group, Node::Group);
    node_accessors!(phase, phase_mut, PhaseId, BuildPhase, Node::BuildPhase);
    node_accessors!(file_ref, file_ref_mut, FileRefId, FileReference, Node::FileReference);
    node_accessors!(build_file, build_file_mut, BuildFileId, BuildFile, Node::BuildFile);
    node_accessors!(
        configuration,
        configuration_mut,
        ConfigId,
        BuildConfiguration,
        Node::BuildConfiguration
    );
    node_accessors!(
        configuration_list,
        configuration_list_mut,
        ConfigListId,
        ConfigurationList,
        Node::ConfigurationList
    );
    node_accessors!(
        dependency,
        dependency_mut,
        DependencyId,
        TargetDependency,
        Node::TargetDependency
    );

    pub fn node(&self, id: &ObjectId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&ObjectId, &Node)> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check an untyped id against a node class.
    pub fn typed<T: TypedId>(&self, id: &ObjectId) -> Option<T> {
        let node = self.nodes.get(id)?;
        T::ISAS
            .contains(&node.isa())
            .then(|| T::mint(id.clone()))
    }

    /// Targets in id order.
    pub fn targets(&self) -> impl Iterator<Item = (TargetId, &Target)> {
        self.nodes.iter().filter_map(|(id, node)| match node {
            Node::Target(t) => Some((TargetId::mint(id.clone()), t)),
            _ => None,
        })
    }

    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &Group)> {
        self.nodes.iter().filter_map(|(id, node)| match node {
            Node::Group(g) => Some((GroupId::mint(id.clone()), g)),
            _ => None,
        })
    }

    pub fn configurations(&self) -> impl Iterator<Item = (ConfigId, &BuildConfiguration)> {
        self.nodes.iter().filter_map(|(id, node)| match node {
            Node::BuildConfiguration(c) => Some((ConfigId::mint(id.clone()), c)),
            _ => None,
        })
    }

    /// Ids of every build configuration, for callers that mutate while
    /// iterating.
    pub fn configuration_ids(&self) -> Vec<ConfigId> {
        self.configurations().map(|(id, _)| id).collect()
    }

    pub fn phases(&self) -> impl Iterator<Item = (PhaseId, &BuildPhase)> {
        self.nodes.iter().filter_map(|(id, node)| match node {
            Node::BuildPhase(p) => Some((PhaseId::mint(id.clone()), p)),
            _ => None,
        })
    }

    /// Display name of any node that can sit in a group or a build file.
    pub fn item_name(&self, id: &ObjectId) -> Option<&str> {
        match self.nodes.get(id)? {
            Node::FileReference(f) => f.display_name(),
            Node::Group(g) => g.display_name(),
            Node::Other(o) => o.display_name(),
            _ => None,
        }
    }

    /// Insert a new node under a fresh id derived from `seed`.
    pub(crate) fn insert<T: TypedId>(&mut self, seed: &str, node: Node) -> T {
        debug_assert!(T::ISAS.contains(&node.isa()));
        let id = self.allocate(seed);
        self.nodes.insert(id.clone(), node);
        T::mint(id)
    }

    /// Insert a node of a class the graph does not model.
    pub(crate) fn insert_opaque(&mut self, seed: &str, node: OpaqueNode) -> ObjectId {
        let id = self.allocate(seed);
        self.nodes.insert(id.clone(), Node::Other(node));
        id
    }

    fn allocate(&self, seed: &str) -> ObjectId {
        let seed = format!("{}|{seed}", self.root);
        let mut attempt = 0;
        loop {
            let id = derive_id(&seed, attempt);
            if !self.nodes.contains_key(&id) {
                return id;
            }
            attempt += 1;
        }
    }

    /// Reference comments, as Xcode writes them after object ids.
    pub fn comments(&self) -> CommentTable {
        let mut phase_of: HashMap<&ObjectId, &str> = HashMap::new();
        let mut list_owner: HashMap<&ObjectId, (&str, String)> = HashMap::new();
        for (id, node) in &self.nodes {
            match node {
                Node::BuildPhase(p) => {
                    for file in &p.files {
                        phase_of.insert(file.object_id(), p.display_name());
                    }
                }
                Node::Target(t) => {
                    list_owner.insert(
                        t.build_configuration_list.object_id(),
                        (t.class.isa(), t.name.as_str().to_string()),
                    );
                }
                Node::Project(p) if id == self.root.object_id() => {
                    let name = self.display_name().unwrap_or_default().to_string();
                    list_owner.insert(p.build_configuration_list.object_id(), ("PBXProject", name));
                }
                _ => {}
            }
        }

        let mut names = HashMap::with_capacity(self.nodes.len());
        for (id, node) in &self.nodes {
            let comment = match node {
                Node::BuildFile(b) => {
                    let file = b
                        .file_ref
                        .as_ref()
                        .and_then(|f| self.item_name(f))
                        .unwrap_or("(null)");
                    match phase_of.get(id) {
                        Some(phase) => Some(format!("{file} in {phase}")),
                        None => Some(file.to_string()),
                    }
                }
                Node::FileReference(_) | Node::Group(_) => self.item_name(id).map(str::to_string),
                Node::Target(t) => Some(t.name.as_str().to_string()),
                Node::BuildPhase(p) => Some(p.display_name().to_string()),
                Node::BuildConfiguration(c) => Some(c.name.as_str().to_string()),
                Node::ConfigurationList(_) => list_owner
                    .get(id)
                    .map(|(isa, owner)| format!("Build configuration list for {isa} \"{owner}\"")),
                Node::Project(_) => Some("Project object".to_string()),
                Node::TargetDependency(_) => Some("PBXTargetDependency".to_string()),
                Node::Other(o) => Some(
                    o.display_name()
                        .map(str::to_string)
                        .unwrap_or_else(|| o.isa.clone()),
                ),
            };
            if let Some(comment) = comment {
                names.insert(id.as_str().to_string(), comment);
            }
        }
        CommentTable { names }
    }
}

/// Comments for object ids, fed to the manifest writer.
#[derive(Debug, Clone, Default)]
pub struct CommentTable {
    names: HashMap<String, String>,
}

impl CommentTable {
    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }
}

impl Annotator for CommentTable {
    fn annotate(&self, id: &str) -> Option<String> {
        self.names.get(id).cloned()
    }
}

/// Turns raw object dictionaries into typed nodes.
struct Loader<'a> {
    classes: &'a HashMap<String, String>,
}

impl Loader<'_> {
    fn reference<T: TypedId>(&self, owner: &str, key: &'static str, id: &ObjectId) -> Result<T, GraphError> {
        match self.classes.get(id.as_str()) {
            None => Err(GraphError::DanglingReference {
                owner: owner.to_string(),
                key,
                id: id.to_string(),
            }),
            Some(isa) if T::ISAS.contains(&isa.as_str()) => Ok(T::mint(id.clone())),
            Some(isa) => Err(GraphError::WrongKind {
                owner: owner.to_string(),
                key,
                id: id.to_string(),
                expected: T::KIND,
                found: isa.clone(),
            }),
        }
    }

    fn untyped(&self, owner: &str, key: &'static str, id: ObjectId) -> Result<ObjectId, GraphError> {
        if self.classes.contains_key(id.as_str()) {
            Ok(id)
        } else {
            Err(GraphError::DanglingReference {
                owner: owner.to_string(),
                key,
                id: id.to_string(),
            })
        }
    }

    fn node(&self, id: &str, mut fields: Dict) -> Result<Node, GraphError> {
        let isa = match fields.shift_remove("isa") {
            Some(Value::String(s)) => s.into_string(),
            _ => {
                return Err(GraphError::MissingField {
                    id: id.to_string(),
                    isa: "?".to_string(),
                    key: "isa",
                });
            }
        };
        let mut f = Fields { id, isa: &isa, fields };

        let node = if let Some(class) = TargetClass::from_isa(&isa) {
            Node::Target(Target {
                class,
                name: f.required_string("name")?,
                product_name: f.string("productName")?,
                product_type: f.string("productType")?,
                product_reference: f
                    .id("productReference")?
                    .map(|r| self.reference(id, "productReference", &r))
                    .transpose()?,
                build_phases: self.references(id, "buildPhases", f.ids("buildPhases")?)?,
                build_configuration_list: self.reference(
                    id,
                    "buildConfigurationList",
                    &f.required_id("buildConfigurationList")?,
                )?,
                dependencies: self.references(id, "dependencies", f.ids("dependencies")?)?,
                extra: f.fields,
            })
        } else if let Some(kind) = PhaseKind::from_isa(&isa) {
            Node::BuildPhase(BuildPhase {
                kind,
                name: f.string("name")?,
                files: self.references(id, "files", f.ids("files")?)?,
                extra: f.fields,
            })
        } else {
            match isa.as_str() {
                "PBXBuildFile" => Node::BuildFile(BuildFile {
                    file_ref: f
                        .id("fileRef")?
                        .map(|r| self.untyped(id, "fileRef", r))
                        .transpose()?,
                    extra: f.fields,
                }),
                "PBXFileReference" => Node::FileReference(FileReference {
                    name: f.string("name")?,
                    path: f.string("path")?,
                    source_tree: f.string("sourceTree")?,
                    extra: f.fields,
                }),
                "PBXGroup" => Node::Group(Group {
                    children: f
                        .ids("children")?
                        .into_iter()
                        .map(|c| self.untyped(id, "children", c))
                        .collect::<Result<_, _>>()?,
                    name: f.string("name")?,
                    path: f.string("path")?,
                    source_tree: f.string("sourceTree")?,
                    extra: f.fields,
                }),
                "XCBuildConfiguration" => Node::BuildConfiguration(BuildConfiguration {
                    name: f.required_string("name")?,
                    build_settings: f.dict("buildSettings")?,
                    extra: f.fields,
                }),
                "XCConfigurationList" => Node::ConfigurationList(ConfigurationList {
                    build_configurations: self.references(
                        id,
                        "buildConfigurations",
                        f.ids("buildConfigurations")?,
                    )?,
                    default_name: f.string("defaultConfigurationName")?,
                    extra: f.fields,
                }),
                "PBXProject" => Node::Project(Project {
                    main_group: self.reference(id, "mainGroup", &f.required_id("mainGroup")?)?,
                    product_ref_group: f
                        .id("productRefGroup")?
                        .map(|r| self.reference(id, "productRefGroup", &r))
                        .transpose()?,
                    build_configuration_list: self.reference(
                        id,
                        "buildConfigurationList",
                        &f.required_id("buildConfigurationList")?,
                    )?,
                    targets: self.references(id, "targets", f.ids("targets")?)?,
                    extra: f.fields,
                }),
                "PBXTargetDependency" => Node::TargetDependency(TargetDependency {
                    target: f
                        .id("target")?
                        .map(|r| self.reference(id, "target", &r))
                        .transpose()?,
                    target_proxy: f
                        .id("targetProxy")?
                        .map(|r| self.untyped(id, "targetProxy", r))
                        .transpose()?,
                    extra: f.fields,
                }),
                _ => Node::Other(OpaqueNode {
                    isa: isa.clone(),
                    fields: f.fields,
                }),
            }
        };
        Ok(node)
    }

    fn references<T: TypedId>(
        &self,
        owner: &str,
        key: &'static str,
        ids: Vec<ObjectId>,
    ) -> Result<Vec<T>, GraphError> {
        ids.iter().map(|id| self.reference(owner, key, id)).collect()
    }
}

/// Field extraction from one raw object; whatever is not taken stays extra.
struct Fields<'a> {
    id: &'a str,
    isa: &'a str,
    fields: Dict,
}

impl Fields<'_> {
    fn wrong(&self, key: &'static str, expected: &'static str) -> GraphError {
        GraphError::WrongType {
            id: self.id.to_string(),
            key,
            expected,
        }
    }

    fn missing(&self, key: &'static str) -> GraphError {
        GraphError::MissingField {
            id: self.id.to_string(),
            isa: self.isa.to_string(),
            key,
        }
    }

    fn string(&mut self, key: &'static str) -> Result<Option<PbxString>, GraphError> {
        match self.fields.shift_remove(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(self.wrong(key, "a string")),
        }
    }

    fn required_string(&mut self, key: &'static str) -> Result<PbxString, GraphError> {
        self.string(key)?.ok_or_else(|| self.missing(key))
    }

    fn id(&mut self, key: &'static str) -> Result<Option<ObjectId>, GraphError> {
        Ok(self.string(key)?.map(|s| ObjectId::new(s.into_string())))
    }

    fn required_id(&mut self, key: &'static str) -> Result<ObjectId, GraphError> {
        self.id(key)?.ok_or_else(|| self.missing(key))
    }

    fn ids(&mut self, key: &'static str) -> Result<Vec<ObjectId>, GraphError> {
        match self.fields.shift_remove(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(ObjectId::new(s.into_string())),
                    _ => Err(self.wrong(key, "a list of object ids")),
                })
                .collect(),
            Some(_) => Err(self.wrong(key, "a list of object ids")),
        }
    }

    fn dict(&mut self, key: &'static str) -> Result<Dict, GraphError> {
        match self.fields.shift_remove(key) {
            None => Ok(Dict::new()),
            Some(Value::Dict(d)) => Ok(d),
            Some(_) => Err(self.wrong(key, "a dictionary")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MINIMAL: &str = r#"// !$*UTF8*$!
{
	archiveVersion = 1;
	classes = {
	};
	objectVersion = 46;
	objects = {
		AA0000000000000000000001 = {isa = PBXProject; buildConfigurationList = AA0000000000000000000002; mainGroup = AA0000000000000000000003; targets = (); };
		AA0000000000000000000002 = {isa = XCConfigurationList; buildConfigurations = (); };
		AA0000000000000000000003 = {isa = PBXGroup; children = (); sourceTree = "<group>"; };
	};
	rootObject = AA0000000000000000000001;
}
"#;

    #[test]
    fn loads_minimal_project() {
        let graph = ProjectGraph::parse(MINIMAL).unwrap();
        assert_eq!(graph.len(), 3);
        let project = graph.project().unwrap();
        assert_eq!(project.main_group.as_str(), "AA0000000000000000000003");
        assert!(project.targets.is_empty());
    }

    #[test]
    fn rejects_dangling_reference() {
        let text = MINIMAL.replace(
            "children = ();",
            "children = (BB0000000000000000000009);",
        );
        let err = ProjectGraph::parse(&text).unwrap_err();
        assert!(matches!(
            err,
            GraphError::DanglingReference { key: "children", .. }
        ));
    }

    #[test]
    fn rejects_reference_to_wrong_kind() {
        let text = MINIMAL.replace(
            "mainGroup = AA0000000000000000000003",
            "mainGroup = AA0000000000000000000002",
        );
        let err = ProjectGraph::parse(&text).unwrap_err();
        match err {
            GraphError::WrongKind { key, found, .. } => {
                assert_eq!(key, "mainGroup");
                assert_eq!(found, "XCConfigurationList");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_root_object_is_reported() {
        let text = MINIMAL.replace("\trootObject = AA0000000000000000000001;\n", "");
        assert!(matches!(
            ProjectGraph::parse(&text).unwrap_err(),
            GraphError::MissingRootKey { key: "rootObject" }
        ));
    }

    #[test]
    fn typed_checks_node_class() {
        let graph = ProjectGraph::parse(MINIMAL).unwrap();
        let id = ObjectId::new("AA0000000000000000000003");
        assert!(graph.typed::<GroupId>(&id).is_some());
        assert!(graph.typed::<TargetId>(&id).is_none());
        assert!(graph.typed::<GroupId>(&ObjectId::new("nope")).is_none());
    }

    #[test]
    fn allocated_ids_are_fresh_and_deterministic() {
        let mut a = ProjectGraph::parse(MINIMAL).unwrap();
        let mut b = ProjectGraph::parse(MINIMAL).unwrap();
        let ga: GroupId = a.insert("group|X", Node::Group(Group::default()));
        let gb: GroupId = b.insert("group|X", Node::Group(Group::default()));
        assert_eq!(ga, gb);
        let again: GroupId = a.insert("group|X", Node::Group(Group::default()));
        assert_ne!(ga, again);
        assert_eq!(ga.as_str().len(), 24);
    }

    #[test]
    fn unknown_fields_survive_reserialization() {
        let text = MINIMAL.replace(
            "sourceTree = \"<group>\"; };",
            "sourceTree = \"<group>\"; usesTabs = 1; };",
        );
        let graph = ProjectGraph::parse(&text).unwrap();
        let out = graph.to_pbxproj();
        assert!(out.contains("usesTabs = 1;"));
        assert!(out.contains("rootObject = AA0000000000000000000001 /* Project object */;"));
    }
}
