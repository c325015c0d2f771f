//! Typed node records of the project graph.
//!
//! Each record models the fields the mutation engine reads or writes and
//! keeps everything else in `extra`, so a loaded node serializes back to the
//! same object.

use crate::ids::{
    BuildFileId, ConfigId, ConfigListId, DependencyId, FileRefId, GroupId, ObjectId, PhaseId,
    TargetId, TypedId,
};
use extpatch_pbx::{Dict, PbxString, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    BuildFile(BuildFile),
    FileReference(FileReference),
    Group(Group),
    Target(Target),
    BuildPhase(BuildPhase),
    BuildConfiguration(BuildConfiguration),
    ConfigurationList(ConfigurationList),
    Project(Project),
    TargetDependency(TargetDependency),
    Other(OpaqueNode),
}

impl Node {
    pub fn isa(&self) -> &str {
        match self {
            Node::BuildFile(_) => "PBXBuildFile",
            Node::FileReference(_) => "PBXFileReference",
            Node::Group(_) => "PBXGroup",
            Node::Target(t) => t.class.isa(),
            Node::BuildPhase(p) => p.kind.isa(),
            Node::BuildConfiguration(_) => "XCBuildConfiguration",
            Node::ConfigurationList(_) => "XCConfigurationList",
            Node::Project(_) => "PBXProject",
            Node::TargetDependency(_) => "PBXTargetDependency",
            Node::Other(o) => &o.isa,
        }
    }

    /// Object dictionary in Xcode key order: `isa` first, the rest sorted.
    pub fn to_dict(&self) -> Dict {
        let mut w = ObjectWriter::default();
        let extra = match self {
            Node::BuildFile(n) => {
                w.opt_id("fileRef", n.file_ref.as_ref());
                &n.extra
            }
            Node::FileReference(n) => {
                w.opt_string("name", n.name.as_ref());
                w.opt_string("path", n.path.as_ref());
                w.opt_string("sourceTree", n.source_tree.as_ref());
                &n.extra
            }
            Node::Group(n) => {
                w.ids("children", n.children.iter());
                w.opt_string("name", n.name.as_ref());
                w.opt_string("path", n.path.as_ref());
                w.opt_string("sourceTree", n.source_tree.as_ref());
                &n.extra
            }
            Node::Target(n) => {
                w.id("buildConfigurationList", n.build_configuration_list.object_id());
                w.ids("buildPhases", n.build_phases.iter().map(TypedId::object_id));
                w.ids("dependencies", n.dependencies.iter().map(TypedId::object_id));
                w.string("name", &n.name);
                w.opt_string("productName", n.product_name.as_ref());
                w.opt_id(
                    "productReference",
                    n.product_reference.as_ref().map(TypedId::object_id),
                );
                w.opt_string("productType", n.product_type.as_ref());
                &n.extra
            }
            Node::BuildPhase(n) => {
                w.ids("files", n.files.iter().map(TypedId::object_id));
                w.opt_string("name", n.name.as_ref());
                &n.extra
            }
            Node::BuildConfiguration(n) => {
                w.value("buildSettings", Value::Dict(n.build_settings.clone()));
                w.string("name", &n.name);
                &n.extra
            }
            Node::ConfigurationList(n) => {
                w.ids(
                    "buildConfigurations",
                    n.build_configurations.iter().map(TypedId::object_id),
                );
                w.opt_string("defaultConfigurationName", n.default_name.as_ref());
                &n.extra
            }
            Node::Project(n) => {
                w.id("buildConfigurationList", n.build_configuration_list.object_id());
                w.id("mainGroup", n.main_group.object_id());
                w.opt_id(
                    "productRefGroup",
                    n.product_ref_group.as_ref().map(TypedId::object_id),
                );
                w.ids("targets", n.targets.iter().map(TypedId::object_id));
                &n.extra
            }
            Node::TargetDependency(n) => {
                w.opt_id("target", n.target.as_ref().map(TypedId::object_id));
                w.opt_id("targetProxy", n.target_proxy.as_ref());
                &n.extra
            }
            Node::Other(n) => &n.fields,
        };
        w.finish(self.isa(), extra)
    }
}

#[derive(Default)]
struct ObjectWriter {
    fields: BTreeMap<String, Value>,
}

impl ObjectWriter {
    fn value(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }

    fn string(&mut self, key: &str, s: &PbxString) {
        self.value(key, Value::String(s.clone()));
    }

    fn opt_string(&mut self, key: &str, s: Option<&PbxString>) {
        if let Some(s) = s {
            self.string(key, s);
        }
    }

    fn id(&mut self, key: &str, id: &ObjectId) {
        self.value(key, Value::string(id.as_str()));
    }

    fn opt_id(&mut self, key: &str, id: Option<&ObjectId>) {
        if let Some(id) = id {
            self.id(key, id);
        }
    }

    fn ids<'a>(&mut self, key: &str, ids: impl Iterator<Item = &'a ObjectId>) {
        let items = ids.map(|id| Value::string(id.as_str())).collect();
        self.value(key, Value::Array(items));
    }

    fn finish(mut self, isa: &str, extra: &Dict) -> Dict {
        for (key, value) in extra {
            self.fields
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        let mut out = Dict::with_capacity(self.fields.len() + 1);
        out.insert("isa".to_string(), Value::string(isa));
        out.extend(self.fields);
        out
    }
}

/// Membership of one file in one build phase.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BuildFile {
    /// A file reference, variant group or version group.
    pub file_ref: Option<ObjectId>,
    pub extra: Dict,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileReference {
    pub name: Option<PbxString>,
    pub path: Option<PbxString>,
    pub source_tree: Option<PbxString>,
    pub extra: Dict,
}

impl FileReference {
    /// Name shown in the project navigator: `name`, else the last component
    /// of `path`.
    pub fn display_name(&self) -> Option<&str> {
        display_name(self.name.as_ref(), self.path.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    /// Files, nested groups and variant groups.
    pub children: Vec<ObjectId>,
    pub name: Option<PbxString>,
    pub path: Option<PbxString>,
    pub source_tree: Option<PbxString>,
    pub extra: Dict,
}

impl Group {
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_ref()
            .or(self.path.as_ref())
            .map(PbxString::as_str)
    }
}

pub(crate) fn display_name<'a>(
    name: Option<&'a PbxString>,
    path: Option<&'a PbxString>,
) -> Option<&'a str> {
    if let Some(name) = name {
        return Some(name.as_str());
    }
    let path = path?.as_str();
    Some(path.rsplit('/').next().unwrap_or(path))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetClass {
    Native,
    Aggregate,
    Legacy,
}

impl TargetClass {
    pub fn isa(self) -> &'static str {
        match self {
            TargetClass::Native => "PBXNativeTarget",
            TargetClass::Aggregate => "PBXAggregateTarget",
            TargetClass::Legacy => "PBXLegacyTarget",
        }
    }

    pub fn from_isa(isa: &str) -> Option<Self> {
        match isa {
            "PBXNativeTarget" => Some(TargetClass::Native),
            "PBXAggregateTarget" => Some(TargetClass::Aggregate),
            "PBXLegacyTarget" => Some(TargetClass::Legacy),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub class: TargetClass,
    pub name: PbxString,
    pub product_name: Option<PbxString>,
    pub product_type: Option<PbxString>,
    pub product_reference: Option<FileRefId>,
    pub build_phases: Vec<PhaseId>,
    pub build_configuration_list: ConfigListId,
    pub dependencies: Vec<DependencyId>,
    pub extra: Dict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Sources,
    Resources,
    Frameworks,
    CopyFiles,
    ShellScript,
    Headers,
    Rez,
}

impl PhaseKind {
    pub fn isa(self) -> &'static str {
        match self {
            PhaseKind::Sources => "PBXSourcesBuildPhase",
            PhaseKind::Resources => "PBXResourcesBuildPhase",
            PhaseKind::Frameworks => "PBXFrameworksBuildPhase",
            PhaseKind::CopyFiles => "PBXCopyFilesBuildPhase",
            PhaseKind::ShellScript => "PBXShellScriptBuildPhase",
            PhaseKind::Headers => "PBXHeadersBuildPhase",
            PhaseKind::Rez => "PBXRezBuildPhase",
        }
    }

    pub fn from_isa(isa: &str) -> Option<Self> {
        match isa {
            "PBXSourcesBuildPhase" => Some(PhaseKind::Sources),
            "PBXResourcesBuildPhase" => Some(PhaseKind::Resources),
            "PBXFrameworksBuildPhase" => Some(PhaseKind::Frameworks),
            "PBXCopyFilesBuildPhase" => Some(PhaseKind::CopyFiles),
            "PBXShellScriptBuildPhase" => Some(PhaseKind::ShellScript),
            "PBXHeadersBuildPhase" => Some(PhaseKind::Headers),
            "PBXRezBuildPhase" => Some(PhaseKind::Rez),
            _ => None,
        }
    }

    /// Name Xcode shows for an unnamed phase of this kind.
    pub fn default_name(self) -> &'static str {
        match self {
            PhaseKind::Sources => "Sources",
            PhaseKind::Resources => "Resources",
            PhaseKind::Frameworks => "Frameworks",
            PhaseKind::CopyFiles => "CopyFiles",
            PhaseKind::ShellScript => "ShellScript",
            PhaseKind::Headers => "Headers",
            PhaseKind::Rez => "Rez",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildPhase {
    pub kind: PhaseKind,
    pub name: Option<PbxString>,
    pub files: Vec<BuildFileId>,
    pub extra: Dict,
}

impl BuildPhase {
    pub fn display_name(&self) -> &str {
        self.name
            .as_ref()
            .map(PbxString::as_str)
            .unwrap_or(self.kind.default_name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfiguration {
    pub name: PbxString,
    pub build_settings: Dict,
    pub extra: Dict,
}

impl BuildConfiguration {
    pub fn setting(&self, key: &str) -> Option<&PbxString> {
        self.build_settings.get(key).and_then(Value::as_pbx_string)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationList {
    pub build_configurations: Vec<ConfigId>,
    pub default_name: Option<PbxString>,
    pub extra: Dict,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub main_group: GroupId,
    pub product_ref_group: Option<GroupId>,
    pub build_configuration_list: ConfigListId,
    pub targets: Vec<TargetId>,
    pub extra: Dict,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TargetDependency {
    pub target: Option<TargetId>,
    /// A `PBXContainerItemProxy`.
    pub target_proxy: Option<ObjectId>,
    pub extra: Dict,
}

/// A node of a class the engine does not model; kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueNode {
    pub isa: String,
    /// Every field except `isa`.
    pub fields: Dict,
}

impl OpaqueNode {
    pub fn display_name(&self) -> Option<&str> {
        let name = self.fields.get("name").and_then(Value::as_pbx_string);
        let path = self.fields.get("path").and_then(Value::as_pbx_string);
        display_name(name, path)
    }
}
