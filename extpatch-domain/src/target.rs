//! Target construction.

use crate::error::GraphError;
use crate::events::EventSink;
use crate::graph::ProjectGraph;
use crate::ids::{
    BuildFileId, ConfigId, ConfigListId, DependencyId, FileRefId, ObjectId, PhaseId, TargetId,
};
use crate::model::{
    BuildConfiguration, BuildFile, BuildPhase, ConfigurationList, FileReference, Node, OpaqueNode,
    PhaseKind, Target, TargetClass, TargetDependency,
};
use crate::resolve::{find_target_by_name, host_target};
use extpatch_pbx::{Dict, PbxString, Value};
use extpatch_types::event::PatchEvent;

/// Copy-files destination for app extensions (`PlugIns`).
const PLUGINS_SUBFOLDER_SPEC: &str = "13";
const EMBED_PHASE_NAME: &str = "Embed App Extensions";
const BUILD_ACTION_MASK: &str = "2147483647";

/// Product kinds the constructor knows how to describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    AppExtension,
    Application,
    Framework,
    Bundle,
    StaticLibrary,
}

impl TargetKind {
    pub fn product_type(self) -> &'static str {
        match self {
            TargetKind::AppExtension => "com.apple.product-type.app-extension",
            TargetKind::Application => "com.apple.product-type.application",
            TargetKind::Framework => "com.apple.product-type.framework",
            TargetKind::Bundle => "com.apple.product-type.bundle",
            TargetKind::StaticLibrary => "com.apple.product-type.library.static",
        }
    }

    fn file_type(self) -> &'static str {
        match self {
            TargetKind::AppExtension => "wrapper.app-extension",
            TargetKind::Application => "wrapper.application",
            TargetKind::Framework => "wrapper.framework",
            TargetKind::Bundle => "wrapper.cfbundle",
            TargetKind::StaticLibrary => "archive.ar",
        }
    }

    fn product_file(self, name: &str) -> String {
        match self {
            TargetKind::AppExtension => format!("{name}.appex"),
            TargetKind::Application => format!("{name}.app"),
            TargetKind::Framework => format!("{name}.framework"),
            TargetKind::Bundle => format!("{name}.bundle"),
            TargetKind::StaticLibrary => format!("lib{name}.a"),
        }
    }

    /// Whether the host application must copy the product into its bundle.
    fn embeds_in_host(self) -> bool {
        matches!(self, TargetKind::AppExtension)
    }
}

/// Keys of a freshly constructed target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTarget {
    pub target: TargetId,
    pub product: FileRefId,
    pub sources: PhaseId,
    pub resources: PhaseId,
}

/// Create `name` as a native target of `kind`, with empty sources and
/// resources phases and Debug/Release configurations whose Info.plist lives
/// under `subfolder`.
///
/// Also registers the target with the project, lists its product in the
/// products group, and for extensions embeds the product into the host
/// target and records the host's dependency on the new target.
pub fn add_target(
    graph: &mut ProjectGraph,
    name: &str,
    kind: TargetKind,
    subfolder: &str,
    sink: &mut dyn EventSink,
) -> Result<NewTarget, GraphError> {
    if find_target_by_name(graph, name).is_some() {
        return Err(GraphError::TargetExists {
            name: name.to_string(),
        });
    }
    let products_group = graph.project()?.product_ref_group.clone();
    let host = host_target(graph);

    let config_list = add_configuration_list(graph, name, subfolder);
    let product: FileRefId = graph.insert(
        &format!("{name}|product"),
        Node::FileReference(product_reference(name, kind)),
    );
    if let Some(group) = products_group {
        graph
            .group_mut(&group)?
            .children
            .push(product.clone().into());
    }

    let sources = add_phase(graph, name, PhaseKind::Sources);
    let resources = add_phase(graph, name, PhaseKind::Resources);

    let target: TargetId = graph.insert(
        &format!("{name}|target"),
        Node::Target(Target {
            class: TargetClass::Native,
            name: PbxString::new(name),
            product_name: Some(PbxString::new(name)),
            product_type: Some(PbxString::quoted(kind.product_type())),
            product_reference: Some(product.clone()),
            build_phases: vec![sources.clone(), resources.clone()],
            build_configuration_list: config_list,
            dependencies: Vec::new(),
            extra: single("buildRules", Value::Array(Vec::new())),
        }),
    );
    graph.project_mut()?.targets.push(target.clone());
    tracing::debug!(target = %target, name, "target node inserted");

    sink.emit(PatchEvent::TargetCreated {
        name: name.to_string(),
        key: target.to_string(),
        phases: vec![sources.to_string(), resources.to_string()],
    });

    if kind.embeds_in_host()
        && let Some(host) = host
    {
        embed_in_host(graph, &host, &target, &product, sink)?;
    }

    Ok(NewTarget {
        target,
        product,
        sources,
        resources,
    })
}

/// Add an empty phase of `kind` to `target`, returning the existing one if
/// the target already owns a phase of that kind.
pub fn ensure_phase(
    graph: &mut ProjectGraph,
    target: &TargetId,
    kind: PhaseKind,
) -> Result<PhaseId, GraphError> {
    if let Some(existing) = crate::resolve::find_phase(graph, target, kind) {
        return Ok(existing);
    }
    let name = graph.target(target)?.name.as_str().to_string();
    let phase = add_phase(graph, &name, kind);
    graph.target_mut(target)?.build_phases.push(phase.clone());
    Ok(phase)
}

fn add_phase(graph: &mut ProjectGraph, target_name: &str, kind: PhaseKind) -> PhaseId {
    let mut extra = Dict::new();
    extra.insert("buildActionMask".to_string(), Value::string(BUILD_ACTION_MASK));
    extra.insert("runOnlyForDeploymentPostprocessing".to_string(), Value::string("0"));
    graph.insert(
        &format!("{target_name}|phase|{}", kind.default_name()),
        Node::BuildPhase(BuildPhase {
            kind,
            name: None,
            files: Vec::new(),
            extra,
        }),
    )
}

fn add_configuration_list(graph: &mut ProjectGraph, name: &str, subfolder: &str) -> ConfigListId {
    let configs: Vec<ConfigId> = ["Debug", "Release"]
        .into_iter()
        .map(|config| {
            graph.insert(
                &format!("{name}|config|{config}"),
                Node::BuildConfiguration(BuildConfiguration {
                    name: PbxString::new(config),
                    build_settings: extension_settings(name, subfolder, config == "Debug"),
                    extra: Dict::new(),
                }),
            )
        })
        .collect();

    graph.insert(
        &format!("{name}|configlist"),
        Node::ConfigurationList(ConfigurationList {
            build_configurations: configs,
            default_name: Some(PbxString::new("Release")),
            extra: single("defaultConfigurationIsVisible", Value::string("0")),
        }),
    )
}

fn extension_settings(name: &str, subfolder: &str, debug: bool) -> Dict {
    let mut settings = Dict::new();
    if debug {
        settings.insert(
            "GCC_PREPROCESSOR_DEFINITIONS".to_string(),
            Value::Array(vec![Value::quoted("DEBUG=1"), Value::quoted("$(inherited)")]),
        );
    }
    settings.insert(
        "INFOPLIST_FILE".to_string(),
        Value::quoted(format!("{subfolder}/{subfolder}-Info.plist")),
    );
    settings.insert(
        "LD_RUNPATH_SEARCH_PATHS".to_string(),
        Value::quoted("$(inherited) @executable_path/Frameworks @executable_path/../../Frameworks"),
    );
    settings.insert("PRODUCT_NAME".to_string(), Value::quoted(name));
    settings.insert("SKIP_INSTALL".to_string(), Value::string("YES"));
    settings
}

fn product_reference(name: &str, kind: TargetKind) -> FileReference {
    let mut extra = Dict::new();
    extra.insert("explicitFileType".to_string(), Value::quoted(kind.file_type()));
    extra.insert("includeInIndex".to_string(), Value::string("0"));
    FileReference {
        name: None,
        path: Some(PbxString::new(kind.product_file(name))),
        source_tree: Some(PbxString::new("BUILT_PRODUCTS_DIR")),
        extra,
    }
}

/// Copy the product into the host's "Embed App Extensions" phase and make
/// the host depend on the new target.
fn embed_in_host(
    graph: &mut ProjectGraph,
    host: &TargetId,
    target: &TargetId,
    product: &FileRefId,
    sink: &mut dyn EventSink,
) -> Result<(), GraphError> {
    let host_name = graph.target(host)?.name.as_str().to_string();
    let target_name = graph.target(target)?.name.as_str().to_string();

    let embed = match embed_phase(graph, host)? {
        Some(phase) => phase,
        None => {
            let mut extra = Dict::new();
            extra.insert("buildActionMask".to_string(), Value::string(BUILD_ACTION_MASK));
            extra.insert("dstPath".to_string(), Value::quoted(""));
            extra.insert(
                "dstSubfolderSpec".to_string(),
                Value::string(PLUGINS_SUBFOLDER_SPEC),
            );
            extra.insert("runOnlyForDeploymentPostprocessing".to_string(), Value::string("0"));
            let phase: PhaseId = graph.insert(
                &format!("{host_name}|embed"),
                Node::BuildPhase(BuildPhase {
                    kind: PhaseKind::CopyFiles,
                    name: Some(PbxString::quoted(EMBED_PHASE_NAME)),
                    files: Vec::new(),
                    extra,
                }),
            );
            graph.target_mut(host)?.build_phases.push(phase.clone());
            phase
        }
    };

    let settings = single(
        "ATTRIBUTES",
        Value::Array(vec![Value::string("RemoveHeadersOnCopy")]),
    );
    let build_file: BuildFileId = graph.insert(
        &format!("{target_name}|embed"),
        Node::BuildFile(BuildFile {
            file_ref: Some(product.clone().into()),
            extra: single("settings", Value::Dict(settings)),
        }),
    );
    graph.phase_mut(&embed)?.files.push(build_file);

    let dependency = add_dependency(graph, target, &target_name)?;
    graph.target_mut(host)?.dependencies.push(dependency);

    sink.emit(PatchEvent::HostEmbedAdded {
        host: host_name,
        product: graph
            .file_ref(product)?
            .display_name()
            .unwrap_or(&target_name)
            .to_string(),
    });
    Ok(())
}

fn embed_phase(graph: &ProjectGraph, host: &TargetId) -> Result<Option<PhaseId>, GraphError> {
    for phase_id in &graph.target(host)?.build_phases {
        let phase = graph.phase(phase_id)?;
        let subfolder = phase.extra.get("dstSubfolderSpec").and_then(Value::as_str);
        if phase.kind == PhaseKind::CopyFiles && subfolder == Some(PLUGINS_SUBFOLDER_SPEC) {
            return Ok(Some(phase_id.clone()));
        }
    }
    Ok(None)
}

fn add_dependency(
    graph: &mut ProjectGraph,
    target: &TargetId,
    target_name: &str,
) -> Result<DependencyId, GraphError> {
    let mut fields = Dict::new();
    fields.insert("containerPortal".to_string(), Value::string(graph.root().as_str()));
    fields.insert("proxyType".to_string(), Value::string("1"));
    fields.insert("remoteGlobalIDString".to_string(), Value::string(target.as_str()));
    fields.insert("remoteInfo".to_string(), Value::string(target_name));
    let proxy: ObjectId = graph.insert_opaque(
        &format!("{target_name}|proxy"),
        OpaqueNode {
            isa: "PBXContainerItemProxy".to_string(),
            fields,
        },
    );

    Ok(graph.insert(
        &format!("{target_name}|dependency"),
        Node::TargetDependency(TargetDependency {
            target: Some(target.clone()),
            target_proxy: Some(proxy),
            extra: Dict::new(),
        }),
    ))
}

fn single(key: &str, value: Value) -> Dict {
    let mut d = Dict::new();
    d.insert(key.to_string(), value);
    d
}
