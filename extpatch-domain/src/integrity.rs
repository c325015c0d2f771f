//! Referential integrity checks over a (possibly mutated) graph.

use crate::error::GraphError;
use crate::graph::ProjectGraph;
use crate::ids::{ObjectId, TypedId};
use crate::model::Node;
use std::collections::HashMap;
use std::fmt;

/// One broken invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityIssue {
    pub owner: ObjectId,
    pub field: &'static str,
    pub problem: String,
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`: {}", self.owner, self.field, self.problem)
    }
}

/// Collect every dangling or mis-typed reference, plus groups linked under
/// more than one parent and phases shared between targets.
pub fn check(graph: &ProjectGraph) -> Vec<IntegrityIssue> {
    let mut checker = Checker {
        graph,
        issues: Vec::new(),
    };
    let mut parents: HashMap<&ObjectId, Vec<&ObjectId>> = HashMap::new();
    let mut phase_owners: HashMap<&ObjectId, Vec<&ObjectId>> = HashMap::new();

    for (id, node) in graph.nodes() {
        match node {
            Node::BuildFile(b) => {
                if let Some(file) = &b.file_ref {
                    checker.exists(id, "fileRef", file);
                }
            }
            Node::Group(g) => {
                for child in &g.children {
                    checker.exists(id, "children", child);
                    if matches!(graph.node(child), Some(Node::Group(_))) {
                        parents.entry(child).or_default().push(id);
                    }
                }
            }
            Node::Target(t) => {
                checker.typed(id, "buildConfigurationList", &t.build_configuration_list);
                checker.all(id, "buildPhases", &t.build_phases);
                checker.all(id, "dependencies", &t.dependencies);
                if let Some(product) = &t.product_reference {
                    checker.typed(id, "productReference", product);
                }
                for phase in &t.build_phases {
                    phase_owners.entry(phase.object_id()).or_default().push(id);
                }
            }
            Node::BuildPhase(p) => checker.all(id, "files", &p.files),
            Node::ConfigurationList(l) => {
                checker.all(id, "buildConfigurations", &l.build_configurations)
            }
            Node::Project(p) => {
                checker.typed(id, "mainGroup", &p.main_group);
                checker.typed(id, "buildConfigurationList", &p.build_configuration_list);
                checker.all(id, "targets", &p.targets);
                if let Some(products) = &p.product_ref_group {
                    checker.typed(id, "productRefGroup", products);
                }
            }
            Node::TargetDependency(d) => {
                if let Some(target) = &d.target {
                    checker.typed(id, "target", target);
                }
                if let Some(proxy) = &d.target_proxy {
                    checker.exists(id, "targetProxy", proxy);
                }
            }
            Node::BuildConfiguration(_) | Node::FileReference(_) | Node::Other(_) => {}
        }
    }

    let mut issues = checker.issues;
    for (group, owners) in parents {
        if owners.len() > 1 {
            issues.push(IntegrityIssue {
                owner: group.clone(),
                field: "children",
                problem: format!("group is linked under {} parents", owners.len()),
            });
        }
    }
    for (phase, owners) in phase_owners {
        if owners.len() > 1 {
            issues.push(IntegrityIssue {
                owner: phase.clone(),
                field: "buildPhases",
                problem: format!("phase is owned by {} targets", owners.len()),
            });
        }
    }
    issues.sort_by(|a, b| a.owner.cmp(&b.owner).then(a.field.cmp(b.field)));
    issues
}

/// [`check`], failing on the first issue found.
pub fn ensure(graph: &ProjectGraph) -> Result<(), GraphError> {
    let issues = check(graph);
    match issues.first() {
        None => Ok(()),
        Some(first) => Err(GraphError::Integrity {
            count: issues.len(),
            first: first.to_string(),
        }),
    }
}

struct Checker<'a> {
    graph: &'a ProjectGraph,
    issues: Vec<IntegrityIssue>,
}

impl Checker<'_> {
    fn exists(&mut self, owner: &ObjectId, field: &'static str, id: &ObjectId) {
        if self.graph.node(id).is_none() {
            self.issues.push(IntegrityIssue {
                owner: owner.clone(),
                field,
                problem: format!("missing object {id}"),
            });
        }
    }

    fn typed<T: TypedId>(&mut self, owner: &ObjectId, field: &'static str, id: &T) {
        let problem = match self.graph.node(id.object_id()) {
            None => format!("missing object {}", id.object_id()),
            Some(node) if T::ISAS.contains(&node.isa()) => return,
            Some(node) => format!("{} is a {}, expected a {}", id.object_id(), node.isa(), T::KIND),
        };
        self.issues.push(IntegrityIssue {
            owner: owner.clone(),
            field,
            problem,
        });
    }

    fn all<T: TypedId>(&mut self, owner: &ObjectId, field: &'static str, ids: &[T]) {
        for id in ids {
            self.typed(owner, field, id);
        }
    }
}
