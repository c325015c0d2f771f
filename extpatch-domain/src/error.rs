//! Error types for extpatch-domain.
//!
//! Errors fall in two groups:
//! - Layout errors: the host project lacks something the workflow requires
//!   (a parent group, a project object). The caller maps these to exit code 2.
//! - Everything else: malformed objects, broken references or misuse of the
//!   constructors.

use extpatch_pbx::ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("manifest does not parse: {0}")]
    Parse(#[from] ParseError),

    #[error("manifest root is not a dictionary")]
    RootNotDict,

    #[error("manifest has no `{key}` entry")]
    MissingRootKey { key: &'static str },

    #[error("object {id} is not a dictionary")]
    NotAnObject { id: String },

    #[error("object {id} ({isa}) is missing `{key}`")]
    MissingField {
        id: String,
        isa: String,
        key: &'static str,
    },

    #[error("object {id}: `{key}` should be {expected}")]
    WrongType {
        id: String,
        key: &'static str,
        expected: &'static str,
    },

    #[error("object {owner}: `{key}` points at missing object {id}")]
    DanglingReference {
        owner: String,
        key: &'static str,
        id: String,
    },

    #[error("object {owner}: `{key}` points at {id}, a {found}, expected a {expected}")]
    WrongKind {
        owner: String,
        key: &'static str,
        id: String,
        expected: &'static str,
        found: String,
    },

    #[error("no {kind} with id {id} in this graph")]
    UnknownId { kind: &'static str, id: String },

    #[error("a target named {name} already exists")]
    TargetExists { name: String },

    #[error("a group named {name} already exists")]
    GroupExists { name: String },

    #[error("cannot place group {group}: parent group {parent} not found in the project")]
    ParentGroupMissing { parent: String, group: String },

    #[error("graph integrity check failed ({count} issue(s)); first: {first}")]
    Integrity { count: usize, first: String },
}

impl GraphError {
    /// True when the host project layout is unsupported rather than broken.
    pub fn is_layout_error(&self) -> bool {
        matches!(
            self,
            GraphError::ParentGroupMissing { .. } | GraphError::MissingRootKey { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_group_missing_names_both_groups() {
        let err = GraphError::ParentGroupMissing {
            parent: "CustomTemplate".to_string(),
            group: "ShareExtension".to_string(),
        };
        assert!(err.is_layout_error());
        let msg = err.to_string();
        assert!(msg.contains("CustomTemplate"));
        assert!(msg.contains("ShareExtension"));
    }

    #[test]
    fn reference_errors_are_not_layout_errors() {
        let err = GraphError::DanglingReference {
            owner: "A".to_string(),
            key: "children",
            id: "B".to_string(),
        };
        assert!(!err.is_layout_error());
        assert!(err.to_string().contains("missing object B"));
    }
}
