//! Pipeline errors. Exit code 2 = unsupported project layout, 1 = tool error.

use camino::Utf8PathBuf;
use extpatch_domain::GraphError;
use extpatch_edit::EditError;
use thiserror::Error;

/// Required inputs that are missing or ambiguous.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("missing iOS platform folder {path}")]
    IosFolderMissing { path: Utf8PathBuf },

    #[error("could not find an .xcodeproj folder in: {dir}")]
    ProjectMissing { dir: Utf8PathBuf },

    #[error("found {} .xcodeproj folders in {dir}: {}", .found.len(), .found.join(", "))]
    ProjectAmbiguous { dir: Utf8PathBuf, found: Vec<String> },

    #[error("missing project manifest {path}")]
    ManifestMissing { path: Utf8PathBuf },

    #[error("missing required file {path}")]
    FileMissing { path: Utf8PathBuf },

    #[error("{path} has no {what}")]
    IdentifierMissing { path: Utf8PathBuf, what: &'static str },
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    /// True when the project does not have the shape a run needs.
    pub fn is_layout_error(&self) -> bool {
        match self {
            ToolError::Input(_) => true,
            ToolError::Graph(err) => err.is_layout_error(),
            ToolError::Edit(err) => err.is_layout_error(),
            ToolError::Internal(_) => false,
        }
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_layout_error() { 2 } else { 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_projects_are_listed() {
        let err = ToolError::from(InputError::ProjectAmbiguous {
            dir: "platforms/ios".into(),
            found: vec!["A.xcodeproj".to_string(), "B.xcodeproj".to_string()],
        });
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.to_string(),
            "found 2 .xcodeproj folders in platforms/ios: A.xcodeproj, B.xcodeproj"
        );
    }

    #[test]
    fn missing_parent_group_is_a_layout_error() {
        let err = ToolError::from(GraphError::ParentGroupMissing {
            parent: "CustomTemplate".to_string(),
            group: "ShareExtension".to_string(),
        });
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn internal_errors_exit_1() {
        let err = ToolError::from(anyhow::anyhow!("disk full"));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "disk full");
    }
}
