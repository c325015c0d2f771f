//! Error types for extpatch-edit.
//!
//! This module defines error types that distinguish between:
//! - Layout errors (exit code 2): the Cordova project is missing a folder we need
//! - Runtime errors (exit code 1): I/O errors, invalid file names

use camino::Utf8PathBuf;
use thiserror::Error;

/// The top-level error type for extpatch-edit operations.
#[derive(Debug, Error)]
pub enum EditError {
    /// The project layout does not have what we need (exit code 2).
    #[error("unsupported project layout: {0}")]
    Layout(#[from] LayoutError),

    /// A runtime/tool error occurred (exit code 1).
    #[error("runtime error: {0}")]
    Runtime(#[from] anyhow::Error),
}

/// Missing inputs that should result in exit code 2.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The plugin's extension folder is not there to copy from.
    #[error("missing extension project folder in {path}")]
    SourceFolderMissing { path: Utf8PathBuf },

    /// The copied extension folder is not there to list.
    #[error("missing extension folder {path}")]
    ExtensionFolderMissing { path: Utf8PathBuf },
}

impl EditError {
    /// Returns true if this is a layout error (exit code 2).
    pub fn is_layout_error(&self) -> bool {
        matches!(self, EditError::Layout(_))
    }

    /// Returns the recommended exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            EditError::Layout(_) => 2,
            EditError::Runtime(_) => 1,
        }
    }
}

/// Result type alias using EditError.
pub type EditResult<T> = Result<T, EditError>;
