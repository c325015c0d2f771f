//! File-level edits around the manifest patch.
//!
//! Responsibilities:
//! - Plan the copy of the plugin's extension folder, with tokens substituted.
//! - List the extension's candidate files.
//! - Generate a unified diff preview and back up the manifest.

pub mod error;

mod copy;
mod patch;
mod tokens;

pub use copy::{CopyPlan, PlannedWrite, list_candidates, plan_extension_copy};
pub use error::{EditError, EditResult, LayoutError};
pub use patch::{backup_file, render_patch, sha256_hex};
pub use tokens::{
    BUNDLE_IDENTIFIER, BUNDLE_SHORT_VERSION_STRING, BUNDLE_VERSION,
    DEFAULT_UNIFORM_TYPE_IDENTIFIER, DEFAULT_URL_SCHEME, DISPLAY_NAME, GROUP_IDENTIFIER,
    TokenTable, TokenValues, UNIFORM_TYPE_IDENTIFIER, URL_SCHEME,
};
