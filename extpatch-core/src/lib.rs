//! Embeddable core library for extpatch.
//!
//! Provides a clap-free entry point suitable for linking into a Cordova hook
//! runner or other host process.
//!
//! # Port traits
//!
//! Writes are abstracted behind [`WritePort`](ports::WritePort). The
//! [`adapters`] module provides a filesystem implementation and an in-memory
//! one for tests.
//!
//! # Entry points
//!
//! - [`run_add_target`](pipeline::run_add_target) patch the Xcode project
//! - [`run_copy_extension`](pipeline::run_copy_extension) copy the extension folder
//! - [`run_install`](pipeline::run_install) both, in that order

pub mod adapters;
pub mod discover;
pub mod error;
pub mod identity;
pub mod pipeline;
pub mod ports;
pub mod settings;

pub use error::{InputError, ToolError};
pub use pipeline::{RunOutcome, run_add_target, run_copy_extension, run_install, write_artifacts};
pub use settings::ExtensionSettings;

// Re-export report types so embedders don't need extpatch-types directly.
pub use extpatch_types::event::PatchEvent;
pub use extpatch_types::report::{PatchReport, ReportToolInfo};
