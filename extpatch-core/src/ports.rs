//! Port traits abstracting writes away from the pipeline.
//!
//! Reads go straight to the filesystem: a run only ever reads the Cordova
//! project it was pointed at, while every write is routed through
//! [`WritePort`] so dry runs and tests can observe them.

use camino::Utf8Path;

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
