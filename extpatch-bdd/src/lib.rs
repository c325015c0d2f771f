//! BDD harness (cucumber-rs).
//!
//! Scenarios drive the `extpatch` binary against scratch copies of
//! `tests/fixtures/cordova-ios`; helpers shared by the step definitions
//! live here.

use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;

/// Manifest path of the fixture project, relative to its root.
pub const FIXTURE_MANIFEST: &str = "platforms/ios/HelloCordova.xcodeproj/project.pbxproj";

/// Location of the Cordova fixture inside the workspace.
pub fn fixture_root() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../tests/fixtures/cordova-ios")
}

/// Recursively copy `src` into `dst`.
pub fn copy_tree(src: &Utf8Path, dst: &Utf8Path) -> anyhow::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in src.read_dir_utf8()? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.path().is_dir() {
            copy_tree(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Count the `isa = <kind>;` objects in a pbxproj text.
pub fn count_isa(pbxproj: &str, kind: &str) -> usize {
    pbxproj.matches(&format!("isa = {kind};")).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_isa_matches_exact_kind() {
        let text = "a = {isa = PBXGroup; };\nb = {isa = PBXGroupX; };\nc = {isa = PBXGroup; };";
        assert_eq!(count_isa(text, "PBXGroup"), 2);
        assert_eq!(count_isa(text, "PBXNativeTarget"), 0);
    }

    #[test]
    fn fixture_has_a_manifest() {
        assert!(fixture_root().join(FIXTURE_MANIFEST).is_file());
    }
}
