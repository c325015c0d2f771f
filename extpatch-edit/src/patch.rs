//! Unified diff previews, content hashes and manifest backups.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use diffy::PatchFormatter;
use fs_err as fs;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Render a git-style unified diff for every path whose contents differ.
///
/// Paths present only in `after` are rendered as new files.
pub fn render_patch(
    before: &BTreeMap<String, String>,
    after: &BTreeMap<String, String>,
) -> String {
    let mut out = String::new();
    let formatter = PatchFormatter::new();

    for (path, new) in after {
        let old = before.get(path);
        if old == Some(new) {
            continue;
        }

        out.push_str(&format!("diff --git a/{0} b/{0}\n", path));
        match old {
            Some(_) => out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", path)),
            None => out.push_str(&format!("new file\n--- /dev/null\n+++ b/{0}\n", path)),
        }

        let patch = diffy::create_patch(old.map_or("", String::as_str), new);
        out.push_str(hunks(&formatter.fmt_patch(&patch).to_string()));
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }

    out
}

/// Drop diffy's own `--- original` / `+++ modified` header lines.
fn hunks(formatted: &str) -> &str {
    let mut rest = formatted;
    for prefix in ["--- ", "+++ "] {
        if rest.starts_with(prefix) {
            rest = rest.split_once('\n').map_or("", |(_, tail)| tail);
        }
    }
    rest
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Copy `path` to `<path><suffix>`, replacing an older backup.
pub fn backup_file(path: &Utf8Path, suffix: &str) -> anyhow::Result<Utf8PathBuf> {
    let backup = Utf8PathBuf::from(format!("{path}{suffix}"));
    fs::copy(path, &backup).with_context(|| format!("back up {path} to {backup}"))?;
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn identical_files_render_nothing() {
        let before = map(&[("a.pbxproj", "x\n")]);
        assert_eq!(render_patch(&before, &before.clone()), "");
    }

    #[test]
    fn changed_file_renders_headers_and_hunk() {
        let before = map(&[("p/project.pbxproj", "a\nb\n")]);
        let after = map(&[("p/project.pbxproj", "a\nc\n")]);
        let patch = render_patch(&before, &after);
        assert!(patch.starts_with("diff --git a/p/project.pbxproj b/p/project.pbxproj\n"));
        assert!(patch.contains("--- a/p/project.pbxproj\n+++ b/p/project.pbxproj\n"));
        assert!(patch.contains("-b\n+c\n"));
        assert!(!patch.contains("original"));
    }

    #[test]
    fn new_file_diffs_against_dev_null() {
        let patch = render_patch(&BTreeMap::new(), &map(&[("x.h", "int a;\n")]));
        assert!(patch.contains("--- /dev/null\n+++ b/x.h\n"));
        assert!(patch.contains("+int a;\n"));
    }

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn backup_copies_next_to_the_original() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        let file = root.join("project.pbxproj");
        fs::write(&file, "{}").unwrap();
        let backup = backup_file(&file, ".orig").unwrap();
        assert_eq!(backup, root.join("project.pbxproj.orig"));
        assert_eq!(fs::read_to_string(&backup).unwrap(), "{}");
    }
}
