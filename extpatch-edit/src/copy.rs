//! Planning the copy of the plugin's extension folder into the iOS platform.
//!
//! Nothing here writes. [`plan_extension_copy`] reads the source tree and the
//! current destination and returns the writes that would bring the
//! destination up to date, with tokens already substituted.

use crate::error::{EditError, EditResult, LayoutError};
use crate::tokens::TokenTable;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use extpatch_domain::classify_extension;
use extpatch_types::file::{CandidateFile, FileKind};
use fs_err as fs;
use tracing::debug;

/// One file the copy would create or overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedWrite {
    pub path: Utf8PathBuf,
    /// Path relative to the destination parent, `/`-separated.
    pub relative: String,
    pub contents: Vec<u8>,
    /// Existing destination contents, `None` for a new file.
    pub before: Option<Vec<u8>>,
    pub replacements: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyPlan {
    /// The extension folder inside the destination parent.
    pub folder: Utf8PathBuf,
    pub writes: Vec<PlannedWrite>,
    /// Destination files already identical to what would be written.
    pub unchanged: Vec<String>,
}

impl CopyPlan {
    pub fn is_noop(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Plan copying `source` into `dest_parent/<source name>`.
///
/// Files directly inside `source` that classify as sources or manifest
/// fragments have `tokens` substituted; everything else is copied verbatim.
/// Files that are not valid UTF-8 are never substituted.
pub fn plan_extension_copy(
    source: &Utf8Path,
    dest_parent: &Utf8Path,
    tokens: &TokenTable,
) -> EditResult<CopyPlan> {
    if !source.is_dir() {
        return Err(LayoutError::SourceFolderMissing {
            path: source.to_path_buf(),
        }
        .into());
    }
    let name = source
        .file_name()
        .with_context(|| format!("extension folder {source} has no name"))?;

    let folder = dest_parent.join(name);
    let mut plan = CopyPlan {
        folder: folder.clone(),
        ..CopyPlan::default()
    };
    walk(source, &folder, name, true, tokens, &mut plan)?;
    debug!(
        source = %source,
        writes = plan.writes.len(),
        unchanged = plan.unchanged.len(),
        "planned extension copy"
    );
    Ok(plan)
}

fn walk(
    source: &Utf8Path,
    dest: &Utf8Path,
    relative: &str,
    top_level: bool,
    tokens: &TokenTable,
    plan: &mut CopyPlan,
) -> EditResult<()> {
    for (name, path) in sorted_entries(source)? {
        let rel = format!("{relative}/{name}");
        let target = dest.join(&name);
        if path.is_dir() {
            walk(&path, &target, &rel, false, tokens, plan)?;
            continue;
        }

        let raw = fs::read(&path).with_context(|| format!("read {path}"))?;
        let (contents, replacements) = if top_level && takes_tokens(&name) {
            substitute_bytes(raw, tokens)
        } else {
            (raw, 0)
        };

        let before = if target.is_file() {
            Some(fs::read(&target).with_context(|| format!("read {target}"))?)
        } else {
            None
        };
        if before.as_deref() == Some(contents.as_slice()) {
            plan.unchanged.push(rel);
            continue;
        }
        plan.writes.push(PlannedWrite {
            path: target,
            relative: rel,
            contents,
            before,
            replacements,
        });
    }
    Ok(())
}

fn takes_tokens(name: &str) -> bool {
    let file = CandidateFile::from_name(name, name);
    classify_extension(&file.extension) != FileKind::Resource
}

fn substitute_bytes(raw: Vec<u8>, tokens: &TokenTable) -> (Vec<u8>, u64) {
    match String::from_utf8(raw) {
        Ok(text) => {
            let (out, count) = tokens.substitute(&text);
            (out.into_bytes(), count)
        }
        Err(err) => (err.into_bytes(), 0),
    }
}

fn sorted_entries(dir: &Utf8Path) -> EditResult<Vec<(String, Utf8PathBuf)>> {
    let mut entries = Vec::new();
    for entry in dir.read_dir_utf8().with_context(|| format!("read_dir {dir}"))? {
        let entry = entry.with_context(|| format!("read_dir {dir}"))?;
        entries.push((entry.file_name().to_string(), entry.path().to_path_buf()));
    }
    entries.sort();
    Ok(entries)
}

/// List the extension files directly inside `folder`, sorted by name.
///
/// Names starting with `.` (editor and Finder droppings) are skipped.
pub fn list_candidates(folder: &Utf8Path) -> EditResult<Vec<CandidateFile>> {
    if !folder.is_dir() {
        return Err(EditError::Layout(LayoutError::ExtensionFolderMissing {
            path: folder.to_path_buf(),
        }));
    }
    Ok(sorted_entries(folder)?
        .into_iter()
        .filter(|(name, _)| !name.starts_with('.'))
        .map(|(name, path)| CandidateFile::from_name(&name, path.to_string()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn only_sources_and_manifests_take_tokens() {
        assert!(takes_tokens("ShareViewController.m"));
        assert!(takes_tokens("ShareViewController.h"));
        assert!(takes_tokens("ShareExtension-Info.plist"));
        assert!(!takes_tokens("MainInterface.storyboard"));
        assert!(!takes_tokens("icon.png"));
    }

    #[test]
    fn binary_contents_are_left_alone() {
        let table = TokenTable::default().with_extra([("__A__", "a")]);
        let raw = vec![0xff, 0xfe, b'_', b'_', b'A', b'_', b'_'];
        let (out, count) = substitute_bytes(raw.clone(), &table);
        assert_eq!(out, raw);
        assert_eq!(count, 0);
    }
}
