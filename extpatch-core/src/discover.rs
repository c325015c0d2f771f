//! Locating the Xcode project inside the iOS platform folder.

use crate::error::{InputError, ToolError};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XcodeProject {
    /// Folder name without `.xcodeproj`, e.g. `HelloCordova`.
    pub name: String,
    pub folder: Utf8PathBuf,
    pub manifest: Utf8PathBuf,
}

impl XcodeProject {
    /// The host app's `<Name>/<Name>-Info.plist`.
    pub fn info_plist(&self, ios_dir: &Utf8Path) -> Utf8PathBuf {
        ios_dir
            .join(&self.name)
            .join(format!("{}-Info.plist", self.name))
    }
}

/// Find the single `*.xcodeproj` folder in `ios_dir`.
///
/// Zero folders and more than one are both errors; the manifest inside must
/// exist.
pub fn discover_project(ios_dir: &Utf8Path) -> Result<XcodeProject, ToolError> {
    if !ios_dir.is_dir() {
        return Err(InputError::IosFolderMissing {
            path: ios_dir.to_path_buf(),
        }
        .into());
    }

    let mut found = Vec::new();
    for entry in ios_dir
        .read_dir_utf8()
        .with_context(|| format!("read_dir {ios_dir}"))?
    {
        let entry = entry.with_context(|| format!("read_dir {ios_dir}"))?;
        let name = entry.file_name();
        if name.ends_with(".xcodeproj") && entry.path().is_dir() {
            found.push(name.to_string());
        }
    }
    found.sort();

    let folder_name = match found.as_slice() {
        [] => {
            return Err(InputError::ProjectMissing {
                dir: ios_dir.to_path_buf(),
            }
            .into());
        }
        [one] => one.clone(),
        _ => {
            return Err(InputError::ProjectAmbiguous {
                dir: ios_dir.to_path_buf(),
                found,
            }
            .into());
        }
    };

    let folder = ios_dir.join(&folder_name);
    let manifest = folder.join("project.pbxproj");
    if !manifest.is_file() {
        return Err(InputError::ManifestMissing { path: manifest }.into());
    }
    let name = folder_name.trim_end_matches(".xcodeproj").to_string();
    debug!(project = %name, manifest = %manifest, "found Xcode project");
    Ok(XcodeProject {
        name,
        folder,
        manifest,
    })
}
