use serde::{Deserialize, Serialize};

/// How an extension file takes part in the build.
///
/// - source: compiled, lives in the target's sources phase
/// - manifest_fragment: property lists; grouped but never built
/// - resource: copied into the bundle through the resources phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Source,
    ManifestFragment,
    Resource,
}

impl FileKind {
    pub fn is_built(self) -> bool {
        !matches!(self, FileKind::ManifestFragment)
    }

    pub fn label(self) -> &'static str {
        match self {
            FileKind::Source => "source",
            FileKind::ManifestFragment => "manifest-fragment",
            FileKind::Resource => "resource",
        }
    }
}

/// One candidate file from the extension folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFile {
    pub name: String,
    pub path: String,

    /// Extension including the leading dot, empty when the name has none.
    pub extension: String,
}

impl CandidateFile {
    /// Build a candidate from a bare file name, deriving the extension the
    /// way a path library would (`.bashrc` has no extension).
    pub fn from_name(name: &str, path: impl Into<String>) -> Self {
        let extension = match name.rfind('.') {
            Some(0) | None => String::new(),
            Some(idx) => name[idx..].to_string(),
        };
        Self {
            name: name.to_string(),
            path: path.into(),
            extension,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_keeps_leading_dot() {
        let f = CandidateFile::from_name("ShareViewController.m", "ShareExtension/ShareViewController.m");
        assert_eq!(f.extension, ".m");
    }

    #[test]
    fn extension_uses_last_dot() {
        let f = CandidateFile::from_name("archive.tar.gz", "x");
        assert_eq!(f.extension, ".gz");
    }

    #[test]
    fn no_extension_is_empty() {
        assert_eq!(CandidateFile::from_name("README", "x").extension, "");
        assert_eq!(CandidateFile::from_name(".hidden", "x").extension, "");
    }

    #[test]
    fn kind_serializes_snake_case() {
        let v = serde_json::to_value(FileKind::ManifestFragment).unwrap();
        assert_eq!(v, serde_json::json!("manifest_fragment"));
        assert!(!FileKind::ManifestFragment.is_built());
        assert!(FileKind::Resource.is_built());
    }
}
