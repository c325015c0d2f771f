use std::fmt;
use uuid::Uuid;

/// Opaque key of one node in the project graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) mod sealed {
    use super::ObjectId;

    /// Construction of typed ids stays inside the crate.
    pub trait Mint {
        fn mint(id: ObjectId) -> Self;
    }
}

/// An id whose node kind was checked when it was minted.
///
/// Typed ids are only created by the graph after confirming the referenced
/// node's `isa`, so holding a `TargetId` means the node is a target.
pub trait TypedId: sealed::Mint + Clone {
    /// `isa` values this id may point at.
    const ISAS: &'static [&'static str];
    const KIND: &'static str;

    fn object_id(&self) -> &ObjectId;
}

macro_rules! typed_id {
    ($(#[$doc:meta])* $name:ident, $kind:literal, [$($isa:literal),+ $(,)?]) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(ObjectId);

        impl $name {
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl TypedId for $name {
            const ISAS: &'static [&'static str] = &[$($isa),+];
            const KIND: &'static str = $kind;

            fn object_id(&self) -> &ObjectId {
                &self.0
            }
        }

        impl sealed::Mint for $name {
            fn mint(id: ObjectId) -> Self {
                Self(id)
            }
        }

        impl From<$name> for ObjectId {
            fn from(id: $name) -> ObjectId {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.0.as_str())
            }
        }
    };
}

typed_id!(
    /// A build target (native, aggregate or legacy).
    TargetId,
    "target",
    ["PBXNativeTarget", "PBXAggregateTarget", "PBXLegacyTarget"]
);
typed_id!(
    /// A build phase of any kind.
    PhaseId,
    "build phase",
    [
        "PBXSourcesBuildPhase",
        "PBXResourcesBuildPhase",
        "PBXFrameworksBuildPhase",
        "PBXCopyFilesBuildPhase",
        "PBXShellScriptBuildPhase",
        "PBXHeadersBuildPhase",
        "PBXRezBuildPhase",
    ]
);
typed_id!(GroupId, "group", ["PBXGroup"]);
typed_id!(FileRefId, "file reference", ["PBXFileReference"]);
typed_id!(
    /// Membership of one file in one build phase.
    BuildFileId,
    "build file",
    ["PBXBuildFile"]
);
typed_id!(ConfigId, "build configuration", ["XCBuildConfiguration"]);
typed_id!(ConfigListId, "configuration list", ["XCConfigurationList"]);
typed_id!(DependencyId, "target dependency", ["PBXTargetDependency"]);
typed_id!(ProjectId, "project", ["PBXProject"]);

const ID_NAMESPACE: Uuid = Uuid::from_bytes([
    0x6e, 0x2d, 0x91, 0xc4, 0x1b, 0x7a, 0x4f, 0x0e, 0x9d, 0x35, 0x58, 0xa2, 0x0c, 0x47, 0xe3, 0x19,
]);

/// Derive a 24-digit uppercase hex id from `seed` and an attempt counter.
///
/// Deterministic: the same seed always yields the same sequence of
/// candidates, so repeated runs over the same input allocate the same keys.
pub(crate) fn derive_id(seed: &str, attempt: u32) -> ObjectId {
    let key = format!("{seed}#{attempt}");
    let uuid = Uuid::new_v5(&ID_NAMESPACE, key.as_bytes());
    let hex = uuid.simple().to_string().to_ascii_uppercase();
    ObjectId(hex[..24].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_ids_look_like_xcode_ids() {
        let id = derive_id("target|ShareExt", 0);
        assert_eq!(id.as_str().len(), 24);
        assert!(id.as_str().chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn derived_ids_are_stable_and_vary_by_attempt() {
        assert_eq!(derive_id("a", 0), derive_id("a", 0));
        assert_ne!(derive_id("a", 0), derive_id("a", 1));
        assert_ne!(derive_id("a", 0), derive_id("b", 0));
    }
}
