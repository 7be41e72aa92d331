use std::collections::BTreeSet;
use std::fmt::Display;
use std::fs::Metadata;

#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

/// The closed set of entry kinds the walker distinguishes.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    /// A regular file.
    Regular,
    /// A directory. The only kind the walker recurses into.
    Directory,
    /// A symbolic link. Never followed below the root.
    Symlink,
    /// Devices, pipes, sockets and anything else.
    Other,
}

impl FileType {
    /// Classifies metadata obtained without following symlinks.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        Self::from(metadata.file_type())
    }
}

impl From<std::fs::FileType> for FileType {
    fn from(ft: std::fs::FileType) -> Self {
        if ft.is_symlink() {
            FileType::Symlink
        } else if ft.is_dir() {
            FileType::Directory
        } else if ft.is_file() {
            FileType::Regular
        } else {
            FileType::Other
        }
    }
}

impl Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FileType::Regular => "regular",
            FileType::Directory => "directory",
            FileType::Symlink => "symlink",
            FileType::Other => "other",
        };
        write!(f, "{s}")
    }
}

/// An optional type filter. Empty means every type passes.
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FileTypeSet {
    types: BTreeSet<FileType>,
}

impl FileTypeSet {
    /// Create a new, empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a type to the allowed set.
    pub fn insert(&mut self, ft: FileType) {
        self.types.insert(ft);
    }

    /// Whether no filtering is configured.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns `true` if an entry of type `ft` may be emitted.
    pub fn allows(&self, ft: FileType) -> bool {
        self.types.is_empty() || self.types.contains(&ft)
    }
}

impl FromIterator<FileType> for FileTypeSet {
    fn from_iter<I: IntoIterator<Item = FileType>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().collect(),
        }
    }
}
