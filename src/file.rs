use std::fs::Metadata;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::Error;
use crate::file_type::FileType;
use crate::path::RelPath;
use crate::utils::format_system_time;

/// Metadata of an entry captured at visit time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub struct FileStat {
    /// The size in bytes as reported by the filesystem.
    pub size: u64,
    /// Raw mode bits, permission and type bits included. On platforms
    /// without unix modes this is synthesized from the read-only flag.
    pub mode: u32,
    /// The last modification time in RFC 3339 - Z format. For example
    /// "2018-01-26T18:30:09.453Z"
    pub mtime: String,
    /// Kind of the entry.
    pub file_type: FileType,
}

impl FileStat {
    /// Create a `FileStat` from a `Metadata` value.
    ///
    /// Symlink metadata classifies as [`FileType::Symlink`]; followed metadata
    /// classifies as its target.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        FileStat {
            size: metadata.len(),
            mode: mode_bits(metadata),
            mtime: format_system_time(modified),
            file_type: FileType::from_metadata(metadata),
        }
    }

    /// Whether this entry is a directory.
    pub fn is_directory(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

#[cfg(unix)]
fn mode_bits(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::MetadataExt;
    metadata.mode()
}

#[cfg(not(unix))]
fn mode_bits(metadata: &Metadata) -> u32 {
    let perm = if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    };
    if metadata.is_dir() { perm | 0o111 } else { perm }
}

/// One entry produced by a walk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path relative to the traversal root. `.` for a directory root, the
    /// base name for a file root.
    pub rel_path: RelPath,
    /// Path usable for further I/O, joined onto the resolved root.
    pub full_path: PathBuf,
    /// Metadata, absent when it could not be read.
    pub stats: Option<FileStat>,
    /// Raw target text of a symlink found below the root.
    pub link: Option<String>,
    /// Failure attached to this entry. The walk carries on regardless.
    pub error: Option<Error>,
}

impl WalkEntry {
    /// Kind of the entry, if its metadata was read.
    pub fn file_type(&self) -> Option<FileType> {
        self.stats.as_ref().map(|s| s.file_type)
    }

    /// Whether this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.file_type() == Some(FileType::Directory)
    }

    /// Number of steps from the traversal root.
    pub fn depth(&self) -> usize {
        self.rel_path.depth()
    }
}
