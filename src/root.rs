use std::fs::Metadata;
use std::path::Path as StdPath;
use std::path::PathBuf;

use crate::Error;
use crate::FileType;
use crate::RelPath;

/// Traversal root after symlink resolution.
#[derive(Debug)]
pub(crate) struct ResolvedRoot {
    /// Path the walk starts from. Canonical target when the root was a link.
    pub path: PathBuf,
    /// Metadata of `path`, symlinks followed.
    pub metadata: Metadata,
}

impl ResolvedRoot {
    /// Looks up `root`, dereferencing it if it is a symlink. Links below the
    /// root are never resolved.
    pub async fn resolve(root: &StdPath) -> Result<Self, Error> {
        let not_found = |e: std::io::Error| Error::RootNotFound {
            what: root.display().to_string(),
            how: e.to_string(),
        };
        let lstat = tokio::fs::symlink_metadata(root).await.map_err(not_found)?;
        let path = if lstat.file_type().is_symlink() {
            let target = tokio::fs::canonicalize(root).await.map_err(not_found)?;
            log::debug!("root {} resolves to {}", root.display(), target.display());
            target
        } else {
            root.to_path_buf()
        };
        let metadata = tokio::fs::metadata(&path).await.map_err(not_found)?;
        Ok(Self { path, metadata })
    }

    pub fn is_dir(&self) -> bool {
        self.metadata.is_dir()
    }

    pub fn file_type(&self) -> FileType {
        FileType::from_metadata(&self.metadata)
    }

    /// Relative path of the root entry: `.` for a directory, the base name
    /// otherwise.
    pub fn rel_path(&self) -> Result<RelPath, Error> {
        if self.is_dir() {
            return Ok(RelPath::root());
        }
        let name = self.path.file_name().ok_or_else(|| Error::RootNotFound {
            what: self.path.display().to_string(),
            how: "root has no base name".to_owned(),
        })?;
        RelPath::try_from([name].as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_root_is_not_found() {
        let dir = tempdir::TempDir::new("root").unwrap();
        let err = ResolvedRoot::resolve(&dir.path().join("doesntlivehere"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RootNotFound { .. }));
    }

    #[tokio::test]
    async fn file_root_uses_base_name() {
        let dir = tempdir::TempDir::new("root").unwrap();
        let file = dir.path().join("cp");
        std::fs::write(&file, b"").unwrap();
        let root = ResolvedRoot::resolve(&file).await.unwrap();
        assert!(!root.is_dir());
        assert_eq!(root.file_type(), FileType::Regular);
        assert_eq!(root.rel_path().unwrap().to_string(), "cp");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_root_is_dereferenced() {
        let dir = tempdir::TempDir::new("root").unwrap();
        std::fs::create_dir(dir.path().join("original")).unwrap();
        let link = dir.path().join("new");
        std::os::unix::fs::symlink("original", &link).unwrap();

        let root = ResolvedRoot::resolve(&link).await.unwrap();
        assert!(root.is_dir());
        assert_eq!(root.file_type(), FileType::Directory);
        assert_eq!(root.path.file_name().unwrap(), "original");
        assert!(root.rel_path().unwrap().is_root());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlink_root_to_file_uses_target_name() {
        let dir = tempdir::TempDir::new("root").unwrap();
        std::fs::write(dir.path().join("target.bin"), b"").unwrap();
        let link = dir.path().join("alias");
        std::os::unix::fs::symlink("target.bin", &link).unwrap();

        let root = ResolvedRoot::resolve(&link).await.unwrap();
        assert!(!root.is_dir());
        assert_eq!(root.file_type(), FileType::Regular);
        assert_eq!(root.rel_path().unwrap().to_string(), "target.bin");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn dangling_symlink_root_is_not_found() {
        let dir = tempdir::TempDir::new("root").unwrap();
        let link = dir.path().join("dangling");
        std::os::unix::fs::symlink("nowhere", &link).unwrap();
        assert!(matches!(
            ResolvedRoot::resolve(&link).await,
            Err(Error::RootNotFound { .. })
        ));
    }
}
