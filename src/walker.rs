use std::ffi::OsString;
use std::path::Path as StdPath;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use async_recursion::async_recursion;
use futures_lite::Stream;
use futures_lite::StreamExt;
use tokio::sync::mpsc;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::Error;
use crate::FileStat;
use crate::FileType;
use crate::RelPath;
use crate::WalkEntry;
use crate::WalkerOptions;
use crate::options::CompiledOptions;
use crate::root::ResolvedRoot;

/// Starts walking `root` with `options`.
///
/// Returns once the root is resolved; entries are produced by a background
/// task and read from the returned [`WalkStream`]. Only root resolution and
/// invalid options fail here, every later failure rides on an entry.
pub async fn walk<P: AsRef<StdPath>>(
    root: P,
    options: &WalkerOptions,
    cancel: CancellationToken,
) -> Result<WalkStream, Error> {
    Walker::new(options.clone()).walk(root, cancel).await
}

/// A reusable walk configuration.
///
/// Each call to [`Walker::walk`] freezes the options for that traversal, so
/// several walks may run at the same time.
#[derive(Debug, Clone, Default)]
pub struct Walker {
    options: WalkerOptions,
}

impl Walker {
    /// Creates a walker with `options`.
    pub fn new(options: WalkerOptions) -> Self {
        Self { options }
    }

    /// The options used by future walks.
    pub fn options(&self) -> &WalkerOptions {
        &self.options
    }

    /// Resolves `root` and spawns the producer on the current tokio runtime.
    pub async fn walk<P: AsRef<StdPath>>(
        &self,
        root: P,
        cancel: CancellationToken,
    ) -> Result<WalkStream, Error> {
        let options = self.options.compile()?;
        let root = ResolvedRoot::resolve(root.as_ref()).await?;
        let rel_path = root.rel_path()?;
        let (tx, rx) = mpsc::channel(options.channel_capacity);
        log::debug!(
            "walking {} as {} ({:?})",
            root.path.display(),
            root.file_type(),
            options.depth
        );
        let handle = tokio::spawn(async move {
            let dir_walker = DirWalker::create(options, tx, cancel);
            dir_walker.run(root, rel_path).await
        });
        Ok(WalkStream { rx, handle })
    }
}

/// Entries of one walk in pre-order, siblings sorted by name.
///
/// The stream ends when the tree is exhausted or the walk is cancelled.
/// Dropping it stops the producer before its next node visit or send,
/// whichever comes first.
pub struct WalkStream {
    rx: mpsc::Receiver<WalkEntry>,
    handle: JoinHandle<Result<(), Error>>,
}

impl WalkStream {
    /// Receives the next entry, or `None` once the walk is over.
    pub async fn recv(&mut self) -> Option<WalkEntry> {
        self.rx.recv().await
    }

    /// Discards any remaining entries and waits for the producer.
    ///
    /// Returns [`Error::Cancelled`] if the walk was cut short by its token.
    pub async fn finish(mut self) -> Result<(), Error> {
        while self.rx.recv().await.is_some() {}
        self.handle.await.map_err(|e| Error::Sync {
            what: "failed to join walker task".to_owned(),
            how: e.to_string(),
        })?
    }

    /// Collects every entry of the walk.
    pub async fn collect_entries(mut self) -> Result<Vec<WalkEntry>, Error> {
        let mut items = Vec::new();
        while let Some(item) = self.rx.recv().await {
            items.push(item);
        }
        self.finish().await?;
        Ok(items)
    }
}

impl Stream for WalkStream {
    type Item = WalkEntry;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// The producer side of a walk. Owns the sender; dropping it closes the
/// stream.
struct DirWalker {
    options: CompiledOptions,
    tx: Sender<WalkEntry>,
    cancel: CancellationToken,
}

impl DirWalker {
    fn create(options: CompiledOptions, tx: Sender<WalkEntry>, cancel: CancellationToken) -> Self {
        Self {
            options,
            tx,
            cancel,
        }
    }

    async fn run(self, root: ResolvedRoot, rel_path: RelPath) -> Result<(), Error> {
        let res = self.walk_root(root, rel_path).await;
        match &res {
            Ok(()) => log::debug!("walk finished"),
            Err(Error::Cancelled) => log::debug!("walk cancelled"),
            Err(e) => log::debug!("walk stopped: {e}"),
        }
        res
    }

    async fn walk_root(&self, root: ResolvedRoot, rel_path: RelPath) -> Result<(), Error> {
        let stats = FileStat::from_metadata(&root.metadata);
        if !root.is_dir() {
            let entry = WalkEntry {
                rel_path,
                full_path: root.path,
                stats: Some(stats),
                link: None,
                error: None,
            };
            if self.should_emit(&entry) {
                self.emit(entry).await?;
            }
            return Ok(());
        }
        self.visit_dir(root.path, rel_path, stats).await
    }

    /// Stops the walk once the token fires or the consumer is gone.
    fn check_cancelled(&self) -> Result<(), Error> {
        if self.cancel.is_cancelled() {
            Err(Error::Cancelled)
        } else if self.tx.is_closed() {
            Err(Error::Sync {
                what: "failed to tx".to_owned(),
                how: "receiver dropped".to_owned(),
            })
        } else {
            Ok(())
        }
    }

    /// Filters gate emission only; recursion is decided by the caller.
    ///
    /// The pattern filter applies to every entry, so an error on a path that
    /// matches no pattern is dropped along with the entry.
    fn should_emit(&self, entry: &WalkEntry) -> bool {
        if !self.options.patterns.matches(&entry.rel_path) {
            return false;
        }
        // Failures stay visible whatever the root and type settings.
        if entry.error.is_some() {
            return true;
        }
        if entry.rel_path.is_root() && !self.options.include_root {
            return false;
        }
        entry
            .file_type()
            .is_some_and(|ft| self.options.file_types.allows(ft))
    }

    async fn emit(&self, entry: WalkEntry) -> Result<(), Error> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            res = self.tx.send(entry) => res.map_err(|e| Error::Sync {
                what: "failed to tx".to_owned(),
                how: e.to_string(),
            }),
        }
    }

    async fn list_children(&self, dir: &StdPath) -> Result<Vec<OsString>, Error> {
        let to_err = |e: std::io::Error| Error::ListDir {
            what: dir.display().to_string(),
            how: e.to_string(),
        };
        let mut entries = async_fs::read_dir(dir).await.map_err(to_err)?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next().await {
            names.push(entry.map_err(to_err)?.file_name());
        }
        names.sort();
        Ok(names)
    }

    /// Emits a directory and, depth permitting, its children in name order.
    ///
    /// Children are listed before the directory's own entry is sent so that
    /// a listing failure can be reported on that entry.
    #[async_recursion]
    async fn visit_dir(
        &self,
        full_path: PathBuf,
        rel_path: RelPath,
        stats: FileStat,
    ) -> Result<(), Error> {
        self.check_cancelled()?;
        let depth = rel_path.depth();
        let mut entry = WalkEntry {
            rel_path,
            full_path,
            stats: Some(stats),
            link: None,
            error: None,
        };

        let mut children = Vec::new();
        if self.options.depth.may_descend(depth) {
            match self.list_children(&entry.full_path).await {
                Ok(names) => children = names,
                Err(e) => {
                    log::warn!("{e}");
                    entry.error = Some(e);
                }
            }
        }

        let full_path = entry.full_path.clone();
        let rel_path = entry.rel_path.clone();
        if self.should_emit(&entry) {
            self.emit(entry).await?;
        }

        for name in children {
            self.check_cancelled()?;
            self.visit(&full_path, &rel_path, name).await?;
        }
        Ok(())
    }

    /// Visits one child of a directory without following symlinks.
    #[async_recursion]
    async fn visit(
        &self,
        parent_full: &StdPath,
        parent_rel: &RelPath,
        name: OsString,
    ) -> Result<(), Error> {
        let full_path = parent_full.join(&name);
        let rel_path = parent_rel.child(&name);
        if !self.options.depth.is_reportable(rel_path.depth()) {
            return Ok(());
        }
        log::trace!("visiting {rel_path}");

        let metadata = match tokio::fs::symlink_metadata(&full_path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                let error = Error::Metadata {
                    what: full_path.display().to_string(),
                    how: e.to_string(),
                };
                log::warn!("{error}");
                let entry = WalkEntry {
                    rel_path,
                    full_path,
                    stats: None,
                    link: None,
                    error: Some(error),
                };
                if self.should_emit(&entry) {
                    self.emit(entry).await?;
                }
                return Ok(());
            }
        };

        let stats = FileStat::from_metadata(&metadata);
        if stats.file_type == FileType::Directory {
            return self.visit_dir(full_path, rel_path, stats).await;
        }

        let mut entry = WalkEntry {
            rel_path,
            full_path,
            stats: Some(stats),
            link: None,
            error: None,
        };
        if !self.should_emit(&entry) {
            return Ok(());
        }
        if entry.file_type() == Some(FileType::Symlink) {
            match tokio::fs::read_link(&entry.full_path).await {
                Ok(target) => entry.link = Some(target.to_string_lossy().into_owned()),
                Err(e) => {
                    let error = Error::ReadLink {
                        what: entry.full_path.display().to_string(),
                        how: e.to_string(),
                    };
                    log::warn!("{error}");
                    entry.error = Some(error);
                }
            }
        }
        self.emit(entry).await
    }
}
