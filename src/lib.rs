//! An ordered, filtered and cancellable stream of filesystem tree entries.
//!
//! A typical use for this crate is feeding an archive builder: every entry
//! carries its relative path, the path to open, metadata captured at visit
//! time and, for symlinks below the root, the raw link target. The tree is
//! walked in pre-order with siblings sorted by name, by a background task
//! that waits whenever the consumer falls behind.
//!
//! ```rust
//! # tokio_test::block_on(async {
//! # use fswalker::{walk, WalkerOptions};
//! # use tokio_util::sync::CancellationToken;
//! use futures_lite::StreamExt;
//!
//! let options = WalkerOptions::new()
//!     .skip_root()
//!     .max_recurse_depth(2)
//!     .fnmatch_patterns(["src/*.rs"]);
//! let mut stream = walk("./", &options, CancellationToken::new()).await.unwrap();
//! while let Some(entry) = stream.next().await {
//!     assert!(entry.error.is_none());
//!     assert!(entry.rel_path.to_string().ends_with(".rs"));
//!     println!("{}", serde_json::to_string(&entry).unwrap());
//! }
//! # })
//! ```
//!
//! An entry might look like
//! ```json
//! {
//!   "rel_path": { "components": ["src", "lib.rs"] },
//!   "full_path": "./src/lib.rs",
//!   "stats": {
//!     "size": 2154,
//!     "mode": 33188,
//!     "mtime": "2025-11-20T00:35:58.153Z",
//!     "file_type": "regular"
//!   },
//!   "link": null,
//!   "error": null
//! }
//! ```

mod depth;
mod errors;
mod file;
mod file_type;
mod options;
mod path;
mod pattern;
mod root;
pub mod utils;
mod walker;

pub use depth::DepthLimit;
pub use errors::Error;
pub use file::FileStat;
pub use file::WalkEntry;
pub use file_type::FileType;
pub use file_type::FileTypeSet;
pub use options::DEFAULT_CHANNEL_CAPACITY;
pub use options::WalkerOptions;
pub use path::RelPath;
pub use pattern::PatternSet;
pub use walker::WalkStream;
pub use walker::Walker;
pub use walker::walk;

#[cfg(feature = "test_utils")]
pub(crate) mod test_utils;
#[cfg(feature = "test_utils")]
pub use test_utils::Node;
#[cfg(feature = "test_utils")]
pub use test_utils::TEMP_FILES;
#[cfg(feature = "test_utils")]
pub use test_utils::TestRoot;
