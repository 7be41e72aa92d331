use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Represents all possible errors in the fswalker crate.
///
/// Only [`Error::RootNotFound`], [`Error::InvalidPattern`] and
/// [`Error::InvalidArgument`] are returned by the call that starts a walk.
/// The per-entry variants travel inside the stream on
/// [`WalkEntry::error`](crate::WalkEntry::error).
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Hash, Eq)]
pub enum Error {
    /// The traversal root does not exist or could not be resolved.
    #[error("Root not found {what}: {how}")]
    RootNotFound {
        /// The root path as given by the caller.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// Metadata of a single entry could not be read.
    #[error("Failed to read metadata of {what}: {how}")]
    Metadata {
        /// The entry whose metadata is missing.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// The children of a directory could not be enumerated.
    #[error("Failed to list directory {what}: {how}")]
    ListDir {
        /// The directory that failed to be listed.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// The target text of a symlink could not be read.
    #[error("Failed to read link {what}: {how}")]
    ReadLink {
        /// The symlink that failed to be read.
        what: String,
        /// The reason for the failure.
        how: String,
    },

    /// An inclusion pattern is not a valid shell glob.
    #[error("Invalid pattern {pattern}: {how}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// The reason the pattern was rejected.
        how: String,
    },

    /// Error indicating an invalid argument was provided.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The walk was stopped by its cancellation token.
    #[error("Walk cancelled")]
    Cancelled,

    /// Error indicating the producer task could not be synchronized with.
    #[error("Sync failed {what}: {how}")]
    Sync {
        /// Specific failure type
        what: String,
        /// The potential reason for the failure.
        how: String,
    },
}
