use derivative::Derivative;
#[cfg(feature = "json_schema")]
use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

use crate::DepthLimit;
use crate::Error;
use crate::FileType;
use crate::FileTypeSet;
use crate::PatternSet;

/// Default number of entries buffered between the producer and the consumer.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Configuration of a walk.
///
/// Options compose freely. They are serializable so that an application can
/// keep them in its own config file; missing fields take the defaults.
///
/// ```rust
/// # use fswalker::{FileType, WalkerOptions};
/// let options = WalkerOptions::new()
///     .skip_root()
///     .max_recurse_depth(2)
///     .fnmatch_patterns(["etc/*"])
///     .file_types([FileType::Regular]);
/// assert!(!options.include_root);
/// ```
#[cfg_attr(feature = "json_schema", derive(JsonSchema))]
#[derive(Debug, Clone, Serialize, Deserialize, Derivative, PartialEq, Eq)]
#[derivative(Default)]
#[serde(default)]
pub struct WalkerOptions {
    /// Whether a directory root produces its own `.` entry.
    #[derivative(Default(value = "true"))]
    pub include_root: bool,

    /// Maximum recursion depth. Negative means unlimited; 0 behaves as 1.
    #[derivative(Default(value = "-1"))]
    pub max_recurse_depth: i32,

    /// Inclusion globs matched against the relative path. Empty disables
    /// pattern filtering.
    pub fnmatch_patterns: Vec<String>,

    /// Entry types to emit. Empty disables type filtering.
    pub file_types: FileTypeSet,

    /// Entries buffered before the producer waits for the consumer.
    #[derivative(Default(value = "DEFAULT_CHANNEL_CAPACITY"))]
    pub channel_capacity: usize,
}

impl WalkerOptions {
    /// Options with every default applied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Do not emit the `.` entry of a directory root.
    pub fn skip_root(mut self) -> Self {
        self.include_root = false;
        self
    }

    /// Limit recursion depth. See [`DepthLimit`].
    pub fn max_recurse_depth(mut self, depth: i32) -> Self {
        self.max_recurse_depth = depth;
        self
    }

    /// Add inclusion globs.
    pub fn fnmatch_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fnmatch_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Add entry types to the type filter.
    pub fn file_types<I: IntoIterator<Item = FileType>>(mut self, types: I) -> Self {
        for ft in types {
            self.file_types.insert(ft);
        }
        self
    }

    /// Set how many entries may wait in the stream.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Validate and freeze these options for one traversal.
    pub(crate) fn compile(&self) -> Result<CompiledOptions, Error> {
        if self.channel_capacity == 0 {
            return Err(Error::InvalidArgument(
                "channel capacity must be greater than zero".to_owned(),
            ));
        }
        Ok(CompiledOptions {
            include_root: self.include_root,
            depth: DepthLimit::new(self.max_recurse_depth),
            patterns: PatternSet::new(&self.fnmatch_patterns)?,
            file_types: self.file_types.clone(),
            channel_capacity: self.channel_capacity,
        })
    }
}

/// Immutable snapshot of [`WalkerOptions`] owned by one producer.
#[derive(Debug, Clone)]
pub(crate) struct CompiledOptions {
    pub include_root: bool,
    pub depth: DepthLimit,
    pub patterns: PatternSet,
    pub file_types: FileTypeSet,
    pub channel_capacity: usize,
}
