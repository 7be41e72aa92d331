use globset::GlobBuilder;
use globset::GlobSet;
use globset::GlobSetBuilder;

use crate::Error;
use crate::RelPath;

/// Compiled inclusion allow-list of shell globs.
///
/// Wildcards never match `/`, so `dev/*` matches `dev/random` but neither
/// `dev` nor `dev/a/b`. Paths are matched on their raw bytes. An empty set
/// matches everything.
#[derive(Debug, Clone)]
pub struct PatternSet {
    set: Option<GlobSet>,
}

impl PatternSet {
    /// Matches every path.
    pub fn empty() -> Self {
        Self { set: None }
    }

    /// Compiles `patterns`. Fails on the first pattern that is not a valid
    /// glob.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, Error> {
        if patterns.is_empty() {
            return Ok(Self::empty());
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .backslash_escape(true)
                .build()
                .map_err(|e| Error::InvalidPattern {
                    pattern: pattern.to_owned(),
                    how: e.kind().to_string(),
                })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| Error::InvalidPattern {
            pattern: patterns
                .iter()
                .map(|p| p.as_ref())
                .collect::<Vec<_>>()
                .join(","),
            how: e.to_string(),
        })?;
        Ok(Self { set: Some(set) })
    }

    /// Whether no pattern is configured.
    pub fn is_empty(&self) -> bool {
        self.set.is_none()
    }

    /// Returns `true` if `path` matches at least one pattern.
    pub fn matches(&self, path: &RelPath) -> bool {
        match &self.set {
            None => true,
            Some(set) => set.is_match(path.to_os_string()),
        }
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::empty()
    }
}
