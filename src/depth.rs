/// Decides which depths are reported and which directories are entered.
///
/// Built from the signed `max_recurse_depth` option:
/// - negative: unlimited.
/// - `0` and `1` behave the same. The root and its direct children are
///   reported and nothing below depth 1 is entered. A limit of 0 would
///   otherwise only ever report the root.
/// - `N`: entries at depth `<= N` are reported and a directory at depth `D`
///   is entered only when `D < N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthLimit {
    max: Option<usize>,
}

impl DepthLimit {
    /// No depth limit.
    pub fn unlimited() -> Self {
        Self { max: None }
    }

    /// Builds a limit from the signed option value.
    pub fn new(max_recurse_depth: i32) -> Self {
        match usize::try_from(max_recurse_depth) {
            Err(_) => Self::unlimited(),
            Ok(0) => Self { max: Some(1) },
            Ok(n) => Self { max: Some(n) },
        }
    }

    /// Whether an entry at `depth` may be emitted.
    pub fn is_reportable(&self, depth: usize) -> bool {
        self.max.is_none_or(|max| depth <= max)
    }

    /// Whether a directory at `depth` may be entered.
    pub fn may_descend(&self, depth: usize) -> bool {
        self.max.is_none_or(|max| depth < max)
    }
}

impl Default for DepthLimit {
    fn default() -> Self {
        Self::unlimited()
    }
}
