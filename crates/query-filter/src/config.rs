use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Options applied when compiling a query into a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Maximum number of nested `NOT` / `(` levels accepted by the parser.
    pub max_depth: usize,
}

impl CompileOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
