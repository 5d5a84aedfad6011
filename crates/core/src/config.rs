use serde::{Deserialize, Serialize};

/// Resource limits applied to a single parse.
///
/// Both limits default to unbounded. Recursion depth grows with the nesting
/// of the input, so callers parsing untrusted text should set `max_depth`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Maximum command nesting depth (the root command is depth 1).
    pub max_depth: Option<usize>,
    /// Maximum input length in characters.
    pub max_input_len: Option<usize>,
}

impl ParserConfig {
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_max_input_len(mut self, len: usize) -> Self {
        self.max_input_len = Some(len);
        self
    }
}
