use crate::grammar::EntityKind;

/// Broad class of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed characters: unterminated literals or commands, trailing input.
    Lexical,
    /// Unknown keywords, misplaced commands, wrong argument counts.
    Grammar,
    /// Malformed `#opts(...)` content.
    Options,
    /// Malformed `#ref(...)` content.
    Reference,
    /// A command's arguments do not fit the object it builds.
    Deserialize,
    /// A configured input limit was exceeded.
    Limit,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Lexical => "lexical",
            ErrorKind::Grammar => "grammar",
            ErrorKind::Options => "options",
            ErrorKind::Reference => "reference",
            ErrorKind::Deserialize => "deserialize",
            ErrorKind::Limit => "limit",
        }
    }
}

/// A fatal PEEL parse error. Positions are character offsets into the input.
#[derive(Debug, thiserror::Error)]
pub enum PeelError {
    #[error("input is too short to contain a command at position {position}")]
    InputTooShort { position: usize },

    #[error("unterminated {wrapper} literal starting at position {position}")]
    UnterminatedLiteral {
        wrapper: &'static str,
        position: usize,
    },

    #[error("no delimiter or closing ')' found for content starting at position {position}")]
    MissingTerminator { position: usize },

    #[error("command '{keyword}' at position {position} was not started")]
    NotStarted {
        keyword: &'static str,
        position: usize,
    },

    #[error("command '{keyword}' at position {position} was not completed")]
    NotCompleted {
        keyword: &'static str,
        position: usize,
    },

    #[error("unexpected trailing input at position {position}")]
    TrailingInput { position: usize },

    #[error("unknown command '{candidate}' at position {position}")]
    UnknownCommand { candidate: String, position: usize },

    #[error("ambiguous command '{candidate}' at position {position}: matches {matches}")]
    AmbiguousCommand {
        candidate: String,
        matches: String,
        position: usize,
    },

    #[error("command '{keyword}' at position {position} must be followed by '('")]
    MissingGroupOpen {
        keyword: &'static str,
        position: usize,
    },

    #[error("expected {expected} but found command '{keyword}' ({actual})")]
    UnexpectedRoot {
        expected: &'static str,
        keyword: &'static str,
        actual: EntityKind,
    },

    #[error(
        "command '{parent}' accepts only [{expected}] but found '{keyword}' ({actual}) at position {position}"
    )]
    UnexpectedChild {
        parent: &'static str,
        expected: String,
        keyword: &'static str,
        actual: EntityKind,
        position: usize,
    },

    #[error("not enough arguments for command '{keyword}': expected at least {min}, got {actual}")]
    NotEnoughArguments {
        keyword: &'static str,
        min: usize,
        actual: usize,
    },

    #[error("too many arguments for command '{keyword}': expected at most {max}, got {actual}")]
    TooManyArguments {
        keyword: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("references are not supported inside command '{keyword}'")]
    UnsupportedReference { keyword: &'static str },

    #[error("option key is empty at position {position}")]
    EmptyOptionKey { position: usize },

    #[error("option value is empty for key '{key}'")]
    EmptyOptionValue { key: String },

    #[error("invalid value '{value}' for option '{key}': {reason}")]
    InvalidOptionValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("invalid semantic version '{value}'")]
    InvalidVersion {
        value: String,
        #[source]
        source: semver::Error,
    },

    #[error(
        "reference at position {position} must have an id and an optional version, got {actual} entries"
    )]
    ReferenceArity { actual: usize, position: usize },

    #[error("commands are not allowed inside '#ref' (position {position})")]
    NestedInReference { position: usize },

    #[error("invalid literal '{value}' for command '{keyword}': {reason}")]
    InvalidLiteral {
        keyword: &'static str,
        value: String,
        reason: String,
    },

    #[error("{message}")]
    Deserialize {
        keyword: &'static str,
        message: String,
    },

    #[error("input length {actual} exceeds the configured maximum of {max}")]
    InputTooLong { max: usize, actual: usize },

    #[error("nesting depth exceeds the configured maximum of {max} at position {position}")]
    DepthExceeded { max: usize, position: usize },
}

impl PeelError {
    /// A deserializer precondition failure for `keyword`.
    pub(crate) fn shape(keyword: &'static str, message: impl Into<String>) -> Self {
        PeelError::Deserialize {
            keyword,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PeelError::InputTooShort { .. }
            | PeelError::UnterminatedLiteral { .. }
            | PeelError::MissingTerminator { .. }
            | PeelError::NotStarted { .. }
            | PeelError::NotCompleted { .. }
            | PeelError::TrailingInput { .. } => ErrorKind::Lexical,
            PeelError::UnknownCommand { .. }
            | PeelError::AmbiguousCommand { .. }
            | PeelError::MissingGroupOpen { .. }
            | PeelError::UnexpectedRoot { .. }
            | PeelError::UnexpectedChild { .. }
            | PeelError::NotEnoughArguments { .. }
            | PeelError::TooManyArguments { .. }
            | PeelError::UnsupportedReference { .. } => ErrorKind::Grammar,
            PeelError::EmptyOptionKey { .. }
            | PeelError::EmptyOptionValue { .. }
            | PeelError::InvalidOptionValue { .. }
            | PeelError::InvalidVersion { .. } => ErrorKind::Options,
            PeelError::ReferenceArity { .. } | PeelError::NestedInReference { .. } => {
                ErrorKind::Reference
            }
            PeelError::InvalidLiteral { .. } | PeelError::Deserialize { .. } => {
                ErrorKind::Deserialize
            }
            PeelError::InputTooLong { .. } | PeelError::DepthExceeded { .. } => ErrorKind::Limit,
        }
    }

    /// Cursor position of the failure, when one is known.
    pub fn position(&self) -> Option<usize> {
        match self {
            PeelError::InputTooShort { position }
            | PeelError::UnterminatedLiteral { position, .. }
            | PeelError::MissingTerminator { position }
            | PeelError::NotStarted { position, .. }
            | PeelError::NotCompleted { position, .. }
            | PeelError::TrailingInput { position }
            | PeelError::UnknownCommand { position, .. }
            | PeelError::AmbiguousCommand { position, .. }
            | PeelError::MissingGroupOpen { position, .. }
            | PeelError::UnexpectedChild { position, .. }
            | PeelError::EmptyOptionKey { position }
            | PeelError::ReferenceArity { position, .. }
            | PeelError::NestedInReference { position }
            | PeelError::DepthExceeded { position, .. } => Some(*position),
            _ => None,
        }
    }

    /// Command keyword the failure is attributed to, when one is known.
    pub fn keyword(&self) -> Option<&str> {
        match self {
            PeelError::NotStarted { keyword, .. }
            | PeelError::NotCompleted { keyword, .. }
            | PeelError::MissingGroupOpen { keyword, .. }
            | PeelError::UnexpectedRoot { keyword, .. }
            | PeelError::NotEnoughArguments { keyword, .. }
            | PeelError::TooManyArguments { keyword, .. }
            | PeelError::UnsupportedReference { keyword }
            | PeelError::InvalidLiteral { keyword, .. }
            | PeelError::Deserialize { keyword, .. }
            | PeelError::UnexpectedChild { keyword, .. } => Some(*keyword),
            PeelError::UnknownCommand { candidate, .. }
            | PeelError::AmbiguousCommand { candidate, .. } => Some(candidate.as_str()),
            _ => None,
        }
    }

    /// Machine-readable form used by tooling output.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "kind":     self.kind().as_str(),
            "keyword":  self.keyword(),
            "message":  self.to_string(),
            "position": self.position(),
        })
    }
}
