//! Character classification and content-token scanning.
//!
//! All functions work on a `&[char]` view of the input and take/return an
//! explicit cursor position, so nested parses never share hidden state.

use crate::error::PeelError;

pub const COMMAND_SIGILS: [char; 2] = ['#', '*'];
pub const GROUP_OPEN: char = '(';
pub const GROUP_CLOSE: char = ')';
pub const DELIMITER: char = ',';

/// Punctuation that may appear in (or start) a content token.
const CONTENT_PUNCTUATION: &str = "()[]{},.-+*/=$#`\"_";

/// Syntactic class of a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    CommandSigil,
    GroupOpen,
    GroupClose,
    Delimiter,
    /// Skipped silently between tokens (whitespace and anything unlisted).
    NonParsable,
    Content,
}

pub fn classify(c: char) -> CharClass {
    if COMMAND_SIGILS.contains(&c) {
        CharClass::CommandSigil
    } else if c == GROUP_OPEN {
        CharClass::GroupOpen
    } else if c == GROUP_CLOSE {
        CharClass::GroupClose
    } else if c == DELIMITER {
        CharClass::Delimiter
    } else if c.is_ascii_alphanumeric() || CONTENT_PUNCTUATION.contains(c) {
        CharClass::Content
    } else {
        CharClass::NonParsable
    }
}

/// Advance past non-parsable characters.
pub fn skip_non_parsable(chars: &[char], mut pos: usize) -> usize {
    while pos < chars.len() && classify(chars[pos]) == CharClass::NonParsable {
        pos += 1;
    }
    pos
}

/// Advance past whitespace only.
pub(crate) fn skip_whitespace(chars: &[char], mut pos: usize) -> usize {
    while pos < chars.len() && chars[pos].is_whitespace() {
        pos += 1;
    }
    pos
}

// ──────────────────────────────────────────────
// Wrapped literals
// ──────────────────────────────────────────────

/// Delimiters that make a content token verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrapper {
    Backtick,
    Quote,
    TripleQuote,
}

impl Wrapper {
    pub fn as_str(&self) -> &'static str {
        match self {
            Wrapper::Backtick => "`",
            Wrapper::Quote => "\"",
            Wrapper::TripleQuote => "\"\"\"",
        }
    }

    fn len(&self) -> usize {
        self.as_str().len()
    }

    fn name(&self) -> &'static str {
        match self {
            Wrapper::Backtick => "backtick",
            Wrapper::Quote => "quoted",
            Wrapper::TripleQuote => "triple-quoted",
        }
    }
}

fn starts_with_at(chars: &[char], pos: usize, needle: &str) -> bool {
    let mut i = pos;
    for n in needle.chars() {
        if i >= chars.len() || chars[i] != n {
            return false;
        }
        i += 1;
    }
    true
}

/// The wrapper opening at `pos`, if any. Triple quotes win over a single quote.
pub fn wrapper_at(chars: &[char], pos: usize) -> Option<Wrapper> {
    [Wrapper::TripleQuote, Wrapper::Quote, Wrapper::Backtick]
        .into_iter()
        .find(|w| starts_with_at(chars, pos, w.as_str()))
}

fn scan_wrapped(
    chars: &[char],
    pos: usize,
    wrapper: Wrapper,
) -> Result<(String, usize), PeelError> {
    let body_start = pos + wrapper.len();
    let close = (body_start..chars.len())
        .find(|&i| starts_with_at(chars, i, wrapper.as_str()))
        .ok_or(PeelError::UnterminatedLiteral {
            wrapper: wrapper.name(),
            position: pos,
        })?;

    let mut text: String = chars[body_start..close].iter().collect();
    let mut end = close + wrapper.len();

    // Quotes directly after a closing `"""` belong to the body.
    if wrapper == Wrapper::TripleQuote {
        while end < chars.len() && chars[end] == '"' {
            text.push('"');
            end += 1;
        }
    }

    Ok((text, skip_non_parsable(chars, end)))
}

/// Scan one content token starting at `pos`.
///
/// Wrapped content is returned verbatim; unwrapped content runs up to the
/// first `stop` or `)` and is trimmed. The returned position points at the
/// character that ended the token.
pub fn scan_content(chars: &[char], pos: usize, stop: char) -> Result<(String, usize), PeelError> {
    if let Some(wrapper) = wrapper_at(chars, pos) {
        return scan_wrapped(chars, pos, wrapper);
    }

    let end = (pos..chars.len())
        .find(|&i| chars[i] == stop || chars[i] == GROUP_CLOSE)
        .ok_or(PeelError::MissingTerminator { position: pos })?;
    let text: String = chars[pos..end].iter().collect();
    Ok((text.trim().to_string(), end))
}
