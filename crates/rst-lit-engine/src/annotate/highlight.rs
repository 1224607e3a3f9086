use crate::rope::Span;

use super::style::CodeStyle;

/// Context an embedded code fragment was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageMode {
    /// The payload of an interactive snippet line.
    Snippet,
    /// The content of a double-backtick literal.
    Literal,
}

/// The embedded-language highlighter collaborator.
///
/// Invoked from inside an annotation pass over doctest payloads and
/// double-quoted content, so implementations must tolerate re-entrant
/// calls. `base` is the absolute byte offset of `source` in the buffer;
/// returned spans are absolute.
pub trait CodeHighlighter {
    fn highlight(&mut self, source: &str, base: usize, mode: LanguageMode)
    -> Vec<(Span, CodeStyle)>;
}

/// Highlighter that styles nothing. For hosts without an embedded-language
/// highlighter, and for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHighlighter;

impl CodeHighlighter for NullHighlighter {
    fn highlight(&mut self, _: &str, _: usize, _: LanguageMode) -> Vec<(Span, CodeStyle)> {
        Vec::new()
    }
}
