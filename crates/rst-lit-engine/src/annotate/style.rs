use crate::rope::Span;

/// Escalating title styles, chosen by the underline character's position
/// in the configured style list. Characters outside the list still form
/// valid title blocks but style as plain prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleStyle {
    Level1,
    Level2,
    Level3,
    Plain,
}

/// Maps an underline level index to its title style.
pub fn title_style(level: Option<usize>) -> TitleStyle {
    match level {
        Some(0) => TitleStyle::Level1,
        Some(1) => TitleStyle::Level2,
        Some(2) => TitleStyle::Level3,
        _ => TitleStyle::Plain,
    }
}

/// The vocabulary the embedded-language highlighter answers in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeStyle {
    Keyword,
    Ident,
    Literal,
    Comment,
    Operator,
    Punct,
}

/// Style classes a directive can carry. Resolved to concrete visual
/// attributes by the rendering host, never here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleTag {
    /// Title text, by level.
    Title(TitleStyle),
    /// Comment markers and visible underline runs of a title block.
    TitleMarkup,
    /// An underline run whose markup is hidden: rendered zero-width, with
    /// the tag available to hosts that draw a thin decorative rule under
    /// the title text instead.
    UnderlineThin,
    /// Prose content of a doc-comment line.
    Prose,
    /// The marker prefix of a doc-comment line.
    ProseMarker,
    /// The `>>>` / `...` token of a snippet line.
    DoctestMarker,
    /// The executable payload of a snippet line.
    DoctestCode,
    /// Backtick delimiters of quoted spans.
    QuoteDelimiter,
    /// Content of a single-backtick span.
    LiteralSingle,
    /// Content of a double-backtick span.
    LiteralDouble,
    /// A sub-span styled by the embedded-language highlighter.
    Code(CodeStyle),
}

/// One per-range rendering instruction.
///
/// Output of an annotation pass, not stored state: re-running over the
/// same text with the same options reproduces the same directives.
/// Hidden spans render zero-width; directives emitted later in the pass
/// override earlier ones where they overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualDirective {
    pub span: Span,
    pub style: StyleTag,
    pub hidden: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_map_to_escalating_styles() {
        assert_eq!(title_style(Some(0)), TitleStyle::Level1);
        assert_eq!(title_style(Some(1)), TitleStyle::Level2);
        assert_eq!(title_style(Some(2)), TitleStyle::Level3);
    }

    #[test]
    fn unknown_levels_style_as_plain() {
        assert_eq!(title_style(None), TitleStyle::Plain);
        assert_eq!(title_style(Some(3)), TitleStyle::Plain);
    }
}
