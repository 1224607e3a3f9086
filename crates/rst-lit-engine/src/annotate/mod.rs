//! Conversion of grammar matches into per-range visual directives.
//!
//! One pass walks whole lines of the (already extended) range, matching
//! title blocks, doc comments, snippet lines and quoted spans, and emits
//! [`VisualDirective`]s for the rendering host. Embedded code inside
//! snippet payloads and double-quoted literals is delegated to the
//! injected [`CodeHighlighter`].

use std::ops::Range;

use xi_rope::Rope;

use crate::grammar::{QuotedSpan, TitleBlock, line, quoted_spans};
use crate::rope::{Span, lines_in};
use crate::settings::MarkupOptions;

pub mod highlight;
pub mod style;

pub use highlight::{CodeHighlighter, LanguageMode, NullHighlighter};
pub use style::{CodeStyle, StyleTag, TitleStyle, VisualDirective, title_style};

/// Annotates every construct intersecting `range`.
///
/// Pure with respect to its inputs: the same text, range, options and
/// highlighter output produce the same directives, so redundant re-runs
/// are harmless. Lines that match nothing produce nothing: malformed
/// markup falls back to plain text silently.
pub fn annotate(
    rope: &Rope,
    range: Range<usize>,
    options: &MarkupOptions,
    hl: &mut dyn CodeHighlighter,
) -> Vec<VisualDirective> {
    let mut out = Vec::new();
    // Start of the underline line claimed by the title block above it.
    let mut claimed_underline: Option<usize> = None;

    for lr in lines_in(rope, range) {
        if claimed_underline == Some(lr.span.start) {
            continue;
        }
        let body = lr.body();
        let base = lr.span.start;
        if line::is_blank(body) {
            continue;
        }

        if let Some(block) = TitleBlock::at_line(rope, base) {
            emit_title(&mut out, &block, options);
            claimed_underline = Some(lr.span.end);
            emit_quotes(&mut out, body, base, options, hl);
            continue;
        }

        if let Some(m) = line::doc_comment(body) {
            out.push(VisualDirective {
                span: Span {
                    start: base,
                    end: base + body.len(),
                },
                style: StyleTag::Prose,
                hidden: false,
            });
            out.push(VisualDirective {
                span: Span {
                    start: base,
                    end: base + m.marker_len,
                },
                style: StyleTag::ProseMarker,
                hidden: options.hide_title_markup,
            });
            emit_quotes(&mut out, body, base, options, hl);
            continue;
        }

        if let Some(m) = line::doctest(body) {
            out.push(VisualDirective {
                span: Span {
                    start: base + m.prefix_len,
                    end: base + m.marker_end,
                },
                style: StyleTag::DoctestMarker,
                hidden: false,
            });
            let payload = Span {
                start: base + m.payload_start,
                end: base + body.len(),
            };
            if !payload.is_empty() {
                out.push(VisualDirective {
                    span: payload,
                    style: StyleTag::DoctestCode,
                    hidden: false,
                });
                let text = &body[m.payload_start..];
                for (span, cs) in hl.highlight(text, payload.start, LanguageMode::Snippet) {
                    out.push(VisualDirective {
                        span,
                        style: StyleTag::Code(cs),
                        hidden: false,
                    });
                }
            }
            continue;
        }

        emit_quotes(&mut out, body, base, options, hl);
    }
    out
}

fn emit_title(out: &mut Vec<VisualDirective>, block: &TitleBlock, options: &MarkupOptions) {
    let hide = options.hide_title_markup;
    let style = title_style(block.level(&options.title_styles));

    if !block.marker.is_empty() {
        out.push(VisualDirective {
            span: block.marker,
            style: StyleTag::TitleMarkup,
            hidden: hide,
        });
    }
    out.push(VisualDirective {
        span: block.text,
        style: StyleTag::Title(style),
        hidden: false,
    });
    if !block.underline_marker.is_empty() {
        out.push(VisualDirective {
            span: block.underline_marker,
            style: StyleTag::TitleMarkup,
            hidden: hide,
        });
    }
    out.push(VisualDirective {
        span: block.underline,
        style: if hide {
            StyleTag::UnderlineThin
        } else {
            StyleTag::TitleMarkup
        },
        hidden: hide,
    });
}

fn emit_quotes(
    out: &mut Vec<VisualDirective>,
    body: &str,
    base: usize,
    options: &MarkupOptions,
    hl: &mut dyn CodeHighlighter,
) {
    for q in quoted_spans(body, base) {
        let full = q.full();
        let inner = q.inner();
        out.push(VisualDirective {
            span: Span {
                start: full.start,
                end: inner.start,
            },
            style: StyleTag::QuoteDelimiter,
            hidden: options.hide_quotes,
        });
        match q {
            QuotedSpan::Single { .. } => {
                out.push(VisualDirective {
                    span: inner,
                    style: StyleTag::LiteralSingle,
                    hidden: false,
                });
            }
            QuotedSpan::Double { .. } => {
                out.push(VisualDirective {
                    span: inner,
                    style: StyleTag::LiteralDouble,
                    hidden: false,
                });
                let text = &body[inner.start - base..inner.end - base];
                for (span, cs) in hl.highlight(text, inner.start, LanguageMode::Literal) {
                    out.push(VisualDirective {
                        span,
                        style: StyleTag::Code(cs),
                        hidden: false,
                    });
                }
            }
        }
        out.push(VisualDirective {
            span: Span {
                start: inner.end,
                end: full.end,
            },
            style: StyleTag::QuoteDelimiter,
            hidden: options.hide_quotes,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records invocations and styles each fragment wholesale as a keyword.
    #[derive(Default)]
    struct EchoHighlighter {
        calls: Vec<(String, usize, LanguageMode)>,
    }

    impl CodeHighlighter for EchoHighlighter {
        fn highlight(
            &mut self,
            source: &str,
            base: usize,
            mode: LanguageMode,
        ) -> Vec<(Span, CodeStyle)> {
            self.calls.push((source.to_string(), base, mode));
            vec![(
                Span {
                    start: base,
                    end: base + source.len(),
                },
                CodeStyle::Keyword,
            )]
        }
    }

    fn run(text: &str, options: &MarkupOptions) -> Vec<VisualDirective> {
        let rope = Rope::from(text);
        let len = rope.len();
        annotate(&rope, 0..len, options, &mut NullHighlighter)
    }

    #[test]
    fn title_block_directives() {
        let got = run("Intro\n=====\n", &MarkupOptions::default());
        assert_eq!(got, vec![
            VisualDirective {
                span: Span { start: 0, end: 5 },
                style: StyleTag::Title(TitleStyle::Level1),
                hidden: false,
            },
            VisualDirective {
                span: Span { start: 6, end: 11 },
                style: StyleTag::TitleMarkup,
                hidden: false,
            },
        ]);
    }

    #[test]
    fn hidden_title_markup_swaps_underline_style() {
        let options = MarkupOptions {
            hide_title_markup: true,
            ..Default::default()
        };
        let got = run("# Intro\n# -----\n", &options);
        assert_eq!(got, vec![
            VisualDirective {
                span: Span { start: 0, end: 2 },
                style: StyleTag::TitleMarkup,
                hidden: true,
            },
            VisualDirective {
                span: Span { start: 2, end: 7 },
                style: StyleTag::Title(TitleStyle::Level2),
                hidden: false,
            },
            VisualDirective {
                span: Span { start: 8, end: 10 },
                style: StyleTag::TitleMarkup,
                hidden: true,
            },
            VisualDirective {
                span: Span { start: 10, end: 15 },
                style: StyleTag::UnderlineThin,
                hidden: true,
            },
        ]);
    }

    #[test]
    fn doc_comment_line_styles_prose_and_marker() {
        let got = run("## some prose\n", &MarkupOptions::default());
        assert_eq!(got, vec![
            VisualDirective {
                span: Span { start: 0, end: 13 },
                style: StyleTag::Prose,
                hidden: false,
            },
            VisualDirective {
                span: Span { start: 0, end: 3 },
                style: StyleTag::ProseMarker,
                hidden: false,
            },
        ]);
    }

    #[test]
    fn doctest_line_invokes_the_highlighter() {
        let rope = Rope::from(">>> a + 1\n");
        let mut hl = EchoHighlighter::default();
        let got = annotate(&rope, 0..rope.len(), &MarkupOptions::default(), &mut hl);
        assert_eq!(hl.calls, vec![(
            "a + 1".to_string(),
            4,
            LanguageMode::Snippet
        )]);
        assert_eq!(got, vec![
            VisualDirective {
                span: Span { start: 0, end: 3 },
                style: StyleTag::DoctestMarker,
                hidden: false,
            },
            VisualDirective {
                span: Span { start: 4, end: 9 },
                style: StyleTag::DoctestCode,
                hidden: false,
            },
            VisualDirective {
                span: Span { start: 4, end: 9 },
                style: StyleTag::Code(CodeStyle::Keyword),
                hidden: false,
            },
        ]);
    }

    #[test]
    fn bare_doctest_marker_has_no_payload_directive() {
        let got = run(">>>\n", &MarkupOptions::default());
        assert_eq!(got, vec![VisualDirective {
            span: Span { start: 0, end: 3 },
            style: StyleTag::DoctestMarker,
            hidden: false,
        }]);
    }

    #[test]
    fn double_quoted_content_is_rehighlighted() {
        let rope = Rope::from("see ``x + y`` done\n");
        let mut hl = EchoHighlighter::default();
        let got = annotate(&rope, 0..rope.len(), &MarkupOptions::default(), &mut hl);
        assert_eq!(hl.calls, vec![(
            "x + y".to_string(),
            6,
            LanguageMode::Literal
        )]);
        let styles: Vec<StyleTag> = got.iter().map(|d| d.style).collect();
        assert_eq!(styles, vec![
            StyleTag::QuoteDelimiter,
            StyleTag::LiteralDouble,
            StyleTag::Code(CodeStyle::Keyword),
            StyleTag::QuoteDelimiter,
        ]);
        assert!(got[0].hidden && got[3].hidden);
    }

    #[test]
    fn quote_hiding_follows_its_own_toggle() {
        let options = MarkupOptions {
            hide_quotes: false,
            ..Default::default()
        };
        let got = run("a `b` c\n", &options);
        assert!(got.iter().all(|d| !d.hidden));
    }

    #[test]
    fn plain_and_blank_lines_produce_nothing() {
        assert!(run("just some text\n\n\t\n", &MarkupOptions::default()).is_empty());
    }

    #[test]
    fn annotation_is_idempotent() {
        let text = "Intro\n=====\n## prose with `q`\n>>> 1 + 1\n";
        let first = run(text, &MarkupOptions::default());
        let second = run(text, &MarkupOptions::default());
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn partial_range_annotates_only_its_lines() {
        let text = "## one\n## two\n## three\n";
        let rope = Rope::from(text);
        let got = annotate(&rope, 7..14, &MarkupOptions::default(), &mut NullHighlighter);
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].span, Span { start: 7, end: 13 });
    }
}
