//! Direct manipulation of title markup: style cycling and keeping the
//! underline length in step with the title text.
//!
//! Both operations return a replacement description instead of mutating
//! the buffer; the session compiles it to a delta, so edits flow through
//! the same pipeline as typed text.

use std::ops::Range;

use xi_rope::Rope;

use crate::grammar::{TitleBlock, line};
use crate::rope::{Span, line_at, line_bounds};
use crate::settings::MarkupOptions;

/// A single-range replacement produced by a title command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleEdit {
    pub span: Span,
    pub text: String,
}

/// Length of the underline run inserted by the bare scaffold, where no
/// title text exists yet to size it.
const SCAFFOLD_RUN: usize = 3;

/// Cycles the title at `pos` through the configured underline styles.
///
/// On a full title block: re-synchronize the underline length first if it
/// drifted, otherwise advance to the next style; past the last style the
/// underline line is removed, demoting the title to plain text. On a bare
/// title candidate: add a first-style underline sized to the text. On any
/// other line: insert a fresh marker+title+underline scaffold.
pub fn cycle_title(rope: &Rope, pos: usize, options: &MarkupOptions) -> Option<TitleEdit> {
    let styles = &options.title_styles;
    if styles.is_empty() {
        return None;
    }

    if let Some(block) = TitleBlock::containing(rope, pos) {
        let title_len = block.title_len(rope);
        if block.underline_len(rope) != title_len {
            return Some(TitleEdit {
                span: block.underline,
                text: run(block.ch, title_len),
            });
        }
        return Some(match block.level(styles) {
            Some(i) if i + 1 < styles.len() => TitleEdit {
                span: block.underline,
                text: run(styles[i + 1], title_len),
            },
            Some(_) => TitleEdit {
                span: line_bounds(rope, block.underline.start),
                text: String::new(),
            },
            None => TitleEdit {
                span: block.underline,
                text: run(styles[0], title_len),
            },
        });
    }

    let lr = line_at(rope, pos);
    if let Some(tm) = line::title_text(lr.body()) {
        let marker = &lr.body()[..tm.marker_len];
        let text_len = lr.body()[tm.text_start..tm.text_end].chars().count();
        let underline = run(styles[0], text_len);
        let at = Span {
            start: lr.span.end,
            end: lr.span.end,
        };
        let text = if lr.text.ends_with('\n') {
            format!("{marker}{underline}\n")
        } else {
            format!("\n{marker}{underline}")
        };
        return Some(TitleEdit { span: at, text });
    }

    Some(TitleEdit {
        span: Span {
            start: lr.span.start,
            end: lr.span.start,
        },
        text: format!("# \n# {}\n", run(styles[0], SCAFFOLD_RUN)),
    })
}

/// Regenerates the underline of the title block touched by `edited` so
/// its length matches the title text, preserving the underline character
/// and comment marker. Returns `None` at the fixed point, so the edit
/// loop applying the result terminates.
pub fn sync_underline(rope: &Rope, edited: Range<usize>) -> Option<TitleEdit> {
    let block = TitleBlock::containing(rope, edited.start)
        .or_else(|| TitleBlock::containing(rope, edited.end.min(rope.len())))?;
    let title_len = block.title_len(rope);
    if title_len == 0 || block.underline_len(rope) == title_len {
        return None;
    }
    Some(TitleEdit {
        span: block.underline,
        text: run(block.ch, title_len),
    })
}

fn run(ch: char, len: usize) -> String {
    ch.to_string().repeat(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(text: &str, edit: &TitleEdit) -> String {
        let mut s = text.to_string();
        s.replace_range(edit.span.range(), &edit.text);
        s
    }

    #[test]
    fn advances_to_the_next_style() {
        let text = "Title\n=====\n";
        let edit = cycle_title(&Rope::from(text), 2, &MarkupOptions::default()).unwrap();
        assert_eq!(apply(text, &edit), "Title\n-----\n");
    }

    #[test]
    fn resynchronizes_before_advancing() {
        let text = "# Title\n# ===\n";
        let edit = cycle_title(&Rope::from(text), 3, &MarkupOptions::default()).unwrap();
        assert_eq!(apply(text, &edit), "# Title\n# =====\n");
    }

    #[test]
    fn last_style_removes_the_underline() {
        let text = "Title\n~~~~~\nbody\n";
        let edit = cycle_title(&Rope::from(text), 2, &MarkupOptions::default()).unwrap();
        assert_eq!(apply(text, &edit), "Title\nbody\n");
    }

    #[test]
    fn unknown_style_restarts_the_cycle() {
        let text = "Title\n+++++\n";
        let edit = cycle_title(&Rope::from(text), 2, &MarkupOptions::default()).unwrap();
        assert_eq!(apply(text, &edit), "Title\n=====\n");
    }

    #[test]
    fn bare_candidate_gains_an_underline() {
        let text = "# Heading\nbody\n";
        let edit = cycle_title(&Rope::from(text), 4, &MarkupOptions::default()).unwrap();
        assert_eq!(apply(text, &edit), "# Heading\n# =======\nbody\n");
    }

    #[test]
    fn candidate_at_end_of_buffer_gains_an_underline() {
        let text = "Heading";
        let edit = cycle_title(&Rope::from(text), 3, &MarkupOptions::default()).unwrap();
        assert_eq!(apply(text, &edit), "Heading\n=======");
    }

    #[test]
    fn other_lines_get_a_scaffold() {
        let text = "\nrest\n";
        let edit = cycle_title(&Rope::from(text), 0, &MarkupOptions::default()).unwrap();
        assert_eq!(apply(text, &edit), "# \n# ===\n\nrest\n");
    }

    #[test]
    fn cycling_from_the_underline_line_works_too() {
        let text = "Title\n=====\n";
        let edit = cycle_title(&Rope::from(text), 8, &MarkupOptions::default()).unwrap();
        assert_eq!(apply(text, &edit), "Title\n-----\n");
    }

    #[test]
    fn sync_matches_underline_to_title_length() {
        let text = "# Long title\n# ===\n";
        let edit = sync_underline(&Rope::from(text), 9..10).unwrap();
        assert_eq!(apply(text, &edit), "# Long title\n# ==========\n");
    }

    #[test]
    fn sync_from_the_underline_line() {
        let text = "Title\n===\n";
        let edit = sync_underline(&Rope::from(text), 7..8).unwrap();
        assert_eq!(apply(text, &edit), "Title\n=====\n");
    }

    #[test]
    fn sync_reaches_a_fixed_point() {
        let text = "Title\n=====\n";
        assert_eq!(sync_underline(&Rope::from(text), 2..3), None);
    }

    #[test]
    fn sync_ignores_plain_text() {
        let text = "no markup here\nat all\n";
        assert_eq!(sync_underline(&Rope::from(text), 3..4), None);
    }
}
