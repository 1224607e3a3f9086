use xi_rope::Rope;

use crate::rope::{Span, display_len, line_at, next_line, prev_line};

use super::line;

/// A recognized two-line title block: a title text line directly above an
/// underline line of repeated punctuation.
///
/// Recognized transiently on every annotation pass; never stored. All
/// fields are spans into the buffer so the block can be restyled or
/// rewritten in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleBlock {
    /// Both lines, including the underline's trailing newline if present.
    pub span: Span,
    /// Comment marker prefix on the title line (may be empty).
    pub marker: Span,
    /// The title text, trailing blanks excluded.
    pub text: Span,
    /// Comment marker prefix on the underline line (may be empty).
    pub underline_marker: Span,
    /// The run of underline characters.
    pub underline: Span,
    /// The underline character.
    pub ch: char,
}

impl TitleBlock {
    /// Matches a title block whose *first* line contains `pos`.
    pub fn at_line(rope: &Rope, pos: usize) -> Option<TitleBlock> {
        let first = line_at(rope, pos);
        let tm = line::title_text(first.body())?;
        let below = next_line(rope, pos)?;
        let um = line::underline(below.body())?;
        let base = first.span.start;
        let ubase = below.span.start;
        Some(TitleBlock {
            span: Span {
                start: base,
                end: below.span.end,
            },
            marker: Span {
                start: base,
                end: base + tm.marker_len,
            },
            text: Span {
                start: base + tm.text_start,
                end: base + tm.text_end,
            },
            underline_marker: Span {
                start: ubase,
                end: ubase + um.marker_len,
            },
            underline: Span {
                start: ubase + um.marker_len,
                end: ubase + um.marker_len + um.run_len,
            },
            ch: um.ch,
        })
    }

    /// Matches the title block containing `pos` on either of its lines.
    ///
    /// When the line at `pos` could both close a block above and open one
    /// below (a punctuation run sandwiched between two candidates), the
    /// block above wins: the line is already claimed as an underline.
    pub fn containing(rope: &Rope, pos: usize) -> Option<TitleBlock> {
        if let Some(above) = prev_line(rope, pos) {
            let here = line_at(rope, pos);
            if line::underline(here.body()).is_some() {
                if let Some(block) = TitleBlock::at_line(rope, above.span.start) {
                    if block.underline_marker.start == here.span.start
                        || block.underline.start == here.span.start
                    {
                        return Some(block);
                    }
                }
            }
        }
        TitleBlock::at_line(rope, pos)
    }

    /// The underline character's position in the ordered style list, or
    /// `None` if the character is not a configured style.
    pub fn level(&self, styles: &[char]) -> Option<usize> {
        styles.iter().position(|&c| c == self.ch)
    }

    /// Display length of the title text in characters.
    pub fn title_len(&self, rope: &Rope) -> usize {
        display_len(rope, self.text)
    }

    /// Display length of the underline run in characters.
    pub fn underline_len(&self, rope: &Rope) -> usize {
        display_len(rope, self.underline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &[char] = &['=', '-', '~'];

    #[test]
    fn matches_bare_title_block() {
        let rope = Rope::from("Section\n=======\nbody\n");
        let block = TitleBlock::at_line(&rope, 3).unwrap();
        assert_eq!(block.text, Span { start: 0, end: 7 });
        assert_eq!(block.underline, Span { start: 8, end: 15 });
        assert_eq!(block.span, Span { start: 0, end: 16 });
        assert_eq!(block.ch, '=');
        assert_eq!(block.level(STYLES), Some(0));
        assert!(block.marker.is_empty());
    }

    #[test]
    fn matches_commented_title_block() {
        let rope = Rope::from("# Heading\n# -------\n");
        let block = TitleBlock::at_line(&rope, 0).unwrap();
        assert_eq!(block.marker, Span { start: 0, end: 2 });
        assert_eq!(block.text, Span { start: 2, end: 9 });
        assert_eq!(block.underline_marker, Span { start: 10, end: 12 });
        assert_eq!(block.underline, Span { start: 12, end: 19 });
        assert_eq!(block.level(STYLES), Some(1));
    }

    #[test]
    fn unknown_underline_char_has_no_level() {
        let rope = Rope::from("Heading\n+++++++\n");
        let block = TitleBlock::at_line(&rope, 0).unwrap();
        assert_eq!(block.ch, '+');
        assert_eq!(block.level(STYLES), None);
    }

    #[test]
    fn text_line_alone_is_not_a_block() {
        let rope = Rope::from("Heading\nplain body\n");
        assert!(TitleBlock::at_line(&rope, 0).is_none());
    }

    #[test]
    fn containing_finds_block_from_underline_line() {
        let rope = Rope::from("Heading\n=======\n");
        let from_underline = TitleBlock::containing(&rope, 9).unwrap();
        let from_text = TitleBlock::containing(&rope, 2).unwrap();
        assert_eq!(from_underline, from_text);
    }

    #[test]
    fn containing_prefers_block_above_for_stacked_runs() {
        // The "=====" line is the underline of "Heading", even though it
        // could also be read as a title text line for the run below it.
        let rope = Rope::from("Heading\n=======\n-------\n");
        let block = TitleBlock::containing(&rope, 9).unwrap();
        assert_eq!(block.text, Span { start: 0, end: 7 });
        assert_eq!(block.ch, '=');
    }

    #[test]
    fn title_and_underline_lengths() {
        let rope = Rope::from("Wide\n====== \n");
        let block = TitleBlock::at_line(&rope, 0).unwrap();
        assert_eq!(block.title_len(&rope), 4);
        assert_eq!(block.underline_len(&rope), 6);
    }
}
