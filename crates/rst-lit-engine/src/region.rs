//! Widening of invalidated ranges to whole multi-line constructs.
//!
//! A title and its underline render as one visual unit, so an edit
//! touching either line must refresh both. The extension never shrinks
//! the input range and reports whether it grew, letting callers detect
//! the fixed point instead of re-invalidating forever.

use std::ops::Range;

use xi_rope::Rope;

use crate::grammar::TitleBlock;
use crate::rope::{line_bounds, prev_line};

/// Extends `range` to cover whole title blocks it intersects.
///
/// Returns the extended range and whether it differs from the input.
/// The start moves to the beginning of its line, or one line further up
/// when the line above pairs with it as a title block; the end moves to
/// the end of the last touched line, or through the underline below when
/// that line opens a title block.
pub fn extend(rope: &Rope, range: Range<usize>) -> (Range<usize>, bool) {
    let len = rope.len();
    let start = range.start.min(len);
    let end = range.end.clamp(start, len);

    // Backward pass: line start, then the title line above the underline.
    let start_line = line_bounds(rope, start);
    let mut beg = start_line.start;
    if let Some(above) = prev_line(rope, start) {
        if let Some(block) = TitleBlock::at_line(rope, above.span.start) {
            if block.span.end == start_line.end {
                beg = block.span.start;
            }
        }
    }

    // Forward pass: anchored on the last byte actually covered, so a range
    // ending exactly on a line boundary does not leak into the next line.
    let last_pos = if end > start { end - 1 } else { start };
    let last_line = line_bounds(rope, last_pos);
    let mut new_end = match TitleBlock::at_line(rope, last_line.start) {
        Some(block) => block.span.end,
        None => last_line.end,
    };
    new_end = new_end.max(end);

    let extended = beg..new_end;
    let changed = extended != range;
    (extended, changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widens_to_whole_line() {
        let rope = Rope::from("first line\nsecond line\n");
        let (r, changed) = extend(&rope, 13..15);
        assert_eq!(r, 11..23);
        assert!(changed);
    }

    #[test]
    fn edit_in_title_text_pulls_in_underline() {
        let rope = Rope::from("Title\n=====\nbody\n");
        let (r, changed) = extend(&rope, 2..3);
        assert_eq!(r, 0..12);
        assert!(changed);
    }

    #[test]
    fn edit_in_underline_pulls_in_title() {
        let rope = Rope::from("before\nTitle\n=====\nafter\n");
        let (r, changed) = extend(&rope, 14..15);
        assert_eq!(r, 7..19);
        assert!(changed);
    }

    #[test]
    fn reaches_fixed_point_within_two_iterations() {
        let rope = Rope::from("before\nTitle\n=====\nafter\n");
        let (first, _) = extend(&rope, 9..10);
        let (second, changed) = extend(&rope, first.clone());
        assert_eq!(first, second);
        assert!(!changed);
    }

    #[test]
    fn range_ending_on_line_boundary_does_not_creep() {
        let rope = Rope::from("one\ntwo\nthree\n");
        let (r, _) = extend(&rope, 0..4);
        assert_eq!(r, 0..4);
        let (r2, changed) = extend(&rope, r);
        assert_eq!(r2, 0..4);
        assert!(!changed);
    }

    #[test]
    fn never_shrinks_the_input() {
        let rope = Rope::from("alpha\nbeta\n");
        let (r, changed) = extend(&rope, 0..11);
        assert_eq!(r, 0..11);
        assert!(!changed);
    }

    #[test]
    fn empty_range_covers_its_line() {
        let rope = Rope::from("one\ntwo\n");
        let (r, changed) = extend(&rope, 5..5);
        assert_eq!(r, 4..8);
        assert!(changed);
    }

    #[test]
    fn clamps_out_of_bounds_input() {
        let rope = Rope::from("line\n");
        let (r, _) = extend(&rope, 99..120);
        assert_eq!(r, 5..5);
    }
}
