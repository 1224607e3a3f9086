use xi_rope::Rope;

use super::span::Span;

/// Extracts the text for a span from the rope as an owned String.
///
/// This allocates; prefer working with spans where possible.
pub fn slice_to_string(rope: &Rope, sp: Span) -> String {
    let len = rope.len();
    let start = sp.start.min(len);
    let end = sp.end.min(len).max(start);
    rope.slice_to_cow(start..end).into_owned()
}

/// Display length of a span in characters, not bytes.
///
/// Underline synchronization compares this against the underline run, so
/// multi-byte title text gets an underline of matching visual width.
pub fn display_len(rope: &Rope, sp: Span) -> usize {
    slice_to_string(rope, sp).chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_to_string_partial_span() {
        let rope = Rope::from("hello world");
        let sp = Span { start: 6, end: 11 };
        assert_eq!(slice_to_string(&rope, sp), "world");
    }

    #[test]
    fn slice_clamps_out_of_bounds_spans() {
        let rope = Rope::from("short");
        let sp = Span { start: 2, end: 99 };
        assert_eq!(slice_to_string(&rope, sp), "ort");
    }

    #[test]
    fn display_len_counts_chars() {
        let rope = Rope::from("héllo");
        let sp = Span {
            start: 0,
            end: rope.len(),
        };
        assert_eq!(sp.len(), 6);
        assert_eq!(display_len(&rope, sp), 5);
    }
}
