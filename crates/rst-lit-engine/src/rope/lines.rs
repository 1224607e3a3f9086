use xi_rope::{LinesMetric, Rope};

use super::span::Span;

/// A reference to a single line in the rope with its byte span.
#[derive(Debug, Clone)]
pub struct LineRef {
    /// Byte span of this line in the rope (includes newline if present).
    pub span: Span,
    /// The line text, including its trailing newline if present.
    pub text: String,
}

impl LineRef {
    /// The line text without its trailing newline.
    #[must_use]
    pub fn body(&self) -> &str {
        self.text.trim_end_matches('\n')
    }

    /// Span of the line without its trailing newline.
    #[must_use]
    pub fn body_span(&self) -> Span {
        Span {
            start: self.span.start,
            end: self.span.start + self.body().len(),
        }
    }
}

/// Returns an iterator over all lines with their byte spans.
///
/// Uses `lines_raw` to preserve newline characters, which is important for
/// accurate span tracking during annotation.
pub fn lines_with_spans(rope: &Rope) -> impl Iterator<Item = LineRef> + '_ {
    let mut offset = 0usize;
    rope.lines_raw(..).map(move |line| {
        let start = offset;
        let len = line.len();
        offset += len;
        LineRef {
            span: Span { start, end: offset },
            text: line.into_owned(),
        }
    })
}

/// Returns the span of the line containing `pos`, including its trailing
/// newline if present. `pos` is clamped to the buffer length.
pub fn line_bounds(rope: &Rope, pos: usize) -> Span {
    let len = rope.len();
    let pos = pos.min(len);
    let line = rope.line_of_offset(pos);
    let start = rope.offset_of_line(line);
    let newlines = rope.measure::<LinesMetric>();
    let end = if line >= newlines {
        len
    } else {
        rope.offset_of_line(line + 1)
    };
    Span { start, end }
}

/// The line ref (span + text) for the line containing `pos`.
pub fn line_at(rope: &Rope, pos: usize) -> LineRef {
    let span = line_bounds(rope, pos);
    LineRef {
        span,
        text: rope.slice_to_cow(span.range()).into_owned(),
    }
}

/// The line immediately above the line containing `pos`, if any.
pub fn prev_line(rope: &Rope, pos: usize) -> Option<LineRef> {
    let span = line_bounds(rope, pos);
    if span.start == 0 {
        return None;
    }
    Some(line_at(rope, span.start - 1))
}

/// The line immediately below the line containing `pos`, if any.
pub fn next_line(rope: &Rope, pos: usize) -> Option<LineRef> {
    let span = line_bounds(rope, pos);
    if span.end >= rope.len() {
        return None;
    }
    Some(line_at(rope, span.end))
}

/// All whole lines touching `range`, in order.
///
/// The first line starts at or before `range.start`; the last line covers
/// `range.end` (or the end of the buffer). An empty range still yields its
/// containing line.
pub fn lines_in(rope: &Rope, range: std::ops::Range<usize>) -> Vec<LineRef> {
    let mut out = Vec::new();
    let mut at = range.start.min(rope.len());
    loop {
        let line = line_at(rope, at);
        let end = line.span.end;
        let empty = line.span.is_empty();
        out.push(line);
        if end >= range.end || end >= rope.len() || empty {
            break;
        }
        at = end;
    }
    out
}
