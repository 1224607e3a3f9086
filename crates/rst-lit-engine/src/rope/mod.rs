pub mod lines;
pub mod slice;
pub mod span;

pub use lines::{LineRef, line_at, line_bounds, lines_in, lines_with_spans, next_line, prev_line};
pub use slice::{display_len, slice_to_string};
pub use span::Span;
