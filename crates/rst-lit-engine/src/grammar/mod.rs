//! The pattern grammar: stateless recognizers for every markup construct.
//!
//! Line-oriented constructs (comment markers, doc comments, doctest lines,
//! title underlines) live in [`line`]; the two-line title-block pairing in
//! [`title`]; inline quoted spans in [`inline`]. All recognizers are pure
//! functions of text and position.

pub mod cursor;
pub mod inline;
pub mod line;
pub mod title;

pub use inline::{QuotedSpan, quoted_spans};
pub use line::{
    CONTINUATION_MARKER, DocCommentMatch, DoctestMarker, DoctestMatch, LOUD, MARKER,
    PRIMARY_MARKER, TitleTextMatch, UnderlineMatch,
};
pub use title::TitleBlock;
