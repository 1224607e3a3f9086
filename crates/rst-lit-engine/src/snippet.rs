//! Reconstruction of logical interactive snippets from their on-screen
//! lines: the prompt line plus any continuation lines, with markers and
//! comment prefixes stripped and payloads spliced by newline.

use thiserror::Error;
use xi_rope::Rope;

use crate::grammar::line::{DoctestMarker, doctest};
use crate::rope::{LineRef, Span, line_at, next_line, prev_line};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnippetError {
    /// The position does not sit on an interactive snippet line.
    #[error("no interactive snippet at this position")]
    NoSnippet,
}

/// One logical command reconstructed from a snippet block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    /// Payloads of the prompt line and its continuations, joined by newline.
    pub command: String,
    /// Span of the last line consumed, for placing result overlays.
    pub last_line: Span,
}

/// An ordered run of snippets read from one contiguous block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetRun {
    pub snippets: Vec<Snippet>,
    /// Span of the last line consumed by the final snippet.
    pub last_line: Span,
}

/// Reads the single snippet containing `pos`.
///
/// Climbs from a continuation line to its prompt line, then collects
/// continuations downward. Fails with [`SnippetError::NoSnippet`] when the
/// line at `pos` is not a snippet line at all.
pub fn snippet_at(rope: &Rope, pos: usize) -> Result<Snippet, SnippetError> {
    let mut line = line_at(rope, pos);
    let mut m = doctest(line.body()).ok_or(SnippetError::NoSnippet)?;

    while m.marker == DoctestMarker::Continuation {
        let Some(above) = prev_line(rope, line.span.start) else {
            break;
        };
        let Some(am) = doctest(above.body()) else {
            break;
        };
        line = above;
        m = am;
    }

    Ok(collect_from(rope, line))
}

/// Reads the whole contiguous snippet block around `pos` as an ordered
/// sequence of logical commands.
///
/// Skips backward over the block's preceding snippet lines first, then
/// re-reads single snippets forward until a non-snippet line. Fails with
/// [`SnippetError::NoSnippet`] when `pos` is not on a snippet line.
pub fn snippet_run_at(rope: &Rope, pos: usize) -> Result<SnippetRun, SnippetError> {
    let mut line = line_at(rope, pos);
    doctest(line.body()).ok_or(SnippetError::NoSnippet)?;

    while let Some(above) = prev_line(rope, line.span.start) {
        if doctest(above.body()).is_some() {
            line = above;
        } else {
            break;
        }
    }

    let mut snippets = Vec::new();
    loop {
        let snip = collect_from(rope, line.clone());
        let last = snip.last_line;
        snippets.push(snip);
        match next_line(rope, last.start) {
            Some(below) if doctest(below.body()).is_some() => line = below,
            _ => break,
        }
    }

    let last_line = snippets.last().map(|s| s.last_line).unwrap_or(line.span);
    Ok(SnippetRun {
        snippets,
        last_line,
    })
}

/// Collects one snippet starting at `first`, which must already be a
/// snippet line: the line itself plus every directly following
/// continuation line.
fn collect_from(rope: &Rope, first: LineRef) -> Snippet {
    let mut payloads = vec![payload_of(&first)];
    let mut cur = first;
    loop {
        let Some(below) = next_line(rope, cur.span.start) else {
            break;
        };
        let Some(bm) = doctest(below.body()) else {
            break;
        };
        if bm.marker != DoctestMarker::Continuation {
            break;
        }
        payloads.push(payload_of(&below));
        cur = below;
    }
    Snippet {
        command: payloads.join("\n"),
        last_line: cur.span,
    }
}

fn payload_of(line: &LineRef) -> String {
    let body = line.body();
    match doctest(body) {
        Some(m) => body[m.payload_start..].to_string(),
        None => String::new(),
    }
}
