//! Line-level patterns of the literate-source grammar.
//!
//! Every function here is a pure function of one line of text (without its
//! trailing newline) and returns byte offsets local to that line; callers
//! add the line's start offset to get buffer positions.

use std::sync::OnceLock;

use regex::Regex;

/// Comment marker character of the host source language.
pub const MARKER: char = '#';
/// "Loud" indicator that may follow a run of comment markers.
pub const LOUD: char = '!';
/// Prompt token opening an interactive snippet line.
pub const PRIMARY_MARKER: &str = ">>>";
/// Token continuing a multi-line interactive snippet.
pub const CONTINUATION_MARKER: &str = "...";

fn title_text_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(#*!?[ \t]*)([^#\s].*)$").unwrap())
}

fn comment_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#*!?[ \t]*").unwrap())
}

fn doc_comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(##!?[ \t]+)(.*)$").unwrap())
}

fn doctest_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([ \t#]*)(>>>|\.\.\.)( ?)(.*)$").unwrap())
}

/// Returns true if the line is blank (whitespace only).
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Byte length of the comment marker prefix at the start of the line:
/// zero or more marker characters, an optional loud indicator, trailing
/// blanks. Always matches, possibly with length zero.
pub fn comment_prefix_len(line: &str) -> usize {
    comment_prefix_re()
        .find(line)
        .map(|m| m.end())
        .unwrap_or(0)
}

/// A matched doc-comment line: exactly two markers, optional loud
/// indicator, required whitespace, prose content to end of line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocCommentMatch {
    /// Length of the marker prefix including its required whitespace.
    pub marker_len: usize,
    /// Offset where the prose content begins.
    pub content_start: usize,
}

pub fn doc_comment(line: &str) -> Option<DocCommentMatch> {
    let caps = doc_comment_re().captures(line)?;
    let marker_len = caps.get(1).map(|m| m.end())?;
    Some(DocCommentMatch {
        marker_len,
        content_start: marker_len,
    })
}

/// Which of the two interactive-snippet tokens a line carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoctestMarker {
    /// `>>>`, starting a logical snippet.
    Primary,
    /// `...`, continuing the snippet above.
    Continuation,
}

/// A matched interactive-snippet line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoctestMatch {
    /// Length of the leading run of marker characters and blanks.
    pub prefix_len: usize,
    pub marker: DoctestMarker,
    /// Offset just past the marker token.
    pub marker_end: usize,
    /// Offset where the payload begins (after the optional single space).
    pub payload_start: usize,
}

pub fn doctest(line: &str) -> Option<DoctestMatch> {
    let caps = doctest_re().captures(line)?;
    let prefix = caps.get(1)?;
    let marker = caps.get(2)?;
    let space = caps.get(3)?;
    let kind = match marker.as_str() {
        PRIMARY_MARKER => DoctestMarker::Primary,
        _ => DoctestMarker::Continuation,
    };
    Some(DoctestMatch {
        prefix_len: prefix.end(),
        marker: kind,
        marker_end: marker.end(),
        payload_start: space.end(),
    })
}

/// A matched title underline: optional comment marker, then a run of one
/// repeated punctuation character filling the rest of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnderlineMatch {
    /// Length of the comment marker prefix.
    pub marker_len: usize,
    /// The underline character.
    pub ch: char,
    /// Byte length of the run.
    pub run_len: usize,
}

pub fn underline(line: &str) -> Option<UnderlineMatch> {
    let marker_len = comment_prefix_len(line);
    let run = line[marker_len..].trim_end();
    let mut chars = run.chars();
    let ch = chars.next()?;
    // The regex crate has no backreferences; run uniformity is checked here.
    if !ch.is_ascii_punctuation() || !chars.all(|c| c == ch) {
        return None;
    }
    Some(UnderlineMatch {
        marker_len,
        ch,
        run_len: run.len(),
    })
}

/// A matched title first line: optional comment marker, then text whose
/// first non-blank character is not the marker character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TitleTextMatch {
    /// Length of the comment marker prefix.
    pub marker_len: usize,
    /// Offset where the title text begins.
    pub text_start: usize,
    /// Offset just past the title text (trailing blanks excluded).
    pub text_end: usize,
}

pub fn title_text(line: &str) -> Option<TitleTextMatch> {
    let caps = title_text_re().captures(line)?;
    let prefix = caps.get(1)?;
    Some(TitleTextMatch {
        marker_len: prefix.end(),
        text_start: prefix.end(),
        text_end: line.trim_end().len(),
    })
}
