//! Incremental annotation engine for literate source files that mix
//! executable code with reStructuredText-style prose: underlined section
//! titles, interactive `>>>` snippets, and backtick-quoted spans.
//!
//! The engine recognizes markup with a stateless pattern grammar, widens
//! edited ranges to whole multi-line constructs, and re-emits visual
//! directives only for the refreshed range. Host concerns (rendering,
//! cursor events, timers, code highlighting, snippet execution) enter
//! through injected traits; the engine never depends on a specific host.

pub mod annotate;
pub mod grammar;
pub mod region;
pub mod reveal;
pub mod rope;
pub mod session;
pub mod settings;
pub mod snippet;
pub mod titles;

pub use annotate::{
    CodeHighlighter, CodeStyle, LanguageMode, NullHighlighter, StyleTag, TitleStyle,
    VisualDirective, annotate,
};
pub use grammar::{QuotedSpan, TitleBlock};
pub use reveal::{IdleScheduler, REVEAL_DELAY, RevealController, RevealEffect, RevealState};
pub use rope::Span;
pub use session::{ExecBackend, Host, OverlayRenderer, Patch, Session};
pub use settings::{MarkupOptions, Settings, SettingsHandle};
pub use snippet::{Snippet, SnippetError, SnippetRun, snippet_at, snippet_run_at};
pub use titles::{TitleEdit, cycle_title, sync_underline};
