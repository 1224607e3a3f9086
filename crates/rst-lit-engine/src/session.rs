//! One open document: buffer, directive cache, reveal state, overlays,
//! and the user-facing commands, with all host collaborators injected.
//!
//! Everything runs on the thread that owns the buffer. Edits flow
//! through a single pipeline: apply the delta, re-synchronize any title
//! underline the edit touched, widen the invalidated range to whole
//! constructs, re-annotate exactly that range, and splice the result
//! into the cached directives.

use std::collections::BTreeMap;
use std::ops::Range;

use anyhow::{Result, bail};
use xi_rope::Rope;
use xi_rope::delta::Builder;

use crate::annotate::{CodeHighlighter, NullHighlighter, VisualDirective, annotate};
use crate::region;
use crate::reveal::{IdleScheduler, RevealController, RevealEffect};
use crate::rope::Span;
use crate::settings::SettingsHandle;
use crate::snippet::{snippet_at, snippet_run_at};
use crate::titles;

/// The interactive execution target for snippet commands.
///
/// Synchronous from the caller's perspective; failures propagate to the
/// invoking command untouched; the engine has no recovery logic for
/// them.
pub trait ExecBackend {
    /// Hands a command to the execution target without collecting output.
    fn send(&mut self, command: &str) -> Result<()>;
    /// Runs a command and returns its combined output.
    fn execute(&mut self, command: &str) -> Result<String>;
}

/// Renders transient result overlays anchored at buffer positions.
pub trait OverlayRenderer {
    /// Shows `text` at `anchor`, replacing any overlay already there.
    fn show(&mut self, anchor: usize, text: &str);
    fn clear(&mut self, anchor: usize);
}

/// Backend for hosts with no execution target configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableBackend;

impl ExecBackend for UnavailableBackend {
    fn send(&mut self, _: &str) -> Result<()> {
        bail!("no execution backend configured")
    }

    fn execute(&mut self, _: &str) -> Result<String> {
        bail!("no execution backend configured")
    }
}

/// Overlay renderer that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOverlays;

impl OverlayRenderer for NoopOverlays {
    fn show(&mut self, _: usize, _: &str) {}
    fn clear(&mut self, _: usize) {}
}

/// Scheduler for hosts that poll [`Session::idle`] themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopScheduler;

impl IdleScheduler for NoopScheduler {
    fn schedule(&mut self, _: std::time::Duration) {}
}

/// The host collaborators a session is wired to.
pub struct Host {
    pub highlighter: Box<dyn CodeHighlighter>,
    pub exec: Box<dyn ExecBackend>,
    pub overlays: Box<dyn OverlayRenderer>,
    pub scheduler: Box<dyn IdleScheduler>,
}

impl Host {
    /// A host with no highlighter, no execution target, and no rendering.
    pub fn headless() -> Self {
        Self {
            highlighter: Box::new(NullHighlighter),
            exec: Box::new(UnavailableBackend),
            overlays: Box::new(NoopOverlays),
            scheduler: Box::new(NoopScheduler),
        }
    }
}

/// What an edit refreshed, for hosts tracking damage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// The re-annotated range, aligned to whole constructs.
    pub refreshed: Range<usize>,
    /// Buffer version after the edit.
    pub version: u64,
}

pub struct Session {
    buffer: Rope,
    settings: SettingsHandle,
    version: u64,
    cursor: usize,
    directives: Vec<VisualDirective>,
    overlays: BTreeMap<usize, String>,
    reveal: RevealController,
    highlighter: Box<dyn CodeHighlighter>,
    exec: Box<dyn ExecBackend>,
    overlay_view: Box<dyn OverlayRenderer>,
    scheduler: Box<dyn IdleScheduler>,
}

impl Session {
    pub fn new(text: &str, settings: SettingsHandle, host: Host) -> Self {
        let mut session = Self {
            buffer: Rope::from(text),
            settings,
            version: 0,
            cursor: 0,
            directives: Vec::new(),
            overlays: BTreeMap::new(),
            reveal: RevealController::new(),
            highlighter: host.highlighter,
            exec: host.exec,
            overlay_view: host.overlays,
            scheduler: host.scheduler,
        };
        session.reannotate_all();
        session
    }

    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.len() == 0
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn settings(&self) -> &SettingsHandle {
        &self.settings
    }

    /// Current result overlays, keyed by anchor position.
    pub fn overlays(&self) -> &BTreeMap<usize, String> {
        &self.overlays
    }

    /// The cached directives, with hiding suspended inside the reveal
    /// window if one is active.
    pub fn directives(&self) -> Vec<VisualDirective> {
        match self.reveal.window() {
            Some(w) => self
                .directives
                .iter()
                .map(|d| {
                    let mut d = *d;
                    if d.hidden && w.contains(d.span.start) {
                        d.hidden = false;
                    }
                    d
                })
                .collect(),
            None => self.directives.clone(),
        }
    }

    /// Replaces `range` with `text` and refreshes annotation around it.
    ///
    /// If the edit touched a title block, the underline is regenerated to
    /// match the new title length before annotation runs.
    pub fn edit(&mut self, range: Range<usize>, text: &str) -> Patch {
        let len = self.buffer.len();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);
        self.splice(start..end, text);

        let mut invalid = start..start + text.len();
        if let Some(resize) = titles::sync_underline(&self.buffer, invalid.clone()) {
            let espan = resize.span.range();
            let new_end = espan.start + resize.text.len();
            let shift = resize.text.len() as isize - espan.len() as isize;
            self.splice(espan.clone(), &resize.text);

            let inv_end = if invalid.end >= espan.end {
                offset(invalid.end, shift)
            } else {
                invalid.end.min(new_end)
            };
            invalid = invalid.start.min(espan.start)..inv_end.max(new_end);
        }

        let mut refreshed = invalid;
        loop {
            let (r, changed) = region::extend(&self.buffer, refreshed.clone());
            refreshed = r;
            if !changed {
                break;
            }
        }
        self.reannotate(refreshed.clone());

        Patch {
            refreshed,
            version: self.version,
        }
    }

    /// Tracks the cursor and drives the reveal state machine.
    pub fn cursor_moved(&mut self, pos: usize) {
        self.cursor = pos.min(self.buffer.len());
        if let Some(RevealEffect::Restore(w)) = self
            .reveal
            .cursor_moved(self.cursor, self.scheduler.as_mut())
        {
            self.reannotate(w.range());
        }
    }

    /// The debounced reveal check; hosts call this when the scheduler's
    /// timer fires.
    pub fn idle(&mut self) {
        let options = self.settings.options();
        let _ = self.reveal.idle(&self.buffer, self.cursor, &options);
    }

    /// Cycles the title at the cursor through the underline styles.
    pub fn cycle_title(&mut self) -> Option<Patch> {
        let options = self.settings.options();
        let edit = titles::cycle_title(&self.buffer, self.cursor, &options)?;
        Some(self.edit(edit.span.range(), &edit.text))
    }

    /// Reads the snippet at the cursor and hands it to the execution
    /// target.
    pub fn copy_snippet_to_repl(&mut self) -> Result<()> {
        let snip = snippet_at(&self.buffer, self.cursor)?;
        self.exec.send(&snip.command)
    }

    /// Evaluates the snippet at the cursor (or the whole contiguous
    /// block) and shows the combined output as an overlay anchored at
    /// the last consumed line, replacing any previous overlay there.
    pub fn eval_snippet_inline(&mut self, whole_block: bool) -> Result<()> {
        let (commands, anchor) = if whole_block {
            let run = snippet_run_at(&self.buffer, self.cursor)?;
            let anchor = run.last_line.start;
            let commands: Vec<String> = run.snippets.into_iter().map(|s| s.command).collect();
            (commands, anchor)
        } else {
            let snip = snippet_at(&self.buffer, self.cursor)?;
            (vec![snip.command], snip.last_line.start)
        };

        let mut outputs = Vec::with_capacity(commands.len());
        for command in &commands {
            outputs.push(self.exec.execute(command)?);
        }
        let text = outputs.join("\n");
        self.overlays.insert(anchor, text.clone());
        self.overlay_view.show(anchor, &text);
        Ok(())
    }

    pub fn toggle_title_markup(&mut self) {
        self.settings
            .update(|o| o.hide_title_markup = !o.hide_title_markup);
        self.reannotate_all();
    }

    pub fn toggle_quotes_markup(&mut self) {
        self.settings.update(|o| o.hide_quotes = !o.hide_quotes);
        self.reannotate_all();
    }

    pub fn hide_all_markup(&mut self) {
        self.settings.update(|o| {
            o.hide_title_markup = true;
            o.hide_quotes = true;
        });
        self.reannotate_all();
    }

    /// Re-runs annotation over the whole buffer.
    pub fn reannotate_all(&mut self) {
        let options = self.settings.options();
        self.directives = annotate(
            &self.buffer,
            0..self.buffer.len(),
            &options,
            self.highlighter.as_mut(),
        );
    }

    fn reannotate(&mut self, range: Range<usize>) {
        let options = self.settings.options();
        let sp = Span::from(range.clone());
        self.directives.retain(|d| !d.span.intersects(sp));
        let mut fresh = annotate(&self.buffer, range, &options, self.highlighter.as_mut());
        self.directives.append(&mut fresh);
        // Stable by start offset: same-position directives keep emission
        // order, which rendering relies on for overrides.
        self.directives.sort_by_key(|d| d.span.start);
    }

    /// Applies one replacement and shifts cached state around it.
    fn splice(&mut self, range: Range<usize>, text: &str) {
        let mut builder = Builder::new(self.buffer.len());
        builder.replace(range.clone(), Rope::from(text));
        let delta = builder.build();
        self.buffer = delta.apply(&self.buffer);
        self.version += 1;

        let shift = text.len() as isize - range.len() as isize;
        self.directives.retain_mut(|d| {
            if d.span.end <= range.start {
                true
            } else if d.span.start >= range.end {
                d.span.start = offset(d.span.start, shift);
                d.span.end = offset(d.span.end, shift);
                true
            } else {
                false
            }
        });

        let overlays = std::mem::take(&mut self.overlays);
        self.overlays = overlays
            .into_iter()
            .filter_map(|(anchor, text)| {
                if anchor < range.start {
                    Some((anchor, text))
                } else if anchor >= range.end {
                    Some((offset(anchor, shift), text))
                } else {
                    self.overlay_view.clear(anchor);
                    None
                }
            })
            .collect();
    }
}

fn offset(pos: usize, shift: isize) -> usize {
    (pos as isize + shift).max(0) as usize
}
