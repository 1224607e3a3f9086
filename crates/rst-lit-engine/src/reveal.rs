//! Cursor-driven reveal of hidden title markup.
//!
//! A two-state machine: markup is hidden by default; while the cursor
//! rests inside a title block, that block's markup is temporarily shown
//! at normal width. Evaluation is debounced through an injected
//! scheduler so rapid cursor movement does not re-match the grammar on
//! every step. Revealing never touches the buffer, only its display.

use std::time::Duration;

use xi_rope::Rope;

use crate::grammar::TitleBlock;
use crate::rope::Span;
use crate::settings::MarkupOptions;

/// Debounce delay between a cursor move and the reveal check.
pub const REVEAL_DELAY: Duration = Duration::from_millis(50);

/// Host-provided one-shot idle timer.
///
/// Scheduling while a timer is pending replaces it; at most one callback
/// is ever outstanding. When the delay elapses the host calls the
/// session's idle entry point.
pub trait IdleScheduler {
    fn schedule(&mut self, delay: Duration);
}

/// Whether a title span is currently revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    Hidden,
    Revealed(Span),
}

/// What the host must refresh after a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealEffect {
    /// The cursor left the window: re-annotate it so markup re-hides.
    Restore(Span),
    /// The cursor settled inside a title block: suspend hiding within.
    Expose(Span),
}

#[derive(Debug)]
pub struct RevealController {
    state: RevealState,
}

impl RevealController {
    pub fn new() -> Self {
        Self {
            state: RevealState::Hidden,
        }
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    /// The currently revealed span, if any.
    pub fn window(&self) -> Option<Span> {
        match self.state {
            RevealState::Revealed(w) => Some(w),
            RevealState::Hidden => None,
        }
    }

    /// Reacts to a cursor move and (re)arms the debounce timer.
    ///
    /// Leaving a revealed window drops back to hidden immediately; the
    /// returned effect names the span whose hiding must be restored.
    pub fn cursor_moved(
        &mut self,
        pos: usize,
        scheduler: &mut dyn IdleScheduler,
    ) -> Option<RevealEffect> {
        let effect = match self.state {
            RevealState::Revealed(w) if !w.contains(pos) => {
                self.state = RevealState::Hidden;
                Some(RevealEffect::Restore(w))
            }
            _ => None,
        };
        scheduler.schedule(REVEAL_DELAY);
        effect
    }

    /// The debounced check, run by the host when the timer fires.
    ///
    /// Enters the revealed state when reveal-at-point is enabled and the
    /// cursor line belongs to a title block.
    pub fn idle(
        &mut self,
        rope: &Rope,
        pos: usize,
        options: &MarkupOptions,
    ) -> Option<RevealEffect> {
        if !options.reveal_at_point {
            return None;
        }
        let block = TitleBlock::containing(rope, pos)?;
        if self.state == RevealState::Revealed(block.span) {
            return None;
        }
        self.state = RevealState::Revealed(block.span);
        Some(RevealEffect::Expose(block.span))
    }
}

impl Default for RevealController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingScheduler {
        armed: usize,
    }

    impl IdleScheduler for CountingScheduler {
        fn schedule(&mut self, _delay: Duration) {
            self.armed += 1;
        }
    }

    fn options_with_reveal() -> MarkupOptions {
        MarkupOptions {
            reveal_at_point: true,
            ..Default::default()
        }
    }

    #[test]
    fn idle_inside_title_reveals_the_block() {
        let rope = Rope::from("Title\n=====\nbody\n");
        let mut ctl = RevealController::new();
        let effect = ctl.idle(&rope, 2, &options_with_reveal());
        assert_eq!(
            effect,
            Some(RevealEffect::Expose(Span { start: 0, end: 12 }))
        );
        assert_eq!(ctl.window(), Some(Span { start: 0, end: 12 }));
    }

    #[test]
    fn idle_respects_the_toggle() {
        let rope = Rope::from("Title\n=====\n");
        let mut ctl = RevealController::new();
        assert_eq!(ctl.idle(&rope, 2, &MarkupOptions::default()), None);
        assert_eq!(ctl.state(), RevealState::Hidden);
    }

    #[test]
    fn idle_outside_any_title_does_nothing() {
        let rope = Rope::from("Title\n=====\nbody\n");
        let mut ctl = RevealController::new();
        assert_eq!(ctl.idle(&rope, 14, &options_with_reveal()), None);
    }

    #[test]
    fn leaving_the_window_restores_hiding() {
        let rope = Rope::from("Title\n=====\nbody\n");
        let mut ctl = RevealController::new();
        let mut sched = CountingScheduler::default();
        ctl.idle(&rope, 2, &options_with_reveal());

        // Moving within the window keeps it revealed.
        assert_eq!(ctl.cursor_moved(8, &mut sched), None);
        assert_eq!(ctl.state(), RevealState::Revealed(Span { start: 0, end: 12 }));

        // Moving past the end drops it.
        let effect = ctl.cursor_moved(14, &mut sched);
        assert_eq!(
            effect,
            Some(RevealEffect::Restore(Span { start: 0, end: 12 }))
        );
        assert_eq!(ctl.state(), RevealState::Hidden);
    }

    #[test]
    fn every_cursor_move_rearms_the_timer() {
        let mut ctl = RevealController::new();
        let mut sched = CountingScheduler::default();
        ctl.cursor_moved(0, &mut sched);
        ctl.cursor_moved(1, &mut sched);
        ctl.cursor_moved(2, &mut sched);
        assert_eq!(sched.armed, 3);
    }

    #[test]
    fn re_idling_inside_the_same_window_is_quiet() {
        let rope = Rope::from("Title\n=====\n");
        let mut ctl = RevealController::new();
        let options = options_with_reveal();
        assert!(ctl.idle(&rope, 2, &options).is_some());
        assert_eq!(ctl.idle(&rope, 3, &options), None);
    }
}
