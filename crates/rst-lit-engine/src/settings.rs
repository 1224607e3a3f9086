//! Process-wide markup options shared by every open document session.
//!
//! Toggles are global: flipping one affects all sessions, so the registry
//! keeps an explicit subscriber list and notifies it on every update
//! instead of letting callers reach into per-document state.

use std::cell::RefCell;
use std::rc::Rc;

/// The recognized annotation options.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupOptions {
    /// Hide comment markers and underlines of title blocks.
    pub hide_title_markup: bool,
    /// Hide the backtick delimiters of quoted spans.
    pub hide_quotes: bool,
    /// Temporarily reveal title markup while the cursor sits inside it.
    pub reveal_at_point: bool,
    /// Ordered underline style characters; the position of a title's
    /// underline character in this list is its level.
    pub title_styles: Vec<char>,
}

impl Default for MarkupOptions {
    fn default() -> Self {
        Self {
            hide_title_markup: false,
            hide_quotes: true,
            reveal_at_point: false,
            title_styles: vec!['=', '-', '~'],
        }
    }
}

/// Identifies a subscription so it can be dropped again.
pub type SubscriberId = usize;

type Subscriber = Box<dyn FnMut(&MarkupOptions)>;

/// Options plus the subscriber list notified on every change.
pub struct Settings {
    options: MarkupOptions,
    subscribers: Vec<(SubscriberId, Subscriber)>,
    next_id: SubscriberId,
}

impl Settings {
    pub fn new(options: MarkupOptions) -> Self {
        Self {
            options,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn options(&self) -> &MarkupOptions {
        &self.options
    }

    /// Registers a callback invoked with the new options after every update.
    pub fn subscribe(&mut self, f: Subscriber) -> SubscriberId {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, f));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.subscribers.retain(|(sid, _)| *sid != id);
    }

    /// Applies `f` to the options and notifies every subscriber.
    pub fn update(&mut self, f: impl FnOnce(&mut MarkupOptions)) {
        f(&mut self.options);
        let options = self.options.clone();
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&options);
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(MarkupOptions::default())
    }
}

/// Cheaply cloneable handle to the shared settings.
///
/// The engine is single-threaded by design, so `Rc<RefCell<_>>` suffices.
/// `update` releases its borrow before notifying, so subscribers may read
/// the handle (or re-enter their sessions) while being called.
#[derive(Clone)]
pub struct SettingsHandle(Rc<RefCell<Settings>>);

impl SettingsHandle {
    pub fn new(options: MarkupOptions) -> Self {
        Self(Rc::new(RefCell::new(Settings::new(options))))
    }

    /// A snapshot of the current options.
    pub fn options(&self) -> MarkupOptions {
        self.0.borrow().options().clone()
    }

    pub fn subscribe(&self, f: Subscriber) -> SubscriberId {
        self.0.borrow_mut().subscribe(f)
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.0.borrow_mut().unsubscribe(id)
    }

    pub fn update(&self, f: impl FnOnce(&mut MarkupOptions)) {
        let (mut subscribers, options) = {
            let mut settings = self.0.borrow_mut();
            f(&mut settings.options);
            (
                std::mem::take(&mut settings.subscribers),
                settings.options.clone(),
            )
        };
        for (_, subscriber) in &mut subscribers {
            subscriber(&options);
        }
        let mut settings = self.0.borrow_mut();
        // Keep subscriptions added while notification was running.
        subscribers.append(&mut settings.subscribers);
        settings.subscribers = subscribers;
    }
}

impl Default for SettingsHandle {
    fn default() -> Self {
        Self::new(MarkupOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let options = MarkupOptions::default();
        assert!(!options.hide_title_markup);
        assert!(options.hide_quotes);
        assert!(!options.reveal_at_point);
        assert_eq!(options.title_styles, vec!['=', '-', '~']);
    }

    #[test]
    fn update_notifies_subscribers_with_new_options() {
        use std::cell::Cell;
        use std::rc::Rc;

        let handle = SettingsHandle::default();
        let seen = Rc::new(Cell::new(false));
        let seen_in = seen.clone();
        handle.subscribe(Box::new(move |options| {
            seen_in.set(options.hide_title_markup);
        }));

        handle.update(|o| o.hide_title_markup = true);
        assert!(seen.get());
        assert!(handle.options().hide_title_markup);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        use std::cell::Cell;
        use std::rc::Rc;

        let handle = SettingsHandle::default();
        let count = Rc::new(Cell::new(0));
        let count_in = count.clone();
        let id = handle.subscribe(Box::new(move |_| {
            count_in.set(count_in.get() + 1);
        }));

        handle.update(|o| o.hide_quotes = false);
        handle.unsubscribe(id);
        handle.update(|o| o.hide_quotes = true);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn subscribers_may_read_the_handle_during_notification() {
        use std::cell::Cell;
        use std::rc::Rc;

        let handle = SettingsHandle::default();
        let seen = Rc::new(Cell::new(false));
        let seen_in = seen.clone();
        let reader = handle.clone();
        handle.subscribe(Box::new(move |_| {
            seen_in.set(reader.options().reveal_at_point);
        }));

        handle.update(|o| o.reveal_at_point = true);
        assert!(seen.get());
    }

    #[test]
    fn multiple_subscribers_all_fire() {
        use std::cell::Cell;
        use std::rc::Rc;

        let handle = SettingsHandle::default();
        let count = Rc::new(Cell::new(0));
        for _ in 0..3 {
            let count_in = count.clone();
            handle.subscribe(Box::new(move |_| {
                count_in.set(count_in.get() + 1);
            }));
        }
        handle.update(|o| o.reveal_at_point = true);
        assert_eq!(count.get(), 3);
    }
}
