//! Events queued by toolkit callbacks for the browser to handle
//!
//! Subscription callbacks never touch browser state. They record what
//! happened, with the ids of the objects involved, and the browser works
//! through the queue in [`super::Browser::pump`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use log::trace;

use super::Shortcut;
use crate::toolkit::{LoadEvent, ObjectId};

/// Something the shell has to react to
#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    // Permanent chrome subscriptions
    EntryActivated,
    PageSwitched { child: ObjectId, index: usize },
    PageAdded { index: usize },
    PageRemoved { index: usize },
    NewTabClicked,
    Shortcut(Shortcut),
    WindowDestroyed,

    // Permanent per-tab subscriptions
    CloseClicked { button: ObjectId },
    TabTitleChanged { view: ObjectId },

    // Bound only while a tab is the active page
    BackClicked,
    ForwardClicked,
    HistoryChanged { list: ObjectId },
    PageTitleChanged { view: ObjectId },
    UriChanged { view: ObjectId },
    LoadChanged { view: ObjectId, event: LoadEvent },
    PageReordered { child: ObjectId, index: usize },
    RefreshRequested { view: ObjectId },
}

/// FIFO of pending shell events. Clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Rc<RefCell<VecDeque<ShellEvent>>>,
}

impl EventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an event to the back of the queue
    pub fn push(&self, event: ShellEvent) {
        trace!("queued {:?}", event);
        self.events.borrow_mut().push_back(event);
    }

    /// Take the oldest event
    pub fn pop(&self) -> Option<ShellEvent> {
        self.events.borrow_mut().pop_front()
    }

    /// Take every pending event
    pub fn drain(&self) -> Vec<ShellEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    /// Drop every pending event
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_is_fifo_and_shared() {
        let queue = EventQueue::new();
        let sender = queue.clone();
        sender.push(ShellEvent::NewTabClicked);
        sender.push(ShellEvent::BackClicked);

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some(ShellEvent::NewTabClicked));
        assert_eq!(queue.drain(), vec![ShellEvent::BackClicked]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clear_discards_pending_events() {
        let queue = EventQueue::new();
        queue.push(ShellEvent::WindowDestroyed);
        queue.clear();
        assert_eq!(queue.pop(), None);
    }
}
