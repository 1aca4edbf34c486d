//! Single-threaded object runtime
//!
//! Every object the toolkit or the web engine creates lives in this arena.
//! Objects start out with one *floating* reference that belongs to nobody;
//! `ref_sink` turns it into a real reference owned by whoever sank it.
//! Objects are finalized when their count reaches zero or when they are
//! explicitly destroyed, whichever comes first.
//!
//! Ids carry a generation, so an id that outlives its object never aliases a
//! newer one. Operations on dead ids are logged and ignored.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::{trace, warn};

use super::signal::{Callback, Connection, Emission, Payload, Propagation};

/// Stable address of an object for as long as it lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    slot: u32,
    generation: u32,
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.slot, self.generation)
    }
}

/// Identifier of one handler on one object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(pub(crate) u64);

/// Concrete class of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Window,
    HeaderBar,
    HBox,
    Button,
    Label,
    UriEntry,
    Notebook,
    WebView,
    BackForwardList,
}

/// Counters of lifecycle calls, mostly useful to tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    pub created: u64,
    pub sinks: u64,
    pub refs: u64,
    pub unrefs: u64,
    pub destroys: u64,
    pub finalized: u64,
}

struct Handler {
    id: HandlerId,
    signal: String,
    callback: Callback,
}

struct Record {
    kind: ObjectKind,
    refs: u32,
    floating: bool,
    finalizing: bool,
    parent: Option<ObjectId>,
    // Strong references this object holds on others (children, internal parts)
    owned: Vec<ObjectId>,
    handlers: Vec<Handler>,
    text: String,
    sensitive: bool,
    visible: bool,
    can_focus: bool,
    data: Option<Box<dyn Any>>,
}

impl Record {
    fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            refs: 1,
            floating: true,
            finalizing: false,
            parent: None,
            owned: Vec::new(),
            handlers: Vec::new(),
            text: String::new(),
            sensitive: true,
            visible: false,
            can_focus: true,
            data: None,
        }
    }
}

struct Slot {
    generation: u32,
    record: Option<Record>,
}

#[derive(Default)]
struct Inner {
    slots: Vec<Slot>,
    free: Vec<u32>,
    next_handler: u64,
    focus: Option<ObjectId>,
    stats: RuntimeStats,
}

impl Inner {
    fn record(&self, id: ObjectId) -> Option<&Record> {
        self.slots
            .get(id.slot as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.record.as_ref())
    }

    fn record_mut(&mut self, id: ObjectId) -> Option<&mut Record> {
        self.slots
            .get_mut(id.slot as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.record.as_mut())
    }
}

/// Shared handle to the object arena. Cloning is cheap and yields the same
/// runtime.
#[derive(Clone, Default)]
pub struct Runtime {
    inner: Rc<RefCell<Inner>>,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("live_objects", &self.live_objects())
            .field("stats", &self.stats())
            .finish()
    }
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new object holding a single floating reference
    pub fn create(&self, kind: ObjectKind) -> ObjectId {
        let mut inner = self.inner.borrow_mut();
        inner.stats.created += 1;
        let id = match inner.free.pop() {
            Some(slot) => {
                let entry = &mut inner.slots[slot as usize];
                entry.record = Some(Record::new(kind));
                ObjectId {
                    slot,
                    generation: entry.generation,
                }
            }
            None => {
                let slot = inner.slots.len() as u32;
                inner.slots.push(Slot {
                    generation: 0,
                    record: Some(Record::new(kind)),
                });
                ObjectId {
                    slot,
                    generation: 0,
                }
            }
        };
        trace!("created {:?} {}", kind, id);
        id
    }

    // Mutate a live record; warn and skip when the id is dead.
    fn edit<R>(
        &self,
        id: ObjectId,
        op: &str,
        f: impl FnOnce(&mut Record, &mut RuntimeStats) -> R,
    ) -> Option<R> {
        let mut inner = self.inner.borrow_mut();
        let Inner { slots, stats, .. } = &mut *inner;
        let record = slots
            .get_mut(id.slot as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.record.as_mut());
        match record {
            Some(record) => Some(f(record, stats)),
            None => {
                warn!("{op}: object {id} is no longer alive");
                None
            }
        }
    }

    fn peek<R>(&self, id: ObjectId, f: impl FnOnce(&Record) -> R) -> Option<R> {
        self.inner.borrow().record(id).map(f)
    }

    pub fn is_alive(&self, id: ObjectId) -> bool {
        self.peek(id, |_| ()).is_some()
    }

    pub fn kind(&self, id: ObjectId) -> Option<ObjectKind> {
        self.peek(id, |r| r.kind)
    }

    pub fn ref_count(&self, id: ObjectId) -> Option<u32> {
        self.peek(id, |r| r.refs)
    }

    pub fn is_floating(&self, id: ObjectId) -> Option<bool> {
        self.peek(id, |r| r.floating)
    }

    pub fn live_objects(&self) -> usize {
        self.inner
            .borrow()
            .slots
            .iter()
            .filter(|slot| slot.record.is_some())
            .count()
    }

    pub fn stats(&self) -> RuntimeStats {
        self.inner.borrow().stats
    }

    // ---- reference counting ----

    /// Claim the floating reference, or add a strong one if already claimed
    pub fn ref_sink(&self, id: ObjectId) {
        self.edit(id, "ref_sink", |r, stats| {
            stats.sinks += 1;
            if r.floating {
                r.floating = false;
            } else {
                r.refs += 1;
            }
        });
    }

    pub fn add_ref(&self, id: ObjectId) {
        self.edit(id, "ref", |r, stats| {
            stats.refs += 1;
            r.refs += 1;
        });
    }

    pub fn unref(&self, id: ObjectId) {
        let last = self.edit(id, "unref", |r, stats| {
            stats.unrefs += 1;
            r.refs = r.refs.saturating_sub(1);
            r.refs == 0
        });
        if last == Some(true) {
            self.finalize(id);
        }
    }

    /// Drop the floating reference if nobody has claimed it yet
    pub fn release_floating(&self, id: ObjectId) {
        let Some(last) = self.peek(id, |r| r.floating && r.refs == 1) else {
            return;
        };
        if last {
            trace!("floating object {} was never claimed", id);
            self.unref(id);
        } else {
            self.edit(id, "release_floating", |r, _| {
                if r.floating {
                    r.floating = false;
                    r.refs -= 1;
                }
            });
        }
    }

    /// Tear the object down now, whatever its reference count
    pub fn destroy(&self, id: ObjectId) {
        if self
            .edit(id, "destroy", |_, stats| stats.destroys += 1)
            .is_some()
        {
            self.finalize(id);
        }
    }

    fn finalize(&self, id: ObjectId) {
        let first = self.peek(id, |r| !r.finalizing).unwrap_or(false);
        if !first {
            return;
        }
        self.edit(id, "finalize", |r, _| r.finalizing = true);

        self.emit(id, "destroy", Payload::None);

        let (record, owned) = {
            let mut inner = self.inner.borrow_mut();
            let parent = inner.record_mut(id).and_then(|r| r.parent.take());
            if let Some(parent) = parent.and_then(|p| inner.record_mut(p)) {
                parent.owned.retain(|child| *child != id);
            }
            if inner.focus == Some(id) {
                inner.focus = None;
            }
            inner.stats.finalized += 1;
            inner.free.push(id.slot);
            let slot = &mut inner.slots[id.slot as usize];
            slot.generation = slot.generation.wrapping_add(1);
            let mut record = slot.record.take();
            let owned = record
                .as_mut()
                .map(|r| std::mem::take(&mut r.owned))
                .unwrap_or_default();
            (record, owned)
        };
        trace!("finalized {}", id);
        // Handlers and data are dropped outside the borrow.
        drop(record);

        for child in owned {
            let _ = self.peek_mut_silent(child, |r| r.parent = None);
            self.unref(child);
        }
    }

    fn peek_mut_silent<R>(&self, id: ObjectId, f: impl FnOnce(&mut Record) -> R) -> Option<R> {
        self.inner.borrow_mut().record_mut(id).map(f)
    }

    // ---- containment ----

    /// Make `parent` hold a strong reference on `child`, claiming it if floating
    pub fn add_child(&self, parent: ObjectId, child: ObjectId) {
        if !self.is_alive(parent) {
            warn!("add_child: parent {parent} is no longer alive");
            return;
        }
        let adopted = self.edit(child, "add_child", |r, _| {
            if r.parent.is_some() {
                false
            } else {
                r.parent = Some(parent);
                true
            }
        });
        match adopted {
            Some(true) => {
                self.ref_sink(child);
                self.peek_mut_silent(parent, |p| p.owned.push(child));
            }
            Some(false) => warn!("add_child: {child} already has a parent"),
            None => {}
        }
    }

    /// Drop the reference `parent` holds on `child`
    pub fn remove_child(&self, parent: ObjectId, child: ObjectId) {
        let held = self
            .peek_mut_silent(parent, |p| {
                let before = p.owned.len();
                p.owned.retain(|c| *c != child);
                before != p.owned.len()
            })
            .unwrap_or(false);
        if held {
            self.peek_mut_silent(child, |c| c.parent = None);
            self.unref(child);
        }
    }

    pub fn parent(&self, id: ObjectId) -> Option<ObjectId> {
        self.peek(id, |r| r.parent).flatten()
    }

    pub fn children(&self, id: ObjectId) -> Vec<ObjectId> {
        self.peek(id, |r| r.owned.clone()).unwrap_or_default()
    }

    // ---- signals ----

    pub fn connect<F>(&self, id: ObjectId, signal: &str, f: F) -> Connection
    where
        F: Fn(&Runtime, &Emission<'_>) -> Propagation + 'static,
    {
        let handler = {
            let mut inner = self.inner.borrow_mut();
            inner.next_handler += 1;
            HandlerId(inner.next_handler)
        };
        self.edit(id, "connect", |r, _| {
            r.handlers.push(Handler {
                id: handler,
                signal: signal.to_string(),
                callback: Rc::new(f),
            });
        });
        trace!("connected {}::{} as {}", id, signal, handler.0);
        Connection::new(id, handler)
    }

    pub(crate) fn disconnect(&self, id: ObjectId, handler: HandlerId) {
        let removed = self.edit(id, "disconnect", |r, _| {
            let before = r.handlers.len();
            r.handlers.retain(|h| h.id != handler);
            before != r.handlers.len()
        });
        if removed == Some(false) {
            warn!("disconnect: handler {} is not connected to {}", handler.0, id);
        }
    }

    pub fn is_connected(&self, id: ObjectId, handler: HandlerId) -> bool {
        self.peek(id, |r| r.handlers.iter().any(|h| h.id == handler))
            .unwrap_or(false)
    }

    /// Number of live handlers on one object
    pub fn handler_count(&self, id: ObjectId) -> usize {
        self.peek(id, |r| r.handlers.len()).unwrap_or(0)
    }

    /// Number of live handlers across the runtime
    pub fn total_handlers(&self) -> usize {
        self.inner
            .borrow()
            .slots
            .iter()
            .filter_map(|slot| slot.record.as_ref())
            .map(|r| r.handlers.len())
            .sum()
    }

    /// Run every handler connected to `signal` on `id`, in connection order.
    ///
    /// No borrow of the arena is held while handlers run, so a handler may
    /// call back into the runtime. A handler disconnected by an earlier one
    /// in the same emission is skipped.
    pub fn emit(&self, id: ObjectId, signal: &str, payload: Payload) -> Propagation {
        let callbacks: Option<Vec<(HandlerId, Callback)>> = self.peek(id, |r| {
            r.handlers
                .iter()
                .filter(|h| h.signal == signal)
                .map(|h| (h.id, Rc::clone(&h.callback)))
                .collect()
        });
        let Some(callbacks) = callbacks else {
            warn!("emit {signal}: object {id} is no longer alive");
            return Propagation::Proceed;
        };

        let emission = Emission {
            source: id,
            signal,
            payload: &payload,
        };
        for (handler, callback) in callbacks {
            if !self.is_connected(id, handler) {
                continue;
            }
            if callback(self, &emission) == Propagation::Stop {
                return Propagation::Stop;
            }
        }
        Propagation::Proceed
    }

    // ---- properties ----

    pub fn text(&self, id: ObjectId) -> Option<String> {
        self.peek(id, |r| r.text.clone())
    }

    pub fn set_text(&self, id: ObjectId, text: &str) {
        self.edit(id, "set_text", |r, _| {
            r.text.clear();
            r.text.push_str(text);
        });
    }

    pub fn is_sensitive(&self, id: ObjectId) -> bool {
        self.peek(id, |r| r.sensitive).unwrap_or(false)
    }

    pub fn set_sensitive(&self, id: ObjectId, sensitive: bool) {
        self.edit(id, "set_sensitive", |r, _| r.sensitive = sensitive);
    }

    pub fn is_visible(&self, id: ObjectId) -> bool {
        self.peek(id, |r| r.visible).unwrap_or(false)
    }

    pub fn set_visible(&self, id: ObjectId, visible: bool) {
        self.edit(id, "set_visible", |r, _| r.visible = visible);
    }

    pub fn set_can_focus(&self, id: ObjectId, can_focus: bool) {
        self.edit(id, "set_can_focus", |r, _| r.can_focus = can_focus);
    }

    pub fn can_focus(&self, id: ObjectId) -> bool {
        self.peek(id, |r| r.can_focus).unwrap_or(false)
    }

    pub fn grab_focus(&self, id: ObjectId) {
        if self.edit(id, "grab_focus", |r, _| r.can_focus) == Some(true) {
            self.inner.borrow_mut().focus = Some(id);
        }
    }

    pub fn has_focus(&self, id: ObjectId) -> bool {
        self.inner.borrow().focus == Some(id)
    }

    pub fn focus(&self) -> Option<ObjectId> {
        self.inner.borrow().focus
    }

    // ---- per-class state ----

    pub fn set_data<T: Any>(&self, id: ObjectId, data: T) {
        self.edit(id, "set_data", |r, _| r.data = Some(Box::new(data)));
    }

    /// Borrow the class state of `id`. `f` runs while the arena is borrowed
    /// and must not call back into the runtime.
    pub fn with_data<T: Any, R>(&self, id: ObjectId, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut inner = self.inner.borrow_mut();
        inner
            .record_mut(id)
            .and_then(|r| r.data.as_mut())
            .and_then(|data| (**data).downcast_mut::<T>())
            .map(f)
    }
}
