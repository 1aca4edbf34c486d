//! Signal payloads and subscription records

use std::fmt;
use std::rc::Rc;

use super::runtime::{HandlerId, ObjectId, Runtime};

/// Whether an emission continues to the remaining handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Propagation {
    #[default]
    Proceed,
    Stop,
}

/// Keys the shell reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Tab,
    Char(char),
    Digit(u8),
    Other,
}

/// A key press delivered to a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
        }
    }

    pub fn ctrl(key: Key) -> Self {
        Self {
            key,
            ctrl: true,
            shift: false,
        }
    }

    pub fn ctrl_shift(key: Key) -> Self {
        Self {
            key,
            ctrl: true,
            shift: true,
        }
    }
}

/// Progress of a content view load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadEvent {
    Started,
    Redirected,
    Committed,
    Finished,
}

/// Extra data carried by an emission
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    None,
    Page { child: ObjectId, index: usize },
    Load(LoadEvent),
    Key(KeyEvent),
}

/// One signal emission as seen by a handler
#[derive(Debug)]
pub struct Emission<'a> {
    pub source: ObjectId,
    pub signal: &'a str,
    pub payload: &'a Payload,
}

/// Handler stored by the runtime
pub type Callback = Rc<dyn Fn(&Runtime, &Emission<'_>) -> Propagation>;

/// A single registered handler on a single object.
///
/// Holding a `Connection` does not keep the object alive. It must be
/// disconnected before, or at the moment, the object goes away.
/// `disconnect` consumes the value, so a connection cannot be torn down twice.
#[must_use = "a dropped Connection can never be disconnected"]
pub struct Connection {
    object: ObjectId,
    handler: HandlerId,
}

impl Connection {
    pub(crate) fn new(object: ObjectId, handler: HandlerId) -> Self {
        Self { object, handler }
    }

    pub fn object(&self) -> ObjectId {
        self.object
    }

    pub fn handler(&self) -> HandlerId {
        self.handler
    }

    /// Whether the runtime still dispatches to this handler
    pub fn is_live(&self, rt: &Runtime) -> bool {
        rt.is_connected(self.object, self.handler)
    }

    pub fn disconnect(self, rt: &Runtime) {
        rt.disconnect(self.object, self.handler);
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Connection({}#{})", self.object, self.handler.0)
    }
}
