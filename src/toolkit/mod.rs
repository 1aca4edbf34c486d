//! Reference-counted widget toolkit
//!
//! The toolkit is organised as capability tiers instead of a class
//! hierarchy: every wrapper is an [`Object`], visual ones are also a
//! [`Widget`], and those that hold children are a [`Container`]. Wrappers are
//! cheap views (an id plus the runtime); they never own anything. Ownership
//! is expressed separately through [`Handle`] and [`Floating`].

// Generates the plain view struct for one object class.
macro_rules! object_type {
    ($(#[$meta:meta])* $name:ident, $kind:expr) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            id: $crate::toolkit::ObjectId,
            rt: $crate::toolkit::Runtime,
        }

        impl $crate::toolkit::Object for $name {
            fn id(&self) -> $crate::toolkit::ObjectId {
                self.id
            }

            fn runtime(&self) -> &$crate::toolkit::Runtime {
                &self.rt
            }
        }

        impl $crate::toolkit::ObjectType for $name {
            const KIND: $crate::toolkit::ObjectKind = $kind;

            fn wrap(rt: &$crate::toolkit::Runtime, id: $crate::toolkit::ObjectId) -> Self {
                Self {
                    id,
                    rt: rt.clone(),
                }
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", stringify!($name), self.id)
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl Eq for $name {}
    };
}

pub(crate) use object_type;

mod handle;
mod runtime;
mod signal;
mod widgets;

pub use handle::{Floating, Handle, Ownership, RefCounted, Unique, Unmanaged};
pub use runtime::{HandlerId, ObjectId, ObjectKind, Runtime, RuntimeStats};
pub use signal::{Callback, Connection, Emission, Key, KeyEvent, LoadEvent, Payload, Propagation};
pub use widgets::{Button, HBox, HeaderBar, Label, Notebook, UriEntry, Window};

/// Anything living in the runtime
pub trait Object {
    fn id(&self) -> ObjectId;

    fn runtime(&self) -> &Runtime;

    fn is_alive(&self) -> bool {
        self.runtime().is_alive(self.id())
    }

    fn connect<F>(&self, signal: &str, f: F) -> Connection
    where
        F: Fn(&Runtime, &Emission<'_>) -> Propagation + 'static,
        Self: Sized,
    {
        self.runtime().connect(self.id(), signal, f)
    }

    fn emit(&self, signal: &str, payload: Payload) -> Propagation {
        self.runtime().emit(self.id(), signal, payload)
    }
}

/// Typed views that can be rebuilt from a raw id
pub trait ObjectType: Object + Clone + Sized {
    const KIND: ObjectKind;

    fn wrap(rt: &Runtime, id: ObjectId) -> Self;
}

/// Visual elements
pub trait Widget: Object {
    fn show(&self) {
        self.runtime().set_visible(self.id(), true);
    }

    /// Show this widget and every descendant
    fn show_all(&self) {
        let rt = self.runtime();
        let mut stack = vec![self.id()];
        while let Some(id) = stack.pop() {
            rt.set_visible(id, true);
            stack.extend(rt.children(id));
        }
    }

    fn hide(&self) {
        self.runtime().set_visible(self.id(), false);
    }

    fn is_visible(&self) -> bool {
        self.runtime().is_visible(self.id())
    }

    fn set_sensitive(&self, sensitive: bool) {
        self.runtime().set_sensitive(self.id(), sensitive);
    }

    fn is_sensitive(&self) -> bool {
        self.runtime().is_sensitive(self.id())
    }

    fn set_can_focus(&self, can_focus: bool) {
        self.runtime().set_can_focus(self.id(), can_focus);
    }

    fn grab_focus(&self) {
        self.runtime().grab_focus(self.id());
    }

    fn has_focus(&self) -> bool {
        self.runtime().has_focus(self.id())
    }

    fn destroy(&self) {
        self.runtime().destroy(self.id());
    }

    fn connect_destroy<F>(&self, f: F) -> Connection
    where
        F: Fn(&Runtime, ObjectId) + 'static,
        Self: Sized,
    {
        self.connect("destroy", move |rt, emission| {
            f(rt, emission.source);
            Propagation::Proceed
        })
    }
}

/// Widgets holding children
pub trait Container: Widget {
    /// Take a reference on an already-owned child
    fn add(&self, child: &dyn Widget) {
        self.runtime().add_child(self.id(), child.id());
    }

    /// Claim a child nobody else owns
    fn add_floating(&self, child: Floating<impl ObjectType>)
    where
        Self: Sized,
    {
        let id = child.into_claimed();
        self.runtime().add_child(self.id(), id);
    }

    fn children(&self) -> Vec<ObjectId> {
        self.runtime().children(self.id())
    }
}
