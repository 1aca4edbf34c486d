//! Ownership handles over runtime objects
//!
//! A [`Handle`] owns zero or one object under an [`Ownership`] policy:
//!
//! - [`RefCounted`]: sink on acquire, `unref` on release. Used for widgets
//!   that a parent container also keeps alive.
//! - [`Unique`]: sink on acquire, `destroy` on release. Used for objects that
//!   must go away the moment their owner does, whatever else refers to them.
//! - [`Unmanaged`]: acquire and release do nothing. Used for back-references
//!   into objects owned elsewhere.
//!
//! Handles are move-only. Releasing twice is harmless.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;

use log::trace;

use super::{Object, ObjectId, ObjectType, Runtime};

/// Acquire/release actions applied by a [`Handle`]
pub trait Ownership {
    const NAME: &'static str;

    fn own(rt: &Runtime, id: ObjectId);

    fn unown(rt: &Runtime, id: ObjectId);
}

#[derive(Debug)]
pub enum RefCounted {}

#[derive(Debug)]
pub enum Unique {}

#[derive(Debug)]
pub enum Unmanaged {}

impl Ownership for RefCounted {
    const NAME: &'static str = "ref_counted";

    fn own(rt: &Runtime, id: ObjectId) {
        rt.ref_sink(id);
    }

    fn unown(rt: &Runtime, id: ObjectId) {
        rt.unref(id);
    }
}

impl Ownership for Unique {
    const NAME: &'static str = "unique";

    fn own(rt: &Runtime, id: ObjectId) {
        rt.ref_sink(id);
    }

    fn unown(rt: &Runtime, id: ObjectId) {
        // Already torn down elsewhere, e.g. a window closed by the user.
        if rt.is_alive(id) {
            rt.destroy(id);
        }
    }
}

impl Ownership for Unmanaged {
    const NAME: &'static str = "unmanaged";

    fn own(_: &Runtime, _: ObjectId) {}

    fn unown(_: &Runtime, _: ObjectId) {}
}

/// A freshly created object whose floating reference nobody has claimed.
///
/// Dereferences to the object so it can be configured before being claimed.
/// Consumed by [`Handle::adopt`] or by a container. Dropping it unclaimed
/// releases the floating reference and finalizes the object.
#[must_use = "an unclaimed floating object is finalized when dropped"]
pub struct Floating<T: ObjectType> {
    object: Option<T>,
}

impl<T: ObjectType> Floating<T> {
    pub(crate) fn new(object: T) -> Self {
        Self {
            object: Some(object),
        }
    }

    /// Wrap a raw id that still carries its floating reference
    pub fn from_raw(rt: &Runtime, id: ObjectId) -> Self {
        Self::new(T::wrap(rt, id))
    }

    // Hands the floating reference to the caller, who must sink it.
    pub(crate) fn into_claimed(mut self) -> ObjectId {
        match self.object.take() {
            Some(object) => object.id(),
            None => unreachable!("floating object claimed twice"),
        }
    }

    fn into_object(mut self) -> Option<T> {
        self.object.take()
    }
}

impl<T: ObjectType> Drop for Floating<T> {
    fn drop(&mut self) {
        if let Some(object) = self.object.take() {
            object.runtime().release_floating(object.id());
        }
    }
}

impl<T: ObjectType> Deref for Floating<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.object {
            Some(object) => object,
            None => unreachable!("floating object already claimed"),
        }
    }
}

/// Exclusive owner of at most one object
pub struct Handle<T: ObjectType, P: Ownership> {
    object: T,
    held: bool,
    _policy: PhantomData<P>,
}

impl<T: ObjectType, P: Ownership> Handle<T, P> {
    /// Take ownership of a raw object under policy `P`
    pub fn acquire(rt: &Runtime, id: ObjectId) -> Self {
        P::own(rt, id);
        trace!("acquired {} as {}", id, P::NAME);
        Self {
            object: T::wrap(rt, id),
            held: true,
            _policy: PhantomData,
        }
    }

    /// Take ownership of a freshly created object
    pub fn adopt(floating: Floating<T>) -> Self {
        match floating.into_object() {
            Some(object) => {
                let rt = object.runtime().clone();
                Self::acquire(&rt, object.id())
            }
            None => unreachable!("floating object already claimed"),
        }
    }

    /// Whether this handle still owns its object
    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Run the policy's release action, once
    pub fn release(&mut self) {
        if !self.held {
            return;
        }
        self.held = false;
        trace!("releasing {} as {}", self.object.id(), P::NAME);
        P::unown(self.object.runtime(), self.object.id());
    }

    /// Release what this handle owns, then take over what `other` owns
    pub fn assign(&mut self, other: Handle<T, P>) {
        let mut other = other;
        self.release();
        self.object = other.object.clone();
        self.held = other.held;
        other.held = false;
    }

    pub fn id(&self) -> ObjectId {
        self.object.id()
    }

    /// Non-owning view of the object
    pub fn get(&self) -> &T {
        &self.object
    }
}

impl<T: ObjectType, P: Ownership> Deref for Handle<T, P> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.object
    }
}

impl<T: ObjectType, P: Ownership> Drop for Handle<T, P> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: ObjectType + fmt::Debug, P: Ownership> fmt::Debug for Handle<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("object", &self.object)
            .field("policy", &P::NAME)
            .field("held", &self.held)
            .finish()
    }
}
