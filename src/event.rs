//! Single-threaded publish/subscribe.
//!
//! Subscribing returns a [`Subscription`] guard and the listener stays registered for exactly
//! as long as the guard is alive.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Listener<T> = Rc<dyn Fn(&T)>;

pub struct EventSource<T> {
    inner: Rc<Inner<T>>,
}

struct Inner<T> {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(u64, Listener<T>)>>,
}

/// Keeps a listener registered until dropped.
#[must_use = "the listener is removed as soon as the subscription is dropped"]
pub struct Subscription {
    source: Weak<dyn Unsubscribe>,
    id: u64,
}

trait Unsubscribe {
    fn unsubscribe(&self, id: u64);
}

impl<T: 'static> EventSource<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                next_id: Cell::new(0),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));

        let source: Weak<Inner<T>> = Rc::downgrade(&self.inner);
        let source: Weak<dyn Unsubscribe> = source;
        Subscription { source, id }
    }

    /// Calls every listener registered at the time of the call.
    ///
    /// Listeners may subscribe or drop subscriptions while being called. Those changes take
    /// effect from the next emit.
    pub fn emit(&self, event: &T) {
        let listeners: Vec<_> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

impl<T: 'static> Default for EventSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EventSource<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for EventSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSource")
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}

impl<T> Unsubscribe for Inner<T> {
    fn unsubscribe(&self, id: u64) {
        self.listeners.borrow_mut().retain(|(x, _)| *x != id);
    }
}

impl Subscription {
    /// Returns whether the event source this subscription belongs to is still alive.
    pub fn is_connected(&self) -> bool {
        self.source.strong_count() > 0
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(source) = self.source.upgrade() {
            source.unsubscribe(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("connected", &self.is_connected())
            .finish()
    }
}
