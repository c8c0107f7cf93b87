#![forbid(unsafe_code)]

//! Weak subscriber list shared by [`Signal`](super::Signal) and
//! [`Emitter`](super::Emitter).

use std::rc::{Rc, Weak};

/// Strong callback handle; only the [`Subscription`] guard keeps one.
type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

/// Ordered list of weakly held callbacks.
pub(crate) struct Subscribers<T: ?Sized> {
    entries: Vec<CallbackWeak<T>>,
}

impl<T: ?Sized> Subscribers<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Prune dead entries and return the live callbacks in registration order.
    ///
    /// The caller invokes them after releasing whatever borrow guards `self`.
    pub(crate) fn live(&mut self) -> Vec<CallbackRc<T>> {
        self.entries.retain(|w| w.strong_count() > 0);
        self.entries.iter().filter_map(|w| w.upgrade()).collect()
    }

    /// Registered entries, including dead ones not yet pruned.
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<T: ?Sized + 'static> Subscribers<T> {
    /// Register a callback, returning the guard that keeps it alive.
    pub(crate) fn push(&mut self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        self.entries.push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }
}

/// RAII guard for a subscriber callback.
///
/// The guard owns the only strong reference to the callback. Once it is
/// dropped the weak entry in the subscriber list can no longer be upgraded,
/// so the callback is never invoked again; the entry itself is removed on
/// the next notification.
#[must_use = "dropping a Subscription immediately unsubscribes the callback"]
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn live_returns_callbacks_in_order() {
        let mut subs: Subscribers<u32> = Subscribers::new();
        let log = Rc::new(std::cell::RefCell::new(Vec::new()));
        let l1 = Rc::clone(&log);
        let l2 = Rc::clone(&log);
        let _a = subs.push(move |v| l1.borrow_mut().push(('a', *v)));
        let _b = subs.push(move |v| l2.borrow_mut().push(('b', *v)));

        for cb in subs.live() {
            cb(&7);
        }
        assert_eq!(*log.borrow(), vec![('a', 7), ('b', 7)]);
    }

    #[test]
    fn dropped_guard_is_pruned() {
        let mut subs: Subscribers<u32> = Subscribers::new();
        let hits = Rc::new(Cell::new(0u32));
        let h = Rc::clone(&hits);
        let guard = subs.push(move |_| h.set(h.get() + 1));
        assert_eq!(subs.len(), 1);

        drop(guard);
        assert_eq!(subs.len(), 1);
        assert!(subs.live().is_empty());
        assert_eq!(subs.len(), 0);
        assert_eq!(hits.get(), 0);
    }
}
