#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::rc::Rc;

use super::subscribers::{Subscribers, Subscription};

/// A value-less event feed.
///
/// Unlike [`Signal`](super::Signal), an emitter holds no current value and
/// never deduplicates: every [`emit`](Self::emit) reaches every live
/// subscriber. Cloning shares the subscriber list.
pub struct Emitter<E> {
    subscribers: Rc<RefCell<Subscribers<E>>>,
}

impl<E> Clone for Emitter<E> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Rc::clone(&self.subscribers),
        }
    }
}

impl<E: 'static> Default for Emitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Emitter<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("subscriber_count", &self.subscribers.borrow().len())
            .finish()
    }
}

impl<E: 'static> Emitter<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Rc::new(RefCell::new(Subscribers::new())),
        }
    }

    /// Deliver `event` to every live subscriber in registration order.
    pub fn emit(&self, event: &E) {
        let callbacks = self.subscribers.borrow_mut().live();
        for cb in &callbacks {
            cb(event);
        }
    }

    pub fn subscribe(&self, callback: impl Fn(&E) + 'static) -> Subscription {
        self.subscribers.borrow_mut().push(callback)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}
