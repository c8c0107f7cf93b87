#![forbid(unsafe_code)]

//! Current-value cell with change notification and version tracking.
//!
//! # Design
//!
//! [`Signal<T>`] keeps its value in shared `Rc<RefCell<..>>` storage. A
//! write that changes the value (by `PartialEq`) bumps the version and
//! notifies live subscribers in registration order.
//!
//! Writes can also be split in two phases: [`Signal::stage`] stores a value
//! without notifying and [`Signal::notify`] flushes later. The form engine
//! uses this to commit every node of a propagation pass before any observer
//! runs, so no observer ever sees a half-updated graph.
//!
//! # Failure Modes
//!
//! - **Re-entrant write from a callback**: the callback list is collected
//!   before callbacks run, so a nested write does not panic, but it starts a
//!   second notification cycle inside the first. Code that needs
//!   serialized writes (the form engine does) must queue them itself.
//! - **Subscriber leak**: guards stored indefinitely keep callbacks alive.
//!   Dead entries are pruned lazily on notification.

use std::cell::RefCell;
use std::rc::Rc;

use super::subscribers::{Subscribers, Subscription};

struct SignalInner<T> {
    value: T,
    version: u64,
    subscribers: Subscribers<T>,
}

/// A shared, version-tracked value with change notification.
///
/// Cloning a `Signal` creates another handle to the **same** state.
pub struct Signal<T> {
    inner: Rc<RefCell<SignalInner<T>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Signal")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Signal<T> {
    /// Create a signal at version 0 with no subscribers.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SignalInner {
                value,
                version: 0,
                subscribers: Subscribers::new(),
            })),
        }
    }

    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Store `value` and notify subscribers if it differs from the current
    /// value. Returns whether the value changed.
    pub fn set(&self, value: T) -> bool {
        let changed = self.stage(value);
        if changed {
            self.notify();
        }
        changed
    }

    /// Store `value` without notifying. Returns whether the value changed;
    /// the caller is responsible for calling [`notify`](Self::notify) when
    /// it did.
    pub fn stage(&self, value: T) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.value == value {
            return false;
        }
        inner.value = value;
        inner.version += 1;
        true
    }

    /// Deliver the current value to every live subscriber.
    pub fn notify(&self) {
        let callbacks = self.inner.borrow_mut().subscribers.live();
        if callbacks.is_empty() {
            return;
        }
        let value = self.get();
        for cb in &callbacks {
            cb(&value);
        }
    }

    /// Subscribe to value changes.
    ///
    /// The callback receives the new value after each change. It is not
    /// called with the current value at subscription time.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.inner.borrow_mut().subscribers.push(callback)
    }

    /// Increments by 1 on each value-changing write.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Registered subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// A read-only handle sharing this signal's state.
    #[must_use]
    pub fn read_only(&self) -> ReadSignal<T> {
        ReadSignal {
            signal: self.clone(),
        }
    }
}

/// Read-only view of a [`Signal`].
///
/// Observers get values and change notifications but cannot write.
pub struct ReadSignal<T> {
    signal: Signal<T>,
}

impl<T> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        Self {
            signal: self.signal.clone(),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ReadSignal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ReadSignal").field(&self.signal).finish()
    }
}

impl<T: Clone + PartialEq + 'static> ReadSignal<T> {
    #[must_use]
    pub fn get(&self) -> T {
        self.signal.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.signal.with(f)
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.signal.subscribe(callback)
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.signal.version()
    }
}
