#![forbid(unsafe_code)]

//! Change-tracking primitives for the validation graph.
//!
//! - [`Signal`]: a shared, version-tracked current value that notifies
//!   subscribers when it changes.
//! - [`ReadSignal`]: a read-only handle to a [`Signal`], handed to
//!   collaborators that may observe but never write.
//! - [`Emitter`]: a value-less event feed (every emission is delivered,
//!   no deduplication).
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//!
//! # Architecture
//!
//! Everything here is single-threaded: state lives in `Rc<RefCell<..>>` and
//! callbacks are held as `Weak` references, pruned lazily during
//! notification. None of these types are `Send` or `Sync`.
//!
//! # Invariants
//!
//! 1. A signal's version increments exactly once per value-changing write.
//! 2. Writing a value equal to the current one is a no-op (no version bump,
//!    no notifications).
//! 3. Subscribers are notified in registration order.
//! 4. No `RefCell` borrow is held while callbacks run, so callbacks may read
//!    any signal, including the one notifying them.
//! 5. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.

mod emitter;
pub mod signal;
mod subscribers;

pub use emitter::Emitter;
pub use signal::{ReadSignal, Signal};
pub use subscribers::Subscription;
