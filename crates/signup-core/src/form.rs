#![forbid(unsafe_code)]

//! The sign-up validation engine.
//!
//! [`SignupForm`] holds four source values (email, password, confirmation,
//! terms toggle) and five derived values, wired as an explicit dependency
//! graph:
//!
//! ```text
//! Email ──> NormalizedEmail ──> EmailValid ──────┐
//! Password ──┬──> PasswordValid ─────────────────┤
//!            └──> PasswordsMatch ────────────────┼──> FormValid
//! PasswordConfirmation ──┘                       │
//! AgreeTerms ────────────────────────────────────┘
//! ```
//!
//! # Propagation
//!
//! A write to a source runs one pass:
//!
//! 1. Stage the source value. If it did not change, skip to step 4.
//! 2. Recompute and stage every derived node the source reaches, in
//!    topological order ([`Node::affected`]).
//! 3. Notify, in the same order: the source first, then each derived node
//!    whose value changed (its signal subscribers, then the aggregated
//!    [`Change`] feed).
//! 4. Report the edit on the [`SignupForm::on_edit`] feed, even when it
//!    repeated the current value.
//!
//! Because everything is committed before the first callback runs, an
//! observer reading any accessor sees the final state of the pass. Nodes
//! the source does not reach are never recomputed or notified.
//!
//! # Re-entrancy
//!
//! Writes issued from inside an observer are queued and applied, in order,
//! after the running pass finishes. The outermost write returns only once
//! the queue is drained. If an observer panics, the pass ends there: values
//! already staged stay committed, queued edits are dropped, and the next
//! write runs normally.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use crate::reactive::{Emitter, ReadSignal, Signal, Subscription};
use crate::rules::{self, Blocker, Evaluation, FormInputs, PasswordPolicy};

/// A vertex of the validation graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Node {
    Email,
    Password,
    PasswordConfirmation,
    AgreeTerms,
    NormalizedEmail,
    EmailValid,
    PasswordValid,
    PasswordsMatch,
    FormValid,
}

impl Node {
    pub const SOURCES: [Node; 4] = [
        Node::Email,
        Node::Password,
        Node::PasswordConfirmation,
        Node::AgreeTerms,
    ];

    /// Derived nodes in a topological order of the whole graph.
    pub const DERIVED: [Node; 5] = [
        Node::NormalizedEmail,
        Node::EmailValid,
        Node::PasswordValid,
        Node::PasswordsMatch,
        Node::FormValid,
    ];

    /// One of the four user-editable inputs.
    #[must_use]
    pub const fn is_source(self) -> bool {
        matches!(
            self,
            Node::Email | Node::Password | Node::PasswordConfirmation | Node::AgreeTerms
        )
    }

    /// Snake-case name used in logs and serialized output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Node::Email => "email",
            Node::Password => "password",
            Node::PasswordConfirmation => "password_confirmation",
            Node::AgreeTerms => "agree_terms",
            Node::NormalizedEmail => "normalized_email",
            Node::EmailValid => "email_valid",
            Node::PasswordValid => "password_valid",
            Node::PasswordsMatch => "passwords_match",
            Node::FormValid => "form_valid",
        }
    }

    /// Direct inputs of a derived node. Empty for sources.
    #[must_use]
    pub const fn dependencies(self) -> &'static [Node] {
        match self {
            Node::Email | Node::Password | Node::PasswordConfirmation | Node::AgreeTerms => &[],
            Node::NormalizedEmail => &[Node::Email],
            Node::EmailValid => &[Node::NormalizedEmail],
            Node::PasswordValid => &[Node::Password],
            Node::PasswordsMatch => &[Node::Password, Node::PasswordConfirmation],
            Node::FormValid => &[
                Node::EmailValid,
                Node::PasswordValid,
                Node::PasswordsMatch,
                Node::AgreeTerms,
            ],
        }
    }

    /// Derived nodes transitively reachable from a source, in recompute
    /// order. Empty for derived nodes.
    #[must_use]
    pub const fn affected(self) -> &'static [Node] {
        match self {
            Node::Email => &[Node::NormalizedEmail, Node::EmailValid, Node::FormValid],
            Node::Password => &[Node::PasswordValid, Node::PasswordsMatch, Node::FormValid],
            Node::PasswordConfirmation => &[Node::PasswordsMatch, Node::FormValid],
            Node::AgreeTerms => &[Node::FormValid],
            Node::NormalizedEmail
            | Node::EmailValid
            | Node::PasswordValid
            | Node::PasswordsMatch
            | Node::FormValid => &[],
        }
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A write to one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Email(String),
    Password(String),
    PasswordConfirmation(String),
    AgreeTerms(bool),
}

impl Edit {
    /// Source node written by this edit.
    #[must_use]
    pub const fn node(&self) -> Node {
        match self {
            Edit::Email(_) => Node::Email,
            Edit::Password(_) => Node::Password,
            Edit::PasswordConfirmation(_) => Node::PasswordConfirmation,
            Edit::AgreeTerms(_) => Node::AgreeTerms,
        }
    }
}

/// A derived value that changed during a propagation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "node", content = "value", rename_all = "snake_case"))]
pub enum Change {
    NormalizedEmail(String),
    EmailValid(bool),
    PasswordValid(bool),
    PasswordsMatch(bool),
    FormValid(bool),
}

impl Change {
    /// Derived node that changed.
    #[must_use]
    pub const fn node(&self) -> Node {
        match self {
            Change::NormalizedEmail(_) => Node::NormalizedEmail,
            Change::EmailValid(_) => Node::EmailValid,
            Change::PasswordValid(_) => Node::PasswordValid,
            Change::PasswordsMatch(_) => Node::PasswordsMatch,
            Change::FormValid(_) => Node::FormValid,
        }
    }
}

/// Read-only handles to the four sources.
#[derive(Debug, Clone)]
pub struct Sources {
    pub email: ReadSignal<String>,
    pub password: ReadSignal<String>,
    pub password_confirmation: ReadSignal<String>,
    pub agree_terms: ReadSignal<bool>,
}

/// Read-only handles to the five derived values.
#[derive(Debug, Clone)]
pub struct Derived {
    pub normalized_email: ReadSignal<String>,
    pub email_valid: ReadSignal<bool>,
    pub password_valid: ReadSignal<bool>,
    pub passwords_match: ReadSignal<bool>,
    pub form_valid: ReadSignal<bool>,
}

/// Point-in-time view of the form, without password text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FormSnapshot {
    pub normalized_email: String,
    pub email_valid: bool,
    pub password_valid: bool,
    pub passwords_match: bool,
    pub agree_terms: bool,
    pub form_valid: bool,
}

/// The validation engine.
///
/// Construct one per sign-up session. All operations are infallible and
/// synchronous; the engine is single-threaded (`!Send`, `!Sync`).
pub struct SignupForm {
    policy: PasswordPolicy,

    email: Signal<String>,
    password: Signal<String>,
    password_confirmation: Signal<String>,
    agree_terms: Signal<bool>,

    normalized_email: Signal<String>,
    email_valid: Signal<bool>,
    password_valid: Signal<bool>,
    passwords_match: Signal<bool>,
    form_valid: Signal<bool>,

    changes: Emitter<Change>,
    edits: Emitter<Edit>,
    propagating: Cell<bool>,
    pending: RefCell<VecDeque<Edit>>,
}

impl Default for SignupForm {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupForm")
            .field("policy", &self.policy)
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}

impl SignupForm {
    /// Empty inputs, terms off, default [`PasswordPolicy`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(PasswordPolicy::default())
    }

    /// Empty inputs validated against `policy`.
    #[must_use]
    pub fn with_policy(policy: PasswordPolicy) -> Self {
        let initial = rules::evaluate(&FormInputs::default(), &policy);
        Self {
            policy,
            email: Signal::new(String::new()),
            password: Signal::new(String::new()),
            password_confirmation: Signal::new(String::new()),
            agree_terms: Signal::new(false),
            normalized_email: Signal::new(initial.normalized_email),
            email_valid: Signal::new(initial.email_valid),
            password_valid: Signal::new(initial.password_valid),
            passwords_match: Signal::new(initial.passwords_match),
            form_valid: Signal::new(initial.form_valid),
            changes: Emitter::new(),
            edits: Emitter::new(),
            propagating: Cell::new(false),
            pending: RefCell::new(VecDeque::new()),
        }
    }

    /// The password policy this form validates against.
    #[must_use]
    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    // ── Writes ────────────────────────────────────────────────────────────

    /// Store the raw email text and propagate to the email nodes.
    pub fn set_email(&self, text: impl Into<String>) {
        self.apply(Edit::Email(text.into()));
    }

    /// Store the password and propagate to validity and match.
    pub fn set_password(&self, text: impl Into<String>) {
        self.apply(Edit::Password(text.into()));
    }

    /// Store the confirmation and propagate to match.
    pub fn set_password_confirmation(&self, text: impl Into<String>) {
        self.apply(Edit::PasswordConfirmation(text.into()));
    }

    /// Store the terms toggle and propagate to form validity.
    pub fn set_agree_terms(&self, agree: bool) {
        self.apply(Edit::AgreeTerms(agree));
    }

    /// Apply one edit and propagate it.
    ///
    /// Called from inside an observer, the edit is queued behind the running
    /// pass instead.
    pub fn apply(&self, edit: Edit) {
        self.pending.borrow_mut().push_back(edit);
        if self.propagating.replace(true) {
            #[cfg(feature = "tracing")]
            tracing::trace!("edit queued behind running propagation pass");
            return;
        }
        let _pass = PassGuard { form: self };
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(edit) = next else { break };
            self.propagate(edit);
        }
    }

    fn propagate(&self, edit: Edit) {
        let source = edit.node();
        let applied = edit.clone();
        let source_changed = match edit {
            Edit::Email(text) => self.email.stage(text),
            Edit::Password(text) => self.password.stage(text),
            Edit::PasswordConfirmation(text) => self.password_confirmation.stage(text),
            Edit::AgreeTerms(agree) => self.agree_terms.stage(agree),
        };
        if !source_changed {
            #[cfg(feature = "tracing")]
            tracing::trace!(source = source.name(), "source unchanged, pass skipped");
            self.edits.emit(&applied);
            return;
        }

        let changed: Vec<Node> = source
            .affected()
            .iter()
            .copied()
            .filter(|&node| self.recompute(node))
            .collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            source = source.name(),
            changed = ?changed.iter().map(|n| n.name()).collect::<Vec<_>>(),
            form_valid = self.form_valid.get(),
            "propagated edit"
        );

        self.notify_source(source);
        for node in changed {
            self.notify_derived(node);
        }
        self.edits.emit(&applied);
    }

    /// Recompute and stage one derived node from its (already current)
    /// dependencies. Returns whether its value changed.
    fn recompute(&self, node: Node) -> bool {
        match node {
            Node::NormalizedEmail => {
                let normalized = self.email.with(|e| rules::normalize_email(e));
                self.normalized_email.stage(normalized)
            }
            Node::EmailValid => {
                let valid = self.normalized_email.with(|n| rules::email_is_valid(n));
                self.email_valid.stage(valid)
            }
            Node::PasswordValid => {
                let valid = self
                    .password
                    .with(|p| rules::password_is_valid(p, &self.policy));
                self.password_valid.stage(valid)
            }
            Node::PasswordsMatch => {
                let matches = self.password.with(|p| {
                    self.password_confirmation
                        .with(|c| rules::passwords_match(p, c))
                });
                self.passwords_match.stage(matches)
            }
            Node::FormValid => {
                let valid = rules::form_is_valid(
                    self.email_valid.get(),
                    self.password_valid.get(),
                    self.passwords_match.get(),
                    self.agree_terms.get(),
                );
                self.form_valid.stage(valid)
            }
            Node::Email | Node::Password | Node::PasswordConfirmation | Node::AgreeTerms => false,
        }
    }

    fn notify_source(&self, source: Node) {
        match source {
            Node::Email => self.email.notify(),
            Node::Password => self.password.notify(),
            Node::PasswordConfirmation => self.password_confirmation.notify(),
            Node::AgreeTerms => self.agree_terms.notify(),
            _ => {}
        }
    }

    fn notify_derived(&self, node: Node) {
        let change = match node {
            Node::NormalizedEmail => {
                self.normalized_email.notify();
                Change::NormalizedEmail(self.normalized_email.get())
            }
            Node::EmailValid => {
                self.email_valid.notify();
                Change::EmailValid(self.email_valid.get())
            }
            Node::PasswordValid => {
                self.password_valid.notify();
                Change::PasswordValid(self.password_valid.get())
            }
            Node::PasswordsMatch => {
                self.passwords_match.notify();
                Change::PasswordsMatch(self.passwords_match.get())
            }
            Node::FormValid => {
                self.form_valid.notify();
                Change::FormValid(self.form_valid.get())
            }
            Node::Email | Node::Password | Node::PasswordConfirmation | Node::AgreeTerms => return,
        };
        #[cfg(feature = "tracing")]
        tracing::trace!(node = node.name(), ?change, "derived value changed");
        self.changes.emit(&change);
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// Raw email text as last entered.
    #[must_use]
    pub fn email(&self) -> String {
        self.email.get()
    }

    /// Raw password text.
    #[must_use]
    pub fn password(&self) -> String {
        self.password.get()
    }

    /// Raw confirmation text.
    #[must_use]
    pub fn password_confirmation(&self) -> String {
        self.password_confirmation.get()
    }

    /// Current state of the terms toggle.
    #[must_use]
    pub fn agree_terms(&self) -> bool {
        self.agree_terms.get()
    }

    /// Lowercased, trimmed email.
    #[must_use]
    pub fn normalized_email(&self) -> String {
        self.normalized_email.get()
    }

    /// Whether the normalized email contains `@` and `.`.
    #[must_use]
    pub fn email_valid(&self) -> bool {
        self.email_valid.get()
    }

    /// Whether the password satisfies the policy.
    #[must_use]
    pub fn password_valid(&self) -> bool {
        self.password_valid.get()
    }

    /// Whether password and confirmation are identical.
    #[must_use]
    pub fn passwords_match(&self) -> bool {
        self.passwords_match.get()
    }

    /// Whether every field is valid and the terms are accepted.
    #[must_use]
    pub fn form_valid(&self) -> bool {
        self.form_valid.get()
    }

    /// Why the form cannot be submitted right now; empty when it can.
    #[must_use]
    pub fn blockers(&self) -> Vec<Blocker> {
        rules::blockers(
            self.email_valid(),
            self.password_valid(),
            self.passwords_match(),
            self.agree_terms(),
        )
    }

    /// Clone of the four raw inputs.
    #[must_use]
    pub fn inputs(&self) -> FormInputs {
        FormInputs {
            email: self.email(),
            password: self.password(),
            password_confirmation: self.password_confirmation(),
            agree_terms: self.agree_terms(),
        }
    }

    /// The five derived values as currently held (no recomputation).
    #[must_use]
    pub fn evaluation(&self) -> Evaluation {
        Evaluation {
            normalized_email: self.normalized_email(),
            email_valid: self.email_valid(),
            password_valid: self.password_valid(),
            passwords_match: self.passwords_match(),
            form_valid: self.form_valid(),
        }
    }

    /// Derived values plus the terms toggle, without password text.
    #[must_use]
    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            normalized_email: self.normalized_email(),
            email_valid: self.email_valid(),
            password_valid: self.password_valid(),
            passwords_match: self.passwords_match(),
            agree_terms: self.agree_terms(),
            form_valid: self.form_valid(),
        }
    }

    // ── Observation ───────────────────────────────────────────────────────

    /// Read-only handles to the raw inputs.
    #[must_use]
    pub fn sources(&self) -> Sources {
        Sources {
            email: self.email.read_only(),
            password: self.password.read_only(),
            password_confirmation: self.password_confirmation.read_only(),
            agree_terms: self.agree_terms.read_only(),
        }
    }

    /// Read-only handles to the derived values.
    #[must_use]
    pub fn derived(&self) -> Derived {
        Derived {
            normalized_email: self.normalized_email.read_only(),
            email_valid: self.email_valid.read_only(),
            password_valid: self.password_valid.read_only(),
            passwords_match: self.passwords_match.read_only(),
            form_valid: self.form_valid.read_only(),
        }
    }

    /// Observe every derived-value change, in propagation order.
    pub fn on_change(&self, callback: impl Fn(&Change) + 'static) -> Subscription {
        self.changes.subscribe(callback)
    }

    /// Observe every applied edit, including edits that repeat the current
    /// value. Fires after the edit's pass has notified all changed nodes.
    pub fn on_edit(&self, callback: impl Fn(&Edit) + 'static) -> Subscription {
        self.edits.subscribe(callback)
    }
}

/// Ends a propagation pass, including on unwind from a panicking observer.
///
/// Edits still queued behind a panicked pass are discarded so the next
/// write starts from a clean queue.
struct PassGuard<'a> {
    form: &'a SignupForm,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.form.pending.borrow_mut().clear();
        self.form.propagating.set(false);
    }
}
