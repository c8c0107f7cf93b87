#![forbid(unsafe_code)]

//! Headless widget bindings for a sign-up screen.
//!
//! [`FormBinder`] is the collaborator side of the engine: it observes a
//! [`SignupForm`] and keeps a [`FormView`] describing what the widgets
//! should show. A concrete UI reads the view (or polls
//! [`FormBinder::take_email_rewrite`]) and applies it to real controls.
//!
//! | Widget property            | Driven by       |
//! |----------------------------|-----------------|
//! | submit control enabled     | FormValid       |
//! | email field color          | EmailValid      |
//! | password field color       | PasswordValid   |
//! | confirmation field color   | PasswordsMatch  |
//! | email field text           | NormalizedEmail |
//!
//! The email text is only rewritten when the normalized address differs from
//! the raw text the user typed, so a rewrite never fights an edit that is
//! already in normal form.

use std::cell::RefCell;
use std::rc::Rc;

use crate::form::{Derived, Edit, SignupForm};
use crate::reactive::{ReadSignal, Subscription};
use crate::rules::{self, Blocker};

/// Text color of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FieldTone {
    /// Regular label color.
    #[default]
    Normal,
    /// Error (red) color.
    Invalid,
}

impl FieldTone {
    /// Red when `valid` is false.
    #[must_use]
    pub const fn from_valid(valid: bool) -> Self {
        if valid { Self::Normal } else { Self::Invalid }
    }

    /// Whether the field shows the error color.
    #[must_use]
    pub const fn is_invalid(self) -> bool {
        matches!(self, Self::Invalid)
    }
}

/// What the widgets should currently display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FormView {
    pub submit_enabled: bool,
    pub email_tone: FieldTone,
    pub password_tone: FieldTone,
    pub confirmation_tone: FieldTone,
}

impl FormView {
    fn of(form: &SignupForm) -> Self {
        Self {
            submit_enabled: form.form_valid(),
            email_tone: FieldTone::from_valid(form.email_valid()),
            password_tone: FieldTone::from_valid(form.password_valid()),
            confirmation_tone: FieldTone::from_valid(form.passwords_match()),
        }
    }
}

/// The alert presented after a successful sign-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Alert {
    pub title: &'static str,
    pub message: Option<&'static str>,
    pub dismiss_label: &'static str,
}

impl Alert {
    pub const WELCOME: Alert = Alert {
        title: "Welcome!",
        message: None,
        dismiss_label: "Dismiss",
    };
}

/// Submit was tapped while the control should have been disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    Disabled { blockers: Vec<Blocker> },
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled { blockers } => {
                f.write_str("sign up disabled")?;
                for (i, blocker) in blockers.iter().enumerate() {
                    let sep = if i == 0 { ": " } else { ", " };
                    write!(f, "{sep}{blocker}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for SubmitError {}

#[derive(Debug)]
struct BinderState {
    view: FormView,
    email_rewrite: Option<String>,
}

/// Keeps a [`FormView`] in sync with a [`SignupForm`].
///
/// Dropping the binder drops its subscriptions.
#[derive(Debug)]
pub struct FormBinder {
    state: Rc<RefCell<BinderState>>,
    derived: Derived,
    agree_terms: ReadSignal<bool>,
    _subscriptions: Vec<Subscription>,
}

impl FormBinder {
    /// Subscribe to `form`, starting from its current values.
    #[must_use]
    pub fn attach(form: &SignupForm) -> Self {
        let state = Rc::new(RefCell::new(BinderState {
            view: FormView::of(form),
            email_rewrite: None,
        }));
        let derived = form.derived();
        let sources = form.sources();

        let mut subs = vec![
            bind(&state, &derived.form_valid, |view, valid| {
                view.submit_enabled = valid;
            }),
            bind(&state, &derived.email_valid, |view, valid| {
                view.email_tone = FieldTone::from_valid(valid);
            }),
            bind(&state, &derived.password_valid, |view, valid| {
                view.password_tone = FieldTone::from_valid(valid);
            }),
            bind(&state, &derived.passwords_match, |view, valid| {
                view.confirmation_tone = FieldTone::from_valid(valid);
            }),
        ];

        // Every email edit is checked, including one that repeats the raw
        // value: the field may still show text the user has not normalized.
        let rewrite_state = Rc::clone(&state);
        let normalized = derived.normalized_email.clone();
        subs.push(form.on_edit(move |edit| {
            if let Edit::Email(raw) = edit {
                let formatted = normalized.get();
                rewrite_state.borrow_mut().email_rewrite =
                    (formatted != *raw).then_some(formatted);
            }
        }));

        Self {
            state,
            derived,
            agree_terms: sources.agree_terms,
            _subscriptions: subs,
        }
    }

    /// Current widget state.
    #[must_use]
    pub fn view(&self) -> FormView {
        self.state.borrow().view
    }

    /// Text to put back into the email field, if the last raw edit was not
    /// already normalized. Cleared by this call.
    pub fn take_email_rewrite(&self) -> Option<String> {
        self.state.borrow_mut().email_rewrite.take()
    }

    /// Handle a tap on the submit control.
    pub fn submit(&self) -> Result<Alert, SubmitError> {
        if self.view().submit_enabled {
            #[cfg(feature = "tracing")]
            tracing::info!("sign up submitted");
            return Ok(Alert::WELCOME);
        }
        let blockers = rules::blockers(
            self.derived.email_valid.get(),
            self.derived.password_valid.get(),
            self.derived.passwords_match.get(),
            self.agree_terms.get(),
        );
        #[cfg(feature = "tracing")]
        tracing::debug!(?blockers, "submit rejected");
        Err(SubmitError::Disabled { blockers })
    }
}

fn bind(
    state: &Rc<RefCell<BinderState>>,
    signal: &ReadSignal<bool>,
    apply: impl Fn(&mut FormView, bool) + 'static,
) -> Subscription {
    let state = Rc::clone(state);
    signal.subscribe(move |value| apply(&mut state.borrow_mut().view, *value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_from_current_form_values() {
        let form = SignupForm::new();
        form.set_email("a@b.c");
        let binder = FormBinder::attach(&form);
        let view = binder.view();
        assert!(!view.submit_enabled);
        assert_eq!(view.email_tone, FieldTone::Normal);
        assert_eq!(view.password_tone, FieldTone::Invalid);
        assert_eq!(view.confirmation_tone, FieldTone::Normal);
    }

    #[test]
    fn view_tracks_edits() {
        let form = SignupForm::new();
        let binder = FormBinder::attach(&form);

        form.set_email("a@b.c");
        form.set_password("Secret12");
        assert_eq!(binder.view().confirmation_tone, FieldTone::Invalid);
        form.set_password_confirmation("Secret12");
        form.set_agree_terms(true);

        let view = binder.view();
        assert!(view.submit_enabled);
        assert_eq!(view.email_tone, FieldTone::Normal);
        assert_eq!(view.password_tone, FieldTone::Normal);
        assert_eq!(view.confirmation_tone, FieldTone::Normal);
    }

    #[test]
    fn rewrite_only_when_raw_differs() {
        let form = SignupForm::new();
        let binder = FormBinder::attach(&form);

        form.set_email("user@example.com");
        assert_eq!(binder.take_email_rewrite(), None);

        form.set_email("User@example.com");
        assert_eq!(
            binder.take_email_rewrite().as_deref(),
            Some("user@example.com")
        );
        assert_eq!(binder.take_email_rewrite(), None);

        // Trailing space leaves the normalized value unchanged but still
        // differs from the raw text.
        form.set_email("user@example.com ");
        assert_eq!(
            binder.take_email_rewrite().as_deref(),
            Some("user@example.com")
        );
    }

    #[test]
    fn repeated_email_edit_offers_rewrite_again() {
        let form = SignupForm::new();
        let binder = FormBinder::attach(&form);

        form.set_email("A@B.C");
        assert_eq!(binder.take_email_rewrite().as_deref(), Some("a@b.c"));

        form.set_email("A@B.C");
        assert_eq!(binder.take_email_rewrite().as_deref(), Some("a@b.c"));

        form.set_email("a@b.c");
        form.set_email("a@b.c");
        assert_eq!(binder.take_email_rewrite(), None);
    }

    #[test]
    fn submit_returns_welcome_alert() {
        let form = SignupForm::new();
        let binder = FormBinder::attach(&form);
        form.set_email("a@b.c");
        form.set_password("Secret12");
        form.set_password_confirmation("Secret12");
        form.set_agree_terms(true);

        let alert = binder.submit().expect("form is valid");
        assert_eq!(alert.title, "Welcome!");
        assert_eq!(alert.dismiss_label, "Dismiss");
        assert!(alert.message.is_none());
    }

    #[test]
    fn submit_reports_blockers() {
        let form = SignupForm::new();
        let binder = FormBinder::attach(&form);
        form.set_email("a@b.c");

        let err = binder.submit().unwrap_err();
        assert_eq!(
            err,
            SubmitError::Disabled {
                blockers: vec![Blocker::PasswordInvalid, Blocker::TermsNotAccepted]
            }
        );
        assert_eq!(
            err.to_string(),
            "sign up disabled: password invalid, terms not accepted"
        );
    }

    #[test]
    fn dropping_binder_unsubscribes() {
        let form = SignupForm::new();
        let binder = FormBinder::attach(&form);
        let state = Rc::downgrade(&binder.state);
        drop(binder);
        assert!(state.upgrade().is_none());
        form.set_email("a@b.c");
        assert!(form.email_valid());
    }

    #[test]
    fn tone_from_valid() {
        assert_eq!(FieldTone::from_valid(true), FieldTone::Normal);
        assert!(FieldTone::from_valid(false).is_invalid());
        assert_eq!(FieldTone::default(), FieldTone::Normal);
    }
}
