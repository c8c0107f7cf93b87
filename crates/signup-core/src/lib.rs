#![forbid(unsafe_code)]

//! Core: the reactive validation graph behind a sign-up screen.
//!
//! # Role
//! `signup-core` turns raw field edits (email, password, confirmation, terms
//! toggle) into the derived values a sign-up screen needs: the normalized
//! email, per-field validity, and whether the form may be submitted. It
//! renders nothing; a UI layer feeds edits in and applies the results.
//!
//! # Primary responsibilities
//! - **reactive**: `Signal`/`ReadSignal`/`Emitter` change-tracking primitives.
//! - **rules**: pure predicates and the password policy.
//! - **form**: `SignupForm`, the engine that propagates edits through the
//!   dependency graph and notifies observers.
//! - **binding**: `FormBinder`, the headless widget-state collaborator.
//!
//! # Example
//!
//! ```
//! use signup_core::SignupForm;
//!
//! let form = SignupForm::new();
//! form.set_email(" User@Example.COM ");
//! form.set_password("Secret12");
//! form.set_password_confirmation("Secret12");
//! form.set_agree_terms(true);
//!
//! assert_eq!(form.normalized_email(), "user@example.com");
//! assert!(form.form_valid());
//! ```

pub mod binding;
pub mod form;
pub mod reactive;
pub mod rules;

pub use binding::{Alert, FieldTone, FormBinder, FormView, SubmitError};
pub use form::{Change, Derived, Edit, FormSnapshot, Node, SignupForm, Sources};
pub use reactive::{Emitter, ReadSignal, Signal, Subscription};
pub use rules::{Blocker, Evaluation, FormInputs, PasswordPolicy};
