#![forbid(unsafe_code)]

//! Pure validation rules for the sign-up form.
//!
//! Every derived value of the form is one of the functions below applied to
//! the current inputs. [`evaluate`] applies all of them at once and is the
//! reference the incremental engine must always agree with.

use unicode_segmentation::UnicodeSegmentation;

/// Minimum password length, in user-perceived characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// The literal password that is always rejected (case-sensitive).
pub const BANNED_PASSWORD: &str = "password";

/// Password acceptance rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum length in extended grapheme clusters. Default: 8.
    pub min_len: usize,
    /// Exact (case-sensitive) passwords that are rejected regardless of
    /// length. Default: `["password"]`.
    pub banned: Vec<String>,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_len: MIN_PASSWORD_LEN,
            banned: vec![BANNED_PASSWORD.to_string()],
        }
    }
}

impl PasswordPolicy {
    /// Set the minimum length.
    #[must_use]
    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }

    /// Replace the banned list.
    #[must_use]
    pub fn with_banned<I, S>(mut self, banned: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.banned = banned.into_iter().map(Into::into).collect();
        self
    }

    /// Exact match against the banned list.
    #[must_use]
    pub fn is_banned(&self, password: &str) -> bool {
        self.banned.iter().any(|b| b == password)
    }

    /// Not banned and at least `min_len` graphemes long.
    #[must_use]
    pub fn accepts(&self, password: &str) -> bool {
        !self.is_banned(password) && password_len(password) >= self.min_len
    }
}

/// Lowercase, then trim leading/trailing whitespace and newlines.
///
/// Inner whitespace is kept. Idempotent.
#[must_use]
pub fn normalize_email(raw: &str) -> String {
    raw.to_lowercase().trim().to_string()
}

/// Substring check only: the address must contain both `@` and `.`.
///
/// Expects an already normalized address.
#[must_use]
pub fn email_is_valid(normalized: &str) -> bool {
    normalized.contains('@') && normalized.contains('.')
}

/// Length in user-perceived characters (extended grapheme clusters).
#[must_use]
pub fn password_len(password: &str) -> usize {
    password.graphemes(true).count()
}

/// Whether `password` passes `policy`.
#[must_use]
pub fn password_is_valid(password: &str, policy: &PasswordPolicy) -> bool {
    policy.accepts(password)
}

/// Exact comparison of the raw texts; two empty fields match.
#[must_use]
pub fn passwords_match(password: &str, confirmation: &str) -> bool {
    password == confirmation
}

/// All four conditions hold.
#[must_use]
pub fn form_is_valid(
    email_valid: bool,
    password_valid: bool,
    passwords_match: bool,
    agree_terms: bool,
) -> bool {
    email_valid && password_valid && passwords_match && agree_terms
}

/// A condition currently keeping the form from being submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Blocker {
    EmailInvalid,
    PasswordInvalid,
    PasswordMismatch,
    TermsNotAccepted,
}

impl Blocker {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmailInvalid => "email invalid",
            Self::PasswordInvalid => "password invalid",
            Self::PasswordMismatch => "passwords do not match",
            Self::TermsNotAccepted => "terms not accepted",
        }
    }
}

impl std::fmt::Display for Blocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The failing conjuncts of [`form_is_valid`], in field order.
///
/// Empty exactly when the form is valid.
#[must_use]
pub fn blockers(
    email_valid: bool,
    password_valid: bool,
    passwords_match: bool,
    agree_terms: bool,
) -> Vec<Blocker> {
    [
        (email_valid, Blocker::EmailInvalid),
        (password_valid, Blocker::PasswordInvalid),
        (passwords_match, Blocker::PasswordMismatch),
        (agree_terms, Blocker::TermsNotAccepted),
    ]
    .into_iter()
    .filter(|(ok, _)| !ok)
    .map(|(_, blocker)| blocker)
    .collect()
}

/// The four user-controlled inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInputs {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub agree_terms: bool,
}

/// The five derived values.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Evaluation {
    pub normalized_email: String,
    pub email_valid: bool,
    pub password_valid: bool,
    pub passwords_match: bool,
    pub form_valid: bool,
}

/// Recompute every derived value from scratch.
#[must_use]
pub fn evaluate(inputs: &FormInputs, policy: &PasswordPolicy) -> Evaluation {
    let normalized_email = normalize_email(&inputs.email);
    let email_valid = email_is_valid(&normalized_email);
    let password_valid = password_is_valid(&inputs.password, policy);
    let passwords_match = passwords_match(&inputs.password, &inputs.password_confirmation);
    let form_valid = form_is_valid(
        email_valid,
        password_valid,
        passwords_match,
        inputs.agree_terms,
    );
    Evaluation {
        normalized_email,
        email_valid,
        password_valid,
        passwords_match,
        form_valid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_trims() {
        assert_eq!(normalize_email(" User@Example.COM "), "user@example.com");
        assert_eq!(normalize_email("\n\tA@B.C\r\n"), "a@b.c");
    }

    #[test]
    fn normalize_keeps_inner_spaces() {
        assert_eq!(normalize_email("  a b@c.d  "), "a b@c.d");
    }

    #[test]
    fn normalize_trims_unicode_whitespace() {
        assert_eq!(normalize_email("\u{3000}x@y.z\u{00a0}"), "x@y.z");
    }

    #[test]
    fn email_needs_at_and_dot() {
        assert!(email_is_valid("a@b."));
        assert!(email_is_valid("a@b.c"));
        assert!(!email_is_valid("ab.com"));
        assert!(!email_is_valid("a@bcom"));
        assert!(!email_is_valid(""));
    }

    #[test]
    fn banned_literal_rejected_despite_length() {
        let policy = PasswordPolicy::default();
        assert!(!password_is_valid("password", &policy));
        assert!(password_is_valid("password1", &policy));
        assert!(password_is_valid("Password", &policy));
        assert!(!password_is_valid("short1", &policy));
        assert!(!password_is_valid("", &policy));
    }

    #[test]
    fn password_length_counts_graphemes() {
        // Seven user-perceived characters, more than eight bytes and scalars.
        let seven = "e\u{301}e\u{301}e\u{301}abcd";
        assert_eq!(password_len(seven), 7);
        assert!(!password_is_valid(seven, &PasswordPolicy::default()));
        assert!(password_is_valid("ééééabcd", &PasswordPolicy::default()));
    }

    #[test]
    fn policy_builders() {
        let policy = PasswordPolicy::default()
            .with_min_len(4)
            .with_banned(["hunter2", "1234"]);
        assert!(policy.accepts("password"));
        assert!(!policy.accepts("1234"));
        assert!(!policy.accepts("abc"));
        assert!(policy.is_banned("hunter2"));
    }

    #[test]
    fn match_is_exact_and_reflexive() {
        assert!(passwords_match("", ""));
        assert!(passwords_match("Secret12", "Secret12"));
        assert!(!passwords_match("Secret12", "secret12"));
        assert!(!passwords_match("Secret12 ", "Secret12"));
    }

    #[test]
    fn blockers_list_failing_conjuncts() {
        assert!(blockers(true, true, true, true).is_empty());
        assert_eq!(
            blockers(false, true, false, false),
            vec![
                Blocker::EmailInvalid,
                Blocker::PasswordMismatch,
                Blocker::TermsNotAccepted
            ]
        );
        assert_eq!(Blocker::PasswordInvalid.to_string(), "password invalid");
    }

    #[test]
    fn evaluate_defaults() {
        let eval = evaluate(&FormInputs::default(), &PasswordPolicy::default());
        assert_eq!(eval.normalized_email, "");
        assert!(!eval.email_valid);
        assert!(!eval.password_valid);
        assert!(eval.passwords_match);
        assert!(!eval.form_valid);
    }

    #[test]
    fn evaluate_valid_form() {
        let inputs = FormInputs {
            email: "a@b.c".into(),
            password: "Secret12".into(),
            password_confirmation: "Secret12".into(),
            agree_terms: true,
        };
        assert!(evaluate(&inputs, &PasswordPolicy::default()).form_valid);
    }
}
