#![forbid(unsafe_code)]

//! A simulated sign-up screen driven by script commands.
//!
//! The session plays the UI collaborator: it forwards field edits to the
//! engine, writes email rewrites back into its own copy of the email field
//! text, and reports what the widgets would show after every step.

use serde::Serialize;
use signup_core::{Alert, Edit, FormBinder, FormSnapshot, FormView, PasswordPolicy, SignupForm};

use crate::script::Command;

/// Result of tapping submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Presented { alert: Alert },
    Rejected { reason: String },
}

/// Everything observable after one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub step: u64,
    pub command: String,
    /// Text the email field displays after any rewrite.
    pub email_field: String,
    pub view: FormView,
    pub snapshot: FormSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit: Option<SubmitOutcome>,
}

pub struct Session {
    form: SignupForm,
    binder: FormBinder,
    email_field: String,
    step: u64,
}

impl Session {
    #[must_use]
    pub fn new(policy: PasswordPolicy) -> Self {
        let form = SignupForm::with_policy(policy);
        let binder = FormBinder::attach(&form);
        Self {
            form,
            binder,
            email_field: String::new(),
            step: 0,
        }
    }

    #[must_use]
    pub fn form(&self) -> &SignupForm {
        &self.form
    }

    pub fn run(&mut self, command: &Command) -> StepRecord {
        self.step += 1;
        let _span = tracing::debug_span!("step", step = self.step).entered();

        let submit = match command {
            Command::Edit(edit) => {
                self.edit(edit.clone());
                None
            }
            Command::Submit => Some(match self.binder.submit() {
                Ok(alert) => SubmitOutcome::Presented { alert },
                Err(err) => {
                    tracing::info!(%err, "submit rejected");
                    SubmitOutcome::Rejected {
                        reason: err.to_string(),
                    }
                }
            }),
            Command::Show => None,
        };

        StepRecord {
            step: self.step,
            command: command.describe(),
            email_field: self.email_field.clone(),
            view: self.binder.view(),
            snapshot: self.form.snapshot(),
            submit,
        }
    }

    fn edit(&mut self, edit: Edit) {
        if let Edit::Email(text) = &edit {
            self.email_field.clone_from(text);
        }
        self.form.apply(edit);
        if let Some(rewrite) = self.binder.take_email_rewrite() {
            tracing::debug!(from = %self.email_field, to = %rewrite, "email field rewritten");
            self.email_field = rewrite;
        }
    }
}

/// One-line human summary of a step.
#[must_use]
pub fn render_status(record: &StepRecord) -> String {
    let flag = |ok: bool| if ok { "ok" } else { "invalid" };
    let mut line = format!(
        "[{}] {} -> submit={} email={} password={} confirm={} terms={} field={:?}",
        record.step,
        record.command,
        if record.view.submit_enabled { "on" } else { "off" },
        flag(!record.view.email_tone.is_invalid()),
        flag(!record.view.password_tone.is_invalid()),
        flag(!record.view.confirmation_tone.is_invalid()),
        if record.snapshot.agree_terms { "on" } else { "off" },
        record.email_field,
    );
    match &record.submit {
        Some(SubmitOutcome::Presented { alert }) => {
            line.push_str(&format!("\n    alert: {} [{}]", alert.title, alert.dismiss_label));
        }
        Some(SubmitOutcome::Rejected { reason }) => {
            line.push_str(&format!("\n    {reason}"));
        }
        None => {}
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;

    fn run_all(script: &str) -> Vec<StepRecord> {
        let mut session = Session::new(PasswordPolicy::default());
        parse_script(script)
            .expect("script parses")
            .iter()
            .map(|cmd| session.run(cmd))
            .collect()
    }

    #[test]
    fn email_field_is_rewritten() {
        let records = run_all("email  User@Example.COM ");
        assert_eq!(records[0].email_field, "user@example.com");
        assert_eq!(records[0].snapshot.normalized_email, "user@example.com");
    }

    #[test]
    fn repeated_email_edit_is_rewritten_each_time() {
        let records = run_all("email A@B.C\nemail A@B.C\n");
        assert_eq!(records[0].email_field, "a@b.c");
        assert_eq!(records[1].email_field, "a@b.c");
    }

    #[test]
    fn valid_script_presents_alert() {
        let records = run_all(
            "email a@b.c\npassword Secret12\nconfirm Secret12\nterms on\nsubmit\n",
        );
        let last = records.last().expect("records");
        assert!(last.view.submit_enabled);
        assert_eq!(
            last.submit,
            Some(SubmitOutcome::Presented {
                alert: Alert::WELCOME
            })
        );
        assert!(render_status(last).contains("alert: Welcome! [Dismiss]"));
    }

    #[test]
    fn rejected_submit_explains_why() {
        let records = run_all("email a@b.c\nsubmit\n");
        match &records[1].submit {
            Some(SubmitOutcome::Rejected { reason }) => {
                assert_eq!(reason, "sign up disabled: password invalid, terms not accepted");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn steps_are_numbered() {
        let records = run_all("show\nshow\n");
        assert_eq!(records[0].step, 1);
        assert_eq!(records[1].step, 2);
    }

    #[test]
    fn status_line_format() {
        let records = run_all("password password\nconfirm password\n");
        assert_eq!(
            render_status(&records[1]),
            "[2] confirm \"********\" -> submit=off email=invalid password=invalid \
             confirm=ok terms=off field=\"\""
        );
    }
}
