#![forbid(unsafe_code)]

//! Scripted UI collaborator for `signup-core`.
//!
//! Reads a small edit script, replays it through a [`SignupForm`] with a
//! [`FormBinder`] attached, and reports what each widget would display after
//! every step, as status lines or JSONL records.
//!
//! [`SignupForm`]: signup_core::SignupForm
//! [`FormBinder`]: signup_core::FormBinder

pub mod cli;
pub mod script;
pub mod session;
pub mod sink;

use std::io::{self, Write};

use signup_core::PasswordPolicy;

use crate::script::Command;
use crate::session::{Session, StepRecord, render_status};
use crate::sink::JsonlSink;

/// How step records leave the process.
pub enum Output<'a> {
    Status(&'a mut dyn Write),
    Jsonl(&'a mut JsonlSink),
}

/// Run `commands` against a fresh form and emit one record per step.
///
/// Returns the records for callers that want to inspect the final state.
pub fn replay(
    commands: &[Command],
    policy: PasswordPolicy,
    output: Output<'_>,
) -> io::Result<Vec<StepRecord>> {
    let mut session = Session::new(policy);
    let mut records = Vec::with_capacity(commands.len());
    match output {
        Output::Status(out) => {
            for cmd in commands {
                let record = session.run(cmd);
                writeln!(out, "{}", render_status(&record))?;
                records.push(record);
            }
            out.flush()?;
        }
        Output::Jsonl(sink) => {
            for cmd in commands {
                let record = session.run(cmd);
                sink.write_record(&record)?;
                records.push(record);
            }
            sink.flush()?;
        }
    }
    tracing::info!(
        steps = records.len(),
        form_valid = session.form().form_valid(),
        "replay finished"
    );
    Ok(records)
}
