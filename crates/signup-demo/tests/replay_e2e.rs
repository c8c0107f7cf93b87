//! End-to-end replay of edit scripts through the demo collaborator.

use pretty_assertions::assert_eq;
use serde_json::Value;
use signup_core::PasswordPolicy;
use signup_demo::script::parse_script;
use signup_demo::sink::{JsonlSink, SinkDestination};
use signup_demo::{Output, replay};

const VALID_SCRIPT: &str = "\
# happy path
email  User@Example.COM 
password Secret12
confirm Secret12
terms on
submit
confirm Secret13
submit
";

#[test]
fn status_output_tracks_every_step() {
    let commands = parse_script(VALID_SCRIPT).expect("script parses");
    let mut out = Vec::new();
    let records = replay(&commands, PasswordPolicy::default(), Output::Status(&mut out))
        .expect("replay succeeds");
    assert_eq!(records.len(), 7);

    let text = String::from_utf8(out).expect("utf8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "[1] email \" User@Example.COM \" -> submit=off email=ok password=invalid \
         confirm=ok terms=off field=\"user@example.com\""
    );
    assert!(text.contains("alert: Welcome! [Dismiss]"));
    assert!(text.contains("sign up disabled: passwords do not match"));
}

#[test]
fn mismatch_keeps_email_valid() {
    let commands = parse_script(VALID_SCRIPT).expect("script parses");
    let mut out = Vec::new();
    let records = replay(&commands, PasswordPolicy::default(), Output::Status(&mut out))
        .expect("replay succeeds");

    let after_mismatch = &records[5];
    assert!(!after_mismatch.snapshot.passwords_match);
    assert!(!after_mismatch.snapshot.form_valid);
    assert!(after_mismatch.snapshot.email_valid);
    assert!(!after_mismatch.view.submit_enabled);
}

#[test]
fn jsonl_records_are_parseable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("steps.jsonl");
    let commands = parse_script(VALID_SCRIPT).expect("script parses");

    {
        let mut sink = JsonlSink::open(&SinkDestination::File(path.clone()), true)
            .expect("open sink");
        replay(&commands, PasswordPolicy::default(), Output::Jsonl(&mut sink))
            .expect("replay succeeds");
    }

    let contents = std::fs::read_to_string(&path).expect("read jsonl");
    let rows: Vec<Value> = contents
        .lines()
        .map(|l| serde_json::from_str(l).expect("valid json"))
        .collect();
    assert_eq!(rows.len(), 7);

    assert_eq!(rows[0]["email_field"], "user@example.com");
    assert_eq!(rows[0]["view"]["email_tone"], "normal");
    assert_eq!(rows[0]["view"]["password_tone"], "invalid");
    assert_eq!(rows[1]["command"], "password \"********\"");
    assert!(!contents.contains("Secret12"));

    assert_eq!(rows[4]["submit"]["result"], "presented");
    assert_eq!(rows[4]["submit"]["alert"]["title"], "Welcome!");
    assert_eq!(rows[6]["submit"]["result"], "rejected");
    assert!(rows[5].get("submit").is_none());
}

#[test]
fn stricter_policy_from_config() {
    let commands = parse_script("password Secret12\nconfirm Secret12\n").expect("parses");
    let mut out = Vec::new();
    let records = replay(
        &commands,
        PasswordPolicy::default().with_min_len(10),
        Output::Status(&mut out),
    )
    .expect("replay succeeds");
    assert!(!records[1].snapshot.password_valid);
    assert!(records[1].snapshot.passwords_match);
}
