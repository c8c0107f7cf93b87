#![forbid(unsafe_code)]

//! Command-line argument parsing for the sign-up demo.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `SIGNUP_DEMO_*` prefix.

use std::env;
use std::path::PathBuf;
use std::process;

use signup_core::rules::MIN_PASSWORD_LEN;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
Sign-up form demo: replays field edits through the validation graph

USAGE:
    signup-demo [OPTIONS]

OPTIONS:
    --script=PATH            Read commands from PATH (default: stdin)
    --jsonl[=PATH]           Emit JSONL step records to PATH, or stdout when
                             PATH is omitted or '-'
    --min-password-len=N     Minimum password length (default: 8)
    --no-flush               Buffer JSONL output instead of flushing each line
    --help, -h               Show this help message
    --version, -V            Show version

SCRIPT COMMANDS:
    email <text>      Set the email field (text taken verbatim)
    password <text>   Set the password field
    confirm <text>    Set the password confirmation field
    terms on|off      Toggle the terms agreement
    submit            Tap the sign up button
    show              Print the current state
    # ...             Comment

ENVIRONMENT VARIABLES:
    SIGNUP_DEMO_SCRIPT            Override --script
    SIGNUP_DEMO_JSONL             Override --jsonl (path or '-')
    SIGNUP_DEMO_MIN_PASSWORD_LEN  Override --min-password-len
    RUST_LOG                      Log filter for stderr diagnostics (default: warn)";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Script path; `None` reads stdin.
    pub script: Option<PathBuf>,
    /// JSONL destination (`-` for stdout); `None` prints status lines.
    pub jsonl: Option<String>,
    pub min_password_len: usize,
    /// Flush JSONL output after every record.
    pub flush: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParseError {
    Help,
    Version,
    InvalidValue { flag: &'static str, value: String },
    UnknownArg(String),
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            script: None,
            jsonl: None,
            min_password_len: MIN_PASSWORD_LEN,
            flush: true,
        }
    }
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags.
    pub fn parse() -> Self {
        match Self::parse_from_env_and_args(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(opts) => opts,
            Err(ParseError::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Err(ParseError::Version) => {
                println!("signup-demo {VERSION}");
                process::exit(0);
            }
            Err(ParseError::InvalidValue { flag, value }) => {
                eprintln!("Invalid {flag} value: {value}");
                process::exit(2);
            }
            Err(ParseError::UnknownArg(arg)) => {
                eprintln!("Unknown argument: {arg}");
                eprintln!("Run with --help for usage information.");
                process::exit(2);
            }
        }
    }

    fn parse_from_env_and_args<I, S, F>(args: I, get_env: F) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        if let Some(val) = get_env("SIGNUP_DEMO_SCRIPT")
            && !val.trim().is_empty()
        {
            opts.script = Some(PathBuf::from(val));
        }
        if let Some(val) = get_env("SIGNUP_DEMO_JSONL")
            && !val.trim().is_empty()
        {
            opts.jsonl = Some(val);
        }
        if let Some(val) = get_env("SIGNUP_DEMO_MIN_PASSWORD_LEN")
            && let Ok(n) = val.trim().parse()
        {
            opts.min_password_len = n;
        }

        for arg in args {
            let arg = arg.as_ref();
            match arg {
                "--help" | "-h" => return Err(ParseError::Help),
                "--version" | "-V" => return Err(ParseError::Version),
                "--jsonl" => opts.jsonl = Some("-".into()),
                "--no-flush" => opts.flush = false,
                other => {
                    if let Some(val) = other.strip_prefix("--script=") {
                        if val.is_empty() {
                            return Err(ParseError::InvalidValue {
                                flag: "--script",
                                value: val.to_string(),
                            });
                        }
                        opts.script = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--jsonl=") {
                        opts.jsonl = Some(if val.is_empty() { "-" } else { val }.to_string());
                    } else if let Some(val) = other.strip_prefix("--min-password-len=") {
                        match val.parse() {
                            Ok(n) => opts.min_password_len = n,
                            Err(_) => {
                                return Err(ParseError::InvalidValue {
                                    flag: "--min-password-len",
                                    value: val.to_string(),
                                });
                            }
                        }
                    } else {
                        return Err(ParseError::UnknownArg(other.to_string()));
                    }
                }
            }
        }

        Ok(opts)
    }
}
