#![forbid(unsafe_code)]

//! Sign-up demo binary entry point.

use std::fs;
use std::io::{self, Read};
use std::process;

use signup_core::PasswordPolicy;
use signup_demo::cli;
use signup_demo::script::parse_script;
use signup_demo::sink::{JsonlSink, SinkDestination};
use signup_demo::{Output, replay};
use tracing_subscriber::EnvFilter;

fn main() {
    let opts = cli::Opts::parse();
    init_tracing();

    let source = match &opts.script {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).map(|_| buf)
        }
    };
    let source = match source {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Failed to read script: {e}");
            process::exit(1);
        }
    };

    let commands = match parse_script(&source) {
        Ok(commands) => commands,
        Err(e) => {
            eprintln!("Script error: {e}");
            process::exit(1);
        }
    };

    let policy = PasswordPolicy::default().with_min_len(opts.min_password_len);
    let result = match &opts.jsonl {
        Some(dest) => match JsonlSink::open(&SinkDestination::from_arg(dest), opts.flush) {
            Ok(mut sink) => replay(&commands, policy, Output::Jsonl(&mut sink)),
            Err(e) => Err(e),
        },
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            replay(&commands, policy, Output::Status(&mut lock))
        }
    };

    if let Err(e) = result {
        eprintln!("Output error: {e}");
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
