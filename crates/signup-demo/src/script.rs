#![forbid(unsafe_code)]

//! Line-oriented edit scripts.
//!
//! ```text
//! # comment
//! email  User@Example.COM
//! password Secret12
//! confirm Secret12
//! terms on
//! submit
//! show
//! ```
//!
//! Text commands take everything after the first space verbatim, so inner
//! and trailing spaces survive; a bare `email` clears the field.

use signup_core::Edit;

/// One script step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Edit(Edit),
    Submit,
    Show,
}

impl Command {
    /// Short echo of the command with password text masked.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Command::Edit(Edit::Email(text)) => format!("email {text:?}"),
            Command::Edit(Edit::Password(text)) => format!("password {}", mask(text)),
            Command::Edit(Edit::PasswordConfirmation(text)) => format!("confirm {}", mask(text)),
            Command::Edit(Edit::AgreeTerms(on)) => {
                format!("terms {}", if *on { "on" } else { "off" })
            }
            Command::Submit => "submit".to_string(),
            Command::Show => "show".to_string(),
        }
    }
}

fn mask(text: &str) -> String {
    format!("\"{}\"", "*".repeat(text.chars().count()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptErrorKind {
    UnknownCommand(String),
    InvalidToggle(String),
    UnexpectedArgument(String),
}

/// A script line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    /// 1-indexed line number.
    pub line: usize,
    pub kind: ScriptErrorKind,
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ScriptErrorKind::UnknownCommand(cmd) => {
                write!(f, "line {}: unknown command '{cmd}'", self.line)
            }
            ScriptErrorKind::InvalidToggle(value) => {
                write!(f, "line {}: expected on/off, got '{value}'", self.line)
            }
            ScriptErrorKind::UnexpectedArgument(cmd) => {
                write!(f, "line {}: '{cmd}' takes no argument", self.line)
            }
        }
    }
}

impl std::error::Error for ScriptError {}

/// Parse a whole script.
pub fn parse_script(source: &str) -> Result<Vec<Command>, ScriptError> {
    let mut commands = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        if let Some(cmd) = parse_line(raw).map_err(|kind| ScriptError {
            line: idx + 1,
            kind,
        })? {
            commands.push(cmd);
        }
    }
    Ok(commands)
}

/// Parse one line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_line(raw: &str) -> Result<Option<Command>, ScriptErrorKind> {
    let line = raw.strip_suffix('\r').unwrap_or(raw);
    if line.trim().is_empty() || line.trim_start().starts_with('#') {
        return Ok(None);
    }
    let line = line.trim_start();
    let (keyword, rest) = match line.split_once(' ') {
        Some((keyword, rest)) => (keyword, Some(rest)),
        None => (line, None),
    };
    let text = || rest.unwrap_or_default().to_string();

    let cmd = match keyword {
        "email" => Command::Edit(Edit::Email(text())),
        "password" => Command::Edit(Edit::Password(text())),
        "confirm" => Command::Edit(Edit::PasswordConfirmation(text())),
        "terms" => {
            let value = rest.unwrap_or_default().trim();
            let on = match value.to_ascii_lowercase().as_str() {
                "on" | "true" | "1" | "yes" => true,
                "off" | "false" | "0" | "no" => false,
                _ => return Err(ScriptErrorKind::InvalidToggle(value.to_string())),
            };
            Command::Edit(Edit::AgreeTerms(on))
        }
        "submit" | "show" => {
            if rest.is_some_and(|r| !r.trim().is_empty()) {
                return Err(ScriptErrorKind::UnexpectedArgument(keyword.to_string()));
            }
            if keyword == "submit" {
                Command::Submit
            } else {
                Command::Show
            }
        }
        other => return Err(ScriptErrorKind::UnknownCommand(other.to_string())),
    };
    Ok(Some(cmd))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_taken_verbatim() {
        assert_eq!(
            parse_line("email  User@Example.COM "),
            Ok(Some(Command::Edit(Edit::Email(" User@Example.COM ".into()))))
        );
        assert_eq!(
            parse_line("password a b"),
            Ok(Some(Command::Edit(Edit::Password("a b".into()))))
        );
    }

    #[test]
    fn bare_text_command_clears() {
        assert_eq!(
            parse_line("confirm"),
            Ok(Some(Command::Edit(Edit::PasswordConfirmation(String::new()))))
        );
    }

    #[test]
    fn comments_and_blanks_skipped() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   "), Ok(None));
        assert_eq!(parse_line("  # note"), Ok(None));
    }

    #[test]
    fn toggles() {
        assert_eq!(
            parse_line("terms on"),
            Ok(Some(Command::Edit(Edit::AgreeTerms(true))))
        );
        assert_eq!(
            parse_line("terms OFF"),
            Ok(Some(Command::Edit(Edit::AgreeTerms(false))))
        );
        assert_eq!(
            parse_line("terms maybe"),
            Err(ScriptErrorKind::InvalidToggle("maybe".into()))
        );
        assert_eq!(
            parse_line("terms"),
            Err(ScriptErrorKind::InvalidToggle(String::new()))
        );
    }

    #[test]
    fn crlf_line_endings() {
        assert_eq!(parse_line("submit\r"), Ok(Some(Command::Submit)));
    }

    #[test]
    fn errors_carry_line_numbers() {
        let err = parse_script("email a@b.c\n\nfrobnicate\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.to_string(), "line 3: unknown command 'frobnicate'");

        let err = parse_script("show now").unwrap_err();
        assert_eq!(err.to_string(), "line 1: 'show' takes no argument");
    }

    #[test]
    fn describe_masks_passwords() {
        let cmd = Command::Edit(Edit::Password("Secret12".into()));
        assert_eq!(cmd.describe(), "password \"********\"");
        assert_eq!(
            Command::Edit(Edit::Email("a@b.c".into())).describe(),
            "email \"a@b.c\""
        );
    }
}
