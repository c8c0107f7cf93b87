#![forbid(unsafe_code)]

//! JSONL output for step records.
//!
//! One JSON object per line, written in call order. Flush behavior is
//! explicit so e2e captures see every line even if the process is killed.

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use serde::Serialize;

/// Destination for JSONL output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkDestination {
    Stdout,
    /// Append to a file at the given path.
    File(PathBuf),
}

impl SinkDestination {
    /// `-` means stdout; anything else is a file path.
    #[must_use]
    pub fn from_arg(value: &str) -> Self {
        if value == "-" {
            Self::Stdout
        } else {
            Self::File(PathBuf::from(value))
        }
    }
}

pub struct JsonlSink {
    writer: BufWriter<Box<dyn Write>>,
    flush_on_write: bool,
}

impl JsonlSink {
    pub fn open(destination: &SinkDestination, flush_on_write: bool) -> io::Result<Self> {
        let writer: Box<dyn Write> = match destination {
            SinkDestination::Stdout => Box::new(io::stdout()),
            SinkDestination::File(path) => {
                Box::new(OpenOptions::new().create(true).append(true).open(path)?)
            }
        };
        Ok(Self::from_writer(writer, flush_on_write))
    }

    #[must_use]
    pub fn from_writer(writer: Box<dyn Write>, flush_on_write: bool) -> Self {
        Self {
            writer: BufWriter::new(writer),
            flush_on_write,
        }
    }

    /// Serialize `record` as a single line.
    pub fn write_record<T: Serialize>(&mut self, record: &T) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        if self.flush_on_write {
            self.writer.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
