#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `loggia-sink` provides the output destinations consumed by the `loggia`
//! logger facade: a line-oriented [`StreamSink`] wrapping any
//! [`io::Write`](std::io::Write) implementor, and a [`RotatingFileSink`] that
//! caps file size and keeps a fixed number of rotated backups. The crate
//! contains no filtering policy; severity thresholds and record formatting
//! live in the facade, which hands fully rendered lines down to these sinks.
//!
//! # Design
//!
//! Each sink exposes a single `write_line` entry point taking a rendered
//! record. [`StreamSink`] stores a [`LineMode`] that controls whether a
//! trailing newline is appended, mirroring the convention of emitting each
//! diagnostic on its own line. [`RotatingFileSink`] tracks the number of
//! bytes written to the active file and rolls `<name>.log` through numbered
//! backups (`<name>.log.1` .. `<name>.log.N`) before a write would exceed the
//! configured cap.
//!
//! # Errors
//!
//! All operations surface [`std::io::Error`] values from the underlying
//! writer or filesystem. Sinks never panic on write failure; error policy
//! (report and continue) belongs to the caller.
//!
//! # Examples
//!
//! Collect rendered lines into an in-memory buffer:
//!
//! ```
//! use loggia_sink::{LineMode, StreamSink};
//!
//! let mut sink = StreamSink::new(Vec::new());
//! sink.write_line("2026-01-01 00:00:00,000 | app | INFO | ready").unwrap();
//!
//! let output = String::from_utf8(sink.into_inner()).unwrap();
//! assert!(output.ends_with('\n'));
//!
//! let mut raw = StreamSink::with_line_mode(Vec::new(), LineMode::WithoutNewline);
//! raw.write_line("no terminator").unwrap();
//! assert_eq!(raw.into_inner(), b"no terminator".to_vec());
//! ```

mod rotating;
mod stream;

pub use rotating::RotatingFileSink;
pub use stream::{LineMode, StreamSink};
