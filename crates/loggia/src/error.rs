//! crates/loggia/src/error.rs
//! Error taxonomy: invalid names, malformed format patterns, unknown levels.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error returned when a logger name is rejected.
///
/// Logger names double as registry keys and log-file base names, so a name
/// must contain at least one non-whitespace character.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("logger name must be a non-blank string")]
pub struct NameError;

/// Errors produced while compiling a format pattern.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum FormatError {
    /// The pattern consisted solely of whitespace.
    #[error(
        "format pattern must be '' or contain placeholders; \
         examples: '%(name)s', '%(*val)-5s', '%(*_foo)10s'"
    )]
    BlankPattern,
    /// The `%` count did not match the count of recognized placeholders, or a
    /// non-blank pattern contained no placeholder at all.
    #[error(
        "format pattern violates %-escaping rules; \
         examples: '%(name)s', '%(*val)-5s', '%(*_foo)10s'"
    )]
    MalformedEscaping,
    /// A capture field named something that cannot be a variable name.
    #[error("capture field '{0}' cannot be a variable name")]
    InvalidCaptureName(String),
    /// A bare field was neither a capture nor a member of the built-in set.
    #[error("field '{name}' is not an accepted placeholder: {accepted}")]
    UnknownField {
        /// The rejected field name as written in the pattern.
        name: String,
        /// Comma-separated list of the accepted built-in field names.
        accepted: String,
    },
}

/// Error returned when a level setter receives an unregistered value.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum LevelError {
    /// The string was not a registered level name.
    #[error("'{0}' is not a registered level name")]
    UnknownName(String),
    /// The number was not a registered level rank.
    #[error("{0} is not a registered level rank")]
    UnknownRank(u8),
}

/// Any error surfaced by this crate.
///
/// The three configuration-surface classes are raised synchronously at the
/// call that detected them; [`Error::Setup`] covers filesystem failures while
/// preparing the log directory or a logger's file destination, which are
/// fatal to construction (fail-fast, no retries).
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid logger name.
    #[error(transparent)]
    Name(#[from] NameError),
    /// Malformed or unrecognized format pattern.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// Invalid level value or name.
    #[error(transparent)]
    Level(#[from] LevelError),
    /// Filesystem setup failed for the log directory or a log file.
    #[error("failed to set up log path {path}: {source}")]
    Setup {
        /// The path that could not be created or opened.
        path: PathBuf,
        /// The underlying filesystem error.
        source: io::Error,
    },
}
