//! crates/loggia/src/record.rs
//! Per-call log record: timestamps, call site, thread and process identity.

use std::collections::BTreeMap;
use std::panic::Location;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Instant;

use chrono::{DateTime, Local};

use crate::levels::Level;

/// Call site of a logging method, captured via `#[track_caller]`.
///
/// Rust has no portable introspection of the enclosing function name, so the
/// call site carries only the source path and line; the file name and module
/// stem derived here feed the call-dependent format fields.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CallSite {
    /// Full source path as recorded by the compiler.
    pub path: &'static str,
    /// 1-based line number of the call.
    pub line: u32,
}

impl CallSite {
    /// Builds a call site from a caller [`Location`].
    #[must_use]
    pub fn from_location(location: &'static Location<'static>) -> Self {
        Self {
            path: location.file(),
            line: location.line(),
        }
    }

    /// Returns the base file name, extension included.
    #[must_use]
    pub fn file_name(&self) -> &'static str {
        Path::new(self.path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(self.path)
    }

    /// Returns the base file name with its extension stripped.
    #[must_use]
    pub fn module(&self) -> &'static str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(0) | None => name,
            Some(dot) => &name[..dot],
        }
    }
}

fn process_start() -> Instant {
    static START: OnceLock<Instant> = OnceLock::new();
    *START.get_or_init(Instant::now)
}

fn process_name() -> &'static str {
    static NAME: OnceLock<String> = OnceLock::new();
    NAME.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str().map(str::to_owned))
            })
            .unwrap_or_else(|| "-".to_owned())
    })
}

/// One log call's worth of data, consumed by
/// [`CompiledFormat::render`](crate::CompiledFormat::render).
#[derive(Clone, Debug)]
pub struct Record {
    /// Wall-clock time of the call.
    pub timestamp: DateTime<Local>,
    /// Seconds since the Unix epoch, fractional part included.
    pub created: f64,
    /// Milliseconds elapsed since the process first constructed a record.
    pub relative_created: f64,
    /// Name of the logger that produced the record.
    pub name: String,
    /// Severity of the call.
    pub level: Level,
    /// Line number of the call site.
    pub lineno: u32,
    /// Full source path of the call site.
    pub pathname: String,
    /// Operating-system process id.
    pub process: u32,
    /// Executable stem, or `-` when it cannot be determined.
    pub process_name: String,
    /// Name of the calling thread, or `-` for unnamed threads.
    pub thread_name: String,
    /// Debug rendering of the calling thread's id.
    pub thread_id: String,
    /// The formatted message text.
    pub message: String,
    /// Resolved directive values keyed as in the compiled directive table.
    pub extra: BTreeMap<String, String>,
}

impl Record {
    /// Builds a record for one log call.
    #[must_use]
    pub fn new(
        name: &str,
        level: Level,
        message: String,
        call_site: CallSite,
        extra: BTreeMap<String, String>,
    ) -> Self {
        let timestamp = Local::now();
        let created =
            timestamp.timestamp() as f64 + f64::from(timestamp.timestamp_subsec_micros()) / 1e6;
        let relative_created = process_start().elapsed().as_secs_f64() * 1e3;
        let current = std::thread::current();
        Self {
            timestamp,
            created,
            relative_created,
            name: name.to_owned(),
            level,
            lineno: call_site.line,
            pathname: call_site.path.to_owned(),
            process: std::process::id(),
            process_name: process_name().to_owned(),
            thread_name: current.name().unwrap_or("-").to_owned(),
            thread_id: format!("{:?}", current.id()),
            message,
            extra,
        }
    }

    /// Fractional milliseconds within the record's creation second.
    #[must_use]
    pub fn msecs(&self) -> f64 {
        self.created.fract() * 1e3
    }
}
