//! crates/loggia/src/logger.rs
//! Per-name logger facade: severity methods, threshold gates, format swaps.

use std::fmt::{self, Write as _};
use std::io;
use std::panic::Location;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use loggia_sink::{RotatingFileSink, StreamSink};

use crate::context::LogContext;
use crate::error::{FormatError, LevelError};
use crate::format::CompiledFormat;
use crate::levels::{IntoLevel, Level};
use crate::record::{CallSite, Record};

/// A named logger with a file destination and a console destination.
///
/// Instances are shared handles: the registry hands out clones backed by the
/// same state, so `getLogger`-style lookups always observe one configuration
/// per name. The facade threshold gates whether a call does any work at all;
/// each destination's own threshold then decides whether that destination
/// writes. All methods are callable concurrently from multiple threads.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

struct Inner {
    name: String,
    threshold: AtomicU8,
    file_threshold: AtomicU8,
    stream_threshold: AtomicU8,
    // Single lock shared by both destinations so a reformat can never be
    // observed half-applied.
    format: Mutex<Arc<CompiledFormat>>,
    file: Mutex<RotatingFileSink>,
    console: Mutex<StreamSink<Box<dyn io::Write + Send>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

macro_rules! level_methods {
    ($($method:ident / $with_method:ident => $level:ident),* $(,)?) => {
        $(
            #[doc = concat!("Logs `message` at the ", stringify!($level), " level.")]
            #[track_caller]
            pub fn $method(&self, message: impl fmt::Display) {
                self.emit(
                    Level::$level,
                    &message,
                    &LogContext::default(),
                    CallSite::from_location(Location::caller()),
                );
            }

            #[doc = concat!(
                "Logs `message` at the ",
                stringify!($level),
                " level, resolving capture directives against `context`."
            )]
            #[track_caller]
            pub fn $with_method(&self, message: impl fmt::Display, context: &LogContext) {
                self.emit(
                    Level::$level,
                    &message,
                    context,
                    CallSite::from_location(Location::caller()),
                );
            }
        )*
    };
}

impl Logger {
    pub(crate) fn new(name: String, file: RotatingFileSink, format: CompiledFormat) -> Self {
        Self::with_console(name, file, StreamSink::new(Box::new(io::stdout())), format)
    }

    pub(crate) fn with_console(
        name: String,
        file: RotatingFileSink,
        console: StreamSink<Box<dyn io::Write + Send>>,
        format: CompiledFormat,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                threshold: AtomicU8::new(Level::Trace.rank()),
                file_threshold: AtomicU8::new(Level::Trace.rank()),
                stream_threshold: AtomicU8::new(Level::Trace.rank()),
                format: Mutex::new(Arc::new(format)),
                file: Mutex::new(file),
                console: Mutex::new(console),
            }),
        }
    }

    /// Returns the logger's registered name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Reports whether two handles refer to the same logger.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Reports whether a call at `level` would pass the facade threshold.
    ///
    /// This is the cheap short-circuit consulted before any context
    /// resolution or rendering happens.
    #[must_use]
    pub fn enabled_for(&self, level: Level) -> bool {
        self.inner.threshold.load(Ordering::Relaxed) <= level.rank()
    }

    /// Returns the facade threshold.
    #[must_use]
    pub fn level(&self) -> Level {
        load_level(&self.inner.threshold)
    }

    /// Returns the file destination's threshold.
    #[must_use]
    pub fn file_level(&self) -> Level {
        load_level(&self.inner.file_threshold)
    }

    /// Returns the console destination's threshold.
    #[must_use]
    pub fn stream_level(&self) -> Level {
        load_level(&self.inner.stream_threshold)
    }

    /// Sets the facade threshold from a level name or numeric rank.
    pub fn set_level(&self, level: impl IntoLevel) -> Result<(), LevelError> {
        let level = level.into_level()?;
        self.inner.threshold.store(level.rank(), Ordering::Relaxed);
        Ok(())
    }

    /// Sets the file destination's threshold from a level name or rank.
    pub fn set_level_file(&self, level: impl IntoLevel) -> Result<(), LevelError> {
        let level = level.into_level()?;
        self.inner
            .file_threshold
            .store(level.rank(), Ordering::Relaxed);
        Ok(())
    }

    /// Sets the console destination's threshold from a level name or rank.
    pub fn set_level_stream(&self, level: impl IntoLevel) -> Result<(), LevelError> {
        let level = level.into_level()?;
        self.inner
            .stream_threshold
            .store(level.rank(), Ordering::Relaxed);
        Ok(())
    }

    /// Replaces the output format on both destinations.
    ///
    /// `None` restores [`DEFAULT_PATTERN`](crate::DEFAULT_PATTERN); `Some("")`
    /// selects undecorated raw-message output. The pattern is compiled before
    /// anything changes, so a failed compile leaves the previous format fully
    /// in effect, and the swap happens under one lock so no concurrent call
    /// can observe the destinations disagreeing.
    pub fn set_format(&self, pattern: Option<&str>) -> Result<(), FormatError> {
        let compiled = Arc::new(CompiledFormat::compile(pattern)?);
        *lock(&self.inner.format) = compiled;
        Ok(())
    }

    /// Returns the currently compiled pattern text.
    #[must_use]
    pub fn format_pattern(&self) -> String {
        lock(&self.inner.format).pattern().to_owned()
    }

    level_methods! {
        critical / critical_with => Critical,
        error / error_with => Error,
        warning / warning_with => Warning,
        success / success_with => Success,
        task / task_with => Task,
        info / info_with => Info,
        debug / debug_with => Debug,
        trace / trace_with => Trace,
    }

    /// Logs `message` at an arbitrary severity level.
    #[track_caller]
    pub fn log(&self, level: Level, message: impl fmt::Display) {
        self.emit(
            level,
            &message,
            &LogContext::default(),
            CallSite::from_location(Location::caller()),
        );
    }

    /// Logs `message` at an arbitrary severity level with an explicit context.
    #[track_caller]
    pub fn log_with(&self, level: Level, message: impl fmt::Display, context: &LogContext) {
        self.emit(
            level,
            &message,
            context,
            CallSite::from_location(Location::caller()),
        );
    }

    /// Logs `message` at the Error level together with `error`'s source chain.
    #[track_caller]
    pub fn exception(&self, message: impl fmt::Display, error: &dyn std::error::Error) {
        self.exception_with(message, error, &LogContext::default());
    }

    /// Logs `message` and `error`'s source chain at the Error level, resolving
    /// capture directives against `context`.
    #[track_caller]
    pub fn exception_with(
        &self,
        message: impl fmt::Display,
        error: &dyn std::error::Error,
        context: &LogContext,
    ) {
        let call_site = CallSite::from_location(Location::caller());
        if !self.enabled_for(Level::Error) {
            return;
        }
        let composed = format!("{message}: {}", describe_error(error));
        self.emit(Level::Error, &composed, context, call_site);
    }

    fn emit(
        &self,
        level: Level,
        message: &dyn fmt::Display,
        context: &LogContext,
        call_site: CallSite,
    ) {
        if !self.enabled_for(level) {
            return;
        }
        let format = Arc::clone(&lock(&self.inner.format));
        let extra = context.resolve(format.directives(), call_site);
        let record = Record::new(
            &self.inner.name,
            level,
            message.to_string(),
            call_site,
            extra,
        );
        let line = format.render(&record);
        let rank = level.rank();

        if self.inner.file_threshold.load(Ordering::Relaxed) <= rank {
            let mut file = lock(&self.inner.file);
            let result = file.write_line(&line).and_then(|()| file.flush());
            if let Err(err) = result {
                self.report_write_failure("file", &err);
            }
        }
        if self.inner.stream_threshold.load(Ordering::Relaxed) <= rank {
            let mut console = lock(&self.inner.console);
            let result = console.write_line(&line).and_then(|()| console.flush());
            if let Err(err) = result {
                self.report_write_failure("console", &err);
            }
        }
    }

    // Destination failures must never abort the log call; mirror the
    // report-and-continue handler policy of the original facility.
    fn report_write_failure(&self, destination: &str, err: &io::Error) {
        eprintln!(
            "loggia: logger '{}' failed to write to its {destination} destination: {err}",
            self.inner.name
        );
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.inner.name)
            .field("level", &self.level())
            .field("file_level", &self.file_level())
            .field("stream_level", &self.stream_level())
            .finish_non_exhaustive()
    }
}

fn load_level(threshold: &AtomicU8) -> Level {
    // Only registered ranks are ever stored.
    Level::from_rank(threshold.load(Ordering::Relaxed)).unwrap_or(Level::Notset)
}

fn describe_error(error: &dyn std::error::Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(text, " (caused by: {cause})");
        source = cause.source();
    }
    text
}
