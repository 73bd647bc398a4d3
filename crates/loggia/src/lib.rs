#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `loggia` is a structured-logging facility built around named loggers that
//! each write to a rotating log file and to the console. A logger is obtained
//! by name from a [`Registry`] (or the process-wide one via [`get_logger`]);
//! repeated lookups of the same name return handles to the same instance, so
//! configuration applied anywhere is visible everywhere.
//!
//! Output is shaped by printf-style format patterns compiled once into a
//! [`CompiledFormat`]. Beyond the built-in record fields (`asctime`, `name`,
//! `levelname`, ...), a pattern may name *capture* fields (`%(*request_id)s`)
//! whose values are resolved per call from an explicit [`LogContext`]; an
//! unresolved capture renders as the `-----` sentinel rather than failing.
//!
//! # Design
//!
//! - [`Logger`] is a cheaply clonable handle over shared state. The facade
//!   threshold gates a call before any rendering work; the file and console
//!   destinations then apply their own thresholds independently.
//! - [`Level`] extends the conventional table with `SUCCESS`, `TASK` and
//!   `TRACE`; setters accept names, ranks or `Level` values through the
//!   [`IntoLevel`] seam.
//! - Patterns are validated eagerly: [`Logger::set_format`] compiles before
//!   swapping, so a rejected pattern leaves the previous format untouched.
//! - Call sites are captured with `#[track_caller]`, which feeds the
//!   `module`, `filename` and `lineno` fields without any stack inspection.
//!
//! # Errors
//!
//! Configuration mistakes surface synchronously: blank logger names as
//! [`NameError`], malformed patterns as [`FormatError`], unregistered level
//! values as [`LevelError`], and filesystem setup failures as
//! [`Error::Setup`]. Log calls themselves never fail; a destination write
//! error is reported to stderr and the call continues.
//!
//! # Examples
//!
//! ```no_run
//! use loggia::{LogContext, Level};
//!
//! let logger = loggia::get_logger("app")?;
//! logger.set_level(Level::Debug)?;
//! logger.set_format(Some("%(asctime)s | %(*request_id)s | %(message)s"))?;
//!
//! logger.info("starting up");
//! let ctx = LogContext::new().local("request_id", "r-17");
//! logger.debug_with("handling request", &ctx);
//! # Ok::<(), loggia::Error>(())
//! ```
//!
//! # Feature flags
//!
//! - `serde`: `Serialize`/`Deserialize` for [`Level`].
//! - `tracing`: the `tracing_bridge` module, routing standard tracing
//!   events into a logger.

mod context;
mod error;
mod format;
mod levels;
mod logger;
mod record;
mod registry;

#[cfg(feature = "tracing")]
pub mod tracing_bridge;

pub use context::LogContext;
pub use error::{Error, FormatError, LevelError, NameError};
pub use format::{CAPTURE_MARKER, CompiledFormat, DEFAULT_PATTERN, SENTINEL};
pub use levels::{IntoLevel, Level};
pub use logger::Logger;
pub use record::{CallSite, Record};
pub use registry::{Registry, get_logger};
