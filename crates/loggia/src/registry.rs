//! crates/loggia/src/registry.rs
//! Name-keyed logger registry and the process-wide default instance.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

use loggia_sink::RotatingFileSink;

use crate::error::{Error, NameError};
use crate::format::CompiledFormat;
use crate::logger::Logger;

/// Rotation threshold for per-logger log files.
const MAX_LOG_BYTES: u64 = 50_000_000;
/// Rotated backups kept per log file.
const LOG_BACKUPS: usize = 5;

/// A collection of named loggers sharing one log directory.
///
/// Each distinct name maps to exactly one logger for the registry's lifetime;
/// repeated lookups return handles to the same instance, so configuration
/// applied through any handle is visible through all of them. The registry is
/// internally locked and safe to share across threads.
///
/// Most programs use the process-wide instance via [`get_logger`]; an
/// explicit registry exists for tests and for programs that need more than
/// one log directory.
#[derive(Debug)]
pub struct Registry {
    dir: PathBuf,
    loggers: Mutex<HashMap<String, Logger>>,
}

impl Registry {
    /// Creates a registry whose log files live under `dir`.
    ///
    /// The directory is created eagerly so that misconfiguration surfaces
    /// here rather than at the first log call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Setup`] when the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| Error::Setup {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            loggers: Mutex::new(HashMap::new()),
        })
    }

    /// Creates a registry rooted at `logs/` beside the running executable,
    /// falling back to the current directory when the executable path is
    /// unavailable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Setup`] when the directory cannot be created.
    pub fn with_default_dir() -> Result<Self, Error> {
        let base = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join("logs"))
    }

    /// Returns the registry's log directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the logger registered under `name`, creating it on first use.
    ///
    /// A new logger starts at the Trace threshold on the facade and both
    /// destinations, writes to `<dir>/<name>.log` with 50 MB rotation and
    /// five backups, and renders with the default format.
    ///
    /// # Errors
    ///
    /// Returns [`NameError`] (wrapped) when `name` is blank, or
    /// [`Error::Setup`] when the log file cannot be opened.
    pub fn get(&self, name: &str) -> Result<Logger, Error> {
        if name.trim().is_empty() {
            return Err(NameError.into());
        }
        let mut loggers = self
            .loggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(logger) = loggers.get(name) {
            return Ok(logger.clone());
        }
        let path = self.dir.join(format!("{name}.log"));
        let sink =
            RotatingFileSink::new(&path, MAX_LOG_BYTES, LOG_BACKUPS).map_err(|source| {
                Error::Setup {
                    path: path.clone(),
                    source,
                }
            })?;
        // The default pattern is a compile-time constant; its compilation
        // cannot fail.
        let format = CompiledFormat::default();
        let logger = Logger::new(name.to_owned(), sink, format);
        loggers.insert(name.to_owned(), logger.clone());
        Ok(logger)
    }

    /// Returns the names of all registered loggers, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let loggers = self
            .loggers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = loggers.keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

/// Returns a logger from the process-wide registry, creating both on first
/// use.
///
/// The process-wide registry is initialized once with
/// [`Registry::with_default_dir`] and then reused for the lifetime of the
/// process.
///
/// # Errors
///
/// Returns [`Error::Setup`] when the default log directory cannot be created,
/// or any error [`Registry::get`] reports for `name`.
///
/// # Examples
///
/// ```no_run
/// let logger = loggia::get_logger("app")?;
/// logger.info("service starting");
/// # Ok::<(), loggia::Error>(())
/// ```
pub fn get_logger(name: &str) -> Result<Logger, Error> {
    static GLOBAL: OnceLock<Registry> = OnceLock::new();
    if let Some(registry) = GLOBAL.get() {
        return registry.get(name);
    }
    // Losing the init race is fine; the spare registry is dropped and the
    // winner's directory is used.
    let registry = Registry::with_default_dir()?;
    GLOBAL.get_or_init(move || registry).get(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_the_log_directory_eagerly() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("a").join("b");
        let registry = Registry::new(&nested).expect("registry builds");
        assert!(nested.is_dir());
        assert_eq!(registry.dir(), nested);
    }

    #[test]
    fn repeated_lookups_return_the_same_logger() {
        let dir = tempdir().expect("tempdir");
        let registry = Registry::new(dir.path()).expect("registry builds");
        let first = registry.get("app").expect("name is valid");
        let second = registry.get("app").expect("name is valid");
        assert!(first.ptr_eq(&second));
    }

    #[test]
    fn distinct_names_get_distinct_loggers() {
        let dir = tempdir().expect("tempdir");
        let registry = Registry::new(dir.path()).expect("registry builds");
        let a = registry.get("alpha").expect("valid");
        let b = registry.get("beta").expect("valid");
        assert!(!a.ptr_eq(&b));
        assert_eq!(a.name(), "alpha");
        assert_eq!(b.name(), "beta");
    }

    #[test]
    fn blank_names_are_rejected() {
        let dir = tempdir().expect("tempdir");
        let registry = Registry::new(dir.path()).expect("registry builds");
        for name in ["", " ", "\t", "  \n "] {
            let err = registry.get(name).expect_err("blank name must fail");
            assert!(matches!(err, Error::Name(NameError)));
        }
    }

    #[test]
    fn log_files_are_named_after_the_logger() {
        let dir = tempdir().expect("tempdir");
        let registry = Registry::new(dir.path()).expect("registry builds");
        let logger = registry.get("worker").expect("valid");
        logger.info("hello");
        assert!(dir.path().join("worker.log").is_file());
    }

    #[test]
    fn configuration_is_shared_across_lookups() {
        let dir = tempdir().expect("tempdir");
        let registry = Registry::new(dir.path()).expect("registry builds");
        registry
            .get("cfg")
            .expect("valid")
            .set_format(Some(""))
            .expect("empty is valid");

        let again = registry.get("cfg").expect("valid");
        assert_eq!(again.format_pattern(), "");
    }

    #[test]
    fn names_lists_registered_loggers_sorted() {
        let dir = tempdir().expect("tempdir");
        let registry = Registry::new(dir.path()).expect("registry builds");
        registry.get("zeta").expect("valid");
        registry.get("alpha").expect("valid");
        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
    }

    #[test]
    fn unwritable_directory_reports_setup_error() {
        let dir = tempdir().expect("tempdir");
        let blocker = dir.path().join("taken");
        std::fs::write(&blocker, b"not a directory").expect("write file");
        let err = Registry::new(blocker.join("logs")).expect_err("must fail");
        assert!(matches!(err, Error::Setup { .. }));
    }
}
