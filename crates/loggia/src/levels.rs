//! crates/loggia/src/levels.rs
//! Severity level table and the name-or-rank conversion seam.

use std::fmt;
use std::str::FromStr;

use crate::error::LevelError;

/// Severity level with a fixed numeric rank.
///
/// The table extends the conventional five levels with `SUCCESS`, `TASK` and
/// `TRACE`. Ranks are totally ordered; a destination emits a record iff its
/// configured threshold rank is less than or equal to the record's rank.
/// Names and ranks are compile-time constants and never change at runtime.
///
/// Variant order matches rank order, so the derived `Ord` agrees with
/// [`rank`](Self::rank).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Level {
    /// Rank 0. Threshold-only: lets every record through, never emitted.
    Notset,
    /// Rank 5. Finest-grained diagnostics.
    Trace,
    /// Rank 10. Development diagnostics.
    Debug,
    /// Rank 20. Routine operational messages.
    Info,
    /// Rank 23. A unit of work started or progressed.
    Task,
    /// Rank 25. A unit of work completed successfully.
    Success,
    /// Rank 30. Something unexpected, execution continues.
    Warning,
    /// Rank 40. An operation failed.
    Error,
    /// Rank 50. The program may be unable to continue.
    Critical,
}

impl Level {
    /// Every registered level, ascending by rank.
    pub const ALL: [Self; 9] = [
        Self::Notset,
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Task,
        Self::Success,
        Self::Warning,
        Self::Error,
        Self::Critical,
    ];

    /// Returns the numeric rank used for threshold comparisons.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Notset => 0,
            Self::Trace => 5,
            Self::Debug => 10,
            Self::Info => 20,
            Self::Task => 23,
            Self::Success => 25,
            Self::Warning => 30,
            Self::Error => 40,
            Self::Critical => 50,
        }
    }

    /// Returns the registered upper-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Notset => "NOTSET",
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Task => "TASK",
            Self::Success => "SUCCESS",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// Looks up a level by its registered name.
    ///
    /// Matching is exact; `"info"` is not a registered name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.name() == name)
    }

    /// Looks up a level by its registered rank.
    #[must_use]
    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.rank() == rank)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = LevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| LevelError::UnknownName(s.to_owned()))
    }
}

/// Conversion seam accepted by the facade's level setters.
///
/// A level may be given as a [`Level`] value, a registered name (`"INFO"`),
/// or a numeric rank (`20`). Anything else fails with [`LevelError`],
/// including valid-looking strings that are not in the registered set.
///
/// # Examples
///
/// ```
/// use loggia::{IntoLevel, Level};
///
/// assert_eq!("SUCCESS".into_level().unwrap(), Level::Success);
/// assert_eq!(23u8.into_level().unwrap(), Level::Task);
/// assert!("verbose".into_level().is_err());
/// assert!(42u8.into_level().is_err());
/// ```
pub trait IntoLevel {
    /// Converts the value into a registered [`Level`].
    fn into_level(self) -> Result<Level, LevelError>;
}

impl IntoLevel for Level {
    fn into_level(self) -> Result<Level, LevelError> {
        Ok(self)
    }
}

impl IntoLevel for &str {
    fn into_level(self) -> Result<Level, LevelError> {
        self.parse()
    }
}

impl IntoLevel for String {
    fn into_level(self) -> Result<Level, LevelError> {
        self.as_str().into_level()
    }
}

impl IntoLevel for u8 {
    fn into_level(self) -> Result<Level, LevelError> {
        Level::from_rank(self).ok_or(LevelError::UnknownRank(self))
    }
}
