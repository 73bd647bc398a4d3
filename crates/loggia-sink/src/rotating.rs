//! crates/loggia-sink/src/rotating.rs
//! Size-capped file sink with numbered backup rotation.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File sink that rolls the active log file through numbered backups once a
/// size cap is reached.
///
/// Before a write would push the active file past `max_bytes`, the sink
/// renames `<name>.log` to `<name>.log.1`, shifting existing backups up to
/// `<name>.log.N` and discarding the oldest. A `max_bytes` of zero disables
/// rotation entirely; a `backups` count of zero truncates the active file in
/// place instead of keeping history.
///
/// # Examples
///
/// ```no_run
/// use loggia_sink::RotatingFileSink;
///
/// let mut sink = RotatingFileSink::new("logs/app.log", 50_000_000, 5)?;
/// sink.write_line("app | INFO | ready")?;
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct RotatingFileSink {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    // None only transiently while the active handle is closed for rotation.
    file: Option<File>,
    written: u64,
}

impl RotatingFileSink {
    /// Opens (or creates) the active log file in append mode.
    ///
    /// The current file size seeds the rotation accounting so a restarted
    /// process keeps honouring the cap.
    pub fn new(path: impl Into<PathBuf>, max_bytes: u64, backups: usize) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            max_bytes,
            backups,
            file: Some(file),
            written,
        })
    }

    /// Returns the path of the active log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the configured size cap in bytes (zero means unlimited).
    #[must_use]
    pub const fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Returns the number of rotated backups retained.
    #[must_use]
    pub const fn backups(&self) -> usize {
        self.backups
    }

    /// Writes a single rendered line, rotating first when the cap would be
    /// exceeded.
    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        let needed = line.len() as u64 + 1;
        if self.max_bytes > 0 && self.written + needed > self.max_bytes {
            self.rotate()?;
        }
        let file = self
            .file
            .as_mut()
            .expect("rotating sink must hold an open file outside rotation");
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        self.written += needed;
        Ok(())
    }

    /// Flushes the active file.
    pub fn flush(&mut self) -> io::Result<()> {
        self.file
            .as_mut()
            .expect("rotating sink must hold an open file outside rotation")
            .flush()
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        // Close the active handle before renaming; Windows cannot rename an
        // open file.
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }

        if self.backups > 0 {
            let oldest = self.backup_path(self.backups);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for index in (1..self.backups).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            if self.path.exists() {
                fs::rename(&self.path, self.backup_path(1))?;
            }
        }

        self.file = Some(
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&self.path)?,
        );
        self.written = 0;
        Ok(())
    }
}
