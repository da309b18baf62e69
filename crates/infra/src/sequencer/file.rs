use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::{FIRST_NUMBER, NumberSequencer, SequencerError};

/// Counter stored as a single textual integer (`invoice_number.txt`).
///
/// Opening the sequencer takes `<counter>.lock`; the lock is released when the
/// sequencer is dropped. A process killed while holding it leaves a stale lock
/// that has to be removed by hand.
#[derive(Debug)]
pub struct FileSequencer {
    path: PathBuf,
    _lock: CounterLock,
}

impl FileSequencer {
    /// Lock the counter at `path`, creating it with `1` if it does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SequencerError> {
        let path = path.into();
        let lock = CounterLock::acquire(&path)?;
        let sequencer = Self { path, _lock: lock };

        if !sequencer.path.exists() {
            tracing::info!(path = %sequencer.path.display(), "initializing invoice counter");
            sequencer.store(FIRST_NUMBER)?;
        }
        Ok(sequencer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> SequencerError {
        SequencerError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl NumberSequencer for FileSequencer {
    fn current(&self) -> Result<u64, SequencerError> {
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        content
            .trim()
            .parse::<u64>()
            .map_err(|_| SequencerError::StateCorruption {
                path: self.path.clone(),
                content,
            })
    }

    fn store(&self, value: u64) -> Result<(), SequencerError> {
        fs::write(&self.path, value.to_string()).map_err(|e| self.io_error(e))
    }
}

/// Exclusive lock file; created with create-new semantics, removed on drop.
#[derive(Debug)]
struct CounterLock {
    path: PathBuf,
}

impl CounterLock {
    fn acquire(counter: &Path) -> Result<Self, SequencerError> {
        let mut name = OsString::from(counter.as_os_str());
        name.push(".lock");
        let path = PathBuf::from(name);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SequencerError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                // Best effort: the pid only helps an operator find the holder.
                let _ = write!(file, "{}", std::process::id());
                Ok(Self { path })
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(SequencerError::Locked { lock_path: path })
            }
            Err(source) => Err(SequencerError::Io { path, source }),
        }
    }
}

impl Drop for CounterLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release counter lock");
        }
    }
}
