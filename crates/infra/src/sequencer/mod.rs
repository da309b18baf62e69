//! Invoice number sequencer.
//!
//! A single persisted non-negative integer: the number the next invoice gets.
//! It only moves forward, except for the explicit reset to 1 performed by
//! `reset` and at the start of every regeneration.
//!
//! There is no atomicity between reading and writing the counter: a crash in
//! between can duplicate or skip a number. The file implementation holds a lock
//! file for its whole lifetime so two invocations cannot interleave.

pub mod file;
pub mod in_memory;

use std::path::PathBuf;

use thiserror::Error;

pub use file::FileSequencer;
pub use in_memory::InMemorySequencer;

/// Value the counter restarts from.
pub const FIRST_NUMBER: u64 = 1;

#[derive(Debug, Error)]
pub enum SequencerError {
    /// The persisted counter is not a non-negative integer.
    #[error("invoice counter {path} is corrupted: expected a non-negative integer, found {content:?}")]
    StateCorruption { path: PathBuf, content: String },

    /// Another process holds the counter.
    #[error(
        "invoice counter is locked by another invocation (remove {lock_path} if no other invoicer is running)"
    )]
    Locked { lock_path: PathBuf },

    /// The counter reached the largest representable number.
    #[error("invoice counter is exhausted at {value}")]
    Exhausted { value: u64 },

    #[error("invoice counter {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Persisted, strictly increasing invoice counter.
pub trait NumberSequencer {
    /// Read the persisted value.
    fn current(&self) -> Result<u64, SequencerError>;

    /// Overwrite the persisted value.
    fn store(&self, value: u64) -> Result<(), SequencerError>;

    /// Return `current()` and persist `current() + 1`.
    fn advance(&self) -> Result<u64, SequencerError> {
        let number = self.current()?;
        let next = number
            .checked_add(1)
            .ok_or(SequencerError::Exhausted { value: number })?;
        self.store(next)?;
        Ok(number)
    }

    /// Persist `1`, whatever the prior value.
    fn reset(&self) -> Result<(), SequencerError> {
        self.store(FIRST_NUMBER)
    }
}

impl<N> NumberSequencer for &N
where
    N: NumberSequencer + ?Sized,
{
    fn current(&self) -> Result<u64, SequencerError> {
        (**self).current()
    }

    fn store(&self, value: u64) -> Result<(), SequencerError> {
        (**self).store(value)
    }
}
