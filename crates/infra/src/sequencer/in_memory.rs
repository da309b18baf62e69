use std::sync::atomic::{AtomicU64, Ordering};

use super::{FIRST_NUMBER, NumberSequencer, SequencerError};

/// In-memory counter for tests/dev.
#[derive(Debug)]
pub struct InMemorySequencer {
    value: AtomicU64,
}

impl InMemorySequencer {
    pub fn new() -> Self {
        Self::starting_at(FIRST_NUMBER)
    }

    pub fn starting_at(value: u64) -> Self {
        Self {
            value: AtomicU64::new(value),
        }
    }
}

impl Default for InMemorySequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl NumberSequencer for InMemorySequencer {
    fn current(&self) -> Result<u64, SequencerError> {
        Ok(self.value.load(Ordering::SeqCst))
    }

    fn store(&self, value: u64) -> Result<(), SequencerError> {
        self.value.store(value, Ordering::SeqCst);
        Ok(())
    }
}
