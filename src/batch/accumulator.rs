//! Thread-safe record buffer.
//!
//! The accumulator is the only state shared between producers and the
//! flusher. Its lock guards O(1) work (a push or a `mem::take`) and is never
//! held across an `.await`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::futures::Notified;
use tokio::sync::Notify;

use crate::error_handling::BatchError;
use crate::storage::Record;

#[derive(Debug, Default)]
struct Buffer {
    records: Vec<Record>,
    closed: bool,
}

/// Collects records between flushes and requests an early flush when the
/// size threshold is reached.
#[derive(Debug)]
pub(crate) struct Accumulator {
    buffer: Mutex<Buffer>,
    max_batch_size: usize,
    // Holds at most one permit, so repeated threshold crossings before the
    // flusher wakes collapse into a single flush request.
    kick: Notify,
}

impl Accumulator {
    pub fn new(max_batch_size: usize) -> Self {
        Accumulator {
            buffer: Mutex::new(Buffer::default()),
            max_batch_size,
            kick: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Buffer> {
        // A panic while holding the lock cannot leave the buffer half-written
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a record to the open buffer.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::EngineClosed` once [`Accumulator::close`] has run;
    /// the record is dropped and the buffer is untouched.
    pub fn append(&self, record: Record) -> Result<(), BatchError> {
        let len = {
            let mut buffer = self.lock();
            if buffer.closed {
                return Err(BatchError::EngineClosed);
            }
            buffer.records.push(record);
            buffer.records.len()
        };

        if len >= self.max_batch_size {
            self.kick.notify_one();
        }
        Ok(())
    }

    /// Number of buffered records at the instant the lock was held.
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Takes the current buffer, leaving an empty one in its place.
    ///
    /// Every concurrent `append` lands either in the returned batch or in the
    /// new buffer.
    pub fn swap_and_clear(&self) -> Vec<Record> {
        std::mem::take(&mut self.lock().records)
    }

    /// Stops accepting records.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn close(&self) -> bool {
        let mut buffer = self.lock();
        !std::mem::replace(&mut buffer.closed, true)
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Resolves when a flush has been requested since the last wake.
    pub(crate) fn flush_requested(&self) -> Notified<'_> {
        self.kick.notified()
    }
}
