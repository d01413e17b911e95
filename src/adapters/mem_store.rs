//! In-memory configuration store.
//!
//! Models a byte-addressable EEPROM: erased bytes read `0xFF`, writes land
//! immediately and `flush` has nothing to do.  Used by the simulator and
//! as the backing medium in tests.

use crate::app::ports::{ConfigStore, StorageError};
use crate::store::layout::STORE_SIZE;

pub struct MemStore {
    bytes: Box<[u8; STORE_SIZE]>,
    up: bool,
    writes: usize,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    /// Erased store.
    pub fn new() -> Self {
        Self {
            bytes: Box::new([0xFF; STORE_SIZE]),
            up: true,
            writes: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..]
    }

    /// Simulate a missing or unresponsive chip.
    pub fn set_up(&mut self, up: bool) {
        self.up = up;
    }

    /// Number of `write` calls since creation or the last reset.
    pub const fn write_count(&self) -> usize {
        self.writes
    }

    pub fn reset_write_count(&mut self) {
        self.writes = 0;
    }

    fn range(offset: u16, len: usize) -> Result<core::ops::Range<usize>, StorageError> {
        let start = usize::from(offset);
        let end = start.checked_add(len).ok_or(StorageError::OutOfBounds)?;
        if end > STORE_SIZE {
            return Err(StorageError::OutOfBounds);
        }
        Ok(start..end)
    }
}

impl ConfigStore for MemStore {
    fn read(&mut self, offset: u16, buf: &mut [u8]) -> Result<(), StorageError> {
        if !self.up {
            return Err(StorageError::NotReady);
        }
        let r = Self::range(offset, buf.len())?;
        buf.copy_from_slice(&self.bytes[r]);
        Ok(())
    }

    fn write(&mut self, offset: u16, data: &[u8]) -> Result<(), StorageError> {
        if !self.up {
            return Err(StorageError::NotReady);
        }
        let r = Self::range(offset, data.len())?;
        self.bytes[r].copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        Ok(())
    }

    fn is_up(&self) -> bool {
        self.up
    }
}
