//! Page cache over a slower store (emulated EEPROM on flash).
//!
//! The whole image is read once at construction.  Writes go to the cache
//! and mark their pages dirty; [`ConfigStore::flush`] writes each dirty
//! page back in one operation.  The main loop calls `flush` a short delay
//! after the last write-through so a burst of protocol updates costs one
//! page write.

use log::debug;

use crate::app::ports::{ConfigStore, StorageError};
use crate::store::layout::STORE_SIZE;

pub const PAGE_SIZE: usize = 256;
const PAGES: usize = STORE_SIZE / PAGE_SIZE;

pub struct CachedStore<S: ConfigStore> {
    inner: S,
    cache: Box<[u8; STORE_SIZE]>,
    dirty: [bool; PAGES],
}

impl<S: ConfigStore> CachedStore<S> {
    pub fn new(mut inner: S) -> Result<Self, StorageError> {
        let mut cache = Box::new([0xFF; STORE_SIZE]);
        inner.read(0, &mut cache[..])?;
        Ok(Self {
            inner,
            cache,
            dirty: [false; PAGES],
        })
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.iter().any(|d| *d)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unflushed writes are discarded.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn range(offset: u16, len: usize) -> Result<core::ops::Range<usize>, StorageError> {
        let start = usize::from(offset);
        match start.checked_add(len) {
            Some(end) if end <= STORE_SIZE => Ok(start..end),
            _ => Err(StorageError::OutOfBounds),
        }
    }
}

impl<S: ConfigStore> ConfigStore for CachedStore<S> {
    fn read(&mut self, offset: u16, buf: &mut [u8]) -> Result<(), StorageError> {
        let r = Self::range(offset, buf.len())?;
        buf.copy_from_slice(&self.cache[r]);
        Ok(())
    }

    fn write(&mut self, offset: u16, data: &[u8]) -> Result<(), StorageError> {
        let r = Self::range(offset, data.len())?;
        if data.is_empty() {
            return Ok(());
        }
        let pages = r.start / PAGE_SIZE..=(r.end - 1) / PAGE_SIZE;
        self.cache[r].copy_from_slice(data);
        for p in pages {
            self.dirty[p] = true;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StorageError> {
        for page in 0..PAGES {
            if !self.dirty[page] {
                continue;
            }
            let start = page * PAGE_SIZE;
            self.inner
                .write(start as u16, &self.cache[start..start + PAGE_SIZE])?;
            self.dirty[page] = false;
            debug!("store: page {page} written back");
        }
        self.inner.flush()
    }

    fn is_up(&self) -> bool {
        self.inner.is_up()
    }
}
