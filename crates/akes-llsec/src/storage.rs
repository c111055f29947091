// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Backing storage for the node revocation list
//!
//! The list is persisted as an append-only byte stream. Implementations
//! report how many bytes an append actually stored so the list can detect
//! short writes; they never reorder or rewrite existing bytes.

use akes_common::{Error, Result};
use heapless::Vec;

/// Append-only record store
pub trait NrlStore {
    /// Append `data`, returning the number of bytes stored
    ///
    /// A return value smaller than `data.len()` is a short write.
    ///
    /// # Errors
    ///
    /// Returns `Error::PersistenceWriteFailed` if nothing could be written.
    fn append(&mut self, data: &[u8]) -> Result<usize>;

    /// Read from `offset` into `buf`, returning the number of bytes read
    ///
    /// Returns 0 at end of data or when nothing has been stored.
    ///
    /// # Errors
    ///
    /// Returns `Error::PersistenceReadFailed` on I/O failure.
    fn read_at(&self, offset: usize, buf: &mut [u8]) -> Result<usize>;

    /// Delete every stored byte
    ///
    /// # Errors
    ///
    /// Returns `Error::PersistenceWriteFailed` if the data could not be removed.
    fn remove(&mut self) -> Result<()>;
}

// =============================================================================
// Null store
// =============================================================================

/// Store that keeps nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

impl NrlStore for NullStore {
    fn append(&mut self, data: &[u8]) -> Result<usize> {
        Ok(data.len())
    }

    fn read_at(&self, _offset: usize, _buf: &mut [u8]) -> Result<usize> {
        Ok(0)
    }

    fn remove(&mut self) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// RAM-backed store
// =============================================================================

/// Bounded in-memory store
///
/// Appends beyond `N` bytes are truncated, which surfaces as a short write.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore<const N: usize> {
    data: Vec<u8, N>,
}

impl<const N: usize> MemoryStore<N> {
    /// Create an empty store
    #[must_use]
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Create a store pre-loaded with `bytes`
    ///
    /// # Errors
    ///
    /// Returns `Error::BufferTooSmall` if `bytes` exceeds the capacity.
    pub fn with_contents(bytes: &[u8]) -> Result<Self> {
        let data = Vec::from_slice(bytes).map_err(|()| Error::BufferTooSmall)?;
        Ok(Self { data })
    }

    /// Raw stored bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl<const N: usize> NrlStore for MemoryStore<N> {
    fn append(&mut self, data: &[u8]) -> Result<usize> {
        let room = N - self.data.len();
        let take = data.len().min(room);
        if take == 0 && !data.is_empty() {
            return Err(Error::PersistenceWriteFailed);
        }
        self.data
            .extend_from_slice(&data[..take])
            .map_err(|_| Error::PersistenceWriteFailed)?;
        Ok(take)
    }

    fn read_at(&self, offset: usize, buf: &mut [u8]) -> Result<usize> {
        let Some(available) = self.data.get(offset..) else {
            return Ok(0);
        };
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        Ok(n)
    }

    fn remove(&mut self) -> Result<()> {
        self.data.clear();
        Ok(())
    }
}

// =============================================================================
// File-backed store
// =============================================================================

#[cfg(feature = "std")]
pub use file::FileStore;

#[cfg(feature = "std")]
mod file {
    use std::fs::{self, File, OpenOptions};
    use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
    use std::path::{Path, PathBuf};

    use akes_common::constants::NRL_FILE_NAME;
    use akes_common::{Error, Result};

    use super::NrlStore;

    /// Append-only file, removed entirely on clear
    #[derive(Debug, Clone)]
    pub struct FileStore {
        path: PathBuf,
    }

    impl FileStore {
        /// Store backed by the file at `path`
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }

        /// Store backed by the default `nrl` file inside `dir`
        pub fn in_dir(dir: impl AsRef<Path>) -> Self {
            Self::new(dir.as_ref().join(NRL_FILE_NAME))
        }

        /// Path of the backing file
        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl NrlStore for FileStore {
        fn append(&mut self, data: &[u8]) -> Result<usize> {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .map_err(|_| Error::PersistenceWriteFailed)?;
            let written = file.write(data).map_err(|_| Error::PersistenceWriteFailed)?;
            file.flush().map_err(|_| Error::PersistenceWriteFailed)?;
            Ok(written)
        }

        fn read_at(&self, offset: usize, buf: &mut [u8]) -> Result<usize> {
            let mut file = match File::open(&self.path) {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
                Err(_) => return Err(Error::PersistenceReadFailed),
            };
            file.seek(SeekFrom::Start(offset as u64))
                .map_err(|_| Error::PersistenceReadFailed)?;

            let mut filled = 0;
            while filled < buf.len() {
                match file.read(&mut buf[filled..]) {
                    Ok(0) => break,
                    Ok(n) => filled += n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => {}
                    Err(_) => return Err(Error::PersistenceReadFailed),
                }
            }
            Ok(filled)
        }

        fn remove(&mut self) -> Result<()> {
            match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(_) => Err(Error::PersistenceWriteFailed),
            }
        }
    }
}
