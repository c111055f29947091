// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Node Revocation List
//!
//! Bounded, ordered list of revoked link-layer addresses. Entries are only
//! appended; the list is emptied solely by an administrative [`clear`].
//! No duplicate detection is performed, so callers that want idempotent
//! inserts check [`is_revoked`] first.
//!
//! # Persistence
//!
//! Each successful [`revoke`] appends `address || '\n'` to the backing
//! [`NrlStore`]. [`init`] replays those records in order. A short write is
//! reported but the in-memory entry is kept, so memory and storage may
//! diverge until the next [`clear`].
//!
//! [`clear`]: NodeRevocationList::clear
//! [`is_revoked`]: NodeRevocationList::is_revoked
//! [`revoke`]: NodeRevocationList::revoke
//! [`init`]: NodeRevocationList::init

use akes_common::constants::{DEFAULT_NRL_CAPACITY, NRL_RECORD_DELIMITER};
use akes_common::{Error, LinkAddr, Result, LINKADDR_SIZE};
use heapless::Vec;

use crate::storage::NrlStore;

/// Size of one persisted record
pub const NRL_RECORD_SIZE: usize = LINKADDR_SIZE + 1;

/// Revocation list with capacity `CAP`
pub struct NodeRevocationList<S: NrlStore, const CAP: usize = DEFAULT_NRL_CAPACITY> {
    entries: Vec<LinkAddr, CAP>,
    store: S,
    persistent: bool,
}

impl<S: NrlStore, const CAP: usize> NodeRevocationList<S, CAP> {
    /// Create an empty list over `store`
    ///
    /// With `persistent` false the store is never touched.
    #[must_use]
    pub fn new(store: S, persistent: bool) -> Self {
        Self {
            entries: Vec::new(),
            store,
            persistent,
        }
    }

    /// Load the persisted list
    ///
    /// Replaces the in-memory entries with the stored records. Loading stops
    /// at end of data, at a truncated record or at capacity. Returns the
    /// number of entries loaded.
    ///
    /// # Errors
    ///
    /// Returns `Error::PersistenceReadFailed` if the store cannot be read;
    /// entries loaded before the failure are kept.
    pub fn init(&mut self) -> Result<usize> {
        self.entries.clear();
        if !self.persistent {
            return Ok(0);
        }

        let mut offset = 0;
        let mut record = [0u8; NRL_RECORD_SIZE];
        while !self.entries.is_full() {
            let n = self.store.read_at(offset, &mut record)?;
            if n < LINKADDR_SIZE {
                break;
            }
            let Some(addr) = LinkAddr::from_slice(&record[..LINKADDR_SIZE]) else {
                break;
            };
            if self.entries.push(addr).is_err() {
                break;
            }
            offset += NRL_RECORD_SIZE;
        }
        Ok(self.entries.len())
    }

    /// Check if `peer` is on the list
    #[must_use]
    pub fn is_revoked(&self, peer: &LinkAddr) -> bool {
        self.entries.iter().any(|entry| entry == peer)
    }

    /// Append `peer`, returning the new length
    ///
    /// # Errors
    ///
    /// - `Error::CapacityExceeded` if the list is full; nothing changes
    /// - `Error::PersistenceWriteFailed` if the record could not be stored
    ///   completely; the in-memory entry has been added regardless
    pub fn revoke(&mut self, peer: &LinkAddr) -> Result<usize> {
        self.entries
            .push(*peer)
            .map_err(|_| Error::CapacityExceeded)?;

        if self.persistent {
            let mut record = [NRL_RECORD_DELIMITER; NRL_RECORD_SIZE];
            record[..LINKADDR_SIZE].copy_from_slice(peer.as_bytes());
            let written = self
                .store
                .append(&record)
                .map_err(|_| Error::PersistenceWriteFailed)?;
            if written != NRL_RECORD_SIZE {
                return Err(Error::PersistenceWriteFailed);
            }
        }
        Ok(self.entries.len())
    }

    /// Empty the list and delete its persisted copy
    ///
    /// # Errors
    ///
    /// Returns `Error::PersistenceWriteFailed` if the stored records could not
    /// be removed; memory is cleared regardless.
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        if self.persistent {
            self.store.remove()?;
        }
        Ok(())
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if the list is at capacity
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.entries.is_full()
    }

    /// Maximum number of entries
    #[must_use]
    pub const fn capacity(&self) -> usize {
        CAP
    }

    /// Whether changes are mirrored to storage
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &LinkAddr> + '_ {
        self.entries.iter()
    }

    /// Entries as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[LinkAddr] {
        &self.entries
    }

    /// Backing store
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the list, returning its store
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }
}
