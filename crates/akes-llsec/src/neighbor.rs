// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Neighbor table collaborator
//!
//! AKES keeps per-neighbor relationship state: a tentative part while key
//! establishment is running and a permanent part once a pairwise key is in
//! place. The security layer only needs lookup, per-status deletion,
//! counting and iteration over permanent neighbors, expressed by
//! [`NeighborStore`]. [`NeighborTable`] is a fixed-capacity implementation.

use akes_common::constants::MAX_NEIGHBORS;
use akes_common::{Error, LinkAddr, NeighborStatus, Result, Ticks};

/// State of a neighbor whose key establishment is in progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TentativeState {
    /// When the HELLO from this neighbor was accepted
    pub created: Ticks,
}

/// State of a neighbor with an established pairwise key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PermanentState {
    /// Sent a fresh authentic HELLO during the current Trickle interval
    pub sent_authentic_hello: bool,
}

/// Neighbor table entry
///
/// Normally exactly one of the two states is present. Both may be present
/// while a permanent neighbor re-keys. An entry with neither is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborEntry {
    /// Link-layer address
    pub addr: LinkAddr,
    /// Key establishment in progress
    pub tentative: Option<TentativeState>,
    /// Key established
    pub permanent: Option<PermanentState>,
}

impl NeighborEntry {
    /// Status to act on, permanent taking precedence
    #[must_use]
    pub fn status(&self) -> Option<NeighborStatus> {
        if self.permanent.is_some() {
            Some(NeighborStatus::Permanent)
        } else if self.tentative.is_some() {
            Some(NeighborStatus::Tentative)
        } else {
            None
        }
    }
}

/// Neighbor table as seen by the security layer
pub trait NeighborStore {
    /// Find the entry for `addr`
    fn lookup(&self, addr: &LinkAddr) -> Option<&NeighborEntry>;

    /// Delete the `status` part of the entry for `addr`
    ///
    /// The entry disappears once neither part remains. Returns `false` if
    /// there was nothing to delete.
    fn remove(&mut self, addr: &LinkAddr, status: NeighborStatus) -> bool;

    /// Number of entries holding `status`
    fn count(&self, status: NeighborStatus) -> usize;

    /// Visit every permanent neighbor
    fn for_each_permanent(&mut self, f: &mut dyn FnMut(&LinkAddr, &mut PermanentState));
}

/// Fixed-capacity neighbor table
pub struct NeighborTable<const N: usize = MAX_NEIGHBORS> {
    entries: [Option<NeighborEntry>; N],
}

impl<const N: usize> NeighborTable<N> {
    /// Create empty neighbor table
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: [None; N] }
    }

    /// Insert or replace the entry for `entry.addr`
    ///
    /// # Errors
    ///
    /// Returns `Error::CapacityExceeded` if the table is full.
    pub fn insert(&mut self, entry: NeighborEntry) -> Result<()> {
        if let Some(existing) = self.find_mut(&entry.addr) {
            *existing = entry;
            return Ok(());
        }
        let slot = self
            .entries
            .iter_mut()
            .find(|e| e.is_none())
            .ok_or(Error::CapacityExceeded)?;
        *slot = Some(entry);
        Ok(())
    }

    /// Record a neighbor whose HELLO was just accepted
    ///
    /// # Errors
    ///
    /// Returns `Error::CapacityExceeded` if the table is full.
    pub fn add_tentative(&mut self, addr: LinkAddr, now: Ticks) -> Result<()> {
        let tentative = Some(TentativeState { created: now });
        if let Some(existing) = self.find_mut(&addr) {
            existing.tentative = tentative;
            return Ok(());
        }
        self.insert(NeighborEntry {
            addr,
            tentative,
            permanent: None,
        })
    }

    /// Promote a neighbor after successful key establishment
    ///
    /// # Errors
    ///
    /// Returns `Error::PeerNotFound` if `addr` has no tentative state.
    pub fn promote(&mut self, addr: &LinkAddr) -> Result<()> {
        let entry = self
            .find_mut(addr)
            .filter(|e| e.tentative.is_some())
            .ok_or(Error::PeerNotFound)?;
        entry.tentative = None;
        entry.permanent = Some(PermanentState::default());
        Ok(())
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// Check if the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over entries
    pub fn iter(&self) -> impl Iterator<Item = &NeighborEntry> {
        self.entries.iter().filter_map(|e| e.as_ref())
    }

    fn find_mut(&mut self, addr: &LinkAddr) -> Option<&mut NeighborEntry> {
        self.entries
            .iter_mut()
            .filter_map(|e| e.as_mut())
            .find(|e| e.addr == *addr)
    }
}

impl<const N: usize> Default for NeighborTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> NeighborStore for NeighborTable<N> {
    fn lookup(&self, addr: &LinkAddr) -> Option<&NeighborEntry> {
        self.iter().find(|e| e.addr == *addr)
    }

    fn remove(&mut self, addr: &LinkAddr, status: NeighborStatus) -> bool {
        let Some(slot) = self
            .entries
            .iter_mut()
            .find(|e| e.as_ref().is_some_and(|e| e.addr == *addr))
        else {
            return false;
        };
        let Some(entry) = slot.as_mut() else {
            return false;
        };

        let removed = match status {
            NeighborStatus::Tentative => entry.tentative.take().is_some(),
            NeighborStatus::Permanent => entry.permanent.take().is_some(),
        };
        if entry.tentative.is_none() && entry.permanent.is_none() {
            *slot = None;
        }
        removed
    }

    fn count(&self, status: NeighborStatus) -> usize {
        self.iter()
            .filter(|e| match status {
                NeighborStatus::Tentative => e.tentative.is_some(),
                NeighborStatus::Permanent => e.permanent.is_some(),
            })
            .count()
    }

    fn for_each_permanent(&mut self, f: &mut dyn FnMut(&LinkAddr, &mut PermanentState)) {
        for entry in self.entries.iter_mut().filter_map(|e| e.as_mut()) {
            if let Some(permanent) = entry.permanent.as_mut() {
                f(&entry.addr, permanent);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use akes_common::LINKADDR_SIZE;

    fn addr(n: u8) -> LinkAddr {
        LinkAddr::new([n; LINKADDR_SIZE])
    }

    #[test]
    fn test_lifecycle() {
        let mut table = NeighborTable::<4>::new();
        table.add_tentative(addr(1), Ticks::new(10)).unwrap();
        assert_eq!(table.lookup(&addr(1)).unwrap().status(), Some(NeighborStatus::Tentative));

        table.promote(&addr(1)).unwrap();
        assert_eq!(table.lookup(&addr(1)).unwrap().status(), Some(NeighborStatus::Permanent));
        assert_eq!(table.count(NeighborStatus::Permanent), 1);
        assert_eq!(table.count(NeighborStatus::Tentative), 0);

        assert!(table.remove(&addr(1), NeighborStatus::Permanent));
        assert!(table.lookup(&addr(1)).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_remove_one_status_keeps_other() {
        let mut table = NeighborTable::<4>::new();
        table
            .insert(NeighborEntry {
                addr: addr(2),
                tentative: Some(TentativeState::default()),
                permanent: Some(PermanentState::default()),
            })
            .unwrap();

        assert!(table.remove(&addr(2), NeighborStatus::Permanent));
        assert_eq!(table.lookup(&addr(2)).unwrap().status(), Some(NeighborStatus::Tentative));
        assert!(!table.remove(&addr(2), NeighborStatus::Permanent));
        assert!(!table.remove(&addr(9), NeighborStatus::Tentative));
    }

    #[test]
    fn test_capacity() {
        let mut table = NeighborTable::<2>::new();
        table.add_tentative(addr(1), Ticks::new(0)).unwrap();
        table.add_tentative(addr(2), Ticks::new(0)).unwrap();
        assert_eq!(table.add_tentative(addr(3), Ticks::new(0)), Err(Error::CapacityExceeded));
        // re-adding an existing neighbor needs no slot
        table.add_tentative(addr(1), Ticks::new(5)).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_promote_requires_tentative() {
        let mut table = NeighborTable::<2>::new();
        assert_eq!(table.promote(&addr(1)), Err(Error::PeerNotFound));
    }

    #[test]
    fn test_for_each_permanent_skips_tentative() {
        let mut table = NeighborTable::<4>::new();
        table.add_tentative(addr(1), Ticks::new(0)).unwrap();
        table.add_tentative(addr(2), Ticks::new(0)).unwrap();
        table.promote(&addr(2)).unwrap();

        let mut visited = 0;
        table.for_each_permanent(&mut |a, state| {
            assert_eq!(*a, addr(2));
            state.sent_authentic_hello = true;
            visited += 1;
        });
        assert_eq!(visited, 1);
        assert!(table.lookup(&addr(2)).unwrap().permanent.unwrap().sent_authentic_hello);
    }
}
