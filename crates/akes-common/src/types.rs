// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Common types for the AKES stack
//!
//! Link-layer addresses, neighbor status and the status codes reported to
//! revocation requesters.

use core::fmt;

/// Link-layer address size in bytes
#[cfg(not(feature = "short-linkaddr"))]
pub const LINKADDR_SIZE: usize = 8;

/// Link-layer address size in bytes
#[cfg(feature = "short-linkaddr")]
pub const LINKADDR_SIZE: usize = 2;

/// Link-layer address identifying a peer
///
/// Used as the key of every peer-indexed structure. Equality is byte-exact.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LinkAddr([u8; LINKADDR_SIZE]);

impl LinkAddr {
    /// Size of a link-layer address in bytes
    pub const SIZE: usize = LINKADDR_SIZE;

    /// The all-zero address
    pub const NULL: Self = Self([0u8; LINKADDR_SIZE]);

    /// Create an address from bytes
    #[must_use]
    pub const fn new(bytes: [u8; LINKADDR_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create an address from a slice
    ///
    /// Returns `None` if the slice length is not exactly [`LINKADDR_SIZE`].
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; LINKADDR_SIZE] = slice.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Get the address as a byte array
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; LINKADDR_SIZE] {
        &self.0
    }

    /// Last byte of the address
    #[must_use]
    pub const fn last_byte(&self) -> u8 {
        self.0[LINKADDR_SIZE - 1]
    }

    /// Check if this is the null address
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }
}

impl AsRef<[u8]> for LinkAddr {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; LINKADDR_SIZE]> for LinkAddr {
    fn from(bytes: [u8; LINKADDR_SIZE]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for LinkAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LinkAddr({self})")
    }
}

impl fmt::Display for LinkAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ":")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Relationship of a neighbor with this node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NeighborStatus {
    /// Key establishment in progress
    Tentative = 0,
    /// Key established, usable for data
    Permanent = 1,
}

/// Status code returned to the issuer of a revocation request
///
/// Mapped directly to transport-level status codes by the REST layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StatusCode {
    /// Request carried out
    Success = 0,
    /// Generic failure
    Error = 1,
    /// Node revocation list is full
    ErrorNrlFull = 2,
    /// Payload did not follow the expected framing
    ErrorIncorrectFormat = 3,
}

impl StatusCode {
    /// Convert from raw byte
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Success),
            1 => Some(Self::Error),
            2 => Some(Self::ErrorNrlFull),
            3 => Some(Self::ErrorIncorrectFormat),
            _ => None,
        }
    }

    /// Check if this code reports success
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}
