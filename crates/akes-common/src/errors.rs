// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Error types for the AKES stack
//!
//! This module defines the unified error type used throughout the stack.
//! All errors are no_std compatible, `Copy`, and carry no heap data so they
//! can be returned from every layer, including interrupt-driven callers.

use core::fmt;

use crate::types::StatusCode;

/// Result type alias for AKES operations
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the AKES stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    // =========================================================================
    // Revocation List Errors (0x01xx)
    // =========================================================================
    /// Node revocation list is at capacity
    CapacityExceeded,
    /// Persisting a revocation record completed fewer bytes than expected
    PersistenceWriteFailed,
    /// Reading the persisted revocation list failed
    PersistenceReadFailed,

    // =========================================================================
    // Request Errors (0x02xx)
    // =========================================================================
    /// Message integrity code did not verify
    AuthenticationFailed,
    /// Message id was not strictly greater than the last accepted one
    StaleMessage,
    /// Request payload does not follow the expected framing
    IncorrectFormat,
    /// Key revocation is disabled in this build
    RevocationDisabled,

    // =========================================================================
    // Neighbor Errors (0x03xx)
    // =========================================================================
    /// Neighbor entry is neither tentative nor permanent
    InconsistentNeighborState,
    /// Peer is not present in the neighbor table
    PeerNotFound,
    /// Link layer refused a frame
    SendFailed,

    // =========================================================================
    // Crypto Errors (0x04xx)
    // =========================================================================
    /// Random source failure
    RngFailure,
    /// Generic cryptographic operation error
    CryptoError,
    /// Crypto accelerator is in use
    Busy,

    // =========================================================================
    // General Errors (0xFFxx)
    // =========================================================================
    /// Operation is not supported by this key scheme
    NotSupported,
    /// Invalid parameter provided
    InvalidParameter,
    /// Buffer is too small for operation
    BufferTooSmall,
    /// Internal error (should not occur)
    InternalError,
}

impl Error {
    /// Get the error code for this error
    ///
    /// Error codes are organized by category:
    /// - 0x01xx: Revocation list errors
    /// - 0x02xx: Request errors
    /// - 0x03xx: Neighbor errors
    /// - 0x04xx: Crypto errors
    /// - 0xFFxx: General errors
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::CapacityExceeded => 0x0101,
            Self::PersistenceWriteFailed => 0x0102,
            Self::PersistenceReadFailed => 0x0103,

            Self::AuthenticationFailed => 0x0201,
            Self::StaleMessage => 0x0202,
            Self::IncorrectFormat => 0x0203,
            Self::RevocationDisabled => 0x0204,

            Self::InconsistentNeighborState => 0x0301,
            Self::PeerNotFound => 0x0302,
            Self::SendFailed => 0x0303,

            Self::RngFailure => 0x0401,
            Self::CryptoError => 0x0402,
            Self::Busy => 0x0403,

            Self::NotSupported => 0xFF01,
            Self::InvalidParameter => 0xFF02,
            Self::BufferTooSmall => 0xFF03,
            Self::InternalError => 0xFFFF,
        }
    }

    /// Check if this is a security-relevant rejection
    ///
    /// Security rejections must not mutate state and, for unauthenticated
    /// input, must not produce a response.
    #[must_use]
    pub const fn is_security_error(&self) -> bool {
        matches!(self, Self::AuthenticationFailed | Self::StaleMessage)
    }

    /// Status code reported back to the requester
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::CapacityExceeded => StatusCode::ErrorNrlFull,
            Self::IncorrectFormat => StatusCode::ErrorIncorrectFormat,
            _ => StatusCode::Error,
        }
    }

    /// Get a short description of the error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::CapacityExceeded => "revocation list full",
            Self::PersistenceWriteFailed => "revocation list write incomplete",
            Self::PersistenceReadFailed => "revocation list read failed",
            Self::AuthenticationFailed => "authentication failed",
            Self::StaleMessage => "stale or replayed message",
            Self::IncorrectFormat => "incorrect message format",
            Self::RevocationDisabled => "key revocation disabled",
            Self::InconsistentNeighborState => "neighbor neither tentative nor permanent",
            Self::PeerNotFound => "peer not found",
            Self::SendFailed => "frame not sent",
            Self::RngFailure => "RNG failure",
            Self::CryptoError => "crypto error",
            Self::Busy => "crypto engine busy",
            Self::NotSupported => "not supported by key scheme",
            Self::InvalidParameter => "invalid parameter",
            Self::BufferTooSmall => "buffer too small",
            Self::InternalError => "internal error",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:04X}] {}", self.code(), self.description())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "[0x{:04X}] {}", self.code(), self.description());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_categorised() {
        assert_eq!(Error::CapacityExceeded.code() >> 8, 0x01);
        assert_eq!(Error::StaleMessage.code() >> 8, 0x02);
        assert_eq!(Error::InconsistentNeighborState.code() >> 8, 0x03);
        assert_eq!(Error::Busy.code() >> 8, 0x04);
        assert_eq!(Error::InternalError.code(), 0xFFFF);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(Error::CapacityExceeded.status_code(), StatusCode::ErrorNrlFull);
        assert_eq!(Error::IncorrectFormat.status_code(), StatusCode::ErrorIncorrectFormat);
        assert_eq!(Error::StaleMessage.status_code(), StatusCode::Error);
        assert_eq!(Error::InconsistentNeighborState.status_code(), StatusCode::Error);
    }

    #[test]
    fn test_security_errors() {
        assert!(Error::AuthenticationFailed.is_security_error());
        assert!(Error::StaleMessage.is_security_error());
        assert!(!Error::CapacityExceeded.is_security_error());
    }
}
