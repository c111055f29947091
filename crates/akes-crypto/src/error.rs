// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Cryptographic error types

use core::fmt;

/// Error type for cryptographic operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid key format or size
    InvalidKey,
    /// Random number generator failure
    RngFailure,
    /// Buffer is too small for the operation
    BufferTooSmall,
    /// AEAD authentication failed
    AuthenticationFailed,
    /// Invalid nonce
    InvalidNonce,
    /// AES engine already acquired
    Busy,
    /// Internal error (should not occur)
    InternalError,
}

impl CryptoError {
    /// Get error code for logging/debugging
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::InvalidKey => 0x0411,
            Self::RngFailure => 0x0412,
            Self::BufferTooSmall => 0x0413,
            Self::AuthenticationFailed => 0x0414,
            Self::InvalidNonce => 0x0415,
            Self::Busy => 0x0416,
            Self::InternalError => 0x04FF,
        }
    }
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::InvalidKey => "invalid key",
            Self::RngFailure => "RNG failure",
            Self::BufferTooSmall => "buffer too small",
            Self::AuthenticationFailed => "authentication failed",
            Self::InvalidNonce => "invalid nonce",
            Self::Busy => "AES engine busy",
            Self::InternalError => "internal error",
        };
        write!(f, "[0x{:04X}] {msg}", self.code())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CryptoError {}

impl From<CryptoError> for akes_common::Error {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::AuthenticationFailed => Self::AuthenticationFailed,
            CryptoError::RngFailure => Self::RngFailure,
            CryptoError::BufferTooSmall => Self::BufferTooSmall,
            CryptoError::Busy => Self::Busy,
            CryptoError::InvalidKey | CryptoError::InvalidNonce | CryptoError::InternalError => {
                Self::CryptoError
            }
        }
    }
}
