// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Deterministic random sources
//!
//! Production builds take their randomness from the platform CSPRNG through
//! [`CryptoRng`]. [`SeededRng`] expands a shared 32-byte seed with SHA3-256
//! in counter mode. Nodes holding the same seed produce the same stream,
//! which is what demonstration key-matrix provisioning relies on.

use sha3::{Digest, Sha3_256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::traits::CryptoRng;

// =============================================================================
// Seeded RNG
// =============================================================================

/// SHA3-256 counter-mode generator over a 32-byte seed
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SeededRng {
    state: [u8; 32],
    counter: u64,
}

impl SeededRng {
    /// Create from 32-byte seed
    #[must_use]
    pub const fn new(seed: [u8; 32]) -> Self {
        Self {
            state: seed,
            counter: 0,
        }
    }

    /// Create with simple u64 seed
    #[must_use]
    pub fn from_u64(seed: u64) -> Self {
        let digest = Sha3_256::digest(seed.to_le_bytes());
        let mut state = [0u8; 32];
        state.copy_from_slice(&digest);
        Self::new(state)
    }

    /// Number of 32-byte blocks produced so far
    #[must_use]
    pub const fn blocks_generated(&self) -> u64 {
        self.counter
    }
}

impl CryptoRng for SeededRng {
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), CryptoError> {
        let mut offset = 0;
        while offset < dest.len() {
            self.counter = self.counter.wrapping_add(1);

            let mut hasher = Sha3_256::new();
            hasher.update(self.state);
            hasher.update(self.counter.to_le_bytes());
            let mut block: [u8; 32] = hasher.finalize().into();

            let copy_len = (dest.len() - offset).min(32);
            dest[offset..offset + copy_len].copy_from_slice(&block[..copy_len]);
            offset += copy_len;
            block.zeroize();
        }
        Ok(())
    }
}

// =============================================================================
// Test RNG (Deterministic for testing only)
// =============================================================================

/// Test RNG for deterministic testing (NOT FOR PRODUCTION)
///
/// Either a xorshift stream or a constant word, the latter pinning every
/// [`CryptoRng::next_in_range`] draw to the same relative position.
#[cfg(any(test, feature = "test-vectors"))]
pub struct TestRng {
    state: u64,
    fixed: Option<u32>,
}

#[cfg(any(test, feature = "test-vectors"))]
impl TestRng {
    /// Create a test RNG from a simple seed value
    #[must_use]
    pub const fn from_seed(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
            fixed: None,
        }
    }

    /// Create a test RNG that returns `word` for every `next_u32`
    #[must_use]
    pub const fn fixed(word: u32) -> Self {
        Self {
            state: 0,
            fixed: Some(word),
        }
    }

    /// RNG whose range draws always land on the lower bound
    #[must_use]
    pub const fn lowest() -> Self {
        Self::fixed(0)
    }

    fn next_word(&mut self) -> u32 {
        if let Some(word) = self.fixed {
            return word;
        }
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        (self.state >> 32) as u32
    }
}

#[cfg(any(test, feature = "test-vectors"))]
impl CryptoRng for TestRng {
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), CryptoError> {
        for chunk in dest.chunks_mut(4) {
            let word = self.next_word().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
        Ok(())
    }
}

/// RNG that always fails, for exercising error paths
#[cfg(any(test, feature = "test-vectors"))]
pub struct FailingRng;

#[cfg(any(test, feature = "test-vectors"))]
impl CryptoRng for FailingRng {
    fn fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), CryptoError> {
        Err(CryptoError::RngFailure)
    }
}
