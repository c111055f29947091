// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! AES-128-CCM* authenticated encryption
//!
//! Parameters are fixed to what 802.15.4 link-layer security uses for
//! management traffic: 16-byte key, 13-byte nonce, 8-byte MIC appended to
//! the ciphertext.

use aes::Aes128;
use ccm::aead::generic_array::GenericArray;
use ccm::aead::{AeadInPlace, KeyInit};
use ccm::consts::{U13, U8};
use ccm::Ccm;
use zeroize::{Zeroize, ZeroizeOnDrop};

use akes_common::constants::{AES_128_KEY_LENGTH, CCM_MIC_LENGTH, CCM_NONCE_LENGTH};

use crate::engine::AesEngine;
use crate::error::CryptoError;
use crate::traits::{constant_time_eq, CryptoRng};

type Aes128Ccm8 = Ccm<Aes128, U8, U13>;

// =============================================================================
// Key and nonce
// =============================================================================

/// AES-128 key (automatically zeroized on drop)
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CcmKey {
    bytes: [u8; AES_128_KEY_LENGTH],
}

impl CcmKey {
    /// Create a key from raw bytes
    #[must_use]
    pub const fn new(bytes: [u8; AES_128_KEY_LENGTH]) -> Self {
        Self { bytes }
    }

    /// Create a key from a slice
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKey` unless the slice is exactly 16 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes: [u8; AES_128_KEY_LENGTH] =
            bytes.try_into().map_err(|_| CryptoError::InvalidKey)?;
        Ok(Self { bytes })
    }

    /// Generate a fresh random key
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::RngFailure` if the RNG fails.
    pub fn generate(rng: &mut impl CryptoRng) -> Result<Self, CryptoError> {
        let mut bytes = [0u8; AES_128_KEY_LENGTH];
        rng.fill_bytes(&mut bytes)?;
        Ok(Self { bytes })
    }

    /// Raw key bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; AES_128_KEY_LENGTH] {
        &self.bytes
    }
}

impl PartialEq for CcmKey {
    fn eq(&self, other: &Self) -> bool {
        constant_time_eq(&self.bytes, &other.bytes)
    }
}

impl Eq for CcmKey {}

impl core::fmt::Debug for CcmKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("CcmKey([REDACTED])")
    }
}

/// 13-byte CCM* nonce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcmNonce([u8; CCM_NONCE_LENGTH]);

impl CcmNonce {
    /// Create a nonce from raw bytes
    #[must_use]
    pub const fn new(bytes: [u8; CCM_NONCE_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Nonce for a management message
    ///
    /// The message id and message type are written as ASCII decimal, id
    /// first, and the remainder is zero padded.
    #[must_use]
    pub fn from_message(message_id: u16, message_type: u8) -> Self {
        let mut bytes = [0u8; CCM_NONCE_LENGTH];
        let len = write_decimal(&mut bytes, u32::from(message_id));
        write_decimal(&mut bytes[len..], u32::from(message_type));
        Self(bytes)
    }

    /// Raw nonce bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; CCM_NONCE_LENGTH] {
        &self.0
    }
}

/// Write `value` as ASCII decimal into `out`, returning the digit count
///
/// `out` must have room for the digits; at most 5 are written for `u16`
/// inputs and the callers size their buffers accordingly.
fn write_decimal(out: &mut [u8], mut value: u32) -> usize {
    let mut digits = [0u8; 10];
    let mut n = 0;
    loop {
        digits[n] = b'0' + (value % 10) as u8;
        n += 1;
        value /= 10;
        if value == 0 {
            break;
        }
    }
    let n = n.min(out.len());
    for (dst, src) in out.iter_mut().zip(digits[..n].iter().rev()) {
        *dst = *src;
    }
    n
}

// =============================================================================
// AES-128-CCM*
// =============================================================================

/// AES-128-CCM* with an 8-byte MIC
pub struct AesCcm {
    key: CcmKey,
}

impl AesCcm {
    /// MIC length appended by [`AesCcm::seal`]
    pub const MIC_LENGTH: usize = CCM_MIC_LENGTH;

    /// Create a cipher instance bound to `key`
    #[must_use]
    pub fn new(key: &CcmKey) -> Self {
        Self { key: key.clone() }
    }

    fn cipher(&self) -> Aes128Ccm8 {
        Aes128Ccm8::new(GenericArray::from_slice(self.key.as_bytes()))
    }

    /// Encrypt `plaintext` into `out` as `ciphertext || MIC`
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// - `CryptoError::Busy` if the AES engine is held elsewhere
    /// - `CryptoError::BufferTooSmall` if `out` cannot hold the result
    pub fn seal(
        &self,
        engine: &AesEngine,
        nonce: &CcmNonce,
        aad: &[u8],
        plaintext: &[u8],
        out: &mut [u8],
    ) -> Result<usize, CryptoError> {
        let total = plaintext.len() + CCM_MIC_LENGTH;
        if out.len() < total {
            return Err(CryptoError::BufferTooSmall);
        }

        let _guard = engine.acquire()?;
        let (body, mic) = out[..total].split_at_mut(plaintext.len());
        body.copy_from_slice(plaintext);
        let tag = self
            .cipher()
            .encrypt_in_place_detached(GenericArray::from_slice(nonce.as_bytes()), aad, body)
            .map_err(|_| CryptoError::InternalError)?;
        mic.copy_from_slice(&tag);
        Ok(total)
    }

    /// Authenticate and decrypt `ciphertext || MIC` into `out`
    ///
    /// Returns the plaintext length. `out` is left zeroed on failure.
    ///
    /// # Errors
    ///
    /// - `CryptoError::Busy` if the AES engine is held elsewhere
    /// - `CryptoError::AuthenticationFailed` if the input is shorter than a
    ///   MIC or the MIC does not verify
    /// - `CryptoError::BufferTooSmall` if `out` cannot hold the plaintext
    pub fn open(
        &self,
        engine: &AesEngine,
        nonce: &CcmNonce,
        aad: &[u8],
        sealed: &[u8],
        out: &mut [u8],
    ) -> Result<usize, CryptoError> {
        if sealed.len() < CCM_MIC_LENGTH {
            return Err(CryptoError::AuthenticationFailed);
        }
        let body_len = sealed.len() - CCM_MIC_LENGTH;
        if out.len() < body_len {
            return Err(CryptoError::BufferTooSmall);
        }

        let _guard = engine.acquire()?;
        let (ciphertext, mic) = sealed.split_at(body_len);
        let body = &mut out[..body_len];
        body.copy_from_slice(ciphertext);
        let result = self.cipher().decrypt_in_place_detached(
            GenericArray::from_slice(nonce.as_bytes()),
            aad,
            body,
            GenericArray::from_slice(mic),
        );
        if result.is_err() {
            body.zeroize();
            return Err(CryptoError::AuthenticationFailed);
        }
        Ok(body_len)
    }
}
