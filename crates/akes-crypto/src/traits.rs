// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Core cryptographic traits

use crate::error::CryptoError;

/// Cryptographically secure random number generator trait
///
/// Implemented by the platform CSPRNG; the stack only consumes it.
pub trait CryptoRng {
    /// Fill buffer with random bytes
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::RngFailure` if the RNG fails.
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), CryptoError>;

    /// Generate a random u32
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::RngFailure` if the RNG fails.
    fn next_u32(&mut self) -> Result<u32, CryptoError> {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Generate a value uniformly spread over `[min, max)`
    ///
    /// Returns `min` when the range is empty.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::RngFailure` if the RNG fails.
    fn next_in_range(&mut self, min: u64, max: u64) -> Result<u64, CryptoError> {
        if max <= min {
            return Ok(min);
        }
        let r = u128::from(self.next_u32()?);
        let span = u128::from(max - min);
        Ok(min + ((span * r) >> 32) as u64)
    }
}

impl<R: CryptoRng + ?Sized> CryptoRng for &mut R {
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), CryptoError> {
        (**self).fill_bytes(dest)
    }
}

/// Constant-time comparison
///
/// Compares two byte slices in constant time to prevent timing attacks.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    use subtle::ConstantTimeEq;
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(u32);

    impl CryptoRng for Fixed {
        fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), CryptoError> {
            for (i, byte) in dest.iter_mut().enumerate() {
                *byte = self.0.to_le_bytes()[i % 4];
            }
            Ok(())
        }
    }

    #[test]
    fn test_range_bounds() {
        assert_eq!(Fixed(0).next_in_range(10, 20).unwrap(), 10);
        assert_eq!(Fixed(u32::MAX).next_in_range(10, 20).unwrap(), 19);
        assert_eq!(Fixed(u32::MAX / 2 + 1).next_in_range(0, 100).unwrap(), 50);
        assert_eq!(Fixed(7).next_in_range(5, 5).unwrap(), 5);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
    }
}
