// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Exclusive access to the AES engine
//!
//! Radio drivers and the security layer share a single AES block. Every
//! seal/open holds an [`EngineGuard`] for its duration; the guard releases
//! the engine when dropped, including on early returns.

use core::cell::Cell;

use crate::error::CryptoError;

/// Handle to the shared AES engine
#[derive(Debug, Default)]
pub struct AesEngine {
    in_use: Cell<bool>,
}

impl AesEngine {
    /// Create an idle engine
    #[must_use]
    pub const fn new() -> Self {
        Self {
            in_use: Cell::new(false),
        }
    }

    /// Acquire the engine
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Busy` if a guard is already outstanding.
    pub fn acquire(&self) -> Result<EngineGuard<'_>, CryptoError> {
        if self.in_use.replace(true) {
            return Err(CryptoError::Busy);
        }
        Ok(EngineGuard { engine: self })
    }

    /// Check whether a guard is currently held
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_use.get()
    }
}

/// Scoped ownership of the AES engine
#[derive(Debug)]
pub struct EngineGuard<'a> {
    engine: &'a AesEngine,
}

impl Drop for EngineGuard<'_> {
    fn drop(&mut self) {
        self.engine.in_use.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_release() {
        let engine = AesEngine::new();
        {
            let _guard = engine.acquire().unwrap();
            assert!(engine.is_busy());
            assert_eq!(engine.acquire().unwrap_err(), CryptoError::Busy);
        }
        assert!(!engine.is_busy());
        assert!(engine.acquire().is_ok());
    }

    #[test]
    fn test_release_on_error_path() {
        fn failing(engine: &AesEngine) -> Result<(), CryptoError> {
            let _guard = engine.acquire()?;
            Err(CryptoError::InternalError)
        }

        let engine = AesEngine::new();
        assert_eq!(failing(&engine), Err(CryptoError::InternalError));
        assert!(!engine.is_busy());
    }
}
