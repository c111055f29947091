// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Key establishment schemes
//!
//! A scheme supplies the pairwise secret AKES uses to authenticate HELLO and
//! HELLOACK exchanges with a peer. The scheme is chosen at build time through
//! the type parameter of [`AkesContext`](crate::AkesContext).

use akes_common::constants::AES_128_KEY_LENGTH;
use akes_common::{Error, LinkAddr, Result};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Pairwise secret provider
pub trait AkesScheme {
    /// Short name used in log records
    const NAME: &'static str;

    /// Prepare the scheme before first use
    ///
    /// # Errors
    ///
    /// Scheme specific; the default does nothing.
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Secret shared with the sender of a HELLO
    ///
    /// # Errors
    ///
    /// Returns an error if no secret can be derived for `sender`.
    fn secret_for_hello_sender(&mut self, sender: &LinkAddr) -> Result<&[u8]>;

    /// Secret shared with the sender of a HELLOACK
    ///
    /// # Errors
    ///
    /// Returns an error if no secret can be derived for `sender`.
    fn secret_for_helloack_sender(&mut self, sender: &LinkAddr) -> Result<&[u8]> {
        self.secret_for_hello_sender(sender)
    }

    /// Install a new secret delivered with a revocation request
    ///
    /// # Errors
    ///
    /// Returns `Error::NotSupported` for schemes whose secrets are derived,
    /// or `Error::IncorrectFormat` if `secret` has the wrong shape.
    fn update_secret_with(&mut self, peer: &LinkAddr, secret: &[u8]) -> Result<()>;
}

/// Network-wide pre-shared key
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SingleScheme {
    key: [u8; AES_128_KEY_LENGTH],
}

impl SingleScheme {
    /// Create from the provisioned key
    #[must_use]
    pub const fn new(key: [u8; AES_128_KEY_LENGTH]) -> Self {
        Self { key }
    }
}

impl AkesScheme for SingleScheme {
    const NAME: &'static str = "single";

    fn secret_for_hello_sender(&mut self, _sender: &LinkAddr) -> Result<&[u8]> {
        Ok(&self.key)
    }

    fn update_secret_with(&mut self, _peer: &LinkAddr, secret: &[u8]) -> Result<()> {
        if secret.len() != AES_128_KEY_LENGTH {
            return Err(Error::IncorrectFormat);
        }
        self.key.copy_from_slice(secret);
        Ok(())
    }
}
