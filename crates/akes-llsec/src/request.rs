// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Authenticated revocation requests
//!
//! A revocation request arrives as a confirmable management message whose
//! payload is `AES-128-CCM*(peer || new secret)` with an 8-byte MIC. The
//! nonce is the message id followed by the message type, both in ASCII
//! decimal, zero padded to 13 bytes.
//!
//! Requests are checked in a fixed order:
//!
//! 1. MIC, rejecting forgeries without touching any state
//! 2. Freshness: the message id must exceed the last accepted one
//! 3. Format: at least one full link-layer address
//!
//! The answer is the numeric status code in ASCII, sealed under the nonce
//! of the response header.

use akes_common::constants::MAX_REVOCATION_PAYLOAD;
use akes_common::{Error, LinkAddr, Result, StatusCode, LINKADDR_SIZE};
use akes_crypto::{AesCcm, AesEngine, CcmKey, CcmNonce, CryptoError};
use heapless::Vec;
use zeroize::Zeroize;

/// Confirmable message type
pub const MESSAGE_TYPE_CON: u8 = 0;

/// Acknowledgement message type
pub const MESSAGE_TYPE_ACK: u8 = 2;

/// Largest sealed payload accepted
pub const MAX_SEALED_REQUEST: usize = MAX_REVOCATION_PAYLOAD + AesCcm::MIC_LENGTH;

/// Size of a sealed status response
pub const STATUS_RESPONSE_LENGTH: usize = 1 + AesCcm::MIC_LENGTH;

/// Management message header fields that feed the nonce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    /// Message id
    pub message_id: u16,
    /// Message type
    pub message_type: u8,
}

impl RequestHeader {
    /// Header of a confirmable request
    #[must_use]
    pub const fn confirmable(message_id: u16) -> Self {
        Self {
            message_id,
            message_type: MESSAGE_TYPE_CON,
        }
    }

    /// Header of the acknowledgement answering this request
    #[must_use]
    pub const fn ack(&self) -> Self {
        Self {
            message_id: self.message_id,
            message_type: MESSAGE_TYPE_ACK,
        }
    }

    /// CCM* nonce for this header
    #[must_use]
    pub fn nonce(&self) -> CcmNonce {
        CcmNonce::from_message(self.message_id, self.message_type)
    }
}

/// Decrypted, validated revocation request
pub struct RevocationRequest {
    /// Node to revoke
    pub peer: LinkAddr,
    /// Optional replacement secret for the key scheme (may be empty)
    pub secret: Vec<u8, MAX_REVOCATION_PAYLOAD>,
}

impl Drop for RevocationRequest {
    fn drop(&mut self) {
        self.secret.as_mut_slice().zeroize();
    }
}

/// Receiving end of revocation requests
pub struct RevocationEndpoint {
    cipher: AesCcm,
    last_message_id: Option<u16>,
}

impl RevocationEndpoint {
    /// Create an endpoint using the management key
    #[must_use]
    pub fn new(key: &CcmKey) -> Self {
        Self {
            cipher: AesCcm::new(key),
            last_message_id: None,
        }
    }

    /// Id of the most recently accepted request
    #[must_use]
    pub const fn last_message_id(&self) -> Option<u16> {
        self.last_message_id
    }

    /// Authenticate, check and decrypt a request
    ///
    /// # Errors
    ///
    /// - `Error::AuthenticationFailed` if the MIC does not verify or the
    ///   payload is larger than any valid request
    /// - `Error::StaleMessage` if the message id is not newer than the last
    ///   accepted one
    /// - `Error::IncorrectFormat` if the payload is shorter than an address;
    ///   the message id is consumed in that case
    /// - `Error::Busy` if the AES engine is in use
    pub fn open(
        &mut self,
        engine: &AesEngine,
        header: &RequestHeader,
        sealed: &[u8],
    ) -> Result<RevocationRequest> {
        if sealed.len() > MAX_SEALED_REQUEST {
            return Err(Error::AuthenticationFailed);
        }

        let mut plain = [0u8; MAX_REVOCATION_PAYLOAD];
        let len = self
            .cipher
            .open(engine, &header.nonce(), &[], sealed, &mut plain)
            .map_err(|e| match e {
                CryptoError::Busy => Error::Busy,
                _ => Error::AuthenticationFailed,
            })?;

        let result = self.accept(header, &plain[..len]);
        plain.zeroize();
        result
    }

    fn accept(&mut self, header: &RequestHeader, plain: &[u8]) -> Result<RevocationRequest> {
        if self
            .last_message_id
            .is_some_and(|last| header.message_id <= last)
        {
            return Err(Error::StaleMessage);
        }
        self.last_message_id = Some(header.message_id);

        if plain.len() < LINKADDR_SIZE {
            return Err(Error::IncorrectFormat);
        }
        let (addr, secret) = plain.split_at(LINKADDR_SIZE);
        let peer = LinkAddr::from_slice(addr).ok_or(Error::IncorrectFormat)?;
        let secret = Vec::from_slice(secret).map_err(|()| Error::IncorrectFormat)?;
        Ok(RevocationRequest { peer, secret })
    }

    /// Seal `status` for the response carrying `header`
    ///
    /// Returns the number of bytes written to `out`.
    ///
    /// # Errors
    ///
    /// - `Error::BufferTooSmall` if `out` is shorter than
    ///   [`STATUS_RESPONSE_LENGTH`]
    /// - `Error::Busy` if the AES engine is in use
    pub fn seal_status(
        &self,
        engine: &AesEngine,
        header: &RequestHeader,
        status: StatusCode,
        out: &mut [u8],
    ) -> Result<usize> {
        let text = [b'0' + status as u8];
        Ok(self.cipher.seal(engine, &header.nonce(), &[], &text, out)?)
    }
}
