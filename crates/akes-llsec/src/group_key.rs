// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Group-key rotation
//!
//! Broadcast frames are protected with a single group key shared by all
//! permanent neighbors. After a revocation the key is replaced wholesale and
//! pushed to every permanent neighbor in a unicast UPDATE. Delivery and
//! retransmission belong to the link layer.

use akes_common::{log_debug, log_info, log_warn, LinkAddr, Result, Ticks};
use akes_common::log::LogBuffer;
use akes_crypto::{CcmKey, CryptoRng};

use crate::link::LinkLayer;
use crate::neighbor::{NeighborStore, PermanentState};

const LOG_MODULE: &str = "group-key";

/// Broadcast session key (zeroized on drop)
#[derive(Clone, PartialEq, Eq)]
pub struct GroupKey(CcmKey);

impl GroupKey {
    /// Generate a fresh key from `rng`
    ///
    /// # Errors
    ///
    /// Returns `Error::RngFailure` if the RNG fails.
    pub fn generate(rng: &mut impl CryptoRng) -> Result<Self> {
        Ok(Self(CcmKey::generate(rng)?))
    }

    /// Raw key bytes, for the UPDATE payload
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    /// Key as a CCM* key
    #[must_use]
    pub const fn as_ccm_key(&self) -> &CcmKey {
        &self.0
    }
}

impl From<CcmKey> for GroupKey {
    fn from(key: CcmKey) -> Self {
        Self(key)
    }
}

impl core::fmt::Debug for GroupKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("GroupKey([REDACTED])")
    }
}

/// Owner of the current group key
#[derive(Debug, Default)]
pub struct GroupKeyManager {
    current: Option<GroupKey>,
    rotations: u32,
}

impl GroupKeyManager {
    /// Create without a key
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: None,
            rotations: 0,
        }
    }

    /// Create with a provisioned key
    #[must_use]
    pub const fn with_key(key: GroupKey) -> Self {
        Self {
            current: Some(key),
            rotations: 0,
        }
    }

    /// Current key, if any
    #[must_use]
    pub const fn current(&self) -> Option<&GroupKey> {
        self.current.as_ref()
    }

    /// Number of completed rotations
    #[must_use]
    pub const fn rotations(&self) -> u32 {
        self.rotations
    }

    /// Replace the key and push it to every permanent neighbor
    ///
    /// Tentative neighbors are skipped. A failed send is logged and the loop
    /// carries on. Returns the number of UPDATEs handed to the link layer.
    ///
    /// # Errors
    ///
    /// Returns `Error::RngFailure` if no key could be generated; the old
    /// key stays in place and nothing is sent.
    pub fn rotate<N, L>(
        &mut self,
        rng: &mut impl CryptoRng,
        neighbors: &mut N,
        link: &mut L,
        log: &mut LogBuffer,
        now: Ticks,
    ) -> Result<usize>
    where
        N: NeighborStore + ?Sized,
        L: LinkLayer + ?Sized,
    {
        let key = GroupKey::generate(rng)?;

        let mut sent = 0;
        let mut failed = 0;
        neighbors.for_each_permanent(&mut |addr: &LinkAddr, _state: &mut PermanentState| {
            match link.send_update(addr, &key) {
                Ok(()) => {
                    sent += 1;
                    log_debug!(log, now, LOG_MODULE, "UPDATE queued for {}", addr);
                }
                Err(e) => {
                    failed += 1;
                    log_warn!(log, now, LOG_MODULE, "UPDATE to {} failed: {}", addr, e);
                }
            }
        });

        self.current = Some(key);
        self.rotations = self.rotations.wrapping_add(1);
        log_info!(
            log,
            now,
            LOG_MODULE,
            "group key rotated, {} UPDATEs sent, {} failed",
            sent,
            failed
        );
        Ok(sent)
    }
}
