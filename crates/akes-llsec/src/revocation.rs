// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Revocation orchestration
//!
//! Revoking a node touches every part of the stack, in this order:
//!
//! 1. Optionally append the node to the revocation list
//! 2. Stop if the node is not a neighbor
//! 3. Delete its neighbor-table state (permanent preferred over tentative)
//! 4. Have routing forget it as a parent, re-selecting the preferred parent
//!    and advertising the new route when needed
//! 5. Rotate the group key when group keys are in use
//! 6. Reset Trickle so the remaining neighbors re-key promptly
//!
//! A full revocation list aborts before the neighbor table is touched. A
//! failed persistence write does not: it is logged and reported.

use akes_common::config::RevocationConfig;
use akes_common::log::LogBuffer;
use akes_common::{log_error, log_info, log_warn};
use akes_common::{Error, LinkAddr, NeighborStatus, Result, Ticks};
use akes_crypto::CryptoRng;

use crate::group_key::GroupKeyManager;
use crate::link::{LinkLayer, NetStack, ParentRemoval, RoutingHooks};
use crate::neighbor::NeighborStore;
use crate::nrl::NodeRevocationList;
use crate::storage::NrlStore;
use crate::trickle::Trickle;

const LOG_MODULE: &str = "revocation";

/// What a revocation changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevocationReport {
    /// Revocation list length after the append, if one was requested
    pub nrl_len: Option<usize>,
    /// The revocation list entry could not be persisted
    pub persistence_failed: bool,
    /// Neighbor state that was deleted
    pub removed: Option<NeighborStatus>,
    /// Routing-parent cleanup outcome
    pub parent: ParentRemoval,
    /// UPDATEs sent by the group-key rotation, if one took place
    pub updates_sent: Option<usize>,
    /// Trickle fell back to `Imin`
    pub trickle_reset: bool,
}

impl RevocationReport {
    const fn new() -> Self {
        Self {
            nrl_len: None,
            persistence_failed: false,
            removed: None,
            parent: ParentRemoval::NotParent,
            updates_sent: None,
            trickle_reset: false,
        }
    }
}

/// Borrowed view of the state a revocation mutates
pub struct Revocation<'a, St: NrlStore, const CAP: usize, R: CryptoRng> {
    /// Revocation settings
    pub config: &'a RevocationConfig,
    /// Node revocation list
    pub nrl: &'a mut NodeRevocationList<St, CAP>,
    /// Group key owner
    pub group_key: &'a mut GroupKeyManager,
    /// HELLO dissemination
    pub trickle: &'a mut Trickle,
    /// Random source for the new group key
    pub rng: &'a mut R,
    /// Log sink
    pub log: &'a mut LogBuffer,
}

impl<St: NrlStore, const CAP: usize, R: CryptoRng> Revocation<'_, St, CAP, R> {
    /// Revoke `peer`
    ///
    /// Revoking a node that is not a neighbor succeeds without further
    /// effect beyond the optional list append. Repeating a revocation appends
    /// to the list again.
    ///
    /// # Errors
    ///
    /// - `Error::CapacityExceeded` if the list is full; nothing changed
    /// - `Error::InconsistentNeighborState` if the neighbor entry holds
    ///   neither a tentative nor a permanent state
    /// - `Error::RngFailure` if no new group key could be generated; the
    ///   neighbor has already been removed at that point
    pub fn revoke_node<N, L, P>(
        &mut self,
        now: Ticks,
        stack: &mut NetStack<'_, N, L, P>,
        peer: &LinkAddr,
        add_to_revocation_list: bool,
    ) -> Result<RevocationReport>
    where
        N: NeighborStore,
        L: LinkLayer,
        P: RoutingHooks,
    {
        let mut report = RevocationReport::new();

        if add_to_revocation_list {
            match self.nrl.revoke(peer) {
                Ok(len) => report.nrl_len = Some(len),
                Err(Error::PersistenceWriteFailed) => {
                    log_error!(self.log, now, LOG_MODULE, "failed to persist revocation of {}", peer);
                    report.nrl_len = Some(self.nrl.len());
                    report.persistence_failed = true;
                }
                Err(e) => {
                    log_warn!(self.log, now, LOG_MODULE, "cannot revoke {}: {}", peer, e);
                    return Err(e);
                }
            }
        }

        let Some(entry) = stack.neighbors.lookup(peer) else {
            log_info!(self.log, now, LOG_MODULE, "{} is not a neighbor", peer);
            return Ok(report);
        };
        let Some(status) = entry.status() else {
            log_error!(self.log, now, LOG_MODULE, "{} is neither tentative nor permanent", peer);
            return Err(Error::InconsistentNeighborState);
        };

        let rekeying = status == NeighborStatus::Permanent && entry.tentative.is_some();
        stack.neighbors.remove(peer, status);
        if rekeying {
            stack.neighbors.remove(peer, NeighborStatus::Tentative);
            log_info!(self.log, now, LOG_MODULE, "pending re-key of {} dropped", peer);
        }
        report.removed = Some(status);

        report.parent = stack.routing.drop_parent(peer);
        if report.parent == ParentRemoval::PreferredRemoved {
            log_info!(self.log, now, LOG_MODULE, "preferred parent {} dropped", peer);
            stack.routing.select_preferred_parent();
            stack.routing.send_route_advertisement();
        }

        if self.config.group_keys {
            match self
                .group_key
                .rotate(self.rng, stack.neighbors, stack.link, self.log, now)
            {
                Ok(sent) => report.updates_sent = Some(sent),
                Err(e) => {
                    log_error!(self.log, now, LOG_MODULE, "group key rotation failed: {}", e);
                    return Err(e);
                }
            }
        }

        match self.trickle.reset(now, self.rng) {
            Ok(event) => report.trickle_reset = event.is_some(),
            Err(e) => log_warn!(self.log, now, LOG_MODULE, "trickle reset failed: {}", e),
        }

        log_info!(self.log, now, LOG_MODULE, "revoked {}", peer);
        Ok(report)
    }
}
