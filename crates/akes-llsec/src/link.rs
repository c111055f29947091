// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Radio and routing collaborators
//!
//! Frame construction, MAC scheduling and the routing protocol live outside
//! this crate. The security layer drives them through these traits.

use akes_common::{LinkAddr, Result};

use crate::group_key::GroupKey;
use crate::neighbor::NeighborStore;

/// AKES frame transmission
pub trait LinkLayer {
    /// Broadcast a HELLO carrying the current challenge
    ///
    /// # Errors
    ///
    /// Returns `Error::SendFailed` if the frame could not be queued.
    fn broadcast_hello(&mut self) -> Result<()>;

    /// Replace the HELLO challenge, invalidating pending HELLOACKs
    fn change_hello_challenge(&mut self);

    /// Send an UPDATE carrying `group_key` to `peer`
    ///
    /// Protection of the UPDATE is the job of the unicast security layer.
    ///
    /// # Errors
    ///
    /// Returns `Error::SendFailed` if the frame could not be queued.
    fn send_update(&mut self, peer: &LinkAddr, group_key: &GroupKey) -> Result<()>;
}

/// Outcome of asking routing to forget a parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRemoval {
    /// The address was not a parent
    NotParent,
    /// A non-preferred parent was dropped
    Removed,
    /// The preferred parent was dropped
    PreferredRemoved,
}

/// Routing-layer cleanup hooks
pub trait RoutingHooks {
    /// Drop any parent entry for `addr`
    fn drop_parent(&mut self, addr: &LinkAddr) -> ParentRemoval;

    /// Choose a new preferred parent among the remaining candidates
    fn select_preferred_parent(&mut self);

    /// Advertise the (possibly changed) route towards the root
    fn send_route_advertisement(&mut self);
}

/// Mutable handles on the collaborators a revocation touches
pub struct NetStack<'a, N, L, R> {
    /// Neighbor table
    pub neighbors: &'a mut N,
    /// Radio
    pub link: &'a mut L,
    /// Routing layer
    pub routing: &'a mut R,
}

impl<'a, N: NeighborStore, L: LinkLayer, R: RoutingHooks> NetStack<'a, N, L, R> {
    /// Bundle the collaborators
    pub fn new(neighbors: &'a mut N, link: &'a mut L, routing: &'a mut R) -> Self {
        Self {
            neighbors,
            link,
            routing,
        }
    }
}
