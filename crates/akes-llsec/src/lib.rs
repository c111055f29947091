// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! AKES Link-Layer Security
//!
//! Key establishment support and node revocation for constrained mesh nodes:
//!
//! - **Key schemes**: Blom's scheme over GF(65537) and a single pre-shared key
//! - **Revocation list**: bounded, append-only, mirrored to storage
//! - **Trickle**: adaptive HELLO dissemination (RFC 6206 subset)
//! - **Group keys**: broadcast-key rotation pushed to permanent neighbors
//! - **Revocation**: orchestration of the above plus routing cleanup
//! - **Requests**: authenticated, replay-protected revocation entry point
//!
//! All state lives in [`AkesContext`]; nothing here is a global. The neighbor
//! table, the radio and the routing layer are collaborators reached through
//! the traits in [`neighbor`] and [`link`].
//!
//! # Features
//!
//! - `std`: file-backed revocation list storage
//! - `short-linkaddr`: 2-byte link-layer addresses
//! - `debug-responses`: answer requests that fail authentication

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

#[cfg(feature = "std")]
extern crate std;

pub mod scheme;
pub mod bloms;
pub mod storage;
pub mod nrl;
pub mod neighbor;
pub mod link;
pub mod trickle;
pub mod group_key;
pub mod revocation;
pub mod request;
pub mod context;

pub use scheme::{AkesScheme, SingleScheme};
pub use bloms::{BlomScheme, DemoIndexMap, PeerIndexMap};
pub use storage::{MemoryStore, NrlStore, NullStore};
#[cfg(feature = "std")]
pub use storage::FileStore;
pub use nrl::NodeRevocationList;
pub use neighbor::{NeighborEntry, NeighborStore, NeighborTable, PermanentState, TentativeState};
pub use link::{LinkLayer, NetStack, ParentRemoval, RoutingHooks};
pub use trickle::{Trickle, TrickleEvent};
pub use group_key::{GroupKey, GroupKeyManager};
pub use revocation::{Revocation, RevocationReport};
pub use request::{RequestHeader, RevocationEndpoint, RevocationRequest};
pub use context::AkesContext;
