// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Stack-wide constants
//!
//! Compile-time sizes and limits, chosen for memory-constrained motes.

// =============================================================================
// Cryptographic Constants
// =============================================================================

/// AES-128 key size in bytes
pub const AES_128_KEY_LENGTH: usize = 16;

/// CCM* nonce size in bytes
pub const CCM_NONCE_LENGTH: usize = 13;

/// CCM* message integrity code size in bytes
pub const CCM_MIC_LENGTH: usize = 8;

/// Size of a Blom-derived pairwise secret in bytes
pub const BLOM_SECRET_LENGTH: usize = 2;

// =============================================================================
// Key Scheme Constants
// =============================================================================

/// Default fan-in of the Blom derivation (coalition resistance)
pub const DEFAULT_LAMBDA: usize = 5;

/// Last address bytes of the demonstration peer-index assignment
pub const DEMO_PEER_IDS: [u8; 5] = [0x3b, 0x1a, 0xc6, 0x5d, 0x00];

/// Index assigned by the demonstration map to unknown peers
pub const DEMO_DEFAULT_PEER_INDEX: u16 = 3;

// =============================================================================
// Revocation Constants
// =============================================================================

/// Default capacity of the node revocation list
pub const DEFAULT_NRL_CAPACITY: usize = 50;

/// Delimiter written after every persisted revocation record
pub const NRL_RECORD_DELIMITER: u8 = b'\n';

/// Name of the dedicated file holding the persisted revocation list
pub const NRL_FILE_NAME: &str = "nrl";

/// Largest revocation request payload (peer address plus new secret)
pub const MAX_REVOCATION_PAYLOAD: usize = 64;

// =============================================================================
// Neighbor Constants
// =============================================================================

/// Maximum number of neighbors tracked by the in-memory neighbor table
pub const MAX_NEIGHBORS: usize = 14;

// =============================================================================
// Trickle Constants
// =============================================================================

/// Default minimum Trickle interval in seconds
pub const TRICKLE_IMIN_SECS: u32 = 30;

/// Default number of interval doublings
pub const TRICKLE_IMAX: u8 = 8;

/// Default redundancy constant k
pub const TRICKLE_REDUNDANCY_CONSTANT: u16 = 2;

/// Default window for churn-triggered resets in seconds (1 reset per 10 min)
pub const TRICKLE_MAX_RESET_RATE_SECS: u32 = 10 * 60;

/// Default number of churn-triggered resets allowed per window
pub const TRICKLE_MAX_CONSECUTIVE_RESETS: u8 = 3;

/// Maximum time in seconds a HELLO sender waits for HELLOACKs
pub const AKES_MAX_WAITING_PERIOD_SECS: u32 = 5;

/// Leeway added to the HELLOACK waiting period, in seconds
pub const HELLO_WAIT_LEEWAY_SECS: u32 = 1;
