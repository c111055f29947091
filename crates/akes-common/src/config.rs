// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Stack configuration
//!
//! All configuration is compile-time or provisioned at deployment. The
//! Blom fan-in (LAMBDA) and the revocation list capacity are const generics
//! on their owning types; everything else lives here.

use crate::constants::{
    AKES_MAX_WAITING_PERIOD_SECS, HELLO_WAIT_LEEWAY_SECS, TRICKLE_IMAX, TRICKLE_IMIN_SECS,
    TRICKLE_MAX_CONSECUTIVE_RESETS, TRICKLE_MAX_RESET_RATE_SECS, TRICKLE_REDUNDANCY_CONSTANT,
};
use crate::time::TickFrequency;

/// Stack-wide configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AkesConfig {
    /// Resolution of the ticks handed to the stack
    pub tick_frequency: TickFrequency,
    /// HELLO dissemination
    pub trickle: TrickleConfig,
    /// Revocation behaviour
    pub revocation: RevocationConfig,
}

impl AkesConfig {
    /// Default configuration for a 1 kHz tick source
    pub const DEFAULT: Self = Self::for_frequency(TickFrequency::KHZ_1);

    /// Default configuration for the given tick source
    #[must_use]
    pub const fn for_frequency(tick_frequency: TickFrequency) -> Self {
        Self {
            tick_frequency,
            trickle: TrickleConfig::for_frequency(tick_frequency),
            revocation: RevocationConfig::DEFAULT,
        }
    }
}

impl Default for AkesConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Trickle configuration (RFC 6206 parameters, in ticks)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrickleConfig {
    /// Disable to never broadcast HELLOs from Trickle
    pub enabled: bool,
    /// Minimum interval size Imin
    pub imin: u64,
    /// Number of doublings Imax, the largest interval being `imin << imax`
    pub imax: u8,
    /// Redundancy constant k
    pub redundancy_constant: u16,
    /// Window over which churn-triggered resets are counted
    pub max_reset_rate: u64,
    /// Churn-triggered resets allowed per window
    pub max_consecutive_resets: u8,
    /// Time to wait for HELLOACKs before changing the HELLO challenge
    pub hello_wait: u64,
}

impl TrickleConfig {
    /// Defaults expressed in the given tick resolution
    #[must_use]
    pub const fn for_frequency(freq: TickFrequency) -> Self {
        Self {
            enabled: true,
            imin: freq.secs_to_ticks(TRICKLE_IMIN_SECS),
            imax: TRICKLE_IMAX,
            redundancy_constant: TRICKLE_REDUNDANCY_CONSTANT,
            max_reset_rate: freq.secs_to_ticks(TRICKLE_MAX_RESET_RATE_SECS),
            max_consecutive_resets: TRICKLE_MAX_CONSECUTIVE_RESETS,
            hello_wait: freq.secs_to_ticks(AKES_MAX_WAITING_PERIOD_SECS + HELLO_WAIT_LEEWAY_SECS),
        }
    }

    /// Largest interval size, `Imin * 2^Imax`, saturating at `u64::MAX`
    #[must_use]
    pub const fn imax_interval(&self) -> u64 {
        if self.imax >= u64::BITS as u8 || self.imin > u64::MAX >> self.imax {
            u64::MAX
        } else {
            self.imin << self.imax
        }
    }
}

impl Default for TrickleConfig {
    fn default() -> Self {
        Self::for_frequency(TickFrequency::KHZ_1)
    }
}

/// Revocation configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevocationConfig {
    /// Accept revocation requests at all
    pub enabled: bool,
    /// Broadcast traffic uses a group key that must be rotated on revocation
    pub group_keys: bool,
    /// Mirror the revocation list to storage
    pub nrl_persistence: bool,
}

impl RevocationConfig {
    /// Default revocation configuration
    pub const DEFAULT: Self = Self {
        enabled: true,
        group_keys: true,
        nrl_persistence: true,
    };
}

impl Default for RevocationConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
