// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! AKES Common Library
//!
//! Types, error definitions, configuration structures and logging shared by
//! the AKES link-layer security crates.
//!
//! # Features
//!
//! - `std`: Enable standard library support (disabled by default for embedded)
//! - `defmt`: Enable defmt formatting of errors for embedded debugging
//! - `short-linkaddr`: Use 2-byte link-layer addresses instead of 8-byte ones
//!
//! # Memory
//!
//! No heap allocations are performed - all buffers use fixed-size arrays or
//! heapless collections.

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(feature = "std")]
extern crate std;

pub mod types;
pub mod errors;
pub mod config;
pub mod log;
pub mod constants;
pub mod time;

// Re-export commonly used items
pub use errors::{Error, Result};
pub use types::{LinkAddr, NeighborStatus, StatusCode, LINKADDR_SIZE};
pub use config::AkesConfig;
pub use time::{Ticks, TickFrequency, OneShotTimer};
