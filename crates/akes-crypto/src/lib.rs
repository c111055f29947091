// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! AKES Cryptographic Layer
//!
//! Primitives consumed by the AKES link-layer security stack:
//!
//! - **Field**: arithmetic modulo the Fermat prime 65537 for Blom's scheme
//! - **AEAD**: AES-128-CCM* with 8-byte MICs and 13-byte nonces
//! - **Engine**: scoped, exclusive access to the AES accelerator
//! - **RNG**: random-source trait plus a deterministic seeded generator
//!
//! # Security Requirements
//!
//! - Zeroize key material after use
//! - Never log or expose key material
//! - Compare MICs in constant time

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod traits;
pub mod field;
pub mod rng;
pub mod engine;
pub mod aead;

pub use error::CryptoError;
pub use traits::{constant_time_eq, CryptoRng};
pub use field::{mod_p, mul_p, FERMAT_P};
pub use rng::SeededRng;
pub use engine::{AesEngine, EngineGuard};
pub use aead::{AesCcm, CcmKey, CcmNonce};
