// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Blom's key predistribution over GF(65537)
//!
//! Each node holds one row `A_id = D * G_id` of a λ-secure scheme, where `D`
//! is a secret symmetric λ×λ matrix and `G_id` the Vandermonde column
//! `(1, id, id^2, ...)`. Two nodes derive the same pairwise secret by
//! evaluating their row at the other node's identifier. Any coalition of
//! fewer than λ nodes learns nothing about other pairs.
//!
//! Derived secrets are two bytes, low byte first, and cached per peer index
//! for the lifetime of the scheme.

use akes_common::constants::{
    BLOM_SECRET_LENGTH, DEFAULT_LAMBDA, DEMO_DEFAULT_PEER_INDEX, DEMO_PEER_IDS,
};
use akes_common::{Error, LinkAddr, Result};
use akes_crypto::{mod_p, mul_p, CryptoRng, SeededRng};
use zeroize::Zeroize;

use crate::scheme::AkesScheme;

// =============================================================================
// Peer index mapping
// =============================================================================

/// Maps a link-layer address to the node's scalar Blom identifier
pub trait PeerIndexMap {
    /// Identifier of `addr` for a scheme with fan-in `lambda`
    fn index_of(&self, addr: &LinkAddr, lambda: usize) -> u16;
}

/// Demonstration identifier assignment
///
/// Looks the last address byte up in a fixed table and falls back to index
/// 3. This is a placeholder for a real identity-assignment protocol and
/// offers no security of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoIndexMap;

impl PeerIndexMap for DemoIndexMap {
    fn index_of(&self, addr: &LinkAddr, lambda: usize) -> u16 {
        let table = &DEMO_PEER_IDS[..lambda.min(DEMO_PEER_IDS.len())];
        table
            .iter()
            .position(|&id| id == addr.last_byte())
            .map_or(DEMO_DEFAULT_PEER_INDEX, |i| i as u16)
    }
}

// =============================================================================
// Blom scheme
// =============================================================================

/// Blom's scheme with fan-in `LAMBDA`
pub struct BlomScheme<const LAMBDA: usize = DEFAULT_LAMBDA, M: PeerIndexMap = DemoIndexMap> {
    row: [u16; LAMBDA],
    cache: [Option<[u8; BLOM_SECRET_LENGTH]>; LAMBDA],
    map: M,
}

impl<const LAMBDA: usize, M: PeerIndexMap> BlomScheme<LAMBDA, M> {
    /// Create from an already computed secret row
    #[must_use]
    pub fn from_row(row: [u16; LAMBDA], map: M) -> Self {
        Self {
            row,
            cache: [None; LAMBDA],
            map,
        }
    }

    /// Compute this node's row from the symmetric secret matrix
    ///
    /// `row[i] = Σ_j D[i][j] * own_id^j`, accumulated in 16-bit wrapping
    /// arithmetic.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if `matrix` is not symmetric.
    pub fn from_matrix(matrix: &[[u8; LAMBDA]; LAMBDA], own_id: u16, map: M) -> Result<Self> {
        for i in 0..LAMBDA {
            for j in 0..i {
                if matrix[i][j] != matrix[j][i] {
                    return Err(Error::InvalidParameter);
                }
            }
        }

        let mut row = [0u16; LAMBDA];
        for (coeff, matrix_row) in row.iter_mut().zip(matrix.iter()) {
            let mut power: u16 = 1;
            for &d in matrix_row {
                *coeff = coeff.wrapping_add(u16::from(d).wrapping_mul(power));
                power = power.wrapping_mul(own_id);
            }
        }
        Ok(Self::from_row(row, map))
    }

    /// Derive the matrix from a seed shared by every node
    ///
    /// All nodes feeding the same seed through [`SeededRng`] obtain the same
    /// matrix. This stands in for provisioned key material and must not be
    /// used where the seed could be learned by an attacker.
    ///
    /// # Errors
    ///
    /// Returns `Error::RngFailure` if the generator fails.
    pub fn from_shared_seed(seed: [u8; 32], own_id: u16, map: M) -> Result<Self> {
        let mut rng = SeededRng::new(seed);
        let mut matrix = [[0u8; LAMBDA]; LAMBDA];
        for i in 0..LAMBDA {
            for j in 0..=i {
                let mut byte = [0u8; 1];
                rng.fill_bytes(&mut byte)?;
                matrix[i][j] = byte[0];
                matrix[j][i] = byte[0];
            }
        }
        let scheme = Self::from_matrix(&matrix, own_id, map);
        for line in &mut matrix {
            line.zeroize();
        }
        scheme
    }

    /// Evaluate the row polynomial at `peer_index`, uncached
    #[must_use]
    pub fn evaluate(&self, peer_index: u16) -> u32 {
        evaluate_row(&self.row, peer_index)
    }

    /// Pairwise secret with the node whose identifier is `peer_index`
    ///
    /// The secret is the low 16 bits of the row evaluation, little-endian.
    /// An evaluation of 65536 therefore yields `[0, 0]`, the same secret
    /// as an evaluation of 0. Both ends truncate identically, so the
    /// secrets still agree.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if `peer_index >= LAMBDA`.
    pub fn secret_for_index(&mut self, peer_index: u16) -> Result<&[u8; BLOM_SECRET_LENGTH]> {
        let row = &self.row;
        let slot = self
            .cache
            .get_mut(usize::from(peer_index))
            .ok_or(Error::InvalidParameter)?;
        Ok(slot.get_or_insert_with(|| {
            let value = evaluate_row(row, peer_index);
            [value as u8, (value >> 8) as u8]
        }))
    }

    /// Number of secrets computed so far
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.iter().filter(|s| s.is_some()).count()
    }
}

/// `row[0] + Σ row[i] * j^i (mod P)`, reducing after every step
fn evaluate_row(row: &[u16], j: u16) -> u32 {
    let Some((&first, rest)) = row.split_first() else {
        return 0;
    };
    let j = u32::from(j);
    let mut sum = u32::from(first);
    let mut exp = j;
    for &coeff in rest {
        sum = mod_p(sum + mul_p(u32::from(coeff), exp));
        exp = mul_p(exp, j);
    }
    sum
}

impl<const LAMBDA: usize, M: PeerIndexMap> AkesScheme for BlomScheme<LAMBDA, M> {
    const NAME: &'static str = "bloms";

    fn secret_for_hello_sender(&mut self, sender: &LinkAddr) -> Result<&[u8]> {
        let index = self.map.index_of(sender, LAMBDA);
        self.secret_for_index(index).map(|s| &s[..])
    }

    fn update_secret_with(&mut self, _peer: &LinkAddr, _secret: &[u8]) -> Result<()> {
        Err(Error::NotSupported)
    }
}

impl<const LAMBDA: usize, M: PeerIndexMap> Drop for BlomScheme<LAMBDA, M> {
    fn drop(&mut self) {
        self.row.zeroize();
        for slot in &mut self.cache {
            if let Some(secret) = slot {
                secret.zeroize();
            }
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use akes_common::LINKADDR_SIZE;

    fn addr_ending_in(last: u8) -> LinkAddr {
        let mut bytes = [0xAA; LINKADDR_SIZE];
        bytes[LINKADDR_SIZE - 1] = last;
        LinkAddr::new(bytes)
    }

    #[test]
    fn test_worked_example() {
        let mut scheme = BlomScheme::<5>::from_row([1, 2, 3, 4, 5], DemoIndexMap);
        assert_eq!(scheme.evaluate(2), 129);
        assert_eq!(scheme.secret_for_index(2).unwrap(), &[129, 0]);
    }

    #[test]
    fn test_index_zero_is_constant_term() {
        let mut scheme = BlomScheme::<3>::from_row([0x1234, 7, 9], DemoIndexMap);
        assert_eq!(scheme.secret_for_index(0).unwrap(), &[0x34, 0x12]);
    }

    #[test]
    fn test_cache_populated_lazily() {
        let mut scheme = BlomScheme::<5>::from_row([9, 8, 7, 6, 5], DemoIndexMap);
        assert_eq!(scheme.cached(), 0);
        let first = *scheme.secret_for_index(4).unwrap();
        assert_eq!(scheme.cached(), 1);
        assert_eq!(*scheme.secret_for_index(4).unwrap(), first);
        assert_eq!(scheme.cached(), 1);
    }

    #[test]
    fn test_evaluation_of_p_minus_one_truncates() {
        // 65535 + 1 * 1 = 65536 mod 65537
        let mut scheme = BlomScheme::<2>::from_row([u16::MAX, 1], DemoIndexMap);
        assert_eq!(scheme.evaluate(1), 65536);
        assert_eq!(scheme.secret_for_index(1).unwrap(), &[0, 0]);
    }

    #[test]
    fn test_index_out_of_range() {
        let mut scheme = BlomScheme::<3>::from_row([1, 2, 3], DemoIndexMap);
        assert_eq!(scheme.secret_for_index(3).unwrap_err(), Error::InvalidParameter);
    }

    #[test]
    fn test_demo_index_map() {
        let map = DemoIndexMap;
        assert_eq!(map.index_of(&addr_ending_in(0x3b), 5), 0);
        assert_eq!(map.index_of(&addr_ending_in(0x5d), 5), 3);
        assert_eq!(map.index_of(&addr_ending_in(0x00), 5), 4);
        assert_eq!(map.index_of(&addr_ending_in(0x77), 5), 3);
        // only the first LAMBDA table entries are considered
        assert_eq!(map.index_of(&addr_ending_in(0x00), 3), 3);
    }

    #[test]
    fn test_asymmetric_matrix_rejected() {
        let mut matrix = [[1u8; 3]; 3];
        matrix[0][2] = 5;
        assert!(matches!(
            BlomScheme::<3>::from_matrix(&matrix, 1, DemoIndexMap),
            Err(Error::InvalidParameter)
        ));
    }

    #[test]
    fn test_row_from_matrix() {
        // D = [[1,2],[2,3]], id = 4: row = [1 + 2*4, 2 + 3*4]
        let matrix = [[1u8, 2], [2, 3]];
        let mut scheme = BlomScheme::<2>::from_matrix(&matrix, 4, DemoIndexMap).unwrap();
        assert_eq!(scheme.evaluate(0), 9);
        assert_eq!(scheme.secret_for_index(1).unwrap(), &[23, 0]);
    }

    #[test]
    fn test_update_rejected() {
        let mut scheme = BlomScheme::<5>::from_row([1, 2, 3, 4, 5], DemoIndexMap);
        let peer = addr_ending_in(0xc6);
        let mut before = [0u8; BLOM_SECRET_LENGTH];
        before.copy_from_slice(scheme.secret_for_hello_sender(&peer).unwrap());
        assert_eq!(scheme.update_secret_with(&peer, &[1, 2]), Err(Error::NotSupported));
        assert_eq!(scheme.secret_for_hello_sender(&peer).unwrap(), &before[..]);
    }
}
