// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Tests for akes-crypto
//!
//! Field arithmetic, the CCM* envelope used by management messages, engine
//! exclusivity and the deterministic random sources.

#![cfg(test)]

mod field_tests {
    use akes_crypto::{mod_p, mul_p, FERMAT_P};

    #[test]
    fn test_fermat_prime() {
        assert_eq!(FERMAT_P, 65_537);
    }

    #[test]
    fn test_mod_p_matches_remainder_for_sampled_u32() {
        let mut x: u32 = 1;
        for _ in 0..10_000 {
            x = x.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            assert_eq!(mod_p(x), x % FERMAT_P, "x = {x:#x}");
        }
    }

    #[test]
    fn test_mul_p_is_commutative() {
        let values = [0u32, 1, 3, 1000, 65_534, FERMAT_P - 2, FERMAT_P - 1, FERMAT_P];
        for &a in &values {
            for &b in &values {
                assert_eq!(mul_p(a, b), mul_p(b, a), "({a}, {b})");
                assert!(mul_p(a, b) < FERMAT_P);
            }
        }
    }

    #[test]
    fn test_polynomial_evaluation() {
        // 1 + 2x + 3x^2 + 4x^3 + 5x^4 at x = 2
        let row = [1u32, 2, 3, 4, 5];
        let x = 2;
        let mut sum = row[0];
        let mut exp = x;
        for &coeff in &row[1..] {
            sum = mod_p(sum + mul_p(coeff, exp));
            exp = mul_p(exp, x);
        }
        assert_eq!(sum, 129);
    }
}

mod aead_tests {
    use akes_crypto::{AesCcm, AesEngine, CcmKey, CcmNonce, CryptoError, SeededRng};

    #[test]
    fn test_request_response_nonces_differ() {
        assert_ne!(CcmNonce::from_message(10, 0), CcmNonce::from_message(10, 2));
        // Plain concatenation, no separator
        assert_eq!(CcmNonce::from_message(1, 12), CcmNonce::from_message(11, 2));
    }

    #[test]
    fn test_generated_keys_interoperate() {
        let mut rng = SeededRng::from_u64(42);
        let key = CcmKey::generate(&mut rng).unwrap();
        let other = CcmKey::generate(&mut rng).unwrap();
        assert_ne!(key, other);

        let engine = AesEngine::new();
        let nonce = CcmNonce::from_message(300, 0);
        let mut sealed = [0u8; 24];
        let n = AesCcm::new(&key)
            .seal(&engine, &nonce, b"hdr", b"0", &mut sealed)
            .unwrap();

        let mut plain = [0u8; 8];
        assert_eq!(
            AesCcm::new(&other).open(&engine, &nonce, b"hdr", &sealed[..n], &mut plain),
            Err(CryptoError::AuthenticationFailed)
        );
        let m = AesCcm::new(&key)
            .open(&engine, &nonce, b"hdr", &sealed[..n], &mut plain)
            .unwrap();
        assert_eq!(&plain[..m], b"0");
    }

    #[test]
    fn test_aad_is_authenticated() {
        let key = CcmKey::new([0x42; 16]);
        let engine = AesEngine::new();
        let nonce = CcmNonce::from_message(1, 0);
        let mut sealed = [0u8; 24];
        let n = AesCcm::new(&key).seal(&engine, &nonce, b"a", b"xyz", &mut sealed).unwrap();

        let mut plain = [0u8; 8];
        assert!(AesCcm::new(&key)
            .open(&engine, &nonce, b"b", &sealed[..n], &mut plain)
            .is_err());
    }

    #[test]
    fn test_empty_plaintext_is_mic_only() {
        let key = CcmKey::new([0x01; 16]);
        let engine = AesEngine::new();
        let nonce = CcmNonce::from_message(9, 1);
        let mut sealed = [0u8; 8];
        let n = AesCcm::new(&key).seal(&engine, &nonce, &[], &[], &mut sealed).unwrap();
        assert_eq!(n, AesCcm::MIC_LENGTH);

        let mut plain = [0u8; 0];
        assert_eq!(
            AesCcm::new(&key).open(&engine, &nonce, &[], &sealed, &mut plain),
            Ok(0)
        );
    }

    #[test]
    fn test_key_debug_redacted() {
        let key = CcmKey::new([0x99; 16]);
        assert_eq!(format!("{key:?}"), "CcmKey([REDACTED])");
    }
}

mod error_tests {
    use akes_common::Error;
    use akes_crypto::CryptoError;

    #[test]
    fn test_conversion_into_unified_error() {
        assert_eq!(Error::from(CryptoError::AuthenticationFailed), Error::AuthenticationFailed);
        assert_eq!(Error::from(CryptoError::Busy), Error::Busy);
        assert_eq!(Error::from(CryptoError::RngFailure), Error::RngFailure);
        assert_eq!(Error::from(CryptoError::InvalidKey), Error::CryptoError);
    }

    #[test]
    fn test_codes() {
        assert_ne!(CryptoError::Busy.code(), CryptoError::InternalError.code());
        assert!(format!("{}", CryptoError::Busy).contains("busy"));
    }
}

mod rng_tests {
    use akes_crypto::{CryptoError, CryptoRng, SeededRng};

    struct FixedRng(u32);

    impl CryptoRng for FixedRng {
        fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), CryptoError> {
            let word = self.0.to_le_bytes();
            for (i, byte) in dest.iter_mut().enumerate() {
                *byte = word[i % 4];
            }
            Ok(())
        }
    }

    #[test]
    fn test_seeded_streams_match_across_instances() {
        let seed = [0x5a; 32];
        let mut a = SeededRng::new(seed);
        let mut b = SeededRng::new(seed);
        for _ in 0..16 {
            assert_eq!(a.next_u32().unwrap(), b.next_u32().unwrap());
        }
    }

    #[test]
    fn test_range_draws_stay_in_bounds() {
        let mut rng = SeededRng::from_u64(7);
        for _ in 0..1000 {
            let v = rng.next_in_range(15_000, 30_000).unwrap();
            assert!((15_000..30_000).contains(&v));
        }
    }

    #[test]
    fn test_fixed_rng_top_of_range() {
        let mut rng = FixedRng(u32::MAX);
        assert_eq!(rng.next_in_range(0, 30_000).unwrap(), 29_999);
    }
}
