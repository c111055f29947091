// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Tests for akes-llsec
//!
//! Cross-module behaviour: pairwise secrets between nodes, revocation list
//! persistence, long-running Trickle schedules and the revocation request
//! path through [`AkesContext`].

#![cfg(test)]

mod support {
    use akes_common::{LinkAddr, Result, Ticks, LINKADDR_SIZE};
    use akes_llsec::{GroupKey, LinkLayer, NeighborTable, ParentRemoval, RoutingHooks};

    pub fn addr(n: u8) -> LinkAddr {
        LinkAddr::new([n; LINKADDR_SIZE])
    }

    #[derive(Default)]
    pub struct Radio {
        pub hellos: usize,
        pub challenges: usize,
        pub updates: usize,
    }

    impl LinkLayer for Radio {
        fn broadcast_hello(&mut self) -> Result<()> {
            self.hellos += 1;
            Ok(())
        }

        fn change_hello_challenge(&mut self) {
            self.challenges += 1;
        }

        fn send_update(&mut self, _peer: &LinkAddr, _group_key: &GroupKey) -> Result<()> {
            self.updates += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct Routing {
        pub preferred: Option<LinkAddr>,
        pub advertisements: usize,
    }

    impl RoutingHooks for Routing {
        fn drop_parent(&mut self, addr: &LinkAddr) -> ParentRemoval {
            if self.preferred == Some(*addr) {
                self.preferred = None;
                ParentRemoval::PreferredRemoved
            } else {
                ParentRemoval::NotParent
            }
        }

        fn select_preferred_parent(&mut self) {}

        fn send_route_advertisement(&mut self) {
            self.advertisements += 1;
        }
    }

    /// Table with permanent neighbors `1..=n`
    pub fn permanent_neighbors(n: u8) -> NeighborTable<8> {
        let mut table = NeighborTable::new();
        for i in 1..=n {
            table.add_tentative(addr(i), Ticks::new(0)).unwrap();
            table.promote(&addr(i)).unwrap();
        }
        table
    }
}

mod bloms_tests {
    use akes_llsec::{AkesScheme, BlomScheme, DemoIndexMap};

    const SEED: [u8; 32] = [0x5e; 32];

    fn secrets<const L: usize>(own_id: u16) -> [[u8; 2]; L] {
        let mut scheme = BlomScheme::<L>::from_shared_seed(SEED, own_id, DemoIndexMap).unwrap();
        let mut out = [[0u8; 2]; L];
        for (j, slot) in out.iter_mut().enumerate() {
            *slot = *scheme.secret_for_index(j as u16).unwrap();
        }
        out
    }

    #[test]
    fn test_shared_seed_is_deterministic() {
        assert_eq!(secrets::<3>(1), secrets::<3>(1));
        assert_eq!(secrets::<5>(2), secrets::<5>(2));
        assert_eq!(secrets::<8>(7), secrets::<8>(7));
    }

    #[test]
    fn test_rows_differ_per_node() {
        assert_ne!(secrets::<5>(1), secrets::<5>(2));
    }

    #[test]
    fn test_pairwise_secrets_agree() {
        // Small entries keep every intermediate below 2^16
        let matrix = [[1u8, 2, 3], [2, 1, 2], [3, 2, 1]];
        for i in 0..3u16 {
            let mut a = BlomScheme::<3>::from_matrix(&matrix, i, DemoIndexMap).unwrap();
            for j in 0..3u16 {
                let mut b = BlomScheme::<3>::from_matrix(&matrix, j, DemoIndexMap).unwrap();
                assert_eq!(
                    a.secret_for_index(j).unwrap(),
                    b.secret_for_index(i).unwrap(),
                    "nodes {i} and {j}"
                );
            }
        }
    }

    #[test]
    fn test_scheme_lookup_by_address() {
        let mut scheme = BlomScheme::<5>::from_row([1, 2, 3, 4, 5], DemoIndexMap);
        let mut bytes = [0u8; akes_common::LINKADDR_SIZE];
        // 0xc6 sits at index 2 of the demo table
        bytes[akes_common::LINKADDR_SIZE - 1] = 0xc6;
        let peer = akes_common::LinkAddr::new(bytes);

        assert_eq!(scheme.secret_for_hello_sender(&peer).unwrap(), &[129, 0]);
        assert_eq!(scheme.secret_for_helloack_sender(&peer).unwrap(), &[129, 0]);
        assert_eq!(scheme.cached(), 1);
    }
}

mod nrl_tests {
    use super::support::addr;
    use akes_common::Error;
    use akes_llsec::nrl::NRL_RECORD_SIZE;
    use akes_llsec::{MemoryStore, NodeRevocationList, NullStore};

    #[test]
    fn test_capacity_and_duplicates() {
        let mut nrl = NodeRevocationList::<_, 3>::new(NullStore, false);
        assert_eq!(nrl.revoke(&addr(1)), Ok(1));
        assert_eq!(nrl.revoke(&addr(1)), Ok(2));
        assert_eq!(nrl.revoke(&addr(2)), Ok(3));
        assert_eq!(nrl.revoke(&addr(3)), Err(Error::CapacityExceeded));
        assert!(!nrl.is_revoked(&addr(3)));
        assert_eq!(nrl.as_slice(), &[addr(1), addr(1), addr(2)]);
    }

    #[test]
    fn test_memory_round_trip() {
        let mut nrl = NodeRevocationList::<MemoryStore<128>, 8>::new(MemoryStore::new(), true);
        for n in [4, 2, 9] {
            nrl.revoke(&addr(n)).unwrap();
        }
        assert_eq!(nrl.store().as_bytes().len(), 3 * NRL_RECORD_SIZE);

        let mut reloaded = NodeRevocationList::<_, 8>::new(nrl.into_store(), true);
        assert_eq!(reloaded.init(), Ok(3));
        assert_eq!(reloaded.as_slice(), &[addr(4), addr(2), addr(9)]);
    }

    #[test]
    fn test_reload_stops_at_capacity() {
        let mut nrl = NodeRevocationList::<MemoryStore<128>, 4>::new(MemoryStore::new(), true);
        for n in 1..=4 {
            nrl.revoke(&addr(n)).unwrap();
        }
        let mut smaller = NodeRevocationList::<_, 2>::new(nrl.into_store(), true);
        assert_eq!(smaller.init(), Ok(2));
        assert!(smaller.is_full());
        assert!(!smaller.is_revoked(&addr(3)));
    }

    #[test]
    fn test_truncated_record_ignored() {
        let mut bytes = [b'\n'; NRL_RECORD_SIZE + 1];
        bytes[..NRL_RECORD_SIZE - 1].copy_from_slice(addr(6).as_bytes());
        let store = MemoryStore::<32>::with_contents(&bytes).unwrap();

        let mut nrl = NodeRevocationList::<_, 4>::new(store, true);
        assert_eq!(nrl.init(), Ok(1));
        assert!(nrl.is_revoked(&addr(6)));
    }
}

mod file_store_tests {
    use super::support::addr;
    use akes_llsec::{FileStore, NodeRevocationList};

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        let mut nrl = NodeRevocationList::<_, 4>::new(FileStore::in_dir(dir.path()), true);
        assert_eq!(nrl.init(), Ok(0));
        nrl.revoke(&addr(1)).unwrap();
        nrl.revoke(&addr(2)).unwrap();

        let mut reloaded = NodeRevocationList::<_, 4>::new(FileStore::in_dir(dir.path()), true);
        assert_eq!(reloaded.init(), Ok(2));
        assert_eq!(reloaded.as_slice(), &[addr(1), addr(2)]);
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();

        let mut nrl = NodeRevocationList::<_, 4>::new(FileStore::in_dir(dir.path()), true);
        nrl.revoke(&addr(3)).unwrap();
        assert!(nrl.store().path().exists());

        nrl.clear().unwrap();
        assert!(!nrl.store().path().exists());
        nrl.clear().unwrap();

        let mut reloaded = NodeRevocationList::<_, 4>::new(FileStore::in_dir(dir.path()), true);
        assert_eq!(reloaded.init(), Ok(0));
    }
}

mod trickle_tests {
    use super::support::{permanent_neighbors, Radio};
    use akes_common::config::TrickleConfig;
    use akes_common::Ticks;
    use akes_crypto::rng::TestRng;
    use akes_llsec::{Trickle, TrickleEvent};

    fn config() -> TrickleConfig {
        let mut config = TrickleConfig::default();
        config.imin = 1_000;
        config.imax = 4;
        config.hello_wait = 300;
        config
    }

    #[test]
    fn test_long_run_stays_within_bounds() {
        let config = config();
        let mut trickle = Trickle::new(config);
        let mut rng = TestRng::from_seed(0xdead_beef);
        let mut table = permanent_neighbors(3);
        let mut radio = Radio::default();

        trickle.start(Ticks::new(0), &mut rng, &mut table, &mut radio).unwrap();
        let mut intervals = 0;
        while intervals < 40 {
            let now = trickle.next_deadline().unwrap();
            for event in trickle.poll(now, &mut rng, &mut table, &mut radio).unwrap() {
                if let TrickleEvent::IntervalStarted {
                    interval,
                    transmission_point,
                } = event
                {
                    intervals += 1;
                    assert!(interval >= config.imin && interval <= config.imax_interval());
                    assert!(transmission_point >= interval / 2 && transmission_point < interval);
                }
            }
        }

        assert_eq!(trickle.interval_size(), config.imax_interval());
        // Every broadcast is eventually followed by a challenge change
        assert!(radio.hellos >= 40);
        assert!(radio.challenges >= radio.hellos);
    }

    #[test]
    fn test_churn_brings_interval_back_down() {
        let config = config();
        let mut trickle = Trickle::new(config);
        let mut rng = TestRng::from_seed(1);
        let mut table = permanent_neighbors(8);
        let mut radio = Radio::default();

        trickle.start(Ticks::new(0), &mut rng, &mut table, &mut radio).unwrap();
        let mut now = Ticks::new(0);
        while trickle.interval_size() < config.imax_interval() {
            now = trickle.next_deadline().unwrap();
            trickle.poll(now, &mut rng, &mut table, &mut radio).unwrap();
        }

        // Eight permanent neighbors: the second new neighbor triggers a reset
        assert_eq!(trickle.on_new_neighbor(now, &mut rng, 8), Ok(None));
        let event = trickle.on_new_neighbor(now, &mut rng, 8).unwrap();
        assert!(matches!(event, Some(TrickleEvent::Reset { .. })));
        assert_eq!(trickle.interval_size(), config.imin);
    }
}

mod request_tests {
    use super::support::{addr, permanent_neighbors, Radio, Routing};
    use akes_common::{AkesConfig, Error, StatusCode, Ticks, LINKADDR_SIZE};
    use akes_crypto::rng::TestRng;
    use akes_crypto::{AesCcm, AesEngine, CcmKey};
    use akes_llsec::request::{MAX_SEALED_REQUEST, STATUS_RESPONSE_LENGTH};
    use akes_llsec::{
        AkesContext, BlomScheme, DemoIndexMap, MemoryStore, NeighborStore, NetStack, RequestHeader,
    };

    const KEY: [u8; 16] = [0x42; 16];

    type Context = AkesContext<BlomScheme<5>, MemoryStore<256>, TestRng>;

    fn context() -> Context {
        let scheme = BlomScheme::from_shared_seed([9; 32], 1, DemoIndexMap).unwrap();
        let mut ctx = AkesContext::new(
            AkesConfig::default(),
            scheme,
            MemoryStore::new(),
            &CcmKey::new(KEY),
            TestRng::from_seed(5),
        );
        ctx.init(Ticks::new(0)).unwrap();
        ctx
    }

    fn seal(message_id: u16, plain: &[u8], out: &mut [u8]) -> usize {
        AesCcm::new(&CcmKey::new(KEY))
            .seal(
                &AesEngine::new(),
                &RequestHeader::confirmable(message_id).nonce(),
                &[],
                plain,
                out,
            )
            .unwrap()
    }

    fn status(message_id: u16, response: &[u8]) -> u8 {
        let mut plain = [0u8; 1];
        AesCcm::new(&CcmKey::new(KEY))
            .open(
                &AesEngine::new(),
                &RequestHeader::confirmable(message_id).ack().nonce(),
                &[],
                response,
                &mut plain,
            )
            .unwrap();
        plain[0] - b'0'
    }

    #[test]
    fn test_revocation_end_to_end() {
        let mut ctx = context();
        let mut table = permanent_neighbors(3);
        let mut radio = Radio::default();
        let mut routing = Routing {
            preferred: Some(addr(2)),
            advertisements: 0,
        };

        ctx.start_trickle(Ticks::new(0), &mut table, &mut radio).unwrap();
        assert!(ctx.secret_for_hello_sender(&addr(2)).is_ok());

        let mut sealed = [0u8; MAX_SEALED_REQUEST];
        let n = seal(100, addr(2).as_bytes(), &mut sealed);
        let mut response = [0u8; STATUS_RESPONSE_LENGTH];
        let len = {
            let mut stack = NetStack::new(&mut table, &mut radio, &mut routing);
            ctx.handle_revocation_request(
                Ticks::new(500),
                &mut stack,
                &RequestHeader::confirmable(100),
                &sealed[..n],
                &mut response,
            )
            .unwrap()
            .unwrap()
        };

        assert_eq!(len, STATUS_RESPONSE_LENGTH);
        assert_eq!(status(100, &response), StatusCode::Success as u8);
        assert!(table.lookup(&addr(2)).is_none());
        assert_eq!(radio.updates, 2);
        assert_eq!(routing.advertisements, 1);
        assert!(!ctx.accepts_hello_from(&addr(2)));
        assert_eq!(ctx.secret_for_hello_sender(&addr(2)).err(), Some(Error::PeerNotFound));
    }

    #[test]
    fn test_revoking_absent_node_twice() {
        let mut ctx = context();
        let mut table = permanent_neighbors(2);
        let mut radio = Radio::default();
        let mut routing = Routing::default();
        let mut stack = NetStack::new(&mut table, &mut radio, &mut routing);

        let first = ctx.revoke_node(Ticks::new(1), &mut stack, &addr(7), true).unwrap();
        let second = ctx.revoke_node(Ticks::new(2), &mut stack, &addr(7), true).unwrap();
        assert_eq!(first.removed, None);
        assert_eq!(second.nrl_len, Some(2));
        assert_eq!(ctx.nrl().len(), 2);
        assert_eq!(ctx.group_key().rotations(), 0);
    }

    #[test]
    fn test_message_ids_must_increase() {
        let mut ctx = context();
        let mut table = permanent_neighbors(0);
        let mut radio = Radio::default();
        let mut routing = Routing::default();
        let mut stack = NetStack::new(&mut table, &mut radio, &mut routing);

        let mut statuses = [0u8; 3];
        for (slot, mid) in statuses.iter_mut().zip([7u16, 3, 8]) {
            let mut sealed = [0u8; MAX_SEALED_REQUEST];
            let n = seal(mid, &[mid as u8; LINKADDR_SIZE], &mut sealed);
            let mut response = [0u8; STATUS_RESPONSE_LENGTH];
            let len = ctx
                .handle_revocation_request(
                    Ticks::new(u64::from(mid)),
                    &mut stack,
                    &RequestHeader::confirmable(mid),
                    &sealed[..n],
                    &mut response,
                )
                .unwrap()
                .unwrap();
            *slot = status(mid, &response[..len]);
        }

        let ok = StatusCode::Success as u8;
        assert_eq!(statuses, [ok, StatusCode::Error as u8, ok]);
        assert_eq!(ctx.nrl().len(), 2);
    }

    #[test]
    fn test_oversized_request_dropped() {
        let mut ctx = context();
        let mut table = permanent_neighbors(1);
        let mut radio = Radio::default();
        let mut routing = Routing::default();
        let mut stack = NetStack::new(&mut table, &mut radio, &mut routing);

        let sealed = [0u8; MAX_SEALED_REQUEST + 1];
        let mut response = [0u8; STATUS_RESPONSE_LENGTH];
        let result = ctx.handle_revocation_request(
            Ticks::new(0),
            &mut stack,
            &RequestHeader::confirmable(1),
            &sealed,
            &mut response,
        );
        if cfg!(feature = "debug-responses") {
            assert!(matches!(result, Ok(Some(_))));
        } else {
            assert_eq!(result, Ok(None));
        }
        assert!(ctx.nrl().is_empty());
    }

    #[test]
    fn test_blom_scheme_keeps_secret_on_update() {
        let mut ctx = context();
        let mut table = permanent_neighbors(0);
        let mut radio = Radio::default();
        let mut routing = Routing::default();
        let mut stack = NetStack::new(&mut table, &mut radio, &mut routing);

        let mut plain = [0u8; LINKADDR_SIZE + 2];
        plain[..LINKADDR_SIZE].copy_from_slice(addr(5).as_bytes());
        let mut sealed = [0u8; MAX_SEALED_REQUEST];
        let n = seal(1, &plain, &mut sealed);
        let mut response = [0u8; STATUS_RESPONSE_LENGTH];
        let len = ctx
            .handle_revocation_request(
                Ticks::new(0),
                &mut stack,
                &RequestHeader::confirmable(1),
                &sealed[..n],
                &mut response,
            )
            .unwrap()
            .unwrap();

        // The scheme refuses the secret but the revocation still stands
        assert_eq!(status(1, &response[..len]), StatusCode::Success as u8);
        assert!(ctx.nrl().is_revoked(&addr(5)));
        assert!(ctx.log().iter().any(|e| e.message.contains("kept its secret")));
    }
}
