// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Top-level AKES state
//!
//! [`AkesContext`] owns every piece of security-layer state: the key scheme,
//! the revocation list, the Trickle engine, the group key, the revocation
//! endpoint, the AES engine handle, the random source and the log. It is
//! created once at startup and passed by `&mut` into each operation.
//! Collaborators (neighbor table, radio, routing) stay with their owners
//! and are lent per call.

use akes_common::config::AkesConfig;
use akes_common::constants::DEFAULT_NRL_CAPACITY;
use akes_common::log::LogBuffer;
use akes_common::{log_debug, log_error, log_info, log_warn};
use akes_common::{Error, LinkAddr, NeighborStatus, Result, StatusCode, Ticks};
use akes_crypto::{AesEngine, CcmKey, CryptoRng};

use crate::group_key::{GroupKey, GroupKeyManager};
use crate::link::{LinkLayer, NetStack, RoutingHooks};
use crate::neighbor::{NeighborStore, PermanentState};
use crate::nrl::NodeRevocationList;
use crate::request::{RequestHeader, RevocationEndpoint};
use crate::revocation::{Revocation, RevocationReport};
use crate::scheme::AkesScheme;
use crate::storage::NrlStore;
use crate::trickle::{Trickle, TrickleEvent};

const LOG_MODULE: &str = "akes";
const TRICKLE_LOG_MODULE: &str = "trickle";

/// Security-layer state of one node
pub struct AkesContext<S, St, R, const CAP: usize = DEFAULT_NRL_CAPACITY>
where
    S: AkesScheme,
    St: NrlStore,
    R: CryptoRng,
{
    config: AkesConfig,
    scheme: S,
    nrl: NodeRevocationList<St, CAP>,
    trickle: Trickle,
    group_key: GroupKeyManager,
    endpoint: RevocationEndpoint,
    engine: AesEngine,
    rng: R,
    log: LogBuffer,
}

impl<S, St, R, const CAP: usize> AkesContext<S, St, R, CAP>
where
    S: AkesScheme,
    St: NrlStore,
    R: CryptoRng,
{
    /// Assemble the context
    ///
    /// `management_key` authenticates revocation requests. Call
    /// [`init`](Self::init) before use.
    pub fn new(config: AkesConfig, scheme: S, store: St, management_key: &CcmKey, rng: R) -> Self {
        Self {
            config,
            scheme,
            nrl: NodeRevocationList::new(store, config.revocation.nrl_persistence),
            trickle: Trickle::new(config.trickle),
            group_key: GroupKeyManager::new(),
            endpoint: RevocationEndpoint::new(management_key),
            engine: AesEngine::new(),
            rng,
            log: LogBuffer::new(),
        }
    }

    /// Install a provisioned group key
    #[must_use]
    pub fn with_group_key(mut self, key: GroupKey) -> Self {
        self.group_key = GroupKeyManager::with_key(key);
        self
    }

    /// Initialise the key scheme and reload the revocation list
    ///
    /// # Errors
    ///
    /// Propagates scheme initialisation errors and
    /// `Error::PersistenceReadFailed`.
    pub fn init(&mut self, now: Ticks) -> Result<()> {
        if let Err(e) = self.scheme.init() {
            log_error!(self.log, now, LOG_MODULE, "{} scheme init failed: {}", S::NAME, e);
            return Err(e);
        }
        match self.nrl.init() {
            Ok(n) => {
                log_info!(self.log, now, LOG_MODULE, "{} scheme ready, {} revoked nodes loaded", S::NAME, n);
                Ok(())
            }
            Err(e) => {
                log_error!(self.log, now, LOG_MODULE, "revocation list load failed: {}", e);
                Err(e)
            }
        }
    }

    // =========================================================================
    // HELLO dissemination
    // =========================================================================

    /// Start Trickle
    ///
    /// # Errors
    ///
    /// Returns `Error::RngFailure` if the initial interval could not be drawn.
    pub fn start_trickle<N, L>(&mut self, now: Ticks, neighbors: &mut N, link: &mut L) -> Result<()>
    where
        N: NeighborStore,
        L: LinkLayer,
    {
        let events = self.trickle.start(now, &mut self.rng, neighbors, link)?;
        self.log_trickle(now, &events);
        Ok(())
    }

    /// Stop Trickle
    pub fn stop_trickle(&mut self, now: Ticks) {
        self.trickle.stop();
        log_info!(self.log, now, TRICKLE_LOG_MODULE, "stopped");
    }

    /// Advance timers to `now`
    ///
    /// # Errors
    ///
    /// Returns `Error::RngFailure` if Trickle could not schedule its next
    /// transmission.
    pub fn poll<N, L>(&mut self, now: Ticks, neighbors: &mut N, link: &mut L) -> Result<()>
    where
        N: NeighborStore,
        L: LinkLayer,
    {
        match self.trickle.poll(now, &mut self.rng, neighbors, link) {
            Ok(events) => {
                self.log_trickle(now, &events);
                Ok(())
            }
            Err(e) => {
                log_error!(self.log, now, TRICKLE_LOG_MODULE, "scheduling failed: {}", e);
                Err(e)
            }
        }
    }

    /// Signal a Trickle reset from outside the engine
    ///
    /// # Errors
    ///
    /// Returns `Error::RngFailure` if the new interval could not be scheduled.
    pub fn trickle_reset(&mut self, now: Ticks) -> Result<()> {
        match self.trickle.reset(now, &mut self.rng)? {
            Some(event) => self.log_trickle(now, &[event]),
            None => log_debug!(self.log, now, TRICKLE_LOG_MODULE, "not resetting, I = Imin"),
        }
        Ok(())
    }

    /// A neighbor completed key establishment
    ///
    /// # Errors
    ///
    /// Returns `Error::RngFailure` if a triggered reset could not be scheduled.
    pub fn on_new_neighbor<N: NeighborStore>(&mut self, now: Ticks, neighbors: &N) -> Result<()> {
        let permanent = neighbors.count(NeighborStatus::Permanent);
        log_debug!(self.log, now, TRICKLE_LOG_MODULE, "new neighbor, {} permanent", permanent);
        if let Some(event) = self.trickle.on_new_neighbor(now, &mut self.rng, permanent)? {
            self.log_trickle(now, &[event]);
        }
        Ok(())
    }

    /// A permanent neighbor sent a fresh authentic HELLO
    ///
    /// Returns `true` if it counted towards redundancy this interval.
    pub fn on_fresh_authentic_hello(&mut self, sender: &mut PermanentState) -> bool {
        self.trickle.on_fresh_authentic_hello(sender)
    }

    /// Whether HELLOs from `sender` may start key establishment
    #[must_use]
    pub fn accepts_hello_from(&self, sender: &LinkAddr) -> bool {
        !self.nrl.is_revoked(sender)
    }

    /// Pairwise secret for key establishment with a HELLO sender
    ///
    /// # Errors
    ///
    /// Returns `Error::PeerNotFound` for revoked senders, or the scheme's
    /// error if no secret can be derived.
    pub fn secret_for_hello_sender(&mut self, sender: &LinkAddr) -> Result<&[u8]> {
        if self.nrl.is_revoked(sender) {
            return Err(Error::PeerNotFound);
        }
        self.scheme.secret_for_hello_sender(sender)
    }

    /// Pairwise secret for key establishment with a HELLOACK sender
    ///
    /// # Errors
    ///
    /// Returns `Error::PeerNotFound` for revoked senders, or the scheme's
    /// error if no secret can be derived.
    pub fn secret_for_helloack_sender(&mut self, sender: &LinkAddr) -> Result<&[u8]> {
        if self.nrl.is_revoked(sender) {
            return Err(Error::PeerNotFound);
        }
        self.scheme.secret_for_helloack_sender(sender)
    }

    // =========================================================================
    // Revocation
    // =========================================================================

    /// Revoke `peer` (see [`Revocation::revoke_node`])
    ///
    /// # Errors
    ///
    /// Returns `Error::RevocationDisabled` when revocation is switched off,
    /// otherwise the errors of [`Revocation::revoke_node`].
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
        if !self.config.revocation.enabled {
            log_warn!(self.log, now, LOG_MODULE, "revocation of {} refused: disabled", peer);
            return Err(Error::RevocationDisabled);
        }

        Revocation {
            config: &self.config.revocation,
            nrl: &mut self.nrl,
            group_key: &mut self.group_key,
            trickle: &mut self.trickle,
            rng: &mut self.rng,
            log: &mut self.log,
        }
        .revoke_node(now, stack, peer, add_to_revocation_list)
    }

    /// Process a sealed revocation request
    ///
    /// On success writes the sealed status response to `response` and
    /// returns its length. Returns `Ok(None)` when no response must be sent:
    /// requests failing authentication are dropped silently unless the
    /// `debug-responses` feature is enabled.
    ///
    /// # Errors
    ///
    /// - `Error::Busy` if the AES engine is in use
    /// - `Error::BufferTooSmall` if `response` cannot hold the answer
    pub fn handle_revocation_request<N, L, P>(
        &mut self,
        now: Ticks,
        stack: &mut NetStack<'_, N, L, P>,
        header: &RequestHeader,
        sealed: &[u8],
        response: &mut [u8],
    ) -> Result<Option<usize>>
    where
        N: NeighborStore,
        L: LinkLayer,
        P: RoutingHooks,
    {
        let request = match self.endpoint.open(&self.engine, header, sealed) {
            Ok(request) => request,
            Err(Error::AuthenticationFailed) => {
                log_warn!(self.log, now, LOG_MODULE, "request {} failed authentication", header.message_id);
                if cfg!(feature = "debug-responses") {
                    return self.respond(header, StatusCode::Error, response).map(Some);
                }
                return Ok(None);
            }
            Err(Error::Busy) => return Err(Error::Busy),
            Err(e) => {
                log_warn!(self.log, now, LOG_MODULE, "request {} rejected: {}", header.message_id, e);
                return self.respond(header, e.status_code(), response).map(Some);
            }
        };

        let status = match self.revoke_node(now, stack, &request.peer, true) {
            Ok(_) => {
                if !request.secret.is_empty() {
                    if let Err(e) = self.scheme.update_secret_with(&request.peer, &request.secret) {
                        log_warn!(self.log, now, LOG_MODULE, "{} scheme kept its secret: {}", S::NAME, e);
                    }
                }
                StatusCode::Success
            }
            Err(e) => e.status_code(),
        };
        log_info!(self.log, now, LOG_MODULE, "request {} answered with status {}", header.message_id, status as u8);
        self.respond(header, status, response).map(Some)
    }

    /// Empty the revocation list and delete its persisted copy
    ///
    /// # Errors
    ///
    /// Returns `Error::PersistenceWriteFailed` if the stored copy could not
    /// be removed.
    pub fn clear_revocation_list(&mut self, now: Ticks) -> Result<()> {
        let result = self.nrl.clear();
        match result {
            Ok(()) => log_info!(self.log, now, LOG_MODULE, "revocation list cleared"),
            Err(e) => log_error!(self.log, now, LOG_MODULE, "revocation list clear failed: {}", e),
        }
        result
    }

    /// Replace the group key and push it to every permanent neighbor
    ///
    /// Returns the number of UPDATEs handed to the link layer.
    ///
    /// # Errors
    ///
    /// Returns `Error::RngFailure` if no key could be generated; the old
    /// key stays in place.
    pub fn rotate_group_key<N, L>(&mut self, now: Ticks, neighbors: &mut N, link: &mut L) -> Result<usize>
    where
        N: NeighborStore + ?Sized,
        L: LinkLayer + ?Sized,
    {
        self.group_key.rotate(&mut self.rng, neighbors, link, &mut self.log, now)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &AkesConfig {
        &self.config
    }

    /// Key scheme
    #[must_use]
    pub const fn scheme(&self) -> &S {
        &self.scheme
    }

    /// Node revocation list
    #[must_use]
    pub const fn nrl(&self) -> &NodeRevocationList<St, CAP> {
        &self.nrl
    }

    /// Trickle engine
    #[must_use]
    pub const fn trickle(&self) -> &Trickle {
        &self.trickle
    }

    /// Group key owner
    #[must_use]
    pub const fn group_key(&self) -> &GroupKeyManager {
        &self.group_key
    }

    /// AES engine handle shared with the radio driver
    #[must_use]
    pub const fn engine(&self) -> &AesEngine {
        &self.engine
    }

    /// Log records
    #[must_use]
    pub const fn log(&self) -> &LogBuffer {
        &self.log
    }

    /// Log records, mutably (to drain or change the level)
    pub fn log_mut(&mut self) -> &mut LogBuffer {
        &mut self.log
    }

    fn respond(&self, header: &RequestHeader, status: StatusCode, out: &mut [u8]) -> Result<usize> {
        self.endpoint.seal_status(&self.engine, &header.ack(), status, out)
    }

    fn log_trickle(&mut self, now: Ticks, events: &[TrickleEvent]) {
        let log = &mut self.log;
        for event in events {
            match *event {
                TrickleEvent::Started { interval } => {
                    log_info!(log, now, TRICKLE_LOG_MODULE, "started, I = {} ticks", interval);
                }
                TrickleEvent::HelloBroadcast => {
                    log_debug!(log, now, TRICKLE_LOG_MODULE, "broadcasting HELLO");
                }
                TrickleEvent::HelloFailed(e) => {
                    log_warn!(log, now, TRICKLE_LOG_MODULE, "HELLO not sent: {}", e);
                }
                TrickleEvent::Suppressed { counter } => {
                    log_debug!(log, now, TRICKLE_LOG_MODULE, "suppressed HELLO, c = {}", counter);
                }
                TrickleEvent::AwaitingHelloAcks => {
                    log_debug!(log, now, TRICKLE_LOG_MODULE, "still waiting for HELLOACKs");
                }
                TrickleEvent::ChallengeChanged => {
                    log_debug!(log, now, TRICKLE_LOG_MODULE, "HELLO challenge changed");
                }
                TrickleEvent::IntervalStarted {
                    interval,
                    transmission_point,
                } => {
                    log_debug!(log, now, TRICKLE_LOG_MODULE, "I = {} t = {}", interval, transmission_point);
                }
                TrickleEvent::Reset { transmission_point } => {
                    log_info!(log, now, TRICKLE_LOG_MODULE, "reset, t = {}", transmission_point);
                }
                TrickleEvent::ResetRateLimited => {
                    log_info!(log, now, TRICKLE_LOG_MODULE, "reset rate limit reached");
                }
            }
        }
    }
}
