// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Trickle-controlled HELLO dissemination
//!
//! Implements the subset of RFC 6206 AKES uses to pace HELLO broadcasts:
//!
//! - Rule 4: at a random point in `[I/2, I)` broadcast unless `k` fresh
//!   authentic HELLOs were heard this interval
//! - Rule 5: when the interval ends, double it up to `Imin * 2^Imax`
//! - Rule 6: on topology churn or an explicit signal, fall back to `Imin`
//!
//! A second timer bounds how long HELLOACKs are awaited after a broadcast;
//! when it fires the HELLO challenge is replaced. No new HELLO is sent while
//! that timer runs.
//!
//! Both timers are [`OneShotTimer`]s advanced by [`Trickle::poll`]. Each
//! operation returns the [`TrickleEvent`]s it produced for the caller to log.

use akes_common::config::TrickleConfig;
use akes_common::{Error, LinkAddr, OneShotTimer, Result, Ticks};
use akes_crypto::CryptoRng;
use heapless::Vec;

use crate::link::LinkLayer;
use crate::neighbor::{NeighborStore, PermanentState};

/// Maximum events produced by a single operation
pub const MAX_TRICKLE_EVENTS: usize = 4;

/// Events produced by a single Trickle operation
pub type TrickleEvents = Vec<TrickleEvent, MAX_TRICKLE_EVENTS>;

/// Something the engine did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrickleEvent {
    /// Engine started with the given interval size
    Started {
        /// Interval size in ticks
        interval: u64,
    },
    /// A HELLO was broadcast
    HelloBroadcast,
    /// The link layer refused the HELLO
    HelloFailed(Error),
    /// Enough fresh HELLOs were heard; ours was suppressed
    Suppressed {
        /// Redundancy counter at suppression time
        counter: u16,
    },
    /// Our previous HELLO is still collecting HELLOACKs
    AwaitingHelloAcks,
    /// The HELLOACK wait ended and the challenge was replaced
    ChallengeChanged,
    /// A new interval began
    IntervalStarted {
        /// Interval size in ticks
        interval: u64,
        /// Offset of the transmission point within the interval
        transmission_point: u64,
    },
    /// The interval was reset to `Imin`
    Reset {
        /// Offset of the transmission point within the new interval
        transmission_point: u64,
    },
    /// A churn-triggered reset was refused by the reset rate limit
    ResetRateLimited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Interval timer ends at the transmission point
    Transmission,
    /// Interval timer ends with the interval
    IntervalEnd,
}

/// Trickle state machine
#[derive(Debug)]
pub struct Trickle {
    config: TrickleConfig,
    interval_size: u64,
    transmission_point: u64,
    counter: u16,
    new_nbrs: u16,
    trickle_timer: OneShotTimer,
    hello_timer: OneShotTimer,
    phase: Phase,
    window_start: Ticks,
    window_resets: u8,
}

impl Trickle {
    /// Create a stopped engine
    #[must_use]
    pub const fn new(config: TrickleConfig) -> Self {
        Self {
            config,
            interval_size: config.imin,
            transmission_point: 0,
            counter: 0,
            new_nbrs: 0,
            trickle_timer: OneShotTimer::new(),
            hello_timer: OneShotTimer::new(),
            phase: Phase::Transmission,
            window_start: Ticks::new(0),
            window_resets: 0,
        }
    }

    /// Begin disseminating HELLOs
    ///
    /// Replaces the HELLO challenge, draws an interval size from
    /// `[Imin, Imin * 2^Imax)` and runs the transmission logic at once.
    ///
    /// # Errors
    ///
    /// Returns `Error::RngFailure` if no interval size could be drawn; the
    /// engine stays stopped.
    pub fn start<N, L>(
        &mut self,
        now: Ticks,
        rng: &mut impl CryptoRng,
        neighbors: &mut N,
        link: &mut L,
    ) -> Result<TrickleEvents>
    where
        N: NeighborStore + ?Sized,
        L: LinkLayer + ?Sized,
    {
        let mut events = TrickleEvents::new();
        if !self.config.enabled {
            return Ok(events);
        }

        let interval = rng.next_in_range(self.config.imin, self.config.imax_interval())?;
        link.change_hello_challenge();
        self.interval_size = interval;
        self.transmission_point = 0;
        emit(&mut events, TrickleEvent::Started { interval });

        self.on_transmission_point(now, neighbors, link, &mut events);
        Ok(events)
    }

    /// Cancel both timers
    pub fn stop(&mut self) {
        self.trickle_timer.stop();
        self.hello_timer.stop();
    }

    /// Advance the timers to `now`
    ///
    /// The HELLOACK wait is handled before the interval timer. Each timer
    /// fires at most once per call.
    ///
    /// # Errors
    ///
    /// Returns `Error::RngFailure` if the next transmission point could not
    /// be drawn. The engine keeps running: the new interval transmits at its
    /// midpoint instead.
    pub fn poll<N, L>(
        &mut self,
        now: Ticks,
        rng: &mut impl CryptoRng,
        neighbors: &mut N,
        link: &mut L,
    ) -> Result<TrickleEvents>
    where
        N: NeighborStore + ?Sized,
        L: LinkLayer + ?Sized,
    {
        let mut events = TrickleEvents::new();
        if !self.config.enabled {
            return Ok(events);
        }

        if self.hello_timer.poll(now) {
            link.change_hello_challenge();
            emit(&mut events, TrickleEvent::ChallengeChanged);
        }

        let due = self.trickle_timer.deadline().unwrap_or(now);
        if self.trickle_timer.poll(now) {
            match self.phase {
                Phase::Transmission => self.on_transmission_point(due, neighbors, link, &mut events),
                Phase::IntervalEnd => match self.begin_interval(due, self.interval_size, rng) {
                    Ok((interval, transmission_point)) => emit(
                        &mut events,
                        TrickleEvent::IntervalStarted {
                            interval,
                            transmission_point,
                        },
                    ),
                    Err(e) => {
                        let interval = self.next_interval_size(self.interval_size);
                        self.enter_interval(due, interval, interval / 2);
                        return Err(e);
                    }
                },
            }
        }
        Ok(events)
    }

    /// Fall back to `Imin` (Rule 6)
    ///
    /// Does nothing when the interval already is `Imin` or the engine is not
    /// running. Explicit resets are never rate limited.
    ///
    /// # Errors
    ///
    /// Returns `Error::RngFailure` if no transmission point could be drawn;
    /// the engine state is then unchanged.
    pub fn reset(&mut self, now: Ticks, rng: &mut impl CryptoRng) -> Result<Option<TrickleEvent>> {
        if !self.config.enabled || !self.is_running() || self.interval_size == self.config.imin {
            return Ok(None);
        }
        let (_, transmission_point) = self.begin_interval(now, self.config.imin / 2, rng)?;
        Ok(Some(TrickleEvent::Reset { transmission_point }))
    }

    /// A neighbor completed key establishment
    ///
    /// Resets once the number of new neighbors this interval reaches a
    /// quarter of the permanent neighbors (at least one). These resets are
    /// limited to `max_consecutive_resets` per `max_reset_rate` window.
    ///
    /// # Errors
    ///
    /// Returns `Error::RngFailure` if a reset could not draw its
    /// transmission point.
    pub fn on_new_neighbor(
        &mut self,
        now: Ticks,
        rng: &mut impl CryptoRng,
        permanent_neighbors: usize,
    ) -> Result<Option<TrickleEvent>> {
        if !self.config.enabled {
            return Ok(None);
        }

        self.new_nbrs = self.new_nbrs.saturating_add(1);
        let threshold = (permanent_neighbors / 4).max(1);
        if usize::from(self.new_nbrs) < threshold
            || !self.is_running()
            || self.interval_size == self.config.imin
        {
            return Ok(None);
        }

        if self.window_resets == 0 || self.window_start.has_elapsed(now, self.config.max_reset_rate) {
            self.window_start = now;
            self.window_resets = 0;
        }
        if self.window_resets >= self.config.max_consecutive_resets {
            return Ok(Some(TrickleEvent::ResetRateLimited));
        }

        let event = self.reset(now, rng)?;
        if event.is_some() {
            self.window_resets += 1;
        }
        Ok(event)
    }

    /// A neighbor sent a fresh authentic HELLO
    ///
    /// Counts each neighbor at most once per interval. Returns `true` if the
    /// redundancy counter was incremented.
    pub fn on_fresh_authentic_hello(&mut self, sender: &mut PermanentState) -> bool {
        if !self.config.enabled || sender.sent_authentic_hello {
            return false;
        }
        sender.sent_authentic_hello = true;
        self.counter = self.counter.saturating_add(1);
        true
    }

    /// Earliest time at which [`poll`](Self::poll) has work to do
    #[must_use]
    pub fn next_deadline(&self) -> Option<Ticks> {
        match (self.trickle_timer.deadline(), self.hello_timer.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Current interval size `I`
    #[must_use]
    pub const fn interval_size(&self) -> u64 {
        self.interval_size
    }

    /// Offset of the transmission point `t` within the interval
    #[must_use]
    pub const fn transmission_point(&self) -> u64 {
        self.transmission_point
    }

    /// Fresh authentic HELLOs heard this interval
    #[must_use]
    pub const fn counter(&self) -> u16 {
        self.counter
    }

    /// Neighbors added this interval
    #[must_use]
    pub const fn new_neighbors(&self) -> u16 {
        self.new_nbrs
    }

    /// Check if the interval timer is armed
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.trickle_timer.is_armed()
    }

    /// Check if HELLOACKs are being awaited
    #[must_use]
    pub const fn is_awaiting_hello_acks(&self) -> bool {
        self.hello_timer.is_armed()
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &TrickleConfig {
        &self.config
    }

    // Rule 4
    fn on_transmission_point<N, L>(
        &mut self,
        at: Ticks,
        neighbors: &mut N,
        link: &mut L,
        events: &mut TrickleEvents,
    ) where
        N: NeighborStore + ?Sized,
        L: LinkLayer + ?Sized,
    {
        if self.counter >= self.config.redundancy_constant {
            emit(events, TrickleEvent::Suppressed { counter: self.counter });
        } else if !self.hello_timer.expired(at) {
            emit(events, TrickleEvent::AwaitingHelloAcks);
        } else {
            match link.broadcast_hello() {
                Ok(()) => {
                    neighbors.for_each_permanent(&mut |_: &LinkAddr, state: &mut PermanentState| {
                        state.sent_authentic_hello = false;
                    });
                    self.hello_timer.set(at, self.config.hello_wait);
                    emit(events, TrickleEvent::HelloBroadcast);
                }
                Err(e) => emit(events, TrickleEvent::HelloFailed(e)),
            }
        }

        self.trickle_timer
            .set(at, self.interval_size.saturating_sub(self.transmission_point));
        self.phase = Phase::IntervalEnd;
    }

    // Rule 5: the interval following one of size `from`
    fn begin_interval(
        &mut self,
        at: Ticks,
        from: u64,
        rng: &mut impl CryptoRng,
    ) -> Result<(u64, u64)> {
        let interval = self.next_interval_size(from);
        let transmission_point = rng.next_in_range(interval / 2, interval)?;
        self.enter_interval(at, interval, transmission_point);
        Ok((interval, transmission_point))
    }

    fn next_interval_size(&self, from: u64) -> u64 {
        from.saturating_mul(2).min(self.config.imax_interval())
    }

    fn enter_interval(&mut self, at: Ticks, interval: u64, transmission_point: u64) {
        self.interval_size = interval;
        self.transmission_point = transmission_point;
        self.new_nbrs = 0;
        self.counter = 0;
        self.trickle_timer.set(at, transmission_point);
        self.phase = Phase::Transmission;
    }
}

fn emit(events: &mut TrickleEvents, event: TrickleEvent) {
    // Capacity covers the most any single operation produces
    let _ = events.push(event);
}
