// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Time utilities
//!
//! Monotonic tick counters, tick-rate conversion and single-shot timers.
//! Timers do not fire on their own: the owner polls them with the current
//! time and re-arms them explicitly.

use core::ops::{Add, Sub};

/// System tick counter (platform-specific resolution)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ticks(u64);

impl Ticks {
    /// Create from raw tick count
    #[must_use]
    pub const fn new(ticks: u64) -> Self {
        Self(ticks)
    }

    /// Get the raw tick count
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Calculate elapsed ticks since this timestamp
    #[must_use]
    pub const fn elapsed(&self, now: Self) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// Check if duration has elapsed since this timestamp
    #[must_use]
    pub const fn has_elapsed(&self, now: Self, duration: u64) -> bool {
        self.elapsed(now) >= duration
    }
}

impl From<u64> for Ticks {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Ticks> for u64 {
    fn from(value: Ticks) -> Self {
        value.0
    }
}

impl Add<u64> for Ticks {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0.saturating_add(rhs))
    }
}

impl Sub<Ticks> for Ticks {
    type Output = u64;

    fn sub(self, rhs: Ticks) -> Self::Output {
        self.0.saturating_sub(rhs.0)
    }
}

/// Tick frequency for converting between ticks and time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickFrequency {
    /// Ticks per second
    hz: u32,
}

impl TickFrequency {
    /// Create from frequency in Hz
    #[must_use]
    pub const fn from_hz(hz: u32) -> Self {
        Self { hz }
    }

    /// 1 kHz (1 tick = 1 millisecond)
    pub const KHZ_1: Self = Self { hz: 1_000 };

    /// 128 Hz, the classic sensor-mote clock
    pub const HZ_128: Self = Self { hz: 128 };

    /// Ticks per second
    #[must_use]
    pub const fn hz(&self) -> u32 {
        self.hz
    }

    /// Convert seconds to ticks
    #[must_use]
    pub const fn secs_to_ticks(&self, secs: u32) -> u64 {
        (secs as u64) * (self.hz as u64)
    }

    /// Convert ticks to whole seconds
    #[must_use]
    pub const fn ticks_to_secs(&self, ticks: u64) -> u64 {
        if self.hz == 0 {
            return 0;
        }
        ticks / (self.hz as u64)
    }

    /// Convert milliseconds to ticks
    #[must_use]
    pub const fn millis_to_ticks(&self, millis: u32) -> u64 {
        ((millis as u64) * (self.hz as u64)) / 1_000
    }
}

/// Single-shot timer
///
/// Armed with [`set`](Self::set), it reports expiry exactly once through
/// [`poll`](Self::poll) and stays disarmed until set again. A stopped or
/// never-armed timer counts as expired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OneShotTimer {
    start: Ticks,
    interval: u64,
    armed: bool,
}

impl OneShotTimer {
    /// Create a disarmed timer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            start: Ticks::new(0),
            interval: 0,
            armed: false,
        }
    }

    /// Arm the timer to expire `interval` ticks after `now`
    pub fn set(&mut self, now: Ticks, interval: u64) {
        self.start = now;
        self.interval = interval;
        self.armed = true;
    }

    /// Disarm the timer
    pub fn stop(&mut self) {
        self.armed = false;
    }

    /// Interval the timer was last armed with
    #[must_use]
    pub const fn interval(&self) -> u64 {
        self.interval
    }

    /// Check if the timer is armed
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Check if the timer has expired (or is not armed)
    #[must_use]
    pub const fn expired(&self, now: Ticks) -> bool {
        !self.armed || self.start.has_elapsed(now, self.interval)
    }

    /// Absolute expiry time, if armed
    #[must_use]
    pub fn deadline(&self) -> Option<Ticks> {
        self.armed.then(|| self.start + self.interval)
    }

    /// Fire the timer if it is armed and due
    ///
    /// Returns `true` exactly once per arming.
    pub fn poll(&mut self, now: Ticks) -> bool {
        if self.armed && self.start.has_elapsed(now, self.interval) {
            self.armed = false;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_elapsed() {
        let start = Ticks::new(100);
        assert_eq!(start.elapsed(Ticks::new(150)), 50);
        assert_eq!(start.elapsed(Ticks::new(50)), 0);
        assert!(start.has_elapsed(Ticks::new(200), 100));
    }

    #[test]
    fn test_frequency_conversion() {
        let freq = TickFrequency::HZ_128;
        assert_eq!(freq.secs_to_ticks(30), 3840);
        assert_eq!(freq.ticks_to_secs(3840), 30);
        assert_eq!(TickFrequency::KHZ_1.millis_to_ticks(250), 250);
    }

    #[test]
    fn test_timer_fires_once() {
        let mut timer = OneShotTimer::new();
        assert!(timer.expired(Ticks::new(0)));

        timer.set(Ticks::new(10), 5);
        assert!(!timer.expired(Ticks::new(14)));
        assert!(!timer.poll(Ticks::new(14)));
        assert!(timer.poll(Ticks::new(15)));
        assert!(!timer.poll(Ticks::new(16)));
        assert!(timer.expired(Ticks::new(16)));
    }

    #[test]
    fn test_timer_stop() {
        let mut timer = OneShotTimer::new();
        timer.set(Ticks::new(0), 100);
        assert_eq!(timer.deadline(), Some(Ticks::new(100)));
        timer.stop();
        assert!(timer.expired(Ticks::new(1)));
        assert!(!timer.poll(Ticks::new(200)));
        assert_eq!(timer.deadline(), None);
    }
}
