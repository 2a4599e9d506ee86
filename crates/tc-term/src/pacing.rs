// SPDX-License-Identifier: MIT
//
// Frame pacing.
//
// The pacer does not own a clock. The engine hands it the backend's notion
// of "now" at frame start and frame end, and gets back how long to sleep.
// Real terminals feed it a monotonic clock; the headless backend feeds it a
// virtual one, which keeps pacing deterministic under test.
//
// Safety: `sleep` calls nanosleep(2) on unix to resume after EINTR with the
// remaining time. The call is a single FFI line.
#![allow(unsafe_code)]

use std::time::Duration;

/// Turns a frames-per-second target into per-frame sleeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FramePacer {
    target: Option<Duration>,
    frame_start: Duration,
}

impl FramePacer {
    /// An unlimited pacer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            target: None,
            frame_start: Duration::ZERO,
        }
    }

    /// Set the target rate. `fps <= 0` removes the limit.
    pub fn set_target_fps(&mut self, fps: i32) {
        self.target = u64::try_from(fps)
            .ok()
            .filter(|&n| n > 0)
            .map(|n| Duration::from_micros(1_000_000 / n));
    }

    /// Target frame duration, or `None` when unlimited.
    #[inline]
    #[must_use]
    pub const fn target(&self) -> Option<Duration> {
        self.target
    }

    /// Record the start of a frame.
    #[inline]
    pub const fn begin(&mut self, now: Duration) {
        self.frame_start = now;
    }

    /// How long to sleep at `now` to finish the frame on target.
    ///
    /// `None` when unlimited or when the frame already ran long.
    #[must_use]
    pub fn remaining(&self, now: Duration) -> Option<Duration> {
        let target = self.target?;
        let elapsed = now.saturating_sub(self.frame_start);
        target.checked_sub(elapsed).filter(|d| !d.is_zero())
    }
}

// ─── Sleeping ────────────────────────────────────────────────────────────────

/// Sleep for `duration`, resuming with the remaining time if a signal
/// interrupts the sleep.
#[cfg(unix)]
pub fn sleep(duration: Duration) {
    let mut req = libc::timespec {
        tv_sec: libc::time_t::try_from(duration.as_secs()).unwrap_or(libc::time_t::MAX),
        // Always below 1e9, fits every platform's tv_nsec.
        tv_nsec: duration.subsec_nanos().try_into().unwrap_or(0),
    };
    let mut rem = libc::timespec { tv_sec: 0, tv_nsec: 0 };

    loop {
        let rc = unsafe { libc::nanosleep(&raw const req, &raw mut rem) };
        if rc == 0 {
            return;
        }
        if std::io::Error::last_os_error().raw_os_error() != Some(libc::EINTR) {
            log::warn!("nanosleep failed: {}", std::io::Error::last_os_error());
            return;
        }
        req = rem;
    }
}

#[cfg(not(unix))]
pub fn sleep(duration: Duration) {
    std::thread::sleep(duration);
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn unlimited_by_default() {
        let p = FramePacer::new();
        assert_eq!(p.target(), None);
        assert_eq!(p.remaining(ms(0)), None);
    }

    #[test]
    fn target_is_micros_per_frame() {
        let mut p = FramePacer::new();
        p.set_target_fps(10);
        assert_eq!(p.target(), Some(ms(100)));
        p.set_target_fps(60);
        assert_eq!(p.target(), Some(Duration::from_micros(16_666)));
    }

    #[test]
    fn zero_and_negative_are_unlimited() {
        let mut p = FramePacer::new();
        p.set_target_fps(30);
        p.set_target_fps(0);
        assert_eq!(p.target(), None);
        p.set_target_fps(-5);
        assert_eq!(p.target(), None);
    }

    #[test]
    fn remaining_subtracts_elapsed() {
        let mut p = FramePacer::new();
        p.set_target_fps(10);
        p.begin(ms(1_000));
        assert_eq!(p.remaining(ms(1_030)), Some(ms(70)));
    }

    #[test]
    fn overlong_frame_does_not_sleep() {
        let mut p = FramePacer::new();
        p.set_target_fps(10);
        p.begin(ms(0));
        assert_eq!(p.remaining(ms(100)), None);
        assert_eq!(p.remaining(ms(250)), None);
    }

    #[test]
    fn clock_going_backwards_is_treated_as_zero_elapsed() {
        let mut p = FramePacer::new();
        p.set_target_fps(10);
        p.begin(ms(500));
        assert_eq!(p.remaining(ms(400)), Some(ms(100)));
    }

    #[test]
    fn sleep_waits_at_least_duration() {
        let start = std::time::Instant::now();
        sleep(ms(5));
        assert!(start.elapsed() >= ms(5));
    }
}
