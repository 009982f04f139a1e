#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic frame timing for entity animations and timed overlays.
//!
//! Nothing here reads the wall clock. Callers hand in timestamps or deltas
//! measured by their render loop, which keeps every state transition
//! reproducible in tests.

use std::time::Duration;

use mipsman_core::{AnimationState, ClientId};

/// Time a single frame stays on screen at the provided playback rate.
///
/// Returns `None` for rates that cannot advance an animation: zero, negative,
/// non-finite, or so small the period does not fit in a [`Duration`].
#[must_use]
pub fn frame_period(speed: f32) -> Option<Duration> {
    if !speed.is_finite() || speed <= 0.0 {
        return None;
    }

    Duration::try_from_secs_f64(1.0 / f64::from(speed)).ok()
}

/// Advances an entity's animation by one render step.
///
/// When the accumulated time has reached the frame period the frame index
/// moves on (wrapping at `frame_count`) and the accumulator resets; otherwise
/// `dt` is added to the accumulator. Frozen animations are left untouched.
/// Returns `true` when the frame index advanced.
pub fn tick(state: &mut AnimationState, frame_count: usize, dt: Duration) -> bool {
    if frame_count == 0 {
        state.frame_index = 0;
        return false;
    }
    state.frame_index %= frame_count;

    let Some(period) = frame_period(state.speed) else {
        return false;
    };

    if state.elapsed >= period {
        state.frame_index = (state.frame_index + 1) % frame_count;
        state.elapsed = Duration::ZERO;
        true
    } else {
        state.elapsed = state.elapsed.saturating_add(dt);
        false
    }
}

/// Derives per-frame deltas from monotonically sampled render timestamps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameClock {
    last_frame: Option<Duration>,
}

impl FrameClock {
    /// Creates a clock that has not observed any frame yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { last_frame: None }
    }

    /// Records a completed frame and returns the time since the previous one.
    ///
    /// The first frame reports a zero delta; timestamps that run backwards
    /// saturate to zero.
    pub fn advance(&mut self, now: Duration) -> Duration {
        let dt = self
            .last_frame
            .map_or(Duration::ZERO, |last| now.saturating_sub(last));
        self.last_frame = Some(now);
        dt
    }

    /// Timestamp of the most recent frame.
    #[must_use]
    pub const fn last_frame(&self) -> Option<Duration> {
        self.last_frame
    }
}

/// Playback parameters of the capture overlay.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureTiming {
    duration: Duration,
    frames: u32,
}

impl CaptureTiming {
    /// Default overlay length.
    pub const DEFAULT_DURATION: Duration = Duration::from_millis(750);

    /// Default number of overlay frames.
    pub const DEFAULT_FRAMES: u32 = 22;

    /// Creates timing parameters; a zero frame count is raised to one.
    #[must_use]
    pub const fn new(duration: Duration, frames: u32) -> Self {
        let frames = if frames == 0 { 1 } else { frames };
        Self { duration, frames }
    }

    /// Total time the overlay stays visible.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Number of frames the overlay is divided into.
    #[must_use]
    pub const fn frames(&self) -> u32 {
        self.frames
    }
}

impl Default for CaptureTiming {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DURATION, Self::DEFAULT_FRAMES)
    }
}

/// Time-bounded overlay shown after the chased role changes hands.
///
/// The render loop queries it every frame; it never blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureOverlay {
    captured: ClientId,
    started_at: Duration,
    timing: CaptureTiming,
}

impl CaptureOverlay {
    /// Starts an overlay for the client that just captured the chased role.
    #[must_use]
    pub const fn start(captured: ClientId, started_at: Duration, timing: CaptureTiming) -> Self {
        Self {
            captured,
            started_at,
            timing,
        }
    }

    /// Client whose entity the overlay shows.
    #[must_use]
    pub const fn captured(&self) -> ClientId {
        self.captured
    }

    /// Timestamp the overlay started at.
    #[must_use]
    pub const fn started_at(&self) -> Duration {
        self.started_at
    }

    /// Whether the overlay is still visible at `now`.
    #[must_use]
    pub fn is_active(&self, now: Duration) -> bool {
        now >= self.started_at && now - self.started_at < self.timing.duration()
    }

    /// Whether the overlay has played out completely by `now`.
    ///
    /// An overlay scheduled in the future has not expired yet.
    #[must_use]
    pub fn has_expired(&self, now: Duration) -> bool {
        now >= self.started_at.saturating_add(self.timing.duration())
    }

    /// Overlay frame number shown at `now`, or `None` outside its window.
    #[must_use]
    pub fn frame_at(&self, now: Duration) -> Option<u32> {
        if !self.is_active(now) {
            return None;
        }

        let elapsed = (now - self.started_at).as_nanos();
        let total = self.timing.duration().as_nanos();
        let frames = u128::from(self.timing.frames());
        let frame = elapsed * frames / total;
        u32::try_from(frame).ok()
    }

    /// Time left before the overlay expires.
    #[must_use]
    pub fn remaining(&self, now: Duration) -> Duration {
        (self.started_at + self.timing.duration()).saturating_sub(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_period_rejects_degenerate_speeds() {
        assert_eq!(frame_period(0.0), None);
        assert_eq!(frame_period(-3.0), None);
        assert_eq!(frame_period(f32::NAN), None);
        assert_eq!(frame_period(f32::INFINITY), None);
        assert_eq!(frame_period(f32::MIN_POSITIVE), None);
        assert_eq!(frame_period(4.0), Some(Duration::from_millis(250)));
    }

    #[test]
    fn empty_sequences_pin_the_index_to_zero() {
        let mut state = AnimationState::new(8.0);
        state.frame_index = 5;

        assert!(!tick(&mut state, 0, Duration::from_secs(1)));
        assert_eq!(state.frame_index, 0);
    }

    #[test]
    fn stale_frame_indices_wrap_into_range() {
        let mut state = AnimationState::new(0.0);
        state.frame_index = 7;

        let _ = tick(&mut state, 3, Duration::ZERO);
        assert_eq!(state.frame_index, 1);
    }

    #[test]
    fn frame_clock_reports_zero_on_first_frame() {
        let mut clock = FrameClock::new();

        assert_eq!(clock.advance(Duration::from_millis(100)), Duration::ZERO);
        assert_eq!(
            clock.advance(Duration::from_millis(116)),
            Duration::from_millis(16)
        );
        assert_eq!(clock.advance(Duration::from_millis(50)), Duration::ZERO);
        assert_eq!(clock.last_frame(), Some(Duration::from_millis(50)));
    }

    #[test]
    fn capture_timing_never_has_zero_frames() {
        assert_eq!(CaptureTiming::new(Duration::from_secs(1), 0).frames(), 1);
    }
}
