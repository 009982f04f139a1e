use std::time::Duration;

use mipsman_core::{AnimationState, ClientId};
use mipsman_system_animation::{tick, CaptureOverlay, CaptureTiming};

#[test]
fn zero_deltas_never_advance_the_frame() {
    let mut state = AnimationState::new(12.0);

    for _ in 0..1_000 {
        assert!(!tick(&mut state, 4, Duration::ZERO));
    }

    assert_eq!(state.frame_index, 0);
    assert_eq!(state.elapsed, Duration::ZERO);
}

#[test]
fn one_full_period_advances_exactly_one_frame() {
    let mut state = AnimationState::new(4.0);

    assert!(!tick(&mut state, 4, Duration::from_millis(100)));
    assert!(!tick(&mut state, 4, Duration::from_millis(150)));
    assert_eq!(state.elapsed, Duration::from_millis(250));
    assert_eq!(state.frame_index, 0);

    assert!(tick(&mut state, 4, Duration::from_millis(16)));
    assert_eq!(state.frame_index, 1);
    assert_eq!(state.elapsed, Duration::ZERO);

    assert!(!tick(&mut state, 4, Duration::ZERO));
    assert_eq!(state.frame_index, 1);
}

#[test]
fn frame_index_wraps_at_sequence_length() {
    let mut state = AnimationState::new(10.0);
    state.frame_index = 2;
    state.elapsed = Duration::from_millis(100);

    assert!(tick(&mut state, 3, Duration::ZERO));
    assert_eq!(state.frame_index, 0);
}

#[test]
fn zero_speed_freezes_the_animation() {
    let mut state = AnimationState::new(0.0);
    state.frame_index = 1;

    for _ in 0..10 {
        assert!(!tick(&mut state, 4, Duration::from_secs(5)));
    }

    assert_eq!(state.frame_index, 1);
    assert_eq!(state.elapsed, Duration::ZERO);
}

#[test]
fn capture_overlay_is_bounded_in_time() {
    let started = Duration::from_secs(10);
    let overlay = CaptureOverlay::start(ClientId::new(2), started, CaptureTiming::default());

    assert!(!overlay.is_active(Duration::from_secs(9)));
    assert!(overlay.is_active(started));
    assert!(overlay.is_active(started + Duration::from_millis(749)));
    assert!(!overlay.is_active(started + Duration::from_millis(750)));
    assert_eq!(
        overlay.remaining(started + Duration::from_millis(500)),
        Duration::from_millis(250)
    );
    assert_eq!(overlay.remaining(started + Duration::from_secs(2)), Duration::ZERO);
}

#[test]
fn capture_overlay_frames_cover_the_whole_sequence() {
    let timing = CaptureTiming::new(Duration::from_millis(220), 22);
    let overlay = CaptureOverlay::start(ClientId::new(1), Duration::ZERO, timing);

    assert_eq!(overlay.frame_at(Duration::ZERO), Some(0));
    assert_eq!(overlay.frame_at(Duration::from_millis(10)), Some(1));
    assert_eq!(overlay.frame_at(Duration::from_millis(219)), Some(21));
    assert_eq!(overlay.frame_at(Duration::from_millis(220)), None);
}

#[test]
fn scheduled_overlay_is_pending_until_it_starts() {
    let started = Duration::from_millis(20);
    let overlay = CaptureOverlay::start(ClientId::new(1), started, CaptureTiming::default());

    assert_eq!(overlay.started_at(), started);
    assert_eq!(overlay.frame_at(Duration::from_millis(16)), None);
    assert!(!overlay.has_expired(Duration::from_millis(16)));
    assert!(!overlay.has_expired(started + Duration::from_millis(749)));
    assert!(overlay.has_expired(started + Duration::from_millis(750)));
}
