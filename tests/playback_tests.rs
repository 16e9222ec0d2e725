// SPDX-License-Identifier: MPL-2.0

//! Integration tests for clip playback against the simulated service

use depth_recorder::backends::playback::{PlaybackClient, SimulatedPlaybackClient};
use depth_recorder::{AppError, PlaybackController, PlayerState};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..400 {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn test_full_lifecycle() {
    let clip = tempfile::NamedTempFile::new().unwrap();
    let client = SimulatedPlaybackClient::new(Duration::from_secs(30));
    let mut controller =
        PlaybackController::with_clip(Arc::new(client.clone()), clip.path(), 0).unwrap();
    controller.set_poll_interval(Duration::from_millis(5));
    assert_eq!(controller.state(), PlayerState::Idle);

    controller.play().unwrap();
    assert!(wait_until(|| client.is_connected()));
    assert_eq!(controller.state(), PlayerState::Playing);

    controller.pause();
    assert_eq!(controller.state(), PlayerState::Paused);
    controller.resume();
    assert_eq!(controller.state(), PlayerState::Playing);

    controller.stop().unwrap();
    assert_eq!(controller.state(), PlayerState::Stopped);
    assert!(!client.is_connected());
}

#[test]
fn test_loops_extend_playback() {
    let clip = tempfile::NamedTempFile::new().unwrap();
    let client = SimulatedPlaybackClient::new(Duration::from_millis(40));
    let mut controller =
        PlaybackController::with_clip(Arc::new(client), clip.path(), 2).unwrap();
    controller.set_poll_interval(Duration::from_millis(5));

    controller.play().unwrap();
    thread::sleep(Duration::from_millis(60));
    // One pass is over, the loops keep it going
    assert!(controller.is_running());

    assert!(wait_until(|| !controller.is_running()));
    assert_eq!(controller.state(), PlayerState::Stopped);
    controller.stop().unwrap();
}

#[test]
fn test_missing_clip_fails_job() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.xef");
    let client = SimulatedPlaybackClient::new(Duration::from_secs(1));
    let mut controller =
        PlaybackController::with_clip(Arc::new(client.clone()), &missing, 0).unwrap();

    controller.play().unwrap();
    assert!(wait_until(|| !controller.is_running()));
    assert!(!client.is_connected());
    assert!(matches!(
        controller.stop(),
        Err(AppError::PlaybackService(_))
    ));
}

#[test]
fn test_replay_after_finish() {
    let clip = tempfile::NamedTempFile::new().unwrap();
    let client = SimulatedPlaybackClient::new(Duration::from_millis(80));
    let mut controller =
        PlaybackController::with_clip(Arc::new(client), clip.path(), 0).unwrap();
    controller.set_poll_interval(Duration::from_millis(2));

    controller.play().unwrap();
    assert!(wait_until(|| !controller.is_running()));

    controller.play().unwrap();
    assert_eq!(controller.state(), PlayerState::Playing);
    controller.stop().unwrap();
}
