// SPDX-License-Identifier: GPL-3.0-only

//! In-process stand-in for the clip playback service
//!
//! Every clip plays for a fixed duration per pass. Pausing freezes the clip
//! clock, disconnecting the client stops every open clip, and an optional
//! fault point makes the service report `Error` part-way through.

use super::{EndBehavior, Playback, PlaybackClient, PlaybackMode, PlaybackState};
use crate::errors::{AppError, AppResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Default)]
struct ServiceState {
    connected: AtomicBool,
    /// Bumped on every disconnect; clips opened under an older session stop
    session: AtomicU64,
}

/// Simulated playback service client
#[derive(Debug, Clone)]
pub struct SimulatedPlaybackClient {
    state: Arc<ServiceState>,
    clip_duration: Duration,
    fail_after: Option<Duration>,
}

impl SimulatedPlaybackClient {
    /// Every clip lasts `clip_duration` per pass
    pub fn new(clip_duration: Duration) -> Self {
        Self {
            state: Arc::new(ServiceState::default()),
            clip_duration,
            fail_after: None,
        }
    }

    /// Report `Error` once a clip has played for `elapsed`
    pub fn fail_after(mut self, elapsed: Duration) -> Self {
        self.fail_after = Some(elapsed);
        self
    }
}

impl PlaybackClient for SimulatedPlaybackClient {
    fn connect(&self) -> AppResult<()> {
        self.state.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn disconnect(&self) {
        if self.state.connected.swap(false, Ordering::SeqCst) {
            self.state.session.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::SeqCst)
    }

    fn create_playback(&self, clip: &Path) -> AppResult<Box<dyn Playback>> {
        if !self.is_connected() {
            return Err(AppError::PlaybackService(
                "not connected to the playback service".to_string(),
            ));
        }
        if !clip.exists() {
            return Err(AppError::PlaybackService(format!(
                "clip not found: {}",
                clip.display()
            )));
        }

        debug!(clip = %clip.display(), "Opening simulated clip");
        Ok(Box::new(SimulatedPlayback {
            service: Arc::clone(&self.state),
            session: self.state.session.load(Ordering::SeqCst),
            clip: clip.to_path_buf(),
            clip_duration: self.clip_duration,
            fail_after: self.fail_after,
            end_behavior: EndBehavior::default(),
            mode: PlaybackMode::default(),
            loop_count: 0,
            started_at: None,
            paused_at: None,
            paused_total: Duration::ZERO,
            stopped: false,
        }))
    }
}

struct SimulatedPlayback {
    service: Arc<ServiceState>,
    session: u64,
    clip: PathBuf,
    clip_duration: Duration,
    fail_after: Option<Duration>,
    end_behavior: EndBehavior,
    mode: PlaybackMode,
    loop_count: u32,
    started_at: Option<Instant>,
    paused_at: Option<Instant>,
    paused_total: Duration,
    stopped: bool,
}

impl SimulatedPlayback {
    fn session_alive(&self) -> bool {
        self.service.connected.load(Ordering::SeqCst)
            && self.service.session.load(Ordering::SeqCst) == self.session
    }

    /// Clip time played so far, excluding pauses
    fn elapsed(&self) -> Duration {
        let Some(started_at) = self.started_at else {
            return Duration::ZERO;
        };
        let now = self.paused_at.unwrap_or_else(Instant::now);
        now.saturating_duration_since(started_at)
            .saturating_sub(self.paused_total)
    }

    fn total_duration(&self) -> Duration {
        match self.mode {
            PlaybackMode::TimingEnabled => self
                .clip_duration
                .saturating_mul(self.loop_count.saturating_add(1)),
            PlaybackMode::TimingDisabled => Duration::ZERO,
        }
    }
}

impl Playback for SimulatedPlayback {
    fn set_end_behavior(&mut self, behavior: EndBehavior) {
        self.end_behavior = behavior;
    }

    fn set_mode(&mut self, mode: PlaybackMode) {
        self.mode = mode;
    }

    fn set_loop_count(&mut self, loop_count: u32) {
        self.loop_count = loop_count;
    }

    fn start(&mut self) -> AppResult<()> {
        if !self.session_alive() {
            return Err(AppError::PlaybackService("service disconnected".to_string()));
        }
        info!(
            clip = %self.clip.display(),
            loops = self.loop_count,
            mode = ?self.mode,
            "Simulated playback started"
        );
        self.started_at = Some(Instant::now());
        self.paused_at = None;
        self.paused_total = Duration::ZERO;
        self.stopped = false;
        Ok(())
    }

    fn pause(&mut self) -> AppResult<()> {
        if self.state() == PlaybackState::Playing {
            self.paused_at = Some(Instant::now());
        }
        Ok(())
    }

    fn resume(&mut self) -> AppResult<()> {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += paused_at.elapsed();
        }
        Ok(())
    }

    fn stop(&mut self) -> AppResult<()> {
        self.stopped = true;
        if !self.session_alive() {
            return Err(AppError::PlaybackService("service disconnected".to_string()));
        }
        Ok(())
    }

    fn state(&self) -> PlaybackState {
        if self.stopped || self.started_at.is_none() || !self.session_alive() {
            return PlaybackState::Stopped;
        }

        let elapsed = self.elapsed();
        if self.fail_after.is_some_and(|at| elapsed >= at) {
            return PlaybackState::Error;
        }
        if elapsed >= self.total_duration() {
            return match self.end_behavior {
                EndBehavior::Stop => PlaybackState::Stopped,
                EndBehavior::Hold => PlaybackState::Paused,
            };
        }
        if self.paused_at.is_some() {
            PlaybackState::Paused
        } else {
            PlaybackState::Playing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn clip_file() -> tempfile::NamedTempFile {
        tempfile::NamedTempFile::new().unwrap()
    }

    #[test]
    fn test_requires_connection() {
        let clip = clip_file();
        let client = SimulatedPlaybackClient::new(Duration::from_millis(50));
        assert!(client.create_playback(clip.path()).is_err());

        client.connect().unwrap();
        assert!(client.create_playback(clip.path()).is_ok());
    }

    #[test]
    fn test_missing_clip() {
        let client = SimulatedPlaybackClient::new(Duration::from_millis(50));
        client.connect().unwrap();
        let result = client.create_playback(Path::new("/nonexistent/clip.xef"));
        assert!(matches!(result, Err(AppError::PlaybackService(_))));
    }

    #[test]
    fn test_plays_then_stops() {
        let clip = clip_file();
        let client = SimulatedPlaybackClient::new(Duration::from_millis(30));
        client.connect().unwrap();
        let mut playback = client.create_playback(clip.path()).unwrap();
        assert_eq!(playback.state(), PlaybackState::Stopped);

        playback.start().unwrap();
        assert_eq!(playback.state(), PlaybackState::Playing);

        thread::sleep(Duration::from_millis(60));
        assert_eq!(playback.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_pause_freezes_clock() {
        let clip = clip_file();
        let client = SimulatedPlaybackClient::new(Duration::from_millis(40));
        client.connect().unwrap();
        let mut playback = client.create_playback(clip.path()).unwrap();
        playback.start().unwrap();
        playback.pause().unwrap();

        thread::sleep(Duration::from_millis(80));
        assert_eq!(playback.state(), PlaybackState::Paused);

        playback.resume().unwrap();
        assert_eq!(playback.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_loop_count_extends_playback() {
        let clip = clip_file();
        let client = SimulatedPlaybackClient::new(Duration::from_millis(30));
        client.connect().unwrap();
        let mut playback = client.create_playback(clip.path()).unwrap();
        playback.set_loop_count(3);
        playback.start().unwrap();

        thread::sleep(Duration::from_millis(50));
        assert_eq!(playback.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_disconnect_stops_clip() {
        let clip = clip_file();
        let client = SimulatedPlaybackClient::new(Duration::from_secs(10));
        client.connect().unwrap();
        let mut playback = client.create_playback(clip.path()).unwrap();
        playback.start().unwrap();

        client.disconnect();
        assert_eq!(playback.state(), PlaybackState::Stopped);

        // A new session does not revive clips from the old one
        client.connect().unwrap();
        assert_eq!(playback.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_fault_injection() {
        let clip = clip_file();
        let client = SimulatedPlaybackClient::new(Duration::from_secs(10))
            .fail_after(Duration::from_millis(10));
        client.connect().unwrap();
        let mut playback = client.create_playback(clip.path()).unwrap();
        playback.start().unwrap();

        thread::sleep(Duration::from_millis(30));
        assert_eq!(playback.state(), PlaybackState::Error);
    }
}
