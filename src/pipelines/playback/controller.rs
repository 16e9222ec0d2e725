// SPDX-License-Identifier: GPL-3.0-only

//! Caller-facing playback controls
//!
//! ```text
//! Idle ──play──▶ Playing ◀──resume/pause──▶ Paused
//!                   │                          │
//!                   └────── stop / clip end ───┴──▶ Stopped ──clip(new)──▶ Idle
//! ```

use super::job::PlaybackJob;
use crate::backends::playback::PlaybackClient;
use crate::constants::timing::PLAYBACK_POLL_INTERVAL;
use crate::errors::{AppError, AppResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Controller state as seen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    /// Nothing played since the clip was set
    #[default]
    Idle,
    Playing,
    Paused,
    /// The last job ended (stopped, finished or failed)
    Stopped,
}

/// Plays one clip at a time on the playback service
pub struct PlaybackController {
    client: Arc<dyn PlaybackClient>,
    clip: Option<PathBuf>,
    loop_count: u32,
    poll_interval: Duration,
    job: Option<PlaybackJob>,
    has_played: bool,
}

impl PlaybackController {
    pub fn new(client: Arc<dyn PlaybackClient>) -> Self {
        Self {
            client,
            clip: None,
            loop_count: 0,
            poll_interval: PLAYBACK_POLL_INTERVAL,
            job: None,
            has_played: false,
        }
    }

    /// Controller with a clip already selected
    pub fn with_clip(
        client: Arc<dyn PlaybackClient>,
        clip: &Path,
        loop_count: u32,
    ) -> AppResult<Self> {
        let mut controller = Self::new(client);
        controller.clip(clip, loop_count)?;
        Ok(controller)
    }

    /// Interval between state polls of the running job
    pub fn set_poll_interval(&mut self, interval: Duration) {
        self.poll_interval = interval;
    }

    pub fn current_clip(&self) -> Option<&Path> {
        self.clip.as_deref()
    }

    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    /// Select the clip to play
    ///
    /// A different path stops the running job first; the same path only
    /// updates the loop count used by the next `play`.
    pub fn clip(&mut self, path: &Path, loop_count: u32) -> AppResult<()> {
        if !path.is_absolute() {
            return Err(AppError::InvalidConfiguration(format!(
                "clip path must be absolute: {}",
                path.display()
            )));
        }

        if self.clip.as_deref() != Some(path) {
            if let Err(e) = self.stop() {
                warn!(error = %e, "Previous clip ended with error");
            }
            debug!(clip = %path.display(), "Clip selected");
            self.clip = Some(path.to_path_buf());
            self.has_played = false;
        }
        self.loop_count = loop_count;
        Ok(())
    }

    /// Start the selected clip, or resume it when already running
    ///
    /// Does nothing without a clip.
    pub fn play(&mut self) -> AppResult<()> {
        let Some(clip) = self.clip.clone() else {
            debug!("No clip selected, ignoring play");
            return Ok(());
        };

        if self.is_running() {
            self.resume();
            return Ok(());
        }

        // Reap a job that ended on its own
        if let Some(mut finished) = self.job.take() {
            if let Err(e) = finished.join() {
                warn!(error = %e, "Previous playback ended with error");
            }
        }

        let job = PlaybackJob::start(
            Arc::clone(&self.client),
            &clip,
            self.loop_count,
            self.poll_interval,
        )?;
        self.job = Some(job);
        self.has_played = true;
        Ok(())
    }

    /// Pause the running job; no effect without one
    pub fn pause(&mut self) {
        if let Some(job) = self.job.as_ref().filter(|j| j.is_running()) {
            info!("Pausing playback");
            job.set_paused(true);
        }
    }

    /// Resume the running job; no effect without one
    pub fn resume(&mut self) {
        if let Some(job) = self.job.as_ref().filter(|j| j.is_running()) {
            info!("Resuming playback");
            job.set_paused(false);
        }
    }

    /// Stop playback and wait for the job thread to exit
    ///
    /// Returns the error the job ran into, if any.
    pub fn stop(&mut self) -> AppResult<()> {
        let Some(mut job) = self.job.take() else {
            return Ok(());
        };

        info!(clip = %job.clip().display(), "Stopping playback");
        job.request_stop();
        self.client.disconnect();
        job.join()
    }

    pub fn is_running(&self) -> bool {
        self.job.as_ref().is_some_and(|j| j.is_running())
    }

    pub fn state(&self) -> PlayerState {
        match &self.job {
            Some(job) if job.is_running() => {
                if job.is_paused() {
                    PlayerState::Paused
                } else {
                    PlayerState::Playing
                }
            }
            _ if self.has_played => PlayerState::Stopped,
            _ => PlayerState::Idle,
        }
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!(error = %e, "Playback ended with error");
        }
    }
}
