// SPDX-License-Identifier: GPL-3.0-only
//! Background thread driving one clip on the playback service
//!
//! The thread owns the service connection and the open clip. It shares only
//! two atomic flags with the controller: `pause` is reconciled with the clip
//! on every poll, `stop` ends the poll loop.

use crate::backends::playback::{
    EndBehavior, Playback, PlaybackClient, PlaybackMode, PlaybackState, ServiceConnection,
};
use crate::errors::{AppError, AppResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Handle to a running playback thread
pub struct PlaybackJob {
    clip: PathBuf,
    thread_handle: Option<JoinHandle<AppResult<()>>>,
    stop_signal: Arc<AtomicBool>,
    pause_signal: Arc<AtomicBool>,
}

impl PlaybackJob {
    /// Spawn the playback thread for `clip`
    pub fn start(
        client: Arc<dyn PlaybackClient>,
        clip: &Path,
        loop_count: u32,
        poll_interval: Duration,
    ) -> AppResult<Self> {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let pause_signal = Arc::new(AtomicBool::new(false));

        let stop = Arc::clone(&stop_signal);
        let pause = Arc::clone(&pause_signal);
        let clip_path = clip.to_path_buf();

        info!(clip = %clip.display(), loop_count, "Starting playback job");

        let thread_handle = thread::Builder::new()
            .name("playback".to_string())
            .spawn(move || {
                debug!("Playback thread started");
                let result = run(
                    client.as_ref(),
                    &clip_path,
                    loop_count,
                    &stop,
                    &pause,
                    poll_interval,
                );
                match &result {
                    Ok(()) => info!("Playback thread exiting"),
                    Err(e) => warn!(error = %e, "Playback thread exiting with error"),
                }
                result
            })?;

        Ok(Self {
            clip: clip.to_path_buf(),
            thread_handle: Some(thread_handle),
            stop_signal,
            pause_signal,
        })
    }

    pub fn clip(&self) -> &Path {
        &self.clip
    }

    /// Check if the thread is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    pub fn is_paused(&self) -> bool {
        self.pause_signal.load(Ordering::SeqCst)
    }

    pub fn set_paused(&self, paused: bool) {
        self.pause_signal.store(paused, Ordering::SeqCst);
    }

    /// Signal the loop to stop (non-blocking)
    pub fn request_stop(&self) {
        debug!(clip = %self.clip.display(), "Requesting playback stop");
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Stop the loop and wait for the thread to finish
    ///
    /// Returns the thread's result. Calling it again returns `Ok(())`.
    pub fn stop(&mut self) -> AppResult<()> {
        self.request_stop();
        self.join()
    }

    /// Wait for the thread to finish without sending the stop signal
    pub fn join(&mut self) -> AppResult<()> {
        let Some(handle) = self.thread_handle.take() else {
            return Ok(());
        };
        debug!(clip = %self.clip.display(), "Waiting for playback thread to finish");
        match handle.join() {
            Ok(result) => result,
            Err(e) => {
                warn!("Playback thread panicked: {:?}", e);
                Err(AppError::PlaybackService(
                    "playback thread panicked".to_string(),
                ))
            }
        }
    }
}

impl Drop for PlaybackJob {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!("PlaybackJob dropped, stopping thread");
            if let Err(e) = self.stop() {
                warn!(error = %e, "Playback job ended with error");
            }
        }
    }
}

/// Body of the playback thread
///
/// Failures raised after the stop signal end the job with `Ok(())`.
fn run(
    client: &dyn PlaybackClient,
    clip: &Path,
    loop_count: u32,
    stop: &AtomicBool,
    pause: &AtomicBool,
    poll_interval: Duration,
) -> AppResult<()> {
    if stop.load(Ordering::SeqCst) {
        return Ok(());
    }

    match play_clip(client, clip, loop_count, stop, pause, poll_interval) {
        Err(e) if stop.load(Ordering::SeqCst) => {
            debug!(error = %e, "Ignoring error raised while stopping");
            Ok(())
        }
        result => result,
    }
}

/// Open, configure and drive one clip until it ends or `stop` is raised
///
/// The connection guard is declared first, so the clip is released before
/// the service is disconnected on every return path.
fn play_clip(
    client: &dyn PlaybackClient,
    clip: &Path,
    loop_count: u32,
    stop: &AtomicBool,
    pause: &AtomicBool,
    poll_interval: Duration,
) -> AppResult<()> {
    let connection = ServiceConnection::open(client)?;
    let mut playback = connection.client().create_playback(clip)?;

    playback.set_end_behavior(EndBehavior::Stop);
    playback.set_mode(PlaybackMode::TimingEnabled);
    playback.set_loop_count(loop_count);
    playback.start()?;

    let result = poll_until_done(playback.as_mut(), stop, pause, poll_interval);

    if let Err(e) = playback.stop() {
        debug!(error = %e, "Ignoring error while stopping clip");
    }
    result
}

/// Poll the clip, reconciling the pause request with the reported state
fn poll_until_done(
    playback: &mut dyn Playback,
    stop: &AtomicBool,
    pause: &AtomicBool,
    poll_interval: Duration,
) -> AppResult<()> {
    loop {
        if stop.load(Ordering::SeqCst) {
            debug!("Stop signal received");
            break;
        }

        let state = playback.state();
        if !state.is_active() {
            if state == PlaybackState::Stopped {
                debug!("Clip finished");
            }
            break;
        }

        let want_pause = pause.load(Ordering::SeqCst);
        if want_pause && state == PlaybackState::Playing {
            playback.pause()?;
        } else if !want_pause && state == PlaybackState::Paused {
            playback.resume()?;
        }

        thread::sleep(poll_interval);
    }

    if playback.state() == PlaybackState::Error {
        return Err(AppError::PlaybackService(
            "playback service reported an error".to_string(),
        ));
    }
    Ok(())
}
