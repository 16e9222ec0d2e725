// SPDX-License-Identifier: MPL-2.0

//! Playback service boundary
//!
//! Recorded clips are replayed by a separate vendor service. The controller
//! in [`crate::pipelines::playback`] only needs to connect, open a clip,
//! configure it, drive it and poll its state.

pub mod simulated;

pub use simulated::SimulatedPlaybackClient;

use crate::errors::AppResult;
use std::path::Path;
use tracing::debug;

/// State reported by the service for an open clip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Stopped,
    Error,
}

impl PlaybackState {
    /// Playing or paused
    pub fn is_active(&self) -> bool {
        matches!(self, PlaybackState::Playing | PlaybackState::Paused)
    }
}

/// What the service does once the last loop finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndBehavior {
    /// Report `Stopped`
    #[default]
    Stop,
    /// Stay paused on the last frame
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackMode {
    /// Frames are released at their recorded pace
    #[default]
    TimingEnabled,
    /// Frames are released as fast as consumers take them
    TimingDisabled,
}

/// An open clip on the playback service
pub trait Playback: Send {
    fn set_end_behavior(&mut self, behavior: EndBehavior);

    fn set_mode(&mut self, mode: PlaybackMode);

    /// Number of extra passes after the first one
    fn set_loop_count(&mut self, loop_count: u32);

    fn start(&mut self) -> AppResult<()>;

    fn pause(&mut self) -> AppResult<()>;

    fn resume(&mut self) -> AppResult<()>;

    fn stop(&mut self) -> AppResult<()>;

    fn state(&self) -> PlaybackState;
}

/// Client connection to the playback service
///
/// Methods take `&self`: the controller disconnects from the caller's thread
/// while the job thread is still polling.
pub trait PlaybackClient: Send + Sync {
    fn connect(&self) -> AppResult<()>;

    /// Idempotent
    fn disconnect(&self);

    fn is_connected(&self) -> bool;

    /// Open a clip by absolute path; requires a connection
    fn create_playback(&self, clip: &Path) -> AppResult<Box<dyn Playback>>;
}

/// Service connection held for the lifetime of a playback job
///
/// Disconnects when dropped, so every exit path of the job (including an
/// error state raised by the service) releases the connection.
pub struct ServiceConnection<'a> {
    client: &'a dyn PlaybackClient,
}

impl<'a> ServiceConnection<'a> {
    pub fn open(client: &'a dyn PlaybackClient) -> AppResult<Self> {
        client.connect()?;
        debug!("Connected to playback service");
        Ok(Self { client })
    }

    pub fn client(&self) -> &dyn PlaybackClient {
        self.client
    }
}

impl Drop for ServiceConnection<'_> {
    fn drop(&mut self) {
        self.client.disconnect();
        debug!("Disconnected from playback service");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_connection_released_on_drop() {
        let client = SimulatedPlaybackClient::new(Duration::from_secs(1));
        {
            let connection = ServiceConnection::open(&client).unwrap();
            assert!(connection.client().is_connected());
        }
        assert!(!client.is_connected());
    }

    #[test]
    fn test_active_states() {
        assert!(PlaybackState::Playing.is_active());
        assert!(PlaybackState::Paused.is_active());
        assert!(!PlaybackState::Stopped.is_active());
        assert!(!PlaybackState::Error.is_active());
    }
}
