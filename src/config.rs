// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Stored as JSON in `<config dir>/depth-recorder/config.json`. Missing
//! files and missing fields fall back to defaults; command line flags
//! override individual values.

use crate::constants::{APP_DIR_NAME, JpegQuality, export::DEFAULT_QUEUE_CAPACITY};
use crate::errors::{AppError, AppResult};
use crate::media::DepthScaling;
use crate::pipelines::export::{ExportOptions, ExportStreams, WriterMode};
use crate::storage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Configuration file name inside the application config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory exported frames are written to
    pub output_dir: PathBuf,
    /// Streams exported by `record`
    pub streams: ExportStreams,
    /// JPEG quality of exported color frames
    pub jpeg_quality: JpegQuality,
    /// Out-of-range handling for depth previews
    pub depth_scaling: DepthScaling,
    /// How exported images reach the disk
    pub writer_mode: WriterMode,
    /// Extra passes over a clip after the first one
    pub loop_count: u32,
    /// Playback state poll interval in milliseconds
    pub poll_interval_ms: u64,
    /// Length of one pass of a clip on the simulated playback service
    pub simulated_clip_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: storage::default_output_dir(),
            streams: ExportStreams::default(), // Skeleton table only
            jpeg_quality: JpegQuality::default(),
            depth_scaling: DepthScaling::default(),
            writer_mode: WriterMode::default(),
            loop_count: 0,
            poll_interval_ms: 33,
            simulated_clip_secs: 5,
        }
    }
}

impl Config {
    /// Path of the configuration file
    pub fn path() -> AppResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| AppError::Config("no configuration directory on this system".into()))
    }

    /// Load from the default location
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&contents)?;
        debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Save to the default location
    pub fn save(&self) -> AppResult<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            jpeg_quality: self.jpeg_quality,
            writer_mode: self.writer_mode,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn simulated_clip_duration(&self) -> Duration {
        Duration::from_secs(self.simulated_clip_secs)
    }

    /// Queued writer with the default queue depth
    pub fn queued_writer() -> WriterMode {
        WriterMode::Queued {
            capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}
