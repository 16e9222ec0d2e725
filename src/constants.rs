// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// JPEG quality presets for exported color frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JpegQuality {
    /// Small files, visible artifacts
    Low,
    /// Balanced
    Medium,
    /// Default
    #[default]
    High,
    /// Minimal compression
    Maximum,
}

impl JpegQuality {
    /// Get all preset variants, lowest quality first
    pub const ALL: [JpegQuality; 4] = [
        JpegQuality::Low,
        JpegQuality::Medium,
        JpegQuality::High,
        JpegQuality::Maximum,
    ];

    /// Encoder quality value (1-100)
    pub fn value(&self) -> u8 {
        match self {
            JpegQuality::Low => 60,
            JpegQuality::Medium => 80,
            JpegQuality::High => 92,
            JpegQuality::Maximum => 98,
        }
    }

    /// Get display name for the preset
    pub fn display_name(&self) -> &'static str {
        match self {
            JpegQuality::Low => "Low",
            JpegQuality::Medium => "Medium",
            JpegQuality::High => "High",
            JpegQuality::Maximum => "Maximum",
        }
    }
}

/// Depth sensor constants
pub mod depth {
    /// Far end of the sensor range in millimeters; maps to black in previews
    pub const MAX_RANGE_MM: u16 = 8000;
}

/// Skeleton tracking constants
pub mod body {
    /// Number of joints reported per tracked body
    pub const JOINT_COUNT: usize = 25;

    /// Body slots per frame on the reference sensor
    pub const DEFAULT_BODY_CAPACITY: usize = 6;
}

/// Export file naming
pub mod export {
    /// chrono format for the skeleton CSV filename (`yyyyMMdd_HHmmss`)
    pub const CSV_FILENAME_FORMAT: &str = "%Y%m%d_%H%M%S";

    /// Extension for lossy color frames
    pub const COLOR_EXTENSION: &str = "jpg";

    /// Extension for lossless depth frames
    pub const DEPTH_EXTENSION: &str = "png";

    /// Extension for the skeleton table
    pub const CSV_EXTENSION: &str = "csv";

    /// Default queue depth for the background frame writer
    pub const DEFAULT_QUEUE_CAPACITY: usize = 8;
}

/// Timing constants
pub mod timing {
    use super::Duration;

    /// Playback poll interval, one frame at 30 fps
    pub const PLAYBACK_POLL_INTERVAL: Duration = Duration::from_millis(33);

    /// Sensor frame interval at 30 fps
    pub const FRAME_INTERVAL: Duration = Duration::from_nanos(33_333_300);

    /// Relative time ticks per second (100 ns resolution)
    pub const TICKS_PER_SECOND: u64 = 10_000_000;

    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;
}

/// Reference sensor stream geometry (used by the synthetic sensor)
pub mod sensor {
    /// Color stream width
    pub const COLOR_WIDTH: u32 = 1920;
    /// Color stream height
    pub const COLOR_HEIGHT: u32 = 1080;
    /// Depth and infrared stream width
    pub const DEPTH_WIDTH: u32 = 512;
    /// Depth and infrared stream height
    pub const DEPTH_HEIGHT: u32 = 424;
}

/// Application directory name used under the config and pictures directories
pub const APP_DIR_NAME: &str = "depth-recorder";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jpeg_quality_ordering() {
        let mut prev = 0u8;
        for preset in JpegQuality::ALL {
            assert!(preset.value() > prev, "{:?} out of order", preset);
            assert!(preset.value() <= 100);
            prev = preset.value();
        }
    }

    #[test]
    fn test_poll_interval_matches_frame_rate() {
        assert_eq!(timing::PLAYBACK_POLL_INTERVAL.as_millis(), 33);
    }
}
