// SPDX-License-Identifier: MPL-2.0

//! Depth Recorder - frame capture, export and clip playback for depth cameras
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: Sensor and playback service boundaries, with synthetic stand-ins
//! - [`media`]: Stream-to-image conversion and still-image encoding
//! - [`pipelines`]: Capture session, frame export and playback control
//! - [`config`]: User configuration handling
//! - [`storage`]: Output locations and file naming
//!
//! # Example
//!
//! ```no_run
//! use depth_recorder::backends::sensor::{SyntheticSensor, SyntheticSensorConfig};
//! use depth_recorder::pipelines::capture::CaptureSession;
//! use depth_recorder::pipelines::export::ExportStreams;
//!
//! # fn main() -> depth_recorder::AppResult<()> {
//! let mut session = CaptureSession::new(SyntheticSensor::new(SyntheticSensorConfig::small()));
//! session
//!     .exporter_mut()
//!     .start(std::path::Path::new("/tmp/out"), ExportStreams::ALL)?;
//! for _ in 0..30 {
//!     session.tick()?;
//! }
//! session.exporter_mut().stop()?;
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod media;
pub mod pipelines;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use errors::{AppError, AppResult, SensorError};
pub use pipelines::capture::CaptureSession;
pub use pipelines::export::{ExportStreams, FrameExporter};
pub use pipelines::playback::{PlaybackController, PlayerState};
