// SPDX-License-Identifier: MPL-2.0

//! Error types for the capture, export and playback pipelines

use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main error type
///
/// A frame that is missing for the current tick is not an error; it is
/// reported as [`IngestOutcome::FrameUnavailable`](crate::pipelines::capture::IngestOutcome).
#[derive(Debug, Error)]
pub enum AppError {
    /// Export or playback was configured with unusable parameters
    /// (no stream selected, missing output directory, relative clip path)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Sensor-side errors
    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),
    /// The playback service reported an error state or refused a request
    #[error("Playback service error: {0}")]
    PlaybackService(String),
    /// Image encoding failed
    #[error("Encoding failed: {0}")]
    Encoding(String),
    /// Storage/filesystem errors
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
    /// Configuration file errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Sensor-specific errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SensorError {
    /// A frame did not match the size announced by its stream descriptor
    #[error("Frame size mismatch: expected {expected} samples, got {actual}")]
    InvalidFrame { expected: usize, actual: usize },
    /// A buffer was used before a descriptor was applied
    #[error("Frame buffer is not configured")]
    NotConfigured,
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => AppError::Storage(e),
            other => AppError::Encoding(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}
