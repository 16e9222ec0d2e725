// SPDX-License-Identifier: MPL-2.0

//! Sensor boundary
//!
//! The vendor SDK owns device discovery and frame acquisition. This module
//! describes what the capture pipeline needs from it:
//!
//! ```text
//! ┌─────────────────────┐
//! │   CaptureSession    │  ← per-tick driver
//! └──────────┬──────────┘
//!            │ acquire()
//!            ▼
//! ┌─────────────────────┐
//! │ SensorSource trait  │  ← descriptors + per-tick FrameSet
//! └──────────┬──────────┘
//!            │
//!      ┌─────┴──────┐
//!      │ vendor SDK │  Synthetic (test pattern)
//!      └────────────┘
//! ```

pub mod synthetic;
pub mod types;

pub use synthetic::{SyntheticSensor, SyntheticSensorConfig};
pub use types::*;

use crate::errors::AppResult;

/// A source of synchronized frame ticks
///
/// Frames are delivered serially; a source is driven from a single thread.
pub trait SensorSource: Send {
    /// Geometry of an image stream, or `None` if the sensor lacks it
    ///
    /// Always `None` for [`StreamKind::Body`].
    fn descriptor(&self, kind: StreamKind) -> Option<StreamDescriptor>;

    /// Number of body slots in every body frame
    fn body_capacity(&self) -> usize;

    /// Acquire the next tick
    ///
    /// `Ok(None)` means nothing arrived this tick. Individual streams inside
    /// the returned set may still be missing.
    fn acquire(&mut self) -> AppResult<Option<FrameSet>>;
}

impl<S: SensorSource + ?Sized> SensorSource for Box<S> {
    fn descriptor(&self, kind: StreamKind) -> Option<StreamDescriptor> {
        (**self).descriptor(kind)
    }

    fn body_capacity(&self) -> usize {
        (**self).body_capacity()
    }

    fn acquire(&mut self) -> AppResult<Option<FrameSet>> {
        (**self).acquire()
    }
}
