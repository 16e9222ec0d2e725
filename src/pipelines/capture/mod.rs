// SPDX-License-Identifier: GPL-3.0-only

//! Frame capture from the sensor
//!
//! - [`buffer`]: fixed-size per-stream frame buffers
//! - [`session`]: the per-tick driver feeding buffers, previews and export

pub mod buffer;
pub mod session;

pub use buffer::{FrameBuffer, IngestOutcome};
pub use session::{CaptureSession, TickReport};
