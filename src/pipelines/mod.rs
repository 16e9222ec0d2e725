// SPDX-License-Identifier: MPL-2.0

//! Capture, export and playback pipelines
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌───────────────────┐
//! │ SensorSource │ ──▶ │  CaptureSession   │ ──▶ │  FrameExporter    │
//! │  (FrameSet)  │     │  - frame buffers  │     │  - JPEG / PNG     │
//! │              │     │  - previews       │     │  - skeleton CSV   │
//! └──────────────┘     └───────────────────┘     └───────────────────┘
//!
//! ┌──────────────────────┐     ┌──────────────┐     ┌──────────────────┐
//! │ PlaybackController   │ ──▶ │ PlaybackJob  │ ──▶ │ PlaybackClient   │
//! │  (caller's thread)   │     │  (thread)    │     │  (service)       │
//! └──────────────────────┘     └──────────────┘     └──────────────────┘
//! ```
//!
//! - [`capture`]: frame buffers and the per-tick capture driver
//! - [`export`]: image and skeleton table export
//! - [`playback`]: clip playback controls

pub mod capture;
pub mod export;
pub mod playback;
