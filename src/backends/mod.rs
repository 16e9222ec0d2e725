// SPDX-License-Identifier: MPL-2.0

//! Boundaries to the vendor sensor SDK and playback service
//!
//! - [`sensor`]: stream descriptors, per-tick frame sets and the
//!   [`SensorSource`](sensor::SensorSource) trait, plus a synthetic sensor
//! - [`playback`]: the clip playback service traits, plus a simulated service

pub mod playback;
pub mod sensor;
