// SPDX-License-Identifier: GPL-3.0-only

//! Clip playback through the vendor playback service
//!
//! [`PlaybackController`] is driven from the caller's thread. Each `play`
//! spawns a [`PlaybackJob`] thread that connects, opens the clip and polls
//! it until it ends or is stopped.

pub mod controller;
pub mod job;

pub use controller::{PlaybackController, PlayerState};
pub use job::PlaybackJob;
