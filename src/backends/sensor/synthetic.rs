// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic sensor producing a deterministic test pattern
//!
//! Stands in for the vendor SDK when no device is attached, and drives the
//! CLI and tests:
//! - Color: BGRA gradient with a frame-dependent red channel
//! - Depth: horizontal ramp across the sensor range, scrolling per frame
//! - Infrared: checker pattern
//! - Body: one tracked body swaying in place (hand tips and thumbs inferred),
//!   one occupied but untracked slot, remaining slots empty

use super::SensorSource;
use super::types::*;
use crate::constants::{body::DEFAULT_BODY_CAPACITY, depth::MAX_RANGE_MM, sensor};
use crate::errors::AppResult;
use tracing::trace;

/// Ticks between frames at 30 fps
const TICKS_PER_FRAME: u64 = 333_333;

/// Tracking id reported for the synthetic body
pub const SYNTHETIC_TRACKING_ID: u64 = 72_057_594_037_927_936;

/// Synthetic sensor configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSensorConfig {
    pub color: StreamDescriptor,
    pub depth: StreamDescriptor,
    pub infrared: StreamDescriptor,
    pub body_capacity: usize,
    /// Drop the color frame on every Nth tick
    pub drop_color_every: Option<u64>,
}

impl Default for SyntheticSensorConfig {
    fn default() -> Self {
        Self {
            color: StreamDescriptor::bgra(sensor::COLOR_WIDTH, sensor::COLOR_HEIGHT),
            depth: StreamDescriptor::gray16(sensor::DEPTH_WIDTH, sensor::DEPTH_HEIGHT),
            infrared: StreamDescriptor::gray16(sensor::DEPTH_WIDTH, sensor::DEPTH_HEIGHT),
            body_capacity: DEFAULT_BODY_CAPACITY,
            drop_color_every: None,
        }
    }
}

impl SyntheticSensorConfig {
    /// Tiny frames for tests
    pub fn small() -> Self {
        Self {
            color: StreamDescriptor::bgra(8, 6),
            depth: StreamDescriptor::gray16(8, 6),
            infrared: StreamDescriptor::gray16(8, 6),
            ..Self::default()
        }
    }
}

pub struct SyntheticSensor {
    config: SyntheticSensorConfig,
    frame_index: u64,
}

impl SyntheticSensor {
    pub fn new(config: SyntheticSensorConfig) -> Self {
        Self {
            config,
            frame_index: 0,
        }
    }

    /// Number of ticks delivered so far
    pub fn frames_delivered(&self) -> u64 {
        self.frame_index
    }

    fn color_frame(&self, time: RelativeTime) -> ColorFrame {
        let desc = self.config.color;
        let (w, h) = (desc.width.max(1), desc.height.max(1));
        let red = (self.frame_index % 256) as u8;
        let mut data = Vec::with_capacity(desc.byte_len());
        for y in 0..desc.height {
            for x in 0..desc.width {
                let blue = (x * 255 / w) as u8;
                let green = (y * 255 / h) as u8;
                data.extend_from_slice(&[blue, green, red, 255]);
            }
        }
        Frame::new(time, data)
    }

    fn depth_frame(&self, time: RelativeTime) -> DepthFrame {
        let desc = self.config.depth;
        let w = u64::from(desc.width.max(1));
        let mut data = Vec::with_capacity(desc.pixel_count());
        for _y in 0..desc.height {
            for x in 0..desc.width {
                let column = (u64::from(x) + self.frame_index) % w;
                data.push((column * u64::from(MAX_RANGE_MM) / w) as u16);
            }
        }
        Frame::new(time, data)
    }

    fn infrared_frame(&self, time: RelativeTime) -> InfraredFrame {
        let desc = self.config.infrared;
        let mut data = Vec::with_capacity(desc.pixel_count());
        for y in 0..desc.height {
            for x in 0..desc.width {
                let cell = ((x / 8) + (y / 8)) % 2;
                data.push(if cell == 0 { 0x2000 } else { 0xC000 });
            }
        }
        Frame::new(time, data)
    }

    fn body_frame(&self, time: RelativeTime) -> BodyFrame {
        let mut bodies = vec![None; self.config.body_capacity];
        if let Some(slot) = bodies.get_mut(0) {
            *slot = Some(self.swaying_body());
        }
        if let Some(slot) = bodies.get_mut(1) {
            *slot = Some(Body::untracked());
        }
        BodyFrame {
            relative_time: time,
            bodies,
        }
    }

    fn swaying_body(&self) -> Body {
        let sway = 0.05 * (self.frame_index as f32 * 0.1).sin();
        let mut body = Body::new(SYNTHETIC_TRACKING_ID);
        for joint_type in JointType::ALL {
            let (x, y, z) = standing_pose(joint_type);
            let state = match joint_type {
                JointType::HandTipLeft
                | JointType::ThumbLeft
                | JointType::HandTipRight
                | JointType::ThumbRight => TrackingState::Inferred,
                _ => TrackingState::Tracked,
            };
            body.set_joint(joint_type, CameraSpacePoint::new(x + sway, y, z), state);
        }
        body
    }
}

impl Default for SyntheticSensor {
    fn default() -> Self {
        Self::new(SyntheticSensorConfig::default())
    }
}

impl SensorSource for SyntheticSensor {
    fn descriptor(&self, kind: StreamKind) -> Option<StreamDescriptor> {
        match kind {
            StreamKind::Color => Some(self.config.color),
            StreamKind::Depth => Some(self.config.depth),
            StreamKind::Infrared => Some(self.config.infrared),
            StreamKind::Body => None,
        }
    }

    fn body_capacity(&self) -> usize {
        self.config.body_capacity
    }

    fn acquire(&mut self) -> AppResult<Option<FrameSet>> {
        let time = RelativeTime::from_ticks(self.frame_index * TICKS_PER_FRAME);

        let drop_color = self
            .config
            .drop_color_every
            .is_some_and(|n| n > 0 && (self.frame_index + 1) % n == 0);

        let frames = FrameSet {
            color: (!drop_color).then(|| self.color_frame(time)),
            depth: Some(self.depth_frame(time)),
            infrared: Some(self.infrared_frame(time)),
            body: Some(self.body_frame(time)),
        };

        trace!(frame = self.frame_index, time = %time, drop_color, "Synthetic tick");
        self.frame_index += 1;
        Ok(Some(frames))
    }
}

/// Camera-space joint positions for a person standing two meters away
fn standing_pose(joint: JointType) -> (f32, f32, f32) {
    match joint {
        JointType::SpineBase => (0.0, -0.30, 2.0),
        JointType::SpineMid => (0.0, 0.00, 2.0),
        JointType::Neck => (0.0, 0.35, 2.0),
        JointType::Head => (0.0, 0.50, 2.0),
        JointType::ShoulderLeft => (-0.20, 0.30, 2.0),
        JointType::ElbowLeft => (-0.35, 0.05, 2.0),
        JointType::WristLeft => (-0.40, -0.20, 2.0),
        JointType::HandLeft => (-0.42, -0.28, 2.0),
        JointType::ShoulderRight => (0.20, 0.30, 2.0),
        JointType::ElbowRight => (0.35, 0.05, 2.0),
        JointType::WristRight => (0.40, -0.20, 2.0),
        JointType::HandRight => (0.42, -0.28, 2.0),
        JointType::HipLeft => (-0.10, -0.35, 2.0),
        JointType::KneeLeft => (-0.12, -0.80, 2.0),
        JointType::AnkleLeft => (-0.12, -1.20, 2.0),
        JointType::FootLeft => (-0.12, -1.25, 1.9),
        JointType::HipRight => (0.10, -0.35, 2.0),
        JointType::KneeRight => (0.12, -0.80, 2.0),
        JointType::AnkleRight => (0.12, -1.20, 2.0),
        JointType::FootRight => (0.12, -1.25, 1.9),
        JointType::SpineShoulder => (0.0, 0.30, 2.0),
        JointType::HandTipLeft => (-0.43, -0.36, 2.0),
        JointType::ThumbLeft => (-0.38, -0.30, 2.0),
        JointType::HandTipRight => (0.43, -0.36, 2.0),
        JointType::ThumbRight => (0.38, -0.30, 2.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_match_descriptors() {
        let mut sensor = SyntheticSensor::new(SyntheticSensorConfig::small());
        let frames = sensor.acquire().unwrap().unwrap();

        let color = frames.color.unwrap();
        assert_eq!(color.data.len(), sensor.descriptor(StreamKind::Color).unwrap().byte_len());
        let depth = frames.depth.unwrap();
        assert_eq!(depth.data.len(), sensor.descriptor(StreamKind::Depth).unwrap().pixel_count());
        assert!(depth.data.iter().all(|&d| d < MAX_RANGE_MM));
    }

    #[test]
    fn test_relative_time_advances() {
        let mut sensor = SyntheticSensor::new(SyntheticSensorConfig::small());
        let first = sensor.acquire().unwrap().unwrap();
        let second = sensor.acquire().unwrap().unwrap();
        let t0 = first.depth.unwrap().relative_time;
        let t1 = second.depth.unwrap().relative_time;
        assert_eq!(t1.ticks() - t0.ticks(), TICKS_PER_FRAME);
        assert_eq!(sensor.frames_delivered(), 2);
    }

    #[test]
    fn test_drop_color_every() {
        let mut sensor = SyntheticSensor::new(SyntheticSensorConfig {
            drop_color_every: Some(3),
            ..SyntheticSensorConfig::small()
        });
        let present: Vec<bool> = (0..6)
            .map(|_| sensor.acquire().unwrap().unwrap().color.is_some())
            .collect();
        assert_eq!(present, vec![true, true, false, true, true, false]);
    }

    #[test]
    fn test_body_slots() {
        let mut sensor = SyntheticSensor::new(SyntheticSensorConfig::small());
        let body = sensor.acquire().unwrap().unwrap().body.unwrap();
        assert_eq!(body.bodies.len(), DEFAULT_BODY_CAPACITY);
        assert_eq!(body.tracked().count(), 1);

        let tracked = body.tracked().next().unwrap();
        assert!(tracked.joint(JointType::Head).is_tracked());
        assert_eq!(
            tracked.joint(JointType::ThumbLeft).tracking_state,
            TrackingState::Inferred
        );
    }
}
