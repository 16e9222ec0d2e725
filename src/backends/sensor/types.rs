// SPDX-License-Identifier: GPL-3.0-only

//! Stream descriptors, per-tick frames and skeleton data

use crate::constants::{body::JOINT_COUNT, timing::TICKS_PER_SECOND};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Stream types delivered by the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamKind {
    /// 32-bit BGRA color
    Color,
    /// 16-bit depth in millimeters
    Depth,
    /// 16-bit infrared intensity
    Infrared,
    /// Tracked skeletons
    Body,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Color => write!(f, "color"),
            StreamKind::Depth => write!(f, "depth"),
            StreamKind::Infrared => write!(f, "infrared"),
            StreamKind::Body => write!(f, "body"),
        }
    }
}

/// Geometry of an image stream, read once at session start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: u32,
}

impl StreamDescriptor {
    pub fn new(width: u32, height: u32, bytes_per_pixel: u32) -> Self {
        Self {
            width,
            height,
            bytes_per_pixel,
        }
    }

    /// BGRA color stream
    pub fn bgra(width: u32, height: u32) -> Self {
        Self::new(width, height, 4)
    }

    /// 16-bit single channel stream (depth, infrared)
    pub fn gray16(width: u32, height: u32) -> Self {
        Self::new(width, height, 2)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.width as usize * self.bytes_per_pixel as usize
    }

    /// Total frame size in bytes
    pub fn byte_len(&self) -> usize {
        self.pixel_count() * self.bytes_per_pixel as usize
    }
}

/// Per-frame timestamp relative to the sensor's start, in 100 ns ticks
///
/// Displays as `[d.]hh:mm:ss[.fffffff]`: the day count only when non-zero,
/// seven fractional digits only when there is a sub-second part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RelativeTime(u64);

impl RelativeTime {
    pub const ZERO: RelativeTime = RelativeTime(0);

    pub fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    pub fn ticks(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_nanos(self.0.saturating_mul(100))
    }

    /// Filename form: the display text with `:` and `.` removed
    pub fn sanitized(&self) -> String {
        self.to_string().replace([':', '.'], "")
    }
}

impl From<Duration> for RelativeTime {
    fn from(duration: Duration) -> Self {
        let ticks = duration.as_nanos() / 100;
        Self(u64::try_from(ticks).unwrap_or(u64::MAX))
    }
}

impl fmt::Display for RelativeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_secs = self.0 / TICKS_PER_SECOND;
        let fraction = self.0 % TICKS_PER_SECOND;
        let days = total_secs / 86_400;
        let hours = (total_secs / 3_600) % 24;
        let minutes = (total_secs / 60) % 60;
        let seconds = total_secs % 60;

        if days > 0 {
            write!(f, "{}.", days)?;
        }
        write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds)?;
        if fraction > 0 {
            write!(f, ".{:07}", fraction)?;
        }
        Ok(())
    }
}

/// One frame of image samples as handed over by the sensor
///
/// Color frames carry BGRA bytes (`Frame<u8>`), depth and infrared frames
/// carry 16-bit samples (`Frame<u16>`).
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<T> {
    pub relative_time: RelativeTime,
    pub data: Vec<T>,
}

impl<T> Frame<T> {
    pub fn new(relative_time: RelativeTime, data: Vec<T>) -> Self {
        Self {
            relative_time,
            data,
        }
    }
}

pub type ColorFrame = Frame<u8>;
pub type DepthFrame = Frame<u16>;
pub type InfraredFrame = Frame<u16>;

/// The 25 skeletal joints, in the sensor's enumeration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JointType {
    SpineBase,
    SpineMid,
    Neck,
    Head,
    ShoulderLeft,
    ElbowLeft,
    WristLeft,
    HandLeft,
    ShoulderRight,
    ElbowRight,
    WristRight,
    HandRight,
    HipLeft,
    KneeLeft,
    AnkleLeft,
    FootLeft,
    HipRight,
    KneeRight,
    AnkleRight,
    FootRight,
    SpineShoulder,
    HandTipLeft,
    ThumbLeft,
    HandTipRight,
    ThumbRight,
}

impl JointType {
    /// All joints in enumeration order (also the CSV column order)
    pub const ALL: [JointType; JOINT_COUNT] = [
        JointType::SpineBase,
        JointType::SpineMid,
        JointType::Neck,
        JointType::Head,
        JointType::ShoulderLeft,
        JointType::ElbowLeft,
        JointType::WristLeft,
        JointType::HandLeft,
        JointType::ShoulderRight,
        JointType::ElbowRight,
        JointType::WristRight,
        JointType::HandRight,
        JointType::HipLeft,
        JointType::KneeLeft,
        JointType::AnkleLeft,
        JointType::FootLeft,
        JointType::HipRight,
        JointType::KneeRight,
        JointType::AnkleRight,
        JointType::FootRight,
        JointType::SpineShoulder,
        JointType::HandTipLeft,
        JointType::ThumbLeft,
        JointType::HandTipRight,
        JointType::ThumbRight,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            JointType::SpineBase => "SpineBase",
            JointType::SpineMid => "SpineMid",
            JointType::Neck => "Neck",
            JointType::Head => "Head",
            JointType::ShoulderLeft => "ShoulderLeft",
            JointType::ElbowLeft => "ElbowLeft",
            JointType::WristLeft => "WristLeft",
            JointType::HandLeft => "HandLeft",
            JointType::ShoulderRight => "ShoulderRight",
            JointType::ElbowRight => "ElbowRight",
            JointType::WristRight => "WristRight",
            JointType::HandRight => "HandRight",
            JointType::HipLeft => "HipLeft",
            JointType::KneeLeft => "KneeLeft",
            JointType::AnkleLeft => "AnkleLeft",
            JointType::FootLeft => "FootLeft",
            JointType::HipRight => "HipRight",
            JointType::KneeRight => "KneeRight",
            JointType::AnkleRight => "AnkleRight",
            JointType::FootRight => "FootRight",
            JointType::SpineShoulder => "SpineShoulder",
            JointType::HandTipLeft => "HandTipLeft",
            JointType::ThumbLeft => "ThumbLeft",
            JointType::HandTipRight => "HandTipRight",
            JointType::ThumbRight => "ThumbRight",
        }
    }

    /// Position in [`JointType::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Confidence the sensor assigns to a joint position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackingState {
    #[default]
    NotTracked,
    /// Position estimated from neighbouring joints
    Inferred,
    Tracked,
}

/// Point in camera space, meters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraSpacePoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl CameraSpacePoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Joint {
    pub joint_type: JointType,
    pub position: CameraSpacePoint,
    pub tracking_state: TrackingState,
}

impl Joint {
    pub fn new(joint_type: JointType, position: CameraSpacePoint, state: TrackingState) -> Self {
        Self {
            joint_type,
            position,
            tracking_state: state,
        }
    }

    pub fn not_tracked(joint_type: JointType) -> Self {
        Self::new(joint_type, CameraSpacePoint::default(), TrackingState::NotTracked)
    }

    pub fn is_tracked(&self) -> bool {
        self.tracking_state == TrackingState::Tracked
    }
}

/// One body slot's contents for a tick
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub tracking_id: u64,
    pub is_tracked: bool,
    /// Indexed by [`JointType::index`]
    pub joints: [Joint; JOINT_COUNT],
}

impl Body {
    /// A tracked body with every joint marked not tracked
    pub fn new(tracking_id: u64) -> Self {
        Self {
            tracking_id,
            is_tracked: true,
            joints: JointType::ALL.map(Joint::not_tracked),
        }
    }

    /// A body slot the sensor is not currently tracking
    pub fn untracked() -> Self {
        Self {
            is_tracked: false,
            ..Self::new(0)
        }
    }

    pub fn joint(&self, joint_type: JointType) -> &Joint {
        &self.joints[joint_type.index()]
    }

    pub fn set_joint(&mut self, joint_type: JointType, position: CameraSpacePoint, state: TrackingState) {
        self.joints[joint_type.index()] = Joint::new(joint_type, position, state);
    }
}

/// Body data for one tick: a fixed-capacity array of optional slots
#[derive(Debug, Clone, PartialEq)]
pub struct BodyFrame {
    pub relative_time: RelativeTime,
    pub bodies: Vec<Option<Body>>,
}

impl BodyFrame {
    /// Bodies in occupied slots that the sensor is tracking
    pub fn tracked(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter().flatten().filter(|body| body.is_tracked)
    }
}

/// Everything the sensor delivered for one tick
///
/// Each stream is independently `None` when the sensor had no frame of that
/// type this tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSet {
    pub color: Option<ColorFrame>,
    pub depth: Option<DepthFrame>,
    pub infrared: Option<InfraredFrame>,
    pub body: Option<BodyFrame>,
}
