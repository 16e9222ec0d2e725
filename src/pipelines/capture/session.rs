// SPDX-License-Identifier: GPL-3.0-only

//! Per-tick capture driver
//!
//! Pulls one [`FrameSet`] from the sensor per tick, copies each stream into
//! its frame buffer and hands the set to the exporter while it records.
//! Everything runs on the caller's thread; ticks never overlap.

use super::buffer::{FrameBuffer, IngestOutcome};
use crate::backends::sensor::{Body, BodyFrame, RelativeTime, SensorSource, StreamKind};
use crate::constants::timing::FRAME_LOG_INTERVAL;
use crate::errors::AppResult;
use crate::media::format_converters::{
    DepthScaling, Gray16Image, bgra_to_rgba_image, depth_to_gray_image, infrared_to_gray16_image,
};
use crate::pipelines::export::{ExportOptions, FrameExporter, StreamLayout, WriteReport};
use image::{GrayImage, RgbaImage};
use tracing::{debug, info, trace};

/// Outcome of one [`CaptureSession::tick`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Relative time of the newest frame in the set
    pub relative_time: Option<RelativeTime>,
    pub color: IngestOutcome,
    pub depth: IngestOutcome,
    pub infrared: IngestOutcome,
    /// Bodies tracked in this tick's body frame
    pub tracked_bodies: usize,
    /// Present while the exporter is recording
    pub export: Option<WriteReport>,
}

impl TickReport {
    /// True when the sensor delivered nothing at all
    pub fn is_empty(&self) -> bool {
        self.relative_time.is_none()
    }
}

/// Capture session bound to one sensor
pub struct CaptureSession<S: SensorSource> {
    sensor: S,
    color: FrameBuffer<u8>,
    depth: FrameBuffer<u16>,
    infrared: FrameBuffer<u16>,
    bodies: BodyFrame,
    depth_scaling: DepthScaling,
    exporter: FrameExporter,
    ticks: u64,
}

impl<S: SensorSource> CaptureSession<S> {
    pub fn new(sensor: S) -> Self {
        Self::with_options(sensor, ExportOptions::default(), DepthScaling::default())
    }

    /// Read stream descriptors from the sensor and size every buffer
    pub fn with_options(sensor: S, export: ExportOptions, depth_scaling: DepthScaling) -> Self {
        let color_desc = sensor.descriptor(StreamKind::Color);
        let depth_desc = sensor.descriptor(StreamKind::Depth);
        let infrared_desc = sensor.descriptor(StreamKind::Infrared);

        let mut color = FrameBuffer::new();
        let mut depth = FrameBuffer::new();
        let mut infrared = FrameBuffer::new();
        if let Some(desc) = color_desc {
            color.configure(desc);
        }
        if let Some(desc) = depth_desc {
            depth.configure(desc);
        }
        if let Some(desc) = infrared_desc {
            infrared.configure(desc);
        }

        let body_capacity = sensor.body_capacity();
        info!(
            color = ?color_desc,
            depth = ?depth_desc,
            infrared = ?infrared_desc,
            body_capacity,
            "Capture session configured"
        );

        let exporter = FrameExporter::new(
            StreamLayout {
                color: color_desc,
                depth: depth_desc,
            },
            export,
        );

        Self {
            sensor,
            color,
            depth,
            infrared,
            bodies: BodyFrame {
                relative_time: RelativeTime::ZERO,
                bodies: vec![None; body_capacity],
            },
            depth_scaling,
            exporter,
            ticks: 0,
        }
    }

    /// Acquire and process one tick
    pub fn tick(&mut self) -> AppResult<TickReport> {
        let Some(frames) = self.sensor.acquire()? else {
            trace!("Sensor delivered nothing this tick");
            return Ok(TickReport::default());
        };
        self.ticks += 1;

        let mut report = TickReport {
            relative_time: [
                frames.color.as_ref().map(|f| f.relative_time),
                frames.depth.as_ref().map(|f| f.relative_time),
                frames.infrared.as_ref().map(|f| f.relative_time),
                frames.body.as_ref().map(|f| f.relative_time),
            ]
            .into_iter()
            .flatten()
            .max(),
            ..TickReport::default()
        };

        report.color = self
            .color
            .ingest(frames.color.as_ref().map(|f| f.data.as_slice()))?;
        report.depth = self
            .depth
            .ingest(frames.depth.as_ref().map(|f| f.data.as_slice()))?;
        report.infrared = self
            .infrared
            .ingest(frames.infrared.as_ref().map(|f| f.data.as_slice()))?;

        if let Some(body_frame) = &frames.body {
            self.bodies.relative_time = body_frame.relative_time;
            self.bodies.bodies.clone_from(&body_frame.bodies);
            report.tracked_bodies = self.bodies.tracked().count();
        }

        if self.exporter.is_recording() {
            report.export = Some(self.exporter.write(&frames)?);
        }

        if self.ticks % FRAME_LOG_INTERVAL == 0 {
            debug!(
                ticks = self.ticks,
                time = ?report.relative_time,
                tracked = report.tracked_bodies,
                "Capture progress"
            );
        }
        Ok(report)
    }

    /// Color preview as RGBA, `None` before the first color frame
    pub fn preview_color(&self) -> AppResult<Option<RgbaImage>> {
        if !self.color.has_frame() {
            return Ok(None);
        }
        bgra_to_rgba_image(&self.color).map(Some)
    }

    /// Depth preview (near = bright), `None` before the first depth frame
    pub fn preview_depth(&self) -> AppResult<Option<GrayImage>> {
        if !self.depth.has_frame() {
            return Ok(None);
        }
        depth_to_gray_image(&self.depth, self.depth_scaling).map(Some)
    }

    /// Infrared as 16-bit grayscale, `None` before the first infrared frame
    pub fn preview_infrared(&self) -> AppResult<Option<Gray16Image>> {
        if !self.infrared.has_frame() {
            return Ok(None);
        }
        infrared_to_gray16_image(&self.infrared).map(Some)
    }

    /// Bodies tracked in the most recent body frame
    pub fn tracked_bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.tracked()
    }

    pub fn color_buffer(&self) -> &FrameBuffer<u8> {
        &self.color
    }

    pub fn depth_buffer(&self) -> &FrameBuffer<u16> {
        &self.depth
    }

    pub fn infrared_buffer(&self) -> &FrameBuffer<u16> {
        &self.infrared
    }

    pub fn exporter(&self) -> &FrameExporter {
        &self.exporter
    }

    pub fn exporter_mut(&mut self) -> &mut FrameExporter {
        &mut self.exporter
    }

    /// Ticks that delivered a frame set
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
