// SPDX-License-Identifier: GPL-3.0-only

//! Frame export pipeline
//!
//! Writes selected streams of every captured tick to an output directory:
//!
//! ```text
//! FrameSet ──┬─ color ─▶ BGRA buffer ─▶ RGB ─▶ JPEG ─▶ <time>.jpg
//!            ├─ depth ─▶ u16 buffer ─▶ Gray16 ─▶ PNG ─▶ <time>.png
//!            └─ body ──▶ tracked bodies ─▶ rows ─▶ <yyyyMMdd_HHmmss>.csv
//! ```
//!
//! The exporter is `Stopped` until [`FrameExporter::start`] succeeds and
//! returns to `Stopped` on [`FrameExporter::stop`]. Missing frames are
//! skipped, never retried.

pub mod skeleton_csv;
pub mod writer;

pub use skeleton_csv::SkeletonCsvWriter;
pub use writer::{FrameWriter, WriteJob, WriterMode};

use crate::backends::sensor::{FrameSet, StreamDescriptor, StreamKind};
use crate::constants::JpegQuality;
use crate::constants::export::{COLOR_EXTENSION, DEPTH_EXTENSION};
use crate::errors::{AppError, AppResult};
use crate::media::FrameEncoder;
use crate::media::format_converters::{bgra_to_rgb_image, depth_to_gray16_image};
use crate::storage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// Streams written by an export session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportStreams {
    pub color: bool,
    pub depth: bool,
    pub body: bool,
}

impl ExportStreams {
    /// Skeleton table only
    pub const BODY_ONLY: Self = Self {
        color: false,
        depth: false,
        body: true,
    };

    pub const ALL: Self = Self {
        color: true,
        depth: true,
        body: true,
    };

    pub fn is_empty(&self) -> bool {
        !(self.color || self.depth || self.body)
    }

    pub fn contains(&self, kind: StreamKind) -> bool {
        match kind {
            StreamKind::Color => self.color,
            StreamKind::Depth => self.depth,
            StreamKind::Body => self.body,
            StreamKind::Infrared => false,
        }
    }
}

impl Default for ExportStreams {
    fn default() -> Self {
        Self::BODY_ONLY
    }
}

/// Encoder and writer settings for an exporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportOptions {
    pub jpeg_quality: JpegQuality,
    pub writer_mode: WriterMode,
}

/// Image sizes of the streams an exporter may write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamLayout {
    pub color: Option<StreamDescriptor>,
    pub depth: Option<StreamDescriptor>,
}

/// What a single [`FrameExporter::write`] call produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub images_written: usize,
    pub rows_written: usize,
    /// Enabled streams whose frame was unavailable this tick
    pub skipped: Vec<StreamKind>,
}

/// Source of an output directory chosen at start time
pub trait DirectoryPicker {
    /// `None` when the user cancelled
    fn pick_directory(&mut self) -> Option<PathBuf>;
}

impl<F> DirectoryPicker for F
where
    F: FnMut() -> Option<PathBuf>,
{
    fn pick_directory(&mut self) -> Option<PathBuf> {
        self()
    }
}

struct ExportSession {
    directory: PathBuf,
    streams: ExportStreams,
    csv: Option<SkeletonCsvWriter>,
    writer: FrameWriter,
}

/// Writes captured frames to disk while recording
pub struct FrameExporter {
    layout: StreamLayout,
    encoder: FrameEncoder,
    writer_mode: WriterMode,
    session: Option<ExportSession>,
}

impl FrameExporter {
    pub fn new(layout: StreamLayout, options: ExportOptions) -> Self {
        Self {
            layout,
            encoder: FrameEncoder::new(options.jpeg_quality),
            writer_mode: options.writer_mode,
            session: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    /// Output directory of the running session
    pub fn directory(&self) -> Option<&Path> {
        self.session.as_ref().map(|s| s.directory.as_path())
    }

    /// Streams of the running session
    pub fn streams(&self) -> Option<ExportStreams> {
        self.session.as_ref().map(|s| s.streams)
    }

    /// Path of the skeleton table, when body export is enabled
    pub fn csv_path(&self) -> Option<&Path> {
        self.session
            .as_ref()
            .and_then(|s| s.csv.as_ref())
            .map(|csv| csv.path())
    }

    /// Begin recording into `directory`
    ///
    /// Does nothing while already recording; the first configuration stays.
    /// The directory must already exist.
    pub fn start(&mut self, directory: &Path, streams: ExportStreams) -> AppResult<()> {
        if self.is_recording() {
            debug!("Export already running, ignoring start");
            return Ok(());
        }
        self.validate_streams(streams)?;
        if !directory.is_dir() {
            return Err(AppError::InvalidConfiguration(format!(
                "output directory does not exist: {}",
                directory.display()
            )));
        }

        let csv = if streams.body {
            let path = storage::csv_path(directory, chrono::Local::now());
            Some(SkeletonCsvWriter::create(&path)?)
        } else {
            None
        };
        let writer = FrameWriter::new(self.writer_mode)?;

        info!(
            directory = %directory.display(),
            color = streams.color,
            depth = streams.depth,
            body = streams.body,
            "Export started"
        );
        self.session = Some(ExportSession {
            directory: directory.to_path_buf(),
            streams,
            csv,
            writer,
        });
        Ok(())
    }

    /// Ask `picker` for the output directory, then [`start`](Self::start)
    ///
    /// Returns `Ok(false)` when the pick was cancelled. The stream selection
    /// is checked before the picker is shown.
    pub fn start_with_dialog(
        &mut self,
        picker: &mut dyn DirectoryPicker,
        streams: ExportStreams,
    ) -> AppResult<bool> {
        if self.is_recording() {
            debug!("Export already running, not asking for a directory");
            return Ok(true);
        }
        self.validate_streams(streams)?;

        let Some(directory) = picker.pick_directory() else {
            info!("Directory selection cancelled");
            return Ok(false);
        };
        self.start(&directory, streams)?;
        Ok(true)
    }

    /// Write the enabled streams of one tick
    ///
    /// A no-op returning an empty report while stopped.
    pub fn write(&mut self, frames: &FrameSet) -> AppResult<WriteReport> {
        let mut report = WriteReport::default();
        let Some(session) = self.session.as_mut() else {
            return Ok(report);
        };

        // Frames are encoded straight from the frame set; the capture
        // session owns the only frame buffers.
        if session.streams.color {
            if let (Some(frame), Some(descriptor)) = (&frames.color, self.layout.color) {
                let rgb = bgra_to_rgb_image(descriptor, &frame.data)?;
                let image = self.encoder.encode_jpeg(&rgb)?;
                let path = storage::frame_path(&session.directory, frame.relative_time, COLOR_EXTENSION);
                session.writer.submit(WriteJob { path, image })?;
                report.images_written += 1;
            } else {
                report.skipped.push(StreamKind::Color);
            }
        }

        if session.streams.depth {
            if let (Some(frame), Some(descriptor)) = (&frames.depth, self.layout.depth) {
                let gray = depth_to_gray16_image(descriptor, &frame.data)?;
                let image = self.encoder.encode_png16(&gray)?;
                let path = storage::frame_path(&session.directory, frame.relative_time, DEPTH_EXTENSION);
                session.writer.submit(WriteJob { path, image })?;
                report.images_written += 1;
            } else {
                report.skipped.push(StreamKind::Depth);
            }
        }

        if session.streams.body {
            match (&frames.body, session.csv.as_mut()) {
                (Some(frame), Some(csv)) => {
                    report.rows_written = csv.write_frame(frame)?;
                }
                _ => report.skipped.push(StreamKind::Body),
            }
        }

        if !report.skipped.is_empty() {
            trace!(skipped = ?report.skipped, "Frames unavailable this tick");
        }
        Ok(report)
    }

    /// Close the skeleton table and drain pending image writes
    ///
    /// A no-op while stopped. The exporter is stopped afterwards even when
    /// an error is returned.
    pub fn stop(&mut self) -> AppResult<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };

        let csv_result = session.csv.map(SkeletonCsvWriter::finish).transpose();
        let images = session.writer.finish();
        csv_result?;
        let images = images?;

        info!(directory = %session.directory.display(), images, "Export stopped");
        Ok(())
    }

    fn validate_streams(&self, streams: ExportStreams) -> AppResult<()> {
        if streams.is_empty() {
            return Err(AppError::InvalidConfiguration(
                "no stream selected for export".to_string(),
            ));
        }
        if streams.color && self.layout.color.is_none() {
            return Err(AppError::InvalidConfiguration(
                "color export requested but the sensor has no color stream".to_string(),
            ));
        }
        if streams.depth && self.layout.depth.is_none() {
            return Err(AppError::InvalidConfiguration(
                "depth export requested but the sensor has no depth stream".to_string(),
            ));
        }
        Ok(())
    }
}

impl Drop for FrameExporter {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!(error = %e, "Export did not stop cleanly");
        }
    }
}
