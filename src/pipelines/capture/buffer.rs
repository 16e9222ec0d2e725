// SPDX-License-Identifier: GPL-3.0-only

//! Fixed-size frame buffers sized from stream descriptors
//!
//! A buffer is allocated once by [`FrameBuffer::configure`] and overwritten in
//! place on every ingested frame. A tick without a frame leaves the previous
//! contents untouched.

use crate::backends::sensor::StreamDescriptor;
use crate::errors::{AppResult, SensorError};
use tracing::trace;

/// Result of handing a (possibly missing) frame to a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IngestOutcome {
    /// The buffer now holds the new frame
    Ingested,
    /// The sensor had no frame of this type this tick
    #[default]
    FrameUnavailable,
}

/// Flat sample buffer for one stream
///
/// `T = u8` for BGRA color (`pixel_count * bytes_per_pixel` samples),
/// `T = u16` for depth and infrared (`pixel_count` samples).
#[derive(Debug, Clone)]
pub struct FrameBuffer<T> {
    descriptor: Option<StreamDescriptor>,
    data: Vec<T>,
    samples_per_pixel: usize,
    frames_ingested: u64,
}

impl<T: bytemuck::Pod> FrameBuffer<T> {
    /// Unconfigured buffer; every ingest fails until [`configure`](Self::configure)
    pub fn new() -> Self {
        Self {
            descriptor: None,
            data: Vec::new(),
            samples_per_pixel: 0,
            frames_ingested: 0,
        }
    }

    pub fn with_descriptor(descriptor: StreamDescriptor) -> Self {
        let mut buffer = Self::new();
        buffer.configure(descriptor);
        buffer
    }

    /// Allocate storage for `descriptor`, discarding any previous frame
    ///
    /// Bytes per pixel that do not divide into whole samples are rounded up.
    pub fn configure(&mut self, descriptor: StreamDescriptor) {
        let sample_size = std::mem::size_of::<T>();
        let samples_per_pixel = (descriptor.bytes_per_pixel as usize).div_ceil(sample_size);
        let len = descriptor.pixel_count() * samples_per_pixel;

        self.data = vec![T::zeroed(); len];
        self.samples_per_pixel = samples_per_pixel;
        self.descriptor = Some(descriptor);
        self.frames_ingested = 0;
    }

    /// Copy a frame's samples into the buffer
    ///
    /// `None` is a normal skip. A frame of the wrong length is rejected and
    /// leaves the buffer unchanged.
    pub fn ingest(&mut self, frame: Option<&[T]>) -> AppResult<IngestOutcome> {
        let Some(samples) = frame else {
            trace!("No frame this tick");
            return Ok(IngestOutcome::FrameUnavailable);
        };
        self.check_configured()?;

        if samples.len() != self.data.len() {
            return Err(SensorError::InvalidFrame {
                expected: self.data.len(),
                actual: samples.len(),
            }
            .into());
        }

        self.data.copy_from_slice(samples);
        self.frames_ingested += 1;
        Ok(IngestOutcome::Ingested)
    }

    /// Copy raw native-endian bytes as delivered by the SDK
    pub fn ingest_bytes(&mut self, frame: Option<&[u8]>) -> AppResult<IngestOutcome> {
        let Some(bytes) = frame else {
            trace!("No frame this tick");
            return Ok(IngestOutcome::FrameUnavailable);
        };
        self.check_configured()?;

        let sample_size = std::mem::size_of::<T>();
        if bytes.len() != self.data.len() * sample_size {
            return Err(SensorError::InvalidFrame {
                expected: self.data.len(),
                actual: bytes.len() / sample_size,
            }
            .into());
        }

        let target: &mut [u8] = bytemuck::cast_slice_mut(self.data.as_mut_slice());
        target.copy_from_slice(bytes);
        self.frames_ingested += 1;
        Ok(IngestOutcome::Ingested)
    }

    fn check_configured(&self) -> AppResult<()> {
        if self.descriptor.is_none() {
            return Err(SensorError::NotConfigured.into());
        }
        Ok(())
    }
}

impl<T> FrameBuffer<T> {
    pub fn descriptor(&self) -> Option<StreamDescriptor> {
        self.descriptor
    }

    pub fn is_configured(&self) -> bool {
        self.descriptor.is_some()
    }

    /// True once at least one frame has been ingested
    pub fn has_frame(&self) -> bool {
        self.frames_ingested > 0
    }

    pub fn frames_ingested(&self) -> u64 {
        self.frames_ingested
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.descriptor.map(|d| d.width).unwrap_or(0)
    }

    pub fn height(&self) -> u32 {
        self.descriptor.map(|d| d.height).unwrap_or(0)
    }

    /// Samples per pixel (4 for BGRA bytes, 1 for 16-bit depth)
    pub fn samples_per_pixel(&self) -> usize {
        self.samples_per_pixel
    }

    /// Rows of `width * samples_per_pixel` samples, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        let row_len = (self.width() as usize * self.samples_per_pixel).max(1);
        self.data.chunks_exact(row_len)
    }

    /// Samples of the pixel at (`x`, `y`), or `None` outside the grid
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[T]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let start = (y as usize * self.width() as usize + x as usize) * self.samples_per_pixel;
        self.data.get(start..start + self.samples_per_pixel)
    }
}

impl<T: bytemuck::Pod> Default for FrameBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[test]
    fn test_configure_sizes() {
        let color = FrameBuffer::<u8>::with_descriptor(StreamDescriptor::bgra(4, 3));
        assert_eq!(color.as_slice().len(), 48);
        assert_eq!(color.samples_per_pixel(), 4);

        let depth = FrameBuffer::<u16>::with_descriptor(StreamDescriptor::gray16(4, 3));
        assert_eq!(depth.as_slice().len(), 12);
        assert_eq!(depth.samples_per_pixel(), 1);
    }

    #[test]
    fn test_missing_frame_is_not_an_error() {
        let mut buffer = FrameBuffer::<u16>::with_descriptor(StreamDescriptor::gray16(2, 2));
        buffer.ingest(Some(&[1, 2, 3, 4][..])).unwrap();

        let outcome = buffer.ingest(None).unwrap();
        assert_eq!(outcome, IngestOutcome::FrameUnavailable);
        // Previous frame stays in place
        assert_eq!(buffer.as_slice(), &[1, 2, 3, 4]);
        assert_eq!(buffer.frames_ingested(), 1);
    }

    #[test]
    fn test_wrong_size_rejected() {
        let mut buffer = FrameBuffer::<u16>::with_descriptor(StreamDescriptor::gray16(2, 2));
        let result = buffer.ingest(Some(&[1, 2, 3][..]));
        assert!(matches!(
            result,
            Err(AppError::Sensor(SensorError::InvalidFrame {
                expected: 4,
                actual: 3
            }))
        ));
        assert!(!buffer.has_frame());
    }

    #[test]
    fn test_unconfigured_rejects_frames() {
        let mut buffer = FrameBuffer::<u8>::new();
        assert!(matches!(
            buffer.ingest(Some(&[0u8; 4][..])),
            Err(AppError::Sensor(SensorError::NotConfigured))
        ));
        // Missing frames are still a plain skip
        assert_eq!(buffer.ingest(None).unwrap(), IngestOutcome::FrameUnavailable);
    }

    #[test]
    fn test_ingest_bytes_native_endian() {
        let mut buffer = FrameBuffer::<u16>::with_descriptor(StreamDescriptor::gray16(2, 1));
        let mut raw = Vec::new();
        raw.extend_from_slice(&1000u16.to_ne_bytes());
        raw.extend_from_slice(&8000u16.to_ne_bytes());

        assert_eq!(buffer.ingest_bytes(Some(raw.as_slice())).unwrap(), IngestOutcome::Ingested);
        assert_eq!(buffer.as_slice(), &[1000, 8000]);

        assert!(buffer.ingest_bytes(Some(&raw[..3])).is_err());
    }

    #[test]
    fn test_rows_and_pixels() {
        let mut buffer = FrameBuffer::<u8>::with_descriptor(StreamDescriptor::bgra(2, 2));
        let data: Vec<u8> = (0..16).collect();
        buffer.ingest(Some(data.as_slice())).unwrap();

        let rows: Vec<&[u8]> = buffer.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], &[8, 9, 10, 11, 12, 13, 14, 15]);

        assert_eq!(buffer.pixel(1, 0), Some(&[4u8, 5, 6, 7][..]));
        assert_eq!(buffer.pixel(2, 0), None);
    }
}
