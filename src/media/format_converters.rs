// SPDX-License-Identifier: GPL-3.0-only
//! Stream-to-image conversion
//!
//! Turns frame buffers into `image` crate buffers for preview and export:
//! - Color: BGRA bytes reordered to RGBA / RGB, values untouched
//! - Depth: linear rescale of [0, 8000] mm onto [255, 0] (near = bright)
//!   for previews, or raw 16-bit millimeters for lossless export
//! - Infrared: raw 16-bit samples

use crate::backends::sensor::StreamDescriptor;
use crate::constants::depth::MAX_RANGE_MM;
use crate::errors::{AppError, AppResult, SensorError};
use crate::pipelines::capture::FrameBuffer;
use image::{GrayImage, ImageBuffer, Luma, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

/// 16-bit single channel image (depth millimeters, infrared intensity)
pub type Gray16Image = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Handling of depth samples outside the preview range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DepthScaling {
    /// Clamp to [0, 255]: anything beyond the range is black
    #[default]
    Saturate,
    /// Keep the low 8 bits of the truncated value, so far samples wrap
    /// around to bright again
    Wrap,
}

/// Map one depth sample (millimeters) to an 8-bit gray level
///
/// `-(255 / 8000) * raw + 255`, truncated toward zero.
pub fn depth_sample_to_gray(raw: u16, scaling: DepthScaling) -> u8 {
    let alpha = -(f32::from(u8::MAX) / f32::from(MAX_RANGE_MM));
    let value = alpha * f32::from(raw) + 255.0;

    match scaling {
        DepthScaling::Saturate => value.clamp(0.0, 255.0) as u8,
        DepthScaling::Wrap => (value as i32) as u8,
    }
}

/// Rescale depth samples into an existing 8-bit buffer
///
/// Only `min(depth.len(), out.len())` samples are written.
pub fn depth_to_gray8(depth: &[u16], out: &mut [u8], scaling: DepthScaling) {
    for (dst, &raw) in out.iter_mut().zip(depth) {
        *dst = depth_sample_to_gray(raw, scaling);
    }
}

/// Depth preview image (near = bright)
pub fn depth_to_gray_image(buffer: &FrameBuffer<u16>, scaling: DepthScaling) -> AppResult<GrayImage> {
    let mut gray = vec![0u8; buffer.as_slice().len()];
    depth_to_gray8(buffer.as_slice(), &mut gray, scaling);
    GrayImage::from_raw(buffer.width(), buffer.height(), gray).ok_or_else(|| mismatch(buffer))
}

/// Depth frame samples as 16-bit grayscale, copied unchanged
///
/// Works on the frame as delivered, so exporting does not need a second
/// buffer next to the capture session's.
pub fn depth_to_gray16_image(descriptor: StreamDescriptor, depth: &[u16]) -> AppResult<Gray16Image> {
    check_frame_len(descriptor.pixel_count(), depth.len())?;
    Gray16Image::from_raw(descriptor.width, descriptor.height, depth.to_vec()).ok_or(
        SensorError::InvalidFrame {
            expected: descriptor.pixel_count(),
            actual: depth.len(),
        }
        .into(),
    )
}

/// Infrared as 16-bit grayscale, samples copied unchanged
pub fn infrared_to_gray16_image(buffer: &FrameBuffer<u16>) -> AppResult<Gray16Image> {
    Gray16Image::from_raw(buffer.width(), buffer.height(), buffer.as_slice().to_vec())
        .ok_or_else(|| mismatch(buffer))
}

/// Color buffer (BGRA) as RGBA
pub fn bgra_to_rgba_image(buffer: &FrameBuffer<u8>) -> AppResult<RgbaImage> {
    let rgba = bgra_to_rgba(buffer.as_slice());
    RgbaImage::from_raw(buffer.width(), buffer.height(), rgba).ok_or_else(|| mismatch(buffer))
}

/// Color frame samples (BGRA) as RGB, alpha dropped for JPEG
pub fn bgra_to_rgb_image(descriptor: StreamDescriptor, bgra: &[u8]) -> AppResult<RgbImage> {
    check_frame_len(descriptor.byte_len(), bgra.len())?;
    RgbImage::from_raw(descriptor.width, descriptor.height, bgra_to_rgb(bgra)).ok_or(
        SensorError::InvalidFrame {
            expected: descriptor.byte_len(),
            actual: bgra.len(),
        }
        .into(),
    )
}

/// Reorder BGRA to RGBA
pub fn bgra_to_rgba(bgra: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(bgra.len());
    for px in bgra.chunks_exact(4) {
        rgba.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
    }
    rgba
}

/// Reorder BGRA to RGB
pub fn bgra_to_rgb(bgra: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(bgra.len() / 4 * 3);
    for px in bgra.chunks_exact(4) {
        rgb.extend_from_slice(&[px[2], px[1], px[0]]);
    }
    rgb
}

fn check_frame_len(expected: usize, actual: usize) -> AppResult<()> {
    if expected != actual {
        return Err(SensorError::InvalidFrame { expected, actual }.into());
    }
    Ok(())
}

fn mismatch<T>(buffer: &FrameBuffer<T>) -> AppError {
    if buffer.descriptor().is_none() {
        return SensorError::NotConfigured.into();
    }
    SensorError::InvalidFrame {
        expected: buffer.width() as usize * buffer.height() as usize * buffer.samples_per_pixel(),
        actual: buffer.as_slice().len(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_endpoints() {
        assert_eq!(depth_sample_to_gray(0, DepthScaling::Saturate), 255);
        assert_eq!(depth_sample_to_gray(MAX_RANGE_MM, DepthScaling::Saturate), 0);
        assert_eq!(depth_sample_to_gray(4000, DepthScaling::Saturate), 127);
    }

    // Gray levels are truncated like the legacy byte cast, so they can sit
    // one level below the rounded value.
    #[test]
    fn test_depth_in_range_matches_formula() {
        for d in (0..=MAX_RANGE_MM).step_by(7) {
            let expected = -(255.0f64 / 8000.0) * f64::from(d) + 255.0;
            let gray = depth_sample_to_gray(d, DepthScaling::Saturate);
            assert!(
                (f64::from(gray) - expected.round()).abs() <= 1.0,
                "depth {} -> {} (expected ~{})",
                d,
                gray,
                expected
            );
        }
    }

    #[test]
    fn test_depth_monotonic() {
        let mut prev = u8::MAX;
        for d in 0..=MAX_RANGE_MM {
            let gray = depth_sample_to_gray(d, DepthScaling::Saturate);
            assert!(gray <= prev, "not monotonic at {}", d);
            prev = gray;
        }
    }

    #[test]
    fn test_depth_out_of_range() {
        // Saturation keeps far samples black
        assert_eq!(depth_sample_to_gray(8100, DepthScaling::Saturate), 0);
        assert_eq!(depth_sample_to_gray(u16::MAX, DepthScaling::Saturate), 0);

        // Legacy truncation wraps: 255 - 8100 * 255 / 8000 = -3.19 -> -3 -> 253
        assert_eq!(depth_sample_to_gray(8100, DepthScaling::Wrap), 253);
        assert_eq!(depth_sample_to_gray(0, DepthScaling::Wrap), 255);
    }

    #[test]
    fn test_depth_image_dimensions() {
        let mut buffer = FrameBuffer::<u16>::with_descriptor(StreamDescriptor::gray16(3, 2));
        buffer.ingest(Some(&[0, 8000, 4000, 0, 0, 0][..])).unwrap();

        let image = depth_to_gray_image(&buffer, DepthScaling::Saturate).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(0, 0).0, [255]);
        assert_eq!(image.get_pixel(1, 0).0, [0]);

        let raw = depth_to_gray16_image(StreamDescriptor::gray16(3, 2), buffer.as_slice()).unwrap();
        assert_eq!(raw.get_pixel(1, 0).0, [8000]);
    }

    #[test]
    fn test_bgra_reorder() {
        let bgra = vec![10, 20, 30, 255, 1, 2, 3, 128];
        assert_eq!(bgra_to_rgba(&bgra), vec![30, 20, 10, 255, 3, 2, 1, 128]);
        assert_eq!(bgra_to_rgb(&bgra), vec![30, 20, 10, 3, 2, 1]);
    }

    #[test]
    fn test_unconfigured_buffer() {
        let buffer = FrameBuffer::<u8>::new();
        // 0x0 image from an empty buffer is still a valid (empty) image
        assert!(bgra_to_rgba_image(&buffer).is_ok());
    }

    #[test]
    fn test_frame_length_checked() {
        let descriptor = StreamDescriptor::bgra(2, 2);
        let rgb = bgra_to_rgb_image(descriptor, &[0; 16]).unwrap();
        assert_eq!(rgb.dimensions(), (2, 2));

        assert!(matches!(
            bgra_to_rgb_image(descriptor, &[0; 12]),
            Err(AppError::Sensor(SensorError::InvalidFrame {
                expected: 16,
                actual: 12
            }))
        ));
        assert!(matches!(
            depth_to_gray16_image(StreamDescriptor::gray16(2, 2), &[0; 5]),
            Err(AppError::Sensor(SensorError::InvalidFrame { .. }))
        ));
    }

    #[test]
    fn test_mismatch_error_kind() {
        let unconfigured = FrameBuffer::<u16>::new();
        assert!(matches!(
            mismatch(&unconfigured),
            AppError::Sensor(SensorError::NotConfigured)
        ));

        let configured = FrameBuffer::<u16>::with_descriptor(StreamDescriptor::gray16(3, 2));
        assert!(matches!(
            mismatch(&configured),
            AppError::Sensor(SensorError::InvalidFrame {
                expected: 6,
                actual: 6
            })
        ));
    }
}
