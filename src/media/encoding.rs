// SPDX-License-Identifier: GPL-3.0-only

//! Still-image encoding for exported frames
//!
//! - JPEG (quality from [`JpegQuality`]) for color frames
//! - PNG (lossless, 8 or 16 bit grayscale) for depth, infrared and previews

use super::format_converters::Gray16Image;
use crate::constants::JpegQuality;
use crate::constants::export::{COLOR_EXTENSION, DEPTH_EXTENSION};
use crate::errors::{AppError, AppResult};
use image::{GrayImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Supported encoding formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingFormat {
    /// JPEG format (lossy compression)
    Jpeg,
    /// PNG format (lossless compression)
    Png,
}

impl EncodingFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            EncodingFormat::Jpeg => COLOR_EXTENSION,
            EncodingFormat::Png => DEPTH_EXTENSION,
        }
    }
}

/// Encoded image data ready for saving
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub format: EncodingFormat,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    /// Write the encoded bytes to `path`, replacing any existing file
    pub fn save(&self, path: &Path) -> AppResult<()> {
        std::fs::write(path, &self.data)?;
        debug!(path = %path.display(), size = self.data.len(), "Image written");
        Ok(())
    }
}

/// Frame encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameEncoder {
    quality: JpegQuality,
}

impl FrameEncoder {
    pub fn new(quality: JpegQuality) -> Self {
        Self { quality }
    }

    /// Encode image as JPEG
    pub fn encode_jpeg(&self, image: &RgbImage) -> AppResult<EncodedImage> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);

        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, self.quality.value());

        encoder
            .encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| AppError::Encoding(format!("JPEG encoding failed: {}", e)))?;

        Ok(EncodedImage {
            data: buffer,
            format: EncodingFormat::Jpeg,
            width: image.width(),
            height: image.height(),
        })
    }

    /// Encode 16-bit grayscale as PNG
    pub fn encode_png16(&self, image: &Gray16Image) -> AppResult<EncodedImage> {
        let mut buffer = Vec::new();

        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| AppError::Encoding(format!("PNG encoding failed: {}", e)))?;

        Ok(EncodedImage {
            data: buffer,
            format: EncodingFormat::Png,
            width: image.width(),
            height: image.height(),
        })
    }

    /// Encode 8-bit grayscale as PNG
    pub fn encode_png8(&self, image: &GrayImage) -> AppResult<EncodedImage> {
        let mut buffer = Vec::new();

        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| AppError::Encoding(format!("PNG encoding failed: {}", e)))?;

        Ok(EncodedImage {
            data: buffer,
            format: EncodingFormat::Png,
            width: image.width(),
            height: image.height(),
        })
    }
}
