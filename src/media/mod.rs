// SPDX-License-Identifier: MPL-2.0

//! Media processing for frame previews and exports
//!
//! - [`format_converters`]: BGRA reordering and depth rescaling into `image` buffers
//! - [`encoding`]: JPEG and PNG encoding of converted frames

pub mod encoding;
pub mod format_converters;

pub use encoding::{EncodedImage, EncodingFormat, FrameEncoder};
pub use format_converters::{DepthScaling, Gray16Image};
