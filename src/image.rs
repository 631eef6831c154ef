use core::fmt;
use core::time::Duration;

use crate::types::{PixelFormat, Size};

/// A single plane of image data.
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
    pub data: &'a [u8],
    pub bytes_per_row: usize,
}

/// A capture timestamp.
pub trait Timestamp {
    fn as_secs_f64(&self) -> f64;
}

impl Timestamp for Duration {
    fn as_secs_f64(&self) -> f64 {
        Duration::as_secs_f64(self)
    }
}

/// YUV sample range reported by a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum YuvRange {
    /// Luma and chroma span 0..=255.
    #[default]
    Full,
    /// Luma spans 16..=235, chroma 16..=240.
    Video,
}

/// Handle to an acquired, possibly native, image.
///
/// The backing resource belongs to whoever produced the handle until
/// [`release`](SourceImage::release) is called. Once released, metadata stays
/// readable but [`plane`](SourceImage::plane) returns `None`.
///
/// Implementations must make `release` idempotent and should release on drop
/// if the handle is still held.
pub trait SourceImage {
    type Timestamp: Timestamp;

    fn pixel_format(&self) -> PixelFormat;
    fn size(&self) -> Size;
    fn plane_count(&self) -> usize;
    fn plane(&self, index: usize) -> Option<Plane<'_>>;
    fn timestamp(&self) -> Self::Timestamp;

    fn is_released(&self) -> bool;

    /// Free the backing resource.
    fn release(&mut self);

    /// Range hint for YUV sources, when the native format encodes one.
    fn yuv_range(&self) -> Option<YuvRange> {
        None
    }

    fn info(&self) -> ImageInfo {
        ImageInfo {
            size: self.size(),
            plane_count: self.plane_count(),
            timestamp: self.timestamp().as_secs_f64(),
            format: self.pixel_format(),
        }
    }
}

/// Human-readable summary of an image, displayed as a fixed multi-line label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageInfo {
    pub size: Size,
    pub plane_count: usize,
    /// Capture time in seconds.
    pub timestamp: f64,
    pub format: PixelFormat,
}

impl fmt::Display for ImageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Image info:\n\twidth: {}\n\theight: {}\n\tplaneCount: {}\n\ttimestamp: {}\n\tformat: {}",
            self.size.width, self.size.height, self.plane_count, self.timestamp, self.format
        )
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use alloc::string::ToString;

    use super::*;

    #[test]
    fn info_label_layout() {
        let info = ImageInfo {
            size: Size::new(1920, 1440),
            plane_count: 2,
            timestamp: 12.5,
            format: PixelFormat::Nv12,
        };
        assert_eq!(
            info.to_string(),
            "Image info:\n\twidth: 1920\n\theight: 1440\n\tplaneCount: 2\n\ttimestamp: 12.5\n\tformat: Nv12"
        );
    }
}
