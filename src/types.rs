use core::fmt;

use crate::transform::Transform;

/// Maximum number of planes any supported source format uses.
pub const MAX_PLANES: usize = 3;

/// Pixel formats a source image can arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum PixelFormat {
    /// Y plane followed by an interleaved UV plane, 4:2:0.
    Nv12,
    /// Y plane followed by an interleaved VU plane, 4:2:0.
    Nv21,
    /// Separate Y, U and V planes, 4:2:0.
    I420,
    /// Packed 4:2:2, `Y0 U Y1 V`.
    Yuyv,
    /// Packed 4:2:2, `U Y0 V Y1`.
    Uyvy,
    Bgra32,
    Rgba32,
    /// Single luma plane.
    Gray8,
    DepthFloat32,
    DepthFloat16,
    Jpeg,
    /// A native format code with no mapping.
    Unknown(u32),
}

impl PixelFormat {
    /// Number of planes a well-formed image in this format carries, or
    /// `None` if the format cannot be decoded here.
    pub fn plane_count(self) -> Option<usize> {
        match self {
            Self::Nv12 | Self::Nv21 => Some(2),
            Self::I420 => Some(3),
            Self::Yuyv | Self::Uyvy | Self::Bgra32 | Self::Rgba32 | Self::Gray8 => Some(1),
            Self::DepthFloat32 | Self::DepthFloat16 | Self::Jpeg | Self::Unknown(_) => None,
        }
    }

    /// True for formats whose samples are colour (or luma) rather than depth
    /// or compressed data.
    pub fn is_color(self) -> bool {
        self.plane_count().is_some()
    }

    pub fn is_yuv(self) -> bool {
        matches!(
            self,
            Self::Nv12 | Self::Nv21 | Self::I420 | Self::Yuyv | Self::Uyvy
        )
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nv12 => f.write_str("Nv12"),
            Self::Nv21 => f.write_str("Nv21"),
            Self::I420 => f.write_str("I420"),
            Self::Yuyv => f.write_str("Yuyv"),
            Self::Uyvy => f.write_str("Uyvy"),
            Self::Bgra32 => f.write_str("Bgra32"),
            Self::Rgba32 => f.write_str("Rgba32"),
            Self::Gray8 => f.write_str("Gray8"),
            Self::DepthFloat32 => f.write_str("DepthFloat32"),
            Self::DepthFloat16 => f.write_str("DepthFloat16"),
            Self::Jpeg => f.write_str("Jpeg"),
            Self::Unknown(code) => write!(f, "Unknown({code:#010x})"),
        }
    }
}

/// Packed 4-channel, 8-bit-per-channel output layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DestinationFormat {
    #[default]
    Rgba32,
    Bgra32,
    Argb32,
}

impl DestinationFormat {
    pub const BYTES_PER_PIXEL: usize = 4;

    /// Lay out an `[r, g, b, a]` pixel in this format's byte order.
    #[inline]
    pub fn pack(self, [r, g, b, a]: [u8; 4]) -> [u8; 4] {
        match self {
            Self::Rgba32 => [r, g, b, a],
            Self::Bgra32 => [b, g, r, a],
            Self::Argb32 => [a, r, g, b],
        }
    }
}

impl fmt::Display for DestinationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgba32 => f.write_str("Rgba32"),
            Self::Bgra32 => f.write_str("Bgra32"),
            Self::Argb32 => f.write_str("Argb32"),
        }
    }
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Size { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Parameters for a single conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConversionRequest {
    /// Output dimensions. The source is sampled nearest-neighbour when these
    /// differ from the source's own size.
    pub size: Size,
    pub format: DestinationFormat,
    pub transform: Transform,
}

impl ConversionRequest {
    pub fn new(size: Size, format: DestinationFormat, transform: Transform) -> Self {
        ConversionRequest {
            size,
            format,
            transform,
        }
    }

    /// Request a full-size conversion of `image`.
    pub fn for_image<I>(image: &I, format: DestinationFormat, transform: Transform) -> Self
    where
        I: crate::image::SourceImage + ?Sized,
    {
        Self::new(image.size(), format, transform)
    }

    /// Exact destination length this request writes.
    pub fn required_len(&self) -> usize {
        self.size.pixel_count() * DestinationFormat::BYTES_PER_PIXEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_orders_channels() {
        let px = [1, 2, 3, 4];
        assert_eq!(DestinationFormat::Rgba32.pack(px), [1, 2, 3, 4]);
        assert_eq!(DestinationFormat::Bgra32.pack(px), [3, 2, 1, 4]);
        assert_eq!(DestinationFormat::Argb32.pack(px), [4, 1, 2, 3]);
    }

    #[test]
    fn only_color_formats_have_plane_layouts() {
        assert_eq!(PixelFormat::Nv21.plane_count(), Some(2));
        assert_eq!(PixelFormat::I420.plane_count(), Some(3));
        assert!(!PixelFormat::Jpeg.is_color());
        assert!(!PixelFormat::DepthFloat32.is_color());
        assert!(!PixelFormat::Unknown(0x1234).is_color());
        assert!(PixelFormat::Uyvy.is_yuv());
        assert!(!PixelFormat::Gray8.is_yuv());
    }

    #[test]
    fn required_len_is_four_bytes_per_pixel() {
        let request = ConversionRequest::new(
            Size::new(640, 480),
            DestinationFormat::Bgra32,
            Transform::NONE,
        );
        assert_eq!(request.required_len(), 640 * 480 * 4);
    }
}
