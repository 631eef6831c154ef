use crate::image::YuvRange;
use crate::types::PixelFormat;

const fn fourcc(code: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*code)
}

const BIPLANAR_VIDEO: u32 = fourcc(b"420v");
const BIPLANAR_FULL: u32 = fourcc(b"420f");
const PLANAR_VIDEO: u32 = fourcc(b"y420");
const PLANAR_FULL: u32 = fourcc(b"f420");
const YUVS: u32 = fourcc(b"yuvs");
const YUV2: u32 = fourcc(b"yuv2");
const UYVY: u32 = fourcc(b"2vuy");
const BGRA: u32 = fourcc(b"BGRA");
const RGBA: u32 = fourcc(b"RGBA");
const GRAY: u32 = fourcc(b"L008");
const JPEG: u32 = fourcc(b"jpeg");
const DEPTH_FLOAT32: u32 = fourcc(b"fdep");
const DEPTH_FLOAT16: u32 = fourcc(b"hdep");

/// Map a `kCVPixelFormatType` code to a pixel format and, for YUV formats,
/// the range the code implies.
pub fn pixel_format_from_fourcc(code: u32) -> (PixelFormat, Option<YuvRange>) {
    match code {
        BIPLANAR_VIDEO => (PixelFormat::Nv12, Some(YuvRange::Video)),
        BIPLANAR_FULL => (PixelFormat::Nv12, Some(YuvRange::Full)),
        PLANAR_VIDEO => (PixelFormat::I420, Some(YuvRange::Video)),
        PLANAR_FULL => (PixelFormat::I420, Some(YuvRange::Full)),
        // Core Video's packed 4:2:2 formats are video range.
        YUVS | YUV2 => (PixelFormat::Yuyv, Some(YuvRange::Video)),
        UYVY => (PixelFormat::Uyvy, Some(YuvRange::Video)),
        BGRA => (PixelFormat::Bgra32, None),
        RGBA => (PixelFormat::Rgba32, None),
        GRAY => (PixelFormat::Gray8, None),
        JPEG => (PixelFormat::Jpeg, None),
        DEPTH_FLOAT32 => (PixelFormat::DepthFloat32, None),
        DEPTH_FLOAT16 => (PixelFormat::DepthFloat16, None),
        other => (PixelFormat::Unknown(other), None),
    }
}
